pub mod clients;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod routes;
pub mod server;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use errors::ApiError;
pub use server::AppState;
