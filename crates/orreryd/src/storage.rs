//! SQLite storage for telemetry, the ISS fetch log, and CMS blocks.
//!
//! One connection behind a tokio mutex; queries are short and the daemon is
//! single-process, so no pooling is needed.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// Legacy telemetry reading.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRow {
    pub id: i64,
    pub recorded_at: String,
    pub voltage: f64,
    pub temp: f64,
    pub source_file: String,
}

/// One raw ISS position fetch, as stored.
#[derive(Debug, Clone, Serialize)]
pub struct PositionLog {
    pub id: i64,
    pub fetched_at: String,
    pub source_url: String,
    pub payload: Value,
}

/// Projected trend sample for the map trail and charts.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub lat: f64,
    pub lon: f64,
    pub velocity: f64,
    pub altitude: f64,
    pub at: String,
}

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open (creating parent directories as needed) the database file.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir for {}", path))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    /// Create tables if they do not exist yet.
    pub async fn init_tables(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS telemetry_legacy (
                 id          INTEGER PRIMARY KEY AUTOINCREMENT,
                 recorded_at TEXT NOT NULL,
                 voltage     REAL NOT NULL,
                 temp        REAL NOT NULL,
                 source_file TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS iss_fetch_log (
                 id         INTEGER PRIMARY KEY AUTOINCREMENT,
                 fetched_at TEXT NOT NULL,
                 source_url TEXT NOT NULL,
                 payload    TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS cms_blocks (
                 slug      TEXT PRIMARY KEY,
                 content   TEXT NOT NULL,
                 is_active INTEGER NOT NULL DEFAULT 1
             );",
        )?;
        Ok(())
    }

    /// Append a fetched ISS position payload to the log.
    pub async fn insert_position(&self, source_url: &str, payload: &Value) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO iss_fetch_log (fetched_at, source_url, payload) VALUES (?1, ?2, ?3)",
            params![
                Utc::now().to_rfc3339(),
                source_url,
                serde_json::to_string(payload)?
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent position logs, newest first, payload re-parsed to JSON.
    pub async fn history(&self, limit: usize) -> Result<Vec<PositionLog>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, fetched_at, source_url, payload
             FROM iss_fetch_log ORDER BY fetched_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let raw: String = row.get(3)?;
            Ok(PositionLog {
                id: row.get(0)?,
                fetched_at: row.get(1)?,
                source_url: row.get(2)?,
                payload: serde_json::from_str(&raw).unwrap_or(Value::Null),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Trend samples projected from the last `limit` stored payloads,
    /// returned oldest first for plotting.
    ///
    /// Rows whose payload lacks coordinates are skipped; velocity and
    /// altitude default to zero when absent.
    pub async fn trend_points(&self, limit: usize) -> Result<Vec<TrendPoint>> {
        let logs = self.history(limit).await?;
        let mut points: Vec<TrendPoint> = logs
            .into_iter()
            .filter_map(|log| {
                let lat = log.payload.get("latitude").and_then(Value::as_f64);
                let lon = log.payload.get("longitude").and_then(Value::as_f64);
                let (Some(lat), Some(lon)) = (lat, lon) else {
                    debug!("Skipping position log {} without coordinates", log.id);
                    return None;
                };
                Some(TrendPoint {
                    lat,
                    lon,
                    velocity: log
                        .payload
                        .get("velocity")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    altitude: log
                        .payload
                        .get("altitude")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    at: log.fetched_at,
                })
            })
            .collect();
        points.reverse();
        Ok(points)
    }

    /// Record a legacy telemetry reading.
    pub async fn insert_telemetry(
        &self,
        recorded_at: &str,
        voltage: f64,
        temp: f64,
        source_file: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO telemetry_legacy (recorded_at, voltage, temp, source_file)
             VALUES (?1, ?2, ?3, ?4)",
            params![recorded_at, voltage, temp, source_file],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent telemetry readings, newest first.
    pub async fn telemetry_recent(&self, limit: usize) -> Result<Vec<TelemetryRow>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, recorded_at, voltage, temp, source_file
             FROM telemetry_legacy ORDER BY recorded_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TelemetryRow {
                id: row.get(0)?,
                recorded_at: row.get(1)?,
                voltage: row.get(2)?,
                temp: row.get(3)?,
                source_file: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Content of an active CMS block, if present.
    pub async fn cms_block(&self, slug: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT content FROM cms_blocks WHERE slug = ?1 AND is_active = 1 LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![slug], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(content) => Ok(Some(content?)),
            None => Ok(None),
        }
    }

    /// Create or replace a CMS block.
    pub async fn put_cms_block(&self, slug: &str, content: &str, active: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO cms_blocks (slug, content, is_active) VALUES (?1, ?2, ?3)
             ON CONFLICT(slug) DO UPDATE SET content = ?2, is_active = ?3",
            params![slug, content, active as i64],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn storage() -> Storage {
        let s = Storage::open_in_memory().unwrap();
        s.init_tables().await.unwrap();
        s
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orrery.db");
        let s = Storage::open(path.to_str().unwrap()).unwrap();
        s.init_tables().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn position_roundtrip_and_history_order() {
        let s = storage().await;
        s.insert_position("u", &json!({"latitude": 1.0, "longitude": 2.0}))
            .await
            .unwrap();
        s.insert_position("u", &json!({"latitude": 3.0, "longitude": 4.0}))
            .await
            .unwrap();

        let logs = s.history(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        // Newest first
        assert_eq!(logs[0].payload["latitude"], json!(3.0));
        assert_eq!(logs[1].payload["latitude"], json!(1.0));
    }

    #[tokio::test]
    async fn trend_points_oldest_first_with_defaults() {
        let s = storage().await;
        s.insert_position(
            "u",
            &json!({"latitude": 10.0, "longitude": 20.0, "velocity": 27580.0, "altitude": 420.5}),
        )
        .await
        .unwrap();
        // No coordinates: skipped
        s.insert_position("u", &json!({"velocity": 1.0})).await.unwrap();
        // No velocity/altitude: zero-filled
        s.insert_position("u", &json!({"latitude": 11.0, "longitude": 21.0}))
            .await
            .unwrap();

        let points = s.trend_points(10).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].lat, 10.0);
        assert_eq!(points[0].velocity, 27580.0);
        assert_eq!(points[1].lat, 11.0);
        assert_eq!(points[1].velocity, 0.0);
    }

    #[tokio::test]
    async fn trend_honors_limit() {
        let s = storage().await;
        for i in 0..5 {
            s.insert_position("u", &json!({"latitude": i as f64, "longitude": 0.0}))
                .await
                .unwrap();
        }
        let points = s.trend_points(3).await.unwrap();
        assert_eq!(points.len(), 3);
        // Last three inserts, oldest of them first
        assert_eq!(points[0].lat, 2.0);
        assert_eq!(points[2].lat, 4.0);
    }

    #[tokio::test]
    async fn unparsable_payload_becomes_null_not_error() {
        let s = storage().await;
        {
            let conn = s.conn.lock().await;
            conn.execute(
                "INSERT INTO iss_fetch_log (fetched_at, source_url, payload)
                 VALUES ('2025-01-01T00:00:00Z', 'u', 'not-json')",
                [],
            )
            .unwrap();
        }
        let logs = s.history(10).await.unwrap();
        assert_eq!(logs[0].payload, Value::Null);
    }

    #[tokio::test]
    async fn telemetry_recent_newest_first() {
        let s = storage().await;
        s.insert_telemetry("2025-01-01T00:00:00Z", 3.2, 21.0, "a.csv")
            .await
            .unwrap();
        s.insert_telemetry("2025-01-02T00:00:00Z", 3.4, 22.5, "b.csv")
            .await
            .unwrap();

        let rows = s.telemetry_recent(20).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_file, "b.csv");
        assert_eq!(rows[1].voltage, 3.2);
    }

    #[tokio::test]
    async fn cms_blocks_respect_active_flag() {
        let s = storage().await;
        assert!(s.cms_block("welcome_message").await.unwrap().is_none());

        s.put_cms_block("welcome_message", "<p>hi</p>", true)
            .await
            .unwrap();
        assert_eq!(
            s.cms_block("welcome_message").await.unwrap().as_deref(),
            Some("<p>hi</p>")
        );

        s.put_cms_block("welcome_message", "<p>hi</p>", false)
            .await
            .unwrap();
        assert!(s.cms_block("welcome_message").await.unwrap().is_none());
    }
}
