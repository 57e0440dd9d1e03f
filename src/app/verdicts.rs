// src/app/verdicts.rs
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, warn};

use super::types::Verdict;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS verdicts (
  item_id    TEXT PRIMARY KEY,
  verdict    TEXT NOT NULL,
  decided_at INTEGER NOT NULL,
  seq        INTEGER NOT NULL DEFAULT 0
)
"#;

// databases written before `seq` existed
const ADD_SEQ: &str = "ALTER TABLE verdicts ADD COLUMN seq INTEGER NOT NULL DEFAULT 0";

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("verdict database: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("cannot create data dir: {0}")]
    Io(#[from] std::io::Error),
    #[error("no item `{0}` in the current catalog")]
    UnknownItem(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerdictEntry {
    pub item_id: String,
    pub verdict: Verdict,
    pub decided_at: DateTime<Utc>,
}

/// Like/reject decisions, one row per item.
pub struct VerdictLog {
    conn: Connection,
}

impl VerdictLog {
    pub fn open(path: &Path) -> Result<Self, VerdictError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let _ = conn.busy_timeout(Duration::from_secs(5));
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, VerdictError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, VerdictError> {
        conn.execute_batch(SCHEMA)?;
        let has_seq = conn
            .prepare("SELECT 1 FROM pragma_table_info('verdicts') WHERE name = 'seq'")?
            .exists([])?;
        if !has_seq {
            conn.execute_batch(ADD_SEQ)?;
        }
        Ok(Self { conn })
    }

    /// Replaces any earlier verdict for the item. Every write takes the next
    /// `seq`, which orders decisions made within the same second.
    pub fn record(&self, item_id: &str, verdict: Verdict) -> Result<(), VerdictError> {
        self.record_at(item_id, verdict, Utc::now())
    }

    fn record_at(&self, item_id: &str, verdict: Verdict, at: DateTime<Utc>) -> Result<(), VerdictError> {
        self.conn.execute(
            "INSERT INTO verdicts (item_id, verdict, decided_at, seq)
             VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(seq), 0) + 1 FROM verdicts))
             ON CONFLICT(item_id) DO UPDATE SET
               verdict = excluded.verdict,
               decided_at = excluded.decided_at,
               seq = excluded.seq",
            params![item_id, verdict.as_str(), at.timestamp()],
        )?;
        debug!("{item_id} marked {}", verdict.as_str());
        Ok(())
    }

    pub fn get(&self, item_id: &str) -> Result<Option<VerdictEntry>, VerdictError> {
        let row = self
            .conn
            .query_row(
                "SELECT item_id, verdict, decided_at FROM verdicts WHERE item_id = ?1",
                [item_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
            )
            .optional()?;
        Ok(row.and_then(|(id, v, ts)| entry_from_row(id, &v, ts)))
    }

    /// Most recent first.
    pub fn with_verdict(&self, verdict: Verdict) -> Result<Vec<VerdictEntry>, VerdictError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, verdict, decided_at FROM verdicts
             WHERE verdict = ?1 ORDER BY decided_at DESC, seq DESC",
        )?;
        let rows = stmt.query_map([verdict.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, v, ts) = row?;
            if let Some(entry) = entry_from_row(id, &v, ts) {
                out.push(entry);
            }
        }
        Ok(out)
    }

    pub fn liked(&self) -> Result<Vec<VerdictEntry>, VerdictError> {
        self.with_verdict(Verdict::Liked)
    }

    pub fn decided_ids(&self) -> Result<std::collections::HashSet<String>, VerdictError> {
        let mut stmt = self.conn.prepare("SELECT item_id FROM verdicts")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(ids)
    }
}

fn entry_from_row(item_id: String, verdict: &str, ts: i64) -> Option<VerdictEntry> {
    let Some(verdict) = Verdict::from_str(verdict) else {
        warn!("Ignoring unknown verdict `{verdict}` for {item_id}");
        return None;
    };
    let decided_at = Utc.timestamp_opt(ts, 0).single()?;
    Some(VerdictEntry {
        item_id,
        verdict,
        decided_at,
    })
}
