//! Relational store access.
//!
//! `Database` owns at most one backend connection for the life of the
//! process. Reads degrade to empty tables; writes report their error after
//! the backend has rolled the transaction back.

pub mod postgres;
pub mod queries;
pub mod sqlite;
pub mod table;
pub mod top_players;

use tracing::{info, warn};

use crate::config::DbConfig;
use crate::error::DbError;
use crate::notice::{Notice, NoticeBoard};

pub use table::{Cell, Table};

/// Bound statement parameter. Placeholders are written `$1`, `$2`, ...
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

pub trait SqlBackend {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Table, DbError>;

    /// Runs one statement in its own transaction and returns the affected row count.
    /// On failure the transaction is rolled back before the error is returned.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError>;

    fn ping(&mut self) -> Result<(), DbError>;

    fn reconnect(&mut self) -> Result<(), DbError>;
}

pub fn connect(config: &DbConfig) -> Result<Box<dyn SqlBackend>, DbError> {
    match config {
        DbConfig::Postgres(pg) => Ok(Box::new(postgres::PgBackend::connect(pg)?)),
        DbConfig::Sqlite(path) => Ok(Box::new(sqlite::SqliteBackend::open(path)?)),
    }
}

pub struct Database {
    backend: Option<Box<dyn SqlBackend>>,
    config: Option<DbConfig>,
    notices: NoticeBoard,
}

impl Database {
    pub fn new(backend: Box<dyn SqlBackend>) -> Self {
        Self {
            backend: Some(backend),
            config: None,
            notices: NoticeBoard::default(),
        }
    }

    /// A handle with no connection: every query returns an empty table.
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            config: None,
            notices: NoticeBoard::default(),
        }
    }

    /// Connects, or reports the failure and falls back to an unavailable handle.
    pub fn open(config: Option<&DbConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable();
        };
        let mut db = match connect(config) {
            Ok(backend) => {
                info!(target = %config.describe(), "database connected");
                Self::new(backend)
            }
            Err(err) => {
                let mut db = Self::unavailable();
                db.notices
                    .push(Notice::error(format!("Database connection failed: {err}")));
                db
            }
        };
        db.config = Some(config.clone());
        db
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs a read. Errors become a notice and an empty table.
    pub fn run_query(&mut self, sql: &str, params: &[SqlValue]) -> Table {
        let Some(backend) = self.backend.as_mut() else {
            return Table::default();
        };
        match backend.query(sql, params) {
            Ok(table) => table,
            Err(err) => {
                self.notices.push(Notice::error(format!("Query failed: {err}")));
                Table::default()
            }
        }
    }

    pub fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let backend = self.backend.as_mut().ok_or(DbError::Unavailable)?;
        backend.execute(sql, params)
    }

    pub fn health_check(&mut self) -> Result<(), DbError> {
        let backend = self.backend.as_mut().ok_or(DbError::Unavailable)?;
        backend.ping()
    }

    /// Rebuilds the connection, or makes the first one if `open` failed earlier.
    pub fn reconnect(&mut self) -> Result<(), DbError> {
        let result = if let Some(backend) = self.backend.as_mut() {
            backend.reconnect()
        } else if let Some(config) = &self.config {
            connect(config).map(|backend| self.backend = Some(backend))
        } else {
            Err(DbError::Unavailable)
        };
        match result {
            Ok(()) => {
                self.notices.push(Notice::info("Database reconnected"));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "database reconnect failed");
                Err(err)
            }
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_database_returns_empty_tables_silently() {
        let mut db = Database::unavailable();
        let table = db.run_query("SELECT 1", &[]);
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
        assert!(db.take_notices().is_empty());
        assert_eq!(db.execute("DELETE FROM x", &[]), Err(DbError::Unavailable));
    }

    #[test]
    fn reconnect_connects_after_failed_open() {
        let dir = std::env::temp_dir().join(format!("cricbuzz-reconnect-{}", std::process::id()));
        let path = dir.join("blocked");
        // A plain file where the parent directory should be makes the first open fail.
        std::fs::create_dir_all(&dir).expect("temp dir");
        std::fs::write(&path, b"").expect("blocker file");
        let config = DbConfig::Sqlite(path.join("db.sqlite"));

        let mut db = Database::open(Some(&config));
        assert!(!db.is_available());
        assert!(db.take_notices()[0].message.starts_with("Database connection failed"));

        std::fs::remove_file(&path).expect("remove blocker");
        db.reconnect().expect("second attempt connects");
        assert!(db.is_available());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_query_surfaces_notice_and_empty_table() {
        let backend = sqlite::SqliteBackend::in_memory().expect("in-memory sqlite");
        let mut db = Database::new(Box::new(backend));
        let table = db.run_query("SELECT * FROM no_such_table", &[]);
        assert!(table.is_empty());
        let notices = db.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.starts_with("Query failed:"));
    }
}
