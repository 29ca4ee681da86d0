use std::path::{Path, PathBuf};

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use super::{Cell, SqlBackend, SqlValue, Table};
use crate::error::DbError;

/// Local SQLite store, used for offline practice and in tests.
pub struct SqliteBackend {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .map_err(|err| DbError::Connect(format!("open sqlite db {}: {err}", path.display())))?;
        init_schema(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    pub fn in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| DbError::Connect(format!("open in-memory sqlite: {err}")))?;
        init_schema(&conn)?;
        Ok(Self { path: None, conn })
    }
}

pub fn init_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS top_players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            matches_played INTEGER NOT NULL DEFAULT 0,
            innings_batted INTEGER NOT NULL DEFAULT 0,
            runs INTEGER NOT NULL DEFAULT 0,
            average REAL NOT NULL DEFAULT 0,
            hundred INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

impl SqlBackend for SqliteBackend {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Table, DbError> {
        let sql = numbered_placeholders(sql);
        debug!(%sql, "sqlite query");
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        let mut rows = stmt.query(params_from_iter(bind_values(params)))?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(cell_from_ref(row.get_ref(idx)?));
            }
            table.rows.push(cells);
        }
        Ok(table)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let sql = numbered_placeholders(sql);
        let tx = self.conn.transaction()?;
        match tx.execute(&sql, params_from_iter(bind_values(params))) {
            Ok(affected) => {
                tx.commit()?;
                Ok(affected as u64)
            }
            Err(err) => {
                let _ = tx.rollback();
                Err(err.into())
            }
        }
    }

    fn ping(&mut self) -> Result<(), DbError> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), DbError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        *self = Self::open(&path)?;
        Ok(())
    }
}

fn bind_values(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Int(n) => Value::Integer(*n),
            SqlValue::Float(f) => Value::Real(*f),
            SqlValue::Text(s) => Value::Text(s.clone()),
        })
        .collect()
}

fn cell_from_ref(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(n) => Cell::Int(n),
        ValueRef::Real(f) => Cell::Float(f),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Cell::Text(format!("<{} bytes>", bytes.len())),
    }
}

/// Rewrites `$1`-style placeholders to SQLite's `?1` form.
///
/// Text inside single-quoted literals is copied untouched; a doubled `''`
/// closes and reopens the literal, which leaves the state unchanged.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            in_literal = !in_literal;
            out.push(ch);
        } else if !in_literal
            && ch == '$'
            && chars.peek().is_some_and(|next| next.is_ascii_digit())
        {
            out.push('?');
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_rewritten() {
        assert_eq!(
            numbered_placeholders("UPDATE t SET a=$1 WHERE b=$12 AND c='$x'"),
            "UPDATE t SET a=?1 WHERE b=?12 AND c='$x'"
        );
    }

    #[test]
    fn placeholders_inside_literals_are_kept() {
        assert_eq!(
            numbered_placeholders("SELECT '$5', 'it''s $2' WHERE a=$1"),
            "SELECT '$5', 'it''s $2' WHERE a=?1"
        );
    }

    #[test]
    fn query_decodes_each_storage_class() {
        let mut backend = SqliteBackend::in_memory().expect("sqlite");
        let table = backend
            .query("SELECT 1 AS n, 2.5 AS f, 'x' AS t, NULL AS z, $1 AS p", &[SqlValue::Int(9)])
            .expect("query");
        assert_eq!(table.columns, vec!["n", "f", "t", "z", "p"]);
        assert_eq!(
            table.rows[0],
            vec![
                Cell::Int(1),
                Cell::Float(2.5),
                Cell::Text("x".into()),
                Cell::Null,
                Cell::Int(9)
            ]
        );
    }

    #[test]
    fn failed_write_rolls_back() {
        let mut backend = SqliteBackend::in_memory().expect("sqlite");
        backend
            .execute(
                "INSERT INTO top_players (player_id, name) VALUES ($1, $2)",
                &[SqlValue::Int(1), SqlValue::from("First")],
            )
            .expect("first insert");
        let err = backend
            .execute(
                "INSERT INTO top_players (player_id, name) VALUES ($1, $2)",
                &[SqlValue::Int(1), SqlValue::from("Duplicate")],
            )
            .unwrap_err();
        assert!(matches!(err, DbError::Query(_)));

        let table = backend.query("SELECT name FROM top_players", &[]).expect("read");
        assert_eq!(table.len(), 1);
        backend.ping().expect("connection still usable");
    }
}
