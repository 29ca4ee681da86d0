//! Postgres backend.
//!
//! sqlx is async; this wraps it in a private current-thread runtime so the
//! rest of the app stays blocking. The pool holds a single connection.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow, PgValueRef};
use sqlx::query::Query;
use sqlx::types::Decimal;
use sqlx::{Column, Executor, PgPool, Postgres, Row, TypeInfo, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::{Cell, SqlBackend, SqlValue, Table};
use crate::config::PostgresConfig;
use crate::error::DbError;

const ACQUIRE_TIMEOUT_SECS: u64 = 10;

pub struct PgBackend {
    runtime: Runtime,
    options: PgConnectOptions,
    pool: PgPool,
}

impl PgBackend {
    pub fn connect(config: &PostgresConfig) -> Result<Self, DbError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| DbError::Connect(format!("start database runtime: {err}")))?;
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);
        let pool = runtime.block_on(open_pool(options.clone()))?;
        info!(host = %config.host, db = %config.database, "postgres pool ready");
        Ok(Self {
            runtime,
            options,
            pool,
        })
    }
}

impl SqlBackend for PgBackend {
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Table, DbError> {
        debug!(%sql, "postgres query");
        self.runtime.block_on(fetch_table(&self.pool, sql, params))
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        self.runtime.block_on(execute_in_tx(&self.pool, sql, params))
    }

    fn ping(&mut self) -> Result<(), DbError> {
        self.runtime.block_on(async {
            sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
        })?;
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), DbError> {
        self.runtime.block_on(self.pool.close());
        self.pool = self.runtime.block_on(open_pool(self.options.clone()))?;
        info!("postgres pool rebuilt");
        Ok(())
    }
}

async fn open_pool(options: PgConnectOptions) -> Result<PgPool, DbError> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect_with(options)
        .await
        .map_err(|err| DbError::Connect(err.to_string()))
}

async fn fetch_table(pool: &PgPool, sql: &str, params: &[SqlValue]) -> Result<Table, DbError> {
    let rows = bind_all(sqlx::query(sql), params).fetch_all(pool).await?;

    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        // Empty results carry no row metadata; ask the server for the shape.
        None => match pool.describe(sql).await {
            Ok(described) => described
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            Err(_) => Vec::new(),
        },
    };

    let mut table = Table::new(columns);
    for row in &rows {
        let mut cells = Vec::with_capacity(row.len());
        for idx in 0..row.len() {
            cells.push(cell_at(row, idx)?);
        }
        table.rows.push(cells);
    }
    Ok(table)
}

async fn execute_in_tx(pool: &PgPool, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    match bind_all(sqlx::query(sql), params).execute(&mut *tx).await {
        Ok(done) => {
            tx.commit().await?;
            Ok(done.rows_affected())
        }
        Err(err) => {
            let _ = tx.rollback().await;
            Err(err.into())
        }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn cell_at(row: &PgRow, idx: usize) -> Result<Cell, DbError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = row.columns()[idx].type_info().name().to_string();
    let cell = match type_name.as_str() {
        "BOOL" => Cell::Bool(row.try_get::<bool, _>(idx)?),
        "INT2" => Cell::Int(row.try_get::<i16, _>(idx)?.into()),
        "INT4" => Cell::Int(row.try_get::<i32, _>(idx)?.into()),
        "INT8" => Cell::Int(row.try_get::<i64, _>(idx)?),
        "FLOAT4" => Cell::Float(row.try_get::<f32, _>(idx)?.into()),
        "FLOAT8" => Cell::Float(row.try_get::<f64, _>(idx)?),
        "NUMERIC" => numeric_cell(row, idx, raw)?,
        "DATE" => Cell::Text(row.try_get::<NaiveDate, _>(idx)?.to_string()),
        "TIMESTAMP" => Cell::Text(
            row.try_get::<NaiveDateTime, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "TIMESTAMPTZ" => Cell::Text(
            row.try_get::<DateTime<Utc>, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
        ),
        _ => match row.try_get::<String, _>(idx) {
            Ok(text) => Cell::Text(text),
            Err(_) => Cell::Text(format!("<{type_name}>")),
        },
    };
    Ok(cell)
}

fn numeric_cell(row: &PgRow, idx: usize, raw: PgValueRef<'_>) -> Result<Cell, DbError> {
    match row.try_get::<Decimal, _>(idx) {
        Ok(value) => Ok(f64::try_from(value)
            .map(Cell::Float)
            .unwrap_or_else(|_| Cell::Text(value.to_string()))),
        Err(err) => match raw.as_bytes().ok().and_then(special_numeric) {
            Some(label) => Ok(Cell::Text(label.to_string())),
            None => Err(err.into()),
        },
    }
}

/// Labels the NUMERIC values `Decimal` cannot hold, read from the sign word
/// of the binary form.
fn special_numeric(bytes: &[u8]) -> Option<&'static str> {
    match u16::from_be_bytes([*bytes.get(4)?, *bytes.get(5)?]) {
        0xC000 => Some("NaN"),
        0xD000 => Some("Infinity"),
        0xF000 => Some("-Infinity"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::special_numeric;

    fn header(sign: u16) -> Vec<u8> {
        [0u16, 0, sign, 0].iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn labels_non_finite_numerics() {
        assert_eq!(special_numeric(&header(0xC000)), Some("NaN"));
        assert_eq!(special_numeric(&header(0xD000)), Some("Infinity"));
        assert_eq!(special_numeric(&header(0xF000)), Some("-Infinity"));
    }

    #[test]
    fn ordinary_numerics_are_not_special() {
        assert_eq!(special_numeric(&header(0x0000)), None);
        assert_eq!(special_numeric(&header(0x4000)), None);
        assert_eq!(special_numeric(&[0, 1]), None);
    }
}
