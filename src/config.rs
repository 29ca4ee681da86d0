//! Runtime configuration.
//!
//! Everything comes from the environment. `load_dotenv` pulls in `.env.local`
//! and `.env` first so local secrets never need exporting by hand.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "RAPIDAPI_KEY";
pub const SQLITE_PATH_VAR: &str = "CRICBUZZ_SQLITE_PATH";
pub const DEFAULT_DB_PORT: u16 = 5432;

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbConfig {
    Postgres(PostgresConfig),
    Sqlite(PathBuf),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = required(&lookup, API_KEY_VAR)?;
        Ok(Self { api_key })
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// SQLite wins when its path is set; otherwise all Postgres credentials are required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(path) = non_empty(lookup(SQLITE_PATH_VAR)) {
            return Ok(DbConfig::Sqlite(PathBuf::from(path)));
        }

        let port = match non_empty(lookup("DB_PORT")) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "DB_PORT",
                value: raw,
            })?,
            None => DEFAULT_DB_PORT,
        };

        Ok(DbConfig::Postgres(PostgresConfig {
            host: required(&lookup, "DB_HOST")?,
            database: required(&lookup, "DB_NAME")?,
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
            port,
        }))
    }

    pub fn describe(&self) -> String {
        match self {
            DbConfig::Postgres(pg) => {
                format!("postgres://{}@{}:{}/{}", pg.user, pg.host, pg.port, pg.database)
            }
            DbConfig::Sqlite(path) => format!("sqlite://{}", path.display()),
        }
    }
}

/// Text shown when the API key is absent.
pub fn missing_api_key_help() -> String {
    [
        "Please add your RapidAPI key to the environment or a .env file:",
        "",
        "    RAPIDAPI_KEY=\"YOUR_API_KEY_HERE\"",
    ]
    .join("\n")
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String, ConfigError> {
    non_empty(lookup(var)).ok_or(ConfigError::Missing(var))
}

fn non_empty(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let err = ApiConfig::from_lookup(lookup_from(&[("RAPIDAPI_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("RAPIDAPI_KEY"));
    }

    #[test]
    fn postgres_port_defaults_to_5432() {
        let cfg = DbConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "localhost"),
            ("DB_NAME", "cricket"),
            ("DB_USER", "analyst"),
            ("DB_PASSWORD", "secret"),
        ]))
        .expect("complete credentials");
        let DbConfig::Postgres(pg) = cfg else {
            panic!("expected postgres config");
        };
        assert_eq!(pg.port, 5432);
        assert_eq!(pg.database, "cricket");
    }

    #[test]
    fn missing_password_is_reported_by_name() {
        let err = DbConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "localhost"),
            ("DB_NAME", "cricket"),
            ("DB_USER", "analyst"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("DB_PASSWORD"));
    }

    #[test]
    fn bad_port_is_invalid() {
        let err = DbConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "h"),
            ("DB_NAME", "d"),
            ("DB_USER", "u"),
            ("DB_PASSWORD", "p"),
            ("DB_PORT", "fifty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DB_PORT", .. }));
    }

    #[test]
    fn sqlite_path_takes_precedence() {
        let cfg = DbConfig::from_lookup(lookup_from(&[
            ("CRICBUZZ_SQLITE_PATH", "/tmp/cricket.sqlite"),
            ("DB_HOST", "ignored"),
        ]))
        .expect("sqlite config");
        assert_eq!(cfg, DbConfig::Sqlite(PathBuf::from("/tmp/cricket.sqlite")));
    }
}
