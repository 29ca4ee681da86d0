pub mod app;
pub mod config;
pub mod cricbuzz_api;
pub mod db;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod models;
pub mod notice;
pub mod parsing;
pub mod state;
pub mod ttl_cache;
