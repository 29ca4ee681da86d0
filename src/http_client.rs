use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ApiConfig;

pub const API_HOST: &str = "cricbuzz-cricket.p.rapidapi.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Builds the one HTTP session the app uses, with the RapidAPI auth pair baked in.
pub fn http_client(config: &ApiConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert("x-rapidapi-host", HeaderValue::from_static(API_HOST));
    let mut key = HeaderValue::from_str(&config.api_key).context("api key is not a valid header")?;
    key.set_sensitive(true);
    headers.insert("x-rapidapi-key", key);
    headers.insert(USER_AGENT, HeaderValue::from_static("cricbuzz_terminal/0.1"));

    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}
