//! Cricbuzz API access.
//!
//! Every public call degrades instead of failing: errors become notices and
//! the caller gets an empty list, `None`, or an empty table. Results, degraded
//! or not, are cached per argument tuple for the call's time-to-live.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::http_client::API_HOST;
use crate::models::{MatchInfo, PlayerHit, Scorecard, StatTable, StatType};
use crate::notice::{Notice, NoticeBoard};
use crate::parsing::{
    has_scorecard, parse_live_matches, parse_player_search, parse_scorecard, parse_stat_table,
};
use crate::ttl_cache::{Clock, SystemClock, TtlCache};

pub const LIVE_MATCHES_TTL: Duration = Duration::from_secs(60);
pub const SCORECARD_TTL: Duration = Duration::from_secs(30);
pub const PLAYER_SEARCH_TTL: Duration = Duration::from_secs(3600);
pub const PLAYER_STATS_TTL: Duration = Duration::from_secs(3600);

pub const SCORECARD_RETRY_DELAY: Duration = Duration::from_secs(10);
const MAX_SCORECARD_RETRIES: u32 = 1;

/// Performs one GET and returns the decoded JSON body.
pub trait Transport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: format!("https://{API_HOST}"),
        }
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).query(query).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

pub struct CricbuzzClient<T = HttpTransport> {
    transport: T,
    clock: Box<dyn Clock>,
    retry_delay: Duration,
    live: TtlCache<(), Vec<MatchInfo>>,
    scorecards: TtlCache<i64, Option<Scorecard>>,
    searches: TtlCache<String, Vec<PlayerHit>>,
    stats: TtlCache<(String, StatType), StatTable>,
    notices: NoticeBoard,
}

impl CricbuzzClient<HttpTransport> {
    pub fn from_http(client: Client) -> Self {
        Self::new(HttpTransport::new(client), Box::new(SystemClock))
    }
}

impl<T: Transport> CricbuzzClient<T> {
    pub fn new(transport: T, clock: Box<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            retry_delay: SCORECARD_RETRY_DELAY,
            live: TtlCache::new(LIVE_MATCHES_TTL),
            scorecards: TtlCache::new(SCORECARD_TTL),
            searches: TtlCache::new(PLAYER_SEARCH_TTL),
            stats: TtlCache::new(PLAYER_STATS_TTL),
            notices: NoticeBoard::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn live_matches(&mut self) -> Vec<MatchInfo> {
        let Self {
            transport,
            clock,
            live,
            notices,
            ..
        } = self;
        live.get_or_insert_with((), &**clock, || {
            fetch_live_matches(transport, notices)
        })
    }

    /// `None` when the fetch failed or the match has no innings yet.
    pub fn scorecard(&mut self, match_id: i64) -> Option<Scorecard> {
        let retry_delay = self.retry_delay;
        let Self {
            transport,
            clock,
            scorecards,
            notices,
            ..
        } = self;
        scorecards.get_or_insert_with(match_id, &**clock, || {
            fetch_scorecard(transport, &**clock, notices, match_id, retry_delay)
        })
    }

    pub fn search_players(&mut self, name: &str) -> Vec<PlayerHit> {
        let Self {
            transport,
            clock,
            searches,
            notices,
            ..
        } = self;
        searches.get_or_insert_with(name.to_string(), &**clock, || {
            match transport.get_json("/stats/v1/player/search", &[("plrN", name)]) {
                Ok(root) => parse_player_search(&root),
                Err(err) => {
                    notices.push(Notice::error(format!("Player search error: {err}")));
                    Vec::new()
                }
            }
        })
    }

    pub fn player_stats(&mut self, player_id: &str, stat_type: StatType) -> StatTable {
        let Self {
            transport,
            clock,
            stats,
            notices,
            ..
        } = self;
        let key = (player_id.to_string(), stat_type);
        stats.get_or_insert_with(key, &**clock, || {
            let kind = stat_type.as_path();
            let path = format!("/stats/v1/player/{player_id}/{kind}");
            match transport.get_json(&path, &[]).and_then(|root| parse_stat_table(&root)) {
                Ok(table) => table,
                Err(err) => {
                    notices.push(Notice::error(format!("Error fetching {kind} stats: {err}")));
                    StatTable::default()
                }
            }
        })
    }

    /// Drops every cached response, including cached failures.
    pub fn clear_cache(&mut self) {
        self.live.clear();
        self.scorecards.clear();
        self.searches.clear();
        self.stats.clear();
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}

fn fetch_live_matches<T: Transport>(transport: &T, notices: &mut NoticeBoard) -> Vec<MatchInfo> {
    let result = transport
        .get_json("/matches/v1/live", &[])
        .and_then(|root| parse_live_matches(&root));
    match result {
        Ok(matches) => matches,
        Err(ApiError::RateLimited) => {
            notices.push(Notice::warn("API rate limit reached. Please wait a minute."));
            Vec::new()
        }
        Err(err @ ApiError::Http { .. }) => {
            notices.push(Notice::error(format!("API Error fetching live matches: {err}")));
            Vec::new()
        }
        Err(err) => {
            notices.push(Notice::error(format!("An unexpected error occurred: {err}")));
            Vec::new()
        }
    }
}

/// Retries a rate-limited request at most `MAX_SCORECARD_RETRIES` times,
/// then reports the rate limit like any other failure.
fn fetch_scorecard<T: Transport>(
    transport: &T,
    clock: &dyn Clock,
    notices: &mut NoticeBoard,
    match_id: i64,
    retry_delay: Duration,
) -> Option<Scorecard> {
    let path = format!("/mcenter/v1/{match_id}/hscard");
    let mut retries = 0;
    let result = loop {
        match transport.get_json(&path, &[]) {
            Err(ApiError::RateLimited) if retries < MAX_SCORECARD_RETRIES => {
                notices.push(Notice::warn(format!(
                    "API rate limit reached. Retrying in {}s...",
                    retry_delay.as_secs()
                )));
                clock.sleep(retry_delay);
                retries += 1;
            }
            other => break other,
        }
    };

    match result {
        Ok(root) if has_scorecard(&root) => Some(parse_scorecard(&root, match_id)),
        Ok(_) => None,
        Err(ApiError::RateLimited) => {
            notices.push(Notice::error(format!(
                "API rate limit still reached for scorecard {match_id} after {retries} retry"
            )));
            None
        }
        Err(err @ ApiError::Http { .. }) => {
            notices.push(Notice::error(format!("API Error fetching scorecard: {err}")));
            None
        }
        Err(err) => {
            notices.push(Notice::error(format!("An unexpected error occurred: {err}")));
            None
        }
    }
}
