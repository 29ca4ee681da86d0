mod common;

use std::time::Duration;

use serde_json::json;

use cricbuzz_terminal::cricbuzz_api::{
    LIVE_MATCHES_TTL, PLAYER_SEARCH_TTL, SCORECARD_RETRY_DELAY, SCORECARD_TTL,
};
use cricbuzz_terminal::error::ApiError;
use cricbuzz_terminal::models::StatType;
use cricbuzz_terminal::notice::NoticeLevel;

use common::{fixture_json, scripted_client};

const LIVE: &str = "/matches/v1/live";
const SCORECARD_101: &str = "/mcenter/v1/101/hscard";

#[test]
fn rate_limited_live_matches_degrade_to_empty() {
    let (mut client, _clock) = scripted_client();
    client.transport().push(LIVE, Err(ApiError::RateLimited));

    let matches = client.live_matches();

    assert!(matches.is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warn);
    assert_eq!(notices[0].message, "API rate limit reached. Please wait a minute.");
}

#[test]
fn live_matches_http_error_is_reported() {
    let (mut client, _clock) = scripted_client();
    client.transport().push(
        LIVE,
        Err(ApiError::Http {
            status: 503,
            body: "upstream down".to_string(),
        }),
    );

    assert!(client.live_matches().is_empty());
    let notices = client.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("API Error fetching live matches"));
    assert!(notices[0].message.contains("503"));
}

#[test]
fn live_matches_are_cached_for_their_ttl() {
    let (mut client, clock) = scripted_client();
    let payload = fixture_json("live_matches.json");
    client.transport().push(LIVE, Ok(payload.clone()));
    client.transport().push(LIVE, Ok(payload));

    assert_eq!(client.live_matches().len(), 3);
    clock.advance(LIVE_MATCHES_TTL - Duration::from_secs(1));
    assert_eq!(client.live_matches().len(), 3);
    assert_eq!(client.transport().request_count(LIVE), 1);

    clock.advance(Duration::from_secs(1));
    assert_eq!(client.live_matches().len(), 3);
    assert_eq!(client.transport().request_count(LIVE), 2);
}

#[test]
fn cached_failure_is_replayed_until_expiry() {
    let (mut client, clock) = scripted_client();
    client.transport().push(LIVE, Err(ApiError::RateLimited));
    client.transport().push(LIVE, Ok(fixture_json("live_matches.json")));

    assert!(client.live_matches().is_empty());
    clock.advance(Duration::from_secs(30));
    assert!(client.live_matches().is_empty());
    assert_eq!(client.transport().request_count(LIVE), 1);

    clock.advance(Duration::from_secs(30));
    assert_eq!(client.live_matches().len(), 3);
}

#[test]
fn scorecard_retries_once_after_rate_limit() {
    let (mut client, clock) = scripted_client();
    client.transport().push(SCORECARD_101, Err(ApiError::RateLimited));
    client.transport().push(SCORECARD_101, Ok(fixture_json("scorecard.json")));

    let card = client.scorecard(101).expect("second attempt should succeed");

    assert_eq!(card.summary.len(), 2);
    assert_eq!(client.transport().request_count(SCORECARD_101), 2);
    assert_eq!(clock.slept(), SCORECARD_RETRY_DELAY);
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warn);
    assert_eq!(notices[0].message, "API rate limit reached. Retrying in 10s...");
}

#[test]
fn scorecard_gives_up_after_second_rate_limit() {
    let (mut client, clock) = scripted_client();
    client.transport().push(SCORECARD_101, Err(ApiError::RateLimited));
    client.transport().push(SCORECARD_101, Err(ApiError::RateLimited));
    client.transport().push(SCORECARD_101, Ok(fixture_json("scorecard.json")));

    assert_eq!(client.scorecard(101), None);
    assert_eq!(client.transport().request_count(SCORECARD_101), 2);
    assert_eq!(clock.slept(), SCORECARD_RETRY_DELAY);

    let notices = client.take_notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[1].level, NoticeLevel::Error);
    assert!(notices[1].message.contains("scorecard 101"));
}

#[test]
fn failed_scorecard_is_cached_then_refetched() {
    let (mut client, clock) = scripted_client();
    client.transport().push(SCORECARD_101, Err(ApiError::RateLimited));
    client.transport().push(SCORECARD_101, Err(ApiError::RateLimited));
    client.transport().push(SCORECARD_101, Ok(fixture_json("scorecard.json")));

    assert_eq!(client.scorecard(101), None);
    clock.advance(SCORECARD_TTL - Duration::from_secs(1));
    assert_eq!(client.scorecard(101), None);
    assert_eq!(client.transport().request_count(SCORECARD_101), 2);

    clock.advance(Duration::from_secs(1));
    assert!(client.scorecard(101).is_some());
    assert_eq!(client.transport().request_count(SCORECARD_101), 3);
}

#[test]
fn scorecard_without_innings_is_none_without_notice() {
    let (mut client, _clock) = scripted_client();
    client
        .transport()
        .push(SCORECARD_101, Ok(json!({ "scorecard": [], "status": "Toss delayed" })));

    assert_eq!(client.scorecard(101), None);
    assert!(client.take_notices().is_empty());
}

#[test]
fn scorecard_cache_is_per_match() {
    let (mut client, _clock) = scripted_client();
    client.transport().push(SCORECARD_101, Ok(fixture_json("scorecard.json")));
    client
        .transport()
        .push("/mcenter/v1/102/hscard", Ok(json!({ "scorecard": [] })));

    assert!(client.scorecard(101).is_some());
    assert!(client.scorecard(102).is_none());
    assert!(client.scorecard(101).is_some());
    assert_eq!(client.transport().requests().len(), 2);
}

#[test]
fn player_search_is_cached_per_name() {
    let (mut client, clock) = scripted_client();
    let path = "/stats/v1/player/search?plrN=virat";
    client.transport().push(path, Ok(fixture_json("player_search.json")));
    client.transport().push(path, Ok(fixture_json("player_search.json")));

    assert_eq!(client.search_players("virat").len(), 3);
    assert_eq!(client.search_players("virat").len(), 3);
    assert_eq!(client.transport().request_count(path), 1);

    clock.advance(PLAYER_SEARCH_TTL);
    assert_eq!(client.search_players("virat").len(), 3);
    assert_eq!(client.transport().request_count(path), 2);
}

#[test]
fn player_search_error_becomes_notice() {
    let (mut client, _clock) = scripted_client();

    assert!(client.search_players("nobody").is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("Player search error:"));
}

#[test]
fn player_stats_are_cached_per_player_and_kind() {
    let (mut client, _clock) = scripted_client();
    let batting = "/stats/v1/player/1413/batting";
    client.transport().push(batting, Ok(fixture_json("player_batting.json")));

    let table = client.player_stats("1413", StatType::Batting);
    assert_eq!(table.cell("Runs", "Test"), Some("8848"));
    assert_eq!(client.player_stats("1413", StatType::Batting), table);
    assert_eq!(client.transport().request_count(batting), 1);

    let bowling = client.player_stats("1413", StatType::Bowling);
    assert!(bowling.is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("Error fetching bowling stats:"));
}

#[test]
fn clear_cache_forces_refetch() {
    let (mut client, _clock) = scripted_client();
    client.transport().push(LIVE, Ok(fixture_json("live_matches.json")));
    client.transport().push(LIVE, Ok(json!({ "typeMatches": [] })));

    assert_eq!(client.live_matches().len(), 3);
    client.clear_cache();
    assert!(client.live_matches().is_empty());
    assert_eq!(client.transport().request_count(LIVE), 2);
}

#[test]
fn scorecard_http_error_gives_none_and_notice() {
    let (mut client, clock) = scripted_client();
    client.transport().push(
        SCORECARD_101,
        Err(ApiError::Http {
            status: 500,
            body: "boom".to_string(),
        }),
    );

    assert_eq!(client.scorecard(101), None);
    assert_eq!(client.transport().request_count(SCORECARD_101), 1);
    assert_eq!(clock.slept(), Duration::ZERO);
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("API Error fetching scorecard"));
    assert!(notices[0].message.contains("500"));
}

#[test]
fn scorecard_transport_failure_gives_none_and_notice() {
    let (mut client, _clock) = scripted_client();

    assert_eq!(client.scorecard(101), None);
    assert_eq!(client.transport().request_count(SCORECARD_101), 1);
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("An unexpected error occurred"));
}

#[test]
fn scorecard_decode_failure_gives_none_and_notice() {
    let (mut client, _clock) = scripted_client();
    client
        .transport()
        .push(SCORECARD_101, Err(ApiError::Decode("expected value".to_string())));

    assert_eq!(client.scorecard(101), None);
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("An unexpected error occurred"));
}

#[test]
fn malformed_match_list_degrades_to_empty() {
    let (mut client, _clock) = scripted_client();
    client.transport().push(
        LIVE,
        Ok(json!({
            "typeMatches": [{ "seriesMatches": [{ "seriesAdWrapper": { "matches": [
                { "matchInfo": { "matchId": 1, "matchDesc": "1st Test" } },
                { "matchInfo": { "matchId": 2, "seriesName": "Ashes" } }
            ]}}]}]
        })),
    );

    assert!(client.live_matches().is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("An unexpected error occurred"));
    assert!(notices[0].message.contains("matchDesc"));
}

#[test]
fn live_matches_transport_failure_is_reported() {
    let (mut client, _clock) = scripted_client();

    assert!(client.live_matches().is_empty());
    let notices = client.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("An unexpected error occurred"));
}
