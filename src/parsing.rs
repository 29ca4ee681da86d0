use serde_json::Value;

use crate::error::ApiError;
use crate::models::{
    BattingRow, BowlingRow, FallOfWicketRow, InningsSummary, MatchInfo, PlayerHit, Scalar,
    Scorecard, StatRow, StatTable,
};

const UNKNOWN_TEAM: &str = "TBC";
const UNKNOWN_VENUE: &str = "Unknown";
const UNKNOWN_FIELD: &str = "N/A";
const UNKNOWN_STATUS: &str = "No status";

pub fn parse_live_matches_json(raw: &str) -> Result<Vec<MatchInfo>, ApiError> {
    let root = parse_root(raw)?;
    parse_live_matches(&root)
}

/// Flattens `typeMatches -> seriesMatches -> seriesAdWrapper -> matches -> matchInfo`.
///
/// Entries without a `matchInfo` block are skipped; a block without
/// `matchId` or `matchDesc` makes the whole payload malformed.
pub fn parse_live_matches(root: &Value) -> Result<Vec<MatchInfo>, ApiError> {
    let mut matches = Vec::new();

    for type_group in array_at(root, "typeMatches") {
        for series in array_at(type_group, "seriesMatches") {
            let Some(wrapper) = series.get("seriesAdWrapper") else {
                continue;
            };
            for entry in array_at(wrapper, "matches") {
                let Some(info) = entry
                    .get("matchInfo")
                    .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
                else {
                    continue;
                };
                matches.push(parse_match_info(info)?);
            }
        }
    }

    Ok(matches)
}

fn parse_match_info(info: &Value) -> Result<MatchInfo, ApiError> {
    let id = info
        .get("matchId")
        .and_then(as_i64_any)
        .ok_or_else(|| ApiError::Decode("matchInfo without matchId".to_string()))?;
    let name = info
        .get("matchDesc")
        .and_then(as_string)
        .ok_or_else(|| ApiError::Decode(format!("match {id} without matchDesc")))?;

    Ok(MatchInfo {
        id,
        name,
        series: string_or(info.get("seriesName"), UNKNOWN_FIELD),
        team1: string_or(info.get("team1").and_then(|t| t.get("teamName")), UNKNOWN_TEAM),
        team2: string_or(info.get("team2").and_then(|t| t.get("teamName")), UNKNOWN_TEAM),
        venue: string_or(info.get("venueInfo").and_then(|v| v.get("ground")), UNKNOWN_VENUE),
        state: string_or(info.get("state"), UNKNOWN_FIELD),
        status: string_or(info.get("status"), UNKNOWN_STATUS),
    })
}

/// True when the payload carries at least one innings block.
pub fn has_scorecard(root: &Value) -> bool {
    root.get("scorecard")
        .and_then(Value::as_array)
        .is_some_and(|innings| !innings.is_empty())
}

pub fn parse_scorecard_json(raw: &str, match_id: i64) -> Result<Scorecard, ApiError> {
    let root = parse_root(raw)?;
    Ok(parse_scorecard(&root, match_id))
}

/// Projects every innings block into the batting, bowling, fall-of-wicket and
/// summary tables. Cells keep the value the feed sent and absent fields are
/// `None`; each table is deduplicated by whole-row equality, first occurrence wins.
pub fn parse_scorecard(root: &Value, match_id: i64) -> Scorecard {
    let mut batting = Vec::new();
    let mut bowling = Vec::new();
    let mut fall_of_wickets = Vec::new();
    let mut summary = Vec::new();

    for innings in array_at(root, "scorecard") {
        let team = innings.get("batteamname").and_then(as_string);
        let innings_id = innings.get("inningsid").and_then(raw_scalar);

        for b in array_at(innings, "batsman") {
            batting.push(BattingRow {
                innings: innings_id.clone(),
                team: team.clone(),
                name: b.get("name").and_then(as_string),
                runs: b.get("runs").and_then(raw_scalar),
                balls: b.get("balls").and_then(raw_scalar),
                fours: b.get("fours").and_then(raw_scalar),
                sixes: b.get("sixes").and_then(raw_scalar),
                strike_rate: b.get("strkrate").and_then(raw_scalar),
                dismissal: b.get("outdec").and_then(as_string),
            });
        }

        for bw in array_at(innings, "bowler") {
            bowling.push(BowlingRow {
                innings: innings_id.clone(),
                team: team.clone(),
                name: bw.get("name").and_then(as_string),
                overs: bw.get("overs").and_then(raw_scalar),
                runs: bw.get("runs").and_then(raw_scalar),
                wickets: bw.get("wickets").and_then(raw_scalar),
                economy: bw.get("economy").and_then(raw_scalar),
            });
        }

        let fow = innings.get("fow").unwrap_or(&Value::Null);
        for f in array_at(fow, "fow") {
            fall_of_wickets.push(FallOfWicketRow {
                innings: innings_id.clone(),
                team: team.clone(),
                batsman: f.get("batsmanname").and_then(as_string),
                score_at_fall: f.get("runs").and_then(raw_scalar),
                over: f.get("overnbr").and_then(raw_scalar),
            });
        }

        let extras = innings.get("extras").unwrap_or(&Value::Null);
        summary.push(InningsSummary {
            match_id,
            innings_id,
            team,
            score: innings.get("score").and_then(raw_scalar),
            wickets: innings.get("wickets").and_then(raw_scalar),
            overs: innings.get("overs").and_then(raw_scalar),
            run_rate: innings.get("runrate").and_then(raw_scalar),
            extras: count_or_zero(extras, "total"),
            byes: count_or_zero(extras, "byes"),
            leg_byes: count_or_zero(extras, "legbyes"),
            wides: count_or_zero(extras, "wides"),
            no_balls: count_or_zero(extras, "noballs"),
        });
    }

    Scorecard {
        batting: dedup_rows(batting),
        bowling: dedup_rows(bowling),
        fall_of_wickets: dedup_rows(fall_of_wickets),
        summary: dedup_rows(summary),
    }
}

pub fn parse_player_search(root: &Value) -> Vec<PlayerHit> {
    array_at(root, "player")
        .iter()
        .filter_map(|p| {
            let id = p.get("id").and_then(as_string)?;
            let name = p.get("name").and_then(as_string).unwrap_or_default();
            let team = p
                .get("teamName")
                .and_then(as_string)
                .or_else(|| p.get("country").and_then(as_string))
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string());
            Some(PlayerHit { id, name, team })
        })
        .collect()
}

/// Builds a table from `headers` plus `values[].values`.
///
/// Missing headers or rows give an empty table. Rows that do not match the
/// header width are a decode error.
pub fn parse_stat_table(root: &Value) -> Result<StatTable, ApiError> {
    let columns: Vec<String> = array_at(root, "headers")
        .iter()
        .map(cell_to_string)
        .collect();
    let raw_rows = array_at(root, "values");
    if columns.is_empty() || raw_rows.is_empty() {
        return Ok(StatTable::default());
    }

    let mut rows = Vec::new();
    for raw in raw_rows {
        let Some(values) = raw.get("values") else {
            continue;
        };
        let mut cells: Vec<String> = values
            .as_array()
            .map(|v| v.iter().map(cell_to_string).collect())
            .unwrap_or_default();
        if cells.len() != columns.len() {
            return Err(ApiError::Decode(format!(
                "{} columns passed, row had {}",
                columns.len(),
                cells.len()
            )));
        }
        let key = cells.remove(0);
        rows.push(StatRow { key, cells });
    }

    Ok(StatTable { columns, rows })
}

fn parse_root(raw: &str) -> Result<Value, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(trimmed)?)
}

fn dedup_rows<T: PartialEq>(rows: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        if !out.contains(&row) {
            out.push(row);
        }
    }
    out
}

fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn count_or_zero(value: &Value, key: &str) -> Scalar {
    value
        .get(key)
        .and_then(raw_scalar)
        .unwrap_or_else(|| Scalar::from(0))
}

fn raw_scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(Scalar::Number(n.clone())),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        other => Some(Scalar::Text(other.to_string())),
    }
}

fn string_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(as_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn as_i64_any(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 {
            return Some(f as i64);
        }
        return None;
    }
    value.as_str()?.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(as_i64_any(&json!("42")), Some(42));
        assert_eq!(as_i64_any(&json!(42.0)), Some(42));
        assert_eq!(as_i64_any(&json!(4.5)), None);
        assert_eq!(raw_scalar(&json!("131.25")).and_then(|s| s.as_f64()), Some(131.25));
        assert_eq!(raw_scalar(&json!(null)), None);
    }

    #[test]
    fn non_numeric_cells_keep_source_text() {
        assert_eq!(raw_scalar(&json!("45*")), Some(Scalar::from("45*")));
        assert_eq!(raw_scalar(&json!("NaN")).and_then(|s| s.as_f64()), None);
        assert_eq!(Scalar::from("DNB").decimal(), "DNB");
        assert_eq!(Scalar::from("88.2").decimal(), "88.20");
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_rows(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn null_team_falls_back_to_tbc() {
        let root = json!({
            "typeMatches": [{ "seriesMatches": [{ "seriesAdWrapper": { "matches": [
                { "matchInfo": { "matchId": 7, "matchDesc": "1st T20I", "team1": { "teamName": null } } }
            ]}}]}]
        });
        let matches = parse_live_matches(&root).expect("valid");
        assert_eq!(matches[0].team1, "TBC");
        assert_eq!(matches[0].venue, "Unknown");
    }

    #[test]
    fn empty_body_parses_to_no_matches() {
        assert!(parse_live_matches_json("  ").expect("empty").is_empty());
    }
}
