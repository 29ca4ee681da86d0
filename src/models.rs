use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of the live match feed, flattened out of its series grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub id: i64,
    pub name: String,
    pub series: String,
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub state: String,
    pub status: String,
}

impl MatchInfo {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.series)
    }
}

/// A scorecard value exactly as the feed sent it.
///
/// Rows compare on this raw form, so `"45*"` and `"DNB"` stay distinct and
/// `"NaN"` equals itself. Numeric readings are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Finite numeric reading; `"NaN"` and `"inf"` read as `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|f| f.is_finite())
    }

    /// Two decimal places when numeric, the source text otherwise.
    pub fn decimal(&self) -> String {
        match self.as_f64() {
            Some(v) => format!("{v:.2}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingRow {
    pub innings: Option<Scalar>,
    pub team: Option<String>,
    pub name: Option<String>,
    pub runs: Option<Scalar>,
    pub balls: Option<Scalar>,
    pub fours: Option<Scalar>,
    pub sixes: Option<Scalar>,
    pub strike_rate: Option<Scalar>,
    pub dismissal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingRow {
    pub innings: Option<Scalar>,
    pub team: Option<String>,
    pub name: Option<String>,
    pub overs: Option<Scalar>,
    pub runs: Option<Scalar>,
    pub wickets: Option<Scalar>,
    pub economy: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicketRow {
    pub innings: Option<Scalar>,
    pub team: Option<String>,
    pub batsman: Option<String>,
    pub score_at_fall: Option<Scalar>,
    pub over: Option<Scalar>,
}

/// Extras counts default to `0` when the block or key is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub match_id: i64,
    pub innings_id: Option<Scalar>,
    pub team: Option<String>,
    pub score: Option<Scalar>,
    pub wickets: Option<Scalar>,
    pub overs: Option<Scalar>,
    pub run_rate: Option<Scalar>,
    pub extras: Scalar,
    pub byes: Scalar,
    pub leg_byes: Scalar,
    pub wides: Scalar,
    pub no_balls: Scalar,
}

/// The four tables projected out of one scorecard payload.
///
/// Each vector is deduplicated and its position is the row index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scorecard {
    pub batting: Vec<BattingRow>,
    pub bowling: Vec<BowlingRow>,
    pub fall_of_wickets: Vec<FallOfWicketRow>,
    pub summary: Vec<InningsSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHit {
    pub id: String,
    pub name: String,
    pub team: String,
}

impl PlayerHit {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    Batting,
    Bowling,
}

impl StatType {
    pub fn as_path(self) -> &'static str {
        match self {
            StatType::Batting => "batting",
            StatType::Bowling => "bowling",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatRow {
    pub key: String,
    pub cells: Vec<String>,
}

/// Player career table whose columns come from the response headers.
///
/// `columns[0]` names the row key; `cells` holds the remaining columns in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatTable {
    pub columns: Vec<String>,
    pub rows: Vec<StatRow>,
}

impl StatTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn key_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn value_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    /// Looks up one cell by row key and column name.
    pub fn cell(&self, key: &str, column: &str) -> Option<&str> {
        let col = self.value_columns().iter().position(|c| c == column)?;
        let row = self.rows.iter().find(|r| r.key == key)?;
        row.cells.get(col).map(String::as_str)
    }
}
