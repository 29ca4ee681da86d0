//! Record management for the `top_players` table.

use tracing::info;

use super::{Database, SqlValue, Table};
use crate::error::DbError;
use crate::notice::Notice;

const SELECT_ALL: &str = "SELECT * FROM top_players ORDER BY id";
const INSERT: &str = "INSERT INTO top_players \
    (player_id, name, matches_played, innings_batted, runs, average, hundred) \
    VALUES ($1, $2, $3, $4, $5, $6, $7)";
const UPDATE_STATS: &str =
    "UPDATE top_players SET runs = $1, average = $2, hundred = $3 WHERE player_id = $4";
const DELETE: &str = "DELETE FROM top_players WHERE player_id = $1";

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct NewTopPlayer {
    pub player_id: i64,
    pub name: String,
    pub matches_played: i64,
    pub innings_batted: i64,
    pub runs: i64,
    pub average: f64,
    pub hundred: i64,
}

impl NewTopPlayer {
    pub fn validate(&self) -> Result<(), DbError> {
        if self.name.trim().is_empty() {
            return Err(DbError::Validation("Player name is required!".to_string()));
        }
        if self.player_id < 1 {
            return Err(DbError::Validation("Player ID must be at least 1".to_string()));
        }
        let counters = [
            ("Matches Played", self.matches_played),
            ("Innings Batted", self.innings_batted),
            ("Runs", self.runs),
            ("Hundreds", self.hundred),
        ];
        if let Some((label, _)) = counters.iter().find(|(_, v)| *v < 0) {
            return Err(DbError::Validation(format!("{label} cannot be negative")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatUpdate {
    pub runs: i64,
    pub average: f64,
    pub hundred: i64,
}

/// One row of the table in typed form, as used to prefill the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPlayerRow {
    pub player_id: i64,
    pub name: String,
    pub runs: i64,
    pub average: f64,
    pub hundred: i64,
}

impl TopPlayerRow {
    pub fn from_table(table: &Table, row: usize) -> Option<Self> {
        Some(Self {
            player_id: table.value(row, "player_id")?.as_i64()?,
            name: table
                .value(row, "name")
                .map(|c| c.to_string())
                .unwrap_or_default(),
            runs: table.value(row, "runs").and_then(|c| c.as_i64()).unwrap_or(0),
            average: table.value(row, "average").and_then(|c| c.as_f64()).unwrap_or(0.0),
            hundred: table.value(row, "hundred").and_then(|c| c.as_i64()).unwrap_or(0),
        })
    }
}

pub fn list(db: &mut Database) -> Table {
    db.run_query(SELECT_ALL, &[])
}

/// Case-insensitive name filter over a full [`list`] read. A blank needle keeps every row.
pub fn filter_by_name(table: &Table, needle: &str) -> Table {
    let needle = needle.trim();
    if needle.is_empty() {
        return table.clone();
    }
    table.filter_contains("name", needle)
}

pub fn insert(db: &mut Database, player: &NewTopPlayer) -> Result<(), DbError> {
    let result = player.validate().and_then(|()| {
        db.execute(
            INSERT,
            &[
                SqlValue::Int(player.player_id),
                SqlValue::Text(player.name.trim().to_string()),
                SqlValue::Int(player.matches_played),
                SqlValue::Int(player.innings_batted),
                SqlValue::Int(player.runs),
                SqlValue::Float(player.average),
                SqlValue::Int(player.hundred),
            ],
        )
    });
    match result {
        Ok(_) => {
            info!(player_id = player.player_id, "top player inserted");
            db.push_notice(Notice::info(format!(
                "Player '{}' added successfully!",
                player.name.trim()
            )));
            Ok(())
        }
        Err(err @ DbError::Validation(_)) => {
            db.push_notice(Notice::error(err.to_string()));
            Err(err)
        }
        Err(err) => {
            db.push_notice(Notice::error(format!("Insert failed: {err}")));
            Err(err)
        }
    }
}

pub fn update_stats(
    db: &mut Database,
    player_id: i64,
    name: &str,
    update: StatUpdate,
) -> Result<u64, DbError> {
    let result = db.execute(
        UPDATE_STATS,
        &[
            SqlValue::Int(update.runs),
            SqlValue::Float(update.average),
            SqlValue::Int(update.hundred),
            SqlValue::Int(player_id),
        ],
    );
    match result {
        Ok(affected) => {
            db.push_notice(Notice::info(format!("Player '{name}' updated successfully.")));
            Ok(affected)
        }
        Err(err) => {
            db.push_notice(Notice::error(format!("Update failed: {err}")));
            Err(err)
        }
    }
}

/// Hard delete. An unknown id affects zero rows and is not an error.
pub fn delete(db: &mut Database, player_id: i64, name: &str) -> Result<u64, DbError> {
    match db.execute(DELETE, &[SqlValue::Int(player_id)]) {
        Ok(affected) => {
            info!(player_id, affected, "top player delete");
            db.push_notice(Notice::info(format!("Player '{name}' deleted successfully!")));
            Ok(affected)
        }
        Err(err) => {
            db.push_notice(Notice::error(format!("Delete failed: {err}")));
            Err(err)
        }
    }
}

pub fn leaderboard(table: &Table, column: &str) -> Vec<(String, f64)> {
    table.top_by("name", column, LEADERBOARD_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTopPlayer {
        NewTopPlayer {
            player_id: 1,
            name: "A".to_string(),
            matches_played: 0,
            innings_batted: 0,
            runs: 0,
            average: 0.0,
            hundred: 0,
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let player = NewTopPlayer {
            name: "   ".to_string(),
            ..sample()
        };
        assert_eq!(
            player.validate(),
            Err(DbError::Validation("Player name is required!".to_string()))
        );
    }

    #[test]
    fn negative_counters_are_rejected() {
        let player = NewTopPlayer {
            hundred: -1,
            ..sample()
        };
        assert!(matches!(player.validate(), Err(DbError::Validation(msg)) if msg.contains("Hundreds")));
        assert!(sample().validate().is_ok());
    }
}
