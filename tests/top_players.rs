use cricbuzz_terminal::db::sqlite::SqliteBackend;
use cricbuzz_terminal::db::top_players::{self, NewTopPlayer, StatUpdate, TopPlayerRow};
use cricbuzz_terminal::db::{Database, SqlValue};
use cricbuzz_terminal::error::DbError;
use cricbuzz_terminal::notice::NoticeLevel;

fn memory_db() -> Database {
    let backend = SqliteBackend::in_memory().expect("in-memory sqlite should open");
    Database::new(Box::new(backend))
}

fn player(player_id: i64, name: &str, runs: i64, average: f64) -> NewTopPlayer {
    NewTopPlayer {
        player_id,
        name: name.to_string(),
        matches_played: 10,
        innings_batted: 10,
        runs,
        average,
        hundred: 1,
    }
}

#[test]
fn insert_adds_exactly_one_row() {
    let mut db = memory_db();
    top_players::insert(&mut db, &player(9001, "Test Player", 500, 50.0)).expect("insert");

    let table = top_players::list(&mut db);
    assert_eq!(table.len(), 1);
    let row = TopPlayerRow::from_table(&table, 0).expect("typed row");
    assert_eq!(row.player_id, 9001);
    assert_eq!(row.name, "Test Player");
    assert_eq!(row.runs, 500);

    let notices = db.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, "Player 'Test Player' added successfully!");
}

#[test]
fn blank_name_is_not_written() {
    let mut db = memory_db();
    let err = top_players::insert(&mut db, &player(1, "  ", 0, 0.0)).expect_err("blank name");

    assert_eq!(err, DbError::Validation("Player name is required!".to_string()));
    assert!(top_players::list(&mut db).is_empty());
    assert_eq!(db.take_notices()[0].message, "Player name is required!");
}

#[test]
fn duplicate_player_id_rolls_back() {
    let mut db = memory_db();
    top_players::insert(&mut db, &player(7, "First", 100, 25.0)).expect("first insert");
    db.take_notices();

    assert!(top_players::insert(&mut db, &player(7, "Second", 200, 40.0)).is_err());
    let table = top_players::list(&mut db);
    assert_eq!(table.len(), 1);
    assert_eq!(TopPlayerRow::from_table(&table, 0).map(|r| r.name), Some("First".to_string()));
    assert!(db.take_notices()[0].message.starts_with("Insert failed:"));
}

#[test]
fn update_changes_only_stat_columns() {
    let mut db = memory_db();
    top_players::insert(&mut db, &player(18, "Virat Kohli", 12000, 57.3)).expect("insert");

    let update = StatUpdate {
        runs: 13906,
        average: 58.18,
        hundred: 50,
    };
    let affected = top_players::update_stats(&mut db, 18, "Virat Kohli", update).expect("update");
    assert_eq!(affected, 1);

    let row = TopPlayerRow::from_table(&top_players::list(&mut db), 0).expect("row");
    assert_eq!(row.runs, 13906);
    assert_eq!(row.hundred, 50);
    assert!((row.average - 58.18).abs() < 1e-9);
    assert_eq!(row.name, "Virat Kohli");
}

#[test]
fn deleting_absent_id_is_a_no_op() {
    let mut db = memory_db();
    top_players::insert(&mut db, &player(1, "Keep Me", 10, 1.0)).expect("insert");

    assert_eq!(top_players::delete(&mut db, 424242, "Ghost"), Ok(0));
    assert_eq!(top_players::list(&mut db).len(), 1);
}

#[test]
fn delete_removes_the_row() {
    let mut db = memory_db();
    top_players::insert(&mut db, &player(1, "Gone Soon", 10, 1.0)).expect("insert");

    assert_eq!(top_players::delete(&mut db, 1, "Gone Soon"), Ok(1));
    assert!(top_players::list(&mut db).is_empty());
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let mut db = memory_db();
    for (id, name) in [(1, "Virat Kohli"), (2, "Rohit Sharma"), (3, "Virender Sehwag")] {
        top_players::insert(&mut db, &player(id, name, 1000, 40.0)).expect("insert");
    }

    let all = top_players::list(&mut db);
    let hits = top_players::filter_by_name(&all, "VIR");
    assert_eq!(hits.len(), 2);
    assert_eq!(top_players::filter_by_name(&all, "  ").len(), 3);
    assert!(top_players::filter_by_name(&all, "dhoni").is_empty());
}

#[test]
fn leaderboard_ranks_by_column_descending() {
    let mut db = memory_db();
    for id in 1..=12 {
        let p = player(id, &format!("Player {id}"), id * 100, 60.0 - id as f64);
        top_players::insert(&mut db, &p).expect("insert");
    }
    let table = top_players::list(&mut db);

    let by_runs = top_players::leaderboard(&table, "runs");
    assert_eq!(by_runs.len(), top_players::LEADERBOARD_SIZE);
    assert_eq!(by_runs[0], ("Player 12".to_string(), 1200.0));

    let by_average = top_players::leaderboard(&table, "average");
    assert_eq!(by_average[0].0, "Player 1");
}

#[test]
fn reads_degrade_when_database_is_unavailable() {
    let mut db = Database::unavailable();
    assert!(top_players::list(&mut db).is_empty());
    assert_eq!(
        top_players::insert(&mut db, &player(1, "Nobody", 0, 0.0)),
        Err(DbError::Unavailable)
    );
    assert!(db.run_query("SELECT $1", &[SqlValue::Int(1)]).is_empty());
}
