//! Key handling and page actions for the dashboard.
//!
//! Keys only queue work; `run_pending` performs it so the frontend can paint
//! a busy line before a blocking API call or query starts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::cricbuzz_api::{CricbuzzClient, HttpTransport, Transport};
use crate::db::queries::PRESET_QUERIES;
use crate::db::{Database, top_players};
use crate::models::{PlayerHit, StatType};
use crate::state::{AppState, FormKind, InputMode, PlayerForm, Screen, TopPlayersMode};

pub const DB_REQUIRED: &str = "Database connection is required for this page.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadLive { clear_cache: bool },
    LoadScorecard(i64),
    SearchPlayers(String),
    LoadStats(PlayerHit),
    RunQuery(usize),
    ReloadTopPlayers,
    SubmitForm,
    Delete { player_id: i64, name: String },
    Reconnect,
}

impl Action {
    fn busy_label(&self) -> String {
        match self {
            Action::LoadLive { .. } => "Fetching live matches...".to_string(),
            Action::LoadScorecard(id) => format!("Fetching scorecard for match {id}..."),
            Action::SearchPlayers(name) => format!("Searching for '{name}'..."),
            Action::LoadStats(hit) => format!("Fetching stats for {}...", hit.name),
            Action::RunQuery(idx) => format!("Running Q{}...", idx + 1),
            Action::ReloadTopPlayers => "Loading top players...".to_string(),
            Action::SubmitForm => "Saving player...".to_string(),
            Action::Delete { name, .. } => format!("Deleting {name}..."),
            Action::Reconnect => "Reconnecting to database...".to_string(),
        }
    }
}

pub struct App<T: Transport = HttpTransport> {
    pub state: AppState,
    pub should_quit: bool,
    client: CricbuzzClient<T>,
    db: Database,
    pending: Option<Action>,
}

impl<T: Transport> App<T> {
    pub fn new(client: CricbuzzClient<T>, db: Database, db_label: Option<String>) -> Self {
        let mut state = AppState::new();
        state.db_available = db.is_available();
        state.db_label = db_label;
        let mut app = Self {
            state,
            should_quit: false,
            client,
            db,
            pending: None,
        };
        if app.db.is_available() {
            if let Err(err) = app.db.health_check() {
                app.state
                    .push_log(format!("[WARN] Database health check failed: {err}"));
            }
        }
        app.collect_notices();
        app
    }

    pub fn client(&self) -> &CricbuzzClient<T> {
        &self.client
    }

    pub fn pending(&self) -> Option<&Action> {
        self.pending.as_ref()
    }

    pub fn queue(&mut self, action: Action) {
        self.state.busy = Some(action.busy_label());
        self.pending = Some(action);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.pending.is_some() {
            return;
        }
        match self.state.input_mode {
            InputMode::Normal => self.on_normal_key(key),
            InputMode::PlayerSearch => self.on_search_key(key),
            InputMode::NameFilter => self.on_filter_key(key),
            InputMode::Form => self.on_form_key(key),
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if let TopPlayersMode::ConfirmDelete { player_id, name } = &self.state.top.mode {
            if self.state.screen == Screen::TopPlayers {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        let action = Action::Delete {
                            player_id: *player_id,
                            name: name.clone(),
                        };
                        self.queue(action);
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.state.top.mode = TopPlayersMode::List;
                    }
                    _ => {}
                }
                return;
            }
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('1') => self.switch_screen(Screen::Home),
            KeyCode::Char('2') => self.switch_screen(Screen::Live),
            KeyCode::Char('3') => self.switch_screen(Screen::Players),
            KeyCode::Char('4') => self.switch_screen(Screen::Sql),
            KeyCode::Char('5') => self.switch_screen(Screen::TopPlayers),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            _ => match self.state.screen {
                Screen::Home => {}
                Screen::Live => self.on_live_key(key),
                Screen::Players => self.on_players_key(key),
                Screen::Sql => self.on_sql_key(key),
                Screen::TopPlayers => self.on_top_players_key(key),
            },
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        if self.state.screen == screen {
            return;
        }
        self.state.screen = screen;
        match screen {
            Screen::Live if !self.state.live.loaded => {
                self.queue(Action::LoadLive { clear_cache: false })
            }
            Screen::TopPlayers if self.db.is_available() => self.queue(Action::ReloadTopPlayers),
            _ => {}
        }
    }

    fn on_live_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => match self.state.live.selected_match() {
                Some(m) => {
                    let id = m.id;
                    self.queue(Action::LoadScorecard(id));
                }
                None => self.state.push_log("[INFO] No match selected"),
            },
            KeyCode::Char('r') => self.queue(Action::LoadLive { clear_cache: false }),
            KeyCode::Char('R') => self.queue(Action::LoadLive { clear_cache: true }),
            KeyCode::Tab => {
                if self.state.live.scorecard.is_some() {
                    self.state.live.tab = Some(self.state.live.scorecard_tab().next());
                }
            }
            _ => {}
        }
    }

    fn on_players_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.state.input_mode = InputMode::PlayerSearch;
            }
            KeyCode::Enter => match self.state.players.selected_hit() {
                Some(hit) => {
                    let hit = hit.clone();
                    self.queue(Action::LoadStats(hit));
                }
                None => self.state.push_log("[INFO] Search for a player first"),
            },
            KeyCode::Tab => {
                let next = match self.state.players.stats_tab() {
                    StatType::Batting => StatType::Bowling,
                    StatType::Bowling => StatType::Batting,
                };
                self.state.players.tab = Some(next);
            }
            _ => {}
        }
    }

    fn on_sql_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let idx = self.state.sql.selected;
                self.queue(Action::RunQuery(idx));
            }
            KeyCode::Char('c') => self.queue(Action::Reconnect),
            _ => {}
        }
    }

    fn on_top_players_key(&mut self, key: KeyEvent) {
        if !self.db.is_available() && key.code != KeyCode::Char('c') {
            self.state.push_log(format!("[WARN] {DB_REQUIRED}"));
            return;
        }
        match key.code {
            KeyCode::Char('r') => self.queue(Action::ReloadTopPlayers),
            KeyCode::Char('c') => self.queue(Action::Reconnect),
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.state.input_mode = InputMode::NameFilter;
            }
            KeyCode::Char('a') => {
                self.state.top.mode = TopPlayersMode::Form(PlayerForm::add());
                self.state.input_mode = InputMode::Form;
            }
            KeyCode::Char('e') => match self.state.top.selected_row() {
                Some(row) => {
                    self.state.top.mode = TopPlayersMode::Form(PlayerForm::update(&row));
                    self.state.input_mode = InputMode::Form;
                }
                None => self.state.push_log("[INFO] No player selected"),
            },
            KeyCode::Char('x') | KeyCode::Delete => match self.state.top.selected_row() {
                Some(row) => {
                    self.state.top.mode = TopPlayersMode::ConfirmDelete {
                        player_id: row.player_id,
                        name: row.name,
                    };
                }
                None => self.state.push_log("[INFO] No player selected"),
            },
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.state.input_mode = InputMode::Normal;
                let query = self.state.players.query.trim().to_string();
                if query.is_empty() {
                    self.state.push_log("[INFO] Enter a player name to search");
                } else {
                    self.queue(Action::SearchPlayers(query));
                }
            }
            KeyCode::Backspace => {
                self.state.players.query.pop();
            }
            KeyCode::Char(ch) => self.state.players.query.push(ch),
            _ => {}
        }
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.state.top.filter.clear();
                self.state.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.state.top.filter.pop();
            }
            KeyCode::Char(ch) => self.state.top.filter.push(ch),
            _ => {}
        }
        self.state.clamp_top_selection();
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.queue(Action::SubmitForm);
            return;
        }
        if key.code == KeyCode::Esc {
            self.state.top.mode = TopPlayersMode::List;
            self.state.input_mode = InputMode::Normal;
            return;
        }
        let TopPlayersMode::Form(form) = &mut self.state.top.mode else {
            self.state.input_mode = InputMode::Normal;
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
    }

    /// Runs the queued action, if any, and moves every notice into the log.
    pub fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };
        info!(?action, "running action");
        match action {
            Action::LoadLive { clear_cache } => self.load_live(clear_cache),
            Action::LoadScorecard(match_id) => self.load_scorecard(match_id),
            Action::SearchPlayers(name) => self.search_players(&name),
            Action::LoadStats(hit) => self.load_stats(hit),
            Action::RunQuery(idx) => self.run_query(idx),
            Action::ReloadTopPlayers => self.reload_top_players(),
            Action::SubmitForm => self.submit_form(),
            Action::Delete { player_id, name } => self.delete_player(player_id, &name),
            Action::Reconnect => self.reconnect(),
        }
        self.state.busy = None;
        self.collect_notices();
    }

    fn collect_notices(&mut self) {
        let api = self.client.take_notices();
        self.state.push_notices(api);
        let db = self.db.take_notices();
        self.state.push_notices(db);
    }

    fn load_live(&mut self, clear_cache: bool) {
        if clear_cache {
            self.client.clear_cache();
        }
        let matches = self.client.live_matches();
        if matches.is_empty() {
            self.state.push_log("[INFO] No live matches right now");
        }
        let live = &mut self.state.live;
        if let Some(id) = live.scorecard_for {
            if !matches.iter().any(|m| m.id == id) {
                live.scorecard_for = None;
                live.scorecard = None;
            }
        }
        self.state.set_live_matches(matches, timestamp());
    }

    fn load_scorecard(&mut self, match_id: i64) {
        let scorecard = self.client.scorecard(match_id);
        if scorecard.is_none() {
            self.state
                .push_log("[INFO] Scorecard not available for this match yet");
        }
        let live = &mut self.state.live;
        live.scorecard_for = Some(match_id);
        live.scorecard = scorecard;
        live.tab = None;
    }

    fn search_players(&mut self, name: &str) {
        let hits = self.client.search_players(name);
        if hits.is_empty() {
            self.state.push_log(format!("[INFO] No players found for '{name}'"));
        }
        let players = &mut self.state.players;
        players.hits = hits;
        players.selected = 0;
        players.searched_for = Some(name.to_string());
    }

    fn load_stats(&mut self, hit: PlayerHit) {
        let batting = self.client.player_stats(&hit.id, StatType::Batting);
        let bowling = self.client.player_stats(&hit.id, StatType::Bowling);
        let players = &mut self.state.players;
        players.batting = batting;
        players.bowling = bowling;
        players.stats_for = Some(hit);
    }

    fn run_query(&mut self, idx: usize) {
        let Some(query) = PRESET_QUERIES.get(idx) else {
            return;
        };
        let table = self.db.run_query(query.sql, &[]);
        self.state.sql.ran = Some(idx);
        self.state.sql.result = table;
    }

    fn reload_top_players(&mut self) {
        let table = top_players::list(&mut self.db);
        self.state.set_top_players(table);
    }

    fn submit_form(&mut self) {
        let TopPlayersMode::Form(form) = &self.state.top.mode else {
            return;
        };
        let form = form.clone();
        let saved = match &form.kind {
            FormKind::Add => match form.to_new_player() {
                Ok(player) => top_players::insert(&mut self.db, &player).is_ok(),
                Err(msg) => {
                    self.state.push_log(format!("[ERROR] {msg}"));
                    false
                }
            },
            FormKind::Update { player_id, name } => match form.to_stat_update() {
                Ok(update) => {
                    top_players::update_stats(&mut self.db, *player_id, name, update).is_ok()
                }
                Err(msg) => {
                    self.state.push_log(format!("[ERROR] {msg}"));
                    false
                }
            },
        };
        if saved {
            self.state.top.mode = TopPlayersMode::List;
            self.state.input_mode = InputMode::Normal;
            self.reload_top_players();
        }
    }

    fn delete_player(&mut self, player_id: i64, name: &str) {
        let _ = top_players::delete(&mut self.db, player_id, name);
        self.state.top.mode = TopPlayersMode::List;
        self.reload_top_players();
    }

    fn reconnect(&mut self) {
        if let Err(err) = self.db.reconnect() {
            self.state.push_log(format!("[ERROR] Reconnect failed: {err}"));
        }
        self.state.db_available = self.db.is_available();
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
