use std::collections::VecDeque;

use crate::db::Table;
use crate::db::top_players::{self, NewTopPlayer, StatUpdate, TopPlayerRow};
use crate::models::{MatchInfo, PlayerHit, Scorecard, StatTable, StatType};
use crate::notice::Notice;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Live,
    Players,
    Sql,
    TopPlayers,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Live,
        Screen::Players,
        Screen::Sql,
        Screen::TopPlayers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Live => "Live Match Scores",
            Screen::Players => "Player Statistics",
            Screen::Sql => "SQL Practice",
            Screen::TopPlayers => "Top Players DB (CRUD)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    PlayerSearch,
    NameFilter,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorecardTab {
    Summary,
    Batting,
    Bowling,
    FallOfWickets,
}

impl ScorecardTab {
    pub fn next(self) -> Self {
        match self {
            ScorecardTab::Summary => ScorecardTab::Batting,
            ScorecardTab::Batting => ScorecardTab::Bowling,
            ScorecardTab::Bowling => ScorecardTab::FallOfWickets,
            ScorecardTab::FallOfWickets => ScorecardTab::Summary,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScorecardTab::Summary => "Innings Summary",
            ScorecardTab::Batting => "Batting Details",
            ScorecardTab::Bowling => "Bowling Details",
            ScorecardTab::FallOfWickets => "Fall of Wickets",
        }
    }
}

#[derive(Debug, Default)]
pub struct LiveView {
    pub matches: Vec<MatchInfo>,
    pub selected: usize,
    pub loaded: bool,
    pub updated_at: Option<String>,
    pub scorecard_for: Option<i64>,
    pub scorecard: Option<Scorecard>,
    pub tab: Option<ScorecardTab>,
}

impl LiveView {
    pub fn selected_match(&self) -> Option<&MatchInfo> {
        self.matches.get(self.selected)
    }

    pub fn scorecard_tab(&self) -> ScorecardTab {
        self.tab.unwrap_or(ScorecardTab::Summary)
    }
}

#[derive(Debug, Default)]
pub struct PlayersView {
    pub query: String,
    pub searched_for: Option<String>,
    pub hits: Vec<PlayerHit>,
    pub selected: usize,
    pub stats_for: Option<PlayerHit>,
    pub batting: StatTable,
    pub bowling: StatTable,
    pub tab: Option<StatType>,
}

impl PlayersView {
    pub fn selected_hit(&self) -> Option<&PlayerHit> {
        self.hits.get(self.selected)
    }

    pub fn stats_tab(&self) -> StatType {
        self.tab.unwrap_or(StatType::Batting)
    }

    pub fn visible_stats(&self) -> &StatTable {
        match self.stats_tab() {
            StatType::Batting => &self.batting,
            StatType::Bowling => &self.bowling,
        }
    }
}

#[derive(Debug, Default)]
pub struct SqlView {
    pub selected: usize,
    pub ran: Option<usize>,
    pub result: Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    Add,
    Update { player_id: i64, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerForm {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl PlayerForm {
    pub fn add() -> Self {
        Self {
            kind: FormKind::Add,
            fields: vec![
                FormField::new("Player ID", ""),
                FormField::new("Name", ""),
                FormField::new("Matches Played", "0"),
                FormField::new("Innings Batted", "0"),
                FormField::new("Runs", "0"),
                FormField::new("Average", "0.00"),
                FormField::new("Hundreds", "0"),
            ],
            focus: 0,
        }
    }

    pub fn update(row: &TopPlayerRow) -> Self {
        Self {
            kind: FormKind::Update {
                player_id: row.player_id,
                name: row.name.clone(),
            },
            fields: vec![
                FormField::new("New total runs", row.runs.to_string()),
                FormField::new("New average", format!("{:.2}", row.average)),
                FormField::new("New hundreds", row.hundred.to_string()),
            ],
            focus: 0,
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            FormKind::Add => "Add a New Player".to_string(),
            FormKind::Update { name, .. } => format!("Updating stats for {name}"),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    fn field(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.trim())
            .unwrap_or("")
    }

    fn int_field(&self, label: &str) -> Result<i64, String> {
        self.field(label)
            .parse::<i64>()
            .map_err(|_| format!("{label} must be a whole number"))
    }

    fn float_field(&self, label: &str) -> Result<f64, String> {
        self.field(label)
            .parse::<f64>()
            .map_err(|_| format!("{label} must be a number"))
    }

    pub fn to_new_player(&self) -> Result<NewTopPlayer, String> {
        Ok(NewTopPlayer {
            player_id: self.int_field("Player ID")?,
            name: self.field("Name").to_string(),
            matches_played: self.int_field("Matches Played")?,
            innings_batted: self.int_field("Innings Batted")?,
            runs: self.int_field("Runs")?,
            average: self.float_field("Average")?,
            hundred: self.int_field("Hundreds")?,
        })
    }

    pub fn to_stat_update(&self) -> Result<StatUpdate, String> {
        Ok(StatUpdate {
            runs: self.int_field("New total runs")?,
            average: self.float_field("New average")?,
            hundred: self.int_field("New hundreds")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopPlayersMode {
    List,
    Form(PlayerForm),
    ConfirmDelete { player_id: i64, name: String },
}

#[derive(Debug)]
pub struct TopPlayersView {
    pub all: Table,
    pub filter: String,
    pub selected: usize,
    pub mode: TopPlayersMode,
}

impl Default for TopPlayersView {
    fn default() -> Self {
        Self {
            all: Table::default(),
            filter: String::new(),
            selected: 0,
            mode: TopPlayersMode::List,
        }
    }
}

impl TopPlayersView {
    /// Rows currently shown: the full fetch narrowed by the name filter.
    pub fn visible(&self) -> Table {
        top_players::filter_by_name(&self.all, &self.filter)
    }

    pub fn selected_row(&self) -> Option<TopPlayerRow> {
        TopPlayerRow::from_table(&self.visible(), self.selected)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub help_overlay: bool,
    pub busy: Option<String>,
    pub db_label: Option<String>,
    pub db_available: bool,
    pub logs: VecDeque<String>,
    pub live: LiveView,
    pub players: PlayersView,
    pub sql: SqlView,
    pub top: TopPlayersView,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            help_overlay: false,
            busy: None,
            db_label: None,
            db_available: false,
            logs: VecDeque::new(),
            live: LiveView::default(),
            players: PlayersView::default(),
            sql: SqlView::default(),
            top: TopPlayersView::default(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn push_notices(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.push_log(notice.to_string());
        }
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Home => {}
            Screen::Live => step(&mut self.live.selected, self.live.matches.len(), 1),
            Screen::Players => step(&mut self.players.selected, self.players.hits.len(), 1),
            Screen::Sql => step(
                &mut self.sql.selected,
                crate::db::queries::PRESET_QUERIES.len(),
                1,
            ),
            Screen::TopPlayers => {
                let len = self.top.visible().len();
                step(&mut self.top.selected, len, 1)
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Home => {}
            Screen::Live => step(&mut self.live.selected, self.live.matches.len(), -1),
            Screen::Players => step(&mut self.players.selected, self.players.hits.len(), -1),
            Screen::Sql => step(
                &mut self.sql.selected,
                crate::db::queries::PRESET_QUERIES.len(),
                -1,
            ),
            Screen::TopPlayers => {
                let len = self.top.visible().len();
                step(&mut self.top.selected, len, -1)
            }
        }
    }

    pub fn set_live_matches(&mut self, matches: Vec<MatchInfo>, updated_at: String) {
        self.live.matches = matches;
        self.live.loaded = true;
        self.live.updated_at = Some(updated_at);
        if self.live.selected >= self.live.matches.len() {
            self.live.selected = 0;
        }
    }

    pub fn set_top_players(&mut self, table: Table) {
        self.top.all = table;
        self.clamp_top_selection();
    }

    pub fn clamp_top_selection(&mut self) {
        let len = self.top.visible().len();
        if self.top.selected >= len {
            self.top.selected = len.saturating_sub(1);
        }
    }
}

fn step(selected: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    *selected = if delta >= 0 {
        (*selected + 1).min(len - 1)
    } else {
        selected.saturating_sub(1)
    };
}
