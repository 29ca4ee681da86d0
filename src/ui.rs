use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row,
    Table as TableWidget, TableState, Wrap,
};

use cricbuzz_terminal::app::DB_REQUIRED;
use cricbuzz_terminal::db::Table;
use cricbuzz_terminal::db::queries::PRESET_QUERIES;
use cricbuzz_terminal::db::top_players::leaderboard;
use cricbuzz_terminal::models::{Scalar, Scorecard, StatTable, StatType};
use cricbuzz_terminal::state::{
    AppState, InputMode, PlayerForm, ScorecardTab, Screen, TopPlayersMode,
};

const MAX_COLUMN_WIDTH: usize = 28;

const SUMMARY_COLUMNS: &[&str] = &[
    "Inns", "Team", "Score", "Wkts", "Overs", "RR", "Extras", "B", "LB", "WD", "NB",
];
const BATTING_COLUMNS: &[&str] = &["Inns", "Team", "Batter", "R", "B", "4s", "6s", "SR", "Dismissal"];
const BOWLING_COLUMNS: &[&str] = &["Inns", "Team", "Bowler", "O", "R", "W", "Econ"];
const FOW_COLUMNS: &[&str] = &["Inns", "Team", "Batter", "Score", "Over"];

pub fn ui(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.screen {
        Screen::Home => render_home(frame, chunks[1], state),
        Screen::Live => render_live(frame, chunks[1], state),
        Screen::Players => render_players(frame, chunks[1], state),
        Screen::Sql => render_sql(frame, chunks[1], state),
        Screen::TopPlayers => render_top_players(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Screen::ALL
        .iter()
        .enumerate()
        .map(|(idx, screen)| {
            if *screen == state.screen {
                format!("[{} {}]", idx + 1, screen.title())
            } else {
                format!(" {} {} ", idx + 1, screen.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let busy = state.busy.as_deref().unwrap_or("");
    format!(
        "  ( )  CRICBUZZ LIVESTATS | {}\n  /|\\  {busy}\n{tabs}",
        state.screen.title()
    )
}

fn footer_text(state: &AppState) -> String {
    match (state.screen, state.input_mode) {
        (_, InputMode::PlayerSearch) => "Type a name | Enter Search | Esc Cancel".to_string(),
        (_, InputMode::NameFilter) => "Type to filter | Enter Keep | Esc Clear".to_string(),
        (_, InputMode::Form) => {
            "Tab/↑/↓ Field | Enter Save | Esc Cancel".to_string()
        }
        (Screen::Home, _) => "1-5 Pages | ? Help | q Quit".to_string(),
        (Screen::Live, _) => {
            "j/k Move | Enter Scorecard | Tab Section | r Refresh | R Clear cache | ? Help | q Quit"
                .to_string()
        }
        (Screen::Players, _) => {
            "/ Search | j/k Move | Enter Stats | Tab Batting/Bowling | ? Help | q Quit".to_string()
        }
        (Screen::Sql, _) => "j/k Choose | Enter Run | c Reconnect | ? Help | q Quit".to_string(),
        (Screen::TopPlayers, _) => {
            "j/k Move | / Filter | a Add | e Edit | x Delete | r Reload | c Reconnect | q Quit"
                .to_string()
        }
    }
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let db_line = match (&state.db_label, state.db_available) {
        (Some(label), true) => format!("Database: connected ({label})"),
        (Some(label), false) => format!("Database: unavailable ({label})"),
        (None, _) => "Database: not configured".to_string(),
    };
    let text = [
        "Cricbuzz LiveStats: real-time cricket insights and SQL-based analytics.".to_string(),
        String::new(),
        "Pages:".to_string(),
        "  2  Live Match Scores    current matches with full scorecards".to_string(),
        "  3  Player Statistics    search players, view career batting and bowling".to_string(),
        "  4  SQL Practice         run the 16 prepared analytics queries".to_string(),
        "  5  Top Players DB       add, edit, delete and chart top run scorers".to_string(),
        String::new(),
        "Live data comes from the Cricbuzz API. Responses are cached briefly".to_string(),
        "to stay inside the API rate limit.".to_string(),
        String::new(),
        db_line,
    ]
    .join("\n");
    let home = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Home").borders(Borders::ALL));
    frame.render_widget(home, area);
}

fn render_live(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let title = match &state.live.updated_at {
        Some(at) => format!("Live Matches (updated {at})"),
        None => "Live Matches".to_string(),
    };
    if state.live.matches.is_empty() {
        let msg = if state.live.loaded {
            "No live matches right now"
        } else {
            "Loading..."
        };
        let empty = Paragraph::new(msg).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(empty, columns[0]);
    } else {
        let items: Vec<ListItem> = state
            .live
            .matches
            .iter()
            .map(|m| ListItem::new(m.label()))
            .collect();
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(state.live.selected));
        frame.render_stateful_widget(list, columns[0], &mut list_state);
    }

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(columns[1]);

    let detail = match state.live.selected_match() {
        Some(m) => [
            format!("Match:  {}", m.name),
            format!("Series: {}", m.series),
            format!("Teams:  {} vs {}", m.team1, m.team2),
            format!("Venue:  {}", m.venue),
            format!("State:  {}", m.state),
            format!("Status: {}", m.status),
        ]
        .join("\n"),
        None => "No match selected".to_string(),
    };
    let detail = Paragraph::new(detail)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Match Details").borders(Borders::ALL));
    frame.render_widget(detail, right[0]);

    let tab = state.live.scorecard_tab();
    let title = format!("Scorecard | {} (Tab to switch)", tab.label());
    match (&state.live.scorecard, state.live.scorecard_for) {
        (Some(card), _) => render_table(frame, right[1], &title, &scorecard_table(card, tab)),
        (None, Some(id)) => {
            let msg = Paragraph::new(format!("Scorecard not available for match {id} yet."))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(msg, right[1]);
        }
        (None, None) => {
            let msg = Paragraph::new("Press Enter to load the scorecard")
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(msg, right[1]);
        }
    }
}

fn scorecard_table(card: &Scorecard, tab: ScorecardTab) -> Table {
    fn opt<T: ToString>(v: &Option<T>) -> String {
        v.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }
    fn dec(v: &Option<Scalar>) -> String {
        v.as_ref().map(Scalar::decimal).unwrap_or_default()
    }
    let (columns, rows): (&[&str], Vec<Vec<String>>) = match tab {
        ScorecardTab::Summary => (
            SUMMARY_COLUMNS,
            card.summary
                .iter()
                .map(|s| {
                    vec![
                        opt(&s.innings_id),
                        opt(&s.team),
                        opt(&s.score),
                        opt(&s.wickets),
                        opt(&s.overs),
                        dec(&s.run_rate),
                        s.extras.to_string(),
                        s.byes.to_string(),
                        s.leg_byes.to_string(),
                        s.wides.to_string(),
                        s.no_balls.to_string(),
                    ]
                })
                .collect(),
        ),
        ScorecardTab::Batting => (
            BATTING_COLUMNS,
            card.batting
                .iter()
                .map(|b| {
                    vec![
                        opt(&b.innings),
                        opt(&b.team),
                        opt(&b.name),
                        opt(&b.runs),
                        opt(&b.balls),
                        opt(&b.fours),
                        opt(&b.sixes),
                        dec(&b.strike_rate),
                        opt(&b.dismissal),
                    ]
                })
                .collect(),
        ),
        ScorecardTab::Bowling => (
            BOWLING_COLUMNS,
            card.bowling
                .iter()
                .map(|b| {
                    vec![
                        opt(&b.innings),
                        opt(&b.team),
                        opt(&b.name),
                        opt(&b.overs),
                        opt(&b.runs),
                        opt(&b.wickets),
                        dec(&b.economy),
                    ]
                })
                .collect(),
        ),
        ScorecardTab::FallOfWickets => (
            FOW_COLUMNS,
            card.fall_of_wickets
                .iter()
                .map(|f| {
                    vec![
                        opt(&f.innings),
                        opt(&f.team),
                        opt(&f.batsman),
                        opt(&f.score_at_fall),
                        opt(&f.over),
                    ]
                })
                .collect(),
        ),
    };
    text_table(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let editing = state.input_mode == InputMode::PlayerSearch;
    let cursor = if editing { "_" } else { "" };
    let search_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(format!("{}{cursor}", state.players.query))
        .style(search_style)
        .block(Block::default().title("Player name (/ to edit)").borders(Borders::ALL));
    frame.render_widget(search, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);

    let players = &state.players;
    if players.hits.is_empty() {
        let msg = match &players.searched_for {
            Some(name) => format!("No players found for '{name}'"),
            None => "Search for a player to begin".to_string(),
        };
        let empty = Paragraph::new(msg).block(Block::default().title("Players").borders(Borders::ALL));
        frame.render_widget(empty, columns[0]);
    } else {
        let items: Vec<ListItem> = players.hits.iter().map(|h| ListItem::new(h.label())).collect();
        let list = List::new(items)
            .block(Block::default().title("Players").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(players.selected));
        frame.render_stateful_widget(list, columns[0], &mut list_state);
    }

    let kind = match players.stats_tab() {
        StatType::Batting => "Batting",
        StatType::Bowling => "Bowling",
    };
    let Some(hit) = &players.stats_for else {
        let msg = Paragraph::new("Select a player and press Enter")
            .block(Block::default().title("Career Stats").borders(Borders::ALL));
        frame.render_widget(msg, columns[1]);
        return;
    };
    let title = format!("{kind} Career Stats: {} (Tab to switch)", hit.name);
    let stats = players.visible_stats();
    if stats.is_empty() {
        let msg = Paragraph::new(format!("No {} stats available.", kind.to_lowercase()))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(msg, columns[1]);
    } else {
        render_table(frame, columns[1], &title, &stat_table(stats));
    }
}

fn stat_table(stats: &StatTable) -> Table {
    let rows = stats
        .rows
        .iter()
        .map(|r| std::iter::once(r.key.clone()).chain(r.cells.iter().cloned()).collect())
        .collect();
    text_table(stats.columns.clone(), rows)
}

fn render_sql(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(56), Constraint::Min(30)])
        .split(area);

    let items: Vec<ListItem> = PRESET_QUERIES.iter().map(|q| ListItem::new(q.label)).collect();
    let list = List::new(items)
        .block(Block::default().title("Queries").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.sql.selected));
    frame.render_stateful_widget(list, columns[0], &mut list_state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    let sql = PRESET_QUERIES
        .get(state.sql.selected)
        .map(|q| q.sql.trim())
        .unwrap_or("");
    let code = Paragraph::new(sql)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().title("SQL").borders(Borders::ALL));
    frame.render_widget(code, right[0]);

    if !state.db_available {
        let msg = Paragraph::new(DB_REQUIRED)
            .block(Block::default().title("Results").borders(Borders::ALL));
        frame.render_widget(msg, right[1]);
        return;
    }
    match state.sql.ran {
        Some(idx) if state.sql.result.is_empty() => {
            let msg = Paragraph::new("Query executed, but returned no results.")
                .block(Block::default().title(format!("Results Q{}", idx + 1)).borders(Borders::ALL));
            frame.render_widget(msg, right[1]);
        }
        Some(idx) => {
            let title = format!("Results Q{} ({} rows)", idx + 1, state.sql.result.len());
            render_table(frame, right[1], &title, &state.sql.result);
        }
        None => {
            let msg = Paragraph::new("Press Enter to run the selected query")
                .block(Block::default().title("Results").borders(Borders::ALL));
            frame.render_widget(msg, right[1]);
        }
    }
}

fn render_top_players(frame: &mut Frame, area: Rect, state: &AppState) {
    if !state.db_available {
        let msg = Paragraph::new(format!("{DB_REQUIRED}\n\nPress c to retry the connection."))
            .block(Block::default().title("Top Players").borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let filtering = state.input_mode == InputMode::NameFilter;
    let filter = Paragraph::new(format!(
        "{}{}",
        state.top.filter,
        if filtering { "_" } else { "" }
    ))
    .style(if filtering {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    })
    .block(Block::default().title("Filter by name (/ to edit)").borders(Borders::ALL));
    frame.render_widget(filter, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let visible = state.top.visible();
    let title = format!("Top Players ({} shown)", visible.len());
    if visible.is_empty() {
        let msg = Paragraph::new("No players found.")
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(msg, columns[0]);
    } else {
        render_selectable_table(frame, columns[0], &title, &visible, Some(state.top.selected));
    }

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);
    render_leaderboard(frame, charts[0], "Top 10 by Runs", &leaderboard(&visible, "runs"), 0);
    render_leaderboard(
        frame,
        charts[1],
        "Top 10 by Hundreds",
        &leaderboard(&visible, "hundred"),
        0,
    );

    match &state.top.mode {
        TopPlayersMode::List => {}
        TopPlayersMode::Form(form) => render_form(frame, area, form),
        TopPlayersMode::ConfirmDelete { player_id, name } => {
            let popup = centered_rect(50, 25, area);
            frame.render_widget(Clear, popup);
            let text = format!("Delete {name} (player id {player_id})?\n\ny Yes   n No");
            let confirm = Paragraph::new(text)
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title("Confirm delete").borders(Borders::ALL));
            frame.render_widget(confirm, popup);
        }
    }
}

fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[(String, f64)],
    decimals: usize,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if entries.is_empty() {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    }
    let bars: Vec<Bar> = entries
        .iter()
        .map(|(name, value)| {
            Bar::default()
                .label(Line::from(name.clone()))
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{value:.decimals$}"))
                .style(Style::default().fg(Color::Green))
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn render_form(frame: &mut Frame, area: Rect, form: &PlayerForm) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);
    let lines = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let marker = if idx == form.focus { ">" } else { " " };
            let cursor = if idx == form.focus { "_" } else { "" };
            format!("{marker} {:<16} {}{cursor}", field.label, field.value)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!("{lines}\n\nEnter Save   Esc Cancel");
    let widget = Paragraph::new(text)
        .block(Block::default().title(form.title()).borders(Borders::ALL));
    frame.render_widget(widget, popup);
}

fn text_table(columns: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    use cricbuzz_terminal::db::Cell;
    let mut table = Table::new(columns);
    table.rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(Cell::Text).collect())
        .collect();
    table
}

fn render_table(frame: &mut Frame, area: Rect, title: &str, table: &Table) {
    render_selectable_table(frame, area, title, table, None);
}

fn render_selectable_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    table: &Table,
    selected: Option<usize>,
) {
    let widths = column_widths(table);
    let header = Row::new(table.columns.clone())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = table
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()));
    let widget = TableWidget::new(rows, widths)
        .header(header)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut table_state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(widget, area, &mut table_state);
}

fn column_widths(table: &Table) -> Vec<Constraint> {
    (0..table.columns.len())
        .map(|idx| {
            let header = table.columns[idx].chars().count();
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.to_string().chars().count())
                .max()
                .unwrap_or(0);
            Constraint::Length(header.max(widest).clamp(2, MAX_COLUMN_WIDTH) as u16)
        })
        .collect()
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Cricbuzz LiveStats - Help",
        "",
        "Global:",
        "  1-5          Switch page",
        "  j/k or ↑/↓   Move selection",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Live:         Enter scorecard, Tab section, r refresh, R clear cache",
        "Players:      / search, Enter stats, Tab batting/bowling",
        "SQL:          Enter run query, c reconnect",
        "Top Players:  / filter, a add, e edit, x delete, r reload",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
