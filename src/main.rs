use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use results_terminal::chart::{
    ChartGeometry, ChartWidget, OPPONENT_COLOR, SELECTED_COLOR, tooltip_rect,
};
use results_terminal::config::Config;
use results_terminal::loader;
use results_terminal::pie::PieWidget;
use results_terminal::state::{
    self, AppState, Command, Focus, LoadStatus, apply_delta, update, visible_range,
};

const MAX_DATE_INPUT: usize = 10;
const PAGE_STEP: isize = 10;

#[derive(Debug, Clone, Copy, Default)]
struct Areas {
    countries: Rect,
    chart: Rect,
}

struct App {
    state: AppState,
    should_quit: bool,
    areas: Areas,
    pointer_on_country: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
            areas: Areas::default(),
            pointer_on_country: false,
        }
    }

    fn dispatch(&mut self, cmd: Command) {
        tracing::debug!(?cmd, "dispatch");
        update(&mut self.state, cmd);
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.country_searching {
            self.on_search_key(key);
            return;
        }
        if matches!(self.state.focus, Focus::MinDate | Focus::MaxDate) && self.on_input_key(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab => self.state.focus = self.state.focus.next(),
            KeyCode::BackTab => self.state.focus = self.state.focus.prev(),
            KeyCode::Char('c') => self.confirm_range(),
            _ => match self.state.focus {
                Focus::Countries => self.on_countries_key(key),
                Focus::Chart => self.on_chart_key(key),
                Focus::MinDate | Focus::MaxDate => {}
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.country_searching = false,
            KeyCode::Enter => {
                self.state.country_searching = false;
                self.select_country_at_cursor();
            }
            KeyCode::Backspace => {
                let mut query = self.state.country_query.clone();
                query.pop();
                self.state.set_country_query(query);
            }
            KeyCode::Down => self.state.select_next_country(),
            KeyCode::Up => self.state.select_prev_country(),
            KeyCode::Char(ch) => {
                let mut query = self.state.country_query.clone();
                query.push(ch);
                self.state.set_country_query(query);
            }
            _ => {}
        }
    }

    /// Returns true when the key was consumed by the focused date field.
    fn on_input_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => {
                self.confirm_range();
                true
            }
            KeyCode::Esc => {
                self.state.focus = Focus::Chart;
                true
            }
            KeyCode::Backspace => {
                if let Some(input) = self.state.focused_input_mut() {
                    input.pop();
                }
                true
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() || ch == '-' => {
                if let Some(input) = self.state.focused_input_mut()
                    && input.len() < MAX_DATE_INPUT
                {
                    input.push(ch);
                }
                true
            }
            _ => false,
        }
    }

    fn on_countries_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_country(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_country(),
            KeyCode::Char('/') => self.state.country_searching = true,
            KeyCode::Esc => self.state.set_country_query(String::new()),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_country_at_cursor(),
            _ => {}
        }
    }

    fn on_chart_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.step_hover(-1),
            KeyCode::Char('l') | KeyCode::Right => self.step_hover(1),
            KeyCode::PageUp => self.step_hover(-PAGE_STEP),
            KeyCode::PageDown => self.step_hover(PAGE_STEP),
            KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down => {
                let hit = self.state.hover_flipped().or_else(|| self.state.hover_step(0));
                if let Some(hit) = hit {
                    self.dispatch(Command::BarHovered { hit, pointer: None });
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(hover) = self.state.hover {
                    self.dispatch(Command::BarClicked(hover.hit.index));
                }
            }
            KeyCode::Esc => self.dispatch(Command::BarHoverCleared),
            _ => {}
        }
    }

    fn step_hover(&mut self, delta: isize) {
        if let Some(hit) = self.state.hover_step(delta) {
            self.dispatch(Command::BarHovered { hit, pointer: None });
        }
    }

    fn select_country_at_cursor(&mut self) {
        match self.state.country_at_cursor() {
            Some(name) => self.dispatch(Command::CountrySelected(name)),
            None => self.state.push_log("[INFO] No country under cursor"),
        }
    }

    fn confirm_range(&mut self) {
        if let Some(cmd) = self.state.confirm_inputs() {
            self.dispatch(cmd);
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                self.hover_chart(column, row);
                self.hover_country(column, row);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(hit) = self.chart_geometry().and_then(|g| g.hit_test(column, row)) {
                    self.state.focus = Focus::Chart;
                    self.dispatch(Command::BarClicked(hit.index));
                } else if let Some(name) = self.country_at(column, row) {
                    self.state.focus = Focus::Countries;
                    self.dispatch(Command::CountrySelected(name));
                }
            }
            MouseEventKind::ScrollDown if rect_contains(self.areas.countries, column, row) => {
                self.state.select_next_country();
            }
            MouseEventKind::ScrollUp if rect_contains(self.areas.countries, column, row) => {
                self.state.select_prev_country();
            }
            _ => {}
        }
    }

    fn chart_geometry(&self) -> Option<ChartGeometry> {
        ChartGeometry::new(self.areas.chart, &self.state.normalized)
    }

    fn hover_chart(&mut self, column: u16, row: u16) {
        match self.chart_geometry().and_then(|g| g.hit_test(column, row)) {
            Some(hit) => self.dispatch(Command::BarHovered {
                hit,
                pointer: Some((column, row)),
            }),
            // Keyboard cursor survives pointer movement elsewhere.
            None => {
                if self.state.hover.is_some_and(|h| h.pointer.is_some()) {
                    self.dispatch(Command::BarHoverCleared);
                }
            }
        }
    }

    fn hover_country(&mut self, column: u16, row: u16) {
        match self.country_at(column, row) {
            Some(name) => {
                self.pointer_on_country = true;
                if self.state.country_hint.as_deref() != Some(name.as_str()) {
                    self.dispatch(Command::CountryHovered(name));
                }
            }
            None => {
                if self.pointer_on_country {
                    self.pointer_on_country = false;
                    self.dispatch(Command::CountryHoverCleared);
                }
            }
        }
    }

    fn country_at(&self, column: u16, row: u16) -> Option<String> {
        let area = self.areas.countries;
        if !rect_contains(area, column, row) {
            return None;
        }
        let filtered = self.state.filtered_countries();
        let (start, end) = visible_range(
            self.state.country_cursor,
            filtered.len(),
            usize::from(area.height),
        );
        let idx = start + usize::from(row - area.y);
        if idx >= end {
            return None;
        }
        filtered.get(idx).map(|name| (*name).clone())
    }
}

fn rect_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn init_tracing(log_dir: &Path) -> WorkerGuard {
    std::fs::create_dir_all(log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(log_dir, "results_terminal");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    guard
}

fn main() -> Result<()> {
    let config = Config::load();
    let _guard = init_tracing(&config.log_dir);
    tracing::info!(data = %config.data, countries = ?config.countries, "results terminal starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    loader::spawn_loader(config.sources(), tx);

    let mut app = App::new(AppState::new().with_range(config.from, config.to));
    app.state.push_log(format!("[INFO] Loading {}", config.data));
    if let Some(country) = config.initial_country() {
        app.dispatch(Command::CountrySelected(country));
    }
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    tracing::info!("results terminal shutting down");
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(chunks[1]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(12),
        ])
        .split(body[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26),
            Constraint::Min(30),
            Constraint::Percentage(35),
        ])
        .split(main[2]);

    app.areas.countries = render_countries(frame, body[0], &app.state);
    render_range_inputs(frame, main[0], &app.state);
    app.areas.chart = render_chart(frame, main[1], &app.state);
    render_pie(frame, bottom[0], &app.state);

    let info = Paragraph::new(match_info_text(&app.state))
        .block(Block::default().title("Match").borders(Borders::ALL));
    frame.render_widget(info, bottom[1]);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, bottom[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    render_tooltip(frame, app);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn header_text(state: &AppState) -> String {
    let country = state.selected_country.as_deref().unwrap_or("no country");
    let range = state
        .interval
        .map(|i| i.label())
        .unwrap_or_else(|| "no range".to_string());
    let status = match &state.load_status {
        LoadStatus::Loading => "LOADING".to_string(),
        LoadStatus::Ready => format!(
            "{} matches loaded",
            state.dataset.as_ref().map(|d| d.len()).unwrap_or_default()
        ),
        LoadStatus::Failed(_) => "LOAD FAILED".to_string(),
    };
    let line1 = format!("  .-.  RESULTS TERMINAL | {country} | {range} | {status}");
    let line2 = " /___\\".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.country_searching {
        return "type to filter | ↑/↓ Move | Enter Select | Esc Done".to_string();
    }
    match state.focus {
        Focus::Countries => {
            "Tab Focus | j/k/↑/↓ Move | Enter Select | / Search | c Confirm range | ? Help | q Quit"
                .to_string()
        }
        Focus::MinDate | Focus::MaxDate => {
            "Tab Focus | 0-9 - Edit | Backspace | Enter Confirm | Esc Chart | q Quit".to_string()
        }
        Focus::Chart => {
            "Tab Focus | h/l/←/→ Match | j/k/↑/↓ Side | Enter Drill down | Esc Clear | q Quit"
                .to_string()
        }
    }
}

fn render_countries(frame: &mut Frame, area: Rect, state: &AppState) -> Rect {
    let title = if state.country_searching || !state.country_query.is_empty() {
        format!("Countries /{}", state.country_query)
    } else if let Some(hint) = &state.country_hint {
        format!("Countries | {hint}")
    } else {
        "Countries".to_string()
    };
    let block = focus_block(title, state.focus == Focus::Countries);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let filtered = state.filtered_countries();
    if filtered.is_empty() {
        let note = if state.is_loaded() {
            "No countries match"
        } else {
            "Waiting for data"
        };
        let empty = Paragraph::new(note).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return inner;
    }

    let (start, end) = visible_range(
        state.country_cursor,
        filtered.len(),
        usize::from(inner.height),
    );
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let name = filtered[idx];
        let mut style = Style::default();
        if state.selected_country.as_deref() == Some(name.as_str()) {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        if idx == state.country_cursor {
            style = style.bg(Color::DarkGray);
        }
        frame.render_widget(Paragraph::new(name.as_str()).style(style), row_area);
    }
    inner
}

fn render_range_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Min(10),
        ])
        .split(area);

    let from = Paragraph::new(state.min_input.as_str())
        .block(focus_block("From".to_string(), state.focus == Focus::MinDate));
    frame.render_widget(from, cols[0]);
    let to = Paragraph::new(state.max_input.as_str())
        .block(focus_block("To".to_string(), state.focus == Focus::MaxDate));
    frame.render_widget(to, cols[1]);

    let legend = Line::from(vec![
        Span::styled("█ ", Style::default().fg(SELECTED_COLOR)),
        Span::raw(state.selected_country.as_deref().unwrap_or("Selected").to_string()),
        Span::raw("   "),
        Span::styled("█ ", Style::default().fg(OPPONENT_COLOR)),
        Span::raw("Opponent"),
        Span::styled("   c: confirm range", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(legend).block(Block::default().borders(Borders::ALL)),
        cols[2],
    );
}

fn render_chart(frame: &mut Frame, area: Rect, state: &AppState) -> Rect {
    let title = match &state.selected_country {
        Some(country) => {
            let goals_for: u64 = state
                .normalized
                .iter()
                .map(|m| u64::from(m.selected_score))
                .sum();
            let goals_against: u64 = state
                .normalized
                .iter()
                .map(|m| u64::from(m.opponent_score))
                .sum();
            format!(
                "{country} | {} matches | goals {goals_for}-{goals_against}",
                state.normalized.len()
            )
        }
        None => "Scores".to_string(),
    };
    let block = focus_block(title, state.focus == Focus::Chart);
    let inner = block.inner(area);

    match &state.load_status {
        LoadStatus::Loading => {
            let loading = Paragraph::new("Loading dataset...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(loading, area);
        }
        LoadStatus::Failed(msg) => {
            let failed = Paragraph::new(format!("Dataset unavailable: {msg}"))
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(failed, area);
        }
        LoadStatus::Ready if state.selected_country.is_none() => {
            let idle = Paragraph::new("Select a country to chart its matches")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(idle, area);
        }
        LoadStatus::Ready => {
            let chart = ChartWidget::new(&state.normalized)
                .hover(state.hover.map(|h| h.hit))
                .block(block);
            frame.render_widget(chart, area);
        }
    }
    inner
}

fn render_pie(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.drilldown {
        Some(detail) => {
            let pie = PieWidget::new(&detail.shares)
                .block(Block::default().title("Share").borders(Borders::ALL));
            frame.render_widget(pie, area);
        }
        None => {
            let empty = Paragraph::new("Click a bar")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("Share").borders(Borders::ALL));
            frame.render_widget(empty, area);
        }
    }
}

fn match_info_text(state: &AppState) -> String {
    match &state.drilldown {
        Some(detail) => detail.info.to_string(),
        None => "No match selected".to_string(),
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(10)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tooltip(frame: &mut Frame, app: &App) {
    let Some(hover) = app.state.hover else {
        return;
    };
    let Some(tooltip) = app.state.hover_tooltip() else {
        return;
    };
    let anchor = match hover.pointer {
        Some(pointer) => Some(pointer),
        None => app.chart_geometry().and_then(|g| g.bar_anchor(hover.hit)),
    };
    let Some(anchor) = anchor else {
        return;
    };
    let rect = tooltip_rect(anchor, tooltip.size(), frame.size());
    frame.render_widget(tooltip, rect);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Results Terminal - Help",
        "",
        "Global:",
        "  Tab / S-Tab  Cycle focus",
        "  c            Confirm date range",
        "  ?            Toggle help",
        "  q / Ctrl-C   Quit",
        "",
        "Countries:",
        "  j/k or ↑/↓   Move",
        "  Enter        Select country",
        "  /            Search",
        "",
        "Chart:",
        "  h/l or ←/→   Previous/next match",
        "  j/k or ↑/↓   Switch bar",
        "  Enter        Drill down",
        "  Mouse        Hover for details, click to drill down",
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
