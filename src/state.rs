use std::collections::VecDeque;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::chart::{BarHit, BarSide, Tooltip};
use crate::countries::{CountryNames, filter_names};
use crate::dataset::{DATE_FORMAT, DatasetStore, ParseReport};
use crate::drilldown::{DrillDown, drill_down};
use crate::error::ExplorerError;
use crate::normalize::{DateInterval, NormalizedMatch, normalize, parse_date};

const MAX_LOGS: usize = 200;
const MAX_LOGGED_PARSE_ERRORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Countries,
    MinDate,
    MaxDate,
    Chart,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Countries => Focus::MinDate,
            Focus::MinDate => Focus::MaxDate,
            Focus::MaxDate => Focus::Chart,
            Focus::Chart => Focus::Countries,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Countries => Focus::Chart,
            Focus::MinDate => Focus::Countries,
            Focus::MaxDate => Focus::MinDate,
            Focus::Chart => Focus::MaxDate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarHover {
    pub hit: BarHit,
    /// Pointer cell for mouse hovers; `None` when driven from the keyboard.
    pub pointer: Option<(u16, u16)>,
}

/// User intents, dispatched through [`update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CountrySelected(String),
    CountryHovered(String),
    CountryHoverCleared,
    RangeConfirmed(DateInterval),
    BarHovered {
        hit: BarHit,
        pointer: Option<(u16, u16)>,
    },
    BarHoverCleared,
    BarClicked(usize),
}

/// Results of background loading, applied through [`apply_delta`].
#[derive(Debug)]
pub enum Delta {
    DatasetLoaded {
        store: DatasetStore,
        report: ParseReport,
    },
    CountriesLoaded(CountryNames),
    LoadFailed(String),
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub dataset: Option<Arc<DatasetStore>>,
    pub load_status: LoadStatus,
    pub country_names: Option<CountryNames>,
    pub country_options: Vec<String>,
    pub country_query: String,
    pub country_searching: bool,
    pub country_cursor: usize,
    pub country_hint: Option<String>,
    pub selected_country: Option<String>,
    pub interval: Option<DateInterval>,
    pub min_input: String,
    pub max_input: String,
    pub normalized: Vec<NormalizedMatch>,
    pub hover: Option<BarHover>,
    pub drilldown: Option<DrillDown>,
    pub focus: Focus,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    range_from: Option<NaiveDate>,
    range_to: Option<NaiveDate>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            dataset: None,
            load_status: LoadStatus::Loading,
            country_names: None,
            country_options: Vec::new(),
            country_query: String::new(),
            country_searching: false,
            country_cursor: 0,
            country_hint: None,
            selected_country: None,
            interval: None,
            min_input: String::new(),
            max_input: String::new(),
            normalized: Vec::new(),
            hover: None,
            drilldown: None,
            focus: Focus::Countries,
            help_overlay: false,
            logs: VecDeque::new(),
            range_from: None,
            range_to: None,
        }
    }

    /// Bounds that replace the dataset's own date span once it loads.
    pub fn with_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.range_from = from;
        self.range_to = to;
        self
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn filtered_countries(&self) -> Vec<&String> {
        filter_names(&self.country_options, &self.country_query)
    }

    pub fn country_at_cursor(&self) -> Option<String> {
        self.filtered_countries()
            .get(self.country_cursor)
            .map(|name| (*name).clone())
    }

    pub fn select_next_country(&mut self) {
        let total = self.filtered_countries().len();
        if total > 0 {
            self.country_cursor = (self.country_cursor + 1).min(total - 1);
        }
    }

    pub fn select_prev_country(&mut self) {
        self.country_cursor = self.country_cursor.saturating_sub(1);
    }

    pub fn set_country_query(&mut self, query: String) {
        self.country_query = query;
        self.country_cursor = 0;
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::MinDate => Some(&mut self.min_input),
            Focus::MaxDate => Some(&mut self.max_input),
            _ => None,
        }
    }

    /// Parses the two date inputs into a confirm command, logging bad input.
    pub fn confirm_inputs(&mut self) -> Option<Command> {
        let parsed = parse_date(&self.min_input)
            .and_then(|min| parse_date(&self.max_input).map(|max| DateInterval::new(min, max)));
        match parsed {
            Ok(interval) => Some(Command::RangeConfirmed(interval)),
            Err(err) => {
                tracing::warn!(error = %err, "rejected date input");
                self.push_log(format!("[WARN] {err}"));
                None
            }
        }
    }

    pub fn hovered_match(&self) -> Option<&NormalizedMatch> {
        self.hover.and_then(|h| self.normalized.get(h.hit.index))
    }

    pub fn hover_tooltip(&self) -> Option<Tooltip> {
        let hover = self.hover?;
        let m = self.hovered_match()?;
        Some(Tooltip::for_bar(m, hover.hit.side))
    }

    /// Next keyboard cursor position after moving `delta` bands.
    pub fn hover_step(&self, delta: isize) -> Option<BarHit> {
        let total = self.normalized.len();
        if total == 0 {
            return None;
        }
        let Some(current) = self.hover else {
            return Some(BarHit {
                index: 0,
                side: BarSide::Selected,
            });
        };
        let index = current
            .hit
            .index
            .saturating_add_signed(delta)
            .min(total - 1);
        Some(BarHit {
            index,
            side: current.hit.side,
        })
    }

    pub fn hover_flipped(&self) -> Option<BarHit> {
        let current = self.hover?;
        Some(BarHit {
            index: current.hit.index,
            side: current.hit.side.flip(),
        })
    }

    fn sync_country_options(&mut self) {
        let options = match (&self.country_names, &self.dataset) {
            (Some(names), _) => names.names(),
            (None, Some(dataset)) => dataset.team_names(),
            (None, None) => Vec::new(),
        };
        self.country_options = options;
        let total = self.filtered_countries().len();
        self.country_cursor = self.country_cursor.min(total.saturating_sub(1));
        if let Some(country) = self.selected_country.clone() {
            self.move_cursor_to(&country);
        }
    }

    fn move_cursor_to(&mut self, country: &str) {
        let pos = self
            .filtered_countries()
            .iter()
            .position(|name| name.as_str() == country);
        if let Some(pos) = pos {
            self.country_cursor = pos;
        }
    }

    fn set_interval(&mut self, interval: DateInterval) {
        self.min_input = interval.min.format(DATE_FORMAT).to_string();
        self.max_input = interval.max.format(DATE_FORMAT).to_string();
        self.interval = Some(interval);
    }

    fn refresh_chart(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            self.push_log("[INFO] Dataset still loading; selection will apply once loaded");
            return;
        };
        let Some(country) = self.selected_country.clone() else {
            return;
        };
        let Some(interval) = self.interval else {
            self.normalized.clear();
            self.hover = None;
            self.push_log("[WARN] No date range available");
            return;
        };

        if interval.is_inverted() {
            let err = ExplorerError::InvalidRange {
                min: interval.min.format(DATE_FORMAT).to_string(),
                max: interval.max.format(DATE_FORMAT).to_string(),
            };
            self.push_log(format!("[WARN] {err}; nothing to show"));
        }

        self.normalized = normalize(dataset.records(), &country, &interval);
        self.hover = None;
        tracing::info!(
            country = %country,
            range = %interval.label(),
            matches = self.normalized.len(),
            "chart refreshed"
        );
        self.push_log(format!(
            "[INFO] {country}: {} matches in {}",
            self.normalized.len(),
            interval.label()
        ));
    }
}

pub fn update(state: &mut AppState, cmd: Command) {
    match cmd {
        Command::CountrySelected(name) => {
            let name = name.trim().to_string();
            state.country_hint = Some(name.clone());
            state.move_cursor_to(&name);
            state.selected_country = Some(name);
            state.refresh_chart();
        }
        Command::CountryHovered(name) => state.country_hint = Some(name),
        Command::CountryHoverCleared => state.country_hint = None,
        Command::RangeConfirmed(interval) => {
            state.set_interval(interval);
            state.refresh_chart();
        }
        Command::BarHovered { hit, pointer } => {
            state.hover = if hit.index < state.normalized.len() {
                Some(BarHover { hit, pointer })
            } else {
                None
            };
        }
        Command::BarHoverCleared => state.hover = None,
        Command::BarClicked(index) => match state.normalized.get(index) {
            Some(m) => {
                let detail = drill_down(m);
                state.push_log(format!(
                    "[INFO] Match {} vs {} on {}",
                    detail.info.selected_team, detail.info.opponent_team, detail.info.date
                ));
                state.drilldown = Some(detail);
            }
            None => state.push_log(format!("[WARN] No match at position {index}")),
        },
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DatasetLoaded { store, report } => {
            let span = store.date_span();
            state.dataset = Some(Arc::new(store));
            state.load_status = LoadStatus::Ready;

            let min = state.range_from.or(span.map(|s| s.min));
            let max = state.range_to.or(span.map(|s| s.max));
            if let (Some(min), Some(max)) = (min, max) {
                state.set_interval(DateInterval::new(min, max));
            }

            state.push_log(format!(
                "[INFO] Loaded {} matches ({} skipped)",
                report.rows_loaded, report.rows_skipped
            ));
            for err in report.errors.iter().take(MAX_LOGGED_PARSE_ERRORS) {
                state.push_log(format!("[WARN] {err}"));
            }
            if report.rows_skipped > MAX_LOGGED_PARSE_ERRORS {
                state.push_log(format!(
                    "[WARN] ... {} more rows skipped",
                    report.rows_skipped - MAX_LOGGED_PARSE_ERRORS
                ));
            }

            state.sync_country_options();
            if state.selected_country.is_some() {
                state.refresh_chart();
            }
        }
        Delta::CountriesLoaded(names) => {
            state.push_log(format!("[INFO] Loaded {} country names", names.len()));
            state.country_names = Some(names);
            state.sync_country_options();
        }
        Delta::LoadFailed(msg) => {
            tracing::error!(error = %msg, "startup load failed");
            state.push_log(format!("[ERROR] {msg}"));
            state.load_status = LoadStatus::Failed(msg);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

/// Window of `visible` rows around `selected` within `total` rows.
pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
