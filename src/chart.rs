use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::normalize::NormalizedMatch;
use crate::scale::{BandScale, LinearScale, opponent_tick_label, selected_tick_label};

pub const SELECTED_COLOR: Color = Color::Rgb(70, 130, 180);
pub const OPPONENT_COLOR: Color = Color::Rgb(255, 165, 0);

/// Columns reserved left of the plot for tick labels and the axis line.
pub const AXIS_GUTTER: u16 = 5;

const BAR_GLYPH: &str = "█";
const HOVER_GLYPH: &str = "▓";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarSide {
    Selected,
    Opponent,
}

impl BarSide {
    pub fn flip(self) -> Self {
        match self {
            BarSide::Selected => BarSide::Opponent,
            BarSide::Opponent => BarSide::Selected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarHit {
    pub index: usize,
    pub side: BarSide,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub index: usize,
    pub side: BarSide,
    pub score: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

/// Resolution-independent chart layout: the plot spans `[0, width] x [0, height]`
/// with y growing downward and the midline at `height / 2`.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub bands: BandScale,
    pub selected_scale: LinearScale,
    pub opponent_scale: LinearScale,
    pub selected_max: u32,
    pub opponent_max: u32,
    pub bars: Vec<BarRect>,
}

impl ChartLayout {
    pub fn compute(matches: &[NormalizedMatch], width: f64, height: f64) -> Self {
        let mid = height / 2.0;
        let selected_max = matches.iter().map(|m| m.selected_score).max().unwrap_or(0);
        let opponent_max = matches.iter().map(|m| m.opponent_score).max().unwrap_or(0);

        let bands = BandScale::new(matches.len(), width);
        let selected_scale = LinearScale::new(selected_max, mid, 0.0);
        let opponent_scale = LinearScale::new(opponent_max, height, mid);

        let mut bars = Vec::with_capacity(matches.len() * 2);
        for (index, m) in matches.iter().enumerate() {
            let x = bands.x(index);
            let top = selected_scale.apply(f64::from(m.selected_score));
            bars.push(BarRect {
                index,
                side: BarSide::Selected,
                score: m.selected_score,
                x,
                y: top,
                width: bands.bandwidth(),
                height: mid - top,
            });
            bars.push(BarRect {
                index,
                side: BarSide::Opponent,
                score: m.opponent_score,
                x,
                y: mid,
                width: bands.bandwidth(),
                height: height - opponent_scale.apply(f64::from(m.opponent_score)),
            });
        }

        Self {
            width,
            height,
            bands,
            selected_scale,
            opponent_scale,
            selected_max,
            opponent_max,
            bars,
        }
    }

    pub fn midline(&self) -> f64 {
        self.height / 2.0
    }

    pub fn bar(&self, index: usize, side: BarSide) -> Option<&BarRect> {
        let offset = match side {
            BarSide::Selected => 0,
            BarSide::Opponent => 1,
        };
        self.bars.get(index * 2 + offset)
    }

    pub fn selected_ticks(&self, count: usize) -> Vec<AxisTick> {
        self.selected_scale
            .ticks(count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                y: self.selected_scale.apply(value),
                label: selected_tick_label(value),
            })
            .collect()
    }

    /// Ticks for the lower half, labelled downward from the opponent maximum.
    /// With no opponent goals only the midline tick remains.
    pub fn opponent_ticks(&self, count: usize) -> Vec<AxisTick> {
        let domain_max = self.opponent_scale.domain_max();
        let ticks = if self.opponent_max == 0 {
            vec![domain_max]
        } else {
            self.opponent_scale.ticks(count)
        };
        ticks
            .into_iter()
            .map(|value| AxisTick {
                value,
                y: self.opponent_scale.apply(value),
                label: opponent_tick_label(domain_max, value),
            })
            .collect()
    }
}

/// A `ChartLayout` fitted onto terminal cells: the upper half rows, one
/// midline row, then the lower half rows.
#[derive(Debug, Clone)]
pub struct ChartGeometry {
    pub area: Rect,
    pub plot: Rect,
    pub half_rows: u16,
    pub layout: ChartLayout,
}

impl ChartGeometry {
    pub fn new(area: Rect, matches: &[NormalizedMatch]) -> Option<Self> {
        if area.width <= AXIS_GUTTER || area.height < 3 {
            return None;
        }
        let half_rows = (area.height - 1) / 2;
        let plot = Rect::new(
            area.x + AXIS_GUTTER,
            area.y,
            area.width - AXIS_GUTTER,
            half_rows * 2 + 1,
        );
        let layout = ChartLayout::compute(
            matches,
            f64::from(plot.width),
            f64::from(half_rows * 2),
        );
        Some(Self {
            area,
            plot,
            half_rows,
            layout,
        })
    }

    pub fn midline_row(&self) -> u16 {
        self.plot.y + self.half_rows
    }

    /// Absolute `[start, end)` columns of a band; always at least one cell wide.
    pub fn band_columns(&self, index: usize) -> (u16, u16) {
        let bands = &self.layout.bands;
        let max = f64::from(self.plot.width);
        let start = bands.x(index).round().clamp(0.0, max - 1.0);
        let end = (bands.x(index) + bands.bandwidth())
            .round()
            .clamp(start + 1.0, max);
        (self.plot.x + start as u16, self.plot.x + end as u16)
    }

    fn filled_rows(&self, bar: &BarRect) -> u16 {
        if bar.score == 0 {
            return 0;
        }
        let rows = bar.height.round().clamp(0.0, f64::from(self.half_rows)) as u16;
        rows.max(1).min(self.half_rows)
    }

    /// Absolute `[top, bottom)` rows covered by a bar, `None` when it has no cells.
    pub fn bar_rows(&self, bar: &BarRect) -> Option<(u16, u16)> {
        let rows = self.filled_rows(bar);
        if rows == 0 {
            return None;
        }
        let mid = self.midline_row();
        match bar.side {
            BarSide::Selected => Some((mid - rows, mid)),
            BarSide::Opponent => Some((mid + 1, mid + 1 + rows)),
        }
    }

    fn tick_row(&self, tick: &AxisTick, side: BarSide) -> u16 {
        let mid = self.midline_row();
        let half = f64::from(self.half_rows);
        match side {
            BarSide::Selected => {
                let rows = (half - tick.y).round().clamp(0.0, half) as u16;
                mid - rows
            }
            BarSide::Opponent => {
                let rows = (tick.y - half).round().clamp(0.0, half) as u16;
                mid + rows
            }
        }
    }

    fn tick_count(&self) -> usize {
        usize::from(self.half_rows / 2).max(1)
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<BarHit> {
        let plot = self.plot;
        if column < plot.x
            || column >= plot.x + plot.width
            || row < plot.y
            || row >= plot.y + plot.height
        {
            return None;
        }
        let side = match row.cmp(&self.midline_row()) {
            std::cmp::Ordering::Less => BarSide::Selected,
            std::cmp::Ordering::Greater => BarSide::Opponent,
            std::cmp::Ordering::Equal => return None,
        };
        let count = self.layout.bands.count();
        let local = f64::from(column - plot.x) + 0.5;
        let mut index = self.layout.bands.index_at(local)?;
        // Band column starts and ends never decrease with the index, so the bands
        // covering `column` are contiguous. Walk them last-drawn first.
        while index + 1 < count && self.band_columns(index + 1).0 <= column {
            index += 1;
        }
        loop {
            let (start, end) = self.band_columns(index);
            if end <= column {
                return None;
            }
            if start <= column && self.covers(index, side, row) {
                return Some(BarHit { index, side });
            }
            index = index.checked_sub(1)?;
        }
    }

    fn covers(&self, index: usize, side: BarSide, row: u16) -> bool {
        self.layout
            .bar(index, side)
            .and_then(|bar| self.bar_rows(bar))
            .is_some_and(|(top, bottom)| row >= top && row < bottom)
    }

    /// Cell next to the outer end of a bar, used to place keyboard-driven tooltips.
    pub fn bar_anchor(&self, hit: BarHit) -> Option<(u16, u16)> {
        let bar = self.layout.bar(hit.index, hit.side)?;
        let (_, end) = self.band_columns(hit.index);
        let row = match self.bar_rows(bar) {
            Some((top, bottom)) => match hit.side {
                BarSide::Selected => top,
                BarSide::Opponent => bottom - 1,
            },
            None => self.midline_row(),
        };
        Some((end.saturating_sub(1), row))
    }
}

pub struct ChartWidget<'a> {
    matches: &'a [NormalizedMatch],
    hover: Option<BarHit>,
    block: Option<Block<'a>>,
}

impl<'a> ChartWidget<'a> {
    pub fn new(matches: &'a [NormalizedMatch]) -> Self {
        Self {
            matches,
            hover: None,
            block: None,
        }
    }

    pub fn hover(mut self, hover: Option<BarHit>) -> Self {
        self.hover = hover;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for ChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        let Some(geometry) = ChartGeometry::new(inner, self.matches) else {
            Paragraph::new("Chart needs more room")
                .style(Style::default().fg(Color::DarkGray))
                .render(inner, buf);
            return;
        };

        render_axes(&geometry, buf);

        for bar in &geometry.layout.bars {
            let Some((top, bottom)) = geometry.bar_rows(bar) else {
                continue;
            };
            let (start, end) = geometry.band_columns(bar.index);
            let color = match bar.side {
                BarSide::Selected => SELECTED_COLOR,
                BarSide::Opponent => OPPONENT_COLOR,
            };
            let hovered = self.hover == Some(BarHit {
                index: bar.index,
                side: bar.side,
            });
            let (glyph, style) = if hovered {
                (
                    HOVER_GLYPH,
                    Style::default()
                        .fg(color)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (BAR_GLYPH, Style::default().fg(color))
            };
            let run = glyph.repeat(usize::from(end - start));
            for row in top..bottom {
                buf.set_string(start, row, &run, style);
            }
        }

        if self.matches.is_empty() {
            let note = "No matches for this selection";
            let y = geometry.plot.y + geometry.half_rows / 2;
            let width = geometry.plot.width.min(note.chars().count() as u16);
            let x = geometry.plot.x + (geometry.plot.width - width) / 2;
            buf.set_string(
                x,
                y,
                &note[..usize::from(width)],
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}

fn render_axes(geometry: &ChartGeometry, buf: &mut Buffer) {
    let axis_style = Style::default().fg(Color::Gray);
    let label_style = Style::default().fg(Color::DarkGray);
    let axis_x = geometry.plot.x - 1;
    let mid = geometry.midline_row();

    for row in geometry.plot.y..geometry.plot.y + geometry.plot.height {
        buf.set_string(axis_x, row, "│", axis_style);
    }

    let count = geometry.tick_count();
    let layout = &geometry.layout;
    let ticks = layout
        .selected_ticks(count)
        .into_iter()
        .map(|t| (t, BarSide::Selected))
        .chain(
            layout
                .opponent_ticks(count)
                .into_iter()
                .map(|t| (t, BarSide::Opponent)),
        );
    let label_width = usize::from(AXIS_GUTTER - 1);
    for (tick, side) in ticks {
        let row = geometry.tick_row(&tick, side);
        let label = format!("{:>label_width$}", tick.label);
        let label = if label.chars().count() > label_width {
            label.chars().take(label_width).collect()
        } else {
            label
        };
        buf.set_string(geometry.area.x, row, label, label_style);
        buf.set_string(axis_x, row, "┤", axis_style);
    }

    let rule = "─".repeat(usize::from(geometry.plot.width));
    buf.set_string(geometry.plot.x, mid, rule, axis_style);
    buf.set_string(axis_x, mid, "┼", axis_style);
    if layout.bands.step() >= 3.0 {
        for index in 0..layout.bands.count() {
            let center = layout.bands.x(index) + layout.bands.bandwidth() / 2.0;
            let column = geometry.plot.x + (center.floor() as u16).min(geometry.plot.width - 1);
            buf.set_string(column, mid, "┬", axis_style);
        }
    }
}

/// Hover text for one bar: score, date and the team on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn for_bar(m: &NormalizedMatch, side: BarSide) -> Self {
        let (score, team) = match side {
            BarSide::Selected => (m.selected_score, &m.selected_team),
            BarSide::Opponent => (m.opponent_score, &m.opponent_team),
        };
        Self {
            lines: vec![
                format!("Score: {score}"),
                format!("Date: {}", m.date_label()),
                format!("Team: {team}"),
            ],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        let width = self
            .lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        (width as u16 + 2, self.lines.len() as u16 + 2)
    }
}

impl Widget for Tooltip {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        Paragraph::new(self.lines.join("\n"))
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .render(area, buf);
    }
}

/// Places a box of `size` just below-right of `anchor`, flipping to the other
/// side of the anchor when it would leave `bounds`.
pub fn tooltip_rect(anchor: (u16, u16), size: (u16, u16), bounds: Rect) -> Rect {
    let (col, row) = anchor;
    let width = size.0.min(bounds.width);
    let height = size.1.min(bounds.height);
    let right = bounds.x + bounds.width;
    let bottom = bounds.y + bounds.height;

    let mut x = col.saturating_add(2);
    if x + width > right {
        x = col.saturating_sub(width + 1);
    }
    let mut y = row.saturating_add(1);
    if y + height > bottom {
        y = row.saturating_sub(height);
    }
    let x = x.clamp(bounds.x, right - width);
    let y = y.clamp(bounds.y, bottom - height);
    Rect::new(x, y, width, height)
}
