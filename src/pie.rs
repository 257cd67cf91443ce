use std::f64::consts::TAU;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Widget};

use crate::chart::{OPPONENT_COLOR, SELECTED_COLOR};
use crate::drilldown::PieShare;

/// Outer radius as a fraction of the half-height of the drawing area.
pub const OUTER_RADIUS: f64 = 0.8;

pub const SLICE_COLORS: [Color; 2] = [SELECTED_COLOR, OPPONENT_COLOR];

/// Angular extent of one share, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieArc {
    pub index: usize,
    pub value: f64,
    pub start: f64,
    pub end: f64,
}

impl PieArc {
    pub fn contains(&self, angle: f64) -> bool {
        self.start <= angle && angle < self.end
    }
}

/// Lays the shares around the circle largest-first; arcs are returned in
/// input order so colors stay attached to their share.
pub fn pie_arcs(shares: &[PieShare; 2]) -> [PieArc; 2] {
    let values = shares.each_ref().map(|s| {
        if s.percentage.is_finite() {
            s.percentage.max(0.0)
        } else {
            0.0
        }
    });
    let total: f64 = values.iter().sum();
    let scale = if total > 0.0 { TAU / total } else { 0.0 };

    let mut order = [0usize, 1];
    order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));

    let mut arcs = [PieArc {
        index: 0,
        value: 0.0,
        start: 0.0,
        end: 0.0,
    }; 2];
    let mut angle = 0.0;
    for index in order {
        let end = angle + values[index] * scale;
        arcs[index] = PieArc {
            index,
            value: values[index],
            start: angle,
            end,
        };
        angle = end;
    }
    // Close the circle exactly despite rounding.
    if let Some(last) = order.iter().rev().find(|i| values[**i] > 0.0) {
        arcs[*last].end = TAU;
    }
    arcs
}

/// Angle of `(x, y)` measured clockwise from the positive y axis, in `[0, TAU)`.
pub fn clock_angle(x: f64, y: f64) -> f64 {
    let angle = x.atan2(y);
    if angle < 0.0 { angle + TAU } else { angle }
}

pub struct PieWidget<'a> {
    shares: &'a [PieShare; 2],
    block: Option<Block<'a>>,
}

impl<'a> PieWidget<'a> {
    pub fn new(shares: &'a [PieShare; 2]) -> Self {
        Self {
            shares,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for PieWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Braille dots are square when a cell is twice as tall as it is wide.
        let dots_x = usize::from(inner.width) * 2;
        let dots_y = usize::from(inner.height) * 4;
        let half_x = dots_x as f64 / dots_y as f64;

        let arcs = pie_arcs(self.shares);
        let mut slices: [Vec<(f64, f64)>; 2] = [Vec::new(), Vec::new()];
        for i in 0..dots_x {
            let x = -half_x + (i as f64 + 0.5) * (2.0 * half_x) / dots_x as f64;
            for j in 0..dots_y {
                let y = -1.0 + (j as f64 + 0.5) * 2.0 / dots_y as f64;
                if x * x + y * y > OUTER_RADIUS * OUTER_RADIUS {
                    continue;
                }
                let angle = clock_angle(x, y);
                if let Some(arc) = arcs.iter().find(|a| a.contains(angle)) {
                    slices[arc.index].push((x, y));
                }
            }
        }

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-half_x, half_x])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (index, coords) in slices.iter().enumerate() {
                    ctx.draw(&Points {
                        coords,
                        color: SLICE_COLORS[index],
                    });
                }
            })
            .render(inner, buf);
    }
}
