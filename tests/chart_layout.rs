use chrono::NaiveDate;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use results_terminal::chart::{
    BarHit, BarSide, ChartGeometry, ChartLayout, ChartWidget, OPPONENT_COLOR, SELECTED_COLOR,
    Tooltip, tooltip_rect,
};
use results_terminal::normalize::NormalizedMatch;
use results_terminal::scale::opponent_tick_label;

fn normalized(day: u32, selected_score: u32, opponent_score: u32) -> NormalizedMatch {
    NormalizedMatch {
        date: NaiveDate::from_ymd_opt(2020, 1, day).expect("valid date"),
        tournament: "Friendly".to_string(),
        country: "Nowhere".to_string(),
        city: "Town".to_string(),
        selected_team: "A".to_string(),
        opponent_team: "B".to_string(),
        selected_score,
        opponent_score,
    }
}

fn pair() -> Vec<NormalizedMatch> {
    vec![normalized(1, 3, 1), normalized(2, 0, 2)]
}

fn row_text(buf: &Buffer, y: u16, from: u16, to: u16) -> String {
    (from..to).map(|x| buf.get(x, y).symbol()).collect()
}

// 25x11 cells: 5 gutter columns, 20 plot columns, 5 rows per half around row 5.
fn area() -> Rect {
    Rect::new(0, 0, 25, 11)
}

#[test]
fn opponent_axis_counts_down_from_the_maximum() {
    assert_eq!(opponent_tick_label(10.0, 10.0), "0");
    assert_eq!(opponent_tick_label(10.0, 0.0), "10");
    assert_eq!(opponent_tick_label(10.0, 4.0), "6");

    let matches = vec![normalized(1, 2, 10), normalized(2, 1, 3)];
    let layout = ChartLayout::compute(&matches, 40.0, 20.0);
    let labels = layout
        .opponent_ticks(5)
        .into_iter()
        .map(|t| t.label)
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["10", "8", "6", "4", "2", "0"]);
}

#[test]
fn goalless_opponents_keep_only_the_midline_tick() {
    let matches = vec![normalized(1, 2, 0), normalized(2, 1, 0)];
    let layout = ChartLayout::compute(&matches, 40.0, 20.0);
    let ticks = layout.opponent_ticks(5);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].label, "0");
    assert_eq!(ticks[0].y, layout.midline());
}

#[test]
fn bars_grow_away_from_the_midline() {
    let layout = ChartLayout::compute(&pair(), 20.0, 10.0);
    assert_eq!(layout.midline(), 5.0);
    assert_eq!(layout.bars.len(), 4);

    let up = layout.bar(0, BarSide::Selected).expect("selected bar");
    assert_eq!(up.y, 0.0);
    assert_eq!(up.height, 5.0);

    let down = layout.bar(0, BarSide::Opponent).expect("opponent bar");
    assert_eq!(down.y, 5.0);
    assert_eq!(down.height, 2.5);

    let full = layout.bar(1, BarSide::Opponent).expect("opponent bar");
    assert_eq!(full.height, 5.0);
    assert_eq!(layout.bar(1, BarSide::Selected).map(|b| b.height), Some(0.0));
}

#[test]
fn empty_sequence_has_no_bars_and_a_unit_domain() {
    let layout = ChartLayout::compute(&[], 20.0, 10.0);
    assert!(layout.bars.is_empty());
    assert_eq!(layout.selected_scale.domain_max(), 1.0);
    assert_eq!(layout.opponent_scale.domain_max(), 1.0);
}

#[test]
fn hit_test_finds_filled_cells_only() {
    let geometry = ChartGeometry::new(area(), &pair()).expect("room for a chart");
    assert_eq!(geometry.midline_row(), 5);
    assert_eq!(geometry.band_columns(0), (6, 15));
    assert_eq!(geometry.band_columns(1), (15, 24));

    assert_eq!(
        geometry.hit_test(7, 2),
        Some(BarHit {
            index: 0,
            side: BarSide::Selected
        })
    );
    assert_eq!(
        geometry.hit_test(16, 8),
        Some(BarHit {
            index: 1,
            side: BarSide::Opponent
        })
    );
    // midline, a goalless bar, below a short bar, and the gutter
    assert_eq!(geometry.hit_test(7, 5), None);
    assert_eq!(geometry.hit_test(16, 2), None);
    assert_eq!(geometry.hit_test(7, 10), None);
    assert_eq!(geometry.hit_test(2, 2), None);
}

#[test]
fn every_painted_cell_of_a_dense_chart_is_hittable() {
    let matches = (0u32..100)
        .map(|i| {
            let selected = if i % 2 == 0 { 2 } else { 0 };
            normalized(1 + i % 28, selected, i % 2)
        })
        .collect::<Vec<_>>();
    let geometry = ChartGeometry::new(area(), &matches).expect("room for a chart");
    let mut buf = Buffer::empty(area());
    ChartWidget::new(&matches).render(area(), &mut buf);

    let mut painted = 0;
    for row in geometry.plot.y..geometry.plot.y + geometry.plot.height {
        for column in geometry.plot.x..geometry.plot.x + geometry.plot.width {
            if buf.get(column, row).symbol() != "█" {
                continue;
            }
            painted += 1;
            let hit = geometry
                .hit_test(column, row)
                .unwrap_or_else(|| panic!("painted cell ({column}, {row}) is not hittable"));
            let (start, end) = geometry.band_columns(hit.index);
            assert!(start <= column && column < end);
            let expected = if row < geometry.midline_row() {
                SELECTED_COLOR
            } else {
                OPPONENT_COLOR
            };
            assert_eq!(buf.get(column, row).fg, expected);
        }
    }
    assert!(painted > 0);
}

#[test]
fn dense_bands_report_the_band_under_the_pointer() {
    let matches = (0..100).map(|i| normalized(1 + (i % 28), 2, 2)).collect::<Vec<_>>();
    let geometry = ChartGeometry::new(area(), &matches).expect("room for a chart");
    for column in geometry.plot.x..geometry.plot.x + geometry.plot.width {
        if let Some(hit) = geometry.hit_test(column, 4) {
            let (start, end) = geometry.band_columns(hit.index);
            assert!(start <= column && column < end);
            assert_eq!(hit.side, BarSide::Selected);
        }
    }
}

#[test]
fn keyboard_anchor_sits_at_the_bar_end() {
    let geometry = ChartGeometry::new(area(), &pair()).expect("room for a chart");
    assert_eq!(
        geometry.bar_anchor(BarHit {
            index: 0,
            side: BarSide::Selected
        }),
        Some((14, 0))
    );
    assert_eq!(
        geometry.bar_anchor(BarHit {
            index: 1,
            side: BarSide::Opponent
        }),
        Some((23, 10))
    );
}

#[test]
fn renders_bars_axes_and_inverted_labels() {
    let mut buf = Buffer::empty(area());
    ChartWidget::new(&pair()).render(area(), &mut buf);

    assert_eq!(buf.get(7, 2).symbol(), "█");
    assert_eq!(buf.get(7, 2).fg, SELECTED_COLOR);
    assert_eq!(buf.get(16, 8).symbol(), "█");
    assert_eq!(buf.get(16, 8).fg, OPPONENT_COLOR);
    assert_eq!(buf.get(16, 2).symbol(), " ");

    assert_eq!(buf.get(4, 5).symbol(), "┼");
    assert_eq!(buf.get(12, 5).symbol(), "─");
    assert_eq!(buf.get(10, 5).symbol(), "┬");

    // Selected axis reads 2 above the midline; the opponent axis reads its
    // maximum at the bottom row.
    assert_eq!(row_text(&buf, 2, 0, 5), "   2┤");
    assert_eq!(row_text(&buf, 10, 0, 5), "   2┤");
    assert_eq!(row_text(&buf, 8, 0, 5), "   1┤");
}

#[test]
fn hovered_bar_is_highlighted() {
    let mut buf = Buffer::empty(area());
    ChartWidget::new(&pair())
        .hover(Some(BarHit {
            index: 0,
            side: BarSide::Selected,
        }))
        .render(area(), &mut buf);
    assert_eq!(buf.get(7, 2).symbol(), "▓");
    assert_eq!(buf.get(7, 2).bg, Color::White);
    assert_eq!(buf.get(8, 7).symbol(), "█");
}

#[test]
fn empty_selection_renders_a_note() {
    let mut buf = Buffer::empty(area());
    ChartWidget::new(&[]).render(area(), &mut buf);
    assert!(row_text(&buf, 2, 5, 25).starts_with("No matches"));
    assert_eq!(buf.get(4, 5).symbol(), "┼");
}

#[test]
fn tooltip_names_the_side_under_the_pointer() {
    let m = normalized(1, 3, 1);
    let tooltip = Tooltip::for_bar(&m, BarSide::Opponent);
    assert_eq!(
        tooltip.lines,
        vec!["Score: 1", "Date: 2020-01-01", "Team: B"]
    );
    assert_eq!(tooltip.size(), (18, 5));

    let selected = Tooltip::for_bar(&m, BarSide::Selected);
    assert_eq!(selected.lines[0], "Score: 3");
    assert_eq!(selected.lines[2], "Team: A");
}

#[test]
fn tooltip_stays_inside_the_frame() {
    let bounds = Rect::new(0, 0, 40, 20);
    assert_eq!(tooltip_rect((10, 3), (18, 5), bounds), Rect::new(12, 4, 18, 5));
    assert_eq!(tooltip_rect((35, 3), (18, 5), bounds), Rect::new(16, 4, 18, 5));
    assert_eq!(tooltip_rect((10, 18), (18, 5), bounds), Rect::new(12, 13, 18, 5));
}
