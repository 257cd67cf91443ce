use chrono::NaiveDate;
use results_terminal::dataset::MatchRecord;
use results_terminal::normalize::{DateInterval, involves, normalize, parse_date};

fn day(raw: &str) -> NaiveDate {
    parse_date(raw).expect("valid date")
}

fn record(date: &str, home: &str, away: &str, home_score: u32, away_score: u32) -> MatchRecord {
    MatchRecord {
        line: 0,
        date: day(date),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score,
        away_score,
        tournament: "Friendly".to_string(),
        country: "Nowhere".to_string(),
        city: "Town".to_string(),
    }
}

fn interval(min: &str, max: &str) -> DateInterval {
    DateInterval::new(day(min), day(max))
}

fn sample() -> Vec<MatchRecord> {
    vec![
        record("2019-12-31", "A", "B", 1, 1),
        record("2020-01-01", "A", "B", 3, 1),
        record("2020-02-01", "C", "A", 4, 0),
        record("2020-03-01", "B", "C", 2, 2),
        record("2020-04-01", "A", "D", 0, 5),
        record("2021-01-01", "D", "A", 1, 2),
    ]
}

#[test]
fn home_pivot_is_not_swapped() {
    let records = sample();
    let out = normalize(&records, "A", &interval("2020-01-01", "2020-12-31"));
    for m in out.iter().filter(|m| m.opponent_team != "C") {
        let source = records
            .iter()
            .find(|r| r.date == m.date)
            .expect("output comes from input");
        assert_eq!(source.home_team, "A");
        assert_eq!(m.selected_team, source.home_team);
        assert_eq!(m.selected_score, source.home_score);
        assert_eq!(m.opponent_score, source.away_score);
    }
}

#[test]
fn away_pivot_swaps_teams_and_scores() {
    let records = sample();
    let out = normalize(&records, "A", &interval("2020-02-01", "2020-02-01"));
    assert_eq!(out.len(), 1);
    let m = &out[0];
    assert_eq!(m.selected_team, "A");
    assert_eq!(m.opponent_team, "C");
    assert_eq!(m.selected_score, 0);
    assert_eq!(m.opponent_score, 4);
}

#[test]
fn output_is_exactly_the_matching_records_in_order() {
    let records = sample();
    let range = interval("2020-01-01", "2020-12-31");
    let out = normalize(&records, "A", &range);

    let expected = records
        .iter()
        .filter(|r| involves(r, "A") && range.contains(r.date))
        .map(|r| r.date)
        .collect::<Vec<_>>();
    let got = out.iter().map(|m| m.date).collect::<Vec<_>>();
    assert_eq!(got, expected);
    assert_eq!(
        got,
        vec![day("2020-01-01"), day("2020-02-01"), day("2020-04-01")]
    );
    assert!(out.iter().all(|m| m.selected_team == "A"));
}

#[test]
fn basic_scenario_reorients_to_away_pivot() {
    let records = vec![record("2020-01-01", "A", "B", 3, 1)];
    let out = normalize(&records, "B", &interval("2020-01-01", "2020-01-01"));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].selected_team, "B");
    assert_eq!(out[0].opponent_team, "A");
    assert_eq!(out[0].selected_score, 1);
    assert_eq!(out[0].opponent_score, 3);
    assert_eq!(out[0].date_label(), "2020-01-01");
}

#[test]
fn unknown_pivot_yields_nothing() {
    let records = vec![record("2020-01-01", "A", "B", 3, 1)];
    let out = normalize(&records, "C", &interval("2020-01-01", "2020-01-01"));
    assert!(out.is_empty());
}

#[test]
fn empty_pivot_yields_nothing() {
    let out = normalize(&sample(), "", &interval("2000-01-01", "2030-01-01"));
    assert!(out.is_empty());
}

#[test]
fn inverted_interval_yields_nothing() {
    let range = interval("2020-12-31", "2020-01-01");
    assert!(range.is_inverted());
    assert!(normalize(&sample(), "A", &range).is_empty());
}

#[test]
fn input_is_left_untouched() {
    let records = sample();
    let before = records.clone();
    let _ = normalize(&records, "A", &interval("2000-01-01", "2030-01-01"));
    assert_eq!(records, before);
}
