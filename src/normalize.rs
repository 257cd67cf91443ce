use chrono::NaiveDate;

use crate::dataset::{DATE_FORMAT, MatchRecord};
use crate::error::{ExplorerError, ExplorerResult};

/// Inclusive calendar-date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateInterval {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    pub fn label(&self) -> String {
        format!(
            "{} .. {}",
            self.min.format(DATE_FORMAT),
            self.max.format(DATE_FORMAT)
        )
    }
}

pub fn parse_date(raw: &str) -> ExplorerResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ExplorerError::InvalidDate {
        value: raw.trim().to_string(),
    })
}

/// A match seen from the pivot country's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMatch {
    pub date: NaiveDate,
    pub tournament: String,
    pub country: String,
    pub city: String,
    pub selected_team: String,
    pub opponent_team: String,
    pub selected_score: u32,
    pub opponent_score: u32,
}

impl NormalizedMatch {
    fn from_record(record: &MatchRecord, pivot: &str) -> Self {
        let (selected_team, opponent_team, selected_score, opponent_score) =
            if record.home_team == pivot {
                (
                    &record.home_team,
                    &record.away_team,
                    record.home_score,
                    record.away_score,
                )
            } else {
                (
                    &record.away_team,
                    &record.home_team,
                    record.away_score,
                    record.home_score,
                )
            };
        Self {
            date: record.date,
            tournament: record.tournament.clone(),
            country: record.country.clone(),
            city: record.city.clone(),
            selected_team: selected_team.clone(),
            opponent_team: opponent_team.clone(),
            selected_score,
            opponent_score,
        }
    }

    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

pub fn involves(record: &MatchRecord, pivot: &str) -> bool {
    record.home_team == pivot || record.away_team == pivot
}

/// Filters `records` to matches involving `pivot` inside `interval` and
/// reorients each so the pivot is always the selected side.
///
/// An empty pivot or an inverted interval yields an empty sequence.
pub fn normalize(
    records: &[MatchRecord],
    pivot: &str,
    interval: &DateInterval,
) -> Vec<NormalizedMatch> {
    if pivot.is_empty() || interval.is_inverted() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| involves(r, pivot) && interval.contains(r.date))
        .map(|r| NormalizedMatch::from_record(r, pivot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let interval = DateInterval::new(day("2020-01-01"), day("2020-12-31"));
        assert!(interval.contains(day("2020-01-01")));
        assert!(interval.contains(day("2020-12-31")));
        assert!(!interval.contains(day("2021-01-01")));
    }

    #[test]
    fn rejects_non_iso_dates() {
        let err = parse_date("01/02/2020").unwrap_err();
        assert_eq!(
            err,
            ExplorerError::InvalidDate {
                value: "01/02/2020".to_string()
            }
        );
    }
}
