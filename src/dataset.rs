use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ExplorerError, ExplorerResult};
use crate::normalize::DateInterval;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "home_team",
    "away_team",
    "home_score",
    "away_score",
    "tournament",
    "country",
    "city",
];

// Only the first few failures are kept verbatim; the rest are just counted.
const MAX_REPORTED_ERRORS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub line: u64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub tournament: String,
    pub country: String,
    pub city: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    home_team: String,
    away_team: String,
    home_score: String,
    away_score: String,
    tournament: String,
    country: String,
    city: String,
}

impl RawRow {
    fn validate(self, line: u64) -> ExplorerResult<MatchRecord> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            ExplorerError::Parse {
                line,
                field: "date",
                value: self.date.clone(),
            }
        })?;
        let home_team = non_empty(self.home_team, line, "home_team")?;
        let away_team = non_empty(self.away_team, line, "away_team")?;
        let home_score = parse_score(&self.home_score, line, "home_score")?;
        let away_score = parse_score(&self.away_score, line, "away_score")?;
        Ok(MatchRecord {
            line,
            date,
            home_team,
            away_team,
            home_score,
            away_score,
            tournament: self.tournament.trim().to_string(),
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
        })
    }
}

fn non_empty(raw: String, line: u64, field: &'static str) -> ExplorerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExplorerError::Parse {
            line,
            field,
            value: raw,
        });
    }
    Ok(trimmed.to_string())
}

fn parse_score(raw: &str, line: u64, field: &'static str) -> ExplorerResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| ExplorerError::Parse {
        line,
        field,
        value: raw.to_string(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub errors: Vec<ExplorerError>,
}

impl ParseReport {
    fn record_error(&mut self, err: ExplorerError) {
        tracing::warn!(error = %err, "skipping match record");
        self.rows_skipped += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(err);
        }
    }
}

/// Read-only store of validated match records, in file order.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    records: Vec<MatchRecord>,
}

impl DatasetStore {
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest match dates; the default filter interval.
    pub fn date_span(&self) -> Option<DateInterval> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some(DateInterval::new(min, max))
    }

    pub fn team_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for record in &self.records {
            names.insert(record.home_team.as_str());
            names.insert(record.away_team.as_str());
        }
        names.into_iter().map(str::to_string).collect()
    }
}

pub fn parse_results<R: Read>(
    source_name: &str,
    reader: R,
) -> ExplorerResult<(DatasetStore, ParseReport)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|err| ExplorerError::data_load(source_name, err))?
        .clone();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == **col))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ExplorerError::data_load(
            source_name,
            format!("missing columns: {}", missing.join(", ")),
        ));
    }
    let headers = csv::StringRecord::from(headers.iter().map(str::trim).collect::<Vec<_>>());

    let mut report = ParseReport::default();
    let mut records = Vec::new();
    for row in csv_reader.records() {
        report.rows_read += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                report.record_error(ExplorerError::Parse {
                    line,
                    field: "row",
                    value: err.to_string(),
                });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw = match row.deserialize::<RawRow>(Some(&headers)) {
            Ok(raw) => raw,
            Err(err) => {
                report.record_error(ExplorerError::Parse {
                    line,
                    field: "row",
                    value: err.to_string(),
                });
                continue;
            }
        };
        match raw.validate(line) {
            Ok(record) => records.push(record),
            Err(err) => report.record_error(err),
        }
    }

    report.rows_loaded = records.len();
    tracing::info!(
        source = source_name,
        loaded = report.rows_loaded,
        skipped = report.rows_skipped,
        "parsed results dataset"
    );
    Ok((DatasetStore::from_records(records), report))
}

pub fn parse_results_str(
    source_name: &str,
    raw: &str,
) -> ExplorerResult<(DatasetStore, ParseReport)> {
    parse_results(source_name, raw.as_bytes())
}

pub fn load_results_file(path: &Path) -> ExplorerResult<(DatasetStore, ParseReport)> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|err| ExplorerError::data_load(&name, err))?;
    parse_results(&name, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_with_whitespace_parses() {
        assert_eq!(parse_score(" 4 ", 2, "home_score"), Ok(4));
    }

    #[test]
    fn negative_score_is_rejected() {
        let err = parse_score("-1", 7, "away_score").unwrap_err();
        assert_eq!(
            err,
            ExplorerError::Parse {
                line: 7,
                field: "away_score",
                value: "-1".to_string(),
            }
        );
    }
}
