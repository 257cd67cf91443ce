use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::loader::Sources;
use crate::normalize::parse_date;

/// Terminal explorer for international football results.
#[derive(Debug, Clone, Parser)]
#[command(name = "results_terminal", version)]
pub struct Config {
    /// Results dataset: CSV path or http(s) URL.
    #[arg(long = "data", env = "RESULTS_SOURCE", default_value = "data/results.csv")]
    pub data: String,

    /// Optional TSV with `iso_n3` and `name` columns used for the country picker.
    #[arg(long = "countries", env = "COUNTRY_NAMES_SOURCE")]
    pub countries: Option<String>,

    /// Country selected at startup.
    #[arg(long = "country", env = "DEFAULT_COUNTRY")]
    pub country: Option<String>,

    /// First day of the initial range (YYYY-MM-DD); defaults to the earliest match.
    #[arg(long = "from", env = "RANGE_FROM", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last day of the initial range (YYYY-MM-DD); defaults to the latest match.
    #[arg(long = "to", env = "RANGE_TO", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    #[arg(long = "log-dir", env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

impl Config {
    /// Loads `.env.local` and `.env` before reading arguments and environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::parse()
    }

    pub fn sources(&self) -> Sources {
        Sources {
            results: self.data.clone(),
            countries: self
                .countries
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn initial_country(&self) -> Option<String> {
        self.country
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| err.to_string())
}
