use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use crate::countries::{CountryNames, parse_country_names};
use crate::dataset::{DatasetStore, ParseReport, load_results_file, parse_results_str};
use crate::http_client::{fetch_text, is_url};
use crate::state::Delta;

/// Where the startup data comes from: local paths or http(s) URLs.
#[derive(Debug, Clone)]
pub struct Sources {
    pub results: String,
    pub countries: Option<String>,
}

pub fn spawn_loader(sources: Sources, tx: Sender<Delta>) -> JoinHandle<()> {
    thread::spawn(move || run_loader(&sources, &tx))
}

pub fn run_loader(sources: &Sources, tx: &Sender<Delta>) {
    match load_results(&sources.results) {
        Ok((store, report)) => {
            let _ = tx.send(Delta::DatasetLoaded { store, report });
        }
        Err(err) => {
            tracing::error!(
                source = %sources.results,
                error = %format!("{err:#}"),
                "dataset load failed"
            );
            let _ = tx.send(Delta::LoadFailed(format!("{err:#}")));
        }
    }

    let Some(countries) = &sources.countries else {
        return;
    };
    match load_country_names(countries) {
        Ok(names) => {
            let _ = tx.send(Delta::CountriesLoaded(names));
        }
        Err(err) => {
            tracing::warn!(
                source = %countries,
                error = %format!("{err:#}"),
                "country names unavailable"
            );
            let _ = tx.send(Delta::Log(format!(
                "[WARN] Country names unavailable: {err:#}"
            )));
        }
    }
}

pub fn load_results(source: &str) -> Result<(DatasetStore, ParseReport)> {
    if is_url(source) {
        let body = fetch_text(source).context("fetch results dataset")?;
        return Ok(parse_results_str(source, &body)?);
    }
    Ok(load_results_file(Path::new(source))?)
}

pub fn load_country_names(source: &str) -> Result<CountryNames> {
    if is_url(source) {
        let body = fetch_text(source).context("fetch country names")?;
        return Ok(parse_country_names(source, body.as_bytes())?);
    }
    let file = std::fs::File::open(source)
        .with_context(|| format!("open country names {source}"))?;
    Ok(parse_country_names(source, file)?)
}
