use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let timeout = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(2);
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("failed to build http client")
    })
}

pub fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn fetch_text(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .header(USER_AGENT, concat!("results_terminal/", env!("CARGO_PKG_VERSION")))
        .send()
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status} from {url}"));
    }
    Ok(body)
}
