use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use serde::Deserialize;

use crate::error::{ExplorerError, ExplorerResult};

#[derive(Debug, Deserialize)]
struct NameRow {
    iso_n3: String,
    name: String,
}

/// Numeric country code to display name, as published next to world geometry.
#[derive(Debug, Clone, Default)]
pub struct CountryNames {
    by_code: HashMap<String, String>,
}

impl CountryNames {
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.by_code.get(code.trim()).map(String::as_str)
    }

    /// Distinct display names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.by_code
            .values()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

pub fn parse_country_names<R: Read>(
    source_name: &str,
    reader: R,
) -> ExplorerResult<CountryNames> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut by_code = HashMap::new();
    for row in csv_reader.deserialize::<NameRow>() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(source = source_name, error = %err, "skipping country name row");
                continue;
            }
        };
        let code = row.iso_n3.trim();
        let name = row.name.trim();
        if code.is_empty() || name.is_empty() {
            continue;
        }
        by_code.insert(code.to_string(), name.to_string());
    }

    if by_code.is_empty() {
        return Err(ExplorerError::data_load(
            source_name,
            "no iso_n3/name rows found",
        ));
    }
    Ok(CountryNames { by_code })
}

/// Country picker entries filtered by a case-insensitive substring.
pub fn filter_names<'a>(names: &'a [String], query: &str) -> Vec<&'a String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return names.iter().collect();
    }
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_case_insensitive() {
        let names = vec!["Brazil".to_string(), "Germany".to_string(), "Gibraltar".to_string()];
        let hits = filter_names(&names, "BRA");
        assert_eq!(hits, vec![&names[0], &names[2]]);
    }
}
