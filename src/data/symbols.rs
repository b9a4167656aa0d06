use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use crate::domain::PairInterval;

/// Read the symbol list once. `.json` files hold an array of strings, any other
/// file is one symbol per line with `#` comments.
pub async fn load_symbols(path: impl AsRef<Path>, max_pairs: usize) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read symbol list {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let raw = if is_json {
        serde_json::from_str::<Vec<String>>(&content)
            .with_context(|| format!("{} is not a JSON array of strings", path.display()))?
    } else {
        parse_lines(&content)
    };

    let symbols = normalize_symbols(raw, max_pairs);
    log::info!("Loaded {} symbols from {}", symbols.len(), path.display());
    Ok(symbols)
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upper-case, strip separators, drop repeats (first one stays) and cap the list.
pub fn normalize_symbols(raw: Vec<String>, max_pairs: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let symbols: Vec<String> = raw
        .iter()
        .map(|s| PairInterval::normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect();

    if symbols.len() > max_pairs {
        log::warn!(
            "Symbol list has {} entries, only the first {} are used",
            symbols.len(),
            max_pairs
        );
    }

    symbols
        .into_iter()
        .take(max_pairs)
        .inspect(|s| {
            if PairInterval::get_quote(s).is_none() {
                log::warn!("{} has no known quote asset, fetching it anyway", s);
            }
        })
        .collect()
}
