// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use analysis::{Classifier, NoData, PassReport, PassSettings, SortKey, run_pass};
pub use data::{BarSource, BinanceBarSource, FetchError, load_symbols};
pub use domain::{Bar, PairInterval, WindowSpec};
pub use models::{OhlcvSeries, Row, Signal};

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
// CLI argument parsing
use clap::Parser;

use crate::analysis::window_stats::validate_windows;
use crate::config::{ANALYSIS, CSV_EXPORT_PATH, PAIRS_PATH};
use crate::utils::time_utils::parse_duration_ms;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Symbol list: JSON array of strings, or one symbol per line
    #[arg(long, default_value = PAIRS_PATH)]
    pub pairs_file: PathBuf,

    /// Bar interval, e.g. 15m, 1h, 1d
    #[arg(long)]
    pub interval: Option<String>,

    /// Bars fetched per symbol (defaults to the longest window)
    #[arg(long)]
    pub max_bars: Option<usize>,

    /// Look-back window such as 24h, 1w or 3M; repeat for several
    #[arg(long = "window")]
    pub windows: Vec<String>,

    /// Fraction of the reference high/low that counts as near it
    #[arg(long)]
    pub near_threshold: Option<f64>,

    /// Fraction below the best buy level for the stop loss
    #[arg(long)]
    pub stop_loss: Option<f64>,

    /// Seconds between passes
    #[arg(long, default_value_t = ANALYSIS.refresh_secs)]
    pub refresh_secs: u64,

    /// Run a single pass and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Write each pass to a CSV file
    #[arg(long, num_args = 0..=1, default_missing_value = CSV_EXPORT_PATH)]
    pub csv: Option<PathBuf>,

    /// Print rows as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Row order: produced, symbol, price, profit or range:<label>
    #[arg(long, default_value = "produced")]
    pub sort: SortKey,
}

fn check_fraction(name: &str, value: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&value) {
        bail!("--{} must be in [0, 1), got {}", name, value);
    }
    Ok(value)
}

impl Cli {
    pub fn interval_ms(&self) -> Result<i64> {
        match &self.interval {
            Some(text) => {
                parse_duration_ms(text).with_context(|| format!("invalid --interval '{}'", text))
            }
            None => Ok(ANALYSIS.interval_width_ms),
        }
    }

    /// Merge the flags over the compiled-in defaults.
    pub fn pass_settings(&self) -> Result<PassSettings> {
        let interval_ms = self.interval_ms()?;

        let shorthands: Vec<&str> = if self.windows.is_empty() {
            ANALYSIS.windows.to_vec()
        } else {
            self.windows.iter().map(String::as_str).collect()
        };
        let windows = shorthands
            .iter()
            .map(|s| WindowSpec::parse(s, interval_ms))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --window")?;
        validate_windows(&windows)?;

        let mut settings = PassSettings::new(interval_ms, windows);
        if let Some(max_bars) = self.max_bars {
            if max_bars == 0 {
                bail!("--max-bars must be positive");
            }
            settings.max_bars = max_bars;
        }
        if let Some(t) = self.near_threshold {
            settings.classifier.near_threshold = check_fraction("near-threshold", t)?;
        }
        if let Some(f) = self.stop_loss {
            settings.classifier.stop_loss_fraction = check_fraction("stop-loss", f)?;
        }
        if let SortKey::Range(label) = &self.sort {
            if !settings.windows.iter().any(|w| &w.label == label) {
                bail!(
                    "--sort range:{} does not name a configured window (windows: {})",
                    label,
                    shorthands.join(", ")
                );
            }
        }
        settings.sort = self.sort.clone();
        Ok(settings)
    }
}
