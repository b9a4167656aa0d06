//! Input and output file locations

/// Symbol list read once at start. `.json` holds an array of strings,
/// anything else is one symbol per line.
pub const PAIRS_PATH: &str = "pairs.txt";

/// Default destination for `--csv` when no path is given
pub const CSV_EXPORT_PATH: &str = "crypto_ranges.csv";
