//! Presentation formatting defaults

pub struct ReportConfig {
    /// Decimal places for prices and averages
    pub price_decimals: usize,
    /// Decimal places for percentages
    pub pct_decimals: usize,
    /// What an unavailable value is rendered as
    pub unavailable: &'static str,
}

pub const REPORT: ReportConfig = ReportConfig {
    price_decimals: 4,
    pct_decimals: 2,
    unavailable: "-",
};
