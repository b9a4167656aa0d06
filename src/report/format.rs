use crate::config::ReportConfig;

pub fn price(value: Option<f64>, config: &ReportConfig) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", config.price_decimals, v),
        _ => config.unavailable.to_string(),
    }
}

/// Percentages carry a `%` suffix; the sentinel does not.
pub fn percent(value: Option<f64>, config: &ReportConfig) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}%", config.pct_decimals, v),
        _ => config.unavailable.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REPORT;

    #[test]
    fn fixed_precision_and_sentinel() {
        assert_eq!(price(Some(16.0), &REPORT), "16.0000");
        assert_eq!(price(Some(0.123456), &REPORT), "0.1235");
        assert_eq!(price(None, &REPORT), "-");
        assert_eq!(percent(Some(33.333_333), &REPORT), "33.33%");
        assert_eq!(percent(None, &REPORT), "-");
        assert_eq!(percent(Some(f64::INFINITY), &REPORT), "-");
    }

    #[test]
    fn precision_follows_config() {
        let config = ReportConfig {
            price_decimals: 2,
            pct_decimals: 0,
            unavailable: "n/a",
        };
        assert_eq!(price(Some(1.005), &config), "1.00");
        assert_eq!(percent(Some(12.6), &config), "13%");
        assert_eq!(price(None, &config), "n/a");
    }
}
