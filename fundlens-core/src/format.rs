//! Value-to-string mappers used by every table and summary card.

use chrono::{DateTime, FixedOffset};

/// Funding rate as a percentage with 5 decimals: `0.0001` → `0.01000%`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.5}%", rate * 100.0)
}

/// Signed funding rate with 4 decimals: `0.0001` → `+0.0100%`.
pub fn format_signed_rate(rate: f64) -> String {
    let sign = if rate >= 0.0 { "+" } else { "" };
    format!("{sign}{:.4}%", rate * 100.0)
}

/// `APR: 10.95%` from a fractional APR.
pub fn format_apr(apr: f64) -> String {
    format!("APR: {:.2}%", apr * 100.0)
}

/// Annualized yield already expressed in percent.
pub fn format_annualized(percent: f64) -> String {
    format!("{percent:.2}%")
}

/// Compact volume: `1.23B`, `4.50M`, `7.00K`, or the plain number below 1000.
pub fn format_volume(volume: Option<f64>) -> String {
    let Some(v) = volume.filter(|v| v.is_finite()) else {
        return "-".to_string();
    };
    if v >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.2}K", v / 1e3)
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn gmt8() -> Option<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
}

/// `2025/07/23 08:00:00 GMT+8` from Unix milliseconds.
///
/// Out-of-range timestamps render as an empty string.
pub fn format_gmt8(timestamp_ms: i64) -> String {
    let (Some(utc), Some(tz)) = (DateTime::from_timestamp_millis(timestamp_ms), gmt8()) else {
        return String::new();
    };
    utc.with_timezone(&tz)
        .format("%Y/%m/%d %H:%M:%S GMT+8")
        .to_string()
}

/// Short `MM/DD HH:MM` label for chart axes, in GMT+8.
pub fn format_gmt8_short(timestamp_ms: i64) -> String {
    let (Some(utc), Some(tz)) = (DateTime::from_timestamp_millis(timestamp_ms), gmt8()) else {
        return String::new();
    };
    utc.with_timezone(&tz).format("%m/%d %H:%M").to_string()
}

/// Who pays whom at a given funding rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDirection {
    LongsPay,
    ShortsPay,
    Balanced,
}

impl RateDirection {
    pub fn of(rate: f64) -> Self {
        if rate > 0.0 {
            RateDirection::LongsPay
        } else if rate < 0.0 {
            RateDirection::ShortsPay
        } else {
            RateDirection::Balanced
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RateDirection::LongsPay => "Longs pay",
            RateDirection::ShortsPay => "Shorts pay",
            RateDirection::Balanced => "Balanced",
        }
    }
}

/// Qualitative bucket for an annualized arbitrage yield (percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArbitrageTier {
    Low,
    Moderate,
    Strong,
    Exceptional,
}

impl ArbitrageTier {
    pub fn of(annualized_percent: f64) -> Self {
        if annualized_percent > 100.0 {
            ArbitrageTier::Exceptional
        } else if annualized_percent > 50.0 {
            ArbitrageTier::Strong
        } else if annualized_percent > 20.0 {
            ArbitrageTier::Moderate
        } else {
            ArbitrageTier::Low
        }
    }
}
