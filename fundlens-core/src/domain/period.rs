//! Period keys: the aggregation granularities a funding-rate total is reported for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aggregation window for a funding-rate total.
///
/// Ordering follows the column order used by every multi-period table:
/// hour, day, week, month, quarter, year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKey {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodKey {
    /// Every period, in column order.
    pub const ALL: [PeriodKey; 6] = [
        PeriodKey::Hour,
        PeriodKey::Day,
        PeriodKey::Week,
        PeriodKey::Month,
        PeriodKey::Quarter,
        PeriodKey::Year,
    ];

    /// Wire value used by the API (`"hour"`, `"day"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodKey::Hour => "hour",
            PeriodKey::Day => "day",
            PeriodKey::Week => "week",
            PeriodKey::Month => "month",
            PeriodKey::Quarter => "quarter",
            PeriodKey::Year => "year",
        }
    }

    /// Column header label.
    pub fn label(self) -> &'static str {
        match self {
            PeriodKey::Hour => "Hour",
            PeriodKey::Day => "Day",
            PeriodKey::Week => "Week",
            PeriodKey::Month => "Month",
            PeriodKey::Quarter => "Quarter",
            PeriodKey::Year => "Year",
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the six period keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown period key: '{0}'")]
pub struct ParsePeriodError(pub String);

impl FromStr for PeriodKey {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(PeriodKey::Hour),
            "day" => Ok(PeriodKey::Day),
            "week" => Ok(PeriodKey::Week),
            "month" => Ok(PeriodKey::Month),
            "quarter" => Ok(PeriodKey::Quarter),
            "year" => Ok(PeriodKey::Year),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_column_order() {
        let mut sorted = PeriodKey::ALL;
        sorted.sort();
        assert_eq!(sorted, PeriodKey::ALL);
        assert_eq!(PeriodKey::ALL[0], PeriodKey::Hour);
        assert_eq!(PeriodKey::ALL[5], PeriodKey::Year);
    }

    #[test]
    fn parses_wire_values() {
        for p in PeriodKey::ALL {
            assert_eq!(p.as_str().parse::<PeriodKey>().unwrap(), p);
        }
        assert_eq!(" Quarter ".parse::<PeriodKey>().unwrap(), PeriodKey::Quarter);
    }

    #[test]
    fn rejects_unknown_period() {
        let err = "fortnight".parse::<PeriodKey>().unwrap_err();
        assert_eq!(err, ParsePeriodError("fortnight".into()));
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&PeriodKey::Month).unwrap();
        assert_eq!(json, "\"month\"");
        let back: PeriodKey = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(back, PeriodKey::Week);
    }
}
