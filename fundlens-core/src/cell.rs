//! Rate cell rendering shared by every table.
//!
//! A [`RankedCell`] collects the optional inputs of a rate cell and resolves
//! them into a [`CellView`]: the rate text, an optional APR line, an optional
//! emphasis background, and tooltip lines. Rendering back ends (terminal,
//! CSV) only consume the view.

use crate::color::{emphasis, Rgb};
use crate::domain::{PeriodKey, Row, RowIdentity};
use crate::format::{format_apr, format_rate};
use crate::rank::{RankInfo, RankMap};

/// Glyph shown when a cell has no finite value.
pub const PLACEHOLDER: &str = "-";

/// Resolved, back-end neutral cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub text: String,
    pub apr_text: Option<String>,
    pub background: Option<Rgb>,
    pub tooltip: Vec<String>,
}

impl CellView {
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            apr_text: None,
            background: None,
            tooltip: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.text == PLACEHOLDER && self.apr_text.is_none()
    }

    /// Value text followed by the tooltip lines, for single-line renderers.
    pub fn inline(&self) -> String {
        let mut out = self.text.clone();
        for line in &self.tooltip {
            out.push(' ');
            out.push_str(line);
        }
        out
    }
}

/// Builder for a single rate cell.
#[derive(Debug, Clone, Default)]
pub struct RankedCell {
    value: Option<f64>,
    rank: Option<RankInfo>,
    tooltip: Vec<String>,
    apr: Option<f64>,
    funding_interval: Option<f64>,
    period: Option<PeriodKey>,
}

impl RankedCell {
    pub fn new(value: Option<f64>) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn rank(mut self, rank: Option<&RankInfo>) -> Self {
        self.rank = rank.copied();
        self
    }

    pub fn tooltip(mut self, line: impl Into<String>) -> Self {
        self.tooltip.push(line.into());
        self
    }

    pub fn apr(mut self, apr: Option<f64>) -> Self {
        self.apr = apr;
        self
    }

    /// Funding interval in hours; only shown for the hourly period.
    pub fn funding_interval(mut self, hours: Option<f64>) -> Self {
        self.funding_interval = hours;
        self
    }

    pub fn period(mut self, period: PeriodKey) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> CellView {
        let Some(value) = self.value.filter(|v| v.is_finite()) else {
            return CellView::placeholder();
        };

        let background = self.rank.as_ref().and_then(|info| emphasis(value, info));

        let mut tooltip = Vec::with_capacity(self.tooltip.len() + 1);
        if self.period == Some(PeriodKey::Hour) {
            if let Some(hours) = self.funding_interval.filter(|h| *h > 0.0 && h.is_finite()) {
                tooltip.push(format!("【{}h】", trim_number(hours)));
            }
        }
        tooltip.extend(self.tooltip);

        CellView {
            text: format_rate(value),
            apr_text: self.apr.filter(|a| a.is_finite()).map(format_apr),
            background,
            tooltip,
        }
    }
}

/// Integral values print without a fraction (`8`, not `8.0`).
fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// The standard multi-period table cell: total rate, APR, and the period
/// descriptor in the tooltip, emphasised according to `ranks`.
pub fn period_cell(row: &Row, period: PeriodKey, ranks: &RankMap, identity: RowIdentity) -> CellView {
    let Some(agg) = row.aggs.get(&period) else {
        return CellView::placeholder();
    };
    let mut cell = RankedCell::new(Some(agg.total_rate))
        .rank(ranks.get(&row.key(identity), period))
        .apr(Some(agg.apr))
        .period(period);
    if let Some(pv) = &agg.period_value {
        cell = cell.tooltip(format!("Period: {pv}"));
    }
    cell.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodAggregate;
    use crate::rank::rank_total_rates;

    #[test]
    fn missing_or_nan_is_placeholder() {
        assert_eq!(RankedCell::new(None).apr(Some(0.1)).build(), CellView::placeholder());
        assert!(RankedCell::new(Some(f64::NAN)).build().is_placeholder());
        assert_eq!(RankedCell::new(None).funding_interval(Some(8.0)).build().inline(), "-");
        assert!(RankedCell::new(Some(f64::INFINITY)).build().is_placeholder());
    }

    #[test]
    fn value_and_apr_text() {
        let view = RankedCell::new(Some(0.0001)).apr(Some(0.1095)).build();
        assert_eq!(view.text, "0.01000%");
        assert_eq!(view.apr_text.as_deref(), Some("APR: 10.95%"));
        assert!(view.background.is_none());
    }

    #[test]
    fn hour_interval_prefixes_tooltip() {
        let view = RankedCell::new(Some(0.001))
            .period(PeriodKey::Hour)
            .funding_interval(Some(8.0))
            .tooltip("binance")
            .build();
        assert_eq!(view.tooltip, vec!["【8h】".to_string(), "binance".to_string()]);

        let day = RankedCell::new(Some(0.001))
            .period(PeriodKey::Day)
            .funding_interval(Some(8.0))
            .build();
        assert!(day.tooltip.is_empty());
    }

    #[test]
    fn emphasis_follows_rank() {
        let top = RankInfo { rank: 0, total: 10, value: 0.5 };
        let view = RankedCell::new(Some(0.5)).rank(Some(&top)).build();
        assert_eq!(view.background, Some(Rgb(16, 185, 129)));

        let zero = RankInfo { rank: 0, total: 10, value: 0.0 };
        assert!(RankedCell::new(Some(0.0)).rank(Some(&zero)).build().background.is_none());
    }

    #[test]
    fn period_cell_reads_row() {
        let mut agg = PeriodAggregate::new(-0.002, -0.5);
        agg.period_value = Some("21".into());
        let rows = vec![
            Row::new("BTC").with_agg(PeriodKey::Day, PeriodAggregate::new(0.001, 0.2)),
            Row::new("ETH").with_agg(PeriodKey::Day, agg),
        ];
        let ranks = rank_total_rates(&rows, RowIdentity::Symbol);

        let eth = period_cell(&rows[1], PeriodKey::Day, &ranks, RowIdentity::Symbol);
        assert_eq!(eth.text, "-0.20000%");
        assert_eq!(eth.apr_text.as_deref(), Some("APR: -50.00%"));
        assert_eq!(eth.tooltip, vec!["Period: 21".to_string()]);
        // rank 1 of 2, negative → bottom band → deepest red
        assert_eq!(eth.background, Some(Rgb(239, 68, 68)));

        let missing = period_cell(&rows[0], PeriodKey::Week, &ranks, RowIdentity::Symbol);
        assert!(missing.is_placeholder());
    }
}
