//! Multi-field, multi-type sort comparator shared by every sortable table.
//!
//! Text columns compare case-insensitively (falling back to exact byte order),
//! numeric columns compare numerically. Sorting always returns a new vector;
//! the input slice is left untouched.
//!
//! Relative order of rows with equal keys is not part of the contract. The
//! current implementation happens to be stable, but callers must not rely on it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::{ArbitrageOpportunity, ParsePeriodError, PeriodKey, Row, RowIdentity};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flip(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Header glyph for the active sort column.
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    }
}

/// Active sort column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F: Copy + PartialEq> SortState<F> {
    /// Start sorted by `field`, descending.
    pub fn new(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }

    /// Header click: the same field flips direction, a new field resets to descending.
    pub fn toggle(&mut self, field: F) {
        if self.field == field {
            self.order = self.order.flip();
        } else {
            self.field = field;
            self.order = SortOrder::Desc;
        }
    }
}

/// A borrowed sort key extracted from one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// Extracts the sort key a column uses for an item of type `T`.
pub trait SortKey<T> {
    fn sort_value<'a>(&self, item: &'a T) -> SortValue<'a>;
}

/// Ascending comparison of two sort keys.
///
/// NaN is ordered as −∞. Mixed text/number keys never occur for a single
/// column; if they do, numbers sort before text.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => compare_text(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => compare_numbers(*a, *b),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    let norm = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
    norm(a).total_cmp(&norm(b))
}

/// Return a sorted copy of `items` ordered by `state`.
pub fn sorted_by<T, K>(items: &[T], state: &SortState<K>) -> Vec<T>
where
    T: Clone,
    K: SortKey<T> + Copy + PartialEq,
{
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        let ord = compare_values(&state.field.sort_value(a), &state.field.sort_value(b));
        match state.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    out
}

// ── Row columns ──────────────────────────────────────────────────────

/// Sortable columns of a multi-period row table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowSortField {
    Exchange,
    Symbol,
    Volume,
    Period(PeriodKey),
}

impl SortKey<Row> for RowSortField {
    fn sort_value<'a>(&self, row: &'a Row) -> SortValue<'a> {
        match self {
            RowSortField::Exchange => SortValue::Text(row.exchange.as_deref().unwrap_or("")),
            RowSortField::Symbol => SortValue::Text(&row.symbol),
            RowSortField::Volume => SortValue::Number(row.volume.unwrap_or(0.0)),
            // Missing aggregates sink as −∞ regardless of direction intent:
            // last when descending, first when ascending.
            RowSortField::Period(p) => {
                SortValue::Number(row.total_rate(*p).unwrap_or(f64::NEG_INFINITY))
            }
        }
    }
}

impl RowSortField {
    /// Columns of a row table in display order: identity columns, volume,
    /// then one column per period.
    pub fn columns(identity: RowIdentity) -> Vec<RowSortField> {
        let mut cols = Vec::with_capacity(PeriodKey::ALL.len() + 3);
        if identity == RowIdentity::ExchangeSymbol {
            cols.push(RowSortField::Exchange);
        }
        cols.push(RowSortField::Symbol);
        cols.push(RowSortField::Volume);
        cols.extend(PeriodKey::ALL.into_iter().map(RowSortField::Period));
        cols
    }

    pub fn label(self) -> &'static str {
        match self {
            RowSortField::Exchange => "Exchange",
            RowSortField::Symbol => "Symbol",
            RowSortField::Volume => "Volume",
            RowSortField::Period(p) => p.label(),
        }
    }
}

impl fmt::Display for RowSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSortField::Exchange => f.write_str("exchange"),
            RowSortField::Symbol => f.write_str("symbol"),
            RowSortField::Volume => f.write_str("volume"),
            RowSortField::Period(p) => f.write_str(p.as_str()),
        }
    }
}

impl FromStr for RowSortField {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exchange" => Ok(RowSortField::Exchange),
            "symbol" => Ok(RowSortField::Symbol),
            "volume" => Ok(RowSortField::Volume),
            other => other.parse().map(RowSortField::Period),
        }
    }
}

/// Sorted copy of a row set.
pub fn sort_rows(rows: &[Row], state: &SortState<RowSortField>) -> Vec<Row> {
    sorted_by(rows, state)
}

// ── Arbitrage columns ────────────────────────────────────────────────

/// Sortable columns of the arbitrage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArbitrageSortField {
    Symbol,
    ExchangeA,
    RateA,
    VolumeA,
    ExchangeB,
    RateB,
    VolumeB,
    Difference8h,
    #[default]
    AnnualizedArbitrage,
}

impl ArbitrageSortField {
    /// Columns in display order.
    pub const ALL: [ArbitrageSortField; 9] = [
        ArbitrageSortField::Symbol,
        ArbitrageSortField::ExchangeA,
        ArbitrageSortField::RateA,
        ArbitrageSortField::VolumeA,
        ArbitrageSortField::ExchangeB,
        ArbitrageSortField::RateB,
        ArbitrageSortField::VolumeB,
        ArbitrageSortField::Difference8h,
        ArbitrageSortField::AnnualizedArbitrage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArbitrageSortField::Symbol => "Symbol",
            ArbitrageSortField::ExchangeA => "Exchange A",
            ArbitrageSortField::RateA => "Rate A",
            ArbitrageSortField::VolumeA => "24h Vol A",
            ArbitrageSortField::ExchangeB => "Exchange B",
            ArbitrageSortField::RateB => "Rate B",
            ArbitrageSortField::VolumeB => "24h Vol B",
            ArbitrageSortField::Difference8h => "8h Diff",
            ArbitrageSortField::AnnualizedArbitrage => "Annualized",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArbitrageSortField::Symbol => "symbol",
            ArbitrageSortField::ExchangeA => "exchange_a",
            ArbitrageSortField::RateA => "rate_a",
            ArbitrageSortField::VolumeA => "volume_a",
            ArbitrageSortField::ExchangeB => "exchange_b",
            ArbitrageSortField::RateB => "rate_b",
            ArbitrageSortField::VolumeB => "volume_b",
            ArbitrageSortField::Difference8h => "difference_8h",
            ArbitrageSortField::AnnualizedArbitrage => "annualized_arbitrage",
        }
    }
}

impl SortKey<ArbitrageOpportunity> for ArbitrageSortField {
    fn sort_value<'a>(&self, opp: &'a ArbitrageOpportunity) -> SortValue<'a> {
        match self {
            ArbitrageSortField::Symbol => SortValue::Text(&opp.symbol),
            ArbitrageSortField::ExchangeA => SortValue::Text(&opp.exchange_a),
            ArbitrageSortField::RateA => SortValue::Number(opp.rate_a),
            ArbitrageSortField::VolumeA => SortValue::Number(opp.volume_a),
            ArbitrageSortField::ExchangeB => SortValue::Text(&opp.exchange_b),
            ArbitrageSortField::RateB => SortValue::Number(opp.rate_b),
            ArbitrageSortField::VolumeB => SortValue::Number(opp.volume_b),
            ArbitrageSortField::Difference8h => SortValue::Number(opp.difference_8h),
            ArbitrageSortField::AnnualizedArbitrage => {
                SortValue::Number(opp.annualized_arbitrage)
            }
        }
    }
}

impl FromStr for ArbitrageSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ArbitrageSortField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("unknown arbitrage column: '{s}'"))
    }
}

/// Sorted copy of an arbitrage result set.
pub fn sort_opportunities(
    opps: &[ArbitrageOpportunity],
    state: &SortState<ArbitrageSortField>,
) -> Vec<ArbitrageOpportunity> {
    sorted_by(opps, state)
}
