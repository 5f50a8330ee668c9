//! Plain-text and CSV output for the one-shot commands.
//!
//! Text tables mark emphasised rate cells with `*`, since stdout has no
//! background colour to carry the rank band.

use std::io::{self, Write};

use fundlens_core::cell::{period_cell, RankedCell};
use fundlens_core::domain::{ArbitrageOpportunity, FundingRateRecord, PeriodKey, Row, RowIdentity};
use fundlens_core::format::{
    format_annualized, format_gmt8, format_rate, format_signed_rate, format_volume, RateDirection,
};
use fundlens_core::pages::{MarketOverview, RankedTable};
use fundlens_core::sort::{ArbitrageSortField, RowSortField, SortState};

const EMPHASIS_MARK: &str = "*";

fn header_label(label: &str, sorted: bool, arrow: &str) -> String {
    if sorted {
        format!("{label} {arrow}")
    } else {
        label.to_string()
    }
}

fn column_width(field: RowSortField) -> usize {
    match field {
        RowSortField::Exchange => 10,
        RowSortField::Symbol => 18,
        RowSortField::Volume => 10,
        RowSortField::Period(_) => 12,
    }
}

fn push_cell(line: &mut String, text: &str, width: usize, right: bool) {
    if right {
        line.push_str(&format!("{text:>width$} "));
    } else {
        line.push_str(&format!("{text:<width$} "));
    }
}

/// Multi-period ranked table, one line per row (two with `show_apr`).
pub fn write_ranked<W: Write>(out: &mut W, table: &RankedTable, show_apr: bool) -> io::Result<()> {
    let columns = RowSortField::columns(table.identity());
    let sort: SortState<RowSortField> = table.sort();

    let mut header = String::new();
    for col in &columns {
        let label = header_label(col.label(), sort.field == *col, sort.order.arrow());
        push_cell(&mut header, &label, column_width(*col), matches!(col, RowSortField::Period(_)));
    }
    writeln!(out, "{}", header.trim_end())?;
    writeln!(out, "{}", "-".repeat(header.trim_end().chars().count()))?;

    for row in table.rows() {
        let mut line = String::new();
        let mut apr_line = String::new();
        for col in &columns {
            let width = column_width(*col);
            match col {
                RowSortField::Exchange => {
                    let ex = row.exchange.as_deref().unwrap_or("-").to_uppercase();
                    push_cell(&mut line, &ex, width, false);
                    push_cell(&mut apr_line, "", width, false);
                }
                RowSortField::Symbol => {
                    push_cell(&mut line, &row.symbol, width, false);
                    push_cell(&mut apr_line, "", width, false);
                }
                RowSortField::Volume => {
                    push_cell(&mut line, &format_volume(row.volume), width, true);
                    push_cell(&mut apr_line, "", width, true);
                }
                RowSortField::Period(p) => {
                    let cell = period_cell(row, *p, table.ranks(), table.identity());
                    let mark = if cell.background.is_some() { EMPHASIS_MARK } else { "" };
                    push_cell(&mut line, &format!("{}{mark}", cell.text), width, true);
                    let apr = cell
                        .apr_text
                        .as_deref()
                        .map(|a| a.trim_start_matches("APR: "))
                        .unwrap_or("");
                    push_cell(&mut apr_line, apr, width, true);
                }
            }
        }
        writeln!(out, "{}", line.trim_end())?;
        if show_apr {
            writeln!(out, "{}", apr_line.trim_end())?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} rows. {EMPHASIS_MARK} = top 30% positive or bottom 30% negative within its period.",
        table.len()
    )?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Ranked table as CSV: raw fractions plus the 1-based rank per period.
pub fn write_ranked_csv<W: Write>(out: W, table: &RankedTable) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = vec!["exchange".to_string(), "symbol".into(), "volume".into()];
    for p in PeriodKey::ALL {
        header.push(format!("{p}_rate"));
        header.push(format!("{p}_apr"));
        header.push(format!("{p}_rank"));
    }
    wtr.write_record(&header)?;

    for row in table.rows() {
        wtr.write_record(ranked_csv_record(row, table))?;
    }
    wtr.flush()?;
    Ok(())
}

fn ranked_csv_record(row: &Row, table: &RankedTable) -> Vec<String> {
    let key = row.key(table.identity());
    let mut record = vec![
        row.exchange.clone().unwrap_or_default(),
        row.symbol.clone(),
        optional(row.volume),
    ];
    for p in PeriodKey::ALL {
        record.push(optional(row.total_rate(p)));
        record.push(optional(row.apr(p)));
        record.push(
            table
                .ranks()
                .get(&key, p)
                .map(|info| (info.rank + 1).to_string())
                .unwrap_or_default(),
        );
    }
    record
}

fn opportunity_text(opp: &ArbitrageOpportunity, field: ArbitrageSortField) -> String {
    let rate = |rate: f64, interval: Option<f64>| {
        RankedCell::new(Some(rate))
            .funding_interval(interval)
            .period(PeriodKey::Hour)
            .build()
            .inline()
    };
    match field {
        ArbitrageSortField::Symbol => opp.symbol.clone(),
        ArbitrageSortField::ExchangeA => opp.exchange_a.to_uppercase(),
        ArbitrageSortField::ExchangeB => opp.exchange_b.to_uppercase(),
        ArbitrageSortField::RateA => rate(opp.rate_a, opp.funding_interval_a),
        ArbitrageSortField::RateB => rate(opp.rate_b, opp.funding_interval_b),
        ArbitrageSortField::VolumeA => format_volume(Some(opp.volume_a)),
        ArbitrageSortField::VolumeB => format_volume(Some(opp.volume_b)),
        ArbitrageSortField::Difference8h => format_signed_rate(opp.difference_8h),
        ArbitrageSortField::AnnualizedArbitrage => format_annualized(opp.annualized_arbitrage),
    }
}

fn arbitrage_width(field: ArbitrageSortField) -> usize {
    match field {
        ArbitrageSortField::Symbol => 18,
        ArbitrageSortField::ExchangeA | ArbitrageSortField::ExchangeB => 10,
        ArbitrageSortField::RateA | ArbitrageSortField::RateB => 16,
        ArbitrageSortField::VolumeA | ArbitrageSortField::VolumeB => 10,
        ArbitrageSortField::Difference8h => 10,
        ArbitrageSortField::AnnualizedArbitrage => 12,
    }
}

/// Arbitrage opportunities in the given order, followed by a count line.
pub fn write_opportunities<W: Write>(
    out: &mut W,
    opps: &[ArbitrageOpportunity],
    sort: SortState<ArbitrageSortField>,
    total: u64,
) -> io::Result<()> {
    let mut header = String::new();
    for field in ArbitrageSortField::ALL {
        let label = header_label(field.label(), sort.field == field, sort.order.arrow());
        push_cell(&mut header, &label, arbitrage_width(field), false);
    }
    writeln!(out, "{}", header.trim_end())?;
    writeln!(out, "{}", "-".repeat(header.trim_end().chars().count()))?;

    for opp in opps {
        let mut line = String::new();
        for field in ArbitrageSortField::ALL {
            push_cell(&mut line, &opportunity_text(opp, field), arbitrage_width(field), false);
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(out)?;
    writeln!(out, "{} opportunities ({total} total)", opps.len())?;
    Ok(())
}

pub fn write_opportunities_csv<W: Write>(out: W, opps: &[ArbitrageOpportunity]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for opp in opps {
        wtr.serialize(opp)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Market summary card followed by the latest records.
pub fn write_records<W: Write>(out: &mut W, records: &[FundingRateRecord]) -> io::Result<()> {
    let summary = MarketOverview::from_records(records);
    let latest = summary
        .latest_rate
        .map(|r| format!("{} ({})", format_rate(r), RateDirection::of(r).label()))
        .unwrap_or_else(|| "-".into());
    writeln!(out, "Latest rate: {latest}")?;
    writeln!(
        out,
        "Positive: {}  Negative: {}  Records: {}",
        summary.positive, summary.negative, summary.total
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<10} {:<18} {:>10} {:<11} {}",
        "Exchange", "Pair", "Rate", "Direction", "Time (GMT+8)"
    )?;
    writeln!(out, "{}", "-".repeat(78))?;
    for rec in records {
        let rate = RankedCell::new(Some(rec.funding_rate)).build();
        writeln!(
            out,
            "{:<10} {:<18} {:>10} {:<11} {}",
            rec.exchange.to_uppercase(),
            rec.symbol,
            rate.text,
            RateDirection::of(rec.funding_rate).label(),
            format_gmt8(rec.timestamp_ms)
        )?;
    }
    Ok(())
}

pub fn write_records_csv<W: Write>(out: W, records: &[FundingRateRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Build a ranked table from fetched rows.
pub fn ranked(rows: Vec<Row>, identity: RowIdentity, sort: SortState<RowSortField>) -> RankedTable {
    let mut table = RankedTable::new(identity, sort);
    table.set_rows(rows);
    table
}
