//! FundLens CLI: one-shot queries against the funding-rate API.
//!
//! Commands:
//! - `exchanges`: list exchange ids
//! - `symbols`: list symbols traded on one exchange
//! - `rates`: latest funding-rate records with a market summary
//! - `pair`: multi-period aggregates and hourly history for one pair
//! - `top`: top pairs by volume with ranked multi-period rates
//! - `arbitrage`: cross-exchange funding divergences

mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fundlens_core::api::{
    AggregateQuery, ArbitrageQuery, FundingRateQuery, FundingSource, HttpSource, TopVolumeQuery,
};
use fundlens_core::config::Config;
use fundlens_core::domain::{HedgeSort, PeriodKey, RowIdentity, TimeRange};
use fundlens_core::format::{format_gmt8, format_rate};
use fundlens_core::pages::{history_ascending, normalize_exchanges, pair_row};
use fundlens_core::sort::{
    sort_opportunities, ArbitrageSortField, RowSortField, SortOrder, SortState,
};

#[derive(Parser)]
#[command(
    name = "fundlens",
    about = "FundLens CLI: perpetual funding rates, rankings and arbitrage"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config_dir>/fundlens/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exchange ids.
    Exchanges,
    /// List symbols traded on an exchange.
    Symbols {
        /// Exchange id (e.g., binance).
        exchange: String,
    },
    /// Latest funding-rate records with a market summary.
    Rates {
        /// Exchange filter; "all" for every exchange.
        #[arg(long, default_value = "all")]
        exchange: String,

        /// Symbol filter; "all" for every symbol.
        #[arg(long, default_value = "all")]
        symbol: String,

        /// Number of records. Defaults to the configured overview limit.
        #[arg(long)]
        limit: Option<u32>,

        /// Write CSV instead of a text table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Multi-period aggregates and hourly history for one pair.
    Pair {
        exchange: String,
        symbol: String,

        /// Number of hourly records in the history. Defaults to the configured limit.
        #[arg(long)]
        history: Option<u32>,
    },
    /// Top pairs by volume with ranked multi-period funding totals.
    Top {
        /// Number of pairs. Defaults to the configured Top 10 size.
        #[arg(long)]
        top_n: Option<u32>,

        /// Restrict to one exchange; rows are then ranked by symbol alone.
        #[arg(long)]
        exchange: Option<String>,

        /// Symbol filter.
        #[arg(long)]
        symbol: Option<String>,

        /// Sort column: exchange, symbol, volume, hour, day, week, month, quarter, year.
        #[arg(long, default_value = "volume")]
        sort: RowSortField,

        /// Sort ascending instead of descending.
        #[arg(long, default_value_t = false)]
        asc: bool,

        /// Print the APR under each rate.
        #[arg(long, default_value_t = false)]
        apr: bool,

        /// Write CSV instead of a text table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Cross-exchange funding divergences.
    Arbitrage {
        /// Symbol filter.
        #[arg(long)]
        symbol: Option<String>,

        /// Server-side ranking.
        #[arg(long, value_enum, default_value_t = RankBy::Hedge)]
        rank_by: RankBy,

        /// Compare the latest rates or their averages.
        #[arg(long, value_enum, default_value_t = RateWindow::Latest)]
        time_range: RateWindow,

        /// Number of opportunities. Defaults to the configured limit.
        #[arg(long)]
        limit: Option<u32>,

        /// Client-side sort column (e.g., annualized_arbitrage, rate_a, symbol).
        #[arg(long, default_value = "annualized_arbitrage")]
        sort: ArbitrageSortField,

        /// Sort ascending instead of descending.
        #[arg(long, default_value_t = false)]
        asc: bool,

        /// Write CSV instead of a text table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RankBy {
    Hedge,
    Difference,
}

impl From<RankBy> for HedgeSort {
    fn from(value: RankBy) -> Self {
        match value {
            RankBy::Hedge => HedgeSort::Hedge,
            RankBy::Difference => HedgeSort::Difference,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RateWindow {
    Latest,
    Average,
}

impl From<RateWindow> for TimeRange {
    fn from(value: RateWindow) -> Self {
        match value {
            RateWindow::Latest => TimeRange::Latest,
            RateWindow::Average => TimeRange::Average,
        }
    }
}

fn order(asc: bool) -> SortOrder {
    if asc {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");
    let source = HttpSource::from_config(&config.api).context("building API client")?;
    let limits = &config.pages;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Exchanges => run_exchanges(&source, &mut out),
        Commands::Symbols { exchange } => run_symbols(&source, &exchange, &mut out),
        Commands::Rates {
            exchange,
            symbol,
            limit,
            csv,
        } => {
            let query = FundingRateQuery {
                exchange: Some(exchange.to_lowercase()),
                symbol: Some(symbol),
                limit: Some(limit.unwrap_or(limits.overview_limit)),
                period_type: None,
            };
            run_rates(&source, &query, csv, &mut out)
        }
        Commands::Pair {
            exchange,
            symbol,
            history,
        } => run_pair(
            &source,
            &exchange.to_lowercase(),
            &symbol,
            limits.aggregate_limit,
            history.unwrap_or(limits.history_limit),
            &mut out,
        ),
        Commands::Top {
            top_n,
            exchange,
            symbol,
            sort,
            asc,
            apr,
            csv,
        } => {
            let query = TopVolumeQuery {
                top_n: Some(top_n.unwrap_or(limits.top10_size)),
                exchange: exchange.map(|e| e.to_lowercase()),
                symbol,
            };
            let sort = SortState {
                field: sort,
                order: order(asc),
            };
            run_top(&source, &query, sort, apr, csv, &mut out)
        }
        Commands::Arbitrage {
            symbol,
            rank_by,
            time_range,
            limit,
            sort,
            asc,
            csv,
        } => {
            let query = ArbitrageQuery {
                symbol: symbol.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty()),
                sort_by: rank_by.into(),
                time_range: time_range.into(),
                limit: Some(limit.unwrap_or(limits.arbitrage_limit)),
            };
            let sort = SortState {
                field: sort,
                order: order(asc),
            };
            run_arbitrage(&source, &query, sort, csv, &mut out)
        }
    }
}

/// Logs go to stderr so stdout stays clean for piping.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_exchanges(source: &dyn FundingSource, out: &mut impl Write) -> Result<()> {
    let exchanges = normalize_exchanges(source.list_exchanges()?);
    for ex in &exchanges {
        writeln!(out, "{ex}")?;
    }
    Ok(())
}

fn run_symbols(source: &dyn FundingSource, exchange: &str, out: &mut impl Write) -> Result<()> {
    let exchange = exchange.trim().to_lowercase();
    if exchange.is_empty() {
        bail!("exchange must not be empty");
    }
    for sym in source.list_symbols(&exchange)? {
        writeln!(out, "{sym}")?;
    }
    Ok(())
}

fn run_rates(
    source: &dyn FundingSource,
    query: &FundingRateQuery,
    csv: bool,
    out: &mut impl Write,
) -> Result<()> {
    let records = source.list_funding_rates(query)?;
    tracing::debug!(count = records.len(), "fetched funding rates");
    if csv {
        render::write_records_csv(out, &records)
    } else {
        render::write_records(out, &records)?;
        Ok(())
    }
}

fn run_pair(
    source: &dyn FundingSource,
    exchange: &str,
    symbol: &str,
    aggregate_limit: u32,
    history_limit: u32,
    out: &mut impl Write,
) -> Result<()> {
    let aggregates = source.funding_rate_aggregate(&AggregateQuery {
        exchange: Some(exchange.to_string()),
        symbol: Some(symbol.to_string()),
        limit: Some(aggregate_limit),
    })?;
    let history = source.list_funding_rates(&FundingRateQuery {
        exchange: Some(exchange.to_string()),
        symbol: Some(symbol.to_string()),
        limit: Some(history_limit),
        period_type: Some(PeriodKey::Hour),
    })?;

    writeln!(out, "{symbol} on {}", exchange.to_uppercase())?;
    writeln!(out)?;
    let row = pair_row(exchange, symbol, &aggregates);
    let table = render::ranked(
        vec![row],
        RowIdentity::ExchangeSymbol,
        SortState::new(RowSortField::Volume),
    );
    render::write_ranked(out, &table, true)?;

    let history = history_ascending(&history);
    writeln!(out)?;
    writeln!(out, "Hourly history ({} records, oldest first)", history.len())?;
    for rec in &history {
        writeln!(
            out,
            "{}  {:>10}",
            format_gmt8(rec.timestamp_ms),
            format_rate(rec.funding_rate)
        )?;
    }
    Ok(())
}

fn run_top(
    source: &dyn FundingSource,
    query: &TopVolumeQuery,
    sort: SortState<RowSortField>,
    apr: bool,
    csv: bool,
    out: &mut impl Write,
) -> Result<()> {
    if query.exchange.is_some() && sort.field == RowSortField::Exchange {
        bail!("--sort exchange needs rows from more than one exchange; drop --exchange");
    }
    let rows = source.top_volume_aggregate(query)?;
    tracing::debug!(count = rows.len(), "fetched top-volume aggregates");

    let identity = if query.exchange.is_some() {
        RowIdentity::Symbol
    } else {
        RowIdentity::ExchangeSymbol
    };
    let table = render::ranked(rows, identity, sort);
    if csv {
        render::write_ranked_csv(out, &table)
    } else {
        render::write_ranked(out, &table, apr)?;
        Ok(())
    }
}

fn run_arbitrage(
    source: &dyn FundingSource,
    query: &ArbitrageQuery,
    sort: SortState<ArbitrageSortField>,
    csv: bool,
    out: &mut impl Write,
) -> Result<()> {
    let page = source.arbitrage_opportunities(query)?;
    tracing::debug!(count = page.data.len(), total = page.total, "fetched arbitrage opportunities");
    let opps = sort_opportunities(&page.data, &sort);
    if csv {
        render::write_opportunities_csv(out, &opps)
    } else {
        render::write_opportunities(out, &opps, sort, page.total)?;
        Ok(())
    }
}
