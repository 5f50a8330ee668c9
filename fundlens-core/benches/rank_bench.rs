//! Criterion benchmarks for the per-render derivations.
//!
//! Benchmarks:
//! 1. Rank map over all periods (distinct-value ranking)
//! 2. Row sort by a period column
//! 3. Full cell resolution for a rendered table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fundlens_core::cell::period_cell;
use fundlens_core::domain::{PeriodAggregate, PeriodKey, Row, RowIdentity};
use fundlens_core::rank::rank_total_rates;
use fundlens_core::sort::{sort_rows, RowSortField, SortState};

fn make_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let mut row = Row::new(format!("SYM{i}"))
                .with_exchange(if i % 2 == 0 { "binance" } else { "okx" })
                .with_volume(1_000_000.0 + i as f64 * 17.0);
            for (k, period) in PeriodKey::ALL.iter().enumerate() {
                // Skip some cells so the missing-value path is exercised.
                if (i + k) % 7 == 0 {
                    continue;
                }
                let rate = ((i * 31 + k * 7) % 101) as f64 * 1e-5 - 5e-4;
                row = row.with_agg(*period, PeriodAggregate::new(rate, rate * 1095.0));
            }
            row
        })
        .collect()
}

fn bench_rank_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_map");
    for n in [10, 50, 500] {
        let rows = make_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| rank_total_rates(black_box(rows), RowIdentity::ExchangeSymbol));
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let rows = make_rows(500);
    let state = SortState::new(RowSortField::Period(PeriodKey::Week));
    c.bench_function("sort_rows_500_by_week", |b| {
        b.iter(|| sort_rows(black_box(&rows), &state));
    });
}

fn bench_cells(c: &mut Criterion) {
    let rows = make_rows(50);
    let ranks = rank_total_rates(&rows, RowIdentity::ExchangeSymbol);
    c.bench_function("period_cells_50x6", |b| {
        b.iter(|| {
            for row in &rows {
                for period in PeriodKey::ALL {
                    black_box(period_cell(row, period, &ranks, RowIdentity::ExchangeSymbol));
                }
            }
        });
    });
}

criterion_group!(benches, bench_rank_map, bench_sort, bench_cells);
criterion_main!(benches);
