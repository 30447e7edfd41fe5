use std::sync::Arc;

use allowance_core::{
    core::{
        services::{LedgerServices, MonthLabels},
        time::FixedClock,
    },
    domain::{
        category::{Category, FixedCategory},
        expense::NewExpense,
        owner::OwnerId,
        period::Frequency,
    },
    storage::SqliteStore,
};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

fn seeded_services(expense_count: usize) -> (LedgerServices, OwnerId, tempfile::TempDir) {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("ledger.sqlite3")).expect("open store");
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    let services = LedgerServices::new(store, Arc::new(clock), MonthLabels::Indonesian);
    let owner = OwnerId::random();

    services
        .allowances
        .ensure_period(&owner, i64::MAX / 2, Frequency::Monthly)
        .expect("allowance");

    let categories = [
        Category::Fixed(FixedCategory::Food),
        Category::Fixed(FixedCategory::Transport),
        Category::Custom("Pulsa".into()),
    ];
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    for idx in 0..expense_count {
        let date = start + Duration::days((idx % 640) as i64);
        let expense = NewExpense::new(
            1_000 + (idx % 97) as i64 * 500,
            categories[idx % categories.len()].clone(),
            date,
        );
        services
            .expenses
            .create_expense(&owner, expense)
            .expect("seed expense");
    }
    (services, owner, dir)
}

fn bench_aggregation(c: &mut Criterion) {
    let (services, owner, _dir) = seeded_services(black_box(10_000));

    c.bench_function("summary_10k", |b| {
        b.iter(|| {
            let summary = services.summaries.summary(&owner).expect("summary");
            black_box(summary);
        })
    });

    c.bench_function("month_breakdown_10k", |b| {
        b.iter(|| {
            let breakdown = services
                .summaries
                .month_breakdown(&owner, "2025-06")
                .expect("breakdown");
            black_box(breakdown);
        })
    });

    c.bench_function("list_expenses_10k", |b| {
        b.iter(|| {
            let expenses = services.expenses.list_expenses(&owner).expect("list");
            black_box(expenses);
        })
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
