/// Performance benchmarks for balance report generation
use bbbank_api::{
    services::{transaction::build_report, TransactionService, TransactionServiceTrait},
    store::{InMemoryLedgerStore, LedgerStore},
    types::UserId,
};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_build_report(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let now = Utc::now();
    let store = InMemoryLedgerStore::with_demo_data(now).unwrap();
    let transactions = rt.block_on(store.transactions(None)).unwrap();

    c.bench_function("build_report_demo_ledger", |b| {
        b.iter(|| black_box(build_report(black_box(&transactions), now)))
    });
}

fn bench_service_queries(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = InMemoryLedgerStore::with_demo_data(Utc::now()).unwrap();
    let service = TransactionService::new(Arc::new(store));
    let user = UserId::new("37846734-172e-4149-8cec-6f43d1eb3f60");

    c.bench_function("aggregate_balances", |b| {
        b.iter(|| rt.block_on(async { black_box(service.get_last_12_month_balances(None).await) }))
    });

    c.bench_function("user_balances", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(
                    service
                        .get_last_12_month_balances(Some(user.clone()))
                        .await,
                )
            })
        })
    });
}

criterion_group!(benches, bench_build_report, bench_service_queries);
criterion_main!(benches);
