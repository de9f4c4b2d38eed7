//! Benchmarks for the schema validation hot path
//!
//! Every API request passes through at least one schema; these benchmarks
//! keep an eye on the per-request validation overhead in isolation.

#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use presentation_http::schema::{Coerce, catalog};
use serde_json::{Value, json};

fn registration_payload() -> Value {
    json!({
        "email": "asha.rao@example.in",
        "password": "a-long-enough-password",
        "fullName": "Asha Rao",
        "phone": "+919876543210"
    })
}

fn batch_payload(articles: usize) -> Value {
    let articles: Vec<Value> = (0..articles)
        .map(|i| {
            json!({
                "title": format!("Quarterly results {i}"),
                "content": "Revenue grew while margins held steady across segments."
            })
        })
        .collect();
    json!({ "articles": articles })
}

fn bench_user_create(c: &mut Criterion) {
    let payload = registration_payload();
    c.bench_function("validate_user_create", |b| {
        b.iter(|| {
            catalog::user::create()
                .validate(&payload, Coerce::Json)
                .expect("payload is valid")
        });
    });
}

fn bench_pagination_coercion(c: &mut Criterion) {
    let query = json!({"page": "7", "limit": "50"});
    c.bench_function("validate_pagination_coerced", |b| {
        b.iter(|| {
            catalog::common::pagination()
                .validate(&query, Coerce::Strings)
                .expect("query is valid")
        });
    });
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_news_batch");
    for size in [1usize, 10, 50] {
        let payload = batch_payload(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                catalog::news::batch_analyze()
                    .validate(payload, Coerce::Json)
                    .expect("batch is valid")
            });
        });
    }
    group.finish();
}

fn bench_invalid_payload(c: &mut Criterion) {
    let payload = json!({"email": "invalid-email", "password": "short", "fullName": "J"});
    c.bench_function("validate_user_create_invalid", |b| {
        b.iter(|| {
            catalog::user::create()
                .validate(&payload, Coerce::Json)
                .expect_err("payload is invalid")
        });
    });
}

criterion_group!(
    benches,
    bench_user_create,
    bench_pagination_coercion,
    bench_batch_sizes,
    bench_invalid_payload
);
criterion_main!(benches);
