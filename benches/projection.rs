use catalog_search::facets::FacetSelections;
use catalog_search::pagination::{project, total_pages};
use catalog_search::query::QuerySnapshot;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn criterion_benchmark(c: &mut Criterion) {
    let pages = total_pages(12_345, 10);

    c.bench_function("project_pagination", |b| {
        b.iter(|| {
            for current in [1, 4, pages / 2, pages] {
                black_box(project(black_box(current), pages, 10, 12_345));
            }
        });
    });

    let facets: FacetSelections = [
        ("type", "article"),
        ("type", "dataset"),
        ("provider", "usgs"),
        ("keyword", "sea level"),
    ]
    .into_iter()
    .collect();
    let address = QuerySnapshot::new("groundwater recharge", 7, facets).to_query_string();

    c.bench_function("parse_address", |b| {
        b.iter(|| QuerySnapshot::from_query_string(black_box(&address)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
