use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossfilter_explorer::*;

fn numbers_csv(rows: usize) -> String {
    let mut text = String::from("number,mod3,mod4,mod5,parity\n");
    for n in 1..=rows {
        let parity = if n % 2 == 0 { "even" } else { "odd" };
        text.push_str(&format!("{n},{},{},{},{parity}\n", n % 3, n % 4, n % 5));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv_text");

    for size in [10_000, 50_000].iter() {
        let text = numbers_csv(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse_csv_text(black_box(text)));
        });
    }
    group.finish();
}

fn bench_options_for_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("options_for_all");

    for size in [10_000, 50_000].iter() {
        let dataset = parse_dataset(&numbers_csv(*size)).unwrap();
        let mut selection = Selection::empty_for(&dataset.columns);
        selection.set("mod3", [CellValue::from(0)].into());
        selection.set("mod5", [CellValue::from(1), CellValue::from(4)].into());

        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| options_for_all(&dataset.rows, &dataset.columns, black_box(&selection)));
        });
    }
    group.finish();
}

fn bench_store_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_update_flush");

    for size in [10_000, 50_000].iter() {
        let text = numbers_csv(*size);
        let mut store = FilterStore::new();
        store.load_dataset(&text).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                store
                    .update_filter("parity", [CellValue::from("even")])
                    .unwrap();
                store.flush()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_options_for_all, bench_store_update);

criterion_main!(benches);
