use acorn_co2::models::{RawCo2Record, RawTemperatureRecord, YearMonth};
use acorn_co2::processors::{Aggregator, Decomposer, IntegrityChecker, SeriesAligner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Several station readings per month, as in the raw temperature export
fn create_temperature_rows(years: i32, stations: usize) -> Vec<RawTemperatureRecord> {
    let mut rows = Vec::with_capacity(years as usize * 12 * stations);
    for year in 1910..1910 + years {
        for month in 1..=12 {
            let key = YearMonth::new(year, month).unwrap();
            for station in 0..stations {
                let value = 20.0 + month as f64 * 0.8 + station as f64 * 0.1;
                rows.push(RawTemperatureRecord::new(key, year, value));
            }
        }
    }
    rows
}

fn create_co2_rows(years: i32, countries: usize) -> Vec<RawCo2Record> {
    let mut rows = Vec::with_capacity(years as usize * countries);
    for year in 1900..1910 + years {
        for country in 0..countries {
            let value = (year - 1899) as f64 * 0.1 + country as f64;
            rows.push(RawCo2Record::new(&format!("Country {}", country), year, value));
        }
    }
    rows
}

fn benchmark_aggregation(c: &mut Criterion) {
    let temperatures = create_temperature_rows(100, 100);

    let mut group = c.benchmark_group("aggregate_temperatures");
    for &workers in &[1usize, 4] {
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            let aggregator = Aggregator::new(workers).with_chunk_size(10_000);
            b.iter(|| {
                let result = aggregator.aggregate_temperatures(black_box(&temperatures));
                black_box(result.map(|r| r.len()).unwrap_or(0))
            })
        });
    }
    group.finish();
}

fn benchmark_align(c: &mut Criterion) {
    let aggregator = Aggregator::new(1);
    let temperatures = aggregator
        .aggregate_temperatures(&create_temperature_rows(110, 5))
        .unwrap();
    let co2 = aggregator.aggregate_co2(&create_co2_rows(110, 50)).unwrap();

    c.bench_function("align_default_policy", |b| {
        let aligner = SeriesAligner::new();
        b.iter(|| {
            let series = aligner.align(black_box(&temperatures), black_box(&co2));
            black_box(series.map(|s| s.len()).unwrap_or(0))
        })
    });

    let series = SeriesAligner::new().align(&temperatures, &co2).unwrap();

    c.bench_function("integrity_checker", |b| {
        let checker = IntegrityChecker::new();
        b.iter(|| {
            let report = checker.check_integrity(black_box(&series));
            black_box(report.map(|r| r.total_records).unwrap_or(0))
        })
    });

    c.bench_function("decompose_monthly", |b| {
        let decomposer = Decomposer::default();
        b.iter(|| {
            let rows = decomposer.decompose_series(black_box(&series));
            black_box(rows.map(|r| r.len()).unwrap_or(0))
        })
    });
}

criterion_group!(benches, benchmark_aggregation, benchmark_align);
criterion_main!(benches);
