use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use unbiased_core::config::ColumnRules;
use unbiased_core::data::columns::analyze_columns;
use unbiased_core::data::loader::read_csv;
use unbiased_core::metrics::{compute_bias_metrics, representation_and_sampling_bias};
use unbiased_core::{AnalysisRequest, BiasAuditor, BiasMetrics, Dataset, OutcomeSpec};

const REGIONS: [&str; 5] = ["north", "south", "east", "west", "central"];

fn synthetic(rows: usize) -> Dataset {
    let data = (0..rows)
        .map(|i| {
            let region = REGIONS[i % REGIONS.len()];
            let outcome = if (i * 7) % 10 < 4 { "yes" } else { "no" };
            vec![json!(i), json!(region), json!(outcome)]
        })
        .collect();
    Dataset::new(vec!["id".into(), "region".into(), "outcome".into()], data).unwrap()
}

fn bench_metrics(c: &mut Criterion) {
    let ds = synthetic(10_000);
    let outcome = OutcomeSpec::new("outcome", json!("yes"));
    let reference: Value = json!("north");

    c.bench_function("representation_10k_rows", |b| {
        b.iter(|| representation_and_sampling_bias(black_box(&ds), "region"))
    });

    c.bench_function("bias_metrics_10k_rows", |b| {
        b.iter(|| compute_bias_metrics(black_box(&ds), "region", &outcome, 0.2, &reference))
    });

    c.bench_function("final_verdict", |b| {
        let metrics = BiasMetrics {
            min_representation: 0.2,
            label_diff: 0.12,
            historical_diff: 0.12,
            max_spd: 0.08,
            max_di_deviation: 0.25,
        };
        b.iter(|| unbiased_core::final_bias_verdict(black_box(&metrics)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let ds = synthetic(10_000);
    let auditor = BiasAuditor::default();
    let request = AnalysisRequest::supervised("region", "outcome", json!("yes"));

    c.bench_function("supervised_audit_10k_rows", |b| {
        b.iter(|| auditor.analyze(black_box(&ds), &request))
    });

    c.bench_function("analyze_columns_10k_rows", |b| {
        let rules = ColumnRules::default();
        b.iter(|| analyze_columns(black_box(&ds), &rules))
    });

    let mut csv = String::from("id,region,outcome\n");
    for i in 0..5_000 {
        csv.push_str(&format!("{i},{},{}\n", REGIONS[i % 5], if i % 3 == 0 { "yes" } else { "no" }));
    }
    c.bench_function("read_csv_5k_rows", |b| {
        b.iter(|| read_csv(black_box(csv.as_bytes()), ',', None))
    });
}

criterion_group!(benches, bench_metrics, bench_pipeline);
criterion_main!(benches);
