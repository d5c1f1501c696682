//! Gradient computation benchmarks.
//!
//! Measures the per-round hot call across losses and lane widths:
//! - scalar vs 4- and 8-lane backends on the separable kernels
//! - the coupled softmax path for reference

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use boostloss::{create, evaluate_with_backend, Backend, Batch};

fn make_batch_data(n_rows: usize) -> (Vec<f32>, Vec<f32>) {
    let scores = (0..n_rows).map(|i| ((i * 13 % 29) as f32) * 0.2 - 2.5).collect();
    let targets = (0..n_rows).map(|i| (i % 5) as f32).collect();
    (scores, targets)
}

fn bench_separable_backends(c: &mut Criterion) {
    let n_rows = 100_000;
    let (scores, targets) = make_batch_data(n_rows);

    let mut group = c.benchmark_group("gradients/backend");
    group.throughput(Throughput::Elements(n_rows as u64));

    for selector in ["squared_error", "log_loss", "tweedie_deviance:power=1.5"] {
        let objective = create(selector).unwrap();
        let batch = Batch::single_output(&scores, &targets, &[]).unwrap();

        for backend in [Backend::Scalar, Backend::X4, Backend::X8] {
            group.bench_with_input(
                BenchmarkId::new(selector, format!("{:?}", backend)),
                &backend,
                |b, &backend| {
                    b.iter(|| {
                        let out =
                            evaluate_with_backend(objective.as_ref(), black_box(&batch), backend)
                                .unwrap();
                        black_box(out);
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_softmax_coupled_path(c: &mut Criterion) {
    let n_rows = 20_000;
    let num_classes = 5;

    let scores: Vec<f32> = (0..n_rows * num_classes)
        .map(|i| ((i * 17 % 31) as f32) * 0.1 - 1.5)
        .collect();
    let targets: Vec<f32> = (0..n_rows).map(|i| (i % num_classes) as f32).collect();

    let objective = create("softmax:num_class=5").unwrap();
    let batch = Batch::new(&scores, &targets, &[], n_rows, num_classes).unwrap();

    let mut group = c.benchmark_group("gradients/softmax");
    group.throughput(Throughput::Elements((n_rows * num_classes) as u64));
    group.bench_function("coupled", |b| {
        b.iter(|| {
            let out = evaluate_with_backend(objective.as_ref(), black_box(&batch), Backend::X8)
                .unwrap();
            black_box(out);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_separable_backends, bench_softmax_coupled_path);
criterion_main!(benches);
