use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quantile_intervals::binning::bin_matrix;
use quantile_intervals::booster::config::BoosterConfig;
use quantile_intervals::booster::GradientBooster;
use quantile_intervals::data::Matrix;
use quantile_intervals::frame::{DataFrame, Value};
use quantile_intervals::intervals::{IntervalModelSet, QuantileLevels};
use quantile_intervals::objective::Objective;
use quantile_intervals::predictor::{Predictor, TrainOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn create_data(n_samples: usize, n_features: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(1903);
    let weights: Vec<f64> = (0..n_features).map(|_| rng.gen_range(-1.0f64..1.0)).collect();
    let data: Vec<f64> = (0..n_samples * n_features).map(|_| rng.gen_range(0.0..1.0)).collect();
    let y = (0..n_samples)
        .map(|i| {
            let signal: f64 = (0..n_features).map(|j| weights[j] * data[j * n_samples + i]).sum();
            signal + rng.gen_range(-1.0f64..1.0) * (0.1 + data[i])
        })
        .collect();
    (data, y)
}

fn create_frame(data: &[f64], y: &[f64], n_features: usize) -> DataFrame {
    let n_samples = y.len();
    let mut columns: Vec<(String, Vec<Value>)> = (0..n_features)
        .map(|j| {
            let values = data[j * n_samples..(j + 1) * n_samples]
                .iter()
                .map(|v| Value::from(*v))
                .collect();
            (format!("f{}", j), values)
        })
        .collect();
    columns.push(("y".to_string(), y.iter().map(|v| Value::from(*v)).collect()));
    DataFrame::from_columns(columns).unwrap()
}

pub fn interval_benchmarks(c: &mut Criterion) {
    let n_features = 5;
    let (data_vec, y) = create_data(20_000, n_features);
    let data = Matrix::new(&data_vec, y.len(), n_features);

    c.bench_function("bin_matrix", |b| {
        b.iter(|| bin_matrix(black_box(&data), None, 256, f64::NAN).unwrap())
    });

    let cfg = BoosterConfig {
        iterations: 50,
        ..Default::default()
    };

    let mut booster_train = c.benchmark_group("train_booster");
    booster_train.warm_up_time(Duration::from_secs(5));
    booster_train.sample_size(10);
    booster_train.bench_function("train_booster_squared_loss", |b| {
        b.iter(|| {
            let mut booster = GradientBooster::new(cfg.clone());
            booster.fit(black_box(&data), black_box(&y), None).unwrap();
        })
    });
    booster_train.bench_function("train_booster_quantile_loss", |b| {
        b.iter(|| {
            let mut booster = GradientBooster::new(cfg.clone()).set_objective(Objective::QuantileLoss { quantile: 0.9 });
            booster.fit(black_box(&data), black_box(&y), None).unwrap();
        })
    });
    booster_train.bench_function("train_interval_model_set", |b| {
        b.iter(|| {
            IntervalModelSet::fit(
                black_box(&cfg),
                QuantileLevels::default(),
                black_box(&data),
                black_box(&y),
                None,
            )
            .unwrap()
        })
    });
    booster_train.finish();

    let df = create_frame(&data_vec, &y, n_features);
    let mut predictor = Predictor::from_descriptions(&[("y", "output")]).unwrap();
    predictor
        .train(&df, TrainOptions::default().with_intervals(true))
        .unwrap();
    let batch = df.head(1_000);
    let record = df.row(0).unwrap();

    c.bench_function("predict_intervals_batch_df", |b| {
        b.iter(|| predictor.predict_intervals(black_box(&batch), None).unwrap())
    });
    c.bench_function("predict_intervals_batch_list", |b| {
        b.iter(|| predictor.predict_intervals(black_box(&batch), Some("list")).unwrap())
    });
    c.bench_function("predict_intervals_single", |b| {
        b.iter(|| predictor.predict_intervals(black_box(&record), None).unwrap())
    });
}

criterion_group!(benches, interval_benchmarks);
criterion_main!(benches);
