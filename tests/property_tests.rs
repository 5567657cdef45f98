use lloyd::cluster::{Clustering, Engine, EngineConfig, Kmeans, LoopParams, MetricKind, Progress};
use ndarray::Array2;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn to_array(rows: &[Vec<f64>]) -> Array2<f64> {
    let d = rows[0].len();
    Array2::from_shape_vec((rows.len(), d), rows.iter().flatten().copied().collect()).unwrap()
}

fn engine(k: usize) -> Engine<f64> {
    engine_with(MetricKind::Euclidean, k)
}

fn engine_with(metric: MetricKind, k: usize) -> Engine<f64> {
    Engine::new(EngineConfig::new(metric, 2, k)).unwrap()
}

/// Metrics whose cost is the squared L2 distance, which the mean update minimises.
fn mean_minimising_metric() -> impl Strategy<Value = MetricKind> {
    prop::sample::select(vec![MetricKind::Euclidean, MetricKind::SqEuclidean])
}

fn points(max: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 1..max)
}

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        // Skip if k > n
        if k <= data.len() {
            let model = Kmeans::new(k).with_seed(42);
            let labels = model.fit_predict(&data).unwrap();

            prop_assert_eq!(labels.len(), data.len());
            for &l in &labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_step_labels_in_range(data in points(40), k in 1usize..6, threads in 1usize..5) {
        prop_assume!(k <= data.len());
        let x = to_array(&data);
        let centers = x.slice(ndarray::s![..k, ..]).to_owned();
        let step = engine(k).step(x.view(), centers.view(), threads).unwrap();
        prop_assert_eq!(step.labels.len(), data.len());
        prop_assert!(step.labels.iter().all(|&l| l < k));
        prop_assert_eq!(step.counts.iter().sum::<usize>(), data.len());
    }

    #[test]
    fn prop_single_pass_never_increases_cost(
        data in points(60),
        k in 1usize..6,
        offset in -3.0f64..3.0,
        metric in mean_minimising_metric()
    ) {
        prop_assume!(k <= data.len());
        let x = to_array(&data);
        let centers = x.slice(ndarray::s![..k, ..]).mapv(|v| v + offset);
        let e = engine_with(metric, k);

        let before = e.cost(x.view(), centers.view(), 2).unwrap();
        let updated = e.cluster(x.view(), centers.view(), 2).unwrap();
        let after = e.cost(x.view(), updated.view(), 2).unwrap();
        prop_assert!(after <= before + 1e-9 * (1.0 + before), "{} > {}", after, before);
    }

    #[test]
    fn prop_loop_costs_non_increasing(data in points(60), k in 1usize..5, max_iter in 1usize..20) {
        prop_assume!(k <= data.len());
        let x = to_array(&data);
        let mut e = engine(k);
        let costs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&costs);
        e.set_progress_sink(move |p: &Progress<'_, f64>| sink.lock().unwrap().push(p.cost));

        let init = e.init_centers_kmpp(x.view(), 3, 2).unwrap();
        let params = LoopParams::new(max_iter, 1e-9);
        let out = e.cluster_loop(x.view(), init.view(), 2, params).unwrap();

        prop_assert!(out.iterations >= 1 && out.iterations <= max_iter);
        let costs = costs.lock().unwrap();
        prop_assert_eq!(costs.len(), out.iterations);
        for w in costs.windows(2) {
            prop_assert!(w[1] <= w[0] + 1e-9 * (1.0 + w[0]));
        }
    }

    #[test]
    fn prop_kmpp_copies_rows_and_ignores_threads(
        data in points(50),
        k in 1usize..6,
        seed in any::<u64>()
    ) {
        prop_assume!(k <= data.len());
        let x = to_array(&data);
        let e = engine(k);

        let a = e.init_centers_kmpp(x.view(), seed, 1).unwrap();
        let b = e.init_centers_kmpp(x.view(), seed, 4).unwrap();
        prop_assert_eq!(&a, &b);
        for row in a.rows() {
            prop_assert!(x.rows().into_iter().any(|r| r == row));
        }
    }

    #[test]
    fn prop_fixed_point_is_idempotent(data in points(40), k in 1usize..4) {
        prop_assume!(k <= data.len());
        let x = to_array(&data);
        let mut e = engine(k);
        let init = e.init_centers_kmpp(x.view(), 11, 1).unwrap();
        let out = e.cluster_loop(x.view(), init.view(), 1, LoopParams::new(200, 0.0)).unwrap();
        prop_assume!(out.status.is_converged());

        let again = e.cluster(x.view(), out.centers.view(), 3).unwrap();
        for (a, b) in again.iter().zip(out.centers.iter()) {
            prop_assert!((a - b).abs() <= 1e-9 * (1.0 + b.abs()));
        }
    }
}
