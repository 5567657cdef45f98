use lloyd::cluster::{Engine, EngineConfig, LoopParams, LoopStatus, MetricKind, SeedParams};
use lloyd::Error;
use ndarray::{array, Array2};
use rand::prelude::*;

fn blob(rng: &mut StdRng, center: [f64; 2], n: usize, noise: f64) -> Vec<f64> {
    (0..n)
        .flat_map(|_| {
            [
                center[0] + (rng.random::<f64>() - 0.5) * noise,
                center[1] + (rng.random::<f64>() - 0.5) * noise,
            ]
        })
        .collect()
}

fn two_clusters() -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut values = blob(&mut rng, [0.0, 0.0], 50, 0.5);
    values.extend(blob(&mut rng, [10.0, 10.0], 50, 0.5));
    Array2::from_shape_vec((100, 2), values).unwrap()
}

#[test]
fn two_separated_clusters_converge() {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = two_clusters();
    let mut engine = Engine::new(EngineConfig::new(MetricKind::Euclidean, 2, 2)).unwrap();
    let init = engine.init_centers_kmpp(data.view(), 7, 0).unwrap();
    let out = engine
        .cluster_loop(data.view(), init.view(), 4, LoopParams::new(50, 1e-6))
        .unwrap();

    assert_eq!(out.status, LoopStatus::Converged);
    assert!(out.iterations < 10, "took {} iterations", out.iterations);

    let mut centers: Vec<(f64, f64)> =
        out.centers.rows().into_iter().map(|r| (r[0], r[1])).collect();
    centers.sort_by(|a, b| a.0.total_cmp(&b.0));
    let near = |c: (f64, f64), at: f64| (c.0 - at).abs() < 0.25 && (c.1 - at).abs() < 0.25;
    assert!(near(centers[0], 0.0), "{centers:?}");
    assert!(near(centers[1], 10.0), "{centers:?}");

    let labels = engine.assign(data.view(), out.centers.view(), 3).unwrap();
    assert!(labels[..50].iter().all(|&l| l == labels[0]));
    assert!(labels[50..].iter().all(|&l| l == labels[50]));
    assert_ne!(labels[0], labels[50]);
}

#[test]
fn single_precision_instantiation() {
    let data = two_clusters().mapv(|v| v as f32);
    let mut engine = Engine::<f32>::new(EngineConfig::new(MetricKind::Euclidean, 2, 2)).unwrap();
    let init = engine
        .init_centers_kmpp_with(data.view(), 7, 2, SeedParams::greedy(2))
        .unwrap();
    let out = engine
        .cluster_loop(data.view(), init.view(), 2, LoopParams::new(50, 1e-5))
        .unwrap();
    assert!(out.status.is_converged());
    assert!(out.cost < 100.0 * 0.5 * 0.5);
}

#[test]
fn every_point_its_own_center_costs_nothing() {
    let data = array![[0.0, 1.0], [2.0, 3.0], [4.0, -5.0], [7.5, 0.25]];
    let engine = Engine::<f64>::new(EngineConfig::new(MetricKind::Euclidean, 2, 4)).unwrap();
    assert_eq!(engine.cost(data.view(), data.view(), 2).unwrap(), 0.0);

    let shuffled = array![[7.5, 0.25], [0.0, 1.0], [4.0, -5.0], [2.0, 3.0]];
    assert_eq!(engine.cost(data.view(), shuffled.view(), 0).unwrap(), 0.0);

    let seeded = engine.init_centers_kmpp(data.view(), 1, 2).unwrap();
    assert_eq!(engine.cost(data.view(), seeded.view(), 2).unwrap(), 0.0);
}

#[test]
fn more_clusters_than_points_is_rejected() {
    let data = array![[0.0, 0.0], [1.0, 1.0]];
    let centers = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
    let mut engine = Engine::<f64>::new(EngineConfig::new(MetricKind::Euclidean, 2, 3)).unwrap();

    assert!(matches!(
        engine.cluster_loop(data.view(), centers.view(), 1, LoopParams::default()),
        Err(Error::InvalidClusterCount { requested: 3, n_items: 2 })
    ));
    assert!(matches!(
        engine.init_centers_kmpp(data.view(), 0, 1),
        Err(Error::InvalidClusterCount { requested: 3, n_items: 2 })
    ));
}

#[test]
fn identical_points_still_yield_k_centers() {
    let data = Array2::from_elem((12, 3), 1.5f64);
    let engine = Engine::<f64>::new(EngineConfig::new(MetricKind::Euclidean, 3, 5)).unwrap();
    let centers = engine.init_centers_kmpp(data.view(), 42, 3).unwrap();
    assert_eq!(centers.dim(), (5, 3));
    assert!(centers.iter().all(|&v| v == 1.5));
}

#[test]
fn unknown_metric_name() {
    assert!(matches!("cosine".parse::<MetricKind>(), Err(Error::UnknownMetric(_))));
}

#[test]
fn minrmsd_clusters_rigid_copies_together() {
    // A line and a bent triplet, each rotated once and then placed at three
    // offsets. Under minRMSD the copies of a shape are indistinguishable.
    let line = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0];
    let bent = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
    let rotate = |x: &[f64; 9], shift: f64| -> Vec<f64> {
        x.chunks(3).flat_map(|p| [-p[1] + shift, p[0], p[2] - shift]).collect()
    };

    let mut rows = Vec::new();
    for shift in [0.0, 3.0, -2.0] {
        rows.extend(rotate(&line, shift));
        rows.extend(rotate(&bent, shift));
    }
    let data = Array2::from_shape_vec((6, 9), rows).unwrap();

    let mut engine = Engine::<f64>::new(EngineConfig::new(MetricKind::MinRmsd, 9, 2)).unwrap();
    let init = data.select(ndarray::Axis(0), &[0, 1]);
    let out = engine
        .cluster_loop(data.view(), init.view(), 2, LoopParams::new(20, 1e-6))
        .unwrap();
    let labels = engine.assign(data.view(), out.centers.view(), 2).unwrap();
    assert_eq!(labels, vec![0, 1, 0, 1, 0, 1]);
}

#[test]
fn mean_update_lowers_cost_for_l2_metrics() {
    let data = array![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];
    let start = array![[0.5, 0.5]];
    for metric in [MetricKind::Euclidean, MetricKind::SqEuclidean] {
        let engine = Engine::<f64>::new(EngineConfig::new(metric, 2, 1)).unwrap();
        let before = engine.cost(data.view(), start.view(), 1).unwrap();
        let moved = engine.cluster(data.view(), start.view(), 1).unwrap();
        let after = engine.cost(data.view(), moved.view(), 1).unwrap();
        assert!((before - 5.5).abs() < 1e-12, "{metric}: {before}");
        assert!((after - 48.0 / 9.0).abs() < 1e-12, "{metric}: {after}");
    }
}

#[test]
fn large_single_precision_data_keeps_finite_cost() {
    let data = Array2::from_shape_vec((4, 1), vec![0.0f32, 3e19, -3e19, 1e19]).unwrap();
    let center = array![[0.0f32]];
    let engine = Engine::<f32>::new(EngineConfig::new(MetricKind::Euclidean, 1, 1)).unwrap();
    let cost = engine.cost(data.view(), center.view(), 2).unwrap();
    assert!(cost.is_finite(), "{cost}");
    assert!((cost / 1.9e39 - 1.0).abs() < 1e-6);
}
