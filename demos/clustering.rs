//! K-means on a simple 2D dataset, through the estimator and the engine.

use lloyd::{Engine, EngineConfig, Kmeans, LoopParams, MetricKind, Progress};
use ndarray::Array2;

fn main() -> lloyd::Result<()> {
    // Three well-separated clusters in 2D.
    let data: Vec<Vec<f32>> = vec![
        // Cluster A (near origin)
        vec![0.0, 0.0],
        vec![0.1, 0.2],
        vec![0.2, 0.1],
        vec![-0.1, 0.1],
        // Cluster B (near (5, 5))
        vec![5.0, 5.0],
        vec![5.1, 4.9],
        vec![4.9, 5.1],
        vec![5.2, 5.2],
        // Cluster C (near (10, 0))
        vec![10.0, 0.0],
        vec![10.1, 0.1],
        vec![9.9, -0.1],
        vec![10.2, 0.2],
    ];

    // --- Estimator (k=3) ---
    let fit = Kmeans::new(3).with_seed(42).fit(&data)?;
    println!("=== K-means (k=3): {:?} after {} iterations ===", fit.status, fit.iterations);
    for (i, label) in fit.labels.iter().enumerate() {
        println!("  point {:2} ({:5.1}, {:5.1}) => cluster {}", i, data[i][0], data[i][1], label);
    }
    println!("  cost = {:.4}", fit.cost);

    // --- Engine with a progress sink ---
    let matrix = Array2::from_shape_vec((data.len(), 2), data.concat())?;
    let mut engine = Engine::<f32>::new(EngineConfig::new(MetricKind::Euclidean, 2, 3))?;
    engine.set_progress_sink(|p: &Progress<'_, f32>| {
        println!(
            "  iteration {:2}/{}: cost {:.4}, displacement {:.2e}",
            p.iteration, p.max_iter, p.cost, p.displacement
        );
    });

    println!("\n=== Engine: k-means++ seed 7, then Lloyd ===");
    let init = engine.init_centers_kmpp(matrix.view(), 7, 0)?;
    let out = engine.cluster_loop(matrix.view(), init.view(), 0, LoopParams::new(20, 1e-6))?;
    for (c, row) in out.centers.rows().into_iter().enumerate() {
        println!("  center {c}: ({:6.3}, {:6.3})", row[0], row[1]);
    }
    Ok(())
}
