use hog_pairs::{
    find_nearest_pair, find_nearest_pair_parallel, progress_bar, EuclideanDistance, VectorItem,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

const SEED: u64 = 42;

// Vectors clustered around a few random centres, so near pairs exist.
fn generate_clustered_vectors(
    rng: &mut impl Rng,
    n_vectors: usize,
    n_clusters: usize,
    dim: usize,
) -> Vec<VectorItem> {
    let centres: Vec<Vec<f64>> = (0..n_clusters)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();

    let pb = progress_bar(n_vectors as u64, true);
    let mut vectors = Vec::with_capacity(n_vectors);
    for id in 0..n_vectors {
        let centre = &centres[id % n_clusters];
        let vector = centre.iter().map(|c| c + rng.gen_range(-0.2..0.2)).collect();
        vectors.push(VectorItem::new(id, vector));
        pb.inc(1);
    }
    pb.finish_with_message("Vector generation complete");
    vectors
}

fn main() {
    let n_vectors = 2_000;   // C(n, 2) ~ 2M distance evaluations
    let n_clusters = 20;
    let dim = 128;           // Dimension of vectors
    let runs = 3;

    println!("=== Nearest Pair Benchmark ===");
    println!("Parameters:");
    println!("  Vectors: {}", n_vectors);
    println!("  Dimensions: {}", dim);
    println!("  Clusters: {}", n_clusters);
    println!("  Pairs evaluated: {}", n_vectors * (n_vectors - 1) / 2);

    let mut rng = StdRng::seed_from_u64(SEED);
    println!("\nGenerating {} random vectors...", n_vectors);
    let vectors = generate_clustered_vectors(&mut rng, n_vectors, n_clusters, dim);

    let mut sequential_time = std::time::Duration::new(0, 0);
    let mut parallel_time = std::time::Duration::new(0, 0);
    let mut agree = true;

    for run in 0..runs {
        let start = Instant::now();
        let sequential = match find_nearest_pair(&vectors, &EuclideanDistance) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Search error: {}", e);
                return;
            }
        };
        sequential_time += start.elapsed();

        let start = Instant::now();
        let parallel = match find_nearest_pair_parallel(&vectors, &EuclideanDistance) {
            Ok(pair) => pair,
            Err(e) => {
                println!("Search error: {}", e);
                return;
            }
        };
        parallel_time += start.elapsed();

        agree &= sequential == parallel;
        if run == 0 {
            println!(
                "\nNearest pair: #{} <-> #{} at distance {:.6}",
                sequential.first, sequential.second, sequential.distance
            );
        }
    }

    println!("\nPerformance Metrics:");
    println!("  Sequential avg: {:?}", sequential_time / runs);
    println!("  Parallel avg:   {:?}", parallel_time / runs);
    println!("  Speedup: {:.2}x", sequential_time.as_secs_f64() / parallel_time.as_secs_f64());
    println!("  Results identical: {}", agree);
}
