use std::path::PathBuf;
use std::process::ExitCode;

use hog_pairs::{find_most_similar_images, PairError, PipelineError, SimilarityConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    image_dir: Option<String>,
    config: Option<String>,
    json: bool,
    parallel: bool,
}

impl Args {
    fn from_env() -> Self {
        let mut args = Args { image_dir: None, config: None, json: false, parallel: false };
        let mut positional = Vec::new();
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--json" => args.json = true,
                "--parallel" => args.parallel = true,
                _ => positional.push(arg),
            }
        }
        let mut positional = positional.into_iter();
        args.image_dir = positional.next();
        args.config = positional.next();
        args
    }

    fn into_config(self) -> Result<SimilarityConfig, PipelineError> {
        let mut cfg = match &self.config {
            Some(path) => SimilarityConfig::from_json_file(PathBuf::from(path).as_path())?,
            None => SimilarityConfig::default(),
        };
        if let Some(dir) = self.image_dir {
            cfg.image_dir = PathBuf::from(dir);
        }
        cfg.parallel |= self.parallel;
        Ok(cfg.with_progress(!self.json))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::from_env();
    let json = args.json;
    let cfg = match args.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Use: hog-pairs [image_dir] [config.json] [--parallel] [--json]");
            return ExitCode::FAILURE;
        }
    };

    if !json {
        println!("HOG Image Similarity");
        println!("--------------------");
        println!("Image directory: {}", cfg.image_dir.display());
        println!("Metric: {:?}", cfg.metric);
        println!();
    }

    let report = match find_most_similar_images(&cfg) {
        Ok(report) => report,
        Err(PipelineError::Pair(PairError::InsufficientItems { found })) => {
            eprintln!("Not enough images to compare similarity ({} usable).", found);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!(
        "\nSimilarity ({:?} distance): {} between {} and {}",
        cfg.metric,
        report.pair.distance,
        report.pair.first.display(),
        report.pair.second.display()
    );
    println!("  Images compared: {}", report.images_considered);
    println!("  Descriptor length: {}", report.descriptor_len);
    for skipped in &report.images_skipped {
        println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    if report.ranked.len() > 1 {
        println!("\nClosest pairs:");
        for (i, pair) in report.ranked.iter().enumerate() {
            println!(
                "#{}: {:.6}  {} <-> {}",
                i + 1,
                pair.distance,
                pair.first.display(),
                pair.second.display()
            );
        }
    }
    ExitCode::SUCCESS
}
