use std::process::ExitCode;

use hog_pairs::{crop_images_in_folder, CropBox, CropConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    input: String,
    output: String,
    crop_box: CropBox,
}

impl Args {
    fn from_env() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let crop_box = match args.get(3..7) {
            Some(coords) => {
                let parsed = coords
                    .iter()
                    .map(|s| {
                        s.parse::<u32>()
                            .map_err(|e| format!("invalid crop coordinate {:?}: {}", s, e))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                CropBox::new(parsed[0], parsed[1], parsed[2], parsed[3])
            }
            None if args.len() > 3 => return Err("crop box needs four coordinates".to_string()),
            None => CropBox::default(),
        };

        Ok(Args {
            input: args.get(1).cloned().unwrap_or_else(|| "image".to_string()),
            output: args.get(2).cloned().unwrap_or_else(|| "cropped_images".to_string()),
            crop_box,
        })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::from_env() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use: crop-images <input_dir> <output_dir> [left upper right lower]");
            return ExitCode::FAILURE;
        }
    };

    println!("Image Cropping Tool");
    println!("--------------------");
    println!("Input directory:  {}", args.input);
    println!("Output directory: {}", args.output);
    let b = args.crop_box;
    println!("Crop box: ({}, {}, {}, {})", b.left, b.upper, b.right, b.lower);

    let cfg = CropConfig::new(&args.input, &args.output)
        .with_crop_box(args.crop_box)
        .with_progress(true);

    let report = match crop_images_in_folder(&cfg) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error cropping images: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for output in &report.cropped {
        println!("Cropped and saved: {}", output.display());
    }
    for failure in &report.failed {
        println!("Error processing {}: {}", failure.path.display(), failure.reason);
    }
    println!(
        "\n{} cropped, {} failed, {} non-image files ignored",
        report.cropped.len(),
        report.failed.len(),
        report.ignored
    );

    if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
