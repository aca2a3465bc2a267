use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use nucleiseg::{run_analysis, segment_to_folder, LabelingMode, PipelineParams};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Nucleus segmentation for fluorescence images", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment every file in a folder, writing masks of the same name
    Batch {
        /// Input folder containing nucleus images
        in_path: PathBuf,

        /// Output folder for label masks
        out_path: PathBuf,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Segment one image into <OUT_DIR>/labels.tif
    Single {
        /// Input image
        image: PathBuf,

        /// Output folder
        out_dir: PathBuf,

        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ParamArgs {
    /// Gaussian blur sigma in pixels
    #[arg(long, default_value_t = 2.0)]
    sigma: f64,

    /// Remove objects with at most this many pixels
    #[arg(long, default_value_t = 200)]
    max_size: usize,

    /// Morphological closing radius in pixels
    #[arg(long, default_value_t = 3)]
    closing_radius: usize,

    /// Labeling strategy
    #[arg(long, value_enum, default_value_t = LabelingMode::Watershed)]
    labeling: LabelingMode,
}

impl From<&ParamArgs> for PipelineParams {
    fn from(args: &ParamArgs) -> Self {
        PipelineParams::new(args.sigma, args.max_size, args.closing_radius)
            .with_labeling(args.labeling)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let start = Instant::now();

    match &args.command {
        Command::Batch {
            in_path,
            out_path,
            params,
        } => {
            let params = PipelineParams::from(params);
            tracing::info!("Parameters: {:?}", params);

            let report = run_analysis(in_path, out_path, &params).with_context(|| {
                format!(
                    "Failed to segment {} into {}",
                    in_path.display(),
                    out_path.display()
                )
            })?;

            tracing::info!(
                "Done in {:.1}s: {} found, {} processed, {} skipped",
                start.elapsed().as_secs_f64(),
                report.files_found,
                report.processed(),
                report.skipped.len()
            );

            if report.results.is_empty() {
                bail!("No images were successfully processed");
            }
        }
        Command::Single {
            image,
            out_dir,
            params,
        } => {
            let params = PipelineParams::from(params);
            let (output_path, segmentation) = segment_to_folder(image, out_dir, &params)
                .with_context(|| format!("Failed to segment {}", image.display()))?;

            tracing::info!(
                "Wrote {} nuclei to {} in {:.1}s",
                segmentation.count(),
                output_path.display(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}
