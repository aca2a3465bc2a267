use crate::config::PipelineParams;
use crate::error::Result;
use crate::input::{load_grayscale, FolderSource, ImageSource};
use crate::output::{LabelRasterWriter, OutputSink};
use crate::pipeline::{NucleiPipeline, Segmentation};
use crate::segmentation::{LabelMask, RegionProps};
use std::path::{Path, PathBuf};

/// File name used by [`segment_to_folder`]
pub const SINGLE_OUTPUT_NAME: &str = "labels.tif";

/// Result for one successfully processed image
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub filename: String,
    pub output_path: PathBuf,
    pub labels: LabelMask,
    pub regions: Vec<RegionProps>,
}

/// An input entry that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub filename: String,
    pub reason: String,
}

/// Summary of a folder run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files_found: usize,
    pub results: Vec<ImageResult>,
    pub skipped: Vec<SkippedImage>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.results.len()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load, segment and write one image
fn process_entry<S, O>(
    source: &S,
    sink: &mut O,
    pipeline: &NucleiPipeline,
    path: &Path,
    output_name: &str,
) -> Result<(PathBuf, Segmentation)>
where
    S: ImageSource,
    O: OutputSink,
{
    let image = source.load(path)?;
    let segmentation = pipeline.run(&image)?;
    tracing::info!("Nuclei detected: {}", segmentation.count());
    let output_path = sink.write_labels(output_name, &segmentation.labels)?;
    Ok((output_path, segmentation))
}

/// Segment every entry of `source`, writing one mask per entry to `sink`
///
/// Output names are the input file names. Per-image failures are logged
/// and skipped; only folder problems are returned as errors.
pub fn run_batch<S, O>(source: &S, sink: &mut O, params: &PipelineParams) -> Result<BatchReport>
where
    S: ImageSource,
    O: OutputSink,
{
    let pipeline = NucleiPipeline::new(params)?;
    let entries = source.entries()?;
    tracing::info!("Found {} files to process", entries.len());

    let mut report = BatchReport {
        files_found: entries.len(),
        ..BatchReport::default()
    };

    for path in &entries {
        let filename = file_name(path);
        tracing::info!("Processing: {}", filename);

        match process_entry(source, sink, &pipeline, path, &filename) {
            Ok((output_path, segmentation)) => report.results.push(ImageResult {
                filename,
                output_path,
                labels: segmentation.labels,
                regions: segmentation.regions,
            }),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", filename, e);
                report.skipped.push(SkippedImage {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!("Successfully processed {} images", report.processed());
    Ok(report)
}

/// Segment every file in `in_dir` and write masks of the same name to `out_dir`
///
/// `out_dir` is created when missing. A missing or unreadable `in_dir` is
/// an error; undecodable files are skipped.
pub fn run_analysis<P, Q>(in_dir: P, out_dir: Q, params: &PipelineParams) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut sink = LabelRasterWriter::new(out_dir)?;
    let source = FolderSource::new(in_dir);
    run_batch(&source, &mut sink, params)
}

/// Segment one image file and write its mask to an explicit output path
pub fn process_single_image<P, Q>(
    image_path: P,
    output_path: Q,
    params: &PipelineParams,
) -> Result<Segmentation>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_path = output_path.as_ref();
    let (dir, name) = match (output_path.parent(), output_path.file_name()) {
        (Some(dir), Some(name)) => (dir, name.to_string_lossy().into_owned()),
        _ => (Path::new("."), file_name(output_path)),
    };

    let pipeline = NucleiPipeline::new(params)?;
    let image = load_grayscale(image_path.as_ref())?;
    let segmentation = pipeline.run(&image)?;
    tracing::info!("Nuclei detected: {}", segmentation.count());

    let mut sink = LabelRasterWriter::new(dir)?;
    sink.write_labels(&name, &segmentation.labels)?;
    Ok(segmentation)
}

/// Segment one image file into `out_dir/labels.tif`, creating `out_dir` if needed
pub fn segment_to_folder<P, Q>(
    image_path: P,
    out_dir: Q,
    params: &PipelineParams,
) -> Result<(PathBuf, Segmentation)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_path = out_dir.as_ref().join(SINGLE_OUTPUT_NAME);
    let segmentation = process_single_image(image_path, &output_path, params)?;
    Ok((output_path, segmentation))
}
