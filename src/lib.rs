pub mod batch;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod segmentation;

pub use batch::{
    process_single_image, run_analysis, run_batch, segment_to_folder, BatchReport, ImageResult,
    SkippedImage,
};
pub use config::{LabelingMode, PipelineParams};
pub use error::{Result, SegmentationError};
pub use pipeline::{NucleiPipeline, Segmentation};
