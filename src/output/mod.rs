mod raster;

pub use raster::{read_label_raster, LabelRasterWriter};

use crate::error::Result;
use crate::segmentation::LabelMask;
use std::path::PathBuf;

/// Trait for destinations of finished label masks
pub trait OutputSink {
    /// Persist a label mask under `name`, returning where it was written
    fn write_labels(&mut self, name: &str, labels: &LabelMask) -> Result<PathBuf>;
}
