mod folder;

pub use folder::{load_grayscale, FolderSource};

use crate::error::Result;
use crate::segmentation::RawImage;
use std::path::{Path, PathBuf};

/// Trait for sources of images to segment
pub trait ImageSource {
    /// List the entries to process, in processing order
    fn entries(&self) -> Result<Vec<PathBuf>>;

    /// Decode one entry into a single-channel image
    fn load(&self, path: &Path) -> Result<RawImage>;
}
