use std::path::PathBuf;

/// Errors raised by the segmentation core
///
/// Per-image variants (`Load`, `EmptyImage`, `Write`, `LabelOverflow`) are
/// recovered by the batch runner. `Folder` is fatal. `UnsupportedLayout`
/// covers pixel layouts `image` may add in later releases; every layout it
/// currently decodes is converted.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("failed to decode image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported pixel layout {layout} in {}", path.display())]
    UnsupportedLayout { path: PathBuf, layout: String },

    #[error("image {} has no pixels", path.display())]
    EmptyImage { path: PathBuf },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("cannot access folder {}: {source}", path.display())]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write label raster {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("label {max_label} does not fit in a 16-bit raster")]
    LabelOverflow { max_label: u32 },

    #[error("shape mismatch: labels are {labels:?}, intensity image is {intensity:?}")]
    ShapeMismatch {
        labels: (usize, usize),
        intensity: (usize, usize),
    },
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
