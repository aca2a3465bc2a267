mod distance;
mod labeling;
mod morphology;
mod preprocess;
mod regions;
mod threshold;
pub mod types;
mod watershed;

pub use distance::distance_transform_edt;
pub use labeling::{connected_components, ConnectedComponents};
pub use morphology::{closing, disk, fill_holes, remove_small_objects, MorphologyCleaner};
pub use preprocess::{gaussian_blur, PixelEncoding, Preprocessor, RawImage};
pub use regions::{region_props, BoundingBox, RegionProps};
pub use threshold::{apply_threshold, otsu_threshold, Segmenter};
pub use types::{BinaryMask, Connectivity, DistanceField, FloatImage, LabelMask, Labeler};
pub use watershed::{find_seeds, watershed, WatershedSplitter};

use crate::config::LabelingMode;

/// Create the labeler for the requested mode
pub fn create_labeler(mode: LabelingMode) -> Box<dyn Labeler> {
    match mode {
        LabelingMode::Connected => Box::new(ConnectedComponents),
        LabelingMode::Watershed => Box::new(WatershedSplitter),
    }
}
