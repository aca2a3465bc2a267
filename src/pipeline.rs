use crate::config::PipelineParams;
use crate::error::Result;
use crate::segmentation::{
    create_labeler, region_props, LabelMask, Labeler, MorphologyCleaner, Preprocessor, RawImage,
    RegionProps, Segmenter,
};

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub labels: LabelMask,
    pub regions: Vec<RegionProps>,
}

impl Segmentation {
    /// Number of labeled objects
    pub fn count(&self) -> usize {
        self.regions.len()
    }
}

/// smoothed -> binary mask -> cleaned mask -> labels -> regions
///
/// Every stage returns a fresh array; nothing is kept between images.
pub struct NucleiPipeline {
    preprocessor: Preprocessor,
    segmenter: Segmenter,
    cleaner: MorphologyCleaner,
    labeler: Box<dyn Labeler>,
}

impl NucleiPipeline {
    pub fn new(params: &PipelineParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            preprocessor: Preprocessor::new(params.sigma),
            segmenter: Segmenter,
            cleaner: MorphologyCleaner::new(params.closing_radius, params.max_size),
            labeler: create_labeler(params.labeling),
        })
    }

    /// Label the nuclei in one image and measure them
    pub fn run(&self, image: &RawImage) -> Result<Segmentation> {
        let smoothed = self.preprocessor.preprocess(image);
        let binary = self.segmenter.segment(&smoothed);
        let cleaned = self.cleaner.clean(&binary);

        let labels = {
            let _span = tracing::debug_span!("label", labeler = self.labeler.name()).entered();
            self.labeler.label(&cleaned)
        };

        let regions = {
            let _span = tracing::debug_span!("regions").entered();
            region_props(&labels, image.pixels())?
        };

        Ok(Segmentation { labels, regions })
    }
}
