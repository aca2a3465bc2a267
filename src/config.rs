use crate::error::{Result, SegmentationError};

/// How the cleaned mask is turned into a label mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LabelingMode {
    /// Plain connected-component labeling, touching nuclei stay merged
    Connected,
    /// Distance transform + seeded watershed, splits touching nuclei
    #[default]
    Watershed,
}

/// Parameters shared by every image in a run
///
/// * `sigma` - Gaussian smoothing in pixels, 0 disables smoothing
/// * `max_size` - components with at most this many pixels are removed
/// * `closing_radius` - disk radius in pixels for the closing step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParams {
    pub sigma: f64,
    pub max_size: usize,
    pub closing_radius: usize,
    pub labeling: LabelingMode,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            max_size: 200,
            closing_radius: 3,
            labeling: LabelingMode::Watershed,
        }
    }
}

impl PipelineParams {
    pub fn new(sigma: f64, max_size: usize, closing_radius: usize) -> Self {
        Self {
            sigma,
            max_size,
            closing_radius,
            ..Self::default()
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_closing_radius(mut self, closing_radius: usize) -> Self {
        self.closing_radius = closing_radius;
        self
    }

    pub fn with_labeling(mut self, labeling: LabelingMode) -> Self {
        self.labeling = labeling;
        self
    }

    /// Reject parameter sets the stages cannot honour
    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(SegmentationError::InvalidParameter(format!(
                "sigma must be a finite value >= 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}
