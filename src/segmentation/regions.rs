use super::types::LabelMask;
use crate::error::{Result, SegmentationError};
use ndarray::Array2;

/// Bounding box of a labeled object, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Leftmost column
    pub x_min: usize,

    /// Topmost row
    pub y_min: usize,

    pub width: usize,

    pub height: usize,
}

impl BoundingBox {
    pub fn new(x_min: usize, y_min: usize, width: usize, height: usize) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
        }
    }

    /// One past the rightmost column
    pub fn x_max(&self) -> usize {
        self.x_min + self.width
    }

    /// One past the bottom row
    pub fn y_max(&self) -> usize {
        self.y_min + self.height
    }
}

/// Per-object measurements
#[derive(Debug, Clone, PartialEq)]
pub struct RegionProps {
    pub label: u32,
    /// Pixel count
    pub area: usize,
    /// Mean pixel position as (row, col)
    pub centroid: (f64, f64),
    pub bbox: BoundingBox,
    /// Sum of raw intensities over the object
    pub integrated_intensity: f64,
    pub mean_intensity: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
}

/// Running sums for one label
struct Accumulator {
    area: usize,
    row_sum: f64,
    col_sum: f64,
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
    intensity_sum: f64,
    intensity_min: f64,
    intensity_max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            area: 0,
            row_sum: 0.0,
            col_sum: 0.0,
            row_min: usize::MAX,
            row_max: 0,
            col_min: usize::MAX,
            col_max: 0,
            intensity_sum: 0.0,
            intensity_min: f64::INFINITY,
            intensity_max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    fn add(&mut self, row: usize, col: usize, intensity: f64) {
        self.area += 1;
        self.row_sum += row as f64;
        self.col_sum += col as f64;
        self.row_min = self.row_min.min(row);
        self.row_max = self.row_max.max(row);
        self.col_min = self.col_min.min(col);
        self.col_max = self.col_max.max(col);
        self.intensity_sum += intensity;
        self.intensity_min = self.intensity_min.min(intensity);
        self.intensity_max = self.intensity_max.max(intensity);
    }

    fn finish(&self, label: u32) -> RegionProps {
        let area = self.area as f64;
        RegionProps {
            label,
            area: self.area,
            centroid: (self.row_sum / area, self.col_sum / area),
            bbox: BoundingBox::new(
                self.col_min,
                self.row_min,
                self.col_max - self.col_min + 1,
                self.row_max - self.row_min + 1,
            ),
            integrated_intensity: self.intensity_sum,
            mean_intensity: self.intensity_sum / area,
            min_intensity: self.intensity_min,
            max_intensity: self.intensity_max,
        }
    }
}

/// Measure every labeled object against an intensity image
///
/// # Returns
///
/// One record per label present in the mask, ascending by label
pub fn region_props(labels: &LabelMask, intensity: &Array2<f64>) -> Result<Vec<RegionProps>> {
    if labels.dim() != intensity.dim() {
        return Err(SegmentationError::ShapeMismatch {
            labels: labels.dim(),
            intensity: intensity.dim(),
        });
    }

    let max_label = labels.iter().copied().max().unwrap_or(0) as usize;
    let mut accumulators: Vec<Accumulator> = (0..=max_label).map(|_| Accumulator::default()).collect();

    for (((row, col), &label), &value) in labels.indexed_iter().zip(intensity.iter()) {
        if label != 0 {
            accumulators[label as usize].add(row, col, value);
        }
    }

    Ok(accumulators
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, acc)| acc.area > 0)
        .map(|(label, acc)| acc.finish(label as u32))
        .collect())
}
