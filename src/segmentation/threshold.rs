use super::types::{BinaryMask, FloatImage};

/// Number of histogram bins used for Otsu's method
pub const OTSU_BINS: usize = 256;

/// Calculate Otsu's threshold for a grayscale image
///
/// Returns the centre of the histogram bin that best separates the two
/// classes, or `None` when the image is constant (or empty) and no
/// separation exists.
pub fn otsu_threshold(image: &FloatImage) -> Option<f64> {
    let (min_val, max_val) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !(max_val > min_val) {
        return None;
    }

    let bin_width = (max_val - min_val) / OTSU_BINS as f64;
    let mut histogram = [0u64; OTSU_BINS];
    for &pixel in image.iter().filter(|v| v.is_finite()) {
        let bin = ((pixel - min_val) / bin_width) as usize;
        histogram[bin.min(OTSU_BINS - 1)] += 1;
    }
    let centers: Vec<f64> = (0..OTSU_BINS)
        .map(|i| min_val + (i as f64 + 0.5) * bin_width)
        .collect();

    let total: f64 = histogram.iter().sum::<u64>() as f64;
    let total_mass: f64 = histogram
        .iter()
        .zip(&centers)
        .map(|(&n, &c)| n as f64 * c)
        .sum();

    // Class 1 holds bins 0..=t, class 2 holds bins t+1..
    let mut weight_bg = 0.0;
    let mut mass_bg = 0.0;
    let mut best: Option<(usize, f64)> = None;

    for t in 0..OTSU_BINS - 1 {
        weight_bg += histogram[t] as f64;
        mass_bg += histogram[t] as f64 * centers[t];

        let weight_fg = total - weight_bg;
        if weight_bg == 0.0 || weight_fg == 0.0 {
            continue;
        }

        let mean_bg = mass_bg / weight_bg;
        let mean_fg = (total_mass - mass_bg) / weight_fg;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if best.map_or(true, |(_, v)| variance > v) {
            best = Some((t, variance));
        }
    }

    best.map(|(t, _)| centers[t])
}

/// Apply thresholding to an image and return a binary mask
///
/// A pixel is foreground when strictly greater than `threshold`.
pub fn apply_threshold(image: &FloatImage, threshold: f64) -> BinaryMask {
    image.mapv(|v| v > threshold)
}

/// Otsu segmenter with a defined fallback for flat images
pub struct Segmenter;

impl Segmenter {
    /// Binarize a smoothed image
    ///
    /// A constant image has no Otsu threshold and yields an all-background mask.
    pub fn segment(&self, image: &FloatImage) -> BinaryMask {
        let _span = tracing::debug_span!("threshold").entered();
        match otsu_threshold(image) {
            Some(threshold) => {
                tracing::debug!("Otsu threshold: {:.6}", threshold);
                apply_threshold(image, threshold)
            }
            None => {
                tracing::debug!("Constant image, no threshold; mask is empty");
                BinaryMask::from_elem(image.dim(), false)
            }
        }
    }
}
