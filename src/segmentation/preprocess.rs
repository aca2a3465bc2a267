use super::types::FloatImage;
use crate::error::{Result, SegmentationError};
use image::DynamicImage;
use ndarray::{Array2, Axis};
use std::path::Path;

/// Luma weights applied when a color image is reduced to grayscale
const LUMA_WEIGHTS: [f64; 3] = [0.2125, 0.7154, 0.0721];

/// Gaussian support in multiples of sigma
const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Storage type the image was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    U8,
    U16,
    F32,
}

impl PixelEncoding {
    /// Largest representable intensity, used to rescale into [0, 1]
    pub fn full_scale(self) -> f64 {
        match self {
            PixelEncoding::U8 => u8::MAX as f64,
            PixelEncoding::U16 => u16::MAX as f64,
            PixelEncoding::F32 => 1.0,
        }
    }
}

/// Single-channel image in its native intensity units
#[derive(Debug, Clone)]
pub struct RawImage {
    pixels: Array2<f64>,
    encoding: PixelEncoding,
}

impl RawImage {
    pub fn new(pixels: Array2<f64>, encoding: PixelEncoding) -> Self {
        Self { pixels, encoding }
    }

    /// Reduce a decoded image to one grayscale channel
    ///
    /// Luma images are taken as-is (alpha dropped), RGB(A) images are
    /// combined with fixed luma weights. Anything else is rejected here so
    /// later stages only ever see a 2D intensity array.
    pub fn from_dynamic(image: DynamicImage, path: &Path) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let raw = match image {
            DynamicImage::ImageLuma8(img) => {
                Self::from_luma(img.as_raw(), 1, width, height, PixelEncoding::U8)
            }
            DynamicImage::ImageLumaA8(img) => {
                Self::from_luma(img.as_raw(), 2, width, height, PixelEncoding::U8)
            }
            DynamicImage::ImageLuma16(img) => {
                Self::from_luma(img.as_raw(), 1, width, height, PixelEncoding::U16)
            }
            DynamicImage::ImageLumaA16(img) => {
                Self::from_luma(img.as_raw(), 2, width, height, PixelEncoding::U16)
            }
            DynamicImage::ImageRgb8(img) => {
                Self::from_rgb(img.as_raw(), 3, width, height, PixelEncoding::U8)
            }
            DynamicImage::ImageRgba8(img) => {
                Self::from_rgb(img.as_raw(), 4, width, height, PixelEncoding::U8)
            }
            DynamicImage::ImageRgb16(img) => {
                Self::from_rgb(img.as_raw(), 3, width, height, PixelEncoding::U16)
            }
            DynamicImage::ImageRgba16(img) => {
                Self::from_rgb(img.as_raw(), 4, width, height, PixelEncoding::U16)
            }
            DynamicImage::ImageRgb32F(img) => {
                Self::from_rgb(img.as_raw(), 3, width, height, PixelEncoding::F32)
            }
            DynamicImage::ImageRgba32F(img) => {
                Self::from_rgb(img.as_raw(), 4, width, height, PixelEncoding::F32)
            }
            // `DynamicImage` is non-exhaustive; layouts added by later
            // `image` releases end up here
            other => {
                return Err(SegmentationError::UnsupportedLayout {
                    path: path.to_path_buf(),
                    layout: format!("{:?}", other.color()),
                })
            }
        };

        Ok(raw)
    }

    fn from_luma<T: Copy + Into<f64>>(
        samples: &[T],
        channels: usize,
        width: usize,
        height: usize,
        encoding: PixelEncoding,
    ) -> Self {
        let pixels: Array2<f64> = Array2::from_shape_fn((height, width), |(y, x)| {
            samples[(y * width + x) * channels].into()
        });
        Self::new(pixels, encoding)
    }

    fn from_rgb<T: Copy + Into<f64>>(
        samples: &[T],
        channels: usize,
        width: usize,
        height: usize,
        encoding: PixelEncoding,
    ) -> Self {
        let pixels: Array2<f64> = Array2::from_shape_fn((height, width), |(y, x)| {
            let base = (y * width + x) * channels;
            LUMA_WEIGHTS
                .iter()
                .enumerate()
                .map(|(c, &w)| {
                    let sample: f64 = samples[base + c].into();
                    w * sample
                })
                .sum::<f64>()
        });
        Self::new(pixels, encoding)
    }

    pub fn pixels(&self) -> &Array2<f64> {
        &self.pixels
    }

    pub fn encoding(&self) -> PixelEncoding {
        self.encoding
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Rescale to [0, 1] using the encoding's full range
    ///
    /// Float images are passed through unscaled.
    pub fn normalized(&self) -> FloatImage {
        let scale = self.encoding.full_scale();
        self.pixels.mapv(|v| v / scale)
    }
}

/// Normalization followed by Gaussian smoothing
pub struct Preprocessor {
    sigma: f64,
}

impl Preprocessor {
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    /// Normalize then smooth a raw image
    pub fn preprocess(&self, image: &RawImage) -> FloatImage {
        let _span = tracing::debug_span!("preprocess", sigma = self.sigma).entered();
        gaussian_blur(&image.normalized(), self.sigma)
    }
}

/// 1D Gaussian weights for offsets `-radius..=radius`, summing to one
///
/// The radius is `4 * sigma` rounded, clamped to `max_radius`.
pub fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5).min(max_radius as f64) as isize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Map an out-of-range index back inside `0..len` by mirroring (d c b a | a b c d)
fn reflect_index(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let folded = index.rem_euclid(period);
    if folded < len {
        folded as usize
    } else {
        (period - folded - 1) as usize
    }
}

/// Separable isotropic Gaussian blur with mirrored borders
///
/// `sigma <= 0` returns a copy of the input. Along each axis the kernel
/// never reaches past one mirror period (twice the axis length), so huge
/// sigmas cost no more than a full-period average.
pub fn gaussian_blur(image: &FloatImage, sigma: f64) -> FloatImage {
    if sigma <= 0.0 || image.is_empty() {
        return image.clone();
    }
    let along_cols = convolve_axis(image, sigma, Axis(1));
    convolve_axis(&along_cols, sigma, Axis(0))
}

fn convolve_axis(image: &FloatImage, sigma: f64, axis: Axis) -> FloatImage {
    let len = image.len_of(axis);
    let kernel = gaussian_kernel(sigma, 2 * len);
    let radius = (kernel.len() / 2) as isize;
    let mut out = FloatImage::zeros(image.dim());

    for (src, mut dst) in image.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        for i in 0..len {
            dst[i] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * src[reflect_index(i as isize + k as isize - radius, len)])
                .sum::<f64>();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use ndarray::arr2;

    #[test]
    fn reflect_mirrors_edges() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        // Wider than the image itself
        assert_eq!(reflect_index(9, 2), 1);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0, 100);
        assert_eq!(kernel.len(), 2 * 8 + 1);
        assert_abs_diff_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(kernel[0], kernel[kernel.len() - 1], epsilon = 1e-15);
    }

    #[test]
    fn kernel_radius_is_clamped() {
        assert_eq!(gaussian_kernel(2.0, 3).len(), 7);
        let wide = gaussian_kernel(1e12, 10);
        assert_eq!(wide.len(), 21);
        assert_abs_diff_eq!(wide.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn huge_sigma_flattens_small_image() {
        let image = arr2(&[[0.0, 1.0, 0.0], [1.0, 0.0, 1.0]]);
        let blurred = gaussian_blur(&image, 1e12);
        assert_eq!(blurred.dim(), (2, 3));
        for v in blurred.iter() {
            assert_abs_diff_eq!(*v, 0.5, epsilon = 0.1);
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        let image = arr2(&[[0.0, 0.5], [1.0, 0.25]]);
        assert_eq!(gaussian_blur(&image, 0.0), image);
    }

    #[test]
    fn blur_preserves_constant_image() {
        let image = FloatImage::from_elem((7, 5), 0.3);
        let blurred = gaussian_blur(&image, 1.5);
        for v in blurred.iter() {
            assert_abs_diff_eq!(*v, 0.3, epsilon = 1e-12);
        }
    }

    #[test]
    fn blur_spreads_impulse() {
        let mut image = FloatImage::zeros((9, 9));
        image[[4, 4]] = 1.0;
        let blurred = gaussian_blur(&image, 1.0);
        assert!(blurred[[4, 4]] < 1.0);
        assert!(blurred[[4, 5]] > 0.0);
        assert_abs_diff_eq!(blurred[[3, 4]], blurred[[5, 4]], epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.sum(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn luma8_is_rescaled_by_255() {
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(img), Path::new("a.png")).unwrap();
        assert_eq!(raw.encoding(), PixelEncoding::U8);
        assert_eq!(raw.pixels()[[0, 1]], 255.0);
        assert_eq!(raw.normalized()[[0, 1]], 1.0);
        assert_eq!(raw.normalized()[[0, 0]], 0.0);
    }

    #[test]
    fn rgb_is_reduced_with_luma_weights() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgb8(img), Path::new("a.png")).unwrap();
        assert_abs_diff_eq!(raw.normalized()[[0, 0]], 0.2125, epsilon = 1e-12);
    }

    #[test]
    fn rows_and_columns_follow_image_layout() {
        let img = GrayImage::from_fn(3, 2, |x, y| Luma([(10 * y + x) as u8]));
        let raw = RawImage::from_dynamic(DynamicImage::ImageLuma8(img), Path::new("a.png")).unwrap();
        assert_eq!(raw.dim(), (2, 3));
        assert_eq!(raw.pixels()[[1, 2]], 12.0);
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = GrayImage::new(0, 0);
        let err = RawImage::from_dynamic(DynamicImage::ImageLuma8(img), Path::new("e.png"));
        assert!(matches!(err, Err(SegmentationError::EmptyImage { .. })));
    }
}
