use super::OutputSink;
use crate::error::{Result, SegmentationError};
use crate::segmentation::LabelMask;
use image::{ImageBuffer, ImageError, ImageFormat, ImageReader, Luma};
use std::fs;
use std::path::{Path, PathBuf};

type Luma16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Writes label masks as single-channel 16-bit rasters into one folder
///
/// The file keeps the requested name. PNG and TIFF names are encoded by
/// extension; anything else is encoded as TIFF under the same name.
pub struct LabelRasterWriter {
    dir: PathBuf,
}

impl LabelRasterWriter {
    /// Open (and create if needed) the output folder
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| SegmentationError::Folder {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Encoding used for a given output name
    fn format_for(path: &Path) -> ImageFormat {
        match ImageFormat::from_path(path) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Tiff)) => format,
            _ => ImageFormat::Tiff,
        }
    }
}

/// Convert labels to a 16-bit raster, failing if any label does not fit
fn to_luma16(labels: &LabelMask) -> Result<Luma16Image> {
    let max_label = labels.iter().copied().max().unwrap_or(0);
    if max_label > u16::MAX as u32 {
        return Err(SegmentationError::LabelOverflow { max_label });
    }

    let (rows, cols) = labels.dim();
    Ok(Luma16Image::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([labels[[y as usize, x as usize]] as u16])
    }))
}

impl OutputSink for LabelRasterWriter {
    fn write_labels(&mut self, name: &str, labels: &LabelMask) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let raster = to_luma16(labels)?;

        raster
            .save_with_format(&path, Self::format_for(&path))
            .map_err(|source| SegmentationError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote label mask to {}", path.display());
        Ok(path)
    }
}

/// Read a label raster back into a label mask
pub fn read_label_raster(path: &Path) -> Result<LabelMask> {
    let load_err = |source: ImageError| SegmentationError::Load {
        path: path.to_path_buf(),
        source,
    };

    let raster = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_err(ImageError::IoError(e)))?
        .decode()
        .map_err(load_err)?
        .into_luma16();

    let (width, height) = raster.dimensions();
    Ok(LabelMask::from_shape_fn(
        (height as usize, width as usize),
        |(row, col)| raster.get_pixel(col as u32, row as u32)[0] as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_labels() -> LabelMask {
        LabelMask::from_shape_fn((5, 7), |(r, c)| match (r + c) % 4 {
            0 => 0,
            1 => 1,
            2 => 300,
            _ => 65535,
        })
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = LabelRasterWriter::new(dir.path()).unwrap();
        let labels = sample_labels();

        let path = writer.write_labels("mask.png", &labels).unwrap();
        assert_eq!(path, dir.path().join("mask.png"));
        assert_eq!(read_label_raster(&path).unwrap(), labels);
    }

    #[test]
    fn unknown_extension_is_written_as_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = LabelRasterWriter::new(dir.path()).unwrap();
        let labels = sample_labels();

        let path = writer.write_labels("nuclei.jpg", &labels).unwrap();
        assert_eq!(ImageFormat::from_path(&path).unwrap(), ImageFormat::Jpeg);
        assert_eq!(read_label_raster(&path).unwrap(), labels);
    }

    #[test]
    fn creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        LabelRasterWriter::new(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn oversized_label_is_rejected() {
        let mut labels = LabelMask::zeros((2, 2));
        labels[[1, 1]] = 70_000;
        assert!(matches!(
            to_luma16(&labels),
            Err(SegmentationError::LabelOverflow { max_label: 70_000 })
        ));
    }
}
