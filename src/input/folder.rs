use super::ImageSource;
use crate::error::{Result, SegmentationError};
use crate::segmentation::RawImage;
use image::{ImageError, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

/// Decode an image file and reduce it to grayscale
///
/// The format is sniffed from the file contents, so the extension does not
/// need to match.
pub fn load_grayscale(path: &Path) -> Result<RawImage> {
    let load_err = |source: ImageError| SegmentationError::Load {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_err(ImageError::IoError(e)))?
        .decode()
        .map_err(load_err)?;

    tracing::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    RawImage::from_dynamic(image, path)
}

/// Every entry of a directory, sorted by file name
///
/// No extension filter is applied: anything that fails to decode is
/// reported by `load` and skipped by the caller.
pub struct FolderSource {
    dir: PathBuf,
}

impl FolderSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for FolderSource {
    fn entries(&self) -> Result<Vec<PathBuf>> {
        let folder_err = |source| SegmentationError::Folder {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir)
            .map_err(folder_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(folder_err)?;
        entries.sort();

        Ok(entries)
    }

    fn load(&self, path: &Path) -> Result<RawImage> {
        load_grayscale(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::PixelEncoding;
    use image::{ImageBuffer, Luma};

    #[test]
    fn missing_folder_is_a_folder_error() {
        let source = FolderSource::new("/definitely/not/here");
        assert!(matches!(
            source.entries(),
            Err(SegmentationError::Folder { .. })
        ));
    }

    #[test]
    fn entries_are_sorted_and_unfiltered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.txt", "c.tif"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<String> = FolderSource::new(dir.path())
            .entries()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.png", "c.tif"]);
    }

    #[test]
    fn loads_sixteen_bit_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(4, 3, |x, _| Luma([x as u16 * 1000]));
        img.save(&path).unwrap();

        let raw = load_grayscale(&path).unwrap();
        assert_eq!(raw.encoding(), PixelEncoding::U16);
        assert_eq!(raw.dim(), (3, 4));
        assert_eq!(raw.pixels()[[2, 3]], 3000.0);
    }

    #[test]
    fn garbage_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image at all").unwrap();
        assert!(matches!(
            load_grayscale(&path),
            Err(SegmentationError::Load { .. })
        ));
    }
}
