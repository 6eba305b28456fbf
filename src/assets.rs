//! Local image assets: resolution and dimension probing.
//!
//! The network side of image retrieval lives outside this crate; by the
//! time a pass renders, every image is a local file. This module maps
//! those files to [`ImageAsset`] values the layout engine can place,
//! skipping (and logging) anything unreadable rather than aborting the
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::progress::ProgressSink;

/// Raster file extensions considered part of a listing's gallery.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// An already-retrieved image with known pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// URL the image was retrieved from, if known.
    pub source_url: Option<String>,

    /// Local file path.
    pub path: PathBuf,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl ImageAsset {
    /// Probe a local file for its pixel dimensions.
    ///
    /// Only the image header is read. Unreadable or undecodable files are
    /// reported as [`Error::AssetUnavailable`].
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| Error::AssetUnavailable(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            source_url: None,
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    /// Attach the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Read the raw file contents for embedding.
    pub fn read_data(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .map_err(|e| Error::AssetUnavailable(format!("{}: {}", self.path.display(), e)))
    }

    /// Aspect ratio (width over height).
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Collect the gallery images from a listing directory, in filename order.
///
/// Non-raster files are ignored; raster files whose dimensions cannot be
/// read are logged and skipped. An unreadable directory is an error.
pub fn resolve_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<ImageAsset>> {
    resolve_dir_with_progress(dir, &ProgressSink::disabled())
}

/// Like [`resolve_dir`], reporting one progress message per image.
pub fn resolve_dir_with_progress<P: AsRef<Path>>(
    dir: P,
    progress: &ProgressSink,
) -> Result<Vec<ImageAsset>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_image_extension(path))
        .collect();
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        match ImageAsset::probe(&path) {
            Ok(asset) => {
                progress.message(format!(
                    "Resolved image {} ({}x{})",
                    asset.path.display(),
                    asset.width,
                    asset.height
                ));
                assets.push(asset);
            }
            Err(e) => {
                progress.message(format!("Skipped image: {}", e));
                log::warn!("skipping unreadable image: {}", e);
            }
        }
    }
    Ok(assets)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_pixel(width, height, Rgb::<u8>([200, 60, 60]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_probe_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_1.png");
        write_png(&path, 8, 4);

        let asset = ImageAsset::probe(&path).unwrap();
        assert_eq!(asset.width, 8);
        assert_eq!(asset.height, 4);
        assert_eq!(asset.aspect(), 2.0);
    }

    #[test]
    fn test_probe_missing_file_is_unavailable() {
        let err = ImageAsset::probe("no/such/file.jpg").unwrap_err();
        assert!(matches!(err, Error::AssetUnavailable(_)));
    }

    #[test]
    fn test_resolve_dir_reports_progress_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("image_1.png"), 4, 4);
        write_png(&dir.path().join("image_2.png"), 4, 4);

        let (sink, rx) = ProgressSink::channel();
        let assets = resolve_dir_with_progress(dir.path(), &sink).unwrap();
        assert_eq!(assets.len(), 2);

        let messages: Vec<String> = rx
            .try_iter()
            .filter_map(|e| e.message().map(str::to_string))
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("image_1.png"));
        assert!(messages[1].contains("image_2.png"));
    }

    #[test]
    fn test_resolve_dir_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("image_2.png"), 4, 4);
        write_png(&dir.path().join("image_1.png"), 4, 4);
        fs::write(dir.path().join("info.json"), "{}").unwrap();
        // A raster extension with garbage content is skipped, not fatal.
        fs::write(dir.path().join("image_3.jpg"), b"not an image").unwrap();

        let assets = resolve_dir(dir.path()).unwrap();
        let names: Vec<String> = assets
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["image_1.png", "image_2.png"]);
    }
}
