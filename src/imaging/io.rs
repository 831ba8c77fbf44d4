//! Image decoding and encoding for the sampling pipeline.
//!
//! Source images (PNG/JPEG/BMP/GIF/TIFF) are decoded to 16-bit grayscale so
//! high bit-depth scans keep their full intensity range for normalization.
//! Samples are written as 8-bit grayscale PNG.

use std::path::Path;

use image::ImageFormat;

use crate::error::{BenchError, Result};
use crate::imaging::normalize::{NormalizedImage, RawImage};

/// Decodes image bytes to grayscale intensities.
pub fn decode_raw(bytes: &[u8]) -> Result<RawImage> {
    let img = image::load_from_memory(bytes).map_err(|e| BenchError::image("decoding image", e))?;
    let gray = img.to_luma16();
    Ok(RawImage {
        width: gray.width(),
        height: gray.height(),
        pixels: gray.pixels().map(|p| f64::from(p.0[0])).collect(),
    })
}

/// Reads and decodes the image at `path`.
pub fn load_raw(path: &Path) -> Result<RawImage> {
    let bytes = std::fs::read(path).map_err(|e| BenchError::io(format!("reading {}", path.display()), e))?;
    decode_raw(&bytes).map_err(|e| match e {
        BenchError::Image { source, .. } => BenchError::image(format!("decoding {}", path.display()), source),
        other => other,
    })
}

/// Writes `image` as PNG, creating parent directories.
pub fn save_png(path: &Path, image: &NormalizedImage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| BenchError::io(format!("creating {}", parent.display()), e))?;
    }
    image
        .to_luma8()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| BenchError::image(format!("writing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn png_round_trip_preserves_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/dir/out.png");
        let img = NormalizedImage { width: 3, height: 2, pixels: vec![0.0, 50.0, 100.0, 150.0, 200.0, 255.0] };
        save_png(&path, &img).unwrap();

        let raw = load_raw(&path).unwrap();
        assert_eq!((raw.width, raw.height), (3, 2));
        // 8-bit levels widen to 16 bits as v * 257.
        assert_eq!(raw.pixels, vec![0.0, 50.0 * 257.0, 100.0 * 257.0, 150.0 * 257.0, 200.0 * 257.0, 255.0 * 257.0]);
    }

    #[test]
    fn sixteen_bit_source_keeps_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.png");
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(2, 1, vec![1000, 1001]).unwrap();
        buf.save(&path).unwrap();
        assert_eq!(load_raw(&path).unwrap().pixels, vec![1000.0, 1001.0]);
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(decode_raw(b"definitely not an image"), Err(BenchError::Image { .. })));
    }
}
