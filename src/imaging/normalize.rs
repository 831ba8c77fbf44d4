//! Intensity normalization of raw benchmark images.
//!
//! The 1st and 99th percentiles become the black and white points; values
//! outside that window are clipped. Normalizing an already-normalized image
//! is not a no-op: the window is recomputed from the new data, so clipped
//! tails and quantization shift it slightly.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

use crate::error::{BenchError, Result};
use crate::imaging::percentile::percentile;

/// Minimum 1st-to-99th percentile spread of a usable image.
pub const DEFAULT_EPSILON: f64 = 0.001;

const LOW_QUANTILE: f64 = 0.01;
const HIGH_QUANTILE: f64 = 0.99;
const WHITE: f32 = 255.0;

/// Single-channel intensities as decoded, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f64>,
}

/// Intensities in [0, 255], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

/// Output resolution, `width` columns by `height` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    /// Parses `W,H`, e.g. `1024,1024`.
    pub fn parse(s: &str) -> Result<TargetSize> {
        let bad = || BenchError::invalid_input(format!("bad target size {:?}, expected W,H", s));
        let (w, h) = s.split_once(',').ok_or_else(bad)?;
        let width = w.trim().parse::<u32>().map_err(|_| bad())?;
        let height = h.trim().parse::<u32>().map_err(|_| bad())?;
        if width == 0 || height == 0 {
            return Err(bad());
        }
        Ok(TargetSize { width, height })
    }
}

impl std::str::FromStr for TargetSize {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        TargetSize::parse(s)
    }
}

/// Rescales `raw` so [p1, p99] maps onto [0, 255], then resizes to `target`.
///
/// Each pixel becomes `(v - p1) * 255 / (p99 - p1)`, clipped to [0, 255], so
/// the mapping is monotone and the brightest and darkest percent saturate.
/// Percentiles interpolate linearly between the two nearest ranks.
///
/// # Arguments
/// - `raw`     : decoded intensities, any numeric range
/// - `target`  : output size; `None` (or the input's own size) skips resizing
/// - `epsilon` : smallest usable `p99 - p1`, normally [`DEFAULT_EPSILON`]
///
/// # Errors
/// - `DegenerateImage` when `p99 - p1 < epsilon` (a flat or near-flat image).
///   The error carries no path; callers attach one with the file they read.
/// - `InvalidInput` when the buffer is empty or does not hold
///   `width * height` values.
pub fn normalize(raw: &RawImage, target: Option<TargetSize>, epsilon: f64) -> Result<NormalizedImage> {
    if raw.pixels.is_empty() || raw.pixels.len() != raw.width as usize * raw.height as usize {
        return Err(BenchError::invalid_input(format!(
            "image buffer holds {} values for {}x{} pixels",
            raw.pixels.len(),
            raw.width,
            raw.height
        )));
    }

    let mut sorted = raw.pixels.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let (low, high) = match (percentile(&sorted, LOW_QUANTILE), percentile(&sorted, HIGH_QUANTILE)) {
        (Some(l), Some(h)) => (l, h),
        _ => return Err(BenchError::invalid_input("empty image")),
    };
    if !(high - low >= epsilon) {
        return Err(BenchError::DegenerateImage { path: None, low, high });
    }

    let scale = f64::from(WHITE) / (high - low);
    let pixels = raw
        .pixels
        .iter()
        .map(|&v| (((v - low) * scale) as f32).clamp(0.0, WHITE))
        .collect();

    let image = NormalizedImage { width: raw.width, height: raw.height, pixels };
    match target {
        Some(t) if (t.width, t.height) != (image.width, image.height) => resize(image, t),
        _ => Ok(image),
    }
}

/// Bilinear resize. The triangle filter has non-negative weights, so the
/// result stays inside [0, 255].
fn resize(image: NormalizedImage, target: TargetSize) -> Result<NormalizedImage> {
    if target.width == 0 || target.height == 0 {
        return Err(BenchError::invalid_input("target size must be non-zero"));
    }
    let unit: Vec<f32> = image.pixels.iter().map(|v| v / WHITE).collect();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(image.width, image.height, unit)
        .ok_or_else(|| BenchError::invalid_input("pixel buffer does not match dimensions"))?;

    let resized = imageops::resize(&buffer, target.width, target.height, FilterType::Triangle);
    let pixels = resized
        .into_raw()
        .into_iter()
        .map(|v| (v * WHITE).clamp(0.0, WHITE))
        .collect();

    Ok(NormalizedImage { width: target.width, height: target.height, pixels })
}

impl NormalizedImage {
    /// Rounds to 8-bit grey levels.
    pub fn to_luma8(&self) -> ImageBuffer<Luma<u8>, Vec<u8>> {
        let bytes: Vec<u8> = self.pixels.iter().map(|v| v.round().clamp(0.0, WHITE) as u8).collect();
        ImageBuffer::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
    }
}
