//! Histogram matching.
//!
//! Remaps the intensities of a source image so that its cumulative
//! distribution follows that of a reference image. Each distinct source
//! level is sent to the reference level found at the same quantile, with
//! linear interpolation between the reference's distinct levels.

use log::{debug, trace};
use ndarray::{Array2, ArrayView2};

use super::core::{ensure_not_empty, truncate_to_u8};
use crate::error::Result;

/// Distinct intensity levels of an image with their counts and quantiles.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityDistribution {
    /// Levels present in the image, ascending.
    pub levels: Vec<u8>,
    /// Number of samples at each level.
    pub counts: Vec<u64>,
    /// Cumulative count up to and including each level, divided by the
    /// total sample count. The last entry is 1.0.
    pub quantiles: Vec<f64>,
}

impl IntensityDistribution {
    /// Build the distribution of all samples in `image`.
    pub fn from_image(image: ArrayView2<u8>) -> Self {
        let hist = compute_histogram(image);

        let mut levels = Vec::new();
        let mut counts = Vec::new();
        for (level, &count) in hist.iter().enumerate() {
            if count > 0 {
                levels.push(level as u8);
                counts.push(count);
            }
        }

        let total = image.len() as f64;
        let mut running = 0u64;
        let quantiles = counts
            .iter()
            .map(|&c| {
                running += c;
                running as f64 / total
            })
            .collect();

        Self {
            levels,
            counts,
            quantiles,
        }
    }

    /// Position of each intensity level in `levels`.
    ///
    /// Entries for levels absent from the image are unspecified.
    pub fn inverse_index(&self) -> [usize; 256] {
        let mut index = [0usize; 256];
        for (i, &level) in self.levels.iter().enumerate() {
            index[level as usize] = i;
        }
        index
    }
}

/// Match the histogram of `source` to that of `reference`.
///
/// # Arguments
/// * `source` - Image whose intensities are remapped
/// * `reference` - Image providing the target distribution; may differ in shape
///
/// # Returns
/// Remapped image with the shape of `source`. Interpolated levels are
/// truncated, not rounded.
pub fn histogram_match(source: ArrayView2<u8>, reference: ArrayView2<u8>) -> Result<Array2<u8>> {
    ensure_not_empty(source, "source")?;
    ensure_not_empty(reference, "reference")?;
    debug!(
        "histogram_match: source {:?}, reference {:?}",
        source.dim(),
        reference.dim()
    );

    let src = IntensityDistribution::from_image(source);
    let reference = IntensityDistribution::from_image(reference);
    trace!(
        "histogram_match: {} source levels, {} reference levels",
        src.levels.len(),
        reference.levels.len()
    );

    let ref_levels: Vec<f64> = reference.levels.iter().map(|&v| f64::from(v)).collect();
    let matched: Vec<f64> = src
        .quantiles
        .iter()
        .map(|&q| interp(q, &reference.quantiles, &ref_levels))
        .collect();

    // Lookup table from source level to matched level
    let bin_idx = src.inverse_index();
    let mut lut = [0u8; 256];
    for &level in &src.levels {
        lut[level as usize] = truncate_to_u8(matched[bin_idx[level as usize]]);
    }

    Ok(source.mapv(|v| lut[v as usize]))
}

/// Compute the 256-bin histogram of an image.
fn compute_histogram(image: ArrayView2<u8>) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in image.iter() {
        hist[v as usize] += 1;
    }
    hist
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-empty and strictly ascending. Values outside the
/// range of `xp` take the first or last `fp`.
fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    let j = xp.partition_point(|&p| p <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
