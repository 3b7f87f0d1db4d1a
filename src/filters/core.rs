//! Core utilities shared by the spatial and frequency filters.
//!
//! This module provides:
//! - Gaussian kernel generation
//! - 2D convolution with "valid" and "same" boundary handling
//! - Conversion of real-valued results back to 8-bit samples

use log::trace;
use ndarray::{s, Array2, ArrayView2, Zip};

use crate::error::{FilterError, Result};

/// Boundary handling for [`convolve2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Only positions where the kernel lies fully inside the image.
    /// Output shrinks by `kernel - 1` along each axis.
    Valid,
    /// Output has the input's shape; samples outside the image come from
    /// the given border extension.
    Same(Border),
}

/// How samples outside the image are synthesized in [`ConvolveMode::Same`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Outside samples are zero.
    Zero,
    /// Outside samples repeat the nearest edge sample.
    Replicate,
}

/// Side length of the Gaussian kernel used for a given `sigma`.
///
/// Covers four standard deviations on each side and is always odd.
/// Saturates at `usize::MAX` for a sigma no image could fit.
pub fn gaussian_kernel_size(sigma: f64) -> usize {
    let half = (4.0 * sigma).floor() as usize;
    half.saturating_mul(2).saturating_add(1)
}

/// Generate a normalized 1D Gaussian kernel of [`gaussian_kernel_size`] taps.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian, must be positive
///
/// # Returns
/// Kernel weights summing to 1
pub fn gaussian_kernel_1d(sigma: f64) -> Vec<f64> {
    let kernel_size = gaussian_kernel_size(sigma);
    let center = (kernel_size - 1) as f64 / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Generate a square 2D Gaussian kernel as the outer product of the 1D kernel.
pub fn gaussian_kernel_2d(sigma: f64) -> Array2<f64> {
    let k1d = gaussian_kernel_1d(sigma);
    let size = k1d.len();

    Array2::from_shape_fn((size, size), |(y, x)| k1d[y] * k1d[x])
}

/// Convolve a grayscale image with a real-valued kernel.
///
/// This is a true convolution (the kernel is flipped), computed in `f64`.
/// Output positions are evaluated in parallel.
///
/// # Errors
/// [`FilterError::EmptyImage`] for an empty image or kernel, and
/// [`FilterError::ImageTooSmall`] when `Valid` mode has no output position.
pub fn convolve2d(
    image: ArrayView2<u8>,
    kernel: ArrayView2<f64>,
    mode: ConvolveMode,
) -> Result<Array2<f64>> {
    ensure_not_empty(image, "image")?;
    if kernel.is_empty() {
        return Err(FilterError::EmptyImage { name: "kernel" });
    }

    let (rows, cols) = image.dim();
    let (k_rows, k_cols) = kernel.dim();
    let flipped = kernel.slice(s![..;-1, ..;-1]);

    let padded = match mode {
        ConvolveMode::Valid => {
            if rows < k_rows || cols < k_cols {
                return Err(FilterError::ImageTooSmall {
                    rows,
                    cols,
                    kernel: k_rows.max(k_cols),
                });
            }
            image.mapv(f64::from)
        }
        ConvolveMode::Same(border) => {
            // Centered like the middle of the "full" convolution.
            let top = k_rows - 1 - (k_rows - 1) / 2;
            let left = k_cols - 1 - (k_cols - 1) / 2;
            pad(image, (top, k_rows - 1 - top), (left, k_cols - 1 - left), border)
        }
    };

    trace!(
        "convolve2d: {}x{} image, {}x{} kernel, {:?}",
        rows,
        cols,
        k_rows,
        k_cols,
        mode
    );

    let output = Zip::from(padded.windows((k_rows, k_cols)))
        .par_map_collect(|window| (&window * &flipped).sum());

    Ok(output)
}

/// Extend the image by `(before, after)` samples on each axis.
fn pad(
    image: ArrayView2<u8>,
    rows_pad: (usize, usize),
    cols_pad: (usize, usize),
    border: Border,
) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let shape = (rows + rows_pad.0 + rows_pad.1, cols + cols_pad.0 + cols_pad.1);

    match border {
        Border::Zero => {
            let mut padded = Array2::<f64>::zeros(shape);
            padded
                .slice_mut(s![rows_pad.0..rows_pad.0 + rows, cols_pad.0..cols_pad.0 + cols])
                .assign(&image.mapv(f64::from));
            padded
        }
        Border::Replicate => Array2::from_shape_fn(shape, |(y, x)| {
            let sy = y.saturating_sub(rows_pad.0).min(rows - 1);
            let sx = x.saturating_sub(cols_pad.0).min(cols - 1);
            f64::from(image[[sy, sx]])
        }),
    }
}

/// Clip a real sample to [0, 255] and round it to the nearest integer.
///
/// NaN maps to 0.
#[inline]
pub fn clip_to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round() as u8
}

/// Clip a real sample to [0, 255] and drop its fractional part.
///
/// NaN maps to 0.
#[inline]
pub fn truncate_to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).trunc() as u8
}

/// Convert a real-valued image back to 8-bit samples.
pub fn to_u8_image(values: &Array2<f64>) -> Array2<u8> {
    values.mapv(clip_to_u8)
}

pub(crate) fn ensure_not_empty(image: ArrayView2<u8>, name: &'static str) -> Result<()> {
    if image.is_empty() {
        return Err(FilterError::EmptyImage { name });
    }
    Ok(())
}
