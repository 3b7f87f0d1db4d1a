//! Spatial low-pass (Gaussian) filter.
//!
//! Smooths a grayscale image by convolving it with a normalized Gaussian
//! kernel. Only positions where the kernel fits completely inside the image
//! are kept, so the result is smaller than the input by `kernel_size - 1`
//! along each axis.

use log::debug;
use ndarray::{Array2, ArrayView2};

use super::core::{
    convolve2d, ensure_not_empty, gaussian_kernel_2d, gaussian_kernel_size, to_u8_image,
    ConvolveMode,
};
use crate::error::{FilterError, Result};

/// Apply a Gaussian low-pass filter.
///
/// # Arguments
/// * `image` - Grayscale image (rows, cols)
/// * `sigma` - Standard deviation of the Gaussian, must be positive
///
/// # Returns
/// Smoothed image of shape `(rows - k + 1, cols - k + 1)` where
/// `k = 2 * floor(4 * sigma) + 1`
pub fn lowpass_gaussian(image: ArrayView2<u8>, sigma: f64) -> Result<Array2<u8>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilterError::invalid("sigma", sigma, "must be positive and finite"));
    }

    ensure_not_empty(image, "image")?;

    let (rows, cols) = image.dim();
    let kernel_size = gaussian_kernel_size(sigma);
    if rows < kernel_size || cols < kernel_size {
        return Err(FilterError::ImageTooSmall {
            rows,
            cols,
            kernel: kernel_size,
        });
    }

    debug!(
        "lowpass_gaussian: {:?} image, sigma={}, kernel={}",
        image.dim(),
        sigma,
        kernel_size
    );

    let kernel = gaussian_kernel_2d(sigma);
    let filtered = convolve2d(image, kernel.view(), ConvolveMode::Valid)?;

    Ok(to_u8_image(&filtered))
}

/// Output dimensions of [`lowpass_gaussian`] for an image of `rows x cols`.
///
/// Returns `None` when the kernel does not fit.
pub fn gaussian_output_dim(rows: usize, cols: usize, sigma: f64) -> Option<(usize, usize)> {
    let k = gaussian_kernel_size(sigma);
    if rows < k || cols < k {
        return None;
    }
    Some((rows - k + 1, cols - k + 1))
}
