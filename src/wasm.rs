//! WebAssembly exports for the grayscale filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat row-major `u8` buffers of `width * height` samples. Errors are
//! returned to JavaScript as string exceptions.

use ndarray::{Array2, ArrayView2};
use wasm_bindgen::prelude::*;

use crate::config::FilterSettings;
use crate::error::FilterError;
use crate::filters::{self, gaussian_output_dim, FilterOp};

fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// View a flat buffer as a (height, width) image.
fn as_image(data: &[u8], width: usize, height: usize) -> Result<ArrayView2<'_, u8>, FilterError> {
    let mismatch = |expected| FilterError::ShapeMismatch {
        expected,
        got: data.len(),
    };
    let expected = width
        .checked_mul(height)
        .ok_or_else(|| mismatch(usize::MAX))?;
    if data.len() != expected {
        return Err(mismatch(expected));
    }
    ArrayView2::from_shape((height, width), data).map_err(|_| mismatch(expected))
}

/// Row-major samples regardless of memory layout.
fn into_flat(image: Array2<u8>) -> Vec<u8> {
    image.iter().copied().collect()
}

// ============================================================================
// Spatial Low-Pass
// ============================================================================

/// Gaussian low-pass filter.
///
/// # Returns
/// Flat buffer of the shrunk output; see [`gaussian_output_size_wasm`]
#[wasm_bindgen]
pub fn lowpass_gaussian_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    sigma: f64,
) -> Result<Vec<u8>, JsValue> {
    let image = as_image(data, width, height).map_err(to_js)?;
    let result = filters::lowpass_gaussian(image, sigma).map_err(to_js)?;
    Ok(into_flat(result))
}

/// Output `[width, height]` of the Gaussian filter, empty if the kernel
/// does not fit.
#[wasm_bindgen]
pub fn gaussian_output_size_wasm(width: usize, height: usize, sigma: f64) -> Vec<u32> {
    match gaussian_output_dim(height, width, sigma) {
        Some((rows, cols)) => vec![cols as u32, rows as u32],
        None => Vec::new(),
    }
}

// ============================================================================
// Frequency Low-Pass
// ============================================================================

#[wasm_bindgen]
pub fn lowpass_butterworth_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    d0: f64,
    n: u32,
) -> Result<Vec<u8>, JsValue> {
    let image = as_image(data, width, height).map_err(to_js)?;
    let result = filters::lowpass_butterworth(image, d0, n).map_err(to_js)?;
    Ok(into_flat(result))
}

// ============================================================================
// Spatial High-Pass
// ============================================================================

#[wasm_bindgen]
pub fn highpass_laplacian_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let image = as_image(data, width, height).map_err(to_js)?;
    let result = filters::highpass_laplacian(image).map_err(to_js)?;
    Ok(into_flat(result))
}

// ============================================================================
// Histogram Matching
// ============================================================================

/// Match the source histogram to the reference; output has the source size.
#[wasm_bindgen]
pub fn histogram_match_wasm(
    source: &[u8],
    width: usize,
    height: usize,
    reference: &[u8],
    ref_width: usize,
    ref_height: usize,
) -> Result<Vec<u8>, JsValue> {
    let source = as_image(source, width, height).map_err(to_js)?;
    let reference = as_image(reference, ref_width, ref_height).map_err(to_js)?;
    let result = filters::histogram_match(source, reference).map_err(to_js)?;
    Ok(into_flat(result))
}

// ============================================================================
// Settings
// ============================================================================

/// Default control ranges as JSON.
#[wasm_bindgen]
pub fn default_settings_wasm() -> Result<String, JsValue> {
    FilterSettings::default().to_json().map_err(to_js)
}

/// Check a JSON filter selection against the default control ranges.
#[wasm_bindgen]
pub fn check_filter_wasm(op_json: &str) -> Result<(), JsValue> {
    let op = FilterOp::from_json(op_json).map_err(to_js)?;
    FilterSettings::default().check(&op).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_image_checks_length() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let image = as_image(&data, 3, 2).unwrap();
        assert_eq!(image[[1, 0]], 4);
        assert_eq!(
            as_image(&data, 4, 2).unwrap_err(),
            FilterError::ShapeMismatch {
                expected: 8,
                got: 6
            }
        );
    }

    #[test]
    fn test_as_image_rejects_overflowing_dims() {
        let data = [0u8; 4];
        assert_eq!(
            as_image(&data, usize::MAX, 2).unwrap_err(),
            FilterError::ShapeMismatch {
                expected: usize::MAX,
                got: 4
            }
        );
    }

    #[test]
    fn test_gaussian_output_size() {
        assert_eq!(gaussian_output_size_wasm(20, 10, 1.0), vec![12, 2]);
        assert!(gaussian_output_size_wasm(5, 5, 1.0).is_empty());
        assert!(gaussian_output_size_wasm(10, 10, 1.0e19).is_empty());
    }
}
