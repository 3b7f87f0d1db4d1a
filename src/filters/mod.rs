//! Filter modules for grayscale image processing.
//!
//! ## Supported Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W) | u8 | Single luminance channel, 0-255 |
//!
//! Every filter borrows its input and allocates a new output; nothing is
//! modified in place.
//!
//! ## Filter Categories
//!
//! - **Spatial low-pass**: lowpass_gaussian ("valid" convolution, output shrinks)
//! - **Frequency low-pass**: lowpass_butterworth (FFT, same shape)
//! - **Spatial high-pass**: highpass_laplacian ("same" convolution)
//! - **Tonal**: histogram_match (shape of the source image)

pub mod core;
pub mod blur;
pub mod frequency;
pub mod edge;
pub mod histogram;

pub use blur::{gaussian_output_dim, lowpass_gaussian};
pub use edge::highpass_laplacian;
pub use frequency::lowpass_butterworth;
pub use histogram::histogram_match;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// A filter selection together with its parameters.
///
/// Serialized with an `op` tag, e.g.
/// `{"op": "lowpass_butterworth", "d0": 40.0, "n": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterOp {
    LowpassGaussian { sigma: f64 },
    LowpassButterworth { d0: f64, n: u32 },
    HighpassLaplacian,
    HistogramMatch,
}

impl FilterOp {
    /// Menu label for this filter.
    pub fn title(&self) -> &'static str {
        match self {
            FilterOp::LowpassGaussian { .. } => "Lowpass Gaussian Filter (Spatial Domain)",
            FilterOp::LowpassButterworth { .. } => "Lowpass Butterworth Filter (Frequency Domain)",
            FilterOp::HighpassLaplacian => "Highpass Laplacian Filter (Spatial Domain)",
            FilterOp::HistogramMatch => "Histogram Matching",
        }
    }

    /// Run the selected filter.
    ///
    /// `reference` is only read by [`FilterOp::HistogramMatch`], which fails
    /// with [`FilterError::MissingReference`] without one.
    pub fn apply(
        &self,
        image: ArrayView2<u8>,
        reference: Option<ArrayView2<u8>>,
    ) -> Result<Array2<u8>> {
        match *self {
            FilterOp::LowpassGaussian { sigma } => lowpass_gaussian(image, sigma),
            FilterOp::LowpassButterworth { d0, n } => lowpass_butterworth(image, d0, n),
            FilterOp::HighpassLaplacian => highpass_laplacian(image),
            FilterOp::HistogramMatch => {
                let reference = reference.ok_or(FilterError::MissingReference)?;
                histogram_match(image, reference)
            }
        }
    }

    /// Parse a selection from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FilterError::Config(format!("filter op: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_dispatches() {
        let img = Array2::<u8>::from_elem((12, 12), 90);

        let out = FilterOp::LowpassGaussian { sigma: 1.0 }.apply(img.view(), None).unwrap();
        assert_eq!(out.dim(), (4, 4));

        let out = FilterOp::HighpassLaplacian.apply(img.view(), None).unwrap();
        assert!(out.iter().all(|&v| v == 0));

        let out = FilterOp::LowpassButterworth { d0: 40.0, n: 2 }
            .apply(img.view(), None)
            .unwrap();
        assert_eq!(out.dim(), (12, 12));

        let out = FilterOp::HistogramMatch.apply(img.view(), Some(img.view())).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_histogram_match_needs_reference() {
        let img = Array2::<u8>::zeros((2, 2));
        assert_eq!(
            FilterOp::HistogramMatch.apply(img.view(), None).unwrap_err(),
            FilterError::MissingReference
        );
    }

    #[test]
    fn test_parse_from_json() {
        let op = FilterOp::from_json(r#"{"op": "lowpass_butterworth", "d0": 25.0, "n": 3}"#).unwrap();
        assert_eq!(op, FilterOp::LowpassButterworth { d0: 25.0, n: 3 });
        assert_eq!(op.title(), "Lowpass Butterworth Filter (Frequency Domain)");

        let op = FilterOp::from_json(r#"{"op": "highpass_laplacian"}"#).unwrap();
        assert_eq!(op, FilterOp::HighpassLaplacian);

        assert!(matches!(
            FilterOp::from_json(r#"{"op": "sharpen"}"#),
            Err(FilterError::Config(_))
        ));
    }
}
