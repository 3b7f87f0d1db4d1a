//! Error type shared by all filters.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A numeric parameter is outside its valid domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("image \"{name}\" has no samples")]
    EmptyImage { name: &'static str },

    /// "Valid" convolution has no output position when the kernel
    /// does not fit inside the image.
    #[error("image of {rows}x{cols} is smaller than the {kernel}x{kernel} kernel")]
    ImageTooSmall {
        rows: usize,
        cols: usize,
        kernel: usize,
    },

    #[error("histogram matching requires a reference image")]
    MissingReference,

    /// Flat buffer length does not agree with the declared dimensions.
    #[error("buffer holds {got} samples, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("settings: {0}")]
    Config(String),
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        FilterError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
