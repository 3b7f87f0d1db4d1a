//! dipfilters
//!
//! Classical digital image filters for 8-bit grayscale images, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! All filters take a 2D `u8` array of shape (height, width) and return a new
//! array. Inputs are never modified.
//!
//! ## Filters
//! - [`filters::lowpass_gaussian`]: Gaussian smoothing, "valid" convolution
//!   (output shrinks by the kernel size minus one)
//! - [`filters::lowpass_butterworth`]: Butterworth low-pass in the frequency domain
//! - [`filters::highpass_laplacian`]: Laplacian edge enhancement
//! - [`filters::histogram_match`]: match a source histogram to a reference
//!
//! [`filters::FilterOp`] bundles a filter with its parameters for menu-style
//! dispatch, and [`config::FilterSettings`] carries the parameter ranges a UI
//! offers.

pub mod config;
pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{FilterError, Result};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::FilterSettings;
    use crate::error::FilterError;
    use crate::filters::{self, FilterOp};

    /// Map FilterError to a Python ValueError.
    fn map_filter_error(err: FilterError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Apply a Gaussian low-pass filter.
    ///
    /// The result is smaller than the input by `2 * floor(4 * sigma)` along
    /// each axis.
    #[pyfunction]
    #[pyo3(signature = (image, sigma=1.0))]
    pub fn lowpass_gaussian<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        sigma: f64,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = filters::lowpass_gaussian(image.as_array(), sigma).map_err(map_filter_error)?;
        Ok(result.into_pyarray(py))
    }

    /// Apply a Butterworth low-pass filter in the frequency domain.
    #[pyfunction]
    #[pyo3(signature = (image, d0=40.0, n=2))]
    pub fn lowpass_butterworth<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        d0: f64,
        n: u32,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result =
            filters::lowpass_butterworth(image.as_array(), d0, n).map_err(map_filter_error)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn highpass_laplacian<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = filters::highpass_laplacian(image.as_array()).map_err(map_filter_error)?;
        Ok(result.into_pyarray(py))
    }

    /// Match the histogram of `source` to that of `reference`.
    #[pyfunction]
    pub fn histogram_match<'py>(
        py: Python<'py>,
        source: PyReadonlyArray2<'py, u8>,
        reference: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = filters::histogram_match(source.as_array(), reference.as_array())
            .map_err(map_filter_error)?;
        Ok(result.into_pyarray(py))
    }

    /// Run a filter selected by JSON, e.g. `{"op": "lowpass_gaussian", "sigma": 1.0}`.
    ///
    /// The selection is checked against the default control ranges first.
    #[pyfunction]
    #[pyo3(signature = (image, op_json, reference=None))]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        op_json: &str,
        reference: Option<PyReadonlyArray2<'py, u8>>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let op = FilterOp::from_json(op_json).map_err(map_filter_error)?;
        FilterSettings::default().check(&op).map_err(map_filter_error)?;
        let reference = reference.as_ref().map(|r| r.as_array());
        let result = op.apply(image.as_array(), reference).map_err(map_filter_error)?;
        Ok(result.into_pyarray(py))
    }

    /// Default control ranges as JSON.
    #[pyfunction]
    pub fn default_settings_json() -> PyResult<String> {
        FilterSettings::default().to_json().map_err(map_filter_error)
    }

    /// dipfilters extension module
    #[pymodule]
    pub fn dipfilters(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(lowpass_gaussian, m)?)?;
        m.add_function(wrap_pyfunction!(lowpass_butterworth, m)?)?;
        m.add_function(wrap_pyfunction!(highpass_laplacian, m)?)?;
        m.add_function(wrap_pyfunction!(histogram_match, m)?)?;

        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        m.add_function(wrap_pyfunction!(default_settings_json, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::dipfilters;
