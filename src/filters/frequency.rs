//! Frequency-domain low-pass (Butterworth) filter.
//!
//! The image is transformed with a 2D FFT, its spectrum is shifted so the
//! zero frequency sits in the middle, scaled by a Butterworth transfer
//! function, shifted back and inverted. The magnitude of the inverse
//! transform is the filtered image.
//!
//! ## Distance term
//!
//! The transfer function measures `D` from the point `(rows / 2, cols / 2)`
//! using the unshifted `fftfreq` sample frequencies (cycles per sample, all
//! within `[-0.5, 0.5)`). Those frequencies never approach the image
//! midpoint, so `D` is roughly `hypot(rows, cols) / 2` everywhere and the
//! filter acts close to a uniform gain that depends on the image size. This
//! formula is kept as-is so results stay compatible with existing outputs;
//! a centered-frequency distance would be the textbook definition.

use std::sync::Arc;

use log::{debug, trace};
use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftDirection, FftPlanner};

use super::core::{ensure_not_empty, truncate_to_u8};
use crate::error::{FilterError, Result};

/// Sample frequencies of an `n`-point DFT with unit spacing.
///
/// Ordered like the transform output: `[0, 1, ..., -1] / n`.
pub fn fftfreq(n: usize) -> Vec<f64> {
    let positive = (n + 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i < positive {
                i as f64
            } else {
                i as f64 - n as f64
            };
            k / n as f64
        })
        .collect()
}

/// Forward 2D discrete Fourier transform (unnormalized).
pub fn fft2(input: ArrayView2<Complex<f64>>) -> Array2<Complex<f64>> {
    transform_2d(input, FftDirection::Forward)
}

/// Inverse 2D discrete Fourier transform, normalized by `rows * cols`.
pub fn ifft2(input: ArrayView2<Complex<f64>>) -> Array2<Complex<f64>> {
    let mut output = transform_2d(input, FftDirection::Inverse);
    let len = output.len();
    if len > 0 {
        let scale = 1.0 / len as f64;
        output.mapv_inplace(|c| c * scale);
    }
    output
}

/// Move the zero-frequency component to the center of the array.
pub fn fftshift<T: Clone>(input: ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = input.dim();
    roll(input, rows / 2, cols / 2)
}

/// Inverse of [`fftshift`]; differs from it for odd dimensions.
pub fn ifftshift<T: Clone>(input: ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = input.dim();
    roll(input, rows - rows / 2, cols - cols / 2)
}

/// Butterworth low-pass transfer function over a `rows x cols` grid.
///
/// `H = 1 / (1 + (D / d0)^n)` with `D` as described in the module docs.
pub fn butterworth_transfer(rows: usize, cols: usize, d0: f64, n: u32) -> Array2<f64> {
    let u = fftfreq(rows);
    let v = fftfreq(cols);
    let mid_row = rows as f64 / 2.0;
    let mid_col = cols as f64 / 2.0;
    let order = f64::from(n);

    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let d = (u[i] - mid_row).hypot(v[j] - mid_col);
        1.0 / (1.0 + (d / d0).powf(order))
    })
}

/// Apply a Butterworth low-pass filter in the frequency domain.
///
/// # Arguments
/// * `image` - Grayscale image (rows, cols)
/// * `d0` - Cutoff radius, must be positive
/// * `n` - Filter order, at least 1
///
/// # Returns
/// Filtered image with the same shape as the input. Magnitudes are clipped
/// to [0, 255] and their fractional part is dropped.
pub fn lowpass_butterworth(image: ArrayView2<u8>, d0: f64, n: u32) -> Result<Array2<u8>> {
    if !d0.is_finite() || d0 <= 0.0 {
        return Err(FilterError::invalid("d0", d0, "must be positive and finite"));
    }
    if n == 0 {
        return Err(FilterError::invalid("n", 0.0, "must be at least 1"));
    }
    ensure_not_empty(image, "image")?;

    let (rows, cols) = image.dim();
    debug!(
        "lowpass_butterworth: {:?} image, d0={}, n={}",
        image.dim(),
        d0,
        n
    );

    let samples = image.mapv(|v| Complex::new(f64::from(v), 0.0));
    let mut spectrum = fftshift(fft2(samples.view()).view());
    let transfer = butterworth_transfer(rows, cols, d0, n);

    Zip::from(&mut spectrum)
        .and(&transfer)
        .for_each(|c, &h| *c *= h);

    let restored = ifft2(ifftshift(spectrum.view()).view());
    Ok(restored.mapv(|c| truncate_to_u8(c.norm())))
}

/// Shift every element by `(shift_rows, shift_cols)` with wrap-around.
fn roll<T: Clone>(input: ArrayView2<T>, shift_rows: usize, shift_cols: usize) -> Array2<T> {
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let sy = (y + rows - shift_rows) % rows;
        let sx = (x + cols - shift_cols) % cols;
        input[[sy, sx]].clone()
    })
}

/// Row pass followed by a column pass, each parallelized across lines.
fn transform_2d(input: ArrayView2<Complex<f64>>, direction: FftDirection) -> Array2<Complex<f64>> {
    let (rows, cols) = input.dim();
    if input.is_empty() {
        return input.to_owned();
    }

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(cols, direction);
    let col_fft = planner.plan_fft(rows, direction);
    trace!("fft2 {:?}: {} rows of {}, {} cols of {}", direction, rows, cols, cols, rows);

    let mut buffer: Vec<Complex<f64>> = input.iter().copied().collect();
    process_lines(&mut buffer, cols, &row_fft);

    let mut columns = transpose(&buffer, rows, cols);
    process_lines(&mut columns, rows, &col_fft);

    Array2::from_shape_fn((rows, cols), |(y, x)| columns[x * rows + y])
}

fn process_lines(buffer: &mut [Complex<f64>], len: usize, fft: &Arc<dyn Fft<f64>>) {
    buffer
        .par_chunks_mut(len)
        .for_each(|line| fft.process(line));
}

/// Row-major `rows x cols` to row-major `cols x rows`.
fn transpose(buffer: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = Vec::with_capacity(buffer.len());
    for x in 0..cols {
        for y in 0..rows {
            out.push(buffer[y * cols + x]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn checkerboard(rows: usize, cols: usize) -> Array2<u8> {
        Array2::from_shape_fn((rows, cols), |(y, x)| if (x + y) % 2 == 0 { 255 } else { 0 })
    }

    fn mean(image: &Array2<u8>) -> f64 {
        image.iter().map(|&v| v as f64).sum::<f64>() / image.len() as f64
    }

    #[test]
    fn test_fftfreq_ordering() {
        assert_eq!(fftfreq(4), vec![0.0, 0.25, -0.5, -0.25]);
        assert_eq!(fftfreq(5), vec![0.0, 0.2, 0.4, -0.4, -0.2]);
        assert_eq!(fftfreq(1), vec![0.0]);
    }

    #[test]
    fn test_shift_roundtrip_odd_dims() {
        let a = Array2::from_shape_fn((3, 5), |(y, x)| y * 5 + x);
        let shifted = fftshift(a.view());
        assert_eq!(shifted[[1, 2]], 0);
        assert_eq!(ifftshift(shifted.view()), a);
    }

    #[test]
    fn test_fftshift_even() {
        let a = array![[0, 1, 2, 3]];
        assert_eq!(fftshift(a.view()), array![[2, 3, 0, 1]]);
    }

    #[test]
    fn test_fft_roundtrip() {
        let a = Array2::from_shape_fn((6, 7), |(y, x)| Complex::new((y * 7 + x) as f64, 0.0));
        let back = ifft2(fft2(a.view()).view());
        for (orig, got) in a.iter().zip(back.iter()) {
            assert_relative_eq!(orig.re, got.re, epsilon = 1e-9);
            assert_relative_eq!(got.im, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fft_dc_term() {
        let a = Array2::from_elem((4, 4), Complex::new(2.0, 0.0));
        let spectrum = fft2(a.view());
        assert_relative_eq!(spectrum[[0, 0]].re, 32.0, epsilon = 1e-9);
        assert_relative_eq!(spectrum[[1, 2]].norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transfer_matches_formula() {
        let h = butterworth_transfer(4, 6, 40.0, 2);
        // u = fftfreq(4)[1] = 0.25, v = fftfreq(6)[3] = -0.5
        let d = ((0.25f64 - 2.0).powi(2) + (-0.5f64 - 3.0).powi(2)).sqrt();
        assert_relative_eq!(h[[1, 3]], 1.0 / (1.0 + (d / 40.0).powi(2)), epsilon = 1e-12);
    }

    #[test]
    fn test_shape_preserved() {
        let img = checkerboard(7, 10);
        let result = lowpass_butterworth(img.view(), 40.0, 2).unwrap();
        assert_eq!(result.dim(), (7, 10));
    }

    #[test]
    fn test_huge_cutoff_is_near_identity() {
        let img = Array2::from_shape_fn((8, 9), |(y, x)| ((y * 31 + x * 17) % 256) as u8);
        let result = lowpass_butterworth(img.view(), 1e9, 2).unwrap();
        // Gain is just below 1, so truncation may lose one level
        for (&orig, &got) in img.iter().zip(result.iter()) {
            assert!(got <= orig && orig - got <= 1, "{} -> {}", orig, got);
        }
    }

    #[test]
    fn test_output_is_truncated() {
        // A constant image only has a DC term, scaled by H at the shifted center
        let img = Array2::<u8>::from_elem((4, 4), 200);
        let h = butterworth_transfer(4, 4, 3.0, 1);
        let expected = 200.0 * h[[2, 2]];
        assert!(expected.fract() > 0.5);

        let result = lowpass_butterworth(img.view(), 3.0, 1).unwrap();
        assert!(result.iter().all(|&v| v == 91));
    }

    #[test]
    fn test_order_sharpens_cutoff() {
        // For a 16x16 grid every D lies in [10.6, 12.0].
        let img = checkerboard(16, 16);

        // Cutoff below D: higher order attenuates more.
        let low_order = lowpass_butterworth(img.view(), 10.0, 1).unwrap();
        let high_order = lowpass_butterworth(img.view(), 10.0, 8).unwrap();
        assert!(mean(&high_order) < mean(&low_order));

        // Cutoff above D: higher order passes more.
        let low_order = lowpass_butterworth(img.view(), 20.0, 1).unwrap();
        let high_order = lowpass_butterworth(img.view(), 20.0, 8).unwrap();
        assert!(mean(&high_order) > mean(&low_order));
        assert!(mean(&high_order) <= mean(&img));

        let h1 = butterworth_transfer(16, 16, 20.0, 1);
        let h8 = butterworth_transfer(16, 16, 20.0, 8);
        assert!(h8.iter().zip(h1.iter()).all(|(a, b)| a > b));
        assert!(h8.iter().all(|&h| h > 0.9));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let img = checkerboard(4, 4);
        assert!(matches!(
            lowpass_butterworth(img.view(), 0.0, 2),
            Err(FilterError::InvalidParameter { name: "d0", .. })
        ));
        assert!(matches!(
            lowpass_butterworth(img.view(), 40.0, 0),
            Err(FilterError::InvalidParameter { name: "n", .. })
        ));
        let empty = Array2::<u8>::zeros((0, 4));
        assert!(matches!(
            lowpass_butterworth(empty.view(), 40.0, 2),
            Err(FilterError::EmptyImage { .. })
        ));
    }
}
