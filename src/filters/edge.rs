//! Spatial high-pass (Laplacian) filter.
//!
//! Emphasizes edges by convolving with the 4-neighbour discrete Laplacian.
//! The output keeps the input dimensions. Samples beyond the border repeat
//! the nearest edge sample, so flat regions respond with zero right up to
//! the image border. Zero padding would instead give 255 at the corners and
//! 128 along the edges of a flat 128 image. Negative responses clip to black.

use log::debug;
use ndarray::{array, Array2, ArrayView2};

use super::core::{convolve2d, to_u8_image, Border, ConvolveMode};
use crate::error::Result;

/// 4-neighbour discrete Laplacian.
pub fn laplacian_kernel() -> Array2<f64> {
    array![[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]]
}

/// Apply the Laplacian high-pass filter.
///
/// # Arguments
/// * `image` - Grayscale image (rows, cols)
///
/// # Returns
/// Edge response with the same shape as the input
pub fn highpass_laplacian(image: ArrayView2<u8>) -> Result<Array2<u8>> {
    debug!("highpass_laplacian: {:?} image", image.dim());

    let kernel = laplacian_kernel();
    let response = convolve2d(image, kernel.view(), ConvolveMode::Same(Border::Replicate))?;

    Ok(to_u8_image(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn test_constant_image_is_zero() {
        let img = Array2::<u8>::from_elem((5, 5), 128);
        let result = highpass_laplacian(img.view()).unwrap();
        assert_eq!(result, Array2::<u8>::zeros((5, 5)));
    }

    #[test]
    fn test_zero_border_lights_up_flat_image() {
        let img = Array2::<u8>::from_elem((5, 5), 128);
        let response =
            convolve2d(img.view(), laplacian_kernel().view(), ConvolveMode::Same(Border::Zero))
                .unwrap();
        let result = to_u8_image(&response);
        assert_eq!(result[[0, 0]], 255);
        assert_eq!(result[[0, 2]], 128);
        assert_eq!(result[[2, 2]], 0);
    }

    #[test]
    fn test_border_pixel_sees_replicated_neighbours() {
        let mut img = Array2::<u8>::from_elem((3, 3), 10);
        img[[0, 0]] = 60;
        let result = highpass_laplacian(img.view()).unwrap();
        // Two replicated neighbours equal the pixel itself
        assert_eq!(result[[0, 0]], 100);
        assert_eq!(result[[1, 1]], 0);
    }

    #[test]
    fn test_detects_vertical_edge() {
        let img = Array2::from_shape_fn((5, 6), |(_, x)| if x < 3 { 0u8 } else { 200 });
        let result = highpass_laplacian(img.view()).unwrap();
        // Bright side of the edge responds, dark side clips to zero
        assert_eq!(result[[2, 3]], 200);
        assert_eq!(result[[2, 2]], 0);
        assert_eq!(result[[2, 4]], 0);
    }

    #[test]
    fn test_single_pixel_image() {
        let img = Array2::<u8>::from_elem((1, 1), 50);
        let result = highpass_laplacian(img.view()).unwrap();
        assert_eq!(result[[0, 0]], 0);
    }

    #[test]
    fn test_rejects_empty_image() {
        let img = Array2::<u8>::zeros((3, 0));
        assert_eq!(
            highpass_laplacian(img.view()).unwrap_err(),
            FilterError::EmptyImage { name: "image" }
        );
    }
}
