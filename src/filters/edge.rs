//! Laplacian edge filter for thresholded images.
//!
//! Run on a black/white image, the 8-neighbour Laplacian saturates to 255 on
//! the white side of every black/white transition and to 0 everywhere else.

use super::convolve::convolve_in_place;
use super::kernel::Kernel;
use crate::buffer::PixelBuffer;

/// Replace the buffer with its Laplacian response (alpha forced to 255).
pub fn detect_edges(buffer: &mut PixelBuffer) {
    convolve_in_place(buffer, &Kernel::laplacian());
}
