//! Pixel filters of the grain outline pipeline.
//!
//! All filters work on RGBA u8 [`PixelBuffer`](crate::buffer::PixelBuffer)s
//! of shape (H, W, 4):
//!
//! - **kernel**: square weight matrices (identity, Gaussian, Laplacian)
//! - **convolve**: zero-padded convolution, output alpha forced opaque
//! - **threshold**: average-luminance binarization with per-image state
//! - **edge**: 8-neighbour Laplacian on the thresholded image

pub mod convolve;
pub mod edge;
pub mod kernel;
pub mod threshold;

pub use convolve::{convolve, convolve_in_place};
pub use edge::detect_edges;
pub use kernel::Kernel;
pub use threshold::{apply_threshold, OutlineMode, ThresholdState};
