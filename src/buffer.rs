//! RGBA pixel buffer handed between the host and the filters.
//!
//! Pixels are stored as an `(height, width, 4)` u8 array, row-major with a
//! top-left origin, which is the layout of a canvas `ImageData` and of a
//! numpy RGBA image.

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::error::{GrainError, GrainResult};

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Array3<u8>,
}

impl PixelBuffer {
    /// Fully transparent black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: Array3::<u8>::zeros((height, width, CHANNELS)),
        }
    }

    /// Buffer with every pixel set to `rgba`.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let pixels = Array3::from_shape_fn((height, width, CHANNELS), |(_, _, c)| rgba[c]);
        Self { pixels }
    }

    /// Wrap flat RGBA bytes (length = width * height * 4).
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> GrainResult<Self> {
        let len = data.len();
        if width.checked_mul(height).and_then(|n| n.checked_mul(CHANNELS)) != Some(len) {
            return Err(GrainError::InvalidDimensions { width, height, len });
        }
        let pixels = Array3::from_shape_vec((height, width, CHANNELS), data)
            .map_err(|_| GrainError::InvalidDimensions { width, height, len })?;
        Ok(Self { pixels })
    }

    /// Wrap an existing `(height, width, 4)` array.
    pub fn from_array(pixels: Array3<u8>) -> GrainResult<Self> {
        let (height, width, channels) = pixels.dim();
        if channels != CHANNELS {
            return Err(GrainError::InvalidDimensions {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self { pixels })
    }

    /// Wrap an array the filters produced themselves (always 4 channels).
    pub(crate) fn wrap(pixels: Array3<u8>) -> Self {
        debug_assert_eq!(pixels.dim().2, CHANNELS);
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.pixels.view_mut()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }

    /// Flat RGBA bytes in row-major order.
    pub fn into_raw(self) -> Vec<u8> {
        if self.pixels.is_standard_layout() {
            self.pixels.into_raw_vec_and_offset().0
        } else {
            self.pixels.iter().copied().collect()
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
            self.pixels[[y, x, 3]],
        ]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        for (c, v) in rgba.into_iter().enumerate() {
            self.pixels[[y, x, c]] = v;
        }
    }

    /// Overwrite R, G and B, leaving alpha untouched.
    #[inline]
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        for (c, v) in rgb.into_iter().enumerate() {
            self.pixels[[y, x, c]] = v;
        }
    }

    #[inline]
    pub fn red(&self, x: usize, y: usize) -> u8 {
        self.pixels[[y, x, 0]]
    }
}
