//! Luminance threshold to binary black/white.
//!
//! Luminance here is the plain channel average `(R + G + B) / (3 * 255)`,
//! not a weighted BT.709 sum, so a flat 128-gray pixel sits just above 0.5.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Default per-image threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default increment for threshold adjustments.
pub const THRESHOLD_STEP: f64 = 0.05;

// Values this close to a bound snap onto it.
const SNAP_EPSILON: f64 = 1e-9;

/// Alpha written for pixels at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineMode {
    /// White with alpha 0: only the dark grain stays visible.
    #[default]
    TransparentBackground,
    /// Opaque white.
    OpaqueFill,
}

impl OutlineMode {
    fn background_alpha(self) -> u8 {
        match self {
            OutlineMode::TransparentBackground => 0,
            OutlineMode::OpaqueFill => 255,
        }
    }
}

/// Per-image threshold in [0, 1], adjusted in fixed steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdState {
    value: f64,
    step: f64,
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, THRESHOLD_STEP)
    }
}

impl ThresholdState {
    pub fn new(value: f64, step: f64) -> Self {
        Self {
            value: clamp_unit(value),
            step,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) {
        self.value = clamp_unit(value);
    }

    pub fn increase(&mut self) -> f64 {
        self.set(self.value + self.step);
        self.value
    }

    pub fn decrease(&mut self) -> f64 {
        self.set(self.value - self.step);
        self.value
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() || value <= SNAP_EPSILON {
        0.0
    } else if value >= 1.0 - SNAP_EPSILON {
        1.0
    } else {
        value
    }
}

/// Average-channel luminance of one pixel, 0.0-1.0.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (r as f64 + g as f64 + b as f64) / (3.0 * 255.0)
}

/// Binarize the buffer in place.
///
/// Below the threshold a pixel becomes opaque black; otherwise white with
/// the alpha chosen by `mode`.
///
/// # Arguments
/// * `buffer` - RGBA image, modified in place
/// * `threshold` - Luminance cut-off (0.0-1.0), compared with [`luminance`]
/// * `mode` - Alpha of the white pixels
pub fn apply_threshold(buffer: &mut PixelBuffer, threshold: f64, mode: OutlineMode) {
    let background = [255, 255, 255, mode.background_alpha()];
    let mut pixels = buffer.view_mut();
    let (height, width, _) = pixels.dim();

    for y in 0..height {
        for x in 0..width {
            let lum = luminance(pixels[[y, x, 0]], pixels[[y, x, 1]], pixels[[y, x, 2]]);
            let out = if lum < threshold { [0, 0, 0, 255] } else { background };
            for (c, v) in out.into_iter().enumerate() {
                pixels[[y, x, c]] = v;
            }
        }
    }
}
