//! WebAssembly exports for the grain outline pipeline.
//!
//! Images cross the boundary as flat RGBA bytes (canvas `ImageData.data`)
//! plus width and height. Stateless filters return new byte vectors; the
//! [`GrainWorkbench`] class keeps per-image threshold and axis state between
//! events.
//!
//! Bad image indices and missing images are logged and ignored. Every other
//! error is thrown as a JS string.

use log::warn;
use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::config::PipelineConfig;
use crate::error::{GrainError, GrainResult};
use crate::filters::{apply_threshold, convolve, detect_edges, Kernel, OutlineMode};
use crate::selection::{fill_interior, sample_points};
use crate::session::Workbench;

fn to_js(err: GrainError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn recover<T: Default>(result: GrainResult<T>) -> Result<T, JsValue> {
    match result {
        Ok(v) => Ok(v),
        Err(e) if e.is_recoverable() => {
            warn!("ignored: {}", e);
            Ok(T::default())
        }
        Err(e) => Err(to_js(e)),
    }
}

fn buffer(data: &[u8], width: usize, height: usize) -> Result<PixelBuffer, JsValue> {
    PixelBuffer::from_raw(width, height, data.to_vec()).map_err(to_js)
}

// ============================================================================
// Stateless filters
// ============================================================================

/// Convolve with row-major `kernel` weights (odd-sided square).
#[wasm_bindgen]
pub fn convolve_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    kernel: &[f32],
) -> Result<Vec<u8>, JsValue> {
    let kernel = Kernel::new(kernel.to_vec()).map_err(to_js)?;
    Ok(convolve(&buffer(data, width, height)?, &kernel).into_raw())
}

/// Gaussian blur, alpha forced opaque.
#[wasm_bindgen]
pub fn gaussian_blur_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    sigma: f32,
) -> Result<Vec<u8>, JsValue> {
    let kernel = Kernel::gaussian(sigma).map_err(to_js)?;
    Ok(convolve(&buffer(data, width, height)?, &kernel).into_raw())
}

/// Average-luminance threshold. `opaque` selects the opaque white background.
#[wasm_bindgen]
pub fn threshold_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    threshold: f64,
    opaque: bool,
) -> Result<Vec<u8>, JsValue> {
    let mode = if opaque {
        OutlineMode::OpaqueFill
    } else {
        OutlineMode::TransparentBackground
    };
    let mut image = buffer(data, width, height)?;
    apply_threshold(&mut image, threshold, mode);
    Ok(image.into_raw())
}

/// 3x3 Laplacian edge filter.
#[wasm_bindgen]
pub fn detect_edges_rgba_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let mut image = buffer(data, width, height)?;
    detect_edges(&mut image);
    Ok(image.into_raw())
}

/// Filled pixels plus boundary points of an interior fill.
#[wasm_bindgen]
pub struct FillResult {
    pixels: Vec<u8>,
    points: Vec<u32>,
}

#[wasm_bindgen]
impl FillResult {
    /// Filled RGBA bytes.
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Boundary points flattened as `[x1, y1, x2, y2, ...]`.
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<u32> {
        self.points.clone()
    }
}

#[wasm_bindgen]
pub fn fill_interior_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    margin: usize,
) -> Result<FillResult, JsValue> {
    let mut image = buffer(data, width, height)?;
    let points = fill_interior(&mut image, margin)
        .into_iter()
        .flat_map(|p| [p.x as u32, p.y as u32])
        .collect();
    Ok(FillResult {
        pixels: image.into_raw(),
        points,
    })
}

/// Top-N dissimilarity points flattened as `[x, y, score, ...]`.
#[wasm_bindgen]
pub fn sample_points_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    aperture: usize,
    num_points: usize,
    budget: f64,
) -> Result<Vec<f64>, JsValue> {
    let image = buffer(data, width, height)?;
    let points = sample_points(&image, aperture, num_points, budget.max(0.0) as u64).map_err(to_js)?;
    Ok(points
        .into_iter()
        .flat_map(|p| [p.x as f64, p.y as f64, p.score as f64])
        .collect())
}

// ============================================================================
// Stateful workbench
// ============================================================================

#[wasm_bindgen]
pub struct GrainWorkbench {
    inner: Workbench,
}

#[wasm_bindgen]
impl GrainWorkbench {
    /// Create a workbench; `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<GrainWorkbench, JsValue> {
        let config = if config_json.trim().is_empty() {
            PipelineConfig::default()
        } else {
            PipelineConfig::from_json(config_json).map_err(to_js)?
        };
        Ok(Self {
            inner: Workbench::new(config),
        })
    }

    /// Add an image and return its index.
    pub fn add_image(&mut self, data: &[u8], width: usize, height: usize) -> Result<usize, JsValue> {
        let image = buffer(data, width, height)?;
        self.inner.add_image(image).map_err(to_js)
    }

    /// Reserve an index for an image that failed to load.
    pub fn add_missing(&mut self) -> usize {
        self.inner.add_missing()
    }

    pub fn increase_threshold(&mut self, index: usize) -> Result<(), JsValue> {
        recover(self.inner.increase_threshold(index).map(|_| ()))
    }

    pub fn decrease_threshold(&mut self, index: usize) -> Result<(), JsValue> {
        recover(self.inner.decrease_threshold(index).map(|_| ()))
    }

    /// Current threshold, or NaN for an unknown index.
    pub fn threshold(&self, index: usize) -> f64 {
        self.inner
            .session(index)
            .map(|s| s.threshold())
            .unwrap_or(f64::NAN)
    }

    /// Canvas-local click; returns true when it completed an axis line.
    pub fn click(&mut self, index: usize, x: f64, y: f64) -> Result<bool, JsValue> {
        recover(
            self.inner
                .click(index, x.round() as i64, y.round() as i64)
                .map(|event| matches!(event, crate::axis::AxisEvent::Completed(_))),
        )
    }

    /// Rendered RGBA bytes; empty for unknown or missing images.
    pub fn rendered(&self, index: usize) -> Vec<u8> {
        self.inner
            .rendered(index)
            .map(|img| img.clone().into_raw())
            .unwrap_or_default()
    }

    /// Run the point sampler and return `[x, y, score, ...]`.
    pub fn sample_points(&mut self, index: usize) -> Result<Vec<f64>, JsValue> {
        recover(self.inner.sample_points(index).map(|points| {
            points
                .iter()
                .flat_map(|p| [p.x as f64, p.y as f64, p.score as f64])
                .collect()
        }))
    }

    /// JSON array of `{x, y}` boundary points per image.
    pub fn export_boundaries(&self) -> Result<String, JsValue> {
        self.inner.export_boundaries().map_err(to_js)
    }

    pub fn export_report(&self) -> Result<String, JsValue> {
        self.inner.export_report().map_err(to_js)
    }
}
