//! Grain outline extraction
//!
//! Finds the outline of a grain in a raster image and the boundary points of
//! its interior, with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Pipeline
//! 1. Gaussian blur (zero-padded convolution)
//! 2. Average-luminance threshold to black/white
//! 3. 3x3 Laplacian edge filter
//! 4. Scan-line interior fill, yielding left/right boundary points per row
//! 5. Optional top-N dissimilarity sampling for corner candidates
//!
//! A user-marked reference axis can be drawn over the result.
//!
//! ## Image Format
//! RGBA u8, shape (height, width, 4), row-major with a top-left origin.
//!
//! ## Logging
//! Stages report through the `log` facade at `debug` level; the host installs
//! the logger.

pub mod axis;
pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod selection;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use axis::{AxisLine, AxisMarker, AxisPhase, AxisPoint};
pub use buffer::PixelBuffer;
pub use config::PipelineConfig;
pub use error::{GrainError, GrainResult};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use session::{ImageSession, Workbench};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::config::PipelineConfig;
    use crate::error::GrainError;
    use crate::filters::{apply_threshold, convolve, detect_edges, Kernel, OutlineMode};
    use crate::pipeline::run_pipeline;
    use crate::selection::{fill_interior, sample_points as sample_points_impl};

    fn to_py(err: GrainError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn to_buffer(image: &PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        PixelBuffer::from_array(image.as_array().to_owned()).map_err(to_py)
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Convolve an RGBA image with a row-major odd-sided square kernel.
    #[pyfunction]
    pub fn convolve_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel: Vec<f32>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = Kernel::new(kernel).map_err(to_py)?;
        let result = convolve(&to_buffer(&image)?, &kernel);
        Ok(result.into_array().into_pyarray(py))
    }

    /// Gaussian blur with zero padding; alpha becomes opaque.
    #[pyfunction]
    #[pyo3(signature = (image, sigma=1.0))]
    pub fn gaussian_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = Kernel::gaussian(sigma).map_err(to_py)?;
        let result = convolve(&to_buffer(&image)?, &kernel);
        Ok(result.into_array().into_pyarray(py))
    }

    /// Binarize by average luminance.
    #[pyfunction]
    #[pyo3(signature = (image, threshold=0.5, opaque=false))]
    pub fn threshold_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f64,
        opaque: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mode = if opaque {
            OutlineMode::OpaqueFill
        } else {
            OutlineMode::TransparentBackground
        };
        let mut buffer = to_buffer(&image)?;
        apply_threshold(&mut buffer, threshold, mode);
        Ok(buffer.into_array().into_pyarray(py))
    }

    #[pyfunction]
    pub fn detect_edges_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mut buffer = to_buffer(&image)?;
        detect_edges(&mut buffer);
        Ok(buffer.into_array().into_pyarray(py))
    }

    // ========================================================================
    // Point extraction
    // ========================================================================

    /// Fill row interiors; returns the filled image and `(x, y)` boundary points.
    #[pyfunction]
    #[pyo3(signature = (image, margin=10))]
    pub fn fill_interior_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        margin: usize,
    ) -> PyResult<(Bound<'py, PyArray3<u8>>, Vec<(usize, usize)>)> {
        let mut buffer = to_buffer(&image)?;
        let points = fill_interior(&mut buffer, margin)
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect();
        Ok((buffer.into_array().into_pyarray(py), points))
    }

    /// Top-N `(x, y, score)` by neighbourhood dissimilarity.
    #[pyfunction]
    #[pyo3(signature = (image, aperture=2, num_points=20, budget=200_000_000))]
    pub fn sample_points<'py>(
        image: PyReadonlyArray3<'py, u8>,
        aperture: usize,
        num_points: usize,
        budget: u64,
    ) -> PyResult<Vec<(usize, usize, u64)>> {
        let buffer = to_buffer(&image)?;
        let points = sample_points_impl(&buffer, aperture, num_points, budget).map_err(to_py)?;
        Ok(points.into_iter().map(|p| (p.x, p.y, p.score)).collect())
    }

    /// Full pipeline; `config` is a JSON object (may be empty).
    #[pyfunction]
    #[pyo3(signature = (image, threshold=0.5, config="{}"))]
    pub fn outline_grain<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f64,
        config: &str,
    ) -> PyResult<(Bound<'py, PyArray3<u8>>, Vec<(usize, usize)>)> {
        let config = PipelineConfig::from_json(config).map_err(to_py)?;
        let out = run_pipeline(&to_buffer(&image)?, threshold, &config).map_err(to_py)?;
        let points = out.boundary.iter().map(|p| (p.x, p.y)).collect();
        Ok((out.image.into_array().into_pyarray(py), points))
    }

    /// Grain outline extension module
    #[pymodule]
    pub fn grain_outline(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(convolve_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
        m.add_function(wrap_pyfunction!(threshold_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(detect_edges_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(fill_interior_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(sample_points, m)?)?;
        m.add_function(wrap_pyfunction!(outline_grain, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::grain_outline;
