//! The grain outline pipeline: blur, threshold, edges, interior fill and
//! optional corner sampling.
//!
//! A run is a pure function of the source pixels, the threshold and the
//! configuration. Stages other than the threshold can be switched off.

use log::debug;

use crate::buffer::PixelBuffer;
use crate::config::PipelineConfig;
use crate::error::GrainResult;
use crate::filters::convolve::convolve;
use crate::filters::edge::detect_edges;
use crate::filters::kernel::Kernel;
use crate::filters::threshold::apply_threshold;
use crate::selection::interior_fill::{fill_interior, BoundaryPoint};
use crate::selection::point_sampler::{sample_points, ScoredPoint};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final buffer (filled outline, no axis overlay).
    pub image: PixelBuffer,
    /// Buffer as it was after the edge stage, before the fill repainted it.
    pub edges: PixelBuffer,
    pub boundary: Vec<BoundaryPoint>,
    /// Empty unless corner sampling is enabled.
    pub corners: Vec<ScoredPoint>,
}

pub fn run_pipeline(
    source: &PixelBuffer,
    threshold: f64,
    config: &PipelineConfig,
) -> GrainResult<PipelineOutput> {
    let (width, height) = (source.width(), source.height());
    debug!("pipeline: {}x{} threshold={:.2}", width, height, threshold);

    let mut image = if config.enable_blur {
        debug!("pipeline: blur sigma={}", config.blur_sigma);
        convolve(source, &Kernel::gaussian(config.blur_sigma)?)
    } else {
        source.clone()
    };

    apply_threshold(&mut image, threshold, config.outline_mode);

    if config.enable_edge {
        detect_edges(&mut image);
    }
    let edges = image.clone();

    let corners = if config.enable_corner_sampling {
        let corners = sample_points(
            &edges,
            config.corner_aperture,
            config.corner_count,
            config.sampling_budget,
        )?;
        debug!("pipeline: sampled {} corner candidates", corners.len());
        corners
    } else {
        Vec::new()
    };

    let boundary = if config.enable_fill {
        let points = fill_interior(&mut image, config.border_margin);
        debug!("pipeline: {} boundary points on {} rows", points.len(), points.len() / 2);
        points
    } else {
        Vec::new()
    };

    Ok(PipelineOutput {
        image,
        edges,
        boundary,
        corners,
    })
}
