//! Per-image state and the collection the host drives.
//!
//! Each image owns its threshold, axis marker and last pipeline outputs. A
//! [`Workbench`] holds the sessions in host order and re-renders exactly the
//! image an event was addressed to.

use log::debug;
use serde::Serialize;

use crate::axis::{draw_line, AxisEvent, AxisLine, AxisMarker, AxisPoint};
use crate::buffer::PixelBuffer;
use crate::config::PipelineConfig;
use crate::error::{GrainError, GrainResult};
use crate::filters::threshold::ThresholdState;
use crate::pipeline::run_pipeline;
use crate::selection::interior_fill::BoundaryPoint;
use crate::selection::point_sampler::{sample_points, ScoredPoint};

#[derive(Debug, Clone)]
pub struct ImageSession {
    source: Option<PixelBuffer>,
    threshold: ThresholdState,
    axis: AxisMarker,
    boundary: Vec<BoundaryPoint>,
    corners: Vec<ScoredPoint>,
    edges: Option<PixelBuffer>,
    rendered: Option<PixelBuffer>,
}

impl ImageSession {
    pub fn new(source: Option<PixelBuffer>, config: &PipelineConfig) -> Self {
        Self {
            source,
            threshold: ThresholdState::new(config.initial_threshold, config.threshold_step),
            axis: AxisMarker::new(),
            boundary: Vec::new(),
            corners: Vec::new(),
            edges: None,
            rendered: None,
        }
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.value()
    }

    pub fn axis(&self) -> &AxisMarker {
        &self.axis
    }

    pub fn boundary(&self) -> &[BoundaryPoint] {
        &self.boundary
    }

    pub fn corners(&self) -> &[ScoredPoint] {
        &self.corners
    }

    pub fn rendered(&self) -> Option<&PixelBuffer> {
        self.rendered.as_ref()
    }

    fn commit(&mut self, frame: Frame) -> &PixelBuffer {
        self.boundary = frame.boundary;
        self.corners = frame.corners;
        self.edges = Some(frame.edges);
        self.rendered.insert(frame.image)
    }
}

/// Outputs of one render, not yet stored in a session.
struct Frame {
    image: PixelBuffer,
    edges: PixelBuffer,
    boundary: Vec<BoundaryPoint>,
    corners: Vec<ScoredPoint>,
}

fn render_frame(
    session: &ImageSession,
    index: usize,
    threshold: f64,
    axis: Option<AxisLine>,
    config: &PipelineConfig,
) -> GrainResult<Frame> {
    let source = session
        .source
        .as_ref()
        .ok_or(GrainError::MissingSource { index })?;

    let out = run_pipeline(source, threshold, config)?;
    let mut image = out.image;
    if config.enable_axis {
        if let Some(line) = axis {
            draw_line(&mut image, &line, config.axis_color);
        }
    }

    debug!(
        "render image {}: {} boundary points, threshold {:.2}",
        index,
        out.boundary.len(),
        threshold
    );
    Ok(Frame {
        image,
        edges: out.edges,
        boundary: out.boundary,
        corners: out.corners,
    })
}

/// Per-image summary for [`Workbench::export_report`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    pub index: usize,
    pub threshold: f64,
    pub boundary: &'a [BoundaryPoint],
    pub corners: &'a [ScoredPoint],
    pub axis: Option<AxisLine>,
}

#[derive(Debug, Clone, Default)]
pub struct Workbench {
    config: PipelineConfig,
    sessions: Vec<ImageSession>,
}

impl Workbench {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            sessions: Vec::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, index: usize) -> GrainResult<&ImageSession> {
        let len = self.sessions.len();
        self.sessions
            .get(index)
            .ok_or(GrainError::InvalidIndex { index, len })
    }

    fn session_mut(&mut self, index: usize) -> GrainResult<&mut ImageSession> {
        let len = self.sessions.len();
        self.sessions
            .get_mut(index)
            .ok_or(GrainError::InvalidIndex { index, len })
    }

    /// Add an image and render it once. Returns its index.
    ///
    /// Nothing is added when the first render fails.
    pub fn add_image(&mut self, source: PixelBuffer) -> GrainResult<usize> {
        let index = self.sessions.len();
        let mut session = ImageSession::new(Some(source), &self.config);
        let frame = render_frame(
            &session,
            index,
            session.threshold.value(),
            session.axis.line(),
            &self.config,
        )?;
        session.commit(frame);
        self.sessions.push(session);
        Ok(index)
    }

    /// Reserve an index for an image the host could not supply.
    pub fn add_missing(&mut self) -> usize {
        self.sessions.push(ImageSession::new(None, &self.config));
        self.sessions.len() - 1
    }

    /// Run the pipeline for one image and cache its outputs.
    pub fn render(&mut self, index: usize) -> GrainResult<&PixelBuffer> {
        let session = self.session(index)?;
        let frame = render_frame(
            session,
            index,
            session.threshold.value(),
            session.axis.line(),
            &self.config,
        )?;
        Ok(self.session_mut(index)?.commit(frame))
    }

    pub fn increase_threshold(&mut self, index: usize) -> GrainResult<f64> {
        self.update_threshold(index, |t| t.increase())
    }

    pub fn decrease_threshold(&mut self, index: usize) -> GrainResult<f64> {
        self.update_threshold(index, |t| t.decrease())
    }

    pub fn set_threshold(&mut self, index: usize, value: f64) -> GrainResult<f64> {
        self.update_threshold(index, |t| {
            t.set(value);
            t.value()
        })
    }

    /// Re-render with a changed threshold; the change is kept only if the
    /// render succeeds.
    fn update_threshold<F>(&mut self, index: usize, change: F) -> GrainResult<f64>
    where
        F: FnOnce(&mut ThresholdState) -> f64,
    {
        let session = self.session(index)?;
        let mut threshold = session.threshold;
        let value = change(&mut threshold);
        let frame = render_frame(session, index, value, session.axis.line(), &self.config)?;

        let session = self.session_mut(index)?;
        session.threshold = threshold;
        session.commit(frame);
        Ok(value)
    }

    /// Feed a click to the image's axis marker; re-render when a line completes.
    ///
    /// A completing click whose render fails leaves the marker as it was.
    pub fn click(&mut self, index: usize, x: i64, y: i64) -> GrainResult<AxisEvent> {
        let session = self.session(index)?;
        let mut axis = session.axis.clone();
        let event = axis.click(AxisPoint::new(x, y));
        let frame = match event {
            AxisEvent::Completed(line) => {
                debug!("image {}: axis {:?}", index, line);
                Some(render_frame(
                    session,
                    index,
                    session.threshold.value(),
                    Some(line),
                    &self.config,
                )?)
            }
            AxisEvent::FirstPoint(_) => None,
        };

        let session = self.session_mut(index)?;
        session.axis = axis;
        if let Some(frame) = frame {
            session.commit(frame);
        }
        Ok(event)
    }

    /// Run the point sampler on the image's last edge stage.
    pub fn sample_points(&mut self, index: usize) -> GrainResult<&[ScoredPoint]> {
        if self.session(index)?.edges.is_none() {
            self.render(index)?;
        }
        let config = &self.config;
        let len = self.sessions.len();
        let session = self
            .sessions
            .get_mut(index)
            .ok_or(GrainError::InvalidIndex { index, len })?;
        let edges = session
            .edges
            .as_ref()
            .ok_or(GrainError::MissingSource { index })?;

        session.corners = sample_points(
            edges,
            config.corner_aperture,
            config.corner_count,
            config.sampling_budget,
        )?;
        Ok(&session.corners)
    }

    pub fn rendered(&self, index: usize) -> GrainResult<&PixelBuffer> {
        self.session(index)?
            .rendered()
            .ok_or(GrainError::MissingSource { index })
    }

    /// Boundary points of every image as a JSON array of `{x, y}` arrays.
    pub fn export_boundaries(&self) -> GrainResult<String> {
        let all: Vec<&[BoundaryPoint]> = self.sessions.iter().map(|s| s.boundary()).collect();
        Ok(serde_json::to_string(&all)?)
    }

    /// Threshold, points and axis of every image as JSON.
    pub fn export_report(&self) -> GrainResult<String> {
        let reports: Vec<SessionReport<'_>> = self
            .sessions
            .iter()
            .enumerate()
            .map(|(index, s)| SessionReport {
                index,
                threshold: s.threshold(),
                boundary: s.boundary(),
                corners: s.corners(),
                axis: s.axis().line(),
            })
            .collect();
        Ok(serde_json::to_string(&reports)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisPhase;

    fn bench() -> Workbench {
        Workbench::new(PipelineConfig::default())
    }

    #[test]
    fn test_invalid_index_is_reported() {
        let mut wb = bench();
        let err = wb.increase_threshold(2).unwrap_err();
        assert!(matches!(err, GrainError::InvalidIndex { index: 2, len: 0 }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_source_keeps_state() {
        let mut wb = bench();
        let idx = wb.add_missing();
        let err = wb.render(idx).unwrap_err();
        assert!(matches!(err, GrainError::MissingSource { index: 0 }));
        assert!(wb.rendered(idx).is_err());
    }

    #[test]
    fn test_threshold_steps_are_per_image() {
        let mut wb = bench();
        let a = wb.add_image(PixelBuffer::filled(30, 30, [255, 255, 255, 255])).unwrap();
        let b = wb.add_image(PixelBuffer::filled(30, 30, [255, 255, 255, 255])).unwrap();

        let v = wb.increase_threshold(a).unwrap();
        assert!((v - 0.55).abs() < 1e-12);
        assert_eq!(wb.session(b).unwrap().threshold(), 0.5);
    }

    #[test]
    fn test_axis_click_cycle_and_overlay() {
        let mut wb = bench();
        let idx = wb.add_image(PixelBuffer::filled(30, 30, [255, 255, 255, 255])).unwrap();

        assert!(matches!(wb.click(idx, 2, 15).unwrap(), AxisEvent::FirstPoint(_)));
        assert_eq!(wb.session(idx).unwrap().axis().phase(), AxisPhase::FirstSet);
        assert!(matches!(wb.click(idx, 27, 15).unwrap(), AxisEvent::Completed(_)));
        assert_eq!(wb.session(idx).unwrap().axis().phase(), AxisPhase::Unset);

        let img = wb.rendered(idx).unwrap();
        assert_eq!(img.pixel(15, 15), [0, 0, 255, 255]);
    }

    #[test]
    fn test_sample_points_on_demand() {
        let mut wb = bench();
        let mut img = PixelBuffer::filled(20, 20, [255, 255, 255, 255]);
        for y in 8..12 {
            for x in 8..12 {
                img.set_pixel(x, y, [0, 0, 0, 255]);
            }
        }
        let idx = wb.add_image(img).unwrap();
        assert!(wb.session(idx).unwrap().corners().is_empty());

        let corners = wb.sample_points(idx).unwrap();
        assert_eq!(corners.len(), 20);
    }

    fn failing_sampler() -> PipelineConfig {
        PipelineConfig {
            enable_corner_sampling: true,
            sampling_budget: 1000,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_failed_add_leaves_no_session() {
        let mut wb = Workbench::new(failing_sampler());
        let err = wb
            .add_image(PixelBuffer::filled(40, 40, [255, 255, 255, 255]))
            .unwrap_err();

        assert!(matches!(err, GrainError::SamplingBudgetExceeded { .. }));
        assert!(wb.is_empty());
        assert_eq!(wb.export_boundaries().unwrap(), "[]");
        assert_eq!(wb.add_missing(), 0);
    }

    #[test]
    fn test_failed_render_keeps_previous_state() {
        let mut wb = Workbench::new(failing_sampler());
        wb.sessions
            .push(ImageSession::new(Some(PixelBuffer::filled(40, 40, [255, 255, 255, 255])), &wb.config));

        assert!(wb.increase_threshold(0).is_err());
        assert!(wb.set_threshold(0, 0.9).is_err());
        assert_eq!(wb.session(0).unwrap().threshold(), 0.5);

        assert!(matches!(wb.click(0, 1, 1).unwrap(), AxisEvent::FirstPoint(_)));
        assert!(wb.click(0, 5, 5).is_err());
        let axis = wb.session(0).unwrap().axis();
        assert_eq!(axis.phase(), AxisPhase::FirstSet);
        assert!(axis.line().is_none());
        assert!(wb.rendered(0).is_err());
    }

    #[test]
    fn test_export_has_one_entry_per_image() {
        let mut wb = bench();
        wb.add_image(PixelBuffer::filled(30, 30, [255, 255, 255, 255])).unwrap();
        wb.add_missing();
        assert_eq!(wb.export_boundaries().unwrap(), "[[],[]]");

        let report: serde_json::Value = serde_json::from_str(&wb.export_report().unwrap()).unwrap();
        assert_eq!(report.as_array().map(|a| a.len()), Some(2));
        assert_eq!(report[0]["threshold"], 0.5);
        assert!(report[1]["axis"].is_null());
    }
}
