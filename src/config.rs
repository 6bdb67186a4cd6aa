//! Pipeline configuration.
//!
//! Every field has a default, so a host can pass `{}` or only the fields it
//! wants to change.

use serde::{Deserialize, Serialize};

use crate::error::{GrainError, GrainResult};
use crate::filters::kernel::MAX_BLUR_SIGMA;
use crate::filters::threshold::{OutlineMode, DEFAULT_THRESHOLD, THRESHOLD_STEP};
use crate::selection::interior_fill::BORDER_MARGIN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Threshold a new image session starts with.
    pub initial_threshold: f64,
    pub threshold_step: f64,
    pub outline_mode: OutlineMode,
    /// Gaussian sigma of the blur stage; 0 disables smoothing.
    pub blur_sigma: f32,
    pub border_margin: usize,
    /// Half-width `n` of the point sampler window.
    pub corner_aperture: usize,
    pub corner_count: usize,
    /// Upper bound on point sampler comparisons per image.
    pub sampling_budget: u64,
    pub axis_color: [u8; 4],
    pub enable_blur: bool,
    pub enable_edge: bool,
    pub enable_fill: bool,
    pub enable_corner_sampling: bool,
    pub enable_axis: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_threshold: DEFAULT_THRESHOLD,
            threshold_step: THRESHOLD_STEP,
            outline_mode: OutlineMode::default(),
            blur_sigma: 1.0,
            border_margin: BORDER_MARGIN,
            corner_aperture: 2,
            corner_count: 20,
            sampling_budget: 200_000_000,
            axis_color: [0, 0, 255, 255],
            enable_blur: true,
            enable_edge: true,
            enable_fill: true,
            enable_corner_sampling: false,
            enable_axis: true,
        }
    }
}

impl PipelineConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> GrainResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> GrainResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> GrainResult<()> {
        if !(0.0..=1.0).contains(&self.initial_threshold) {
            return Err(GrainError::InvalidConfig(format!(
                "initial_threshold {} outside [0, 1]",
                self.initial_threshold
            )));
        }
        if !(self.threshold_step > 0.0 && self.threshold_step <= 1.0) {
            return Err(GrainError::InvalidConfig(format!(
                "threshold_step {} must be in (0, 1]",
                self.threshold_step
            )));
        }
        if !(0.0..=MAX_BLUR_SIGMA).contains(&self.blur_sigma) {
            return Err(GrainError::InvalidConfig(format!(
                "blur_sigma {} outside [0, {}]",
                self.blur_sigma, MAX_BLUR_SIGMA
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.border_margin, 10);
        assert!(!config.enable_corner_sampling);
    }

    #[test]
    fn test_partial_json() {
        let config =
            PipelineConfig::from_json(r#"{"outline_mode":"opaque_fill","enable_blur":false}"#)
                .unwrap();
        assert_eq!(config.outline_mode, OutlineMode::OpaqueFill);
        assert!(!config.enable_blur);
        assert!(config.enable_edge);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{"initial_threshold":1.5}"#),
            Err(GrainError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"blur_sigma":-1.0}"#),
            Err(GrainError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"blur_sigma":1000000.0}"#),
            Err(GrainError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"threshold_step":0.0}"#),
            Err(GrainError::InvalidConfig(_))
        ));
        assert!(matches!(PipelineConfig::from_json("not json"), Err(GrainError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_keeps_mode() {
        let mut config = PipelineConfig::default();
        config.outline_mode = OutlineMode::OpaqueFill;
        let back = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
