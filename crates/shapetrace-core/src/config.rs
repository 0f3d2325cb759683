//! Configuration records for boards, shapes, the tracer and auto-draw.
//!
//! Every record deserializes from JSON and fills missing fields with the
//! defaults below.

use crate::error::{ConfigError, ConfigResult};
use crate::transform::BASE_VIEWPORT;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Knobs for manual tracing and self-crossing detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Brush radius in texture pixels.
    pub brush_radius: u32,
    /// Search radius used to snap the stroke start onto the shape.
    pub start_snap_radius: f64,
    /// Search radius used to snap pointer moves onto the shape.
    pub move_snap_radius: f64,
    /// Overlapping old pixels needed to report a self-crossing.
    pub burn_threshold: usize,
    /// Trailing path points exempt from crossing detection.
    pub safe_path_length: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            brush_radius: 20,
            start_snap_radius: 10.0,
            move_snap_radius: 40.0,
            burn_threshold: 1500,
            safe_path_length: 1000,
        }
    }
}

/// Knobs for the idle auto-draw demonstration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDrawConfig {
    /// Brush radius used while replaying.
    pub brush_radius: u32,
    /// Search radius used to snap the configured anchors onto the shape.
    pub anchor_snap_radius: f64,
    /// Every `sample_step`-th point of the anchor line is kept.
    pub sample_step: usize,
    /// Search radius used to snap sampled points onto the shape.
    pub snap_tolerance: f64,
    /// Minimum gap between points before a jittered midpoint is inserted.
    pub smooth_min_gap: f64,
    /// Maximum jitter applied to inserted midpoints, per axis.
    pub jitter: f64,
    pub duration_ms: u64,
    /// Pause between the end of one pass and the next.
    pub restart_delay_ms: u64,
    /// Duration of the hand indicator's scale-in and scale-out.
    pub hand_scale_ms: u64,
    /// Inactivity before the demonstration starts on its own.
    pub idle_timeout_ms: u64,
    /// Fixed seed for reproducible playback. Random when absent.
    pub seed: Option<u64>,
}

impl Default for AutoDrawConfig {
    fn default() -> Self {
        Self {
            brush_radius: 20,
            anchor_snap_radius: 40.0,
            sample_step: 5,
            snap_tolerance: 30.0,
            smooth_min_gap: 20.0,
            jitter: 3.0,
            duration_ms: 1000,
            restart_delay_ms: 5000,
            hand_scale_ms: 500,
            idle_timeout_ms: 5000,
            seed: None,
        }
    }
}

impl AutoDrawConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn hand_scale_duration(&self) -> Duration {
        Duration::from_millis(self.hand_scale_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Where the auto-draw demonstration starts and ends for one shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoDrawAnchors {
    /// Start anchor in texture space, snapped onto the mask before use.
    pub texture_start: Point,
    /// End anchor in texture space.
    pub texture_end: Point,
    /// Hand indicator start in base-resolution screen space.
    pub hand_start: Point,
    /// Hand indicator end in base-resolution screen space.
    pub hand_end: Point,
}

/// Static description of one traceable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub name: String,
    /// Image file, resolved relative to the configuration file.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Fraction of interior pixels that must be painted.
    pub required_coverage: f64,
    #[serde(default)]
    pub auto_draw: Option<AutoDrawAnchors>,
}

impl ShapeConfig {
    pub fn new(name: impl Into<String>, required_coverage: f64) -> Self {
        Self {
            name: name.into(),
            image: None,
            required_coverage,
            auto_draw: None,
        }
    }

    pub fn with_auto_draw(mut self, anchors: AutoDrawAnchors) -> Self {
        self.auto_draw = Some(anchors);
        self
    }
}

/// Complete board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tracer: TracerConfig,
    pub auto_draw: AutoDrawConfig,
    pub shapes: Vec<ShapeConfig>,
    /// Resolution hand anchors were authored against.
    pub base_viewport: Size,
    /// Index of the shape `go_to_end_shape` jumps to. Defaults to the last.
    pub end_shape: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tracer: TracerConfig::default(),
            auto_draw: AutoDrawConfig::default(),
            shapes: Vec::new(),
            base_viewport: BASE_VIEWPORT,
            end_shape: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shapes.is_empty() {
            return Err(ConfigError::NoShapes);
        }
        for shape in &self.shapes {
            if !(0.0..=1.0).contains(&shape.required_coverage) {
                return Err(ConfigError::InvalidCoverage {
                    name: shape.name.clone(),
                    value: shape.required_coverage,
                });
            }
        }
        let radii = [
            ("tracer.start_snap_radius", self.tracer.start_snap_radius),
            ("tracer.move_snap_radius", self.tracer.move_snap_radius),
            ("auto_draw.anchor_snap_radius", self.auto_draw.anchor_snap_radius),
            ("auto_draw.snap_tolerance", self.auto_draw.snap_tolerance),
        ];
        for (name, value) in radii {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidRadius { name, value });
            }
        }
        if let Some(end) = self.end_shape {
            if end >= self.shapes.len() {
                return Err(ConfigError::InvalidEndShape(end));
            }
        }
        if !(self.base_viewport.width > 0.0 && self.base_viewport.height > 0.0) {
            return Err(ConfigError::InvalidViewport {
                width: self.base_viewport.width,
                height: self.base_viewport.height,
            });
        }
        Ok(())
    }

    /// Index `go_to_end_shape` jumps to.
    pub fn end_shape_index(&self) -> usize {
        self.end_shape.unwrap_or(self.shapes.len().saturating_sub(1))
    }
}
