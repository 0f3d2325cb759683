//! ShapeTrace Core Library
//!
//! Platform-agnostic shape tracing: pixel masks, brush coverage, self-crossing
//! detection and the idle auto-draw demonstration. Presentation is reached
//! only through [`EventSink`].

pub mod autodraw;
pub mod board;
pub mod brush;
pub mod config;
pub mod crossing;
pub mod error;
pub mod events;
pub mod idle;
pub mod input;
pub mod mask;
pub mod raster;
pub mod shape;
pub mod tracer;
pub mod transform;

pub use autodraw::{AutoDrawPlayer, PathPlanner};
pub use board::TraceBoard;
pub use brush::Brush;
pub use config::{AutoDrawAnchors, AutoDrawConfig, GameConfig, ShapeConfig, TracerConfig};
pub use crossing::CrossingDetector;
pub use error::{ConfigError, ConfigResult, MaskError, MaskResult};
pub use events::{EventQueue, EventSink, HandIndicator, StrokeSource, TraceEvent};
pub use idle::IdleTimer;
pub use input::PointerEvent;
pub use mask::ShapeMask;
pub use raster::{Pixel, line_points};
pub use shape::TraceShape;
pub use tracer::{CoverageTracer, StepOutcome, TracerState};
pub use transform::{BASE_VIEWPORT, ShapeTransform, Viewport};
