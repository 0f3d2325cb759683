//! Coverage tracing for the active stroke.
//!
//! [`CoverageTracer`] consumes stroke start/move/end for one shape at a time,
//! paints a round brush restricted to the shape's mask along the stroke and
//! reports progress, completion and self-crossing through an [`EventSink`].

use crate::brush::Brush;
use crate::config::TracerConfig;
use crate::crossing::CrossingDetector;
use crate::events::{EventSink, StrokeSource, TraceEvent};
use crate::raster::{Pixel, line_points};
use crate::shape::TraceShape;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TracerState {
    /// No stroke in progress.
    #[default]
    Idle,
    /// A stroke is painting.
    Drawing,
    /// The stroke reached the required coverage. Further moves are ignored.
    Completed,
    /// The stroke crossed itself. Further moves are ignored.
    Burned,
}

/// What a single stroke extension did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No stroke is painting.
    Ignored,
    /// The target resolved to the last point.
    Unchanged,
    /// The pointer is too far from the shape. The stroke is kept.
    OffShape,
    /// The brush was dragged to the target.
    Painted { new_pixels: usize },
    /// The extension completed the shape.
    Completed,
    /// The extension would have crossed the stroke; nothing was painted.
    Burned,
}

#[derive(Debug, Clone, Default)]
struct Session {
    /// World positions of painted pixels, in paint order.
    path_points: Vec<Point>,
    /// Painted texture pixels. Always a subset of the mask.
    painted: HashSet<Pixel>,
    last_point: Option<Pixel>,
    coverage: f64,
}

/// Stateful engine for the active stroke.
#[derive(Debug, Clone)]
pub struct CoverageTracer {
    config: TracerConfig,
    detector: CrossingDetector,
    state: TracerState,
    source: StrokeSource,
    brush: Brush,
    session: Session,
}

impl CoverageTracer {
    pub fn new(config: TracerConfig) -> Self {
        Self {
            detector: CrossingDetector::from_config(&config),
            brush: Brush::new(config.brush_radius),
            config,
            state: TracerState::Idle,
            source: StrokeSource::Manual,
            session: Session::default(),
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub fn state(&self) -> TracerState {
        self.state
    }

    /// Who started the current stroke.
    pub fn source(&self) -> StrokeSource {
        self.source
    }

    /// Whether a stroke session exists, painting or finished.
    pub fn is_active(&self) -> bool {
        self.state != TracerState::Idle
    }

    pub fn is_drawing(&self) -> bool {
        self.state == TracerState::Drawing
    }

    /// Fraction of the shape's interior painted by the current stroke.
    pub fn coverage(&self) -> f64 {
        self.session.coverage
    }

    pub fn painted_pixels(&self) -> &HashSet<Pixel> {
        &self.session.painted
    }

    pub fn path_points(&self) -> &[Point] {
        &self.session.path_points
    }

    pub fn last_point(&self) -> Option<Pixel> {
        self.session.last_point
    }

    /// Drop the current stroke without notifying anyone.
    pub fn reset(&mut self) {
        self.state = TracerState::Idle;
        self.source = StrokeSource::Manual;
        self.brush = Brush::new(self.config.brush_radius);
        self.session = Session::default();
    }

    /// Begin a manual stroke at a world position.
    ///
    /// The previous stroke is always discarded. The stroke starts on the
    /// pixel under the pointer, or on the nearest interior pixel within the
    /// start snap radius. Returns `false` when neither exists; moves are then
    /// ignored until the next start.
    pub fn stroke_start(&mut self, shape: &TraceShape, world: Point, events: &mut dyn EventSink) -> bool {
        self.reset();
        events.emit(TraceEvent::PaintCleared);

        let pixel = shape.world_to_texture(world);
        let Some(start) = shape.mask().nearest(pixel, self.config.start_snap_radius) else {
            log::debug!("Stroke start at {:?} is off shape '{}'", pixel, shape.name());
            events.emit(TraceEvent::Progress(0.0));
            return false;
        };

        self.begin(shape, start, StrokeSource::Manual, events);
        true
    }

    /// Begin a stroke on an already-resolved interior pixel with a specific
    /// brush. Used by the auto-draw driver.
    pub fn begin_at(
        &mut self,
        shape: &TraceShape,
        start: Pixel,
        source: StrokeSource,
        brush: Brush,
        events: &mut dyn EventSink,
    ) {
        self.reset();
        events.emit(TraceEvent::PaintCleared);
        self.brush = brush;
        self.begin(shape, start, source, events);
    }

    fn begin(&mut self, shape: &TraceShape, start: Pixel, source: StrokeSource, events: &mut dyn EventSink) {
        self.state = TracerState::Drawing;
        self.source = source;
        self.session.last_point = Some(start);
        log::debug!("Stroke started on '{}' at {:?} ({:?})", shape.name(), start, source);

        self.paint(shape, &[start], events);
        events.emit(TraceEvent::Progress(self.session.coverage));
    }

    /// Continue the stroke towards a world position.
    pub fn stroke_move(&mut self, shape: &TraceShape, world: Point, events: &mut dyn EventSink) -> StepOutcome {
        if self.state != TracerState::Drawing {
            return StepOutcome::Ignored;
        }

        let pixel = shape.world_to_texture(world);
        match shape.mask().nearest(pixel, self.config.move_snap_radius) {
            Some(target) => self.extend_to(shape, target, events),
            None => {
                // Off the shape: hide the dots but keep the stroke so the
                // user can come back.
                events.emit(TraceEvent::PaintCleared);
                events.emit(TraceEvent::Progress(0.0));
                StepOutcome::OffShape
            }
        }
    }

    /// Drag the brush from the last point to `target` (texture space).
    ///
    /// This is the paint primitive shared by manual strokes and auto-draw:
    /// it checks for a self-crossing, paints, recomputes coverage and
    /// checks for completion.
    pub fn extend_to(&mut self, shape: &TraceShape, target: Pixel, events: &mut dyn EventSink) -> StepOutcome {
        if self.state != TracerState::Drawing {
            return StepOutcome::Ignored;
        }
        let Some(last) = self.session.last_point else {
            return StepOutcome::Ignored;
        };
        if target == last {
            return StepOutcome::Unchanged;
        }

        if self.detector.is_armed(self.session.path_points.len()) {
            let footprint = self.brush.footprint(shape.mask(), last, target);
            if self.detector.crosses(
                &footprint,
                &self.session.painted,
                &self.session.path_points,
                shape.transform(),
            ) {
                self.state = TracerState::Burned;
                log::info!("Stroke on '{}' crossed itself", shape.name());
                events.emit(TraceEvent::ShapeBurned {
                    shape: shape.name().to_string(),
                    source: self.source,
                });
                return StepOutcome::Burned;
            }
        }

        let new_pixels = self.paint(shape, &line_points(last, target), events);
        self.session.last_point = Some(target);
        events.emit(TraceEvent::Progress(self.session.coverage));

        if self.check_completion(shape, events) {
            StepOutcome::Completed
        } else {
            StepOutcome::Painted { new_pixels }
        }
    }

    /// End the stroke. Everything painted is discarded.
    pub fn stroke_end(&mut self, events: &mut dyn EventSink) {
        self.reset();
        events.emit(TraceEvent::PaintCleared);
        events.emit(TraceEvent::Progress(0.0));
    }

    /// Stamp the brush at every centre, recording newly painted pixels.
    fn paint(&mut self, shape: &TraceShape, centers: &[Pixel], events: &mut dyn EventSink) -> usize {
        let brush = self.brush;
        let mask = shape.mask();
        let mut dots = Vec::new();

        for &center in centers {
            for pixel in brush.stamp(mask, center) {
                if self.session.painted.insert(pixel) {
                    let world = shape.texture_to_world(pixel);
                    self.session.path_points.push(world);
                    dots.push(world);
                }
            }
        }

        if !mask.is_empty() {
            self.session.coverage = self.session.painted.len() as f64 / mask.len() as f64;
        }

        let painted = dots.len();
        if painted > 0 {
            events.emit(TraceEvent::Painted { points: dots });
        }
        painted
    }

    fn check_completion(&mut self, shape: &TraceShape, events: &mut dyn EventSink) -> bool {
        if self.state != TracerState::Drawing || self.session.coverage < shape.required_coverage() {
            return false;
        }

        self.state = TracerState::Completed;
        log::info!(
            "Shape '{}' completed at {:.1}% coverage",
            shape.name(),
            self.session.coverage * 100.0
        );
        events.emit(TraceEvent::ShapeCompleted {
            shape: shape.name().to_string(),
            source: self.source,
        });
        true
    }
}
