//! The playable board: a sequence of shapes, the stroke tracer, the idle
//! timer and the auto-draw demonstration, driven by pointer input and an
//! external clock.

use crate::autodraw::AutoDrawPlayer;
use crate::config::GameConfig;
use crate::events::{EventSink, StrokeSource, TraceEvent};
use crate::idle::IdleTimer;
use crate::input::PointerEvent;
use crate::shape::TraceShape;
use crate::tracer::CoverageTracer;
use crate::transform::{ShapeTransform, Viewport};
use kurbo::Size;
use std::path::Path;
use std::time::Duration;

/// Owns every service of a board and routes input between them.
#[derive(Debug, Clone)]
pub struct TraceBoard {
    shapes: Vec<TraceShape>,
    current: usize,
    end_shape: usize,
    finished: bool,
    tracer: CoverageTracer,
    auto_draw: AutoDrawPlayer,
    idle: IdleTimer,
    viewport: Viewport,
}

impl TraceBoard {
    /// Create a board over already-built shapes.
    pub fn new(config: GameConfig, shapes: Vec<TraceShape>, device: Size) -> Self {
        let end_shape = config.end_shape_index().min(shapes.len().saturating_sub(1));
        Self {
            shapes,
            current: 0,
            end_shape,
            finished: false,
            tracer: CoverageTracer::new(config.tracer),
            idle: IdleTimer::new(config.auto_draw.idle_timeout()),
            auto_draw: AutoDrawPlayer::new(config.auto_draw),
            viewport: Viewport::new(device, config.base_viewport),
        }
    }

    /// Create a board, decoding every shape image relative to `base_dir`.
    pub fn load(config: GameConfig, base_dir: &Path, device: Size) -> Self {
        let shapes: Vec<TraceShape> = config
            .shapes
            .iter()
            .cloned()
            .map(|shape| TraceShape::load(shape, base_dir))
            .collect();
        log::info!("Loaded board with {} shapes", shapes.len());
        Self::new(config, shapes, device)
    }

    pub fn shapes(&self) -> &[TraceShape] {
        &self.shapes
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The active shape, if the sequence is not finished.
    pub fn current_shape(&self) -> Option<&TraceShape> {
        if self.finished {
            return None;
        }
        self.shapes.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tracer(&self) -> &CoverageTracer {
        &self.tracer
    }

    pub fn auto_draw(&self) -> &AutoDrawPlayer {
        &self.auto_draw
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn idle_timer(&self) -> &IdleTimer {
        &self.idle
    }

    /// Whether the user is in the middle of a stroke.
    pub fn is_manual_stroke_active(&self) -> bool {
        self.tracer.is_active() && self.tracer.source() == StrokeSource::Manual
    }

    /// Activate the first shape and start the idle countdown.
    pub fn start(&mut self, now: Duration, events: &mut dyn EventSink) {
        self.current = 0;
        self.finished = self.shapes.is_empty();
        if self.finished {
            log::warn!("Board has no shapes");
            events.emit(TraceEvent::AllShapesCompleted);
            return;
        }
        self.activate(now, events);
    }

    /// Route one pointer event.
    ///
    /// Pressing cancels a running demonstration and starts a manual stroke.
    /// Any pointer activity restarts the idle countdown.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Duration, events: &mut dyn EventSink) {
        if self.finished {
            return;
        }
        self.idle.arm(now);
        let Some(shape) = self.shapes.get(self.current) else {
            return;
        };

        match event {
            PointerEvent::Down { position } => {
                if self.auto_draw.is_active() {
                    self.auto_draw.cancel(events);
                }
                self.tracer.stroke_start(shape, position, events);
            }
            PointerEvent::Move { position } => {
                if self.auto_draw.is_active() {
                    return;
                }
                self.tracer.stroke_move(shape, position, events);
            }
            PointerEvent::Up { .. } | PointerEvent::UpOutside { .. } => {
                if self.auto_draw.is_active() {
                    return;
                }
                if self.tracer.is_active() {
                    self.tracer.stroke_end(events);
                }
            }
        }
    }

    /// Advance time-driven behaviour: the demonstration and the idle timer.
    pub fn tick(&mut self, now: Duration, events: &mut dyn EventSink) {
        if self.finished {
            return;
        }

        if self.auto_draw.is_active() {
            if let Some(shape) = self.shapes.get(self.current) {
                self.auto_draw
                    .tick(now, shape, &mut self.tracer, &self.viewport, events);
            }
            return;
        }

        if self.idle.poll(now) {
            if self.is_manual_stroke_active() {
                self.idle.arm(now);
            } else {
                log::debug!("Idle timeout elapsed");
                self.start_auto_draw(now, events);
            }
        }
    }

    /// Start the demonstration on the active shape.
    ///
    /// Refused while a manual stroke is active or when the shape has no
    /// usable anchors.
    pub fn start_auto_draw(&mut self, now: Duration, events: &mut dyn EventSink) -> bool {
        if self.is_manual_stroke_active() {
            log::debug!("Auto-draw refused: manual stroke in progress");
            return false;
        }
        let Some(shape) = self.current_shape() else {
            return false;
        };
        if !shape.is_usable() {
            return false;
        }
        let shape = &self.shapes[self.current];
        self.auto_draw
            .start(now, shape, &mut self.tracer, &self.viewport, events)
    }

    /// Stop the demonstration and clear what it painted.
    pub fn stop_auto_draw(&mut self, now: Duration, events: &mut dyn EventSink) {
        if !self.auto_draw.is_active() {
            return;
        }
        self.auto_draw.cancel(events);
        if self.tracer.source() == StrokeSource::AutoDraw {
            self.tracer.stroke_end(events);
        }
        self.idle.arm(now);
    }

    /// Move on to the next shape, or finish the sequence after the last one.
    ///
    /// Returns `true` when a new shape became active.
    pub fn next_shape(&mut self, now: Duration, events: &mut dyn EventSink) -> bool {
        if self.finished {
            return false;
        }
        self.clear(events);

        if self.current + 1 < self.shapes.len() {
            self.current += 1;
            self.activate(now, events);
            true
        } else {
            self.finished = true;
            self.idle.disarm();
            log::info!("All {} shapes completed", self.shapes.len());
            events.emit(TraceEvent::AllShapesCompleted);
            false
        }
    }

    /// Jump straight to the configured end shape.
    pub fn go_to_end_shape(&mut self, now: Duration, events: &mut dyn EventSink) {
        if self.shapes.is_empty() {
            return;
        }
        self.clear(events);
        self.finished = false;
        self.current = self.end_shape;
        self.activate(now, events);
    }

    /// Update the device size used to place the hand indicator.
    pub fn resize(&mut self, device: Size) {
        self.viewport.resize(device);
    }

    /// Move or rescale one shape, e.g. after a layout change.
    pub fn set_shape_transform(&mut self, index: usize, transform: ShapeTransform) {
        if let Some(shape) = self.shapes.get_mut(index) {
            shape.set_transform(transform);
        }
    }

    fn clear(&mut self, events: &mut dyn EventSink) {
        if self.auto_draw.is_active() {
            self.auto_draw.cancel(events);
        }
        if self.tracer.is_active() {
            self.tracer.stroke_end(events);
        }
    }

    fn activate(&mut self, now: Duration, events: &mut dyn EventSink) {
        let shape = &self.shapes[self.current];
        log::info!("Shape {} '{}' is active", self.current, shape.name());
        events.emit(TraceEvent::ShapeActivated {
            index: self.current,
            name: shape.name().to_string(),
        });
        self.idle.arm(now);
    }
}
