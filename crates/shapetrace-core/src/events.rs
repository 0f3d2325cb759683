//! Notifications raised to the presentation layer.
//!
//! The core never calls into rendering, sound or scene code. It reports what
//! happened through an [`EventSink`] handed to each operation, and the
//! presentation decides how to react.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Who produced the stroke an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeSource {
    /// A real pointer gesture.
    Manual,
    /// The idle auto-draw demonstration.
    AutoDraw,
}

/// Requested state of the auto-draw hand sprite, in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandIndicator {
    pub visible: bool,
    pub position: Point,
    pub scale: f64,
}

impl HandIndicator {
    /// Hidden at zero scale.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            position: Point::ZERO,
            scale: 0.0,
        }
    }
}

/// Events raised by the tracer, the auto-draw driver and the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// New dots were painted at these world positions.
    Painted { points: Vec<Point> },
    /// All painted dots should be removed from display.
    PaintCleared,
    /// Coverage of the active shape, in `[0, 1]`.
    Progress(f64),
    /// The stroke covered enough of the shape.
    ShapeCompleted { shape: String, source: StrokeSource },
    /// The stroke crossed itself.
    ShapeBurned { shape: String, source: StrokeSource },
    /// The last shape of the sequence was completed.
    AllShapesCompleted,
    /// A shape became the active one.
    ShapeActivated { index: usize, name: String },
    /// Show, move, scale or hide the auto-draw hand.
    Hand(HandIndicator),
}

/// Receiver for [`TraceEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: TraceEvent);
}

impl<F: FnMut(TraceEvent)> EventSink for F {
    fn emit(&mut self, event: TraceEvent) {
        self(event)
    }
}

/// Buffers events until the presentation polls them.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<TraceEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of completion events buffered.
    pub fn completed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::ShapeCompleted { .. }))
            .count()
    }

    /// Number of burn events buffered.
    pub fn burned_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::ShapeBurned { .. }))
            .count()
    }

    /// The most recent progress value, if any.
    pub fn last_progress(&self) -> Option<f64> {
        self.events.iter().rev().find_map(|e| match e {
            TraceEvent::Progress(p) => Some(*p),
            _ => None,
        })
    }
}

impl EventSink for EventQueue {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
