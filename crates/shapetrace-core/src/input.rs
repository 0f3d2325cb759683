//! Pointer input in world space.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// Released outside the board. Handled like `Up`.
    UpOutside { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position }
            | Self::Move { position }
            | Self::Up { position }
            | Self::UpOutside { position } => position,
        }
    }

    /// Whether this event ends the stroke.
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Up { .. } | Self::UpOutside { .. })
    }

    /// Expand a recorded stroke into press, moves and release.
    ///
    /// The release happens at the last point. An empty stroke yields no events.
    pub fn stroke(points: &[Point]) -> Vec<PointerEvent> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Vec::new();
        };

        let mut events = Vec::with_capacity(points.len() + 1);
        events.push(Self::Down { position: first });
        events.extend(points[1..].iter().map(|&position| Self::Move { position }));
        events.push(Self::Up { position: last });
        events
    }
}
