//! Integer pixel coordinates and line rasterization.

use serde::{Deserialize, Serialize};

/// An integer pixel coordinate in a shape's texture space (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another pixel.
    pub fn distance_sq(self, other: Pixel) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Euclidean distance to another pixel.
    pub fn distance(self, other: Pixel) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }
}

impl From<(i32, i32)> for Pixel {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Rasterize the segment `from -> to` with Bresenham's algorithm.
///
/// Both endpoints are included and a degenerate segment yields a single
/// pixel. The segment is always walked from its lexicographically smaller
/// endpoint, so reversing the arguments yields the same pixels in reverse
/// order.
pub fn line_points(from: Pixel, to: Pixel) -> Vec<Pixel> {
    if to < from {
        let mut points = bresenham(to, from);
        points.reverse();
        points
    } else {
        bresenham(from, to)
    }
}

fn bresenham(from: Pixel, to: Pixel) -> Vec<Pixel> {
    let dx = (i64::from(to.x) - i64::from(from.x)).abs();
    let dy = (i64::from(to.y) - i64::from(from.y)).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;

    let mut points = Vec::with_capacity(dx.max(dy) as usize + 1);
    let (mut x, mut y) = (from.x, from.y);
    loop {
        points.push(Pixel::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    points
}
