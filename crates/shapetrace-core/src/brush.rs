//! Circular brush restricted to a shape mask.

use crate::mask::ShapeMask;
use crate::raster::{Pixel, line_points};
use std::collections::HashSet;

/// A round brush. Stamping it fills every interior pixel within `radius`
/// (Euclidean, inclusive) of the centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub radius: u32,
}

impl Brush {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Interior pixels covered by one stamp at `center`.
    pub fn stamp(self, mask: &ShapeMask, center: Pixel) -> impl Iterator<Item = Pixel> + '_ {
        mask.pixels_within(center, self.radius)
    }

    /// Every interior pixel the brush would cover when dragged from `from` to
    /// `to`, without painting anything.
    pub fn footprint(self, mask: &ShapeMask, from: Pixel, to: Pixel) -> HashSet<Pixel> {
        line_points(from, to)
            .into_iter()
            .flat_map(move |center| self.stamp(mask, center))
            .collect()
    }
}
