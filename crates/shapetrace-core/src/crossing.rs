//! Self-crossing detection for a growing stroke.
//!
//! A brush dragged along a smooth curve always overlaps the pixels it painted
//! a moment ago, so overlap with the tail of the stroke is expected. Only
//! overlap with older parts of the stroke counts: the most recent
//! `safe_path_length` path points form a safe window, and a crossing is
//! reported once the extension would repaint `burn_threshold` painted pixels
//! outside that window.

use crate::config::TracerConfig;
use crate::raster::Pixel;
use crate::transform::ShapeTransform;
use kurbo::Point;
use std::collections::HashSet;

/// Rounded world coordinate used to match pixels against path points.
type WorldKey = (i64, i64);

fn world_key(point: Point) -> WorldKey {
    (point.x.round() as i64, point.y.round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingDetector {
    pub burn_threshold: usize,
    pub safe_path_length: usize,
}

impl CrossingDetector {
    pub fn new(burn_threshold: usize, safe_path_length: usize) -> Self {
        Self {
            burn_threshold,
            safe_path_length,
        }
    }

    pub fn from_config(config: &TracerConfig) -> Self {
        Self::new(config.burn_threshold, config.safe_path_length)
    }

    /// Crossing checks only run once the path is longer than the safe window.
    pub fn is_armed(&self, path_len: usize) -> bool {
        path_len > self.safe_path_length
    }

    /// Count footprint pixels that are already painted and lie outside the
    /// safe window. Counting stops at `burn_threshold`.
    pub fn overlap_count(
        &self,
        footprint: &HashSet<Pixel>,
        painted: &HashSet<Pixel>,
        path: &[Point],
        transform: &ShapeTransform,
    ) -> usize {
        let recent_start = path.len().saturating_sub(self.safe_path_length);
        let recent: HashSet<WorldKey> = path[recent_start..].iter().copied().map(world_key).collect();

        let limit = self.burn_threshold.max(1);
        let mut overlapping = 0;
        for pixel in footprint.iter().filter(|p| painted.contains(p)) {
            if !recent.contains(&world_key(transform.texture_to_world(*pixel))) {
                overlapping += 1;
                if overlapping >= limit {
                    break;
                }
            }
        }
        overlapping
    }

    /// Whether the extension described by `footprint` crosses the stroke.
    ///
    /// At least one old pixel must overlap, even with a zero threshold.
    pub fn crosses(
        &self,
        footprint: &HashSet<Pixel>,
        painted: &HashSet<Pixel>,
        path: &[Point],
        transform: &ShapeTransform,
    ) -> bool {
        self.overlap_count(footprint, painted, path, transform) >= self.burn_threshold.max(1)
    }
}
