//! Pixel masks extracted from shape images.
//!
//! A [`ShapeMask`] records every pixel of a shape image whose alpha channel is
//! non-zero. Masks are built once when a shape is loaded and never change
//! afterwards, so they can be shared freely between the manual tracer and the
//! auto-draw planner.

use crate::error::{MaskError, MaskResult};
use crate::raster::Pixel;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// The interior pixels of a shape, stored as a dense bitmap indexed by
/// `y * width + x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    count: usize,
}

impl ShapeMask {
    /// An empty mask with the given dimensions.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
            count: 0,
        }
    }

    /// Build a mask from explicit pixel coordinates.
    ///
    /// Coordinates outside `width x height` are ignored and duplicates are
    /// counted once.
    pub fn from_pixels(width: u32, height: u32, pixels: impl IntoIterator<Item = Pixel>) -> Self {
        let mut mask = Self::empty(width, height);
        for pixel in pixels {
            if let Some(index) = mask.index(pixel) {
                if !mask.bits[index] {
                    mask.bits[index] = true;
                    mask.count += 1;
                }
            }
        }
        mask
    }

    /// Build a mask from a raw RGBA8 buffer.
    pub fn from_rgba_bytes(width: u32, height: u32, data: &[u8]) -> MaskResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(MaskError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        let bits: Vec<bool> = data.chunks_exact(4).map(|px| px[3] > 0).collect();
        let count = bits.iter().filter(|&&b| b).count();
        Ok(Self {
            width,
            height,
            bits,
            count,
        })
    }

    /// Build a mask from a decoded RGBA image.
    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mut mask = Self::empty(width, height);
        for (x, y, px) in image.enumerate_pixels() {
            if px.0[3] > 0 {
                mask.bits[y as usize * width as usize + x as usize] = true;
                mask.count += 1;
            }
        }
        mask
    }

    /// Build a mask from any decoded image.
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_rgba_image(&image.to_rgba8())
    }

    /// Decode an encoded image held in memory.
    pub fn try_from_memory(bytes: &[u8]) -> MaskResult<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&image))
    }

    /// Decode an image file.
    pub fn try_open(path: impl AsRef<Path>) -> MaskResult<Self> {
        let image = image::open(path.as_ref())?;
        Ok(Self::from_image(&image))
    }

    /// Decode an image file, degrading to an empty mask on failure.
    ///
    /// An empty mask answers every query with "not found", so a shape whose
    /// image cannot be read is simply untraceable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_open(path) {
            Ok(mask) => {
                log::info!(
                    "Extracted {} interior pixels from {:?} ({}x{})",
                    mask.len(),
                    path,
                    mask.width,
                    mask.height
                );
                mask
            }
            Err(e) => {
                log::error!("Failed to build mask from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interior pixels.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn index(&self, pixel: Pixel) -> Option<usize> {
        if pixel.x < 0 || pixel.y < 0 {
            return None;
        }
        let (x, y) = (pixel.x as u32, pixel.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Check whether a pixel belongs to the shape.
    pub fn contains(&self, pixel: Pixel) -> bool {
        self.index(pixel).is_some_and(|i| self.bits[i])
    }

    /// Iterate over every interior pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let width = self.width.max(1) as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| Pixel::new((i % width) as i32, (i / width) as i32))
    }

    /// Interior pixels within Euclidean distance `radius` of `center`.
    pub fn pixels_within(&self, center: Pixel, radius: u32) -> impl Iterator<Item = Pixel> + '_ {
        let r = radius as i32;
        let r_sq = i64::from(radius) * i64::from(radius);
        (center.y - r..=center.y + r)
            .flat_map(move |y| (center.x - r..=center.x + r).map(move |x| Pixel::new(x, y)))
            .filter(move |p| p.distance_sq(center) <= r_sq && self.contains(*p))
    }

    /// Find the interior pixel closest to `pixel` within `max_distance`.
    ///
    /// Returns `pixel` itself when it is interior. Among equidistant
    /// candidates any one may be returned.
    pub fn nearest(&self, pixel: Pixel, max_distance: f64) -> Option<Pixel> {
        if self.contains(pixel) {
            return Some(pixel);
        }
        if self.is_empty() || max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }

        let max_sq = max_distance * max_distance;
        // A radius wider than the mask always scans every interior pixel.
        let extent = f64::from(self.width.max(self.height));
        let window = if max_distance <= extent {
            let r = max_distance.floor() as i64;
            let side = 2 * r + 1;
            (side.saturating_mul(side) < self.count as i64).then_some(r)
        } else {
            None
        };

        let candidates: Box<dyn Iterator<Item = Pixel> + '_> = match window {
            Some(r) => {
                let r = r as i32;
                Box::new(
                    (pixel.y.saturating_sub(r)..=pixel.y.saturating_add(r))
                        .flat_map(move |y| {
                            (pixel.x.saturating_sub(r)..=pixel.x.saturating_add(r))
                                .map(move |x| Pixel::new(x, y))
                        })
                        .filter(move |p| self.contains(*p)),
                )
            }
            None => Box::new(self.pixels()),
        };

        candidates
            .map(|p| (p, p.distance_sq(pixel)))
            .filter(|&(_, d)| d as f64 <= max_sq)
            .min_by_key(|&(_, d)| d)
            .map(|(p, _)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn block_mask() -> ShapeMask {
        ShapeMask::from_pixels(
            3,
            2,
            [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)].map(Pixel::from),
        )
    }

    #[test]
    fn test_from_pixels_counts_unique() {
        let mask = ShapeMask::from_pixels(4, 4, [(1, 1), (1, 1), (2, 3), (9, 9), (-1, 0)].map(Pixel::from));
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(Pixel::new(1, 1)));
        assert!(mask.contains(Pixel::new(2, 3)));
        assert!(!mask.contains(Pixel::new(9, 9)));
    }

    #[test]
    fn test_contains_out_of_bounds() {
        let mask = block_mask();
        assert!(!mask.contains(Pixel::new(-1, 0)));
        assert!(!mask.contains(Pixel::new(3, 0)));
        assert!(!mask.contains(Pixel::new(0, 2)));
    }

    #[test]
    fn test_from_rgba_image_uses_alpha() {
        let mut image = RgbaImage::new(3, 3);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(2, 1, Rgba([0, 0, 0, 1]));
        image.put_pixel(1, 2, Rgba([255, 255, 255, 0]));

        let mask = ShapeMask::from_rgba_image(&image);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 3);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(Pixel::new(0, 0)));
        assert!(mask.contains(Pixel::new(2, 1)));
        assert!(!mask.contains(Pixel::new(1, 2)));
    }

    #[test]
    fn test_from_rgba_bytes() {
        let data = [0, 0, 0, 0, 10, 10, 10, 200];
        let mask = ShapeMask::from_rgba_bytes(2, 1, &data).unwrap();
        assert_eq!(mask.len(), 1);
        assert!(mask.contains(Pixel::new(1, 0)));
    }

    #[test]
    fn test_from_rgba_bytes_wrong_size() {
        let result = ShapeMask::from_rgba_bytes(2, 2, &[0; 7]);
        assert!(matches!(result, Err(MaskError::BufferSize { expected: 16, actual: 7, .. })));
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mask = ShapeMask::open(dir.path().join("missing.png"));
        assert!(mask.is_empty());
        assert_eq!(mask.nearest(Pixel::new(0, 0), f64::INFINITY), None);
    }

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shape.png");
        let mut image = RgbaImage::new(4, 4);
        for x in 0..4 {
            image.put_pixel(x, 2, Rgba([0, 0, 0, 255]));
        }
        image.save(&path).unwrap();

        let mask = ShapeMask::open(&path);
        assert_eq!(mask.len(), 4);
        assert!(mask.contains(Pixel::new(3, 2)));
        assert!(!mask.contains(Pixel::new(3, 1)));
    }

    #[test]
    fn test_try_from_memory_rejects_garbage() {
        assert!(ShapeMask::try_from_memory(b"not an image").is_err());
    }

    #[test]
    fn test_nearest_exact() {
        let mask = block_mask();
        assert_eq!(mask.nearest(Pixel::new(1, 1), 0.0), Some(Pixel::new(1, 1)));
    }

    #[test]
    fn test_nearest_out_of_range() {
        let mask = ShapeMask::from_pixels(10, 10, [Pixel::new(0, 0)]);
        assert_eq!(mask.nearest(Pixel::new(5, 5), 1.0), None);
        assert_eq!(mask.nearest(Pixel::new(5, 5), 7.1), Some(Pixel::new(0, 0)));
    }

    #[test]
    fn test_nearest_picks_minimal_distance() {
        let mask = ShapeMask::from_pixels(20, 20, [(0, 0), (10, 10), (12, 10)].map(Pixel::from));
        assert_eq!(mask.nearest(Pixel::new(9, 9), 40.0), Some(Pixel::new(10, 10)));
    }

    #[test]
    fn test_nearest_tie_returns_a_minimal_point() {
        let mask = ShapeMask::from_pixels(10, 10, [(2, 5), (8, 5)].map(Pixel::from));
        let found = mask.nearest(Pixel::new(5, 5), 10.0).unwrap();
        assert_eq!(found.distance_sq(Pixel::new(5, 5)), 9);
    }

    #[test]
    fn test_nearest_windowed_matches_full_scan() {
        // Dense mask so the windowed search path is taken.
        let pixels: Vec<Pixel> = (0..50)
            .flat_map(|y| (0..50).map(move |x| Pixel::new(x, y)))
            .filter(|p| p.x >= 30)
            .collect();
        let mask = ShapeMask::from_pixels(50, 50, pixels);
        let found = mask.nearest(Pixel::new(27, 10), 5.0).unwrap();
        assert_eq!(found, Pixel::new(30, 10));
        assert_eq!(mask.nearest(Pixel::new(20, 10), 5.0), None);
        assert_eq!(mask.nearest(Pixel::new(20, 10), f64::INFINITY), Some(Pixel::new(30, 10)));
    }

    #[test]
    fn test_nearest_huge_radius() {
        let mask = ShapeMask::from_pixels(10, 10, [Pixel::new(0, 0)]);
        assert_eq!(mask.nearest(Pixel::new(5, 5), 1e300), Some(Pixel::new(0, 0)));
        assert_eq!(mask.nearest(Pixel::new(5, 5), f64::MAX), Some(Pixel::new(0, 0)));

        let dense = ShapeMask::from_pixels(4, 4, (0..4).flat_map(|y| (0..4).map(move |x| Pixel::new(x, y))));
        assert_eq!(dense.nearest(Pixel::new(-100, 2), f64::MAX), Some(Pixel::new(0, 2)));
    }

    #[test]
    fn test_nearest_rejects_invalid_radius() {
        let mask = block_mask();
        assert_eq!(mask.nearest(Pixel::new(5, 0), -1.0), None);
        assert_eq!(mask.nearest(Pixel::new(5, 0), f64::NAN), None);
    }

    #[test]
    fn test_nearest_outside_bounds() {
        let mask = block_mask();
        assert_eq!(mask.nearest(Pixel::new(-2, 0), 3.0), Some(Pixel::new(0, 0)));
    }

    #[test]
    fn test_pixels_within_radius() {
        let pixels: Vec<Pixel> = (0..9).flat_map(|y| (0..9).map(move |x| Pixel::new(x, y))).collect();
        let mask = ShapeMask::from_pixels(9, 9, pixels);

        assert_eq!(mask.pixels_within(Pixel::new(4, 4), 0).count(), 1);
        // Radius 1 disc: center plus four neighbours.
        assert_eq!(mask.pixels_within(Pixel::new(4, 4), 1).count(), 5);
        // Clipped at the corner.
        assert_eq!(mask.pixels_within(Pixel::new(0, 0), 1).count(), 3);
    }

    #[test]
    fn test_pixels_iterates_row_major() {
        let mask = block_mask();
        let pixels: Vec<Pixel> = mask.pixels().collect();
        assert_eq!(pixels.len(), 6);
        assert_eq!(pixels[0], Pixel::new(0, 0));
        assert_eq!(pixels[3], Pixel::new(0, 1));
    }
}
