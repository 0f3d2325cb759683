//! A traceable shape: its mask, its placement in the world and its rules.

use crate::config::{AutoDrawAnchors, ShapeConfig};
use crate::mask::ShapeMask;
use crate::raster::Pixel;
use crate::transform::ShapeTransform;
use kurbo::Point;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct TraceShape {
    config: ShapeConfig,
    mask: ShapeMask,
    transform: ShapeTransform,
}

impl TraceShape {
    /// Create a shape centred on the world origin at unit scale.
    pub fn new(config: ShapeConfig, mask: ShapeMask) -> Self {
        let transform = ShapeTransform::centered(mask.width(), mask.height());
        Self {
            config,
            mask,
            transform,
        }
    }

    /// Load the shape's image, resolving relative paths against `base_dir`.
    ///
    /// A missing or unreadable image yields an empty mask; the shape is kept
    /// so the sequence stays intact, but no stroke can start on it.
    pub fn load(config: ShapeConfig, base_dir: &Path) -> Self {
        let mask = match &config.image {
            Some(image) => ShapeMask::open(base_dir.join(image)),
            None => {
                log::warn!("Shape '{}' has no image, it cannot be traced", config.name);
                ShapeMask::default()
            }
        };
        if mask.is_empty() {
            log::warn!("Shape '{}' has an empty mask", config.name);
        }
        Self::new(config, mask)
    }

    pub fn with_transform(mut self, transform: ShapeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Move or rescale the shape, e.g. after a layout change.
    pub fn set_transform(&mut self, transform: ShapeTransform) {
        self.transform = transform;
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub fn mask(&self) -> &ShapeMask {
        &self.mask
    }

    pub fn transform(&self) -> &ShapeTransform {
        &self.transform
    }

    pub fn required_coverage(&self) -> f64 {
        self.config.required_coverage
    }

    pub fn auto_draw(&self) -> Option<&AutoDrawAnchors> {
        self.config.auto_draw.as_ref()
    }

    /// Whether any stroke can ever start on this shape.
    pub fn is_usable(&self) -> bool {
        !self.mask.is_empty()
    }

    pub fn world_to_texture(&self, world: Point) -> Pixel {
        self.transform.world_to_texture(world)
    }

    pub fn texture_to_world(&self, pixel: Pixel) -> Point {
        self.transform.texture_to_world(pixel)
    }
}
