//! Conversions between world space, shape texture space and device space.

use crate::raster::Pixel;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Slack added before flooring so that `texture_to_world` followed by
/// `world_to_texture` lands back on the same pixel despite rounding error.
const FLOOR_EPSILON: f64 = 1e-9;

/// Placement of a shape in world space.
///
/// The shape's texture is centred on `position` (anchor 0.5, 0.5) and scaled
/// by `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeTransform {
    /// World position of the texture centre.
    pub position: Point,
    /// Per-axis scale from texture units to world units.
    pub scale: Vec2,
    /// Texture dimensions in pixels.
    pub texture_size: Size,
}

impl ShapeTransform {
    /// A transform with unit scale centred on the world origin.
    pub fn centered(texture_width: u32, texture_height: u32) -> Self {
        Self {
            position: Point::ZERO,
            scale: Vec2::new(1.0, 1.0),
            texture_size: Size::new(f64::from(texture_width), f64::from(texture_height)),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Affine transform from texture coordinates to world coordinates, for
    /// renderers that want to draw the mask directly.
    pub fn to_world_affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(Vec2::new(
                -self.texture_size.width / 2.0,
                -self.texture_size.height / 2.0,
            ))
    }

    /// Convert a world point to the texture pixel underneath it.
    ///
    /// Computes `floor(local / scale + size / 2)` with `FLOOR_EPSILON` added
    /// before flooring, so a point within `1e-9` below a pixel boundary maps
    /// to the pixel past that boundary.
    pub fn world_to_texture(&self, world: Point) -> Pixel {
        let local = world - self.position;
        let x = local.x / self.scale.x + self.texture_size.width / 2.0;
        let y = local.y / self.scale.y + self.texture_size.height / 2.0;
        Pixel::new(
            (x + FLOOR_EPSILON).floor() as i32,
            (y + FLOOR_EPSILON).floor() as i32,
        )
    }

    /// Convert a texture pixel to the world position it is drawn at.
    pub fn texture_to_world(&self, pixel: Pixel) -> Point {
        Point::new(
            self.position.x + (f64::from(pixel.x) - self.texture_size.width / 2.0) * self.scale.x,
            self.position.y + (f64::from(pixel.y) - self.texture_size.height / 2.0) * self.scale.y,
        )
    }
}

/// Reference resolution that stored screen positions were authored against.
pub const BASE_VIEWPORT: Size = Size::new(750.0, 1334.0);

/// Maps positions authored at a base resolution onto the current device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current device size.
    pub device: Size,
    /// Resolution stored positions were authored against.
    pub base: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            device: BASE_VIEWPORT,
            base: BASE_VIEWPORT,
        }
    }
}

impl Viewport {
    pub fn new(device: Size, base: Size) -> Self {
        Self { device, base }
    }

    /// Update the device size after a resize.
    pub fn resize(&mut self, device: Size) {
        self.device = device;
    }

    /// Scale a base-resolution position to device coordinates.
    pub fn to_device(&self, stored: Point) -> Point {
        Point::new(
            stored.x / self.base.width * self.device.width,
            stored.y / self.base.height * self.device.height,
        )
    }
}
