use serde::{Deserialize, Serialize};

use crate::color::pack_unit_rgb;
use crate::math::Vector4;

/// A positioned, colored vertex. Color channels are unit floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Vector4,
    pub color: Vector4,
}

impl Vertex {
    pub const fn new(point: Vector4, color: Vector4) -> Self {
        Self { point, color }
    }

    /// Color converted to the frame buffer pixel format.
    pub fn packed_color(&self) -> u32 {
        pack_unit_rgb(self.color)
    }
}

const RED: Vector4 = Vector4::direction(1.0, 0.0, 0.0);
const GREEN: Vector4 = Vector4::direction(0.0, 1.0, 0.0);
const BLUE: Vector4 = Vector4::direction(0.0, 0.0, 1.0);
const MAGENTA: Vector4 = Vector4::direction(1.0, 0.0, 1.0);

/// Corners of the cube spanning -1..1 on every axis, looking down +z from the
/// camera. The first four form the face nearest the camera.
pub const CUBE_VERTICES: [Vertex; 8] = [
    Vertex::new(Vector4::point(-1.0, 1.0, -1.0), RED),
    Vertex::new(Vector4::point(1.0, 1.0, -1.0), GREEN),
    Vertex::new(Vector4::point(1.0, -1.0, -1.0), BLUE),
    Vertex::new(Vector4::point(-1.0, -1.0, -1.0), MAGENTA),
    Vertex::new(Vector4::point(-1.0, 1.0, 1.0), MAGENTA),
    Vertex::new(Vector4::point(1.0, 1.0, 1.0), RED),
    Vertex::new(Vector4::point(1.0, -1.0, 1.0), MAGENTA),
    Vertex::new(Vector4::point(-1.0, -1.0, 1.0), BLUE),
];
