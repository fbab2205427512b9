//! Color and depth planes for one frame.

use log::debug;

use crate::color::DEFAULT_BACKGROUND;
use crate::error::{RenderError, Result};

/// Depth written by [`FrameBuffer::clear`]; the far plane.
pub const CLEAR_DEPTH: f32 = 1.0;

/// Parallel pixel and depth planes of `width * height` entries each, indexed
/// `row * width + col` with row 0 at the top.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    background: u32,
    planes: Option<Planes>,
}

#[derive(Debug, Clone)]
struct Planes {
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

/// Borrowed view of the pixel plane handed to a presenter.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u32],
}

impl FrameView<'_> {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}

impl FrameBuffer {
    /// An unallocated buffer that clears to `background`.
    pub fn new(background: u32) -> Self {
        Self {
            width: 0,
            height: 0,
            background,
            planes: None,
        }
    }

    /// Allocates both planes and leaves them cleared. Any previous planes are
    /// replaced; if either plane cannot be reserved they are kept as they were.
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<()> {
        let len = plane_len(width, height)?;
        let pixels = filled_plane(len, self.background, width, height)?;
        let depth = filled_plane(len, CLEAR_DEPTH, width, height)?;
        self.planes = Some(Planes { pixels, depth });
        self.width = width;
        self.height = height;
        debug!("allocated {width}x{height} frame buffer ({len} pixels)");
        Ok(())
    }

    /// Resets every pixel to the background and every depth to the far plane.
    pub fn clear(&mut self) -> Result<()> {
        let background = self.background;
        let planes = self
            .planes
            .as_mut()
            .ok_or_else(|| RenderError::invalid_state("clear the frame buffer", "unallocated"))?;
        planes.pixels.fill(background);
        planes.depth.fill(CLEAR_DEPTH);
        Ok(())
    }

    /// Drops both planes. Does nothing when already released.
    pub fn release(&mut self) {
        if self.planes.take().is_some() {
            debug!("released {}x{} frame buffer", self.width, self.height);
        }
        self.width = 0;
        self.height = 0;
    }

    pub fn is_allocated(&self) -> bool {
        self.planes.is_some()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    /// Takes effect on the next clear.
    pub fn set_background(&mut self, color: u32) {
        self.background = color;
    }

    pub fn pixels(&self) -> Option<&[u32]> {
        self.planes.as_ref().map(|p| p.pixels.as_slice())
    }

    pub fn pixels_mut(&mut self) -> Option<&mut [u32]> {
        self.planes.as_mut().map(|p| p.pixels.as_mut_slice())
    }

    pub fn depth(&self) -> Option<&[f32]> {
        self.planes.as_ref().map(|p| p.depth.as_slice())
    }

    pub fn depth_mut(&mut self) -> Option<&mut [f32]> {
        self.planes.as_mut().map(|p| p.depth.as_mut_slice())
    }

    /// Pixel at (`col`, `row`), or `None` when out of bounds or unallocated.
    pub fn pixel(&self, col: u32, row: u32) -> Option<u32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let index = row as usize * self.width as usize + col as usize;
        self.pixels().map(|pixels| pixels[index])
    }

    pub fn view(&self) -> Option<FrameView<'_>> {
        self.planes.as_ref().map(|planes| FrameView {
            width: self.width,
            height: self.height,
            pixels: &planes.pixels,
        })
    }
}

fn plane_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidGeometry { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| RenderError::Allocation {
            width,
            height,
            reason: "pixel count overflows usize".into(),
        })
}

fn filled_plane<T: Copy>(len: usize, value: T, width: u32, height: u32) -> Result<Vec<T>> {
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|err| RenderError::Allocation {
            width,
            height,
            reason: err.to_string(),
        })?;
    plane.resize(len, value);
    Ok(plane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::pack_rgb;

    #[test]
    fn allocate_two_by_two_then_clear() {
        let mut buffer = FrameBuffer::default();
        buffer.allocate(2, 2).unwrap();
        assert_eq!(buffer.pixels().unwrap().len(), 4);
        assert_eq!(buffer.depth().unwrap().len(), 4);

        buffer.clear().unwrap();
        assert!(buffer
            .pixels()
            .unwrap()
            .iter()
            .all(|&p| p == pack_rgb(123, 195, 221)));
        assert!(buffer.depth().unwrap().iter().all(|&d| d == 1.0));

        buffer.release();
        assert_eq!(
            buffer.clear(),
            Err(RenderError::InvalidState {
                operation: "clear the frame buffer",
                state: "unallocated",
            })
        );
    }

    #[test]
    fn clear_overwrites_every_entry() {
        for (width, height) in [(1, 1), (3, 7), (64, 1), (17, 33)] {
            let mut buffer = FrameBuffer::default();
            buffer.allocate(width, height).unwrap();
            buffer.pixels_mut().unwrap().fill(0x00FF_FFFF);
            buffer.depth_mut().unwrap().fill(0.25);
            buffer.clear().unwrap();

            let len = (width * height) as usize;
            assert_eq!(buffer.pixels().unwrap().len(), len);
            assert_eq!(buffer.depth().unwrap().len(), len);
            assert!(buffer.pixels().unwrap().iter().all(|&p| p == DEFAULT_BACKGROUND));
            assert!(buffer.depth().unwrap().iter().all(|&d| d == CLEAR_DEPTH));
        }
    }

    #[test]
    fn rejects_empty_geometry() {
        let mut buffer = FrameBuffer::default();
        assert_eq!(
            buffer.allocate(0, 10),
            Err(RenderError::InvalidGeometry {
                width: 0,
                height: 10
            })
        );
        assert!(buffer.allocate(10, 0).is_err());
        assert!(!buffer.is_allocated());
    }

    #[test]
    fn oversized_allocation_is_an_error() {
        let mut buffer = FrameBuffer::default();
        buffer.allocate(3, 2).unwrap();
        buffer.pixels_mut().unwrap()[0] = 0x00AB_CDEF;

        let err = buffer.allocate(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Allocation {
                width: u32::MAX,
                height: u32::MAX,
                ..
            }
        ));
        assert_eq!((buffer.width(), buffer.height()), (3, 2));
        assert_eq!(buffer.pixel(0, 0), Some(0x00AB_CDEF));
        assert_eq!(buffer.depth().unwrap().len(), 6);
    }

    #[test]
    fn allocation_starts_cleared() {
        let mut buffer = FrameBuffer::new(pack_rgb(1, 2, 3));
        buffer.allocate(4, 3).unwrap();
        assert!(buffer.pixels().unwrap().iter().all(|&p| p == 0x0001_0203));
        assert!(buffer.depth().unwrap().iter().all(|&d| d == CLEAR_DEPTH));
    }

    #[test]
    fn background_override_applies_on_next_clear() {
        let mut buffer = FrameBuffer::default();
        buffer.allocate(2, 1).unwrap();
        buffer.set_background(0x0010_2030);
        assert_eq!(buffer.pixel(0, 0), Some(DEFAULT_BACKGROUND));
        buffer.clear().unwrap();
        assert_eq!(buffer.pixel(1, 0), Some(0x0010_2030));
    }

    #[test]
    fn reallocation_resizes_both_planes() {
        let mut buffer = FrameBuffer::default();
        buffer.allocate(2, 2).unwrap();
        buffer.allocate(5, 3).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (5, 3));
        assert_eq!(buffer.pixels().unwrap().len(), 15);
        assert_eq!(buffer.depth().unwrap().len(), 15);
    }

    #[test]
    fn pixels_are_row_major() {
        let mut buffer = FrameBuffer::default();
        buffer.allocate(3, 2).unwrap();
        buffer.pixels_mut().unwrap()[5] = 0x00AB_CDEF;
        assert_eq!(buffer.pixel(2, 1), Some(0x00AB_CDEF));
        assert_eq!(buffer.pixel(3, 1), None);
        assert_eq!(buffer.pixel(0, 2), None);
    }

    #[test]
    fn release_is_idempotent() {
        let mut buffer = FrameBuffer::default();
        buffer.release();
        buffer.allocate(1, 1).unwrap();
        buffer.release();
        buffer.release();
        assert!(buffer.view().is_none());
        assert_eq!(buffer.pixel(0, 0), None);
    }
}
