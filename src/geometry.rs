//! Geometry and pixel value types shared by every component
//!
//! `Coordinate` doubles as a map key for the sparse alive-set, so equality
//! and hashing are structural. `Frame` is the unit of work the pipeline
//! moves around: a row-major pixel grid, its size, and an optional origin
//! that turns a full repaint into a patch.

use serde::{Deserialize, Serialize};

/// Integer 2D point. Negative values are legal; bounds policies live with
/// the structures that consume coordinates, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Componentwise offset
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Dimensions of a renderable area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if this size is at least as large as `other` in both
    /// dimensions. Used to validate that a patch fits a render surface.
    pub fn equal_or_greater(self, other: Size) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Number of cells in a grid of this size
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True if the coordinate lies inside `[0, width) x [0, height)`
    pub fn contains(self, c: Coordinate) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }
}

/// A single RGBA pixel. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::rgba(0, 0, 0, 255);
    pub const WHITE: Pixel = Pixel::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Hex encoding in the host canvas format: `#rrggbbaa`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// A rectangular grid of pixels submitted to the render pipeline.
///
/// `origin: None` means the frame replaces the whole visible surface;
/// `origin: Some(c)` means it is a patch applied at that offset. Frames are
/// moved into the pipeline on enqueue, so a producer cannot mutate a frame
/// it has already handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Pixel>,
    size: Size,
    origin: Option<Coordinate>,
}

impl Frame {
    /// Create a full frame filled with one pixel value
    pub fn filled(size: Size, fill: Pixel) -> Self {
        Self {
            pixels: vec![fill; size.area()],
            size,
            origin: None,
        }
    }

    /// Mark this frame as a patch applied at `origin`
    pub fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.origin
    }

    /// True if this frame is a partial update rather than a full repaint
    pub fn is_patch(&self) -> bool {
        self.origin.is_some()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.size.width + x) as usize
    }

    /// Read a pixel; `None` when out of bounds
    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.size.width && y < self.size.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Write a pixel; out-of-bounds writes are silently ignored
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.size.width && y < self.size.height {
            let idx = self.index(x, y);
            self.pixels[idx] = pixel;
        }
    }

    /// Flatten to row-major RGBA bytes (`4 * width * height`) for the
    /// host canvas transport
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            buf.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_or_greater_independent_dimensions() {
        let base = Size::new(10, 10);
        assert!(base.equal_or_greater(Size::new(10, 10)));
        assert!(base.equal_or_greater(Size::new(5, 10)));
        assert!(!base.equal_or_greater(Size::new(11, 5)));
        assert!(!base.equal_or_greater(Size::new(5, 11)));
    }

    #[test]
    fn test_size_contains_rejects_negative() {
        let s = Size::new(4, 4);
        assert!(s.contains(Coordinate::new(0, 0)));
        assert!(s.contains(Coordinate::new(3, 3)));
        assert!(!s.contains(Coordinate::new(-1, 0)));
        assert!(!s.contains(Coordinate::new(0, 4)));
    }

    #[test]
    fn test_frame_get_set_bounds() {
        let mut f = Frame::filled(Size::new(3, 2), Pixel::BLACK);
        f.set(2, 1, Pixel::WHITE);
        assert_eq!(f.get(2, 1), Some(Pixel::WHITE));
        assert_eq!(f.get(3, 0), None);
        // Out-of-bounds write is a no-op, not a panic
        f.set(5, 5, Pixel::WHITE);
    }

    #[test]
    fn test_frame_rgba_bytes_row_major() {
        let mut f = Frame::filled(Size::new(2, 2), Pixel::rgba(1, 2, 3, 4));
        f.set(1, 0, Pixel::rgba(9, 8, 7, 6));
        let bytes = f.to_rgba_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &[1, 2, 3, 4]);
        // (1, 0) is the second pixel in row-major order
        assert_eq!(&bytes[4..8], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_frame_clone_is_isolated() {
        let original = Frame::filled(Size::new(2, 2), Pixel::BLACK);
        let mut copy = original.clone();
        copy.set(0, 0, Pixel::WHITE);
        assert_eq!(original.get(0, 0), Some(Pixel::BLACK));
    }

    #[test]
    fn test_pixel_hex_encoding() {
        assert_eq!(Pixel::rgba(255, 0, 0, 50).to_hex(), "#ff000032");
        assert_eq!(Pixel::WHITE.to_hex(), "#ffffffff");
    }
}
