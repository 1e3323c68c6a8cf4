//! Shared pixel board
//!
//! The mutable pixel surface both the drawing engine and the population
//! simulation raster into. Callers share it behind `Arc<Mutex<_>>` and keep
//! critical sections to single read-then-write operations.

use crate::geometry::{Coordinate, Frame, Pixel, Size};

pub struct PixelBoard {
    pixels: Vec<Pixel>,
    size: Size,
    background: Pixel,
}

impl PixelBoard {
    pub fn new(size: Size, background: Pixel) -> Self {
        Self {
            pixels: vec![background; size.area()],
            size,
            background,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.size.contains(c)
    }

    /// Rebuild the board wholesale at a new size, filled with background
    pub fn reset(&mut self, size: Size) {
        self.size = size;
        self.pixels = vec![self.background; size.area()];
    }

    #[inline]
    fn index(&self, c: Coordinate) -> usize {
        (c.y as u32 * self.size.width + c.x as u32) as usize
    }

    /// Write a pixel; out-of-bounds writes are silently ignored
    pub fn set(&mut self, c: Coordinate, pixel: Pixel) {
        if self.contains(c) {
            let idx = self.index(c);
            self.pixels[idx] = pixel;
        }
    }

    /// Read a pixel; `None` when out of bounds
    pub fn get(&self, c: Coordinate) -> Option<Pixel> {
        if self.contains(c) {
            Some(self.pixels[self.index(c)])
        } else {
            None
        }
    }

    /// Repaint every cell from a classifier function
    pub fn fill_with(&mut self, f: impl Fn(Coordinate) -> Pixel) {
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let c = Coordinate::new(x as i32, y as i32);
                let idx = self.index(c);
                self.pixels[idx] = f(c);
            }
        }
    }

    /// Snapshot the whole board as a full frame
    pub fn full_frame(&self) -> Frame {
        let mut frame = Frame::filled(self.size, self.background);
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                frame.set(x, y, self.pixels[(y * self.size.width + x) as usize]);
            }
        }
        frame
    }

    /// Snapshot a sub-rectangle as a patch seed. Cells of the rectangle
    /// that fall outside the board read as background.
    pub fn sub_frame(&self, origin: Coordinate, size: Size) -> Frame {
        let mut frame = Frame::filled(size, self.background);
        for row in 0..size.height {
            for column in 0..size.width {
                let c = origin.offset(column as i32, row as i32);
                if let Some(pixel) = self.get(c) {
                    frame.set(column, row, pixel);
                }
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_out_of_bounds_is_silent() {
        let mut board = PixelBoard::new(Size::new(4, 4), Pixel::BLACK);
        board.set(Coordinate::new(-1, 0), Pixel::WHITE);
        board.set(Coordinate::new(4, 4), Pixel::WHITE);
        assert_eq!(board.get(Coordinate::new(0, 0)), Some(Pixel::BLACK));
    }

    #[test]
    fn test_reset_rebuilds_to_background() {
        let mut board = PixelBoard::new(Size::new(2, 2), Pixel::BLACK);
        board.set(Coordinate::new(1, 1), Pixel::WHITE);
        board.reset(Size::new(3, 3));
        assert_eq!(board.size(), Size::new(3, 3));
        assert_eq!(board.get(Coordinate::new(1, 1)), Some(Pixel::BLACK));
    }

    #[test]
    fn test_sub_frame_seeds_from_content_and_clamps() {
        let mut board = PixelBoard::new(Size::new(3, 3), Pixel::BLACK);
        board.set(Coordinate::new(2, 2), Pixel::WHITE);

        // Rectangle hangs over the right/bottom edge
        let patch = board.sub_frame(Coordinate::new(2, 2), Size::new(2, 2));
        assert_eq!(patch.get(0, 0), Some(Pixel::WHITE));
        assert_eq!(patch.get(1, 1), Some(Pixel::BLACK)); // out of board: background
    }

    #[test]
    fn test_full_frame_matches_board() {
        let mut board = PixelBoard::new(Size::new(2, 2), Pixel::BLACK);
        board.set(Coordinate::new(0, 1), Pixel::WHITE);
        let frame = board.full_frame();
        assert_eq!(frame.size(), Size::new(2, 2));
        assert!(!frame.is_patch());
        assert_eq!(frame.get(0, 1), Some(Pixel::WHITE));
        assert_eq!(frame.get(1, 0), Some(Pixel::BLACK));
    }
}
