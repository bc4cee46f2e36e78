//! RGBA pixel buffer for heatmap and chart rendering.
//!
//! Pixels are tightly packed in row-major order, four bytes each, which is
//! the layout the PNG encoder expects.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Largest width or height accepted by [`Framebuffer::new`].
pub const MAX_DIMENSION: u32 = 8192;

/// Row-major RGBA framebuffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero or exceeds [`MAX_DIMENSION`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let invalid = || Error::InvalidDimensions { width, height };
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(invalid());
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(invalid)?;
        Ok(Self { width, height, pixels: vec![0; len] })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill the whole buffer with one color.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Fill a rectangle, clamped to the buffer bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let rgba = color.to_array();
        for row_y in y1..y2 {
            let start = self.index(x1, row_y);
            let end = self.index(x2, row_y);
            for chunk in self.pixels[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Outline a rectangle with lines `thickness` pixels wide, drawn inside it.
    pub fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32, color: Rgba) {
        let t = thickness.min(w).min(h);
        if t == 0 {
            return;
        }
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w - t, y, t, h, color);
    }

    /// Color at a pixel, `None` when out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(100, 50).unwrap();
        assert_eq!((fb.width(), fb.height()), (100, 50));
        assert_eq!(fb.pixels().len(), 100 * 50 * 4);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(Framebuffer::new(0, 10).is_err());
        assert!(Framebuffer::new(10, 0).is_err());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(matches!(
            Framebuffer::new(MAX_DIMENSION + 1, 1),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(Framebuffer::new(48_032, 48_032).is_err());
        assert!(Framebuffer::new(1, u32::MAX).is_err());
        assert!(Framebuffer::new(MAX_DIMENSION, 1).is_ok());
    }

    #[test]
    fn test_clear_and_fill() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        fb.fill_rect(2, 2, 3, 3, Rgba::BLACK);

        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(4, 4), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_is_clamped() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.fill_rect(2, 2, u32::MAX, u32::MAX, Rgba::BLACK);
        assert_eq!(fb.get_pixel(3, 3), Some(Rgba::BLACK));
        fb.fill_rect(10, 10, 2, 2, Rgba::WHITE);
        assert_eq!(fb.get_pixel(10, 10), None);
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        fb.stroke_rect(0, 0, 10, 10, 2, Rgba::BLACK);

        assert_eq!(fb.get_pixel(0, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(9, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 1), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }
}
