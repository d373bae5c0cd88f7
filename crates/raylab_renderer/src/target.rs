//! Render target: the finished image handed to an output writer.

use crate::Color;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)).round() as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Linear color pixels, row-major, fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl RenderTarget {
    /// Create a new render target filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }

    /// Gamma-corrected copy as an `image` buffer, ready for encoding.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(color_to_rgba(self.get(x, y))))
    }
}
