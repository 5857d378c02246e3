use std::{io::Cursor, path::Path};

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::{
    glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT},
    surface::{Color, Rect, Surface, VIRTUAL_HEIGHT, VIRTUAL_WIDTH},
};

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Software rasteriser over a transparent RGBA buffer.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
    }
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RasterError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Source-over composite of `color` onto one pixel. Out-of-bounds is a no-op.
    fn blend(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.image.width() as i32 || y >= self.image.height() as i32 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        if color.a == 255 {
            *dst = Rgba(color.to_rgba8());
            return;
        }

        let src_a = color.a as f32 / 255.0;
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            *dst = Rgba([0, 0, 0, 0]);
            return;
        }
        let channel = |src: u8, dst: u8| {
            let value = (src as f32 * src_a + dst as f32 * dst_a * (1.0 - src_a)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            channel(color.r, dst.0[0]),
            channel(color.g, dst.0[1]),
            channel(color.b, dst.0[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Fill the pixels whose centres fall inside `[left, right) × [top, bottom)`.
    fn fill_span(&mut self, left: f64, top: f64, right: f64, bottom: f64, color: Color) {
        let width = self.image.width() as i32;
        let height = self.image.height() as i32;
        let x0 = (left.round() as i32).clamp(0, width);
        let x1 = (right.round() as i32).clamp(0, width);
        let y0 = (top.round() as i32).clamp(0, height);
        let y1 = (bottom.round() as i32).clamp(0, height);

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f64) {
        let half = line_width / 2.0;
        let (x0, y0) = from;
        let (x1, y1) = to;
        if y0 == y1 {
            self.fill_span(x0.min(x1) - half, y0 - half, x0.max(x1) + half, y0 + half, color);
        } else if x0 == x1 {
            self.fill_span(x0 - half, y0.min(y1) - half, x0 + half, y0.max(y1) + half, color);
        } else {
            let steps = ((x1 - x0).hypot(y1 - y0) * 2.0).ceil() as usize;
            for step in 0..=steps {
                let t = step as f64 / steps as f64;
                let (cx, cy) = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
                self.fill_span(cx - half, cy - half, cx + half, cy + half, color);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        let half = line_width / 2.0;
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        // Horizontal bands own the corners so translucent strokes blend once.
        self.fill_span(left - half, top - half, right + half, top + half, color);
        self.fill_span(left - half, bottom - half, right + half, bottom + half, color);
        self.fill_span(left - half, top + half, left + half, bottom - half, color);
        self.fill_span(right - half, top + half, right + half, bottom - half, color);
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Color, line_width: f64) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], color, line_width);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_span(rect.x, rect.y, rect.right(), rect.bottom(), color);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        let mut pen_x = x.round() as i32;
        let top = y.round() as i32 - GLYPH_HEIGHT;
        for ch in text.chars() {
            if let Some(glyph) = glyphs::glyph(ch) {
                for (col, row) in glyphs::lit_pixels(glyph) {
                    self.blend(pen_x + col, top + row, color);
                }
            }
            pen_x += GLYPH_ADVANCE;
        }
    }

    fn measure_text(&self, text: &str) -> f64 {
        (text.chars().count() as i32 * GLYPH_ADVANCE) as f64
    }
}
