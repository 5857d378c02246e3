pub const VIRTUAL_WIDTH: u32 = 1920;
pub const VIRTUAL_HEIGHT: u32 = 1080;

/// Straight (non-premultiplied) RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `alpha` in `[0, 1]`, rounded to the nearest byte.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// 2D drawing target in pixel coordinates, origin top-left.
///
/// Text is placed by its left edge and alphabetic baseline.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    /// Outline centred on the rectangle's edges.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Color, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color);

    fn measure_text(&self, text: &str) -> f64;
}
