use crate::surface::{Color, Rect, Surface, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};

/// Advance of one character of the 12px monospace label font.
pub const CHAR_ADVANCE: f64 = 7.2;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        line_width: f64,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        color: Color,
    },
}

/// Surface that records every call instead of drawing.
#[derive(Clone, Debug)]
pub struct DrawList {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new(VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
    }
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Operations after the most recent clear, i.e. what is visible.
    pub fn visible(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |idx| idx + 1);
        &self.ops[start..]
    }

    pub fn stroke_rects(&self) -> impl Iterator<Item = (&Rect, &Color, f64)> {
        self.visible().iter().filter_map(|op| match op {
            DrawOp::StrokeRect {
                rect,
                color,
                line_width,
            } => Some((rect, color, *line_width)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.visible().iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Color, line_width: f64) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * CHAR_ADVANCE
    }
}
