use hud_model::{Detection, FeedId};
use serde::Deserialize;
use tracing::trace;

use crate::surface::{Color, Rect, Surface};

/// Length of each arm of the L-shaped corner accents.
pub const CORNER_LENGTH: f64 = 10.0;
pub const TARGET_TEXT: &str = "TARGET";

const LABEL_HEIGHT: f64 = 16.0;
const LABEL_PADDING: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayFlags {
    pub show_boxes: bool,
    pub highlight_target: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_boxes: true,
            highlight_target: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxStyle {
    Alert,
    Neutral,
}

impl BoxStyle {
    pub fn for_detection(detection: &Detection, flags: DisplayFlags) -> Self {
        if detection.is_target && flags.highlight_target {
            BoxStyle::Alert
        } else {
            BoxStyle::Neutral
        }
    }

    pub fn color(self) -> Color {
        match self {
            BoxStyle::Alert => Color::rgb(0xff, 0x00, 0x40),
            BoxStyle::Neutral => Color::rgb(0x00, 0xff, 0x9d),
        }
    }

    pub fn line_width(self) -> f64 {
        match self {
            BoxStyle::Alert => 3.0,
            BoxStyle::Neutral => 2.0,
        }
    }
}

fn label_background() -> Color {
    Color::rgba(0, 0, 0, 0.7)
}

fn target_background() -> Color {
    Color::rgba(255, 0, 64, 0.9)
}

/// Draws one feed's detections. Holds no state; every call repaints from
/// scratch, so rendering the same input twice yields the same surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayRenderer;

impl OverlayRenderer {
    /// Clear `surface` and draw the detections belonging to `feed`.
    ///
    /// A missing surface is a no-op. The surface is cleared even when there is
    /// nothing to draw so that boxes from an earlier frame never linger.
    pub fn render<S>(
        &self,
        surface: Option<&mut S>,
        detections: &[Detection],
        feed: FeedId,
        flags: DisplayFlags,
    ) where
        S: Surface + ?Sized,
    {
        let Some(surface) = surface else {
            return;
        };
        surface.clear();
        if !flags.show_boxes {
            return;
        }

        let (width, height) = surface.size();
        let (width, height) = (width as f64, height as f64);
        let mut drawn = 0usize;
        for detection in detections.iter().filter(|d| d.feed == feed) {
            let rect = Rect::new(
                detection.bbox.x * width,
                detection.bbox.y * height,
                detection.bbox.w * width,
                detection.bbox.h * height,
            );
            let style = BoxStyle::for_detection(detection, flags);
            draw_detection(&mut *surface, rect, detection.confidence, style);
            drawn += 1;
        }
        trace!(%feed, drawn, "overlay rendered");
    }
}

fn draw_detection<S: Surface + ?Sized>(surface: &mut S, rect: Rect, confidence: f64, style: BoxStyle) {
    let color = style.color();
    let line_width = style.line_width();
    surface.stroke_rect(rect, color, line_width);

    for corner in corner_accents(rect) {
        surface.stroke_polyline(&corner, color, line_width);
    }

    let label = confidence_label(confidence);
    let label_width = surface.measure_text(&label) + LABEL_PADDING;
    surface.fill_rect(
        Rect::new(rect.x, rect.y - 18.0, label_width, LABEL_HEIGHT),
        label_background(),
    );
    surface.fill_text(&label, rect.x + 4.0, rect.y - 6.0, color);

    if style == BoxStyle::Alert {
        let target_width = surface.measure_text(TARGET_TEXT) + LABEL_PADDING;
        surface.fill_rect(
            Rect::new(rect.x, rect.bottom() + 2.0, target_width, LABEL_HEIGHT),
            target_background(),
        );
        surface.fill_text(TARGET_TEXT, rect.x + 4.0, rect.bottom() + 14.0, Color::WHITE);
    }
}

/// Whole-percent label, halves rounded up.
pub fn confidence_label(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

/// Top-left, top-right, bottom-left, bottom-right; each drawn as one
/// three-point polyline.
pub fn corner_accents(rect: Rect) -> [[(f64, f64); 3]; 4] {
    let Rect { x, y, w, h } = rect;
    let l = CORNER_LENGTH;
    [
        [(x, y + l), (x, y), (x + l, y)],
        [(x + w - l, y), (x + w, y), (x + w, y + l)],
        [(x, y + h - l), (x, y + h), (x + l, y + h)],
        [(x + w - l, y + h), (x + w, y + h), (x + w, y + h - l)],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rounds_to_whole_percent() {
        assert_eq!(confidence_label(0.78), "78%");
        assert_eq!(confidence_label(0.125), "13%");
        assert_eq!(confidence_label(1.0), "100%");
        assert_eq!(confidence_label(0.0), "0%");
    }

    #[test]
    fn corners_hug_the_box() {
        let corners = corner_accents(Rect::new(100.0, 50.0, 40.0, 30.0));
        assert_eq!(corners[0], [(100.0, 60.0), (100.0, 50.0), (110.0, 50.0)]);
        assert_eq!(corners[3], [(130.0, 80.0), (140.0, 80.0), (140.0, 70.0)]);
    }

    #[test]
    fn styles_follow_target_and_flag() {
        assert_eq!(BoxStyle::Alert.color(), Color::rgb(255, 0, 64));
        assert_eq!(BoxStyle::Neutral.color(), Color::rgb(0, 255, 157));
        assert_eq!(BoxStyle::Alert.line_width(), 3.0);
        assert_eq!(BoxStyle::Neutral.line_width(), 2.0);
    }
}
