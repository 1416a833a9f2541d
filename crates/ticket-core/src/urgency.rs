//! # The urgency bolt row
//!
//! Urgency renders as exactly three lightning-bolt slots: slots below the
//! level are filled, the rest stay hollow outlines. The trailing rounded
//! `+` badge fills when the urgency-plus flag is set. The mapping from
//! level to pattern is fixed; there is no alternate encoding.

use crate::raster::Canvas;

/// Bolt glyph size in dots
pub const BOLT_SIZE: u32 = 48;
/// Gap between the glyph slots in dots
const SPACING: u32 = 20;

/// Clamp an urgency level into the supported `[0, 3]` range
pub fn clamp_level(level: u8) -> u8 {
    level.min(3)
}

/// The caption printed opposite the `URGENCY` label
pub fn caption(level: u8) -> &'static str {
    match clamp_level(level) {
        0 => "NONE",
        1 => "LOW",
        2 => "HIGH",
        _ => "CRITICAL",
    }
}

fn bolt_points(x: f32, y: f32, s: f32) -> [(f32, f32); 7] {
    [
        (x, y),
        (x + s * 0.50, y),
        (x + s * 0.25, y + s * 0.50),
        (x + s * 0.72, y + s * 0.50),
        (x + s * 0.22, y + s * 1.20),
        (x + s * 0.36, y + s * 0.72),
        (x, y + s * 0.72),
    ]
}

/// Draw a single bolt glyph, hollow or filled
pub fn draw_bolt(canvas: &mut Canvas, x: i32, y: i32, s: u32, filled: bool) {
    let pts = bolt_points(x as f32, y as f32, s as f32);
    if filled {
        canvas.fill_polygon(&pts);
    }
    canvas.draw_polygon(&pts, 3);
}

fn draw_plus_badge(canvas: &mut Canvas, x: i32, y: i32, w: u32, h: u32, filled: bool) {
    canvas.draw_round_rect(x, y, w, h, 6, 2);
    if filled {
        canvas.fill_round_rect(x + 2, y + 2, w - 4, h - 4, 4);
    }
    let pad = 10;
    let cx = x + (w / 2) as i32;
    let cy = y + (h / 2) as i32;
    let vbar = (cx - 1, y + pad, 3u32, h - 2 * pad as u32);
    let hbar = (x + pad, cy - 1, w - 2 * pad as u32, 3u32);
    if filled {
        // invert the bars for contrast on the filled background
        canvas.clear_rect(vbar.0, vbar.1, vbar.2, vbar.3);
        canvas.clear_rect(hbar.0, hbar.1, hbar.2, hbar.3);
    } else {
        canvas.fill_rect(vbar.0, vbar.1, vbar.2, vbar.3);
        canvas.fill_rect(hbar.0, hbar.1, hbar.2, hbar.3);
    }
}

/// Draw the centered row of three bolts plus the `+` badge
///
/// Returns the y offset below the row.
pub fn draw_row(canvas: &mut Canvas, y: u32, width: u32, level: u8, plus: bool) -> u32 {
    let level = clamp_level(level);
    let s = BOLT_SIZE;
    let total_w = s * 3 + SPACING * 2 + s + SPACING;
    let start_x = (width.saturating_sub(total_w) / 2) as i32;
    for i in 0..3u8 {
        let x = start_x + (i as u32 * (s + SPACING)) as i32;
        draw_bolt(canvas, x, y as i32, s, i < level);
    }
    let px = start_x + (3 * (s + SPACING)) as i32;
    draw_plus_badge(canvas, px, (y + s / 10) as i32, s, s, plus);
    y + s + 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(3, clamp_level(3));
        assert_eq!(3, clamp_level(5));
        assert_eq!(0, clamp_level(0));
    }

    #[test]
    fn test_captions() {
        assert_eq!("NONE", caption(0));
        assert_eq!("LOW", caption(1));
        assert_eq!("HIGH", caption(2));
        assert_eq!("CRITICAL", caption(3));
        assert_eq!("CRITICAL", caption(200));
    }

    #[test]
    fn test_filled_bolt_has_more_ink() {
        let mut hollow = Canvas::with_height(80, 80);
        draw_bolt(&mut hollow, 8, 8, 48, false);
        let mut filled = Canvas::with_height(80, 80);
        draw_bolt(&mut filled, 8, 8, 48, true);
        assert!(hollow.ink_count() > 0);
        assert!(filled.ink_count() > hollow.ink_count());
    }

    #[test]
    fn test_ink_grows_with_level() {
        let mut last = 0;
        for level in 0..=3u8 {
            let mut canvas = Canvas::with_height(576, 80);
            draw_row(&mut canvas, 4, 576, level, false);
            let ink = canvas.ink_count();
            assert!(ink > last, "level {} did not add ink", level);
            last = ink;
        }
    }

    #[test]
    fn test_plus_badge_changes_pattern() {
        let mut without = Canvas::with_height(576, 80);
        draw_row(&mut without, 4, 576, 2, false);
        let mut with = Canvas::with_height(576, 80);
        draw_row(&mut with, 4, 576, 2, true);
        assert_ne!(without.as_bytes(), with.as_bytes());
    }

    #[test]
    fn test_row_is_deterministic() {
        let mut a = Canvas::with_height(576, 80);
        draw_row(&mut a, 4, 576, 2, true);
        let mut b = Canvas::with_height(576, 80);
        draw_row(&mut b, 4, 576, 2, true);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
