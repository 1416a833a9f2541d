//! # The QR glyph
//!
//! Tickets carry a QR code with the fixed payload `TICKET:<id>` so a phone
//! can jump from the paper slip back to the record. On the rare encoding
//! failure the slot degrades to a bordered box with the short id, which
//! keeps the layout stable.

use log::warn;
use qrcode::{Color, QrCode};

use crate::{
    fonts::TextFace,
    raster::Canvas,
    typeset,
};

/// Quiet zone around the modules, in modules
const BORDER: u32 = 1;

/// Build the fixed QR payload for a ticket identifier
pub fn payload(id: &str) -> String {
    format!("TICKET:{}", id)
}

/// Draw the QR glyph with its top-left corner at `(x, y)`
///
/// The module scale is chosen so the glyph approaches `target` dots without
/// exceeding it (unless a single module is already wider). Returns the
/// drawn edge length in dots.
pub fn draw(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    id: &str,
    target: u32,
    fallback_face: &dyn TextFace,
) -> u32 {
    let data = payload(id);
    match QrCode::new(data.as_bytes()) {
        Ok(code) => {
            let modules = code.width() as u32;
            let colors = code.to_colors();
            let scale = (target / (modules + 2 * BORDER)).max(1);
            let size = scale * (modules + 2 * BORDER);
            for (i, color) in colors.iter().enumerate() {
                if *color == Color::Dark {
                    let mx = i as u32 % modules;
                    let my = i as u32 / modules;
                    canvas.fill_rect(
                        x + ((BORDER + mx) * scale) as i32,
                        y + ((BORDER + my) * scale) as i32,
                        scale,
                        scale,
                    );
                }
            }
            size
        }
        Err(e) => {
            warn!("QR encoding failed for {:?}: {}", data, e);
            canvas.draw_rect(x, y, target, target, 3);
            let end = id
                .char_indices()
                .nth(8)
                .map(|(i, _)| i)
                .unwrap_or(id.len());
            let short = &id[..end];
            typeset::draw_text(
                canvas,
                fallback_face,
                x + 6,
                y + (target / 2) as i32,
                short,
            );
            target
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::BuiltinFace;

    #[test]
    fn test_payload_scheme() {
        assert_eq!("TICKET:a1b2c3d4", payload("a1b2c3d4"));
    }

    #[test]
    fn test_draw_stays_within_target() {
        let mut canvas = Canvas::with_height(120, 120);
        let face = BuiltinFace::new(18);
        let size = draw(&mut canvas, 4, 4, "a1b2c3d4", 80, &face);
        assert!(size > 0 && size <= 80);
        assert!(canvas.ink_count() > 0);
    }

    #[test]
    fn test_finder_pattern_corner_is_dark() {
        let mut canvas = Canvas::with_height(120, 120);
        let face = BuiltinFace::new(18);
        draw(&mut canvas, 0, 0, "a1b2c3d4", 80, &face);
        // first module inside the quiet zone belongs to the finder pattern
        let modules = QrCode::new(payload("a1b2c3d4").as_bytes()).unwrap().width() as u32;
        let scale = (80 / (modules + 2)).max(1);
        assert!(canvas.ink_at(scale, scale));
    }

    #[test]
    fn test_draw_is_deterministic() {
        let face = BuiltinFace::new(18);
        let mut a = Canvas::with_height(120, 120);
        draw(&mut a, 4, 4, "a1b2c3d4", 80, &face);
        let mut b = Canvas::with_height(120, 120);
        draw(&mut b, 4, 4, "a1b2c3d4", 80, &face);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
