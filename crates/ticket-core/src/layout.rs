//! # The ticket layout composer
//!
//! [compose] arranges all regions of a ticket onto one canvas, top to
//! bottom: header, id pill, title, due banner, body, footer, QR glyph and
//! the urgency row. Composition is infallible: missing fields substitute
//! documented defaults, over-long titles degrade in size and glyph misses
//! fall back to the box glyph. The full canvas exists before any encoder
//! runs, so output is always all-or-nothing.

use crate::{
    content::TicketContent,
    fonts::{FontBank, FontRole, TextFace},
    qr,
    raster::Canvas,
    typeset::{self, WrappedLine},
    urgency,
};

/// A ticket never renders shorter than this, even when nearly empty
pub const MIN_HEIGHT: u32 = 280;
/// Edge length the QR glyph aims for
pub const QR_TARGET: u32 = 80;

const TITLE_MAX_LINES: usize = 3;
const TITLE_STEP: u32 = 8;
const TITLE_FLOOR: u32 = 16;

/// Geometry of the composed ticket
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Print head width in dots (576 dots = 80 mm paper at 203 dpi)
    pub width: u32,
    /// Horizontal margin in dots
    pub margin_x: u32,
    /// Center the title instead of left-aligning it
    pub center_title: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            width: 576,
            margin_x: 6,
            center_title: false,
        }
    }
}

/// Shrink the title until it fits the line budget
///
/// The size steps down in fixed decrements to a floor; if the floor still
/// overflows, the surplus is cut and the last line gets an ellipsis. This
/// is the one place where `LayoutOverflow` is resolved.
fn fit_title(
    face: &dyn TextFace,
    text: &str,
    max_width: u32,
) -> (Box<dyn TextFace>, Vec<WrappedLine>) {
    let mut size = face.size();
    loop {
        let sized = face.with_size(size);
        let mut lines = typeset::wrap(sized.as_ref(), text, max_width);
        if lines.len() <= TITLE_MAX_LINES {
            return (sized, lines);
        }
        if size <= TITLE_FLOOR {
            lines.truncate(TITLE_MAX_LINES);
            if let Some(last) = lines.last_mut() {
                let mut text = last.text.clone();
                loop {
                    let candidate = format!("{}\u{2026}", text.trim_end());
                    if typeset::measure(sized.as_ref(), &candidate) <= max_width
                        || text.is_empty()
                    {
                        last.text = candidate;
                        last.width = typeset::measure(sized.as_ref(), &last.text);
                        break;
                    }
                    text.pop();
                }
            }
            return (sized, lines);
        }
        size = size.saturating_sub(TITLE_STEP).max(TITLE_FLOOR);
    }
}

fn draw_body(canvas: &mut Canvas, face: &dyn TextFace, left: i32, right: i32, mut y: u32, body: &str) -> u32 {
    let box_s = face.size() * 78 / 100;
    for raw in body.lines() {
        let trimmed = raw.trim_start();
        if let Some(rest) = trimmed.strip_prefix("- ") {
            // hollow checkbox, only on the first wrapped segment
            canvas.draw_rect(left, (y + 3) as i32, box_s, box_s, 2);
            let tx = left + box_s as i32 + 10;
            let lines = typeset::wrap(face, rest.trim(), (right - tx) as u32);
            if lines.is_empty() {
                y += face.line_advance();
            }
            for line in &lines {
                typeset::draw_text(canvas, face, tx, (y + face.ascent()) as i32, &line.text);
                y += face.line_advance();
            }
        } else if trimmed.is_empty() {
            // paragraph break, not an empty rendered line
            y += face.size() * 6 / 10;
        } else {
            for line in &typeset::wrap(face, raw, (right - left) as u32) {
                typeset::draw_text(canvas, face, left, (y + face.ascent()) as i32, &line.text);
                y += face.line_advance();
            }
        }
    }
    y
}

/// Compose a ticket onto a fresh canvas
pub fn compose(content: &TicketContent, fonts: &FontBank, cfg: &LayoutConfig) -> Canvas {
    let label = fonts.face(FontRole::Label);
    let small = fonts.face(FontRole::Small);
    let body = fonts.face(FontRole::Body);

    let left = cfg.margin_x as i32;
    let right = (cfg.width - cfg.margin_x) as i32;
    let max_w = (right - left) as u32;

    let mut canvas = Canvas::new(cfg.width);
    let mut y: u32 = 8;

    // header: bolt marker + app label left, creation date right
    let marker = (label.size().saturating_sub(2)).max(8);
    urgency::draw_bolt(&mut canvas, left + 2, y as i32, marker, true);
    let hx = left + (marker as f32 * 0.72) as i32 + 10;
    typeset::draw_text(&mut canvas, label, hx, (y + label.ascent()) as i32, "TODO TICKET");
    let stamp = content.created.format("%Y-%m-%d").to_string();
    let sw = typeset::measure(label, &stamp);
    typeset::draw_text(&mut canvas, label, right - sw as i32, (y + label.ascent()) as i32, &stamp);
    y += (label.size() as f32 * 1.6).round() as u32;

    // ticket pill
    let pill = format!("TICKET #{}", content.short_id());
    let pw = typeset::measure(small, &pill);
    let ph = small.size();
    let (pad_x, pad_y) = (10u32, 4u32);
    canvas.draw_round_rect(left, y as i32, pw + pad_x * 2, ph + pad_y * 2, 10, 2);
    typeset::draw_text(
        &mut canvas,
        small,
        left + pad_x as i32,
        (y + pad_y + small.ascent()) as i32,
        &pill,
    );
    y += ph + pad_y * 2 + 6;

    // title
    let title = content.effective_title();
    let (tface, tlines) = fit_title(fonts.face(FontRole::Title), &title, max_w);
    for line in &tlines {
        let x = if cfg.center_title {
            left + ((max_w - line.width.min(max_w)) / 2) as i32
        } else {
            left
        };
        typeset::draw_text(&mut canvas, tface.as_ref(), x, (y + tface.ascent()) as i32, &line.text);
        y += tface.line_advance();
    }

    // due banner
    y += 4;
    for line in content.due.banner_lines(content.created) {
        typeset::draw_text(&mut canvas, small, left, (y + small.ascent()) as i32, &line);
        y += small.line_advance();
    }

    canvas.hrule(left, right, y as i32, 3);
    y += 10;

    y = draw_body(&mut canvas, body, left, right, y, &content.body);

    y += 6;
    canvas.hrule(left, right, y as i32, 3);
    y += 10;

    // footer: author left, tag right
    let author = format!("AUTHOR: {}", content.author.as_deref().unwrap_or("Unknown"));
    let tag = format!("TAG: {}", content.tag.as_deref().unwrap_or("None"));
    typeset::draw_text(&mut canvas, label, left, (y + label.ascent()) as i32, &author);
    let tw = typeset::measure(label, &tag);
    typeset::draw_text(&mut canvas, label, right - tw as i32, (y + label.ascent()) as i32, &tag);

    // QR glyph below the footer labels
    let qr_y = y + (label.size() as f32 * 1.5).round() as u32;
    let qr_size = qr::draw(&mut canvas, left, qr_y as i32, &content.id, QR_TARGET, small);
    y = qr_y + qr_size + 10;

    // urgency caption + bolt row
    let level = content.urgency.level();
    typeset::draw_text(&mut canvas, label, left, (y + label.ascent()) as i32, "URGENCY");
    let cap = urgency::caption(level);
    let cw = typeset::measure(label, cap);
    typeset::draw_text(&mut canvas, label, right - cw as i32, (y + label.ascent()) as i32, cap);
    y += (label.size() as f32 * 1.2).round() as u32;

    y = urgency::draw_row(&mut canvas, y, cfg.width, level, content.urgency_plus);
    y += 8;

    canvas.crop(y.max(MIN_HEIGHT));
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::BuiltinFace;

    #[test]
    fn test_title_fits_without_stepdown() {
        let face = BuiltinFace::new(48);
        let (sized, lines) = fit_title(&face, "Buy milk", 564);
        assert_eq!(48, sized.size());
        assert_eq!(1, lines.len());
    }

    #[test]
    fn test_title_steps_down_then_truncates() {
        let face = BuiltinFace::new(48);
        let long: String = std::iter::repeat("word ").take(60).collect();
        let (sized, lines) = fit_title(&face, long.trim(), 564);
        assert!(sized.size() <= 48);
        assert!(lines.len() <= TITLE_MAX_LINES);
        for line in &lines {
            assert!(line.width <= 564);
        }
        if lines.len() == TITLE_MAX_LINES {
            assert!(lines[2].text.ends_with('\u{2026}'));
        }
    }

    #[test]
    fn test_title_lines_always_fit_budget() {
        let face = BuiltinFace::new(48);
        let token: String = std::iter::repeat('w').take(300).collect();
        let (_, lines) = fit_title(&face, &token, 300);
        assert!(lines.len() <= TITLE_MAX_LINES);
        for line in &lines {
            assert!(line.width <= 300);
        }
    }
}
