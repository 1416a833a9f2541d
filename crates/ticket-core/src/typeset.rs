//! # Text measurement and wrapping
//!
//! The typography engine is pure: it measures strings against a sized
//! [TextFace] and produces wrapped lines that are guaranteed to fit the
//! given pixel budget. Drawing happens through the canvas coverage blit.

use crate::{
    fonts::TextFace,
    raster::Canvas,
};

/// One wrapped line with its measured pixel width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// The text of this line
    pub text: String,
    /// The rendered width in dots
    pub width: u32,
}

/// Measure the pen advance of a string in dots
pub fn measure(face: &dyn TextFace, text: &str) -> u32 {
    text.chars().map(|c| face.advance(c)).sum()
}

/// Break a single word that is wider than the budget
///
/// Returns the longest prefix that fits together with a trailing `-`, and
/// the remainder. A word where not even one char fits yields that char
/// alone, so progress is always made.
fn break_word<'a>(face: &dyn TextFace, word: &'a str, max_width: u32) -> (String, &'a str) {
    let indices: Vec<usize> = word.char_indices().map(|(i, _)| i).collect();
    for &i in indices.iter().skip(1).rev() {
        let head = &word[..i];
        if measure(face, head) + face.advance('-') <= max_width {
            return (format!("{}-", head), &word[i..]);
        }
    }
    let first = indices.get(1).copied().unwrap_or(word.len());
    (word[..first].to_string(), &word[first..])
}

/// Greedy word-wrap of a single paragraph
///
/// Words are accumulated onto the current line while the measured width
/// stays within `max_width`; over-long words are broken at a character
/// boundary. Blank input produces an empty sequence.
pub fn wrap(face: &dyn TextFace, text: &str, max_width: u32) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut cur = String::new();

    let flush = |cur: &mut String, lines: &mut Vec<WrappedLine>| {
        if !cur.is_empty() {
            let width = measure(face, cur);
            lines.push(WrappedLine {
                text: std::mem::take(cur),
                width,
            });
        }
    };

    for word in text.split_whitespace() {
        let mut word = word;
        let mut broken = String::new();
        while !word.is_empty() && measure(face, word) > max_width {
            flush(&mut cur, &mut lines);
            let (head, rest) = break_word(face, word, max_width);
            broken = head;
            word = rest;
            if !word.is_empty() {
                let width = measure(face, &broken);
                lines.push(WrappedLine {
                    text: std::mem::take(&mut broken),
                    width,
                });
            }
        }
        let word = if broken.is_empty() {
            word
        } else {
            broken.as_str()
        };
        if word.is_empty() {
            continue;
        }
        if cur.is_empty() {
            cur.push_str(word);
        } else {
            let sep = face.advance(' ');
            if measure(face, &cur) + sep + measure(face, word) <= max_width {
                cur.push(' ');
                cur.push_str(word);
            } else {
                flush(&mut cur, &mut lines);
                cur.push_str(word);
            }
        }
    }
    flush(&mut cur, &mut lines);
    lines
}

/// Draw a string with its baseline at `baseline`, pen starting at `x`
pub fn draw_text(canvas: &mut Canvas, face: &dyn TextFace, x: i32, baseline: i32, text: &str) {
    let mut pen = x;
    for c in text.chars() {
        if let Some(g) = face.glyph(c) {
            canvas.draw_coverage(pen + g.left, baseline + g.top, g.width, g.height, &g.coverage);
        }
        pen += face.advance(c) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::BuiltinFace;

    // scale 1: every char advances 6 dots
    fn face() -> BuiltinFace {
        BuiltinFace::new(8)
    }

    #[test]
    fn test_empty_input_has_zero_lines() {
        assert!(wrap(&face(), "", 100).is_empty());
        assert!(wrap(&face(), "   \n  ", 100).is_empty());
    }

    #[test]
    fn test_simple_wrap() {
        // "aaa bbb" = 42 dots, fits; adding " ccc" would be 66
        let lines = wrap(&face(), "aaa bbb ccc", 48);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(vec!["aaa bbb", "ccc"], texts);
        assert_eq!(42, lines[0].width);
    }

    #[test]
    fn test_wrapped_width_never_exceeds_budget() {
        let face = face();
        let text = "the quick brown fox jumps over the extraordinarily lazy dog";
        for max in [30, 48, 60, 120] {
            for line in wrap(&face, text, max) {
                assert!(line.width <= max, "{:?} wider than {}", line.text, max);
            }
        }
    }

    #[test]
    fn test_long_token_is_broken() {
        let face = face();
        let token: String = std::iter::repeat('x').take(200).collect();
        let lines = wrap(&face, &token, 60);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 60);
        }
        // all but the last fragment carry the break marker
        for line in &lines[..lines.len() - 1] {
            assert!(line.text.ends_with('-'));
        }
        let glued: String = lines
            .iter()
            .map(|l| l.text.trim_end_matches('-'))
            .collect();
        assert_eq!(200, glued.chars().count());
    }

    #[test]
    fn test_single_char_budget_still_progresses() {
        // budget below one glyph: each char goes on its own line
        let lines = wrap(&face(), "abc", 5);
        assert_eq!(3, lines.len());
    }

    #[test]
    fn test_draw_text_inks_canvas() {
        let mut canvas = Canvas::with_height(64, 12);
        draw_text(&mut canvas, &face(), 2, 10, "HI");
        assert!(canvas.ink_count() > 0);
        // 'H' left column at pen x=2, top row at baseline-7
        assert!(canvas.ink_at(2, 3));
    }
}
