//! # Font handling
//!
//! Text is measured and rasterized through the [TextFace] trait. The
//! production implementation is [TtfFace], which binds a TrueType font to
//! one pixel size per role. When no font file can be found, the bank falls
//! back to the crude built-in face, so a render never fails for lack of a
//! font on disk.

use std::{io, path::Path, sync::Arc};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

mod builtin;
mod ttf;

pub use builtin::BuiltinFace;
pub use ttf::TtfFace;

/// Error when loading a font file
#[derive(Debug, Error)]
pub enum LoadError {
    /// The IO failed
    #[error("Failed IO")]
    Io(#[from] io::Error),
    /// The font data could not be parsed
    #[error("Parsing failed: {0}")]
    Parse(String),
}

/// The text roles of a ticket, each bound to its own size
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontRole {
    /// The big ticket title
    Title,
    /// Header, footer and caption labels
    Label,
    /// Body text
    Body,
    /// The ticket pill and due banner
    Small,
}

/// Glyph heights per role, in dots
///
/// The keys keep the `_pt` names of the original configuration surface;
/// the values are pixel sizes at the 203 dpi of the print head.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    /// Title size
    pub title_pt: u32,
    /// Label size
    pub label_pt: u32,
    /// Body size
    pub body_pt: u32,
    /// Small size
    pub small_pt: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        FontSizes {
            title_pt: 48,
            label_pt: 16,
            body_pt: 22,
            small_pt: 18,
        }
    }
}

impl FontSizes {
    fn get(&self, role: FontRole) -> u32 {
        match role {
            FontRole::Title => self.title_pt,
            FontRole::Label => self.label_pt,
            FontRole::Body => self.body_pt,
            FontRole::Small => self.small_pt,
        }
    }
}

/// A rasterized glyph, positioned relative to the pen
pub struct RasterGlyph {
    /// Horizontal offset from the pen position
    pub left: i32,
    /// Vertical offset from the baseline to the first coverage row
    pub top: i32,
    /// Coverage width in pixels
    pub width: u32,
    /// Coverage height in pixels
    pub height: u32,
    /// Row-major grayscale coverage, `width * height` bytes
    pub coverage: Vec<u8>,
}

/// A font bound to a specific pixel size
pub trait TextFace {
    /// The bound glyph size in dots
    fn size(&self) -> u32;

    /// The pen advance of a single char in dots
    fn advance(&self, c: char) -> u32;

    /// Height of the ascender above the baseline in dots
    fn ascent(&self) -> u32;

    /// Baseline-to-baseline distance in dots
    fn line_advance(&self) -> u32;

    /// Rasterize a single char; `None` for whitespace and empty glyphs
    fn glyph(&self, c: char) -> Option<RasterGlyph>;

    /// The same font face bound to a different size
    fn with_size(&self, size: u32) -> Box<dyn TextFace>;
}

/// Build the hollow-box glyph used when a font lacks a character
///
/// The engine substitutes a default-width box instead of failing the
/// render; the caller is expected to log the miss.
pub(crate) fn fallback_glyph(size: u32) -> RasterGlyph {
    let w = (size * 6 / 10).max(3);
    let h = (size * 7 / 10).max(4);
    let t = (size / 12).max(1);
    let mut coverage = vec![0u8; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            if x < t || x >= w - t || y < t || y >= h - t {
                coverage[(y * w + x) as usize] = 0xFF;
            }
        }
    }
    RasterGlyph {
        left: 1,
        top: -(h as i32),
        width: w,
        height: h,
        coverage,
    }
}

/// The four sized faces of one render pass
pub struct FontBank {
    title: Box<dyn TextFace>,
    label: Box<dyn TextFace>,
    body: Box<dyn TextFace>,
    small: Box<dyn TextFace>,
}

impl FontBank {
    /// Look up the face for a role
    pub fn face(&self, role: FontRole) -> &dyn TextFace {
        match role {
            FontRole::Title => self.title.as_ref(),
            FontRole::Label => self.label.as_ref(),
            FontRole::Body => self.body.as_ref(),
            FontRole::Small => self.small.as_ref(),
        }
    }

    /// Bind a parsed TrueType font to all four roles
    pub fn from_font(font: Arc<fontdue::Font>, sizes: &FontSizes) -> Self {
        FontBank {
            title: Box::new(TtfFace::new(font.clone(), sizes.get(FontRole::Title))),
            label: Box::new(TtfFace::new(font.clone(), sizes.get(FontRole::Label))),
            body: Box::new(TtfFace::new(font.clone(), sizes.get(FontRole::Body))),
            small: Box::new(TtfFace::new(font, sizes.get(FontRole::Small))),
        }
    }

    /// The built-in 5x7 face for all roles
    pub fn builtin(sizes: &FontSizes) -> Self {
        FontBank {
            title: Box::new(BuiltinFace::new(sizes.get(FontRole::Title))),
            label: Box::new(BuiltinFace::new(sizes.get(FontRole::Label))),
            body: Box::new(BuiltinFace::new(sizes.get(FontRole::Body))),
            small: Box::new(BuiltinFace::new(sizes.get(FontRole::Small))),
        }
    }

    /// Load the first usable font from a list of candidate paths
    ///
    /// Paths that are missing or unparsable are logged and skipped; when
    /// the whole list is exhausted the built-in face takes over.
    pub fn load<P: AsRef<Path>>(paths: &[P], sizes: &FontSizes) -> Self {
        for path in paths {
            let path = path.as_ref();
            match ttf::load_font(path) {
                Ok(font) => {
                    info!("Loaded font file '{}'", path.display());
                    return Self::from_font(Arc::new(font), sizes);
                }
                Err(LoadError::Io(e)) => {
                    debug!("No font file at '{}': {}", path.display(), e);
                }
                Err(LoadError::Parse(e)) => {
                    warn!("Failed to parse font file '{}': {}", path.display(), e);
                }
            }
        }
        warn!("No usable font file, falling back to the built-in face");
        Self::builtin(sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_default() {
        let sizes = FontSizes::default();
        assert_eq!(48, sizes.get(FontRole::Title));
        assert_eq!(18, sizes.get(FontRole::Small));
    }

    #[test]
    fn test_fallback_glyph_is_hollow() {
        let g = fallback_glyph(24);
        assert_eq!((14, 16), (g.width, g.height));
        // border is opaque, center is transparent
        assert_eq!(0xFF, g.coverage[0]);
        let center = (g.height / 2 * g.width + g.width / 2) as usize;
        assert_eq!(0x00, g.coverage[center]);
    }

    #[test]
    fn test_bank_load_falls_back() {
        let bank = FontBank::load(&["/nonexistent/font.ttf"], &FontSizes::default());
        assert_eq!(48, bank.face(FontRole::Title).size());
    }
}
