//! TrueType faces via `fontdue`

use std::{path::Path, sync::Arc};

use log::warn;

use super::{fallback_glyph, LoadError, RasterGlyph, TextFace};

/// Parse a TrueType/OpenType font file
pub fn load_font(path: &Path) -> Result<fontdue::Font, LoadError> {
    let data = std::fs::read(path)?;
    fontdue::Font::from_bytes(
        &data[..],
        fontdue::FontSettings {
            collection_index: 0,
            scale: 40.0,
            load_substitutions: true,
        },
    )
    .map_err(|e| LoadError::Parse(e.to_string()))
}

/// A TrueType font bound to one pixel size
pub struct TtfFace {
    font: Arc<fontdue::Font>,
    size: u32,
}

impl TtfFace {
    /// Bind a font to a size
    pub fn new(font: Arc<fontdue::Font>, size: u32) -> Self {
        TtfFace { font, size }
    }

    fn px(&self) -> f32 {
        self.size as f32
    }

    fn has_glyph(&self, c: char) -> bool {
        self.font.lookup_glyph_index(c) != 0
    }
}

impl TextFace for TtfFace {
    fn size(&self) -> u32 {
        self.size
    }

    fn advance(&self, c: char) -> u32 {
        if !self.has_glyph(c) {
            // keep the pen moving by the fallback box width
            return (self.size / 2).max(2);
        }
        // Per-char quantization to whole dots: measuring and drawing share
        // the same pen positions, which keeps wrapped widths dot-exact.
        self.font.metrics(c, self.px()).advance_width.round() as u32
    }

    fn ascent(&self) -> u32 {
        match self.font.horizontal_line_metrics(self.px()) {
            Some(m) => m.ascent.round() as u32,
            None => self.size * 4 / 5,
        }
    }

    fn line_advance(&self) -> u32 {
        (self.size as f32 * 1.35).round() as u32
    }

    fn glyph(&self, c: char) -> Option<RasterGlyph> {
        if c.is_whitespace() {
            return None;
        }
        if !self.has_glyph(c) {
            warn!("Missing glyph for {:?}, substituting box", c);
            return Some(fallback_glyph(self.size));
        }
        let (metrics, coverage) = self.font.rasterize(c, self.px());
        if metrics.width == 0 || metrics.height == 0 {
            return None;
        }
        Some(RasterGlyph {
            left: metrics.xmin,
            top: -(metrics.ymin + metrics.height as i32),
            width: metrics.width as u32,
            height: metrics.height as u32,
            coverage,
        })
    }

    fn with_size(&self, size: u32) -> Box<dyn TextFace> {
        Box::new(TtfFace::new(self.font.clone(), size))
    }
}
