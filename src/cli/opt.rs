use std::{borrow::Cow, fmt, io, path::PathBuf, str::FromStr};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use ticket_core::{fonts::FontSizes, layout::LayoutConfig};

/// The format to export the ticket into
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    /// ESC/POS raster command stream (device or raw dump)
    EscPos,
    /// Portable Network Graphic
    Png,
    /// Portable Document Format
    Pdf,
}

#[derive(Debug)]
/// Failed to parse a format name
pub struct FormatError {}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Use one of `escpos`, `png` or `pdf`")?;
        Ok(())
    }
}

impl std::error::Error for FormatError {}

impl Default for Format {
    fn default() -> Self {
        Format::Png
    }
}

impl FromStr for Format {
    type Err = FormatError;
    fn from_str(val: &str) -> Result<Self, Self::Err> {
        match val {
            "escpos" | "pos" => Ok(Self::EscPos),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(FormatError {}),
        }
    }
}

impl Format {
    /// The file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::EscPos => "bin",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    fn to_static_str(self) -> &'static str {
        match self {
            Self::EscPos => "escpos",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

#[derive(Parser)]
/// Render a ticket to a thermal printer stream or a file
pub struct Options {
    /// The ticket to be rendered (RON, see tickets/example.ron)
    pub file: PathBuf,

    /// Format of the output. Valid choices are:
    ///
    /// "escpos", "png" and "pdf"
    #[clap(default_value_t, long, short = 'F')]
    pub format: Format,

    /// Press parameters passed as command line args
    #[clap(flatten)]
    pub cl_press: PressConfig,

    /// Press parameters as a file
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error")]
    Io(#[from] io::Error),
    #[error("Deserialize Error")]
    Ron(#[from] ron::error::Error),
}

impl Options {
    /// The effective press configuration: config file, overridden by flags
    pub fn press(&self) -> Result<Cow<'_, PressConfig>, ConfigError> {
        if let Some(config_path) = &self.config {
            let text = std::fs::read_to_string(config_path)?;
            let mut press: PressConfig = ron::from_str(&text)?;
            press.merge(&self.cl_press);
            Ok(Cow::Owned(press))
        } else {
            Ok(Cow::Borrowed(&self.cl_press))
        }
    }
}

/// The recognized press options
///
/// Every field is optional; [PressConfig] resolution fills in the defaults
/// of the original hardware setup (80 mm paper at 203 dpi).
#[derive(Debug, Default, Clone, Parser, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// Print head width in dots
    #[clap(long)]
    pub width_dots: Option<u32>,
    /// Horizontal margin in dots
    #[clap(long)]
    pub margin_x: Option<u32>,
    /// Center the title instead of left-aligning it
    #[clap(long)]
    pub center_title: bool,
    /// Title glyph size
    #[clap(long)]
    pub title_pt: Option<u32>,
    /// Label glyph size
    #[clap(long)]
    pub label_pt: Option<u32>,
    /// Body glyph size
    #[clap(long)]
    pub body_pt: Option<u32>,
    /// Small glyph size
    #[clap(long)]
    pub small_pt: Option<u32>,
    /// Candidate font files, first usable one wins
    #[clap(long = "font")]
    pub fonts: Vec<PathBuf>,
    /// Printer device path for the escpos format
    #[clap(long, short = 'd')]
    pub device: Option<PathBuf>,
    /// Where to store file output
    #[clap(long, short = 'o')]
    pub out: Option<PathBuf>,
}

impl PressConfig {
    fn merge(&mut self, flags: &PressConfig) {
        if let Some(v) = flags.width_dots {
            self.width_dots = Some(v);
        }
        if let Some(v) = flags.margin_x {
            self.margin_x = Some(v);
        }
        if flags.center_title {
            self.center_title = true;
        }
        if let Some(v) = flags.title_pt {
            self.title_pt = Some(v);
        }
        if let Some(v) = flags.label_pt {
            self.label_pt = Some(v);
        }
        if let Some(v) = flags.body_pt {
            self.body_pt = Some(v);
        }
        if let Some(v) = flags.small_pt {
            self.small_pt = Some(v);
        }
        if !flags.fonts.is_empty() {
            self.fonts = flags.fonts.clone();
        }
        if let Some(v) = &flags.device {
            self.device = Some(v.clone());
        }
        if let Some(v) = &flags.out {
            self.out = Some(v.clone());
        }
    }

    /// The composed layout geometry
    pub fn layout(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            width: self.width_dots.unwrap_or(defaults.width),
            margin_x: self.margin_x.unwrap_or(defaults.margin_x),
            center_title: self.center_title,
        }
    }

    /// The configured glyph sizes
    pub fn sizes(&self) -> FontSizes {
        let defaults = FontSizes::default();
        FontSizes {
            title_pt: self.title_pt.unwrap_or(defaults.title_pt),
            label_pt: self.label_pt.unwrap_or(defaults.label_pt),
            body_pt: self.body_pt.unwrap_or(defaults.body_pt),
            small_pt: self.small_pt.unwrap_or(defaults.small_pt),
        }
    }

    /// The font search list, with the stock fallback chain
    pub fn font_paths(&self) -> Vec<PathBuf> {
        if !self.fonts.is_empty() {
            return self.fonts.clone();
        }
        vec![
            PathBuf::from("DejaVuSans.ttf"),
            PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            PathBuf::from("/usr/share/fonts/truetype/freefont/FreeSans.ttf"),
        ]
    }

    /// The output directory for file backends
    pub fn out_dir(&self) -> PathBuf {
        self.out.clone().unwrap_or_else(|| PathBuf::from("out"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(Format::EscPos, "escpos".parse().unwrap());
        assert_eq!(Format::Pdf, "pdf".parse().unwrap());
        assert!("ps".parse::<Format>().is_err());
        assert_eq!("png", Format::default().to_string());
    }

    #[test]
    fn test_press_from_ron_with_overrides() {
        let mut press: PressConfig = ron::from_str(
            r#"(
                width_dots: Some(384),
                title_pt: Some(40),
                device: Some("/dev/usb/lp1"),
            )"#,
        )
        .unwrap();
        let flags = PressConfig {
            title_pt: Some(32),
            ..PressConfig::default()
        };
        press.merge(&flags);
        assert_eq!(384, press.layout().width);
        assert_eq!(32, press.sizes().title_pt);
        assert_eq!(22, press.sizes().body_pt);
        assert_eq!(Some(PathBuf::from("/dev/usb/lp1")), press.device);
    }
}
