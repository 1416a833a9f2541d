#![warn(missing_docs)]
//! # ticket-pdf
//!
//! Serializes one rendered ticket raster into a single-page PDF for the
//! file output mode. The writer is small and fully deterministic: objects
//! are emitted in a fixed order, the 1-bit canvas becomes a DeviceGray
//! image XObject with a `/Decode [1 0]` ramp (ink bits are black), and the
//! only stream filter is FlateDecode.
//!
//! Reference: PDF 32000-1:2008.

use std::io::{self, Write};

use chrono::NaiveDate;
use flate2::{write::ZlibEncoder, Compression};

/// Resolution of the source raster in dots per inch
pub const DEFAULT_DPI: u32 = 203;

/// Points per inch in PDF user space
const POINTS_PER_INCH: f32 = 72.0;

/// Document metadata for the Info dictionary
#[derive(Debug, Default, Clone)]
pub struct Meta {
    /// The document title
    pub title: Option<String>,
    /// The document author
    pub author: Option<String>,
    /// The producing program
    pub producer: Option<String>,
    /// Creation date; omitted entirely when `None` so that re-renders of
    /// the same ticket stay byte-identical
    pub creation: Option<NaiveDate>,
}

impl Meta {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.producer.is_none()
            && self.creation.is_none()
    }
}

/// A packed 1-bit raster page, rows padded to whole bytes
#[derive(Debug, Copy, Clone)]
pub struct PageImage<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major packed pixel data, `(width + 7) / 8` bytes per row
    pub data: &'a [u8],
    /// Source resolution, maps pixels to PDF points
    pub dpi: u32,
}

impl PageImage<'_> {
    fn bytes_per_row(&self) -> usize {
        ((self.width + 7) / 8) as usize
    }

    fn points(&self) -> (f32, f32) {
        let scale = POINTS_PER_INCH / self.dpi as f32;
        (
            self.width as f32 * scale,
            self.height as f32 * scale,
        )
    }
}

struct ByteCounter<W> {
    inner: W,
    written: usize,
}

impl<W: Write> ByteCounter<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for ByteCounter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = self.inner.write(buf)?;
        self.written += len;
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Escape a string for a PDF literal string `( ... )`
fn write_pdf_string<W: Write>(f: &mut W, s: &str) -> io::Result<()> {
    f.write_all(b"(")?;
    for b in s.bytes() {
        match b {
            b'(' | b')' | b'\\' => f.write_all(&[b'\\', b])?,
            b'\n' => f.write_all(b"\\n")?,
            b'\r' => f.write_all(b"\\r")?,
            _ => f.write_all(&[b])?,
        }
    }
    f.write_all(b")")
}

fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::new(6));
    enc.write_all(data)?;
    enc.finish()
}

/// Write a complete single-page PDF to `w`
///
/// The page is exactly the size of the raster at its resolution and the
/// image covers it fully.
pub fn write_pdf<W: Write>(w: W, image: &PageImage<'_>, meta: &Meta) -> io::Result<()> {
    let expected = image.bytes_per_row() * image.height as usize;
    if image.data.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "raster data has {} bytes, expected {}",
                image.data.len(),
                expected
            ),
        ));
    }

    let mut f = ByteCounter::new(w);
    let mut offsets: Vec<usize> = Vec::with_capacity(8);
    let (pw, ph) = image.points();

    writeln!(f, "%PDF-1.4")?;
    f.write_all(&[b'%', 180, 200, 220, 240, b'\n'])?;

    // 1: Catalog
    offsets.push(f.written);
    writeln!(f, "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj")?;

    // 2: Pages
    offsets.push(f.written);
    writeln!(f, "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj")?;

    // 3: Page
    offsets.push(f.written);
    writeln!(
        f,
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
         /Resources << /XObject << /T0 4 0 R >> /ProcSet [/PDF /ImageB] >> \
         /Contents 5 0 R >>\nendobj",
        pw, ph
    )?;

    // 4: the ticket raster as an image XObject
    offsets.push(f.written);
    let image_data = compress(image.data)?;
    writeln!(
        f,
        "4 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} \
         /ColorSpace /DeviceGray /BitsPerComponent 1 /Decode [1 0] \
         /Filter /FlateDecode /Length {} >>\nstream",
        image.width,
        image.height,
        image_data.len()
    )?;
    f.write_all(&image_data)?;
    writeln!(f, "\nendstream\nendobj")?;

    // 5: content stream scaling the image onto the page
    offsets.push(f.written);
    let contents = format!("q\n{:.2} 0 0 {:.2} 0 0 cm\n/T0 Do\nQ\n", pw, ph);
    writeln!(f, "5 0 obj\n<< /Length {} >>\nstream", contents.len())?;
    f.write_all(contents.as_bytes())?;
    writeln!(f, "endstream\nendobj")?;

    // 6: Info
    let info_id = if meta.is_empty() {
        None
    } else {
        offsets.push(f.written);
        writeln!(f, "6 0 obj")?;
        f.write_all(b"<<")?;
        if let Some(title) = &meta.title {
            f.write_all(b" /Title ")?;
            write_pdf_string(&mut f, title)?;
        }
        if let Some(author) = &meta.author {
            f.write_all(b" /Author ")?;
            write_pdf_string(&mut f, author)?;
        }
        if let Some(producer) = &meta.producer {
            f.write_all(b" /Producer ")?;
            write_pdf_string(&mut f, producer)?;
        }
        if let Some(creation) = &meta.creation {
            write!(f, " /CreationDate (D:{}000000)", creation.format("%Y%m%d"))?;
        }
        writeln!(f, " >>\nendobj")?;
        Some(6)
    };

    // xref
    let startxref = f.written;
    writeln!(f, "xref\n0 {}", offsets.len() + 1)?;
    writeln!(f, "0000000000 65535 f ")?;
    for offset in &offsets {
        writeln!(f, "{:010} 00000 n ", offset)?;
    }
    writeln!(f, "trailer")?;
    write!(f, "<< /Size {} /Root 1 0 R", offsets.len() + 1)?;
    if let Some(id) = info_id {
        write!(f, " /Info {} 0 R", id)?;
    }
    writeln!(f, " >>")?;
    writeln!(f, "startxref\n{}\n%%EOF", startxref)?;
    Ok(())
}
