#![warn(missing_docs)]
//! # ESC/POS in Rust
//!
//! This crate implements the small subset of ESC/POS needed to drive a
//! thermal receipt printer with raster bitmaps, plus a decoder to analyze
//! captured streams and implement virtual printers.
//!
//! The encoder emits one `GS v 0` command per raster row, so every row of
//! the source bitmap maps to exactly one line-bitmap command with its own
//! byte-length prefix. Framing is byte-exact: a deviation here produces
//! garbled or blank physical output.

use std::{fmt, io};

use thiserror::Error;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Error while building a raster stream
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A row had the wrong number of bytes for the configured width
    #[error("raster row has {actual} bytes, expected {expected}")]
    RowLength {
        /// Bytes required per row
        expected: usize,
        /// Bytes actually passed
        actual: usize,
    },
}

/// # ESC/POS raster stream encoder
///
/// Produces the complete command stream for one ticket: initialization,
/// the edge-to-edge print area setup, one line-bitmap command per row,
/// and the trailing feed and cut. The stream is fully built in memory
/// before anything is written to a device.
pub struct RasterEncoder {
    width_dots: u16,
    bytes_per_row: u16,
    buf: Vec<u8>,
}

impl RasterEncoder {
    /// Start a stream for the given print head width
    pub fn new(width_dots: u16) -> Self {
        let bytes_per_row = (width_dots + 7) / 8;
        let [xl, xh] = width_dots.to_le_bytes();
        let mut buf = Vec::new();
        // ESC @: initialize
        buf.extend_from_slice(&[ESC, b'@']);
        // GS L: left margin 0, GS W: print area width
        buf.extend_from_slice(&[GS, b'L', 0x00, 0x00]);
        buf.extend_from_slice(&[GS, b'W', xl, xh]);
        RasterEncoder {
            width_dots,
            bytes_per_row,
            buf,
        }
    }

    /// The configured width in dots
    pub fn width_dots(&self) -> u16 {
        self.width_dots
    }

    /// The packed byte length every row must have
    pub fn bytes_per_row(&self) -> u16 {
        self.bytes_per_row
    }

    /// Append one raster row as a single line-bitmap command
    pub fn push_row(&mut self, row: &[u8]) -> Result<(), EncodeError> {
        if row.len() != self.bytes_per_row as usize {
            return Err(EncodeError::RowLength {
                expected: self.bytes_per_row as usize,
                actual: row.len(),
            });
        }
        let [xl, xh] = self.bytes_per_row.to_le_bytes();
        // GS v 0: raster bit image, normal mode, height 1
        self.buf
            .extend_from_slice(&[GS, b'v', b'0', 0x00, xl, xh, 0x01, 0x00]);
        self.buf.extend_from_slice(row);
        Ok(())
    }

    /// Feed `n` lines (ESC d)
    pub fn feed(&mut self, n: u8) {
        self.buf.extend_from_slice(&[ESC, b'd', n]);
    }

    /// Partial cut with no extra feed (GS V)
    pub fn cut(&mut self) {
        self.buf.extend_from_slice(&[GS, b'V', 0x42, 0x00]);
    }

    /// Return the finished stream
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode a whole page of packed rows, with trailing feed and cut
pub fn encode_page<'a, I>(width_dots: u16, rows: I) -> Result<Vec<u8>, EncodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut enc = RasterEncoder::new(width_dots);
    for row in rows {
        enc.push_row(row)?;
    }
    enc.feed(2);
    enc.cut();
    Ok(enc.finish())
}

/// A single printer command
#[derive(Debug)]
pub enum Command {
    /// End of file
    Eof,
    /// ESC @: initialize the printer
    Init,
    /// Line Feed (LF, ASCII 10)
    LineFeed,
    /// Carriage Return (CR, ASCII 13)
    CarriageReturn,
    /// ESC d n: feed n lines
    FeedLines(u8),
    /// GS L: left margin in motion units
    LeftMargin(u16),
    /// GS W: print area width in dots
    PrintAreaWidth(u16),
    /// GS V: cut the paper
    Cut {
        /// Cut mode byte
        mode: u8,
        /// Feed before the cut (function B/C only)
        feed: u8,
    },
    /// GS v 0: one block of raster bit image data
    Raster(RasterBlock),
    /// Other ASCII characters
    Byte(u8),
    /// Unimplemented ESC sequence
    Esc(Code),
    /// Unimplemented GS sequence
    Gs(Code),
}

/// An unimplemented escape code
pub struct Code(pub u8);

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.0))
    }
}

/// A raster bit image block (stored in row order)
pub struct RasterBlock {
    /// Packed bytes per row
    pub bytes_per_row: u16,
    /// Number of rows in this block
    pub rows: u16,
    raw: Vec<u8>,
}

impl RasterBlock {
    /// Return the bytes as written in the stream
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_slice()
    }
}

impl fmt::Debug for RasterBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBlock")
            .field("bytes_per_row", &self.bytes_per_row)
            .field("rows", &self.rows)
            .finish()
    }
}

/// # ESC/POS decoder
pub struct Decoder<R> {
    reader: R,
}

impl<R: io::Read> Decoder<R> {
    /// Create a new instance of the ESC/POS reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.reader.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Advance to the next command
    pub fn advance(&mut self) -> io::Result<Command> {
        let mut buf = [0u8; 1];
        let x = match self.reader.read(&mut buf)? {
            0 => return Ok(Command::Eof),
            _ => buf[0],
        };
        match x {
            ESC => {
                let cmd = self.read_u8()?;
                match cmd {
                    b'@' => Ok(Command::Init),
                    b'd' => Ok(Command::FeedLines(self.read_u8()?)),
                    _ => Ok(Command::Esc(Code(cmd))),
                }
            }
            GS => {
                let cmd = self.read_u8()?;
                match cmd {
                    b'L' => Ok(Command::LeftMargin(self.read_u16_le()?)),
                    b'W' => Ok(Command::PrintAreaWidth(self.read_u16_le()?)),
                    b'V' => {
                        let mode = self.read_u8()?;
                        // function A takes no feed argument
                        let feed = match mode {
                            0x41 | 0x42 | b'a' | b'b' | b'c' | b'g' => self.read_u8()?,
                            _ => 0,
                        };
                        Ok(Command::Cut { mode, feed })
                    }
                    b'v' => {
                        let zero = self.read_u8()?;
                        if zero != b'0' {
                            return Err(io::Error::new(
                                io::ErrorKind::InvalidData,
                                format!("GS v {:02X} is not a raster image", zero),
                            ));
                        }
                        let _m = self.read_u8()?;
                        let bytes_per_row = self.read_u16_le()?;
                        let rows = self.read_u16_le()?;
                        let k = bytes_per_row as usize * rows as usize;
                        let mut raw = vec![0u8; k];
                        self.reader.read_exact(&mut raw)?;
                        Ok(Command::Raster(RasterBlock {
                            bytes_per_row,
                            rows,
                            raw,
                        }))
                    }
                    _ => Ok(Command::Gs(Code(cmd))),
                }
            }
            b'\n' => Ok(Command::LineFeed),
            b'\r' => Ok(Command::CarriageReturn),
            c => Ok(Command::Byte(c)),
        }
    }
}

/// The raster dimensions declared by a complete stream
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// The print area width from `GS W`, if any
    pub print_area_width: Option<u16>,
    /// Total raster rows over all blocks
    pub raster_rows: u32,
    /// Bytes per row of the first raster block
    pub bytes_per_row: Option<u16>,
}

/// Decode a stream and sum up its declared raster dimensions
pub fn summarize<R: io::Read>(reader: R) -> io::Result<StreamSummary> {
    let mut decoder = Decoder::new(reader);
    let mut summary = StreamSummary::default();
    loop {
        match decoder.advance()? {
            Command::Eof => return Ok(summary),
            Command::PrintAreaWidth(w) => summary.print_area_width = Some(w),
            Command::Raster(block) => {
                summary.raster_rows += u32::from(block.rows);
                summary.bytes_per_row.get_or_insert(block.bytes_per_row);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_length_is_checked() {
        let mut enc = RasterEncoder::new(576);
        assert_eq!(576, enc.width_dots());
        assert_eq!(72, enc.bytes_per_row());
        let err = enc.push_row(&[0u8; 71]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::RowLength {
                expected: 72,
                actual: 71
            }
        ));
    }

    #[test]
    fn test_preamble_bytes() {
        let enc = RasterEncoder::new(576);
        let stream = enc.finish();
        // the exact edge-to-edge setup for a 576 dot head
        assert_eq!(
            &[0x1B, 0x40, 0x1D, 0x4C, 0x00, 0x00, 0x1D, 0x57, 0x40, 0x02],
            &stream[..]
        );
    }

    #[test]
    fn test_row_framing() {
        let mut enc = RasterEncoder::new(16);
        enc.push_row(&[0xAA, 0x55]).unwrap();
        let stream = enc.finish();
        let cmd = &stream[10..];
        assert_eq!(
            &[0x1D, b'v', b'0', 0x00, 0x02, 0x00, 0x01, 0x00, 0xAA, 0x55],
            cmd
        );
    }

    #[test]
    fn test_round_trip_dimensions() {
        let rows: Vec<[u8; 9]> = (0..33).map(|i| [i as u8; 9]).collect();
        let stream = encode_page(72, rows.iter().map(|r| &r[..])).unwrap();
        let summary = summarize(&stream[..]).unwrap();
        assert_eq!(Some(72), summary.print_area_width);
        assert_eq!(33, summary.raster_rows);
        assert_eq!(Some(9), summary.bytes_per_row);
    }

    #[test]
    fn test_decode_command_sequence() {
        let stream = encode_page(8, [&[0xFFu8][..]]).unwrap();
        let mut dec = Decoder::new(&stream[..]);
        assert!(matches!(dec.advance().unwrap(), Command::Init));
        assert!(matches!(dec.advance().unwrap(), Command::LeftMargin(0)));
        assert!(matches!(dec.advance().unwrap(), Command::PrintAreaWidth(8)));
        match dec.advance().unwrap() {
            Command::Raster(block) => {
                assert_eq!(1, block.bytes_per_row);
                assert_eq!(1, block.rows);
                assert_eq!(&[0xFF], block.as_bytes());
            }
            other => panic!("expected raster block, got {:?}", other),
        }
        assert!(matches!(dec.advance().unwrap(), Command::FeedLines(2)));
        assert!(matches!(
            dec.advance().unwrap(),
            Command::Cut { mode: 0x42, feed: 0 }
        ));
        assert!(matches!(dec.advance().unwrap(), Command::Eof));
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let data = [0x1D, b'v', b'0', 0x00, 0x02, 0x00, 0x01, 0x00, 0xAA];
        let mut dec = Decoder::new(&data[..]);
        assert!(dec.advance().is_err());
    }
}
