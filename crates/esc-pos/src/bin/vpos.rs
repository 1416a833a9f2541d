use std::{
    io::{self, BufReader},
    path::PathBuf,
};

use esc_pos::{Command, Decoder};
use image::{GrayImage, Luma};

#[derive(clap::Parser)]
/// Virtual printer: render a captured ESC/POS raster stream to a PNG
struct Opts {
    /// Path to the captured stream
    pub path: PathBuf,

    /// The output image
    pub out: PathBuf,

    #[clap(long)]
    /// Print every decoded command
    pub trace: bool,
}

fn main() -> io::Result<()> {
    let opts: Opts = clap::Parser::parse();

    let file = std::fs::File::open(&opts.path)?;
    let reader = BufReader::new(file);
    let mut decoder = Decoder::new(reader);

    let mut bytes_per_row: u32 = 0;
    let mut rows: Vec<u8> = Vec::new();
    let mut row_count: u32 = 0;

    loop {
        let command = decoder.advance()?;
        if opts.trace {
            println!("{:?}", command);
        }
        match command {
            Command::Eof => break,
            Command::Raster(block) => {
                if bytes_per_row == 0 {
                    bytes_per_row = u32::from(block.bytes_per_row);
                } else if bytes_per_row != u32::from(block.bytes_per_row) {
                    eprintln!("WARN: raster width changed mid-stream");
                    continue;
                }
                rows.extend_from_slice(block.as_bytes());
                row_count += u32::from(block.rows);
            }
            _ => {}
        }
    }

    if bytes_per_row == 0 || row_count == 0 {
        eprintln!("No raster data in {}", opts.path.display());
        return Ok(());
    }

    let width = bytes_per_row * 8;
    let mut output = GrayImage::from_pixel(width, row_count, Luma([0xFF]));
    for (y, row) in rows.chunks_exact(bytes_per_row as usize).enumerate() {
        for x in 0..width {
            let bit = (row[(x / 8) as usize] >> (7 - x % 8)) & 1;
            if bit == 1 {
                *output.get_pixel_mut(x, y as u32) = Luma([0x00]);
            }
        }
    }
    println!("Decoded {} rows of {} dots", row_count, width);
    output
        .save(&opts.out)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(())
}
