//! # boltpress
//!
//! Render task tickets into fixed-width thermal printer rasters and emit
//! them to a printer device or as PNG/PDF files.
#![warn(missing_docs)]

mod cli;
mod print;

use cli::opt::Options;

fn main() -> color_eyre::Result<()> {
    let opt: Options = cli::init()?;
    cli::render::run(&opt)
}
