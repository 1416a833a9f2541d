//! Render a ticket file and hand it to the selected backend

use std::{fs, io::Cursor};

use color_eyre::eyre::{self, WrapErr};
use image::ImageFormat;
use log::info;
use ticket_core::{content::TicketContent, fonts::FontBank, layout, raster::Canvas};

use super::opt::{Format, Options};
use crate::print::{self, EncodedStream};

pub fn run(opt: &Options) -> eyre::Result<()> {
    let press = opt.press().wrap_err("Failed to read press configuration")?;

    let text = fs::read_to_string(&opt.file)
        .wrap_err_with(|| format!("Failed to open ticket file: `{}`", opt.file.display()))?;
    // an unknown due mode or urgency fails here, before any rendering
    let mut ticket: TicketContent = ron::from_str(&text)
        .wrap_err_with(|| format!("Invalid ticket file: `{}`", opt.file.display()))?;
    if ticket.id.is_empty() {
        ticket.id = derive_id(&ticket);
        info!("Assigned ticket id {}", ticket.id);
    }

    let bank = FontBank::load(&press.font_paths(), &press.sizes());
    let canvas = layout::compose(&ticket, &bank, &press.layout());
    info!(
        "Composed {}x{} dot canvas for ticket {}",
        canvas.width(),
        canvas.height(),
        ticket.short_id()
    );

    // the stream is complete before the sink sees a single byte
    let name = format!("ticket-{}.{}", ticket.short_id(), opt.format.extension());
    let bytes = match opt.format {
        Format::EscPos => encode_escpos(&canvas)?,
        Format::Png => encode_png(&canvas)?,
        Format::Pdf => encode_pdf(&canvas, &ticket)?,
    };

    let sink = print::select(
        press.device.as_deref(),
        &press.out_dir(),
        opt.format == Format::EscPos,
    );
    let result = sink
        .consume(EncodedStream { name, bytes })
        .wrap_err("Print attempt failed")?;
    info!(
        "Ticket {} sent to {} backend ({})",
        ticket.short_id(),
        result.backend,
        result.path.display()
    );
    Ok(())
}

fn encode_escpos(canvas: &Canvas) -> eyre::Result<Vec<u8>> {
    let width = u16::try_from(canvas.width()).wrap_err("Canvas too wide for ESC/POS")?;
    let stream = esc_pos::encode_page(width, canvas.rows())?;
    Ok(stream)
}

fn encode_png(canvas: &Canvas) -> eyre::Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    canvas
        .to_image()
        .write_to(&mut cursor, ImageFormat::Png)
        .wrap_err("PNG encoding failed")?;
    Ok(cursor.into_inner())
}

fn encode_pdf(canvas: &Canvas, ticket: &TicketContent) -> eyre::Result<Vec<u8>> {
    let image = ticket_pdf::PageImage {
        width: canvas.width(),
        height: canvas.height(),
        data: canvas.as_bytes(),
        dpi: ticket_pdf::DEFAULT_DPI,
    };
    let meta = ticket_pdf::Meta {
        title: Some(ticket.effective_title().into_owned()),
        author: ticket.author.clone(),
        producer: Some("boltpress".to_string()),
        creation: Some(ticket.created),
    };
    let mut out = Vec::new();
    ticket_pdf::write_pdf(&mut out, &image, &meta)?;
    Ok(out)
}

/// Stable id for tickets that arrive without one
fn derive_id(ticket: &TicketContent) -> String {
    // FNV-1a over the fields that distinguish a ticket
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let created = ticket.created.to_string();
    for b in ticket
        .title
        .bytes()
        .chain(ticket.body.bytes())
        .chain(created.bytes())
    {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    format!("{:08x}", (hash >> 32) as u32)
}
