#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # ticket-core
//!
//! The rendering core of *boltpress*: turns a [content::TicketContent]
//! into a pixel-exact 1-bit [raster::Canvas] using deterministic
//! typography rules. Rendering the same ticket twice produces a
//! byte-identical canvas; everything here is pure computation with a
//! single `log` dependency for diagnostics.
//!
//! The pipeline is two-phase: [layout::compose] always finishes the whole
//! canvas before any encoder or output sink sees a byte.

pub mod content;
pub mod due;
pub mod fonts;
pub mod layout;
pub mod qr;
pub mod raster;
pub mod typeset;
pub mod urgency;

#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use image;
