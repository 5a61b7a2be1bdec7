//! # publog-core
//!
//! A library for decoding and consolidating PUB LOG / FED LOG catalog data.
//!
//! The catalog distribution ships its tables as `V_*.TAB` files wrapped in a
//! proprietary `IMD2` container with an undocumented compression scheme.
//! This crate provides the core functionality for:
//!
//! - Detecting the container signature and locating the payload
//! - Reconstructing the tab-separated text through a best-effort run-length
//!   decoder, with a text-likelihood fallback when the container is unusable
//! - Reading the item master, part cross-reference, and CAGE address tables
//! - Joining the three tables into import-ready records
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`decode`]: container sniffing, marker-based decoding, text fallback
//! - [`table`]: tab-separated table readers
//! - [`consolidate`]: record joining and CSV output
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use publog_core::{decode_file, read_items, Consolidator};
//!
//! // Decode a container and parse its item rows
//! let decoded = decode_file("V_FLIS_NSN.TAB")?;
//! let items = read_items(decoded.as_bytes());
//!
//! // Join into import-ready records
//! let mut consolidator = Consolidator::new();
//! consolidator.add_items(items);
//! let records = consolidator.consolidate();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! The [`DecodeStrategy`] trait allows plugging in an alternative payload
//! decoder while keeping the container handling and fallback behavior.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod consolidate;
pub mod decode;
pub mod error;
pub mod table;

// Re-export primary types for convenience
pub use consolidate::{write_csv, ConsolidatedRecord, Consolidator};
pub use decode::{
    decode_bytes, decode_file, DecodeMethod, DecodeStrategy, DecodedBuffer, ExtractorConfig,
    MarkerDecoder, RawContainer, TextExtractor,
};
pub use error::{Error, Result};
pub use table::{read_cages, read_items, read_parts, CageRecord, ItemRecord, PartRecord};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of a structurally valid NSN (4-character FSC + 9-character NIIN)
pub const NSN_LEN: usize = 13;
