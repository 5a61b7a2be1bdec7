//! Marker-based run-length expansion.
//!
//! The IMD2 payload compression is undocumented. Decompressed captures
//! suggest a run is encoded as `0x00 <count> <value>` with `count` strictly
//! between 0 and 0x80; the decoder expands those runs and copies every
//! other byte verbatim. There is no checksum or terminator to verify
//! against, so the output is a reconstruction, not a proven decompression.

use crate::decode::{DecodeStrategy, RawContainer, MIN_CONTAINER_LEN};
use crate::error::{Error, Result};
use tracing::trace;

/// Byte that opens a candidate run marker
const RUN_MARKER: u8 = 0x00;

/// Exclusive upper bound for a plausible run count
const MAX_RUN_COUNT: u8 = 0x80;

/// Decoder for the marker-based run-length scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerDecoder;

impl MarkerDecoder {
    /// Creates a new marker decoder
    pub fn new() -> Self {
        Self
    }
}

impl DecodeStrategy for MarkerDecoder {
    /// Expands the container payload.
    ///
    /// Fails with [`Error::InvalidContainer`] when the whole buffer is
    /// shorter than the 8-byte minimum; never fails afterwards.
    fn decode(&self, container: &RawContainer<'_>) -> Result<Vec<u8>> {
        let total = container.as_bytes().len();
        if total < MIN_CONTAINER_LEN {
            return Err(Error::invalid_container(total));
        }

        Ok(expand(container.payload()))
    }
}

/// Expands run markers in a payload, copying everything else verbatim.
///
/// A marker only counts when all three bytes are present; a trailing
/// `0x00 <count>` without a value byte is copied as-is.
fn expand(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len());
    let mut runs = 0usize;
    let mut i = 0;

    while i < payload.len() {
        if payload[i] == RUN_MARKER && i + 2 < payload.len() {
            let count = payload[i + 1];
            if count > 0 && count < MAX_RUN_COUNT {
                let value = payload[i + 2];
                out.resize(out.len() + count as usize, value);
                runs += 1;
                i += 3;
                continue;
            }
        }

        out.push(payload[i]);
        i += 1;
    }

    trace!("expanded {} run markers", runs);
    out
}
