//! Container decoding module.
//!
//! This module recovers the tab-separated text carried inside `V_*.TAB`
//! containers.
//!
//! ## Algorithm Overview
//!
//! 1. Sniff the 4-byte `IMD2` signature to locate the payload
//! 2. Expand the payload with the marker-based run-length decoder
//! 3. If the container is structurally unusable, salvage what text the
//!    buffer still carries with the [`TextExtractor`] fallback
//!
//! The compression scheme is undocumented; the marker decoder is a
//! best-effort reconstruction and its output is never verified against the
//! original plaintext. The pipeline as a whole is total: every input buffer
//! produces a [`DecodedBuffer`], tagged with the path that produced it.
//!
//! ## Extensibility
//!
//! The [`DecodeStrategy`] trait allows custom payload decoders:
//!
//! ```no_run
//! use publog_core::decode::{DecodeStrategy, RawContainer};
//! use publog_core::Result;
//!
//! struct CustomDecoder;
//!
//! impl DecodeStrategy for CustomDecoder {
//!     fn decode(&self, container: &RawContainer<'_>) -> Result<Vec<u8>> {
//!         // Custom decoding logic
//!         Ok(container.payload().to_vec())
//!     }
//! }
//! ```

mod extract;
mod rle;

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

pub use extract::{ExtractorConfig, TextExtractor};
pub use rle::MarkerDecoder;

/// Container signature carried by compressed TAB files
pub const SIGNATURE: &[u8; 4] = b"IMD2";

/// Signature plus the 4-byte length field that follows it
pub const HEADER_LEN: usize = 8;

/// Minimum buffer length the marker decoder will accept
pub const MIN_CONTAINER_LEN: usize = 8;

/// A raw input buffer with its detected container framing
#[derive(Debug, Clone, Copy)]
pub struct RawContainer<'a> {
    data: &'a [u8],
    signature: bool,
    payload_offset: usize,
}

impl<'a> RawContainer<'a> {
    /// Detects the container signature and payload offset for a buffer.
    ///
    /// A missing signature is not an error: a warning is logged and the
    /// whole buffer is treated as payload.
    pub fn sniff(data: &'a [u8]) -> Self {
        if data.len() >= SIGNATURE.len() && &data[..SIGNATURE.len()] == SIGNATURE {
            debug!("IMD2 signature found, payload at offset {}", HEADER_LEN);
            Self {
                data,
                signature: true,
                payload_offset: HEADER_LEN,
            }
        } else {
            warn!("no IMD2 signature found, decoding from offset 0");
            Self {
                data,
                signature: false,
                payload_offset: 0,
            }
        }
    }

    /// Returns the full underlying buffer
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// True when the container signature was present
    pub fn has_signature(&self) -> bool {
        self.signature
    }

    /// Offset of the compressed payload within the buffer
    pub fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// The payload bytes following the container header
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.payload_offset.min(self.data.len())..]
    }
}

/// Which producer built a [`DecodedBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMethod {
    /// Marker-based run-length expansion
    Marker,
    /// Text-likelihood fallback extraction
    TextLikelihood,
}

impl DecodeMethod {
    /// Short label for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeMethod::Marker => "marker",
            DecodeMethod::TextLikelihood => "text-likelihood",
        }
    }
}

/// Decoded byte content of a single input file
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    data: Vec<u8>,
    method: DecodeMethod,
}

impl DecodedBuffer {
    /// Creates a decoded buffer tagged with its producer
    pub fn new(data: Vec<u8>, method: DecodeMethod) -> Self {
        Self { data, method }
    }

    /// Returns the decoded content as a slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns the decoded content
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Which decoding path produced this buffer
    pub fn method(&self) -> DecodeMethod {
        self.method
    }

    /// Length of the decoded content in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the decoded content is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Trait for implementing custom payload decoders
///
/// This trait allows you to plug in a different reconstruction algorithm
/// while keeping the container sniffing and fallback behavior.
pub trait DecodeStrategy: Send + Sync {
    /// Decode the container payload into reconstructed bytes
    fn decode(&self, container: &RawContainer<'_>) -> Result<Vec<u8>>;
}

/// Decodes a raw TAB buffer, falling back to text extraction when the
/// container is unusable.
///
/// This never fails: when the [`MarkerDecoder`] rejects the buffer, the
/// [`TextExtractor`] salvages whatever tabular text it can. The returned
/// buffer records which path produced it.
pub fn decode_bytes(data: &[u8]) -> DecodedBuffer {
    decode_bytes_with(&MarkerDecoder::new(), data)
}

/// Decodes with a caller-provided strategy, keeping the fallback behavior
pub fn decode_bytes_with(strategy: &dyn DecodeStrategy, data: &[u8]) -> DecodedBuffer {
    let container = RawContainer::sniff(data);

    match strategy.decode(&container) {
        Ok(decoded) => {
            debug!("decoded {} bytes into {}", data.len(), decoded.len());
            DecodedBuffer::new(decoded, DecodeMethod::Marker)
        }
        Err(e) => {
            debug!("decoder unusable ({}), extracting text instead", e);
            let extracted = TextExtractor::new().extract(data);
            DecodedBuffer::new(extracted, DecodeMethod::TextLikelihood)
        }
    }
}

/// Reads and decodes a single container file.
///
/// This is a convenience function that reads the file and decodes it; only
/// the read itself can fail.
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedBuffer> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(decode_bytes(&data))
}
