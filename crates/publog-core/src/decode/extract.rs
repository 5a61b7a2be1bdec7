//! Text-likelihood fallback extraction.
//!
//! When a container cannot be decoded, the file frequently still carries
//! its tabular text behind some binary framing. This extractor locates the
//! first offset whose surrounding bytes plausibly look like tab-separated
//! text and strips the remaining binary noise from there on. It has no
//! failure mode: when nothing qualifies, the whole buffer is cleaned from
//! offset 0.

use tracing::debug;

/// Default number of leading bytes scanned for a text start
const DEFAULT_SCAN_LIMIT: usize = 1024;

/// Default window length scored at each candidate offset
const DEFAULT_WINDOW_LEN: usize = 100;

/// Default minimum ratio of printable characters within a window
const DEFAULT_MIN_PRINTABLE_RATIO: f64 = 0.8;

/// Configuration for the text-likelihood extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Number of leading bytes scanned for a plausible text start
    pub scan_limit: usize,
    /// Window length scored at each candidate offset
    pub window_len: usize,
    /// Minimum printable-character ratio for a window to qualify
    pub min_printable_ratio: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            scan_limit: DEFAULT_SCAN_LIMIT,
            window_len: DEFAULT_WINDOW_LEN,
            min_printable_ratio: DEFAULT_MIN_PRINTABLE_RATIO,
        }
    }
}

impl ExtractorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of leading bytes scanned for a text start
    pub fn scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Sets the window length scored at each candidate offset
    pub fn window_len(mut self, len: usize) -> Self {
        self.window_len = len;
        self
    }

    /// Sets the minimum printable-character ratio
    pub fn min_printable_ratio(mut self, ratio: f64) -> Self {
        self.min_printable_ratio = ratio;
        self
    }
}

/// Fallback extractor that recovers plausible tabular text from a buffer
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    config: ExtractorConfig,
}

impl TextExtractor {
    /// Creates a new extractor with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extracts cleaned text content from a raw buffer.
    ///
    /// Scans for the first plausible text start, then drops NUL bytes and
    /// control bytes below 0x20 except tab, line feed, and carriage return.
    /// Never fails; an empty buffer yields empty output.
    pub fn extract(&self, data: &[u8]) -> Vec<u8> {
        let start = self.find_text_start(data);
        debug!("extracting text from offset {} of {} bytes", start, data.len());

        data[start..].iter().copied().filter(|&b| keep_byte(b)).collect()
    }

    /// Finds the first offset whose window scores as plausible tabular text.
    ///
    /// Candidates must start on a text-like byte and have a full window of
    /// data ahead. When nothing in the scanned range qualifies, the start
    /// defaults to 0 and the caller cleans the whole buffer.
    fn find_text_start(&self, data: &[u8]) -> usize {
        let limit = self.config.scan_limit.min(data.len());

        for i in 0..limit {
            if !is_text_byte(data[i]) || i + self.config.window_len > data.len() {
                continue;
            }
            let window = &data[i..i + self.config.window_len];
            if looks_like_table_text(window, self.config.min_printable_ratio) {
                return i;
            }
        }

        0
    }
}

/// Bytes that may open a tabular-text region
fn is_text_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'\t' | b'\n' | b'\r' | b' ')
}

/// Control bytes below 0x20 are stripped except tab, LF, and CR
fn keep_byte(b: u8) -> bool {
    b != 0 && (b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r'))
}

/// Scores a window as plausible tab-separated text.
///
/// The window must contain a tab and an alphanumeric character, and its
/// printable ratio under lossy UTF-8 decoding must exceed the threshold.
/// Replacement characters from undecodable bytes count as non-printable.
fn looks_like_table_text(window: &[u8], min_printable_ratio: f64) -> bool {
    let text = String::from_utf8_lossy(window);

    let mut total = 0usize;
    let mut printable = 0usize;
    let mut has_tab = false;
    let mut has_alnum = false;

    for c in text.chars() {
        total += 1;
        if c == '\t' {
            has_tab = true;
        }
        if c.is_alphanumeric() {
            has_alnum = true;
        }
        if matches!(c, '\t' | '\n' | '\r')
            || (!c.is_control() && c != char::REPLACEMENT_CHARACTER)
        {
            printable += 1;
        }
    }

    if total == 0 {
        return false;
    }

    has_tab && has_alnum && (printable as f64 / total as f64) > min_printable_ratio
}
