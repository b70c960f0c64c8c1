//! Splitting knowledge-base documents into retrieval chunks.
//!
//! A knowledge base document (a regulation summary, a protocol description,
//! a strategy guide) is too long to embed as a single unit, so it is cut into
//! overlapping chunks bounded by a maximum character length. Each chunk
//! becomes one row in the vector index and one embedding vector.
//!
//! Splitting happens in two phases:
//!
//! 1. The text is recursively segmented using an ordered list of delimiter
//!    patterns (headings, paragraph breaks, list markers, line breaks,
//!    spaces). More significant delimiters are tried first; a segment that is
//!    still too large falls through to the next delimiter, and ultimately to
//!    a plain character split. No segment ever exceeds the configured
//!    maximum length.
//! 2. Segments are packed greedily into chunks. When a chunk fills up, the
//!    next chunk re-starts from the trailing segments of the previous one,
//!    up to the configured overlap length, so that sentences cut near a
//!    boundary stay retrievable from both sides.
//!
//! Both phases are pure functions of the input text and the configuration,
//! so re-splitting the same document always yields the same chunk sequence.
//!
//! ```
//! use carbon_ai_context::text::TextSplitter;
//!
//! let splitter = TextSplitter::with_defaults("ghg_protocol_scopes.txt");
//! let text = "Scope 1 covers direct emissions. Scope 2 covers purchased electricity.";
//! let chunks = splitter.split(text);
//!
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].source, "ghg_protocol_scopes.txt");
//! assert_eq!(chunks[0].text, text);
//! ```

use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Delimiter patterns for plain-text and lightly formatted documents,
/// ordered from most to least significant.
///
/// - `^\s*#{1,6}\s+.*$`: headings
/// - `\n\n`: paragraph breaks
/// - `^\s*[-*+]\s+`: unordered list items
/// - `^\s*\d+\.\s+`: ordered list items
/// - `\n`: line breaks
/// - ` `: spaces, the most granular delimiter
pub const DEFAULT_TEXT_DELIMITERS: &[&str] = &[
    r"^\s*#{1,6}\s+.*$", // Headings
    r"\n\n",             // Paragraphs
    r"^\s*[-*+]\s+",     // Unordered list items
    r"^\s*\d+\.\s+",     // Ordered list items
    r"\n",               // Line breaks
    r" ",                // Spaces
];

/// Default maximum chunk length in characters.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 1000;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// A bounded-length slice of a source document, the unit of retrieval.
///
/// Chunks are created once at index-build time and are immutable afterwards;
/// the whole set is replaced when the index is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChunk {
    /// Identifier of the document this chunk was cut from (its file name).
    pub source: String,
    /// Position of this chunk within the document's chunk sequence (0-indexed).
    pub sequence: usize,
    /// Byte offset of the chunk's first character in the original document.
    pub offset: usize,
    /// The chunk text itself.
    pub text: String,
}

/// Configurable splitter that turns one document into a chunk sequence.
///
/// Holds the source identifier stamped onto every produced chunk, the
/// compiled delimiter stack, and the length/overlap bounds.
pub struct TextSplitter {
    source: String,
    delimiters: Vec<Regex>,
    max_chunk_len: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter with explicit delimiter patterns and bounds.
    ///
    /// `overlap` is clamped below `max_chunk_len` so every chunk is
    /// guaranteed to make forward progress through the document.
    ///
    /// # Panics
    ///
    /// Panics if any delimiter pattern is not a valid regular expression or
    /// if `max_chunk_len` is zero. Both indicate a programming error in the
    /// caller, not a data error.
    pub fn new(
        source: impl Into<String>,
        delimiter_patterns: &[&str],
        max_chunk_len: usize,
        overlap: usize,
    ) -> Self {
        assert!(max_chunk_len > 0, "max_chunk_len must be positive");
        let delimiters = delimiter_patterns
            .iter()
            .map(|&pattern| Regex::new(pattern).unwrap())
            .collect();

        TextSplitter {
            source: source.into(),
            delimiters,
            max_chunk_len,
            overlap: overlap.min(max_chunk_len.saturating_sub(1)),
        }
    }

    /// Create a splitter with the default delimiters and the default
    /// 1000-character chunks with 200-character overlap.
    pub fn with_defaults(source: impl Into<String>) -> Self {
        Self::new(
            source,
            DEFAULT_TEXT_DELIMITERS,
            DEFAULT_MAX_CHUNK_LEN,
            DEFAULT_CHUNK_OVERLAP,
        )
    }

    /// The configured maximum chunk length.
    pub fn max_chunk_len(&self) -> usize {
        self.max_chunk_len
    }

    /// The configured overlap length.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping chunks.
    ///
    /// Every chunk is at most `max_chunk_len` bytes; every byte of the input
    /// appears in at least one chunk; consecutive chunks share up to
    /// `overlap` bytes of trailing content, aligned to segment boundaries.
    /// An empty input produces no chunks.
    pub fn split(&self, text: &str) -> Vec<DocumentChunk> {
        let segments =
            self.split_recursively_into_segments(text, 0, self.max_chunk_len, 0);

        let mut chunks: Vec<DocumentChunk> = Vec::new();
        // Segment ranges making up the chunk currently being packed.
        let mut current: Vec<Range<usize>> = Vec::new();

        for segment in segments {
            let bounds = match (current.first(), current.last()) {
                (Some(first), Some(last)) => Some((first.start, last.end)),
                _ => None,
            };
            if let Some((start, end)) = bounds {
                if end - start + segment.len() > self.max_chunk_len {
                    chunks.push(self.emit(text, start, end, chunks.len()));
                    // The overlap carried into the next chunk must also leave
                    // room for the incoming segment.
                    let budget = self
                        .overlap
                        .min(self.max_chunk_len.saturating_sub(segment.len()));
                    current = overlap_suffix(&current, budget);
                }
            }
            current.push(segment);
        }

        if let (Some(first), Some(last)) = (current.first(), current.last()) {
            chunks.push(self.emit(text, first.start, last.end, chunks.len()));
        }

        chunks
    }

    fn emit(&self, text: &str, start: usize, end: usize, sequence: usize) -> DocumentChunk {
        DocumentChunk {
            source: self.source.clone(),
            sequence,
            offset: start,
            text: text[start..end].to_string(),
        }
    }

    // Recursively split the text into byte ranges no longer than
    // max_chunk_len, trying delimiters in significance order and falling back
    // to a character split once they are exhausted.
    fn split_recursively_into_segments(
        &self,
        text: &str,
        delimiter_idx: usize,
        max_chunk_len: usize,
        current_offset: usize,
    ) -> Vec<Range<usize>> {
        let mut result_segments: Vec<Range<usize>> = Vec::new();

        if text.is_empty() {
            return result_segments;
        }

        // Base case 1: the text already fits in one segment.
        if text.len() <= max_chunk_len {
            result_segments.push(current_offset..(current_offset + text.len()));
            return result_segments;
        }

        // Base case 2: all delimiters exhausted, split on character
        // boundaries so multi-byte characters are never cut.
        if delimiter_idx >= self.delimiters.len() {
            let mut local_start = 0;
            while local_start < text.len() {
                let local_end = floor_char_boundary(text, local_start + max_chunk_len);
                result_segments.push(current_offset + local_start..current_offset + local_end);
                local_start = local_end;
            }
            return result_segments;
        }

        let current_delimiter = &self.delimiters[delimiter_idx];
        let mut local_byte_start = 0;

        for mat in current_delimiter.find_iter(text) {
            if mat.start() > local_byte_start {
                let sub_text = &text[local_byte_start..mat.start()];
                result_segments.extend(self.split_recursively_into_segments(
                    sub_text,
                    delimiter_idx + 1,
                    max_chunk_len,
                    current_offset + local_byte_start,
                ));
            }
            // The delimiter itself is a segment so chunk concatenation keeps
            // the original spacing.
            result_segments
                .push(current_offset + mat.range().start..current_offset + mat.range().end);
            local_byte_start = mat.end();
        }

        if local_byte_start < text.len() {
            let sub_text = &text[local_byte_start..];
            result_segments.extend(self.split_recursively_into_segments(
                sub_text,
                delimiter_idx + 1,
                max_chunk_len,
                current_offset + local_byte_start,
            ));
        }

        result_segments
    }
}

/// Trailing segments of a just-emitted chunk totalling at most `budget`
/// bytes; they become the leading segments of the next chunk.
fn overlap_suffix(segments: &[Range<usize>], budget: usize) -> Vec<Range<usize>> {
    if budget == 0 {
        return Vec::new();
    }
    let end = match segments.last() {
        Some(last) => last.end,
        None => return Vec::new(),
    };
    let mut suffix_start = segments.len();
    while suffix_start > 0 && end - segments[suffix_start - 1].start <= budget {
        suffix_start -= 1;
    }
    segments[suffix_start..].to_vec()
}

/// Largest char boundary in `text` that is `<= index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}
