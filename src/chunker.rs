//! Recursive separator chunking for document pages.
//!
//! Splits page text on progressively finer separators (paragraph break, line
//! break, sentence end, space, and finally single characters) until every
//! piece fits the configured size, then greedily re-merges consecutive pieces
//! into chunks, carrying a trailing overlap across chunk boundaries so
//! adjacent chunks share context.
//!
//! All sizes, offsets, and the overlap are measured in characters, never
//! bytes; slicing is always char-boundary safe.

use thiserror::Error;
use tracing::debug;

use crate::types::{Chunk, Page};

/// Separator ladder, coarsest to finest. The character-level fallback is
/// implicit and guarantees termination.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkerError {
    #[error("chunk overlap ({overlap}) must be smaller than max chunk size ({max_chunk_size})")]
    OverlapExceedsChunkSize {
        max_chunk_size: usize,
        overlap: usize,
    },

    #[error("max chunk size must be positive")]
    ZeroChunkSize,
}

/// Splits pages into bounded, overlapping chunks.
///
/// Construction validates the size configuration up front so a bad
/// overlap/size pair fails before any chunking occurs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self, ChunkerError> {
        if max_chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if overlap >= max_chunk_size {
            return Err(ChunkerError::OverlapExceedsChunkSize {
                max_chunk_size,
                overlap,
            });
        }
        Ok(Self {
            max_chunk_size,
            overlap,
        })
    }

    /// Split every page into chunks, assigning dense ids in emission order.
    ///
    /// An empty page yields no chunks; a page no longer than the configured
    /// size yields exactly one chunk at offset 0. Overlap is never carried
    /// across page boundaries.
    pub fn split(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            self.split_page(page, &mut chunks);
        }
        debug!(
            pages = pages.len(),
            chunks = chunks.len(),
            max_chunk_size = self.max_chunk_size,
            overlap = self.overlap,
            "chunking complete"
        );
        chunks
    }

    fn split_page(&self, page: &Page, out: &mut Vec<Chunk>) {
        if page.text.is_empty() {
            return;
        }

        let mut pieces = Vec::new();
        collect_pieces(
            &page.text,
            0,
            &SEPARATORS,
            self.max_chunk_size,
            &mut pieces,
        );

        // Greedy re-merge: accumulate pieces into the current chunk while the
        // overlap prefix plus content stays within the bound.
        let mut prefix = String::new();
        let mut prefix_len = 0usize;
        let mut content = String::new();
        let mut content_len = 0usize;
        let mut content_start = 0usize;

        for piece in pieces {
            if content_len > 0 && prefix_len + content_len + piece.char_len > self.max_chunk_size {
                let emitted = emit_chunk(
                    out,
                    page.index,
                    &prefix,
                    prefix_len,
                    &content,
                    content_start,
                );

                // Seed the next chunk's overlap from the tail of the one just
                // emitted, shortened so the next piece still fits the bound.
                let budget = self.max_chunk_size - piece.char_len;
                let want = self.overlap.min(budget);
                let (tail, tail_len) = tail_chars(&emitted, want);
                prefix = tail;
                prefix_len = tail_len;
                content.clear();
                content_len = 0;
            }

            if content_len == 0 {
                content_start = piece.offset;
            }
            content.push_str(piece.text);
            content_len += piece.char_len;
        }

        if content_len > 0 {
            emit_chunk(
                out,
                page.index,
                &prefix,
                prefix_len,
                &content,
                content_start,
            );
        }
    }
}

/// A contiguous slice of page text produced by the recursive split, tagged
/// with its character offset within the page.
struct Piece<'a> {
    offset: usize,
    text: &'a str,
    char_len: usize,
}

/// Recursively split `text` (starting at character `offset` within its page)
/// until every produced piece is at most `max` characters.
///
/// Splits are inclusive: the separator stays attached to the preceding piece,
/// so concatenating the pieces reproduces `text` exactly.
fn collect_pieces<'a>(
    text: &'a str,
    offset: usize,
    seps: &[&str],
    max: usize,
    out: &mut Vec<Piece<'a>>,
) {
    let len = char_len(text);
    if len <= max {
        out.push(Piece {
            offset,
            text,
            char_len: len,
        });
        return;
    }

    let Some((sep, finer)) = seps.split_first() else {
        // Character-level fallback: hard cuts every `max` characters.
        let mut rest = text;
        let mut pos = offset;
        while !rest.is_empty() {
            let (head, tail) = split_at_chars(rest, max);
            let head_len = char_len(head);
            out.push(Piece {
                offset: pos,
                text: head,
                char_len: head_len,
            });
            pos += head_len;
            rest = tail;
        }
        return;
    };

    let mut pos = offset;
    for part in text.split_inclusive(sep) {
        let part_len = char_len(part);
        if part_len <= max {
            out.push(Piece {
                offset: pos,
                text: part,
                char_len: part_len,
            });
        } else {
            collect_pieces(part, pos, finer, max, out);
        }
        pos += part_len;
    }
}

fn emit_chunk(
    out: &mut Vec<Chunk>,
    source_page: usize,
    prefix: &str,
    prefix_len: usize,
    content: &str,
    content_start: usize,
) -> String {
    let text = format!("{prefix}{content}");
    out.push(Chunk {
        id: out.len(),
        text: text.clone(),
        source_page,
        offset: content_start - prefix_len,
    });
    text
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split after the first `n` characters (not bytes).
fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

/// The last `n` characters of `s` (all of `s` when shorter), with its length.
fn tail_chars(s: &str, n: usize) -> (String, usize) {
    let total = char_len(s);
    let skip = total.saturating_sub(n);
    let (_, tail) = split_at_chars(s, skip);
    (tail.to_string(), total - skip)
}
