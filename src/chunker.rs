//! Document segmentation into model-sized chunks.
//!
//! Text is split on blank-line paragraph boundaries first, then whole
//! paragraphs are packed into chunks between a lower and an upper word
//! bound. A paragraph that alone exceeds the upper bound is split at
//! sentence boundaries instead. A sentence is never cut in the middle, so
//! chunks may exceed the upper bound when a single sentence does.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{CHUNK_SEPARATOR, DEFAULT_MAX_CHUNK_WORDS, DEFAULT_MIN_CHUNK_WORDS};

/// Sentence-ending punctuation
const SENTENCE_DELIMITERS: [char; 3] = ['.', '!', '?'];

/// Splits documents into ordered chunks sized for per-chunk inference.
pub struct TextChunker {
    /// Matches one or more blank lines between paragraphs
    paragraph_regex: Regex,
    /// Flush the pending buffer once it holds at least this many words
    min_words: usize,
    /// Upper bound on words per chunk, soft only for single oversized sentences
    max_words: usize,
}

impl TextChunker {
    /// Create a chunker with the default word bounds.
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_MIN_CHUNK_WORDS, DEFAULT_MAX_CHUNK_WORDS)
    }

    /// Create a chunker with custom word bounds.
    pub fn with_bounds(min_words: usize, max_words: usize) -> Self {
        Self {
            paragraph_regex: Regex::new(r"(?:\r?\n){2,}").expect("invalid paragraph regex"),
            min_words,
            max_words,
        }
    }

    /// Split a document into ordered chunks.
    ///
    /// Every chunk is a sequence of whole paragraphs joined with
    /// [`CHUNK_SEPARATOR`], except chunks carved out of an oversized
    /// paragraph, which are sentence runs joined with single spaces. Always
    /// returns at least one chunk: input with no usable paragraphs comes
    /// back verbatim as the sole chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<&str> = self
            .paragraph_regex
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut chunks: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        let mut pending_words = 0;

        for paragraph in paragraphs {
            let paragraph_words = word_count(paragraph);

            if paragraph_words > self.max_words {
                // An oversized paragraph is chunked on its own; whatever is
                // buffered goes out first to preserve document order.
                if !pending.is_empty() {
                    chunks.push(pending.join(CHUNK_SEPARATOR));
                    pending.clear();
                    pending_words = 0;
                }
                chunks.extend(self.split_paragraph(paragraph));
                continue;
            }

            if pending_words + paragraph_words > self.max_words && !pending.is_empty() {
                chunks.push(pending.join(CHUNK_SEPARATOR));
                pending.clear();
                pending_words = 0;
            }

            pending.push(paragraph);
            pending_words += paragraph_words;

            if pending_words >= self.min_words {
                chunks.push(pending.join(CHUNK_SEPARATOR));
                pending.clear();
                pending_words = 0;
            }
        }

        if !pending.is_empty() {
            chunks.push(pending.join(CHUNK_SEPARATOR));
        }

        if chunks.is_empty() {
            chunks.push(text.to_string());
        }

        chunks
    }

    /// Split one oversized paragraph into sentence runs below the upper
    /// bound. A single sentence longer than the bound becomes a chunk of
    /// its own rather than being cut.
    fn split_paragraph(&self, paragraph: &str) -> Vec<String> {
        let mut chunks: Vec<String> = Vec::new();
        let mut parts: Vec<String> = Vec::new();
        let mut part_words = 0;

        for sentence in split_sentences(paragraph) {
            let sentence_words = word_count(&sentence);

            if part_words + sentence_words > self.max_words && !parts.is_empty() {
                chunks.push(parts.join(" "));
                parts.clear();
                part_words = 0;
            }

            parts.push(sentence);
            part_words += sentence_words;
        }

        if !parts.is_empty() {
            chunks.push(parts.join(" "));
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a document with the default word bounds.
pub fn split_text(text: &str) -> Vec<String> {
    lazy_static! {
        static ref CHUNKER: TextChunker = TextChunker::new();
    }
    CHUNKER.split(text)
}

/// Count whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text at sentence boundaries.
///
/// A boundary is `.`, `!` or `?` followed by whitespace; the whitespace is
/// consumed. A trailing fragment without closing punctuation is kept as a
/// sentence of its own.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if SENTENCE_DELIMITERS.contains(&c)
            && chars.peek().map_or(false, |next| next.is_whitespace())
        {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();

            while chars.peek().map_or(false, |next| next.is_whitespace()) {
                chars.next();
            }
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }

    sentences
}
