// ============================================================
// Layer 4 - Message Tokenizer
// ============================================================
// Turns one raw message into clean word tokens:
//
//   "Running dogs!"  →  ["running", "dog", "!"]
//
// Steps per token:
//   1. Split on Unicode word boundaries (UAX #29). Punctuation
//      segments are kept as their own tokens, whitespace is dropped
//   2. Lowercase
//   3. Lemmatize to the noun base form (see lemmatizer.rs)
//   4. Trim surrounding whitespace
//
// The result is a lazy iterator: nothing is segmented until the
// caller pulls tokens, and cloning the iterator restarts it from
// the same position.
//
// Reference: unicode-segmentation crate documentation
//            Rust Book §13 (Iterators)

use unicode_segmentation::{UWordBounds, UnicodeSegmentation};

use crate::data::lemmatizer::Lemmatizer;

/// Tokenize a message. Empty or whitespace-only input yields nothing.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        segments:   text.split_word_bounds(),
        lemmatizer: Lemmatizer::new(),
    }
}

/// Lazy, finite token stream returned by [`tokenize`].
#[derive(Clone)]
pub struct Tokens<'a> {
    segments:   UWordBounds<'a>,
    lemmatizer: Lemmatizer,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for segment in self.segments.by_ref() {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let lemma = self.lemmatizer.lemmatize(&segment.to_lowercase());
            return Some(lemma.trim().to_string());
        }
        None
    }
}
