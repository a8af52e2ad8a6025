// ============================================================
// Layer 5 - Count Vectorizer
// ============================================================
// First pipeline stage: raw text → sparse term-count matrix.
//
//   fit:       lowercase every document, run the tokenizer, and
//              collect every distinct token into a vocabulary.
//              Token ids are assigned in alphabetical order.
//   transform: count each known token per document; tokens not
//              in the vocabulary are ignored.
//
// Example with vocabulary {food: 0, need: 1, water: 2}:
//   "need water, need food"  →  [1, 2, 1]   (stored sparse)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::data::tokenizer::tokenize;
use crate::ml::sparse::CsrMatrix;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountVectorizer {
    vocabulary: Option<BTreeMap<String, u32>>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the vocabulary from `documents`.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let terms: BTreeSet<String> = documents
            .iter()
            .flat_map(|doc| analyze(doc))
            .collect();

        if terms.is_empty() {
            bail!("empty vocabulary; the documents contain no tokens");
        }

        // BTreeSet iterates in sorted order, so ids are alphabetical
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term, id as u32))
            .collect();

        self.vocabulary = Some(vocabulary);
        Ok(())
    }

    /// Count known tokens of each document.
    pub fn transform(&self, documents: &[String]) -> Result<CsrMatrix> {
        let Some(vocabulary) = &self.vocabulary else {
            bail!("CountVectorizer is not fitted");
        };

        let mut matrix = CsrMatrix::new(vocabulary.len());
        for doc in documents {
            let mut counts: HashMap<u32, f64> = HashMap::new();
            for token in analyze(doc) {
                if let Some(&id) = vocabulary.get(&token) {
                    *counts.entry(id).or_insert(0.0) += 1.0;
                }
            }
            matrix.push_row(counts.into_iter().collect());
        }
        Ok(matrix)
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<CsrMatrix> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Number of learned terms (0 before fitting)
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, BTreeMap::len)
    }

    #[cfg(test)]
    pub fn vocabulary(&self) -> Option<&BTreeMap<String, u32>> {
        self.vocabulary.as_ref()
    }
}

/// Lowercase, then tokenize. Empty tokens never become features.
fn analyze(document: &str) -> Vec<String> {
    let lowered = document.to_lowercase();
    tokenize(&lowered).filter(|t| !t.is_empty()).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut v = CountVectorizer::new();
        v.fit(&docs(&["need water", "Need food"])).unwrap();
        let vocab = v.vocabulary().unwrap();
        let ids: Vec<(&str, u32)> = vocab.iter().map(|(k, &id)| (k.as_str(), id)).collect();
        assert_eq!(ids, vec![("food", 0), ("need", 1), ("water", 2)]);
    }

    #[test]
    fn test_counts_tokens() {
        let mut v = CountVectorizer::new();
        let m = v.fit_transform(&docs(&["need water, need food"])).unwrap();
        // vocabulary: "," food need water
        assert_eq!(v.vocabulary_size(), 4);
        let need  = v.vocabulary().unwrap()["need"];
        let water = v.vocabulary().unwrap()["water"];
        assert_eq!(m.get(0, need), 2.0);
        assert_eq!(m.get(0, water), 1.0);
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let mut v = CountVectorizer::new();
        v.fit(&docs(&["water"])).unwrap();
        let m = v.transform(&docs(&["earthquake"])).unwrap();
        assert_eq!(m.n_rows(), 1);
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn test_plural_and_singular_share_a_column() {
        let mut v = CountVectorizer::new();
        let m = v.fit_transform(&docs(&["Tents", "tent"])).unwrap();
        assert_eq!(v.vocabulary_size(), 1);
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let mut v = CountVectorizer::new();
        assert!(v.fit(&docs(&["", "   "])).is_err());
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let v = CountVectorizer::new();
        assert!(v.transform(&docs(&["water"])).is_err());
    }
}
