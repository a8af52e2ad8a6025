// ============================================================
// Layer 5 - TF-IDF Transformer
// ============================================================
// Second pipeline stage: term counts → weighted, normalised vectors.
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1      (smoothed)
//   x'     = l2_normalise(tf * idf)             (use_idf = true)
//   x'     = l2_normalise(tf)                   (use_idf = false)
//
// The "+1" terms act as if one extra document contained every
// term once, so no idf is ever zero or infinite. `use_idf` is
// one of the two knobs the grid search tunes.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::ml::sparse::CsrMatrix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfTransformer {
    use_idf: bool,
    idf:     Option<Vec<f64>>,
}

impl TfidfTransformer {
    pub fn new(use_idf: bool) -> Self {
        Self { use_idf, idf: None }
    }

    #[cfg(test)]
    pub fn use_idf(&self) -> bool {
        self.use_idf
    }

    /// Learn per-term idf weights from a count matrix.
    /// Without idf there is nothing to learn.
    pub fn fit(&mut self, counts: &CsrMatrix) -> Result<()> {
        if !self.use_idf {
            self.idf = None;
            return Ok(());
        }
        let n = counts.n_rows() as f64;
        let idf = counts
            .document_frequency()
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        self.idf = Some(idf);
        Ok(())
    }

    pub fn transform(&self, counts: &CsrMatrix) -> Result<CsrMatrix> {
        let mut out = counts.clone();
        if self.use_idf {
            let Some(idf) = &self.idf else {
                bail!("TfidfTransformer is not fitted");
            };
            if idf.len() != counts.n_cols() {
                bail!(
                    "TfidfTransformer was fitted on {} features, got {}",
                    idf.len(),
                    counts.n_cols()
                );
            }
            out.scale_columns(idf);
        }
        out.normalize_rows_l2();
        Ok(out)
    }

    pub fn fit_transform(&mut self, counts: &CsrMatrix) -> Result<CsrMatrix> {
        self.fit(counts)?;
        self.transform(counts)
    }

    #[cfg(test)]
    pub fn idf(&self) -> Option<&[f64]> {
        self.idf.as_deref()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> CsrMatrix {
        // 3 documents, 2 terms; term 0 everywhere, term 1 only in doc 2
        let mut m = CsrMatrix::new(2);
        m.push_row(vec![(0, 1.0)]);
        m.push_row(vec![(0, 2.0)]);
        m.push_row(vec![(0, 1.0), (1, 1.0)]);
        m
    }

    #[test]
    fn test_smoothed_idf() {
        let mut t = TfidfTransformer::new(true);
        t.fit(&counts()).unwrap();
        let idf = t.idf().unwrap();
        // term 0: ln(4/4) + 1 = 1
        assert!((idf[0] - 1.0).abs() < 1e-12);
        // term 1: ln(4/2) + 1
        assert!((idf[1] - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        for use_idf in [true, false] {
            let mut t = TfidfTransformer::new(use_idf);
            let m = t.fit_transform(&counts()).unwrap();
            for i in 0..m.n_rows() {
                let norm: f64 = m.row(i).1.iter().map(|v| v * v).sum();
                assert!((norm - 1.0).abs() < 1e-12, "row {i} use_idf={use_idf}");
            }
        }
    }

    #[test]
    fn test_rare_term_weighs_more_with_idf() {
        let mut with_idf = TfidfTransformer::new(true);
        let mut plain    = TfidfTransformer::new(false);
        let a = with_idf.fit_transform(&counts()).unwrap();
        let b = plain.fit_transform(&counts()).unwrap();
        assert!(a.get(2, 1) > b.get(2, 1));
    }

    #[test]
    fn test_transform_before_fit_fails_with_idf() {
        let t = TfidfTransformer::new(true);
        assert!(t.transform(&counts()).is_err());
        // without idf nothing needs fitting
        assert!(TfidfTransformer::new(false).transform(&counts()).is_ok());
    }
}
