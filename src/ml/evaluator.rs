// ============================================================
// Layer 5 - Evaluation
// ============================================================
// Predicts the held-out partition and writes one classification
// report per category:
//
//   Column Name:  related
//                 precision    recall  f1-score   support
//   ...
//   --------------------------------------------------
//
// The writer is generic so tests can capture the text; the
// binary passes stdout.

use anyhow::{bail, Result};
use std::io::Write;

use crate::domain::corpus::Corpus;
use crate::domain::traits::MultiLabelClassifier;
use crate::infra::metrics::ClassificationReport;

const SEPARATOR_WIDTH: usize = 50;

pub fn evaluate_model<M, W>(model: &M, test: &Corpus, out: &mut W) -> Result<()>
where
    M: MultiLabelClassifier + ?Sized,
    W: Write,
{
    let predicted = model.predict(test.messages())?;
    if predicted.dim() != test.labels().dim() {
        bail!(
            "model predicted shape {:?} for a test set of shape {:?}",
            predicted.dim(),
            test.labels().dim()
        );
    }

    for (k, category) in test.categories().iter().enumerate() {
        let report = ClassificationReport::new(test.category_labels(k), predicted.column(k))?;
        tracing::debug!(
            "{category}: accuracy {:.3}, weighted f1 {:.3}",
            report.accuracy(),
            report.weighted_avg().f1
        );

        writeln!(out, "Column Name:  {category}")?;
        writeln!(out, "{report}")?;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    }
    out.flush()?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Always predicts the stored matrix, whatever the input
    struct Fixed(Array2<i64>);

    impl MultiLabelClassifier for Fixed {
        fn fit(&mut self, _: &[String], _: &Array2<i64>) -> Result<()> {
            Ok(())
        }
        fn predict(&self, _: &[String]) -> Result<Array2<i64>> {
            Ok(self.0.clone())
        }
    }

    fn test_corpus() -> Corpus {
        Corpus::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ndarray::array![[1, 0], [0, 0], [1, 1], [0, 1]],
            vec!["water".into(), "food".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_one_report_per_category() {
        let corpus = test_corpus();
        let model  = Fixed(corpus.labels().clone());
        let mut out = Vec::new();
        evaluate_model(&model, &corpus, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Column Name:  ").count(), 2);
        assert!(text.contains("Column Name:  water\n"));
        assert!(text.contains("Column Name:  food\n"));
        assert_eq!(text.matches("precision").count(), 2);
        assert_eq!(text.matches(&"-".repeat(50)).count(), 2);
        assert!(text.contains("1.00"));
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let corpus = test_corpus();
        let model  = Fixed(Array2::zeros((4, 3)));
        assert!(evaluate_model(&model, &corpus, &mut Vec::new()).is_err());
    }
}
