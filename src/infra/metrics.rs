// ============================================================
// Layer 6 - Classification Metrics
// ============================================================
// Per-class precision / recall / F1 for one label column, laid
// out as the familiar plain-text classification report:
//
//                precision    recall  f1-score   support
//
//              0       0.83      0.91      0.87       740
//              1       0.64      0.47      0.54       260
//
//       accuracy                           0.80      1000
//      macro avg       0.74      0.69      0.71      1000
//   weighted avg       0.78      0.80      0.79      1000
//
// Definitions, for each class c:
//   precision = TP / (TP + FP)
//   recall    = TP / (TP + FN)
//   f1        = 2 · precision · recall / (precision + recall)
//   support   = number of true rows with label c
// Any 0/0 is reported as 0.0.
//
// Classes are the sorted union of the true and predicted values,
// so a class that is only ever predicted still gets a row.
//
// Reference: Rust Book §10.2 (Traits: Display)

use anyhow::{bail, Result};
use ndarray::ArrayView1;
use std::collections::BTreeSet;
use std::fmt;

/// Label of the widest summary row; the name column is never narrower
const LONGEST_HEADING: &str = "weighted avg";
const DIGITS: usize = 2;

/// Scores for one class, or one averaged summary row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// (class value, its scores), sorted by class value
    classes:  Vec<(i64, Scores)>,
    accuracy: f64,
    total:    usize,
}

impl ClassificationReport {
    pub fn new(truth: ArrayView1<'_, i64>, predicted: ArrayView1<'_, i64>) -> Result<Self> {
        if truth.len() != predicted.len() {
            bail!(
                "cannot compare {} true labels with {} predictions",
                truth.len(),
                predicted.len()
            );
        }

        let labels: BTreeSet<i64> = truth.iter().chain(predicted.iter()).copied().collect();

        let classes = labels
            .into_iter()
            .map(|c| {
                let mut tp = 0usize;
                let mut fp = 0usize;
                let mut fn_ = 0usize;
                for (&t, &p) in truth.iter().zip(predicted.iter()) {
                    match (t == c, p == c) {
                        (true, true)   => tp += 1,
                        (false, true)  => fp += 1,
                        (true, false)  => fn_ += 1,
                        (false, false) => {}
                    }
                }
                let precision = ratio(tp, tp + fp);
                let recall    = ratio(tp, tp + fn_);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                (c, Scores { precision, recall, f1, support: tp + fn_ })
            })
            .collect();

        let correct = truth.iter().zip(predicted.iter()).filter(|(t, p)| t == p).count();

        Ok(Self {
            classes,
            accuracy: ratio(correct, truth.len()),
            total:    truth.len(),
        })
    }

    #[cfg(test)]
    pub fn classes(&self) -> &[(i64, Scores)] {
        &self.classes
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Unweighted mean over classes
    pub fn macro_avg(&self) -> Scores {
        let n = self.classes.len();
        let mean = |f: fn(&Scores) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.classes.iter().map(|(_, s)| f(s)).sum::<f64>() / n as f64
            }
        };
        Scores {
            precision: mean(|s| s.precision),
            recall:    mean(|s| s.recall),
            f1:        mean(|s| s.f1),
            support:   self.total,
        }
    }

    /// Mean over classes weighted by support
    pub fn weighted_avg(&self) -> Scores {
        let total: usize = self.classes.iter().map(|(_, s)| s.support).sum();
        let mean = |f: fn(&Scores) -> f64| {
            if total == 0 {
                0.0
            } else {
                self.classes
                    .iter()
                    .map(|(_, s)| f(s) * s.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        Scores {
            precision: mean(|s| s.precision),
            recall:    mean(|s| s.recall),
            f1:        mean(|s| s.f1),
            support:   self.total,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, width: usize, name: &str, s: &Scores) -> fmt::Result {
    writeln!(
        f,
        "{name:>width$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
        s.precision,
        s.recall,
        s.f1,
        s.support,
        d = DIGITS
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.classes.iter().map(|(c, _)| c.to_string()).collect();
        let width = names
            .iter()
            .map(String::len)
            .chain([LONGEST_HEADING.len(), DIGITS])
            .max()
            .unwrap_or(LONGEST_HEADING.len());

        // ── Header ────────────────────────────────────────────────────────────
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        // ── One row per class ─────────────────────────────────────────────────
        for (name, (_, scores)) in names.iter().zip(&self.classes) {
            write_row(f, width, name, scores)?;
        }
        writeln!(f)?;

        // ── Summary rows ──────────────────────────────────────────────────────
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy", "", "", self.accuracy, self.total,
            d = DIGITS
        )?;
        write_row(f, width, "macro avg", &self.macro_avg())?;
        write_row(f, width, "weighted avg", &self.weighted_avg())
    }
}
