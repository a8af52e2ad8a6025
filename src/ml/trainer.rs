// ============================================================
// Layer 5 - Training
// ============================================================
// One blocking call: fit the grid search on the training
// partition, then log what the search found.
//
// All the parallelism lives inside the forests (rayon); from
// here the call is strictly sequential.

use anyhow::{Context, Result};
use std::time::Instant;

use crate::domain::corpus::Corpus;
use crate::domain::traits::MultiLabelClassifier;
use crate::ml::grid_search::GridSearch;

pub fn train_model(model: &mut GridSearch, train: &Corpus) -> Result<()> {
    tracing::info!(
        "Training on {} messages x {} categories",
        train.len(),
        train.categories().len()
    );

    let started = Instant::now();
    model
        .fit(train.messages(), train.labels())
        .context("grid search failed")?;
    tracing::info!("Grid search finished in {:.1?}", started.elapsed());

    // ── Cross-validation summary ──────────────────────────────────────────────
    for r in model.results() {
        tracing::info!(
            "rank {} | mean {:.4} | std {:.4} | {}",
            r.rank,
            r.mean_test_score,
            r.std_test_score,
            r.params
        );
    }
    if let (Some(best), Some(pipeline)) = (model.best_result(), model.best_estimator()) {
        tracing::info!(
            "Best parameters: {} (cv score {:.4}, vocabulary {} terms)",
            best.params,
            best.mean_test_score,
            pipeline.vocabulary_size()
        );
    }
    Ok(())
}
