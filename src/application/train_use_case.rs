// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Load the corpus from SQLite    (Layer 4 - data)
//   Step 2: Split train/test               (Layer 4 - data)
//   Step 3: Build the grid search          (Layer 5 - ml)
//   Step 4: Fit it on the training rows    (Layer 5 - ml)
//   Step 5: Report on the test rows        (Layer 5 - ml)
//   Step 6: Save the model artifact        (Layer 6 - infra)
//
// Progress banners and reports go to the writer handed to run();
// the binary passes stdout. Diagnostics go through tracing.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::application::Stage;
use crate::data::{loader::SqliteLoader, loader::DEFAULT_TABLE, splitter::split_train_test};
use crate::domain::traits::{CorpusSource, Persistable};
use crate::infra::checkpoint::TrainedModel;
use crate::ml::builder::{build_model, ModelConfig};
use crate::ml::evaluator::evaluate_model;
use crate::ml::trainer::train_model;

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Serialisable so it can be logged as
// JSON and embedded in the saved model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub database_filepath: PathBuf,
    pub model_filepath:    PathBuf,
    pub table:             String,
    pub test_size:         f64,
    pub cv_folds:          usize,
    pub n_estimators:      usize,
    pub seed:              Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            database_filepath: PathBuf::from("data/DisasterResponse.db"),
            model_filepath:    PathBuf::from("classifier.bin"),
            table:             DEFAULT_TABLE.to_string(),
            test_size:         0.2,
            cv_folds:          3,
            n_estimators:      10,
            seed:              None,
        }
    }
}

impl TrainConfig {
    /// The model-side slice of the config
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            n_estimators: self.n_estimators,
            cv_folds:     self.cv_folds,
            random_state: self.seed,
            ..ModelConfig::default()
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
    stage:  Stage,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, stage: Stage::Idle }
    }

    #[cfg(test)]
    /// The last stage this run completed
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run end to end, writing banners and reports to `out`
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let cfg = self.config.clone();
        if !(cfg.test_size > 0.0 && cfg.test_size < 1.0) {
            bail!("test size must be between 0 and 1, got {}", cfg.test_size);
        }
        tracing::debug!("Run config: {}", serde_json::to_string(&cfg)?);

        // ── Step 1: Load ──────────────────────────────────────────────────────
        writeln!(out, "Loading data...\n    DATABASE: {}", cfg.database_filepath.display())?;
        let loader = SqliteLoader::new(&cfg.database_filepath, &cfg.table);
        let corpus = loader.load()?;
        if corpus.is_empty() {
            bail!("table '{}' holds no messages", cfg.table);
        }
        self.advance();

        // ── Step 2: Split 80/20 ───────────────────────────────────────────────
        // Split row indices so messages and labels stay aligned
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let indices: Vec<usize> = (0..corpus.len()).collect();
        let (train_idx, test_idx) = split_train_test(indices, cfg.test_size, &mut rng);
        if train_idx.is_empty() {
            bail!(
                "training partition is empty ({} rows at test size {})",
                corpus.len(),
                cfg.test_size
            );
        }
        let train = corpus.select(&train_idx);
        let test  = corpus.select(&test_idx);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());
        self.advance();

        // ── Step 3: Build ─────────────────────────────────────────────────────
        writeln!(out, "Building model...")?;
        let mut model = build_model(&cfg.model_config());
        self.advance();

        // ── Step 4: Train ─────────────────────────────────────────────────────
        writeln!(out, "Training model...")?;
        out.flush()?;
        train_model(&mut model, &train)?;
        self.advance();

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        writeln!(out, "Evaluating model...")?;
        evaluate_model(&model, &test, out)?;
        self.advance();

        // ── Step 6: Save ──────────────────────────────────────────────────────
        writeln!(out, "Saving model...\n    MODEL: {}", cfg.model_filepath.display())?;
        let artifact = TrainedModel::new(cfg.clone(), corpus.categories().to_vec(), model);
        artifact.save(&cfg.model_filepath)?;

        // Read the file back so a truncated write fails the run here
        let reloaded = TrainedModel::load(&cfg.model_filepath)?;
        let sample = &test.messages()[..test.len().min(5)];
        if reloaded.config() != artifact.config()
            || reloaded.categories() != artifact.categories()
            || reloaded.predict(sample)? != artifact.predict(sample)?
        {
            bail!(
                "model file '{}' does not match the trained model",
                cfg.model_filepath.display()
            );
        }
        self.advance();

        writeln!(out, "Trained model saved!")?;
        out.flush()?;
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        let next = self.stage.next();
        tracing::debug!("Stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}
