// ============================================================
// Layer 1 - CLI Arguments
// ============================================================
// Two positional paths plus optional tuning flags:
//
//   train-classifier <database_filepath> <model_filepath>
//                    [--table T] [--test-size F] [--cv-folds K]
//                    [--n-estimators N] [--seed S]
//
// The positionals are parsed leniently (zero, one, or extras are
// all accepted) so the caller can answer a wrong count with the
// usage message instead of a clap error.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::DEFAULT_TABLE;

/// All arguments of a training run.
/// Each named field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// SQLite database holding the labelled messages
    pub database_filepath: Option<PathBuf>,

    /// Where to write the trained model
    pub model_filepath: Option<PathBuf>,

    /// Anything past the two paths; only used to detect a wrong count
    #[arg(hide = true)]
    pub extra: Vec<String>,

    /// Table to read the messages from
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Fraction of rows held out for the final report
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Number of cross-validation folds in the grid search
    #[arg(long, default_value_t = 3)]
    pub cv_folds: usize,

    /// Trees per random forest (one forest per category)
    #[arg(long, default_value_t = 10)]
    pub n_estimators: usize,

    /// Seed for the split and the forests; unset = different every run
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TrainArgs {
    /// The run config, or None unless exactly two paths were given.
    /// The application layer never sees clap types.
    pub fn into_config(self) -> Option<TrainConfig> {
        match (self.database_filepath, self.model_filepath) {
            (Some(database_filepath), Some(model_filepath)) if self.extra.is_empty() => {
                Some(TrainConfig {
                    database_filepath,
                    model_filepath,
                    table:        self.table,
                    test_size:    self.test_size,
                    cv_folds:     self.cv_folds,
                    n_estimators: self.n_estimators,
                    seed:         self.seed,
                })
            }
            _ => None,
        }
    }
}
