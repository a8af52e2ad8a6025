// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Uses `clap` to parse the
// command line; all real work is delegated to Layer 2.
//
// Exactly two positional paths start a training run. Any other
// count prints the usage message and exits successfully without
// touching the filesystem.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::TrainArgs;
use std::io::{self, Write};

use crate::application::train_use_case::TrainUseCase;

pub const USAGE: &str = "Please provide the filepath of the disaster messages database \
as the first argument and the filepath of the model file to save the model to as the \
second argument. \n\nExample: train-classifier ../data/DisasterResponse.db classifier.bin";

/// The main CLI struct. clap generates the parser from the fields.
#[derive(Parser, Debug)]
#[command(
    name = "train-classifier",
    version,
    about = "Train a multi-label disaster-message classifier from a SQLite table and save it."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: TrainArgs,
}

/// What a CLI invocation ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Wrong argument count; only the usage message was printed
    Usage,
    /// A model was trained, evaluated and saved
    Trained,
}

impl Cli {
    pub fn run(self) -> Result<RunOutcome> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&mut out)
    }

    /// Like `run`, with console output sent to `out`
    pub fn run_with<W: Write>(self, out: &mut W) -> Result<RunOutcome> {
        let Some(config) = self.args.into_config() else {
            writeln!(out, "{USAGE}")?;
            return Ok(RunOutcome::Usage);
        };

        tracing::info!(
            "Training from '{}' (table {})",
            config.database_filepath.display(),
            config.table
        );
        TrainUseCase::new(config).run(out)?;
        Ok(RunOutcome::Trained)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::write_database;

    fn run(argv: &[&str]) -> (RunOutcome, String) {
        let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
        let mut out = Vec::new();
        let outcome = cli.run_with(&mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_no_arguments_prints_usage() {
        let (outcome, text) = run(&["train-classifier"]);
        assert_eq!(outcome, RunOutcome::Usage);
        assert!(text.starts_with("Please provide the filepath"));
    }

    #[test]
    fn test_one_argument_prints_usage_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db  = dir.path().join("never.db");
        let (outcome, _) = run(&["train-classifier", db.to_str().unwrap()]);
        assert_eq!(outcome, RunOutcome::Usage);
        assert!(!db.exists());
    }

    #[test]
    fn test_three_arguments_print_usage() {
        let (outcome, _) = run(&["train-classifier", "a.db", "m.bin", "extra"]);
        assert_eq!(outcome, RunOutcome::Usage);
    }

    #[test]
    fn test_flags_reach_the_config() {
        let cli = Cli::try_parse_from([
            "train-classifier", "db.sqlite", "out.bin",
            "--table", "Messages", "--cv-folds", "4", "--seed", "9",
        ])
        .unwrap();
        let cfg = cli.args.into_config().unwrap();
        assert_eq!(cfg.table, "Messages");
        assert_eq!(cfg.cv_folds, 4);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.n_estimators, 10);
        assert_eq!(cfg.test_size, 0.2);
    }

    #[test]
    fn test_two_arguments_train() {
        let dir   = tempfile::tempdir().unwrap();
        let db    = dir.path().join("messages.db");
        let model = dir.path().join("classifier.bin");
        write_database(&db, 40, &["aid", "medical"]).unwrap();

        let (outcome, text) = run(&[
            "train-classifier",
            db.to_str().unwrap(),
            model.to_str().unwrap(),
            "--n-estimators", "3",
            "--seed", "5",
        ]);
        assert_eq!(outcome, RunOutcome::Trained);
        assert_eq!(text.matches("Column Name:  ").count(), 2);
        assert!(model.exists());
    }
}
