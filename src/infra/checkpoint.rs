// ============================================================
// Layer 6 - Model Artifact
// ============================================================
// Saves and restores the fitted model as ONE bincode file.
//
// What the artifact holds:
//   1. format_version - bumped whenever the layout changes
//   2. config         - the TrainConfig of the run that produced it
//   3. categories     - label column names, in prediction order
//   4. search         - the fitted GridSearch (CV results plus the
//                       refitted best pipeline)
//
// Saving creates missing parent directories and overwrites any
// existing file. No checksum, no atomic rename.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::traits::{MultiLabelClassifier, Persistable};
use crate::ml::grid_search::GridSearch;

pub const FORMAT_VERSION: u32 = 1;

/// A fitted model together with what is needed to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    format_version: u32,
    config:         TrainConfig,
    categories:     Vec<String>,
    search:         GridSearch,
}

impl TrainedModel {
    pub fn new(config: TrainConfig, categories: Vec<String>, search: GridSearch) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            config,
            categories,
            search,
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[cfg(test)]
    pub fn search(&self) -> &GridSearch {
        &self.search
    }

    /// Predict a `[texts, categories]` label matrix with the best pipeline.
    pub fn predict(&self, texts: &[String]) -> Result<Array2<i64>> {
        self.search.predict(texts)
    }
}

impl Persistable for TrainedModel {
    fn save(&self, path: &Path) -> Result<()> {
        // create_dir_all is `mkdir -p`: fine if the directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Cannot create model file '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .with_context(|| format!("Failed to serialise model to '{}'", path.display()))?;
        writer.flush()?;

        tracing::debug!("Saved model artifact to '{}'", path.display());
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open model file '{}'", path.display()))?;
        let model: TrainedModel = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("'{}' is not a readable model artifact", path.display()))?;

        if model.format_version != FORMAT_VERSION {
            bail!(
                "model file '{}' has format version {}, expected {}",
                path.display(),
                model.format_version,
                FORMAT_VERSION
            );
        }
        Ok(model)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::builder::{build_model, ModelConfig};

    fn fitted() -> (Vec<String>, TrainedModel) {
        let texts: Vec<String> = (0..12)
            .map(|i| if i % 2 == 0 { format!("help trapped {i}") } else { format!("fine thanks {i}") })
            .collect();
        let labels = Array2::from_shape_fn((12, 1), |(i, _)| i64::from(i % 2 == 0));

        let cfg = ModelConfig { n_estimators: 3, random_state: Some(2), ..ModelConfig::default() };
        let mut search = build_model(&cfg);
        search.fit(&texts, &labels).unwrap();

        let model = TrainedModel::new(TrainConfig::default(), vec!["request".into()], search);
        (texts, model)
    }

    #[test]
    fn test_roundtrip_predicts_identically() {
        let (texts, model) = fitted();
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("classifier.bin");

        model.save(&path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);

        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.categories(), model.categories());
        assert_eq!(loaded.search().best_params(), model.search().best_params());
        assert_eq!(loaded.predict(&texts).unwrap(), model.predict(&texts).unwrap());
    }

    #[test]
    fn test_save_overwrites() {
        let (_, model) = fitted();
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.bin");
        fs::write(&path, b"stale").unwrap();

        model.save(&path).unwrap();
        assert!(TrainedModel::load(&path).is_ok());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        fs::write(&path, b"not a model").unwrap();
        assert!(TrainedModel::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TrainedModel::load(&dir.path().join("absent.bin")).is_err());
    }
}
