// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between the SQLite file and the model's input:
//
//   SQLite table
//       │
//       ▼
//   SqliteLoader      → reads messages + label columns into a Corpus
//       │
//       ▼
//   split_train_test  → random 80/20 partition of row indices
//       │
//       ▼
//   tokenize          → lowercased, lemmatized word tokens
//                       (called by the vectorizer in Layer 5)
//
// Each module is responsible for exactly one step.

/// Reads the labelled message table through sqlx
pub mod loader;

/// Word-boundary tokenizer with lemmatization
pub mod tokenizer;

/// WordNet-style noun lemmatizer used by the tokenizer
pub mod lemmatizer;

/// Shuffles and splits data into train/test sets
pub mod splitter;

/// Synthetic SQLite databases for tests
#[cfg(test)]
pub mod fixtures;
