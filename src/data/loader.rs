// ============================================================
// Layer 4 - Corpus Loader (SQLite)
// ============================================================
// Reads the labelled message table produced by the ETL step.
//
// Expected table layout (default name: DisasterResponseTable):
//
//   id | message | original | genre | related | request | ... | direct_report
//   ───┴─────────┴──────────┴───────┴─────────┴─────────┴─────┴──────────────
//        features   metadata          one integer column per category
//
// Everything except id / message / original / genre is a
// category, in schema order.
//
// The database is opened read-only and never created: a wrong
// path is an error, not an empty corpus.
//
// sqlx is async, so the loader spins up a small current-thread
// tokio runtime for the duration of the read and closes the pool
// before returning.
//
// Reference: sqlx crate documentation (SqliteConnectOptions, Row)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::PathBuf;

use crate::domain::corpus::Corpus;
use crate::domain::traits::CorpusSource;

/// Table written by the ETL step
pub const DEFAULT_TABLE: &str = "DisasterResponseTable";

/// Column holding the message text
const MESSAGE_COLUMN: &str = "message";

/// Columns that are neither the feature nor a category
const NON_CATEGORY_COLUMNS: &[&str] = &["id", "message", "original", "genre"];

/// Loads a [`Corpus`] from one table of a SQLite database file.
pub struct SqliteLoader {
    path:  PathBuf,
    table: String,
}

impl SqliteLoader {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self { path: path.into(), table: table.into() }
    }

    async fn load_async(&self) -> Result<Corpus> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Cannot open database '{}'", self.path.display()))?;

        let corpus = self.read_table(&pool).await;
        pool.close().await;
        corpus
    }

    async fn read_table(&self, pool: &SqlitePool) -> Result<Corpus> {
        // ── Step 1: Discover the schema ───────────────────────────────────────
        let columns: Vec<String> = sqlx::query("SELECT name FROM pragma_table_info(?1)")
            .bind(self.table.as_str())
            .fetch_all(pool)
            .await
            .with_context(|| format!("Cannot read schema of table '{}'", self.table))?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<_, _>>()?;

        if columns.is_empty() {
            bail!(
                "Table '{}' not found in '{}'",
                self.table,
                self.path.display()
            );
        }
        if !columns.iter().any(|c| c == MESSAGE_COLUMN) {
            bail!("Table '{}' has no '{}' column", self.table, MESSAGE_COLUMN);
        }

        let categories: Vec<String> = columns
            .into_iter()
            .filter(|c| !NON_CATEGORY_COLUMNS.contains(&c.as_str()))
            .collect();

        tracing::debug!("Found {} category columns in '{}'", categories.len(), self.table);

        // ── Step 2: Read message + every category column ──────────────────────
        let select_list: Vec<String> = std::iter::once(MESSAGE_COLUMN.to_string())
            .chain(categories.iter().cloned())
            .map(|c| quote_identifier(&c))
            .collect();
        let sql = format!(
            "SELECT {} FROM {}",
            select_list.join(", "),
            quote_identifier(&self.table)
        );

        let rows = sqlx::query(&sql)
            .fetch_all(pool)
            .await
            .with_context(|| format!("Cannot read rows of table '{}'", self.table))?;

        // ── Step 3: Assemble the corpus ───────────────────────────────────────
        let n_rows       = rows.len();
        let n_categories = categories.len();
        let mut messages = Vec::with_capacity(n_rows);
        let mut labels   = Array2::<i64>::zeros((n_rows, n_categories));

        for (r, row) in rows.iter().enumerate() {
            let message: Option<String> = row.try_get(0)?;
            let message = message
                .with_context(|| format!("Row {r} has no message"))?;
            messages.push(message);

            for (c, category) in categories.iter().enumerate() {
                let value: Option<i64> = row
                    .try_get(c + 1)
                    .with_context(|| format!("Column '{category}' is not an integer"))?;
                labels[[r, c]] = value
                    .with_context(|| format!("Row {r} has no value for category '{category}'"))?;
            }
        }

        Corpus::new(messages, labels, categories)
    }
}

impl CorpusSource for SqliteLoader {
    fn load(&self) -> Result<Corpus> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Cannot start the database runtime")?;

        let corpus = runtime.block_on(self.load_async())?;

        tracing::info!(
            "Loaded {} messages with {} categories from '{}'",
            corpus.len(),
            corpus.categories().len(),
            self.path.display()
        );
        Ok(corpus)
    }
}

/// Double-quote an SQL identifier, escaping embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn test_loads_rows_and_categories() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::write_database(&path, 25, &["water", "food", "shelter"]).unwrap();

        let corpus = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap();

        assert_eq!(corpus.len(), 25);
        assert_eq!(corpus.labels().nrows(), corpus.messages().len());
        assert_eq!(corpus.labels().ncols(), corpus.categories().len());
        assert_eq!(corpus.categories(), &["water", "food", "shelter"]);
    }

    #[test]
    fn test_labels_match_fixture() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::write_database(&path, 12, &["water", "food"]).unwrap();

        let corpus = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap();

        for (i, message) in corpus.messages().iter().enumerate() {
            let expected = fixtures::labels_for(i, 2);
            assert_eq!(corpus.labels().row(i).to_vec(), expected, "row {i}: {message}");
        }
    }

    #[test]
    fn test_missing_table_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::write_database(&path, 5, &["water"]).unwrap();

        let result = SqliteLoader::new(&path, "NoSuchTable").load();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_fails_and_is_not_created() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        assert!(SqliteLoader::new(&path, DEFAULT_TABLE).load().is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_null_label_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::execute_sql(&path, &[
            "CREATE TABLE DisasterResponseTable (id INTEGER, message TEXT, related INTEGER, aid INTEGER)",
            "INSERT INTO DisasterResponseTable VALUES (1, 'we need water', 1, 0)",
            "INSERT INTO DisasterResponseTable VALUES (2, 'send food', 1, NULL)",
        ])
        .unwrap();

        let err = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap_err();
        assert!(format!("{err:#}").contains("no value for category 'aid'"), "{err:#}");
    }

    #[test]
    fn test_null_message_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::execute_sql(&path, &[
            "CREATE TABLE DisasterResponseTable (id INTEGER, message TEXT, related INTEGER)",
            "INSERT INTO DisasterResponseTable VALUES (1, 'we need water', 1)",
            "INSERT INTO DisasterResponseTable VALUES (2, NULL, 0)",
        ])
        .unwrap();

        let err = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap_err();
        assert!(format!("{err:#}").contains("Row 1 has no message"), "{err:#}");
    }

    #[test]
    fn test_missing_message_column_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::execute_sql(&path, &[
            "CREATE TABLE DisasterResponseTable (id INTEGER, text TEXT, related INTEGER)",
            "INSERT INTO DisasterResponseTable VALUES (1, 'we need water', 1)",
        ])
        .unwrap();

        let err = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap_err();
        assert!(format!("{err:#}").contains("has no 'message' column"), "{err:#}");
    }

    #[test]
    fn test_bigint_multiclass_labels_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        fixtures::execute_sql(&path, &[
            "CREATE TABLE DisasterResponseTable (id BIGINT, message TEXT, original TEXT, genre TEXT, related BIGINT, aid BIGINT)",
            "INSERT INTO DisasterResponseTable VALUES (1, 'is the hospital open', NULL, 'direct', 2, 1)",
        ])
        .unwrap();

        let corpus = SqliteLoader::new(&path, DEFAULT_TABLE).load().unwrap();
        assert_eq!(corpus.categories(), &["related", "aid"]);
        assert_eq!(corpus.labels().row(0).to_vec(), vec![2, 1]);
        assert_eq!(corpus.messages(), &["is the hospital open"]);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("aid_related"), "\"aid_related\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
