// Test-only helpers: a synthetic disaster-message database with the
// same layout as the ETL output (id, message, original, genre, categories...).

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

use crate::data::loader::DEFAULT_TABLE;

const FILLER: &[&str] = &[
    "please send help to our village",
    "the road to the town is blocked",
    "we are waiting near the school",
    "people are gathering at the church",
    "the bridge collapsed last night",
];

/// Labels of row `i`: category `j` is on when bit `j` of `i` is set.
pub fn labels_for(i: usize, n_categories: usize) -> Vec<i64> {
    (0..n_categories).map(|j| ((i >> j) & 1) as i64).collect()
}

/// Message of row `i`: every active category is mentioned by name,
/// so a classifier has something to learn from.
pub fn message_for(i: usize, categories: &[&str]) -> String {
    let mut words: Vec<String> = vec![FILLER[i % FILLER.len()].to_string()];
    for (j, cat) in categories.iter().enumerate() {
        if (i >> j) & 1 == 1 {
            words.push(format!("we urgently need {cat}"));
        }
    }
    words.join(", ")
}

/// Create `path` with `n_rows` messages and one integer column per category.
pub fn write_database(path: &Path, n_rows: usize, categories: &[&str]) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let category_defs: Vec<String> = categories
            .iter()
            .map(|c| format!("\"{c}\" INTEGER"))
            .collect();
        let create = format!(
            "CREATE TABLE \"{DEFAULT_TABLE}\" (id INTEGER, message TEXT, original TEXT, genre TEXT, {})",
            category_defs.join(", ")
        );
        sqlx::query(&create).execute(&pool).await?;

        let placeholders = vec!["?"; 4 + categories.len()].join(", ");
        let insert = format!("INSERT INTO \"{DEFAULT_TABLE}\" VALUES ({placeholders})");

        for i in 0..n_rows {
            let mut query = sqlx::query(&insert)
                .bind(i as i64)
                .bind(message_for(i, categories))
                .bind(Option::<String>::None)
                .bind(if i % 2 == 0 { "direct" } else { "news" });
            for label in labels_for(i, categories.len()) {
                query = query.bind(label);
            }
            query.execute(&pool).await?;
        }

        pool.close().await;
        Ok::<(), anyhow::Error>(())
    })
}

/// Create `path` and run each raw SQL statement against it, in order.
pub fn execute_sql(path: &Path, statements: &[&str]) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        for statement in statements {
            sqlx::query(statement).execute(&pool).await?;
        }

        pool.close().await;
        Ok::<(), anyhow::Error>(())
    })
}
