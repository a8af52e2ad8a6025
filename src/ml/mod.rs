// ============================================================
// Layer 5 - ML / Model Layer
// ============================================================
// Everything that turns text into predictions lives here. The
// stages are small and composable:
//
//   sparse.rs       - CSR matrix shared by every stage
//
//   vectorizer.rs   - CountVectorizer: tokens → term counts
//                     (alphabetical vocabulary)
//
//   tfidf.rs        - TfidfTransformer: counts → smoothed
//                     tf-idf weights, L2-normalised rows
//
//   tree.rs         - Gini decision tree over sparse rows
//   forest.rs       - bootstrap ensemble of trees, grown in
//                     parallel with rayon
//   multi_output.rs - one forest per label column
//
//   pipeline.rs     - the three stages chained together
//   grid_search.rs  - K-fold search over pipeline parameters
//
//   builder.rs      - assembles the unfitted search
//   trainer.rs      - fits it and logs the CV results
//   evaluator.rs    - per-category classification reports
//
// Reference: Breiman (2001) Random Forests
//            Manning et al. (2008) Introduction to IR, §6 (tf-idf)

/// Compressed sparse row matrix
pub mod sparse;

/// Bag-of-words term counting
pub mod vectorizer;

/// Term-frequency / inverse-document-frequency weighting
pub mod tfidf;

/// Decision tree classifier
pub mod tree;

/// Random forest classifier
pub mod forest;

/// One classifier per label column
pub mod multi_output;

/// Vectorizer → tf-idf → classifier chain
pub mod pipeline;

/// Exhaustive parameter search with cross-validation
pub mod grid_search;

/// Builds the unfitted model
pub mod builder;

/// Fits the model on the training partition
pub mod trainer;

/// Writes per-category evaluation reports
pub mod evaluator;
