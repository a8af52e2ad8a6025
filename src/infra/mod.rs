// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one layer:
//
//   checkpoint.rs - the saved model artifact. Bincode-encodes
//                   the fitted search together with its config
//                   and category names.
//
//   metrics.rs    - per-class precision / recall / F1 and the
//                   plain-text classification report.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model artifact saving and loading
pub mod checkpoint;

/// Classification report
pub mod metrics;
