// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: a labelled message corpus, and the abstractions
// the other layers implement (a corpus source, a multi-label
// classifier, something that can be persisted).
//
// Rules for this layer:
//   - NO database or file I/O
//   - NO model internals (trees, vectorizers, ...)
//   - Only data types, invariants and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Labelled messages plus their category names
pub mod corpus;

// Core abstractions (traits) that other layers implement
pub mod traits;
