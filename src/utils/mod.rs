//! Shared utilities: graph invariant validation.

pub mod validation;

pub use validation::validate_graph_invariants;
