//! Policy building blocks shared by the grammars.

/// Allow/deny trees and their two-walk check.
pub mod tree;
/// Value predicates for flags and arguments.
pub mod validators;

pub use tree::{CommandTree, PathPolicy};
pub use validators::Validator;
