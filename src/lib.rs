//! shellgate: a command-safety gateway for operations agents.
//!
//! An agent proposes a single shell command line. The gateway either returns
//! a re-escaped, semantically equivalent command that is safe to hand to a
//! shell, or rejects it with a [`SyntaxError`](error::SyntaxError) or a
//! [`PolicyError`](error::PolicyError). Nothing is ever executed here.
//!
//! Commands are split into `|` pipeline segments, each segment is routed to
//! the grammar registered for its exact leading token, and the grammar
//! parses, validates and re-emits it. Unknown tools and unknown operations
//! are rejected.
//!
//! # Architecture
//!
//! - **[`parse`]**: quote-aware pipeline splitting and shlex tokenization.
//! - **[`eval`]**: command registry and per-segment context.
//! - **[`commands`]**: per-tool grammars (kubectl, cloud CLIs, filters, text utilities).
//! - **[`policy`]**: command trees and value validators shared by the grammars.
//! - **[`escape`]**: minimal, deterministic shell quoting of emitted tokens.
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: decision log at `~/.local/share/shellgate/decisions.log`.

/// Per-tool grammars and the shared argument parser.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Syntax and policy error types.
pub mod error;
/// Shell escaping of emitted tokens.
pub mod escape;
/// Command registry and per-segment context.
pub mod eval;
/// File-based decision logging.
pub mod logging;
/// Pipeline splitting and tokenization.
pub mod parse;
/// Allow/deny trees and value validators.
pub mod policy;

pub use config::ExecutorConfig;
pub use error::{PolicyError, SanitizeError, SyntaxError};

/// Validate `command` and return its safe, re-escaped form.
///
/// This is the main entry point. `config` supplies the images approved for
/// sandboxed `kubectl run`; pass [`ExecutorConfig::default()`] to approve
/// none.
pub fn sanitize(command: &str, config: &ExecutorConfig) -> Result<String, SanitizeError> {
    eval::CommandRegistry::new().sanitize(command, config)
}
