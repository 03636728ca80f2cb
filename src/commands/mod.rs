//! Per-tool grammars.
//!
//! Each supported tool implements [`Grammar`]: parse tokens into a
//! structured command, validate it against policy, and render it back to
//! canonical tokens. [`CommandSpec`] is the object-safe face the registry
//! stores; it is implemented for every grammar.

/// Table-driven flag parsing shared by all grammars.
pub mod args;
/// `awk` with a script denylist.
pub mod awk;
/// `grep` as a pipeline-only text filter.
pub mod grep;
/// `jq` with a filter denylist.
pub mod jq;
/// `sed` with a script denylist.
pub mod sed;
/// Stdin-only single-purpose utilities (head, tail, wc, cut, sort, ...).
pub mod simple;
/// Cluster, cloud, container, package and GitOps CLIs.
pub mod tools;

use crate::error::{PolicyError, SanitizeError, SyntaxError};
use crate::escape::join_tokens;
use crate::eval::CommandContext;

/// Parse, validate and stringify one tool's invocations.
pub trait Grammar: Send + Sync {
    /// Structured form of a parsed invocation.
    type Command: std::fmt::Debug;

    /// Leading tokens this grammar handles.
    fn names(&self) -> &'static [&'static str];

    /// Tokens → structured command. Shape errors only, no policy.
    fn parse(&self, ctx: &CommandContext) -> Result<Self::Command, SyntaxError>;

    /// Policy checks: deny tree, allow tree, then flag and argument values.
    fn validate(&self, cmd: &Self::Command, ctx: &CommandContext) -> Result<(), PolicyError>;

    /// Canonical tokens, including the tool name.
    fn tokens(&self, cmd: &Self::Command) -> Vec<String>;
}

/// Object-safe entry point used by the registry.
pub trait CommandSpec: Send + Sync {
    /// Sanitize one segment into its escaped canonical string.
    fn sanitize(&self, ctx: &CommandContext) -> Result<String, SanitizeError>;
}

impl<G: Grammar> CommandSpec for G {
    fn sanitize(&self, ctx: &CommandContext) -> Result<String, SanitizeError> {
        let cmd = self.parse(ctx)?;
        log::trace!("{}: parsed {cmd:?}", ctx.base_command);
        self.validate(&cmd, ctx)?;
        Ok(join_tokens(&self.tokens(&cmd))?)
    }
}

/// Reject every positional as an attempted file argument.
pub(crate) fn reject_file_arguments(tool: &str, positionals: &[String]) -> Result<(), PolicyError> {
    match positionals.first() {
        Some(arg) => Err(PolicyError::FileArgument {
            tool: tool.to_string(),
            argument: arg.clone(),
        }),
        None => Ok(()),
    }
}
