//! Tree-driven grammar for CLIs whose surface is a deep path of words.
//!
//! Leading positionals form the command path. The allow tree decides how
//! many of them are the operation; the rest are arguments. Flags are kept
//! in order and passed through, except for a per-tool list of forbidden
//! ones that change where credentials or traffic go.

use crate::commands::Grammar;
use crate::commands::args::{ArgParser, Flag, ParsedArgs, flag_matches};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::tree::PathPolicy;
use crate::policy::validators::{FREEFORM, Validator};

/// A parsed invocation of a tree-driven CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    pub tool: &'static str,
    /// Every positional, path first then arguments.
    pub words: Vec<String>,
    pub flags: Vec<Flag>,
}

impl CliCommand {
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    /// First flag matching any of `names`, looking inside short bundles.
    pub fn find_flag(&self, names: &[&str]) -> Option<&Flag> {
        self.flags.iter().find(|f| flag_matches(&f.name, names))
    }
}

/// Extra per-tool check run after the tree and flag checks.
pub type Refine = fn(&CliCommand, depth: usize) -> Result<(), PolicyError>;

pub struct TreeCliSpec {
    pub names: &'static [&'static str],
    pub policy: &'static PathPolicy,
    pub parser: ArgParser,
    pub forbidden: &'static [&'static str],
    /// Checked against every flag value and argument. Catches values the
    /// CLI itself expands, such as references to local files.
    pub values: Option<&'static Validator>,
    pub refine: Option<Refine>,
}

impl Grammar for TreeCliSpec {
    type Command = CliCommand;

    fn names(&self) -> &'static [&'static str] {
        self.names
    }

    fn parse(&self, ctx: &CommandContext) -> Result<CliCommand, SyntaxError> {
        let parsed = self.parser.parse(ctx.args())?;
        Ok(CliCommand {
            tool: self.policy.tool,
            words: parsed.positionals,
            flags: parsed.flags,
        })
    }

    fn validate(&self, cmd: &CliCommand, _ctx: &CommandContext) -> Result<(), PolicyError> {
        let depth = self.policy.check(&cmd.words)?;

        if let Some(flag) = cmd.flags.iter().find(|f| f.name == "--") {
            return Err(PolicyError::FlagNotPermitted {
                tool: cmd.tool.to_string(),
                flag: flag.name.clone(),
                allowed: vec![],
            });
        }
        let flags = ParsedArgs {
            flags: cmd.flags.clone(),
            ..Default::default()
        };
        self.parser.validate(&flags, self.forbidden)?;

        for arg in &cmd.words[depth..] {
            FREEFORM.validate(cmd.tool, "argument", arg)?;
        }
        if let Some(values) = self.values {
            for flag in &cmd.flags {
                if let Some(value) = &flag.value {
                    values.validate(cmd.tool, &flag.name, value)?;
                }
            }
            for arg in &cmd.words[depth..] {
                values.validate(cmd.tool, "argument", arg)?;
            }
        }

        match self.refine {
            Some(refine) => refine(cmd, depth),
            None => Ok(()),
        }
    }

    fn tokens(&self, cmd: &CliCommand) -> Vec<String> {
        let mut out = Vec::with_capacity(1 + cmd.words.len() + cmd.flags.len() * 2);
        out.push(cmd.tool.to_string());
        out.extend(cmd.words.iter().cloned());
        for flag in &cmd.flags {
            flag.push_tokens(&mut out);
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::commands::CommandSpec;
    use crate::config::ExecutorConfig;
    use crate::error::SanitizeError;
    use crate::eval::CommandContext;

    /// Sanitize a single segment with `spec`.
    pub fn sanitize_with(spec: &dyn CommandSpec, cmd: &str) -> Result<String, SanitizeError> {
        let words = shlex::split(cmd).expect("test command tokenizes");
        let config = ExecutorConfig::default();
        let ctx = CommandContext::new(cmd, &words, 0, &config);
        spec.sanitize(&ctx)
    }

    /// Assert `cmd` is blocked by the deny tree.
    #[track_caller]
    pub fn assert_blocked(spec: &dyn CommandSpec, cmd: &str) {
        match sanitize_with(spec, cmd) {
            Err(SanitizeError::Policy(crate::error::PolicyError::Blocked { .. })) => {}
            other => panic!("{cmd}: expected blocked, got {other:?}"),
        }
    }
}
