//! `grep` as a pipeline filter: one keyword, stdin only.

use super::args::{ArgParser, FlagSpec, ParsedArgs};
use super::{Grammar, reject_file_arguments};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::validators::{COUNT, NO_EXPANSION};

static FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-i"]),
    FlagSpec::switch(&["-v"]),
    FlagSpec::switch(&["-E"]),
    FlagSpec::switch(&["-F"]),
    FlagSpec::switch(&["-w"]),
    FlagSpec::switch(&["-x"]),
    FlagSpec::switch(&["-c"]),
    FlagSpec::switch(&["-n"]),
    FlagSpec::switch(&["-o"]),
    FlagSpec::switch(&["-h"]),
    FlagSpec::value(&["-A"], &COUNT),
    FlagSpec::value(&["-B"], &COUNT),
    FlagSpec::value(&["-C"], &COUNT),
    FlagSpec::value(&["-m"], &COUNT),
];

static PARSER: ArgParser = ArgParser::strict("grep", FLAGS);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepCommand {
    pub keyword: String,
    pub args: ParsedArgs,
}

pub struct GrepSpec;

impl Grammar for GrepSpec {
    type Command = GrepCommand;

    fn names(&self) -> &'static [&'static str] {
        &["grep"]
    }

    fn parse(&self, ctx: &CommandContext) -> Result<GrepCommand, SyntaxError> {
        let mut args = PARSER.parse(ctx.args())?;
        if args.positionals.is_empty() {
            return Err(SyntaxError::MissingArgument {
                tool: "grep".into(),
                what: "search keyword".into(),
            });
        }
        let keyword = args.positionals.remove(0);
        Ok(GrepCommand { keyword, args })
    }

    fn validate(&self, cmd: &GrepCommand, ctx: &CommandContext) -> Result<(), PolicyError> {
        if ctx.is_first() {
            return Err(PolicyError::FirstSegment { tool: "grep".into() });
        }
        reject_file_arguments("grep", &cmd.args.positionals)?;
        PARSER.validate(&cmd.args, &[])?;
        NO_EXPANSION.validate("grep", "keyword", &cmd.keyword)
    }

    fn tokens(&self, cmd: &GrepCommand) -> Vec<String> {
        let mut out = vec!["grep".to_string()];
        out.extend(cmd.args.flag_tokens());
        out.push(cmd.keyword.clone());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandSpec;
    use crate::config::ExecutorConfig;
    use crate::error::SanitizeError;

    fn sanitize_at(cmd: &str, position: usize) -> Result<String, SanitizeError> {
        let words = shlex::split(cmd).unwrap();
        let config = ExecutorConfig::default();
        let ctx = CommandContext::new(cmd, &words, position, &config);
        GrepSpec.sanitize(&ctx)
    }

    fn sanitize(cmd: &str) -> Result<String, SanitizeError> {
        sanitize_at(cmd, 1)
    }

    #[test]
    fn keyword_with_flags() {
        assert_eq!(sanitize("grep nginx").unwrap(), "grep nginx");
        assert_eq!(sanitize("grep -i -A 3 error").unwrap(), "grep -i -A 3 error");
        assert_eq!(sanitize("grep -iv 'connection refused'").unwrap(), "grep -i -v 'connection refused'");
    }

    #[test]
    fn first_segment_rejected() {
        assert!(matches!(
            sanitize_at("grep nginx", 0),
            Err(SanitizeError::Policy(PolicyError::FirstSegment { .. }))
        ));
    }

    #[test]
    fn file_argument_rejected() {
        assert!(matches!(
            sanitize("grep root /etc/passwd"),
            Err(SanitizeError::Policy(PolicyError::FileArgument { .. }))
        ));
    }

    #[test]
    fn recursive_and_file_flags_not_permitted() {
        assert!(sanitize("grep -r secret").is_err());
        assert!(sanitize("grep -f patterns.txt").is_err());
    }

    #[test]
    fn expansion_in_keyword_rejected() {
        for cmd in ["grep '$(id)'", "grep '${HOME}'", "grep '$HOME'", "grep '`id`'"] {
            assert!(sanitize(cmd).is_err(), "{cmd}");
        }
    }

    #[test]
    fn keyword_required() {
        assert!(sanitize("grep -i").unwrap_err().is_syntax());
    }

    #[test]
    fn pattern_flags_not_permitted() {
        assert!(sanitize("grep -e foo").unwrap_err().is_policy());
        assert!(sanitize("grep -- foo").unwrap_err().is_policy());
    }
}
