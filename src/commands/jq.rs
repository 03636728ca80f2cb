//! `jq` restricted to pure filters over stdin.

use super::args::{ArgParser, FlagSpec, ParsedArgs};
use super::{Grammar, reject_file_arguments};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::validators::{COUNT, Denylist, SCRIPT, lazy_regex};

static FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["--raw-output", "-r"]),
    FlagSpec::switch(&["--compact-output", "-c"]),
    FlagSpec::switch(&["--sort-keys", "-S"]),
    FlagSpec::switch(&["--slurp", "-s"]),
    FlagSpec::switch(&["--null-input", "-n"]),
    FlagSpec::switch(&["--exit-status", "-e"]),
    FlagSpec::switch(&["--monochrome-output", "-M"]),
    FlagSpec::switch(&["--join-output", "-j"]),
    FlagSpec::switch(&["--ascii-output", "-a"]),
    FlagSpec::switch(&["--tab"]),
    FlagSpec::value(&["--indent"], &COUNT),
];

static PARSER: ArgParser = ArgParser::strict("jq", FLAGS);

/// Builtins that read the environment, the filesystem or program metadata.
static DENYLIST: Denylist = Denylist {
    entries: &[
        (lazy_regex!(r"\$ENV\b"), "$ENV"),
        (lazy_regex!(r"(^|[^.$A-Za-z0-9_])env\b"), "env"),
        (lazy_regex!(r"\binput_filename\b"), "input_filename"),
        (lazy_regex!(r"\$__loc__"), "$__loc__"),
        (lazy_regex!(r"\$__prog_args"), "$__prog_args"),
        (lazy_regex!(r"(^|[^.$A-Za-z0-9_])(import|include)\b"), "module directive"),
        (lazy_regex!(r"\b(modulemeta|get_search_list|get_prog_origin|get_jq_origin)\b"), "module metadata"),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JqCommand {
    pub filter: Option<String>,
    pub args: ParsedArgs,
}

pub struct JqSpec;

impl Grammar for JqSpec {
    type Command = JqCommand;

    fn names(&self) -> &'static [&'static str] {
        &["jq"]
    }

    fn parse(&self, ctx: &CommandContext) -> Result<JqCommand, SyntaxError> {
        let mut args = PARSER.parse(ctx.args())?;
        let filter = (!args.positionals.is_empty()).then(|| args.positionals.remove(0));
        Ok(JqCommand { filter, args })
    }

    fn validate(&self, cmd: &JqCommand, _ctx: &CommandContext) -> Result<(), PolicyError> {
        reject_file_arguments("jq", &cmd.args.positionals)?;
        PARSER.validate(&cmd.args, &[])?;
        if let Some(filter) = &cmd.filter {
            SCRIPT.validate("jq", "filter", filter)?;
            DENYLIST.check("jq", filter)?;
        }
        Ok(())
    }

    fn tokens(&self, cmd: &JqCommand) -> Vec<String> {
        let mut out = vec!["jq".to_string()];
        out.extend(cmd.args.flag_tokens());
        out.extend(cmd.filter.iter().cloned());
        out
    }
}
