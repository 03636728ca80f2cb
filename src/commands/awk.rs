//! `awk` restricted to text processing over stdin.

use super::args::{ArgParser, FlagSpec, ParsedArgs};
use super::{Grammar, reject_file_arguments};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::validators::{Denylist, FREEFORM, SCRIPT, Validator, lazy_regex};

static ASSIGNMENT: Validator = Validator::Check(|value| {
    static NAME: Validator = Validator::Pattern {
        regex: lazy_regex!(r"^[A-Za-z_][A-Za-z0-9_]*$"),
        expected: "VAR=VALUE with an identifier name",
    };
    let (name, rest) = value
        .split_once('=')
        .ok_or_else(|| "expected VAR=VALUE".to_string())?;
    NAME.check(name)?;
    if matches!(name, "ENVIRON" | "PROCINFO" | "ARGV" | "ARGC") {
        return Err(format!("{name} cannot be assigned"));
    }
    FREEFORM.check(rest)
});

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["-F", "--field-separator"], &FREEFORM),
    FlagSpec::value(&["-v", "--assign"], &ASSIGNMENT),
];

static PARSER: ArgParser = ArgParser::strict("awk", FLAGS);

/// Constructs that run commands, touch files or read the environment.
/// `ARGV`/`ARGC` are out because rewriting them opens input files.
static DENYLIST: Denylist = Denylist {
    entries: &[
        (lazy_regex!(r"\bsystem\s*\("), "system()"),
        (lazy_regex!(r"\bgetline\b"), "getline"),
        (lazy_regex!(r"\bprintf?\b[^;{}\n]*(>|\|)"), "print redirection"),
        (lazy_regex!(r"\b(close|fflush)\s*\("), "close/fflush"),
        (lazy_regex!(r"\bENVIRON\b"), "ENVIRON"),
        (lazy_regex!(r"\bPROCINFO\b"), "PROCINFO"),
        (lazy_regex!(r"\bARG[VC]\b"), "ARGV/ARGC"),
        (lazy_regex!(r"@include\b"), "@include"),
        (lazy_regex!(r"@load\b"), "@load"),
        (lazy_regex!(r"@[A-Za-z_]"), "indirect call"),
        (lazy_regex!(r"/inet[46]?/"), "network special file"),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwkCommand {
    pub program: String,
    pub args: ParsedArgs,
}

pub struct AwkSpec;

impl Grammar for AwkSpec {
    type Command = AwkCommand;

    fn names(&self) -> &'static [&'static str] {
        &["awk"]
    }

    fn parse(&self, ctx: &CommandContext) -> Result<AwkCommand, SyntaxError> {
        let mut args = PARSER.parse(ctx.args())?;
        if args.positionals.is_empty() {
            return Err(SyntaxError::MissingArgument {
                tool: "awk".into(),
                what: "program".into(),
            });
        }
        let program = args.positionals.remove(0);
        Ok(AwkCommand { program, args })
    }

    fn validate(&self, cmd: &AwkCommand, _ctx: &CommandContext) -> Result<(), PolicyError> {
        reject_file_arguments("awk", &cmd.args.positionals)?;
        PARSER.validate(&cmd.args, &[])?;
        SCRIPT.validate("awk", "program", &cmd.program)?;
        // Backslash-newline continues a statement. Scan with it joined both
        // ways so neither a split keyword nor a split redirection hides.
        DENYLIST.check("awk", &cmd.program)?;
        if cmd.program.contains("\\\n") {
            DENYLIST.check("awk", &cmd.program.replace("\\\n", ""))?;
            DENYLIST.check("awk", &cmd.program.replace("\\\n", " "))?;
        }
        Ok(())
    }

    fn tokens(&self, cmd: &AwkCommand) -> Vec<String> {
        let mut out = vec!["awk".to_string()];
        out.extend(cmd.args.flag_tokens());
        out.push(cmd.program.clone());
        out
    }
}
