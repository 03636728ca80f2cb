//! Data-driven grammar for single-purpose stdin-only utilities.
//!
//! Each [`Utility`] is a strict flag table plus how many operands it takes.
//! Operands are not paths (only `tr` has any); every other bare token is an
//! attempted file argument and is rejected.

use super::args::{ArgParser, FlagSpec, ParsedArgs};
use super::{Grammar, reject_file_arguments};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::validators::{COUNT, FREEFORM, SIGNED_COUNT, SINGLE_CHAR, Validator, lazy_regex};

/// A stdin-only utility.
pub struct Utility {
    pub names: &'static [&'static str],
    pub parser: ArgParser,
    /// Minimum and maximum operand count.
    pub operands: (usize, usize),
    pub operand: Option<&'static Validator>,
    /// Accept the historical `-5` for `-n 5`.
    pub legacy_count: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityCommand {
    pub tool: &'static str,
    pub operands: Vec<String>,
    /// Flags, plus any bare tokens beyond the operands.
    pub args: ParsedArgs,
}

impl Utility {
    fn tool(&self) -> &'static str {
        self.names[0]
    }

    /// Rewrite `-5` to `-n 5`, leaving values of `-n -5` alone.
    fn normalize(&self, args: &[String]) -> Vec<String> {
        if !self.legacy_count {
            return args.to_vec();
        }
        let mut out = Vec::with_capacity(args.len() + 1);
        let mut expects_value = false;
        for arg in args {
            let legacy = arg
                .strip_prefix('-')
                .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()));
            match legacy {
                Some(digits) if !expects_value => {
                    out.push("-n".to_string());
                    out.push(digits.to_string());
                    expects_value = false;
                }
                _ => {
                    expects_value = !expects_value
                        && self.parser.lookup(arg).is_some_and(|spec| spec.takes_value);
                    out.push(arg.clone());
                }
            }
        }
        out
    }
}

impl Grammar for Utility {
    type Command = UtilityCommand;

    fn names(&self) -> &'static [&'static str] {
        self.names
    }

    fn parse(&self, ctx: &CommandContext) -> Result<UtilityCommand, SyntaxError> {
        let mut args = self.parser.parse(&self.normalize(ctx.args()))?;
        let (min, max) = self.operands;
        let take = args.positionals.len().min(max);
        let operands: Vec<String> = args.positionals.drain(..take).collect();
        if operands.len() < min {
            return Err(SyntaxError::MissingArgument {
                tool: self.tool().into(),
                what: "character set".into(),
            });
        }
        Ok(UtilityCommand {
            tool: self.tool(),
            operands,
            args,
        })
    }

    fn validate(&self, cmd: &UtilityCommand, _ctx: &CommandContext) -> Result<(), PolicyError> {
        reject_file_arguments(cmd.tool, &cmd.args.positionals)?;
        self.parser.validate(&cmd.args, &[])?;
        if let Some(validator) = self.operand {
            for operand in &cmd.operands {
                validator.validate(cmd.tool, "operand", operand)?;
            }
        }
        Ok(())
    }

    fn tokens(&self, cmd: &UtilityCommand) -> Vec<String> {
        let mut out = vec![cmd.tool.to_string()];
        out.extend(cmd.args.flag_tokens());
        out.extend(cmd.operands.iter().cloned());
        out
    }
}

static FIELD_LIST: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^([0-9]+(-[0-9]*)?|-[0-9]+)(,([0-9]+(-[0-9]*)?|-[0-9]+))*$"),
    expected: "a field list such as 1,3-5 or 2-",
};

static SORT_KEY: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[0-9]+(\.[0-9]+)?[bdfghiMnRrV]*(,[0-9]+(\.[0-9]+)?[bdfghiMnRrV]*)?$"),
    expected: "a sort key such as 2 or 3,3n",
};

static HEAD_TAIL_FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["-n", "--lines"], &SIGNED_COUNT),
    FlagSpec::value(&["-c", "--bytes"], &SIGNED_COUNT),
    FlagSpec::switch(&["-q", "--quiet", "--silent"]),
    FlagSpec::switch(&["-z", "--zero-terminated"]),
];

pub static HEAD: Utility = Utility {
    names: &["head"],
    parser: ArgParser::strict("head", HEAD_TAIL_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: true,
};

pub static TAIL: Utility = Utility {
    names: &["tail"],
    parser: ArgParser::strict("tail", HEAD_TAIL_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: true,
};

static WC_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-l", "--lines"]),
    FlagSpec::switch(&["-w", "--words"]),
    FlagSpec::switch(&["-c", "--bytes"]),
    FlagSpec::switch(&["-m", "--chars"]),
    FlagSpec::switch(&["-L", "--max-line-length"]),
];

pub static WC: Utility = Utility {
    names: &["wc"],
    parser: ArgParser::strict("wc", WC_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

static CUT_FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["-d", "--delimiter"], &SINGLE_CHAR),
    FlagSpec::value(&["-f", "--fields"], &FIELD_LIST),
    FlagSpec::value(&["-c", "--characters"], &FIELD_LIST),
    FlagSpec::value(&["-b", "--bytes"], &FIELD_LIST),
    FlagSpec::switch(&["-s", "--only-delimited"]),
    FlagSpec::switch(&["--complement"]),
    FlagSpec::value(&["--output-delimiter"], &FREEFORM),
];

pub static CUT: Utility = Utility {
    names: &["cut"],
    parser: ArgParser::strict("cut", CUT_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

static SORT_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-r", "--reverse"]),
    FlagSpec::switch(&["-n", "--numeric-sort"]),
    FlagSpec::switch(&["-h", "--human-numeric-sort"]),
    FlagSpec::switch(&["-g", "--general-numeric-sort"]),
    FlagSpec::switch(&["-V", "--version-sort"]),
    FlagSpec::switch(&["-M", "--month-sort"]),
    FlagSpec::switch(&["-u", "--unique"]),
    FlagSpec::switch(&["-f", "--ignore-case"]),
    FlagSpec::switch(&["-b", "--ignore-leading-blanks"]),
    FlagSpec::switch(&["-s", "--stable"]),
    FlagSpec::value(&["-k", "--key"], &SORT_KEY),
    FlagSpec::value(&["-t", "--field-separator"], &SINGLE_CHAR),
];

pub static SORT: Utility = Utility {
    names: &["sort"],
    parser: ArgParser::strict("sort", SORT_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

static UNIQ_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-c", "--count"]),
    FlagSpec::switch(&["-d", "--repeated"]),
    FlagSpec::switch(&["-u", "--unique"]),
    FlagSpec::switch(&["-i", "--ignore-case"]),
    FlagSpec::value(&["-f", "--skip-fields"], &COUNT),
    FlagSpec::value(&["-s", "--skip-chars"], &COUNT),
    FlagSpec::value(&["-w", "--check-chars"], &COUNT),
];

pub static UNIQ: Utility = Utility {
    names: &["uniq"],
    parser: ArgParser::strict("uniq", UNIQ_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

static TR_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-d", "--delete"]),
    FlagSpec::switch(&["-s", "--squeeze-repeats"]),
    FlagSpec::switch(&["-c", "-C", "--complement"]),
    FlagSpec::switch(&["-t", "--truncate-set1"]),
];

pub static TR: Utility = Utility {
    names: &["tr"],
    parser: ArgParser::strict("tr", TR_FLAGS),
    operands: (1, 2),
    operand: Some(&FREEFORM),
    legacy_count: false,
};

static BASE64_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-d", "--decode"]),
    FlagSpec::switch(&["-i", "--ignore-garbage"]),
    FlagSpec::value(&["-w", "--wrap"], &COUNT),
];

pub static BASE64: Utility = Utility {
    names: &["base64"],
    parser: ArgParser::strict("base64", BASE64_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

static COLUMN_FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-t", "--table"]),
    FlagSpec::value(&["-s", "--separator"], &FREEFORM),
    FlagSpec::value(&["-o", "--output-separator"], &FREEFORM),
    FlagSpec::value(&["-c", "--output-width"], &COUNT),
    FlagSpec::value(&["-N", "--table-columns"], &FREEFORM),
    FlagSpec::switch(&["-x", "--fillrows"]),
];

pub static COLUMN: Utility = Utility {
    names: &["column"],
    parser: ArgParser::strict("column", COLUMN_FLAGS),
    operands: (0, 0),
    operand: None,
    legacy_count: false,
};

/// Every stdin-only utility.
pub static UTILITIES: &[&Utility] = &[&HEAD, &TAIL, &WC, &CUT, &SORT, &UNIQ, &TR, &BASE64, &COLUMN];
