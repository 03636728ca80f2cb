//! `sed` as a stream editor over stdin.
//!
//! Scripts are scanned command by command rather than matched with
//! regexes, so an `e` or `w` hidden inside an `s` replacement or after an
//! address is still seen. Anything the scanner does not recognize is
//! rejected.

use super::args::{ArgParser, FlagSpec, ParsedArgs};
use super::{Grammar, reject_file_arguments};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::validators::SCRIPT;

static FLAGS: &[FlagSpec] = &[
    FlagSpec::switch(&["-n", "--quiet", "--silent"]),
    FlagSpec::switch(&["-E", "-r", "--regexp-extended"]),
    FlagSpec::switch(&["-z", "--null-data"]),
    FlagSpec::switch(&["-s", "--separate"]),
    FlagSpec::switch(&["--posix"]),
    FlagSpec::value(&["--expression", "-e"], &SCRIPT),
];

static PARSER: ArgParser = ArgParser::strict("sed", FLAGS);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SedCommand {
    /// Scripts from `-e` or the single positional script, in order.
    pub scripts: Vec<String>,
    /// True when the script came from a positional rather than `-e`.
    pub positional_script: bool,
    pub args: ParsedArgs,
}

pub struct SedSpec;

impl Grammar for SedSpec {
    type Command = SedCommand;

    fn names(&self) -> &'static [&'static str] {
        &["sed"]
    }

    fn parse(&self, ctx: &CommandContext) -> Result<SedCommand, SyntaxError> {
        let mut args = PARSER.parse(ctx.args())?;
        let mut scripts: Vec<String> = args
            .flags
            .iter()
            .filter(|f| f.known && f.name == "--expression")
            .filter_map(|f| f.value.clone())
            .collect();
        let positional_script = scripts.is_empty();
        if positional_script {
            if args.positionals.is_empty() {
                return Err(SyntaxError::MissingArgument {
                    tool: "sed".into(),
                    what: "script".into(),
                });
            }
            scripts.push(args.positionals.remove(0));
        }
        Ok(SedCommand {
            scripts,
            positional_script,
            args,
        })
    }

    fn validate(&self, cmd: &SedCommand, _ctx: &CommandContext) -> Result<(), PolicyError> {
        reject_file_arguments("sed", &cmd.args.positionals)?;
        PARSER.validate(&cmd.args, &[])?;
        for script in &cmd.scripts {
            SCRIPT.validate("sed", "script", script)?;
            if let Some(construct) = forbidden_construct(script) {
                return Err(PolicyError::ForbiddenScript {
                    tool: "sed".into(),
                    construct: construct.into(),
                });
            }
        }
        Ok(())
    }

    fn tokens(&self, cmd: &SedCommand) -> Vec<String> {
        let mut out = vec!["sed".to_string()];
        out.extend(cmd.args.flag_tokens());
        if cmd.positional_script {
            out.extend(cmd.scripts.iter().cloned());
        }
        out
    }
}

/// Scan a sed script and name the first command that executes, reads or
/// writes, or `None` if every command is a pure text operation.
pub fn forbidden_construct(script: &str) -> Option<&'static str> {
    let mut s = Scanner {
        chars: script.chars().collect(),
        pos: 0,
    };
    loop {
        s.skip(|c| c.is_whitespace() || c == ';' || c == '}');
        if s.at_end() {
            return None;
        }
        if !s.address() {
            return Some("malformed address");
        }
        s.skip(|c| c == ' ' || c == '\t');
        if s.peek() == Some('!') {
            s.pos += 1;
            s.skip(|c| c == ' ' || c == '\t');
        }
        let Some(cmd) = s.next() else {
            return Some("address without command");
        };
        match cmd {
            '{' | '=' | 'd' | 'D' | 'g' | 'G' | 'h' | 'H' | 'n' | 'N' | 'p' | 'P' | 'x' | 'z'
            | 'F' => {}
            'l' | 'L' | 'q' | 'Q' => s.skip(|c| c.is_ascii_digit() || c == ' '),
            '#' | ':' | 'b' | 't' | 'T' | 'v' => s.skip_label(),
            'a' | 'i' | 'c' => s.skip_text(),
            'y' => {
                if !s.delimited(2) {
                    return Some("unterminated y command");
                }
            }
            's' => {
                if !s.delimited(2) {
                    return Some("unterminated s command");
                }
                while let Some(flag) = s.peek() {
                    match flag {
                        'e' => return Some("s///e"),
                        'w' | 'W' => return Some("s///w"),
                        'g' | 'p' | 'i' | 'I' | 'm' | 'M' => s.pos += 1,
                        c if c.is_ascii_digit() => s.pos += 1,
                        _ => break,
                    }
                }
            }
            'e' => return Some("e"),
            'w' | 'W' => return Some("w"),
            'r' | 'R' => return Some("r"),
            _ => return Some("unrecognized command"),
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    /// Labels and comments run to `;` or end of line.
    fn skip_label(&mut self) {
        self.skip(|c| c != ';' && c != '\n');
    }

    /// `a`, `i`, `c` text runs to an unescaped end of line.
    fn skip_text(&mut self) {
        while let Some(c) = self.next() {
            match c {
                '\\' => self.pos += 1,
                '\n' => return,
                _ => {}
            }
        }
    }

    /// Consume up to two addresses (`1`, `$`, `/re/`, `\%re%`, `first~step`,
    /// `addr,+N`). Returns false on an unterminated regex address.
    fn address(&mut self) -> bool {
        for i in 0..2 {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    self.skip(|c| c.is_ascii_digit() || c == '~');
                }
                Some('$') => self.pos += 1,
                Some('+' | '~') if i == 1 => {
                    self.pos += 1;
                    self.skip(|c| c.is_ascii_digit());
                }
                Some('/') => {
                    self.pos += 1;
                    if !self.delimited_by('/', 1) {
                        return false;
                    }
                    self.skip(|c| c == 'I' || c == 'M');
                }
                Some('\\') => {
                    self.pos += 1;
                    let Some(delim) = self.next() else {
                        return false;
                    };
                    if !self.delimited_by(delim, 1) {
                        return false;
                    }
                    self.skip(|c| c == 'I' || c == 'M');
                }
                _ => return true,
            }
            if i == 0 && self.peek() == Some(',') {
                self.pos += 1;
            } else {
                return true;
            }
        }
        true
    }

    /// Consume `parts` sections ended by the delimiter that follows the
    /// command letter.
    fn delimited(&mut self, parts: usize) -> bool {
        match self.next() {
            Some(delim) if delim != '\n' && delim != '\\' => self.delimited_by(delim, parts),
            _ => false,
        }
    }

    fn delimited_by(&mut self, delim: char, parts: usize) -> bool {
        let mut remaining = parts;
        while let Some(c) = self.next() {
            if c == '\\' {
                self.pos += 1;
            } else if c == delim {
                remaining -= 1;
                if remaining == 0 {
                    return true;
                }
            }
        }
        false
    }
}
