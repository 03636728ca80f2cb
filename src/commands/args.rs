//! Table-driven flag parsing shared by every grammar.
//!
//! A grammar declares its flags as [`FlagSpec`]s; [`ArgParser::parse`] turns
//! raw tokens into [`ParsedArgs`] without making policy decisions, and
//! [`ArgParser::validate`] applies the declared validators afterwards.

use crate::error::{PolicyError, SyntaxError};
use crate::policy::validators::{FREEFORM, Validator};

/// One recognized flag. The first name is canonical.
#[derive(Debug)]
pub struct FlagSpec {
    pub names: &'static [&'static str],
    pub takes_value: bool,
    pub validator: Option<&'static Validator>,
}

impl FlagSpec {
    /// A boolean flag.
    pub const fn switch(names: &'static [&'static str]) -> Self {
        Self {
            names,
            takes_value: false,
            validator: None,
        }
    }

    /// A flag consuming exactly one value, checked by `validator`.
    pub const fn value(names: &'static [&'static str], validator: &'static Validator) -> Self {
        Self {
            names,
            takes_value: true,
            validator: Some(validator),
        }
    }

    pub fn canonical(&self) -> &'static str {
        self.names[0]
    }
}

/// A flag as parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    /// Canonical name for known flags, the name as written otherwise.
    pub name: String,
    pub value: Option<String>,
    /// Whether `name` was found in the grammar's flag table.
    pub known: bool,
    /// Unknown flags written as `--name=value` keep that form.
    pub inline: bool,
}

impl Flag {
    fn known(spec: &FlagSpec, value: Option<String>) -> Self {
        Self {
            name: spec.canonical().to_string(),
            value,
            known: true,
            inline: false,
        }
    }

    fn unknown(name: &str, value: Option<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            known: false,
            inline,
        }
    }

    /// Canonical tokens for this flag.
    pub fn push_tokens(&self, out: &mut Vec<String>) {
        match (&self.value, self.inline) {
            (Some(v), true) => out.push(format!("{}={v}", self.name)),
            (Some(v), false) => {
                out.push(self.name.clone());
                out.push(v.clone());
            }
            (None, _) => out.push(self.name.clone()),
        }
    }
}

/// Tokens split into positionals, flags, and anything after `--`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positionals: Vec<String>,
    pub flags: Vec<Flag>,
    pub trailing: Option<Vec<String>>,
}

impl ParsedArgs {
    pub fn has(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name)
    }

    /// The last value given for a flag.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .rev()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    /// Canonical tokens for all flags, in their original order.
    pub fn flag_tokens(&self) -> Vec<String> {
        let mut out = Vec::new();
        for flag in &self.flags {
            flag.push_tokens(&mut out);
        }
        out
    }
}

/// How a grammar treats flags missing from its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFlags {
    /// Record them; validation rejects them.
    Reject,
    /// Record them, pairing each with a following non-flag token as its
    /// value; validation only checks the value is free-form safe.
    PassThrough,
}

#[derive(Debug)]
pub struct ArgParser {
    pub tool: &'static str,
    pub flags: &'static [FlagSpec],
    pub unknown: UnknownFlags,
    /// Whether `--` ends options and collects the rest as trailing args.
    pub trailing: bool,
}

impl ArgParser {
    pub const fn strict(tool: &'static str, flags: &'static [FlagSpec]) -> Self {
        Self {
            tool,
            flags,
            unknown: UnknownFlags::Reject,
            trailing: false,
        }
    }

    pub const fn pass_through(tool: &'static str, flags: &'static [FlagSpec]) -> Self {
        Self {
            tool,
            flags,
            unknown: UnknownFlags::PassThrough,
            trailing: false,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static FlagSpec> {
        self.flags.iter().find(|spec| spec.names.contains(&name))
    }

    fn missing_value(&self, flag: &str) -> SyntaxError {
        SyntaxError::MissingValue {
            tool: self.tool.to_string(),
            flag: flag.to_string(),
        }
    }

    /// Split tokens into positionals and flags.
    pub fn parse(&self, args: &[String]) -> Result<ParsedArgs, SyntaxError> {
        let mut parsed = ParsedArgs::default();
        let mut i = 0;

        while i < args.len() {
            let tok = args[i].as_str();
            i += 1;

            if tok == "--" {
                if self.trailing {
                    parsed.trailing = Some(args[i..].to_vec());
                    break;
                }
                parsed.flags.push(Flag::unknown(tok, None, false));
                continue;
            }

            if tok == "-" || !tok.starts_with('-') {
                parsed.positionals.push(tok.to_string());
                continue;
            }

            // Long flag, or a short flag spelled exactly as declared (-n, -A)
            let (name, inline) = match tok.split_once('=') {
                Some((n, v)) if tok.starts_with("--") => (n, Some(v)),
                _ => (tok, None),
            };
            if let Some(spec) = self.lookup(name) {
                if spec.takes_value {
                    let value = match inline {
                        Some(v) => v.to_string(),
                        None => {
                            let v = args.get(i).ok_or_else(|| self.missing_value(name))?;
                            i += 1;
                            v.clone()
                        }
                    };
                    parsed.flags.push(Flag::known(spec, Some(value)));
                } else if inline.is_some() {
                    parsed.flags.push(Flag::unknown(tok, None, false));
                } else {
                    parsed.flags.push(Flag::known(spec, None));
                }
                continue;
            }

            if !tok.starts_with("--")
                && let Some((flags, consumed)) = self.expand_bundle(tok, args.get(i))?
            {
                parsed.flags.extend(flags);
                i += consumed;
                continue;
            }

            match self.unknown {
                UnknownFlags::Reject => {
                    parsed
                        .flags
                        .push(Flag::unknown(name, inline.map(String::from), inline.is_some()));
                }
                UnknownFlags::PassThrough => {
                    if let Some(v) = inline {
                        parsed.flags.push(Flag::unknown(name, Some(v.to_string()), true));
                    } else if let Some(next) = args.get(i).filter(|n| !n.starts_with('-')) {
                        parsed.flags.push(Flag::unknown(name, Some(next.clone()), false));
                        i += 1;
                    } else {
                        parsed.flags.push(Flag::unknown(name, None, false));
                    }
                }
            }
        }

        Ok(parsed)
    }

    /// Expand bundled short flags: `-rn`, `-nk2`, `-d,`, `-ojson`.
    ///
    /// Returns `None` if any character is not a declared short flag, and the
    /// number of following tokens consumed otherwise.
    fn expand_bundle(
        &self,
        tok: &str,
        next: Option<&String>,
    ) -> Result<Option<(Vec<Flag>, usize)>, SyntaxError> {
        let body = &tok[1..];
        let mut flags = Vec::new();
        for (idx, c) in body.char_indices() {
            let short = format!("-{c}");
            let Some(spec) = self.lookup(&short) else {
                return Ok(None);
            };
            if !spec.takes_value {
                flags.push(Flag::known(spec, None));
                continue;
            }
            let rest = &body[idx + c.len_utf8()..];
            if !rest.is_empty() {
                flags.push(Flag::known(spec, Some(rest.to_string())));
                return Ok(Some((flags, 0)));
            }
            let value = next.ok_or_else(|| self.missing_value(&short))?;
            flags.push(Flag::known(spec, Some(value.clone())));
            return Ok(Some((flags, 1)));
        }
        Ok(Some((flags, 0)))
    }

    /// Reject forbidden and (in strict mode) unknown flags, and run every
    /// declared validator.
    pub fn validate(&self, parsed: &ParsedArgs, forbidden: &[&str]) -> Result<(), PolicyError> {
        for flag in &parsed.flags {
            if flag_matches(&flag.name, forbidden) {
                return Err(PolicyError::FlagNotPermitted {
                    tool: self.tool.to_string(),
                    flag: flag.name.clone(),
                    allowed: vec![],
                });
            }
            if !flag.known {
                match self.unknown {
                    UnknownFlags::Reject => {
                        return Err(PolicyError::FlagNotPermitted {
                            tool: self.tool.to_string(),
                            flag: flag.name.clone(),
                            allowed: self.flags.iter().map(|s| s.canonical().to_string()).collect(),
                        });
                    }
                    UnknownFlags::PassThrough => {
                        if let Some(value) = &flag.value {
                            FREEFORM.validate(self.tool, &flag.name, value)?;
                        }
                        continue;
                    }
                }
            }
            let spec = self.lookup(&flag.name);
            if let (Some(validator), Some(value)) = (spec.and_then(|s| s.validator), &flag.value) {
                validator.validate(self.tool, &flag.name, value)?;
            }
        }
        Ok(())
    }
}

/// Long flags match by name; short ones match anywhere in a single-dash
/// bundle, so `-tf` matches `-f`.
pub(crate) fn flag_matches(name: &str, names: &[&str]) -> bool {
    names.iter().any(|f| {
        if f.starts_with("--") || name.starts_with("--") {
            name == *f
        } else {
            let c = &f[1..];
            name.starts_with('-') && name[1..].contains(c)
        }
    })
}
