//! Reusable predicates for flag values and positional arguments.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PolicyError;

/// Define a lazily compiled, process-wide regex and yield a `'static`
/// reference to it. Usable inside `static` initializers.
macro_rules! lazy_regex {
    ($pat:expr) => {{
        static RE: ::std::sync::LazyLock<::regex::Regex> = ::std::sync::LazyLock::new(|| {
            ::regex::Regex::new($pat).expect("constant regex pattern is valid")
        });
        &RE
    }};
}
pub(crate) use lazy_regex;

/// A value predicate.
#[derive(Debug)]
pub enum Validator {
    /// The whole value must match the regex.
    Pattern {
        regex: &'static LazyLock<Regex>,
        expected: &'static str,
    },
    /// The value must be one of a fixed set.
    OneOf(&'static [&'static str]),
    /// Every validator must pass.
    AllOf(&'static [Validator]),
    /// At least one validator must pass.
    AnyOf(&'static [Validator]),
    /// Arbitrary predicate returning a reason on failure.
    Check(fn(&str) -> Result<(), String>),
}

/// True if `regex` matches the entire `value`.
pub fn full_match(regex: &Regex, value: &str) -> bool {
    regex
        .find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len())
}

impl Validator {
    /// Check a value, returning a human-readable reason on failure.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Validator::Pattern { regex, expected } => {
                if full_match(regex, value) {
                    Ok(())
                } else {
                    Err(format!("expected {expected}"))
                }
            }
            Validator::OneOf(allowed) => {
                if allowed.contains(&value) {
                    Ok(())
                } else {
                    Err(format!("expected one of: {}", allowed.join(", ")))
                }
            }
            Validator::AllOf(all) => all.iter().try_for_each(|v| v.check(value)),
            Validator::AnyOf(any) => {
                let mut reasons = Vec::with_capacity(any.len());
                for v in *any {
                    match v.check(value) {
                        Ok(()) => return Ok(()),
                        Err(reason) => reasons.push(reason),
                    }
                }
                Err(reasons.join(" or "))
            }
            Validator::Check(f) => f(value),
        }
    }

    /// Check a value and wrap a failure as a [`PolicyError::InvalidValue`].
    pub fn validate(&self, tool: &str, field: &str, value: &str) -> Result<(), PolicyError> {
        self.check(value).map_err(|reason| PolicyError::InvalidValue {
            tool: tool.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            reason,
        })
    }
}

// ── Shared validators ──

pub static DNS_LABEL: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$"),
    expected: "a lowercase DNS label (a-z, 0-9, '-', at most 63 characters)",
};

pub static RESOURCE_NAME: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z0-9]([-a-z0-9._]{0,251}[a-z0-9])?$"),
    expected: "a Kubernetes object name (a-z, 0-9, '-', '.', '_')",
};

pub static LABEL_SELECTOR: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[A-Za-z0-9_./=!,() -]{1,512}$"),
    expected: "a label selector such as 'app=web,tier!=cache' or 'env in (a,b)'",
};

pub static FIELD_SELECTOR: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[A-Za-z0-9_./=!,-]{1,512}$"),
    expected: "a field selector such as 'status.phase=Running'",
};

pub static COUNT: Validator = Validator::Check(|value| {
    value
        .parse::<u32>()
        .map(|_| ())
        .map_err(|_| "expected a non-negative integer".to_string())
});

pub static SIGNED_COUNT: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[+-]?[0-9]{1,9}$"),
    expected: "an integer, optionally prefixed with '+' or '-'",
};

pub static DURATION: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^([0-9]{1,6}(ms|s|m|h))+$"),
    expected: "a duration such as 30s, 5m or 1h30m",
};

/// A single character, as taken by `cut -d` or `sort -t`.
pub static SINGLE_CHAR: Validator = Validator::Check(|value| {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() || c == '\t' => Ok(()),
        _ => Err("expected exactly one character".to_string()),
    }
});

/// Free-form text that must not contain shell substitution syntax or
/// control characters.
pub static FREEFORM: Validator = Validator::Check(check_freeform);

/// Free-form text that additionally may not reference shell variables.
pub static NO_EXPANSION: Validator = Validator::AllOf(&[
    Validator::Check(check_freeform),
    Validator::Check(check_no_variables),
]);

/// Program text for jq, sed and awk: bounded length, no control
/// characters beyond tab and newline.
pub static SCRIPT: Validator = Validator::Check(|value| {
    if value.len() > 4096 {
        return Err("script is longer than 4096 bytes".into());
    }
    match value.chars().find(|c| c.is_control() && *c != '\t' && *c != '\n') {
        Some(c) => Err(format!("control character {:?} is not allowed", c)),
        None => Ok(()),
    }
});

/// Regexes naming script constructs a filter must never contain.
#[derive(Debug)]
pub struct Denylist {
    pub entries: &'static [(&'static LazyLock<Regex>, &'static str)],
}

impl Denylist {
    /// The name of the first forbidden construct found in `script`.
    pub fn find(&self, script: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(regex, _)| regex.is_match(script))
            .map(|(_, name)| *name)
    }

    pub fn check(&self, tool: &str, script: &str) -> Result<(), PolicyError> {
        match self.find(script) {
            Some(construct) => Err(PolicyError::ForbiddenScript {
                tool: tool.to_string(),
                construct: construct.to_string(),
            }),
            None => Ok(()),
        }
    }
}

static SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(|\$\{|`|<\(|>\(").expect("constant regex pattern is valid"));

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*|[0-9#?!@*$-])").expect("constant regex pattern is valid")
});

fn check_freeform(value: &str) -> Result<(), String> {
    if value.len() > 4096 {
        return Err("value is longer than 4096 bytes".into());
    }
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err("control characters are not allowed".into());
    }
    if let Some(m) = SUBSTITUTION.find(value) {
        return Err(format!("shell substitution '{}' is not allowed", m.as_str()));
    }
    Ok(())
}

fn check_no_variables(value: &str) -> Result<(), String> {
    match VARIABLE.find(value) {
        Some(m) => Err(format!("shell variable expansion '{}' is not allowed", m.as_str())),
        None => Ok(()),
    }
}
