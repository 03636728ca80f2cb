//! Token list → shell-safe command string.
//!
//! Rules, first match wins:
//!   1. only alphanumerics and `. - _ = / , :` → emitted as-is
//!   2. a flag (`-…`) with no metacharacters, quotes or whitespace → as-is
//!   3. a POSIX bracket class (`[:digit:]`, `[[:space:]]`) → single-quoted
//!   4. no embedded `'` → single-quoted
//!   5. nothing double quotes would expand or terminate → double-quoted
//!   6. anything else → `shlex::try_quote`

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SyntaxError;

const SAFE_PUNCTUATION: &[char] = &['.', '-', '_', '=', '/', ',', ':'];

/// Characters that change meaning in an unquoted word.
const SHELL_META: &[char] = &[
    ';', '|', '&', '$', '`', '<', '>', '(', ')', '{', '}', '[', ']', '*', '?', '~', '#', '!',
    '\\', '\'', '"', '%', '^',
];

/// Characters that double quotes do not neutralize, plus the quote itself.
const DOUBLE_QUOTE_ACTIVE: &[char] = &['"', '$', '`', '\\', '!'];

static BRACKET_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?\[:(alnum|alpha|blank|cntrl|digit|graph|lower|print|punct|space|upper|xdigit):\]\]?$",
    )
    .expect("constant regex pattern is valid")
});

fn is_plain(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(&c))
}

fn is_bare_flag(token: &str) -> bool {
    token.starts_with('-')
        && token
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !SHELL_META.contains(&c))
}

/// Escape a single token for inclusion in a POSIX shell command line.
pub fn escape_token(token: &str) -> Result<Cow<'_, str>, SyntaxError> {
    if token.contains('\0') {
        return Err(SyntaxError::Unquotable);
    }
    if token.is_empty() {
        return Ok(Cow::Borrowed("''"));
    }
    if is_plain(token) || is_bare_flag(token) {
        return Ok(Cow::Borrowed(token));
    }
    if BRACKET_CLASS.is_match(token) || !token.contains('\'') {
        return Ok(Cow::Owned(format!("'{token}'")));
    }
    if !token.contains(DOUBLE_QUOTE_ACTIVE) {
        return Ok(Cow::Owned(format!("\"{token}\"")));
    }
    shlex::try_quote(token).map_err(|_| SyntaxError::Unquotable)
}

/// Escape every token and join them with single spaces.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<String, SyntaxError> {
    let escaped = tokens
        .iter()
        .map(|t| escape_token(t.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(escaped.join(" "))
}
