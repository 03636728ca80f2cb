use crate::error::SyntaxError;

/// Tokenize a command segment into words using shlex (POSIX word splitting).
/// Unbalanced quotes or a dangling escape are an error.
pub fn tokenize(segment: &str) -> Result<Vec<String>, SyntaxError> {
    shlex::split(segment).ok_or_else(|| SyntaxError::Unbalanced {
        segment: segment.chars().take(80).collect(),
    })
}

/// The leading word of a token list, used to select a grammar.
pub fn base_command(tokens: &[String]) -> Option<&str> {
    tokens.first().map(String::as_str)
}
