use super::tokenize::tokenize;
use super::types::{Operator, Pipeline, Segment};
use crate::error::SyntaxError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split a command at shell operators (&&, ||, ;, newline, |, |&), keeping
/// quoted and backslash-escaped characters in their word.
///
/// Returns the trimmed, non-empty parts and every operator seen.
fn split_compound_command(command: &str) -> (Vec<String>, Vec<Operator>) {
    let mut parts = Vec::new();
    let mut operators = Vec::new();
    let mut buf = String::new();
    let mut quote = Quote::None;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::Single, '\'') => quote = Quote::None,
            (Quote::Single, _) => {}
            (Quote::Double, '"') => quote = Quote::None,
            (_, '\\') => {
                buf.push(c);
                if let Some(escaped) = chars.next() {
                    buf.push(escaped);
                }
                continue;
            }
            (Quote::Double, _) => {}
            (Quote::None, '\'') => quote = Quote::Single,
            (Quote::None, '"') => quote = Quote::Double,
            (Quote::None, '&' | '|' | ';' | '\n') => {
                let op = match (c, chars.peek()) {
                    ('&', Some('&')) => Some(Operator::And),
                    ('|', Some('|')) => Some(Operator::Or),
                    ('|', Some('&')) => Some(Operator::PipeErr),
                    ('|', _) => Some(Operator::Pipe),
                    (';', _) => Some(Operator::Semi),
                    ('\n', _) => Some(Operator::Newline),
                    _ => None,
                };
                if let Some(op) = op {
                    if matches!(op, Operator::And | Operator::Or | Operator::PipeErr) {
                        chars.next();
                    }
                    parts.push(std::mem::take(&mut buf));
                    operators.push(op);
                    continue;
                }
            }
            (Quote::None, _) => {}
        }
        buf.push(c);
    }
    parts.push(buf);

    let parts = parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    (parts, operators)
}

/// Split raw command text into a pipeline of tokenized segments.
///
/// Only `|` may join segments. Any other chaining operator is a syntax
/// error, reported by its shell spelling. Empty input, or input made only of
/// pipes, yields an empty pipeline.
pub fn split_pipeline(command: &str) -> Result<Pipeline, SyntaxError> {
    // Surrounding whitespace, including a trailing newline, is not a chain
    let (parts, operators) = split_compound_command(command.trim());

    if let Some(op) = operators.iter().find(|op| **op != Operator::Pipe) {
        return Err(SyntaxError::ChainOperator {
            operator: op.as_str().to_string(),
        });
    }

    let segments = parts
        .into_iter()
        .map(|text| {
            let tokens = tokenize(&text)?;
            Ok(Segment { text, tokens })
        })
        .collect::<Result<Vec<_>, SyntaxError>>()?;

    Ok(Pipeline {
        segments: segments
            .into_iter()
            .filter(|s| !s.tokens.is_empty())
            .collect(),
    })
}
