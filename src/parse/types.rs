//! Types produced by the pipeline splitter and consumed by the eval layer.

/// Shell operator separating consecutive segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
    /// `;`: run next unconditionally
    Semi,
    /// unquoted newline, same as `;`
    Newline,
    /// `|`: pipe stdout
    Pipe,
    /// `|&`: pipe stdout+stderr
    PipeErr,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Semi => ";",
            Operator::Newline => "\\n",
            Operator::Pipe => "|",
            Operator::PipeErr => "|&",
        }
    }
}

/// One command between pipe delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Raw segment text, trimmed.
    pub text: String,
    /// POSIX-tokenized words of `text`.
    pub tokens: Vec<String>,
}

/// A pipeline of segments joined by `|`.
///
/// An empty pipeline is valid and sanitizes to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub segments: Vec<Segment>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
