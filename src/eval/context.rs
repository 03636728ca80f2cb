use crate::config::ExecutorConfig;
use crate::parse::base_command;

/// Context for sanitizing a single pipeline segment.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// The segment text as written, used in log lines.
    pub raw: &'a str,
    /// The leading token that selected the grammar.
    pub base_command: &'a str,
    /// All words of the segment, including the base command.
    pub words: &'a [String],
    /// Zero-based index of this segment in the pipeline.
    pub position: usize,
    /// Caller-supplied policy data.
    pub config: &'a ExecutorConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(raw: &'a str, words: &'a [String], position: usize, config: &'a ExecutorConfig) -> Self {
        Self {
            raw,
            base_command: base_command(words).unwrap_or(""),
            words,
            position,
            config,
        }
    }

    /// Words after the base command.
    pub fn args(&self) -> &'a [String] {
        self.words.get(1..).unwrap_or(&[])
    }

    /// Whether this segment starts the pipeline.
    pub fn is_first(&self) -> bool {
        self.position == 0
    }
}
