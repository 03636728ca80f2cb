//! Failure types returned by the gateway.
//!
//! Every refusal is either a [`SyntaxError`] (the text or the tool's argument
//! shape is malformed) or a [`PolicyError`] (the command is well-formed but
//! not permitted). Messages are written for the calling agent: they name the
//! offending tool, operation or flag and, where there is a short list, the
//! permitted alternatives.

use thiserror::Error;

/// Which of the two failure families an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Policy,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Policy => "policy",
        }
    }
}

/// Top-level error returned by [`crate::sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("policy violation: {0}")]
    Policy(#[from] PolicyError),
}

impl SanitizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SanitizeError::Syntax(_) => ErrorKind::Syntax,
            SanitizeError::Policy(_) => ErrorKind::Policy,
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    pub fn is_policy(&self) -> bool {
        self.kind() == ErrorKind::Policy
    }
}

/// Structural failures: the input cannot be tokenized or does not fit the
/// tool's argument shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unbalanced quoting or trailing escape in `{segment}`")]
    Unbalanced { segment: String },

    #[error("chaining with '{operator}' is not supported; only '|' pipelines are allowed")]
    ChainOperator { operator: String },

    #[error("unsupported tool '{tool}'; supported tools: {supported}")]
    UnsupportedTool { tool: String, supported: String },

    #[error("{tool}: flag '{flag}' requires a value")]
    MissingValue { tool: String, flag: String },

    #[error("{tool}: missing {what}")]
    MissingArgument { tool: String, what: String },

    #[error("{tool}: unexpected argument '{argument}'")]
    UnexpectedArgument { tool: String, argument: String },

    #[error("argument contains a NUL byte and cannot be quoted")]
    Unquotable,
}

/// Security decisions: the command parsed but is not permitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{tool}: blocked operation '{operation}'")]
    Blocked { tool: String, operation: String },

    #[error("{tool}: operation '{operation}' is not in the allowlist{}", alternatives_suffix(.allowed))]
    NotAllowed {
        tool: String,
        operation: String,
        allowed: Vec<String>,
    },

    #[error("{tool}: flag '{flag}' is not permitted{}", alternatives_suffix(.allowed))]
    FlagNotPermitted {
        tool: String,
        flag: String,
        allowed: Vec<String>,
    },

    #[error("{tool}: invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        tool: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("{tool}: '{argument}' looks like a file argument; {tool} only reads from stdin")]
    FileArgument { tool: String, argument: String },

    #[error("{tool} cannot start a pipeline; pipe another command's output into it")]
    FirstSegment { tool: String },

    #[error("{tool}: script contains a forbidden construct ({construct})")]
    ForbiddenScript { tool: String, construct: String },

    #[error("image '{image}' is not approved for sandboxed run{}", alternatives_suffix(.allowed))]
    ImageNotAllowed { image: String, allowed: Vec<String> },

    #[error("command `{command}` is not approved for image '{image}'")]
    CommandNotAllowed { image: String, command: String },
}

fn alternatives_suffix(allowed: &[String]) -> String {
    if allowed.is_empty() {
        String::new()
    } else {
        format!("; allowed: {}", allowed.join(", "))
    }
}

pub type Result<T, E = SanitizeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_distinguishes_families() {
        let s: SanitizeError = SyntaxError::ChainOperator {
            operator: "&&".into(),
        }
        .into();
        assert!(s.is_syntax());
        let p: SanitizeError = PolicyError::FirstSegment {
            tool: "grep".into(),
        }
        .into();
        assert!(p.is_policy());
        assert_eq!(p.kind().as_str(), "policy");
    }

    #[test]
    fn blocked_message_names_operation() {
        let e = PolicyError::Blocked {
            tool: "docker".into(),
            operation: "run".into(),
        };
        assert_eq!(e.to_string(), "docker: blocked operation 'run'");
    }

    #[test]
    fn not_allowed_lists_alternatives() {
        let e = PolicyError::NotAllowed {
            tool: "helm".into(),
            operation: "install".into(),
            allowed: vec!["list".into(), "status".into()],
        };
        assert_eq!(
            e.to_string(),
            "helm: operation 'install' is not in the allowlist; allowed: list, status"
        );
    }

    #[test]
    fn not_allowed_without_alternatives() {
        let e = PolicyError::NotAllowed {
            tool: "aws".into(),
            operation: "foo".into(),
            allowed: vec![],
        };
        assert_eq!(e.to_string(), "aws: operation 'foo' is not in the allowlist");
    }
}
