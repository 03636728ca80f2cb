use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::LoggingConfig;
use crate::error::SanitizeError;

/// Route `log` records to the decision log file.
/// Best-effort: returns false when logging is disabled or the file cannot be
/// opened (logging must never block a decision).
pub fn init(config: &LoggingConfig) -> bool {
    if !config.enabled {
        return false;
    }
    let Some(path) = config.path.clone().or_else(default_path) else {
        return false;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return false;
    };
    let level = config.level.parse().unwrap_or(LevelFilter::Info);
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, log_config, file).is_ok()
}

/// `~/.local/share/shellgate/decisions.log`
fn default_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".local/share/shellgate/decisions.log"))
}

/// Record one sanitize decision at info level.
pub fn log_decision(command: &str, result: &Result<String, SanitizeError>) {
    log::info!("{}", decision_line(command, result));
}

/// `{decision}\t{command}\t{detail}` where decision is `ok`, `syntax` or
/// `policy` and detail is the sanitized command or the reason.
fn decision_line(command: &str, result: &Result<String, SanitizeError>) -> String {
    let (decision, detail) = match result {
        Ok(sanitized) => ("ok", sanitized.clone()),
        Err(e) => (e.kind().as_str(), e.to_string()),
    };
    format!(
        "{decision}\t{cmd}\t{detail}",
        cmd = oneline(command, 200),
        detail = oneline(&detail, 400),
    )
}

fn oneline(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .collect::<String>()
        .replace(['\n', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PolicyError, SyntaxError};

    #[test]
    fn accepted_line_carries_sanitized_form() {
        let line = decision_line(
            "kubectl get pods -n default",
            &Ok("kubectl get pods --namespace default".into()),
        );
        assert_eq!(
            line,
            "ok\tkubectl get pods -n default\tkubectl get pods --namespace default"
        );
    }

    #[test]
    fn rejected_line_carries_kind_and_reason() {
        let err = PolicyError::Blocked {
            tool: "docker".into(),
            operation: "run".into(),
        };
        let line = decision_line("docker run nginx", &Err(err.into()));
        assert_eq!(
            line,
            "policy\tdocker run nginx\tpolicy violation: docker: blocked operation 'run'"
        );

        let err = SyntaxError::ChainOperator {
            operator: "&&".into(),
        };
        assert!(decision_line("a && b", &Err(err.into())).starts_with("syntax\t"));
    }

    #[test]
    fn fields_stay_on_one_line() {
        let long = format!("awk '{{print}}\n{}'", "x".repeat(500));
        let line = decision_line(&long, &Ok("x".into()));
        assert_eq!(line.lines().count(), 1);
        assert_eq!(line.split('\t').count(), 3);
        assert!(line.split('\t').nth(1).unwrap().chars().count() <= 200);
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(!init(&config));
    }
}
