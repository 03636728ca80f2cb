//! Sandboxed `kubectl run`: the image must be configured and the
//! in-container command must match one of that image's patterns.

use super::KubectlCommand;
use crate::config::ExecutorConfig;
use crate::error::PolicyError;
use crate::escape::join_tokens;

pub(super) fn validate(cmd: &KubectlCommand, config: &ExecutorConfig) -> Result<(), PolicyError> {
    let image = cmd.image.as_deref().unwrap_or_default();
    let Some(allowed) = config.image(image) else {
        return Err(PolicyError::ImageNotAllowed {
            image: image.to_string(),
            allowed: config.image_names(),
        });
    };

    // Patterns see the command exactly as it will be emitted.
    let command = join_tokens(&cmd.container_command).map_err(|_| PolicyError::CommandNotAllowed {
        image: image.to_string(),
        command: cmd.container_command.join(" "),
    })?;

    if allowed.permits(&command) {
        log::debug!("kubectl run: {image} permits {command:?}");
        Ok(())
    } else {
        Err(PolicyError::CommandNotAllowed {
            image: image.to_string(),
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::CommandSpec;
    use crate::commands::tools::kubectl::KubectlSpec;
    use crate::config::{AllowedImage, ExecutorConfig};
    use crate::error::{PolicyError, SanitizeError};
    use crate::eval::CommandContext;

    fn config() -> ExecutorConfig {
        ExecutorConfig {
            allowed_images: vec![
                AllowedImage {
                    image: "busybox:1.36".into(),
                    allowed_command_patterns: vec![r"nslookup [a-z0-9.-]+".into(), "date".into()],
                },
                AllowedImage {
                    image: "curlimages/curl:8.8.0".into(),
                    allowed_command_patterns: vec![r"curl -sS https://[a-z0-9.-]+/healthz".into()],
                },
            ],
        }
    }

    fn sanitize(cmd: &str, config: &ExecutorConfig) -> Result<String, SanitizeError> {
        let words = shlex::split(cmd).unwrap();
        let ctx = CommandContext::new(cmd, &words, 0, config);
        KubectlSpec.sanitize(&ctx)
    }

    #[test]
    fn allowed_image_and_command() {
        assert_eq!(
            sanitize(
                "kubectl run dns-check --image busybox:1.36 --rm -i --restart=Never -- nslookup kubernetes.default",
                &config(),
            )
            .unwrap(),
            "kubectl run dns-check --image busybox:1.36 --rm --stdin --restart Never -- nslookup kubernetes.default"
        );
    }

    #[test]
    fn image_not_configured() {
        let err = sanitize("kubectl run x --image alpine -- date", &config()).unwrap_err();
        match err {
            SanitizeError::Policy(PolicyError::ImageNotAllowed { image, allowed }) => {
                assert_eq!(image, "alpine");
                assert_eq!(allowed, vec!["busybox:1.36", "curlimages/curl:8.8.0"]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn empty_config_allows_nothing() {
        let err = sanitize("kubectl run x --image busybox:1.36 -- date", &ExecutorConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SanitizeError::Policy(PolicyError::ImageNotAllowed { .. })
        ));
    }

    #[test]
    fn command_must_match_whole_pattern() {
        for cmd in [
            "kubectl run x --image busybox:1.36 -- nslookup evil.com; sh",
            "kubectl run x --image busybox:1.36 -- sh -c date",
            "kubectl run x --image busybox:1.36 -- date -s 2020-01-01",
        ] {
            let err = sanitize(cmd, &config()).unwrap_err();
            assert!(
                matches!(err, SanitizeError::Policy(PolicyError::CommandNotAllowed { .. })),
                "{cmd}: {err}"
            );
        }
    }

    #[test]
    fn pattern_sees_escaped_command() {
        assert!(
            sanitize(
                "kubectl run x --image curlimages/curl:8.8.0 -- curl -sS https://api.internal/healthz",
                &config(),
            )
            .is_ok()
        );
    }

    #[test]
    fn image_and_command_required() {
        assert!(sanitize("kubectl run x -- date", &config()).unwrap_err().is_syntax());
        assert!(sanitize("kubectl run x --image busybox:1.36", &config()).unwrap_err().is_syntax());
        assert!(sanitize("kubectl run x --image busybox:1.36 --", &config()).unwrap_err().is_syntax());
    }

    #[test]
    fn restart_policy_fixed() {
        let err = sanitize(
            "kubectl run x --image busybox:1.36 --restart Always -- date",
            &config(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SanitizeError::Policy(PolicyError::InvalidValue { .. })
        ));
    }
}
