pub mod context;

pub use context::CommandContext;

use std::collections::HashMap;

use crate::commands::CommandSpec;
use crate::commands::awk::AwkSpec;
use crate::commands::grep::GrepSpec;
use crate::commands::jq::JqSpec;
use crate::commands::sed::SedSpec;
use crate::commands::simple::UTILITIES;
use crate::commands::tools::{
    argocd::ARGOCD, aws::AWS, azure::AZURE, docker::DOCKER, gcloud::GCLOUD, helm::HELM,
    kubectl::KubectlSpec,
};
use crate::config::ExecutorConfig;
use crate::error::{SanitizeError, SyntaxError};
use crate::parse::{self, Segment};

/// Registry of all grammars, keyed by the exact leading token.
pub struct CommandRegistry {
    specs: HashMap<&'static str, &'static dyn CommandSpec>,
}

static KUBECTL: KubectlSpec = KubectlSpec;
static GREP: GrepSpec = GrepSpec;
static JQ: JqSpec = JqSpec;
static SED: SedSpec = SedSpec;
static AWK: AwkSpec = AwkSpec;

impl CommandRegistry {
    /// Build the registry with every supported tool.
    pub fn new() -> Self {
        let mut registry = Self {
            specs: HashMap::new(),
        };
        registry.register(&KUBECTL);
        for cli in [&AWS, &AZURE, &GCLOUD, &DOCKER, &HELM, &ARGOCD] {
            registry.register(cli);
        }
        registry.register(&GREP);
        registry.register(&JQ);
        registry.register(&SED);
        registry.register(&AWK);
        for utility in UTILITIES {
            registry.register(*utility);
        }
        registry
    }

    fn register<G: crate::commands::Grammar + 'static>(&mut self, grammar: &'static G) {
        for name in grammar.names() {
            self.specs.insert(*name, grammar);
        }
    }

    /// Leading tokens this registry accepts, sorted.
    pub fn supported_tools(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.specs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Look up a grammar by exact command name.
    fn get(&self, name: &str) -> Option<&'static dyn CommandSpec> {
        self.specs.get(name).copied()
    }

    /// Sanitize one segment at `position` in its pipeline.
    pub fn sanitize_segment(
        &self,
        segment: &Segment,
        position: usize,
        config: &ExecutorConfig,
    ) -> Result<String, SanitizeError> {
        let ctx = CommandContext::new(&segment.text, &segment.tokens, position, config);
        let Some(spec) = self.get(ctx.base_command) else {
            return Err(SyntaxError::UnsupportedTool {
                tool: ctx.base_command.to_string(),
                supported: self.supported_tools().join(", "),
            }
            .into());
        };
        let safe = spec.sanitize(&ctx)?;
        log::debug!("segment {position}: {:?} -> {safe:?}", ctx.raw);
        Ok(safe)
    }

    /// Sanitize a full pipeline. Every segment must pass; the first failure
    /// rejects the whole command.
    pub fn sanitize(&self, command: &str, config: &ExecutorConfig) -> Result<String, SanitizeError> {
        let pipeline = parse::split_pipeline(command)?;
        let segments = pipeline
            .segments
            .iter()
            .enumerate()
            .map(|(position, segment)| self.sanitize_segment(segment, position, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(segments.join(" | "))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;

    fn sanitize(cmd: &str) -> Result<String, SanitizeError> {
        CommandRegistry::new().sanitize(cmd, &ExecutorConfig::default())
    }

    #[test]
    fn every_tool_registered() {
        let tools = CommandRegistry::new().supported_tools();
        for name in [
            "kubectl", "aws", "az", "gcloud", "docker", "helm", "argocd", "grep", "jq", "sed",
            "awk", "head", "tail", "wc", "cut", "sort", "uniq", "tr", "base64", "column",
        ] {
            assert!(tools.contains(&name), "{name}");
        }
    }

    #[test]
    fn pipeline_joined_with_pipes() {
        assert_eq!(
            sanitize("kubectl get pods -n default | grep nginx | head -5").unwrap(),
            "kubectl get pods --namespace default | grep nginx | head -n 5"
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize("").unwrap(), "");
        assert_eq!(sanitize("   ").unwrap(), "");
    }

    #[test]
    fn unknown_tool_is_syntax_error() {
        match sanitize("rm -rf /") {
            Err(SanitizeError::Syntax(SyntaxError::UnsupportedTool { tool, supported })) => {
                assert_eq!(tool, "rm");
                assert!(supported.contains("kubectl"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(sanitize("/usr/bin/kubectl get pods").is_err());
        assert!(sanitize("KUBECTL get pods").is_err());
    }

    #[test]
    fn any_failing_segment_rejects_all() {
        assert!(matches!(
            sanitize("kubectl get pods | grep x | cut /etc/passwd"),
            Err(SanitizeError::Policy(PolicyError::FileArgument { .. }))
        ));
    }

    #[test]
    fn grep_position_matters() {
        assert!(matches!(
            sanitize("grep nginx"),
            Err(SanitizeError::Policy(PolicyError::FirstSegment { .. }))
        ));
        assert!(sanitize("docker ps | grep nginx").is_ok());
    }
}
