use shellgate::config::{AllowedImage, Config, ExecutorConfig};
use shellgate::escape::{escape_token, join_tokens};
use shellgate::{PolicyError, SanitizeError, SyntaxError};

fn sanitize(command: &str) -> Result<String, SanitizeError> {
    shellgate::sanitize(command, &ExecutorConfig::default())
}

fn sandbox_config() -> ExecutorConfig {
    ExecutorConfig {
        allowed_images: vec![AllowedImage {
            image: "busybox:1.36".into(),
            allowed_command_patterns: vec!["nslookup [a-z0-9.-]+".into(), "date".into()],
        }],
    }
}

macro_rules! sanitize_test {
    ($name:ident, $cmd:expr, $expected:expr) => {
        #[test]
        fn $name() {
            assert_eq!(
                sanitize($cmd).unwrap_or_else(|e| panic!("command: {}: {e}", $cmd)),
                $expected,
                "command: {}",
                $cmd,
            );
        }
    };
}

macro_rules! reject_test {
    ($name:ident, $cmd:expr, $pattern:pat) => {
        #[test]
        fn $name() {
            let result = sanitize($cmd);
            assert!(
                matches!(result, Err($pattern)),
                "command: {}: got {result:?}",
                $cmd,
            );
        }
    };
}

// ── Headline scenarios ──

sanitize_test!(
    kubectl_namespace_canonicalized,
    "kubectl get pods -n default",
    "kubectl get pods --namespace default"
);
sanitize_test!(
    aws_describe_unchanged,
    "aws ec2 describe-instances --region us-east-1",
    "aws ec2 describe-instances --region us-east-1"
);
sanitize_test!(
    kubectl_into_grep_unchanged,
    "kubectl get pods | grep nginx",
    "kubectl get pods | grep nginx"
);
reject_test!(
    docker_run_blocked,
    "docker run nginx",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    cut_file_argument,
    "cut /etc/passwd",
    SanitizeError::Policy(PolicyError::FileArgument { .. })
);
reject_test!(
    grep_cannot_start_pipeline,
    "grep nginx",
    SanitizeError::Policy(PolicyError::FirstSegment { .. })
);
reject_test!(
    and_chain_is_syntax_error,
    "kubectl get pods && kubectl delete pod web",
    SanitizeError::Syntax(SyntaxError::ChainOperator { .. })
);

#[test]
fn docker_run_reason_names_operation() {
    let err = sanitize("docker run nginx").unwrap_err();
    assert!(err.to_string().contains("blocked operation 'run'"), "{err}");
}

// ── Accepted commands per tool ──

sanitize_test!(
    kubectl_kind_slash_name,
    "kubectl get deploy/web -n prod -o yaml",
    "kubectl get deploy web --namespace prod --output yaml"
);
sanitize_test!(
    kubectl_logs,
    "kubectl logs web-1 -c app --tail 100",
    "kubectl logs web-1 --container app --tail 100"
);
sanitize_test!(
    azure_short_flags,
    "az vm list -g prod-rg -o table",
    "az vm list --resource-group prod-rg --output table"
);
sanitize_test!(
    gcloud_inline_value,
    "gcloud compute instances list --project my-project-1 --format=json",
    "gcloud compute instances list --project my-project-1 --format json"
);
sanitize_test!(
    helm_list,
    "helm list -A -o json",
    "helm list --all-namespaces --output json"
);
sanitize_test!(
    argocd_app_get,
    "argocd app get web -o yaml",
    "argocd app get web --output yaml"
);
sanitize_test!(docker_ps, "docker ps -a", "docker ps -a");

// ── Filters and utilities in pipelines ──

sanitize_test!(
    jq_filter_keeps_inner_pipe,
    "kubectl get pods -o json | jq -r '.items[] | .metadata.name'",
    "kubectl get pods --output json | jq --raw-output '.items[] | .metadata.name'"
);
sanitize_test!(
    three_stage_pipeline,
    "kubectl get pods -n default|grep -i error|head -5",
    "kubectl get pods --namespace default | grep -i error | head -n 5"
);
sanitize_test!(
    sed_after_describe,
    "kubectl describe pod web-1 | sed -n 's/^Name: //p'",
    "kubectl describe pod web-1 | sed -n 's/^Name: //p'"
);
sanitize_test!(
    awk_field,
    "docker ps | awk '{print $1}'",
    "docker ps | awk '{print $1}'"
);
sanitize_test!(
    sort_uniq_count,
    "kubectl get pods -A | sort -rn | uniq -c | wc -l",
    "kubectl get pods --all-namespaces | sort -r -n | uniq -c | wc -l"
);
sanitize_test!(
    cut_delimiter,
    "kubectl get pods | cut -d, -f1,3",
    "kubectl get pods | cut -d , -f 1,3"
);
sanitize_test!(
    tail_from_line,
    "kubectl get pods | tail -n +2",
    "kubectl get pods | tail -n '+2'"
);

// ── Blocked operations, standalone and inside pipelines ──

reject_test!(
    kubectl_delete_blocked,
    "kubectl delete pod web",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    kubectl_exec_in_pipeline_blocked,
    "kubectl get pods | kubectl exec -it web -- sh",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    aws_terminate_blocked,
    "aws ec2 terminate-instances --instance-ids i-123",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    az_delete_blocked,
    "az vm delete -g rg -n vm1",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    gcloud_delete_blocked,
    "gcloud compute instances delete vm-1",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    helm_uninstall_blocked,
    "helm uninstall web",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    argocd_sync_blocked,
    "argocd app sync web",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    docker_exec_after_pipe_blocked,
    "docker ps | docker exec web sh",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);

// ── Allow and deny overlap ──

reject_test!(
    kubectl_secrets_overlap,
    "kubectl get secrets -n prod",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);
reject_test!(
    docker_container_prune_overlap,
    "docker container prune",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);

// ── File arguments to stdin-only tools ──

reject_test!(
    grep_file_argument,
    "kubectl get pods | grep nginx /etc/hosts",
    SanitizeError::Policy(PolicyError::FileArgument { .. })
);
reject_test!(
    jq_file_argument,
    "jq . secrets.json",
    SanitizeError::Policy(PolicyError::FileArgument { .. })
);
reject_test!(
    sort_file_argument,
    "kubectl get pods | sort names.txt",
    SanitizeError::Policy(PolicyError::FileArgument { .. })
);
reject_test!(
    head_file_argument,
    "head -5 /var/log/syslog",
    SanitizeError::Policy(PolicyError::FileArgument { .. })
);

// ── Script constructs ──

reject_test!(
    sed_execute,
    "kubectl get pods | sed 's/x/id/e'",
    SanitizeError::Policy(PolicyError::ForbiddenScript { .. })
);
reject_test!(
    awk_system,
    "kubectl get pods | awk '{system(\"id\")}'",
    SanitizeError::Policy(PolicyError::ForbiddenScript { .. })
);
reject_test!(
    jq_env,
    "kubectl get pods -o json | jq '$ENV'",
    SanitizeError::Policy(PolicyError::ForbiddenScript { .. })
);

reject_test!(
    awk_argv_rewrite,
    "kubectl get pods | awk 'BEGIN{ARGV[1]=\"/etc/shadow\";ARGC=2}{print}'",
    SanitizeError::Policy(PolicyError::ForbiddenScript { .. })
);
reject_test!(
    awk_redirection_after_continuation,
    "kubectl get pods | awk '{ print $0 \\\n > \"/tmp/owned\" }'",
    SanitizeError::Policy(PolicyError::ForbiddenScript { .. })
);

// ── Values the CLI expands into file contents ──

reject_test!(
    aws_file_url_value,
    "aws ec2 describe-instances --instance-ids file:///root/.aws/credentials",
    SanitizeError::Policy(PolicyError::InvalidValue { .. })
);
reject_test!(
    gcloud_flags_file,
    "gcloud projects list --flags-file /tmp/impersonate.yaml",
    SanitizeError::Policy(PolicyError::FlagNotPermitted { .. })
);
reject_test!(
    az_at_file_value,
    "az vm show --name @/root/.azure/msal_token_cache.json -g rg",
    SanitizeError::Policy(PolicyError::InvalidValue { .. })
);

// ── Unbounded or secret-bearing reads ──

reject_test!(
    docker_logs_bundled_follow,
    "docker logs -tf web",
    SanitizeError::Policy(PolicyError::FlagNotPermitted { .. })
);
reject_test!(
    argocd_logs_follow,
    "argocd app logs web --follow",
    SanitizeError::Policy(PolicyError::FlagNotPermitted { .. })
);
reject_test!(
    helm_get_manifest,
    "helm get manifest web",
    SanitizeError::Policy(PolicyError::Blocked { .. })
);

// ── Syntax errors ──

reject_test!(
    semicolon_chain,
    "kubectl get pods; id",
    SanitizeError::Syntax(SyntaxError::ChainOperator { .. })
);
reject_test!(
    or_chain,
    "kubectl get pods || id",
    SanitizeError::Syntax(SyntaxError::ChainOperator { .. })
);
reject_test!(
    newline_chain,
    "kubectl get pods\nid",
    SanitizeError::Syntax(SyntaxError::ChainOperator { .. })
);
reject_test!(
    stderr_pipe,
    "kubectl get pods |& grep x",
    SanitizeError::Syntax(SyntaxError::ChainOperator { .. })
);
reject_test!(
    unbalanced_quote,
    "kubectl get pods | grep 'nginx",
    SanitizeError::Syntax(SyntaxError::Unbalanced { .. })
);
reject_test!(
    unsupported_tool,
    "curl http://example.com",
    SanitizeError::Syntax(SyntaxError::UnsupportedTool { .. })
);
reject_test!(
    unsupported_tool_in_pipeline,
    "kubectl get pods | xargs kubectl delete pod",
    SanitizeError::Syntax(SyntaxError::UnsupportedTool { .. })
);

// ── Quoted operators stay inside their argument ──

sanitize_test!(
    quoted_and_is_a_pattern,
    "kubectl get pods | grep 'a && b'",
    "kubectl get pods | grep 'a && b'"
);

#[test]
fn injection_in_values_rejected() {
    for cmd in [
        "kubectl get pods -n 'default$(id)'",
        "aws ec2 describe-instances --region 'us-east-1`id`'",
        "docker inspect 'web$(id)'",
    ] {
        assert!(sanitize(cmd).unwrap_err().is_policy(), "{cmd}");
    }
}

// ── Sandboxed run ──

#[test]
fn run_requires_configured_image() {
    let cmd = "kubectl run dns --image busybox:1.36 --rm -i --restart=Never -- nslookup kubernetes.default";
    assert!(matches!(
        sanitize(cmd),
        Err(SanitizeError::Policy(PolicyError::ImageNotAllowed { .. }))
    ));
    assert!(matches!(
        shellgate::sanitize(cmd, &Config::default_config().executor),
        Err(SanitizeError::Policy(PolicyError::ImageNotAllowed { .. }))
    ));
    assert_eq!(
        shellgate::sanitize(cmd, &sandbox_config()).unwrap(),
        "kubectl run dns --image busybox:1.36 --rm --stdin --restart Never -- nslookup kubernetes.default"
    );
}

#[test]
fn run_command_must_match_pattern() {
    let err = shellgate::sanitize(
        "kubectl run x --image busybox:1.36 -- sh -c 'nslookup a; id'",
        &sandbox_config(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SanitizeError::Policy(PolicyError::CommandNotAllowed { .. })
    ));
}

// ── Stability ──

#[test]
fn sanitizing_twice_changes_nothing() {
    for cmd in [
        "kubectl get pods -n default",
        "kubectl -n kube-system get pod/coredns -ojson | jq -r '.status.phase'",
        "kubectl logs web-1 --since 5m | grep -E 'error|warn' | tail -20",
        "aws ec2 describe-instances --query 'Reservations[].Instances[].InstanceId' --output text",
        "az vm list -g prod-rg -o table",
        "gcloud logging read 'severity>=ERROR' --limit 10",
        "helm list -A -o json | jq '.[] | .name'",
        "docker inspect --format '{{.State.Status}}' web",
        "docker ps | awk -F: -v OFS=, '{print $1, $NF}' | sort -t: -k3,3n",
        "kubectl get pods | tr -d '[:space:]' | base64 -w 0",
        "kubectl get pods | sed -E -e 's/a+/b/' -e 1d | column -t",
        "kubectl get pods | tail -n +2 | cut -d ' ' -f 2-",
    ] {
        let once = sanitize(cmd).unwrap_or_else(|e| panic!("{cmd}: {e}"));
        let twice = sanitize(&once).unwrap_or_else(|e| panic!("{once}: {e}"));
        assert_eq!(once, twice, "command: {cmd}");
    }
}

#[test]
fn escaped_tokens_tokenize_back() {
    for token in [
        "plain",
        "--flag=value",
        "a b",
        "$HOME",
        "`id`",
        "it's",
        "it's $HOME",
        "semi;colon",
        "pipe|char",
        "glob*?",
        "[[:digit:]]",
        "back\\slash",
        "\"quoted\"",
        "new\nline",
        "",
    ] {
        let escaped = escape_token(token).unwrap();
        assert_eq!(
            shlex::split(&escaped).unwrap(),
            vec![token.to_string()],
            "token {token:?} escaped as {escaped}"
        );
    }
}

#[test]
fn joined_tokens_tokenize_back() {
    let tokens = ["grep", "-E", "a|b", "it's", "$(id)", "x y"];
    let joined = join_tokens(&tokens).unwrap();
    assert_eq!(shlex::split(&joined).unwrap(), tokens);
}

#[test]
fn nul_bytes_cannot_be_quoted() {
    assert_eq!(escape_token("a\0b"), Err(SyntaxError::Unquotable));
}
