use super::cloud::{CliCommand, TreeCliSpec};
use crate::commands::args::{ArgParser, FlagSpec};
use crate::error::PolicyError;
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::Validator;

static ALLOW: CommandTree = command_tree!({
    "app" => {
        "list" => {},
        "get" => {},
        "history" => {},
        "diff" => {},
        "manifests" => {},
        "resources" => {},
        "logs" => {},
    },
    "appset" => { "list" => {}, "get" => {} },
    "cluster" => { "list" => {}, "get" => {} },
    "proj" => { "list" => {}, "get" => {} },
    "repo" => { "list" => {}, "get" => {} },
    "account" => { "get-user-info" => {}, "can-i" => {} },
    "version" => {},
});

static DENY: CommandTree = command_tree!({
    "app" => {
        "sync" => {},
        "delete" => {},
        "create" => {},
        "set" => {},
        "unset" => {},
        "edit" => {},
        "rollback" => {},
        "patch" => {},
        "patch-resource" => {},
        "delete-resource" => {},
        "terminate-op" => {},
        "actions" => { "run" => {} },
    },
    "appset" => { "create" => {}, "delete" => {} },
    "login" => {},
    "logout" => {},
    "relogin" => {},
    "account" => { "generate-token" => {}, "update-password" => {}, "delete-token" => {} },
    "cluster" => { "add" => {}, "rm" => {}, "set" => {}, "rotate-auth" => {} },
    "repo" => { "add" => {}, "rm" => {} },
    "repocreds" => {},
    "proj" => { "create" => {}, "delete" => {}, "edit" => {}, "set" => {}, "role" => {} },
    "gpg" => {},
    "cert" => {},
    "admin" => {},
});

static POLICY: PathPolicy = PathPolicy {
    tool: "argocd",
    allow: &ALLOW,
    deny: &DENY,
};

static OUTPUT: Validator = Validator::OneOf(&["json", "yaml", "wide", "name", "tree"]);

static FLAGS: &[FlagSpec] = &[FlagSpec::value(&["--output", "-o"], &OUTPUT)];

/// `app logs` must not follow.
fn bounded_logs(cmd: &CliCommand, depth: usize) -> Result<(), PolicyError> {
    if cmd.words[..depth] != ["app", "logs"] {
        return Ok(());
    }
    match cmd.find_flag(&["--follow", "-f"]) {
        Some(flag) => Err(PolicyError::FlagNotPermitted {
            tool: "argocd".into(),
            flag: flag.name.clone(),
            allowed: vec!["--tail".into(), "--since-seconds".into(), "--container".into()],
        }),
        None => Ok(()),
    }
}

pub static ARGOCD: TreeCliSpec = TreeCliSpec {
    names: &["argocd"],
    policy: &POLICY,
    parser: ArgParser::pass_through("argocd", FLAGS),
    forbidden: &["--auth-token", "--server", "--config", "--plaintext", "--insecure"],
    values: None,
    refine: Some(bounded_logs),
};
