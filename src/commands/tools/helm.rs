use super::cloud::TreeCliSpec;
use crate::commands::args::{ArgParser, FlagSpec};
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::{DNS_LABEL, Validator};

static ALLOW: CommandTree = command_tree!({
    "list" => {},
    "ls" => {},
    "status" => {},
    "history" => {},
    "get" => { "notes" => {}, "metadata" => {} },
    "show" => { "all" => {}, "chart" => {}, "values" => {}, "readme" => {}, "crds" => {} },
    "search" => { "repo" => {}, "hub" => {} },
    "repo" => { "list" => {}, "ls" => {} },
    "dependency" => { "list" => {} },
    "version" => {},
});

static DENY: CommandTree = command_tree!({
    "install" => {},
    "upgrade" => {},
    "uninstall" => {},
    "delete" => {},
    "rollback" => {},
    "test" => {},
    "repo" => { "add" => {}, "remove" => {}, "rm" => {}, "update" => {}, "index" => {} },
    "plugin" => {},
    "push" => {},
    "pull" => {},
    "registry" => {},
    "create" => {},
    "package" => {},
    "dependency" => { "update" => {}, "build" => {} },
    "env" => {},
    // Rendered manifests and values carry Secret data in the clear.
    "get" => { "all" => {}, "manifest" => {}, "values" => {}, "hooks" => {} },
});

static POLICY: PathPolicy = PathPolicy {
    tool: "helm",
    allow: &ALLOW,
    deny: &DENY,
};

static OUTPUT: Validator = Validator::OneOf(&["json", "yaml", "table"]);

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["--namespace", "-n"], &DNS_LABEL),
    FlagSpec::switch(&["--all-namespaces", "-A"]),
    FlagSpec::value(&["--output", "-o"], &OUTPUT),
];

pub static HELM: TreeCliSpec = TreeCliSpec {
    names: &["helm"],
    policy: &POLICY,
    parser: ArgParser::pass_through("helm", FLAGS),
    forbidden: &["--kube-token", "--kubeconfig", "--kube-apiserver", "--kube-as-user", "--registry-config"],
    values: None,
    refine: None,
};
