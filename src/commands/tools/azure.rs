use super::cloud::TreeCliSpec;
use crate::commands::args::{ArgParser, FlagSpec};
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::{Validator, lazy_regex};

static ALLOW: CommandTree = command_tree!({
    "account" => { "show" => {}, "list" => {} },
    "group" => { "show" => {}, "list" => {} },
    "resource" => { "show" => {}, "list" => {} },
    "vm" => { "show" => {}, "list" => {}, "list-*" => {}, "get-instance-view" => {} },
    "aks" => { "show" => {}, "list" => {}, "nodepool" => { "show" => {}, "list" => {} } },
    "network" => { "*" => { "show" => {}, "list" => {} } },
    "storage" => { "account" => { "show" => {}, "list" => {} } },
    "monitor" => { "activity-log" => { "list" => {} }, "metrics" => { "list" => {} } },
    "keyvault" => { "show" => {}, "list" => {} },
    "webapp" => { "show" => {}, "list" => {} },
    "version" => {},
});

static DENY: CommandTree = command_tree!({
    "account" => { "get-access-token" => {}, "set" => {} },
    "login" => {},
    "logout" => {},
    "ad" => { "sp" => { "credential" => {}, "create-for-rbac" => {} }, "app" => { "credential" => {} } },
    "aks" => { "get-credentials" => {}, "command" => {}, "rotate-certs" => {} },
    "keyvault" => { "secret" => {}, "key" => {}, "certificate" => {} },
    "storage" => { "account" => { "keys" => {}, "show-connection-string" => {}, "generate-sas" => {} }, "blob" => {} },
    "vm" => { "run-command" => {}, "user" => {} },
    "webapp" => { "deployment" => {}, "config" => { "appsettings" => {} } },
    "rest" => {},
    "*" => { "create" => {}, "delete" => {}, "update" => {}, "set" => {}, "start" => {}, "stop" => {}, "restart" => {} },
});

static POLICY: PathPolicy = PathPolicy {
    tool: "az",
    allow: &ALLOW,
    deny: &DENY,
};

static GUID_OR_NAME: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[A-Za-z0-9 _.()-]{1,90}$"),
    expected: "a subscription or resource group name",
};

static OUTPUT: Validator = Validator::OneOf(&["json", "jsonc", "table", "tsv", "yaml", "yamlc", "none"]);

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["--subscription"], &GUID_OR_NAME),
    FlagSpec::value(&["--resource-group", "-g"], &GUID_OR_NAME),
    FlagSpec::value(&["--output", "-o"], &OUTPUT),
    FlagSpec::switch(&["--only-show-errors"]),
];

/// The CLI replaces an `@path` value with the file's contents.
static NO_AT_FILE: Validator = Validator::Check(|value| {
    if value.starts_with('@') {
        Err("@file values read local files".into())
    } else {
        Ok(())
    }
});

pub static AZURE: TreeCliSpec = TreeCliSpec {
    names: &["az"],
    policy: &POLICY,
    parser: ArgParser::pass_through("az", FLAGS),
    forbidden: &["--debug"],
    values: Some(&NO_AT_FILE),
    refine: None,
};
