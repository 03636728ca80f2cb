use super::cloud::TreeCliSpec;
use crate::commands::args::{ArgParser, FlagSpec};
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::{Validator, lazy_regex};

static ALLOW: CommandTree = command_tree!({
    "compute" => { "*" => { "list" => {}, "describe" => {} } },
    "container" => {
        "clusters" => { "list" => {}, "describe" => {} },
        "node-pools" => { "list" => {}, "describe" => {} },
        "operations" => { "list" => {}, "describe" => {} },
    },
    "projects" => { "list" => {}, "describe" => {}, "get-iam-policy" => {} },
    "iam" => { "service-accounts" => { "list" => {}, "describe" => {} }, "roles" => { "list" => {}, "describe" => {} } },
    "logging" => { "read" => {}, "logs" => { "list" => {} } },
    "sql" => { "instances" => { "list" => {}, "describe" => {} } },
    "run" => { "services" => { "list" => {}, "describe" => {} }, "revisions" => { "list" => {}, "describe" => {} } },
    "config" => { "list" => {}, "configurations" => { "list" => {} } },
    "version" => {},
});

static DENY: CommandTree = command_tree!({
    "auth" => {},
    "container" => { "clusters" => { "get-credentials" => {} } },
    "secrets" => { "versions" => { "access" => {} } },
    "iam" => { "service-accounts" => { "keys" => {}, "sign-*" => {} } },
    "compute" => { "ssh" => {}, "scp" => {}, "connect-to-serial-port" => {}, "reset-windows-password" => {} },
    "sql" => { "connect" => {}, "users" => {} },
    "config" => { "set" => {}, "unset" => {}, "config-helper" => {} },
    "*" => { "*" => { "create" => {}, "delete" => {}, "update" => {}, "patch" => {} }, "create" => {}, "delete" => {} },
});

static POLICY: PathPolicy = PathPolicy {
    tool: "gcloud",
    allow: &ALLOW,
    deny: &DENY,
};

static PROJECT: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$"),
    expected: "a project id",
};

static LOCATION: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z]+-[a-z]+[0-9]+(-[a-z])?$"),
    expected: "a region or zone such as europe-west1 or us-central1-a",
};

static FORMAT: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^(json|yaml|text|csv|table|value|list|flattened)(\(.*\))?$"),
    expected: "an output format such as json, yaml or table(name)",
};

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["--project"], &PROJECT),
    FlagSpec::value(&["--region"], &LOCATION),
    FlagSpec::value(&["--zone"], &LOCATION),
    FlagSpec::value(&["--format"], &FORMAT),
    FlagSpec::switch(&["--quiet", "-q"]),
];

pub static GCLOUD: TreeCliSpec = TreeCliSpec {
    names: &["gcloud"],
    policy: &POLICY,
    parser: ArgParser::pass_through("gcloud", FLAGS),
    forbidden: &[
        "--debug",
        "--access-token-file",
        "--impersonate-service-account",
        "--log-http",
        "--credential-file-override",
        "--flags-file",
    ],
    values: None,
    refine: None,
};
