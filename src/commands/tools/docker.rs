use super::cloud::{CliCommand, TreeCliSpec};
use crate::commands::args::{ArgParser, FlagSpec};
use crate::error::PolicyError;
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::FREEFORM;

static ALLOW: CommandTree = command_tree!({
    "ps" => {},
    "images" => {},
    "inspect" => {},
    "logs" => {},
    "stats" => {},
    "version" => {},
    "info" => {},
    "top" => {},
    "port" => {},
    "diff" => {},
    "history" => {},
    "container" => { "ls" => {}, "inspect" => {}, "logs" => {}, "top" => {}, "port" => {}, "diff" => {} },
    "image" => { "ls" => {}, "inspect" => {}, "history" => {} },
    "network" => { "ls" => {}, "inspect" => {} },
    "volume" => { "ls" => {}, "inspect" => {} },
    "system" => { "df" => {}, "info" => {} },
    "compose" => { "ps" => {}, "ls" => {}, "config" => {}, "images" => {} },
});

static DENY: CommandTree = command_tree!({
    "run" => {},
    "exec" => {},
    "rm" => {},
    "rmi" => {},
    "kill" => {},
    "stop" => {},
    "start" => {},
    "restart" => {},
    "pause" => {},
    "unpause" => {},
    "pull" => {},
    "push" => {},
    "build" => {},
    "buildx" => {},
    "login" => {},
    "logout" => {},
    "cp" => {},
    "commit" => {},
    "create" => {},
    "save" => {},
    "export" => {},
    "load" => {},
    "import" => {},
    "tag" => {},
    "attach" => {},
    "update" => {},
    "plugin" => {},
    "swarm" => {},
    "secret" => {},
    "system" => { "prune" => {} },
    "*" => { "prune" => {}, "rm" => {}, "create" => {}, "run" => {}, "exec" => {}, "up" => {}, "down" => {} },
});

static POLICY: PathPolicy = PathPolicy {
    tool: "docker",
    allow: &ALLOW,
    deny: &DENY,
};

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["--format"], &FREEFORM),
    FlagSpec::switch(&["--no-stream"]),
    FlagSpec::switch(&["--no-trunc"]),
];

/// `stats` must not stream and `logs` must not follow.
fn bounded_output(cmd: &CliCommand, depth: usize) -> Result<(), PolicyError> {
    let operation = cmd.words[..depth].last().map(String::as_str);
    match operation {
        Some("stats") if !cmd.has_flag("--no-stream") => Err(PolicyError::InvalidValue {
            tool: "docker".into(),
            field: "stats".into(),
            value: String::new(),
            reason: "--no-stream is required".into(),
        }),
        Some("logs") => match cmd.find_flag(&["--follow", "-f"]) {
            Some(flag) => Err(PolicyError::FlagNotPermitted {
                tool: "docker".into(),
                flag: flag.name.clone(),
                allowed: vec!["--tail".into(), "--since".into(), "--timestamps".into()],
            }),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

pub static DOCKER: TreeCliSpec = TreeCliSpec {
    names: &["docker"],
    policy: &POLICY,
    parser: ArgParser::pass_through("docker", FLAGS),
    forbidden: &["--host", "-H", "--config", "--context", "--tlscacert", "--tlscert", "--tlskey"],
    values: None,
    refine: Some(bounded_output),
};
