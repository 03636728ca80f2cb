//! Cluster CLI grammar.
//!
//! `kubectl` is parsed per action into a [`KubectlCommand`] with typed
//! fields for the resource, name, namespace scope and selector; anything
//! action-specific stays in `flags`. Only read-only actions plus the
//! sandboxed `run` are allowed, and secrets are never readable.

mod run;

use crate::commands::Grammar;
use crate::commands::args::{ArgParser, Flag, FlagSpec, ParsedArgs, UnknownFlags};
use crate::error::{PolicyError, SyntaxError};
use crate::eval::CommandContext;
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::{
    COUNT, DNS_LABEL, DURATION, FIELD_SELECTOR, FREEFORM, LABEL_SELECTOR, RESOURCE_NAME, Validator,
    lazy_regex,
};

const TOOL: &str = "kubectl";

static ALLOW: CommandTree = command_tree!({
    "get" => {},
    "describe" => {},
    "top" => {},
    "events" => {},
    "logs" => {},
    "run" => {},
});

static DENY: CommandTree = command_tree!({
    "get" => { "secret" => {}, "secrets" => {}, "secret.*" => {}, "secrets.*" => {} },
    "describe" => { "secret" => {}, "secrets" => {}, "secret.*" => {}, "secrets.*" => {} },
    "delete" => {},
    "apply" => {},
    "create" => {},
    "edit" => {},
    "exec" => {},
    "patch" => {},
    "replace" => {},
    "scale" => {},
    "autoscale" => {},
    "cordon" => {},
    "uncordon" => {},
    "drain" => {},
    "taint" => {},
    "label" => {},
    "annotate" => {},
    "rollout" => {},
    "set" => {},
    "expose" => {},
    "cp" => {},
    "port-forward" => {},
    "proxy" => {},
    "attach" => {},
    "debug" => {},
    "config" => {},
    "certificate" => {},
    "auth" => {},
    "plugin" => {},
});

static POLICY: PathPolicy = PathPolicy {
    tool: TOOL,
    allow: &ALLOW,
    deny: &DENY,
};

static CONTEXT_NAME: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[A-Za-z0-9_.:@/-]{1,253}$"),
    expected: "a kubeconfig context name",
};

static RESOURCE_TYPE: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z0-9]+(\.[a-z0-9-]+)*$"),
    expected: "a lowercase resource type such as pods or deployments.apps",
};

static TOP_RESOURCE: Validator = Validator::OneOf(&["pods", "pod", "po", "nodes", "node", "no"]);

static KIND_NAME: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z0-9]+(\.[a-z0-9-]+)*/[a-z0-9]([-a-z0-9._]*[a-z0-9])?$"),
    expected: "kind/name such as deployment/web",
};

static LOG_TARGET: Validator = Validator::Check(|v| {
    RESOURCE_NAME
        .check(v)
        .or_else(|_| KIND_NAME.check(v))
        .map_err(|_| "expected a pod name or kind/name such as deployment/web".to_string())
});

static OUTPUT_FORMAT: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^(json|yaml|wide|name|(jsonpath|jsonpath-as-json|custom-columns)=.+)$"),
    expected: "json, yaml, wide, name, jsonpath=, jsonpath-as-json= or custom-columns=<spec>",
};

static OUTPUT: Validator = Validator::Check(|v| OUTPUT_FORMAT.check(v).and_then(|()| FREEFORM.check(v)));

static EVENT_OUTPUT: Validator = Validator::OneOf(&["json", "yaml"]);

static SORT_BY: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^\{?\.[A-Za-z0-9_.\[\]@*'-]+\}?$"),
    expected: "a JSONPath such as .metadata.creationTimestamp",
};

static EVENT_TYPES: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^(Normal|Warning)(,(Normal|Warning))*$"),
    expected: "Normal, Warning or Normal,Warning",
};

static SINCE_TIME: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})$"),
    expected: "an RFC3339 timestamp",
};

static TAIL_LINES: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^-?[0-9]{1,9}$"),
    expected: "a line count (-1 for all)",
};

/// Flags every action shares, plus the action's own.
macro_rules! scoped_flags {
    ($($extra:expr),* $(,)?) => {
        &[
            FlagSpec::value(&["--namespace", "-n"], &DNS_LABEL),
            FlagSpec::switch(&["--all-namespaces", "-A"]),
            FlagSpec::value(&["--selector", "-l"], &LABEL_SELECTOR),
            FlagSpec::value(&["--context"], &CONTEXT_NAME),
            $($extra),*
        ]
    };
}

/// Global value flags that may precede the action word.
const GLOBAL_VALUE_FLAGS: &[&str] = &["-n", "--namespace", "--context"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    None,
    Optional,
    Required,
}

struct Action {
    name: &'static str,
    resource: Arity,
    object: Arity,
    parser: ArgParser,
}

static TOP_SORT: Validator = Validator::OneOf(&["cpu", "memory"]);

static RESTART: Validator = Validator::OneOf(&["Never"]);

static GET_FLAGS: &[FlagSpec] = scoped_flags![
    FlagSpec::value(&["--output", "-o"], &OUTPUT),
    FlagSpec::value(&["--field-selector"], &FIELD_SELECTOR),
    FlagSpec::value(&["--sort-by"], &SORT_BY),
    FlagSpec::value(&["--label-columns", "-L"], &LABEL_SELECTOR),
    FlagSpec::switch(&["--show-labels"]),
    FlagSpec::switch(&["--no-headers"]),
    FlagSpec::switch(&["--ignore-not-found"]),
];

static DESCRIBE_FLAGS: &[FlagSpec] = scoped_flags![];

static TOP_FLAGS: &[FlagSpec] = scoped_flags![
    FlagSpec::switch(&["--containers"]),
    FlagSpec::switch(&["--no-headers"]),
    FlagSpec::value(&["--sort-by"], &TOP_SORT),
];

static EVENTS_FLAGS: &[FlagSpec] = scoped_flags![
    FlagSpec::value(&["--for"], &KIND_NAME),
    FlagSpec::value(&["--types"], &EVENT_TYPES),
    FlagSpec::value(&["--output", "-o"], &EVENT_OUTPUT),
    FlagSpec::switch(&["--no-headers"]),
];

static LOGS_FLAGS: &[FlagSpec] = scoped_flags![
    FlagSpec::value(&["--container", "-c"], &DNS_LABEL),
    FlagSpec::switch(&["--previous", "-p"]),
    FlagSpec::switch(&["--all-containers"]),
    FlagSpec::switch(&["--timestamps"]),
    FlagSpec::switch(&["--prefix"]),
    FlagSpec::value(&["--tail"], &TAIL_LINES),
    FlagSpec::value(&["--since"], &DURATION),
    FlagSpec::value(&["--since-time"], &SINCE_TIME),
    FlagSpec::value(&["--limit-bytes"], &COUNT),
];

static RUN_FLAGS: &[FlagSpec] = scoped_flags![
    FlagSpec::value(&["--image"], &FREEFORM),
    FlagSpec::value(&["--restart"], &RESTART),
    FlagSpec::switch(&["--rm"]),
    FlagSpec::switch(&["--stdin", "-i"]),
    FlagSpec::switch(&["--quiet", "-q"]),
    FlagSpec::switch(&["--command"]),
];

static ACTIONS: &[Action] = &[
    Action {
        name: "get",
        resource: Arity::Required,
        object: Arity::Optional,
        parser: ArgParser::strict(TOOL, GET_FLAGS),
    },
    Action {
        name: "describe",
        resource: Arity::Required,
        object: Arity::Optional,
        parser: ArgParser::strict(TOOL, DESCRIBE_FLAGS),
    },
    Action {
        name: "top",
        resource: Arity::Required,
        object: Arity::Optional,
        parser: ArgParser::strict(TOOL, TOP_FLAGS),
    },
    Action {
        name: "events",
        resource: Arity::None,
        object: Arity::None,
        parser: ArgParser::strict(TOOL, EVENTS_FLAGS),
    },
    Action {
        name: "logs",
        resource: Arity::None,
        object: Arity::Required,
        parser: ArgParser::strict(TOOL, LOGS_FLAGS),
    },
    Action {
        name: "run",
        resource: Arity::None,
        object: Arity::Required,
        parser: ArgParser {
            tool: TOOL,
            flags: RUN_FLAGS,
            unknown: UnknownFlags::Reject,
            trailing: true,
        },
    },
];

/// A parsed kubectl invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubectlCommand {
    pub action: String,
    pub resource: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    pub selector: Option<String>,
    pub context: Option<String>,
    /// Action-specific flags, canonical names, original order.
    pub flags: Vec<Flag>,
    /// Sandboxed run only: the container image.
    pub image: Option<String>,
    /// Sandboxed run only: the in-container command after `--`.
    pub container_command: Vec<String>,
    /// Positional words of an unrecognized action, kept for the policy walk.
    pub unparsed: Vec<String>,
}

impl KubectlCommand {
    /// The resource types named by this command (`pods,svc` → two).
    fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resource.iter().flat_map(|r| r.split(','))
    }
}

/// Subcommand-aware kubectl grammar.
pub struct KubectlSpec;

impl KubectlSpec {
    /// Index of the action word, skipping leading global flags.
    fn action_index(args: &[String]) -> Option<usize> {
        let mut i = 0;
        while i < args.len() {
            let tok = args[i].as_str();
            if !tok.starts_with('-') {
                return Some(i);
            }
            i += if GLOBAL_VALUE_FLAGS.contains(&tok) { 2 } else { 1 };
        }
        None
    }

    fn take_positional(
        positionals: &mut std::vec::IntoIter<String>,
        arity: Arity,
        what: &str,
    ) -> Result<Option<String>, SyntaxError> {
        match arity {
            Arity::None => Ok(None),
            Arity::Optional => Ok(positionals.next()),
            Arity::Required => positionals
                .next()
                .map(Some)
                .ok_or_else(|| SyntaxError::MissingArgument {
                    tool: TOOL.into(),
                    what: what.into(),
                }),
        }
    }
}

impl Grammar for KubectlSpec {
    type Command = KubectlCommand;

    fn names(&self) -> &'static [&'static str] {
        &["kubectl"]
    }

    fn parse(&self, ctx: &CommandContext) -> Result<KubectlCommand, SyntaxError> {
        let args = ctx.args();
        let idx = Self::action_index(args).ok_or_else(|| SyntaxError::MissingArgument {
            tool: TOOL.into(),
            what: "action (get, describe, top, events, logs, run)".into(),
        })?;
        let action_word = args[idx].clone();
        let rest: Vec<String> = args[..idx].iter().chain(&args[idx + 1..]).cloned().collect();

        let Some(action) = ACTIONS.iter().find(|a| a.name == action_word) else {
            return Ok(KubectlCommand {
                action: action_word,
                unparsed: rest.into_iter().filter(|t| !t.starts_with('-')).collect(),
                ..Default::default()
            });
        };

        let parsed = action.parser.parse(&rest)?;
        let mut positionals = parsed.positionals.into_iter();
        let mut resource = Self::take_positional(&mut positionals, action.resource, "resource type")?;
        let mut name = Self::take_positional(&mut positionals, action.object, "name")?;
        if let Some(extra) = positionals.next() {
            return Err(SyntaxError::UnexpectedArgument {
                tool: TOOL.into(),
                argument: extra,
            });
        }

        // `get pod/web` is `get pod web`
        if action.resource == Arity::Required
            && let Some((kind, object)) = resource.as_deref().and_then(|r| r.split_once('/'))
        {
            if let Some(n) = name {
                return Err(SyntaxError::UnexpectedArgument {
                    tool: TOOL.into(),
                    argument: n,
                });
            }
            name = Some(object.to_string());
            resource = Some(kind.to_string());
        }

        let mut cmd = KubectlCommand {
            action: action_word,
            resource,
            name,
            ..Default::default()
        };
        for flag in parsed.flags {
            match (flag.known, flag.name.as_str()) {
                (true, "--namespace") => cmd.namespace = flag.value,
                (true, "--all-namespaces") => cmd.all_namespaces = true,
                (true, "--selector") => cmd.selector = flag.value,
                (true, "--context") => cmd.context = flag.value,
                (true, "--image") => cmd.image = flag.value,
                _ => cmd.flags.push(flag),
            }
        }

        if action.parser.trailing {
            if cmd.image.is_none() {
                return Err(SyntaxError::MissingArgument {
                    tool: TOOL.into(),
                    what: "--image".into(),
                });
            }
            cmd.container_command = parsed.trailing.unwrap_or_default();
            if cmd.container_command.is_empty() {
                return Err(SyntaxError::MissingArgument {
                    tool: TOOL.into(),
                    what: "in-container command after '--'".into(),
                });
            }
        }

        Ok(cmd)
    }

    fn validate(&self, cmd: &KubectlCommand, ctx: &CommandContext) -> Result<(), PolicyError> {
        // Policy path: action, then each resource type
        let mut checked = false;
        for kind in cmd.resource_types() {
            POLICY.check(&[cmd.action.as_str(), kind])?;
            checked = true;
        }
        if !checked {
            let path: Vec<&str> = std::iter::once(cmd.action.as_str())
                .chain(cmd.unparsed.iter().map(String::as_str))
                .collect();
            POLICY.check(&path)?;
        }

        let Some(action) = ACTIONS.iter().find(|a| a.name == cmd.action) else {
            return Err(PolicyError::NotAllowed {
                tool: TOOL.into(),
                operation: cmd.action.clone(),
                allowed: ACTIONS.iter().map(|a| a.name.to_string()).collect(),
            });
        };

        let remainder = ParsedArgs {
            flags: cmd.flags.clone(),
            ..Default::default()
        };
        action.parser.validate(&remainder, &[])?;

        if let Some(ns) = &cmd.namespace {
            DNS_LABEL.validate(TOOL, "--namespace", ns)?;
        }
        if let Some(selector) = &cmd.selector {
            LABEL_SELECTOR.validate(TOOL, "--selector", selector)?;
        }
        if let Some(context) = &cmd.context {
            CONTEXT_NAME.validate(TOOL, "--context", context)?;
        }

        for kind in cmd.resource_types() {
            if cmd.action == "top" {
                TOP_RESOURCE.validate(TOOL, "resource type", kind)?;
            } else {
                RESOURCE_TYPE.validate(TOOL, "resource type", kind)?;
            }
        }
        if let Some(name) = &cmd.name {
            if cmd.action == "logs" {
                LOG_TARGET.validate(TOOL, "pod", name)?;
            } else {
                RESOURCE_NAME.validate(TOOL, "name", name)?;
            }
        }

        if cmd.action == "run" {
            run::validate(cmd, ctx.config)?;
        }
        Ok(())
    }

    fn tokens(&self, cmd: &KubectlCommand) -> Vec<String> {
        let mut out = vec![TOOL.to_string(), cmd.action.clone()];
        out.extend(cmd.unparsed.iter().cloned());
        out.extend(cmd.resource.iter().cloned());
        out.extend(cmd.name.iter().cloned());
        if let Some(ns) = &cmd.namespace {
            out.extend(["--namespace".to_string(), ns.clone()]);
        }
        if cmd.all_namespaces {
            out.push("--all-namespaces".into());
        }
        if let Some(selector) = &cmd.selector {
            out.extend(["--selector".to_string(), selector.clone()]);
        }
        if let Some(image) = &cmd.image {
            out.extend(["--image".to_string(), image.clone()]);
        }
        for flag in &cmd.flags {
            flag.push_tokens(&mut out);
        }
        if let Some(context) = &cmd.context {
            out.extend(["--context".to_string(), context.clone()]);
        }
        if !cmd.container_command.is_empty() {
            out.push("--".into());
            out.extend(cmd.container_command.iter().cloned());
        }
        out
    }
}
