//! Allow/deny trees over command paths.
//!
//! A command path is the tool's leading non-flag words (`ec2
//! describe-instances`, `get secrets`). Trees are immutable statics built with
//! [`command_tree!`]. Deny and allow are always two separate trees, walked
//! independently, deny first.

use crate::error::PolicyError;

/// One node of an allow or deny tree.
#[derive(Debug)]
pub enum CommandTree {
    /// Terminal: everything at and beneath this path matches.
    Leaf,
    /// Continue matching on the next path segment. A key ending in `*`
    /// matches any segment with that prefix.
    Node(&'static [(&'static str, CommandTree)]),
}

/// Build a [`CommandTree`] from a nested literal.
///
/// ```ignore
/// static ALLOW: CommandTree = command_tree!({
///     "ec2" => { "describe-*" => {} },
///     "sts" => { "get-caller-identity" => {} },
/// });
/// ```
macro_rules! command_tree {
    ({}) => {
        $crate::policy::tree::CommandTree::Leaf
    };
    ({ $($key:literal => $sub:tt),+ $(,)? }) => {
        $crate::policy::tree::CommandTree::Node(&[
            $( ($key, $crate::policy::tree::command_tree!($sub)) ),+
        ])
    };
}
pub(crate) use command_tree;

/// Whether a tree key matches a path segment.
pub fn segment_matches(key: &str, segment: &str) -> bool {
    match key.strip_suffix('*') {
        Some(prefix) => !segment.is_empty() && segment.starts_with(prefix),
        None => key == segment,
    }
}

impl CommandTree {
    fn children(&self) -> &'static [(&'static str, CommandTree)] {
        match self {
            CommandTree::Leaf => &[],
            CommandTree::Node(children) => children,
        }
    }

    /// Children matching `segment`, exact keys before wildcard keys.
    fn matching<'a>(&self, segment: &'a str) -> impl Iterator<Item = &'static CommandTree> + 'a {
        let children = self.children();
        let exact = children
            .iter()
            .filter(move |(k, _)| !k.ends_with('*') && *k == segment);
        let wild = children
            .iter()
            .filter(move |(k, _)| k.ends_with('*') && segment_matches(k, segment));
        exact.chain(wild).map(|(_, child)| child)
    }

    /// Walk `path` and return how many segments were consumed when a
    /// terminal was reached, or `None` if the walk falls off the tree.
    pub fn terminal_depth<S: AsRef<str>>(&'static self, path: &[S]) -> Option<usize> {
        fn walk<S: AsRef<str>>(node: &'static CommandTree, path: &[S], depth: usize) -> Option<usize> {
            match node {
                CommandTree::Leaf => Some(depth),
                CommandTree::Node(_) => {
                    let (segment, rest) = path.split_first()?;
                    node.matching(segment.as_ref())
                        .find_map(|child| walk(child, rest, depth + 1))
                }
            }
        }
        walk(self, path, 0)
    }

    /// Keys available at the deepest node `path` reaches.
    pub fn alternatives<S: AsRef<str>>(&'static self, path: &[S]) -> Vec<String> {
        let mut node = self;
        for segment in path {
            let Some(child) = node.matching(segment.as_ref()).next() else {
                break;
            };
            if matches!(child, CommandTree::Leaf) {
                break;
            }
            node = child;
        }
        node.children().iter().map(|(k, _)| k.to_string()).collect()
    }
}

/// A tool's pair of trees.
#[derive(Debug)]
pub struct PathPolicy {
    pub tool: &'static str,
    pub allow: &'static CommandTree,
    pub deny: &'static CommandTree,
}

impl PathPolicy {
    /// Check a command path. Deny is walked first and wins at any depth;
    /// otherwise the allow walk must reach a terminal.
    ///
    /// Returns the number of leading segments that form the allowed command
    /// path; any remaining segments are arguments to it.
    pub fn check<S: AsRef<str>>(&self, path: &[S]) -> Result<usize, PolicyError> {
        if let Some(depth) = self.deny.terminal_depth(path) {
            log::debug!("{}: deny tree matched at depth {depth}", self.tool);
            return Err(PolicyError::Blocked {
                tool: self.tool.to_string(),
                operation: join(&path[..depth]),
            });
        }
        match self.allow.terminal_depth(path) {
            Some(depth) => Ok(depth),
            None => Err(PolicyError::NotAllowed {
                tool: self.tool.to_string(),
                operation: if path.is_empty() {
                    "(none)".into()
                } else {
                    join(path)
                },
                allowed: self.allow.alternatives(path),
            }),
        }
    }
}

fn join<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}
