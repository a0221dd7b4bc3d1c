use std::collections::BTreeMap;

use crate::command::Behavior;
use crate::flags::{FlagError, FlagSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

pub(crate) const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlagState {
    Unbound,
    Bound,
}

/// One vertex of the subcommand trie.
#[derive(Debug)]
pub(crate) struct CommandNode {
    pub(crate) name: String,
    /// Registered path, `""` for the root.
    pub(crate) path: String,
    pub(crate) help: String,
    pub(crate) usage: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) behavior: Behavior,
    pub(crate) has_flags: bool,
    pub(crate) flag_state: FlagState,
    pub(crate) flags: FlagSet,
}

impl CommandNode {
    pub(crate) fn placeholder(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            help: String::new(),
            usage: None,
            description: None,
            children: BTreeMap::new(),
            behavior: Behavior::Unset,
            has_flags: false,
            flag_state: FlagState::Unbound,
            flags: FlagSet::new(name),
        }
    }

    pub(crate) fn bind_flags(&mut self) {
        if self.flag_state == FlagState::Unbound {
            self.behavior.declare_flags(&mut self.flags);
            self.flag_state = FlagState::Bound;
        }
    }

    /// Parses `args` against the node's flags, or passes them through
    /// unchanged for a node without flags.
    pub(crate) fn parse_flags(&mut self, args: &[String]) -> Result<Vec<String>, FlagError> {
        if !self.has_flags {
            return Ok(args.to_vec());
        }
        self.bind_flags();
        self.flags.parse(args)
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
