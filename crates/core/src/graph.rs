use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, warn};

use crate::command::{Behavior, Command};
use crate::error::Result;
use crate::flags::FlagSet;
use crate::node::{CommandNode, NodeId, ROOT};

const HELP_COMMAND: &str = "help";
const HELP_SUMMARY: &str = "print help for any command";
const DEFAULT_PROGRAM_NAME: &str = "command";

/// A tree of subcommands and the entry point for dispatching a command line.
///
/// Commands are registered by path, a list of subcommand tokens separated by
/// single spaces (`"current major"`). The empty path is the program itself.
/// Intermediate paths that were never registered are filled with
/// placeholders, so registration order does not matter.
///
/// A `help` subcommand is registered on construction; `help <path>` prints
/// the usage of any registered path.
///
/// # Examples
///
/// ```
/// use cmdtree_core::CommandGraph;
///
/// let mut graph = CommandGraph::new("greeter");
/// graph.func("hello", "say hello", |args| {
///     println!("hello {}", args.join(" "));
///     Ok(())
/// });
///
/// graph.exec_args(&["hello", "world"])?;
/// # Ok::<(), cmdtree_core::Error>(())
/// ```
pub struct CommandGraph {
    pub(crate) nodes: Vec<CommandNode>,
    pub(crate) lookup: HashMap<String, NodeId>,
    pub(crate) output: Box<dyn Write>,
}

/// Handle on a freshly registered command, used to attach usage details.
pub struct CommandDecl<'a> {
    node: &'a mut CommandNode,
}

impl CommandDecl<'_> {
    /// Sets the long description printed in the command's usage.
    pub fn with_description(mut self, description: &str) -> Self {
        self.node.description = Some(description.to_string());
        self
    }

    /// Sets the argument syntax hint printed after the command name.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.node.usage = Some(usage.to_string());
        self
    }
}

impl CommandGraph {
    pub fn new(program_name: impl Into<String>) -> Self {
        let program_name = program_name.into();
        let mut graph = Self {
            nodes: vec![CommandNode::placeholder(&program_name, "")],
            lookup: HashMap::from([(String::new(), ROOT)]),
            output: Box::new(io::stdout()),
        };
        graph.register(HELP_COMMAND, HELP_SUMMARY, Behavior::Help, false);
        graph
    }

    /// Creates a graph named after the running executable.
    pub fn from_env() -> Self {
        let program_name = env::args()
            .next()
            .as_deref()
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());
        Self::new(program_name)
    }

    /// Sets the writer usage text is printed to. Defaults to stdout.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    pub fn program_name(&self) -> &str {
        &self.nodes[ROOT.0].name
    }

    /// Registers a command with its own flags and execution.
    pub fn cmd<C>(&mut self, path: &str, help: &str, command: C) -> CommandDecl<'_>
    where
        C: Command + 'static,
    {
        let id = self.register(path, help, Behavior::Command(Box::new(command)), true);
        self.decl(id)
    }

    /// Registers a command that takes no flags; every argument following it
    /// is handed to `handler`.
    pub fn func<F>(&mut self, path: &str, help: &str, handler: F) -> CommandDecl<'_>
    where
        F: FnMut(&[String]) -> Result<()> + 'static,
    {
        let id = self.register(path, help, Behavior::ExecOnly(Box::new(handler)), false);
        self.decl(id)
    }

    /// Registers a command that only declares flags and defers execution to
    /// its subcommands.
    pub fn flags<F>(&mut self, path: &str, help: &str, declare: F) -> CommandDecl<'_>
    where
        F: FnMut(&mut FlagSet) + 'static,
    {
        let id = self.register(path, help, Behavior::FlagsOnly(Box::new(declare)), true);
        self.decl(id)
    }

    /// Registers a command without an implementation yet.
    pub fn unset(&mut self, path: &str, help: &str) -> CommandDecl<'_> {
        let id = self.register(path, help, Behavior::Unset, false);
        self.decl(id)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup.contains_key(path)
    }

    /// Subcommand tokens of a registered path, in lexicographic order.
    pub fn children(&self, path: &str) -> Option<Vec<&str>> {
        let id = self.lookup.get(path)?;
        Some(self.nodes[id.0].children.keys().map(String::as_str).collect())
    }

    fn decl(&mut self, id: NodeId) -> CommandDecl<'_> {
        CommandDecl {
            node: &mut self.nodes[id.0],
        }
    }

    fn register(&mut self, path: &str, help: &str, behavior: Behavior, has_flags: bool) -> NodeId {
        let id = match self.lookup.get(path) {
            Some(&id) => id,
            None => self.fill_path(path),
        };

        let node = &mut self.nodes[id.0];
        if !node.behavior.is_unset() {
            warn!("Command `{}` registered again, replacing {:?}", path, node.behavior);
        }
        debug!("Registering `{}` as {:?} (flags: {})", path, behavior, has_flags);
        node.behavior = behavior;
        node.help = help.to_string();
        node.has_flags = has_flags;
        id
    }

    /// Walks `path` from the root, creating placeholders for missing tokens.
    fn fill_path(&mut self, path: &str) -> NodeId {
        let tokens: Vec<&str> = path.split(' ').collect();
        let mut current = ROOT;

        for (depth, token) in tokens.iter().enumerate() {
            current = match self.nodes[current.0].children.get(*token) {
                Some(&next) => next,
                None => {
                    let prefix = tokens[..=depth].join(" ");
                    let next = NodeId(self.nodes.len());
                    debug!("Creating placeholder for `{}`", prefix);
                    self.nodes.push(CommandNode::placeholder(token, &prefix));
                    self.nodes[current.0]
                        .children
                        .insert((*token).to_string(), next);
                    self.lookup.insert(prefix, next);
                    next
                }
            };
        }

        current
    }

    /// Space-separated command line of a node, starting with the program name.
    pub(crate) fn display_path(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        if node.path.is_empty() {
            self.program_name().to_string()
        } else {
            format!("{} {}", self.program_name(), node.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::node::FlagState;

    fn shape(graph: &CommandGraph) -> Vec<(String, Vec<String>)> {
        let mut shape: Vec<(String, Vec<String>)> = graph
            .lookup
            .iter()
            .map(|(path, id)| {
                let node = &graph.nodes[id.0];
                assert_eq!(&node.path, path);
                (path.clone(), node.children.keys().cloned().collect())
            })
            .collect();
        shape.sort();
        shape
    }

    struct Counting {
        declared: Rc<Cell<usize>>,
    }

    impl Command for Counting {
        fn set_flags(&mut self, flags: &mut FlagSet) {
            self.declared.set(self.declared.get() + 1);
            flags.bool("verbose", false, "print more");
        }

        fn exec(&mut self, _args: &[String]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registration_order_is_irrelevant() {
        let mut forward = CommandGraph::new("prog");
        forward.func("a b", "deep", |_| Ok(()));
        forward.func("a", "shallow", |_| Ok(()));

        let mut reverse = CommandGraph::new("prog");
        reverse.func("a", "shallow", |_| Ok(()));
        reverse.func("a b", "deep", |_| Ok(()));

        assert_eq!(shape(&forward), shape(&reverse));
        assert_eq!(forward.children("a"), Some(vec!["b"]));
    }

    #[test]
    fn test_placeholders_fill_intermediate_paths() {
        let mut graph = CommandGraph::new("prog");
        graph.func("x y z", "deep", |_| Ok(()));

        for path in ["x", "x y"] {
            let node = &graph.nodes[graph.lookup[path].0];
            assert!(node.help.is_empty());
            assert!(node.behavior.is_unset());
            assert!(node.description.is_none());
            assert!(node.usage.is_none());
        }
        assert_eq!(graph.children(""), Some(vec!["help", "x"]));
        assert_eq!(graph.nodes[graph.lookup["x y z"].0].name, "z");
    }

    #[test]
    fn test_reregistration_preserves_children_and_latch() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let mut graph = CommandGraph::new("prog");
        graph.cmd("a", "first", Counting { declared: Rc::clone(&first) });
        graph.func("a b", "child", |_| Ok(()));

        graph.exec_args(&["a", "-verbose"]).unwrap();
        graph.exec_args(&["a"]).unwrap();
        assert_eq!(first.get(), 1);

        graph.cmd("a", "second", Counting { declared: Rc::clone(&second) });
        let node = &graph.nodes[graph.lookup["a"].0];
        assert_eq!(node.help, "second");
        assert_eq!(node.flag_state, FlagState::Bound);
        assert_eq!(graph.children("a"), Some(vec!["b"]));

        graph.exec_args(&["a", "-verbose"]).unwrap();
        assert_eq!(second.get(), 0);
    }

    #[test]
    fn test_root_registration_targets_root() {
        let mut graph = CommandGraph::new("prog");
        graph
            .flags("", "root flags", |flags| {
                flags.string("C", ".", "path");
            })
            .with_description("long text")
            .with_usage("[-C path] <cmd>");

        let root = &graph.nodes[ROOT.0];
        assert!(root.has_flags);
        assert_eq!(root.help, "root flags");
        assert_eq!(root.description.as_deref(), Some("long text"));
        assert_eq!(root.usage.as_deref(), Some("[-C path] <cmd>"));
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_display_path() {
        let mut graph = CommandGraph::new("versions");
        graph.func("current major", "", |_| Ok(()));
        assert_eq!(graph.display_path(ROOT), "versions");
        assert_eq!(graph.display_path(graph.lookup["current major"]), "versions current major");
    }
}
