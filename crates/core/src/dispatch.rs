use std::env;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::flags::{is_help_flag, FlagError};
use crate::graph::CommandGraph;
use crate::node::{NodeId, ROOT};

impl CommandGraph {
    /// Dispatches the arguments of the running process.
    ///
    /// # Errors
    ///
    /// See [`CommandGraph::exec_args`].
    pub fn exec(&mut self) -> Result<()> {
        let args: Vec<String> = env::args().skip(1).collect();
        self.exec_args(&args)
    }

    /// Matches `args` against the registered subcommands and runs the last
    /// one matched with its remaining positional arguments.
    ///
    /// # Errors
    ///
    /// Returns the first error met along the way: a structural error when
    /// the arguments do not lead to an executable command, a flag parsing
    /// error, or whatever the executed command returned.
    pub fn exec_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_string()).collect();
        self.dispatch(ROOT, &args)
    }

    fn dispatch(&mut self, id: NodeId, args: &[String]) -> Result<()> {
        debug!("Dispatching `{}` with {:?}", self.display_path(id), args);

        if let Some((index, child)) = self.find_child(id, args) {
            let leftover = match self.nodes[id.0].parse_flags(&args[..index]) {
                Ok(leftover) => leftover,
                Err(FlagError::HelpRequested { flag }) => vec![flag],
                Err(error) => return Err(error.into()),
            };
            if let Some(token) = leftover.first() {
                return Err(self.unrecognized(id, token));
            }
            return self.dispatch(child, &args[index + 1..]);
        }

        let node = &mut self.nodes[id.0];
        let leftover = match node.parse_flags(args) {
            Ok(leftover) => leftover,
            Err(FlagError::HelpRequested { flag }) => {
                trace!("Help requested with `{}`", flag);
                return self.write_usage(id);
            }
            Err(error) => return Err(error.into()),
        };
        if !node.has_flags && leftover.first().is_some_and(|arg| is_help_flag(arg)) {
            return self.write_usage(id);
        }

        if node.behavior.is_help() {
            return self.help(&leftover);
        }

        match node.behavior.execute(&leftover) {
            Err(Error::Unimplemented) => Err(self.classify_unimplemented(id, &leftover)),
            result => result,
        }
    }

    /// First argument naming a child of `id`, with its position.
    fn find_child(&self, id: NodeId, args: &[String]) -> Option<(usize, NodeId)> {
        let children = &self.nodes[id.0].children;
        args.iter()
            .enumerate()
            .find_map(|(index, arg)| children.get(arg).map(|&child| (index, child)))
    }

    fn classify_unimplemented(&mut self, id: NodeId, leftover: &[String]) -> Error {
        if self.nodes[id.0].is_leaf() {
            return Error::not_implemented(self.display_path(id));
        }
        match leftover.first() {
            Some(token) => self.unrecognized(id, token),
            None => {
                self.write_dead_end_usage(id);
                Error::missing_subcommand(self.display_path(id))
            }
        }
    }

    fn unrecognized(&mut self, id: NodeId, token: &str) -> Error {
        self.write_dead_end_usage(id);
        Error::unrecognized_subcommand(
            self.display_path(id),
            token.to_string(),
            self.closest_child(id, token),
        )
    }

    /// Usage printed next to a structural error. Write failures are logged,
    /// never returned.
    fn write_dead_end_usage(&mut self, id: NodeId) {
        if let Err(error) = self.write_usage(id) {
            warn!("Could not write usage for `{}`: {}", self.display_path(id), error);
        }
    }

    fn closest_child(&self, id: NodeId, token: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.nodes[id.0]
            .children
            .keys()
            .filter_map(|name| matcher.fuzzy_match(name, token).map(|score| (score, name)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name.clone())
    }

    fn help(&mut self, args: &[String]) -> Result<()> {
        self.write_usage_for(&args.join(" "))
    }

    /// Prints the usage of a registered path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HelpTargetNotFound`] for a path that was never
    /// registered, or an IO error from the output writer.
    pub fn write_usage_for(&mut self, path: &str) -> Result<()> {
        let id = *self
            .lookup
            .get(path)
            .ok_or_else(|| Error::help_target_not_found(path.to_string()))?;
        self.write_usage(id)
    }
}
