//! cmdtree Core Library
//!
//! This crate provides the engine behind multi-level command-line programs:
//! a program declares a tree of subcommands (`sub1 sub2 ...`), each with an
//! optional flag declaration step and an optional execution handler, and the
//! graph walks the argument vector to find and run the deepest matching
//! subcommand.
//!
//! # Key Features
//!
//! - **Path Registration**: Register commands by space-separated path in any order
//! - **Per-Command Flags**: Every matched command parses its own flags before deferring
//! - **Usage Rendering**: Aligned subcommand listings and flag help for every command
//! - **Help Command**: A built-in `help <path>` subcommand
//! - **Error Taxonomy**: Structural dispatch errors distinct from command errors
//!
//! # Examples
//!
//! ```no_run
//! use cmdtree_core::{Command, CommandGraph, Flag, FlagSet, Result};
//!
//! #[derive(Default)]
//! struct Filter {
//!     pattern: Flag<String>,
//! }
//!
//! impl Command for Filter {
//!     fn set_flags(&mut self, flags: &mut FlagSet) {
//!         self.pattern = flags.string("pattern", "", "pattern to filter on");
//!     }
//!
//!     fn exec(&mut self, args: &[String]) -> Result<()> {
//!         for arg in args.iter().filter(|arg| arg.contains(&self.pattern.get())) {
//!             println!("{arg}");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut graph = CommandGraph::from_env();
//! graph.cmd("filter", "filter arguments by pattern", Filter::default());
//! graph.func("echo", "echo arguments", |args| {
//!     args.iter().for_each(|arg| println!("{arg}"));
//!     Ok(())
//! });
//! graph.exec()?;
//! # Ok::<(), cmdtree_core::Error>(())
//! ```

pub mod command;
mod dispatch;
pub mod error;
pub mod flags;
pub mod graph;
mod node;
mod usage;

pub use command::Command;
pub use error::{Error, Result};
pub use flags::{Flag, FlagError, FlagSet};
pub use graph::{CommandDecl, CommandGraph};
