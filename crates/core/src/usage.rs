//! Usage text for a single command.
//!
//! Layout, each block followed by a blank line and skipped when empty:
//!
//! ```text
//! <name>: <help>
//!
//! Usage:
//!     <name> <usage>
//!
//! <description>
//!
//! Available subcommands:
//!         <child>         <child help>
//!
//! Flags:
//!   --<flag> <type>  <flag help>
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::Result;
use crate::flags::FlagSet;
use crate::graph::CommandGraph;
use crate::node::{CommandNode, NodeId};

const TAB_WIDTH: usize = 8;
const COLUMN_BUFFER: usize = 5;

impl CommandGraph {
    pub(crate) fn write_usage(&mut self, id: NodeId) -> Result<()> {
        let listing: Vec<(String, String)> = self.nodes[id.0]
            .children
            .iter()
            .map(|(name, child)| (name.clone(), self.nodes[child.0].help.clone()))
            .collect();

        let node = &mut self.nodes[id.0];
        render_usage(node, &listing, &mut self.output)?;
        Ok(())
    }
}

fn render_usage(node: &mut CommandNode, listing: &[(String, String)], sink: &mut dyn Write) -> io::Result<()> {
    if node.help.is_empty() {
        writeln!(sink, "{}", node.name)?;
    } else {
        writeln!(sink, "{}: {}", node.name, node.help)?;
    }
    writeln!(sink)?;

    if let Some(usage) = &node.usage {
        writeln!(sink, "Usage:\n\t{} {}", node.name, usage)?;
        writeln!(sink)?;
    }

    if let Some(description) = &node.description {
        writeln!(sink, "{description}")?;
        writeln!(sink)?;
    }

    if !listing.is_empty() {
        let longest = listing.iter().map(|(name, _)| name.len()).max().unwrap_or_default();
        let width = help_column(longest);
        let indent = " ".repeat(TAB_WIDTH);

        writeln!(sink, "Available subcommands:")?;
        for (name, help) in listing {
            writeln!(sink, "{indent}{name:<width$}{help}")?;
        }
        writeln!(sink)?;
    }

    if node.has_flags {
        node.bind_flags();
        let captured = {
            let mut redirect = OutputRedirect::capture(&mut node.flags);
            redirect.usage()?;
            redirect.captured()
        };
        sink.write_all(&captured)?;
        writeln!(sink)?;
    }

    sink.flush()
}

/// Column where child help starts: the longest name plus a buffer, rounded
/// up to the next tab stop.
fn help_column(longest: usize) -> usize {
    TAB_WIDTH * ((longest + COLUMN_BUFFER) / TAB_WIDTH + 1)
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Points a flag set's usage output at an in-memory buffer, restoring the
/// previous writer when dropped.
struct OutputRedirect<'a> {
    flags: &'a mut FlagSet,
    buffer: SharedBuffer,
    previous: Option<Box<dyn Write>>,
}

impl<'a> OutputRedirect<'a> {
    fn capture(flags: &'a mut FlagSet) -> Self {
        let buffer = SharedBuffer::default();
        let previous = flags.set_output(Box::new(buffer.clone()));
        Self {
            flags,
            buffer,
            previous: Some(previous),
        }
    }

    fn usage(&mut self) -> io::Result<()> {
        self.flags.usage()
    }

    fn captured(&self) -> Vec<u8> {
        self.buffer.0.borrow().clone()
    }
}

impl Drop for OutputRedirect<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.flags.set_output(previous);
        }
    }
}
