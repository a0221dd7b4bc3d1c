use std::fmt::{Debug, Formatter};

use crate::error::{Error, Result};
use crate::flags::FlagSet;

/// Handler of an execution-only command.
pub type ExecFn = Box<dyn FnMut(&[String]) -> Result<()>>;

/// Flag declaration step of a flags-only command.
pub type FlagsFn = Box<dyn FnMut(&mut FlagSet)>;

/// A subcommand with its own flags and execution.
///
/// Every command matched on the command line has its flags parsed; only the
/// last one is executed, with the positional arguments left after parsing.
pub trait Command {
    /// Declares the command's flags. Called at most once per registered node.
    fn set_flags(&mut self, _flags: &mut FlagSet) {}

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Any error is returned unchanged to the caller of the dispatch, except
    /// [`Error::Unimplemented`] which is reclassified by the dispatcher.
    fn exec(&mut self, args: &[String]) -> Result<()>;
}

pub(crate) enum Behavior {
    Command(Box<dyn Command>),
    ExecOnly(ExecFn),
    FlagsOnly(FlagsFn),
    Unset,
    Help,
}

impl Behavior {
    pub(crate) fn declare_flags(&mut self, flags: &mut FlagSet) {
        match self {
            Behavior::Command(command) => command.set_flags(flags),
            Behavior::FlagsOnly(declare) => declare(flags),
            Behavior::ExecOnly(_) | Behavior::Unset | Behavior::Help => {}
        }
    }

    pub(crate) fn execute(&mut self, args: &[String]) -> Result<()> {
        match self {
            Behavior::Command(command) => command.exec(args),
            Behavior::ExecOnly(handler) => handler(args),
            // help is answered by the dispatcher itself
            Behavior::FlagsOnly(_) | Behavior::Unset | Behavior::Help => Err(Error::Unimplemented),
        }
    }

    pub(crate) fn is_help(&self) -> bool {
        matches!(self, Behavior::Help)
    }

    pub(crate) fn is_unset(&self) -> bool {
        matches!(self, Behavior::Unset)
    }
}

impl Debug for Behavior {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Behavior::Command(_) => "Command",
            Behavior::ExecOnly(_) => "ExecOnly",
            Behavior::FlagsOnly(_) => "FlagsOnly",
            Behavior::Unset => "Unset",
            Behavior::Help => "Help",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_and_unset_are_unimplemented() {
        let mut passthrough = Behavior::FlagsOnly(Box::new(|_: &mut FlagSet| {}));
        assert!(matches!(passthrough.execute(&[]), Err(Error::Unimplemented)));

        let mut unset = Behavior::Unset;
        assert!(matches!(unset.execute(&[]), Err(Error::Unimplemented)));
    }

    #[test]
    fn test_exec_only_ignores_flags() {
        let mut flags = FlagSet::new("echo");
        let mut echo = Behavior::ExecOnly(Box::new(|args: &[String]| {
            assert_eq!(args, ["-x".to_string()]);
            Ok(())
        }));
        echo.declare_flags(&mut flags);
        assert!(flags.is_empty());
        assert!(echo.execute(&["-x".to_string()]).is_ok());
    }
}
