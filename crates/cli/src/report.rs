//! Exit status and error output for the example binaries.

use std::process::ExitCode;

use cmdtree_core::{CommandGraph, Error};
use crossterm::style::Stylize;
use log::debug;

/// Dispatches the process arguments through `graph` and reports any error
/// on stderr.
pub fn run(mut graph: CommandGraph) -> ExitCode {
    match graph.exec() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Dispatch failed: {:?}", e);
            report(&e);
            ExitCode::FAILURE
        }
    }
}

pub fn report(error: &Error) {
    eprintln!("{} {error}", "error:".red().bold());
    if let Some(hint) = hint(error) {
        eprintln!("{hint}");
    }
}

/// Follow-up line printed under an error, if any.
pub fn hint(error: &Error) -> Option<String> {
    match error {
        Error::UnrecognizedSubcommand {
            suggestion: Some(suggestion),
            ..
        } => Some(format!("Did you mean `{suggestion}`?")),
        Error::HelpTargetNotFound { .. } => Some("Run `help` to list available commands.".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint() {
        let error = Error::unrecognized_subcommand("versions".into(), "lst".into(), Some("list".into()));
        assert_eq!(hint(&error).as_deref(), Some("Did you mean `list`?"));

        let error = Error::unrecognized_subcommand("versions".into(), "zzz".into(), None);
        assert_eq!(hint(&error), None);

        assert_eq!(hint(&Error::missing_subcommand("versions".into())), None);
        assert!(hint(&Error::help_target_not_found("nope".into())).is_some());
    }
}
