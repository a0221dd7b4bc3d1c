use thiserror::Error;

use crate::flags::FlagError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a dispatch.
///
/// Paths carried by the structural variants are the space-separated command
/// line of the offending node, starting with the program name.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: command not implemented", .path)]
    NotImplemented { path: String },

    #[error("{}: unrecognized subcommand \"{}\"", .path, .token)]
    UnrecognizedSubcommand {
        path: String,
        token: String,
        suggestion: Option<String>,
    },

    #[error("{}: expected subcommand", .path)]
    MissingSubcommand { path: String },

    #[error("{}: command not found", .path)]
    HelpTargetNotFound { path: String },

    /// Returned by a behavior with nothing to run. The dispatcher replaces it
    /// with one of the structural variants above before it reaches the caller.
    #[error("not implemented")]
    Unimplemented,

    #[error(transparent)]
    Flags(#[from] FlagError),

    #[error("Error writing usage: {}", .0)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Domain(Box<dyn std::error::Error + Send + Sync>),

    #[error("{}", .0)]
    Custom(String),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }

    pub fn domain<E>(original: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Domain(Box::new(original))
    }

    pub fn not_implemented(path: String) -> Self {
        Self::NotImplemented { path }
    }

    pub fn unrecognized_subcommand(path: String, token: String, suggestion: Option<String>) -> Self {
        Self::UnrecognizedSubcommand {
            path,
            token,
            suggestion,
        }
    }

    pub fn missing_subcommand(path: String) -> Self {
        Self::MissingSubcommand { path }
    }

    pub fn help_target_not_found(path: String) -> Self {
        Self::HelpTargetNotFound { path }
    }
}
