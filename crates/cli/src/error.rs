use std::num::ParseFloatError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("expected {} arguments, received {}", .expected, .received)]
    ArgumentCount { expected: usize, received: usize },

    #[error("expected at most {} positional arguments, received {}", .max, .received)]
    TooManyArguments { max: usize, received: usize },

    #[error("invalid number `{}`: {}", .value, .original)]
    InvalidNumber {
        value: String,
        original: ParseFloatError,
    },

    #[error("second argument must not be 0")]
    DivideByZero,

    #[error("no versions found")]
    NoVersions,

    #[error("git failed in `{}`: {}", .dir, .stderr)]
    Git { dir: String, stderr: String },

    #[error("Error running git: {}", .0)]
    Io(#[from] std::io::Error),

    #[error("{}: not a valid version", .0)]
    InvalidVersion(String),

    #[error("invalid increment type: {}", .0)]
    InvalidIncrement(String),
}

impl Error {
    pub fn invalid_number(value: &str, original: ParseFloatError) -> Self {
        Self::InvalidNumber {
            value: value.to_string(),
            original,
        }
    }

    pub fn too_many_arguments(max: usize, received: usize) -> Self {
        Self::TooManyArguments { max, received }
    }
}

impl From<Error> for cmdtree_core::Error {
    fn from(value: Error) -> Self {
        cmdtree_core::Error::domain(value)
    }
}
