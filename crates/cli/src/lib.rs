//! cmdtree CLI Library
//!
//! Example programs built on `cmdtree-core`. Each module registers its
//! subcommands on a [`CommandGraph`](cmdtree_core::CommandGraph); the
//! binaries only initialise logging, register and dispatch.
//!
//! # Examples
//!
//! ```bash
//! # Arithmetic
//! calc add 1 2
//! calc sum 1 2 3 4
//! calc help divide
//!
//! # Versions of a git repository
//! versions list
//! versions -C ~/src/project current major
//! versions suggest -inc minor v1.4.2
//! ```

pub mod calc;
pub mod error;
pub mod report;
pub mod version;
pub mod versions;
