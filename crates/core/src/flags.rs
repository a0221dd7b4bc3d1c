//! Per-command flag sets.
//!
//! Each node of a [`CommandGraph`](crate::CommandGraph) owns one [`FlagSet`].
//! Declarations hand back shared [`Flag`] handles which are refreshed every
//! time the set parses an argument list. Value conversion, validation and
//! the flag listing are delegated to a `clap` command built from the
//! declarations.
//!
//! Accepted syntax, for a declared flag `name`:
//!
//! - `-name value` / `--name value`
//! - `-name=value` / `--name=value`
//! - `-name` / `-name=false` for boolean flags
//!
//! Parsing stops at the first token that is not a flag, or after a `--`
//! terminator. Everything from there on is returned as positional arguments.

use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::io::{self, Write};
use std::rc::Rc;

use clap::{value_parser, Arg, ArgAction, ArgMatches};
use indexmap::IndexMap;
use log::{trace, warn};
use thiserror::Error;

/// Tokens that request help from any command.
pub const HELP_FLAGS: [&str; 2] = ["-help", "--help"];

/// Short help token, recognized only by sets that declare flags of their own.
const SHORT_HELP_FLAG: &str = "-h";

pub fn is_help_flag(arg: &str) -> bool {
    HELP_FLAGS.contains(&arg)
}

#[derive(Error, Debug)]
pub enum FlagError {
    #[error("help requested with `{}`", .flag)]
    HelpRequested { flag: String },

    #[error("{}: flag provided but not defined: -{}", .set, .name)]
    Undefined { set: String, name: String },

    #[error("{}: flag needs an argument: -{}", .set, .name)]
    MissingValue { set: String, name: String },

    #[error("{}: {}", .set, .message)]
    Invalid {
        set: String,
        message: String,
        #[source]
        original: clap::Error,
    },
}

impl FlagError {
    fn invalid(set: &str, original: clap::Error) -> Self {
        let rendered = original.to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        Self::Invalid {
            set: set.to_string(),
            message,
            original,
        }
    }
}

/// Shared handle to the current value of a declared flag.
///
/// Cloning the handle shares the value, which is how an intermediate command
/// exposes its flags to deeper subcommands.
pub struct Flag<T>(Rc<RefCell<T>>);

impl<T: Clone> Flag<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}

impl<T> Clone for Flag<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Clone + Default> Default for Flag<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Flag<T> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("Flag").field(&self.0.borrow()).finish()
    }
}

enum Binding {
    Text(Flag<String>),
    Switch(Flag<bool>),
    Int(Flag<i64>),
    Float(Flag<f64>),
}

impl Binding {
    fn takes_value(&self) -> bool {
        !matches!(self, Binding::Switch(_))
    }

    fn store(&self, matches: &ArgMatches, name: &str) {
        match self {
            Binding::Text(flag) => {
                if let Some(value) = matches.get_one::<String>(name) {
                    flag.set(value.clone());
                }
            }
            Binding::Switch(flag) => {
                if let Some(value) = matches.get_one::<bool>(name) {
                    flag.set(*value);
                }
            }
            Binding::Int(flag) => {
                if let Some(value) = matches.get_one::<i64>(name) {
                    flag.set(*value);
                }
            }
            Binding::Float(flag) => {
                if let Some(value) = matches.get_one::<f64>(name) {
                    flag.set(*value);
                }
            }
        }
    }
}

pub struct FlagSet {
    name: String,
    command: clap::Command,
    bindings: IndexMap<String, Binding>,
    output: Box<dyn Write>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let command = clap::Command::new(name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .term_width(0)
            .help_template("Flags:\n{options}");

        Self {
            name,
            command,
            bindings: IndexMap::new(),
            output: Box::new(io::stderr()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Flag<String> {
        let flag = Flag::new(default.to_string());
        self.string_var(&flag, name, default, usage);
        flag
    }

    pub fn string_var(&mut self, flag: &Flag<String>, name: &str, default: &str, usage: &str) {
        flag.set(default.to_string());
        let arg = Arg::new(name.to_string())
            .value_name("string")
            .value_parser(value_parser!(String))
            .hide_default_value(default.is_empty());
        self.define(arg, name, default.to_string(), usage, Binding::Text(flag.clone()));
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Flag<bool> {
        let flag = Flag::new(default);
        self.bool_var(&flag, name, default, usage);
        flag
    }

    pub fn bool_var(&mut self, flag: &Flag<bool>, name: &str, default: bool, usage: &str) {
        flag.set(default);
        let arg = Arg::new(name.to_string())
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(parse_bool)
            .hide_possible_values(true)
            .hide_default_value(!default);
        self.define(arg, name, default.to_string(), usage, Binding::Switch(flag.clone()));
    }

    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> Flag<i64> {
        let flag = Flag::new(default);
        self.int_var(&flag, name, default, usage);
        flag
    }

    pub fn int_var(&mut self, flag: &Flag<i64>, name: &str, default: i64, usage: &str) {
        flag.set(default);
        let arg = Arg::new(name.to_string())
            .value_name("int")
            .value_parser(value_parser!(i64));
        self.define(arg, name, default.to_string(), usage, Binding::Int(flag.clone()));
    }

    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> Flag<f64> {
        let flag = Flag::new(default);
        self.float_var(&flag, name, default, usage);
        flag
    }

    pub fn float_var(&mut self, flag: &Flag<f64>, name: &str, default: f64, usage: &str) {
        flag.set(default);
        let arg = Arg::new(name.to_string())
            .value_name("float")
            .value_parser(value_parser!(f64));
        self.define(arg, name, default.to_string(), usage, Binding::Float(flag.clone()));
    }

    fn define(&mut self, arg: Arg, name: &str, default: String, usage: &str, binding: Binding) {
        if self.bindings.contains_key(name) {
            warn!("Flag `-{}` is already defined for `{}`, ignoring redefinition", name, self.name);
            return;
        }

        let arg = arg
            .long(name.to_string())
            .help(usage.to_string())
            .action(ArgAction::Set)
            .default_value(default);
        self.command = std::mem::take(&mut self.command).arg(arg);
        self.bindings.insert(name.to_string(), binding);
    }

    /// Parses the leading flags of `args`, updates every bound [`Flag`] and
    /// returns the remaining positional arguments.
    ///
    /// Flags missing from `args` are reset to their declared defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag is not declared, lacks its value or has a
    /// value of the wrong type. An undeclared `-help`, `--help` or `-h`
    /// yields [`FlagError::HelpRequested`].
    pub fn parse(&mut self, args: &[String]) -> Result<Vec<String>, FlagError> {
        let mut normalized = Vec::new();
        let mut index = 0;

        while index < args.len() {
            let arg = &args[index];
            if arg == "--" {
                index += 1;
                break;
            }
            let Some(body) = flag_body(arg) else {
                break;
            };

            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };

            let Some(binding) = self.bindings.get(name) else {
                if is_help_flag(arg) || arg == SHORT_HELP_FLAG {
                    return Err(FlagError::HelpRequested { flag: arg.clone() });
                }
                return Err(FlagError::Undefined {
                    set: self.name.clone(),
                    name: name.to_string(),
                });
            };

            match value {
                Some(value) => normalized.push(format!("--{name}={value}")),
                None if binding.takes_value() => {
                    index += 1;
                    let value = args.get(index).ok_or_else(|| FlagError::MissingValue {
                        set: self.name.clone(),
                        name: name.to_string(),
                    })?;
                    normalized.push(format!("--{name}={value}"));
                }
                None => normalized.push(format!("--{name}")),
            }
            index += 1;
        }

        trace!("Parsing flags for `{}`: {:?}", self.name, normalized);
        let matches = self
            .command
            .try_get_matches_from_mut(normalized)
            .map_err(|original| FlagError::invalid(&self.name, original))?;

        for (name, binding) in &self.bindings {
            binding.store(&matches, name);
        }

        Ok(args[index..].to_vec())
    }

    /// Writes the flag listing to the set's output.
    pub fn usage(&mut self) -> io::Result<()> {
        let listing = self.command.render_help();
        write!(self.output, "{listing}")?;
        self.output.flush()
    }

    /// Replaces the writer used by [`FlagSet::usage`], returning the previous one.
    pub fn set_output(&mut self, output: Box<dyn Write>) -> Box<dyn Write> {
        std::mem::replace(&mut self.output, output)
    }
}

impl Debug for FlagSet {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FlagSet")
            .field("name", &self.name)
            .field("flags", &self.bindings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Boolean spellings accepted by Go's `strconv.ParseBool`.
fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("invalid boolean value `{value}`")),
    }
}

/// Strips the leading dashes of a flag token, or returns `None` for a
/// positional argument.
fn flag_body(arg: &str) -> Option<&str> {
    arg.strip_prefix("--")
        .or_else(|| arg.strip_prefix('-'))
        .filter(|body| !body.is_empty() && !body.starts_with('-') && !body.starts_with('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_value_forms() {
        let mut flags = FlagSet::new("filter");
        let pattern = flags.string("pattern", "", "pattern to filter on");

        let rest = flags.parse(&args(&["-pattern", "o", "hello"])).unwrap();
        assert_eq!(pattern.get(), "o");
        assert_eq!(rest, vec!["hello"]);

        flags.parse(&args(&["--pattern=ll"])).unwrap();
        assert_eq!(pattern.get(), "ll");

        flags.parse(&args(&["-pattern=x=y"])).unwrap();
        assert_eq!(pattern.get(), "x=y");

        // Values that look like flags are taken verbatim
        flags.parse(&args(&["--pattern", "-v"])).unwrap();
        assert_eq!(pattern.get(), "-v");
    }

    #[test]
    fn test_parse_resets_missing_flags_to_default() {
        let mut flags = FlagSet::new("suggest");
        let inc = flags.string("inc", "major", "type of increment");

        flags.parse(&args(&["-inc", "patch"])).unwrap();
        assert_eq!(inc.get(), "patch");

        flags.parse(&args(&[])).unwrap();
        assert_eq!(inc.get(), "major");
    }

    #[test]
    fn test_parse_bool_forms() {
        let mut flags = FlagSet::new("filter");
        let invert = flags.bool("invert", false, "invert matches");

        let rest = flags.parse(&args(&["-invert", "value"])).unwrap();
        assert!(invert.get());
        assert_eq!(rest, vec!["value"]);

        flags.parse(&args(&["--invert=false"])).unwrap();
        assert!(!invert.get());
    }

    #[test]
    fn test_parse_bool_short_spellings() {
        let mut flags = FlagSet::new("filter");
        let invert = flags.bool("invert", false, "invert matches");

        let spellings = [("1", true), ("0", false), ("t", true), ("F", false), ("TRUE", true), ("False", false)];
        for (value, expected) in spellings {
            flags.parse(&[format!("-invert={value}")]).unwrap();
            assert_eq!(invert.get(), expected, "-invert={value}");
        }

        let result = flags.parse(&args(&["-invert=yes"]));
        assert!(matches!(result, Err(FlagError::Invalid { .. })));
    }

    #[test]
    fn test_parse_numbers() {
        let mut flags = FlagSet::new("calc");
        let count = flags.int("n", 1, "count");
        let scale = flags.float("scale", 1.0, "scale");

        flags.parse(&args(&["-n", "3", "-scale=0.5"])).unwrap();
        assert_eq!(count.get(), 3);
        assert!((scale.get() - 0.5).abs() < f64::EPSILON);

        let result = flags.parse(&args(&["-n", "three"]));
        assert!(matches!(result, Err(FlagError::Invalid { .. })));
    }

    #[test]
    fn test_parse_stops_at_positional_and_terminator() {
        let mut flags = FlagSet::new("filter");
        let invert = flags.bool("invert", false, "invert matches");

        let rest = flags.parse(&args(&["one", "-invert"])).unwrap();
        assert!(!invert.get());
        assert_eq!(rest, vec!["one", "-invert"]);

        let rest = flags.parse(&args(&["--", "-invert"])).unwrap();
        assert_eq!(rest, vec!["-invert"]);

        let rest = flags.parse(&args(&["-", "x"])).unwrap();
        assert_eq!(rest, vec!["-", "x"]);
    }

    #[test]
    fn test_parse_errors() {
        let mut flags = FlagSet::new("filter");
        flags.string("pattern", "", "pattern to filter on");

        let result = flags.parse(&args(&["-bogus"]));
        assert!(matches!(result, Err(FlagError::Undefined { name, .. }) if name == "bogus"));

        let result = flags.parse(&args(&["-pattern"]));
        assert!(matches!(result, Err(FlagError::MissingValue { name, .. }) if name == "pattern"));

        let result = flags.parse(&args(&["--help"]));
        assert!(matches!(result, Err(FlagError::HelpRequested { flag }) if flag == "--help"));

        let result = flags.parse(&args(&["-h"]));
        assert!(matches!(result, Err(FlagError::HelpRequested { flag }) if flag == "-h"));
    }

    #[test]
    fn test_shared_binding() {
        let dir = Flag::new(String::new());
        let mut flags = FlagSet::new("versions");
        flags.string_var(&dir, "C", ".", "run in path");
        assert_eq!(dir.get(), ".");

        let observer = dir.clone();
        flags.parse(&args(&["-C", "/tmp"])).unwrap();
        assert_eq!(observer.get(), "/tmp");
    }

    #[test]
    fn test_redefinition_is_ignored() {
        let mut flags = FlagSet::new("filter");
        let first = flags.string("pattern", "a", "first");
        let second = flags.string("pattern", "b", "second");

        flags.parse(&args(&["-pattern", "z"])).unwrap();
        assert_eq!(first.get(), "z");
        assert_eq!(second.get(), "b");
    }
}
