//! Version subcommands over the git tags of a repository.

use std::process::Command as Process;

use cmdtree_core::{Command, CommandGraph, Flag, FlagSet};
use itertools::Itertools;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::version::{Increment, Version};

/// Default repository path for `-C`.
pub const DEFAULT_DIR: &str = ".";

pub const DESCRIPTION: &str = "\
The versions tool provides some basic operations to check versions of the current repository.
With the versions tool, you can list versions, get the current version, or get suggestions for
the next version of your project.";

pub const SUGGEST_DESCRIPTION: &str = "\
Suggest makes a suggestion for the next version given the type of changes.
Breaking changes will result in a major version increment suggestion.
New features without breaking changes will result in a minor version increment suggestion.
Bug fixes will result in a patch version increment suggestion.";

/// Registers the versions tool: a root `-C path` flag and the `list`,
/// `current` and `suggest` subcommands.
pub fn register(graph: &mut CommandGraph) {
    let dir = Flag::new(DEFAULT_DIR.to_string());

    let declared = dir.clone();
    graph
        .flags("", "", move |flags| {
            flags.string_var(
                &declared,
                "C",
                DEFAULT_DIR,
                "run as if command were executed in specified path",
            );
        })
        .with_description(DESCRIPTION)
        .with_usage("[-C path] <subcommand>");

    let list_dir = dir.clone();
    graph
        .func("list", "list versions", move |args| print_list(&list_dir.get(), args))
        .with_usage("[path]");

    let current_dir = dir.clone();
    graph.func("current", "get current version", move |args| {
        expect_no_arguments(args)?;
        println!("{}", current_version(&current_dir.get())?);
        Ok(())
    });

    let major_dir = dir.clone();
    graph.func("current major", "get current major version", move |args| {
        expect_no_arguments(args)?;
        let current: Version = current_version(&major_dir.get())?.parse()?;
        println!("{}", current.major_tag());
        Ok(())
    });

    let minor_dir = dir;
    graph.func("current minor", "get current minor version", move |args| {
        expect_no_arguments(args)?;
        let current: Version = current_version(&minor_dir.get())?.parse()?;
        println!("{}", current.major_minor_tag());
        Ok(())
    });

    graph.unset("current patch", "get current patch version");

    graph
        .cmd("suggest", "suggest a version", SuggestCmd::default())
        .with_description(SUGGEST_DESCRIPTION)
        .with_usage("[-inc major|minor|patch] <version>...");
}

fn expect_no_arguments(args: &[String]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::too_many_arguments(0, args.len()))
    }
}

fn print_list(dir: &str, args: &[String]) -> cmdtree_core::Result<()> {
    let dir = match args {
        [] => dir,
        [dir] => dir.as_str(),
        _ => return Err(Error::too_many_arguments(1, args.len()).into()),
    };

    let versions = list_versions(dir)?;
    if versions.is_empty() {
        return Err(Error::NoVersions.into());
    }

    for version in versions {
        println!("{version}");
    }
    Ok(())
}

/// Valid version tags of the repository at `dir`, oldest first.
///
/// # Errors
///
/// Returns an error if git cannot be started or fails in `dir`.
pub fn list_versions(dir: &str) -> Result<Vec<String>> {
    let dir = shellexpand::tilde(dir).to_string();
    debug!("Listing tags in `{}`", dir);

    let output = Process::new("git").arg("-C").arg(&dir).arg("tag").output()?;
    if !output.status.success() {
        return Err(Error::Git {
            dir,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(sort_version_tags(&String::from_utf8_lossy(&output.stdout)))
}

/// Keeps the lines of `tags` that are versions, sorted by version order.
pub fn sort_version_tags(tags: &str) -> Vec<String> {
    tags.lines()
        .map(str::trim)
        .filter_map(|tag| tag.parse::<Version>().ok().map(|version| (version, tag)))
        .sorted_by(|(left, _), (right, _)| left.cmp(right))
        .map(|(_, tag)| tag.to_string())
        .collect()
}

/// Highest version tag of the repository at `dir`.
///
/// # Errors
///
/// Returns [`Error::NoVersions`] when the repository has no version tags.
pub fn current_version(dir: &str) -> Result<String> {
    list_versions(dir)?.pop().ok_or(Error::NoVersions)
}

pub fn suggest(version: &str, increment: Increment) -> Result<Version> {
    Ok(version.parse::<Version>()?.increment(increment))
}

#[derive(Default)]
pub struct SuggestCmd {
    increment: Flag<String>,
}

impl Command for SuggestCmd {
    fn set_flags(&mut self, flags: &mut FlagSet) {
        self.increment = flags.string("inc", "major", "type of increment [major,minor,patch]");
    }

    fn exec(&mut self, args: &[String]) -> cmdtree_core::Result<()> {
        let increment: Increment = self.increment.get().parse()?;
        info!("Suggesting {:?} increments for {:?}", increment, args);

        for arg in args {
            match suggest(arg, increment) {
                Ok(next) => println!("{next}"),
                Err(e) => eprintln!("{e}"),
            }
        }
        Ok(())
    }
}
