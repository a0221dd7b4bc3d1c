//! Semantic versions in git tag form (`v1.2.3`, `v1.2.3-rc.1`, `v1.2.3+build`).
//!
//! The shorthands `v1` and `v1.2` are accepted and stand for `v1.0.0` and
//! `v1.2.0`. Build metadata is accepted but discarded.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::{EitherOrBoth, Itertools};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    Major,
    Minor,
    Patch,
}

impl FromStr for Increment {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "major" => Ok(Increment::Major),
            "minor" => Ok(Increment::Minor),
            "patch" => Ok(Increment::Patch),
            _ => Err(Error::InvalidIncrement(value.to_string())),
        }
    }
}

impl Version {
    /// Major component in tag form, e.g. `v1`.
    pub fn major_tag(&self) -> String {
        format!("v{}", self.major)
    }

    /// Major and minor components in tag form, e.g. `v1.2`.
    pub fn major_minor_tag(&self) -> String {
        format!("v{}.{}", self.major, self.minor)
    }

    /// Next version for the given kind of change. Any prerelease is dropped.
    pub fn increment(&self, increment: Increment) -> Version {
        let (major, minor, patch) = match increment {
            Increment::Major => (self.major + 1, 0, 0),
            Increment::Minor => (self.major, self.minor + 1, 0),
            Increment::Patch => (self.major, self.minor, self.patch + 1),
        };
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(value.to_string());

        let body = value.strip_prefix('v').ok_or_else(invalid)?;
        let (body, build) = match body.split_once('+') {
            Some((body, build)) => (body, Some(build)),
            None => (body, None),
        };
        let (core, prerelease) = match body.split_once('-') {
            Some((core, prerelease)) => (core, Some(prerelease)),
            None => (body, None),
        };

        if let Some(build) = build {
            if !build.split('.').all(is_build_identifier) {
                return Err(invalid());
            }
        }
        if let Some(prerelease) = prerelease {
            if !prerelease.split('.').all(is_prerelease_identifier) {
                return Err(invalid());
            }
        }

        let numbers: Vec<u64> = core
            .split('.')
            .map(parse_number)
            .collect::<Option<_>>()
            .ok_or_else(invalid)?;

        // Shorthand forms cannot carry a prerelease or build suffix
        let full = numbers.len() == 3;
        if numbers.len() > 3 || (!full && (prerelease.is_some() || build.is_some())) {
            return Err(invalid());
        }

        Ok(Version {
            major: numbers[0],
            minor: numbers.get(1).copied().unwrap_or_default(),
            patch: numbers.get(2).copied().unwrap_or_default(),
            prerelease: prerelease.map(ToString::to_string),
        })
    }
}

fn parse_number(part: &str) -> Option<u64> {
    let digits = !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !digits || (part.len() > 1 && part.starts_with('0')) {
        return None;
    }
    part.parse().ok()
}

fn is_build_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
}

fn is_prerelease_identifier(identifier: &str) -> bool {
    let numeric = identifier.bytes().all(|byte| byte.is_ascii_digit());
    is_build_identifier(identifier) && !(numeric && identifier.len() > 1 && identifier.starts_with('0'))
}

fn compare_identifiers(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

fn compare_prerelease(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => left
            .split('.')
            .zip_longest(right.split('.'))
            .map(|pair| match pair {
                EitherOrBoth::Both(left, right) => compare_identifiers(left, right),
                EitherOrBoth::Left(_) => Ordering::Greater,
                EitherOrBoth::Right(_) => Ordering::Less,
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| compare_prerelease(self.prerelease.as_deref(), other.prerelease.as_deref()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Version {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(prerelease) = &self.prerelease {
            write!(formatter, "-{prerelease}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(value: &str) -> Version {
        value.parse().unwrap()
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            version("v1.2.3-rc.1+build.5"),
            Version {
                major: 1,
                minor: 2,
                patch: 3,
                prerelease: Some("rc.1".to_string()),
            }
        );
        assert_eq!(version("v2").to_string(), "v2.0.0");
        assert_eq!(version("v2.4").to_string(), "v2.4.0");
        assert_eq!(version("v0.10.0").minor, 10);
    }

    #[test]
    fn test_parse_invalid() {
        for value in [
            "1.2.3", "v", "v1.2.3.4", "v01.2.3", "v1.2.x", "v1.2-rc", "v1.2.3-", "v1.2.3-01", "v1.2.3+", "latest",
        ] {
            assert!(
                matches!(value.parse::<Version>(), Err(Error::InvalidVersion(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_ordering() {
        let mut versions = vec![
            version("v1.10.0"),
            version("v1.2.0"),
            version("v1.2.0-rc.2"),
            version("v1.2.0-rc.10"),
            version("v1.2.0-beta"),
            version("v1.2.0-rc"),
            version("v0.9.9"),
        ];
        versions.sort();

        let ordered: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(
            ordered,
            vec!["v0.9.9", "v1.2.0-beta", "v1.2.0-rc", "v1.2.0-rc.2", "v1.2.0-rc.10", "v1.2.0", "v1.10.0"]
        );
    }

    #[test]
    fn test_increment() {
        let current = version("v1.4.2-rc.1");
        assert_eq!(current.increment(Increment::Major).to_string(), "v2.0.0");
        assert_eq!(current.increment(Increment::Minor).to_string(), "v1.5.0");
        assert_eq!(current.increment(Increment::Patch).to_string(), "v1.4.3");
    }

    #[test]
    fn test_tags() {
        let current = version("v3.1.4");
        assert_eq!(current.major_tag(), "v3");
        assert_eq!(current.major_minor_tag(), "v3.1");
    }

    #[test]
    fn test_increment_from_str() {
        assert_eq!("minor".parse::<Increment>().unwrap(), Increment::Minor);
        assert!(matches!("huge".parse::<Increment>(), Err(Error::InvalidIncrement(value)) if value == "huge"));
    }
}
