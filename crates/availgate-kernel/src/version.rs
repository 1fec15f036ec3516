//! Dotted numeric versions.
//!
//! A version is an ordered list of components compared as if the shorter
//! one were padded with trailing zeros: `13`, `13.0` and `13.0.0` are all
//! the same version. Equality, ordering and hashing agree on that.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// An OS version such as `17`, `14.2` or `10.15.4`.
#[derive(Debug, Clone)]
pub struct Version(Vec<u32>);

/// A version string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version: {0:?}")]
pub struct VersionParseError(pub String);

impl Version {
    /// Build a version from its components. An empty list is version `0`.
    pub fn new(components: impl Into<Vec<u32>>) -> Self {
        let components = components.into();
        if components.is_empty() {
            Self(vec![0])
        } else {
            Self(components)
        }
    }

    /// A single-component version, e.g. `Version::major(17)`.
    pub fn major(major: u32) -> Self {
        Self(vec![major])
    }

    /// The components as written.
    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// Components with trailing zeros removed.
    fn significant(&self) -> &[u32] {
        let end = self
            .0
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |last| last + 1);
        &self.0[..end]
    }

    /// Compare component-wise, missing components count as zero.
    pub fn compare(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    pub fn is_higher_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn is_lower_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_higher_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Less
    }

    pub fn is_lower_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Greater
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = VersionParseError;

    /// Accepts `.` or `_` separated components (`14.2`, `10_15`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }
        let components = trimmed
            .split(['.', '_'])
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionParseError(s.to_string()))?;
        Ok(Self(components))
    }
}

impl From<u32> for Version {
    fn from(major: u32) -> Self {
        Self::major(major)
    }
}

impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Versions are written as strings, but a bare integer major version is
/// accepted too (`iOS = 16` in TOML).
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum VersionRepr {
    Text(String),
    Major(u32),
}

impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match VersionRepr::deserialize(deserializer)? {
            VersionRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            VersionRepr::Major(major) => Ok(Self::major(major)),
        }
    }
}
