//! Error types for availability resolution.

use crate::platform::Platform;
use crate::version::Version;

/// Errors arising while merging, canonicalizing or dispatching symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// A platform is declared both unavailable and available.
    #[error("contradiction: `{raw_name}` is both unavailable and available on {platform}")]
    Contradiction {
        /// Case name of the symbol.
        symbol: String,
        raw_name: String,
        platform: Platform,
    },

    /// Two distinct legacy names map to the same case name.
    #[error("name collision: `{existing}` and `{incoming}` both map to case `{case_name}`")]
    NameCollision {
        case_name: String,
        existing: String,
        incoming: String,
    },

    /// Nothing is reachable between the baseline and the lowest branch.
    #[error(
        "uncovered baseline: {platform} has no branch at or below {lowest} down to baseline {baseline}"
    )]
    UncoveredBaseline {
        platform: Platform,
        lowest: Version,
        baseline: Version,
    },

    /// A naming pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A backend could not render the model.
    #[error("emission failed: {0}")]
    Emission(String),
}

impl KernelError {
    /// The inconsistency class for errors that are reported per symbol.
    pub fn class(&self) -> Option<InconsistencyClass> {
        match self {
            Self::Contradiction { .. } => Some(InconsistencyClass::Contradiction),
            Self::NameCollision { .. } => Some(InconsistencyClass::NameCollision),
            Self::UncoveredBaseline { .. } => Some(InconsistencyClass::UncoveredBaseline),
            Self::InvalidPattern { .. } | Self::Emission(_) => None,
        }
    }

    /// Record form of a per-symbol error, or `None` for fatal errors.
    pub fn to_inconsistency(&self) -> Option<Inconsistency> {
        let class = self.class()?;
        let (symbol, raw_name, platform) = match self {
            Self::Contradiction {
                symbol,
                raw_name,
                platform,
            } => (Some(symbol.clone()), Some(raw_name.clone()), Some(*platform)),
            Self::NameCollision { case_name, .. } => (Some(case_name.clone()), None, None),
            Self::UncoveredBaseline { platform, .. } => (None, None, Some(*platform)),
            Self::InvalidPattern { .. } | Self::Emission(_) => (None, None, None),
        };
        Some(Inconsistency {
            class,
            symbol,
            raw_name,
            platform,
            description: self.to_string(),
        })
    }
}

/// Kind of input inconsistency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyClass {
    Contradiction,
    NameCollision,
    UncoveredBaseline,
}

impl std::fmt::Display for InconsistencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contradiction => write!(f, "contradiction"),
            Self::NameCollision => write!(f, "name_collision"),
            Self::UncoveredBaseline => write!(f, "uncovered_baseline"),
        }
    }
}

/// A reported inconsistency. The symbol it names is left out of the model.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    pub class: InconsistencyClass,
    /// Case name of the excluded symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub description: String,
}
