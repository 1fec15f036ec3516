//! Availability of a symbol on one platform.

use crate::platform::Platform;
use crate::version::Version;

/// When a symbol can be used on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Availability {
    /// Usable on every supported version, optionally deprecated from a version on.
    Always {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<Version>,
    },

    /// Usable from `introduced` on.
    Since {
        introduced: Version,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<Version>,
    },

    /// Not usable on any version.
    Never,
}

impl Availability {
    pub fn always() -> Self {
        Self::Always { deprecated: None }
    }

    pub fn since(introduced: Version) -> Self {
        Self::Since {
            introduced,
            deprecated: None,
        }
    }

    pub fn introduced(&self) -> Option<&Version> {
        match self {
            Self::Since { introduced, .. } => Some(introduced),
            Self::Always { .. } | Self::Never => None,
        }
    }

    pub fn deprecated(&self) -> Option<&Version> {
        match self {
            Self::Always { deprecated } | Self::Since { deprecated, .. } => deprecated.as_ref(),
            Self::Never => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Usable everywhere with nothing to say about it.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Always { deprecated: None })
    }

    /// Would a runtime at version `probe` be allowed to use the symbol?
    pub fn admits(&self, probe: &Version) -> bool {
        match self {
            Self::Always { .. } => true,
            Self::Since { introduced, .. } => probe.is_higher_or_equal(introduced),
            Self::Never => false,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always { deprecated: None } => write!(f, "always"),
            Self::Always {
                deprecated: Some(d),
            } => write!(f, "always (deprecated {d})"),
            Self::Since {
                introduced,
                deprecated: None,
            } => write!(f, "since {introduced}"),
            Self::Since {
                introduced,
                deprecated: Some(d),
            } => write!(f, "since {introduced} (deprecated {d})"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// One availability statement about one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlatformFact {
    pub platform: Platform,
    pub availability: Availability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlatformFact {
    pub fn new(platform: Platform, availability: Availability) -> Self {
        Self {
            platform,
            availability,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn never(platform: Platform) -> Self {
        Self::new(platform, Availability::Never)
    }
}

impl std::fmt::Display for PlatformFact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.platform, self.availability)?;
        if let Some(message) = &self.message {
            write!(f, " \"{message}\"")?;
        }
        Ok(())
    }
}
