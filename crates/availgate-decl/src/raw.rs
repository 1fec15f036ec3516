//! Raw declaration records as produced by the header extractor.
//!
//! Nothing here is validated: platform tokens and version texts are kept
//! exactly as written. The ingest step decides what survives.

use serde::{Deserialize, Serialize};

/// One declared constant and its availability attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

impl RawDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: RawAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// One availability attribute, e.g. `iOS 13.0, deprecated 16.0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttribute {
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Marked unavailable on this platform.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unavailable: bool,
}

impl RawAttribute {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Self::default()
        }
    }

    pub fn introduced(mut self, version: impl Into<String>) -> Self {
        self.introduced = Some(version.into());
        self
    }

    pub fn deprecated(mut self, version: impl Into<String>) -> Self {
        self.deprecated = Some(version.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}
