//! Target platforms and their deployment baselines.

use std::collections::BTreeMap;

use crate::version::Version;

/// An operating system family a symbol can be available on.
///
/// The declaration order is the canonical order used whenever platforms
/// are listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Platform {
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "macOS")]
    MacOs,
    #[serde(rename = "watchOS")]
    WatchOs,
    #[serde(rename = "tvOS")]
    TvOs,
    #[serde(rename = "visionOS")]
    VisionOs,
}

impl Platform {
    /// Every known platform, in canonical order.
    pub const ALL: [Platform; 5] = [
        Platform::Ios,
        Platform::MacOs,
        Platform::WatchOs,
        Platform::TvOs,
        Platform::VisionOs,
    ];

    /// The token used in availability attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::MacOs => "macOS",
            Self::WatchOs => "watchOS",
            Self::TvOs => "tvOS",
            Self::VisionOs => "visionOS",
        }
    }

    /// Minimum deployment target assumed when no baseline is configured.
    pub fn default_baseline(self) -> Version {
        match self {
            Self::Ios => Version::major(16),
            Self::MacOs => Version::major(13),
            Self::WatchOs => Version::major(9),
            Self::TvOs => Version::major(16),
            Self::VisionOs => Version::major(1),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    /// Exact, case-sensitive match on the attribute token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown platform: {s}"))
    }
}

/// Minimum supported version per platform.
///
/// Availability at or below the baseline is treated as unconditional.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Version>",
    into = "BTreeMap<String, Version>"
)]
pub struct Baseline(BTreeMap<Platform, Version>);

impl Baseline {
    pub fn new(versions: impl IntoIterator<Item = (Platform, Version)>) -> Self {
        Self(versions.into_iter().collect())
    }

    pub fn get(&self, platform: Platform) -> Option<&Version> {
        self.0.get(&platform)
    }

    pub fn contains(&self, platform: Platform) -> bool {
        self.0.contains_key(&platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &Version)> {
        self.0.iter().map(|(p, v)| (*p, v))
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::new(Platform::ALL.map(|p| (p, p.default_baseline())))
    }
}

impl TryFrom<BTreeMap<String, Version>> for Baseline {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Version>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(token, version)| Ok((token.parse::<Platform>()?, version)))
            .collect::<Result<BTreeMap<_, _>, String>>()
            .map(Self)
    }
}

impl From<Baseline> for BTreeMap<String, Version> {
    fn from(baseline: Baseline) -> Self {
        baseline
            .0
            .into_iter()
            .map(|(p, v)| (p.as_str().to_string(), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_exact() {
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("visionOS".parse::<Platform>().unwrap(), Platform::VisionOs);
        assert!("ios".parse::<Platform>().is_err());
        assert!("iOSApplicationExtension".parse::<Platform>().is_err());
        assert!("macCatalyst".parse::<Platform>().is_err());
    }

    #[test]
    fn canonical_order() {
        let mut shuffled = vec![Platform::TvOs, Platform::Ios, Platform::VisionOs, Platform::MacOs];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Platform::Ios, Platform::MacOs, Platform::TvOs, Platform::VisionOs]
        );
    }

    #[test]
    fn default_baseline_covers_every_platform() {
        let baseline = Baseline::default();
        for platform in Platform::ALL {
            assert_eq!(baseline.get(platform), Some(&platform.default_baseline()));
        }
        assert_eq!(baseline.get(Platform::MacOs), Some(&Version::major(13)));
    }

    #[test]
    fn baseline_serializes_with_platform_tokens() {
        let baseline = Baseline::new([(Platform::Ios, Version::major(17))]);
        let json = serde_json::to_string(&baseline).unwrap();
        assert_eq!(json, r#"{"iOS":"17"}"#);
        let back: Baseline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, baseline);
        assert!(serde_json::from_str::<Baseline>(r#"{"Android":"14"}"#).is_err());
    }
}
