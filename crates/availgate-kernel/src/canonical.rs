//! Fact merge and canonicalization.
//!
//! Turns the raw, merged facts of one symbol into:
//!
//! - a resolved state for every configured platform
//!   (`Unrestricted`, `Restricted` or `Unavailable`), and
//! - the minimal ordered guard set a declaration needs.
//!
//! ```text
//! raw facts ──scope──▶ in-scope facts ──contradiction check──▶
//!   ──redundancy filter + dedupe──▶ survivors / elided platforms
//!   ──completion──▶ per-platform state ──▶ GuardSet
//! ```
//!
//! Canonicalization of one symbol never looks at another symbol.

use std::collections::BTreeSet;

use crate::availability::{Availability, PlatformFact};
use crate::error::KernelError;
use crate::naming::CaseName;
use crate::platform::{Baseline, Platform};
use crate::symbol::SymbolEntry;
use crate::version::Version;

/// Resolved availability of one symbol on one platform.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlatformState {
    /// Available on every supported version; nothing to guard.
    Unrestricted,

    /// Available under any of the listed facts. Never contains `Never`.
    Restricted { facts: Vec<PlatformFact> },

    /// Must be reported unavailable. `synthesized` when no fact said so
    /// and the platform was completed.
    Unavailable {
        #[serde(default)]
        synthesized: bool,
    },
}

impl PlatformState {
    /// Is the symbol usable at runtime version `probe`?
    pub fn admits(&self, probe: &Version) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted { facts } => facts.iter().any(|f| f.availability.admits(probe)),
            Self::Unavailable { .. } => false,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// A platform paired with its resolved state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformResolution {
    pub platform: Platform,
    #[serde(flatten)]
    pub state: PlatformState,
}

/// One clause of an explicit guard set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardClause {
    /// Available on `platform` without a lower bound.
    Available {
        platform: Platform,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<Version>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Available on `platform` from `introduced` on.
    Since {
        platform: Platform,
        introduced: Version,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<Version>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Unavailable on `platform`.
    Unavailable { platform: Platform },
}

impl GuardClause {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Available { platform, .. }
            | Self::Since { platform, .. }
            | Self::Unavailable { platform } => *platform,
        }
    }

    fn positive(fact: &PlatformFact) -> Option<Self> {
        let message = fact.message.clone();
        match &fact.availability {
            Availability::Always { deprecated } => Some(Self::Available {
                platform: fact.platform,
                deprecated: deprecated.clone(),
                message,
            }),
            Availability::Since {
                introduced,
                deprecated,
            } => Some(Self::Since {
                platform: fact.platform,
                introduced: introduced.clone(),
                deprecated: deprecated.clone(),
                message,
            }),
            Availability::Never => None,
        }
    }
}

impl std::fmt::Display for GuardClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available {
                platform,
                deprecated,
                message,
            } => {
                write!(f, "{platform}")?;
                write_tail(f, deprecated.as_ref(), message.as_deref())
            }
            Self::Since {
                platform,
                introduced,
                deprecated,
                message,
            } => {
                write!(f, "{platform} {introduced}")?;
                write_tail(f, deprecated.as_ref(), message.as_deref())
            }
            Self::Unavailable { platform } => write!(f, "{platform}, unavailable"),
        }
    }
}

fn write_tail(
    f: &mut std::fmt::Formatter<'_>,
    deprecated: Option<&Version>,
    message: Option<&str>,
) -> std::fmt::Result {
    if let Some(d) = deprecated {
        write!(f, ", deprecated {d}")?;
    }
    if let Some(m) = message {
        write!(f, ", message \"{m}\"")?;
    }
    Ok(())
}

/// The guards a symbol's declaration needs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum GuardSet {
    /// Available everywhere; no guard at all.
    Unconditional,

    /// Available without bounds on `platforms`, unavailable on the rest.
    Compact {
        platforms: Vec<Platform>,
        unavailable: Vec<Platform>,
    },

    /// One clause per fact, then one per unavailable platform.
    Explicit { clauses: Vec<GuardClause> },
}

impl GuardSet {
    pub fn is_unconditional(&self) -> bool {
        matches!(self, Self::Unconditional)
    }
}

/// A symbol after canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSymbol {
    pub raw_name: String,
    pub case_name: CaseName,
    /// One entry per configured platform, in configured order.
    pub platforms: Vec<PlatformResolution>,
    pub guards: GuardSet,
}

impl CanonicalSymbol {
    pub fn canonical_name(&self) -> &str {
        self.case_name.as_str()
    }

    pub fn state(&self, platform: Platform) -> Option<&PlatformState> {
        self.platforms
            .iter()
            .find(|r| r.platform == platform)
            .map(|r| &r.state)
    }

    /// Does the symbol need a branch on `platform` at all?
    pub fn participates(&self, platform: Platform) -> bool {
        self.state(platform).is_some_and(|s| !s.is_unavailable())
    }

    pub fn admits(&self, platform: Platform, probe: &Version) -> bool {
        self.state(platform).is_some_and(|s| s.admits(probe))
    }
}

/// Outcome of the redundancy filter for one fact.
enum Reduced {
    Kept(PlatformFact),
    Elided,
}

fn reduce(fact: &PlatformFact, baseline: Option<&Version>) -> Reduced {
    match &fact.availability {
        Availability::Never => Reduced::Kept(fact.clone()),
        Availability::Always { deprecated: None } => Reduced::Elided,
        Availability::Always { .. } => Reduced::Kept(fact.clone()),
        Availability::Since {
            introduced,
            deprecated,
        } => match baseline {
            Some(floor) if introduced.is_lower_or_equal(floor) => match deprecated {
                Some(d) => Reduced::Kept(PlatformFact {
                    platform: fact.platform,
                    availability: Availability::Always {
                        deprecated: Some(d.clone()),
                    },
                    message: fact.message.clone(),
                }),
                None => Reduced::Elided,
            },
            _ => Reduced::Kept(fact.clone()),
        },
    }
}

/// Lower bounds are moot once another fact already holds from the baseline.
fn drop_lower_bound(fact: PlatformFact) -> Option<PlatformFact> {
    let availability = match fact.availability {
        Availability::Since {
            deprecated: Some(d),
            ..
        } => Availability::Always {
            deprecated: Some(d),
        },
        Availability::Since {
            deprecated: None, ..
        } => return None,
        other => other,
    };
    Some(PlatformFact {
        availability,
        ..fact
    })
}

fn push_unique(facts: &mut Vec<PlatformFact>, fact: PlatformFact) {
    if !facts.contains(&fact) {
        facts.push(fact);
    }
}

/// Canonicalize one symbol against a baseline and the configured platforms.
pub fn canonicalize(
    entry: &SymbolEntry,
    baseline: &Baseline,
    platforms: &[Platform],
) -> Result<CanonicalSymbol, KernelError> {
    let in_scope: Vec<&PlatformFact> = entry
        .facts
        .iter()
        .filter(|fact| {
            let keep = platforms.contains(&fact.platform);
            if !keep {
                tracing::debug!(symbol = %entry.raw_name, %fact, "fact outside configured platforms");
            }
            keep
        })
        .collect();

    for &platform in platforms {
        let mut on_platform = in_scope.iter().filter(|f| f.platform == platform);
        if on_platform.clone().any(|f| f.availability.is_never())
            && on_platform.any(|f| !f.availability.is_never())
        {
            return Err(KernelError::Contradiction {
                symbol: entry.case_name.name.clone(),
                raw_name: entry.raw_name.clone(),
                platform,
            });
        }
    }

    let mut survivors: Vec<PlatformFact> = Vec::new();
    let mut elided: BTreeSet<Platform> = BTreeSet::new();
    for fact in in_scope {
        match reduce(fact, baseline.get(fact.platform)) {
            Reduced::Kept(kept) => push_unique(&mut survivors, kept),
            Reduced::Elided => {
                tracing::debug!(symbol = %entry.raw_name, %fact, "redundant with baseline");
                elided.insert(fact.platform);
            }
        }
    }

    let resolutions: Vec<PlatformResolution> = platforms
        .iter()
        .map(|&platform| {
            let state = platform_state(platform, &survivors, elided.contains(&platform));
            PlatformResolution { platform, state }
        })
        .collect();

    let guards = guard_set(&resolutions);

    Ok(CanonicalSymbol {
        raw_name: entry.raw_name.clone(),
        case_name: entry.case_name.clone(),
        platforms: resolutions,
        guards,
    })
}

fn platform_state(platform: Platform, survivors: &[PlatformFact], covered: bool) -> PlatformState {
    let on_platform = survivors.iter().filter(|f| f.platform == platform).cloned();

    if covered {
        let mut facts = Vec::new();
        for fact in on_platform.filter_map(drop_lower_bound) {
            push_unique(&mut facts, fact);
        }
        return if facts.is_empty() {
            PlatformState::Unrestricted
        } else {
            PlatformState::Restricted { facts }
        };
    }

    let facts: Vec<PlatformFact> = on_platform.collect();
    if facts.is_empty() {
        PlatformState::Unavailable { synthesized: true }
    } else if facts.iter().all(|f| f.availability.is_never()) {
        PlatformState::Unavailable { synthesized: false }
    } else {
        PlatformState::Restricted { facts }
    }
}

fn guard_set(resolutions: &[PlatformResolution]) -> GuardSet {
    if resolutions
        .iter()
        .all(|r| r.state == PlatformState::Unrestricted)
    {
        return GuardSet::Unconditional;
    }

    let compactable = resolutions.iter().all(|r| {
        matches!(
            r.state,
            PlatformState::Unrestricted | PlatformState::Unavailable { synthesized: true }
        )
    });
    let open: Vec<Platform> = resolutions
        .iter()
        .filter(|r| r.state == PlatformState::Unrestricted)
        .map(|r| r.platform)
        .collect();
    let closed: Vec<Platform> = resolutions
        .iter()
        .filter(|r| r.state.is_unavailable())
        .map(|r| r.platform)
        .collect();

    if compactable && !open.is_empty() {
        return GuardSet::Compact {
            platforms: open,
            unavailable: closed,
        };
    }

    let mut clauses: Vec<GuardClause> = resolutions
        .iter()
        .filter_map(|r| match &r.state {
            PlatformState::Restricted { facts } => Some(facts),
            _ => None,
        })
        .flatten()
        .filter_map(GuardClause::positive)
        .collect();
    clauses.extend(
        closed
            .into_iter()
            .map(|platform| GuardClause::Unavailable { platform }),
    );
    GuardSet::Explicit { clauses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ios_only() -> (Baseline, Vec<Platform>) {
        (
            Baseline::new([(Platform::Ios, Version::major(16))]),
            vec![Platform::Ios],
        )
    }

    fn all() -> (Baseline, Vec<Platform>) {
        (Baseline::default(), Platform::ALL.to_vec())
    }

    fn symbol(facts: Vec<PlatformFact>) -> SymbolEntry {
        SymbolEntry::new("kSecAttrThing", CaseName::plain("attributeThing"), facts)
    }

    fn fact(platform: Platform, availability: Availability) -> PlatformFact {
        PlatformFact::new(platform, availability)
    }

    fn since_dep(introduced: u32, deprecated: u32) -> Availability {
        Availability::Since {
            introduced: Version::major(introduced),
            deprecated: Some(Version::major(deprecated)),
        }
    }

    #[test]
    fn redundant_since_is_dropped() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![fact(Platform::Ios, Availability::since(Version::major(15)))]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        assert_eq!(canonical.guards, GuardSet::Unconditional);
        assert_eq!(
            canonical.state(Platform::Ios),
            Some(&PlatformState::Unrestricted)
        );
    }

    #[test]
    fn redundant_since_keeps_deprecation() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![fact(Platform::Ios, since_dep(15, 17))]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        insta::assert_json_snapshot!(canonical.guards, @r###"
        {
          "form": "explicit",
          "clauses": [
            {
              "kind": "available",
              "platform": "iOS",
              "deprecated": "17"
            }
          ]
        }
        "###);
    }

    #[test]
    fn baseline_equality_is_zero_extended() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![fact(
            Platform::Ios,
            Availability::since(Version::new([16, 0, 0])),
        )]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        assert!(canonical.guards.is_unconditional());
    }

    #[test]
    fn every_configured_platform_is_resolved() {
        let (baseline, platforms) = all();
        let inputs = vec![
            vec![],
            vec![fact(Platform::Ios, Availability::since(Version::major(17)))],
            vec![
                fact(Platform::MacOs, Availability::always()),
                PlatformFact::never(Platform::TvOs),
            ],
            vec![fact(Platform::VisionOs, since_dep(1, 2))],
        ];
        for facts in inputs {
            let canonical = canonicalize(&symbol(facts), &baseline, &platforms).unwrap();
            let resolved: Vec<Platform> = canonical.platforms.iter().map(|r| r.platform).collect();
            assert_eq!(resolved, platforms);
        }
    }

    #[test]
    fn symbol_without_facts_is_unavailable_everywhere() {
        let (baseline, platforms) = all();
        let canonical = canonicalize(&symbol(vec![]), &baseline, &platforms).unwrap();
        match &canonical.guards {
            GuardSet::Explicit { clauses } => {
                assert_eq!(clauses.len(), platforms.len());
                assert!(
                    clauses
                        .iter()
                        .all(|c| matches!(c, GuardClause::Unavailable { .. }))
                );
            }
            other => panic!("expected explicit guards, got {other:?}"),
        }
    }

    #[test]
    fn always_subset_collapses_to_compact() {
        let (baseline, platforms) = all();
        let entry = symbol(vec![
            fact(Platform::MacOs, Availability::always()),
            fact(Platform::Ios, Availability::since(Version::major(12))),
        ]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        assert_eq!(
            canonical.guards,
            GuardSet::Compact {
                platforms: vec![Platform::Ios, Platform::MacOs],
                unavailable: vec![Platform::WatchOs, Platform::TvOs, Platform::VisionOs],
            }
        );
    }

    #[test]
    fn explicit_never_prevents_compaction() {
        let (baseline, platforms) = all();
        let entry = symbol(vec![
            fact(Platform::Ios, Availability::always()),
            PlatformFact::never(Platform::WatchOs),
        ]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        match canonical.guards {
            GuardSet::Explicit { clauses } => {
                let unavailable: Vec<Platform> = clauses.iter().map(|c| c.platform()).collect();
                assert_eq!(
                    unavailable,
                    vec![
                        Platform::MacOs,
                        Platform::WatchOs,
                        Platform::TvOs,
                        Platform::VisionOs
                    ]
                );
            }
            other => panic!("expected explicit guards, got {other:?}"),
        }
        assert_eq!(
            canonical_state(&symbol(vec![PlatformFact::never(Platform::WatchOs)]), Platform::WatchOs),
            PlatformState::Unavailable { synthesized: false }
        );
    }

    fn canonical_state(entry: &SymbolEntry, platform: Platform) -> PlatformState {
        let (baseline, platforms) = all();
        canonicalize(entry, &baseline, &platforms)
            .unwrap()
            .state(platform)
            .cloned()
            .unwrap()
    }

    #[test]
    fn positive_clauses_precede_unavailable_ones() {
        let (baseline, platforms) = all();
        let entry = symbol(vec![
            PlatformFact::never(Platform::Ios),
            fact(Platform::TvOs, Availability::since(Version::major(17))).with_message("use x"),
            fact(Platform::MacOs, since_dep(14, 15)),
        ]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        let rendered: Vec<String> = match &canonical.guards {
            GuardSet::Explicit { clauses } => clauses.iter().map(ToString::to_string).collect(),
            other => panic!("expected explicit guards, got {other:?}"),
        };
        assert_eq!(
            rendered,
            vec![
                "macOS 14, deprecated 15",
                "tvOS 17, message \"use x\"",
                "iOS, unavailable",
                "watchOS, unavailable",
                "visionOS, unavailable",
            ]
        );
    }

    #[test]
    fn contradiction_is_reported() {
        let (baseline, platforms) = all();
        let entry = symbol(vec![
            fact(Platform::WatchOs, Availability::since(Version::major(10))),
            PlatformFact::never(Platform::WatchOs),
        ]);
        let err = canonicalize(&entry, &baseline, &platforms).unwrap_err();
        assert_eq!(
            err,
            KernelError::Contradiction {
                symbol: "attributeThing".into(),
                raw_name: "kSecAttrThing".into(),
                platform: Platform::WatchOs,
            }
        );
    }

    #[test]
    fn contradiction_is_checked_before_redundancy() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(9))),
            PlatformFact::never(Platform::Ios),
        ]);
        assert!(canonicalize(&entry, &baseline, &platforms).is_err());
    }

    #[test]
    fn out_of_scope_facts_are_ignored() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(17))),
            PlatformFact::never(Platform::MacOs),
            fact(Platform::MacOs, Availability::since(Version::major(14))),
        ]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        assert_eq!(canonical.platforms.len(), 1);
        assert!(canonical.state(Platform::MacOs).is_none());
    }

    #[test]
    fn duplicate_facts_are_deduplicated() {
        let (baseline, platforms) = ios_only();
        let entry = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(17))),
            fact(Platform::Ios, Availability::since(Version::new([17, 0]))),
            fact(Platform::Ios, Availability::since(Version::major(18))),
        ]);
        let canonical = canonicalize(&entry, &baseline, &platforms).unwrap();
        match canonical.state(Platform::Ios) {
            Some(PlatformState::Restricted { facts }) => assert_eq!(facts.len(), 2),
            other => panic!("expected restricted state, got {other:?}"),
        }
    }

    #[test]
    fn baseline_coverage_dominates_later_bounds() {
        let (baseline, platforms) = ios_only();
        let plain = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(15))),
            fact(Platform::Ios, Availability::since(Version::major(17))),
        ]);
        let canonical = canonicalize(&plain, &baseline, &platforms).unwrap();
        assert!(canonical.guards.is_unconditional());

        let deprecated = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(15))),
            fact(Platform::Ios, since_dep(17, 18)),
        ]);
        let canonical = canonicalize(&deprecated, &baseline, &platforms).unwrap();
        assert_eq!(
            canonical.state(Platform::Ios),
            Some(&PlatformState::Restricted {
                facts: vec![fact(
                    Platform::Ios,
                    Availability::Always {
                        deprecated: Some(Version::major(18))
                    }
                )]
            })
        );
    }

    #[test]
    fn merging_with_empty_entry_is_identity() {
        let (baseline, platforms) = all();
        let original = symbol(vec![
            fact(Platform::Ios, Availability::since(Version::major(17))),
            fact(Platform::MacOs, since_dep(12, 14)),
            PlatformFact::never(Platform::TvOs),
        ]);
        let mut merged = original.clone();
        merged.merge(symbol(vec![])).unwrap();
        assert_eq!(
            canonicalize(&original, &baseline, &platforms).unwrap(),
            canonicalize(&merged, &baseline, &platforms).unwrap()
        );
    }

    #[test]
    fn canonicalization_is_idempotent_over_duplicated_input() {
        let (baseline, platforms) = all();
        let facts = vec![
            fact(Platform::Ios, Availability::since(Version::major(17))),
            fact(Platform::WatchOs, since_dep(8, 10)),
        ];
        let once = symbol(facts.clone());
        let mut twice = symbol(facts.clone());
        twice.merge(symbol(facts)).unwrap();
        assert_eq!(
            canonicalize(&once, &baseline, &platforms).unwrap(),
            canonicalize(&twice, &baseline, &platforms).unwrap()
        );
    }
}
