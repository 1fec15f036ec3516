//! Branch synthesis: the runtime decision per platform.
//!
//! For every platform some symbol can be used on, the decision is an
//! ordered list of version checks, highest bound first, closed by an
//! `otherwise` branch. Each branch lists the symbols usable when it is the
//! first branch to match. Generated code evaluates the branches top to
//! bottom, so they are mutually exclusive by construction.

use std::collections::BTreeSet;

use crate::availability::Availability;
use crate::canonical::{CanonicalSymbol, PlatformState};
use crate::config::GapPolicy;
use crate::error::KernelError;
use crate::naming::CaseName;
use crate::platform::{Baseline, Platform};
use crate::version::Version;

/// Condition guarding one branch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchGuard {
    /// Runtime version is at least `version`.
    Since { version: Version },
    /// Anything not matched above.
    Otherwise,
}

impl BranchGuard {
    pub fn matches(&self, runtime: &Version) -> bool {
        match self {
            Self::Since { version } => runtime.is_higher_or_equal(version),
            Self::Otherwise => true,
        }
    }
}

impl std::fmt::Display for BranchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Since { version } => write!(f, "since {version}"),
            Self::Otherwise => write!(f, "otherwise"),
        }
    }
}

/// A symbol listed in a branch, with both of its names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSymbol {
    pub case_name: CaseName,
    pub raw_name: String,
}

/// One guarded branch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Branch {
    pub guard: BranchGuard,
    pub symbols: Vec<BranchSymbol>,
}

impl Branch {
    pub fn contains(&self, case_name: &str) -> bool {
        self.symbols.iter().any(|s| s.case_name.as_str() == case_name)
    }
}

/// How a decision ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// The last branch is `otherwise`.
    Covered,
    /// Runtimes below the lowest bound hit an explicit failure marker.
    Trap,
}

/// Outcome of evaluating a decision at one runtime version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Branch { index: usize, branch: &'a Branch },
    Trap,
}

/// The branch list for one platform.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformDecision {
    pub platform: Platform,
    pub baseline: Version,
    pub branches: Vec<Branch>,
    pub fallback: Fallback,
}

impl PlatformDecision {
    /// Evaluate the branches top to bottom; first match wins.
    pub fn resolve(&self, runtime: &Version) -> Resolution<'_> {
        self.branches
            .iter()
            .enumerate()
            .find(|(_, branch)| branch.guard.matches(runtime))
            .map_or(Resolution::Trap, |(index, branch)| Resolution::Branch {
                index,
                branch,
            })
    }

    /// Branches that would be taken at `runtime`, i.e. whose guard holds
    /// while every earlier guard fails. At most one by construction.
    pub fn taken_branches(&self, runtime: &Version) -> Vec<usize> {
        let mut taken = Vec::new();
        let mut earlier_matched = false;
        for (index, branch) in self.branches.iter().enumerate() {
            let matched = branch.guard.matches(runtime);
            if matched && !earlier_matched {
                taken.push(index);
            }
            earlier_matched |= matched;
        }
        taken
    }

    /// Every symbol that appears in some branch.
    pub fn all_symbols(&self) -> BTreeSet<&str> {
        self.branches
            .iter()
            .flat_map(|b| b.symbols.iter().map(|s| s.case_name.as_str()))
            .collect()
    }
}

/// Where a symbol's facts place branch bounds on one platform.
fn bounds(state: &PlatformState, baseline: &Version) -> (BTreeSet<Version>, bool) {
    let mut concrete = BTreeSet::new();
    let mut reaches_baseline = false;
    match state {
        PlatformState::Unrestricted => reaches_baseline = true,
        PlatformState::Restricted { facts } => {
            for fact in facts {
                match &fact.availability {
                    Availability::Since { introduced, .. } if introduced.is_higher_than(baseline) => {
                        concrete.insert(introduced.clone());
                    }
                    Availability::Since { .. } | Availability::Always { .. } => {
                        reaches_baseline = true
                    }
                    Availability::Never => {}
                }
            }
        }
        PlatformState::Unavailable { .. } => {}
    }
    (concrete, reaches_baseline)
}

fn branch_at(
    guard: BranchGuard,
    probe: &Version,
    platform: Platform,
    symbols: &[&CanonicalSymbol],
) -> Branch {
    let members: Vec<BranchSymbol> = symbols
        .iter()
        .filter(|s| s.admits(platform, probe))
        .map(|s| BranchSymbol {
            case_name: s.case_name.clone(),
            raw_name: s.raw_name.clone(),
        })
        .collect();
    tracing::trace!(%platform, %guard, symbols = members.len(), "branch");
    Branch {
        guard,
        symbols: members,
    }
}

/// Build the decision for one platform, or `None` when no symbol can be
/// used there.
pub fn synthesize_platform(
    symbols: &[CanonicalSymbol],
    platform: Platform,
    baseline: &Version,
    policy: GapPolicy,
) -> Result<Option<PlatformDecision>, KernelError> {
    let participants: Vec<&CanonicalSymbol> =
        symbols.iter().filter(|s| s.participates(platform)).collect();
    if participants.is_empty() {
        return Ok(None);
    }

    let mut concrete: BTreeSet<Version> = BTreeSet::new();
    let mut covered = false;
    for symbol in &participants {
        if let Some(state) = symbol.state(platform) {
            let (found, reaches_baseline) = bounds(state, baseline);
            concrete.extend(found);
            covered |= reaches_baseline;
        }
    }

    let mut branches: Vec<Branch> = concrete
        .iter()
        .rev()
        .map(|version| {
            branch_at(
                BranchGuard::Since {
                    version: version.clone(),
                },
                version,
                platform,
                &participants,
            )
        })
        .collect();

    let mut fallback = Fallback::Covered;
    if !covered {
        let lowest = concrete.first().cloned().unwrap_or_else(|| baseline.clone());
        tracing::warn!(
            %platform, %lowest, %baseline, %policy,
            "no symbol is available from the baseline"
        );
        match policy {
            GapPolicy::Empty => {}
            GapPolicy::Trap => fallback = Fallback::Trap,
            GapPolicy::Reject => {
                return Err(KernelError::UncoveredBaseline {
                    platform,
                    lowest,
                    baseline: baseline.clone(),
                });
            }
        }
    }
    if fallback == Fallback::Covered {
        branches.push(branch_at(
            BranchGuard::Otherwise,
            baseline,
            platform,
            &participants,
        ));
    }

    Ok(Some(PlatformDecision {
        platform,
        baseline: baseline.clone(),
        branches,
        fallback,
    }))
}

/// Build decisions for every configured platform, in configured order.
pub fn synthesize(
    symbols: &[CanonicalSymbol],
    baseline: &Baseline,
    platforms: &[Platform],
    policy: GapPolicy,
) -> Result<Vec<PlatformDecision>, KernelError> {
    let mut decisions = Vec::new();
    for &platform in platforms {
        let floor = baseline
            .get(platform)
            .cloned()
            .unwrap_or_else(|| platform.default_baseline());
        if let Some(decision) = synthesize_platform(symbols, platform, &floor, policy)? {
            decisions.push(decision);
        }
    }
    Ok(decisions)
}
