//! The resolver: a closed symbol table in, a resolved model out.

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::branch::{PlatformDecision, synthesize};
use crate::canonical::{CanonicalSymbol, canonicalize};
use crate::config::{EngineConfig, GapPolicy};
use crate::error::{Inconsistency, KernelError};
use crate::platform::{Baseline, Platform};
use crate::symbol::{SymbolEntry, SymbolTable};

/// Hex SHA-256 of arbitrary content.
pub fn content_digest(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    format!("{hash:x}")
}

/// Everything an emission backend needs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModel {
    pub platforms: Vec<Platform>,
    pub baseline: Baseline,
    /// Consistent symbols, sorted by case name.
    pub symbols: Vec<CanonicalSymbol>,
    pub decisions: Vec<PlatformDecision>,
    /// Symbols left out of the model and why.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inconsistencies: Vec<Inconsistency>,
}

impl ResolvedModel {
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }

    /// Lookup by case name or legacy name.
    pub fn symbol(&self, name: &str) -> Option<&CanonicalSymbol> {
        self.symbols
            .iter()
            .find(|s| s.canonical_name() == name || s.raw_name == name)
    }

    /// Inconsistencies naming `name`, by case name or legacy name.
    pub fn excluded(&self, name: &str) -> Vec<&Inconsistency> {
        self.inconsistencies
            .iter()
            .filter(|i| i.symbol.as_deref() == Some(name) || i.raw_name.as_deref() == Some(name))
            .collect()
    }

    pub fn decision(&self, platform: Platform) -> Option<&PlatformDecision> {
        self.decisions.iter().find(|d| d.platform == platform)
    }

    /// Compact JSON, the form the digest is computed over.
    pub fn to_canonical_json(&self) -> Result<String, KernelError> {
        serde_json::to_string(self).map_err(|e| KernelError::Emission(e.to_string()))
    }

    /// Content digest of the model.
    pub fn digest(&self) -> Result<String, KernelError> {
        Ok(content_digest(self.to_canonical_json()?.as_bytes()))
    }
}

/// Runs canonicalization and branch synthesis under one configuration.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    baseline: &'a Baseline,
    platforms: &'a [Platform],
    gap_policy: GapPolicy,
    parallel: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            baseline: &config.baseline,
            platforms: &config.platforms,
            gap_policy: config.gap_policy,
            parallel: true,
        }
    }

    /// Canonicalize on the current thread only.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn canonicalize_one(&self, entry: &SymbolEntry) -> Result<CanonicalSymbol, KernelError> {
        canonicalize(entry, self.baseline, self.platforms)
    }

    /// Resolve a closed table.
    ///
    /// Per-symbol inconsistencies are collected on the model; only a
    /// rejected gap fails the whole resolution.
    pub fn resolve(&self, table: &SymbolTable) -> Result<ResolvedModel, KernelError> {
        let entries = table.sorted();
        let outcomes: Vec<Result<CanonicalSymbol, KernelError>> = if self.parallel {
            entries.par_iter().map(|e| self.canonicalize_one(e)).collect()
        } else {
            entries.iter().map(|e| self.canonicalize_one(e)).collect()
        };

        let mut symbols = Vec::with_capacity(outcomes.len());
        let mut inconsistencies: Vec<Inconsistency> = table.inconsistencies().to_vec();
        for outcome in outcomes {
            match outcome {
                Ok(symbol) => symbols.push(symbol),
                Err(err) => {
                    tracing::warn!("{err}");
                    match err.to_inconsistency() {
                        Some(record) => inconsistencies.push(record),
                        None => return Err(err),
                    }
                }
            }
        }
        inconsistencies.sort();

        let decisions = synthesize(&symbols, self.baseline, self.platforms, self.gap_policy)?;
        tracing::debug!(
            symbols = symbols.len(),
            decisions = decisions.len(),
            inconsistencies = inconsistencies.len(),
            "resolved"
        );

        Ok(ResolvedModel {
            platforms: self.platforms.to_vec(),
            baseline: self.baseline.clone(),
            symbols,
            decisions,
            inconsistencies,
        })
    }
}

/// Resolve `table` under `config`.
pub fn resolve(table: &SymbolTable, config: &EngineConfig) -> Result<ResolvedModel, KernelError> {
    Resolver::new(config).resolve(table)
}
