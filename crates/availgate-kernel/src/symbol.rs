//! Symbols and the table that merges their declarations.
//!
//! A symbol may be declared several times (one header per platform, or a
//! re-declaration with different attributes). The builder concatenates the
//! facts of equal legacy names; closing it yields a read-only table that
//! can be iterated in canonical-name order.

use std::collections::{BTreeMap, BTreeSet};

use crate::availability::PlatformFact;
use crate::error::{Inconsistency, KernelError};
use crate::naming::CaseName;

/// One named constant and everything declared about it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    pub raw_name: String,
    pub case_name: CaseName,
    #[serde(default)]
    pub facts: Vec<PlatformFact>,
}

impl SymbolEntry {
    pub fn new(raw_name: impl Into<String>, case_name: CaseName, facts: Vec<PlatformFact>) -> Self {
        Self {
            raw_name: raw_name.into(),
            case_name,
            facts,
        }
    }

    /// The key the table is indexed by.
    pub fn canonical_name(&self) -> &str {
        self.case_name.as_str()
    }

    /// Fold another declaration of the same constant into this one.
    ///
    /// Facts are concatenated in arrival order. A different legacy name
    /// under the same case name is a collision.
    pub fn merge(&mut self, other: SymbolEntry) -> Result<(), KernelError> {
        if other.raw_name != self.raw_name {
            return Err(KernelError::NameCollision {
                case_name: self.canonical_name().to_string(),
                existing: self.raw_name.clone(),
                incoming: other.raw_name,
            });
        }
        self.facts.extend(other.facts);
        Ok(())
    }
}

/// Accumulates entries in discovery order.
#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
    entries: Vec<SymbolEntry>,
    index: BTreeMap<String, usize>,
    collided: BTreeSet<String>,
    collisions: Vec<Inconsistency>,
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, merging it into an earlier one with the same case name.
    pub fn insert(&mut self, entry: SymbolEntry) {
        let key = entry.canonical_name().to_string();
        match self.index.get(&key) {
            Some(&slot) => {
                if let Err(err) = self.entries[slot].merge(entry) {
                    tracing::warn!(case = %key, "{err}");
                    self.collided.insert(key);
                    if let Some(record) = err.to_inconsistency() {
                        self.collisions.push(record);
                    }
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the table. Colliding case names are withheld from it.
    pub fn close(self) -> SymbolTable {
        let collided = self.collided;
        let entries = self
            .entries
            .into_iter()
            .filter(|entry| !collided.contains(entry.canonical_name()))
            .collect();
        SymbolTable {
            entries,
            inconsistencies: self.collisions,
        }
    }
}

impl Extend<SymbolEntry> for SymbolTableBuilder {
    fn extend<T: IntoIterator<Item = SymbolEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<SymbolEntry> for SymbolTableBuilder {
    fn from_iter<T: IntoIterator<Item = SymbolEntry>>(iter: T) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

/// A closed, merged symbol table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    inconsistencies: Vec<Inconsistency>,
}

impl SymbolTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup one entry by case name.
    pub fn get(&self, canonical_name: &str) -> Option<&SymbolEntry> {
        self.entries
            .iter()
            .find(|entry| entry.canonical_name() == canonical_name)
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    /// Entries sorted by case name.
    pub fn sorted(&self) -> Vec<&SymbolEntry> {
        let mut sorted: Vec<&SymbolEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.canonical_name().cmp(b.canonical_name()));
        sorted
    }

    /// Collisions found while building.
    pub fn inconsistencies(&self) -> &[Inconsistency] {
        &self.inconsistencies
    }
}
