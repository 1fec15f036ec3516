//! # availgate kernel
//!
//! Availability resolution for enumerations of platform constants: which
//! guards a symbol's declaration needs, and which symbols a runtime check
//! must offer on each platform and OS version.
//!
//! This crate is **input-agnostic**: it does not parse headers or print
//! source. It only decides how declared availability merges, what is
//! redundant against the deployment baseline, and how runtime checks are
//! ordered.
//!
//! ## Architecture
//!
//! ```text
//! Version / Platform / Baseline   ← ordered values, configured floors
//!     │
//! Availability / PlatformFact     ← Always | Since | Never per platform
//!     │
//! SymbolTable                     ← merged declarations, keyed by case name
//!     │
//! canonicalize                    ← redundancy, completion, GuardSet
//!     │
//! synthesize                      ← PlatformDecision: ordered branches
//!     │
//! ResolvedModel ──▶ EmissionBackend
//! ```

pub mod availability;
pub mod branch;
pub mod canonical;
pub mod config;
pub mod emit;
pub mod error;
pub mod naming;
pub mod platform;
pub mod resolve;
pub mod symbol;
pub mod version;

pub use availability::{Availability, PlatformFact};
pub use branch::{
    Branch, BranchGuard, BranchSymbol, Fallback, PlatformDecision, Resolution, synthesize,
    synthesize_platform,
};
pub use canonical::{
    CanonicalSymbol, GuardClause, GuardSet, PlatformResolution, PlatformState, canonicalize,
};
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, EngineConfig, GapPolicy, NamingConfig};
pub use emit::{EmissionBackend, JsonModelBackend, backend, builtin_backends};
pub use error::{Inconsistency, InconsistencyClass, KernelError};
pub use naming::{CaseName, NameTransform};
pub use platform::{Baseline, Platform};
pub use resolve::{ResolvedModel, Resolver, content_digest, resolve};
pub use symbol::{SymbolEntry, SymbolTable, SymbolTableBuilder};
pub use version::{Version, VersionParseError};
