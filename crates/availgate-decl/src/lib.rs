//! # availgate-decl
//!
//! The declaration boundary for availgate.
//!
//! This crate provides:
//! - `RawDeclaration` / `RawAttribute` (what a header extractor reports)
//! - JSON and JSONL dump reading
//! - `Ingestor`, which turns raw records into a closed `SymbolTable`
//!
//! It does not resolve anything; that is `availgate-kernel`'s job.
//!
//! ```text
//! dump (JSONL or JSON array)
//!     │  read_declarations_from_path
//! Vec<RawDeclaration>
//!     │  Ingestor::ingest (lenient: drops what it cannot parse)
//! SymbolTable ──▶ availgate_kernel::resolve
//! ```

pub mod ingest;
pub mod jsonl;
pub mod raw;

pub use ingest::{Converted, IngestReport, Ingested, Ingestor};
pub use jsonl::{DeclError, read_declaration_array, read_declarations, read_declarations_from_path};
pub use raw::{RawAttribute, RawDeclaration};
