//! Raw declarations to a closed symbol table.
//!
//! This is a leniency boundary: an attribute with an unknown platform
//! token or an unparseable version is dropped (and counted), never
//! reported as an error.

use availgate_kernel::{
    Availability, ConfigError, EngineConfig, NameTransform, Platform, PlatformFact, SymbolEntry,
    SymbolTable, SymbolTableBuilder, Version,
};

use crate::raw::{RawAttribute, RawDeclaration};

/// Counters describing one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub declarations: usize,
    pub skipped_declarations: usize,
    pub facts: usize,
    pub dropped_attributes: usize,
    pub implicit_facts: usize,
}

/// A closed table plus what happened while building it.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub table: SymbolTable,
    pub report: IngestReport,
}

/// One declaration turned into a symbol entry.
#[derive(Debug, Clone)]
pub struct Converted {
    pub entry: SymbolEntry,
    pub dropped_attributes: usize,
    /// The implicit platform fact was added.
    pub implicit: bool,
}

/// Converts raw declarations under one configuration.
#[derive(Debug, Clone)]
pub struct Ingestor {
    names: NameTransform,
    implicit_platform: Option<Platform>,
}

impl Ingestor {
    pub fn new(names: NameTransform, implicit_platform: Option<Platform>) -> Self {
        Self {
            names,
            implicit_platform,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.name_transform()?, config.implicit_platform))
    }

    /// The fact an attribute states, or `None` when it must be dropped.
    pub fn fact(&self, attribute: &RawAttribute) -> Option<PlatformFact> {
        let platform = match attribute.platform.parse::<Platform>() {
            Ok(platform) => platform,
            Err(reason) => {
                tracing::debug!(token = %attribute.platform, "dropping attribute: {reason}");
                return None;
            }
        };

        let availability = if attribute.unavailable {
            Availability::Never
        } else {
            let introduced = parse_version(attribute.introduced.as_deref())?;
            let deprecated = parse_version(attribute.deprecated.as_deref())?;
            match introduced {
                Some(introduced) => Availability::Since {
                    introduced,
                    deprecated,
                },
                None => Availability::Always { deprecated },
            }
        };

        let message = attribute
            .message
            .as_deref()
            .map(|m| self.names.rewrite_message(m));
        Some(PlatformFact {
            platform,
            availability,
            message,
        })
    }

    /// Convert one declaration. Declarations without a name, or whose
    /// name is only the legacy prefix, yield `None`.
    pub fn convert(&self, declaration: &RawDeclaration) -> Option<Converted> {
        let raw_name = declaration.name.trim();
        if raw_name.is_empty() {
            tracing::debug!("skipping declaration without a name");
            return None;
        }

        let case_name = self.names.case_name(raw_name);
        if case_name.as_str().is_empty() {
            tracing::debug!(name = raw_name, "skipping declaration with an empty case name");
            return None;
        }

        let mut facts: Vec<PlatformFact> =
            declaration.attributes.iter().filter_map(|a| self.fact(a)).collect();
        let dropped_attributes = declaration.attributes.len() - facts.len();

        let mut implicit = false;
        if declaration.attributes.is_empty()
            && let Some(platform) = self.implicit_platform
        {
            facts.push(PlatformFact::new(platform, Availability::always()));
            implicit = true;
        }

        Some(Converted {
            entry: SymbolEntry::new(raw_name, case_name, facts),
            dropped_attributes,
            implicit,
        })
    }

    /// Ingest a whole dump.
    pub fn ingest<'a>(
        &self,
        declarations: impl IntoIterator<Item = &'a RawDeclaration>,
    ) -> Ingested {
        let mut report = IngestReport::default();
        let mut builder = SymbolTableBuilder::new();
        for declaration in declarations {
            report.declarations += 1;
            let Some(converted) = self.convert(declaration) else {
                report.skipped_declarations += 1;
                continue;
            };
            report.facts += converted.entry.facts.len();
            report.dropped_attributes += converted.dropped_attributes;
            report.implicit_facts += usize::from(converted.implicit);
            builder.insert(converted.entry);
        }
        tracing::debug!(
            declarations = report.declarations,
            symbols = builder.len(),
            dropped = report.dropped_attributes,
            "ingested declarations"
        );
        Ingested {
            table: builder.close(),
            report,
        }
    }
}

/// Absent or blank text is "no version"; unparseable text drops the
/// attribute (outer `None`).
fn parse_version(text: Option<&str>) -> Option<Option<Version>> {
    match text.map(str::trim) {
        None | Some("") => Some(None),
        Some(text) => match text.parse::<Version>() {
            Ok(version) => Some(Some(version)),
            Err(err) => {
                tracing::debug!("dropping attribute: {err}");
                None
            }
        },
    }
}
