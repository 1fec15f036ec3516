//! Hand-off to emission backends.
//!
//! The kernel never produces source text. A backend takes the resolved
//! model and renders whatever artifact it is responsible for.

use crate::error::KernelError;
use crate::resolve::ResolvedModel;

/// A renderer for resolved models.
pub trait EmissionBackend: Send + Sync {
    /// Unique backend identifier.
    fn name(&self) -> &'static str;

    /// File extension of the rendered artifact.
    fn extension(&self) -> &'static str;

    /// Render the model.
    fn emit(&self, model: &ResolvedModel) -> Result<String, KernelError>;
}

/// Renders the model itself as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelBackend;

impl EmissionBackend for JsonModelBackend {
    fn name(&self) -> &'static str {
        "json-model"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn emit(&self, model: &ResolvedModel) -> Result<String, KernelError> {
        let mut rendered = serde_json::to_string_pretty(model)
            .map_err(|e| KernelError::Emission(format!("{}: {e}", self.name())))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

static JSON_MODEL: JsonModelBackend = JsonModelBackend;

/// Backends shipped with the kernel.
pub fn builtin_backends() -> [&'static dyn EmissionBackend; 1] {
    [&JSON_MODEL]
}

/// Lookup a shipped backend by name.
pub fn backend(name: &str) -> Option<&'static dyn EmissionBackend> {
    builtin_backends().into_iter().find(|b| b.name() == name)
}
