//! Declaration dumps: one JSON object per line, or a single JSON array.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use crate::raw::RawDeclaration;

/// Errors from reading declaration dumps.
#[derive(Debug, thiserror::Error)]
pub enum DeclError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("corrupted dump: {0}")]
    Corrupt(String),
}

/// Read declarations from a JSONL reader. Blank and `#` lines are skipped.
pub fn read_declarations(reader: impl BufRead) -> Result<Vec<RawDeclaration>, DeclError> {
    let mut declarations = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DeclError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let declaration: RawDeclaration = serde_json::from_str(trimmed)
            .map_err(|e| DeclError::Parse(line_no + 1, e.to_string()))?;
        declarations.push(declaration);
    }
    Ok(declarations)
}

/// Read declarations from a JSON array document.
pub fn read_declaration_array(text: &str) -> Result<Vec<RawDeclaration>, DeclError> {
    serde_json::from_str(text).map_err(|e| DeclError::Parse(e.line(), e.to_string()))
}

/// Read a dump from disk, accepting either layout.
pub fn read_declarations_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<RawDeclaration>, DeclError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| DeclError::Io(0, format!("{}: {e}", path.display())))?;
    let text = validate_dump_bytes(path, &bytes)?;
    let declarations = if text.trim_start().starts_with('[') {
        read_declaration_array(text)?
    } else {
        read_declarations(text.as_bytes())?
    };
    tracing::debug!(path = %path.display(), count = declarations.len(), "read declarations");
    Ok(declarations)
}

fn validate_dump_bytes<'a>(path: &Path, bytes: &'a [u8]) -> Result<&'a str, DeclError> {
    if bytes.contains(&0) {
        return Err(DeclError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    std::str::from_utf8(bytes).map_err(|_| {
        DeclError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        ))
    })
}
