//! Legacy constant names to enumeration case names.
//!
//! `kSecAttrAccessible` becomes `attributeAccessible`: the legacy prefix is
//! stripped, abbreviated words are expanded, the first character is
//! lowercased, and reserved words are escaped. The same prefix is used to
//! rewrite legacy names quoted in deprecation messages.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::KernelError;

/// Abbreviations expanded during modernization, as `(short, full)`.
///
/// An occurrence already followed by the rest of the full word is left
/// alone, so `Attribute` never becomes `Attributeibute`.
const EXPANSIONS: [(&str, &str); 2] = [("Attr", "Attribute"), ("Ref", "Reference")];

/// A case name, possibly escaped because it collides with a reserved word.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CaseName {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escaped: bool,
}

impl CaseName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            escaped: false,
        }
    }

    /// The bare identifier, used as the canonical key.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The identifier as it must appear in generated source.
    pub fn rendered(&self) -> String {
        if self.escaped {
            format!("`{}`", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl std::fmt::Display for CaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rendered())
    }
}

/// Derives case names and rewrites messages for one legacy prefix.
#[derive(Debug, Clone)]
pub struct NameTransform {
    legacy_prefix: String,
    reserved: BTreeSet<String>,
    legacy_token: Regex,
}

impl NameTransform {
    pub fn new<I, S>(legacy_prefix: impl Into<String>, reserved: I) -> Result<Self, KernelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let legacy_prefix = legacy_prefix.into();
        let pattern = format!(r"{}\w+", regex::escape(&legacy_prefix));
        let legacy_token = Regex::new(&pattern).map_err(|source| KernelError::InvalidPattern {
            pattern: pattern.clone(),
            reason: source.to_string(),
        })?;
        Ok(Self {
            legacy_prefix,
            reserved: reserved.into_iter().map(Into::into).collect(),
            legacy_token,
        })
    }

    pub fn legacy_prefix(&self) -> &str {
        &self.legacy_prefix
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }

    /// Modernized identifier without reserved-word escaping.
    pub fn modernize(&self, raw: &str) -> String {
        let mut name = raw
            .strip_prefix(self.legacy_prefix.as_str())
            .unwrap_or(raw)
            .to_string();
        for (short, full) in EXPANSIONS {
            name = expand_abbreviation(&name, short, full);
        }
        lowercase_first(&name)
    }

    /// The case name for a legacy constant.
    pub fn case_name(&self, raw: &str) -> CaseName {
        let name = self.modernize(raw);
        let escaped = self.is_reserved(&name);
        CaseName { name, escaped }
    }

    /// Replace every legacy token in `message` with its case name.
    ///
    /// The replacement is the bare name; messages are prose, so reserved
    /// words stay unescaped.
    pub fn rewrite_message(&self, message: &str) -> String {
        self.legacy_token
            .replace_all(message, |caps: &regex::Captures<'_>| self.modernize(&caps[0]))
            .into_owned()
    }
}

fn expand_abbreviation(input: &str, short: &str, full: &str) -> String {
    let completion = &full[short.len()..];
    let mut out = String::with_capacity(input.len() + completion.len());
    let mut rest = input;
    while let Some(at) = rest.find(short) {
        out.push_str(&rest[..at]);
        let after = &rest[at + short.len()..];
        if after.starts_with(completion) {
            out.push_str(short);
        } else {
            out.push_str(full);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keywords of the default target language.
pub const DEFAULT_RESERVED_WORDS: &[&str] = &[
    "associatedtype",
    "class",
    "deinit",
    "enum",
    "extension",
    "fileprivate",
    "func",
    "import",
    "init",
    "inout",
    "internal",
    "let",
    "open",
    "operator",
    "private",
    "protocol",
    "public",
    "rethrows",
    "static",
    "struct",
    "subscript",
    "typealias",
    "var",
    "break",
    "case",
    "continue",
    "default",
    "defer",
    "do",
    "else",
    "fallthrough",
    "for",
    "guard",
    "if",
    "in",
    "repeat",
    "return",
    "switch",
    "where",
    "while",
    "as",
    "catch",
    "false",
    "is",
    "nil",
    "self",
    "Self",
    "super",
    "throw",
    "throws",
    "true",
    "try",
];
