//! Type identifiers and prefix shorthand resolution.
//!
//! Types are named by canonical, URI-shaped identifiers such as
//! `tag:codesimply.com,2008:rx/core/str`. Specifications usually spell them in
//! shorthand: `//str` for core types, or `/prefix/name` for a registered
//! prefix. [`resolve`] expands shorthand against a [`PrefixTable`].

use std::fmt::{self, Display};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::ResolutionError;

/// Canonical base of the built-in core types.
pub const CORE_BASE: &str = "tag:codesimply.com,2008:rx/core/";

/// Canonical base of the schema-language meta types.
pub const META_BASE: &str = "tag:codesimply.com,2008:rx/meta/";

fn shorthand_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^/([-._a-z0-9]*)/([-._a-z0-9]+)$").expect("shorthand pattern is valid")
    })
}

/// A canonical type identifier.
///
/// Identifiers are only constructed through [`resolve`] or
/// [`TypeIdentifier::parse`], so every value is known to be canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentifier(String);

impl TypeIdentifier {
    /// Validates `name` as a canonical identifier.
    ///
    /// Shorthand names are rejected; use [`resolve`] for those.
    pub fn parse(name: &str) -> Result<Self, ResolutionError> {
        if name.starts_with('/') {
            return Err(ResolutionError::Malformed {
                name: name.to_string(),
                reason: "shorthand is not a canonical identifier",
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ResolutionError::Malformed {
                name: name.to_string(),
                reason: "identifiers may not contain whitespace",
            });
        }
        match name.split_once(':') {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {
                Ok(Self(name.to_string()))
            }
            _ => Err(ResolutionError::Malformed {
                name: name.to_string(),
                reason: "expected a URI-shaped identifier with a scheme",
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier of the core type with the given local name.
    pub fn core(local: &str) -> Self {
        Self(format!("{}{}", CORE_BASE, local))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier lives under the core base.
    pub fn is_core(&self) -> bool {
        self.0.starts_with(CORE_BASE)
    }
}

impl Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TypeIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mapping from short prefix names to canonical identifier bases.
///
/// The table always contains the reserved core prefix (the empty name) and
/// `.meta`. Entries are never overridden: [`PrefixTable::insert`] refuses a
/// name that is already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    entries: IndexMap<String, String>,
}

impl PrefixTable {
    /// Creates a table holding only the default prefixes.
    pub fn new() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(String::new(), CORE_BASE.to_string());
        entries.insert(".meta".to_string(), META_BASE.to_string());
        Self { entries }
    }

    /// Adds a prefix. Returns false, leaving the table unchanged, if the
    /// name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, base: impl Into<String>) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, base.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, base)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Expands a type name to its canonical identifier.
///
/// `name` is either shorthand (`//local` or `/prefix/local`) or already
/// canonical. This is a pure function of its inputs; whether the identifier
/// is registered is checked later by the compiler.
///
/// # Example
///
/// ```rust
/// use rxschema::{resolve, PrefixTable};
///
/// let mut prefixes = PrefixTable::new();
/// prefixes.insert("example", "tag:example.com,EXAMPLE:rx/");
///
/// let id = resolve("/example/foo", &prefixes).unwrap();
/// assert_eq!(id.as_str(), "tag:example.com,EXAMPLE:rx/foo");
///
/// let core = resolve("//str", &prefixes).unwrap();
/// assert_eq!(core.as_str(), "tag:codesimply.com,2008:rx/core/str");
/// ```
pub fn resolve(name: &str, prefixes: &PrefixTable) -> Result<TypeIdentifier, ResolutionError> {
    if !name.starts_with('/') {
        return TypeIdentifier::parse(name);
    }

    let captures = shorthand_pattern()
        .captures(name)
        .ok_or_else(|| ResolutionError::Malformed {
            name: name.to_string(),
            reason: "expected '/prefix/name' or '//name'",
        })?;

    let prefix = &captures[1];
    let local = &captures[2];

    let base = prefixes
        .get(prefix)
        .ok_or_else(|| ResolutionError::UnknownPrefix {
            prefix: prefix.to_string(),
            name: name.to_string(),
        })?;

    Ok(TypeIdentifier(format!("{}{}", base, local)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrefixTable {
        let mut prefixes = PrefixTable::new();
        assert!(prefixes.insert("example", "tag:example.com,EXAMPLE:rx/"));
        prefixes
    }

    #[test]
    fn test_core_shorthand() {
        let id = resolve("//rec", &table()).unwrap();
        assert_eq!(id, TypeIdentifier::core("rec"));
        assert!(id.is_core());
    }

    #[test]
    fn test_registered_prefix() {
        let id = resolve("/example/foo", &table()).unwrap();
        assert_eq!(id.as_str(), "tag:example.com,EXAMPLE:rx/foo");
        assert!(!id.is_core());
    }

    #[test]
    fn test_meta_prefix() {
        let id = resolve("/.meta/schema", &table()).unwrap();
        assert_eq!(id.as_str(), "tag:codesimply.com,2008:rx/meta/schema");
    }

    #[test]
    fn test_canonical_passthrough() {
        let id = resolve("tag:example.com,EXAMPLE:rx/foo", &table()).unwrap();
        assert_eq!(id.as_str(), "tag:example.com,EXAMPLE:rx/foo");
    }

    #[test]
    fn test_unknown_prefix() {
        let err = resolve("/missing/foo", &table()).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnknownPrefix {
                prefix: "missing".to_string(),
                name: "/missing/foo".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_shorthand() {
        for name in ["/example", "/example/", "///str", "/Example/foo", "//st r"] {
            let err = resolve(name, &table()).unwrap_err();
            assert!(
                matches!(err, ResolutionError::Malformed { .. }),
                "{} should be malformed",
                name
            );
        }
    }

    #[test]
    fn test_malformed_canonical() {
        for name in ["str", "", ":str", "tag:", "tag:with space"] {
            assert!(resolve(name, &table()).is_err(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_prefix_not_overridden() {
        let mut prefixes = table();
        assert!(!prefixes.insert("example", "tag:other.org,2020:"));
        assert_eq!(prefixes.get("example"), Some("tag:example.com,EXAMPLE:rx/"));
        assert!(!prefixes.insert("", "tag:hijack:"));
        assert_eq!(prefixes.get(""), Some(CORE_BASE));
    }

    #[test]
    fn test_parse_rejects_shorthand() {
        assert!(TypeIdentifier::parse("//str").is_err());
    }
}
