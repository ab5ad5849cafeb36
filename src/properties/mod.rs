//! Custom test-case properties.
//!
//! Two halves live here:
//! - parsing/validating raw `key=value[,key=value...]` CLI input into a
//!   [`PropertySpec`]
//! - deriving `"name:value"` tags from a model's file path via
//!   [`derive_properties`]
//!
//! Spec parsing is strict (malformed input aborts before any file is read);
//! derivation is lenient (a bad rule skips that one attribute and the rest
//! of the report proceeds).

use crate::error::{DbtJunitError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};
use tracing::warn;

/// Matches a positional path-segment rule such as `path_levels[2]`.
static PATH_LEVEL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^path_levels\[(\d+)]").expect("valid regex"));

/// A validated mapping from attribute name to extraction rule.
///
/// Rules are either a `path_levels[i]` positional reference or a literal
/// value. Insertion order is preserved; keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySpec {
    pairs: Vec<(String, String)>,
}

impl PropertySpec {
    /// Iterate over `(name, rule)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(existing, _)| existing == key)
    }

    /// Build a spec from already-validated pairs. Test-support constructor.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

/// Parse raw `--custom-properties` values into a [`PropertySpec`].
///
/// Each raw string may be a comma-joined group of `key=value` pairs; keys
/// and values are trimmed. Returns `Ok(None)` when no input was given at
/// all, which is distinct from an empty spec.
///
/// # Errors
///
/// Returns [`DbtJunitError::MalformedPropertySpec`] naming the offending
/// item when a pair lacks `=`, a key or value is empty after trimming, or a
/// key repeats anywhere across the whole input set.
pub fn parse_property_specs(raw: &[String]) -> Result<Option<PropertySpec>> {
    if raw.is_empty() {
        return Ok(None);
    }

    let mut spec = PropertySpec::default();
    for group in raw {
        for item in group.split(',') {
            let item = item.trim();
            let Some((key, value)) = item.split_once('=') else {
                return Err(DbtJunitError::MalformedPropertySpec {
                    item: item.to_string(),
                    reason: "properties must be in the format key=value".to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(DbtJunitError::MalformedPropertySpec {
                    item: item.to_string(),
                    reason: "both key and value must be non-empty".to_string(),
                });
            }
            if spec.contains_key(key) {
                return Err(DbtJunitError::MalformedPropertySpec {
                    item: item.to_string(),
                    reason: format!("duplicate key '{key}': each key must be unique"),
                });
            }
            spec.pairs.push((key.to_string(), value.to_string()));
        }
    }
    Ok(Some(spec))
}

/// Derived classification tags for one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedProperties {
    /// `"name:value"` tags, in spec order.
    pub attribute: Vec<String>,
}

impl DerivedProperties {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attribute.is_empty()
    }
}

/// Derive `"name:value"` tags from a model path and a [`PropertySpec`].
///
/// A `path_levels[i]` rule binds the attribute to path segment `i`; any
/// other rule binds its literal text. An out-of-range index (or any other
/// per-attribute failure) skips that attribute with a warning and continues
/// with the rest. Pure: same inputs always yield the same output.
#[must_use]
pub fn derive_properties(path: &str, spec: &PropertySpec) -> DerivedProperties {
    let segments: Vec<&str> = Path::new(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    let mut derived = DerivedProperties::default();
    for (key, rule) in spec.iter() {
        let tag = if let Some(captures) = PATH_LEVEL_RULE.captures(rule) {
            let Ok(index) = captures[1].parse::<usize>() else {
                warn!(key, rule, "path segment index does not fit, skipping attribute");
                continue;
            };
            let Some(segment) = segments.get(index) else {
                warn!(key, rule, path, "path segment index out of range, skipping attribute");
                continue;
            };
            format!("{key}:{segment}")
        } else {
            format!("{key}:{rule}")
        };
        derived.attribute.push(tag);
    }
    derived
}
