//! Locale data model and the path-translation algorithm.
//!
//! A [`Locale`] bundles everything the build knows about one language: its
//! code, display name, and two dictionaries mapping canonical tokens to
//! localized values. Path dictionaries nest: a value is either a plain
//! translated segment or a deeper scope whose `index` child translates the
//! segment when it is used as a directory-index page.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Nested path dictionary: canonical segment -> translated value.
pub type PathMap = BTreeMap<String, PathValue>;

/// A value in a path dictionary.
///
/// Serialized untagged, so the JSON shape is exactly what the translation
/// service produces and the per-locale files store: a string for a leaf
/// segment, an object for a nested scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathValue {
    /// Plain translated segment.
    Leaf(String),
    /// Nested scope; may contain an `index` child translating the segment
    /// itself when it acts as a directory-index page.
    Node(PathMap),
}

impl PathValue {
    /// The directory-index translation of a nested scope, when usable.
    ///
    /// Returns `Some` only for a `Node` whose `index` child is a leaf.
    pub fn index(&self) -> Option<&str> {
        match self {
            PathValue::Leaf(_) => None,
            PathValue::Node(children) => match children.get("index") {
                Some(PathValue::Leaf(value)) => Some(value),
                _ => None,
            },
        }
    }
}

/// Per-language dictionary bundle, the unit of persistence.
///
/// One record exists per configured locale. The default locale's
/// dictionaries are identity mappings (key equals value) and are never sent
/// through the translation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    /// Language tag (e.g. "en", "fr"). Unique within a store.
    pub code: String,
    /// Display name (e.g. "English", "Français").
    pub name: String,
    /// Canonical path segment -> localized segment or nested scope.
    pub paths: PathMap,
    /// Canonical free text -> localized text.
    pub texts: BTreeMap<String, String>,
}

impl Locale {
    /// Build an identity record: every token maps to itself.
    ///
    /// Used for the default locale and as the fallback when translation
    /// fails for any other locale.
    pub fn identity(
        code: &str,
        name: &str,
        paths: &BTreeSet<String>,
        texts: &BTreeSet<String>,
    ) -> Locale {
        Locale {
            code: code.to_string(),
            name: name.to_string(),
            paths: paths
                .iter()
                .map(|p| (p.clone(), PathValue::Leaf(p.clone())))
                .collect(),
            texts: texts.iter().map(|t| (t.clone(), t.clone())).collect(),
        }
    }

    /// Look up a localized text, falling back to the canonical text when no
    /// translation exists.
    pub fn text<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.texts.get(canonical).map(String::as_str).unwrap_or(canonical)
    }
}

/// Translate a slash-separated canonical path against a path dictionary.
///
/// Works segment by segment, left to right. Each segment resolves through
/// the current dictionary scope; nested segments resolve through the scope
/// found under their parent segment (or an empty scope when the parent has
/// no nested entry). A segment with no usable translation passes through
/// verbatim, so a dictionary that knows nothing about `path` returns it
/// unchanged.
///
/// Pure and deterministic: the same `(path, dict)` pair always yields the
/// same result.
pub fn translate_path(path: &str, dict: &PathMap) -> String {
    match path.split_once('/') {
        Some((head, rest)) => {
            let translated_head = translate_path(head, dict);
            let translated_rest = match dict.get(head) {
                Some(PathValue::Node(scope)) => translate_path(rest, scope),
                // A leaf or missing entry opens no nested scope, so the
                // remainder resolves against an empty one.
                _ => translate_path(rest, &PathMap::new()),
            };
            format!("{}/{}", translated_head, translated_rest)
        }
        None => match dict.get(path) {
            Some(PathValue::Leaf(value)) => value.clone(),
            Some(node @ PathValue::Node(_)) => {
                node.index().unwrap_or(path).to_string()
            }
            None => path.to_string(),
        },
    }
}
