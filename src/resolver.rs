//! Runtime-facing locale resolution: pick a configured locale from an
//! `Accept-Language` header or a URL path.
//!
//! All lookups run against a [`LocaleStore`] passed by reference, typically
//! one loaded from the build's cache file in a later process.

use crate::locale::{Locale, PathValue};
use crate::store::LocaleStore;

/// Parse a weighted `Accept-Language` header into preference-ordered tags.
///
/// Entries keep header order for equal weights. Wildcards, empty tags,
/// zero-weight and unparseable-weight entries are dropped.
fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut languages = Vec::new();

    for part in header.split(',') {
        let mut params = part.trim().split(';');
        let Some(tag) = params.next().map(str::trim) else {
            continue;
        };
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let mut quality = 1.0f32;
        let mut valid = true;
        for param in params {
            if let Some(value) = param.trim().strip_prefix("q=") {
                match value.trim().parse::<f32>() {
                    Ok(q) => quality = q,
                    Err(_) => valid = false,
                }
            }
        }
        if !valid || quality <= 0.0 {
            continue;
        }

        languages.push((tag.to_string(), quality));
    }

    languages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    languages
}

/// Best-match a preference-ordered tag list against the configured codes.
///
/// For each preferred tag, an exact case-insensitive match wins, then a
/// primary-subtag match (`en-US` matches the configured `en`).
fn negotiate<'a>(preferences: &[(String, f32)], codes: &[&'a str]) -> Option<&'a str> {
    for (tag, _) in preferences {
        if let Some(code) = find_code(codes, tag) {
            return Some(code);
        }

        let primary = tag.split('-').next().unwrap_or(tag);
        if let Some(code) = find_code(codes, primary) {
            return Some(code);
        }
    }
    None
}

fn find_code<'a>(codes: &[&'a str], tag: &str) -> Option<&'a str> {
    codes.iter().find(|c| c.eq_ignore_ascii_case(tag)).copied()
}

/// Resolve an `Accept-Language` header to a configured locale code.
///
/// Falls back to the first configured locale when nothing matches. An empty
/// store has no meaningful answer and yields an empty string; stores built
/// from a configuration always contain at least one locale.
pub fn resolve_from_header(store: &LocaleStore, header: &str) -> String {
    let codes = store.codes();
    let Some(default) = codes.first().copied() else {
        return String::new();
    };

    let preferences = parse_accept_language(header);
    negotiate(&preferences, &codes).unwrap_or(default).to_string()
}

/// Resolve a URL path to a configured locale code, if its first non-empty
/// segment is exactly one. No fallback: the caller decides what a `None`
/// means.
pub fn resolve_from_url<'a>(store: &'a LocaleStore, url_path: &str) -> Option<&'a str> {
    let first_segment = url_path.split('/').find(|s| !s.is_empty())?;
    store.get(first_segment).map(|l| l.code.as_str())
}

/// Like [`resolve_from_url`], but returns the full locale record.
pub fn locale_from_url<'a>(store: &'a LocaleStore, url_path: &str) -> Option<&'a Locale> {
    let first_segment = url_path.split('/').find(|s| !s.is_empty())?;
    store.get(first_segment)
}

/// List the page paths known for a locale: its root pattern followed by one
/// entry per top-level path-dictionary value.
///
/// Only top-level entries are rendered; nested path structures are not
/// expanded (a nested scope contributes its directory-index translation
/// when it has one and is skipped otherwise). Returns `None` for unknown
/// locale codes.
pub fn pages_for_locale(store: &LocaleStore, code: &str) -> Option<Vec<String>> {
    let locale = store.get(code)?;

    let mut pages = vec![format!("/{}/", locale.code)];
    for value in locale.paths.values() {
        let page = match value {
            PathValue::Leaf(translated) => translated.as_str(),
            node @ PathValue::Node(_) => match node.index() {
                Some(index) => index,
                None => continue,
            },
        };
        pages.push(format!("/{}/{}/", locale.code, page));
    }

    Some(pages)
}
