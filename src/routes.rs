//! Route generation: map discovered route files to one router pattern per
//! locale, using each locale's path dictionary.
//!
//! Route files come in two flavors. A file outside the `[locale]`
//! placeholder directory is locale-invariant and registers a single
//! pattern. A file under the placeholder registers one pattern per known
//! locale, with its canonical path template run through the path
//! translator.
//!
//! Registration is a non-idempotent mutation on the host router: calling
//! [`generate_routes`] twice in one process double-registers every route.
//! Callers must invoke it exactly once per build, after the locale store is
//! fully populated.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::extract::list_files;
use crate::locale::translate_path;
use crate::store::LocaleStore;

/// Directory segment marking a route file as locale-parameterized.
pub const LOCALE_PLACEHOLDER: &str = "[locale]";

/// How a route file is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Served at one fixed pattern.
    LocaleInvariant,
    /// Served at one pattern per locale.
    LocaleParameterized,
}

/// A discovered route file and its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFile {
    /// Path relative to the routes directory, slash-separated.
    pub relative_path: String,
    pub kind: RouteKind,
}

/// A generated `(pattern, entry point)` pair, as handed to the router.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub pattern: String,
    pub entry_point: String,
}

/// Seam to the site generator's router.
///
/// Each call is an external, non-idempotent registration.
pub trait RouteRegistrar {
    fn register(&mut self, pattern: &str, entry_point: &str);
}

/// Enumerate and classify the route files under `routes_dir`.
pub fn discover_route_files(routes_dir: &Path) -> Result<Vec<RouteFile>> {
    Ok(list_files(routes_dir)?
        .into_iter()
        .map(|relative_path| {
            let kind = if relative_path.contains(LOCALE_PLACEHOLDER) {
                RouteKind::LocaleParameterized
            } else {
                RouteKind::LocaleInvariant
            };
            RouteFile {
                relative_path,
                kind,
            }
        })
        .collect())
}

/// Strip the final extension from a relative route path, leaving any
/// earlier dots in place ("feed.xml.ts" -> "feed.xml").
fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(idx) if idx > path.rfind('/').map_or(0, |s| s + 1) => &path[..idx],
        _ => path,
    }
}

/// Collapse the directory-index convention: a trailing `/index` (or a bare
/// `index`) collapses to its parent path.
fn strip_index(path: &str) -> &str {
    if let Some(parent) = path.strip_suffix("/index") {
        parent
    } else if path == "index" {
        ""
    } else {
        path
    }
}

/// Clean a route file path into its canonical route template.
fn clean_route_path(relative_path: &str) -> String {
    strip_index(strip_extension(relative_path)).to_string()
}

/// Generate and register every route for the discovered files.
///
/// Locale-invariant files register their cleaned path as-is.
/// Locale-parameterized files register `/{code}/{translated}` per locale in
/// store order, with a trailing slash unless the translated path is empty
/// or file-like (contains a `.`).
///
/// Returns the full list of generated entries, in registration order.
pub fn generate_routes(
    route_files: &[RouteFile],
    store: &LocaleStore,
    routes_dir: &str,
    registrar: &mut dyn RouteRegistrar,
) -> Vec<RouteEntry> {
    let routes_dir = routes_dir.trim_end_matches('/');
    let mut entries = Vec::new();

    for file in route_files
        .iter()
        .filter(|f| f.kind == RouteKind::LocaleInvariant)
    {
        let pattern = clean_route_path(&file.relative_path);
        let entry_point = format!("{}/{}", routes_dir, file.relative_path);

        registrar.register(&pattern, &entry_point);
        debug!("Route injected: '{}' -> {}", pattern, entry_point);
        entries.push(RouteEntry {
            pattern,
            entry_point,
        });
    }

    for file in route_files
        .iter()
        .filter(|f| f.kind == RouteKind::LocaleParameterized)
    {
        let template = clean_route_path(
            &file
                .relative_path
                .replacen(&format!("{}/", LOCALE_PLACEHOLDER), "", 1),
        );
        let entry_point = format!("{}/{}", routes_dir, file.relative_path);

        for locale in store.locales() {
            let translated = translate_path(&template, &locale.paths);

            let mut pattern = format!("/{}/", locale.code);
            if !translated.is_empty() {
                pattern.push_str(&translated);
                if !translated.contains('.') {
                    pattern.push('/');
                }
            }

            registrar.register(&pattern, &entry_point);
            debug!("Route injected: '{}' -> {}", pattern, entry_point);
            entries.push(RouteEntry {
                pattern,
                entry_point: entry_point.clone(),
            });
        }
    }

    entries
}
