//! Token extraction: scan a source tree for translatable path segments and
//! free-text strings.
//!
//! Extraction is purely textual: two regexes match `i18n.path(...)` and
//! `i18n.text(...)` marker calls in raw file contents, without parsing the
//! host language. The patterns can over-match inside comments or unrelated
//! strings and under-match computed arguments; this is an accepted
//! heuristic, kept for compatibility with how source trees are scanned.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

// Regex patterns for marker extraction (cached for performance)
static PATH_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static TEXT_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

/// The two deduplicated token sets discovered in one scan.
///
/// Ordered sets so repeated scans of the same tree are byte-identical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    /// Canonical path segments needing per-locale translation.
    pub paths: BTreeSet<String>,
    /// Canonical free-text strings needing per-locale translation.
    pub texts: BTreeSet<String>,
}

/// Directory detection used while walking a source tree.
///
/// An entry is treated as a directory iff its name carries no file
/// extension. This mirrors how route trees are laid out on disk; isolated
/// here so it can be swapped for real metadata later.
fn is_directory_entry(name: &str) -> bool {
    Path::new(name).extension().is_none()
}

/// Recursively list relative file paths under `dir`, slash-separated.
///
/// Nested results are prefixed with their parent directory name, matching
/// the shape route patterns are later built from.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if is_directory_entry(&name) {
            let nested = list_files(&dir.join(&name))?;
            files.extend(nested.into_iter().map(|f| format!("{}/{}", name, f)));
        } else {
            files.push(name);
        }
    }

    files.sort();
    Ok(files)
}

/// Scan every file under `root` and collect path and text tokens.
///
/// Files with zero matches are fine; duplicates collapse via set semantics.
/// Binary content is read lossily rather than failing the scan.
pub fn extract_tokens(root: &Path) -> Result<TokenSet> {
    let path_regex = PATH_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#"i18n\.path\(\s*["']([^"']+)["']\)"#).unwrap()
    });
    let text_regex = TEXT_TOKEN_REGEX.get_or_init(|| {
        Regex::new(r#"i18n\.text\(\s*["']([^"']+?)["']"#).unwrap()
    });

    let mut tokens = TokenSet::default();

    for file in list_files(root)? {
        let full_path = root.join(&file);
        let raw = fs::read(&full_path)
            .with_context(|| format!("Failed to read {}", full_path.display()))?;
        let contents = String::from_utf8_lossy(&raw);

        for capture in path_regex.captures_iter(&contents) {
            // The captured literal is delimiter-wrapped ("/dashboard/");
            // strip the first and last characters.
            let literal = &capture[1];
            let mut chars = literal.chars();
            chars.next();
            chars.next_back();
            let token = chars.as_str();
            if !token.is_empty() {
                tokens.paths.insert(token.to_string());
            }
        }

        for capture in text_regex.captures_iter(&contents) {
            let token = &capture[1];
            if !token.is_empty() {
                tokens.texts.insert(token.to_string());
            }
        }
    }

    Ok(tokens)
}
