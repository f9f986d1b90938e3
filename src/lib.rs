//! Build-time internationalization for static site generators.
//!
//! The crate scans a source tree for translation tokens, machine-translates
//! them into per-locale dictionaries, persists those dictionaries, and maps
//! every localized page to a router pattern. A small set of runtime
//! utilities resolves locales from URLs and `Accept-Language` headers
//! against the persisted dictionaries.

pub mod config;
pub mod extract;
pub mod locale;
pub mod resolver;
pub mod routes;
pub mod store;
pub mod translate;
