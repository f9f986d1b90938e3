use anyhow::{bail, Context, Result};

/// A configured locale: language tag plus display name.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleConfig {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Locales
    pub default_locale: String,
    pub locales: Vec<LocaleConfig>,

    // Build mode
    pub generate: bool,
    pub debug: bool,

    // Directories
    pub src_dir: String,
    pub routes_dir: String,
    pub locales_dir: String,
    pub cache_path: String,

    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Locales
            default_locale: std::env::var("I18N_DEFAULT_LOCALE")
                .context("I18N_DEFAULT_LOCALE not set")?,
            locales: parse_locales(
                &std::env::var("I18N_LOCALES").context("I18N_LOCALES not set")?,
            )?,

            // Build mode
            generate: std::env::var("I18N_GENERATE")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            debug: std::env::var("I18N_DEBUG")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),

            // Directories
            src_dir: std::env::var("I18N_SRC_DIR").unwrap_or_else(|_| "./src".to_string()),
            routes_dir: std::env::var("I18N_ROUTES_DIR")
                .unwrap_or_else(|_| "./src/routes".to_string()),
            locales_dir: std::env::var("I18N_LOCALES_DIR")
                .unwrap_or_else(|_| "./public/locales".to_string()),
            cache_path: std::env::var("I18N_CACHE_PATH")
                .unwrap_or_else(|_| "./.cache/i18n-routes/store.json".to_string()),

            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
        })
    }
}

/// Parse the `I18N_LOCALES` descriptor list: `code:name` pairs separated by
/// commas, e.g. `en:English,fr:Français`.
fn parse_locales(raw: &str) -> Result<Vec<LocaleConfig>> {
    let mut locales = Vec::new();

    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((code, name)) = entry.split_once(':') else {
            bail!("Invalid locale descriptor '{}': expected code:name", entry);
        };
        let (code, name) = (code.trim(), name.trim());
        if code.is_empty() || name.is_empty() {
            bail!("Invalid locale descriptor '{}': expected code:name", entry);
        }
        locales.push(LocaleConfig {
            code: code.to_string(),
            name: name.to_string(),
        });
    }

    if locales.is_empty() {
        bail!("I18N_LOCALES contained no locale descriptors");
    }

    Ok(locales)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
