use std::path::Path;

use anyhow::Result;
use tracing::info;

use i18n_routes::config::Config;
use i18n_routes::routes::{self, RouteRegistrar};
use i18n_routes::store::LocaleStore;
use i18n_routes::{extract, translate};

/// Stand-in for the host site generator's router: logs each registration.
struct LoggingRegistrar;

impl RouteRegistrar for LoggingRegistrar {
    fn register(&mut self, pattern: &str, entry_point: &str) {
        info!("Route registered: '{}' -> {}", pattern, entry_point);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production/CI)
    let _ = dotenvy::dotenv();

    // Load configuration from environment
    let config = Config::from_env()?;

    // Initialize logging; I18N_DEBUG raises the default level
    let directive = if config.debug {
        "i18n_routes=debug"
    } else {
        "i18n_routes=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    info!("Starting i18n route generation");

    // Step 1: Populate the locale store, by generation or reuse
    let store = if config.generate {
        info!("Extracting path/text tokens from {}", config.src_dir);
        let tokens = extract::extract_tokens(Path::new(&config.src_dir))?;
        info!(
            "Extracted {} path tokens and {} text tokens",
            tokens.paths.len(),
            tokens.texts.len()
        );

        info!("Translating {} locales", config.locales.len());
        let client = reqwest::Client::new();
        let translated = translate::translate_locales(&client, &config, &tokens).await;

        let store = LocaleStore::new(translated.into_iter().map(|t| t.locale).collect());
        info!("Saving locale dictionaries to {}", config.locales_dir);
        store.save(Path::new(&config.locales_dir), Path::new(&config.cache_path))?;
        store
    } else {
        info!("Loading locale dictionaries from {}", config.locales_dir);
        let store = LocaleStore::load_locale_files(Path::new(&config.locales_dir))?;
        store.write_cache(Path::new(&config.cache_path))?;
        store
    };
    info!("Locale store populated with {} locales", store.len());

    // Step 2: Discover route files and register one route per locale per page
    let route_files = routes::discover_route_files(Path::new(&config.routes_dir))?;
    info!("Discovered {} route files", route_files.len());

    let mut registrar = LoggingRegistrar;
    let entries = routes::generate_routes(&route_files, &store, &config.routes_dir, &mut registrar);

    info!("Generated {} routes", entries.len());
    Ok(())
}
