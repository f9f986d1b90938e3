//! Translation orchestration: turn extracted tokens into one locale record
//! per configured locale, machine-translating through an OpenAI-compatible
//! chat-completions endpoint.
//!
//! The default locale never touches the network; its dictionaries are
//! identity mappings by construction. Every other locale gets exactly one
//! request (no retry). Any failure (transport, HTTP status, malformed
//! JSON, shape mismatch) is logged and the locale falls back to its
//! untranslated identity record, so the build always completes.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::extract::TokenSet;
use crate::locale::{Locale, PathValue};

/// OpenAI Chat Completion request for dictionary translation
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// How a locale record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The default locale: identity dictionaries, no service call.
    Identity,
    /// Machine translated and validated.
    Translated,
    /// The service failed; the untranslated identity record is used.
    Fallback,
}

/// A locale record together with how it was obtained, so callers and tests
/// can see which locales fell back.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedLocale {
    pub locale: Locale,
    pub outcome: TranslationOutcome,
}

/// Build the system prompt for dictionary translation
fn build_system_prompt(default_locale: &str) -> String {
    format!(
        r#"You are an i18n tool that translates a user input.
Here is an example: {{ "code": "fr", "name": "Français", "paths": {{ "dashboard": "dashboard" }}, "texts": {{ "All accounts": "All accounts", "Add website": "Add website" }} }}.
Translate from the '{}' locale to the locale specified in the input.
Only translate the right-hand values of the paths and texts objects, never the keys.
"paths" values are slugs that will be used as page slugs, keep them URL valid.
For the output, make sure to always respect the schema and be valid JSON."#,
        default_locale
    )
}

/// Translate every configured locale, concurrently, preserving the
/// configuration order in the result (the default locale keeps whatever
/// position it was configured at).
pub async fn translate_locales(
    client: &reqwest::Client,
    config: &Config,
    tokens: &TokenSet,
) -> Vec<TranslatedLocale> {
    let tasks = config.locales.iter().map(|locale_config| async move {
        let identity = Locale::identity(
            &locale_config.code,
            &locale_config.name,
            &tokens.paths,
            &tokens.texts,
        );

        if locale_config.code == config.default_locale {
            return TranslatedLocale {
                locale: identity,
                outcome: TranslationOutcome::Identity,
            };
        }

        match request_translation(client, config, &identity).await {
            Ok(translated) => {
                debug!("Translated locale '{}'", translated.code);
                TranslatedLocale {
                    locale: translated,
                    outcome: TranslationOutcome::Translated,
                }
            }
            Err(err) => {
                warn!(
                    "Translation failed for locale '{}', falling back to untranslated tokens: {:#}",
                    locale_config.code, err
                );
                TranslatedLocale {
                    locale: identity,
                    outcome: TranslationOutcome::Fallback,
                }
            }
        }
    });

    join_all(tasks).await
}

/// Send one locale's identity record to the translation service and parse
/// the response back into a validated locale record.
async fn request_translation(
    client: &reqwest::Client,
    config: &Config,
    identity: &Locale,
) -> Result<Locale> {
    let payload = serde_json::to_string_pretty(identity)
        .context("Failed to serialize locale payload")?;

    let request = ChatRequest {
        model: config.openai_model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: build_system_prompt(&config.default_locale),
            },
            Message {
                role: "user".to_string(),
                content: payload,
            },
        ],
        max_tokens: 4000,
        temperature: 0.2,
    };

    let response = client
        .post(&config.openai_api_url)
        .header("Authorization", format!("Bearer {}", config.openai_api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .context("Failed to send translation request to OpenAI API")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI API error ({}): {}", status, body);
    }

    let chat_response: ChatResponse = response
        .json()
        .await
        .context("Failed to parse OpenAI response")?;

    let content = chat_response
        .choices
        .first()
        .map(|c| c.message.content.clone())
        .context("OpenAI response contained no choices")?;

    let translated: Locale = serde_json::from_str(&content)
        .context("Translated content is not a valid locale record")?;

    validate_translation(identity, &translated)?;

    Ok(translated)
}

/// Check that the translated record kept the request's shape: same code,
/// same dictionary key sets, and plain string values throughout.
fn validate_translation(request: &Locale, response: &Locale) -> Result<()> {
    if response.code != request.code {
        anyhow::bail!(
            "Locale code changed in translation: expected '{}', got '{}'",
            request.code,
            response.code
        );
    }

    if !response.paths.keys().eq(request.paths.keys()) {
        anyhow::bail!("Translated paths do not cover the requested path tokens");
    }
    if let Some(key) = response
        .paths
        .iter()
        .find_map(|(k, v)| match v {
            PathValue::Leaf(_) => None,
            PathValue::Node(_) => Some(k),
        })
    {
        anyhow::bail!("Translated path '{}' is not a plain string", key);
    }

    if !response.texts.keys().eq(request.texts.keys()) {
        anyhow::bail!("Translated texts do not cover the requested text tokens");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleConfig;
    use std::collections::BTreeSet;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Test Helpers ====================

    fn create_test_config(api_url: &str) -> Config {
        Config {
            default_locale: "en".to_string(),
            locales: vec![
                LocaleConfig {
                    code: "en".to_string(),
                    name: "English".to_string(),
                },
                LocaleConfig {
                    code: "fr".to_string(),
                    name: "Français".to_string(),
                },
            ],
            generate: true,
            debug: false,
            src_dir: "./src".to_string(),
            routes_dir: "./src/routes".to_string(),
            locales_dir: "./public/locales".to_string(),
            cache_path: "./.cache/i18n-routes/store.json".to_string(),
            openai_api_key: "test-openai-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: api_url.to_string(),
        }
    }

    fn sample_tokens() -> TokenSet {
        TokenSet {
            paths: ["dashboard"].iter().map(|s| s.to_string()).collect(),
            texts: ["All accounts"].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a mock chat-completions response whose content is `content`
    fn create_chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn french_record() -> &'static str {
        r#"{
            "code": "fr",
            "name": "Français",
            "paths": { "dashboard": "tableau-de-bord" },
            "texts": { "All accounts": "Tous les comptes" }
        }"#
    }

    // ==================== System Prompt Tests ====================

    #[test]
    fn test_system_prompt_names_default_locale() {
        let prompt = build_system_prompt("en");
        assert!(prompt.contains("'en' locale"));
        assert!(prompt.contains("right-hand values"));
        assert!(prompt.contains("valid JSON"));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_accepts_matching_shape() {
        let tokens = sample_tokens();
        let request = Locale::identity("fr", "Français", &tokens.paths, &tokens.texts);
        let response: Locale = serde_json::from_str(french_record()).expect("parse");
        assert!(validate_translation(&request, &response).is_ok());
    }

    #[test]
    fn test_validate_rejects_changed_code() {
        let tokens = sample_tokens();
        let request = Locale::identity("fr", "Français", &tokens.paths, &tokens.texts);
        let mut response: Locale = serde_json::from_str(french_record()).expect("parse");
        response.code = "de".to_string();
        assert!(validate_translation(&request, &response).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_path_key() {
        let tokens = sample_tokens();
        let request = Locale::identity("fr", "Français", &tokens.paths, &tokens.texts);
        let mut response: Locale = serde_json::from_str(french_record()).expect("parse");
        response.paths.clear();
        assert!(validate_translation(&request, &response).is_err());
    }

    #[test]
    fn test_validate_rejects_invented_text_key() {
        let tokens = sample_tokens();
        let request = Locale::identity("fr", "Français", &tokens.paths, &tokens.texts);
        let mut response: Locale = serde_json::from_str(french_record()).expect("parse");
        response
            .texts
            .insert("Invented".to_string(), "Inventé".to_string());
        assert!(validate_translation(&request, &response).is_err());
    }

    #[test]
    fn test_validate_rejects_nested_path_value() {
        let tokens = sample_tokens();
        let request = Locale::identity("fr", "Français", &tokens.paths, &tokens.texts);
        let mut response: Locale = serde_json::from_str(french_record()).expect("parse");
        response.paths.insert(
            "dashboard".to_string(),
            PathValue::Node(Default::default()),
        );
        assert!(validate_translation(&request, &response).is_err());
    }

    // ==================== Orchestrator Tests ====================

    #[tokio::test]
    async fn test_default_locale_is_identity_without_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response(french_record())),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let results = translate_locales(&client, &config, &sample_tokens()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].locale.code, "en");
        assert_eq!(results[0].outcome, TranslationOutcome::Identity);
        assert_eq!(
            results[0].locale.paths.get("dashboard"),
            Some(&PathValue::Leaf("dashboard".to_string()))
        );
    }

    #[tokio::test]
    async fn test_successful_translation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response(french_record())),
            )
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let results = translate_locales(&client, &config, &sample_tokens()).await;

        let fr = &results[1];
        assert_eq!(fr.outcome, TranslationOutcome::Translated);
        assert_eq!(
            fr.locale.paths.get("dashboard"),
            Some(&PathValue::Leaf("tableau-de-bord".to_string()))
        );
        assert_eq!(
            fr.locale.texts.get("All accounts").map(String::as_str),
            Some("Tous les comptes")
        );
    }

    #[tokio::test]
    async fn test_http_error_falls_back_to_identity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let tokens = sample_tokens();
        let results = translate_locales(&client, &config, &tokens).await;

        let fr = &results[1];
        assert_eq!(fr.outcome, TranslationOutcome::Fallback);
        assert_eq!(
            fr.locale,
            Locale::identity("fr", "Français", &tokens.paths, &tokens.texts)
        );
    }

    #[tokio::test]
    async fn test_malformed_content_falls_back_to_identity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_chat_response("not json at all")),
            )
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let results = translate_locales(&client, &config, &sample_tokens()).await;

        assert_eq!(results[1].outcome, TranslationOutcome::Fallback);
    }

    #[tokio::test]
    async fn test_shape_mismatch_falls_back_to_identity() {
        let mock_server = MockServer::start().await;

        // Response drops the "dashboard" path token
        let mismatched = r#"{
            "code": "fr",
            "name": "Français",
            "paths": {},
            "texts": { "All accounts": "Tous les comptes" }
        }"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_chat_response(mismatched)),
            )
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let results = translate_locales(&client, &config, &sample_tokens()).await;

        assert_eq!(results[1].outcome, TranslationOutcome::Fallback);
    }

    #[tokio::test]
    async fn test_result_order_matches_configuration_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let mut config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        // Default locale configured in the middle keeps its position
        config.locales = vec![
            LocaleConfig {
                code: "fr".to_string(),
                name: "Français".to_string(),
            },
            LocaleConfig {
                code: "en".to_string(),
                name: "English".to_string(),
            },
            LocaleConfig {
                code: "es".to_string(),
                name: "Español".to_string(),
            },
        ];

        let client = reqwest::Client::new();
        let results = translate_locales(&client, &config, &sample_tokens()).await;

        let codes: Vec<&str> = results.iter().map(|r| r.locale.code.as_str()).collect();
        assert_eq!(codes, vec!["fr", "en", "es"]);
        assert_eq!(results[1].outcome, TranslationOutcome::Identity);
    }

    #[tokio::test]
    async fn test_empty_token_sets_produce_empty_dictionaries() {
        let mock_server = MockServer::start().await;

        let empty_fr = r#"{ "code": "fr", "name": "Français", "paths": {}, "texts": {} }"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_chat_response(empty_fr)),
            )
            .mount(&mock_server)
            .await;

        let config =
            create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let tokens = TokenSet {
            paths: BTreeSet::new(),
            texts: BTreeSet::new(),
        };
        let results = translate_locales(&client, &config, &tokens).await;

        assert_eq!(results[1].outcome, TranslationOutcome::Translated);
        assert!(results[1].locale.paths.is_empty());
        assert!(results[1].locale.texts.is_empty());
    }
}
