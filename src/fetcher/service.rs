use std::fmt::Debug;

use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::{consts::FALLBACK_CATEGORY_ID, errors::ProofreadError};

/// A stateless text checking backend.
#[async_trait]
pub trait CheckService: Debug + Send + Sync {
    /// Check `text` and return the raw matches with offsets relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the service can't be reached or responds with
    /// something other than a successful check result.
    async fn check(&self, text: &str, language: &str) -> Result<Vec<RawMatch>, ProofreadError>;
}

/// The body of a check response.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<RawMatch>,
}

/// A match as reported by the service. Offsets are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub offset: usize,
    pub length: usize,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub replacements: Vec<RawReplacement>,

    #[serde(default)]
    pub rule: RawRule,

    #[serde(default)]
    pub context: RawContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawReplacement {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct RawRule {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub category: RawCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawCategory {
    #[serde(default = "default_category_id")]
    pub id: String,
}

impl Default for RawCategory {
    fn default() -> Self {
        Self {
            id: default_category_id(),
        }
    }
}

fn default_category_id() -> String { FALLBACK_CATEGORY_ID.to_owned() }

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct RawContext {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub length: usize,
}

/// Talks to a LanguageTool compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct LanguageToolService {
    client: reqwest::Client,
    api_url: String,
}

impl LanguageToolService {
    #[must_use]
    pub fn new(api_url: &str) -> Self { Self::with_client(reqwest::Client::new(), api_url) }

    #[must_use]
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_owned(),
        }
    }
}

#[async_trait]
impl CheckService for LanguageToolService {
    async fn check(&self, text: &str, language: &str) -> Result<Vec<RawMatch>, ProofreadError> {
        debug!(
            "Checking {} characters at {}",
            text.chars().count(),
            self.api_url
        );

        // Disabled rules are requested too, filtering happens client-side
        let response = self
            .client
            .post(&self.api_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("text", text),
                ("language", language),
                ("enabledOnly", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProofreadError::ServiceStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: CheckResponse = serde_json::from_slice(&body)?;

        Ok(parsed.matches)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        extract::State,
        http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
        routing::post,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::ProofreadConfig, document::Node, extract::extract, fetcher::SuggestionFetcher,
    };

    /// Answers every check with a fixed response and records the content type
    /// and body of each request.
    #[derive(Debug, Clone)]
    struct FixedServer {
        received: Arc<Mutex<Vec<(String, String)>>>,
        status: StatusCode,
        body: &'static str,
    }

    async fn respond(
        State(server): State<FixedServer>,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, &'static str) {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        server.received.lock().unwrap().push((content_type, body));

        (server.status, server.body)
    }

    async fn serve(status: StatusCode, body: &'static str) -> (LanguageToolService, FixedServer) {
        let server = FixedServer {
            received: Arc::default(),
            status,
            body,
        };
        let app = Router::new()
            .route("/v2/check", post(respond))
            .with_state(server.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let service =
            LanguageToolService::with_client(client, &format!("http://{address}/v2/check"));

        (service, server)
    }

    fn fetcher(service: LanguageToolService) -> SuggestionFetcher {
        let config = ProofreadConfig {
            api_url: Some("http://localhost:8081/v2/check".to_owned()),
            ..ProofreadConfig::default()
        };

        SuggestionFetcher::new(&config, Arc::new(service))
    }

    #[tokio::test]
    async fn test_sends_a_form_encoded_check() {
        let (service, server) = serve(
            StatusCode::OK,
            r#"{"matches": [{"offset": 6, "length": 3, "rule": {"id": "MORFOLOGIK_RULE_EN_US"}}]}"#,
        )
        .await;

        let matches = service.check("I saw teh cat & dog", "en-US").await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].offset, 6);
        assert_eq!(
            server.received.lock().unwrap().clone(),
            vec![(
                "application/x-www-form-urlencoded".to_owned(),
                "text=I+saw+teh+cat+%26+dog&language=en-US&enabledOnly=false".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn test_error_status_becomes_an_empty_result() {
        let (service, server) = serve(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;

        assert!(matches!(
            service.check("I saw teh cat.", "en-US").await,
            Err(ProofreadError::ServiceStatus { status: 500 })
        ));

        let fetcher = fetcher(service);
        let flat = extract(&[Node::paragraph(vec![Node::text("I saw teh cat.")])]);
        assert!(fetcher.fetch_full(&flat).await.matches.is_empty());
        assert_eq!(fetcher.cached_fragments(), 0);
        assert_eq!(server.received.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_body_becomes_an_empty_result() {
        let (service, server) = serve(StatusCode::OK, "<html>not json</html>").await;

        assert!(matches!(
            service.check("I saw teh cat.", "en-US").await,
            Err(ProofreadError::Decode(_))
        ));

        let fetcher = fetcher(service);
        let flat = extract(&[Node::paragraph(vec![Node::text("I saw teh cat.")])]);
        assert!(fetcher.fetch_full(&flat).await.matches.is_empty());
        assert_eq!(fetcher.cached_fragments(), 0);
        assert_eq!(server.received.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "software": {"name": "LanguageTool"},
            "matches": [
                {
                    "message": "Possible spelling mistake found.",
                    "offset": 6,
                    "length": 3,
                    "replacements": [{"value": "the"}, {"value": "tea"}],
                    "context": {"text": "I saw teh cat", "offset": 6, "length": 3},
                    "rule": {
                        "id": "MORFOLOGIK_RULE_EN_US",
                        "category": {"id": "TYPOS", "name": "Possible Typo"}
                    }
                },
                {"offset": 0, "length": 1, "rule": {"id": "UPPERCASE_SENTENCE_START"}}
            ]
        }"#;

        let parsed: CheckResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(parsed.matches[0].replacements[1].value, "tea");
        assert_eq!(parsed.matches[0].context.text, "I saw teh cat");
        assert_eq!(parsed.matches[1].rule.category.id, "TYPOS");
        assert_eq!(parsed.matches[1].message, "");
    }

    #[test]
    fn test_missing_matches_is_empty() {
        let parsed: CheckResponse = serde_json::from_str("{}").unwrap();

        assert!(parsed.matches.is_empty());
    }
}
