//! HTTP client for an external NER service
//!
//! The service receives `POST {endpoint}` with body `{"text": "..."}` and
//! answers with token-classification output in the HuggingFace shape:
//!
//! ```json
//! [{"entity_group": "PER", "start": 11, "end": 22, "word": "Иван Петров", "score": 0.99}]
//! ```
//!
//! An object wrapper `{"entities": [...]}` is accepted as well. Offsets in
//! the response are character offsets and are converted to byte offsets
//! here. Only `PER`/`PERSON` groups (with or without a `B-`/`I-` prefix)
//! are kept.

use super::{NameMatch, NameRecognizer};
use crate::config::SecretString;
use crate::domain::{Result, RuanonError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest slice of an error body copied into an error message
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EntityPrediction {
    #[serde(alias = "entity", alias = "label")]
    entity_group: String,
    start: usize,
    end: usize,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecognizeResponse {
    List(Vec<EntityPrediction>),
    Wrapped { entities: Vec<EntityPrediction> },
}

impl RecognizeResponse {
    fn into_predictions(self) -> Vec<EntityPrediction> {
        match self {
            Self::List(predictions) => predictions,
            Self::Wrapped { entities } => entities,
        }
    }
}

impl EntityPrediction {
    fn is_person(&self) -> bool {
        let label = self.entity_group.to_uppercase();
        let label = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(&label);
        matches!(label, "PER" | "PERSON")
    }
}

/// Byte offset of every character boundary, indexed by character position
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Name recognizer backed by a remote NER service
pub struct HttpNameRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<SecretString>,
    connect_timeout: Duration,
}

impl HttpNameRecognizer {
    /// Create a client for `endpoint`
    ///
    /// `connect_timeout` bounds only connection setup. The whole exchange
    /// is bounded by the caller's deadline, so the client sets no overall
    /// request timeout of its own.
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<SecretString>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(RuanonError::Configuration(
                "Name recognizer endpoint cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RuanonError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_token,
            connect_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_error(&self, err: &reqwest::Error) -> RuanonError {
        if err.is_timeout() {
            RuanonError::RecognizerTimeout {
                timeout_ms: u64::try_from(self.connect_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            RuanonError::RecognizerFailure(format!("NER request failed: {err}"))
        }
    }
}

#[async_trait]
impl NameRecognizer for HttpNameRecognizer {
    fn name(&self) -> &str {
        "http"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<NameMatch>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&RecognizeRequest { text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret().as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(RuanonError::RecognizerFailure(format!(
                "NER service returned {status}: {body}"
            )));
        }

        let predictions = response
            .json::<RecognizeResponse>()
            .await
            .map_err(|e| RuanonError::RecognizerFailure(format!("Invalid NER response: {e}")))?
            .into_predictions();

        let boundaries = char_boundaries(text);
        let matches = predictions
            .into_iter()
            .filter(EntityPrediction::is_person)
            .filter_map(|p| {
                let start = *boundaries.get(p.start)?;
                let end = *boundaries.get(p.end)?;
                Some(NameMatch::from_text(text, start, end, p.score))
            })
            .collect();

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::recognizer::NameDetector;
    use crate::anonymization::stop_words::StopWords;
    use crate::config::secret_string;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;

    fn recognizer(url: String, token: Option<&str>) -> HttpNameRecognizer {
        HttpNameRecognizer::new(
            url,
            token.map(|t| secret_string(t.to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_person_groups_converted_to_byte_offsets() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ner")
            .match_header("authorization", "Bearer secret-token")
            .match_body(Matcher::Json(json!({"text": "Меня зовут Иван Петров"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"entity_group": "PER", "start": 11, "end": 22, "word": "Иван Петров", "score": 0.98},
                    {"entity_group": "LOC", "start": 0, "end": 4, "word": "Меня", "score": 0.4}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let text = "Меня зовут Иван Петров";
        let matches = recognizer(format!("{}/ner", server.url()), Some("secret-token"))
            .recognize(text)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "Иван Петров");
        assert_eq!(&text[matches[0].start..matches[0].end], "Иван Петров");
        assert_eq!(matches[0].score, Some(0.98));
    }

    #[tokio::test]
    async fn test_wrapped_response_and_bio_labels() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({"entities": [{"entity": "B-PER", "start": 0, "end": 4}]}).to_string())
            .create_async()
            .await;

        let matches = recognizer(server.url(), None)
            .recognize("Анна пришла")
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "Анна");
        assert_eq!(matches[0].score, None);
    }

    #[tokio::test]
    async fn test_server_error_is_recognizer_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("model is loading")
            .create_async()
            .await;

        let err = recognizer(server.url(), None)
            .recognize("Иван")
            .await
            .unwrap_err();
        assert!(matches!(err, RuanonError::RecognizerFailure(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_recognizer_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = recognizer(server.url(), None)
            .recognize("Иван")
            .await
            .unwrap_err();
        assert!(matches!(err, RuanonError::RecognizerFailure(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_offsets_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!([{"entity_group": "PER", "start": 0, "end": 50}]).to_string())
            .create_async()
            .await;

        let matches = recognizer(server.url(), None)
            .recognize("Иван")
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    /// Accepts connections and never answers
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_silent_service_is_timeout_not_failure() {
        let url = silent_server().await;
        let detector = NameDetector::new(
            Arc::new(recognizer(url, None)),
            1,
            Duration::from_millis(100),
        );
        let stop_words = StopWords::default();

        let err = detector.detect("Иван", &stop_words, None).await.unwrap_err();
        assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 100 }));

        // A longer per-call deadline is not cut short by the client
        let err = detector
            .detect("Иван", &stop_words, Some(Duration::from_millis(300)))
            .await
            .unwrap_err();
        assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 300 }));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let result = HttpNameRecognizer::new("  ", None, Duration::from_secs(1));
        assert!(matches!(result, Err(RuanonError::Configuration(_))));
    }

    #[test]
    fn test_char_boundaries() {
        assert_eq!(char_boundaries("Иа"), vec![0, 2, 3]);
    }
}
