//! Error handling tests for the anonymization engine
//!
//! Covers recognizer timeouts and failures, fallback to pattern-only
//! detection, the remote recognizer, input validation, batch isolation and
//! audit logging.

use async_trait::async_trait;
use ruanon::anonymization::recognizer::{NameMatch, NameRecognizer, RecognizerKind};
use ruanon::anonymization::{AnonymizationConfig, AnonymizationEngine, AnonymizeOptions};
use ruanon::config::secret_string;
use ruanon::domain::{Result, RuanonError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

struct SlowRecognizer {
    delay: Duration,
}

#[async_trait]
impl NameRecognizer for SlowRecognizer {
    fn name(&self) -> &str {
        "slow"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<NameMatch>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![NameMatch::from_text(text, 0, text.len(), Some(0.9))])
    }
}

struct BrokenRecognizer;

#[async_trait]
impl NameRecognizer for BrokenRecognizer {
    fn name(&self) -> &str {
        "broken"
    }

    async fn recognize(&self, _text: &str) -> Result<Vec<NameMatch>> {
        Err(RuanonError::RecognizerFailure("model crashed".to_string()))
    }
}

fn config_with_timeout(timeout_ms: u64) -> AnonymizationConfig {
    let mut config = AnonymizationConfig::default();
    config.recognizer.timeout_ms = timeout_ms;
    config
}

#[tokio::test]
async fn test_recognizer_timeout_is_reported() {
    let engine = AnonymizationEngine::with_name_recognizer(
        config_with_timeout(20),
        Arc::new(SlowRecognizer {
            delay: Duration::from_millis(500),
        }),
    )
    .unwrap();

    let err = engine.anonymize("Иван Петров").await.unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 20 }));
    assert_eq!(err.kind(), "recognizer_timeout");
}

#[tokio::test]
async fn test_per_call_timeout_overrides_config() {
    let engine = AnonymizationEngine::with_name_recognizer(
        config_with_timeout(5_000),
        Arc::new(SlowRecognizer {
            delay: Duration::from_millis(500),
        }),
    )
    .unwrap();

    let options = AnonymizeOptions::default().with_timeout(Duration::from_millis(10));
    let err = engine
        .anonymize_with("Иван Петров", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 10 }));
}

#[tokio::test]
async fn test_slow_recognizer_within_deadline() {
    let engine = AnonymizationEngine::with_name_recognizer(
        config_with_timeout(5_000),
        Arc::new(SlowRecognizer {
            delay: Duration::from_millis(10),
        }),
    )
    .unwrap();

    let result = engine.anonymize("Иван Петров").await.unwrap();
    assert_eq!(result.anonymized_text, "<PERSON_1>");
}

#[tokio::test]
async fn test_recognizer_failure_propagates() {
    let engine = AnonymizationEngine::with_name_recognizer(
        AnonymizationConfig::default(),
        Arc::new(BrokenRecognizer),
    )
    .unwrap();

    let err = engine
        .anonymize("Иван, телефон 89161234567")
        .await
        .unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerFailure(_)));
    assert!(err.is_recognizer_error());
}

#[tokio::test]
async fn test_fallback_keeps_structured_detections() {
    let mut config = config_with_timeout(20);
    config.recognizer.fallback_to_patterns = true;

    let broken =
        AnonymizationEngine::with_name_recognizer(config.clone(), Arc::new(BrokenRecognizer))
            .unwrap();
    let result = broken
        .anonymize("Иван, телефон 89161234567")
        .await
        .unwrap();
    assert_eq!(result.anonymized_text, "Иван, телефон <PHONE_NUMBER_1>");

    let slow = AnonymizationEngine::with_name_recognizer(
        config,
        Arc::new(SlowRecognizer {
            delay: Duration::from_millis(500),
        }),
    )
    .unwrap();
    let result = slow.anonymize("ИНН 7707083893").await.unwrap();
    assert_eq!(result.anonymized_text, "ИНН <INN_1>");
}

#[tokio::test]
async fn test_http_recognizer_through_engine() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer ner-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{"entity_group": "PER", "start": 11, "end": 22, "score": 0.97}]).to_string())
        .create_async()
        .await;

    let mut config = AnonymizationConfig::default();
    config.recognizer.kind = RecognizerKind::Http;
    config.recognizer.endpoint = Some(server.url());
    config.recognizer.api_token = Some(secret_string("ner-token".to_string()));
    let engine = AnonymizationEngine::new(config).unwrap();
    assert_eq!(engine.name_recognizer(), Some("http"));

    let result = engine.anonymize("Меня зовут Иван Петров").await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.anonymized_text, "Меня зовут <PERSON_1>");
}

#[tokio::test]
async fn test_http_recognizer_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(503)
        .with_body("model is loading")
        .create_async()
        .await;

    let mut config = AnonymizationConfig::default();
    config.recognizer.kind = RecognizerKind::Http;
    config.recognizer.endpoint = Some(server.url());
    let engine = AnonymizationEngine::new(config.clone()).unwrap();

    let err = engine.anonymize("Иван, ИНН 7707083893").await.unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerFailure(_)));

    config.recognizer.fallback_to_patterns = true;
    let engine = AnonymizationEngine::new(config).unwrap();
    let result = engine.anonymize("Иван, ИНН 7707083893").await.unwrap();
    assert_eq!(result.anonymized_text, "Иван, ИНН <INN_1>");
}

/// NER endpoint that accepts connections and never answers
async fn silent_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    format!("http://{addr}/ner")
}

#[tokio::test]
async fn test_http_recognizer_silent_service_times_out() {
    let mut config = config_with_timeout(200);
    config.recognizer.kind = RecognizerKind::Http;
    config.recognizer.endpoint = Some(silent_endpoint().await);
    let engine = AnonymizationEngine::new(config).unwrap();

    let err = engine.anonymize("Иван Петров").await.unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 200 }));

    let options = AnonymizeOptions::default().with_timeout(Duration::from_millis(600));
    let err = engine
        .anonymize_with("Иван Петров", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, RuanonError::RecognizerTimeout { timeout_ms: 600 }));
}

#[test]
fn test_http_recognizer_requires_endpoint() {
    let mut config = AnonymizationConfig::default();
    config.recognizer.kind = RecognizerKind::Http;
    config.recognizer.endpoint = None;

    assert!(AnonymizationEngine::new(config).is_err());
}

#[tokio::test]
async fn test_oversized_input_rejected() {
    let mut config = AnonymizationConfig::default();
    config.engine.max_input_chars = 100;
    let engine = AnonymizationEngine::new(config).unwrap();

    let err = engine.anonymize(&"а".repeat(101)).await.unwrap_err();
    assert!(matches!(err, RuanonError::InvalidInput(_)));
    assert_eq!(err.kind(), "invalid_input");
}

#[tokio::test]
async fn test_batch_failure_does_not_affect_others() {
    let mut config = config_with_timeout(5_000);
    config.engine.max_input_chars = 30;
    let engine = AnonymizationEngine::new(config).unwrap();

    let texts = vec![
        "+79818122189".to_string(),
        "ИНН ".repeat(20),
        "паспорт серия 45 10 № 123456".to_string(),
    ];
    let results = engine.anonymize_batch(&texts).await;

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().unwrap().anonymized_text,
        "<PHONE_NUMBER_1>"
    );
    assert!(matches!(results[1], Err(RuanonError::InvalidInput(_))));
    assert_eq!(
        results[2].as_ref().unwrap().anonymized_text,
        "паспорт <PASSPORT_1>"
    );
}

#[tokio::test]
async fn test_audit_log_has_no_plaintext() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("audit").join("anonymization.log");

    let mut config = AnonymizationConfig::default();
    config.audit.enabled = true;
    config.audit.log_path = log_path.clone();
    let engine = AnonymizationEngine::new(config).unwrap();
    assert!(engine.is_audited());

    let result = engine
        .anonymize("Меня зовут Иван Петров, ИНН 7707083893")
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains(&result.request_id.to_string()));
    assert!(contents.contains("<PERSON_1>"));
    assert!(!contents.contains("Иван"));
    assert!(!contents.contains("7707083893"));

    let entry: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(entry["detections_count"], 2);
}

#[test]
fn test_error_kinds_are_distinct() {
    let errors = [
        RuanonError::InvalidInput(String::new()),
        RuanonError::RecognizerTimeout { timeout_ms: 1 },
        RuanonError::RecognizerFailure(String::new()),
        RuanonError::Configuration(String::new()),
        RuanonError::Audit(String::new()),
    ];

    let mut kinds: Vec<&str> = errors.iter().map(RuanonError::kind).collect();
    kinds.sort_unstable();
    kinds.dedup();
    assert_eq!(kinds.len(), errors.len());
}
