// Inference endpoint client
//
// This module provides the seam to the deployed question-answering endpoint:
// the request/answer wire types and a `Predictor` trait with a SageMaker
// runtime implementation. Everything that talks to the endpoint goes through
// the trait, so tests can substitute a stub.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PredictionError;

mod sagemaker;

pub use sagemaker::SageMakerPredictor;

/// Context paragraph prefilled in the demo form and used by the deploy smoke test.
pub const DEMO_CONTEXT: &str = "My name is Shubham Krishna. I come from India. I am a ML Engineer with expertise in NLP and would like to work for HuggingFace.";

/// Question prefilled in the demo form and used by the deploy smoke test.
pub const DEMO_QUESTION: &str = "Which company would Shubham like to work for?";

/// Request body sent to the endpoint as `application/json`.
#[derive(Debug, Clone, Serialize)]
pub struct QaRequest {
    pub inputs: QaInputs,
}

/// The (question, context) pair the hosted model answers over.
#[derive(Debug, Clone, Serialize)]
pub struct QaInputs {
    pub question: String,
    pub context: String,
}

impl QaRequest {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            inputs: QaInputs {
                question: question.into(),
                context: context.into(),
            },
        }
    }
}

/// Answer returned by the endpoint.
///
/// The hosted pipeline may return extra fields (span offsets); only the
/// answer text and its confidence score are part of the contract here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QaAnswer {
    pub answer: String,
    /// Confidence in [0,1]
    pub score: f64,
}

impl QaAnswer {
    /// Decode a response body, surfacing a typed error on shape mismatch.
    pub fn parse(body: &[u8]) -> Result<Self, PredictionError> {
        if body.is_empty() {
            return Err(PredictionError::EmptyResponse);
        }
        serde_json::from_slice(body).map_err(|source| PredictionError::MalformedResponse {
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        })
    }
}

/// Trait for inference endpoint clients
///
/// The production implementation invokes a deployed SageMaker endpoint; tests
/// use a stub. Failures propagate to the caller untranslated: no retries, no
/// timeouts beyond the client's defaults.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Send one (context, question) pair and return the decoded answer.
    async fn predict(&self, request: &QaRequest) -> Result<QaAnswer>;

    /// Name of the endpoint this predictor is bound to.
    fn endpoint_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_payload_shape() {
        let request = QaRequest::new("Who?", "Someone.");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"inputs": {"question": "Who?", "context": "Someone."}})
        );
    }

    #[test]
    fn test_parse_answer() {
        let answer = QaAnswer::parse(br#"{"answer": "HuggingFace", "score": 0.87}"#).unwrap();
        assert_eq!(answer.answer, "HuggingFace");
        assert!((answer.score - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_tolerates_extra_fields() {
        let body = br#"{"score": 0.97, "start": 100, "end": 111, "answer": "HuggingFace"}"#;
        let answer = QaAnswer::parse(body).unwrap();
        assert_eq!(answer.answer, "HuggingFace");
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        let err = QaAnswer::parse(b"<html>busy</html>").unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_score() {
        let err = QaAnswer::parse(br#"{"answer": "HuggingFace"}"#).unwrap_err();
        assert!(matches!(err, PredictionError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_body() {
        let err = QaAnswer::parse(b"").unwrap_err();
        assert!(matches!(err, PredictionError::EmptyResponse));
    }
}
