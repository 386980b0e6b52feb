// Typed error surface
//
// Vendor errors propagate as-is through anyhow; the one typed error lives at
// response validation, where the endpoint's wire format must match the
// expected answer shape.

use thiserror::Error;

/// Errors raised while interpreting an inference response.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The endpoint replied, but the body did not decode to the expected
    /// `{"answer": ..., "score": ...}` shape.
    #[error("endpoint returned a malformed response: {body}")]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint reply carried no body at all.
    #[error("endpoint returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_response_mentions_body() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PredictionError::MalformedResponse {
            body: "not-json".to_string(),
            source,
        };
        assert!(err.to_string().contains("not-json"));
    }
}
