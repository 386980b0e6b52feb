// SageMaker runtime predictor implementation

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_sdk_sagemakerruntime::Client;

use super::{Predictor, QaAnswer, QaRequest};

/// Predictor bound to a deployed SageMaker endpoint
///
/// The endpoint identity is fixed at construction and read-only afterwards.
pub struct SageMakerPredictor {
    client: Client,
    endpoint_name: String,
}

impl SageMakerPredictor {
    /// Connect using the default credential and region chain.
    pub async fn connect(endpoint_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: Client::new(&config),
            endpoint_name: endpoint_name.into(),
        }
    }

    /// Build a predictor on top of an already-constructed runtime client.
    pub fn with_client(client: Client, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }
}

#[async_trait]
impl Predictor for SageMakerPredictor {
    async fn predict(&self, request: &QaRequest) -> Result<QaAnswer> {
        let payload = serde_json::to_vec(request).context("Failed to encode request payload")?;

        tracing::debug!(endpoint = %self.endpoint_name, "Invoking endpoint");

        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .with_context(|| format!("Failed to invoke endpoint '{}'", self.endpoint_name))?;

        let body = output.body().map(|b| b.as_ref().to_vec()).unwrap_or_default();
        let answer = QaAnswer::parse(&body)?;

        tracing::debug!(
            endpoint = %self.endpoint_name,
            score = answer.score,
            "Received answer"
        );

        Ok(answer)
    }

    fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }
}
