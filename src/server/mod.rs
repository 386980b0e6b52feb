// qaops - Web demo server module
// Serves the question-answering form backed by a deployed endpoint

mod handlers;

pub use handlers::create_router;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::predictor::Predictor;

/// Configuration for the demo server
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Bind address (e.g., "0.0.0.0:80")
    pub bind_address: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
        }
    }
}

/// Demo server forwarding form submissions to the inference endpoint
///
/// The only shared state is the predictor and its fixed endpoint identity,
/// read-only after startup. Request concurrency belongs to the framework.
pub struct DemoServer {
    predictor: Arc<dyn Predictor>,
    config: DemoConfig,
}

impl DemoServer {
    /// Create a new demo server
    pub fn new(predictor: Arc<dyn Predictor>, config: DemoConfig) -> Self {
        Self { predictor, config }
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.bind_address.parse()?;
        let endpoint = self.predictor.endpoint_name().to_string();

        let app = create_router(Arc::new(self)).layer(TraceLayer::new_for_http());

        tracing::info!(%addr, endpoint = %endpoint, "Starting Q&A demo server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get reference to the predictor
    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Get server configuration
    pub fn config(&self) -> &DemoConfig {
        &self.config
    }
}
