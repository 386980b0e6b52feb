// Endpoint deployment orchestration
//
// Strictly sequential: resolve the execution role, create the hosting
// resources, wait for the endpoint to come up, run one smoke-test inference,
// then register autoscaling. Resource creation is remote and irreversible
// from here; a failure part-way leaves earlier resources in place.

mod autoscale;
mod role;

pub use autoscale::{autoscale_endpoint, policy_name, resource_id, VARIANT_NAME};
pub use role::{load_profile_config, resolve_execution_role, role_arn_from_identity};

use std::time::Duration;

use anyhow::{bail, Context, Result};
use aws_config::SdkConfig;
use aws_sdk_sagemaker::types::{
    ContainerDefinition, EndpointStatus, ProductionVariant, ProductionVariantInstanceType,
};
use aws_sdk_sagemakerruntime::primitives::Blob;
use uuid::Uuid;

use crate::config::DeploySettings;
use crate::predictor::{QaRequest, DEMO_CONTEXT, DEMO_QUESTION};

/// Registry account publishing the HuggingFace inference containers.
const DLC_ACCOUNT: &str = "763104351884";

/// Container framework versions the hosted model is packaged against.
const TRANSFORMERS_VERSION: &str = "4.6.1";
const PYTORCH_VERSION: &str = "1.7.1";
const PY_VERSION: &str = "py36";

/// How long to wait between endpoint status polls, and for how many rounds.
const POLL_INTERVAL: Duration = Duration::from_secs(15);
const MAX_POLL_ATTEMPTS: u32 = 240;

/// Generate a unique caller-assigned endpoint name.
pub fn endpoint_name() -> String {
    format!("bert-qa-dem-{}", Uuid::new_v4())
}

/// CPU inference image URI for the pinned framework versions in a region.
pub fn inference_image_uri(region: &str) -> String {
    format!(
        "{DLC_ACCOUNT}.dkr.ecr.{region}.amazonaws.com/huggingface-pytorch-inference:\
         {PYTORCH_VERSION}-transformers{TRANSFORMERS_VERSION}-cpu-{PY_VERSION}-ubuntu18.04"
    )
}

/// Deploy the model, smoke-test it, and register autoscaling.
pub async fn run(settings: DeploySettings) -> Result<String> {
    let config = load_profile_config(&settings.profile_name).await;

    let region = config
        .region()
        .map(|r| r.to_string())
        .with_context(|| {
            format!(
                "Profile '{}' has no region configured",
                settings.profile_name
            )
        })?;

    let role_arn = resolve_execution_role(&config, &settings.profile_name).await?;
    tracing::info!(role = %role_arn, region = %region, "Resolved execution role");

    let endpoint = endpoint_name();
    create_endpoint(&config, &settings, &region, &role_arn, &endpoint).await?;
    wait_until_in_service(&config, &endpoint).await?;

    // The smoke test is informational: the raw response is printed for the
    // operator and never validated. Autoscaling proceeds regardless.
    let response = test_prediction(&config, &endpoint).await?;
    println!("{response}");

    autoscale_endpoint(&config, &endpoint).await?;

    tracing::info!(endpoint = %endpoint, "Deployment complete");
    Ok(endpoint)
}

/// Create the model, endpoint configuration and endpoint.
async fn create_endpoint(
    config: &SdkConfig,
    settings: &DeploySettings,
    region: &str,
    role_arn: &str,
    endpoint: &str,
) -> Result<()> {
    let client = aws_sdk_sagemaker::Client::new(config);

    let container = ContainerDefinition::builder()
        .image(inference_image_uri(region))
        .environment("HF_MODEL_ID", &settings.model_id)
        .environment("HF_TASK", &settings.task)
        .build();

    client
        .create_model()
        .model_name(endpoint)
        .execution_role_arn(role_arn)
        .primary_container(container)
        .send()
        .await
        .with_context(|| format!("Failed to create model '{}'", settings.model_id))?;

    tracing::info!(model = %settings.model_id, task = %settings.task, "Created model");

    let variant = ProductionVariant::builder()
        .variant_name(VARIANT_NAME)
        .model_name(endpoint)
        .initial_instance_count(settings.initial_instance_count)
        .instance_type(ProductionVariantInstanceType::from(
            settings.instance_type.as_str(),
        ))
        .build();

    client
        .create_endpoint_config()
        .endpoint_config_name(endpoint)
        .production_variants(variant)
        .send()
        .await
        .context("Failed to create endpoint configuration")?;

    client
        .create_endpoint()
        .endpoint_name(endpoint)
        .endpoint_config_name(endpoint)
        .send()
        .await
        .with_context(|| format!("Failed to create endpoint '{endpoint}'"))?;

    tracing::info!(
        endpoint = %endpoint,
        instance_type = %settings.instance_type,
        count = settings.initial_instance_count,
        "Requested endpoint creation"
    );

    Ok(())
}

/// Block until the endpoint reports `InService`.
async fn wait_until_in_service(config: &SdkConfig, endpoint: &str) -> Result<()> {
    let client = aws_sdk_sagemaker::Client::new(config);

    for _ in 0..MAX_POLL_ATTEMPTS {
        let described = client
            .describe_endpoint()
            .endpoint_name(endpoint)
            .send()
            .await
            .with_context(|| format!("Failed to describe endpoint '{endpoint}'"))?;

        match described.endpoint_status() {
            Some(EndpointStatus::InService) => {
                tracing::info!(endpoint = %endpoint, "Endpoint is in service");
                return Ok(());
            }
            Some(EndpointStatus::Failed) => {
                bail!(
                    "Endpoint '{endpoint}' failed to deploy: {}",
                    described.failure_reason().unwrap_or("no failure reason")
                );
            }
            status => {
                tracing::info!(
                    endpoint = %endpoint,
                    status = ?status,
                    "Waiting for endpoint"
                );
            }
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }

    bail!("Endpoint '{endpoint}' did not become in-service in time")
}

/// Issue the fixed smoke-test inference call and return the raw body.
async fn test_prediction(config: &SdkConfig, endpoint: &str) -> Result<String> {
    let client = aws_sdk_sagemakerruntime::Client::new(config);
    let request = QaRequest::new(DEMO_QUESTION, DEMO_CONTEXT);
    let payload = serde_json::to_vec(&request).context("Failed to encode smoke-test payload")?;

    let output = client
        .invoke_endpoint()
        .endpoint_name(endpoint)
        .content_type("application/json")
        .body(Blob::new(payload))
        .send()
        .await
        .with_context(|| format!("Smoke-test inference against '{endpoint}' failed"))?;

    let body = output.body().map(|b| b.as_ref().to_vec()).unwrap_or_default();
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_name_prefix_and_uniqueness() {
        let a = endpoint_name();
        let b = endpoint_name();
        assert!(a.starts_with("bert-qa-dem-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_inference_image_uri() {
        let uri = inference_image_uri("eu-north-1");
        assert_eq!(
            uri,
            "763104351884.dkr.ecr.eu-north-1.amazonaws.com/huggingface-pytorch-inference:1.7.1-transformers4.6.1-cpu-py36-ubuntu18.04"
        );
    }
}
