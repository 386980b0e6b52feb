// Configuration structs

/// Profile used to resolve the deployment execution role.
pub const DEFAULT_PROFILE_NAME: &str = "sagemaker";

/// Bucket checkpoints are synced to when `AWS_BUCKET_NAME` is unset.
pub const DEFAULT_BUCKET_NAME: &str = "huggingface-checkpoints";

/// Region used for the checkpoint bucket when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "eu-north-1";

/// Settings for the checkpoint-sync callback.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Target bucket name
    pub bucket_name: String,
    /// Region the object-store client is pinned to
    pub region: String,
}

/// Settings for endpoint deployment.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// AWS profile the execution role is resolved from
    pub profile_name: String,
    /// Hub identifier of the pretrained model to host
    pub model_id: String,
    /// Task the hosted model serves
    pub task: String,
    /// Instance type backing the endpoint
    pub instance_type: String,
    /// Number of instances at creation time
    pub initial_instance_count: i32,
}
