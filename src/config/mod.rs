// Configuration module
// Public interface for environment-driven settings

mod loader;
mod settings;

pub use loader::{check_aws_credentials, deploy_settings, profile_name, sync_settings};
pub use settings::{
    DeploySettings, SyncSettings, DEFAULT_BUCKET_NAME, DEFAULT_PROFILE_NAME, DEFAULT_REGION,
};
