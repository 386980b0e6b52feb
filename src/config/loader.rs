// Configuration loader
// Reads settings from the process environment with documented defaults

use std::env;

use super::settings::{
    DeploySettings, SyncSettings, DEFAULT_BUCKET_NAME, DEFAULT_PROFILE_NAME, DEFAULT_REGION,
};

/// Profile name for deployment, from `PROFILE_NAME`.
pub fn profile_name() -> String {
    env::var("PROFILE_NAME").unwrap_or_else(|_| DEFAULT_PROFILE_NAME.to_string())
}

/// Whether both static credential variables are present.
///
/// The checkpoint-sync callback refuses to construct without them; see
/// `sync::S3SyncCallback::new`.
pub fn check_aws_credentials() -> bool {
    env::var_os("AWS_ACCESS_KEY_ID").is_some() && env::var_os("AWS_SECRET_ACCESS_KEY").is_some()
}

/// Checkpoint-sync settings, from `AWS_BUCKET_NAME` and `AWS_REGION`.
pub fn sync_settings() -> SyncSettings {
    SyncSettings {
        bucket_name: env::var("AWS_BUCKET_NAME").unwrap_or_else(|_| DEFAULT_BUCKET_NAME.to_string()),
        region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
    }
}

/// Deployment settings from CLI arguments plus the profile environment.
pub fn deploy_settings(
    model_id: String,
    task: String,
    instance_type: String,
    initial_instance_count: i32,
) -> DeploySettings {
    DeploySettings {
        profile_name: profile_name(),
        model_id,
        task,
        instance_type,
        initial_instance_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests in this binary mutate the shared process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_profile_name_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("PROFILE_NAME");
        assert_eq!(profile_name(), "sagemaker");
    }

    #[test]
    fn test_profile_name_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("PROFILE_NAME", "ops");
        assert_eq!(profile_name(), "ops");
        env::remove_var("PROFILE_NAME");
    }

    #[test]
    fn test_sync_settings_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("AWS_BUCKET_NAME");
        env::remove_var("AWS_REGION");
        let settings = sync_settings();
        assert_eq!(settings.bucket_name, "huggingface-checkpoints");
        assert_eq!(settings.region, "eu-north-1");
    }

    #[test]
    fn test_credentials_check_requires_both() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("AWS_ACCESS_KEY_ID");
        env::remove_var("AWS_SECRET_ACCESS_KEY");
        assert!(!check_aws_credentials());

        env::set_var("AWS_ACCESS_KEY_ID", "AKIATEST");
        assert!(!check_aws_credentials());

        env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
        assert!(check_aws_credentials());

        env::remove_var("AWS_ACCESS_KEY_ID");
        env::remove_var("AWS_SECRET_ACCESS_KEY");
    }
}
