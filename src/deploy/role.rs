// Execution role resolution
//
// The deployment flow authenticates through a named shared-config profile and
// derives the IAM role SageMaker will assume from the caller identity.

use anyhow::{bail, Context, Result};
use aws_config::BehaviorVersion;
use aws_config::SdkConfig;

/// Load shared config for the named profile.
///
/// Propagates the provider error if the profile or its credentials are
/// absent; the first remote call surfaces permission problems.
pub async fn load_profile_config(profile_name: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile_name)
        .load()
        .await
}

/// Resolve the execution role ARN for the profile's caller identity.
pub async fn resolve_execution_role(config: &SdkConfig, profile_name: &str) -> Result<String> {
    let sts = aws_sdk_sts::Client::new(config);

    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .with_context(|| format!("Failed to resolve caller identity for profile '{profile_name}'"))?;

    let arn = identity
        .arn()
        .context("Caller identity did not include an ARN")?;

    role_arn_from_identity(arn)
}

/// Map a caller-identity ARN onto the IAM role ARN it represents.
///
/// An assumed-role identity `arn:aws:sts::{acct}:assumed-role/{role}/{session}`
/// maps to `arn:aws:iam::{acct}:role/{role}`; a plain role ARN passes through.
/// Anything else (an IAM user, root) cannot serve as an execution role.
pub fn role_arn_from_identity(arn: &str) -> Result<String> {
    if arn.contains(":role/") {
        return Ok(arn.to_string());
    }

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if let ["arn", _partition, "sts", _, account, resource] = parts.as_slice() {
        if let Some(rest) = resource.strip_prefix("assumed-role/") {
            let role_name = match rest.split_once('/') {
                Some((name, _session)) => name,
                None => rest,
            };
            return Ok(format!("arn:aws:iam::{account}:role/{role_name}"));
        }
    }

    bail!("Caller identity '{arn}' is not a role; configure the profile with a role")
}
