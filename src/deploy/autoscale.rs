// Endpoint autoscaling registration
//
// Registers the endpoint variant as a scalable target and attaches a
// target-tracking policy on average CPU utilization.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_applicationautoscaling::types::{
    CustomizedMetricSpecification, MetricDimension, MetricStatistic, PolicyType,
    ScalableDimension, ServiceNamespace, TargetTrackingScalingPolicyConfiguration,
};

/// Variant name assigned by endpoint creation; autoscaling is keyed to it.
pub const VARIANT_NAME: &str = "AllTraffic";

/// Instance-count bounds for the scalable target.
pub const MIN_CAPACITY: i32 = 1;
pub const MAX_CAPACITY: i32 = 4;

/// Target average CPU utilization, in percent.
pub const CPU_TARGET_PERCENT: f64 = 50.0;

/// Cooldowns between scaling activities, in seconds.
pub const SCALE_IN_COOLDOWN_SECS: i32 = 300;
pub const SCALE_OUT_COOLDOWN_SECS: i32 = 100;

/// Scalable resource id for an endpoint's traffic variant.
pub fn resource_id(endpoint_name: &str) -> String {
    format!("endpoint/{endpoint_name}/variant/{VARIANT_NAME}")
}

/// Name of the scaling policy attached to an endpoint.
pub fn policy_name(endpoint_name: &str) -> String {
    format!("CPUUtilization-ScalingPolicy-{endpoint_name}")
}

/// Register the endpoint for autoscaling and attach the CPU policy.
pub async fn autoscale_endpoint(config: &SdkConfig, endpoint_name: &str) -> Result<()> {
    let client = aws_sdk_applicationautoscaling::Client::new(config);
    let resource_id = resource_id(endpoint_name);
    let dimension = ScalableDimension::from("sagemaker:variant:DesiredInstanceCount");

    client
        .register_scalable_target()
        .service_namespace(ServiceNamespace::Sagemaker)
        .resource_id(&resource_id)
        .scalable_dimension(dimension.clone())
        .min_capacity(MIN_CAPACITY)
        .max_capacity(MAX_CAPACITY)
        .send()
        .await
        .with_context(|| format!("Failed to register scalable target for '{endpoint_name}'"))?;

    let metric = CustomizedMetricSpecification::builder()
        .metric_name("CPUUtilization")
        .namespace("/aws/sagemaker/Endpoints")
        .dimensions(
            MetricDimension::builder()
                .name("EndpointName")
                .value(endpoint_name)
                .build()?,
        )
        .dimensions(
            MetricDimension::builder()
                .name("VariantName")
                .value(VARIANT_NAME)
                .build()?,
        )
        .statistic(MetricStatistic::Average)
        .unit("Percent")
        .build();

    let tracking = TargetTrackingScalingPolicyConfiguration::builder()
        .target_value(CPU_TARGET_PERCENT)
        .customized_metric_specification(metric)
        .scale_in_cooldown(SCALE_IN_COOLDOWN_SECS)
        .scale_out_cooldown(SCALE_OUT_COOLDOWN_SECS)
        .build()?;

    client
        .put_scaling_policy()
        .policy_name(policy_name(endpoint_name))
        .service_namespace(ServiceNamespace::Sagemaker)
        .resource_id(&resource_id)
        .scalable_dimension(dimension)
        .policy_type(PolicyType::TargetTrackingScaling)
        .target_tracking_scaling_policy_configuration(tracking)
        .send()
        .await
        .with_context(|| format!("Failed to attach scaling policy for '{endpoint_name}'"))?;

    tracing::info!(
        endpoint = %endpoint_name,
        min = MIN_CAPACITY,
        max = MAX_CAPACITY,
        target = CPU_TARGET_PERCENT,
        "Registered CPU target-tracking autoscaling"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_format() {
        assert_eq!(
            resource_id("bert-qa-dem-1234"),
            "endpoint/bert-qa-dem-1234/variant/AllTraffic"
        );
    }

    #[test]
    fn test_policy_name_format() {
        assert_eq!(
            policy_name("bert-qa-dem-1234"),
            "CPUUtilization-ScalingPolicy-bert-qa-dem-1234"
        );
    }

    #[test]
    fn test_capacity_bounds() {
        assert_eq!(MIN_CAPACITY, 1);
        assert_eq!(MAX_CAPACITY, 4);
        assert_eq!(SCALE_IN_COOLDOWN_SECS, 300);
        assert_eq!(SCALE_OUT_COOLDOWN_SECS, 100);
    }
}
