//! OTLP trace export.

use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::{ServerConfig, observability::ObservabilityConfig};

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    config: &ServerConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let observability = &config.observability;

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(observability.otel_exporter_otlp_endpoint.clone())
        .with_timeout(observability.export_timeout())
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(observability.sample_ratio()))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(observability))
        .with_batch_exporter(exporter)
        .build())
}

fn resource(observability: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(observability.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", observability.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                observability.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

/// Follow the caller's sampling decision; sample new roots at `ratio`.
fn sampler(ratio: f64) -> Sampler {
    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(ratio)))
}
