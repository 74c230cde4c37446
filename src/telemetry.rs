/// Custom event tracking, kept separate from log lines
use crate::types::TelemetryEvent;
use mockall::automock;
use std::sync::Arc;
use tracing::{info, warn};

#[automock]
pub trait TelemetrySink: Send + Sync {
    fn track_event(&self, event: TelemetryEvent);
}

/// Emits events as structured records on the `telemetry` target
#[derive(Debug, Default, Clone)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn track_event(&self, event: TelemetryEvent) {
        match serde_json::to_string(&event.properties) {
            Ok(properties) => info!(
                target: "telemetry",
                event_name = %event.name,
                properties = %properties,
                "Custom event"
            ),
            Err(e) => warn!(
                target: "telemetry",
                event_name = %event.name,
                error = %e,
                "Failed to encode event properties"
            ),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn track_event(&self, _event: TelemetryEvent) {}
}

pub fn create_telemetry_sink(enabled: bool) -> Arc<dyn TelemetrySink> {
    if enabled {
        Arc::new(TracingTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    }
}
