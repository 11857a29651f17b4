//! Subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the span log inside the data directory.
pub const TRACE_FILE_NAME: &str = "listgrid-otlp.json";

const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber: an `EnvFilter` built from
/// `config.trace_level` (default `"info"`) in front of an OpenTelemetry layer
/// that exports to `<data dir>/listgrid-otlp.json`.
///
/// Does nothing when the data directory cannot be created. Only the first call
/// in a process installs a subscriber; later calls are ignored.
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);

    let data_dir = crate::infrastructure::get_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", "listgrid"),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = tracer::build_provider(data_dir.join(TRACE_FILE_NAME), resource);
    let layer = OpenTelemetryLayer::new(provider.tracer("listgrid"));

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(layer)
        .try_init();
}
