//! Tracer provider backed by a local OTLP/JSON file.

use super::file_writer::{RotatingFile, RotationPolicy};
use super::span_formatter::OtlpJsonEncoder;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;

/// Writes every exported batch as one JSON line.
struct JsonFileExporter {
    file: RotatingFile,
    encoder: OtlpJsonEncoder,
    closed: bool,
}

impl JsonFileExporter {
    fn new(path: PathBuf, resource: &Resource) -> Self {
        Self {
            file: RotatingFile::new(path, RotationPolicy::default()),
            encoder: OtlpJsonEncoder::new(resource),
            closed: false,
        }
    }

    fn write_batch(&self, batch: &[SpanData]) -> ExportResult {
        if self.closed {
            return Err(TraceError::from("exporter is shut down"));
        }
        let line = self.encoder.encode(batch).to_string();
        self.file
            .write_line(&line)
            .map_err(|e| TraceError::from(e.to_string()))
    }
}

impl SpanExporter for JsonFileExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = self.write_batch(&batch);
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }
}

impl std::fmt::Debug for JsonFileExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileExporter")
            .field("file", &self.file)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Builds a provider that exports spans synchronously to `path`.
#[must_use]
pub fn build_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonFileExporter::new(path, &resource);
    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
