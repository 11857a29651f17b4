//! Span export to a local OTLP/JSON file.
//!
//! The plugin runs inside the Zellij sandbox without network access, so spans
//! produced by `tracing` are exported through OpenTelemetry into a rotating
//! file under the data directory:
//!
//! ```text
//! tracing spans → tracing-opentelemetry → JsonFileExporter → listgrid-otlp.json
//! ```
//!
//! The file rotates at 10 MB and keeps three timestamped backups. Each line is
//! one complete OTLP document, so tools that read OTLP/JSON can load it line by
//! line.
//!
//! Verbosity comes from the `trace_level` plugin option (default `"info"`),
//! which accepts any `EnvFilter` directive such as `listgrid::app=debug`.

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use file_writer::{RotatingFile, RotationPolicy};
pub use init::{init_tracing, TRACE_FILE_NAME};
