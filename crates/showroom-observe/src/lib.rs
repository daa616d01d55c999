//! Observability setup for Showroom: the tracing subscriber and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
