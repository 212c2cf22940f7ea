//! Structured audit logging and request counters.
//!
//! Audit events are emitted with the `tracing` crate on the
//! `clamgate::audit` target, so any subscriber (JSON file, OpenTelemetry,
//! etc.) can capture them. Counters go to a pluggable [`ScanCounters`] sink.

mod counters;
mod events;

pub use counters::{AtomicCounters, Counter, CounterSnapshot, NoopCounters, ScanCounters};
pub use events::{
    emit_scan_failed, emit_scan_received, emit_short_circuit, emit_verdict, VerdictAuditEvent,
    AUDIT_TARGET,
};
