//! Audit event types and emission functions.

use crate::core::{Fingerprint, ScanError, ScanVerdict};
use crate::magic::MagicSignature;

use serde::{Deserialize, Serialize};

/// Target every audit event is emitted on.
pub const AUDIT_TARGET: &str = "clamgate::audit";

/// Serializable record of a finished scan, for subscribers that persist
/// audit trails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Correlation ID of the request.
    pub request_id: String,

    /// Outcome: `clean`, `infected` or `skipped_trusted`.
    pub outcome: String,

    /// Signature name, if infected.
    pub signature: Option<String>,

    /// Filename reported in the verdict.
    pub filename: String,

    /// Content hash.
    pub sha256: String,

    /// Content size in bytes.
    pub filesize: u64,

    /// Engine time in milliseconds.
    pub duration_ms: u64,
}

impl VerdictAuditEvent {
    /// Builds the audit record for a verdict.
    pub fn from_verdict(request_id: &str, verdict: &ScanVerdict) -> Self {
        Self {
            event_type: "scan_completed".to_string(),
            request_id: request_id.to_string(),
            outcome: verdict.classification.to_string(),
            signature: (!verdict.signature_name.is_empty())
                .then(|| verdict.signature_name.clone()),
            filename: verdict.filename.clone(),
            sha256: verdict.content_hash.clone(),
            filesize: verdict.file_size,
            duration_ms: verdict.duration_millis,
        }
    }
}

/// Emits an audit event for an accepted request.
pub fn emit_scan_received(request_id: &str, filename: &str, fingerprint: &Fingerprint) {
    tracing::info!(
        target: AUDIT_TARGET,
        event_type = "scan_received",
        request_id = %request_id,
        filename = %filename,
        filesize = fingerprint.size,
        sha256 = %fingerprint.sha256,
        "Scan received"
    );
}

/// Emits an audit event for a whitelist short-circuit.
pub fn emit_short_circuit(request_id: &str, fingerprint: &Fingerprint, signature: &MagicSignature) {
    tracing::info!(
        target: AUDIT_TARGET,
        event_type = "scan_short_circuited",
        request_id = %request_id,
        sha256 = %fingerprint.sha256,
        magic = %signature,
        "Scan blacklist"
    );
}

/// Emits an audit event for a completed scan.
///
/// Infected verdicts are logged at `warn`, everything else at `info`.
pub fn emit_verdict(request_id: &str, verdict: &ScanVerdict) {
    let event = VerdictAuditEvent::from_verdict(request_id, verdict);

    if verdict.is_infected() {
        tracing::warn!(
            target: AUDIT_TARGET,
            event_type = %event.event_type,
            request_id = %event.request_id,
            outcome = %event.outcome,
            signature = ?event.signature,
            filename = %event.filename,
            sha256 = %event.sha256,
            filesize = event.filesize,
            duration_ms = event.duration_ms,
            "Positive scan"
        );
    } else {
        tracing::info!(
            target: AUDIT_TARGET,
            event_type = %event.event_type,
            request_id = %event.request_id,
            outcome = %event.outcome,
            filename = %event.filename,
            sha256 = %event.sha256,
            filesize = event.filesize,
            duration_ms = event.duration_ms,
            "Negative scan"
        );
    }
}

/// Emits an audit event for a request the pipeline gave up on.
pub fn emit_scan_failed(request_id: &str, error: &ScanError) {
    tracing::error!(
        target: AUDIT_TARGET,
        event_type = "scan_failed",
        request_id = %request_id,
        error_kind = ?error.kind(),
        engine = ?error.engine(),
        error = %error,
        "Scan failed"
    );
}
