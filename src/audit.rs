//! Fire-and-forget audit events.
//!
//! Audit storage lives elsewhere; the engines only hand events to an [`AuditPort`].
//! A failing audit sink never fails the request.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Action recorded after the quality gate accepts a record
pub const ACTION_QUALITY_GATE_PASSED: &str = "quality_gate_passed";

/// Action recorded for every demographic lookup by NHS number
pub const ACTION_DEMOGRAPHIC_LOOKUP: &str = "demographic_lookup";

pub type AuditMetadata = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audit sink failed: {0}")]
pub struct AuditError(pub String);

#[async_trait]
pub trait AuditPort: Send + Sync {
    async fn log(&self, action: &str, metadata: AuditMetadata) -> Result<(), AuditError>;
}

/// Writes audit events to the `pds_match::audit` tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditPort for TracingAuditSink {
    async fn log(&self, action: &str, metadata: AuditMetadata) -> Result<(), AuditError> {
        let metadata = serde_json::to_string(&metadata).map_err(|e| AuditError(e.to_string()))?;
        tracing::info!(target: "pds_match::audit", action, %metadata, "audit");
        Ok(())
    }
}

/// Send an event, downgrading sink failures to a warning
pub async fn record(audit: &dyn AuditPort, action: &str, metadata: AuditMetadata) {
    if let Err(e) = audit.log(action, metadata).await {
        tracing::warn!("Dropping audit event '{}': {}", action, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuditPort for FailingSink {
        async fn log(&self, _action: &str, _metadata: AuditMetadata) -> Result<(), AuditError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuditError("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_record_swallows_sink_failure() {
        let sink = FailingSink {
            calls: AtomicUsize::new(0),
        };
        record(&sink, ACTION_QUALITY_GATE_PASSED, AuditMetadata::new()).await;
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_events() {
        let mut metadata = AuditMetadata::new();
        metadata.insert("nhs_number".to_string(), "redacted".to_string());
        assert!(TracingAuditSink
            .log(ACTION_DEMOGRAPHIC_LOOKUP, metadata)
            .await
            .is_ok());
    }
}
