//! Best-effort audit logging of tool invocations.
//!
//! Records flow through an unbounded channel to an independent task that
//! writes them via the storage collaborator. Delivery is decoupled from the
//! request path: a full shutdown or a storage failure is logged and never
//! affects the caller's result.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::storage::{InvocationRecord, Storage};

/// Handle to the background audit recorder.
#[derive(Clone)]
pub struct AuditLog {
    tx: mpsc::UnboundedSender<InvocationRecord>,
}

impl AuditLog {
    /// Spawn the recorder task and return the sending handle.
    pub fn spawn(storage: Arc<dyn Storage>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<InvocationRecord>();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let tool_name = record.tool_name.clone();
                if let Err(e) = storage.record_invocation(record).await {
                    log::error!("failed to record invocation of '{tool_name}': {e}");
                } else {
                    log::debug!("recorded invocation of '{tool_name}'");
                }
            }
        });
        Self { tx }
    }

    /// Queue a record for persistence. Fire-and-forget.
    pub fn record(&self, record: InvocationRecord) {
        if self.tx.send(record).is_err() {
            log::warn!("audit channel closed, dropping invocation record");
        }
    }
}
