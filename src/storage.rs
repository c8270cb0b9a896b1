//! Storage collaborator contract.
//!
//! The core does not persist anything itself; it requires these operations
//! from an external store: credential-to-tenant resolution, per-tenant
//! enabled-capability configuration maps, and invocation recording.
//! `MemoryStorage` implements the contract for tests and dev mode.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::StorageError;

// ---------------------------------------------------------------------------
// Tenant
// ---------------------------------------------------------------------------

/// An isolated consumer with its own enabled-capability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
}

// ---------------------------------------------------------------------------
// InvocationRecord
// ---------------------------------------------------------------------------

/// Audit record for one tool call. Text content and structured JSON output
/// are stored separately; exactly one of `output_*`/`error` is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub tenant_id: Uuid,
    /// The credential the caller presented (opaque to the core).
    pub credential: String,
    pub tool_name: String,
    pub arguments: Value,
    pub output_text: Option<Vec<Value>>,
    pub output_json: Option<Value>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Contract the core requires from the external store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Resolve a tenant from an opaque credential. `Ok(None)` means the
    /// credential is unknown.
    async fn tenant_by_credential(&self, credential: &str)
        -> Result<Option<Tenant>, StorageError>;

    /// Enabled tool name -> config blob for one tenant.
    async fn enabled_tool_configs(
        &self,
        tenant_id: Uuid,
    ) -> Result<HashMap<String, Value>, StorageError>;

    /// Enabled resource name -> config blob for one tenant.
    async fn enabled_resource_configs(
        &self,
        tenant_id: Uuid,
    ) -> Result<HashMap<String, Value>, StorageError>;

    /// Persist an audit record for a tool invocation.
    async fn record_invocation(&self, record: InvocationRecord) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    tenants: Vec<Tenant>,
    credentials: HashMap<String, Uuid>,
    tool_configs: HashMap<Uuid, HashMap<String, Value>>,
    resource_configs: HashMap<Uuid, HashMap<String, Value>>,
    invocations: Vec<InvocationRecord>,
}

/// In-memory implementation of the storage contract.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tenant reachable through `credential`.
    pub fn add_tenant(&self, name: &str, credential: &str) -> Tenant {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        let mut inner = self.inner.write();
        inner.credentials.insert(credential.to_string(), tenant.id);
        inner.tenants.push(tenant.clone());
        tenant
    }

    /// Enable a tool for a tenant with the given config blob.
    pub fn enable_tool(&self, tenant_id: Uuid, tool: &str, config: Value) {
        self.inner
            .write()
            .tool_configs
            .entry(tenant_id)
            .or_default()
            .insert(tool.to_string(), config);
    }

    /// Enable a resource for a tenant with the given config blob.
    pub fn enable_resource(&self, tenant_id: Uuid, resource: &str, config: Value) {
        self.inner
            .write()
            .resource_configs
            .entry(tenant_id)
            .or_default()
            .insert(resource.to_string(), config);
    }

    /// Recorded invocations, for test assertions.
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.inner.read().invocations.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn tenant_by_credential(
        &self,
        credential: &str,
    ) -> Result<Option<Tenant>, StorageError> {
        let inner = self.inner.read();
        let id = match inner.credentials.get(credential) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(inner.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn enabled_tool_configs(
        &self,
        tenant_id: Uuid,
    ) -> Result<HashMap<String, Value>, StorageError> {
        Ok(self
            .inner
            .read()
            .tool_configs
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn enabled_resource_configs(
        &self,
        tenant_id: Uuid,
    ) -> Result<HashMap<String, Value>, StorageError> {
        Ok(self
            .inner
            .read()
            .resource_configs
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_invocation(&self, record: InvocationRecord) -> Result<(), StorageError> {
        self.inner.write().invocations.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_tenant_resolution() {
        let storage = MemoryStorage::new();
        let tenant = storage.add_tenant("acme", "key-1");

        let found = storage.tenant_by_credential("key-1").await.unwrap().unwrap();
        assert_eq!(found.id, tenant.id);
        assert!(storage.tenant_by_credential("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_configs_are_per_tenant() {
        let storage = MemoryStorage::new();
        let a = storage.add_tenant("a", "key-a");
        let b = storage.add_tenant("b", "key-b");
        storage.enable_tool(a.id, "core/echo", json!({}));

        assert!(storage
            .enabled_tool_configs(a.id)
            .await
            .unwrap()
            .contains_key("core/echo"));
        assert!(storage.enabled_tool_configs(b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_invocation_appends() {
        let storage = MemoryStorage::new();
        let tenant = storage.add_tenant("a", "key-a");
        storage
            .record_invocation(InvocationRecord {
                tenant_id: tenant.id,
                credential: "key-a".into(),
                tool_name: "core/echo".into(),
                arguments: json!({"message": "hi"}),
                output_text: None,
                output_json: Some(json!({"ok": true})),
                error: None,
                duration_ms: 12,
                at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(storage.invocations().len(), 1);
    }
}
