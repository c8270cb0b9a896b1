//! Protocol dispatcher.
//!
//! Turns one inbound JSON-RPC unit into registry lookups, cache-first
//! config reads, and queue submissions, and renders the outcome as a
//! well-formed envelope. Every failure on every path is converted here; no
//! raw error ever reaches the transport.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};

use crate::cache::{ConfigKind, ConfigSnapshot};
use crate::context::AppContext;
use crate::errors::McpError;
use crate::protocol::{self, JsonRpcRequest};
use crate::storage::{InvocationRecord, Tenant};
use crate::tools::ToolResult;

/// Per-process dispatcher over the shared application context.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<AppContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Handle one raw request body.
    ///
    /// Returns `None` for notifications (no response body is emitted) and a
    /// complete JSON-RPC envelope for everything else, including parse
    /// failures.
    pub async fn dispatch(&self, credential: &str, body: &[u8]) -> Option<Value> {
        let request = match JsonRpcRequest::parse(body) {
            Ok(request) => request,
            Err(e) => return Some(protocol::error_from(None, &e)),
        };
        log::info!("processing method: {}", request.method);

        if request.method == "notifications/initialized" {
            log::debug!("received initialized notification");
            return None;
        }

        let id = request.id.clone();
        let outcome = self.handle(&request, credential).await;
        Some(match outcome {
            Ok(result) => protocol::success(id, result),
            Err(e) => {
                log::debug!("method '{}' failed: {e}", request.method);
                protocol::error_from(id, &e)
            }
        })
    }

    /// Capability-discovery document (served for transport-level GETs).
    pub fn discovery(&self) -> Value {
        protocol::server_capabilities(&self.ctx.config.server_name)
    }

    async fn handle(&self, request: &JsonRpcRequest, credential: &str) -> Result<Value, McpError> {
        match request.method.as_str() {
            "initialize" => Ok(self.discovery()),
            "ping" => Ok(json!({})),
            "resources/list" => self.resources_list(credential).await,
            "resources/read" => self.resources_read(request, credential).await,
            "tools/list" => self.tools_list(credential).await,
            "tools/call" => self.tools_call(request, credential).await,
            "prompts/list" => Ok(json!({ "prompts": [] })),
            "logging/setLevel" => Ok(json!({})),
            "completion/complete" => Ok(json!({
                "completion": { "values": [], "total": 0, "hasMore": false }
            })),
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Tenant resolution and config read-through
    // -----------------------------------------------------------------------

    async fn resolve_tenant(&self, credential: &str) -> Result<Tenant, McpError> {
        self.ctx
            .storage
            .tenant_by_credential(credential)
            .await?
            .ok_or(McpError::InvalidCredential)
    }

    /// Cache-first config lookup; a miss fetches from storage and
    /// populates the cache before returning.
    async fn tenant_configs(
        &self,
        tenant: &Tenant,
        kind: ConfigKind,
    ) -> Result<ConfigSnapshot, McpError> {
        if let Some(snapshot) = self.ctx.cache.get(tenant.id, kind) {
            return Ok(snapshot);
        }
        let snapshot = match kind {
            ConfigKind::Tools => self.ctx.storage.enabled_tool_configs(tenant.id).await?,
            ConfigKind::Resources => self.ctx.storage.enabled_resource_configs(tenant.id).await?,
        };
        self.ctx.cache.set(tenant.id, kind, snapshot.clone());
        Ok(snapshot)
    }

    // -----------------------------------------------------------------------
    // Resource methods
    // -----------------------------------------------------------------------

    async fn resources_list(&self, credential: &str) -> Result<Value, McpError> {
        let tenant = self.resolve_tenant(credential).await?;
        let configs = self.tenant_configs(&tenant, ConfigKind::Resources).await?;
        log::debug!(
            "listing resources for tenant {}, enabled: {:?}",
            tenant.name,
            configs.keys().collect::<Vec<_>>()
        );
        let resources = self.ctx.resources.list_enabled(&configs).await;
        Ok(json!({ "resources": resources }))
    }

    async fn resources_read(
        &self,
        request: &JsonRpcRequest,
        credential: &str,
    ) -> Result<Value, McpError> {
        let uri = request.require_str_param("uri")?.to_string();
        let tenant = self.resolve_tenant(credential).await?;
        let configs = self.tenant_configs(&tenant, ConfigKind::Resources).await?;

        let (name, resource) = self
            .ctx
            .resources
            .resolve_by_uri(&uri)
            .ok_or_else(|| McpError::CapabilityNotFound(uri.clone()))?;
        let config = configs
            .get(&name)
            .ok_or_else(|| McpError::NotConfiguredForTenant(name.clone()))?;

        let content = resource
            .read(&uri, Some(config))
            .await
            .map_err(|e| McpError::ExecutionFailure(e.to_string()))?;
        match content {
            Some(content) => Ok(json!({ "contents": [content.to_wire()] })),
            None => Err(McpError::ExecutionFailure(format!(
                "resource not found or not accessible: {uri}"
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Tool methods
    // -----------------------------------------------------------------------

    async fn tools_list(&self, credential: &str) -> Result<Value, McpError> {
        let tenant = self.resolve_tenant(credential).await?;
        let configs = self.tenant_configs(&tenant, ConfigKind::Tools).await?;
        let mut enabled: Vec<String> = configs.keys().cloned().collect();
        enabled.sort();
        log::debug!("listing tools for tenant {}, enabled: {enabled:?}", tenant.name);
        let tools = self.ctx.tools.list_schemas(&enabled);
        Ok(json!({ "tools": tools }))
    }

    async fn tools_call(
        &self,
        request: &JsonRpcRequest,
        credential: &str,
    ) -> Result<Value, McpError> {
        let tenant = self.resolve_tenant(credential).await?;
        let name = request.require_str_param("name")?.to_string();
        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let configs = self.tenant_configs(&tenant, ConfigKind::Tools).await?;
        // Enablement is presence in the tenant's config map; a tool can be
        // globally registered yet rejected here.
        let config = configs
            .get(&name)
            .ok_or_else(|| McpError::NotConfiguredForTenant(name.clone()))?
            .clone();
        let tool = self
            .ctx
            .tools
            .get(&name)
            .ok_or_else(|| McpError::CapabilityNotFound(name.clone()))?;
        if !tool.validate_arguments(&arguments) {
            return Err(McpError::InvalidArguments(format!(
                "invalid arguments for tool '{name}'"
            )));
        }

        let started = Instant::now();
        let outcome = self
            .ctx
            .queue
            .submit(tool, arguments.clone(), Some(config))
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        self.ctx.audit.record(invocation_record(
            &tenant,
            credential,
            &name,
            arguments,
            &outcome,
            duration_ms,
        ));

        let result = outcome?;
        if result.is_error {
            return Err(McpError::ExecutionFailure(
                result
                    .first_text()
                    .unwrap_or("Tool execution failed")
                    .to_string(),
            ));
        }

        let mut body = json!({ "content": result.content });
        if let Some(structured) = result.structured_content {
            body["structuredContent"] = structured;
        }
        Ok(body)
    }
}

/// Build the audit record for a completed (or failed) tool call.
fn invocation_record(
    tenant: &Tenant,
    credential: &str,
    tool_name: &str,
    arguments: Value,
    outcome: &Result<ToolResult, McpError>,
    duration_ms: u64,
) -> InvocationRecord {
    let (output_text, output_json, error) = match outcome {
        Ok(result) if !result.is_error => {
            if result.structured_content.is_some() {
                (None, result.structured_content.clone(), None)
            } else {
                (Some(result.content.clone()), None, None)
            }
        }
        Ok(result) => (
            None,
            None,
            Some(
                result
                    .first_text()
                    .unwrap_or("Tool execution failed")
                    .to_string(),
            ),
        ),
        Err(e) => (None, None, Some(e.to_string())),
    };
    InvocationRecord {
        tenant_id: tenant.id,
        credential: credential.to_string(),
        tool_name: tool_name.to_string(),
        arguments,
        output_text,
        output_json,
        error,
        duration_ms,
        at: Utc::now(),
    }
}
