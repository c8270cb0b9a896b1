//! Builtin `docs` resource and the default registration table.
//!
//! `DocsResource` serves documents declared directly in the tenant's
//! configuration blob, which makes it useful both as a demo and as the
//! reference implementation of a config-driven resource.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::ExecError;
use crate::resources::{Resource, ResourceContent, ResourceDescriptor, ResourceRegistry};

/// Resource serving inline documents from tenant configuration.
///
/// Config shape:
/// `{"entries": [{"id": "...", "name": "...", "text": "...", "description"?, "mimeType"?}]}`.
/// Each entry is exposed as `docs://{id}`.
#[derive(Debug, Clone, Copy)]
pub struct DocsResource;

impl DocsResource {
    fn entries(config: Option<&Value>) -> Vec<Value> {
        config
            .and_then(|c| c.get("entries"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    fn entry_uri(entry: &Value) -> Option<String> {
        entry
            .get("id")
            .and_then(Value::as_str)
            .map(|id| format!("docs://{id}"))
    }
}

#[async_trait]
impl Resource for DocsResource {
    fn name(&self) -> &str {
        "docs"
    }

    fn description(&self) -> &str {
        "Inline documents from tenant configuration"
    }

    fn uri_scheme(&self) -> &str {
        "docs"
    }

    fn config_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "entries": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "text": { "type": "string" },
                            "description": { "type": "string" },
                            "mimeType": { "type": "string" }
                        },
                        "required": ["id", "name", "text"]
                    }
                }
            },
            "required": ["entries"]
        }))
    }

    async fn list(&self, config: Option<&Value>) -> Result<Vec<ResourceDescriptor>, ExecError> {
        let descriptors = Self::entries(config)
            .iter()
            .filter_map(|entry| {
                let uri = Self::entry_uri(entry)?;
                let name = entry.get("name").and_then(Value::as_str)?;
                Some(ResourceDescriptor {
                    uri,
                    name: name.to_string(),
                    description: entry
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    mime_type: entry
                        .get("mimeType")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            })
            .collect();
        Ok(descriptors)
    }

    async fn read(
        &self,
        uri: &str,
        config: Option<&Value>,
    ) -> Result<Option<ResourceContent>, ExecError> {
        for entry in Self::entries(config) {
            if Self::entry_uri(&entry).as_deref() == Some(uri) {
                let text = entry.get("text").and_then(Value::as_str).unwrap_or_default();
                let mime_type = entry
                    .get("mimeType")
                    .and_then(Value::as_str)
                    .unwrap_or("text/plain");
                return Ok(Some(ResourceContent::text(uri, mime_type, text)));
            }
        }
        Ok(None)
    }
}

/// Static registration table for the builtin resources.
pub fn default_resources() -> Vec<(&'static str, fn() -> Result<Arc<dyn Resource>, ExecError>)> {
    fn docs() -> Result<Arc<dyn Resource>, ExecError> {
        Ok(Arc::new(DocsResource))
    }
    vec![("core/docs", docs)]
}

/// Register the builtin resource set into a registry.
pub fn register_defaults(registry: &ResourceRegistry) {
    registry.register_all(default_resources());
}
