//! Resource capability system.
//!
//! Resources are the readable/listable counterpart to tools: each resource
//! type owns a URI scheme, lists the entries available under a tenant's
//! configuration, and serves individual reads by URI.

pub mod builtin;
pub mod registry;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ExecError;

// ---------------------------------------------------------------------------
// ResourceDescriptor
// ---------------------------------------------------------------------------

/// One listable resource entry, as exposed to protocol clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

// ---------------------------------------------------------------------------
// ResourceContent
// ---------------------------------------------------------------------------

/// Content of a single resource read.
#[derive(Debug, Clone)]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: Option<String>,
    pub blob: Option<Vec<u8>>,
}

impl ResourceContent {
    /// Text content with the given MIME type.
    pub fn text(uri: impl Into<String>, mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            text: Some(text.into()),
            blob: None,
        }
    }

    /// Wire form: blobs are base64-encoded, absent fields omitted.
    pub fn to_wire(&self) -> Value {
        let mut out = serde_json::json!({
            "uri": self.uri,
            "mimeType": self.mime_type,
        });
        if let Some(text) = &self.text {
            out["text"] = Value::String(text.clone());
        }
        if let Some(blob) = &self.blob {
            out["blob"] = Value::String(base64::engine::general_purpose::STANDARD.encode(blob));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Resource trait
// ---------------------------------------------------------------------------

/// A readable/listable capability bound to a URI scheme.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Unique resource name (unqualified; the registry may namespace it).
    fn name(&self) -> &str;

    /// Description shown to protocol clients.
    fn description(&self) -> &str;

    /// URI scheme this resource answers for, e.g. `docs`.
    fn uri_scheme(&self) -> &str;

    /// JSON Schema for the per-tenant configuration, or `None`.
    fn config_schema(&self) -> Option<Value> {
        None
    }

    /// Whether this resource requires per-tenant configuration.
    fn requires_config(&self) -> bool {
        self.config_schema().is_some()
    }

    /// List the entries available under the given tenant configuration.
    async fn list(&self, config: Option<&Value>) -> Result<Vec<ResourceDescriptor>, ExecError>;

    /// Read one entry by URI. `Ok(None)` means the URI does not resolve
    /// under this configuration.
    async fn read(
        &self,
        uri: &str,
        config: Option<&Value>,
    ) -> Result<Option<ResourceContent>, ExecError>;

    /// Whether this resource can answer for the given URI.
    fn handles_uri(&self, uri: &str) -> bool {
        uri.starts_with(&format!("{}://", self.uri_scheme()))
    }
}

pub use registry::ResourceRegistry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_wire_form_encodes_blob() {
        let content = ResourceContent {
            uri: "docs://a".into(),
            mime_type: "application/octet-stream".into(),
            text: None,
            blob: Some(vec![1, 2, 3]),
        };
        let wire = content.to_wire();
        assert_eq!(wire["mimeType"], "application/octet-stream");
        assert_eq!(wire["blob"], "AQID");
        assert!(wire.get("text").is_none());
    }

    #[test]
    fn test_content_wire_form_text() {
        let wire = ResourceContent::text("docs://a", "text/plain", "hi").to_wire();
        assert_eq!(wire["text"], "hi");
        assert!(wire.get("blob").is_none());
    }

    #[test]
    fn test_descriptor_serializes_mime_type_alias() {
        let descriptor = ResourceDescriptor {
            uri: "docs://a".into(),
            name: "a".into(),
            description: "doc".into(),
            mime_type: Some("text/plain".into()),
        };
        let wire = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(wire["mimeType"], "text/plain");

        let bare = ResourceDescriptor {
            mime_type: None,
            ..descriptor
        };
        assert!(serde_json::to_value(&bare).unwrap().get("mimeType").is_none());
    }
}
