//! Tool registry.
//!
//! Holds one singleton instance per registered tool and answers name
//! lookups, per-tenant schema listings, and config-schema queries. The map
//! is read-mostly: writes happen during startup registration, reads on
//! every request, so a `parking_lot::RwLock` fits.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::errors::ExecError;
use crate::tools::{Tool, ToolSchema};

/// Registry for managing and naming tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool instance, optionally under a custom (namespaced)
    /// name such as `core/echo`. A name collision logs a warning and
    /// overwrites the previous registration.
    pub fn register(&self, tool: Arc<dyn Tool>, custom_name: Option<&str>) {
        let name = custom_name.unwrap_or_else(|| tool.name()).to_string();
        let mut tools = self.tools.write();
        if tools.contains_key(&name) {
            log::warn!("tool '{name}' already registered, overwriting");
        }
        tools.insert(name, tool);
    }

    /// Register every tool produced by a factory table.
    ///
    /// A factory that fails is logged and skipped; it never aborts
    /// registration of the remaining entries.
    pub fn register_all<'a, I>(&self, factories: I)
    where
        I: IntoIterator<Item = (&'a str, fn() -> Result<Arc<dyn Tool>, ExecError>)>,
    {
        let mut registered = 0usize;
        for (name, factory) in factories {
            match factory() {
                Ok(tool) => {
                    self.register(tool, Some(name));
                    registered += 1;
                    log::debug!("registered tool: {name}");
                }
                Err(e) => {
                    log::warn!("skipping tool '{name}': failed to construct: {e}");
                }
            }
        }
        log::info!("registered {registered} tools");
    }

    /// Look up a tool by its registered name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Schemas for the intersection of the registry and `enabled` names,
    /// in the order given. Unknown enabled names are logged and skipped.
    /// Namespaced registrations report the namespaced name.
    pub fn list_schemas(&self, enabled: &[String]) -> Vec<ToolSchema> {
        let tools = self.tools.read();
        let mut schemas = Vec::new();
        for name in enabled {
            match tools.get(name) {
                Some(tool) => {
                    let mut schema = tool.schema();
                    if name.contains('/') {
                        schema.name = name.clone();
                    }
                    schemas.push(schema);
                }
                None => log::warn!("enabled tool '{name}' not found in registry"),
            }
        }
        schemas
    }

    /// Configuration schema for a registered tool, `None` if the tool is
    /// unknown or takes no configuration.
    pub fn config_schema(&self, name: &str) -> Option<Value> {
        self.tools.read().get(name).and_then(|t| t.config_schema())
    }

    /// Configuration schemas for every registered tool.
    pub fn config_schemas(&self) -> HashMap<String, Option<Value>> {
        self.tools
            .read()
            .iter()
            .map(|(name, tool)| (name.clone(), tool.config_schema()))
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::{CalculatorTool, EchoTool};

    fn enabled(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool), None);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_overwrite_keeps_latest_registration() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool), Some("core/echo"));
        registry.register(Arc::new(CalculatorTool), Some("core/echo"));
        assert_eq!(registry.len(), 1);
        let tool = registry.get("core/echo").unwrap();
        assert_eq!(tool.name(), "calculator");
    }

    #[test]
    fn test_list_schemas_filters_to_enabled_set() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool), None);
        registry.register(Arc::new(CalculatorTool), None);

        let schemas = registry.list_schemas(&enabled(&["echo"]));
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "echo");
    }

    #[test]
    fn test_list_schemas_skips_unknown_names() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool), None);

        // An unknown enabled name is skipped, never an error.
        let schemas = registry.list_schemas(&enabled(&["echo", "ghost"]));
        assert_eq!(schemas.len(), 1);
    }

    #[test]
    fn test_namespaced_registration_reports_full_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool), Some("acme/echo"));

        let schemas = registry.list_schemas(&enabled(&["acme/echo"]));
        assert_eq!(schemas[0].name, "acme/echo");
    }

    /// Tool that declares a per-tenant config schema.
    struct ApiKeyTool;

    #[async_trait::async_trait]
    impl Tool for ApiKeyTool {
        fn name(&self) -> &str {
            "api_key"
        }
        fn description(&self) -> &str {
            "requires a per-tenant API key"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        fn config_schema(&self) -> Option<Value> {
            Some(serde_json::json!({
                "type": "object",
                "properties": { "apiKey": { "type": "string" } },
                "required": ["apiKey"]
            }))
        }
        async fn execute(
            &self,
            _arguments: &Value,
            _config: Option<&Value>,
        ) -> Result<crate::tools::ToolResult, ExecError> {
            Ok(crate::tools::ToolResult::text("ok"))
        }
    }

    #[test]
    fn test_config_schema_lookup() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(ApiKeyTool), Some("core/api_key"));
        registry.register(Arc::new(EchoTool), Some("core/echo"));

        let schema = registry.config_schema("core/api_key").unwrap();
        assert_eq!(schema["required"][0], "apiKey");
        // A tool without configuration reports None, as does an unknown name.
        assert!(registry.config_schema("core/echo").is_none());
        assert!(registry.config_schema("ghost").is_none());
    }

    #[test]
    fn test_config_schemas_lists_every_registration() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(ApiKeyTool), Some("core/api_key"));
        registry.register(Arc::new(EchoTool), Some("core/echo"));

        let schemas = registry.config_schemas();
        assert_eq!(schemas.len(), 2);
        assert!(schemas["core/api_key"].is_some());
        assert!(schemas["core/echo"].is_none());
    }

    #[test]
    fn test_register_all_skips_failed_factory() {
        fn good() -> Result<Arc<dyn Tool>, ExecError> {
            Ok(Arc::new(EchoTool))
        }
        fn bad() -> Result<Arc<dyn Tool>, ExecError> {
            Err("missing dependency".into())
        }

        let registry = ToolRegistry::new();
        registry.register_all([
            ("core/echo", good as fn() -> Result<Arc<dyn Tool>, ExecError>),
            ("core/broken", bad),
        ]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("core/echo").is_some());
    }
}
