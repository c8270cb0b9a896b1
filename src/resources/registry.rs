//! Resource registry.
//!
//! Same shape as the tool registry, plus URI-scheme resolution: a read
//! request is routed to the first registered resource whose scheme matches
//! the URI, so registration order is preserved.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::errors::ExecError;
use crate::resources::{Resource, ResourceDescriptor};

#[derive(Default)]
struct Inner {
    resources: HashMap<String, Arc<dyn Resource>>,
    /// Registration order, for first-match URI resolution.
    order: Vec<String>,
}

/// Registry for managing and naming resources.
#[derive(Default)]
pub struct ResourceRegistry {
    inner: RwLock<Inner>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource instance, optionally under a custom (namespaced)
    /// name. A collision logs a warning and overwrites in place, keeping
    /// the original resolution position.
    pub fn register(&self, resource: Arc<dyn Resource>, custom_name: Option<&str>) {
        let name = custom_name.unwrap_or_else(|| resource.name()).to_string();
        let mut inner = self.inner.write();
        if inner.resources.insert(name.clone(), resource).is_some() {
            log::warn!("resource '{name}' already registered, overwriting");
        } else {
            inner.order.push(name);
        }
    }

    /// Register every resource produced by a factory table; failures are
    /// logged and skipped.
    pub fn register_all<'a, I>(&self, factories: I)
    where
        I: IntoIterator<Item = (&'a str, fn() -> Result<Arc<dyn Resource>, ExecError>)>,
    {
        let mut registered = 0usize;
        for (name, factory) in factories {
            match factory() {
                Ok(resource) => {
                    self.register(resource, Some(name));
                    registered += 1;
                    log::debug!("registered resource: {name}");
                }
                Err(e) => {
                    log::warn!("skipping resource '{name}': failed to construct: {e}");
                }
            }
        }
        log::info!("registered {registered} resources");
    }

    /// Look up a resource by its registered name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Resource>> {
        self.inner.read().resources.get(name).cloned()
    }

    /// Resolve the first registered resource whose URI scheme matches.
    /// Returns the registered name alongside the instance so callers can
    /// check tenant enablement.
    pub fn resolve_by_uri(&self, uri: &str) -> Option<(String, Arc<dyn Resource>)> {
        let inner = self.inner.read();
        for name in &inner.order {
            if let Some(resource) = inner.resources.get(name) {
                if resource.handles_uri(uri) {
                    return Some((name.clone(), resource.clone()));
                }
            }
        }
        None
    }

    /// Concatenated listings for every enabled resource, each called with
    /// its tenant config. A failing or unknown resource is logged and
    /// skipped; listing never errors as a whole.
    pub async fn list_enabled(
        &self,
        configs: &HashMap<String, Value>,
    ) -> Vec<ResourceDescriptor> {
        let enabled: Vec<(String, Arc<dyn Resource>)> = {
            let inner = self.inner.read();
            inner
                .order
                .iter()
                .filter(|name| configs.contains_key(*name))
                .filter_map(|name| {
                    inner
                        .resources
                        .get(name)
                        .map(|r| (name.clone(), r.clone()))
                })
                .collect()
        };
        for name in configs.keys() {
            if self.get(name).is_none() {
                log::warn!("enabled resource '{name}' not found in registry");
            }
        }

        let mut all = Vec::new();
        for (name, resource) in enabled {
            match resource.list(configs.get(&name)).await {
                Ok(mut descriptors) => all.append(&mut descriptors),
                Err(e) => log::error!("error listing resources for '{name}': {e}"),
            }
        }
        all
    }

    /// Configuration schema for a registered resource.
    pub fn config_schema(&self, name: &str) -> Option<Value> {
        self.inner
            .read()
            .resources
            .get(name)
            .and_then(|r| r.config_schema())
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.inner.read().resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::builtin::DocsResource;
    use serde_json::json;

    fn docs_config(entries: Value) -> HashMap<String, Value> {
        HashMap::from([("core/docs".to_string(), json!({ "entries": entries }))])
    }

    #[test]
    fn test_resolve_by_uri_prefers_first_registered() {
        let registry = ResourceRegistry::new();
        registry.register(Arc::new(DocsResource), Some("first/docs"));
        registry.register(Arc::new(DocsResource), Some("second/docs"));

        let (name, _) = registry.resolve_by_uri("docs://anything").unwrap();
        assert_eq!(name, "first/docs");
        assert!(registry.resolve_by_uri("files://x").is_none());
    }

    #[test]
    fn test_overwrite_keeps_resolution_position() {
        let registry = ResourceRegistry::new();
        registry.register(Arc::new(DocsResource), Some("core/docs"));
        registry.register(Arc::new(DocsResource), Some("core/docs"));
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve_by_uri("docs://a").is_some());
    }

    #[tokio::test]
    async fn test_list_enabled_filters_and_skips_unknown() {
        let registry = ResourceRegistry::new();
        registry.register(Arc::new(DocsResource), Some("core/docs"));

        let mut configs = docs_config(json!([
            {"id": "a", "name": "Doc A", "text": "alpha"}
        ]));
        configs.insert("ghost".into(), json!({}));

        let listed = registry.list_enabled(&configs).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uri, "docs://a");
    }

    #[test]
    fn test_config_schema_lookup() {
        let registry = ResourceRegistry::new();
        registry.register(Arc::new(DocsResource), Some("core/docs"));

        let schema = registry.config_schema("core/docs").unwrap();
        assert_eq!(schema["required"][0], "entries");
        assert!(registry.config_schema("ghost").is_none());
    }

    #[tokio::test]
    async fn test_list_enabled_empty_when_nothing_enabled() {
        let registry = ResourceRegistry::new();
        registry.register(Arc::new(DocsResource), Some("core/docs"));
        let listed = registry.list_enabled(&HashMap::new()).await;
        assert!(listed.is_empty());
    }
}
