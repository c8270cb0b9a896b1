//! Application context.
//!
//! One explicit container built at process start and passed to the
//! dispatcher and HTTP layer; there is no ambient global state. Holds the
//! capability registries, the execution queue, the config cache, and the
//! storage/audit collaborators.

use std::sync::Arc;

use crate::audit::AuditLog;
use crate::cache::ConfigCache;
use crate::config::ServerConfig;
use crate::resources::{self, ResourceRegistry};
use crate::storage::Storage;
use crate::tools::{builtin, ExecutionQueue, ToolRegistry};

/// Shared application context.
pub struct AppContext {
    pub config: ServerConfig,
    pub tools: ToolRegistry,
    pub resources: ResourceRegistry,
    pub queue: ExecutionQueue,
    pub cache: ConfigCache,
    pub storage: Arc<dyn Storage>,
    pub audit: AuditLog,
}

impl AppContext {
    /// Build the context and register the builtin capability tables.
    ///
    /// Must run inside a tokio runtime (the audit task is spawned here);
    /// call `start()` afterwards to bring up the worker pool.
    pub fn new(config: ServerConfig, storage: Arc<dyn Storage>) -> Arc<Self> {
        let tools = ToolRegistry::new();
        builtin::register_defaults(&tools);

        let resources = ResourceRegistry::new();
        resources::builtin::register_defaults(&resources);

        let queue = ExecutionQueue::new(
            config.max_workers,
            config.max_queue_size,
            config.admission_timeout,
            config.execution_timeout,
        );
        let cache = ConfigCache::new(config.cache_ttl);
        let audit = AuditLog::spawn(storage.clone());

        Arc::new(Self {
            config,
            tools,
            resources,
            queue,
            cache,
            storage,
            audit,
        })
    }

    /// Start the execution queue's worker pool. Idempotent.
    pub async fn start(&self) {
        self.queue.start().await;
    }
}
