//! Short-TTL read-through cache for per-tenant capability configurations.
//!
//! Keyed by (tenant id, config kind). Entries expire lazily: a `get` that
//! finds an entry at or past the TTL removes it and reports a miss; there
//! is no background sweeper. The map is concurrency-safe (`DashMap`) since
//! many dispatcher invocations read and write it at once.
//!
//! No capacity bound is imposed: the key space is live tenants times two
//! kinds, and admin-driven invalidation reclaims entries eagerly.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

/// Which per-tenant configuration a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Tools,
    Resources,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::Tools => write!(f, "tools"),
            ConfigKind::Resources => write!(f, "resources"),
        }
    }
}

/// A capability-name-to-config-blob snapshot for one tenant.
pub type ConfigSnapshot = HashMap<String, Value>;

struct CacheEntry {
    snapshot: ConfigSnapshot,
    inserted_at: Instant,
}

/// TTL cache mapping (tenant, kind) to a configuration snapshot.
pub struct ConfigCache {
    ttl: Duration,
    entries: DashMap<(Uuid, ConfigKind), CacheEntry>,
}

impl ConfigCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Fetch a snapshot if present and within the TTL. An expired entry is
    /// removed and treated as a miss.
    pub fn get(&self, tenant: Uuid, kind: ConfigKind) -> Option<ConfigSnapshot> {
        let key = (tenant, kind);
        {
            let entry = self.entries.get(&key)?;
            if entry.inserted_at.elapsed() < self.ttl {
                log::debug!("cache hit for {tenant}:{kind}");
                return Some(entry.snapshot.clone());
            }
            // guard dropped here before the remove below
        }
        log::debug!("cache entry expired for {tenant}:{kind}");
        self.entries.remove(&key);
        None
    }

    /// Store a snapshot with the current timestamp, replacing any previous
    /// entry for the key.
    pub fn set(&self, tenant: Uuid, kind: ConfigKind, snapshot: ConfigSnapshot) {
        log::debug!("cached {kind} config for tenant {tenant}");
        self.entries.insert(
            (tenant, kind),
            CacheEntry {
                snapshot,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Clear one entry, all entries for a tenant, or the entire cache,
    /// depending on which arguments are given.
    pub fn invalidate(&self, tenant: Option<Uuid>, kind: Option<ConfigKind>) {
        match (tenant, kind) {
            (Some(tenant), Some(kind)) => {
                self.entries.remove(&(tenant, kind));
                log::debug!("cleared cache for {tenant}:{kind}");
            }
            (Some(tenant), None) => {
                self.entries.retain(|(t, _), _| *t != tenant);
                log::debug!("cleared all cache entries for tenant {tenant}");
            }
            _ => {
                self.entries.clear();
                log::debug!("cleared entire configuration cache");
            }
        }
    }

    /// Number of live (possibly expired-but-unswept) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(name: &str) -> ConfigSnapshot {
        HashMap::from([(name.to_string(), json!({"enabled": true}))])
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        let tenant = Uuid::new_v4();
        cache.set(tenant, ConfigKind::Tools, snapshot("core/echo"));

        let first = cache.get(tenant, ConfigKind::Tools).unwrap();
        let second = cache.get(tenant, ConfigKind::Tools).unwrap();
        assert_eq!(first, second);
        assert!(first.contains_key("core/echo"));
    }

    #[test]
    fn test_kinds_are_independent() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        let tenant = Uuid::new_v4();
        cache.set(tenant, ConfigKind::Tools, snapshot("core/echo"));
        assert!(cache.get(tenant, ConfigKind::Resources).is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_removed() {
        let cache = ConfigCache::new(Duration::from_millis(0));
        let tenant = Uuid::new_v4();
        cache.set(tenant, ConfigKind::Tools, snapshot("core/echo"));

        assert!(cache.get(tenant, ConfigKind::Tools).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_single_entry() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        let tenant = Uuid::new_v4();
        cache.set(tenant, ConfigKind::Tools, snapshot("a"));
        cache.set(tenant, ConfigKind::Resources, snapshot("b"));

        cache.invalidate(Some(tenant), Some(ConfigKind::Tools));
        assert!(cache.get(tenant, ConfigKind::Tools).is_none());
        assert!(cache.get(tenant, ConfigKind::Resources).is_some());
    }

    #[test]
    fn test_invalidate_whole_tenant() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cache.set(a, ConfigKind::Tools, snapshot("a"));
        cache.set(a, ConfigKind::Resources, snapshot("a"));
        cache.set(b, ConfigKind::Tools, snapshot("b"));

        cache.invalidate(Some(a), None);
        assert!(cache.get(a, ConfigKind::Tools).is_none());
        assert!(cache.get(a, ConfigKind::Resources).is_none());
        assert!(cache.get(b, ConfigKind::Tools).is_some());
    }

    #[test]
    fn test_invalidate_everything() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        cache.set(Uuid::new_v4(), ConfigKind::Tools, snapshot("a"));
        cache.set(Uuid::new_v4(), ConfigKind::Resources, snapshot("b"));

        cache.invalidate(None, None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_refreshes_snapshot() {
        let cache = ConfigCache::new(Duration::from_secs(300));
        let tenant = Uuid::new_v4();
        cache.set(tenant, ConfigKind::Tools, snapshot("old"));
        cache.set(tenant, ConfigKind::Tools, snapshot("new"));

        let got = cache.get(tenant, ConfigKind::Tools).unwrap();
        assert!(got.contains_key("new"));
        assert!(!got.contains_key("old"));
    }
}
