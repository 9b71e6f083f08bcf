//! # Service Registry
//!
//! Resolves configuration-supplied service names to service instances.
//!
//! ## Architecture
//!
//! Resolution is lazy and memoized: the first lookup of a name consults the
//! loader and caches the instance process-wide; later lookups hit the cache.
//! A name the loader cannot satisfy is a resolution failure at invocation
//! time, not at startup; the orchestrator decides whether that is fatal
//! based on the continue-on-failure modifier.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::orchestration::service::Service;

/// Source of service instances, supplied by the hosting process. Production
/// deployments back this with the module loader; tests back it with an
/// in-memory map.
pub trait ServiceLoader: Send + Sync {
    /// Build or fetch the service registered under `name`, if any.
    fn load(&self, name: &str) -> Option<Arc<dyn Service>>;
}

/// In-memory loader over a fixed name -> instance map.
pub struct StaticServiceLoader {
    services: HashMap<String, Arc<dyn Service>>,
}

impl StaticServiceLoader {
    pub fn new(services: HashMap<String, Arc<dyn Service>>) -> Self {
        Self { services }
    }
}

impl ServiceLoader for StaticServiceLoader {
    fn load(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.get(name).cloned()
    }
}

/// Registry statistics for observability.
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub resolved_services: usize,
    pub resolved_names: Vec<String>,
    pub active_threads: u32,
}

/// Memoizing name -> service resolver.
pub struct ServiceRegistry {
    loader: Box<dyn ServiceLoader>,
    cache: DashMap<String, Arc<dyn Service>>,
}

impl ServiceRegistry {
    pub fn new(loader: Box<dyn ServiceLoader>) -> Self {
        info!("Creating new ServiceRegistry");
        Self {
            loader,
            cache: DashMap::new(),
        }
    }

    /// Convenience constructor over a fixed service map.
    pub fn with_services(services: HashMap<String, Arc<dyn Service>>) -> Self {
        Self::new(Box::new(StaticServiceLoader::new(services)))
    }

    /// Resolve a service by its configured name. The first successful
    /// resolution is cached for the life of the registry.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Service>> {
        if name.is_empty() {
            warn!("Service resolution attempted with empty name");
            return None;
        }

        if let Some(cached) = self.cache.get(name) {
            return Some(Arc::clone(cached.value()));
        }

        match self.loader.load(name) {
            Some(service) => {
                debug!(service = name, "Resolved and cached service");
                self.cache.insert(name.to_string(), Arc::clone(&service));
                Some(service)
            }
            None => {
                warn!(service = name, "Service could not be resolved");
                None
            }
        }
    }

    /// Whether a name resolves, without logging a resolution failure.
    pub fn can_resolve(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.cache.contains_key(name) || self.loader.load(name).is_some()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut resolved_names: Vec<String> =
            self.cache.iter().map(|e| e.key().clone()).collect();
        resolved_names.sort_unstable();
        let active_threads = self
            .cache
            .iter()
            .map(|e| e.value().active_threads())
            .sum();
        RegistryStats {
            resolved_services: self.cache.len(),
            resolved_names,
            active_threads,
        }
    }
}
