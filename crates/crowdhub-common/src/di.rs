//! Dependency injection registration types for auto-discovery
//!
//! Feature crates register their services with the portal container through
//! the factory-return pattern built on the `inventory` crate: each crate
//! submits a `ServiceFactory`, the container calls every discovered factory
//! at startup and registers the returned `ServiceEntry` items.
//!
//! These types live in crowdhub-common because it sits at the bottom of the
//! workspace dependency graph; defining them next to the container would
//! force a cycle.
//!
//! ## Usage
//!
//! In a feature crate (e.g. crowdhub-permissions):
//!
//! ```rust,ignore
//! use crowdhub_common::di::{ServiceEntry, ServiceFactory};
//! use std::sync::Arc;
//!
//! inventory::submit! {
//!     ServiceFactory::new("permissions", create_permission_services)
//! }
//!
//! fn create_permission_services() -> Vec<ServiceEntry> {
//!     vec![ServiceEntry::new::<AccessLogger>(Arc::new(AccessLogger::new()))]
//! }
//! ```

use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info};

/// A type-erased service instance produced by a factory.
pub struct ServiceEntry {
    /// Registration key in the container
    pub type_id: TypeId,

    /// Human-readable type name for diagnostics
    pub type_name: &'static str,

    /// The service instance (type-erased)
    pub instance: Arc<dyn Any + Send + Sync>,
}

impl ServiceEntry {
    /// Create a service entry for a concrete type
    pub fn new<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            instance: instance as Arc<dyn Any + Send + Sync>,
        }
    }
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A service factory submitted by a feature crate via `inventory::submit!`.
///
/// The factory function runs during container initialization; factories are
/// executed in priority order (lower value first).
pub struct ServiceFactory {
    /// Name of the service group (e.g. "permissions", "notifications")
    pub name: &'static str,

    /// Factory function that creates and returns services
    pub factory_fn: fn() -> Vec<ServiceEntry>,

    /// Priority for registration order (lower = earlier, default = 100)
    pub priority: u32,

    /// Names of service groups that must be registered before this one
    pub dependencies: &'static [&'static str],
}

// SAFETY: all fields are Sync (&'static str, fn pointer, u32, &'static slice)
unsafe impl Sync for ServiceFactory {}

impl ServiceFactory {
    /// Create a factory with default priority and no dependencies
    pub const fn new(name: &'static str, factory_fn: fn() -> Vec<ServiceEntry>) -> Self {
        Self {
            name,
            factory_fn,
            priority: 100,
            dependencies: &[],
        }
    }

    /// Create a factory with a custom priority
    pub const fn with_priority(
        name: &'static str,
        factory_fn: fn() -> Vec<ServiceEntry>,
        priority: u32,
    ) -> Self {
        Self {
            name,
            factory_fn,
            priority,
            dependencies: &[],
        }
    }

    /// Create a factory that declares dependencies on other groups
    pub const fn with_dependencies(
        name: &'static str,
        factory_fn: fn() -> Vec<ServiceEntry>,
        dependencies: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            factory_fn,
            priority: 100,
            dependencies,
        }
    }
}

// Collect all ServiceFactory instances across linked crates
inventory::collect!(ServiceFactory);

/// Run every discovered factory and collect the produced services.
///
/// Factories are sorted by priority before execution (stable, so equal
/// priorities keep submission order).
pub fn collect_all_services() -> Vec<ServiceEntry> {
    let mut factories: Vec<&ServiceFactory> = inventory::iter::<ServiceFactory>().collect();
    factories.sort_by_key(|f| f.priority);

    info!(
        "Discovered {} service factories via inventory",
        factories.len()
    );

    let mut all_services = Vec::new();
    for factory in factories {
        let services = (factory.factory_fn)();
        debug!(
            "Factory '{}' (priority {}) produced {} services",
            factory.name,
            factory.priority,
            services.len()
        );
        all_services.extend(services);
    }

    all_services
}

/// Number of discovered service factories.
pub fn discovered_factory_count() -> usize {
    inventory::iter::<ServiceFactory>().count()
}

/// Names of all discovered service factories.
pub fn list_discovered_factories() -> Vec<&'static str> {
    inventory::iter::<ServiceFactory>().map(|f| f.name).collect()
}
