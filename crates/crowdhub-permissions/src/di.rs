//! Dependency injection support for crowdhub-permissions

use std::sync::Arc;

use crowdhub_common::di::{ServiceEntry, ServiceFactory};

use crate::audit::AccessLogger;
use crate::feature::StaticFeatureFlags;

inventory::submit! {
    ServiceFactory::new("permissions", create_permission_services)
}

fn create_permission_services() -> Vec<ServiceEntry> {
    vec![
        ServiceEntry::new::<AccessLogger>(Arc::new(AccessLogger::new())),
        ServiceEntry::new::<StaticFeatureFlags>(Arc::new(StaticFeatureFlags::new())),
    ]
}
