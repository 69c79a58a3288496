//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from the copy workers, the styles
//! runtime and the server thread.

use crate::config::ProjectConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
static CONFIG: LazyLock<ArcSwap<ProjectConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ProjectConfig::default()));

#[inline]
pub fn cfg() -> Arc<ProjectConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: ProjectConfig) -> Arc<ProjectConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
