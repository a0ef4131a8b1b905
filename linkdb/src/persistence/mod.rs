//! File-backed durability for named store instances.
//!
//! A store with a configured data directory persists its full committed
//! state as a single snapshot file, rewritten on every commit and loaded on
//! open. Deleting a store's files resets it to empty on the next open.

pub mod snapshot;

pub use snapshot::StoreSnapshot;

use crate::config::StoreConfig;
use crate::error::Result;
use log::debug;
use std::path::PathBuf;

/// Path of the snapshot file for this configuration, or `None` for a purely
/// in-memory store.
pub fn snapshot_path(config: &StoreConfig) -> Option<PathBuf> {
    config
        .data_dir
        .as_ref()
        .map(|dir| dir.join(format!("{}.snapshot", config.name)))
}

/// Removes the on-disk files of the named store instance, if present.
pub fn delete_store_files(config: &StoreConfig) -> Result<()> {
    if let Some(path) = snapshot_path(config) {
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("deleted store file {:?}", path);
        }
    }
    Ok(())
}
