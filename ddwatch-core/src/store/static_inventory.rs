//! Inventory backed by the `[[targets]]` list of the settings file.

use async_trait::async_trait;

use super::{Inventory, StoreResult};
use crate::models::ServerTarget;

/// Fixed list of targets, served in hostname order
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    targets: Vec<ServerTarget>,
}

impl StaticInventory {
    /// Creates an inventory from configured targets
    #[must_use]
    pub fn new(mut targets: Vec<ServerTarget>) -> Self {
        targets.sort_by(|a, b| a.hostname.cmp(&b.hostname).then(a.id.cmp(&b.id)));
        Self { targets }
    }

    /// Number of configured targets
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if no targets are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn list_targets(&self) -> StoreResult<Vec<ServerTarget>> {
        Ok(self.targets.clone())
    }
}
