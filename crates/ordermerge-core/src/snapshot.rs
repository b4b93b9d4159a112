use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One `(sku, variant id)` pair from the storefront catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub sku: String,
    /// Opaque storefront identifier, e.g. `"gid://shopify/ProductVariant/1234"`.
    pub id: String,
}

/// SKU → variant id lookup built from a catalog snapshot.
///
/// At most one id is kept per SKU; a later entry replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTable {
    by_sku: HashMap<String, String>,
}

impl SnapshotTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, returning the id it replaced if the SKU was already present.
    pub fn insert(&mut self, entry: SnapshotEntry) -> Option<String> {
        self.by_sku.insert(entry.sku, entry.id)
    }

    /// Looks up the variant id for `sku`.
    #[must_use]
    pub fn resolve(&self, sku: &str) -> Option<&str> {
        self.by_sku.get(sku).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

impl FromIterator<SnapshotEntry> for SnapshotTable {
    fn from_iter<I: IntoIterator<Item = SnapshotEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}
