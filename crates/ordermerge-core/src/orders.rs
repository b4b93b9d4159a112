use serde::{Deserialize, Serialize};

/// One order assembled from a header-export row, with the line items that
/// reference its document number.
///
/// Field names match the JSON document consumed by the storefront import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Join key shared by the header and item exports.
    pub document_number: String,
    pub date: String,
    pub customer: String,
    pub order_number: String,
    pub billing_to: String,
    pub shipping_to: String,
    pub email: String,
    pub phone: String,
    pub totals: OrderTotals,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub tax: f64,
    pub subtotal: f64,
    /// Always `> 0.0` for records that survive header parsing.
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A single purchased line attached to an [`OrderRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    /// Storefront product-variant GID resolved from `sku`; empty when the SKU
    /// is not in the catalog snapshot.
    pub variant_id: String,
    pub name: String,
    pub quantity: u32,
    pub net_amount: f64,
}

impl LineItem {
    /// Returns `true` if the SKU resolved to a storefront variant.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.variant_id.is_empty()
    }
}
