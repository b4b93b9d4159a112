use std::collections::HashMap;

use ordermerge_core::{LineItem, OrderRecord};

/// Orders keyed by document number, kept in first-seen order.
///
/// Re-inserting a document number replaces the stored record in place, so the
/// output order is the order in which each document number first appeared in
/// the header export.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<OrderRecord>,
    index: HashMap<String, usize>,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `order`, returning the record it replaced, if any.
    pub fn upsert(&mut self, order: OrderRecord) -> Option<OrderRecord> {
        if let Some(&slot) = self.index.get(&order.document_number) {
            return Some(std::mem::replace(&mut self.orders[slot], order));
        }
        self.index
            .insert(order.document_number.clone(), self.orders.len());
        self.orders.push(order);
        None
    }

    /// Appends `item` to the order with `document_number`.
    ///
    /// Hands the item back when no such order exists.
    pub fn attach(&mut self, document_number: &str, item: LineItem) -> Result<(), LineItem> {
        match self.index.get(document_number) {
            Some(&slot) => {
                self.orders[slot].items.push(item);
                Ok(())
            }
            None => Err(item),
        }
    }

    #[cfg(test)]
    fn get(&self, document_number: &str) -> Option<&OrderRecord> {
        self.index
            .get(document_number)
            .map(|&slot| &self.orders[slot])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn into_orders(self) -> Vec<OrderRecord> {
        self.orders
    }
}

#[cfg(test)]
mod tests {
    use ordermerge_core::{Address, OrderTotals};

    use super::*;

    fn order(document_number: &str, customer: &str) -> OrderRecord {
        OrderRecord {
            document_number: document_number.to_string(),
            date: String::new(),
            customer: customer.to_string(),
            order_number: String::new(),
            billing_to: String::new(),
            shipping_to: String::new(),
            email: String::new(),
            phone: String::new(),
            totals: OrderTotals {
                total: 1.0,
                ..OrderTotals::default()
            },
            shipping_address: Address::default(),
            billing_address: Address::default(),
            items: Vec::new(),
        }
    }

    fn item(sku: &str) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            variant_id: String::new(),
            name: sku.to_string(),
            quantity: 1,
            net_amount: 0.0,
        }
    }

    #[test]
    fn replacement_keeps_first_position() {
        let mut book = OrderBook::new();
        assert!(book.upsert(order("SO-1", "first")).is_none());
        assert!(book.upsert(order("SO-2", "second")).is_none());
        let replaced = book.upsert(order("SO-1", "again"));

        assert_eq!(replaced.map(|o| o.customer), Some("first".to_string()));
        let orders = book.into_orders();
        let keys: Vec<_> = orders
            .iter()
            .map(|o| (o.document_number.as_str(), o.customer.as_str()))
            .collect();
        assert_eq!(keys, vec![("SO-1", "again"), ("SO-2", "second")]);
    }

    #[test]
    fn attach_appends_in_call_order() {
        let mut book = OrderBook::new();
        book.upsert(order("SO-1", "c"));
        book.attach("SO-1", item("A")).unwrap();
        book.attach("SO-1", item("B")).unwrap();

        let skus: Vec<_> = book
            .get("SO-1")
            .unwrap()
            .items
            .iter()
            .map(|i| i.sku.as_str())
            .collect();
        assert_eq!(skus, vec!["A", "B"]);
    }

    #[test]
    fn attach_to_unknown_order_returns_item() {
        let mut book = OrderBook::new();
        book.upsert(order("SO-1", "c"));

        let rejected = book.attach("SO-404", item("A")).unwrap_err();
        assert_eq!(rejected.sku, "A");
        assert!(book.get("SO-1").unwrap().items.is_empty());
        assert_eq!(book.len(), 1);
    }
}
