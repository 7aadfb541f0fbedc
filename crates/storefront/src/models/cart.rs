//! Session cart.
//!
//! The cart only records product IDs and quantities. Names and prices are
//! looked up from the catalog whenever the cart is displayed, so a stale
//! entry (product since deleted) is simply skipped at that point.

use serde::{Deserialize, Serialize};

use shopfront_core::ProductId;

/// One product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    /// Always at least 1. Entries are removed rather than set to zero.
    pub quantity: u32,
}

/// A visitor's cart, kept in their session.
///
/// Entries keep insertion order and every product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries in the order they were first added.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantity held for `product_id`, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.entry(product_id).map(|e| e.quantity)
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |acc, e| acc.saturating_add(e.quantity))
    }

    /// Add one unit of `product_id`.
    pub fn add(&mut self, product_id: ProductId) {
        match self.entry_mut(product_id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(1),
            None => self.entries.push(CartEntry {
                product_id,
                quantity: 1,
            }),
        }
    }

    /// Remove one unit of `product_id`, dropping the entry at zero.
    pub fn decrement(&mut self, product_id: ProductId) {
        let Some(entry) = self.entry_mut(product_id) else {
            return;
        };
        if entry.quantity > 1 {
            entry.quantity -= 1;
        } else {
            self.remove(product_id);
        }
    }

    /// Set the quantity of `product_id`. Zero removes the entry.
    pub fn set(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        match self.entry_mut(product_id) {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(CartEntry {
                product_id,
                quantity,
            }),
        }
    }

    /// Drop `product_id` from the cart. No-op if absent.
    pub fn remove(&mut self, product_id: ProductId) {
        self.entries.retain(|e| e.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    #[test]
    fn test_add_increments_existing_entry() {
        let mut cart = Cart::new();
        cart.add(P1);
        cart.add(P1);
        cart.add(P2);

        assert_eq!(cart.quantity_of(P1), Some(2));
        assert_eq!(cart.quantity_of(P2), Some(1));
        assert_eq!(cart.entries().len(), 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(P2);
        cart.add(P1);
        cart.add(P2);

        let ids: Vec<_> = cart.entries().iter().map(|e| e.product_id).collect();
        assert_eq!(ids, vec![P2, P1]);
    }

    #[test]
    fn test_decrement_at_one_removes() {
        let mut cart = Cart::new();
        cart.add(P1);
        cart.add(P1);

        cart.decrement(P1);
        assert_eq!(cart.quantity_of(P1), Some(1));

        cart.decrement(P1);
        assert_eq!(cart.quantity_of(P1), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(P1);
        cart.decrement(P2);
        assert_eq!(cart.entries().len(), 1);
    }

    #[test]
    fn test_set_zero_removes() {
        let mut cart = Cart::new();
        cart.add(P1);
        cart.set(P1, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_inserts_or_overwrites() {
        let mut cart = Cart::new();
        cart.set(P1, 5);
        assert_eq!(cart.quantity_of(P1), Some(5));
        cart.set(P1, 2);
        assert_eq!(cart.quantity_of(P1), Some(2));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(P1);
        cart.remove(P2);
        assert_eq!(cart.quantity_of(P1), Some(1));
    }

    #[test]
    fn test_add_saturates() {
        let mut cart = Cart::new();
        cart.set(P1, u32::MAX);
        cart.add(P1);
        assert_eq!(cart.quantity_of(P1), Some(u32::MAX));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut cart = Cart::new();
        cart.add(P1);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json, serde_json::json!([{"product_id": 1, "quantity": 1}]));

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
