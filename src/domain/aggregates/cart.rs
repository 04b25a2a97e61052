//! Cart Aggregate
//!
//! The cart is a value: every [`CartCommand`] produces a new [`CartState`]
//! through [`CartState::reduce`]. Totals are derived from the entry list in
//! [`CartState::from_items`], the only constructor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::aggregates::product::ProductSnapshot;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    #[serde(rename = "cartQuantity")]
    pub quantity: u32,
}

impl CartEntry {
    pub fn id(&self) -> &str { &self.product.id }
    /// `None` when the line total does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> { self.product.final_price.checked_mul(Decimal::from(self.quantity)) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CartTotals { pub total_items: u64, pub total_price: Decimal }

impl CartTotals {
    fn plus(&self, entry: &CartEntry) -> Option<CartTotals> {
        Some(CartTotals {
            total_items: self.total_items.checked_add(u64::from(entry.quantity))?,
            total_price: self.total_price.checked_add(entry.line_total()?)?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    items: Vec<CartEntry>,
    totals: CartTotals,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartCommand {
    Add { product: ProductSnapshot, quantity: u32 },
    Remove { product_id: String },
    SetQuantity { product_id: String, quantity: i64 },
    Clear,
    Load { items: Vec<CartEntry> },
}

impl CartState {
    pub fn new() -> Self { Self::default() }

    /// Builds a cart and its totals. Entries that would overflow the totals are dropped.
    pub fn from_items(items: Vec<CartEntry>) -> Self {
        let mut totals = CartTotals::default();
        let items: Vec<CartEntry> = items.into_iter().filter(|e| match totals.plus(e) {
            Some(next) => { totals = next; true }
            None => false,
        }).collect();
        Self { items, totals }
    }

    pub fn items(&self) -> &[CartEntry] { &self.items }
    pub fn totals(&self) -> CartTotals { self.totals }
    pub fn total_items(&self) -> u64 { self.totals.total_items }
    pub fn total_price(&self) -> Decimal { self.totals.total_price }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> { self.items.iter().find(|e| e.id() == product_id) }
    pub fn contains(&self, product_id: &str) -> bool { self.get(product_id).is_some() }

    pub fn reduce(&self, command: CartCommand) -> CartState {
        match command {
            CartCommand::Add { product, quantity } => self.add(product, quantity),
            CartCommand::Remove { product_id } => self.without(&product_id),
            CartCommand::SetQuantity { product_id, quantity } => self.set_quantity(&product_id, quantity),
            CartCommand::Clear => CartState::new(),
            CartCommand::Load { items } => CartState::from_items(sanitize(items)),
        }
    }

    fn add(&self, product: ProductSnapshot, quantity: u32) -> CartState {
        if !product.is_purchasable() { return self.clone(); }
        let mut items = self.items.clone();
        match items.iter_mut().find(|e| e.id() == product.id) {
            Some(entry) => {
                entry.quantity = clamp(entry.quantity.saturating_add(quantity), product.stock);
                entry.product = product;
            }
            None => {
                let quantity = clamp(quantity, product.stock);
                items.push(CartEntry { product, quantity });
            }
        }
        self.replace(items)
    }

    fn without(&self, product_id: &str) -> CartState {
        if !self.contains(product_id) { return self.clone(); }
        CartState::from_items(self.items.iter().filter(|e| e.id() != product_id).cloned().collect())
    }

    fn set_quantity(&self, product_id: &str, quantity: i64) -> CartState {
        if quantity <= 0 { return self.without(product_id); }
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let items = self.items.iter().cloned().map(|mut e| {
            if e.id() == product_id { e.quantity = clamp(requested, e.product.stock); }
            e
        }).collect();
        self.replace(items)
    }

    /// Swaps in `items`, or keeps the current cart if any entry would overflow the totals.
    fn replace(&self, items: Vec<CartEntry>) -> CartState {
        let len = items.len();
        let next = CartState::from_items(items);
        if next.items.len() == len { next } else { self.clone() }
    }
}

/// Clamps a requested quantity to `[1, stock]`. Callers check `stock > 0`.
fn clamp(requested: u32, stock: u32) -> u32 { requested.max(1).min(stock.max(1)) }

/// Cleans a hydrated list: zero-stock and zero-quantity entries are dropped,
/// quantities clamped, and the first occurrence of an id wins. Entries whose
/// totals overflow are dropped later by `from_items`.
fn sanitize(items: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut seen = HashSet::new();
    items.into_iter()
        .filter(|e| e.quantity > 0 && e.product.stock > 0)
        .filter(|e| seen.insert(e.product.id.clone()))
        .map(|mut e| { e.quantity = e.quantity.min(e.product.stock); e })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn snapshot(id: &str, final_price: i64, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: id.into(), title: format!("Product {id}"), price: Decimal::from(final_price), discount: Default::default(),
            final_price: Decimal::from(final_price), thumbnail: None, category: "books".into(), brand: None,
            stock, is_available: stock > 0,
        }
    }

    fn add(state: &CartState, product: ProductSnapshot, quantity: u32) -> CartState {
        state.reduce(CartCommand::Add { product, quantity })
    }

    fn assert_totals_consistent(state: &CartState) {
        let items: u64 = state.items().iter().map(|e| u64::from(e.quantity)).sum();
        let price: Decimal = state.items().iter().map(|e| e.product.final_price * Decimal::from(e.quantity)).sum();
        assert_eq!(state.total_items(), items);
        assert_eq!(state.total_price(), price);
    }

    #[test]
    fn test_cart_operations() {
        let a = snapshot("A", 10, 5);
        let cart = add(&CartState::new(), a.clone(), 1);
        assert_eq!((cart.total_items(), cart.total_price()), (1, Decimal::from(10)));
        let cart = add(&cart, a, 10);
        assert_eq!(cart.get("A").unwrap().quantity, 5);
        assert_eq!(cart.total_price(), Decimal::from(50));
        let cart = cart.reduce(CartCommand::Remove { product_id: "A".into() });
        assert_eq!((cart.total_items(), cart.total_price()), (0, Decimal::ZERO));
    }

    #[test]
    fn test_add_ignores_unavailable_products() {
        let mut out_of_stock = snapshot("A", 10, 0);
        let cart = add(&CartState::new(), out_of_stock.clone(), 1);
        assert!(cart.is_empty());
        out_of_stock.stock = 3;
        out_of_stock.is_available = false;
        assert!(add(&cart, out_of_stock, 1).is_empty());
    }

    #[test]
    fn test_add_clamps_new_entry_to_stock() {
        let cart = add(&CartState::new(), snapshot("A", 3, 2), 9);
        assert_eq!(cart.get("A").unwrap().quantity, 2);
        let cart = add(&CartState::new(), snapshot("B", 3, 2), 0);
        assert_eq!(cart.get("B").unwrap().quantity, 1);
    }

    #[test]
    fn test_add_refreshes_stock_snapshot() {
        let cart = add(&CartState::new(), snapshot("A", 10, 5), 4);
        let cart = add(&cart, snapshot("A", 12, 3), 1);
        let entry = cart.get("A").unwrap();
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.product.stock, 3);
        assert_eq!(cart.total_price(), Decimal::from(36));
    }

    #[test]
    fn test_set_quantity() {
        let cart = add(&CartState::new(), snapshot("A", 4, 6), 1);
        let raised = cart.reduce(CartCommand::SetQuantity { product_id: "A".into(), quantity: 100 });
        assert_eq!(raised.get("A").unwrap().quantity, 6);
        assert_eq!(raised.total_price(), Decimal::from(24));
        let zero = cart.reduce(CartCommand::SetQuantity { product_id: "A".into(), quantity: 0 });
        assert_eq!(zero, cart.reduce(CartCommand::Remove { product_id: "A".into() }));
        let negative = cart.reduce(CartCommand::SetQuantity { product_id: "A".into(), quantity: -3 });
        assert!(negative.is_empty());
        let missing = cart.reduce(CartCommand::SetQuantity { product_id: "Z".into(), quantity: 2 });
        assert_eq!(missing, cart);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let cart = add(&CartState::new(), snapshot("A", 1, 1), 1);
        assert_eq!(cart.reduce(CartCommand::Remove { product_id: "B".into() }), cart);
    }

    #[test]
    fn test_clear() {
        let cart = add(&add(&CartState::new(), snapshot("A", 1, 9), 3), snapshot("B", 7, 2), 2);
        let cleared = cart.reduce(CartCommand::Clear);
        assert_eq!((cleared.total_items(), cleared.total_price()), (0, Decimal::ZERO));
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let commands = vec![
            CartCommand::Add { product: snapshot("A", 10, 5), quantity: 2 },
            CartCommand::Add { product: snapshot("B", 3, 10), quantity: 4 },
            CartCommand::SetQuantity { product_id: "A".into(), quantity: 7 },
            CartCommand::Add { product: snapshot("B", 3, 10), quantity: 9 },
            CartCommand::Remove { product_id: "A".into() },
            CartCommand::Add { product: snapshot("C", 1, 1), quantity: 1 },
            CartCommand::SetQuantity { product_id: "C".into(), quantity: 0 },
        ];
        let mut cart = CartState::new();
        for command in commands {
            cart = cart.reduce(command);
            assert_totals_consistent(&cart);
            assert!(cart.items().iter().all(|e| e.quantity >= 1 && e.quantity <= e.product.stock));
        }
        assert_eq!(cart.total_items(), 10);
    }

    #[test]
    fn test_load_sanitizes_entries() {
        let items = vec![
            CartEntry { product: snapshot("A", 2, 3), quantity: 8 },
            CartEntry { product: snapshot("A", 2, 3), quantity: 1 },
            CartEntry { product: snapshot("B", 2, 0), quantity: 1 },
            CartEntry { product: snapshot("C", 2, 4), quantity: 0 },
        ];
        let cart = CartState::new().reduce(CartCommand::Load { items });
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get("A").unwrap().quantity, 3);
        assert_eq!(cart.total_price(), Decimal::from(6));
    }

    #[test]
    fn test_overflowing_prices_never_panic() {
        let mut huge = snapshot("A", 0, 5);
        huge.final_price = Decimal::MAX;
        let loaded = CartState::new().reduce(CartCommand::Load { items: vec![
            CartEntry { product: huge.clone(), quantity: 2 },
            CartEntry { product: snapshot("B", 3, 4), quantity: 1 },
        ] });
        assert!(!loaded.contains("A"));
        assert_eq!(loaded.total_price(), Decimal::from(3));

        let single = add(&CartState::new(), huge.clone(), 1);
        assert_eq!(single.total_price(), Decimal::MAX);
        assert_eq!(add(&single, huge.clone(), 1), single);
        assert_eq!(add(&single, snapshot("B", 3, 4), 1), single);
        assert_eq!(add(&loaded, huge, 2), loaded);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = CartEntry { product: snapshot("A", 2, 3), quantity: 2 };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["cartQuantity"], 2);
        let back: CartEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    fn arb_command() -> impl Strategy<Value = CartCommand> {
        let id = prop::sample::select(vec!["A", "B", "C", "D"]).prop_map(String::from);
        prop_oneof![
            4 => (id.clone(), 0i64..1_000, 0u32..8, 0u32..12, any::<bool>()).prop_map(|(id, price, stock, quantity, available)| {
                let mut product = snapshot(&id, price, stock);
                product.is_available = available && stock > 0;
                CartCommand::Add { product, quantity }
            }),
            2 => id.clone().prop_map(|product_id| CartCommand::Remove { product_id }),
            2 => (id, -3i64..20).prop_map(|(product_id, quantity)| CartCommand::SetQuantity { product_id, quantity }),
            1 => Just(CartCommand::Clear),
        ]
    }

    proptest! {
        /// Totals match the entries and every entry stays within `[1, stock]`.
        #[test]
        fn prop_totals_follow_any_sequence(commands in prop::collection::vec(arb_command(), 0..40)) {
            let mut cart = CartState::new();
            for command in commands {
                cart = cart.reduce(command);
                assert_totals_consistent(&cart);
                prop_assert!(cart.items().iter().all(|e| e.quantity >= 1 && e.quantity <= e.product.stock));
                let ids: HashSet<&str> = cart.items().iter().map(CartEntry::id).collect();
                prop_assert_eq!(ids.len(), cart.items().len());
            }
        }
    }
}
