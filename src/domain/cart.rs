use serde::{Deserialize, Serialize};

use crate::domain::menu::{find_item, MenuItem};
use crate::domain::RecordId;

/// One line of the cart. Name and price are captured when the dish is
/// first added and are not refreshed by later adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_id: RecordId,
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub name: String,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// The single shared cart. Every mutation yields a whole new item list
/// which then overwrites the stored cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(id: RecordId) -> Self {
        Self { id, items: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, menu_id: &RecordId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.menu_id == menu_id)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn with_items(&self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: self.id.clone(),
            items,
        }
    }

    /// Adding an existing dish only bumps its quantity.
    pub fn with_added(&self, menu_id: &RecordId, quantity: u32, name: &str, price: f64) -> Cart {
        let mut items = self.items.clone();
        match items.iter_mut().find(|item| &item.menu_id == menu_id) {
            Some(existing) => existing.quantity += quantity,
            None => items.push(CartItem {
                menu_id: menu_id.clone(),
                quantity,
                price,
                name: name.to_string(),
            }),
        }
        self.with_items(items)
    }

    /// `None` for quantities below one; removal goes through [`Cart::without`].
    pub fn with_quantity(&self, menu_id: &RecordId, quantity: i64) -> Option<Cart> {
        let quantity = u32::try_from(quantity).ok().filter(|q| *q > 0)?;
        let items = self
            .items
            .iter()
            .map(|item| {
                if &item.menu_id == menu_id {
                    CartItem {
                        quantity,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(self.with_items(items))
    }

    pub fn without(&self, menu_id: &RecordId) -> Cart {
        let items = self
            .items
            .iter()
            .filter(|item| &item.menu_id != menu_id)
            .cloned()
            .collect();
        self.with_items(items)
    }

    pub fn cleared(&self) -> Cart {
        Cart::empty(self.id.clone())
    }

    /// Running total, falling back to the catalog price for lines stored
    /// without one.
    pub fn total(&self, catalog: &[MenuItem]) -> f64 {
        self.items
            .iter()
            .map(|item| unit_price(item, catalog) * f64::from(item.quantity))
            .sum()
    }

    /// Frozen copy handed to checkout.
    pub fn snapshot(&self, catalog: &[MenuItem]) -> CartSnapshot {
        let items: Vec<CartItem> = self
            .items
            .iter()
            .map(|item| {
                let known = find_item(catalog, &item.menu_id);
                let name = if !item.name.is_empty() {
                    item.name.clone()
                } else if let Some(menu_item) = known {
                    menu_item.name.clone()
                } else {
                    format!("Item {}", item.menu_id)
                };
                CartItem {
                    menu_id: item.menu_id.clone(),
                    quantity: item.quantity,
                    price: unit_price(item, catalog),
                    name,
                }
            })
            .collect();
        CartSnapshot::new(items)
    }
}

fn unit_price(item: &CartItem, catalog: &[MenuItem]) -> f64 {
    if item.price > 0.0 {
        item.price
    } else {
        find_item(catalog, &item.menu_id)
            .map(|menu_item| menu_item.price)
            .unwrap_or(0.0)
    }
}

/// Cart contents as captured for the payment page (session key `cart`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::line_total).sum();
        Self { items, total }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recomputed from the lines rather than trusting the stored `total`.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
