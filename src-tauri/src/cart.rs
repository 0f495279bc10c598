use crate::models::{EntityId, Product};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Order being assembled by the waiter. Never synchronized; lives only as long
/// as the session. One line per product id.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    table: Option<EntityId>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit, merging into the existing line for the same product.
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            }),
        }
    }

    /// Remove one unit; the line disappears when it reaches zero.
    /// Returns false if the product was not in the cart.
    pub fn decrement(&mut self, product_id: &EntityId) -> bool {
        let Some(index) = self.lines.iter().position(|l| &l.product.id == product_id) else {
            return false;
        };

        if self.lines[index].quantity <= 1 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity -= 1;
        }
        true
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn table(&self) -> Option<&EntityId> {
        self.table.as_ref()
    }

    pub fn set_table(&mut self, table: EntityId) {
        self.table = Some(table);
    }

    /// Drop every line and the selected table.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.table = None;
    }

    /// `orderData` for `createOrder`.
    pub(crate) fn order_data(&self, table: &EntityId, waiter_id: &EntityId) -> Value {
        let items: Vec<Value> = self
            .lines
            .iter()
            .map(|l| {
                json!({
                    "id": l.product.id,
                    "name": l.product.name,
                    "price": l.product.price,
                    "quantity": l.quantity,
                })
            })
            .collect();

        json!({
            "table_number": table,
            "waiter_id": waiter_id,
            "items": items,
            "total": self.total(),
        })
    }
}
