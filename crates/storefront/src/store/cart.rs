//! Cart store: line items and running totals.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;

use trellis_core::{Product, ProductId};

/// One cart entry, keyed by product ID.
///
/// Two adds of the same product merge into one line even if the chosen
/// size/color differ; the first-chosen variant wins.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// The product being purchased.
    pub product: Product,
    /// Chosen size, where the product has sizes.
    pub selected_size: Option<String>,
    /// Chosen color.
    pub selected_color: String,
    /// Units of this product. Always >= 1; a line at quantity 1 is removed
    /// by a decrement rather than clamped.
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal (price x quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart state as seen by the UI.
///
/// `total_amount` and `total_items` are derived from `items` and recomputed
/// after every mutation; they are never independently settable.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// Line items in insertion order.
    pub items: Vec<CartLine>,
    /// Sum of price x quantity over all lines.
    pub total_amount: Decimal,
    /// Sum of quantities over all lines.
    pub total_items: u32,
}

/// Store owning the shopping cart.
///
/// Cheaply cloneable; clones share state. All operations are synchronous
/// and applied strictly in call order.
#[derive(Clone, Default)]
pub struct CartStore {
    state: Arc<Mutex<CartState>>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The single mutation entry point: edit the lines, then recompute the
    /// derived totals so they can never drift from `items`.
    fn mutate(&self, edit: impl FnOnce(&mut Vec<CartLine>)) {
        let mut state = self.lock();
        edit(&mut state.items);
        state.total_amount = state.items.iter().map(CartLine::subtotal).sum();
        state.total_items = state.items.iter().map(|line| line.quantity).sum();
    }

    /// Add a product to the cart with a chosen size and color.
    ///
    /// If a line for this product ID already exists its quantity increments
    /// by 1; otherwise a new line with quantity 1 is appended.
    pub fn add_item(
        &self,
        product: Product,
        selected_size: Option<String>,
        selected_color: impl Into<String>,
    ) {
        self.mutate(|items| {
            if let Some(line) = items.iter_mut().find(|line| line.product.id == product.id) {
                line.quantity += 1;
            } else {
                items.push(CartLine {
                    product,
                    selected_size,
                    selected_color: selected_color.into(),
                    quantity: 1,
                });
            }
        });
    }

    /// Remove the line for a product ID. No-op if absent.
    pub fn remove_item(&self, product_id: ProductId) {
        self.mutate(|items| {
            items.retain(|line| line.product.id != product_id);
        });
    }

    /// Increase a line's quantity by 1. No-op if absent.
    pub fn increase_quantity(&self, product_id: ProductId) {
        self.mutate(|items| {
            if let Some(line) = items.iter_mut().find(|line| line.product.id == product_id) {
                line.quantity += 1;
            }
        });
    }

    /// Decrease a line's quantity by 1. Decreasing a quantity-1 line removes
    /// it from the cart. No-op if absent.
    pub fn decrease_quantity(&self, product_id: ProductId) {
        self.mutate(|items| {
            let Some(index) = items.iter().position(|line| line.product.id == product_id) else {
                return;
            };
            let remove = match items.get_mut(index) {
                Some(line) if line.quantity > 1 => {
                    line.quantity -= 1;
                    false
                }
                Some(_) => true,
                None => false,
            };
            if remove {
                items.remove(index);
            }
        });
    }

    /// Empty the cart. Invoked after an order is successfully placed.
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }
}
