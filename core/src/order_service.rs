//! Order placement and lookup.
//!
//! Orders exist here mainly as complaint context: a complaint may point at
//! the order it is about, and listings carry the order details along.

use crate::{
    error::{DeskError, DeskResult},
    store::DeskStore,
    types::{OrderId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to every new order. Fulfilment is tracked elsewhere.
const PLACED: &str = "Placed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_name: String,
    /// Comma-separated item names, kept as free text.
    pub items: String,
    pub total_amount: f64,
    pub status: String,
    pub order_date: DateTime<Utc>,
}

pub struct OrderService {
    store: DeskStore,
}

impl OrderService {
    pub fn new(store: DeskStore) -> Self {
        Self { store }
    }

    pub fn place(
        &self,
        user_id: UserId,
        restaurant_name: &str,
        items: &str,
        total_amount: f64,
        now: DateTime<Utc>,
    ) -> DeskResult<OrderRecord> {
        let restaurant_name = restaurant_name.trim();
        let items = items.trim();
        if restaurant_name.is_empty() {
            return Err(DeskError::Validation {
                reason: "restaurant name must not be blank".to_string(),
            });
        }
        if items.is_empty() {
            return Err(DeskError::Validation {
                reason: "order items must not be blank".to_string(),
            });
        }
        if !total_amount.is_finite() || total_amount <= 0.0 {
            return Err(DeskError::Validation {
                reason: format!("order total must be a positive amount, got {total_amount}"),
            });
        }
        let order_id =
            self.store
                .insert_order(user_id, restaurant_name, items, total_amount, PLACED, now)?;
        log::debug!("placed order {order_id} for user {user_id} at '{restaurant_name}'");
        Ok(OrderRecord {
            order_id,
            user_id,
            restaurant_name: restaurant_name.to_string(),
            items: items.to_string(),
            total_amount,
            status: PLACED.to_string(),
            order_date: now,
        })
    }

    pub fn get(&self, order_id: OrderId) -> DeskResult<Option<OrderRecord>> {
        self.store.get_order(order_id)
    }

    /// A user's orders, most recent first.
    pub fn for_user(&self, user_id: UserId) -> DeskResult<Vec<OrderRecord>> {
        self.store.orders_for_user(user_id)
    }
}
