use std::collections::BTreeMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::error::{Error, Result};
use crate::interfaces::order_store::OrderStore;
use crate::types::order::{NewOrder, Order, OrderUpdate};

struct StoreState {
    orders: BTreeMap<i64, Order>,
    next_id: i64,
}

/// Order store held in process memory. Ids start at 1 and are never reused.
pub struct InMemoryOrderStore {
    state: RwLock<StoreState>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        InMemoryOrderStore {
            state: RwLock::new(StoreState {
                orders: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn list(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Order> {
        let state = self.state.read().await;
        state.orders.get(&id)
            .cloned()
            .ok_or(Error::OrderNotFound(id))
    }

    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let order = order.into_order(id);
        state.orders.insert(id, order.clone());
        tracing::info!(order_id = id, "Order created");

        Ok(order)
    }

    async fn update(&self, id: i64, update: OrderUpdate) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state.orders.get_mut(&id)
            .ok_or(Error::OrderNotFound(id))?;

        update.apply(order);
        tracing::info!(order_id = id, "Order updated");

        Ok(order.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.remove(&id)
            .ok_or(Error::OrderNotFound(id))?;
        tracing::info!(order_id = id, "Order deleted");

        Ok(())
    }
}
