use async_trait::async_trait;
use crate::error::Result;
use crate::types::order::{NewOrder, Order, OrderUpdate};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Order>>;
    async fn get(&self, id: i64) -> Result<Order>;
    async fn create(&self, order: NewOrder) -> Result<Order>;
    async fn update(&self, id: i64, update: OrderUpdate) -> Result<Order>;
    async fn delete(&self, id: i64) -> Result<()>;
}
