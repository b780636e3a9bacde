use serde::{Deserialize, Serialize};

/// A persisted order as served by the orders service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub item_name: String,
    pub location: String,
    pub cost: f64,
    pub delivery_time: i64, // minutes
    pub status: String,
}

/// Payload for creating an order. Every field is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub item_name: String,
    pub location: String,
    pub cost: f64,
    pub delivery_time: i64,
    pub status: String,
}

impl NewOrder {
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            item_name: self.item_name,
            location: self.location,
            cost: self.cost,
            delivery_time: self.delivery_time,
            status: self.status,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub item_name: Option<String>,
    pub location: Option<String>,
    pub cost: Option<f64>,
    pub delivery_time: Option<i64>,
    pub status: Option<String>,
}

impl OrderUpdate {
    pub fn apply(self, order: &mut Order) {
        if let Some(item_name) = self.item_name {
            order.item_name = item_name;
        }
        if let Some(location) = self.location {
            order.location = location;
        }
        if let Some(cost) = self.cost {
            order.cost = cost;
        }
        if let Some(delivery_time) = self.delivery_time {
            order.delivery_time = delivery_time;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
    }
}
