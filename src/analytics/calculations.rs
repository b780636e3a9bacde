use std::collections::{BTreeMap, HashMap};
use crate::types::analytics::{AnalyticsSummary, LocationBreakdown, LocationCount, StatusBreakdown};
use crate::types::order::Order;

/// Number of locations reported in the summary.
pub const SUMMARY_TOP_LOCATIONS: usize = 3;

pub fn average_delivery_time(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    let total: i64 = orders.iter().map(|o| o.delivery_time).sum();
    total as f64 / orders.len() as f64
}

pub fn average_cost(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    let total: f64 = orders.iter().map(|o| o.cost).sum();
    total / orders.len() as f64
}

/// Most common locations, highest count first. Ties keep first-seen order.
pub fn top_locations(orders: &[Order], limit: usize) -> Vec<LocationCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, order) in orders.iter().enumerate() {
        counts.entry(order.location.as_str())
            .or_insert((0, index))
            .0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts.into_iter()
        .map(|(location, (count, first_seen))| (location, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked.into_iter()
        .take(limit)
        .map(|(location, count, _)| LocationCount {
            location: location.to_string(),
            count,
        })
        .collect()
}

pub fn summarize(orders: &[Order]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_orders: orders.len(),
        average_delivery_time: round2(average_delivery_time(orders)),
        average_cost: round2(average_cost(orders)),
        top_locations: top_locations(orders, SUMMARY_TOP_LOCATIONS)
            .into_iter()
            .map(|l| l.location)
            .collect(),
    }
}

pub fn status_breakdown(orders: &[Order]) -> StatusBreakdown {
    let mut statuses = BTreeMap::new();
    for order in orders {
        *statuses.entry(order.status.clone()).or_insert(0) += 1;
    }
    StatusBreakdown { statuses }
}

pub fn location_breakdown(orders: &[Order], limit: usize) -> LocationBreakdown {
    LocationBreakdown {
        top_locations: top_locations(orders, limit),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
