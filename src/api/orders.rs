use std::sync::Arc;
use axum::{
    Router,
    routing::get,
    extract::{Path, State, Json, rejection::{JsonRejection, PathRejection}},
    middleware,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use crate::api::auth::{require_api_key, ApiKeyAuth};
use crate::api::error::ApiError;
use crate::interfaces::order_store::OrderStore;
use crate::types::order::{NewOrder, Order, OrderUpdate};

pub struct OrdersState {
    pub store: Arc<dyn OrderStore>,
}

pub fn create_router(state: Arc<OrdersState>, auth: Arc<ApiKeyAuth>) -> Router {
    let protected = Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).patch(update_order).delete(delete_order))
        .route_layer(middleware::from_fn_with_state(auth, require_api_key));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct DeleteResponse {
    message: &'static str,
}

async fn list_orders(
    State(state): State<Arc<OrdersState>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.store.list().await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<OrdersState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Order>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let order = state.store.get(id).await?;
    Ok(Json(order))
}

async fn create_order(
    State(state): State<Arc<OrdersState>>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(new_order) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let order = state.store.create(new_order).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<Arc<OrdersState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let Json(update) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let order = state.store.update(id, update).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<Arc<OrdersState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
    state.store.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "Item deleted successfully",
    }))
}
