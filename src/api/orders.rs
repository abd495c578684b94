//! Order endpoints and the refresh-orders notification trigger.
//!
//! Every successful order mutation fans a `{"type": "refresh_orders"}`
//! signal out through the hub. Clients re-fetch on receipt; the signal
//! carries no sequence number, so rapid mutations may coalesce into one
//! re-fetch on the client side.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt, format_cents, parse_money};
use crate::db::{CreateOrderItemParams, CreateOrderParams, Database, Order, OrderItem};
use crate::hub::Hub;

#[derive(Clone)]
pub struct OrdersState {
    pub db: Database,
    pub hub: Arc<Hub>,
}

pub fn router(state: OrdersState) -> Router {
    Router::new()
        .route("/", get(list_orders))
        .route("/", post(create_order))
        .route("/", put(update_order))
        .with_state(state)
}

#[derive(Serialize)]
struct OrderItemResponse {
    id: i64,
    order_id: i64,
    item_name: String,
    item_description: String,
    quantity: i64,
    price: String,
    notes: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            item_name: item.item_name,
            item_description: item.item_description,
            quantity: item.quantity,
            price: format_cents(item.price),
            notes: item.notes,
        }
    }
}

#[derive(Serialize)]
struct OrderResponse {
    id: i64,
    for_name: String,
    email: String,
    order_date: String,
    status: String,
    total: String,
    notes: String,
    created_at: String,
    updated_at: String,
    items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            for_name: order.for_name,
            email: order.for_email,
            order_date: order.order_date,
            status: order.status,
            total: format_cents(order.total),
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

async fn list_orders(State(state): State<OrdersState>) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .db
        .orders()
        .list_open()
        .await
        .db_err("Couldn't get orders")?;
    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(orders))
}

#[derive(Deserialize)]
struct CreateOrderRequest {
    for_name: String,
    #[serde(default)]
    for_email: String,
    order_date: String,
    status: String,
    total: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    items: Vec<CreateOrderItemRequest>,
}

#[derive(Deserialize)]
struct CreateOrderItemRequest {
    item_id: String,
    quantity: i64,
    price: String,
    #[serde(default)]
    notes: String,
}

async fn create_order(
    State(state): State<OrdersState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_order_date(&payload.order_date) {
        return Err(ApiError::bad_request("Invalid order date format"));
    }

    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        items.push(CreateOrderItemParams {
            item_id: item.item_id.clone(),
            quantity: item.quantity,
            price: parse_money(&item.price)?,
            notes: item.notes.clone(),
        });
    }

    let params = CreateOrderParams {
        for_name: payload.for_name,
        for_email: payload.for_email,
        order_date: payload.order_date,
        status: payload.status,
        total: parse_money(&payload.total)?,
        notes: payload.notes,
        items,
    };

    let id = state
        .db
        .orders()
        .create(&params)
        .await
        .db_err("Couldn't create order")?;

    let response = (StatusCode::CREATED, Json(serde_json::json!({ "id": id })));
    broadcast_refresh_orders(&state.hub);
    Ok(response)
}

#[derive(Deserialize)]
struct UpdateOrderRequest {
    id: i64,
    status: String,
}

async fn update_order(
    State(state): State<OrdersState>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .orders()
        .update_status(payload.id, &payload.status)
        .await
        .db_err("Couldn't update order")?;

    if !updated {
        return Err(ApiError::not_found("Couldn't find order"));
    }

    let response = Json(serde_json::json!({
        "message": format!("Order {} updated successfully", payload.id)
    }));
    broadcast_refresh_orders(&state.hub);
    Ok(response)
}

/// Tell every connected client to re-fetch orders. Fire and forget: the
/// HTTP response does not depend on delivery, and a serialization failure
/// is logged and swallowed.
fn broadcast_refresh_orders(hub: &Hub) {
    #[derive(Serialize)]
    struct RefreshMessage {
        r#type: &'static str,
    }

    match serde_json::to_string(&RefreshMessage {
        r#type: "refresh_orders",
    }) {
        Ok(msg) => {
            hub.broadcast(&msg);
        }
        Err(e) => error!("couldn't serialize refresh message: {}", e),
    }
}

/// Validate a "YYYY-MM-DD HH:MM:SS" timestamp shape.
fn is_valid_order_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return false;
        }
    }
    true
}
