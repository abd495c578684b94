mod auth;
mod error;
mod items;
mod orders;
mod users;
pub mod ws;

use axum::{Json, Router, routing::get};
use serde_json::json;
use std::sync::Arc;

use crate::auth::CookieOptions;
use crate::db::Database;
use crate::hub::Hub;
use crate::jwt::JwtConfig;

pub use auth::AuthApiState;
pub use items::ItemsState;
pub use orders::OrdersState;
pub use users::UsersState;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    hub: Arc<Hub>,
    cookies: CookieOptions,
) -> Router {
    let auth_state = AuthApiState {
        db: db.clone(),
        jwt: jwt.clone(),
        cookies,
    };

    let users_state = UsersState { db: db.clone() };

    let items_state = ItemsState {
        db: db.clone(),
        jwt,
    };

    let orders_state = OrdersState { db, hub };

    Router::new()
        .route("/healthz", get(healthz))
        .merge(auth::router(auth_state))
        .nest("/users", users::router(users_state))
        .nest("/items", items::router(items_state))
        .nest("/orders", orders::router(orders_state))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
