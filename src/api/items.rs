//! Item catalog endpoints. Reads are public; mutations require the
//! `store` role.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, format_cents, parse_money};
use crate::auth::StoreAuth;
use crate::db::{Database, Item};
use crate::impl_auth_state;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct ItemsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_auth_state!(ItemsState);

pub fn router(state: ItemsState) -> Router {
    Router::new()
        .route("/", get(list_items))
        .route("/", post(create_item))
        .route("/", put(update_item))
        .route("/{item_id}", get(get_item))
        .route("/{item_id}", delete(delete_item))
        .with_state(state)
}

/// Item as rendered to clients: cost as a decimal string.
#[derive(Serialize)]
struct ItemResponse {
    id: String,
    name: String,
    description: String,
    cost: String,
    created_at: String,
    updated_at: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            cost: format_cents(item.cost),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

async fn list_items(State(state): State<ItemsState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.db.items().list().await.db_err("Couldn't get items")?;
    let items: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
    Ok(Json(items))
}

async fn get_item(
    State(state): State<ItemsState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .db
        .items()
        .get_by_id(&item_id)
        .await
        .db_err("Couldn't get item")?
        .ok_or_else(|| ApiError::not_found("Couldn't find item"))?;
    Ok(Json(ItemResponse::from(item)))
}

#[derive(Deserialize)]
struct CreateItemRequest {
    name: String,
    #[serde(default)]
    description: String,
    cost: String,
}

async fn create_item(
    State(state): State<ItemsState>,
    StoreAuth(_claims): StoreAuth,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Item name cannot be empty"));
    }
    let cost = parse_money(&payload.cost)?;

    let id = state
        .db
        .items()
        .create(payload.name.trim(), &payload.description, cost)
        .await
        .db_err("Couldn't create item")?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

#[derive(Deserialize)]
struct UpdateItemRequest {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    cost: String,
}

async fn update_item(
    State(state): State<ItemsState>,
    StoreAuth(_claims): StoreAuth,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = parse_money(&payload.cost)?;

    let updated = state
        .db
        .items()
        .update(&payload.id, &payload.name, &payload.description, cost)
        .await
        .db_err("Couldn't update item")?;

    if !updated {
        return Err(ApiError::not_found("Couldn't find item"));
    }

    Ok(Json(
        serde_json::json!({ "status": "updated", "id": payload.id }),
    ))
}

async fn delete_item(
    State(state): State<ItemsState>,
    StoreAuth(_claims): StoreAuth,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .items()
        .delete(&item_id)
        .await
        .db_err("Couldn't delete item")?;

    if !deleted {
        return Err(ApiError::not_found("Couldn't find item"));
    }

    Ok(Json(
        serde_json::json!({ "status": "deleted", "id": item_id }),
    ))
}
