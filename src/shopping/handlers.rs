use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    ownership::require_owner,
    state::AppState,
};

use super::dto::{CreateShoppingItemRequest, GenerateResponse, ShoppingItemView, ToggleResponse};
use super::repo::ShoppingItem;
use super::services;
use super::suggestions::{purchase_suggestions, ShoppingSuggestion, DEFAULT_SUGGESTION_LIMIT};
use crate::products::repo::Product;

// --- public routers ---

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/shopping", get(list_items))
        .route("/shopping/suggestions", get(suggest_items))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/shopping", post(add_item))
        .route("/shopping/:id", delete(delete_item))
        .route("/shopping/:id/toggle", post(toggle_item))
        .route("/shopping/generate", post(generate_list))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ShoppingItemView>>, ApiError> {
    let items = ShoppingItem::list_by_owner(&state.db, user_id).await?;
    let views = items.into_iter().map(ShoppingItemView::from).collect();
    Ok(Json(views))
}

#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreateShoppingItemRequest>,
) -> Result<(StatusCode, Json<ShoppingItemView>), ApiError> {
    let fields = body.into_fields()?;
    let item = ShoppingItem::create(&state.db, user_id, &fields).await?;
    info!(item_id = %item.id, name = %item.name, "shopping item added");
    Ok((StatusCode::CREATED, Json(item.into())))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let item = ShoppingItem::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("shopping item not found".into()))?;
    require_owner(&item, user_id)?;

    ShoppingItem::delete(&state.db, id).await?;
    info!(item_id = %id, name = %item.name, "shopping item deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn toggle_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let item = ShoppingItem::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("shopping item not found".into()))?;
    require_owner(&item, user_id)?;

    let purchased = ShoppingItem::toggle(&state.db, id).await?;
    info!(item_id = %id, purchased, "shopping item toggled");
    Ok(Json(ToggleResponse { purchased }))
}

#[instrument(skip(state))]
pub async fn generate_list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<GenerateResponse>, ApiError> {
    let added = services::generate_from_low_stock(&state.db, user_id).await?;
    Ok(Json(GenerateResponse { added }))
}

#[instrument(skip(state))]
pub async fn suggest_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ShoppingSuggestion>>, ApiError> {
    let products = Product::list_by_owner(&state.db, user_id, None).await?;
    let suggestions = purchase_suggestions(&products, DEFAULT_SUGGESTION_LIMIT);
    Ok(Json(suggestions))
}
