use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    ownership::require_owner,
    state::AppState,
};

use super::dto::{
    CreateProductRequest, ExpiredProduct, OverviewResponse, ProductView, SearchParams,
    StatisticsResponse, UpdateProductRequest,
};
use super::freshness::{expired_message, expiring_soon, DEFAULT_EXPIRY_HORIZON_DAYS};
use super::recipes::recipe_suggestions;
use super::repo::Product;

/// How many long-stayers the overview shows off.
const VETERAN_COUNT: usize = 5;

// --- public routers ---

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/overview", get(fridge_overview))
        .route("/products/statistics", get(statistics))
        .route("/products/categories", get(list_categories))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/products", post(add_product))
        .route("/products/:id", put(edit_product))
        .route("/products/:id", delete(delete_product))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let products = Product::list_by_owner(&state.db, user_id, params.q.as_deref()).await?;
    let views = products.iter().map(|p| ProductView::new(p, now)).collect();
    Ok(Json(views))
}

#[instrument(skip(state, body))]
pub async fn add_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductView>), ApiError> {
    let now = OffsetDateTime::now_utc();
    let fields = body.into_fields()?;
    let product = Product::create(&state.db, user_id, &fields).await?;
    info!(product_id = %product.id, name = %product.name, "product added");
    Ok((StatusCode::CREATED, Json(ProductView::new(&product, now))))
}

#[instrument(skip(state, body))]
pub async fn edit_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductView>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let fields = body.into_fields()?;

    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    require_owner(&product, user_id)?;

    let updated = Product::update(&state.db, id, &fields).await?;
    Ok(Json(ProductView::new(&updated, now)))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    require_owner(&product, user_id)?;

    Product::delete(&state.db, id).await?;
    info!(product_id = %id, name = %product.name, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// The fridge landing view: everything in one response, computed against
/// a single clock reading.
#[instrument(skip(state))]
pub async fn fridge_overview(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let products = Product::list_by_owner(&state.db, user_id, params.q.as_deref()).await?;

    let mut rng = rand::thread_rng();
    let expired = products
        .iter()
        .filter(|p| p.is_expired(now))
        .map(|p| ExpiredProduct {
            product: ProductView::new(p, now),
            message: expired_message(&p.name, &mut rng),
        })
        .collect();

    let expiring = expiring_soon(&products, now, DEFAULT_EXPIRY_HORIZON_DAYS)
        .into_iter()
        .map(|p| ProductView::new(p, now))
        .collect();

    let suggestions = recipe_suggestions(&products, now);

    let mut by_age: Vec<&Product> = products.iter().collect();
    by_age.sort_by_key(|p| Reverse(p.days_in_fridge(now)));
    let veterans = by_age
        .iter()
        .take(VETERAN_COUNT)
        .map(|p| ProductView::new(p, now))
        .collect();

    let views = products.iter().map(|p| ProductView::new(p, now)).collect();

    Ok(Json(OverviewResponse {
        products: views,
        expired,
        expiring_soon: expiring,
        suggestions,
        veterans,
    }))
}

#[instrument(skip(state))]
pub async fn statistics(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let products = Product::list_by_owner(&state.db, user_id, None).await?;

    let mut by_age: Vec<&Product> = products.iter().collect();
    by_age.sort_by_key(|p| Reverse(p.days_in_fridge(now)));
    let longest_living = by_age
        .into_iter()
        .map(|p| ProductView::new(p, now))
        .collect();

    let mut categories: BTreeMap<String, i64> = BTreeMap::new();
    for product in &products {
        *categories.entry(product.category.clone()).or_insert(0) += 1;
    }

    Ok(Json(StatisticsResponse {
        longest_living,
        categories,
    }))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = Product::categories_by_owner(&state.db, user_id).await?;
    Ok(Json(categories))
}
