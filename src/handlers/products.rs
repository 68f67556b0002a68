use axum::extract::{Path, State};
use tracing::debug;

use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::database::models::{Product, ProductPatch};
use crate::database::sort::SortOrder;
use crate::error::ApiError;
use crate::state::AppState;

use super::checks::{ensure_exists, ensure_matching_id, ensure_new, ListQuery};

const ENTITY_NAME: &str = "product";

/// POST /api/products - Create a new product
pub async fn create(State(state): State<AppState>, ApiJson(product): ApiJson<Product>) -> ApiResult<Product> {
    debug!("REST request to save Product : {:?}", product);
    ensure_new(product.id.as_deref(), ENTITY_NAME)?;

    let product = state.products.save(product).await?;
    let location = format!("/api/products/{}", product.id.as_deref().unwrap_or_default());
    Ok(ApiResponse::created(product, location))
}

/// PUT /api/products/:id - Replace an existing product, owner included
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(product): ApiJson<Product>,
) -> ApiResult<Product> {
    debug!("REST request to update Product : {}, {:?}", id, product);
    ensure_matching_id(&id, product.id.as_deref(), ENTITY_NAME)?;
    ensure_exists(state.products.as_ref(), &id, ENTITY_NAME).await?;

    let product = state.products.save(product).await?;
    Ok(ApiResponse::success(product))
}

/// PATCH /api/products/:id - Partial update; absent or null fields keep their stored value
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Product> {
    debug!("REST request to partial update Product partially : {}, {:?}", id, patch);
    ensure_matching_id(&id, patch.id.as_deref(), ENTITY_NAME)?;
    ensure_exists(state.products.as_ref(), &id, ENTITY_NAME).await?;

    let Some(mut product) = state.products.find_by_id(&id).await? else {
        return Err(ApiError::NotFound);
    };
    patch.apply(&mut product);
    let product = state.products.save(product).await?;
    Ok(ApiResponse::success(product))
}

/// GET /api/products - List all products
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<Product>> {
    debug!("REST request to get all Products");
    let sort = SortOrder::parse_for::<Product>(&query.sort)?;
    let products = state.products.find_all_sorted(&sort).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/:id - Get one product, 404 when absent
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    debug!("REST request to get Product : {}", id);
    let product = state.products.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id - Delete a product; unknown ids succeed too
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    debug!("REST request to delete Product : {}", id);
    state.products.delete_by_id(&id).await?;
    Ok(ApiResponse::<()>::no_content())
}
