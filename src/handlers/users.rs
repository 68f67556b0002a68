use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::database::models::product::OWNER;
use crate::database::models::{EntityRef, Product, User, UserPatch};
use crate::database::sort::SortOrder;
use crate::error::{ApiError, FieldErrors};
use crate::services::ownership::{self, ProductOwnership};
use crate::state::AppState;

use super::checks::{ensure_exists, ensure_matching_id, ensure_new, not_empty_if_present, required, ListQuery};

const ENTITY_NAME: &str = "user";

/// User as sent on create and full update
#[derive(Debug, Deserialize)]
pub struct UserBody {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    /// When present, replaces the set of products this user owns
    pub products: Option<Vec<EntityRef>>,
}

impl UserBody {
    fn into_user(self) -> Result<(User, Option<Vec<String>>), ApiError> {
        let mut field_errors = FieldErrors::new();
        let name = required(&mut field_errors, "name", self.name);
        let email = required(&mut field_errors, "email", self.email);

        match (name, email) {
            (Some(name), Some(email)) => {
                let user = User { id: self.id, name, email };
                Ok((user, product_ids(self.products)))
            }
            _ => Err(ApiError::validation_failed(field_errors)),
        }
    }
}

/// User as returned, with the products it owns
#[derive(Debug, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    pub products: Vec<ProductSummary>,
}

/// Owned product without its owner, to keep the representation acyclic
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl UserView {
    fn new(user: User, products: Vec<&Product>) -> Self {
        let products = products
            .into_iter()
            .map(|p| ProductSummary {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect();
        Self { user, products }
    }
}

fn product_ids(refs: Option<Vec<EntityRef>>) -> Option<Vec<String>> {
    refs.map(|refs| refs.into_iter().map(|r| r.id).collect())
}

/// Apply a requested product set, if any, and write back the products that moved.
async fn replace_products(
    state: &AppState,
    user_id: &str,
    ownership: &mut ProductOwnership,
    requested: Option<&[String]>,
) -> Result<(), ApiError> {
    if let Some(ids) = requested {
        ownership.set_products(user_id, ids)?;
        ownership::persist_changed(state.products.as_ref(), ownership).await?;
    }
    Ok(())
}

/// POST /api/users - Create a new user
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<UserBody>) -> ApiResult<UserView> {
    debug!("REST request to save User : {:?}", body);
    ensure_new(body.id.as_deref(), ENTITY_NAME)?;
    let (user, requested) = body.into_user()?;

    let mut ownership = ownership::load_for_user(state.products.as_ref(), None, requested.as_deref()).await?;
    let user = state.users.save(user).await?;
    let user_id = user
        .id
        .clone()
        .ok_or_else(|| ApiError::internal_server_error("Saved user has no id"))?;
    replace_products(&state, &user_id, &mut ownership, requested.as_deref()).await?;

    let view = UserView::new(user, ownership.products_of(&user_id));
    Ok(ApiResponse::created(view, format!("/api/users/{}", user_id)))
}

/// PUT /api/users/:id - Replace an existing user
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserBody>,
) -> ApiResult<UserView> {
    debug!("REST request to update User : {}, {:?}", id, body);
    ensure_matching_id(&id, body.id.as_deref(), ENTITY_NAME)?;
    let (user, requested) = body.into_user()?;
    ensure_exists(state.users.as_ref(), &id, ENTITY_NAME).await?;

    let mut ownership = ownership::load_for_user(state.products.as_ref(), Some(&id), requested.as_deref()).await?;
    let user = state.users.save(user).await?;
    replace_products(&state, &id, &mut ownership, requested.as_deref()).await?;

    Ok(ApiResponse::success(UserView::new(user, ownership.products_of(&id))))
}

/// PATCH /api/users/:id - Partial update; absent or null fields keep their stored value
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<UserView> {
    debug!("REST request to partial update User partially : {}, {:?}", id, patch);
    ensure_matching_id(&id, patch.id.as_deref(), ENTITY_NAME)?;

    let mut field_errors = FieldErrors::new();
    not_empty_if_present(&mut field_errors, "name", patch.name.as_deref());
    not_empty_if_present(&mut field_errors, "email", patch.email.as_deref());
    if !field_errors.is_empty() {
        return Err(ApiError::validation_failed(field_errors));
    }
    ensure_exists(state.users.as_ref(), &id, ENTITY_NAME).await?;

    let requested = product_ids(patch.products.clone());
    let mut ownership = ownership::load_for_user(state.products.as_ref(), Some(&id), requested.as_deref()).await?;

    // Deleted between the existence check and here
    let Some(mut user) = state.users.find_by_id(&id).await? else {
        return Err(ApiError::NotFound);
    };
    patch.apply(&mut user);
    let user = state.users.save(user).await?;
    replace_products(&state, &id, &mut ownership, requested.as_deref()).await?;

    Ok(ApiResponse::success(UserView::new(user, ownership.products_of(&id))))
}

/// GET /api/users - List all users
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiResult<Vec<UserView>> {
    debug!("REST request to get all Users");
    let sort = SortOrder::parse_for::<User>(&query.sort)?;
    let users = state.users.find_all_sorted(&sort).await?;
    let ownership = ProductOwnership::new(state.products.find_all().await?);

    let views = users
        .into_iter()
        .map(|user| {
            let products = user
                .id
                .as_deref()
                .map(|id| ownership.products_of(id))
                .unwrap_or_default();
            UserView::new(user, products)
        })
        .collect();
    Ok(ApiResponse::success(views))
}

/// GET /api/users/:id - Get one user, 404 when absent
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    debug!("REST request to get User : {}", id);
    let user = state.users.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    let products = state.products.find_all_by_reference(OWNER, &id).await?;
    Ok(ApiResponse::success(UserView::new(user, products.iter().collect())))
}

/// DELETE /api/users/:id - Delete a user; unknown ids succeed too
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    debug!("REST request to delete User : {}", id);
    state.users.delete_by_id(&id).await?;
    Ok(ApiResponse::<()>::no_content())
}
