//! Category handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vod_models::Category;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

/// `GET /api/categories` — the full category list, alphabetical. Small
/// and fixed, so it is not paginated.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<CategoryList>> {
    let items = state.categories.list_all().await?;
    Ok(Json(CategoryList { items }))
}
