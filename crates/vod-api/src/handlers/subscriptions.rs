//! Subscription handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;
use vod_models::{Subscription, UserId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub creator_id: String,
    pub subscriber_count: u64,
}

/// `POST /api/subscriptions/:creator_id` — subscribe the caller to a
/// creator. Self-subscription is a validation error; subscribing
/// twice is a conflict.
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(creator_id): Path<String>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let creator_id = UserId::from_string(creator_id);

    // Keep the caller's profile around so their subscriptions can be
    // attributed later
    state.users.upsert(&user.to_profile()).await;

    let subscription = Subscription::new(user.user_id.clone(), creator_id.clone());
    state.subscriptions.create(&subscription).await?;

    info!(viewer_id = %user.user_id, creator_id = %creator_id, "subscribed");
    let subscriber_count = state.subscriptions.subscriber_count(&creator_id).await;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse {
            creator_id: creator_id.as_str().to_string(),
            subscriber_count,
        }),
    ))
}

/// `DELETE /api/subscriptions/:creator_id` — unsubscribe. Not being
/// subscribed is not-found.
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(creator_id): Path<String>,
) -> ApiResult<StatusCode> {
    let creator_id = UserId::from_string(creator_id);
    if !state.subscriptions.delete(&user.user_id, &creator_id).await {
        return Err(ApiError::not_found(format!(
            "no subscription to {creator_id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
