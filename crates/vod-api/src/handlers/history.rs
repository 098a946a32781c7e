//! Watch-history and liked-videos handlers. Both paginate over their
//! own event rows and hydrate the referenced videos; rows pointing at
//! videos deleted since simply drop out of the page.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use vod_models::{Video, VideoId};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::metrics;
use crate::params::{ListParams, PageResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub video: Video,
    pub viewed_at: DateTime<Utc>,
}

/// `GET /api/history` — the caller's watch history, most recently
/// watched first.
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<HistoryEntry>>> {
    let (limit, cursor) = params.resolve()?;
    let page = state.views.list_history(&user.user_id, cursor, limit).await?;
    metrics::record_page_served("history");

    let ids: Vec<VideoId> = page.items.iter().map(|v| v.video_id.clone()).collect();
    let mut videos = index_by_id(state.videos.get_many(&ids).await?);

    let items = page
        .items
        .into_iter()
        .filter_map(|view| {
            videos.remove(view.video_id.as_str()).map(|video| HistoryEntry {
                video,
                viewed_at: view.viewed_at,
            })
        })
        .collect();

    Ok(Json(PageResponse {
        items,
        next_cursor: page.next_cursor.map(|c| c.encode()),
    }))
}

#[derive(Debug, Serialize)]
pub struct LikedEntry {
    pub video: Video,
    pub liked_at: DateTime<Utc>,
}

/// `GET /api/videos/liked` — videos the caller has liked, most
/// recent like first.
pub async fn list_liked(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<LikedEntry>>> {
    let (limit, cursor) = params.resolve()?;
    let page = state
        .reactions
        .list_liked(&user.user_id, cursor, limit)
        .await?;
    metrics::record_page_served("liked");

    let ids: Vec<VideoId> = page.items.iter().map(|r| r.video_id.clone()).collect();
    let mut videos = index_by_id(state.videos.get_many(&ids).await?);

    let items = page
        .items
        .into_iter()
        .filter_map(|reaction| {
            videos
                .remove(reaction.video_id.as_str())
                .map(|video| LikedEntry {
                    video,
                    liked_at: reaction.reacted_at,
                })
        })
        .collect();

    Ok(Json(PageResponse {
        items,
        next_cursor: page.next_cursor.map(|c| c.encode()),
    }))
}

fn index_by_id(videos: Vec<Video>) -> HashMap<String, Video> {
    videos
        .into_iter()
        .map(|v| (v.id.as_str().to_string(), v))
        .collect()
}
