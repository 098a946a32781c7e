//! Playlist handlers. Playlists are private to their owner; anyone
//! else gets not-found so their existence never leaks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use vod_models::{Playlist, PlaylistId, PlaylistItem, Video, VideoId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::params::{ListParams, PageResponse};
use crate::state::AppState;

/// Maximum accepted playlist name length, in characters.
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum accepted playlist description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

fn validate_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("playlist name must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "playlist name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: &str) -> ApiResult<String> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::bad_request(format!(
            "playlist description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(description.to_string())
}

/// Fetch a playlist the caller owns, masking everything else as
/// not-found.
async fn owned_playlist(
    state: &AppState,
    id: &PlaylistId,
    owner: &AuthUser,
) -> ApiResult<Playlist> {
    let playlist = state
        .playlists
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("playlist {id}")))?;
    if playlist.owner_id != owner.user_id {
        return Err(ApiError::not_found(format!("playlist {id}")));
    }
    Ok(playlist)
}

#[derive(Debug, Serialize)]
pub struct PlaylistSummary {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub video_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
}

/// `POST /api/playlists` — create an empty playlist.
pub async fn create_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistSummary>)> {
    let name = validate_name(&request.name)?;
    let description = request
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;

    let mut playlist = Playlist::new(user.user_id.clone(), name);
    playlist.description = description;
    state.playlists.create(&playlist).await?;

    info!(playlist_id = %playlist.id, owner_id = %user.user_id, "created playlist");
    Ok((
        StatusCode::CREATED,
        Json(PlaylistSummary {
            playlist,
            video_count: 0,
        }),
    ))
}

/// `GET /api/playlists` — the caller's playlists, most recently
/// touched first, each carrying its video count.
pub async fn list_playlists(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<PlaylistSummary>>> {
    let (limit, cursor) = params.resolve()?;
    let page = state
        .playlists
        .list_owned(&user.user_id, cursor, limit)
        .await?;
    metrics::record_page_served("playlists");
    let page = page.map(|(playlist, video_count)| PlaylistSummary {
        playlist,
        video_count,
    });
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `PATCH /api/playlists/:id` — rename or re-describe.
pub async fn update_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(playlist_id): Path<String>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> ApiResult<Json<Playlist>> {
    let id = PlaylistId::from_string(playlist_id);
    owned_playlist(&state, &id, &user).await?;

    let name = request.name.as_deref().map(validate_name).transpose()?;
    let description = request
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;
    state.playlists.update_details(&id, name, description).await?;

    let updated = state
        .playlists
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::internal("playlist vanished during update"))?;
    Ok(Json(updated))
}

/// `DELETE /api/playlists/:id` — remove the playlist and all of its
/// membership rows. The videos themselves are untouched.
pub async fn delete_playlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(playlist_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = PlaylistId::from_string(playlist_id);
    owned_playlist(&state, &id, &user).await?;

    state.playlist_items.delete_for_playlist(&id).await;
    state.playlists.delete(&id).await;

    info!(playlist_id = %id, owner_id = %user.user_id, "deleted playlist");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AddVideoRequest {
    pub video_id: String,
}

/// `POST /api/playlists/:id/videos` — add a video the caller can see.
/// Adding the same video twice is a conflict.
pub async fn add_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(playlist_id): Path<String>,
    Json(request): Json<AddVideoRequest>,
) -> ApiResult<StatusCode> {
    let id = PlaylistId::from_string(playlist_id);
    owned_playlist(&state, &id, &user).await?;

    let video_id = VideoId::from_string(request.video_id);
    let video = state
        .videos
        .get(&video_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("video {video_id}")))?;
    if !video.is_public() && video.owner_id != user.user_id {
        return Err(ApiError::not_found(format!("video {video_id}")));
    }

    let item = PlaylistItem::new(id.clone(), video_id);
    state.playlist_items.add(&item).await?;
    state.playlists.touch(&id).await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /api/playlists/:id/videos/:video_id` — remove a member.
pub async fn remove_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path((playlist_id, video_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let id = PlaylistId::from_string(playlist_id);
    owned_playlist(&state, &id, &user).await?;

    let video_id = VideoId::from_string(video_id);
    if !state.playlist_items.remove(&id, &video_id).await? {
        return Err(ApiError::not_found(format!(
            "video {video_id} is not in playlist {id}"
        )));
    }
    state.playlists.touch(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/playlists/:id/videos` — one page of members, most
/// recently added first, hydrated into full videos. Members deleted
/// since they were added simply drop out of the page.
pub async fn list_playlist_videos(
    State(state): State<AppState>,
    user: AuthUser,
    Path(playlist_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<Video>>> {
    let id = PlaylistId::from_string(playlist_id);
    owned_playlist(&state, &id, &user).await?;

    let (limit, cursor) = params.resolve()?;
    let page = state.playlist_items.list_page(&id, cursor, limit).await?;
    metrics::record_page_served("playlist_videos");

    let ids: Vec<VideoId> = page.items.iter().map(|item| item.video_id.clone()).collect();
    let videos = state.videos.get_many(&ids).await?;

    Ok(Json(PageResponse {
        items: videos,
        next_cursor: page.next_cursor.map(|c| c.encode()),
    }))
}
