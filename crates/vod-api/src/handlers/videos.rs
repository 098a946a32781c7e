//! Video handlers: feeds, CRUD, views, reactions, generation triggers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vod_models::{
    CategoryId, Category, Reaction, ReactionKind, User, Video, VideoId, VideoVisibility,
};
use vod_workflows::{GenerationJob, GenerationKind};

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::params::{ListParams, PageResponse};
use crate::state::AppState;

/// Maximum accepted title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;
/// Maximum accepted description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

fn validate_title(title: &str) -> ApiResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_request(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: &str) -> ApiResult<String> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::bad_request(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(description.to_string())
}

/// Fetch a video the viewer is allowed to see. Private videos surface
/// as not-found to anyone but their owner, so existence never leaks.
async fn visible_video(
    state: &AppState,
    id: &VideoId,
    viewer: Option<&AuthUser>,
) -> ApiResult<Video> {
    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("video {id}")))?;
    if !video.is_public() && viewer.map(|v| &v.user_id) != Some(&video.owner_id) {
        return Err(ApiError::not_found(format!("video {id}")));
    }
    Ok(video)
}

/// Fetch a video the caller owns, with the same not-found masking.
async fn owned_video(state: &AppState, id: &VideoId, owner: &AuthUser) -> ApiResult<Video> {
    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("video {id}")))?;
    if video.owner_id != owner.user_id {
        return Err(ApiError::not_found(format!("video {id}")));
    }
    Ok(video)
}

// ---- feeds ----

// Spelled out rather than flattening ListParams in: serde's flatten
// buffers values as strings, which breaks Query deserialization of
// the numeric limit.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub category_id: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// `GET /api/videos` — public home feed, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<PageResponse<Video>>> {
    let (limit, cursor) = ListParams {
        limit: query.limit,
        cursor: query.cursor,
    }
    .resolve()?;
    let category_id = query.category_id.map(CategoryId::from_string);
    let page = state
        .videos
        .list_public(category_id.as_ref(), cursor, limit)
        .await?;
    metrics::record_page_served("home");
    Ok(Json(page.into()))
}

/// `GET /api/videos/trending` — public videos by view count.
pub async fn list_trending(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<Video>>> {
    let (limit, cursor) = params.resolve()?;
    let page = state.videos.list_trending(cursor, limit).await?;
    metrics::record_page_served("trending");
    Ok(Json(page.into()))
}

/// `GET /api/videos/subscribed` — newest public videos from creators
/// the caller subscribes to.
pub async fn list_subscribed(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<Video>>> {
    let (limit, cursor) = params.resolve()?;
    let creators = state.subscriptions.creator_ids_for(&user.user_id).await?;
    let page = state.videos.list_by_owners(creators, cursor, limit).await?;
    metrics::record_page_served("subscribed");
    Ok(Json(page.into()))
}

/// `GET /api/studio/videos` — everything the caller owns, drafts
/// included.
pub async fn list_studio(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResponse<Video>>> {
    let (limit, cursor) = params.resolve()?;
    let page = state.videos.list_owned(&user.user_id, cursor, limit).await?;
    metrics::record_page_served("studio");
    Ok(Json(page.into()))
}

// ---- single video ----

#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub like_count: u64,
    pub dislike_count: u64,
    pub subscriber_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_reaction: Option<ReactionKind>,
    pub viewer_subscribed: bool,
}

/// `GET /api/videos/:id` — one video hydrated with owner, category,
/// reaction totals and the viewer's own relationship to it.
pub async fn get_video(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoDetail>> {
    let id = VideoId::from_string(video_id);
    let video = visible_video(&state, &id, viewer.as_ref()).await?;

    let owner = state.users.get(&video.owner_id).await?;
    let category = match &video.category_id {
        Some(category_id) => state.categories.get(category_id).await?,
        None => None,
    };
    let counts = state.reactions.counts(&id).await;
    let subscriber_count = state.subscriptions.subscriber_count(&video.owner_id).await;

    let (viewer_reaction, viewer_subscribed) = match &viewer {
        Some(viewer) => {
            let reaction = state
                .reactions
                .find(&viewer.user_id, &id)
                .await?
                .map(|r| r.kind);
            let subscribed = state
                .subscriptions
                .exists(&viewer.user_id, &video.owner_id)
                .await;
            (reaction, subscribed)
        }
        None => (None, false),
    };

    Ok(Json(VideoDetail {
        video,
        owner,
        category,
        like_count: counts.likes,
        dislike_count: counts.dislikes,
        subscriber_count,
        viewer_reaction,
        viewer_subscribed,
    }))
}

// ---- CRUD ----

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct UploadInstructions {
    pub upload_id: String,
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateVideoResponse {
    pub video: Video,
    pub upload: UploadInstructions,
}

/// `POST /api/videos` — create a private draft and hand back a direct
/// upload slot for the raw file.
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> ApiResult<(StatusCode, Json<CreateVideoResponse>)> {
    let title = validate_title(&request.title)?;

    // Keep the owner's profile fresh for feed hydration
    state.users.upsert(&user.to_profile()).await;

    let video = Video::new(user.user_id.clone(), title);
    let upload = state.media.create_direct_upload(video.id.as_str()).await?;
    state.videos.create(&video).await?;

    info!(video_id = %video.id, owner_id = %user.user_id, "created draft video");

    Ok((
        StatusCode::CREATED,
        Json(CreateVideoResponse {
            video,
            upload: UploadInstructions {
                upload_id: upload.id,
                upload_url: upload.url,
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub visibility: Option<VideoVisibility>,
}

/// `PATCH /api/videos/:id` — update metadata. Only provided fields
/// change.
pub async fn update_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
    Json(request): Json<UpdateVideoRequest>,
) -> ApiResult<Json<Video>> {
    let id = VideoId::from_string(video_id);
    owned_video(&state, &id, &user).await?;

    let title = request.title.as_deref().map(validate_title).transpose()?;
    let description = request
        .description
        .as_deref()
        .map(validate_description)
        .transpose()?;

    let category_id = match request.category_id {
        Some(raw) => {
            let category_id = CategoryId::from_string(raw);
            if state.categories.get(&category_id).await?.is_none() {
                return Err(ApiError::bad_request(format!(
                    "unknown category {category_id}"
                )));
            }
            Some(category_id)
        }
        None => None,
    };

    state
        .videos
        .update_details(&id, title, description, category_id, request.visibility)
        .await?;

    let updated = state
        .videos
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::internal("video vanished during update"))?;
    Ok(Json(updated))
}

/// `DELETE /api/videos/:id` — remove the record, the provider asset
/// and every row referencing the video.
pub async fn delete_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = VideoId::from_string(video_id);
    let video = owned_video(&state, &id, &user).await?;

    if let Some(asset_id) = &video.asset_id {
        state.media.delete_asset(asset_id).await?;
    }

    // Provider-generated thumbnails die with the asset; only custom
    // (uploaded or regenerated) files live at the uploads host.
    let provider_thumbnail = video
        .playback_id
        .as_deref()
        .map(|pb| state.media.thumbnail_url(pb));
    if let Some(url) = video
        .thumbnail_url
        .as_deref()
        .filter(|url| Some(*url) != provider_thumbnail.as_deref())
    {
        if let Some(key) = url.rsplit('/').next().filter(|key| !key.is_empty()) {
            // Best effort: a stranded file is not worth failing the
            // whole delete over
            if let Err(e) = state.uploads.delete_file(key).await {
                warn!(video_id = %id, "failed to delete thumbnail file: {}", e);
            }
        }
    }

    state.playlist_items.delete_for_video(&id).await;
    state.reactions.delete_for_video(&id).await;
    state.views.delete_for_video(&id).await;
    state.videos.delete(&id).await;

    info!(video_id = %id, owner_id = %user.user_id, "deleted video");
    Ok(StatusCode::NO_CONTENT)
}

// ---- views ----

/// `POST /api/videos/:id/views` — register a watch. Re-watching
/// refreshes the history row and still bumps the counter.
pub async fn register_view(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = VideoId::from_string(video_id);
    visible_video(&state, &id, Some(&user)).await?;

    state.views.record_view(&user.user_id, &id).await?;
    state.videos.increment_view_count(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- reactions ----

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub kind: ReactionKind,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionKind>,
    pub like_count: u64,
    pub dislike_count: u64,
}

/// `POST /api/videos/:id/reaction` — toggle semantics: repeating the
/// current kind clears it, the other kind replaces it.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
    Json(request): Json<ReactionRequest>,
) -> ApiResult<Json<ReactionResponse>> {
    let id = VideoId::from_string(video_id);
    visible_video(&state, &id, Some(&user)).await?;

    let current = state.reactions.find(&user.user_id, &id).await?;
    let reaction = match current {
        Some(existing) if existing.kind == request.kind => {
            state.reactions.clear(&user.user_id, &id).await;
            None
        }
        _ => {
            let reaction = Reaction::new(user.user_id.clone(), id.clone(), request.kind);
            state.reactions.set(&reaction).await?;
            Some(request.kind)
        }
    };

    let counts = state.reactions.counts(&id).await;
    Ok(Json(ReactionResponse {
        reaction,
        like_count: counts.likes,
        dislike_count: counts.dislikes,
    }))
}

// ---- generation triggers ----

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub job_id: String,
    pub kind: GenerationKind,
    pub status: &'static str,
}

/// `POST /api/videos/:id/generate/:kind` — enqueue an AI generation
/// workflow for the video. Fire and forget; a duplicate in-flight
/// request is a conflict.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((video_id, kind)): Path<(String, String)>,
) -> ApiResult<(StatusCode, Json<GenerationResponse>)> {
    let kind = match kind.as_str() {
        "title" => GenerationKind::Title,
        "description" => GenerationKind::Description,
        "thumbnail" => GenerationKind::Thumbnail,
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown generation kind '{other}'"
            )))
        }
    };

    let id = VideoId::from_string(video_id);
    let video = owned_video(&state, &id, &user).await?;
    if video.playback_id.is_none() {
        return Err(ApiError::bad_request(
            "video has no playable asset to generate from yet",
        ));
    }

    let job = GenerationJob::new(kind, id, user.user_id);
    state.workflows.enqueue(&job).await?;
    metrics::record_job_enqueued(kind.as_str());

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerationResponse {
            job_id: job.id,
            kind,
            status: "queued",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_validation() {
        assert_eq!(validate_title("  My video  ").unwrap(), "My video");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
    }

    #[test]
    fn test_description_validation() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"d".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }
}
