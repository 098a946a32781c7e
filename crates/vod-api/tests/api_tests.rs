//! End-to-end API tests against an in-process router.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vod_api::{create_router, ApiConfig, AppState};
use vod_media::{MediaClient, MediaConfig};
use vod_models::{UserId, Video, VideoVisibility};
use vod_store::MemoryStore;
use vod_uploads::{UploadsClient, UploadsConfig};
use vod_workflows::{WorkflowConfig, WorkflowTrigger};

const JWT_SECRET: &str = "test-jwt-secret";
const WEBHOOK_SECRET: &str = "test-webhook-secret";

async fn test_state(media_base: &str) -> AppState {
    let config = ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        media_webhook_secret: WEBHOOK_SECRET.to_string(),
        ..ApiConfig::default()
    };
    let media = MediaClient::new(MediaConfig {
        api_base: Url::parse(&format!("{media_base}/video/v1/")).unwrap(),
        token_id: "token-id".to_string(),
        token_secret: "token-secret".to_string(),
        cors_origin: "*".to_string(),
        stream_base: "https://stream.media.example".to_string(),
        image_base: "https://image.media.example".to_string(),
    })
    .unwrap();
    let uploads = UploadsClient::new(UploadsConfig {
        api_base: Url::parse("http://127.0.0.1:1/v1/").unwrap(),
        api_key: "test-key".to_string(),
    })
    .unwrap();
    let workflows = WorkflowTrigger::new(WorkflowConfig::default()).unwrap();

    let state = AppState::with_parts(config, Arc::new(MemoryStore::new()), media, uploads, workflows);
    state.categories.seed_defaults().await.unwrap();
    state
}

async fn test_app() -> (AppState, Router) {
    // A dead endpoint; tests that call the media provider mock it
    let state = test_state("http://127.0.0.1:1").await;
    let router = create_router(state.clone(), None);
    (state, router)
}

fn bearer(sub: &str) -> String {
    let claims = json!({
        "sub": sub,
        "exp": 4_102_444_800u64, // 2100-01-01
        "handle": sub,
        "name": sub,
    });
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

fn sign_webhook(body: &str, t: i64) -> String {
    use hmac::Mac;
    let mut mac =
        hmac::Hmac::<sha2::Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{t}.{body}").as_bytes());
    let hex: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("t={t},v1={hex}")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, sub: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, bearer(sub))
        .body(Body::empty())
        .unwrap()
}

fn post_as(uri: &str, sub: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, bearer(sub))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete_as(uri: &str, sub: &str) -> Request<Body> {
    Request::delete(uri)
        .header(header::AUTHORIZATION, bearer(sub))
        .body(Body::empty())
        .unwrap()
}

/// Seed a public, ready-to-play video directly through the repository.
async fn seed_public_video(state: &AppState, owner: &str, title: &str, age_secs: i64) -> Video {
    let mut video = Video::new(UserId::from_string(owner), title);
    video.visibility = VideoVisibility::Public;
    video.created_at = Utc::now() - Duration::seconds(age_secs);
    video.updated_at = video.created_at;
    state.videos.create(&video).await.unwrap();
    video
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (_state, router) = test_app().await;
    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn feed_paginates_without_gaps_or_duplicates() {
    let (state, router) = test_app().await;
    for i in 0..7 {
        seed_public_video(&state, "creator", &format!("video {i}"), i).await;
    }

    let mut seen = HashSet::new();
    let mut pages = 0;
    let mut uri = "/api/videos?limit=3".to_string();
    loop {
        let (status, body) = send(&router, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        pages += 1;
        for item in body["items"].as_array().unwrap() {
            assert!(seen.insert(item["id"].as_str().unwrap().to_string()));
        }
        match body["nextCursor"].as_str() {
            Some(cursor) => uri = format!("/api/videos?limit=3&cursor={cursor}"),
            None => break,
        }
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn out_of_range_limits_are_rejected_before_querying() {
    let (state, router) = test_app().await;
    seed_public_video(&state, "creator", "only", 0).await;

    for limit in [0, 101] {
        let (status, _) = send(&router, get(&format!("/api/videos?limit={limit}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "limit={limit}");

        // The subscribed feed short-circuits on an empty subscription
        // set; the limit must still be rejected first.
        let (status, _) = send(
            &router,
            get_as(&format!("/api/videos/subscribed?limit={limit}"), "alice"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "subscribed limit={limit}");
    }
    let (status, _) = send(&router, get("/api/videos?limit=100")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_cursor_is_a_bad_request() {
    let (_state, router) = test_app().await;
    let (status, _) = send(&router, get("/api/videos?cursor=%21%21%21")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_video_issues_direct_upload_slot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video/v1/uploads"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "upload-1", "url": "https://storage.media.example/upload-1"}
        })))
        .mount(&server)
        .await;

    let state = test_state(&server.uri()).await;
    let router = create_router(state.clone(), None);

    let (status, body) = send(
        &router,
        post_as("/api/videos", "alice", json!({"title": "  My first upload "})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["video"]["title"], "My first upload");
    assert_eq!(body["video"]["visibility"], "private");
    assert_eq!(body["upload"]["upload_id"], "upload-1");

    // The draft is visible to its owner but masked for everyone else
    let id = body["video"]["id"].as_str().unwrap();
    let (status, _) = send(&router, get_as(&format!("/api/videos/{id}"), "alice")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, get(&format!("/api/videos/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, get_as(&format!("/api/videos/{id}"), "bob")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let (_state, router) = test_app().await;
    let (status, _) = send(
        &router,
        post_as("/api/videos", "alice", json!({"title": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reaction_toggles_on_repeat() {
    let (state, router) = test_app().await;
    let video = seed_public_video(&state, "creator", "reactable", 0).await;
    let uri = format!("/api/videos/{}/reaction", video.id);

    let (status, body) = send(&router, post_as(&uri, "alice", json!({"kind": "like"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reaction"], "like");
    assert_eq!(body["like_count"], 1);

    // Switching kinds replaces instead of stacking
    let (_, body) = send(&router, post_as(&uri, "alice", json!({"kind": "dislike"}))).await;
    assert_eq!(body["reaction"], "dislike");
    assert_eq!(body["like_count"], 0);
    assert_eq!(body["dislike_count"], 1);

    // Repeating the current kind clears it
    let (_, body) = send(&router, post_as(&uri, "alice", json!({"kind": "dislike"}))).await;
    assert!(body["reaction"].is_null());
    assert_eq!(body["dislike_count"], 0);
}

#[tokio::test]
async fn liked_listing_follows_reactions() {
    let (state, router) = test_app().await;
    let video = seed_public_video(&state, "creator", "likeable", 0).await;
    let uri = format!("/api/videos/{}/reaction", video.id);

    let (status, _) = send(&router, post_as(&uri, "alice", json!({"kind": "like"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, get_as("/api/videos/liked", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["video"]["id"], video.id.as_str());

    // Clearing the like removes it from the listing
    let (_, _) = send(&router, post_as(&uri, "alice", json!({"kind": "like"}))).await;
    let (_, body) = send(&router, get_as("/api/videos/liked", "alice")).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn subscriptions_enforce_uniqueness_and_self_rule() {
    let (_state, router) = test_app().await;

    let (status, body) =
        send(&router, post_as("/api/subscriptions/creator", "alice", json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subscriber_count"], 1);

    let (status, _) =
        send(&router, post_as("/api/subscriptions/creator", "alice", json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) =
        send(&router, post_as("/api/subscriptions/alice", "alice", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, delete_as("/api/subscriptions/creator", "alice")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, delete_as("/api/subscriptions/creator", "alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscribed_feed_only_shows_subscribed_creators() {
    let (state, router) = test_app().await;
    seed_public_video(&state, "creator-a", "from a", 1).await;
    seed_public_video(&state, "creator-b", "from b", 0).await;

    let (status, _) =
        send(&router, post_as("/api/subscriptions/creator-a", "alice", json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, get_as("/api/videos/subscribed", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "from a");
}

#[tokio::test]
async fn playlist_lifecycle() {
    let (state, router) = test_app().await;
    let video = seed_public_video(&state, "creator", "listed", 0).await;

    let (status, body) = send(
        &router,
        post_as("/api/playlists", "alice", json!({"name": "Watch later"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["video_count"], 0);

    let add_uri = format!("/api/playlists/{playlist_id}/videos");
    let (status, _) = send(
        &router,
        post_as(&add_uri, "alice", json!({"video_id": video.id.as_str()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &router,
        post_as(&add_uri, "alice", json!({"video_id": video.id.as_str()})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&router, get_as("/api/playlists", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["video_count"], 1);

    let (status, body) = send(&router, get_as(&add_uri, "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["id"], video.id.as_str());

    // Another user never learns the playlist exists
    let (status, _) = send(&router, get_as(&add_uri, "bob")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        delete_as(&format!("/api/playlists/{playlist_id}"), "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn views_land_in_history_once() {
    let (state, router) = test_app().await;
    let video = seed_public_video(&state, "creator", "watched", 0).await;
    let uri = format!("/api/videos/{}/views", video.id);

    for _ in 0..3 {
        let (status, _) = send(&router, post_as(&uri, "alice", json!({}))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    // Every watch counts, history stays deduplicated
    let (_, body) = send(&router, get_as(&format!("/api/videos/{}", video.id), "alice")).await;
    assert_eq!(body["view_count"], 3);
    let (status, body) = send(&router, get_as("/api/history", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["video"]["id"], video.id.as_str());
}

#[tokio::test]
async fn media_webhook_drives_asset_lifecycle() {
    let (state, router) = test_app().await;
    let video = seed_public_video(&state, "creator", "processing", 0).await;

    let created = json!({
        "type": "video.asset.created",
        "data": {"id": "asset-1", "passthrough": video.id.as_str()}
    })
    .to_string();
    let t = Utc::now().timestamp();
    let request = Request::post("/webhooks/media")
        .header("media-signature", sign_webhook(&created, t))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(created))
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let ready = json!({
        "type": "video.asset.ready",
        "data": {
            "id": "asset-1",
            "playback_ids": [{"id": "pb-1", "policy": "public"}],
            "duration": 93.5,
            "passthrough": video.id.as_str()
        }
    })
    .to_string();
    let request = Request::post("/webhooks/media")
        .header("media-signature", sign_webhook(&ready, t))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(ready))
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let stored = state.videos.get(&video.id).await.unwrap().unwrap();
    assert_eq!(stored.asset_id.as_deref(), Some("asset-1"));
    assert_eq!(stored.playback_id.as_deref(), Some("pb-1"));
    assert_eq!(stored.duration_secs, Some(93.5));
    assert!(stored.thumbnail_url.is_some());
}

#[tokio::test]
async fn media_webhook_rejects_bad_signatures() {
    let (_state, router) = test_app().await;
    let body = json!({"type": "video.asset.created", "data": {"id": "a"}}).to_string();

    let unsigned = Request::post("/webhooks/media")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.clone()))
        .unwrap();
    let (status, _) = send(&router, unsigned).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = Request::post("/webhooks/media")
        .header("media-signature", format!("t={},v1={}", Utc::now().timestamp(), "00".repeat(32)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&router, forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (_state, router) = test_app().await;

    let (status, _) = send(&router, get("/api/studio/videos")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bad = Request::get("/api/studio/videos")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn categories_are_seeded_and_listed() {
    let (_state, router) = test_app().await;
    let (status, body) = send(&router, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().len() >= 10);
}
