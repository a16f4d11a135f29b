use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::Batch;
use crate::domain::Snapshot;
use crate::server::ApiState;

pub const SERVICE_NAME: &str = "Visual Swipe API";

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/images", get(images_handler))
        .route("/refresh", post(refresh_handler))
        .route("/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    cached_images: usize,
    last_refresh: Option<DateTime<Utc>>,
}

pub async fn index_handler(State(state): State<ApiState>) -> Json<IndexResponse> {
    let current = state.refresher.current().await;

    Json(IndexResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        cached_images: current.as_ref().map_or(0, |s| s.len()),
        last_refresh: current.map(|s| s.built_at()),
    })
}

/// Raw query values; anything unparseable falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct ImagesQuery {
    count: Option<String>,
    offset: Option<String>,
    layer: Option<String>,
}

fn parse_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesResponse {
    #[serde(flatten)]
    batch: Batch,
    refreshed: Option<DateTime<Utc>>,
}

/// Serve one batch. Reading may start a rebuild in the background, and the
/// very first read waits for the initial build.
pub async fn images_handler(
    State(state): State<ApiState>,
    Query(query): Query<ImagesQuery>,
) -> Json<ImagesResponse> {
    let count = parse_or(query.count.as_deref(), state.default_batch);
    let offset = parse_or(query.offset.as_deref(), 0);
    let layer = query.layer.as_deref().map(str::trim).filter(|l| !l.is_empty());

    let snapshot = state.refresher.snapshot().await;
    let images = snapshot.as_deref().map_or(&[][..], Snapshot::images);
    let batch = state.batches.page(images, count, offset, layer);

    tracing::debug!(
        count,
        offset,
        ?layer,
        returned = batch.images.len(),
        total = batch.total,
        "Served batch"
    );

    Json(ImagesResponse {
        batch,
        refreshed: snapshot.map(|s| s.built_at()),
    })
}

#[derive(Serialize)]
pub struct RefreshResponse {
    status: &'static str,
    message: &'static str,
}

pub async fn refresh_handler(State(state): State<ApiState>) -> Json<RefreshResponse> {
    state.refresher.force_refresh().await;

    Json(RefreshResponse {
        status: "refresh started",
        message: "New images loading in background",
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    cached: usize,
    last_refresh: Option<DateTime<Utc>>,
    next_refresh: Option<DateTime<Utc>>,
    sources: usize,
}

pub async fn status_handler(State(state): State<ApiState>) -> Json<StatusResponse> {
    let current = state.refresher.current().await;
    let last_refresh = current.as_ref().map(|s| s.built_at());

    Json(StatusResponse {
        cached: current.map_or(0, |s| s.len()),
        last_refresh,
        next_refresh: last_refresh.and_then(|last| state.refresher.next_refresh_after(last)),
        sources: state.sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{BatchServer, CacheStore, RefreshPolicy, Refresher, SnapshotBuilder};
    use crate::domain::{CandidateImage, Layer, SourceDescriptor};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Returns the same images, unshuffled, on every build.
    struct FixedBuilder(Vec<CandidateImage>);

    #[async_trait]
    impl SnapshotBuilder for FixedBuilder {
        async fn build(&self) -> Snapshot {
            Snapshot::new(self.0.clone(), Utc::now())
        }
    }

    fn images(layers: &[Layer]) -> Vec<CandidateImage> {
        layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let source = SourceDescriptor::feed(
                    "https://example.com/feed",
                    "Example",
                    *layer,
                    "Test",
                    8,
                );
                CandidateImage::new(
                    &source,
                    format!("https://cdn.example.com/{i}.jpg"),
                    &format!("image {i}"),
                    "https://example.com",
                    Utc::now(),
                )
            })
            .collect()
    }

    /// Never finishes a build.
    struct StuckBuilder;

    #[async_trait]
    impl SnapshotBuilder for StuckBuilder {
        async fn build(&self) -> Snapshot {
            std::future::pending().await
        }
    }

    fn app_with(builder: Arc<dyn SnapshotBuilder>, first_fill_timeout: Duration) -> Router {
        let refresher = Refresher::new(
            Arc::new(CacheStore::new()),
            builder,
            RefreshPolicy {
                interval: Duration::from_secs(6 * 3600),
                first_fill_timeout,
            },
        );
        router(ApiState {
            refresher: Arc::new(refresher),
            batches: BatchServer::default(),
            default_batch: 50,
            sources: 20,
        })
    }

    fn app(layers: &[Layer]) -> Router {
        app_with(Arc::new(FixedBuilder(images(layers))), Duration::from_secs(5))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_index_before_first_build() {
        let app = app(&[Layer::L1; 3]);
        let (status, body) = send(&app, "GET", "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["cachedImages"], 0);
        assert!(body["lastRefresh"].is_null());
    }

    #[tokio::test]
    async fn test_images_wraps_and_reports_cursor() {
        let app = app(&[Layer::L1; 5]);
        let (status, body) = send(&app, "GET", "/images?count=3&offset=4").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 5);
        assert_eq!(body["offset"], 4);
        assert_eq!(body["nextOffset"], 2);
        let titles: Vec<&str> = body["images"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["image 4", "image 0", "image 1"]);
        assert!(body["refreshed"].is_string());
        assert_eq!(body["images"][0]["layerTag"], "L1");
        assert!(body["images"][0]["imageUrl"].is_string());
    }

    #[tokio::test]
    async fn test_images_refreshed_matches_served_snapshot() {
        let app = app(&[Layer::L1; 2]);
        let (_, images) = send(&app, "GET", "/images").await;
        let (_, status) = send(&app, "GET", "/status").await;

        assert_eq!(images["refreshed"], status["lastRefresh"]);
    }

    #[tokio::test]
    async fn test_images_first_fill_timeout_has_no_refresh_time() {
        let app = app_with(Arc::new(StuckBuilder), Duration::from_millis(50));
        let (status, body) = send(&app, "GET", "/images").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert!(body["images"].as_array().unwrap().is_empty());
        assert!(body["refreshed"].is_null());
    }

    #[tokio::test]
    async fn test_images_defaults_on_bad_params() {
        let app = app(&[Layer::L2; 5]);
        let (status, body) = send(&app, "GET", "/images?count=lots&offset=-3").await;

        // Default count 50 over 5 images: the tail plus one wrapped pass
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["images"].as_array().unwrap().len(), 10);
        assert_eq!(body["offset"], 0);
        assert_eq!(body["nextOffset"], 0);
    }

    #[tokio::test]
    async fn test_images_layer_filter() {
        let app = app(&[Layer::L1, Layer::L4, Layer::L4]);

        let (_, body) = send(&app, "GET", "/images?layer=L4").await;
        assert_eq!(body["total"], 2);

        let (_, body) = send(&app, "GET", "/images?layer=L9").await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["nextOffset"], 0);
        assert!(body["images"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_starts_build() {
        let app = app(&[Layer::L3; 2]);
        let (status, body) = send(&app, "POST", "/refresh").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "refresh started");
        assert_eq!(body["message"], "New images loading in background");
    }

    #[tokio::test]
    async fn test_status_after_first_read() {
        let app = app(&[Layer::L1; 4]);
        send(&app, "GET", "/images").await;

        let (_, body) = send(&app, "GET", "/status").await;

        assert_eq!(body["cached"], 4);
        assert_eq!(body["sources"], 20);
        let last = DateTime::parse_from_rfc3339(body["lastRefresh"].as_str().unwrap()).unwrap();
        let next = DateTime::parse_from_rfc3339(body["nextRefresh"].as_str().unwrap()).unwrap();
        assert_eq!(next - last, chrono::Duration::hours(6));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = app(&[Layer::L1]);
        let request = Request::builder()
            .uri("/status")
            .header("origin", "https://swipe.example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
