use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::favorites::FavoritesStore;
use crate::filter::FeedQuery;
use crate::ingest::scheduler::{RefreshStatus, SchedulerHandle};
use crate::trend::{CategoryFilter, TrendRecord};

#[derive(Clone)]
pub struct AppState {
    pub feed: SchedulerHandle,
    pub favorites: Arc<FavoritesStore>,
}

impl AppState {
    pub fn new(feed: SchedulerHandle, favorites: Arc<FavoritesStore>) -> Self {
        Self { feed, favorites }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/trends", get(list_trends))
        .route("/trends/refresh", post(refresh))
        .route("/trends/{id}", get(trend_detail))
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/{id}", delete(remove_favorite))
        .route("/profile", get(profile))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

#[derive(serde::Deserialize)]
struct TrendsParams {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendsOut {
    trends: Vec<TrendRecord>,
    last_updated: Option<i64>,
    status: RefreshStatus,
    error: Option<String>,
}

async fn list_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> Result<Json<TrendsOut>, ApiError> {
    let category = match params.category.as_deref().map(str::trim) {
        None | Some("") => CategoryFilter::All,
        Some(c) => c
            .parse::<CategoryFilter>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
    };
    let query = FeedQuery::new(category, params.q);

    let snap = state.feed.snapshot();
    let trends = query.apply(&snap.trends).into_iter().cloned().collect();
    Ok(Json(TrendsOut {
        trends,
        last_updated: snap.last_updated,
        status: snap.status,
        error: snap.error,
    }))
}

/// Current feed first, then favorites (a bookmarked item may have left the feed).
async fn trend_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrendRecord>, StatusCode> {
    let from_feed = state
        .feed
        .subscribe()
        .borrow()
        .trends
        .iter()
        .find(|t| t.id == id)
        .cloned();
    from_feed
        .or_else(|| state.favorites.get(&id))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(serde::Serialize)]
struct RefreshOut {
    sequence: u64,
}

async fn refresh(State(state): State<AppState>) -> Result<(StatusCode, Json<RefreshOut>), ApiError> {
    let sequence = state
        .feed
        .refresh()
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    Ok((StatusCode::ACCEPTED, Json(RefreshOut { sequence })))
}

async fn list_favorites(State(state): State<AppState>) -> Json<Vec<TrendRecord>> {
    Json(state.favorites.list())
}

/// Favorites mutations write to storage; keep that off the async workers.
async fn with_favorites<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FavoritesStore) -> T + Send + 'static,
{
    let favorites = Arc::clone(&state.favorites);
    tokio::task::spawn_blocking(move || f(favorites.as_ref()))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(record): Json<TrendRecord>,
) -> Result<Json<Vec<TrendRecord>>, ApiError> {
    let list = with_favorites(&state, move |f| {
        f.add(record);
        f.list()
    })
    .await?;
    Ok(Json(list))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TrendRecord>>, ApiError> {
    let list = with_favorites(&state, move |f| {
        f.remove(&id);
        f.list()
    })
    .await?;
    Ok(Json(list))
}

#[derive(serde::Serialize)]
struct ToggleOut {
    favorite: bool,
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Json(record): Json<TrendRecord>,
) -> Result<Json<ToggleOut>, ApiError> {
    let favorite = with_favorites(&state, move |f| f.toggle(record)).await?;
    Ok(Json(ToggleOut { favorite }))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileOut {
    favorites_count: usize,
    last_updated: Option<i64>,
}

async fn profile(State(state): State<AppState>) -> Json<ProfileOut> {
    Json(ProfileOut {
        favorites_count: state.favorites.len(),
        last_updated: state.feed.snapshot().last_updated,
    })
}
