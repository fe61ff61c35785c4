//! HTTP endpoint handlers. These are thin wrappers that forward to `AppState`.
//! Content responses always carry romanization and the user's flags.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::domain::{Content, FilterOptions, FilterPatch, SettingsPatch};
use crate::protocol::*;
use crate::state::AppState;

fn not_found(id: &str) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: format!("content '{}' not found", id) })).into_response()
}

async fn list(state: &AppState, items: Vec<Content>) -> Json<Vec<ContentOut>> {
  let progress = state.progress().await;
  Json(contents_out(items, &progress))
}

async fn catalog_view(state: &AppState, query: String, filters: FilterOptions, items: Vec<Content>) -> Json<CatalogOut> {
  let progress = state.progress().await;
  Json(CatalogOut {
    query,
    filters,
    items: contents_out(items, &progress),
    error: state.catalog.last_error().await,
  })
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

// ---- catalog & search session ----

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (query, filters, items) = state.catalog.filtered().await;
  catalog_view(&state, query, filters, items).await
}

#[instrument(level = "info", skip(state, body), fields(query = %body.query))]
pub async fn http_post_search(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SearchIn>,
) -> impl IntoResponse {
  state.catalog.set_query(body.query).await;
  let (query, filters, items) = state.catalog.filtered().await;
  info!(target: "content", %query, hits = items.len(), "Search applied");
  catalog_view(&state, query, filters, items).await
}

#[instrument(level = "info", skip(state, patch))]
pub async fn http_post_filters(
  State(state): State<Arc<AppState>>,
  Json(patch): Json<FilterPatch>,
) -> impl IntoResponse {
  state.catalog.set_filters(patch).await;
  let (query, filters, items) = state.catalog.filtered().await;
  info!(target: "content", ?filters, hits = items.len(), "Filters applied");
  catalog_view(&state, query, filters, items).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset_filters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  state.catalog.reset_filters().await;
  let (query, filters, items) = state.catalog.filtered().await;
  catalog_view(&state, query, filters, items).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(RefreshOut::from(state.catalog.refresh().await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_content(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  match state.catalog.get_by_id(&id).await {
    Some(c) => {
      let progress = state.progress().await;
      Json(content_out(c, &progress)).into_response()
    }
    None => not_found(&id),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_related(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  list(&state, state.catalog.related(&id).await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_trending(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  list(&state, state.catalog.trending().await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_featured(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  list(&state, state.catalog.featured().await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_daily_expressions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  list(&state, state.catalog.daily_expressions().await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_by_type(State(state): State<Arc<AppState>>, Query(q): Query<TypeQuery>) -> impl IntoResponse {
  list(&state, state.catalog.by_type(q.kind).await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_by_language(State(state): State<Arc<AppState>>, Query(q): Query<LanguageQuery>) -> impl IntoResponse {
  list(&state, state.catalog.by_language(q.language).await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_travel(State(state): State<Arc<AppState>>, Query(q): Query<TravelQuery>) -> impl IntoResponse {
  list(&state, state.catalog.travel_phrases(q.language, q.category).await).await
}

// ---- progression ----

#[instrument(level = "info", skip(state))]
pub async fn http_post_view(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.view_content(&id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_learn(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.learn_content(&id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_bookmark(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  let (t, report) = state.toggle_bookmark(&id).await;
  Json(ToggleOut { active: t.is_added(), report })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_favorite(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  let (t, report) = state.toggle_favorite(&id).await;
  Json(ToggleOut { active: t.is_added(), report })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_download(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.add_download(&id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_download(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.remove_download(&id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_library(State(state): State<Arc<AppState>>, Query(q): Query<LibraryQuery>) -> impl IntoResponse {
  list(&state, state.library(q.list).await).await
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.snapshot().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_points(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(PointsOut::from(state.points()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.progress().await)
}

// ---- gamification ----

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(StatsOut::from(state.stats().await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (outcome, report) = state.record_daily_login().await;
  info!(target: "progress", ?outcome, "Daily login recorded");
  Json(report)
}

#[instrument(level = "info", skip(state, body), fields(correct = body.correct))]
pub async fn http_post_quiz_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuizAnswerIn>,
) -> impl IntoResponse {
  Json(state.record_quiz_answer(body.correct).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_share_stat(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.record_share().await)
}

#[instrument(level = "info", skip(state, body), fields(language = body.language.code()))]
pub async fn http_post_language(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LanguageIn>,
) -> impl IntoResponse {
  Json(state.add_language_explored(body.language).await)
}

#[instrument(level = "info", skip(state, body), fields(language = body.language.code()))]
pub async fn http_post_travel_mode(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LanguageIn>,
) -> impl IntoResponse {
  Json(state.complete_travel_mode(body.language).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_meme(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.increment_meme_interactions().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_achievements(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let list: Vec<AchievementOut> = state.achievements().await.into_iter().map(Into::into).collect();
  Json(list)
}

// ---- daily ----

#[instrument(level = "info", skip(state))]
pub async fn http_get_daily(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (queue, items) = state.daily_items().await;
  let progress = state.progress().await;
  Json(DailyOut { queue, items: contents_out(items, &progress) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_daily_learned(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
  Json(state.mark_daily_item_learned(&id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_daily_quiz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.build_daily_quiz().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_daily_quiz_complete(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.complete_daily_quiz().await)
}

// ---- settings, leaderboard, device ----

#[instrument(level = "info", skip(state))]
pub async fn http_get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.settings().await)
}

#[instrument(level = "info", skip(state, patch))]
pub async fn http_patch_settings(
  State(state): State<Arc<AppState>>,
  Json(patch): Json<SettingsPatch>,
) -> Response {
  match state.update_settings(patch).await {
    Ok(s) => Json(s).into_response(),
    Err(e) => {
      warn!(target: "deyim_backend", error = %e, "Rejected settings update");
      (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorOut { error: e.to_string() })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (entries, display_name, total_points) = state.leaderboard().await;
  Json(LeaderboardOut { entries, you: YouOut { display_name, total_points } })
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_share(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  match state.share_content(&id).await {
    Some(Ok(report)) => Json(report).into_response(),
    Some(Err(message)) => Json(DeviceOut { ok: false, message: Some(message) }).into_response(),
    None => not_found(&id),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_speak(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  match state.speak_content(&id).await {
    Some(res) => Json(DeviceOut { ok: res.is_ok(), message: res.err() }).into_response(),
    None => not_found(&id),
  }
}
