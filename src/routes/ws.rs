//! WebSocket upgrade + message loop. Each client message gets one JSON reply;
//! achievement unlocks from any source (HTTP or WS) are pushed as they happen.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, instrument, warn};

use crate::protocol::{contents_out, AchievementOut, ClientWsMessage, ServerWsMessage, StatsOut};
use crate::state::{ActionReport, AppState, EngineEvent};

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "deyim_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "deyim_backend", "WebSocket connected");
  let mut events = state.subscribe();

  loop {
    let reply = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(msg) => {
            debug!(target: "deyim_backend", "WS received: {:?}", &msg);
            handle_client_ws(msg, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
        Some(Ok(_)) => continue,
      },
      event = events.recv() => match event {
        Ok(EngineEvent::AchievementUnlocked(a)) => ServerWsMessage::AchievementUnlocked { achievement: AchievementOut::from(a) },
        Err(RecvError::Lagged(n)) => {
          warn!(target: "deyim_backend", skipped = n, "WS subscriber lagged; events dropped");
          continue;
        }
        Err(RecvError::Closed) => break,
      },
    };

    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });

    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "deyim_backend", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "deyim_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  let result = |action: &'static str, active: Option<bool>, report: ActionReport| ServerWsMessage::ActionResult { action, active, report };
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::View { content_id } => result("view", None, state.view_content(&content_id).await),

    ClientWsMessage::Learn { content_id } => result("learn", None, state.learn_content(&content_id).await),

    ClientWsMessage::ToggleBookmark { content_id } => {
      let (t, report) = state.toggle_bookmark(&content_id).await;
      result("toggle_bookmark", Some(t.is_added()), report)
    }

    ClientWsMessage::ToggleFavorite { content_id } => {
      let (t, report) = state.toggle_favorite(&content_id).await;
      result("toggle_favorite", Some(t.is_added()), report)
    }

    ClientWsMessage::QuizAnswer { correct } => result("quiz_answer", None, state.record_quiz_answer(correct).await),

    ClientWsMessage::DailyLearned { content_id } =>
      result("daily_learned", None, state.mark_daily_item_learned(&content_id).await),

    ClientWsMessage::CompleteDailyQuiz => result("complete_daily_quiz", None, state.complete_daily_quiz().await),

    ClientWsMessage::LanguageExplored { language } =>
      result("language_explored", None, state.add_language_explored(language).await),

    ClientWsMessage::MemeInteraction => result("meme_interaction", None, state.increment_meme_interactions().await),

    ClientWsMessage::Search { query } => {
      let items = state.catalog.set_query(query.clone()).await;
      let progress = state.progress().await;
      info!(target: "content", %query, hits = items.len(), "WS search applied");
      ServerWsMessage::SearchResults { query, items: contents_out(items, &progress) }
    }

    ClientWsMessage::GetStats => ServerWsMessage::Stats { stats: StatsOut::from(state.stats().await) },
  }
}
