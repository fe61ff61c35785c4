//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase to match the stored JSON documents.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogLoad, CatalogOrigin};
use crate::domain::{
    Achievement, Content, ContentType, DailyQueue, FilterOptions, GamificationStats, LanguageCode,
    LeaderboardEntry, TravelCategory, UserProgress,
};
use crate::gamification::PointsTable;
use crate::pinyin::romanization_for;
use crate::state::{ActionReport, LibraryList};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    View {
        #[serde(rename = "contentId")]
        content_id: String,
    },
    Learn {
        #[serde(rename = "contentId")]
        content_id: String,
    },
    ToggleBookmark {
        #[serde(rename = "contentId")]
        content_id: String,
    },
    ToggleFavorite {
        #[serde(rename = "contentId")]
        content_id: String,
    },
    QuizAnswer {
        correct: bool,
    },
    DailyLearned {
        #[serde(rename = "contentId")]
        content_id: String,
    },
    CompleteDailyQuiz,
    LanguageExplored {
        language: LanguageCode,
    },
    MemeInteraction,
    Search {
        query: String,
    },
    GetStats,
}

/// Messages the server sends over WebSocket: replies and pushed events.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    ActionResult {
        action: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        active: Option<bool>,
        report: ActionReport,
    },
    SearchResults {
        query: String,
        items: Vec<ContentOut>,
    },
    Stats {
        stats: StatsOut,
    },
    AchievementUnlocked {
        achievement: AchievementOut,
    },
    Error {
        message: String,
    },
}

/// Content as served to the UI: romanization filled in plus the user's flags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOut {
    #[serde(flatten)]
    pub content: Content,
    pub is_learned: bool,
    pub is_bookmarked: bool,
    pub is_favorited: bool,
    pub is_downloaded: bool,
}

pub fn content_out(mut content: Content, progress: &UserProgress) -> ContentOut {
    content.romanization = romanization_for(&content);
    let id = content.id.as_str();
    ContentOut {
        is_learned: progress.is_learned(id),
        is_bookmarked: progress.bookmarked_ids.contains(id),
        is_favorited: progress.favorited_ids.contains(id),
        is_downloaded: progress.downloaded_ids.contains(id),
        content,
    }
}

pub fn contents_out(items: Vec<Content>, progress: &UserProgress) -> Vec<ContentOut> {
    items.into_iter().map(|c| content_out(c, progress)).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
    #[serde(flatten)]
    pub stats: GamificationStats,
    pub quiz_accuracy: u32,
    pub streak_dates: Vec<String>,
}

impl From<GamificationStats> for StatsOut {
    fn from(stats: GamificationStats) -> Self {
        Self { quiz_accuracy: stats.quiz_accuracy(), streak_dates: stats.streak_dates(), stats }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementOut {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub percent: u32,
}

impl From<Achievement> for AchievementOut {
    fn from(achievement: Achievement) -> Self {
        Self { percent: achievement.percent(), achievement }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

/// Current search session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOut {
    pub query: String,
    pub filters: FilterOptions,
    pub items: Vec<ContentOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchIn {
    pub query: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOut {
    pub origin: &'static str,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<CatalogLoad> for RefreshOut {
    fn from(load: CatalogLoad) -> Self {
        let origin = match load.origin {
            CatalogOrigin::Remote => "remote",
            CatalogOrigin::Bundled => "bundled",
        };
        Self { origin, count: load.count, error: load.error }
    }
}

#[derive(Debug, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub kind: ContentType,
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: LanguageCode,
}

#[derive(Debug, Deserialize)]
pub struct TravelQuery {
    pub language: LanguageCode,
    pub category: Option<TravelCategory>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOut {
    pub active: bool,
    #[serde(flatten)]
    pub report: ActionReport,
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub list: LibraryList,
}

#[derive(Deserialize)]
pub struct QuizAnswerIn {
    pub correct: bool,
}

#[derive(Deserialize)]
pub struct LanguageIn {
    pub language: LanguageCode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOut {
    #[serde(flatten)]
    pub queue: DailyQueue,
    pub items: Vec<ContentOut>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardOut {
    pub entries: Vec<LeaderboardEntry>,
    pub you: YouOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YouOut {
    pub display_name: String,
    pub total_points: u64,
}

/// Award amounts as the client sees them. The TOML table keeps snake_case keys.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsOut {
    pub daily_login: u64,
    pub learn_content: u64,
    pub daily_challenge: u64,
    pub view_content: u64,
    pub quiz_correct: u64,
    pub bookmark: u64,
    pub share: u64,
}

impl From<&PointsTable> for PointsOut {
    fn from(p: &PointsTable) -> Self {
        Self {
            daily_login: p.daily_login,
            learn_content: p.learn_content,
            daily_challenge: p.daily_challenge,
            view_content: p.view_content,
            quiz_correct: p.quiz_correct,
            bookmark: p.bookmark,
            share: p.share,
        }
    }
}

#[derive(Serialize)]
pub struct DeviceOut {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::sample_content;

    #[test]
    fn content_out_flattens_and_fills_pinyin() {
        let zh = sample_content().into_iter().find(|c| c.id == "zh-proverb-1").unwrap();
        let mut progress = UserProgress::default();
        progress.add_learned("zh-proverb-1");

        let v = serde_json::to_value(content_out(zh, &progress)).unwrap();
        assert_eq!(v["id"], "zh-proverb-1");
        assert_eq!(v["type"], "proverb");
        assert_eq!(v["isLearned"], true);
        assert_eq!(v["isBookmarked"], false);
        assert_eq!(v["romanization"], "xué ér bù sī zé wǎng");
    }

    #[test]
    fn ws_messages_use_type_tags() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"toggle_bookmark","contentId":"a"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::ToggleBookmark { content_id } if content_id == "a"));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"language_explored","language":"ja"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::LanguageExplored { language: LanguageCode::Ja }));

        let out = serde_json::to_value(ServerWsMessage::Pong).unwrap();
        assert_eq!(out["type"], "pong");
    }

    #[test]
    fn points_out_is_camel_case() {
        let v = serde_json::to_value(PointsOut::from(&PointsTable::default())).unwrap();
        assert_eq!(v["dailyLogin"], 10);
        assert_eq!(v["quizCorrect"], 10);
        assert!(v.get("daily_login").is_none());
    }

    #[test]
    fn stats_out_adds_derived_fields() {
        let stats = GamificationStats {
            quiz_total_count: 4,
            quiz_correct_count: 3,
            current_streak: 1,
            last_active_date: "2024-05-10".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(StatsOut::from(stats)).unwrap();
        assert_eq!(v["quizAccuracy"], 75);
        assert_eq!(v["streakDates"], serde_json::json!(["2024-05-10"]));
        assert_eq!(v["quizTotalCount"], 4);
    }
}
