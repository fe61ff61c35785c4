//! Application state: the catalog, the single user's profile, and the
//! collaborators (storage, clock, device) every operation runs against.
//!
//! Every mutation follows the same path:
//!   1. take the profile write lock,
//!   2. apply the change and record which entities it touched (`Dirty`),
//!   3. `commit`: persist the dirty entities; when progress or stats changed,
//!      run the achievement evaluator, persist the list and broadcast unlocks.
//!
//! Writes are best-effort: a failed write is logged and the in-memory profile
//! stays authoritative.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::achievements;
use crate::catalog::{CatalogLoad, ContentRepository, ContentSource};
use crate::clock::Clock;
use crate::device::{speech_locale, DeviceActions, SPEECH_RATE};
use crate::domain::{
    Achievement, Content, DailyQueue, GamificationStats, LanguageCode, LeaderboardEntry, SettingsPatch,
    UserProgress, UserSettings,
};
use crate::gamification::{LoginOutcome, PointsTable};
use crate::progress::Toggle;
use crate::quiz::{self, QuizQuestion};
use crate::seeds::mock_leaderboard;
use crate::storage::{load_or_default, persist, KeyValueStore, StorageKey};

const APP_NAME: &str = "Deyim";
const EVENT_CAPACITY: usize = 64;
const REMINDER_FORMAT: &str = "%H:%M";

/// Everything persisted for the user.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub progress: UserProgress,
    pub stats: GamificationStats,
    pub achievements: Vec<Achievement>,
    pub daily: DailyQueue,
    pub settings: UserSettings,
}

impl Default for Profile {
    /// A fresh user still carries the full achievement table.
    fn default() -> Self {
        Self {
            progress: UserProgress::default(),
            stats: GamificationStats::default(),
            achievements: achievements::default_achievements(),
            daily: DailyQueue::default(),
            settings: UserSettings::default(),
        }
    }
}

/// Which profile entities a mutation touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dirty {
    pub progress: bool,
    pub stats: bool,
    pub daily: bool,
    pub settings: bool,
}

impl Dirty {
    pub const NONE: Dirty = Dirty { progress: false, stats: false, daily: false, settings: false };
    pub const PROGRESS: Dirty = Dirty { progress: true, ..Dirty::NONE };
    pub const STATS: Dirty = Dirty { stats: true, ..Dirty::NONE };
    pub const BOTH: Dirty = Dirty { progress: true, stats: true, ..Dirty::NONE };

    pub fn any(self) -> bool {
        self.progress || self.stats || self.daily || self.settings
    }

    fn affects_achievements(self) -> bool {
        self.progress || self.stats
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryList {
    Learned,
    Bookmarks,
    Favorites,
    Downloads,
    Recent,
}

/// Pushed to WebSocket subscribers.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    AchievementUnlocked(Achievement),
}

/// Outcome of one user action.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    /// Whether any state changed.
    pub changed: bool,
    pub points_awarded: u64,
    pub unlocked: Vec<Achievement>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("daily reminder time must be HH:MM, got '{0}'")]
    InvalidReminderTime(String),
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

pub struct AppState {
    pub catalog: ContentRepository,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    device: Arc<dyn DeviceActions>,
    points: PointsTable,
    profile: RwLock<Profile>,
    events: broadcast::Sender<EngineEvent>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Option<Arc<dyn ContentSource>>,
        clock: Arc<dyn Clock>,
        device: Arc<dyn DeviceActions>,
        points: PointsTable,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog: ContentRepository::new(source),
            store,
            clock,
            device,
            points,
            profile: RwLock::new(Profile::default()),
            events,
        }
    }

    /// Ordered startup: profile, then catalog, then the daily login.
    #[instrument(level = "info", skip(self))]
    pub async fn start(&self) -> CatalogLoad {
        self.load_profile().await;
        let load = self.catalog.load_all().await;
        let (outcome, report) = self.record_daily_login().await;
        info!(target: "deyim_backend", ?outcome, points = report.points_awarded, count = load.count, "Startup complete");
        load
    }

    /// Read every entity independently; anything missing or unreadable is defaulted.
    #[instrument(level = "info", skip(self))]
    pub async fn load_profile(&self) {
        let store = self.store.as_ref();
        let mut progress: UserProgress = load_or_default(store, StorageKey::UserProgress).await;
        progress.normalize();
        let stats: GamificationStats = load_or_default(store, StorageKey::GamificationStats).await;
        let loaded: Vec<Achievement> = load_or_default(store, StorageKey::Achievements).await;
        let daily: DailyQueue = load_or_default(store, StorageKey::DailyQueue).await;
        let settings: UserSettings = load_or_default(store, StorageKey::UserSettings).await;

        let mut p = self.profile.write().await;
        *p = Profile { progress, stats, achievements: achievements::normalize(loaded), daily, settings };
        info!(
            target: "progress",
            learned = p.progress.learned_content_ids.len(),
            points = p.stats.total_points,
            streak = p.stats.current_streak,
            "Profile loaded"
        );
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn points(&self) -> &PointsTable {
        &self.points
    }

    pub async fn snapshot(&self) -> Profile {
        self.profile.read().await.clone()
    }

    pub async fn progress(&self) -> UserProgress {
        self.profile.read().await.progress.clone()
    }

    pub async fn stats(&self) -> GamificationStats {
        self.profile.read().await.stats.clone()
    }

    pub async fn achievements(&self) -> Vec<Achievement> {
        self.profile.read().await.achievements.clone()
    }

    pub async fn settings(&self) -> UserSettings {
        self.profile.read().await.settings.clone()
    }

    /// Persist dirty entities, then re-evaluate achievements when counters may have moved.
    async fn commit(&self, p: &mut Profile, dirty: Dirty) -> Vec<Achievement> {
        let store = self.store.as_ref();
        if dirty.progress {
            persist(store, StorageKey::UserProgress, &p.progress).await;
        }
        if dirty.stats {
            persist(store, StorageKey::GamificationStats, &p.stats).await;
        }
        if dirty.daily {
            persist(store, StorageKey::DailyQueue, &p.daily).await;
        }
        if dirty.settings {
            persist(store, StorageKey::UserSettings, &p.settings).await;
        }
        if !dirty.affects_achievements() {
            return vec![];
        }

        let unlocked = achievements::evaluate(&mut p.achievements, &p.progress, &p.stats, self.clock.now());
        persist(store, StorageKey::Achievements, &p.achievements).await;
        for a in &unlocked {
            info!(target: "progress", key = ?a.key, goal = a.target, "Achievement unlocked");
            // No subscribers is fine.
            let _ = self.events.send(EngineEvent::AchievementUnlocked(a.clone()));
        }
        unlocked
    }

    /// Run one mutation under the profile lock and commit what it touched.
    async fn mutate<T, F>(&self, action: &'static str, f: F) -> (T, ActionReport)
    where
        F: FnOnce(&mut Profile, &PointsTable, NaiveDate) -> (T, Dirty),
    {
        let today = self.clock.today();
        let mut p = self.profile.write().await;
        let before = p.stats.total_points;
        let (out, dirty) = f(&mut *p, &self.points, today);
        let unlocked = self.commit(&mut *p, dirty).await;
        let report = ActionReport {
            changed: dirty.any(),
            points_awarded: p.stats.total_points.saturating_sub(before),
            unlocked,
        };
        debug!(target: "progress", action, changed = report.changed, points = report.points_awarded, total = p.stats.total_points, "Action applied");
        (out, report)
    }

    // ---- progression ----

    /// Every view counts, including repeats. Opening an item also explores its
    /// language; unknown ids are still recorded as viewed.
    #[instrument(level = "info", skip(self))]
    pub async fn view_content(&self, id: &str) -> ActionReport {
        let language = self.catalog.get_by_id(id).await.map(|c| c.language);
        self.mutate("view", |p, pts, _| {
            p.progress.record_view(id);
            p.stats.award(pts.view_content);
            if let Some(lang) = language {
                if p.stats.add_language_explored(lang) {
                    debug!(target: "progress", ?lang, "Language explored on view");
                }
            }
            ((), Dirty::BOTH)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn learn_content(&self, id: &str) -> ActionReport {
        self.mutate("learn", |p, pts, _| ((), learn(p, pts, id))).await.1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn toggle_bookmark(&self, id: &str) -> (Toggle, ActionReport) {
        self.mutate("bookmark", |p, pts, _| {
            let t = p.progress.toggle_bookmark(id);
            if t.is_added() {
                p.stats.award(pts.bookmark);
                (t, Dirty::BOTH)
            } else {
                (t, Dirty::PROGRESS)
            }
        })
        .await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn toggle_favorite(&self, id: &str) -> (Toggle, ActionReport) {
        self.mutate("favorite", |p, _, _| (p.progress.toggle_favorite(id), Dirty::PROGRESS)).await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn add_download(&self, id: &str) -> ActionReport {
        self.mutate("download", |p, _, _| {
            let dirty = if p.progress.add_downloaded(id) { Dirty::PROGRESS } else { Dirty::NONE };
            ((), dirty)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn remove_download(&self, id: &str) -> ActionReport {
        self.mutate("remove_download", |p, _, _| {
            let dirty = if p.progress.remove_downloaded(id) { Dirty::PROGRESS } else { Dirty::NONE };
            ((), dirty)
        })
        .await
        .1
    }

    /// Items of one library list. Recently viewed keeps recency order; the rest
    /// follow catalog order. Ids no longer in the catalog are dropped.
    pub async fn library(&self, list: LibraryList) -> Vec<Content> {
        let ids = {
            let p = self.profile.read().await;
            let set = match list {
                LibraryList::Learned => &p.progress.learned_content_ids,
                LibraryList::Bookmarks => &p.progress.bookmarked_ids,
                LibraryList::Favorites => &p.progress.favorited_ids,
                LibraryList::Downloads => &p.progress.downloaded_ids,
                LibraryList::Recent => &p.progress.recently_viewed_ids,
            };
            if set.is_empty() {
                return vec![];
            }
            set.as_slice().to_vec()
        };
        let mut items = self.catalog.get_by_ids(&ids).await;
        if list == LibraryList::Recent {
            items.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
        }
        items
    }

    // ---- gamification ----

    #[instrument(level = "info", skip(self))]
    pub async fn record_daily_login(&self) -> (LoginOutcome, ActionReport) {
        self.mutate("daily_login", |p, pts, today| {
            let outcome = p.stats.record_daily_login(today, pts);
            let dirty = match outcome {
                LoginOutcome::AlreadyRecorded => Dirty::NONE,
                LoginOutcome::Continued { streak } => {
                    info!(target: "progress", streak, longest = p.stats.longest_streak, "Streak continued");
                    Dirty::STATS
                }
                LoginOutcome::Started => {
                    info!(target: "progress", date = %p.stats.last_active_date, "Streak started");
                    Dirty::STATS
                }
            };
            (outcome, dirty)
        })
        .await
    }

    #[instrument(level = "info", skip(self))]
    pub async fn record_quiz_answer(&self, correct: bool) -> ActionReport {
        self.mutate("quiz_answer", |p, pts, _| {
            p.stats.record_quiz_answer(correct, pts);
            ((), Dirty::STATS)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn record_share(&self) -> ActionReport {
        self.mutate("share", |p, pts, _| {
            p.stats.record_share(pts);
            ((), Dirty::STATS)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn add_language_explored(&self, lang: LanguageCode) -> ActionReport {
        self.mutate("language_explored", |p, _, _| {
            let dirty = if p.stats.add_language_explored(lang) { Dirty::STATS } else { Dirty::NONE };
            ((), dirty)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn complete_travel_mode(&self, lang: LanguageCode) -> ActionReport {
        self.mutate("travel_mode", |p, _, _| {
            let dirty = if p.stats.complete_travel_mode(lang) { Dirty::STATS } else { Dirty::NONE };
            ((), dirty)
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn increment_meme_interactions(&self) -> ActionReport {
        self.mutate("meme", |p, _, _| {
            p.stats.increment_meme_interactions();
            ((), Dirty::STATS)
        })
        .await
        .1
    }

    // ---- daily queue ----

    /// Today's queue, generating it first when the stored one is stale or empty.
    #[instrument(level = "info", skip(self))]
    pub async fn daily_queue(&self) -> DailyQueue {
        let catalog = self.catalog.all().await;
        let (queue, _) = self
            .mutate("daily_generate", |p, _, today| {
                let generated = p.daily.generate(&catalog, &p.progress.learned_content_ids, today, &mut rand::thread_rng());
                if generated {
                    info!(target: "progress", date = %p.daily.date, items = p.daily.content_ids.len(), "Daily queue generated");
                }
                let dirty = Dirty { daily: generated, ..Dirty::NONE };
                (p.daily.clone(), dirty)
            })
            .await;
        queue
    }

    pub async fn daily_items(&self) -> (DailyQueue, Vec<Content>) {
        let queue = self.daily_queue().await;
        let items = self.catalog.get_by_ids(&queue.content_ids).await;
        (queue, items)
    }

    /// Marks a daily item, then learns it. Learning only awards on the first-ever learn.
    #[instrument(level = "info", skip(self))]
    pub async fn mark_daily_item_learned(&self, id: &str) -> ActionReport {
        self.mutate("daily_learned", |p, pts, _| {
            if !p.daily.mark_learned(id) {
                return ((), Dirty::NONE);
            }
            let learned = learn(p, pts, id);
            ((), Dirty { daily: true, ..learned })
        })
        .await
        .1
    }

    #[instrument(level = "info", skip(self))]
    pub async fn complete_daily_quiz(&self) -> ActionReport {
        self.mutate("daily_quiz", |p, pts, _| {
            if !p.daily.complete_quiz() {
                return ((), Dirty::NONE);
            }
            p.stats.record_daily_challenge(pts);
            ((), Dirty { daily: true, stats: true, ..Dirty::NONE })
        })
        .await
        .1
    }

    /// Questions for today's queue.
    pub async fn build_daily_quiz(&self) -> Vec<QuizQuestion> {
        let (_, items) = self.daily_items().await;
        quiz::build_questions(&items, &mut rand::thread_rng())
    }

    // ---- settings & profile extras ----

    #[instrument(level = "info", skip(self, patch))]
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<UserSettings, SettingsError> {
        if let Some(t) = &patch.daily_reminder_time {
            validate_reminder_time(t)?;
        }
        if patch.display_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(SettingsError::EmptyDisplayName);
        }

        let (settings, _) = self
            .mutate("settings", |p, _, _| {
                let s = &mut p.settings;
                if let Some(v) = patch.theme { s.theme = v; }
                if let Some(v) = patch.app_language { s.app_language = v; }
                if let Some(v) = patch.notifications_enabled { s.notifications_enabled = v; }
                if let Some(v) = patch.daily_reminder_time { s.daily_reminder_time = v; }
                if let Some(v) = patch.display_name { s.display_name = v.trim().to_string(); }
                if let Some(v) = patch.avatar_uri { s.avatar_uri = v; }
                (s.clone(), Dirty { settings: true, ..Dirty::NONE })
            })
            .await;
        Ok(settings)
    }

    /// Mock table plus the user's own row (unranked).
    pub async fn leaderboard(&self) -> (Vec<LeaderboardEntry>, String, u64) {
        let p = self.profile.read().await;
        (mock_leaderboard(), p.settings.display_name.clone(), p.stats.total_points)
    }

    // ---- device ----

    /// Share an item. Only a completed share counts. None when the id is unknown.
    #[instrument(level = "info", skip(self))]
    pub async fn share_content(&self, id: &str) -> Option<Result<ActionReport, String>> {
        let content = self.catalog.get_by_id(id).await?;
        match self.device.share(&share_message(&content)).await {
            Ok(()) => Some(Ok(self.record_share().await)),
            Err(e) => {
                warn!(target: "deyim_backend", %id, error = %e, "Share failed");
                Some(Err(e))
            }
        }
    }

    /// Read an item aloud. None when the id is unknown.
    #[instrument(level = "info", skip(self))]
    pub async fn speak_content(&self, id: &str) -> Option<Result<(), String>> {
        let content = self.catalog.get_by_id(id).await?;
        let res = self.device.speak(&content.text, speech_locale(content.language), SPEECH_RATE).await;
        if let Err(e) = &res {
            warn!(target: "deyim_backend", %id, error = %e, "Speech failed");
        }
        Some(res)
    }
}

/// First-ever learn awards points and bumps the learned counter.
fn learn(p: &mut Profile, pts: &PointsTable, id: &str) -> Dirty {
    if !p.progress.add_learned(id) {
        return Dirty::NONE;
    }
    p.stats.record_learned(pts);
    Dirty::BOTH
}

fn validate_reminder_time(t: &str) -> Result<(), SettingsError> {
    let well_formed = t.len() == 5 && NaiveTime::parse_from_str(t, REMINDER_FORMAT).is_ok();
    if well_formed { Ok(()) } else { Err(SettingsError::InvalidReminderTime(t.to_string())) }
}

fn share_message(c: &Content) -> String {
    match c.translation.as_deref().filter(|t| !t.is_empty()) {
        Some(tr) => format!("{}\n\n{}\n\n{}", c.text, tr, APP_NAME),
        None => format!("{}\n\n{}", c.text, APP_NAME),
    }
}
