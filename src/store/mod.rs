pub mod activity;
pub mod observer;
pub mod persistence;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::utils::clock::Clock;

use self::{
    activity::Activity,
    observer::{ObserverRegistry, StoreEvent, StoreObserver, SubscriptionId},
    persistence::{PersistedState, StateStorage},
};

/// Upper bound on stored history entries. Oldest entries are evicted first
/// once the cap is exceeded.
pub const MAX_HISTORY_SIZE: usize = 500;

/// Owns the current activity and the bounded history and is the only writer
/// of both. Every mutation persists the new state and then notifies the
/// subscribed observers, in that order.
pub struct ActivityStore<S> {
    storage: S,
    clock: Box<dyn Clock>,
    current: Option<Activity>,
    history: Vec<Activity>,
    max_history: usize,
    observers: ObserverRegistry,
}

impl<S: StateStorage> ActivityStore<S> {
    /// Restores the store from durable storage. An unreadable state yields an
    /// empty store rather than an error; the durable copy is the source of
    /// truth only when it can actually be read.
    pub async fn load(storage: S, clock: Box<dyn Clock>, max_history: usize) -> Self {
        let PersistedState {
            current,
            mut history,
        } = match storage.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to load persisted state, starting empty: {e:?}");
                PersistedState::default()
            }
        };
        history.truncate(max_history);

        Self {
            storage,
            clock,
            current,
            history,
            max_history,
            observers: ObserverRegistry::default(),
        }
    }

    pub fn current(&self) -> Option<&Activity> {
        self.current.as_ref()
    }

    /// Closed activities, most recent first.
    pub fn history(&self) -> &[Activity] {
        &self.history
    }

    /// Starts a new current activity, closing the previous one into history.
    /// Empty or whitespace-only text is ignored without a notification.
    pub async fn start_activity(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Ignoring blank activity text");
            return;
        }

        let now = self.clock.now();
        self.close_current(now);
        self.current = Some(Activity::started(trimmed.into(), now));
        self.persist().await;
        self.observers.emit(StoreEvent::ActivityChanged);
    }

    /// Ends the current activity without starting a new one. Observers are
    /// notified even when there was nothing to clear, so dependent views
    /// refresh either way.
    pub async fn clear_current(&mut self) {
        let now = self.clock.now();
        self.close_current(now);
        self.current = None;
        self.persist().await;
        self.observers.emit(StoreEvent::ActivityChanged);
    }

    /// Returns up to `limit` history entries deduplicated by text. The most
    /// recent occurrence of a text wins and recency order is preserved.
    pub fn recent_activities(&self, limit: usize) -> Vec<&Activity> {
        let mut seen = HashSet::new();
        self.history
            .iter()
            .filter(|activity| seen.insert(activity.text.clone()))
            .take(limit)
            .collect()
    }

    /// Deletes all history entries. The current activity is left untouched.
    pub async fn clear_history(&mut self) {
        self.history.clear();
        self.persist().await;
        self.observers.emit(StoreEvent::ActivityChanged);
    }

    /// Asks shells to present the history surface. No state change happens.
    pub fn request_history(&mut self) {
        self.observers.emit(StoreEvent::HistoryRequested);
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.unsubscribe(id);
    }

    fn close_current(&mut self, at: DateTime<Utc>) {
        if let Some(mut finished) = self.current.take() {
            finished.close(at);
            self.history.insert(0, finished);
            self.history.truncate(self.max_history);
        }
    }

    /// Persistence failures are swallowed so the store keeps operating in
    /// memory for the rest of the session.
    async fn persist(&mut self) {
        if let Err(e) = self.storage.save(self.current.as_ref(), &self.history).await {
            warn!("Failed to persist state: {e:?}");
        }
    }
}
