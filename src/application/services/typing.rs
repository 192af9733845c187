//! Typing Indicator Coordinator
//!
//! Per-room map of user -> last keystroke, expired after a fixed TTL.
//! Entries are keyed by user, not connection: when any of a user's
//! connections leaves the room, the user's indicator is cleared.
//!
//! Every refresh cancels the user's pending expiry and schedules a new one,
//! so a burst of keystrokes leaves exactly one live timer per (room, user).
//! A generation counter makes a timer that already fired, but lost the race
//! for the room lock against a refresh, a no-op.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::rooms::RoomBroadcaster;
use crate::application::dto::{ActiveTyper, ServerEvent, TypingPayload};
use crate::domain::RoomKey;

/// Default typing indicator lifetime
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug)]
struct TypingEntry {
    /// Monotonic time of the latest refresh; drives expiry.
    last_typed: Instant,
    /// Wall clock (epoch ms) at which the current typing streak began.
    since: i64,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

#[derive(Debug, Default)]
struct RoomTyping {
    entries: HashMap<i64, TypingEntry>,
    next_generation: u64,
}

struct Inner {
    rooms: DashMap<RoomKey, Arc<Mutex<RoomTyping>>>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    ttl: Duration,
}

/// Cheaply cloneable handle; clones share the same state.
#[derive(Clone)]
pub struct TypingCoordinator {
    inner: Arc<Inner>,
}

impl TypingCoordinator {
    pub fn new(broadcaster: Arc<dyn RoomBroadcaster>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                rooms: DashMap::new(),
                broadcaster,
                ttl,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Record a keystroke: refresh the user's entry, broadcast the active
    /// snapshot and reschedule the user's expiry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn typing(&self, room: RoomKey, user_id: i64) -> Vec<ActiveTyper> {
        loop {
            let state = self.inner.rooms.entry(room).or_default().value().clone();
            let mut guard = state.lock();
            // The room may have been dropped as empty between lookup and lock.
            if !self.is_current(room, &state) {
                continue;
            }

            let now = Instant::now();
            let ttl = self.inner.ttl;

            // Lazy sweep of entries whose timers have not run yet.
            guard.entries.retain(|_, entry| {
                let live = now.duration_since(entry.last_typed) < ttl;
                if !live {
                    if let Some(handle) = entry.expiry.take() {
                        handle.abort();
                    }
                }
                live
            });

            guard.next_generation += 1;
            let generation = guard.next_generation;

            let since = match guard.entries.get_mut(&user_id) {
                Some(entry) => {
                    if let Some(handle) = entry.expiry.take() {
                        handle.abort();
                    }
                    entry.since
                }
                None => Utc::now().timestamp_millis(),
            };

            let coordinator = self.clone();
            let expiry = tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                coordinator.expire(room, user_id, generation);
            });

            guard.entries.insert(
                user_id,
                TypingEntry {
                    last_typed: now,
                    since,
                    generation,
                    expiry: Some(expiry),
                },
            );

            let snapshot = snapshot(&guard, now, ttl);
            self.broadcast(room, snapshot.clone());
            return snapshot;
        }
    }

    /// Explicit `typing -> idle` transition (stop event, leave, disconnect).
    ///
    /// Broadcasts only if the user had an entry.
    pub fn stop(&self, room: RoomKey, user_id: i64) -> bool {
        let Some(state) = self.room(room) else {
            return false;
        };
        let mut guard = state.lock();
        let Some(mut entry) = guard.entries.remove(&user_id) else {
            return false;
        };
        if let Some(handle) = entry.expiry.take() {
            handle.abort();
        }

        let snapshot = snapshot(&guard, Instant::now(), self.inner.ttl);
        self.broadcast(room, snapshot);
        self.drop_if_empty(room, &state, &guard);
        true
    }

    /// Users typing in the room right now. Expired entries are excluded even
    /// if their timers have not fired yet.
    pub fn active_typers(&self, room: RoomKey) -> Vec<ActiveTyper> {
        self.room(room)
            .map(|state| snapshot(&state.lock(), Instant::now(), self.inner.ttl))
            .unwrap_or_default()
    }

    /// Number of expiry timers still pending in the room. A refresh replaces
    /// the previous timer, so this never exceeds the number of typers.
    pub fn pending_expiries(&self, room: RoomKey) -> usize {
        self.room(room)
            .map(|state| {
                state
                    .lock()
                    .entries
                    .values()
                    .filter(|entry| entry.expiry.as_ref().is_some_and(|h| !h.is_finished()))
                    .count()
            })
            .unwrap_or(0)
    }

    fn expire(&self, room: RoomKey, user_id: i64, generation: u64) {
        let Some(state) = self.room(room) else {
            return;
        };
        let mut guard = state.lock();
        let current = guard
            .entries
            .get(&user_id)
            .map(|entry| entry.generation == generation)
            .unwrap_or(false);
        if !current {
            return;
        }
        guard.entries.remove(&user_id);

        tracing::trace!(room = %room, user_id = user_id, "Typing indicator expired");

        let snapshot = snapshot(&guard, Instant::now(), self.inner.ttl);
        self.broadcast(room, snapshot);
        self.drop_if_empty(room, &state, &guard);
    }

    fn is_current(&self, room: RoomKey, state: &Arc<Mutex<RoomTyping>>) -> bool {
        self.inner
            .rooms
            .get(&room)
            .map(|current| Arc::ptr_eq(current.value(), state))
            .unwrap_or(false)
    }

    fn room(&self, room: RoomKey) -> Option<Arc<Mutex<RoomTyping>>> {
        self.inner.rooms.get(&room).map(|entry| entry.value().clone())
    }

    fn broadcast(&self, room: RoomKey, active_typers: Vec<ActiveTyper>) {
        let event = ServerEvent::Typing(TypingPayload {
            room,
            active_typers,
        });
        self.inner.broadcaster.broadcast_to_room(room, &event, None);
        crate::infrastructure::metrics::record_typing_broadcast();
    }

    fn drop_if_empty(&self, room: RoomKey, state: &Arc<Mutex<RoomTyping>>, guard: &RoomTyping) {
        if guard.entries.is_empty() {
            self.inner
                .rooms
                .remove_if(&room, |_, current| Arc::ptr_eq(current, state));
        }
    }
}

fn snapshot(state: &RoomTyping, now: Instant, ttl: Duration) -> Vec<ActiveTyper> {
    let mut typers: Vec<ActiveTyper> = state
        .entries
        .iter()
        .filter(|(_, entry)| now.duration_since(entry.last_typed) < ttl)
        .map(|(user_id, entry)| ActiveTyper {
            user_id: *user_id,
            since: entry.since,
        })
        .collect();
    typers.sort_by_key(|typer| typer.user_id);
    typers
}
