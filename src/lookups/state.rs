use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

/// What an observer of one lookup kind sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum LookupResult<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

/// Issued by [`LookupState::begin`]; only the newest ticket may finish a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct LookupState<T> {
    tx: watch::Sender<LookupResult<T>>,
    generation: AtomicU64,
}

impl<T: Clone> LookupState<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LookupResult::Idle);
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> LookupResult<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupResult<T>> {
        self.tx.subscribe()
    }

    /// Moves to `Loading` from any state. Earlier tickets become stale.
    pub fn begin(&self) -> Ticket {
        let mut ticket = Ticket(0);
        // Generation bump and state change happen under the channel's write lock.
        self.tx.send_modify(|state| {
            ticket = Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = LookupResult::Loading;
        });
        ticket
    }

    /// Publishes the outcome unless a newer lookup has begun. Returns whether it was applied.
    pub fn finish<E: Display>(&self, ticket: Ticket, outcome: Result<T, E>) -> bool {
        let next = match outcome {
            Ok(value) => LookupResult::Success(value),
            Err(e) => LookupResult::Error(e.to_string()),
        };
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            *state = next;
            true
        })
    }
}

impl<T: Clone> Default for LookupState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_idle() {
        let state = LookupState::<u32>::new();
        assert_eq!(state.current(), LookupResult::Idle);
    }

    #[test]
    fn begin_then_finish() {
        let state = LookupState::<u32>::new();
        let t = state.begin();
        assert_eq!(state.current(), LookupResult::Loading);
        assert!(state.finish::<String>(t, Ok(7)));
        assert_eq!(state.current(), LookupResult::Success(7));
    }

    #[test]
    fn error_keeps_message() {
        let state = LookupState::<u32>::new();
        let t = state.begin();
        state.finish(t, Err("Product not found"));
        assert_eq!(state.current(), LookupResult::Error("Product not found".into()));
    }

    #[test]
    fn new_request_restarts_from_terminal_state() {
        let state = LookupState::<u32>::new();
        let t = state.begin();
        state.finish::<String>(t, Ok(1));
        state.begin();
        assert_eq!(state.current(), LookupResult::Loading);
    }

    #[test]
    fn stale_ticket_cannot_overwrite_newer_lookup() {
        let state = LookupState::<&str>::new();
        let first = state.begin();
        let second = state.begin();

        assert!(!state.finish::<String>(first, Ok("A")));
        assert_eq!(state.current(), LookupResult::Loading);

        assert!(state.finish::<String>(second, Ok("B")));
        assert!(!state.finish::<String>(first, Ok("A")));
        assert_eq!(state.current(), LookupResult::Success("B"));
    }

    #[tokio::test]
    async fn observers_are_notified() {
        let state = LookupState::<u32>::new();
        let mut rx = state.subscribe();
        let t = state.begin();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LookupResult::Loading);
        state.finish::<String>(t, Ok(3));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), LookupResult::Success(3));
    }

    #[test]
    fn serializes_as_tagged_state() {
        assert_eq!(
            serde_json::to_value(LookupResult::<u32>::Idle).unwrap(),
            json!({ "state": "idle" })
        );
        assert_eq!(
            serde_json::to_value(LookupResult::Success(vec!["x"])).unwrap(),
            json!({ "state": "success", "data": ["x"] })
        );
        assert_eq!(
            serde_json::to_value(LookupResult::<u32>::Error("boom".into())).unwrap(),
            json!({ "state": "error", "data": "boom" })
        );
    }
}
