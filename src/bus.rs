//! Selection-signal bus.
//!
//! Every cursor movement funnels through [`crate::cursor::CursorManager`]
//! and ends up here. The bus guarantees at most one in-flight background
//! load at a time: each `notify` cancels whatever generation preceded it
//! before handing subscribers the new one, so a stale load that finishes
//! late can tell it's stale and drop its result instead of racing ahead.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Shared cancellation flag plus the generation it was minted for.
///
/// A background task checks `is_cancelled()` before applying its result; the
/// generation lets the dispatcher recognize and discard late replies from
/// a generation that isn't current anymore even if the flag race loses.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    generation: u64,
}

impl CancelToken {
    fn new(generation: u64) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            generation,
        }
    }

    /// Mark this token's generation as superseded.
    fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once this token's generation has been superseded.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// The generation this token was minted for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A single selection notification: what's now selected, and the
/// cancellation token background loaders should check before publishing.
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    /// Path of the newly selected key.
    pub path: String,
    /// Which hive this selection belongs to in diff mode ("old"/"new"),
    /// empty in normal mode.
    pub hive_path: String,
    /// Cancellation token for the generation this event started.
    pub cancel: CancelToken,
}

/// Fan-out bus: one producer (the cursor manager), N bounded subscriber
/// queues (value loader, key-info loader, ...). Publishing never blocks —
/// a full subscriber queue means that subscriber is behind and simply
/// misses the intermediate event, which is fine since only the latest
/// selection matters.
pub struct SelectionBus {
    subscribers: Vec<Sender<SelectionEvent>>,
    current: Option<CancelToken>,
    next_generation: AtomicU64,
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionBus {
    /// Create an empty bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            current: None,
            next_generation: AtomicU64::new(1),
        }
    }

    /// Register a new bounded subscriber queue and return its receiver.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<SelectionEvent> {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        self.subscribers.push(tx);
        rx
    }

    /// Cancel whatever generation is in flight, mint a new one, and push it
    /// to every subscriber. Subscribers with a full queue silently drop the
    /// event — they are already behind and only the newest selection
    /// matters to them.
    pub fn notify(&mut self, path: impl Into<String>, hive_path: impl Into<String>) -> CancelToken {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let token = CancelToken::new(generation);
        self.current = Some(token.clone());

        let event = SelectionEvent {
            path: path.into(),
            hive_path: hive_path.into(),
            cancel: token.clone(),
        };

        for sub in &self.subscribers {
            match sub.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => {}
            }
        }

        token
    }

    /// The token for whichever generation is currently in flight, if any.
    pub fn current_token(&self) -> Option<&CancelToken> {
        self.current.as_ref()
    }

    /// Cancel any in-flight generation without starting a new one. Used on
    /// shutdown so background threads stop touching shared state promptly.
    /// Unlike `notify`, the cancelled token is left in place rather than
    /// taken, so `current_token()` still reports it as the (now-cancelled)
    /// current generation.
    pub fn shutdown(&mut self) {
        if let Some(current) = &self.current {
            current.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_cancels_the_previous_generation() {
        let mut bus = SelectionBus::new();
        let rx = bus.subscribe(4);

        let first = bus.notify("A", "");
        assert!(!first.is_cancelled());

        let second = bus.notify("B", "");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_ne!(first.generation(), second.generation());

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].path, "B");
    }

    #[test]
    fn a_full_subscriber_queue_drops_instead_of_blocking() {
        let mut bus = SelectionBus::new();
        let rx = bus.subscribe(1);

        bus.notify("A", "");
        bus.notify("B", ""); // queue already has "A"; "B" is dropped, not blocked.

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, "A");
    }

    #[test]
    fn shutdown_cancels_in_flight_generation_without_starting_a_new_one() {
        let mut bus = SelectionBus::new();
        bus.notify("A", "");
        bus.shutdown();
        assert!(bus.current_token().unwrap().is_cancelled());
    }
}
