//! Request correlation for searches that may complete out of order.
//!
//! Every dispatch is tagged with a [`Ticket`] from a shared
//! [`RequestSequencer`]. The caller-owned [`DisplayedResult`] only accepts a
//! response whose ticket is still the latest issued, so a slow first search
//! can never overwrite a newer one. In-flight requests are not cancelled;
//! their results are simply dropped.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::RwLock;
use tracing::debug;

/// Monotonically increasing sequence number of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Issues tickets. Share it behind an `Arc` between the code that starts
/// searches and the code that applies their results.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket; it becomes the latest.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued ticket, if any.
    pub fn latest(&self) -> Option<Ticket> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(Ticket(n)),
        }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// A value tagged with the ticket of the dispatch that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    pub ticket: Ticket,
    pub value: T,
}

impl<T> Sequenced<T> {
    pub fn new(ticket: Ticket, value: T) -> Self {
        Self { ticket, value }
    }
}

/// The caller-owned "current displayed result".
///
/// Replaced in full by [`DisplayedResult::apply`]; never merged.
#[derive(Debug)]
pub struct DisplayedResult<T> {
    sequencer: Arc<RequestSequencer>,
    current: RwLock<Option<Sequenced<T>>>,
}

impl<T: Clone> DisplayedResult<T> {
    pub fn new(sequencer: Arc<RequestSequencer>) -> Self {
        Self {
            sequencer,
            current: RwLock::new(None),
        }
    }

    /// Installs `incoming` if its ticket is the latest issued and newer than
    /// what is shown. Returns `false` for a stale response, which is dropped.
    pub async fn apply(&self, incoming: Sequenced<T>) -> bool {
        if !self.sequencer.is_latest(incoming.ticket) {
            debug!(
                ticket = incoming.ticket.get(),
                latest = ?self.sequencer.latest().map(Ticket::get),
                "dropping stale response"
            );
            return false;
        }

        let mut current = self.current.write().await;
        if let Some(shown) = current.as_ref() {
            if shown.ticket >= incoming.ticket {
                debug!(ticket = incoming.ticket.get(), "response already displayed");
                return false;
            }
        }
        *current = Some(incoming);
        true
    }

    /// Clone of the displayed value.
    pub async fn snapshot(&self) -> Option<T> {
        self.current.read().await.as_ref().map(|s| s.value.clone())
    }

    /// Ticket of the displayed value.
    pub async fn ticket(&self) -> Option<Ticket> {
        self.current.read().await.as_ref().map(|s| s.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_increase() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), None);
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert!(seq.is_latest(b));
        assert!(!seq.is_latest(a));
    }

    #[tokio::test]
    async fn slow_first_response_does_not_overwrite_newer_one() {
        let seq = Arc::new(RequestSequencer::new());
        let shown = DisplayedResult::new(seq.clone());

        let first = seq.issue();
        let second = seq.issue();

        // The second search completes first.
        assert!(shown.apply(Sequenced::new(second, "fast")).await);
        // The first one arrives late and is discarded.
        assert!(!shown.apply(Sequenced::new(first, "slow")).await);

        assert_eq!(shown.snapshot().await, Some("fast"));
        assert_eq!(shown.ticket().await, Some(second));
    }

    #[tokio::test]
    async fn response_is_dropped_once_a_newer_search_starts() {
        let seq = Arc::new(RequestSequencer::new());
        let shown = DisplayedResult::new(seq.clone());

        let first = seq.issue();
        let _pending = seq.issue();
        assert!(!shown.apply(Sequenced::new(first, 1)).await);
        assert_eq!(shown.snapshot().await, None);
    }

    #[tokio::test]
    async fn latest_response_replaces_previous_in_full() {
        let seq = Arc::new(RequestSequencer::new());
        let shown = DisplayedResult::new(seq.clone());

        assert!(shown.apply(Sequenced::new(seq.issue(), vec![1, 2, 3])).await);
        assert!(shown.apply(Sequenced::new(seq.issue(), vec![9])).await);
        assert_eq!(shown.snapshot().await, Some(vec![9]));
    }
}
