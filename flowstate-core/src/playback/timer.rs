//! Cancellable one-shot timers for scheduled advances

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one scheduled advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Fires a ticket once after a delay unless cancelled first
pub trait Timer {
    fn schedule(&mut self, ticket: Ticket, delay: Duration);

    fn cancel(&mut self, ticket: Ticket);
}

/// Timer driven by hand, for tests and headless drivers
#[derive(Debug, Default)]
pub struct ManualTimer {
    pending: BTreeMap<Ticket, Duration>,
    max_outstanding: usize,
    cancelled: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets currently scheduled and not yet fired or cancelled
    pub fn pending(&self) -> Vec<(Ticket, Duration)> {
        self.pending.iter().map(|(t, d)| (*t, *d)).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Delay of the oldest outstanding ticket
    pub fn next_delay(&self) -> Option<Duration> {
        self.pending.values().next().copied()
    }

    /// Remove and return the oldest outstanding ticket, as if its delay elapsed
    pub fn fire(&mut self) -> Option<Ticket> {
        self.pending.pop_first().map(|(ticket, _)| ticket)
    }

    /// Largest number of simultaneously outstanding tickets ever observed
    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl Timer for ManualTimer {
    fn schedule(&mut self, ticket: Ticket, delay: Duration) {
        self.pending.insert(ticket, delay);
        self.max_outstanding = self.max_outstanding.max(self.pending.len());
    }

    fn cancel(&mut self, ticket: Ticket) {
        if self.pending.remove(&ticket).is_some() {
            self.cancelled += 1;
        }
    }
}

/// Timer backed by tokio tasks; fired tickets arrive on the paired receiver
pub struct TokioTimer {
    tx: mpsc::UnboundedSender<Ticket>,
    outstanding: Option<(Ticket, JoinHandle<()>)>,
}

impl TokioTimer {
    /// Create a timer and the receiver its tickets are delivered on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Ticket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                outstanding: None,
            },
            rx,
        )
    }
}

impl Timer for TokioTimer {
    fn schedule(&mut self, ticket: Ticket, delay: Duration) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session is shutting down
            let _ = tx.send(ticket);
        });

        if let Some((_, previous)) = self.outstanding.replace((ticket, handle)) {
            previous.abort();
        }
    }

    fn cancel(&mut self, ticket: Ticket) {
        if matches!(&self.outstanding, Some((current, _)) if *current == ticket) {
            if let Some((_, handle)) = self.outstanding.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.outstanding.take() {
            handle.abort();
        }
    }
}
