//! Background loading with stale-response guarding.
//!
//! Every load takes a [`Ticket`] from a [`RequestGuard`]. Starting a new load
//! aborts the task still in flight and bumps the generation, so a response
//! that arrives late is discarded instead of overwriting a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{ReportSnapshot, ReportSource, SourceClient, SourceError, SourceKind};

/// Monotonic request generation counter
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    generation: Arc<AtomicU64>,
}

/// Proof of which generation a request belongs to
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RequestGuard {
    /// Create a new guard at generation zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation; every earlier ticket becomes stale
    pub fn issue(&self) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

impl Ticket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Result of one background load
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub kind: SourceKind,
    pub result: Result<ReportSnapshot, SourceError>,
}

/// Runs loads on the tokio runtime and reports outcomes over a channel
#[derive(Debug)]
pub struct ReportLoader {
    client: SourceClient,
    guard: RequestGuard,
    in_flight: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
}

impl ReportLoader {
    /// Create a new loader and the receiving end of its outcome channel
    pub fn new(client: SourceClient) -> (Self, mpsc::UnboundedReceiver<LoadOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        let loader = Self {
            client,
            guard: RequestGuard::new(),
            in_flight: None,
            outcomes,
        };
        (loader, receiver)
    }

    /// Start loading `source`, superseding any load in flight. Returns the
    /// generation of the new request.
    pub fn start(&mut self, source: ReportSource) -> u64 {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let ticket = self.guard.issue();
        let generation = ticket.generation();
        let client = self.client.clone();
        let outcomes = self.outcomes.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let kind = source.kind();
            let result = client.load(&source).await;
            if ticket.is_current() {
                let _ = outcomes.send(LoadOutcome {
                    generation: ticket.generation(),
                    kind,
                    result,
                });
            } else {
                debug!("Discarding stale response for request {}", ticket.generation());
            }
        }));

        generation
    }

    /// Pass `outcome` through only if no newer load has started since it
    /// was sent
    pub fn accept(&self, outcome: LoadOutcome) -> Option<LoadOutcome> {
        if self.guard.is_current(outcome.generation) {
            Some(outcome)
        } else {
            debug!("Dropping outcome of superseded request {}", outcome.generation);
            None
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ReportLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
