// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory job event journal with live fan-out.
//
// Every print attempt is recorded once into a bounded ring (oldest evicted
// first) and pushed to each live subscriber's bounded mailbox. A full mailbox
// drops the event for that subscriber only; the producer never waits.
//
// # Locking
//
// The ring and the subscriber list have separate mutexes. `record` takes the
// subscriber lock before releasing the ring lock so broadcast order equals id
// order; `subscribe` never holds both. Nothing blocks while a lock is held
// (`try_send` only).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use graham_core::config::{DEFAULT_HISTORY_CAPACITY, DEFAULT_MAILBOX_SIZE, MAX_MAILBOX_SIZE};
use graham_core::types::{JobDraft, JobEvent, JobId};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, info};

/// Identifier of one live subscriber.
pub type SubscriberId = u64;

/// The ring grows on demand past this many events.
const PREALLOCATED_EVENTS: usize = 1024;

struct History {
    events: VecDeque<JobEvent>,
    next_id: JobId,
}

struct Mailbox {
    id: SubscriberId,
    tx: mpsc::Sender<JobEvent>,
}

/// Bounded, thread-safe record of print attempts.
pub struct JobJournal {
    history: Mutex<History>,
    subscribers: Mutex<Vec<Mailbox>>,
    capacity: usize,
    mailbox_size: usize,
    next_subscriber: AtomicU64,
    dropped: AtomicU64,
}

impl Default for JobJournal {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_MAILBOX_SIZE)
    }
}

impl JobJournal {
    /// Zero sizes are clamped to one; the mailbox size is capped at
    /// `MAX_MAILBOX_SIZE`.
    pub fn new(capacity: usize, mailbox_size: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: Mutex::new(History {
                events: VecDeque::with_capacity(capacity.min(PREALLOCATED_EVENTS)),
                next_id: 1,
            }),
            subscribers: Mutex::new(Vec::new()),
            capacity,
            mailbox_size: mailbox_size.clamp(1, MAX_MAILBOX_SIZE),
            next_subscriber: AtomicU64::new(1),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mailbox_size(&self) -> usize {
        self.mailbox_size
    }

    /// Number of events currently retained.
    pub fn len(&self) -> usize {
        lock(&self.history).events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Live deliveries dropped because a mailbox was full.
    pub fn dropped_deliveries(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stamp the next id on `draft`, append it, and broadcast it.
    pub fn record(&self, draft: JobDraft) -> JobEvent {
        let mut history = lock(&self.history);
        let id = history.next_id;
        history.next_id += 1;
        let event = JobEvent::from_draft(id, draft);
        history.events.push_back(event.clone());
        while history.events.len() > self.capacity {
            if let Some(evicted) = history.events.pop_front() {
                debug!(id = evicted.id, "evicted oldest job event");
            }
        }

        // Hand over to the subscriber lock before letting the next writer in.
        let mut subscribers = lock(&self.subscribers);
        drop(history);

        subscribers.retain(|mailbox| match mailbox.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(subscriber = mailbox.id, id, "mailbox full, dropping live event");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = mailbox.id, "pruning closed mailbox");
                false
            }
        });

        event
    }

    /// Copy of the retained events, oldest first.
    pub fn snapshot(&self) -> Vec<JobEvent> {
        lock(&self.history).events.iter().cloned().collect()
    }

    /// Register a live subscriber.
    ///
    /// The returned subscription yields the retained history first, then
    /// every later event, with no duplicate ids. It unsubscribes on drop.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.mailbox_size);

        // Register before snapshotting: anything missing from the snapshot
        // is then guaranteed to reach the mailbox.
        lock(&self.subscribers).push(Mailbox { id, tx });
        let replay: VecDeque<JobEvent> = self.snapshot().into();

        info!(
            subscriber = id,
            replay = replay.len(),
            subscribers = self.subscriber_count(),
            "log stream subscriber attached"
        );

        Subscription {
            id,
            last_seen: replay.back().map(|e| e.id),
            replay,
            rx,
            journal: Arc::downgrade(self),
        }
    }

    /// Remove a subscriber's mailbox. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|m| m.id != id);
        if subscribers.len() != before {
            info!(subscriber = id, subscribers = subscribers.len(), "log stream subscriber detached");
        }
    }
}

/// Replay-then-live view of the journal for one consumer.
pub struct Subscription {
    id: SubscriberId,
    replay: VecDeque<JobEvent>,
    last_seen: Option<JobId>,
    rx: mpsc::Receiver<JobEvent>,
    journal: Weak<JobJournal>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Events still waiting to be replayed.
    pub fn pending_replay(&self) -> usize {
        self.replay.len()
    }

    /// Next event, waiting for a live one once the replay is exhausted.
    ///
    /// Returns `None` when the journal is gone.
    pub async fn next(&mut self) -> Option<JobEvent> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }
        loop {
            let event = self.rx.recv().await?;
            if let Some(event) = self.accept(event) {
                return Some(event);
            }
        }
    }

    /// Next event if one is available right now.
    pub fn try_next(&mut self) -> Option<JobEvent> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, event: JobEvent) -> Option<JobEvent> {
        if self.last_seen.is_some_and(|last| event.id <= last) {
            return None;
        }
        self.last_seen = Some(event.id);
        Some(event)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(journal) = self.journal.upgrade() {
            journal.unsubscribe(self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
