//! Background track loading.
//!
//! Requests run on short-lived worker threads so a slow fetch never delays
//! a newer one. At most `MAX_IN_FLIGHT` workers exist at a time; a request
//! arriving while all of them are busy is parked, and a newer request
//! replaces the parked one. The first worker to finish picks up whatever is
//! parked. Fetches are never cancelled, so workers stuck on a hung remote
//! keep their slot until the fetch returns.
//!
//! Outcomes come back over a channel tagged with their ticket; the event
//! loop hands them to the controller, which discards any that are no longer
//! current. Requests already superseded before their fetch starts are
//! skipped outright.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::debug;

use crate::library::Track;

use super::fetch::Fetcher;
use super::types::{LoadOutcome, LoadTicket};

const MAX_IN_FLIGHT: usize = 4;

#[derive(Default)]
struct Slots {
    busy: usize,
    parked: Option<(LoadTicket, Track)>,
}

struct Shared {
    fetcher: Box<dyn Fetcher>,
    latest: AtomicU64,
    limit: usize,
    slots: Mutex<Slots>,
}

pub struct Loader {
    shared: Arc<Shared>,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl Loader {
    pub fn new<F: Fetcher>(fetcher: F) -> Self {
        Self::with_limit(fetcher, MAX_IN_FLIGHT)
    }

    pub fn with_limit<F: Fetcher>(fetcher: F, limit: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            shared: Arc::new(Shared {
                fetcher: Box::new(fetcher),
                latest: AtomicU64::new(0),
                limit: limit.max(1),
                slots: Mutex::new(Slots::default()),
            }),
            tx,
            rx,
        }
    }

    /// Start loading `track` for `ticket` in the background.
    pub fn request(&self, ticket: LoadTicket, track: Track) {
        self.shared.latest.fetch_max(ticket.0, Ordering::AcqRel);

        {
            let mut slots = self.shared.lock_slots();
            if slots.busy >= self.shared.limit {
                if let Some((old, _)) = slots.parked.replace((ticket, track)) {
                    debug!(ticket = old.0, "parked load replaced");
                }
                debug!(ticket = ticket.0, busy = slots.busy, "all loaders busy, request parked");
                return;
            }
            slots.busy += 1;
        }

        let shared = self.shared.clone();
        let tx = self.tx.clone();
        thread::spawn(move || shared.work(ticket, track, &tx));
    }

    /// Next finished load, if any. Never blocks.
    pub fn try_recv(&self) -> Option<LoadOutcome> {
        self.rx.try_recv().ok()
    }
}

impl Shared {
    fn lock_slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn work(&self, mut ticket: LoadTicket, mut track: Track, tx: &Sender<LoadOutcome>) {
        loop {
            if self.latest.load(Ordering::Acquire) > ticket.0 {
                debug!(ticket = ticket.0, track = track.id, "load superseded before start");
            } else {
                let result = self.fetcher.load(&track);
                let _ = tx.send(LoadOutcome {
                    ticket,
                    track_id: track.id,
                    result,
                });
            }

            let mut slots = self.lock_slots();
            match slots.parked.take() {
                Some((next_ticket, next_track)) => {
                    ticket = next_ticket;
                    track = next_track;
                }
                None => {
                    slots.busy -= 1;
                    return;
                }
            }
        }
    }
}
