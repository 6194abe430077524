//! Client-side mirror of the course collection.
//!
//! The collection is only ever replaced wholesale by the result of a list
//! read. A failed read keeps the previous snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::models::Course;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The collection now holds this many courses from the latest read.
    Replaced(usize),
    /// The read failed; the previous snapshot stays.
    KeptStale,
    /// The store was detached, or detached and re-attached, while the read
    /// was in flight.
    Discarded,
}

#[derive(Default)]
struct Snapshot {
    courses: Vec<Course>,
    last_error: Option<String>,
}

pub struct ResourceStore {
    client: Arc<dyn ResourceClient>,
    snapshot: RwLock<Snapshot>,
    attached: AtomicBool,
    /// Bumped on every attach and detach; a read only applies if the
    /// generation it started in is still current.
    generation: AtomicU64,
}

impl ResourceStore {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Snapshot::default()),
            attached: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        }
    }

    /// Re-reads the full list. Never fails from the caller's side.
    pub async fn reload(&self) -> ReloadOutcome {
        let started_in = self.generation.load(Ordering::Acquire);
        let result = self.client.list().await;

        let mut snapshot = self.snapshot.write().await;
        if !self.attached.load(Ordering::Acquire)
            || self.generation.load(Ordering::Acquire) != started_in
        {
            debug!("discarding course list that arrived after detach");
            return ReloadOutcome::Discarded;
        }

        match result {
            Ok(courses) => {
                let count = courses.len();
                snapshot.courses = courses;
                snapshot.last_error = None;
                debug!("course list replaced ({} rows)", count);
                ReloadOutcome::Replaced(count)
            }
            Err(e) => {
                warn!("course list fetch failed, keeping previous rows: {}", e);
                snapshot.last_error = Some(e.to_string());
                ReloadOutcome::KeptStale
            }
        }
    }

    pub async fn current(&self) -> Vec<Course> {
        self.snapshot.read().await.courses.clone()
    }

    /// Message of the most recent failed read, cleared by the next good one.
    pub async fn last_error(&self) -> Option<String> {
        self.snapshot.read().await.last_error.clone()
    }

    /// Starts applying list results again. Reads begun before this call are
    /// still dropped.
    pub fn attach(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.attached.store(true, Ordering::Release);
    }

    /// Stops applying list results. Reads already in flight finish but are
    /// dropped.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
