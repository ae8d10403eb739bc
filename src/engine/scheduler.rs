// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Coalesced, deferred `fetch_data` calls.
//!
//! Argument propagation may touch the same model several times while one
//! external event is being handled. Instead of refetching on every touch,
//! the binding engine schedules the model here; the pending set is keyed by
//! model identity, so a model is refetched at most once per burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::{Handle, RuntimeFlavor};

use crate::model::subscription::lock;
use crate::model::QueryDataModel;
use crate::observability::messages::binding::RefetchFlushed;
use crate::observability::messages::StructuredLog;

/// When pending refetches are drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// The first schedule of a burst spawns a flush onto the current tokio
    /// runtime; it runs once the scheduling task yields. Only a
    /// current-thread runtime guarantees that, so on any other runtime (or
    /// outside one) models stay pending until `flush` is called.
    Deferred,
    /// Only an explicit `flush` drains the pending set.
    Manual,
}

struct SchedulerInner {
    mode: FlushMode,
    pending: Mutex<Vec<Arc<QueryDataModel>>>,
    flush_scheduled: AtomicBool,
}

#[derive(Clone)]
pub struct RefetchScheduler {
    inner: Arc<SchedulerInner>,
}

impl RefetchScheduler {
    pub fn new(mode: FlushMode) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                mode,
                pending: Mutex::new(Vec::new()),
                flush_scheduled: AtomicBool::new(false),
            }),
        }
    }

    pub fn deferred() -> Self {
        Self::new(FlushMode::Deferred)
    }

    pub fn manual() -> Self {
        Self::new(FlushMode::Manual)
    }

    pub fn mode(&self) -> FlushMode {
        self.inner.mode
    }

    /// Add a model to the pending set. Returns false when it is already
    /// pending.
    pub fn schedule(&self, model: Arc<QueryDataModel>) -> bool {
        {
            let mut pending = lock(&self.inner.pending);
            if pending.iter().any(|m| m.id() == model.id()) {
                return false;
            }
            pending.push(model);
        }

        if self.inner.mode == FlushMode::Deferred
            && !self.inner.flush_scheduled.swap(true, Ordering::SeqCst)
        {
            match Handle::try_current() {
                Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                    let scheduler = self.clone();
                    handle.spawn(async move {
                        scheduler.flush();
                    });
                }
                Ok(_) => {
                    self.inner.flush_scheduled.store(false, Ordering::SeqCst);
                    tracing::debug!(
                        pending = self.pending_len(),
                        "multi-threaded runtime cannot defer refetches past the burst, call flush() explicitly"
                    );
                }
                Err(_) => {
                    self.inner.flush_scheduled.store(false, Ordering::SeqCst);
                    tracing::warn!(
                        pending = self.pending_len(),
                        "no async runtime to defer refetches onto, call flush() explicitly"
                    );
                }
            }
        }
        true
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Refetch every pending model once, most recently scheduled first.
    /// Returns the number of models refetched.
    pub fn flush(&self) -> usize {
        self.inner.flush_scheduled.store(false, Ordering::SeqCst);
        let drained = std::mem::take(&mut *lock(&self.inner.pending));
        let count = drained.len();

        for model in drained.into_iter().rev() {
            model.fetch_data();
        }

        if count > 0 {
            RefetchFlushed { count }.log();
        }
        count
    }
}

impl std::fmt::Debug for RefetchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefetchScheduler")
            .field("mode", &self.inner.mode)
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl Default for RefetchScheduler {
    fn default() -> Self {
        Self::deferred()
    }
}
