// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::MAX_ENTRY_LIFETIME;
use crate::SignatureEntry;
use async_trait::async_trait;
use log::{debug, warn};
use nosqlsign_core::{Error, Result};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// ComputeSignature produces a fresh signature on a cache miss or a background refresh.
#[async_trait]
pub trait ComputeSignature: Debug + Send + Sync + 'static {
    /// Compute a new signature entry.
    async fn compute_signature(&self) -> Result<SignatureEntry>;
}

/// SignatureCache keeps the one signature shared by all requests.
///
/// An entry is served for `max_lifetime` after it was stored. Whenever an entry is
/// computed on a miss, a background task is scheduled to replace it
/// `max_lifetime - refresh_ahead` later, and every successful background run schedules
/// the next one. A failing background run stops the chain and the next caller after
/// expiry computes synchronously again.
///
/// The background task needs a tokio runtime; without one, only compute-on-miss is used.
pub struct SignatureCache {
    inner: Arc<Inner>,
}

struct Inner {
    compute: Arc<dyn ComputeSignature>,
    max_lifetime: Duration,
    refresh_interval: Duration,
    slot: Mutex<Option<CachedEntry>>,
    refresher: Mutex<Option<ScheduledRefresh>>,
    generation: AtomicU64,
    /// Bumped by `close()`; a miss only stores if it is unchanged since the miss began.
    epoch: AtomicU64,
}

struct CachedEntry {
    entry: Arc<SignatureEntry>,
    inserted_at: Instant,
}

struct ScheduledRefresh {
    generation: u64,
    handle: JoinHandle<()>,
    computing: Arc<AtomicBool>,
}

impl ScheduledRefresh {
    /// Stop a refresh that is still waiting. One that is already signing runs to the end
    /// and its result is dropped by the generation check.
    fn cancel(self) {
        if self.computing.load(Ordering::SeqCst) {
            debug!("background signature refresh is signing, letting it finish");
        } else {
            self.handle.abort();
        }
    }
}

impl SignatureCache {
    /// Create a new cache.
    ///
    /// Returns a config error if `max_lifetime` exceeds 300 seconds. When `refresh_ahead`
    /// is not shorter than `max_lifetime`, no background refresh is ever scheduled.
    pub fn new(
        compute: Arc<dyn ComputeSignature>,
        max_lifetime: Duration,
        refresh_ahead: Duration,
    ) -> Result<Self> {
        if max_lifetime > MAX_ENTRY_LIFETIME {
            return Err(Error::config_invalid(format!(
                "signature cannot be cached longer than {} seconds",
                MAX_ENTRY_LIFETIME.as_secs()
            )));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                compute,
                max_lifetime,
                refresh_interval: max_lifetime.saturating_sub(refresh_ahead),
                slot: Mutex::new(None),
                refresher: Mutex::new(None),
                generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
            }),
        })
    }

    /// How long an entry is served after it was stored.
    pub fn max_lifetime(&self) -> Duration {
        self.inner.max_lifetime
    }

    /// Delay between a store and the background refresh it schedules, zero if disabled.
    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    /// Returns the cached entry if it has not expired, without computing.
    pub fn get(&self) -> Option<Arc<SignatureEntry>> {
        self.inner.get()
    }

    /// Returns the cached entry, computing and storing a new one on a miss.
    ///
    /// Concurrent misses may compute more than once; the last store wins.
    pub async fn get_or_compute(&self) -> Result<Arc<SignatureEntry>> {
        if let Some(entry) = self.inner.get() {
            return Ok(entry);
        }

        debug!("signature cache miss, computing signature");
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let entry = Arc::new(self.inner.compute.compute_signature().await?);
        Inner::store_and_schedule(&self.inner, entry.clone(), epoch);
        Ok(entry)
    }

    /// Returns true if a background refresh is pending.
    pub fn is_refresh_scheduled(&self) -> bool {
        self.inner
            .refresher
            .lock()
            .expect("lock poisoned")
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Cancel the pending background refresh and drop the cached entry.
    ///
    /// Safe to call any number of times and never panics. A signature computation that is
    /// already running is not interrupted. Its result is still returned to the caller that
    /// started it, but it is not stored and schedules no refresh.
    pub fn close(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel_refresh();
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Debug for SignatureCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureCache")
            .field("compute", &self.inner.compute)
            .field("max_lifetime", &self.inner.max_lifetime)
            .field("refresh_interval", &self.inner.refresh_interval)
            .field("cached", &self.get().is_some())
            .finish()
    }
}

impl Inner {
    fn get(&self) -> Option<Arc<SignatureEntry>> {
        let mut slot = self.slot.lock().expect("lock poisoned");
        match slot.as_ref() {
            Some(cached) if cached.inserted_at.elapsed() < self.max_lifetime => {
                Some(cached.entry.clone())
            }
            Some(_) => {
                debug!("cached signature expired");
                *slot = None;
                None
            }
            None => None,
        }
    }

    fn put(&self, entry: Arc<SignatureEntry>) {
        *self.slot.lock().expect("lock poisoned") = Some(CachedEntry {
            entry,
            inserted_at: Instant::now(),
        });
    }

    /// Store the result of a miss and replace any pending refresh with a new one.
    ///
    /// Nothing happens if the cache was closed after the miss read `epoch`.
    fn store_and_schedule(this: &Arc<Self>, entry: Arc<SignatureEntry>, epoch: u64) {
        let mut refresher = this.refresher.lock().expect("lock poisoned");
        if this.epoch.load(Ordering::SeqCst) != epoch {
            debug!("signature cache closed while computing, result not stored");
            return;
        }

        this.put(entry);
        if this.refresh_interval.is_zero() {
            return;
        }
        if let Some(prev) = Self::spawn_refresh(this, &mut refresher) {
            prev.cancel();
        }
    }

    /// Spawn the next refresh while `refresher` is locked, returning the one it replaces.
    fn spawn_refresh(
        this: &Arc<Self>,
        refresher: &mut Option<ScheduledRefresh>,
    ) -> Option<ScheduledRefresh> {
        let Ok(rt) = Handle::try_current() else {
            warn!("no tokio runtime available, background signature refresh is disabled");
            return refresher.take();
        };

        let generation = this.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let computing = Arc::new(AtomicBool::new(false));
        let handle = rt.spawn(Self::refresh_after(
            Arc::downgrade(this),
            this.refresh_interval,
            generation,
            computing.clone(),
        ));
        refresher.replace(ScheduledRefresh {
            generation,
            handle,
            computing,
        })
    }

    async fn refresh_after(
        this: Weak<Self>,
        delay: Duration,
        generation: u64,
        computing: Arc<AtomicBool>,
    ) {
        tokio::time::sleep(delay).await;

        let Some(this) = this.upgrade() else {
            return;
        };
        if this.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        computing.store(true, Ordering::SeqCst);
        let result = this.compute.compute_signature().await;

        let mut refresher = this.refresher.lock().expect("lock poisoned");
        if refresher.as_ref().map(|r| r.generation) != Some(generation) {
            debug!("background signature refresh superseded, result dropped");
            return;
        }

        match result {
            Ok(entry) => {
                this.put(Arc::new(entry));
                debug!("cached signature refreshed in background");
                // The replaced handle is this task, so it must not be aborted.
                let _ = Self::spawn_refresh(&this, &mut refresher);
            }
            Err(err) => {
                // The next caller after expiry computes synchronously and reports any error.
                warn!("unable to refresh cached request signature: {err}");
                refresher.take();
            }
        }
    }

    fn cancel_refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let prev = self
            .refresher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(prev) = prev {
            prev.cancel();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let refresher = self
            .refresher
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        // A signing task keeps `Inner` alive, so whatever is left here is still waiting.
        if let Some(prev) = refresher.take() {
            prev.handle.abort();
        }
    }
}
