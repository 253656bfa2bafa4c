use parking_lot::{Condvar, Mutex};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// Cooperative cancellation flag shared between a job and its owner.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock() = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleeps for `duration` unless cancelled first. Returns `true` if cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = flag.lock();

        while !*cancelled {
            if cvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }

        *cancelled
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct JobEntry {
    id: u64,
    token: CancelToken,
}

type JobTable = Arc<Mutex<HashMap<String, JobEntry>>>;

/// Runs named jobs once in the background, at most one per name.
#[derive(Default)]
pub struct JobScheduler {
    jobs: JobTable,
    next_id: AtomicU64,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name`. Fails while another holder of the same name is alive.
    pub fn lease(&self, name: &str) -> CoreResult<Lease> {
        let mut jobs = self.jobs.lock();

        if jobs.contains_key(name) {
            return Err(CoreError::JobAlreadyRunning(name.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::new();
        jobs.insert(
            name.to_string(),
            JobEntry {
                id,
                token: token.clone(),
            },
        );

        Ok(Lease {
            name: name.to_string(),
            id,
            token,
            jobs: self.jobs.clone(),
        })
    }

    pub fn schedule<F>(&self, name: &str, body: F) -> CoreResult<JoinHandle<()>>
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        self.lease(name)?.spawn(body)
    }

    /// Trips the job's token. Returns `false` when no such job is active.
    pub fn cancel(&self, name: &str) -> bool {
        match self.jobs.lock().get(name) {
            Some(entry) => {
                entry.token.cancel();
                info!(job = name, "job cancellation requested");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.jobs.lock().contains_key(name)
    }
}

/// Exclusive claim on a job name, released on drop.
pub struct Lease {
    name: String,
    id: u64,
    token: CancelToken,
    jobs: JobTable,
}

impl Lease {
    /// Runs `body` on a named thread; the lease is released when it returns.
    pub fn spawn<F>(self, body: F) -> CoreResult<JoinHandle<()>>
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        let thread_name = format!("job-{}", self.name);
        let handle = thread::Builder::new().name(thread_name).spawn(move || {
            let token = self.token.clone();
            debug!(job = %self.name, "job started");
            body(token);
            debug!(job = %self.name, "job finished");
            drop(self);
        })?;
        Ok(handle)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let mut jobs = self.jobs.lock();
        if jobs.get(&self.name).is_some_and(|e| e.id == self.id) {
            jobs.remove(&self.name);
        }
    }
}
