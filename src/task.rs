// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Background runs with cooperative cancellation.
//!
//! - [`TaskController`] owns the oracle, the config and the store, and runs
//!   at most one [`Job`] at a time on a worker thread.
//! - [`TaskEvent`]s flow back over an `mpsc` channel. Dropping the receiver
//!   detaches the caller; the run keeps going until it completes or is
//!   cancelled.
//! - [`TaskStatus`] is shared state for pollers that never read the channel.
//!
//! ```ignore
//! let mut controller = TaskController::new(oracle, config, store);
//! if let Some(events) = controller.start(Job::Search(request)) {
//!     for event in events {
//!         match event {
//!             TaskEvent::Progress(p) => println!("{}/{}", p.step, p.total),
//!             TaskEvent::Finished(result) => println!("{result:?}"),
//!         }
//!     }
//! }
//! ```

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::civil::JulianMoment;
use crate::config::SearchConfig;
use crate::error::Error;
use crate::oracle::EphemerisOracle;
use crate::search::{Outcome, Progress, SearchEngine, SearchRequest, SLOT_COUNT};
use crate::store::ResultStore;

/// Work a controller can run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Job {
    Search(SearchRequest),
    Snapshot(JulianMoment),
}

/// Messages from the worker, in order: any number of progress ticks, then
/// exactly one `Finished`.
#[derive(Debug)]
pub enum TaskEvent {
    Progress(Progress),
    Finished(Result<Outcome, Error>),
}

/// Snapshot of the controller's shared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStatus {
    /// The current or most recent job.
    pub job: Option<Job>,
    pub step: usize,
    pub total: usize,
    pub running: bool,
    pub cancel_requested: bool,
    /// Terminal outcome of the most recent run.
    pub outcome: Option<Outcome>,
    /// Store error that aborted the most recent run.
    pub error: Option<String>,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        !self.running && (self.outcome.is_some() || self.error.is_some())
    }
}

/// Runs jobs against a shared oracle and store, one at a time.
pub struct TaskController<O: ?Sized, S> {
    oracle: Arc<O>,
    config: Arc<SearchConfig>,
    store: Arc<Mutex<S>>,
    status: Arc<Mutex<TaskStatus>>,
    cancellation: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl<O, S> TaskController<O, S>
where
    O: EphemerisOracle + ?Sized + 'static,
    S: ResultStore + 'static,
{
    pub fn new(oracle: Arc<O>, config: SearchConfig, store: S) -> Self {
        Self {
            oracle,
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            status: Arc::new(Mutex::new(TaskStatus::default())),
            cancellation: CancellationToken::new(),
            worker: None,
        }
    }

    /// Shared handle to the store, e.g. for reading rows after a run.
    ///
    /// The worker holds the lock for the whole run.
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether a worker is still running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start `job` on a worker thread.
    ///
    /// Returns `None`, and does nothing else, while another job is in flight.
    pub fn start(&mut self, job: Job) -> Option<Receiver<TaskEvent>> {
        if self.is_running() {
            info!(?job, "job already in flight; start ignored");
            return None;
        }
        self.reap();

        let cancel = CancellationToken::new();
        self.cancellation = cancel.clone();
        *self.status.lock() = TaskStatus {
            job: Some(job),
            total: SLOT_COUNT,
            running: true,
            ..TaskStatus::default()
        };

        let (tx, rx) = mpsc::channel();
        let oracle = Arc::clone(&self.oracle);
        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        let status = Arc::clone(&self.status);

        info!(?job, "job started");
        self.worker = Some(thread::spawn(move || {
            let mut detached = false;
            let mut emit = |event: TaskEvent| {
                if tx.send(event).is_err() && !detached {
                    detached = true;
                    debug!("listener detached; run continues");
                }
            };

            let result = {
                let mut store = store.lock();
                let mut engine = SearchEngine::new(&*oracle, &config);
                let mut progress = |tick: Progress| {
                    status.lock().step = tick.step;
                    emit(TaskEvent::Progress(tick));
                };
                match job {
                    Job::Search(request) => {
                        engine.search(&request, &mut *store, &cancel, &mut progress)
                    }
                    Job::Snapshot(at) => engine.snapshot(at, &mut *store, &cancel, &mut progress),
                }
            };

            {
                let mut status = status.lock();
                status.running = false;
                match &result {
                    Ok(outcome) => status.outcome = Some(*outcome),
                    Err(err) => {
                        warn!(%err, "job aborted by store error");
                        status.error = Some(err.to_string());
                    }
                }
            }
            emit(TaskEvent::Finished(result.map_err(Error::from)));
        }));
        Some(rx)
    }

    /// Ask the running job to stop at its next step boundary.
    pub fn cancel(&self) {
        if !self.is_running() {
            return;
        }
        info!("cancellation requested");
        self.status.lock().cancel_requested = true;
        self.cancellation.cancel();
    }

    pub fn status(&self) -> TaskStatus {
        self.status.lock().clone()
    }

    /// Block until the current worker, if any, has exited.
    pub fn join(&mut self) -> TaskStatus {
        self.reap();
        self.status()
    }

    fn reap(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("worker thread panicked");
                let mut status = self.status.lock();
                status.running = false;
                status.error = Some("worker thread panicked".into());
            }
        }
    }
}
