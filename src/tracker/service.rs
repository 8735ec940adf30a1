//! Worker pool and submission surface
//!
//! # Worker Loop
//!
//! Each worker repeats:
//! 1. Dequeue a task (suspends while the queue is empty)
//! 2. Pass the shared rate limiter
//! 3. Resolve the variant set of the task's ASIN
//! 4. Search listing pages for any variant
//! 5. Persist the outcome and acknowledge the task
//!
//! Steps 2-5 run as their own tokio task. A search or persistence failure,
//! or a panic in any collaborator, never kills a worker: the task is recorded
//! as not found instead. Shutdown is a watch channel raced against steps 1-5;
//! what happens to a task caught in flight is decided by [`StopPolicy`].

use crate::config::{Config, StopPolicy};
use crate::fetch::FetchClient;
use crate::model::{Asin, StoredResult, Task};
use crate::parse::{DetailParser, HtmlDetailParser, HtmlListingParser, ListingParser};
use crate::state::WorkerState;
use crate::storage::ResultStore;
use crate::tracker::position::{PageDelay, PositionFinder};
use crate::tracker::queue::TaskQueue;
use crate::tracker::rate_limiter::{RateLimiter, DEFAULT_RATE_WINDOW};
use crate::tracker::submission::SubmissionStatus;
use crate::tracker::variants::VariantResolver;
use crate::{RankError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Tunables of a [`RankService`]
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub requests_per_minute: usize,
    pub rate_window: Duration,
    pub marketplace_url: String,
    pub page_delay: PageDelay,
    pub stop_policy: StopPolicy,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            requests_per_minute: config.queue.requests_per_minute,
            rate_window: DEFAULT_RATE_WINDOW,
            marketplace_url: config.search.marketplace_url.clone(),
            page_delay: PageDelay::from_millis(
                config.search.min_page_delay_ms,
                config.search.max_page_delay_ms,
            ),
            stop_policy: config.queue.stop_policy,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 1000,
            rate_window: DEFAULT_RATE_WINDOW,
            marketplace_url: "https://www.amazon.com".to_string(),
            page_delay: PageDelay::default(),
            stop_policy: StopPolicy::default(),
        }
    }
}

/// State shared by the service handle and every worker
struct Shared {
    queue: TaskQueue,
    limiter: RateLimiter,
    resolver: VariantResolver,
    finder: PositionFinder,
    store: Arc<dyn ResultStore>,
    states: Mutex<Vec<WorkerState>>,
    stop_policy: StopPolicy,
}

/// Handles of a started pool
struct Running {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

/// The rank tracking engine: a task queue drained by a fixed worker pool
pub struct RankService {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
    // Held for the whole of `stop`, so concurrent callers return only after
    // every worker has been joined
    stopping: tokio::sync::Mutex<()>,
}

impl RankService {
    pub fn new(
        settings: ServiceSettings,
        fetch: Arc<dyn FetchClient>,
        listing_parser: Arc<dyn ListingParser>,
        detail_parser: Arc<dyn DetailParser>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        let resolver = VariantResolver::new(
            Arc::clone(&fetch),
            detail_parser,
            settings.marketplace_url.clone(),
        );
        let finder = PositionFinder::new(
            fetch,
            listing_parser,
            settings.marketplace_url.clone(),
            settings.page_delay,
        );

        Self {
            shared: Arc::new(Shared {
                queue: TaskQueue::new(),
                limiter: RateLimiter::new(settings.requests_per_minute, settings.rate_window),
                resolver,
                finder,
                store,
                states: Mutex::new(Vec::new()),
                stop_policy: settings.stop_policy,
            }),
            running: Mutex::new(None),
            stopping: tokio::sync::Mutex::new(()),
        }
    }

    /// Builds a service with the HTML parsers and settings from `config`
    pub fn from_config(
        config: &Config,
        fetch: Arc<dyn FetchClient>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self::new(
            ServiceSettings::from_config(config),
            fetch,
            Arc::new(HtmlListingParser::new()),
            Arc::new(HtmlDetailParser::new()),
            store,
        )
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawns `worker_count` workers on the current tokio runtime
    ///
    /// # Errors
    ///
    /// * `RankError::AlreadyRunning` - The pool has been started and not
    ///   stopped since
    pub fn start(&self, worker_count: usize) -> Result<()> {
        let mut running = self.running();
        if running.is_some() {
            return Err(RankError::AlreadyRunning);
        }

        *self.shared.states() = vec![WorkerState::Idle; worker_count];

        let (shutdown, signal) = watch::channel(false);
        let handles = (0..worker_count)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&self.shared), signal.clone())))
            .collect();

        *running = Some(Running { shutdown, handles });
        tracing::info!(
            workers = worker_count,
            queued = self.shared.queue.len(),
            "Worker pool started"
        );
        Ok(())
    }

    /// Signals every worker to stop and waits for them to exit
    ///
    /// Idempotent; stopping a pool that is not running does nothing. A call
    /// made while another `stop` is joining workers waits for that join.
    /// Queued tasks stay queued and are picked up by the next
    /// [`RankService::start`].
    ///
    /// # Errors
    ///
    /// * `RankError::Worker` - A worker panicked; the rest were still joined
    pub async fn stop(&self) -> Result<()> {
        let _stopping = self.stopping.lock().await;

        let running = self.running().take();
        let Some(Running { shutdown, handles }) = running else {
            tracing::debug!("Worker pool already stopped");
            return Ok(());
        };

        let in_flight = self.shared.states().iter().filter(|s| s.is_busy()).count();
        tracing::info!(in_flight, policy = ?self.shared.stop_policy, "Stopping worker pool");
        let _ = shutdown.send(true);

        let mut failure = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!(worker, "Worker ended abnormally: {}", e);
                failure.get_or_insert(RankError::Worker {
                    worker,
                    message: e.to_string(),
                });
            }
        }

        let stopped = self
            .shared
            .states()
            .iter()
            .filter(|s| s.is_terminal())
            .count();
        tracing::info!(
            stopped,
            queued = self.shared.queue.len(),
            "Worker pool stopped"
        );
        failure.map_or(Ok(()), Err)
    }

    pub fn is_running(&self) -> bool {
        self.running().is_some()
    }

    /// Submits `asin` for tracking under `keyword`
    ///
    /// If a result is already stored for the ASIN it is returned and nothing
    /// is queued, whatever keyword it was recorded under.
    ///
    /// # Errors
    ///
    /// * `RankError::InvalidTask` - Malformed ASIN or keyword
    /// * `RankError::Storage` - The store lookup failed
    pub fn track(&self, asin: &str, keyword: &str) -> Result<SubmissionStatus> {
        let task = Task::parse(asin, keyword)?;

        if let Some(existing) = self.shared.store.get(task.asin())? {
            if existing.keyword != task.keyword() {
                tracing::warn!(
                    asin = %task.asin(),
                    stored = %existing.keyword,
                    requested = task.keyword(),
                    "Returning result recorded for a different keyword"
                );
            }
            return Ok(SubmissionStatus::Completed { result: existing });
        }

        let identifier = task.asin().to_string();
        self.shared.queue.submit(task);
        tracing::debug!(asin = %identifier, queued = self.shared.queue.len(), "Task queued");
        Ok(SubmissionStatus::Pending { identifier })
    }

    /// Looks up the stored result for `asin`
    pub fn status(&self, asin: &str) -> Result<Option<SubmissionStatus>> {
        let asin = Asin::parse(asin)?;
        Ok(self
            .shared
            .store
            .get(&asin)?
            .map(|result| SubmissionStatus::Completed { result }))
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.shared.queue
    }

    /// Snapshot of every worker's state, indexed by worker id
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.shared.states().clone()
    }

    /// Suspends until every submitted task has been acknowledged
    pub async fn wait_drained(&self) {
        self.shared.queue.wait_drained().await;
    }
}

impl Shared {
    fn states(&self) -> MutexGuard<'_, Vec<WorkerState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, worker: usize, next: WorkerState) {
        let mut states = self.states();
        if let Some(state) = states.get_mut(worker) {
            if !state.can_transition_to(next) {
                tracing::debug!(worker, from = %state, to = %next, "Unexpected worker transition");
            }
            *state = next;
        }
    }

    /// Runs one task through the pipeline and persists its outcome
    async fn process(&self, worker: usize, task: &Task) {
        self.set_state(worker, WorkerState::RateLimitWait);
        self.limiter.acquire().await;
        let in_window = self.limiter.in_window().await;
        tracing::debug!(worker, in_window, "Rate window admitted task");

        self.set_state(worker, WorkerState::Resolving);
        let variants = self.resolver.resolve(task.asin()).await;

        self.set_state(worker, WorkerState::Searching);
        let result = match self.finder.find(task.keyword(), &variants).await {
            Ok(position) => StoredResult::new(task, position),
            Err(e) => {
                tracing::error!(worker, asin = %task.asin(), "Search failed: {}", e);
                StoredResult::not_found(task)
            }
        };

        self.set_state(worker, WorkerState::Persisting);
        self.persist(worker, task, &result);
    }

    fn persist(&self, worker: usize, task: &Task, result: &StoredResult) {
        let Err(e) = self.store.save(result) else {
            tracing::info!(
                worker,
                asin = %task.asin(),
                found = result.position.found,
                "Result stored"
            );
            return;
        };

        tracing::error!(worker, asin = %task.asin(), "Failed to store result: {}", e);
        if result.position.found {
            if let Err(e) = self.store.save(&StoredResult::not_found(task)) {
                tracing::error!(worker, asin = %task.asin(), "Fallback save failed: {}", e);
            }
        }
    }

    /// Disposes of a task that was in flight when shutdown arrived
    fn release(&self, worker: usize, task: Task) {
        match self.stop_policy {
            StopPolicy::Redeliver => {
                tracing::info!(worker, asin = %task.asin(), "Requeueing in-flight task");
                self.queue.requeue_front(task);
            }
            StopPolicy::Abandon => {
                tracing::warn!(worker, asin = %task.asin(), "Abandoning in-flight task");
                self.queue.ack();
            }
        }
    }
}

/// Resolves once shutdown has been requested or the service handle is gone
async fn stop_requested(signal: &mut watch::Receiver<bool>) {
    let _ = signal.wait_for(|stopped| *stopped).await;
}

async fn run_worker(id: usize, shared: Arc<Shared>, mut signal: watch::Receiver<bool>) {
    tracing::debug!(worker = id, "Worker started");

    loop {
        shared.set_state(id, WorkerState::Dequeuing);
        let task = tokio::select! {
            biased;
            _ = stop_requested(&mut signal) => break,
            task = shared.queue.dequeue() => task,
        };

        let mut job = tokio::spawn({
            let shared = Arc::clone(&shared);
            let task = task.clone();
            async move { shared.process(id, &task).await }
        });

        let joined = tokio::select! {
            biased;
            _ = stop_requested(&mut signal) => None,
            joined = &mut job => Some(joined),
        };

        let Some(joined) = joined else {
            job.abort();
            let _ = job.await;
            shared.release(id, task);
            break;
        };

        if let Err(e) = joined {
            tracing::error!(worker = id, asin = %task.asin(), "Task processing aborted: {}", e);
            shared.set_state(id, WorkerState::Persisting);
            let fallback = StoredResult::not_found(&task);
            let saved =
                panic::catch_unwind(AssertUnwindSafe(|| shared.persist(id, &task, &fallback)));
            if saved.is_err() {
                tracing::error!(worker = id, asin = %task.asin(), "Result store panicked");
            }
        }

        shared.queue.ack();
        shared.set_state(id, WorkerState::Idle);
    }

    shared.set_state(id, WorkerState::Stopping);
    shared.set_state(id, WorkerState::Stopped);
    tracing::debug!(worker = id, "Worker stopped");
}
