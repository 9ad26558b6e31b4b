//! Fixed pool of OS worker threads sharing one concurrent frontier.
//!
//! The frontier type decides the traversal order: a [`BlockingDeque`] popped
//! at its tail gives the worker-pool depth-first search, a [`FifoFrontier`]
//! gives the worker-pool breadth-first search. Everything else (worker loop,
//! supervision, termination, error surfacing) is shared.
//!
//! Each worker loops: pop with a bounded wait, examine, repeat. A worker that
//! retires the last pending node marks the run exhausted and interrupts the
//! frontier, which wakes every idle peer. The calling thread supervises:
//! it waits on a channel of worker reports, logs progress whenever the poll
//! interval passes quietly, stops the pool on the first failure and finally
//! joins every thread.
//!
//! [`BlockingDeque`]: crate::search::blocking_deque::BlockingDeque
//! [`FifoFrontier`]: crate::search::fifo_frontier::FifoFrontier

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use log::{debug, info, trace, warn};

use crate::game::game_trait::{Game, GameHistory};
use crate::search::frontier::{ConcurrentFrontier, PopOutcome, TrackedFrontier};
use crate::search::search_engine_trait::SearchEngine;
use crate::search::search_errors::{SearchError, SearchResult};
use crate::search::search_kernel::SearchKernel;
use crate::search::statistics::StatisticsSnapshot;
use crate::search::threading::{SearchConfig, SearchStrategy, SharedSearchState, WorkerThreadContext};
use crate::search::win_collection::{WinCollection, WinSink};

struct WorkerReport {
    worker: String,
    result: SearchResult<WorkerThreadContext>,
}

struct PoolInner<G: Game, Q> {
    kernel: SearchKernel<G>,
    initial: GameHistory<G>,
    frontier: Q,
    wins: WinCollection<GameHistory<G>>,
    shared: SharedSearchState,
}

impl<G, Q> PoolInner<G, Q>
where
    G: Game,
    Q: ConcurrentFrontier<GameHistory<G>>,
{
    fn stop_workers(&self) {
        self.shared.request_stop();
        self.frontier.interrupt();
    }

    fn run_worker(&self, mut ctx: WorkerThreadContext, idle_wait: Duration) -> SearchResult<WorkerThreadContext> {
        let tracked = TrackedFrontier::new(&self.frontier, &self.shared);
        while !self.shared.should_stop() {
            match self.frontier.pop_timeout(idle_wait) {
                PopOutcome::Item(history) => {
                    self.shared.mark_working();
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.kernel.examine_node(history, &tracked, &self.wins)
                    }));
                    self.shared.mark_idle();
                    ctx.nodes_local += 1;

                    let outcome = match outcome {
                        Ok(result) => result,
                        Err(payload) => Err(SearchError::from_panic(worker_name(), payload)),
                    };
                    if let Err(err) = outcome {
                        self.stop_workers();
                        return Err(err);
                    }
                    if self.shared.node_finished() {
                        debug!("worker {} retired the last pending node", ctx.worker_id);
                        self.shared.mark_exhausted();
                        self.frontier.interrupt();
                    }
                }
                PopOutcome::TimedOut => {
                    ctx.idle_waits += 1;
                    trace!("worker {} found the frontier empty, waiting again", ctx.worker_id);
                }
                PopOutcome::Interrupted => {
                    trace!("worker {} interrupted", ctx.worker_id);
                    break;
                }
            }
        }
        Ok(ctx)
    }
}

fn worker_name() -> String {
    thread::current().name().unwrap_or("search-worker").to_owned()
}

/// Worker-pool search engine, generic over its shared frontier.
pub struct WorkerPoolSearch<G: Game, Q> {
    inner: Arc<PoolInner<G, Q>>,
    config: SearchConfig,
    strategy: SearchStrategy,
    thread_prefix: &'static str,
    started: AtomicBool,
}

impl<G, Q> WorkerPoolSearch<G, Q>
where
    G: Game,
    Q: ConcurrentFrontier<GameHistory<G>> + 'static,
{
    pub(crate) fn with_frontier(
        game: Arc<G>,
        initial: GameHistory<G>,
        config: SearchConfig,
        thread_prefix: &'static str,
        frontier: Q,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                kernel: SearchKernel::new(game),
                initial,
                frontier,
                wins: WinCollection::new(),
                shared: SharedSearchState::new(),
            }),
            config,
            strategy: config.strategy,
            thread_prefix,
            started: AtomicBool::new(false),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.config.normalized_threads()
    }

    fn spawn_workers(&self) -> SearchResult<(Vec<JoinHandle<()>>, Receiver<WorkerReport>)> {
        let (report_tx, report_rx) = channel::unbounded();
        let mut handles = Vec::with_capacity(self.thread_count());

        for worker_id in 0..self.thread_count() {
            let inner = Arc::clone(&self.inner);
            let report_tx = report_tx.clone();
            let idle_wait = self.config.idle_wait;
            let name = format!("{}-{}", self.thread_prefix, worker_id);
            let report_name = name.clone();

            let spawned = thread::Builder::new().name(name).spawn(move || {
                let result = inner.run_worker(WorkerThreadContext::new(worker_id), idle_wait);
                // The supervisor only hangs up after every report arrived.
                let _ = report_tx.send(WorkerReport {
                    worker: report_name,
                    result,
                });
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    self.inner.stop_workers();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SearchError::Spawn(err));
                }
            }
        }
        Ok((handles, report_rx))
    }

    /// Wait for every worker to report, returning the first failure.
    fn supervise(&self, reports: &Receiver<WorkerReport>, workers: usize) -> Option<SearchError> {
        let inner = &self.inner;
        let mut first_error = None;
        let mut exited = 0;

        while exited < workers {
            match reports.recv_timeout(self.config.poll_interval) {
                Ok(WorkerReport { worker, result }) => {
                    exited += 1;
                    match result {
                        Ok(ctx) => debug!(
                            "{worker} exited after {} nodes and {} idle waits",
                            ctx.nodes_local, ctx.idle_waits
                        ),
                        Err(err) => {
                            warn!("{worker} failed, stopping the search: {err}");
                            inner.stop_workers();
                            first_error.get_or_insert(err);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if inner.shared.pending() == 0 && inner.shared.working() == 0 {
                        inner.shared.mark_exhausted();
                    }
                    if inner.shared.should_stop() {
                        inner.frontier.interrupt();
                    }
                    debug!(
                        "{} progress: {} examined, {} queued, {} working, {} wins",
                        self.strategy,
                        inner.kernel.statistics().game_states_examined(),
                        inner.frontier.len(),
                        inner.shared.working(),
                        inner.wins.win_count()
                    );
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        first_error
    }
}

impl<G, Q> SearchEngine<G> for WorkerPoolSearch<G, Q>
where
    G: Game,
    Q: ConcurrentFrontier<GameHistory<G>> + 'static,
{
    fn search(&self) -> SearchResult<Vec<GameHistory<G>>> {
        let inner = &self.inner;
        if self.started.swap(true, Ordering::AcqRel) || inner.shared.should_stop() {
            return Ok(inner.wins.snapshot());
        }

        // The root is expanded here, before any worker can observe a cancel,
        // so everything left queued after a stop is a generated board.
        let tracked = TrackedFrontier::new(&inner.frontier, &inner.shared);
        inner.kernel.expand_root(inner.initial.clone(), &tracked, &inner.wins)?;
        if inner.shared.pending() == 0 {
            inner.shared.mark_exhausted();
            return Ok(inner.wins.snapshot());
        }

        info!("starting {} search with {} workers", self.strategy, self.thread_count());
        let (handles, reports) = self.spawn_workers()?;
        let mut first_error = self.supervise(&reports, handles.len());

        for handle in handles {
            if let Err(payload) = handle.join() {
                inner.stop_workers();
                first_error.get_or_insert(SearchError::from_panic(self.thread_prefix, payload));
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        info!(
            "{} search {}: {} wins, {} states examined",
            self.strategy,
            if inner.shared.is_exhausted() { "finished" } else { "cancelled" },
            inner.wins.win_count(),
            inner.kernel.statistics().game_states_examined()
        );
        Ok(inner.wins.snapshot())
    }

    fn cancel(&self) {
        self.inner.stop_workers();
    }

    fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    fn is_exhausted(&self) -> bool {
        self.inner.shared.is_exhausted()
    }

    fn statistics(&self) -> StatisticsSnapshot<G::FilterKey> {
        self.inner
            .kernel
            .snapshot(self.inner.frontier.len(), self.inner.wins.win_count())
    }
}
