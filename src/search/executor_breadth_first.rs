//! Breadth-first search where every node is its own task on a rayon pool.
//!
//! Expanding a node submits one FIFO task per surviving child, so the pool's
//! queue plays the role of the frontier. The run is bounded by a
//! `scope_fifo`, which returns only once every recursively submitted task has
//! finished; that is the termination signal. Cancellation and failures set
//! the stop flag, after which queued tasks return without examining their
//! node and the scope drains.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::{self, RecvTimeoutError};
use log::{debug, info, warn};
use rayon::{ScopeFifo, ThreadPoolBuilder};

use crate::game::game_trait::{Game, GameHistory};
use crate::search::frontier::Frontier;
use crate::search::search_engine_trait::SearchEngine;
use crate::search::search_errors::{SearchError, SearchResult};
use crate::search::search_kernel::SearchKernel;
use crate::search::statistics::StatisticsSnapshot;
use crate::search::threading::{SearchConfig, SearchStrategy, SharedSearchState};
use crate::search::win_collection::{WinCollection, WinSink};

pub struct ExecutorBreadthFirstSearch<G: Game> {
    kernel: SearchKernel<G>,
    initial: GameHistory<G>,
    config: SearchConfig,
    shared: SharedSearchState,
    wins: WinCollection<GameHistory<G>>,
    // Submitted tasks that have not started yet. Tasks abandoned after a
    // stop stay counted, so the final frontier size reports unexplored work.
    queued: AtomicUsize,
    failure: Mutex<Option<SearchError>>,
    started: AtomicBool,
}

/// Frontier handed to the kernel while a task runs: pushing submits a task.
struct TaskFrontier<'a, 'scope, G: Game> {
    engine: &'scope ExecutorBreadthFirstSearch<G>,
    scope: &'a ScopeFifo<'scope>,
}

impl<G: Game> Frontier<GameHistory<G>> for TaskFrontier<'_, '_, G> {
    fn push(&self, history: GameHistory<G>) {
        self.engine.submit(self.scope, history);
    }

    fn len(&self) -> usize {
        self.engine.queued.load(Ordering::Relaxed)
    }
}

impl<G: Game> ExecutorBreadthFirstSearch<G> {
    pub fn new(game: Arc<G>, initial: GameHistory<G>, threads: usize) -> Self {
        Self::with_config(game, initial, SearchConfig::default().with_threads(threads))
    }

    pub fn with_config(game: Arc<G>, initial: GameHistory<G>, config: SearchConfig) -> Self {
        Self {
            kernel: SearchKernel::new(game),
            initial,
            config: config.with_strategy(SearchStrategy::ExecutorBreadthFirst),
            shared: SharedSearchState::new(),
            wins: WinCollection::new(),
            queued: AtomicUsize::new(0),
            failure: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.config.normalized_threads()
    }

    fn submit<'scope>(&'scope self, scope: &ScopeFifo<'scope>, history: GameHistory<G>) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        scope.spawn_fifo(move |scope| {
            if self.shared.should_stop() {
                return;
            }
            self.queued.fetch_sub(1, Ordering::Relaxed);
            self.run_task(scope, history);
        });
    }

    fn run_task<'scope>(&'scope self, scope: &ScopeFifo<'scope>, history: GameHistory<G>) {
        let frontier = TaskFrontier { engine: self, scope };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.kernel.examine_node(history, &frontier, &self.wins)
        }));
        let outcome = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let worker = thread::current().name().unwrap_or("bfs-task").to_owned();
                Err(SearchError::from_panic(worker, payload))
            }
        };
        if let Err(err) = outcome {
            self.fail(err);
        }
    }

    fn fail(&self, err: SearchError) {
        warn!("executor task failed, stopping the search: {err}");
        self.shared.request_stop();
        if let Ok(mut slot) = self.failure.lock() {
            slot.get_or_insert(err);
        }
    }

    fn take_failure(&self) -> Option<SearchError> {
        self.failure.lock().ok().and_then(|mut slot| slot.take())
    }

    fn log_progress(&self) {
        debug!(
            "{} progress: {} examined, {} queued, {} wins",
            self.strategy(),
            self.kernel.statistics().game_states_examined(),
            self.queued.load(Ordering::Relaxed),
            self.wins.win_count()
        );
    }
}

impl<G: Game> SearchEngine<G> for ExecutorBreadthFirstSearch<G> {
    fn search(&self) -> SearchResult<Vec<GameHistory<G>>> {
        if self.started.swap(true, Ordering::AcqRel) || self.shared.should_stop() {
            return Ok(self.wins.snapshot());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.thread_count())
            .thread_name(|index| format!("bfs-task-{index}"))
            .build()
            .map_err(|err| SearchError::ThreadPool(err.to_string()))?;
        info!("starting {} search on {} pool threads", self.strategy(), self.thread_count());

        let poll_interval = self.config.poll_interval;
        let (done_tx, done_rx) = channel::bounded::<()>(0);
        thread::scope(|monitors| {
            monitors.spawn(move || loop {
                match done_rx.recv_timeout(poll_interval) {
                    Err(RecvTimeoutError::Timeout) => self.log_progress(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

            pool.scope_fifo(|scope| {
                let frontier = TaskFrontier { engine: self, scope };
                if let Err(err) = self.kernel.expand_root(self.initial.clone(), &frontier, &self.wins) {
                    self.fail(err);
                }
            });
            drop(done_tx);
        });

        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        if !self.shared.should_stop() {
            self.shared.mark_exhausted();
        }
        info!(
            "{} search {}: {} wins, {} states examined",
            self.strategy(),
            if self.shared.is_exhausted() { "finished" } else { "cancelled" },
            self.wins.win_count(),
            self.kernel.statistics().game_states_examined()
        );
        Ok(self.wins.snapshot())
    }

    fn cancel(&self) {
        self.shared.request_stop();
    }

    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::ExecutorBreadthFirst
    }

    fn is_exhausted(&self) -> bool {
        self.shared.is_exhausted()
    }

    fn statistics(&self) -> StatisticsSnapshot<G::FilterKey> {
        self.kernel
            .snapshot(self.queued.load(Ordering::Relaxed), self.wins.win_count())
    }
}
