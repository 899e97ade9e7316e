//! Running a search as an isolated task.
//!
//! The worker thread owns the engine and a private copy of the board for the
//! duration of one search; nothing it touches is shared with the live game
//! except `SearchControl` (stop flag and node counter) and the one-shot
//! result channel. Cancellation is cooperative: the search polls the stop
//! flag at every node and between deepening iterations.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    mpsc::{self, Receiver, RecvTimeoutError, TryRecvError},
    Arc,
};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::chess_errors::ChessErrors;
use crate::engines::engine_trait::{Engine, EngineOutput};
use crate::game_state::game_state::BoardSnapshot;

/// Shared cancellation and accounting state of one search.
#[derive(Debug, Default)]
pub struct SearchControl {
    stop: AtomicBool,
    nodes_visited: AtomicU64,
}

impl SearchControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn add_nodes(&self, n: u64) {
        self.nodes_visited.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes_visited.load(Ordering::Relaxed)
    }

    pub fn reset_accounting(&self) {
        self.nodes_visited.store(0, Ordering::Relaxed);
        self.stop.store(false, Ordering::Relaxed);
    }
}

/// What a finished task hands back: the engine, so it can be reused, and
/// the engine's answer.
pub struct TaskOutcome {
    pub engine: Box<dyn Engine>,
    pub output: Result<EngineOutput, ChessErrors>,
}

/// Handle to a search running on its own thread.
///
/// Dropping the handle asks the worker to stop; it is not joined.
pub struct SearchTask {
    control: Arc<SearchControl>,
    receiver: Receiver<TaskOutcome>,
}

impl SearchTask {
    pub fn spawn(mut engine: Box<dyn Engine>, snapshot: BoardSnapshot) -> Self {
        let control = SearchControl::new();
        let (sender, receiver) = mpsc::channel();
        let worker_control = Arc::clone(&control);

        thread::spawn(move || {
            let output = engine.choose_move(&snapshot, &worker_control);
            // The handle may have been dropped meanwhile; nobody is waiting.
            if sender.send(TaskOutcome { engine, output }).is_err() {
                debug!("search result discarded: task handle dropped");
            }
        });

        Self { control, receiver }
    }

    #[inline]
    pub fn control(&self) -> &SearchControl {
        &self.control
    }

    /// Ask the search to stop; it still reports its best completed result.
    pub fn cancel(&self) {
        self.control.request_stop();
    }

    /// The result, if the search has finished. After the result has been
    /// taken once, further calls report `SearchTaskDisconnected`.
    pub fn try_result(&mut self) -> Option<Result<TaskOutcome, ChessErrors>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(Ok(outcome)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ChessErrors::SearchTaskDisconnected)),
        }
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<TaskOutcome, ChessErrors>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(Ok(outcome)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(ChessErrors::SearchTaskDisconnected)),
        }
    }

    /// Block until the worker reports.
    pub fn wait(self) -> Result<TaskOutcome, ChessErrors> {
        self.receiver
            .recv()
            .map_err(|_| ChessErrors::SearchTaskDisconnected)
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        self.control.request_stop();
    }
}
