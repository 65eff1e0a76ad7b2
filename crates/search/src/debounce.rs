//! Cancellable delayed task for search-as-you-type
//!
//! A [`Debouncer`] owns one worker thread and at most one pending task.
//! Scheduling replaces the pending task and restarts the delay, so only
//! the most recently scheduled task runs once input goes quiet.
//! Dropping the debouncer stops the worker without running what is still
//! pending.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::error;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Pending {
    deadline: Instant,
    task: Task,
}

#[derive(Default)]
struct State {
    pending: Option<Pending>,
    running: bool,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

/// Runs only the last of a burst of scheduled tasks
pub struct Debouncer {
    shared: Arc<Shared>,
    delay: Duration,
    worker: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Start a debouncer with the given quiet period
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new(delay: Duration) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            changed: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("deskdb-debounce".to_string())
            .spawn(move || worker_loop(&worker_shared))?;
        Ok(Debouncer {
            shared,
            delay,
            worker: Some(worker),
        })
    }

    /// Quiet period before a scheduled task runs
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task`, replacing any pending task and restarting the delay
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        let mut state = self.shared.state.lock();
        state.pending = Some(Pending {
            deadline: Instant::now() + self.delay,
            task: Box::new(task),
        });
        self.shared.changed.notify_all();
    }

    /// Drop the pending task; returns true if there was one
    pub fn cancel(&self) -> bool {
        let mut state = self.shared.state.lock();
        let had = state.pending.take().is_some();
        self.shared.changed.notify_all();
        had
    }

    /// True if a task is waiting for its deadline
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }

    /// Block until nothing is pending or running
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock();
        while state.pending.is_some() || state.running {
            self.shared.changed.wait(&mut state);
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            state.pending = None;
            self.shared.changed.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &Shared) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        let deadline = match state.pending.as_ref() {
            Some(pending) => pending.deadline,
            None => {
                shared.changed.wait(&mut state);
                continue;
            }
        };
        if Instant::now() < deadline {
            shared.changed.wait_until(&mut state, deadline);
            continue;
        }
        if let Some(pending) = state.pending.take() {
            state.running = true;
            run_unlocked(&mut state, pending.task);
            state.running = false;
            shared.changed.notify_all();
        }
    }
}

fn run_unlocked(state: &mut MutexGuard<'_, State>, task: Task) {
    MutexGuard::unlocked(state, || {
        // A panicking task must not take the worker down with it
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
            error!(
                "debounced task panicked: {:?}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    });
}
