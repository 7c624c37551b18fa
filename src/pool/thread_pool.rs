use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Workers started when `ThreadPool::new(0)` is asked for.
pub const DEFAULT_WORKERS: usize = 3;
/// Upper bound on the number of workers.
pub const MAX_WORKERS: usize = 128;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Queue {
    jobs: VecDeque<Job>,
    running: usize,
    exit: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    /// Signalled when a job is queued or the pool shuts down.
    work: Condvar,
    /// Signalled when the pool becomes idle.
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed set of worker threads pulling boxed jobs from a FIFO queue.
///
/// The pool is a standalone utility; training never uses it. Dropping the
/// pool lets the workers drain the queue, then joins them.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Starts `n` workers; `0` means `DEFAULT_WORKERS` and anything above
    /// `MAX_WORKERS` is capped.
    pub fn new(n: usize) -> ThreadPool {
        let n = match n {
            0 => DEFAULT_WORKERS,
            n => n.min(MAX_WORKERS),
        };
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue { jobs: VecDeque::new(), running: 0, exit: false }),
            work: Condvar::new(),
            idle: Condvar::new(),
        });
        let workers = (0..n)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker(&shared))
            })
            .collect();
        log::debug!("started thread pool with {n} workers");
        ThreadPool { shared, workers }
    }

    /// Queues `job` for the first free worker.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.lock().jobs.push_back(Box::new(job));
        self.shared.work.notify_one();
    }

    /// Blocks until the queue is empty and no job is running.
    pub fn wait(&self) {
        let mut queue = self.shared.lock();
        while !queue.jobs.is_empty() || queue.running > 0 {
            queue = self.shared.idle.wait(queue).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Jobs currently executing.
    pub fn running(&self) -> usize {
        self.shared.lock().running
    }

    /// Number of worker threads.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.lock().exit = true;
        self.shared.work.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("thread pool worker panicked during shutdown");
            }
        }
    }
}

fn worker(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    queue.running += 1;
                    break job;
                }
                if queue.exit {
                    return;
                }
                queue = shared.work.wait(queue).unwrap_or_else(PoisonError::into_inner);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::warn!("thread pool job panicked");
        }

        let mut queue = shared.lock();
        queue.running -= 1;
        if queue.running == 0 && queue.jobs.is_empty() {
            shared.idle.notify_all();
        }
    }
}
