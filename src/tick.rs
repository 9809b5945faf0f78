//! Run work on the next tick of a single-threaded host loop.

use std::collections::VecDeque;

type Task<Ctx> = Box<dyn FnOnce(&mut TickScheduler<Ctx>, &mut Ctx)>;

/// A FIFO queue of deferred tasks, drained once per host-loop tick.
///
/// `Ctx` is whatever the host passes to each task — typically the
/// [`ConfigRegistry`](crate::ConfigRegistry) for deferred store mutations, or
/// a wider application state. Each task also receives the scheduler, so it
/// can queue follow-up work; anything scheduled while a tick is running is
/// held for the next tick, so a deferred mutation never becomes visible
/// before the current tick completes. Everything runs on the calling thread;
/// there is no cancellation.
///
/// # Example
///
/// ```rust
/// use keypath_config::TickScheduler;
///
/// let mut scheduler = TickScheduler::new();
/// let mut log: Vec<u32> = Vec::new();
///
/// scheduler.schedule(|_, log: &mut Vec<u32>| log.push(1));
/// scheduler.schedule(|_, log: &mut Vec<u32>| log.push(2));
/// scheduler.tick(&mut log);
/// assert_eq!(log, [1, 2]);
/// ```
pub struct TickScheduler<Ctx> {
    queue: VecDeque<Task<Ctx>>,
}

impl<Ctx> TickScheduler<Ctx> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Enqueues `task` to run on the next tick, after every task already
    /// queued.
    pub fn schedule(&mut self, task: impl FnOnce(&mut TickScheduler<Ctx>, &mut Ctx) + 'static) {
        self.queue.push_back(Box::new(task));
    }

    /// Number of tasks waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs, in FIFO order, exactly the tasks that were queued before this
    /// call. Tasks scheduled by those tasks land in the queue for the
    /// following tick.
    pub fn tick(&mut self, ctx: &mut Ctx) {
        let due = std::mem::take(&mut self.queue);
        for task in due {
            task(self, ctx);
        }
    }
}

impl<Ctx> Default for TickScheduler<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}
