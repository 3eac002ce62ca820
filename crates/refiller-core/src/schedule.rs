//! Next-frame task queue.
//!
//! The host forbids some entity writes while it is dispatching a game
//! event, so work triggered from an event handler is queued here and run
//! at the start of the next frame. Tasks are plain values (ids and policy
//! copies), never live entity references, so a task stays valid no matter
//! what happens to the world before it runs.

use std::collections::VecDeque;

/// FIFO of tasks waiting for the next frame boundary.
#[derive(Debug, Clone)]
pub struct NextFrameQueue<T> {
    tasks: VecDeque<T>,
}

impl<T> Default for NextFrameQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NextFrameQueue<T> {
    /// An empty queue.
    pub const fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Queue `task` to run at the next frame boundary.
    pub fn defer(&mut self, task: T) {
        self.tasks.push_back(task);
    }

    /// Take every queued task, oldest first. Tasks deferred while the
    /// returned batch is being processed wait for the following frame.
    pub fn drain(&mut self) -> Vec<T> {
        self.tasks.drain(..).collect()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
