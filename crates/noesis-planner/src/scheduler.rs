//! Cooperative scheduling of several resumable computations.

use std::collections::VecDeque;

use noesis_core::Result;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use crate::clock::TickClock;
use crate::planner::{Progress, Resumable};

struct Task<R: Resumable> {
    id: Uuid,
    work: R,
    reply: oneshot::Sender<Result<R::Output>>,
}

/// Round-robin scheduler that completes a oneshot channel per task.
///
/// Dropping a task's receiver cancels the task; it is discarded at its next
/// turn without being resumed.
pub struct Scheduler<R: Resumable> {
    tasks: VecDeque<Task<R>>,
}

impl<R: Resumable> Scheduler<R> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Queue a computation. The receiver yields its result once.
    pub fn spawn(&mut self, work: R) -> (Uuid, oneshot::Receiver<Result<R::Output>>) {
        let id = Uuid::new_v4();
        let (reply, receiver) = oneshot::channel();
        self.tasks.push_back(Task { id, work, reply });
        debug!("Scheduled task {}", id);
        (id, receiver)
    }

    /// Drop a queued computation. Returns false if it is unknown.
    pub fn cancel(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    /// Run tasks in turn until one suspends or none are left.
    ///
    /// Returns the number of tasks that finished during this tick.
    pub fn tick(&mut self, clock: &dyn TickClock) -> usize {
        let mut finished = 0;
        while let Some(mut task) = self.tasks.pop_front() {
            if task.reply.is_closed() {
                debug!("Task {} cancelled", task.id);
                continue;
            }
            let outcome = match task.work.resume(clock) {
                Ok(Progress::Suspended) => {
                    self.tasks.push_back(task);
                    break;
                }
                Ok(Progress::Complete(output)) => Ok(output),
                Err(error) => Err(error),
            };
            finished += 1;
            if task.reply.send(outcome).is_err() {
                debug!("Result of task {} went unread", task.id);
            }
        }
        finished
    }

    /// Number of queued computations.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<R: Resumable> Default for Scheduler<R> {
    fn default() -> Self {
        Self::new()
    }
}
