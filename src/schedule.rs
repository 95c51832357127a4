// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tabgrid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tabgrid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Run-once, cancellable deferred execution.
//!
//! Views use this for forced refreshes after a context change and the manager uses it to
//! coalesce invalidations into one render pass. Everything runs on the host's single logical
//! thread; tasks are `!Send`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tokio::task::AbortHandle;

pub type Task = Box<dyn FnOnce() + 'static>;

pub trait Scheduler {
    /// Run `task` once at a later point on the same thread. The task is skipped if its handle
    /// is cancelled before it starts.
    fn run_once(&self, task: Task) -> TaskHandle;
}

#[derive(Debug, Default)]
struct TaskState {
    cancelled: Cell<bool>,
    started: Cell<bool>,
    abort: RefCell<Option<AbortHandle>>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    state: Rc<TaskState>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.state.cancelled.set(true);
        if let Some(abort) = self.state.abort.borrow_mut().take() {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    pub fn has_started(&self) -> bool {
        self.state.started.get()
    }

    /// Claim the task for execution. Returns `false` if it was cancelled or already started.
    fn begin(&self) -> bool {
        if self.is_cancelled() || self.state.started.replace(true) {
            return false;
        }
        self.state.abort.borrow_mut().take();
        true
    }

    fn attach_abort(&self, abort: AbortHandle) {
        if self.is_cancelled() {
            abort.abort();
            return;
        }
        *self.state.abort.borrow_mut() = Some(abort);
    }
}

/// Scheduler drained explicitly by the host's tick loop.
#[derive(Default)]
pub struct TickScheduler {
    queue: RefCell<VecDeque<(TaskHandle, Task)>>,
}

impl fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run every task queued before this call. Tasks queued while draining wait for the next
    /// tick. Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let batch = self.queue.borrow_mut().drain(..).collect::<Vec<_>>();
        let mut ran = 0;
        for (handle, task) in batch {
            if !handle.begin() {
                continue;
            }
            task();
            ran += 1;
        }
        ran
    }
}

impl Scheduler for TickScheduler {
    fn run_once(&self, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        self.queue.borrow_mut().push_back((handle.clone(), task));
        handle
    }
}

/// Scheduler backed by `tokio::task::spawn_local`.
///
/// Must be used from within a `tokio::task::LocalSet`. Tasks yield once before running so that
/// everything scheduled in the same turn coalesces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTaskScheduler;

impl Scheduler for LocalTaskScheduler {
    fn run_once(&self, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let guard = handle.clone();
        let join = tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            if guard.begin() {
                task();
            }
        });
        handle.attach_abort(join.abort_handle());
        handle
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{LocalTaskScheduler, Scheduler, TickScheduler};

    #[test]
    fn tick_scheduler_runs_queued_tasks_once() {
        let scheduler = TickScheduler::new();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let handle = scheduler.run_once(Box::new(move || counter.set(counter.get() + 1)));
        assert_eq!(scheduler.pending(), 1);
        assert!(!handle.has_started());

        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(scheduler.run_pending(), 0);
        assert_eq!(count.get(), 1);
        assert!(handle.has_started());
    }

    #[test]
    fn tick_scheduler_skips_cancelled_tasks() {
        let scheduler = TickScheduler::new();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        let handle = scheduler.run_once(Box::new(move || counter.set(counter.get() + 1)));
        handle.cancel();

        assert_eq!(scheduler.run_pending(), 0);
        assert_eq!(count.get(), 0);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn tasks_queued_while_draining_wait_for_next_tick() {
        let scheduler = Rc::new(TickScheduler::new());
        let count = Rc::new(Cell::new(0));

        let inner_scheduler = scheduler.clone();
        let counter = count.clone();
        scheduler.run_once(Box::new(move || {
            let counter = counter.clone();
            inner_scheduler.run_once(Box::new(move || counter.set(counter.get() + 1)));
        }));

        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(count.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_task_scheduler_runs_after_yield() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let count = Rc::new(Cell::new(0));
                let counter = count.clone();
                let handle =
                    LocalTaskScheduler.run_once(Box::new(move || counter.set(counter.get() + 1)));
                assert_eq!(count.get(), 0);

                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }

                assert_eq!(count.get(), 1);
                assert!(handle.has_started());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_task_scheduler_cancel_prevents_run() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let count = Rc::new(Cell::new(0));
                let counter = count.clone();
                let handle =
                    LocalTaskScheduler.run_once(Box::new(move || counter.set(counter.get() + 1)));
                handle.cancel();

                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }

                assert_eq!(count.get(), 0);
                assert!(!handle.has_started());
            })
            .await;
    }
}
