use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::InstanceBackend;
use crate::models::InstanceAction;

use super::board::{FollowUp, InstanceBoard, Rejection};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives an `InstanceBoard` for a long-lived view: a repeating poll plus a
/// one-shot delayed refetch after each accepted action. Both kinds of task
/// are aborted by `shutdown` and on drop.
pub struct InstanceListController<B: InstanceBackend> {
    backend: Arc<B>,
    board: Arc<Mutex<InstanceBoard>>,
    changed: Arc<Notify>,
    settle_delay: Duration,
    poll_task: Option<JoinHandle<()>>,
    settle_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: InstanceBackend> InstanceListController<B> {
    pub fn new(backend: B, settle_delay: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            board: Arc::new(Mutex::new(InstanceBoard::new())),
            changed: Arc::new(Notify::new()),
            settle_delay,
            poll_task: None,
            settle_tasks: Mutex::new(Vec::new()),
        }
    }

    /// Signalled after every change to the board.
    pub fn changed(&self) -> Arc<Notify> {
        self.changed.clone()
    }

    pub fn snapshot(&self) -> InstanceBoard {
        lock(&self.board).clone()
    }

    pub fn with_board<R>(&self, f: impl FnOnce(&mut InstanceBoard) -> R) -> R {
        f(&mut lock(&self.board))
    }

    pub async fn refresh(&self) {
        refresh_board(self.backend.as_ref(), &self.board, &self.changed).await;
    }

    /// Start the repeating poll. The first tick fires immediately.
    pub fn start_polling(&mut self, interval: Duration) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        let backend = self.backend.clone();
        let board = self.board.clone();
        let changed = self.changed.clone();
        self.poll_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                refresh_board(backend.as_ref(), &board, &changed).await;
            }
        }));
    }

    /// Run a start/stop action with an optimistic status rewrite, then
    /// reconcile: delayed refetch on success, immediate refetch on failure.
    pub async fn trigger(&self, instance_id: &str, action: InstanceAction) -> Result<FollowUp, Rejection> {
        let ticket = lock(&self.board).begin_action(instance_id, action)?;
        self.changed.notify_one();

        let outcome = self.backend.instance_action(instance_id, action).await;
        let follow_up = lock(&self.board).complete_action(ticket, outcome, self.settle_delay);
        self.changed.notify_one();

        match follow_up {
            FollowUp::RefetchNow => self.refresh().await,
            FollowUp::RefetchAfter(delay) => self.schedule_refetch(delay),
        }
        Ok(follow_up)
    }

    fn schedule_refetch(&self, delay: Duration) {
        let backend = self.backend.clone();
        let board = self.board.clone();
        let changed = self.changed.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh_board(backend.as_ref(), &board, &changed).await;
        });
        let mut tasks = lock(&self.settle_tasks);
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }

    pub fn shutdown(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        for task in lock(&self.settle_tasks).drain(..) {
            task.abort();
        }
    }
}

impl<B: InstanceBackend> Drop for InstanceListController<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn refresh_board<B: InstanceBackend>(backend: &B, board: &Mutex<InstanceBoard>, changed: &Notify) {
    let result = backend.list_instances().await;
    lock(board).apply_fetch(result);
    changed.notify_one();
}
