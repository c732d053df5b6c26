// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned from `update`
//!
//! A task is a set of futures that each resolve to one message. The event
//! loop spawns them and feeds their results back into `update`, so handlers
//! never block and never touch state from another thread.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;

/// Futures producing follow-up messages
#[must_use = "tasks do nothing unless handed to the event loop"]
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    /// No follow-up work
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run `future` and map its output to a message
    pub fn perform<F, T>(future: F, map: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    /// Deliver `message` on the next loop iteration
    pub fn done(message: M) -> Self {
        Self {
            futures: vec![futures::future::ready(message).boxed()],
        }
    }

    /// Combine several tasks
    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }
}

impl<M> std::fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("pending", &self.futures.len())
            .finish()
    }
}
