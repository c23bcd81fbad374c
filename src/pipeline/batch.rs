//! Bounded worker pool that keeps results in input order.
//!
//! Tasks are claimed from a shared cursor by a fixed number of scoped
//! threads, so at most `workers` tasks run at once. Each result lands in the
//! slot of its input index, whatever order tasks finish in. A panicking task
//! yields an error in its own slot and does not disturb its siblings.
//! Workers log under the caller's subscriber and current span.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Task {index} panicked: {message}")]
pub struct TaskPanic {
    pub index: usize,
    pub message: String,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Claim and run tasks until the cursor passes the end of `items`.
fn drain<T, R, F>(items: &[T], next: &AtomicUsize, f: &F) -> Vec<(usize, Result<R, TaskPanic>)>
where
    F: Fn(usize, &T) -> R,
{
    let mut finished = Vec::new();
    loop {
        let index = next.fetch_add(1, Ordering::Relaxed);
        if index >= items.len() {
            break;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(index, &items[index])))
            .map_err(|payload| TaskPanic {
                index,
                message: panic_message(payload.as_ref()),
            });
        if let Err(e) = &outcome {
            tracing::warn!(index, error = %e, "Batch task failed");
        }
        finished.push((index, outcome));
    }
    finished
}

/// Apply `f` to every item on at most `workers` threads.
///
/// Output index `i` always holds the outcome for `items[i]`. The call
/// returns once every task has finished.
pub fn map_ordered<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<Result<R, TaskPanic>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, total);
    let next = AtomicUsize::new(0);

    let mut slots: Vec<Option<Result<R, TaskPanic>>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    let parent = tracing::Span::current();

    let next = &next;
    let f = &f;
    let dispatch = &dispatch;
    let parent = &parent;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    tracing::dispatcher::with_default(dispatch, || {
                        let _entered = parent.enter();
                        drain(items, next, f)
                    })
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(finished) => {
                    for (index, outcome) in finished {
                        slots[index] = Some(outcome);
                    }
                }
                Err(_) => tracing::error!("Batch worker thread panicked outside a task"),
            }
        }
    });

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                Err(TaskPanic {
                    index,
                    message: "worker exited before the task completed".to_string(),
                })
            })
        })
        .collect()
}
