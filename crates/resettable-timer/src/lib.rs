//! Timer tasks with explicit ownership
//!
//! Wraps the ambient `tokio` timers in spawned tasks controlled through a
//! [`TimerHandle`] so the owner can reset or stop them and multiple
//! independent instances can coexist (important for tests).
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

use std::{ops::ControlFlow, time::Duration};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a spawned timer task
///
/// Dropping the handle stops the task, so "cancellation" of a timer is
/// implicit in dropping its owner
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
    reset_tx: watch::Sender<()>,
}

impl TimerHandle {
    /// Restarts the countdown / period from now
    ///
    /// Last-writer-wins: a reset cancels any pending prior firing. Has no
    /// effect if the task has already fired or been stopped.
    pub fn reset(&self) {
        // Send only fails if the task already exited which is fine
        let _ = self.reset_tx.send(());
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns a single-shot countdown of `timeout` that runs `on_elapsed` unless
/// reset or stopped first
pub fn spawn_single_shot<F>(timeout: Duration, on_elapsed: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let token = CancellationToken::new();
    let (reset_tx, mut reset_rx) = watch::channel(());
    let task_token = token.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!("single-shot timer stopped before elapsing");
                    return;
                }
                changed = reset_rx.changed() => {
                    if changed.is_err() {
                        // Handle dropped without cancelling, nothing left to report to
                        return;
                    }
                    // Countdown restarts on the next loop iteration
                }
                _ = tokio::time::sleep(timeout) => break,
            }
        }
        on_elapsed();
    });
    TimerHandle { token, reset_tx }
}

/// Spawns a repeating timer that runs `on_tick` every `period` until the tick
/// returns [`ControlFlow::Break`] or the handle stops it
///
/// The first tick fires one full `period` after the call, not immediately.
pub fn spawn_repeating<F>(period: Duration, mut on_tick: F) -> TimerHandle
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let token = CancellationToken::new();
    let (reset_tx, mut reset_rx) = watch::channel(());
    let task_token = token.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!("repeating timer stopped");
                    return;
                }
                changed = reset_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    interval.reset();
                }
                _ = interval.tick() => {
                    if on_tick().is_break() {
                        return;
                    }
                }
            }
        }
    });
    TimerHandle { token, reset_tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    const TIMEOUT: Duration = Duration::from_secs(60);

    /// Lets spawned timer tasks observe time that was advanced while the test
    /// task held the (current thread) runtime
    async fn drain_tasks() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        (count, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn single_shot_fires_once_after_timeout() {
        // Arrange
        let (count, on_elapsed) = counter();
        let _handle = spawn_single_shot(TIMEOUT, on_elapsed);
        drain_tasks().await; // Let the task register its timer before advancing

        // Act - not yet elapsed
        tokio::time::advance(TIMEOUT - Duration::from_secs(1)).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 0, "fired early");

        // Act - past the deadline
        tokio::time::advance(Duration::from_secs(2)).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Act - long after, must not fire again
        tokio::time::advance(TIMEOUT * 3).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_shot_reset_restarts_countdown() {
        // Arrange
        let (count, on_elapsed) = counter();
        let handle = spawn_single_shot(TIMEOUT, on_elapsed);
        drain_tasks().await;

        // Act - keep resetting just before the deadline
        for _ in 0..5 {
            tokio::time::advance(TIMEOUT - Duration::from_secs(1)).await;
            handle.reset();
            drain_tasks().await;
        }

        // Assert - never fired despite 5x the timeout elapsing in total
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Act - let it run out
        tokio::time::advance(TIMEOUT + Duration::from_secs(1)).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_stops_single_shot() {
        // Arrange
        let (count, on_elapsed) = counter();
        let handle = spawn_single_shot(TIMEOUT, on_elapsed);

        // Act
        drop(handle);
        tokio::time::advance(TIMEOUT * 2).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_ticks_until_stopped() {
        // Arrange
        let (count, on_elapsed) = counter();
        let handle = spawn_repeating(TIMEOUT, move || {
            on_elapsed();
            ControlFlow::Continue(())
        });
        drain_tasks().await;

        // Act
        tokio::time::advance(TIMEOUT * 3).await;
        drain_tasks().await;

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 3);

        // Act - stop and confirm no further ticks
        handle.stop();
        tokio::time::advance(TIMEOUT * 3).await;
        drain_tasks().await;

        // Assert
        assert!(handle.is_stopped());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_break_ends_task() {
        // Arrange
        let (count, on_elapsed) = counter();
        let _handle = spawn_repeating(TIMEOUT, move || {
            on_elapsed();
            ControlFlow::Break(())
        });
        drain_tasks().await;

        // Act
        tokio::time::advance(TIMEOUT * 5).await;
        drain_tasks().await;

        // Assert - only the first tick ran
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
