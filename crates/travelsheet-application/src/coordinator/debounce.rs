use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A single-flight timer.
///
/// Every `schedule` cancels the pending timer and starts a new one, so the
/// action runs once, `delay` after the last call. Once the delay has elapsed
/// the action runs as its own task and is no longer affected by later
/// `schedule` or `cancel` calls.
pub struct Debouncer {
    delay: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending timer and schedules `action` after the delay.
    pub fn schedule<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("[Debouncer] timer fired");
            tokio::spawn(action());
        });

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
    }

    /// Cancels the pending timer, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        match timer.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_action(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_coalesces() {
        let debouncer = Debouncer::new(Duration::from_millis(1500));
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counter_action(&fired));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        debouncer.schedule(counter_action(&fired));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let debouncer = Debouncer::new(Duration::from_millis(1500));
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counter_action(&fired));
        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_millis(3000)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }
}
