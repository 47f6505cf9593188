// Periodic background jobs bound to a view's lifetime

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// When the first run of a periodic job happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstRun {
    /// Run once right away, then every period
    Immediately,
    /// Wait one full period before the first run
    AfterPeriod,
}

/// Handle to a periodic job running on the tokio runtime.
///
/// Tearing down (explicitly or by dropping the handle) aborts the task, so the
/// job never starts again afterwards. A run that is mid-`await` is cancelled
/// at that await point.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
    wake: Arc<Notify>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, first: FirstRun, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let start = match first {
            FirstRun::Immediately => Instant::now(),
            FirstRun::AfterPeriod => Instant::now() + period,
        };

        let wake = Arc::new(Notify::new());
        let woken = wake.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => debug!("Periodic job '{}' firing", name),
                    _ = woken.notified() => {
                        debug!("Periodic job '{}' run on request", name);
                        ticker.reset();
                    }
                }
                job().await;
            }
        });

        Self {
            name,
            handle: Some(handle),
            wake,
        }
    }

    /// Runs the job as soon as the current run (if any) finishes and restarts
    /// the period from there. Runs never overlap. No-op after teardown.
    pub fn run_now(&self) {
        if self.handle.is_some() {
            self.wake.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Tearing down periodic job '{}'", self.name);
            handle.abort();
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_job(counter: Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_first_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _task = PeriodicTask::spawn(
            "test",
            Duration::from_secs(10),
            FirstRun::Immediately,
            counting_job(counter.clone()),
        );

        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_first_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _task = PeriodicTask::spawn(
            "test",
            Duration::from_secs(10),
            FirstRun::AfterPeriod,
            counting_job(counter.clone()),
        );

        time::sleep(Duration::from_secs(9)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_now_restarts_the_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = PeriodicTask::spawn(
            "test",
            Duration::from_secs(10),
            FirstRun::Immediately,
            counting_job(counter.clone()),
        );
        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        task.run_now();
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        // Next scheduled run is a full period after the requested one
        time::sleep(Duration::from_secs(8)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        task.teardown();
        task.run_now();
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_job() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = PeriodicTask::spawn(
            "test",
            Duration::from_secs(10),
            FirstRun::Immediately,
            counting_job(counter.clone()),
        );
        time::sleep(Duration::from_millis(1)).await;
        assert!(task.is_running());
        drop(task);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
