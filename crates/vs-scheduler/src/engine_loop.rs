//! `EngineLoop` - one engine's wait/run/signal cycle (spec.md §4.9),
//! grounded on the teacher's interval-tick background task
//! (`controller::cli::adapter_factory::start_health_monitoring`),
//! generalized with a `tokio::sync::Notify` wake trigger and a downstream
//! signal so the pipeline's chain-wake latency isn't bound by `interval`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A boxed, repeatable async run function returning how many units of work
/// it processed this tick.
pub type RunFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<usize>> + Send>> + Send + Sync>;

pub struct EngineLoop {
    pub name: &'static str,
    pub run_fn: RunFn,
    pub interval: Duration,
    pub trigger: Arc<tokio::sync::Notify>,
    pub downstream: Option<Arc<tokio::sync::Notify>>,
}

impl EngineLoop {
    #[must_use]
    pub fn new(name: &'static str, interval: Duration, run_fn: RunFn) -> Self {
        Self { name, run_fn, interval, trigger: Arc::new(tokio::sync::Notify::new()), downstream: None }
    }

    #[must_use]
    pub fn with_downstream(mut self, downstream: Arc<tokio::sync::Notify>) -> Self {
        self.downstream = Some(downstream);
        self
    }

    /// Run `wait(trigger OR timeout=interval) -> run_fn() -> maybe signal
    /// downstream` until `cancel` fires. Exceptions are logged, never
    /// propagated - the next tick retries (spec.md §4.9 "Lifecycle").
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(engine = self.name, interval_secs = self.interval.as_secs(), "engine loop started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!(engine = self.name, "engine loop stopped");
                    return;
                }
                () = self.trigger.notified() => {}
                () = tokio::time::sleep(self.interval) => {}
            }

            match (self.run_fn)().await {
                Ok(processed) => {
                    if processed > 0 {
                        tracing::info!(engine = self.name, processed, "engine tick processed work");
                        if let Some(downstream) = &self.downstream {
                            downstream.notify_one();
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(engine = self.name, error = %err, "engine tick failed");
                }
            }
        }
    }
}
