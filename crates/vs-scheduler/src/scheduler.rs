//! `Scheduler` - owns the full set of `EngineLoop`s and their lifecycle
//! (spec.md §4.9 "Lifecycle": started after DB init, stopped via `cancel()`
//! then awaiting every task).

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine_loop::EngineLoop;

pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn every engine loop as its own task.
    #[must_use]
    pub fn start(loops: Vec<EngineLoop>) -> Self {
        let cancel = CancellationToken::new();
        let handles = loops
            .into_iter()
            .map(|engine_loop| {
                let cancel = cancel.clone();
                tokio::spawn(engine_loop.run(cancel))
            })
            .collect();
        Self { cancel, handles }
    }

    /// Signal every loop to stop and wait for them to finish their current
    /// tick.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "engine loop task panicked during shutdown");
            }
        }
    }
}
