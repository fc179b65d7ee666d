use crate::config::PipelineConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct AppState {
    pub config: PipelineConfig,
    running: AtomicBool,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Claim the single batch slot. `None` when a batch is already running.
    pub fn try_start(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard { state: Arc::clone(self) })
    }
}

/// Releases the batch slot on drop.
pub struct RunGuard {
    state: Arc<AppState>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
    }
}
