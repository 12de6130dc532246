//! Scheduler configuration - worker threads for pumping games
//!
//! Games never share state, so a pump can visit them on several threads at
//! once. One worker (the default) pumps every game on the calling thread.

use serde::{Deserialize, Serialize};

/// Configuration for [`Scheduler`](crate::Scheduler) execution
///
/// # Example
///
/// ```
/// use bout_hub::SchedulerConfig;
///
/// let config = SchedulerConfig::default();
/// assert!(config.is_single_worker());
///
/// // Clamped to the available cores
/// let config = SchedulerConfig::with_workers(4);
/// assert_eq!(config.workers(), 4.min(bout_hub::max_workers()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of threads a pump spreads games over, within `[1, max_workers()]`
    workers: usize,
}

impl SchedulerConfig {
    /// Create a configuration with the given worker count
    ///
    /// The count is clamped to `[1, max_workers()]`.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.clamp(1, max_workers()),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Set the worker count, clamped to `[1, max_workers()]`
    pub fn set_workers(&mut self, n: usize) {
        self.workers = n.clamp(1, max_workers());
    }

    pub fn is_single_worker(&self) -> bool {
        self.workers == 1
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Logical CPUs on this machine, the upper bound for workers
pub fn max_workers() -> usize {
    num_cpus::get()
}
