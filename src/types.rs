//! Shared types used across the engine.
//!
//! Timing helpers and the statistics snapshot reported by the icon service.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Snapshot of the icon service state, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Id of the theme the current lookup table was built from
    pub theme_id: String,
    /// Incremented on every published rebuild or invalidation
    pub generation: u64,
    /// Entries across the file name, extension and language tables
    pub table_entries: usize,
    /// Number of icon definitions in the descriptor
    pub definitions: usize,
    /// Populated result cache entries
    pub cached_results: usize,
    /// Populated path cache entries
    pub cached_paths: usize,
}

/// Timer utility for measuring operation duration.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_is_monotonic() {
        let timer = Timer::start();
        let first = timer.elapsed_ms();
        let second = timer.elapsed_ms();
        assert!(second >= first);
        assert!(first >= 0.0);
    }
}
