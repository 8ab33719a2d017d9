//! Session throughput statistics

use std::sync::Arc;

/// Cumulative throughput figures reported by the input/statistics
/// activity while a session runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStats {
    /// Occupancy of the graphics command FIFO
    pub fifo_depth: f64,
    /// Guest frame rate in frames per second
    pub frame_rate: f64,
    /// Guest frame time in milliseconds
    pub frame_time: f64,
}

/// Callback invoked with each statistics report.
pub type StatsCallback = Arc<dyn Fn(PerfStats) + Send + Sync>;
