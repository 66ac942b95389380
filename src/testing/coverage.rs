//! Sample-based coverage estimate.
//!
//! The "total" is a rough guess at the number of interleavings: the average
//! block count per thread raised to the number of threads. It is not derived
//! from the program's structure.

use crate::error::TestingError;
use crate::flow::Flowchart;

pub const MIN_OPERATIONS: u32 = 1;
pub const MAX_OPERATIONS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Rounded; may exceed 100 when more samples ran than the cap allows.
    pub percentage: u64,
    pub tested_combinations: usize,
    pub total_possible: f64,
}

/// `avg_blocks_per_thread ^ thread_count`, or 0 for a flowchart without threads.
pub fn total_combinations(flowchart: &Flowchart) -> f64 {
    let threads = flowchart.threads.len();
    if threads == 0 {
        return 0.0;
    }
    let average = flowchart.block_count() as f64 / threads as f64;
    average.powi(threads as i32)
}

/// Caps `total_combinations` at `max_operations²` and reports how much of it
/// `tested` samples cover.
pub fn estimate(
    tested: usize,
    total_combinations: f64,
    max_operations: u32,
) -> Result<Coverage, TestingError> {
    if !(MIN_OPERATIONS..=MAX_OPERATIONS).contains(&max_operations) {
        return Err(TestingError::CoverageRange(max_operations));
    }
    let cap = f64::from(max_operations).powi(2);
    let total_possible = total_combinations.min(cap);
    let percentage = if total_possible > 0.0 {
        (tested as f64 / total_possible * 100.0).round() as u64
    } else {
        0
    };
    Ok(Coverage {
        percentage,
        tested_combinations: tested,
        total_possible,
    })
}
