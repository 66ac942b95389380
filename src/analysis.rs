//! A conservative heuristic for spotting flowcharts whose output may depend on
//! thread interleaving.
//!
//! The analysis counts reads and writes per variable across every block of
//! every thread. It ignores thread boundaries, block ordering and the locks
//! the generator inserts, so it over-approximates: writes that are always
//! serialized still count. Treat a positive result as "worth sampling", never
//! as a proof of a data race.

use crate::flow::{Access, Flowchart};
use std::collections::BTreeMap;

/// Aggregate read/write tally for one variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessCount {
    pub reads: usize,
    pub writes: usize,
}

impl AccessCount {
    /// More than one write, or at least one read alongside a write.
    pub fn is_racy(&self) -> bool {
        self.writes > 1 || (self.reads > 0 && self.writes > 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcurrencyReport {
    pub thread_count: usize,
    /// Tallies keyed by variable name. Declared variables are always present,
    /// undeclared ones appear as soon as a block references them.
    pub accesses: BTreeMap<String, AccessCount>,
}

impl ConcurrencyReport {
    pub fn racy_variables(&self) -> Vec<&str> {
        self.accesses
            .iter()
            .filter(|(_, count)| count.is_racy())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_potentially_non_deterministic(&self) -> bool {
        self.thread_count > 1 && self.accesses.values().any(AccessCount::is_racy)
    }
}

/// Tallies every shared-variable access in `flowchart`.
pub fn analyze(flowchart: &Flowchart) -> ConcurrencyReport {
    let mut accesses: BTreeMap<String, AccessCount> = flowchart
        .variables
        .iter()
        .map(|v| (v.clone(), AccessCount::default()))
        .collect();

    for block in flowchart.threads.iter().flat_map(|t| t.blocks()) {
        for access in block.accesses() {
            let count = accesses.entry(access.variable().to_string()).or_default();
            match access {
                Access::Read(_) => count.reads += 1,
                Access::Write(_) => count.writes += 1,
            }
        }
    }

    ConcurrencyReport {
        thread_count: flowchart.threads.len(),
        accesses,
    }
}

/// `true` if the flowchart has several threads and any variable is racy.
pub fn is_potentially_non_deterministic(flowchart: &Flowchart) -> bool {
    if flowchart.threads.len() <= 1 {
        return false;
    }
    analyze(flowchart).is_potentially_non_deterministic()
}
