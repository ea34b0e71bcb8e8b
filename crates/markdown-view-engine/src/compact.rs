//! # Run Compaction
//!
//! Merges every chain of adjacent styled-text runs into one run. Attribute
//! differences survive as segments of the merged [`StyledText`] and highlight
//! ranges are shifted into the merged content, so nothing a renderer paints
//! changes. Images, math and raw HTML are never merged.
//!
//! The result has no two adjacent styled-text runs, which makes the pass
//! idempotent.

use crate::runs::Run;

/// Merge adjacent styled-text runs, preserving order.
pub fn compact(runs: Vec<Run>) -> Vec<Run> {
    let mut compacted: Vec<Run> = Vec::with_capacity(runs.len());

    for run in runs {
        match run {
            Run::StyledText(next) => match compacted.last_mut() {
                Some(Run::StyledText(previous)) => previous.append(next),
                _ => compacted.push(Run::StyledText(next)),
            },
            other => compacted.push(other),
        }
    }

    compacted
}
