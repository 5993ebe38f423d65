#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring of a completed traversal against the grid's target set.

use std::collections::HashSet;

use pathing_core::{CellCoord, GridTarget, PathScore};

/// Scores a path against the target set.
///
/// A target counts as hit when any path coordinate equals its position;
/// repeat visits count once. The score is the sum of hit target values plus
/// the unused-block bonus. Pure function of its inputs: calling it twice with
/// the same arguments yields identical results.
#[must_use]
pub fn score_path(
    path: &[CellCoord],
    targets: &[GridTarget],
    blocks_remaining: u32,
    block_count: u32,
) -> PathScore {
    let visited: HashSet<CellCoord> = path.iter().copied().collect();

    // Definition order keeps the hit list deterministic.
    let hit_targets: Vec<GridTarget> = targets
        .iter()
        .copied()
        .filter(|target| visited.contains(&target.position()))
        .collect();

    let hit_target_count = u32::try_from(hit_targets.len()).unwrap_or(u32::MAX);
    let target_count = u32::try_from(targets.len()).unwrap_or(u32::MAX);
    let target_score: u32 = hit_targets.iter().map(GridTarget::value).sum();

    PathScore {
        hit_all_targets: hit_target_count == target_count,
        score: target_score + blocks_remaining,
        blocks_used: block_count.saturating_sub(blocks_remaining),
        hit_targets,
        hit_target_count,
        target_count,
        block_count,
    }
}
