#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest-path planner over a traversability field.
//!
//! The planner sees nothing but a [`TraversalMap`]: an implicit
//! 4-connected grid graph where a node exists only when its traversal value
//! is nonzero. Search is A* with the Manhattan heuristic, which is admissible
//! because every step costs one and diagonal movement is disallowed. An
//! unreachable destination is not an error; the search falls back to the
//! expanded node closest to it.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use pathing_core::{CellCoord, TraversalMap};

const UNVISITED: u32 = u32::MAX;

/// Computes a best-effort shortest path from `start` to `end`.
///
/// The returned sequence includes both endpoints. When `end` cannot be
/// reached the path leads to the reachable node with the smallest Manhattan
/// distance to `end` instead. A `start` that is out of bounds or blocked
/// yields an empty path; a fully enclosed `start` yields `[start]`.
///
/// Ties between equal-length paths are resolved by node-expansion order and
/// are deterministic for a fixed map, but callers should only rely on path
/// length and validity.
#[must_use]
pub fn compute_path(map: &TraversalMap, start: CellCoord, end: CellCoord) -> Vec<CellCoord> {
    if !map.is_traversable(start) {
        log::warn!("path requested from untraversable start ({}, {})", start.x(), start.y());
        return Vec::new();
    }

    let mut search = Search::new(map.width(), map.length());
    let Some(start_index) = search.index(start) else {
        return Vec::new();
    };

    search.cost[start_index] = 0;

    // Open list keyed by f-cost; Reverse turns the max-heap into a min-heap.
    // Equal costs break toward the lexicographically smallest cell, which
    // keeps the returned path deterministic for a fixed map.
    let mut open: BinaryHeap<(Reverse<u32>, Reverse<CellCoord>)> = BinaryHeap::new();
    open.push((Reverse(start.manhattan_distance(end)), Reverse(start)));

    let mut closest = start;
    let mut closest_heuristic = start.manhattan_distance(end);

    while let Some((_, Reverse(cell))) = open.pop() {
        if cell == end {
            closest = end;
            break;
        }

        let Some(cell_index) = search.index(cell) else {
            continue;
        };
        if search.expanded[cell_index] {
            continue;
        }
        search.expanded[cell_index] = true;

        let heuristic = cell.manhattan_distance(end);
        if heuristic < closest_heuristic {
            closest = cell;
            closest_heuristic = heuristic;
        }

        let next_cost = search.cost[cell_index] + 1;
        for neighbor in cardinal_neighbors(cell, map.width(), map.length()) {
            if !map.is_traversable(neighbor) {
                continue;
            }
            let Some(neighbor_index) = search.index(neighbor) else {
                continue;
            };
            if search.cost[neighbor_index] <= next_cost {
                continue;
            }

            search.cost[neighbor_index] = next_cost;
            search.came_from[neighbor_index] = Some(cell);
            open.push((Reverse(next_cost + neighbor.manhattan_distance(end)), Reverse(neighbor)));
        }
    }

    search.rebuild(start, closest)
}

struct Search {
    width: u32,
    length: u32,
    cost: Vec<u32>,
    came_from: Vec<Option<CellCoord>>,
    expanded: Vec<bool>,
}

impl Search {
    fn new(width: u32, length: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(length);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            length,
            cost: vec![UNVISITED; capacity],
            came_from: vec![None; capacity],
            expanded: vec![false; capacity],
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.length {
            let x = usize::try_from(cell.x()).ok()?;
            let y = usize::try_from(cell.y()).ok()?;
            let length = usize::try_from(self.length).ok()?;
            Some(x * length + y)
        } else {
            None
        }
    }

    fn rebuild(&self, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
        let mut path = vec![goal];
        let mut cursor = goal;

        while cursor != start {
            let Some(index) = self.index(cursor) else {
                return Vec::new();
            };
            match self.came_from[index] {
                Some(previous) => {
                    path.push(previous);
                    cursor = previous;
                }
                None => return Vec::new(),
            }
        }

        path.reverse();
        path
    }
}

fn cardinal_neighbors(cell: CellCoord, width: u32, length: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(y) = cell.y().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.x(), y));
        count += 1;
    }
    if cell.x() + 1 < width {
        candidates[count] = Some(CellCoord::new(cell.x() + 1, cell.y()));
        count += 1;
    }
    if cell.y() + 1 < length {
        candidates[count] = Some(CellCoord::new(cell.x(), cell.y() + 1));
        count += 1;
    }
    if let Some(x) = cell.x().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(x, cell.y()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
