#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pathing mini-games.
//!
//! This crate defines the message surface that connects the presentation
//! adapters, the authoritative world, and the pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a grid cell flip between open and blocked.
    ToggleCell {
        /// Cell the player clicked.
        cell: CellCoord,
    },
    /// Restores every cell to traversable and refills the block budget.
    ResetGrid,
    /// Marks a cell as lying on the animated path.
    MarkPathCell {
        /// Cell the traversal animation is currently visiting.
        cell: CellCoord,
    },
    /// Clears every path marking ahead of a fresh traversal.
    ClearPathMarks,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a cell flipped between open and blocked.
    CellToggled {
        /// Cell whose traversability changed.
        cell: CellCoord,
        /// Whether the cell is blocked after the toggle.
        blocked: bool,
        /// Blocks left in the player's budget after the toggle.
        blocks_remaining: u32,
    },
    /// Reports that a toggle request was ignored.
    ToggleRejected {
        /// Cell provided in the rejected request.
        cell: CellCoord,
        /// Specific reason the toggle was ignored.
        reason: ToggleRejection,
    },
    /// Confirms that the grid returned to its initial traversability.
    GridReset,
    /// Confirms that a cell gained a path marking.
    PathCellMarked {
        /// Cell that is now marked as on-path.
        cell: CellCoord,
    },
    /// Confirms that all path markings were removed.
    PathMarksCleared,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
}

/// Reasons a cell toggle request may be ignored by the world.
///
/// Illegal toggles are a silent no-op from the player's perspective; the
/// rejection event exists so presentation layers can observe why nothing
/// happened, never as an error channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleRejection {
    /// The requested cell lies outside the grid bounds.
    OutOfBounds,
    /// The requested cell is the start or end of the course.
    Endpoint,
    /// Blocking the cell would exceed the placeable-block budget.
    BudgetExhausted,
}

/// Location of a single grid cell expressed as x and y coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based x index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based y index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x().abs_diff(other.x()) + self.y().abs_diff(other.y())
    }
}

/// Scoring target placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridTarget {
    position: CellCoord,
    value: u32,
}

impl GridTarget {
    /// Creates a new target worth the provided score value.
    #[must_use]
    pub const fn new(position: CellCoord, value: u32) -> Self {
        Self { position, value }
    }

    /// Cell the path must visit to collect the target.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Score awarded when the path visits the target.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Reasons a grid definition may fail validation at session load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The grid has a zero width or length.
    #[error("grid dimensions must be positive")]
    ZeroDimension,
    /// The start or end coordinate lies outside the grid bounds.
    #[error("endpoint ({}, {}) lies outside the grid", .cell.x(), .cell.y())]
    EndpointOutOfBounds {
        /// Offending endpoint coordinate.
        cell: CellCoord,
    },
    /// The start and end coordinates are the same cell.
    #[error("start and end must differ")]
    IdenticalEndpoints,
    /// A target position lies outside the grid bounds.
    #[error("target ({}, {}) lies outside the grid", .cell.x(), .cell.y())]
    TargetOutOfBounds {
        /// Offending target coordinate.
        cell: CellCoord,
    },
    /// A target carries a zero score value.
    #[error("target ({}, {}) must have a positive score", .cell.x(), .cell.y())]
    WorthlessTarget {
        /// Offending target coordinate.
        cell: CellCoord,
    },
}

/// Immutable description of a playable grid consumed at session load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDefinition {
    width: u32,
    length: u32,
    start: CellCoord,
    end: CellCoord,
    placeable_blocks: u32,
    targets: Vec<GridTarget>,
}

impl GridDefinition {
    /// Creates a new grid definition.
    #[must_use]
    pub const fn new(
        width: u32,
        length: u32,
        start: CellCoord,
        end: CellCoord,
        placeable_blocks: u32,
        targets: Vec<GridTarget>,
    ) -> Self {
        Self {
            width,
            length,
            start,
            end,
            placeable_blocks,
            targets,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Cell every path begins from.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell every path aims for.
    #[must_use]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Number of blocks the player may place.
    #[must_use]
    pub const fn placeable_blocks(&self) -> u32 {
        self.placeable_blocks
    }

    /// Targets the player is rewarded for routing through.
    #[must_use]
    pub fn targets(&self) -> &[GridTarget] {
        &self.targets
    }

    /// Reports whether the provided cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.y() < self.length
    }

    /// Checks the structural invariants required of a playable definition.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.width == 0 || self.length == 0 {
            return Err(DefinitionError::ZeroDimension);
        }

        for endpoint in [self.start, self.end] {
            if !self.contains(endpoint) {
                return Err(DefinitionError::EndpointOutOfBounds { cell: endpoint });
            }
        }

        if self.start == self.end {
            return Err(DefinitionError::IdenticalEndpoints);
        }

        for target in &self.targets {
            if !self.contains(target.position()) {
                return Err(DefinitionError::TargetOutOfBounds {
                    cell: target.position(),
                });
            }
            if target.value() == 0 {
                return Err(DefinitionError::WorthlessTarget {
                    cell: target.position(),
                });
            }
        }

        Ok(())
    }
}

/// Dense traversability field exported by the grid for path planning.
///
/// The map is the sole interface between the grid and the planner: a value of
/// one marks a traversable cell, zero a blocked one, indexed `[x][y]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalMap {
    width: u32,
    length: u32,
    cells: Vec<u8>,
}

impl TraversalMap {
    /// Creates a fully traversable map with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, length: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(length);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            length,
            cells: vec![1; capacity],
        }
    }

    /// Number of columns covered by the map.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows covered by the map.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Overwrites the traversability of a single cell.
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, traversable: bool) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = u8::from(traversable);
            }
        }
    }

    /// Reports whether the provided cell may be traversed.
    ///
    /// Cells outside the map are never traversable.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .map_or(false, |value| value != 0)
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
}

impl fmt::Display for TraversalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..self.width {
            let mut values = Vec::new();
            for y in 0..self.length {
                let value = u8::from(self.is_traversable(CellCoord::new(x, y)));
                values.push(value.to_string());
            }
            writeln!(f, "{}", values.join(","))?;
        }
        Ok(())
    }
}

/// Immutable scoring result computed from a completed traversal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathScore {
    /// Targets the path visited, in definition order.
    pub hit_targets: Vec<GridTarget>,
    /// Number of distinct targets the path visited.
    pub hit_target_count: u32,
    /// Total number of targets on the grid.
    pub target_count: u32,
    /// Whether every target was visited.
    pub hit_all_targets: bool,
    /// Sum of visited target values plus the unused-block bonus.
    pub score: u32,
    /// Blocks spent out of the initial budget.
    pub blocks_used: u32,
    /// Initial placeable-block budget.
    pub block_count: u32,
}

/// Cross-cutting session flags and counters shared with the presentation
/// layer.
///
/// The UI polls this state at roughly 10 Hz and writes `play`/`reset` as
/// one-shot intents; the session controller clears both unconditionally at
/// the end of every frame tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Edge-triggered intent to plan and animate a traversal.
    pub play: bool,
    /// Edge-triggered intent to restore the grid to its initial state.
    pub reset: bool,
    /// Blocks remaining in the player's budget.
    pub blocks: u32,
    /// Initial placeable-block budget.
    pub total_blocks: u32,
    /// Score published by the most recent completed traversal.
    pub score: u32,
    /// Targets hit by the most recent completed traversal.
    pub hit_target_count: u32,
    /// Total number of targets on the active grid.
    pub target_count: u32,
}

impl SessionState {
    /// State presented when no session is loaded.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            play: false,
            reset: false,
            blocks: 0,
            total_blocks: 0,
            score: 0,
            hit_target_count: 0,
            target_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, DefinitionError, GridDefinition, GridTarget, SessionState, TraversalMap,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn definition() -> GridDefinition {
        GridDefinition::new(
            8,
            8,
            CellCoord::new(0, 0),
            CellCoord::new(7, 7),
            12,
            vec![GridTarget::new(CellCoord::new(0, 7), 5)],
        )
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn definition_accepts_reference_level() {
        assert_eq!(definition().validate(), Ok(()));
    }

    #[test]
    fn definition_rejects_out_of_bounds_endpoint() {
        let definition = GridDefinition::new(
            8,
            8,
            CellCoord::new(0, 0),
            CellCoord::new(8, 7),
            12,
            Vec::new(),
        );
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::EndpointOutOfBounds {
                cell: CellCoord::new(8, 7)
            })
        );
    }

    #[test]
    fn definition_rejects_identical_endpoints() {
        let definition = GridDefinition::new(
            4,
            4,
            CellCoord::new(1, 1),
            CellCoord::new(1, 1),
            3,
            Vec::new(),
        );
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::IdenticalEndpoints)
        );
    }

    #[test]
    fn definition_rejects_worthless_target() {
        let definition = GridDefinition::new(
            4,
            4,
            CellCoord::new(0, 0),
            CellCoord::new(3, 3),
            3,
            vec![GridTarget::new(CellCoord::new(2, 2), 0)],
        );
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::WorthlessTarget {
                cell: CellCoord::new(2, 2)
            })
        );
    }

    #[test]
    fn traversal_map_reports_out_of_bounds_as_blocked() {
        let map = TraversalMap::new(3, 3);
        assert!(map.is_traversable(CellCoord::new(2, 2)));
        assert!(!map.is_traversable(CellCoord::new(3, 0)));
        assert!(!map.is_traversable(CellCoord::new(0, 3)));
    }

    #[test]
    fn traversal_map_set_round_trips() {
        let mut map = TraversalMap::new(4, 4);
        let cell = CellCoord::new(1, 2);
        map.set(cell, false);
        assert!(!map.is_traversable(cell));
        map.set(cell, true);
        assert!(map.is_traversable(cell));
    }

    #[test]
    fn traversal_map_renders_rows_per_column() {
        let mut map = TraversalMap::new(2, 2);
        map.set(CellCoord::new(0, 1), false);
        assert_eq!(map.to_string(), "1,0\n1,1\n");
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn grid_definition_round_trips_through_bincode() {
        assert_round_trip(&definition());
    }

    #[test]
    fn session_state_round_trips_through_bincode() {
        let state = SessionState {
            play: true,
            blocks: 7,
            total_blocks: 12,
            score: 17,
            hit_target_count: 1,
            target_count: 1,
            ..SessionState::empty()
        };
        assert_round_trip(&state);
    }
}
