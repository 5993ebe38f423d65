#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the grid pathing game.
//!
//! The world owns the mutable traversability grid built from a
//! [`GridDefinition`] and executes [`Command`] values submitted by the
//! session controller, broadcasting [`Event`] values for systems and the
//! presentation layer to react to. The RPG tile map lives in [`tilemap`].

use pathing_core::{
    CellCoord, Command, DefinitionError, Event, GridDefinition, ToggleRejection,
};

pub mod tilemap;

/// Authoritative state of a single grid pathing session.
#[derive(Clone, Debug)]
pub struct World {
    definition: GridDefinition,
    cells: Vec<Cell>,
    blocks_remaining: u32,
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    traversable: bool,
    path_marked: bool,
    dirty: bool,
}

impl Cell {
    const fn open() -> Self {
        Self {
            traversable: true,
            path_marked: false,
            dirty: false,
        }
    }
}

impl World {
    /// Creates a world from a validated grid definition.
    pub fn new(definition: GridDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;

        let capacity_u64 = u64::from(definition.width()) * u64::from(definition.length());
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Ok(Self {
            cells: vec![Cell::open(); capacity],
            blocks_remaining: definition.placeable_blocks(),
            definition,
        })
    }

    /// Drains the cells whose visual state changed since the last call.
    ///
    /// The presentation layer consumes this once per frame to re-sync cell
    /// visuals; the core never reads the dirty flags itself.
    pub fn take_dirty_cells(&mut self) -> Vec<CellCoord> {
        let mut dirty = Vec::new();
        let length = self.definition.length();
        for (offset, cell) in self.cells.iter_mut().enumerate() {
            if cell.dirty {
                cell.dirty = false;
                let offset = u32::try_from(offset).unwrap_or(0);
                dirty.push(CellCoord::new(offset / length, offset % length));
            }
        }
        dirty
    }

    fn is_endpoint(&self, cell: CellCoord) -> bool {
        cell == self.definition.start() || cell == self.definition.end()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.definition.contains(cell) {
            let x = usize::try_from(cell.x()).ok()?;
            let y = usize::try_from(cell.y()).ok()?;
            let length = usize::try_from(self.definition.length()).ok()?;
            Some(x * length + y)
        } else {
            None
        }
    }

    fn toggle_cell(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.is_endpoint(cell) {
            out_events.push(Event::ToggleRejected {
                cell,
                reason: ToggleRejection::Endpoint,
            });
            return;
        }

        let Some(index) = self.index(cell) else {
            out_events.push(Event::ToggleRejected {
                cell,
                reason: ToggleRejection::OutOfBounds,
            });
            return;
        };

        let slot = &mut self.cells[index];
        if slot.traversable {
            if self.blocks_remaining == 0 {
                out_events.push(Event::ToggleRejected {
                    cell,
                    reason: ToggleRejection::BudgetExhausted,
                });
                return;
            }
            slot.traversable = false;
            slot.path_marked = false;
            slot.dirty = true;
            self.blocks_remaining -= 1;
        } else {
            slot.traversable = true;
            slot.path_marked = false;
            slot.dirty = true;
            self.blocks_remaining = self
                .blocks_remaining
                .saturating_add(1)
                .min(self.definition.placeable_blocks());
        }

        out_events.push(Event::CellToggled {
            cell,
            blocked: !self.cells[index].traversable,
            blocks_remaining: self.blocks_remaining,
        });
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        for cell in &mut self.cells {
            cell.traversable = true;
            cell.path_marked = false;
            cell.dirty = true;
        }
        self.blocks_remaining = self.definition.placeable_blocks();
        out_events.push(Event::GridReset);
    }

    fn mark_path_cell(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        // Start and end keep their own colours; marks on them are dropped.
        if self.is_endpoint(cell) {
            return;
        }

        let Some(index) = self.index(cell) else {
            log::warn!("unable to find cell ({}, {})", cell.x(), cell.y());
            return;
        };

        let slot = &mut self.cells[index];
        if !slot.path_marked {
            slot.path_marked = true;
            slot.dirty = true;
            out_events.push(Event::PathCellMarked { cell });
        }
    }

    fn clear_path_marks(&mut self, out_events: &mut Vec<Event>) {
        for cell in &mut self.cells {
            if cell.path_marked {
                cell.path_marked = false;
                cell.dirty = true;
            }
        }
        out_events.push(Event::PathMarksCleared);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ToggleCell { cell } => world.toggle_cell(cell, out_events),
        Command::ResetGrid => world.reset(out_events),
        Command::MarkPathCell { cell } => world.mark_path_cell(cell, out_events),
        Command::ClearPathMarks => world.clear_path_marks(out_events),
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use pathing_core::{CellCoord, GridDefinition, GridTarget, TraversalMap};

    /// Provides read-only access to the definition the world was built from.
    #[must_use]
    pub fn definition(world: &World) -> &GridDefinition {
        &world.definition
    }

    /// Blocks left in the player's budget.
    #[must_use]
    pub fn blocks_remaining(world: &World) -> u32 {
        world.blocks_remaining
    }

    /// Initial placeable-block budget.
    #[must_use]
    pub fn block_count(world: &World) -> u32 {
        world.definition.placeable_blocks()
    }

    /// Targets the player is rewarded for routing through.
    #[must_use]
    pub fn targets(world: &World) -> &[GridTarget] {
        world.definition.targets()
    }

    /// Exports the traversability field consumed by the path planner.
    ///
    /// Start and end are always traversable regardless of cell state.
    #[must_use]
    pub fn traversal_map(world: &World) -> TraversalMap {
        let definition = &world.definition;
        let mut map = TraversalMap::new(definition.width(), definition.length());

        for x in 0..definition.width() {
            for y in 0..definition.length() {
                let cell = CellCoord::new(x, y);
                let Some(flags) = cell_flags(world, cell) else {
                    continue;
                };
                map.set(cell, flags.traversable);
            }
        }

        map.set(definition.start(), true);
        map.set(definition.end(), true);
        map
    }

    /// Visual flags captured for a single cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CellFlags {
        /// Whether the cell may currently be traversed.
        pub traversable: bool,
        /// Whether the cell is marked as lying on the animated path.
        pub path_marked: bool,
    }

    /// Retrieves the visual flags of a single cell.
    ///
    /// A missing lookup logs a warning and yields `None` so rendering sync
    /// stays best-effort rather than fatal.
    #[must_use]
    pub fn cell_flags(world: &World, cell: CellCoord) -> Option<CellFlags> {
        let Some(index) = world.index(cell) else {
            log::warn!("unable to find cell ({}, {})", cell.x(), cell.y());
            return None;
        };

        world.cells.get(index).map(|slot| CellFlags {
            traversable: slot.traversable,
            path_marked: slot.path_marked,
        })
    }

    /// Enumerates the cells currently marked as on-path, in grid order.
    #[must_use]
    pub fn path_marked_cells(world: &World) -> Vec<CellCoord> {
        let definition = &world.definition;
        let mut marked = Vec::new();
        for x in 0..definition.width() {
            for y in 0..definition.length() {
                let cell = CellCoord::new(x, y);
                if cell_flags(world, cell).is_some_and(|flags| flags.path_marked) {
                    marked.push(cell);
                }
            }
        }
        marked
    }
}
