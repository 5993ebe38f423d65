#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that drives one active grid pathing game.
//!
//! The controller owns the authoritative world, the traversal animator, and
//! the [`SessionState`] shared with the presentation layer. An external
//! render loop calls [`SessionController::update`] once per frame with a
//! monotonically increasing timestamp; the controller processes the
//! edge-triggered `play`/`reset` intents, advances the animation, publishes
//! scores, and clears both intents unconditionally at the end of every tick.

use std::collections::BTreeMap;
use std::time::Duration;

use pathing_core::{
    CellCoord, Command, DefinitionError, Event, GridDefinition, GridTarget, PathScore,
    SessionState,
};
use pathing_system_planner::compute_path;
use pathing_system_scoring::score_path;
use pathing_system_traversal::PathAnimator;
use pathing_world::{apply, query, World};
use thiserror::Error;

/// Input snapshot distilled from adapter-provided frame input data.
///
/// The adapter resolves the pointer against the rendered grid and hands the
/// controller nothing but the cell that was clicked this frame, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionInput {
    /// Cell under the pointer when the primary button was newly pressed.
    pub toggle_cell: Option<CellCoord>,
}

/// Converts monotonically increasing timestamps into per-frame durations.
///
/// The first observed frame yields an elapsed time of exactly zero so an
/// arbitrary timestamp origin never produces a nonsensical initial delta.
/// Negative deltas clamp to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    /// Creates a clock with no observed frames.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Records a frame timestamp (in seconds) and returns the elapsed time.
    pub fn advance(&mut self, now_seconds: f64) -> Duration {
        let elapsed = match self.last {
            Some(last) => (now_seconds - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(now_seconds);
        Duration::from_secs_f64(elapsed)
    }

    /// Forgets the last observed frame.
    pub fn restart(&mut self) {
        self.last = None;
    }
}

/// Reasons a level lookup may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// No level with the provided identifier exists in the catalog.
    #[error("unknown level {0}")]
    UnknownLevel(u32),
}

/// Built-in grid definitions, keyed by level identifier.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    definitions: BTreeMap<u32, GridDefinition>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::built_in()
    }
}

impl LevelCatalog {
    /// Catalog holding the two stock levels.
    #[must_use]
    pub fn built_in() -> Self {
        let mut definitions = BTreeMap::new();
        let _ = definitions.insert(
            1,
            GridDefinition::new(
                8,
                8,
                CellCoord::new(0, 0),
                CellCoord::new(7, 7),
                12,
                vec![GridTarget::new(CellCoord::new(0, 7), 5)],
            ),
        );
        let _ = definitions.insert(
            2,
            GridDefinition::new(
                8,
                8,
                CellCoord::new(3, 2),
                CellCoord::new(3, 5),
                12,
                vec![GridTarget::new(CellCoord::new(3, 1), 5)],
            ),
        );
        Self { definitions }
    }

    /// Looks up a level definition by identifier.
    pub fn definition(&self, id: u32) -> Result<&GridDefinition, LevelError> {
        self.definitions.get(&id).ok_or(LevelError::UnknownLevel(id))
    }

    /// Identifiers of the available levels, in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        self.definitions.keys().copied().collect()
    }
}

#[derive(Debug)]
struct ActiveSession {
    world: World,
    animator: PathAnimator,
}

/// Owns one active grid game and the session state the UI reads and writes.
#[derive(Debug, Default)]
pub struct SessionController {
    session: Option<ActiveSession>,
    state: SessionState,
    clock: FrameClock,
    last_score: Option<PathScore>,
}

impl SessionController {
    /// Creates a controller with no loaded level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session state shared with the presentation layer.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Full scoring result of the most recent completed traversal.
    #[must_use]
    pub fn last_score(&self) -> Option<&PathScore> {
        self.last_score.as_ref()
    }

    /// Raises the one-shot play intent, as the UI does.
    pub fn request_play(&mut self) {
        self.state.play = true;
    }

    /// Raises the one-shot reset intent, as the UI does.
    pub fn request_reset(&mut self) {
        self.state.reset = true;
    }

    /// Read-only access to the active world, if a level is loaded.
    #[must_use]
    pub fn world(&self) -> Option<&World> {
        self.session.as_ref().map(|session| &session.world)
    }

    /// Drains the cells whose visual state changed since the last call.
    pub fn take_dirty_cells(&mut self) -> Vec<CellCoord> {
        self.session
            .as_mut()
            .map(|session| session.world.take_dirty_cells())
            .unwrap_or_default()
    }

    /// Replaces the active session with a fresh one built from `definition`.
    ///
    /// All session state is reset; the clock restarts so the first frame of
    /// the new session ticks with zero elapsed time.
    pub fn load_level(&mut self, definition: GridDefinition) -> Result<(), DefinitionError> {
        let world = World::new(definition)?;
        self.state = SessionState {
            blocks: query::blocks_remaining(&world),
            total_blocks: query::block_count(&world),
            target_count: u32::try_from(query::targets(&world).len()).unwrap_or(u32::MAX),
            ..SessionState::empty()
        };
        self.session = Some(ActiveSession {
            world,
            animator: PathAnimator::new(),
        });
        self.clock.restart();
        self.last_score = None;
        Ok(())
    }

    /// Per-frame update driven by the external render loop.
    ///
    /// Returns the events the world broadcast this frame so the presentation
    /// layer can sync visuals. With no loaded level the call is a safe no-op
    /// that still clears the intents.
    pub fn update(&mut self, now_seconds: f64, input: SessionInput) -> Vec<Event> {
        let elapsed = self.clock.advance(now_seconds);
        let mut events = Vec::new();

        let Some(session) = self.session.as_mut() else {
            self.state.play = false;
            self.state.reset = false;
            return events;
        };

        if let Some(cell) = input.toggle_cell {
            apply(&mut session.world, Command::ToggleCell { cell }, &mut events);
        }

        if self.state.play {
            apply(&mut session.world, Command::ClearPathMarks, &mut events);

            let map = query::traversal_map(&session.world);
            let definition = query::definition(&session.world);
            let path = compute_path(&map, definition.start(), definition.end());
            log::debug!("planned traversal of {} nodes", path.len());
            session.animator.start(path);
        }

        if self.state.reset {
            apply(&mut session.world, Command::ResetGrid, &mut events);
            session.animator.cancel();
            self.state.score = 0;
            self.state.hit_target_count = 0;
            self.last_score = None;
        }

        apply(&mut session.world, Command::Tick { dt: elapsed }, &mut events);

        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if ticked {
            let mut commands = Vec::new();
            let completed = session.animator.tick(elapsed, &mut commands);
            for command in commands {
                apply(&mut session.world, command, &mut events);
            }

            if completed {
                let score = score_path(
                    session.animator.path(),
                    query::targets(&session.world),
                    query::blocks_remaining(&session.world),
                    query::block_count(&session.world),
                );
                self.state.score = score.score;
                self.state.hit_target_count = score.hit_target_count;
                self.last_score = Some(score);
            }
        }

        self.state.blocks = query::blocks_remaining(&session.world);
        self.state.total_blocks = query::block_count(&session.world);
        self.state.target_count =
            u32::try_from(query::targets(&session.world).len()).unwrap_or(u32::MAX);

        // Intents are one-shot: cleared every tick whether or not they ran.
        self.state.play = false;
        self.state.reset = false;

        events
    }
}
