#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path traversal animation state machine.
//!
//! The animator walks a planned path one node at a time on a fixed interval.
//! Each tick it emits a [`Command::MarkPathCell`] for the node it currently
//! points at (the world drops marks on the endpoints), accumulates elapsed
//! time, and advances the cursor once the interval is exceeded. Starting a
//! new animation or cancelling replaces the state outright; there is no
//! queueing and no cooperative cancellation.

use std::time::Duration;

use pathing_core::{CellCoord, Command};

/// Interval between node advances.
const STEP_INTERVAL: Duration = Duration::from_millis(250);

/// Lifecycle of a traversal animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// No active path.
    Idle,
    /// Cursor still inside the path.
    Advancing,
    /// Cursor ran past the final node.
    Complete,
}

/// Advances a computed path node-by-node on a fixed interval.
#[derive(Clone, Debug)]
pub struct PathAnimator {
    path: Vec<CellCoord>,
    index: usize,
    timer: Duration,
    state: AnimatorState,
}

impl Default for PathAnimator {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            index: 0,
            timer: Duration::ZERO,
            state: AnimatorState::Idle,
        }
    }
}

impl PathAnimator {
    /// Creates an idle animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AnimatorState {
        self.state
    }

    /// Whether the cursor ran past the final node.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == AnimatorState::Complete
    }

    /// Path the animator is walking.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Begins animating the provided path, replacing any prior animation.
    pub fn start(&mut self, path: Vec<CellCoord>) {
        self.path = path;
        self.index = 0;
        self.timer = Duration::ZERO;
        self.state = AnimatorState::Advancing;
    }

    /// Discards the current animation outright.
    pub fn cancel(&mut self) {
        self.path.clear();
        self.index = 0;
        self.timer = Duration::ZERO;
        self.state = AnimatorState::Idle;
    }

    /// Advances the animation by the provided elapsed time.
    ///
    /// The currently-pointed node is marked every tick regardless of whether
    /// the cursor advances; advancement itself is gated by the interval
    /// timer. Returns `true` on the tick that reaches completion.
    pub fn tick(&mut self, elapsed: Duration, out: &mut Vec<Command>) -> bool {
        if self.state != AnimatorState::Advancing {
            return false;
        }

        if self.index >= self.path.len() {
            self.state = AnimatorState::Complete;
            return true;
        }

        out.push(Command::MarkPathCell {
            cell: self.path[self.index],
        });

        self.timer = self.timer.saturating_add(elapsed);
        if self.timer < STEP_INTERVAL {
            return false;
        }

        self.timer = Duration::ZERO;
        self.index += 1;
        if self.index >= self.path.len() {
            self.state = AnimatorState::Complete;
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_node_path() -> Vec<CellCoord> {
        vec![
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ]
    }

    fn marked_cells(commands: &[Command]) -> Vec<CellCoord> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::MarkPathCell { cell } => Some(*cell),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn three_interval_ticks_complete_a_three_node_path() {
        let mut animator = PathAnimator::new();
        let mut commands = Vec::new();
        animator.start(three_node_path());

        assert!(!animator.tick(Duration::from_millis(250), &mut commands));
        assert!(!animator.tick(Duration::from_millis(250), &mut commands));
        assert!(animator.tick(Duration::from_millis(250), &mut commands));

        assert_eq!(animator.state(), AnimatorState::Complete);
        assert_eq!(marked_cells(&commands), three_node_path());
    }

    #[test]
    fn sub_interval_ticks_mark_without_advancing() {
        let mut animator = PathAnimator::new();
        let mut commands = Vec::new();
        animator.start(three_node_path());

        assert!(!animator.tick(Duration::from_millis(100), &mut commands));
        assert!(!animator.tick(Duration::from_millis(100), &mut commands));

        // Same node marked both ticks; no advancement yet.
        assert_eq!(
            marked_cells(&commands),
            vec![CellCoord::new(1, 0), CellCoord::new(1, 0)]
        );
        assert_eq!(animator.state(), AnimatorState::Advancing);

        // The third tick crosses the interval and advances.
        assert!(!animator.tick(Duration::from_millis(100), &mut commands));
        assert_eq!(marked_cells(&commands).last(), Some(&CellCoord::new(1, 0)));

        let mut next = Vec::new();
        assert!(!animator.tick(Duration::from_millis(10), &mut next));
        assert_eq!(marked_cells(&next), vec![CellCoord::new(2, 0)]);
    }

    #[test]
    fn ticking_while_idle_or_complete_is_a_no_op() {
        let mut animator = PathAnimator::new();
        let mut commands = Vec::new();

        assert!(!animator.tick(Duration::from_secs(1), &mut commands));
        assert!(commands.is_empty());

        animator.start(vec![CellCoord::new(0, 0)]);
        assert!(animator.tick(Duration::from_millis(250), &mut commands));
        assert!(animator.is_complete());

        commands.clear();
        assert!(!animator.tick(Duration::from_secs(1), &mut commands));
        assert!(commands.is_empty());
    }

    #[test]
    fn start_replaces_a_running_animation() {
        let mut animator = PathAnimator::new();
        let mut commands = Vec::new();
        animator.start(three_node_path());
        let _ = animator.tick(Duration::from_millis(250), &mut commands);

        animator.start(vec![CellCoord::new(9, 9)]);
        assert_eq!(animator.state(), AnimatorState::Advancing);

        commands.clear();
        let _ = animator.tick(Duration::from_millis(1), &mut commands);
        assert_eq!(marked_cells(&commands), vec![CellCoord::new(9, 9)]);
    }

    #[test]
    fn cancel_forces_idle() {
        let mut animator = PathAnimator::new();
        animator.start(three_node_path());
        animator.cancel();
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert!(animator.path().is_empty());
    }

    #[test]
    fn empty_path_completes_on_first_tick() {
        let mut animator = PathAnimator::new();
        let mut commands = Vec::new();
        animator.start(Vec::new());

        assert!(animator.tick(Duration::from_millis(1), &mut commands));
        assert!(animator.is_complete());
        assert!(commands.is_empty());
    }
}
