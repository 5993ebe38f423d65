#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! RPG agents: key-driven player movement and mob pursuit over the tile map.
//!
//! Agents are composed rather than subclassed: every entity carries a
//! physics-synced [`SpriteBody`], and its [`Behavior`] decides the velocity
//! the body carries into the next physics step. The physics engine itself
//! sits behind the narrow [`Physics`] seam so behaviors stay testable without
//! a real simulation backend.

use glam::Vec3;
use pathing_core::CellCoord;
use pathing_system_planner::compute_path;
use pathing_world::tilemap::TileMap;

/// World-units-per-second speed shared by the stock agents.
pub const AGENT_SPEED: f32 = 0.65;

/// Handle to a body registered with a [`Physics`] backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

impl BodyId {
    /// Index of the body inside its backend.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Narrow seam in front of whichever physics engine backs the prototype.
pub trait Physics {
    /// Registers a kinematic body at the given world position.
    fn add_body(&mut self, position: Vec3) -> BodyId;

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Current world position of a body.
    fn body_position(&self, body: BodyId) -> Vec3;

    /// Sets the linear velocity the body carries into the next step.
    fn set_body_velocity(&mut self, body: BodyId, velocity: Vec3);
}

#[derive(Clone, Copy, Debug)]
struct KinematicBody {
    position: Vec3,
    velocity: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct Blocker {
    min: Vec3,
    max: Vec3,
}

impl Blocker {
    fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Zero-gravity velocity integrator with static blockers from a walk grid.
///
/// Stands in for the full physics engine in tests and the headless demo.
/// Bodies are treated as points; each axis of a step is applied independently
/// and dropped if it would land inside a blocked tile, so bodies slide along
/// walls instead of sticking to them.
#[derive(Clone, Debug, Default)]
pub struct KinematicPhysics {
    bodies: Vec<KinematicBody>,
    blockers: Vec<Blocker>,
}

impl KinematicPhysics {
    /// Creates a backend with no bodies and no blockers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose static blockers mirror the map's unwalkable
    /// tiles.
    #[must_use]
    pub fn with_map_blockers(map: &TileMap) -> Self {
        let half = map.tile_size() * 0.5;
        let mut blockers = Vec::new();
        for y in 0..map.height() {
            for x in 0..map.width() {
                let tile = CellCoord::new(x, y);
                if map.is_walkable(tile) {
                    continue;
                }
                let center = map.tile_to_world(tile);
                blockers.push(Blocker {
                    min: center - Vec3::new(half, half, 0.0),
                    max: center + Vec3::new(half, half, 0.0),
                });
            }
        }
        Self {
            bodies: Vec::new(),
            blockers,
        }
    }

    fn blocked(&self, point: Vec3) -> bool {
        self.blockers.iter().any(|blocker| blocker.contains(point))
    }
}

impl Physics for KinematicPhysics {
    fn add_body(&mut self, position: Vec3) -> BodyId {
        self.bodies.push(KinematicBody {
            position,
            velocity: Vec3::ZERO,
        });
        BodyId(self.bodies.len() - 1)
    }

    fn step(&mut self, dt: f32) {
        for index in 0..self.bodies.len() {
            let body = self.bodies[index];
            let delta = body.velocity * dt;

            let mut position = body.position;
            let along_x = position + Vec3::new(delta.x, 0.0, 0.0);
            if !self.blocked(along_x) {
                position = along_x;
            }
            let along_y = position + Vec3::new(0.0, delta.y, 0.0);
            if !self.blocked(along_y) {
                position = along_y;
            }

            self.bodies[index].position = position;
        }
    }

    fn body_position(&self, body: BodyId) -> Vec3 {
        match self.bodies.get(body.index()) {
            Some(body) => body.position,
            None => {
                log::warn!("position queried for unknown body {}", body.index());
                Vec3::ZERO
            }
        }
    }

    fn set_body_velocity(&mut self, body: BodyId, velocity: Vec3) {
        match self.bodies.get_mut(body.index()) {
            Some(body) => body.velocity = velocity,
            None => log::warn!("velocity set for unknown body {}", body.index()),
        }
    }
}

/// Movement keys sampled by the presentation layer each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    /// `W` is held.
    pub up: bool,
    /// `S` is held.
    pub down: bool,
    /// `A` is held.
    pub left: bool,
    /// `D` is held.
    pub right: bool,
}

/// Direct key-to-velocity movement for the player entity.
#[derive(Clone, Copy, Debug)]
pub struct PlayerBehavior {
    speed: f32,
}

impl PlayerBehavior {
    /// Creates a player mover at the stock speed.
    #[must_use]
    pub const fn new() -> Self {
        Self { speed: AGENT_SPEED }
    }

    /// Velocity for the current key state. Axes are independent, so held
    /// diagonals move faster than a single axis.
    #[must_use]
    pub fn velocity(&self, keys: MoveKeys) -> Vec3 {
        let mut velocity = Vec3::ZERO;
        if keys.up {
            velocity.y += self.speed;
        }
        if keys.down {
            velocity.y -= self.speed;
        }
        if keys.left {
            velocity.x -= self.speed;
        }
        if keys.right {
            velocity.x += self.speed;
        }
        velocity
    }
}

impl Default for PlayerBehavior {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggro-and-pursue movement for mob entities.
///
/// Outside the aggro radius the mob idles. Inside it, the mob plans a tile
/// path to the player over the map's traversal boundary and steers along the
/// waypoints, replanning whenever the player changes tile or the current path
/// runs out.
#[derive(Clone, Debug)]
pub struct MobBehavior {
    speed: f32,
    aggro_radius: f32,
    path: Vec<CellCoord>,
    waypoint: usize,
    goal_tile: Option<CellCoord>,
}

impl MobBehavior {
    /// Creates a mob that pursues the player within `aggro_radius` world
    /// units.
    #[must_use]
    pub const fn new(aggro_radius: f32) -> Self {
        Self {
            speed: AGENT_SPEED,
            aggro_radius,
            path: Vec::new(),
            waypoint: 0,
            goal_tile: None,
        }
    }

    /// Tile path the mob is currently following.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Velocity toward the next waypoint, or zero when idle.
    pub fn velocity(&mut self, position: Vec3, player_position: Vec3, map: &TileMap) -> Vec3 {
        if position.distance(player_position) > self.aggro_radius {
            self.path.clear();
            self.waypoint = 0;
            self.goal_tile = None;
            return Vec3::ZERO;
        }

        let player_tile = map.world_to_tile(player_position);
        if self.goal_tile != Some(player_tile) || self.waypoint >= self.path.len() {
            self.replan(position, player_tile, map);
        }

        let arrive = map.tile_size() * 0.1;
        while let Some(&next) = self.path.get(self.waypoint) {
            let target = map.tile_to_world(next);
            let to_target = Vec3::new(target.x - position.x, target.y - position.y, 0.0);
            if to_target.length() <= arrive {
                self.waypoint += 1;
                continue;
            }
            return to_target.normalize_or_zero() * self.speed;
        }

        Vec3::ZERO
    }

    fn replan(&mut self, position: Vec3, player_tile: CellCoord, map: &TileMap) {
        let own_tile = map.world_to_tile(position);
        self.path = compute_path(&map.traversal_map(), own_tile, player_tile);
        self.waypoint = 0;
        self.goal_tile = Some(player_tile);
    }
}

/// Physics-synced sprite component shared by every agent.
#[derive(Clone, Copy, Debug)]
pub struct SpriteBody {
    body: BodyId,
    position: Vec3,
}

impl SpriteBody {
    /// Registers a body with the backend and wraps its handle.
    pub fn spawn<P: Physics>(physics: &mut P, position: Vec3) -> Self {
        Self {
            body: physics.add_body(position),
            position,
        }
    }

    /// Backend handle of this sprite's body.
    #[must_use]
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// World position mirrored from the last sync.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Mirrors the body's position after a physics step.
    pub fn sync<P: Physics>(&mut self, physics: &P) {
        self.position = physics.body_position(self.body);
    }
}

/// Movement strategy selected per entity.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// Velocity follows the held movement keys.
    Player(PlayerBehavior),
    /// Velocity follows a planned tile path toward the player.
    Mob(MobBehavior),
}

/// An entity in the tile-map world: a synced sprite plus its behavior.
#[derive(Clone, Debug)]
pub struct Agent {
    sprite: SpriteBody,
    behavior: Behavior,
}

impl Agent {
    /// Spawns an agent at a world position with the given behavior.
    pub fn spawn<P: Physics>(physics: &mut P, position: Vec3, behavior: Behavior) -> Self {
        Self {
            sprite: SpriteBody::spawn(physics, position),
            behavior,
        }
    }

    /// World position from the last sync.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.sprite.position()
    }

    /// Tile path the agent is following, if it is a pursuing mob.
    #[must_use]
    pub fn mob_path(&self) -> Option<&[CellCoord]> {
        match &self.behavior {
            Behavior::Mob(mob) => Some(mob.path()),
            Behavior::Player(_) => None,
        }
    }

    /// Decides this frame's velocity and hands it to the physics backend.
    ///
    /// Call once per agent per frame, then advance the backend with
    /// [`Physics::step`] and mirror positions back with [`Agent::sync`].
    pub fn update<P: Physics>(
        &mut self,
        keys: MoveKeys,
        player_position: Vec3,
        map: &TileMap,
        physics: &mut P,
    ) {
        let velocity = match &mut self.behavior {
            Behavior::Player(player) => player.velocity(keys),
            Behavior::Mob(mob) => mob.velocity(self.sprite.position(), player_position, map),
        };
        physics.set_body_velocity(self.sprite.body(), velocity);
    }

    /// Mirrors the body position after the backend stepped.
    pub fn sync<P: Physics>(&mut self, physics: &P) {
        self.sprite.sync(physics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOWN_SAMPLE: &str = r#"{
        "tileVertSize": 0.1,
        "walk": [
            [1, 1, 1, 1],
            [1, 0, 0, 1],
            [1, 1, 1, 1]
        ],
        "poi": [
            { "name": "playerSpawn", "x": 0, "y": 2 },
            { "name": "mobDen", "x": 3, "y": 2 }
        ]
    }"#;

    fn town() -> TileMap {
        TileMap::from_json(TOWN_SAMPLE).expect("sample parses")
    }

    #[test]
    fn player_velocity_follows_keys() {
        let player = PlayerBehavior::new();
        let forward = player.velocity(MoveKeys {
            up: true,
            ..MoveKeys::default()
        });
        assert_eq!(forward, Vec3::new(0.0, AGENT_SPEED, 0.0));

        let diagonal = player.velocity(MoveKeys {
            up: true,
            right: true,
            ..MoveKeys::default()
        });
        assert_eq!(diagonal, Vec3::new(AGENT_SPEED, AGENT_SPEED, 0.0));

        let opposed = player.velocity(MoveKeys {
            left: true,
            right: true,
            ..MoveKeys::default()
        });
        assert_eq!(opposed, Vec3::ZERO);
    }

    #[test]
    fn kinematic_step_integrates_velocity() {
        let mut physics = KinematicPhysics::new();
        let body = physics.add_body(Vec3::ZERO);
        physics.set_body_velocity(body, Vec3::new(1.0, -2.0, 0.0));
        physics.step(0.5);
        assert_eq!(physics.body_position(body), Vec3::new(0.5, -1.0, 0.0));
    }

    #[test]
    fn kinematic_step_slides_along_blockers() {
        let map = town();
        let mut physics = KinematicPhysics::with_map_blockers(&map);
        // Start just left of the blocked tile (1, 1), pushing into it.
        let start = map.tile_to_world(CellCoord::new(0, 1));
        let body = physics.add_body(start);
        physics.set_body_velocity(body, Vec3::new(1.0, 0.2, 0.0));
        physics.step(0.1);

        let position = physics.body_position(body);
        assert_eq!(position.x, start.x, "x advance into the wall is dropped");
        assert!(position.y > start.y, "free axis still moves");
    }

    #[test]
    fn unknown_body_lookups_are_harmless() {
        let mut physics = KinematicPhysics::new();
        let ghost = BodyId(7);
        physics.set_body_velocity(ghost, Vec3::ONE);
        assert_eq!(physics.body_position(ghost), Vec3::ZERO);
    }

    #[test]
    fn mob_idles_outside_aggro_radius() {
        let map = town();
        let mut mob = MobBehavior::new(0.2);
        let den = map.poi_world_position("mobDen").expect("den exists");
        let player = map.poi_world_position("playerSpawn").expect("spawn exists");

        assert_eq!(mob.velocity(den, player, &map), Vec3::ZERO);
        assert!(mob.path().is_empty());
    }

    #[test]
    fn mob_pursues_player_inside_aggro_radius() {
        let map = town();
        let mut mob = MobBehavior::new(1.0);
        let den = map.poi_world_position("mobDen").expect("den exists");
        let player = map.poi_world_position("playerSpawn").expect("spawn exists");

        let velocity = mob.velocity(den, player, &map);
        assert!(!mob.path().is_empty(), "aggro acquires a path");
        assert!((velocity.length() - AGENT_SPEED).abs() < 1e-5);
        // The den sits at (3, 2); the only approach is along row 2.
        assert!(velocity.x < 0.0);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn mob_replans_when_player_changes_tile() {
        let map = town();
        let mut mob = MobBehavior::new(10.0);
        let den = map.poi_world_position("mobDen").expect("den exists");

        let _ = mob.velocity(den, map.tile_to_world(CellCoord::new(0, 2)), &map);
        let toward_spawn = mob.path().to_vec();
        let _ = mob.velocity(den, map.tile_to_world(CellCoord::new(0, 0)), &map);
        assert_ne!(mob.path(), toward_spawn.as_slice());
        assert_eq!(mob.path().last(), Some(&CellCoord::new(0, 0)));
    }

    #[test]
    fn agent_update_feeds_velocity_into_physics() {
        let map = town();
        let mut physics = KinematicPhysics::with_map_blockers(&map);
        let spawn = map.poi_world_position("playerSpawn").expect("spawn exists");
        let mut agent = Agent::spawn(
            &mut physics,
            spawn,
            Behavior::Player(PlayerBehavior::new()),
        );

        agent.update(
            MoveKeys {
                right: true,
                ..MoveKeys::default()
            },
            spawn,
            &map,
            &mut physics,
        );
        physics.step(0.1);
        agent.sync(&physics);

        assert!(agent.position().x > spawn.x);
        assert_eq!(agent.position().y, spawn.y);
    }
}
