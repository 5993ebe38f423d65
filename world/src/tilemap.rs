//! Tile-map world used by the RPG prototype.
//!
//! A tile map carries a walkability grid, named points of interest, and the
//! metric conversion between tile indices and world-space positions. Mobs
//! plan over the walkability grid through the same [`TraversalMap`] boundary
//! the grid game uses.

use glam::Vec3;
use pathing_core::{CellCoord, TraversalMap};
use serde::Deserialize;
use thiserror::Error;

/// Named tile a game script can place agents at.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PointOfInterest {
    /// Identifier used by scripts, e.g. `"playerSpawn"`.
    pub name: String,
    /// Tile column of the point.
    pub x: u32,
    /// Tile row of the point.
    pub y: u32,
}

/// Raw tile-map description deserialized from a level JSON file.
///
/// Rendering-only keys present in the level files (texture atlas layout,
/// draw layers) are ignored here; the core only consumes walkability, points
/// of interest, and the tile metric.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMapDefinition {
    /// Row-major walkability grid; `walk[y][x]` is 1 when traversable.
    pub walk: Vec<Vec<u8>>,
    /// Named tiles agents can be placed at.
    #[serde(default)]
    pub poi: Vec<PointOfInterest>,
    /// Edge length of a tile in world units.
    pub tile_vert_size: f32,
    /// Gap between adjacent tiles in world units.
    #[serde(default)]
    pub tile_vert_gap: f32,
}

/// Reasons a tile-map definition cannot be loaded.
#[derive(Debug, Error)]
pub enum TileMapError {
    /// The JSON payload could not be parsed.
    #[error("malformed tile map: {0}")]
    Parse(#[from] serde_json::Error),
    /// The walkability grid has no rows or no columns.
    #[error("tile map has an empty walk grid")]
    EmptyWalkGrid,
    /// A walkability row differs in length from the first row.
    #[error("walk grid row {row} has inconsistent width")]
    RaggedWalkGrid {
        /// Zero-based index of the offending row.
        row: usize,
    },
}

/// Walkable tile world the RPG agents move through.
#[derive(Clone, Debug)]
pub struct TileMap {
    definition: TileMapDefinition,
    width: u32,
    height: u32,
}

impl TileMap {
    /// Builds a tile map from an already-deserialized definition.
    pub fn new(definition: TileMapDefinition) -> Result<Self, TileMapError> {
        let height = definition.walk.len();
        let width = definition.walk.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(TileMapError::EmptyWalkGrid);
        }

        for (row, cells) in definition.walk.iter().enumerate() {
            if cells.len() != width {
                return Err(TileMapError::RaggedWalkGrid { row });
            }
        }

        Ok(Self {
            definition,
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        })
    }

    /// Parses a tile map from its JSON level file.
    pub fn from_json(payload: &str) -> Result<Self, TileMapError> {
        let definition: TileMapDefinition = serde_json::from_str(payload)?;
        Self::new(definition)
    }

    /// Width of the walkability grid in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the walkability grid in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.definition.tile_vert_size
    }

    fn stride(&self) -> f32 {
        self.definition.tile_vert_size + self.definition.tile_vert_gap
    }

    /// World-space position of a tile's anchor.
    ///
    /// Rows grow downward in world space, matching the level files.
    #[must_use]
    pub fn tile_to_world(&self, tile: CellCoord) -> Vec3 {
        let stride = self.stride();
        Vec3::new(tile.x() as f32 * stride, -(tile.y() as f32) * stride, 0.0)
    }

    /// Tile containing the provided world-space position, clamped to the
    /// walkability bounds.
    #[must_use]
    pub fn world_to_tile(&self, position: Vec3) -> CellCoord {
        let size = self.definition.tile_vert_size;
        let x = (position.x / size).floor();
        let y = -(position.y / size).floor();

        let max_x = (self.width.saturating_sub(1)) as f32;
        let max_y = (self.height.saturating_sub(1)) as f32;
        CellCoord::new(x.clamp(0.0, max_x) as u32, y.clamp(0.0, max_y) as u32)
    }

    /// Looks up a point of interest by name.
    #[must_use]
    pub fn poi(&self, name: &str) -> Option<CellCoord> {
        self.definition
            .poi
            .iter()
            .find(|poi| poi.name == name)
            .map(|poi| CellCoord::new(poi.x, poi.y))
    }

    /// World-space position of a named point of interest.
    #[must_use]
    pub fn poi_world_position(&self, name: &str) -> Option<Vec3> {
        self.poi(name).map(|tile| self.tile_to_world(tile))
    }

    /// Reports whether the provided tile is walkable.
    #[must_use]
    pub fn is_walkable(&self, tile: CellCoord) -> bool {
        let Some(row) = self.definition.walk.get(tile.y() as usize) else {
            return false;
        };
        row.get(tile.x() as usize).copied().unwrap_or(0) != 0
    }

    /// Exports the walkability grid as the planner's traversal map.
    #[must_use]
    pub fn traversal_map(&self) -> TraversalMap {
        let mut map = TraversalMap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = CellCoord::new(x, y);
                map.set(cell, self.is_walkable(cell));
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOWN_SAMPLE: &str = r#"{
        "texture": "town",
        "tileVertSize": 0.1,
        "tileVertGap": 0.0,
        "walk": [
            [1, 1, 1, 0],
            [1, 0, 1, 1],
            [1, 1, 1, 1]
        ],
        "poi": [
            { "name": "playerSpawn", "x": 0, "y": 2 },
            { "name": "mobDen", "x": 3, "y": 2 }
        ]
    }"#;

    #[test]
    fn parses_level_json_and_ignores_render_keys() {
        let map = TileMap::from_json(TOWN_SAMPLE).expect("sample parses");
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        assert_eq!(map.poi("playerSpawn"), Some(CellCoord::new(0, 2)));
        assert_eq!(map.poi("missing"), None);
    }

    #[test]
    fn rejects_ragged_walk_grid() {
        let definition = TileMapDefinition {
            walk: vec![vec![1, 1], vec![1]],
            poi: Vec::new(),
            tile_vert_size: 0.1,
            tile_vert_gap: 0.0,
        };
        assert!(matches!(
            TileMap::new(definition),
            Err(TileMapError::RaggedWalkGrid { row: 1 })
        ));
    }

    #[test]
    fn tile_world_round_trip() {
        let map = TileMap::from_json(TOWN_SAMPLE).expect("sample parses");
        let tile = CellCoord::new(2, 1);
        let world = map.tile_to_world(tile);
        assert_eq!(map.world_to_tile(world), tile);
    }

    #[test]
    fn world_to_tile_clamps_to_bounds() {
        let map = TileMap::from_json(TOWN_SAMPLE).expect("sample parses");
        let far = Vec3::new(100.0, -100.0, 0.0);
        assert_eq!(map.world_to_tile(far), CellCoord::new(3, 2));
        let behind = Vec3::new(-5.0, 5.0, 0.0);
        assert_eq!(map.world_to_tile(behind), CellCoord::new(0, 0));
    }

    #[test]
    fn traversal_map_mirrors_walk_grid() {
        let map = TileMap::from_json(TOWN_SAMPLE).expect("sample parses");
        let traversal = map.traversal_map();
        assert!(traversal.is_traversable(CellCoord::new(0, 0)));
        assert!(!traversal.is_traversable(CellCoord::new(3, 0)));
        assert!(!traversal.is_traversable(CellCoord::new(1, 1)));
    }
}
