use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use crate::tile::{Axis, DiagDirection, MapSize, TileIndex};

/// Identity of the station owning a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub u16);

/// Which kind of road vehicle a stop serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoadStopType {
    Bus,
    Truck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopLayout {
    /// Terminus stop entered from one side only.
    Bay(DiagDirection),
    /// Stop built on a straight road along `Axis`; vehicles pass through.
    DriveThrough(Axis),
}

impl StopLayout {
    pub fn is_drive_through(self) -> bool {
        matches!(self, StopLayout::DriveThrough(_))
    }

    pub fn axis(self) -> Axis {
        match self {
            StopLayout::Bay(dir) => dir.axis(),
            StopLayout::DriveThrough(axis) => axis,
        }
    }
}

/// Station metadata stored on a road-stop tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationTile {
    pub station: StationId,
    pub stop_type: RoadStopType,
    pub layout: StopLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileContent {
    #[default]
    Ground,
    Road,
    Station(StationTile),
}

/// Read access to per-tile station metadata plus the tile-clearing command.
///
/// The platform code only ever talks to the map through this trait, so the
/// answers must reflect the live tile state at the moment of the call.
pub trait StationTiles {
    fn map_size(&self) -> MapSize;

    /// Station metadata of `tile`, or `None` when it is not a station tile or
    /// lies outside the map.
    fn station_tile(&self, tile: TileIndex) -> Option<StationTile>;

    /// Remove whatever is built on `tile`, leaving bare ground.
    fn clear_square(&mut self, tile: TileIndex);

    fn is_station_tile(&self, tile: TileIndex) -> bool {
        self.station_tile(tile).is_some()
    }

    fn station_index(&self, tile: TileIndex) -> Option<StationId> {
        self.station_tile(tile).map(|s| s.station)
    }

    fn road_stop_type(&self, tile: TileIndex) -> Option<RoadStopType> {
        self.station_tile(tile).map(|s| s.stop_type)
    }

    fn is_drive_through_stop_tile(&self, tile: TileIndex) -> bool {
        self.station_tile(tile)
            .is_some_and(|s| s.layout.is_drive_through())
    }

    /// Axis of a drive-through stop; `None` for any other tile.
    fn road_stop_axis(&self, tile: TileIndex) -> Option<Axis> {
        self.station_tile(tile)
            .filter(|s| s.layout.is_drive_through())
            .map(|s| s.layout.axis())
    }
}

/// Tile grid resource holding what is built on each tile.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct StationMap {
    pub tiles: Vec<TileContent>,
    pub size: MapSize,
}

impl Default for StationMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT)
    }
}

impl StationMap {
    pub fn new(width: u32, height: u32) -> Self {
        let size = MapSize::new(width, height);
        Self {
            tiles: vec![TileContent::Ground; size.tile_count()],
            size,
        }
    }

    #[inline]
    pub fn get(&self, tile: TileIndex) -> &TileContent {
        &self.tiles[tile.0 as usize]
    }

    #[inline]
    pub fn set(&mut self, tile: TileIndex, content: TileContent) {
        self.tiles[tile.0 as usize] = content;
    }

    /// A station may be placed on any on-map tile that is not already part of
    /// a station.
    pub fn can_build_station(&self, tile: TileIndex) -> bool {
        self.size.contains(tile) && !matches!(self.get(tile), TileContent::Station(_))
    }
}

impl StationTiles for StationMap {
    fn map_size(&self) -> MapSize {
        self.size
    }

    fn station_tile(&self, tile: TileIndex) -> Option<StationTile> {
        if !self.size.contains(tile) {
            return None;
        }
        match self.get(tile) {
            TileContent::Station(station) => Some(*station),
            TileContent::Ground | TileContent::Road => None,
        }
    }

    fn clear_square(&mut self, tile: TileIndex) {
        self.set(tile, TileContent::Ground);
    }
}
