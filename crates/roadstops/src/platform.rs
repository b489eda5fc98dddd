//! Platform aggregates: the length and queue occupancy shared by every tile of
//! one contiguous drive-through run.
//!
//! Aggregates live in a `PlatformArena`. Road stops only hold a `PlatformId`;
//! the arena entry is discarded explicitly by the merge/split code, never as a
//! side effect of a road stop going away.

use std::collections::{BTreeMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::TILE_SIZE;
use crate::road_stop::classifier::{is_drive_through_continuation, next_in_run};
use crate::station_map::StationTiles;
use crate::tile::{Axis, DiagDirection, Direction, TileIndex};
use crate::vehicles::TileOccupants;

/// Handle of a platform aggregate inside the `PlatformArena`. Ids are never
/// reused, so two live runs can be told apart by comparing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// One of the two directions vehicles can face while queued on a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformSide {
    East,
    West,
}

impl PlatformSide {
    /// The facing counted as `East` on a run along `axis`.
    pub fn east_direction(axis: Axis) -> Direction {
        match axis {
            Axis::X => DiagDirection::NE.to_direction(),
            Axis::Y => DiagDirection::SE.to_direction(),
        }
    }

    /// Which side a vehicle facing `direction` queues on, or `None` when it is
    /// not aligned with `axis` at all.
    pub fn for_direction(axis: Axis, direction: Direction) -> Option<Self> {
        let east = Self::east_direction(axis);
        if direction == east {
            Some(PlatformSide::East)
        } else if direction == east.reverse() {
            Some(PlatformSide::West)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Total run length: `TILE_SIZE` per member tile.
    pub length: u32,
    /// Summed length of the vehicles queued facing east.
    pub occupied_east: u32,
    /// Summed length of the vehicles queued facing west.
    pub occupied_west: u32,
}

impl Platform {
    pub fn occupied(&self, side: PlatformSide) -> u32 {
        match side {
            PlatformSide::East => self.occupied_east,
            PlatformSide::West => self.occupied_west,
        }
    }

    fn occupied_mut(&mut self, side: PlatformSide) -> &mut u32 {
        match side {
            PlatformSide::East => &mut self.occupied_east,
            PlatformSide::West => &mut self.occupied_west,
        }
    }

    /// Room left for another vehicle facing `side`.
    pub fn free_length(&self, side: PlatformSide) -> u32 {
        self.length.saturating_sub(self.occupied(side))
    }

    pub fn occupy(&mut self, side: PlatformSide, length: u32) {
        *self.occupied_mut(side) += length;
    }

    pub fn release(&mut self, side: PlatformSide, length: u32) {
        let occupied = self.occupied_mut(side);
        if *occupied < length {
            warn!(
                "Platform: releasing {} units from {:?} side holding only {}",
                length, side, *occupied
            );
        }
        *occupied = occupied.saturating_sub(length);
    }

    pub(crate) fn grow_by_tiles(&mut self, tiles: u32) {
        self.length += tiles * TILE_SIZE;
    }

    pub(crate) fn shrink_by_tile(&mut self) {
        assert!(
            self.length >= TILE_SIZE,
            "platform length {} cannot lose another tile",
            self.length
        );
        self.length -= TILE_SIZE;
    }

    /// Recount a platform from scratch, starting at the northernmost tile of
    /// its run and walking south.
    ///
    /// Every primary, non-crashed road vehicle inside the stop is counted once
    /// even when it covers several tiles of the run. This is the expensive
    /// path; it is used after splitting a run and for integrity checks.
    pub fn rebuild<M, V>(map: &M, vehicles: &V, tile: TileIndex) -> Self
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let Some(axis) = map.road_stop_axis(tile) else {
            return Self::default();
        };
        let south = axis.south_dir();

        let mut platform = Self::default();
        let mut seen = HashSet::new();
        let mut tiles = 0;
        let mut cursor = Some(tile).filter(|&t| is_drive_through_continuation(map, tile, t));
        while let Some(t) = cursor {
            tiles += 1;
            for vehicle in vehicles.occupants(t) {
                if !vehicle.occupies_road_stop() {
                    continue;
                }
                let Some(side) = PlatformSide::for_direction(axis, vehicle.direction) else {
                    panic!(
                        "vehicle {:?} on platform tile {:?} faces {:?}, across the {:?} axis",
                        vehicle.id, t, vehicle.direction, axis
                    );
                };
                if seen.insert(vehicle.id) {
                    platform.occupy(side, vehicle.cached_total_length);
                }
            }
            cursor = next_in_run(map, tile, t, south);
        }
        platform.length = tiles * TILE_SIZE;
        platform
    }
}

/// Owner of every live platform aggregate.
#[derive(Debug, Default)]
pub struct PlatformArena {
    platforms: BTreeMap<PlatformId, Platform>,
    next_id: u32,
}

impl PlatformArena {
    pub fn insert(&mut self, platform: Platform) -> PlatformId {
        let id = PlatformId(self.next_id);
        self.next_id += 1;
        self.platforms.insert(id, platform);
        id
    }

    /// Destroy an aggregate, returning its last values. Discarding an id that
    /// is not live means two owners believed they held the same run.
    pub fn discard(&mut self, id: PlatformId) -> Platform {
        match self.platforms.remove(&id) {
            Some(platform) => platform,
            None => panic!("platform {:?} discarded twice", id),
        }
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(&id)
    }

    pub(crate) fn live(&self, id: PlatformId) -> &Platform {
        match self.platforms.get(&id) {
            Some(platform) => platform,
            None => panic!("road stop references dead platform {:?}", id),
        }
    }

    pub(crate) fn live_mut(&mut self, id: PlatformId) -> &mut Platform {
        match self.platforms.get_mut(&id) {
            Some(platform) => platform,
            None => panic!("road stop references dead platform {:?}", id),
        }
    }

    pub fn contains(&self, id: PlatformId) -> bool {
        self.platforms.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlatformId, &Platform)> {
        self.platforms.iter().map(|(id, p)| (*id, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station_map::{RoadStopType, StationId, StationMap, StationTile, StopLayout, TileContent};
    use crate::vehicles::{RoadVehicleState, Vehicle, VehicleRegistry};

    fn run_along_y(map: &mut StationMap, x: u32, ys: std::ops::Range<u32>) -> TileIndex {
        let first = map.size.tile(x, ys.start);
        for y in ys {
            let tile = map.size.tile(x, y);
            map.set(
                tile,
                TileContent::Station(StationTile {
                    station: StationId(1),
                    stop_type: RoadStopType::Bus,
                    layout: StopLayout::DriveThrough(Axis::Y),
                }),
            );
        }
        first
    }

    #[test]
    fn test_free_length_and_release() {
        let mut platform = Platform {
            length: 32,
            ..Default::default()
        };
        platform.occupy(PlatformSide::East, 20);
        assert_eq!(platform.free_length(PlatformSide::East), 12);
        assert_eq!(platform.free_length(PlatformSide::West), 32);

        platform.occupy(PlatformSide::East, 20);
        assert_eq!(platform.free_length(PlatformSide::East), 0);

        platform.release(PlatformSide::East, 50);
        assert_eq!(platform.occupied_east, 0);
    }

    #[test]
    fn test_side_for_direction() {
        assert_eq!(
            PlatformSide::for_direction(Axis::Y, Direction::SE),
            Some(PlatformSide::East)
        );
        assert_eq!(
            PlatformSide::for_direction(Axis::Y, Direction::NW),
            Some(PlatformSide::West)
        );
        assert_eq!(
            PlatformSide::for_direction(Axis::X, Direction::NE),
            Some(PlatformSide::East)
        );
        assert_eq!(PlatformSide::for_direction(Axis::X, Direction::SE), None);
    }

    #[test]
    fn test_rebuild_sums_east_facing_vehicles() {
        let mut map = StationMap::new(16, 16);
        let north = run_along_y(&mut map, 4, 2..4);
        let mut vehicles = VehicleRegistry::default();
        let a = vehicles.spawn(Vehicle::road_vehicle(Direction::SE, 6));
        let b = vehicles.spawn(Vehicle::road_vehicle(Direction::SE, 8));
        vehicles.place(a, map.size.tile(4, 2));
        vehicles.place(b, map.size.tile(4, 3));

        let platform = Platform::rebuild(&map, &vehicles, north);
        assert_eq!(platform.occupied_east, 14);
        assert_eq!(platform.occupied_west, 0);
        assert_eq!(platform.length, 2 * TILE_SIZE);
    }

    #[test]
    fn test_rebuild_counts_multi_tile_vehicle_once() {
        let mut map = StationMap::new(16, 16);
        let north = run_along_y(&mut map, 4, 2..5);
        let mut vehicles = VehicleRegistry::default();
        let bus = vehicles.spawn(Vehicle::road_vehicle(Direction::NW, 24));
        vehicles.place(bus, map.size.tile(4, 3));
        vehicles.place(bus, map.size.tile(4, 4));

        let platform = Platform::rebuild(&map, &vehicles, north);
        assert_eq!(platform.occupied_west, 24);
        assert_eq!(platform.length, 3 * TILE_SIZE);
    }

    #[test]
    fn test_rebuild_ignores_vehicles_outside_stop_state() {
        let mut map = StationMap::new(16, 16);
        let north = run_along_y(&mut map, 4, 2..3);
        let mut vehicles = VehicleRegistry::default();
        let mut driving = Vehicle::road_vehicle(Direction::SE, 10);
        driving.state = RoadVehicleState::Driving;
        let mut wreck = Vehicle::road_vehicle(Direction::SE, 10);
        wreck.crashed = true;
        let mut trailer = Vehicle::road_vehicle(Direction::E, 10);
        trailer.is_primary = false;
        for v in [driving, wreck, trailer] {
            let id = vehicles.spawn(v);
            vehicles.place(id, north);
        }

        let platform = Platform::rebuild(&map, &vehicles, north);
        assert_eq!(platform.occupied_east, 0);
        assert_eq!(platform.occupied_west, 0);
        assert_eq!(platform.length, TILE_SIZE);
    }

    #[test]
    fn test_rebuild_on_non_stop_tile_is_empty() {
        let map = StationMap::new(8, 8);
        let vehicles = VehicleRegistry::default();
        assert_eq!(
            Platform::rebuild(&map, &vehicles, map.size.tile(1, 1)),
            Platform::default()
        );
    }

    #[test]
    fn test_arena_ids_are_not_reused() {
        let mut arena = PlatformArena::default();
        let a = arena.insert(Platform::default());
        arena.discard(a);
        let b = arena.insert(Platform::default());
        assert_ne!(a, b);
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    #[should_panic(expected = "discarded twice")]
    fn test_arena_double_discard_panics() {
        let mut arena = PlatformArena::default();
        let a = arena.insert(Platform::default());
        arena.discard(a);
        arena.discard(a);
    }
}
