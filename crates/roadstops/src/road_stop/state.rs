//! `RoadStops`: the merge/split bookkeeping that keeps platforms in step with
//! the tiles of each run.

use bevy::prelude::*;

use crate::platform::{Platform, PlatformArena, PlatformId, PlatformSide};
use crate::station_map::{
    RoadStopType, StationId, StationMap, StationTile, StationTiles, StopLayout, TileContent,
};
use crate::tile::{Direction, TileIndex};
use crate::vehicles::TileOccupants;

use super::classifier::{drive_through_axis, next_in_run};
use super::pool::RoadStopPool;
use super::types::{RoadStop, RoadStopId, RoadStopStatus};

/// All road stops plus the platform aggregates of their drive-through runs.
#[derive(Resource, Debug, Default)]
pub struct RoadStops {
    pub pool: RoadStopPool,
    pub platforms: PlatformArena,
}

impl RoadStops {
    // =========================================================================
    // Commands
    // =========================================================================

    /// Place a road stop of `stop_type` for `station` on `tile`.
    ///
    /// Returns `None` (and leaves the map untouched) when the tile is off the
    /// map or already part of a station.
    pub fn build_road_stop(
        &mut self,
        map: &mut StationMap,
        tile: TileIndex,
        station: StationId,
        stop_type: RoadStopType,
        layout: StopLayout,
    ) -> Option<RoadStopId> {
        if !map.can_build_station(tile) {
            warn!(
                "RoadStops: cannot build {:?} stop for {:?} on {:?}",
                stop_type, station, tile
            );
            return None;
        }
        map.set(
            tile,
            TileContent::Station(StationTile {
                station,
                stop_type,
                layout,
            }),
        );
        let Some(id) = self.pool.allocate(station, RoadStop::new(tile, stop_type)) else {
            panic!("road stop pool already holds a {:?} stop on {:?}", stop_type, tile);
        };
        if layout.is_drive_through() {
            self.make_drive_through(&*map, id);
        }
        Some(id)
    }

    /// Remove the road stop of `stop_type` on `tile`, splitting its run if
    /// needed. Returns `false` when there is no such stop or a vehicle is
    /// still standing in it.
    pub fn remove_road_stop<M, V>(
        &mut self,
        map: &mut M,
        vehicles: &V,
        tile: TileIndex,
        stop_type: RoadStopType,
    ) -> bool
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let Some(id) = self.pool.find_by_tile(tile, stop_type) else {
            warn!("RoadStops: no {:?} stop to remove on {:?}", stop_type, tile);
            return false;
        };
        if vehicles
            .occupants(tile)
            .any(|vehicle| vehicle.occupies_road_stop())
        {
            warn!(
                "RoadStops: {:?} stop on {:?} still has a vehicle in it",
                stop_type, tile
            );
            return false;
        }
        let Some(station) = map.station_index(tile) else {
            panic!("road stop {:?} sits on non-station tile {:?}", id, tile);
        };

        if self.pool.get(id).platform.is_some() {
            self.clear_drive_through(map, vehicles, id);
        } else {
            map.clear_square(tile);
        }
        self.pool.free(station, id);
        true
    }

    // =========================================================================
    // Merge / split
    // =========================================================================

    /// Join a freshly placed drive-through stop to the runs north and south of
    /// it, creating a new platform when there are none.
    pub fn make_drive_through<M: StationTiles + ?Sized>(&mut self, map: &M, id: RoadStopId) {
        let (xy, stop_type) = {
            let rs = self.pool.get(id);
            assert!(
                rs.platform.is_none(),
                "road stop at {:?} is already on platform {:?}",
                rs.xy,
                rs.platform
            );
            (rs.xy, rs.stop_type)
        };
        let south_dir = drive_through_axis(map, xy).south_dir();

        let north_tile = next_in_run(map, xy, xy, south_dir.reverse());
        let north = north_tile.and_then(|t| self.pool.get(self.pool.get_by_tile(t, stop_type)).platform);

        let south_tile = next_in_run(map, xy, xy, south_dir);
        let south = south_tile.and_then(|t| {
            let rs = self.pool.get_by_tile(t, stop_type);
            self.pool.get(rs).platform.map(|p| (rs, t, p))
        });

        // Tiles joining the adopted platform, this one included.
        let mut added = 1;
        let platform = match (north, south) {
            (Some(north), south) => {
                if let Some((rs_south, south_tile, south_platform)) = south {
                    // Two runs can only meet here if a gap separated them.
                    assert_ne!(
                        north, south_platform,
                        "runs north and south of {:?} already share a platform",
                        xy
                    );
                    self.pool.get_mut(rs_south).status.remove(RoadStopStatus::BASE);
                    let absorbed = self.platforms.discard(south_platform);
                    let target = self.platforms.live_mut(north);
                    target.occupied_east += absorbed.occupied_east;
                    target.occupied_west += absorbed.occupied_west;

                    let mut cursor = Some(south_tile);
                    while let Some(tile) = cursor {
                        let member = self.pool.get_by_tile(tile, stop_type);
                        let rs = self.pool.get_mut(member);
                        if rs.platform.is_none() {
                            break;
                        }
                        rs.platform = Some(north);
                        added += 1;
                        cursor = next_in_run(map, xy, tile, south_dir);
                    }
                    debug!(
                        "RoadStops: {:?} joined two runs, absorbing {} tiles into {:?}",
                        xy,
                        added - 1,
                        north
                    );
                }
                north
            }
            (None, Some((rs_south, _, south_platform))) => {
                self.pool.get_mut(id).status.insert(RoadStopStatus::BASE);
                self.pool.get_mut(rs_south).status.remove(RoadStopStatus::BASE);
                south_platform
            }
            (None, None) => {
                self.pool.get_mut(id).status.insert(RoadStopStatus::BASE);
                self.platforms.insert(Platform::default())
            }
        };

        self.platforms.live_mut(platform).grow_by_tiles(added);
        self.pool.get_mut(id).platform = Some(platform);
    }

    /// Detach a drive-through stop from its run and clear its tile. Removing
    /// an interior tile splits the run in two and recounts both halves.
    pub fn clear_drive_through<M, V>(&mut self, map: &mut M, vehicles: &V, id: RoadStopId)
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let (xy, stop_type, platform) = {
            let rs = self.pool.get(id);
            let Some(platform) = rs.platform else {
                panic!("road stop at {:?} is not on a platform", rs.xy);
            };
            (rs.xy, rs.stop_type, platform)
        };
        let south_dir = drive_through_axis(&*map, xy).south_dir();
        let north_dir = south_dir.reverse();

        // Neighbours must be classified while this tile is still a stop.
        let north = next_in_run(&*map, xy, xy, north_dir).map(|t| (t, self.pool.get_by_tile(t, stop_type)));
        let south = next_in_run(&*map, xy, xy, south_dir).map(|t| (t, self.pool.get_by_tile(t, stop_type)));

        map.clear_square(xy);

        match (north, south) {
            (Some((north_tile, _)), Some((base_tile, south_base))) => {
                let fresh = self.platforms.insert(Platform::default());
                {
                    let rs = self.pool.get_mut(south_base);
                    rs.status.insert(RoadStopStatus::BASE);
                    rs.platform = Some(fresh);
                }

                let mut cursor = next_in_run(&*map, base_tile, base_tile, south_dir);
                while let Some(tile) = cursor {
                    let member = self.pool.get_by_tile(tile, stop_type);
                    self.pool.get_mut(member).platform = Some(fresh);
                    cursor = next_in_run(&*map, base_tile, tile, south_dir);
                }

                let mut northernmost = north_tile;
                while let Some(tile) = next_in_run(&*map, base_tile, northernmost, north_dir) {
                    northernmost = tile;
                }
                let north_base = self.pool.get_by_tile(northernmost, stop_type);
                assert!(
                    self.pool.get(north_base).is_base(),
                    "northern end {:?} of a split run is not its base",
                    northernmost
                );

                // Which vehicles queue on which half cannot be told from the
                // sums alone, so both halves are recounted.
                self.rebuild_platform(&*map, vehicles, south_base);
                self.rebuild_platform(&*map, vehicles, north_base);
                debug!(
                    "RoadStops: removing {:?} split {:?}, southern half now {:?}",
                    xy, platform, fresh
                );
            }
            (Some(_), None) => {
                self.platforms.live_mut(platform).shrink_by_tile();
            }
            (None, Some((_, south_base))) => {
                self.pool.get_mut(south_base).status.insert(RoadStopStatus::BASE);
                self.platforms.live_mut(platform).shrink_by_tile();
            }
            (None, None) => {
                self.platforms.discard(platform);
            }
        }

        let rs = self.pool.get_mut(id);
        rs.status.remove(RoadStopStatus::BASE);
        rs.platform = None;
    }

    /// Recount the platform of the run whose northernmost tile is `id`.
    pub fn rebuild_platform<M, V>(&mut self, map: &M, vehicles: &V, id: RoadStopId)
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let rs = self.pool.get(id);
        let Some(platform) = rs.platform else {
            panic!("road stop at {:?} has no platform to rebuild", rs.xy);
        };
        let rebuilt = Platform::rebuild(map, vehicles, rs.xy);
        *self.platforms.live_mut(platform) = rebuilt;
    }

    // =========================================================================
    // Occupancy
    // =========================================================================

    /// The platform of the run `id` belongs to, if it is a drive-through stop.
    pub fn platform_of(&self, id: RoadStopId) -> Option<&Platform> {
        self.pool
            .try_get(id)
            .and_then(|rs| rs.platform)
            .and_then(|p| self.platforms.get(p))
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(id)
    }

    /// Book a vehicle of `length` facing `direction` onto the run of `id`.
    /// Returns `false` for stops without a platform.
    pub fn vehicle_entered<M: StationTiles + ?Sized>(
        &mut self,
        map: &M,
        id: RoadStopId,
        direction: Direction,
        length: u32,
    ) -> bool {
        let Some((platform, side)) = self.occupancy_target(map, id, direction) else {
            return false;
        };
        self.platforms.live_mut(platform).occupy(side, length);
        true
    }

    /// Undo `vehicle_entered`.
    pub fn vehicle_left<M: StationTiles + ?Sized>(
        &mut self,
        map: &M,
        id: RoadStopId,
        direction: Direction,
        length: u32,
    ) -> bool {
        let Some((platform, side)) = self.occupancy_target(map, id, direction) else {
            return false;
        };
        self.platforms.live_mut(platform).release(side, length);
        true
    }

    fn occupancy_target<M: StationTiles + ?Sized>(
        &self,
        map: &M,
        id: RoadStopId,
        direction: Direction,
    ) -> Option<(PlatformId, PlatformSide)> {
        let rs = self.pool.try_get(id)?;
        let platform = rs.platform?;
        let axis = drive_through_axis(map, rs.xy);
        match PlatformSide::for_direction(axis, direction) {
            Some(side) => Some((platform, side)),
            None => panic!(
                "vehicle facing {:?} cannot queue on a {:?}-axis platform",
                direction, axis
            ),
        }
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    /// Verify the run headed by `id` against a full recount. Returns without
    /// checking anything when `id` is not a base. Panics on any mismatch.
    pub fn check_integrity<M, V>(&self, map: &M, vehicles: &V, id: RoadStopId)
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let rs = self.pool.get(id);
        if !rs.is_base() {
            return;
        }
        let axis = drive_through_axis(map, rs.xy);
        assert!(
            next_in_run(map, rs.xy, rs.xy, axis.north_dir()).is_none(),
            "base road stop {:?} has run members north of it",
            rs.xy
        );
        let Some(platform_id) = rs.platform else {
            panic!("base road stop {:?} has no platform", rs.xy);
        };

        let mut cursor = next_in_run(map, rs.xy, rs.xy, axis.south_dir());
        while let Some(tile) = cursor {
            let member = self.pool.get(self.pool.get_by_tile(tile, rs.stop_type));
            assert!(!member.is_base(), "second base {:?} in run of {:?}", tile, rs.xy);
            assert_eq!(
                member.platform,
                Some(platform_id),
                "road stop {:?} is not on the platform of its run",
                tile
            );
            cursor = next_in_run(map, rs.xy, tile, axis.south_dir());
        }

        let expected = Platform::rebuild(map, vehicles, rs.xy);
        let actual = self.platforms.live(platform_id);
        assert_eq!(actual.length, expected.length, "length of run at {:?}", rs.xy);
        assert_eq!(
            actual.occupied_east, expected.occupied_east,
            "east occupancy of run at {:?}",
            rs.xy
        );
        assert_eq!(
            actual.occupied_west, expected.occupied_west,
            "west occupancy of run at {:?}",
            rs.xy
        );
    }

    /// Check every run of every station; returns the number of runs checked.
    /// Also asserts that no platform outlives its run.
    pub fn check_all_integrity<M, V>(&self, map: &M, vehicles: &V) -> usize
    where
        M: StationTiles + ?Sized,
        V: TileOccupants + ?Sized,
    {
        let mut runs = 0;
        for (station, stop_type) in self.pool.chains() {
            for id in self.pool.station_stops(station, stop_type) {
                let rs = self.pool.get(id);
                if rs.platform.is_some() && !rs.is_base() {
                    assert!(
                        next_in_run(map, rs.xy, rs.xy, drive_through_axis(map, rs.xy).north_dir())
                            .is_some(),
                        "road stop {:?} heads a run without being its base",
                        rs.xy
                    );
                }
                if rs.is_base() {
                    self.check_integrity(map, vehicles, id);
                    runs += 1;
                }
            }
        }
        assert_eq!(
            runs,
            self.platforms.len(),
            "{} runs but {} live platforms",
            runs,
            self.platforms.len()
        );
        runs
    }
}
