//! Vehicles as seen by road-stop platforms.
//!
//! Movement is driven elsewhere; this module only records which vehicles
//! currently sit on which tiles so platform occupancy can be recounted.

use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tile::{Direction, TileIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Road,
    Rail,
    Ship,
    Aircraft,
}

/// Traversal state of a road vehicle. Ordered: every state from `InRoadStop`
/// onwards means the vehicle is inside a road stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoadVehicleState {
    Driving,
    InDepot,
    InRoadStop,
    InDriveThroughStop,
}

impl RoadVehicleState {
    pub fn is_in_road_stop(self) -> bool {
        self >= RoadVehicleState::InRoadStop
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    /// Front part of a consist; articulated parts and trailers are not primary.
    pub is_primary: bool,
    pub crashed: bool,
    pub state: RoadVehicleState,
    pub direction: Direction,
    /// Length of the whole consist, in tile length units.
    pub cached_total_length: u32,
}

impl Vehicle {
    /// A primary road vehicle stopped inside a drive-through stop.
    /// The id is assigned by `VehicleRegistry::spawn`.
    pub fn road_vehicle(direction: Direction, length: u32) -> Self {
        Self {
            id: VehicleId(0),
            vehicle_type: VehicleType::Road,
            is_primary: true,
            crashed: false,
            state: RoadVehicleState::InDriveThroughStop,
            direction,
            cached_total_length: length,
        }
    }

    /// Whether this vehicle takes up space on a road-stop platform.
    pub fn occupies_road_stop(&self) -> bool {
        self.vehicle_type == VehicleType::Road
            && self.is_primary
            && !self.crashed
            && self.state.is_in_road_stop()
    }
}

/// Per-tile access to the vehicles standing on a tile.
pub trait TileOccupants {
    fn occupants<'a>(&'a self, tile: TileIndex) -> impl Iterator<Item = &'a Vehicle> + 'a;
}

/// All vehicles plus an index of which tiles each one covers. A vehicle may
/// cover several tiles at once.
#[derive(Resource, Debug, Default)]
pub struct VehicleRegistry {
    vehicles: BTreeMap<VehicleId, Vehicle>,
    by_tile: HashMap<TileIndex, Vec<VehicleId>>,
    next_id: u32,
}

impl VehicleRegistry {
    /// Register a vehicle, overwriting its id with a fresh one.
    pub fn spawn(&mut self, mut vehicle: Vehicle) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        vehicle.id = id;
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Remove a vehicle and every tile it covered.
    pub fn despawn(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.clear_position(id);
        self.vehicles.remove(&id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Record that `id` now covers `tile` (in addition to what it covered).
    pub fn place(&mut self, id: VehicleId, tile: TileIndex) {
        if !self.vehicles.contains_key(&id) {
            warn!("VehicleRegistry: ignoring placement of unknown {:?}", id);
            return;
        }
        let on_tile = self.by_tile.entry(tile).or_default();
        if !on_tile.contains(&id) {
            on_tile.push(id);
        }
    }

    pub fn clear_position(&mut self, id: VehicleId) {
        self.by_tile.retain(|_, ids| {
            ids.retain(|v| *v != id);
            !ids.is_empty()
        });
    }
}

impl TileOccupants for VehicleRegistry {
    fn occupants<'a>(&'a self, tile: TileIndex) -> impl Iterator<Item = &'a Vehicle> + 'a {
        self.by_tile
            .get(&tile)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.vehicles.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_fresh_ids() {
        let mut registry = VehicleRegistry::default();
        let a = registry.spawn(Vehicle::road_vehicle(Direction::NE, 6));
        let b = registry.spawn(Vehicle::road_vehicle(Direction::NE, 8));
        assert_ne!(a, b);
        assert_eq!(registry.get(b).map(|v| v.id), Some(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_occupants_by_tile() {
        let mut registry = VehicleRegistry::default();
        let a = registry.spawn(Vehicle::road_vehicle(Direction::NE, 6));
        registry.place(a, TileIndex(3));
        registry.place(a, TileIndex(4));
        registry.place(a, TileIndex(4));
        assert_eq!(registry.occupants(TileIndex(3)).count(), 1);
        assert_eq!(registry.occupants(TileIndex(4)).count(), 1);
        assert_eq!(registry.occupants(TileIndex(5)).count(), 0);

        registry.despawn(a);
        assert_eq!(registry.occupants(TileIndex(3)).count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_occupies_road_stop_filter() {
        let mut v = Vehicle::road_vehicle(Direction::SE, 10);
        assert!(v.occupies_road_stop());

        v.state = RoadVehicleState::Driving;
        assert!(!v.occupies_road_stop());

        v.state = RoadVehicleState::InRoadStop;
        v.crashed = true;
        assert!(!v.occupies_road_stop());

        v.crashed = false;
        v.is_primary = false;
        assert!(!v.occupies_road_stop());

        v.is_primary = true;
        v.vehicle_type = VehicleType::Rail;
        assert!(!v.occupies_road_stop());
    }
}
