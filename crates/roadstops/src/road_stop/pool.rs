//! Pooled storage for road stops.
//!
//! Handles stay valid until the stop is freed. Besides the slots the pool
//! keeps a `(tile, stop type)` lookup table and, per station and stop type,
//! the head of an intrusive chain linked through `RoadStop::next`.

use std::collections::{BTreeMap, HashMap};

use crate::station_map::{RoadStopType, StationId};
use crate::tile::TileIndex;

use super::types::{RoadStop, RoadStopId};

#[derive(Debug, Default)]
pub struct RoadStopPool {
    slots: Vec<Option<RoadStop>>,
    free_slots: Vec<u32>,
    by_tile: HashMap<(TileIndex, RoadStopType), RoadStopId>,
    heads: BTreeMap<(StationId, RoadStopType), RoadStopId>,
}

impl RoadStopPool {
    /// Store `stop` and append it to the chain of `station`. Returns `None`
    /// when a stop of the same type already occupies the tile.
    pub fn allocate(&mut self, station: StationId, mut stop: RoadStop) -> Option<RoadStopId> {
        let key = (stop.xy, stop.stop_type);
        if self.by_tile.contains_key(&key) {
            return None;
        }
        stop.next = None;
        let stop_type = stop.stop_type;

        let id = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(stop);
                RoadStopId(slot)
            }
            None => {
                self.slots.push(Some(stop));
                RoadStopId(self.slots.len() as u32 - 1)
            }
        };
        self.by_tile.insert(key, id);

        match self.heads.get(&(station, stop_type)).copied() {
            None => {
                self.heads.insert((station, stop_type), id);
            }
            Some(head) => {
                let mut tail = head;
                while let Some(next) = self.get(tail).next {
                    tail = next;
                }
                self.get_mut(tail).next = Some(id);
            }
        }
        Some(id)
    }

    /// Unlink and release a stop. The stop must already have left its run.
    pub fn free(&mut self, station: StationId, id: RoadStopId) -> RoadStop {
        let stop = self.get(id).clone();
        assert!(
            stop.platform.is_none(),
            "road stop at {:?} freed while still on platform {:?}",
            stop.xy,
            stop.platform
        );

        let chain = (station, stop.stop_type);
        match self.heads.get(&chain).copied() {
            Some(head) if head == id => match stop.next {
                Some(next) => {
                    self.heads.insert(chain, next);
                }
                None => {
                    self.heads.remove(&chain);
                }
            },
            Some(head) => {
                let mut prev = head;
                loop {
                    match self.get(prev).next {
                        Some(next) if next == id => break,
                        Some(next) => prev = next,
                        None => panic!(
                            "road stop at {:?} is not linked into station {:?}",
                            stop.xy, station
                        ),
                    }
                }
                self.get_mut(prev).next = stop.next;
            }
            None => panic!("station {:?} has no {:?} stops", station, stop.stop_type),
        }

        self.by_tile.remove(&(stop.xy, stop.stop_type));
        self.slots[id.0 as usize] = None;
        self.free_slots.push(id.0);
        stop
    }

    pub fn try_get(&self, id: RoadStopId) -> Option<&RoadStop> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Access a live stop. A stale handle is a programming error.
    pub fn get(&self, id: RoadStopId) -> &RoadStop {
        match self.try_get(id) {
            Some(stop) => stop,
            None => panic!("stale road stop handle {:?}", id),
        }
    }

    pub fn get_mut(&mut self, id: RoadStopId) -> &mut RoadStop {
        match self.slots.get_mut(id.0 as usize).and_then(Option::as_mut) {
            Some(stop) => stop,
            None => panic!("stale road stop handle {:?}", id),
        }
    }

    pub fn find_by_tile(&self, tile: TileIndex, stop_type: RoadStopType) -> Option<RoadStopId> {
        self.by_tile.get(&(tile, stop_type)).copied()
    }

    /// The stop of `stop_type` on `tile`. There has to be one.
    pub fn get_by_tile(&self, tile: TileIndex, stop_type: RoadStopType) -> RoadStopId {
        match self.find_by_tile(tile, stop_type) {
            Some(id) => id,
            None => panic!("no {:?} road stop on tile {:?}", stop_type, tile),
        }
    }

    /// Walk the chain of stops of `stop_type` belonging to `station`.
    pub fn station_stops(
        &self,
        station: StationId,
        stop_type: RoadStopType,
    ) -> impl Iterator<Item = RoadStopId> + '_ {
        let mut cursor = self.heads.get(&(station, stop_type)).copied();
        std::iter::from_fn(move || {
            let id = cursor?;
            cursor = self.get(id).next;
            Some(id)
        })
    }

    /// Every `(station, stop type)` pair that has at least one stop.
    pub fn chains(&self) -> impl Iterator<Item = (StationId, RoadStopType)> + '_ {
        self.heads.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoadStopId, &RoadStop)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|stop| (RoadStopId(i as u32), stop)))
    }

    pub fn len(&self) -> usize {
        self.by_tile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tile.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(tile: u32) -> RoadStop {
        RoadStop::new(TileIndex(tile), RoadStopType::Bus)
    }

    #[test]
    fn test_allocate_and_lookup() {
        let mut pool = RoadStopPool::default();
        let a = pool.allocate(StationId(1), stop(10)).unwrap();
        let b = pool.allocate(StationId(1), stop(11)).unwrap();
        assert_eq!(pool.get_by_tile(TileIndex(10), RoadStopType::Bus), a);
        assert_eq!(pool.get_by_tile(TileIndex(11), RoadStopType::Bus), b);
        assert_eq!(pool.find_by_tile(TileIndex(10), RoadStopType::Truck), None);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_duplicate_tile_rejected() {
        let mut pool = RoadStopPool::default();
        assert!(pool.allocate(StationId(1), stop(10)).is_some());
        assert!(pool.allocate(StationId(1), stop(10)).is_none());
        let truck = RoadStop::new(TileIndex(10), RoadStopType::Truck);
        assert!(pool.allocate(StationId(1), truck).is_some());
    }

    #[test]
    fn test_station_chain_order_and_unlink() {
        let mut pool = RoadStopPool::default();
        let a = pool.allocate(StationId(1), stop(1)).unwrap();
        let b = pool.allocate(StationId(1), stop(2)).unwrap();
        let c = pool.allocate(StationId(1), stop(3)).unwrap();
        let other = pool.allocate(StationId(2), stop(4)).unwrap();

        let chain: Vec<_> = pool.station_stops(StationId(1), RoadStopType::Bus).collect();
        assert_eq!(chain, vec![a, b, c]);

        pool.free(StationId(1), b);
        let chain: Vec<_> = pool.station_stops(StationId(1), RoadStopType::Bus).collect();
        assert_eq!(chain, vec![a, c]);

        pool.free(StationId(1), a);
        let chain: Vec<_> = pool.station_stops(StationId(1), RoadStopType::Bus).collect();
        assert_eq!(chain, vec![c]);

        pool.free(StationId(1), c);
        assert_eq!(pool.station_stops(StationId(1), RoadStopType::Bus).count(), 0);
        assert_eq!(pool.chains().collect::<Vec<_>>(), vec![(StationId(2), RoadStopType::Bus)]);
        assert_eq!(pool.get(other).xy, TileIndex(4));
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut pool = RoadStopPool::default();
        let a = pool.allocate(StationId(1), stop(1)).unwrap();
        pool.free(StationId(1), a);
        assert!(pool.try_get(a).is_none());
        let b = pool.allocate(StationId(1), stop(2)).unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.get(b).xy, TileIndex(2));
    }

    #[test]
    #[should_panic(expected = "no Bus road stop")]
    fn test_get_by_tile_without_stop_panics() {
        let pool = RoadStopPool::default();
        pool.get_by_tile(TileIndex(5), RoadStopType::Bus);
    }

    #[test]
    #[should_panic(expected = "still on platform")]
    fn test_free_while_on_platform_panics() {
        let mut pool = RoadStopPool::default();
        let a = pool.allocate(StationId(1), stop(1)).unwrap();
        pool.get_mut(a).platform = Some(crate::platform::PlatformId(0));
        pool.free(StationId(1), a);
    }
}
