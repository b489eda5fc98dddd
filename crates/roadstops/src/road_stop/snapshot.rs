//! Read-only view of every live run, for debug overlays and logs.

use serde::Serialize;

use crate::platform::PlatformId;
use crate::station_map::RoadStopType;
use crate::tile::TileIndex;

use super::state::RoadStops;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSnapshot {
    pub platform: PlatformId,
    pub base: TileIndex,
    pub stop_type: RoadStopType,
    pub members: u32,
    pub length: u32,
    pub occupied_east: u32,
    pub occupied_west: u32,
}

impl RoadStops {
    /// One entry per run, ordered by platform id.
    pub fn platform_snapshot(&self) -> Vec<PlatformSnapshot> {
        let mut snapshot: Vec<PlatformSnapshot> = self
            .pool
            .iter()
            .filter(|(_, rs)| rs.is_base())
            .filter_map(|(_, rs)| {
                let id = rs.platform?;
                let platform = self.platforms.get(id)?;
                let members = self
                    .pool
                    .iter()
                    .filter(|(_, other)| other.platform == Some(id))
                    .count() as u32;
                Some(PlatformSnapshot {
                    platform: id,
                    base: rs.xy,
                    stop_type: rs.stop_type,
                    members,
                    length: platform.length,
                    occupied_east: platform.occupied_east,
                    occupied_west: platform.occupied_west,
                })
            })
            .collect();
        snapshot.sort_by_key(|s| s.platform);
        snapshot
    }

    pub fn platform_snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.platform_snapshot())
    }
}
