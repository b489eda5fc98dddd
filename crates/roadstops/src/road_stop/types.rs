//! Road-stop entity types.

use serde::{Deserialize, Serialize};

use crate::platform::PlatformId;
use crate::station_map::RoadStopType;
use crate::tile::TileIndex;

/// Stable handle of a pooled road stop. Handles of freed stops may be handed
/// out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoadStopId(pub u32);

/// Status bits of a road stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadStopStatus(u8);

impl RoadStopStatus {
    /// Head of a drive-through run; owns the run's platform.
    pub const BASE: Self = Self(1 << 6);
    /// A vehicle is currently entering the stop.
    pub const ENTRY_BUSY: Self = Self(1 << 7);

    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: Self) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: Self) {
        self.0 &= !flag.0;
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadStop {
    /// Tile of the stop; fixed for the lifetime of the stop.
    pub xy: TileIndex,
    pub stop_type: RoadStopType,
    pub status: RoadStopStatus,
    /// Platform shared with the rest of the run. `None` for bay stops and for
    /// drive-through stops not yet joined to a run.
    pub platform: Option<PlatformId>,
    /// Next stop of the same station and stop type.
    pub next: Option<RoadStopId>,
}

impl RoadStop {
    pub fn new(xy: TileIndex, stop_type: RoadStopType) -> Self {
        Self {
            xy,
            stop_type,
            status: RoadStopStatus::default(),
            platform: None,
            next: None,
        }
    }

    pub fn is_base(&self) -> bool {
        self.status.contains(RoadStopStatus::BASE)
    }
}
