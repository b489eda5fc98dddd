//! ECS systems applying road-stop commands and sweeping platform integrity.

use bevy::prelude::*;

use crate::config::INTEGRITY_CHECK_INTERVAL;
use crate::station_map::{RoadStopType, StationId, StationMap, StopLayout};
use crate::tile::TileIndex;
use crate::vehicles::VehicleRegistry;

use super::state::RoadStops;

/// A build or removal request for one road-stop tile.
#[derive(Event, Debug, Clone)]
pub enum RoadStopCommand {
    Build {
        tile: TileIndex,
        station: StationId,
        stop_type: RoadStopType,
        layout: StopLayout,
    },
    Remove {
        tile: TileIndex,
        stop_type: RoadStopType,
    },
}

/// Throttle for the debug integrity sweep.
#[derive(Resource, Default)]
pub struct PlatformIntegrityTimer {
    pub counter: u32,
}

impl PlatformIntegrityTimer {
    pub fn tick(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    pub fn should_run(&self) -> bool {
        self.counter % INTEGRITY_CHECK_INTERVAL == 0
    }
}

/// System: apply queued road-stop commands in order, each to completion.
pub fn apply_road_stop_commands(
    mut events: EventReader<RoadStopCommand>,
    mut map: ResMut<StationMap>,
    mut stops: ResMut<RoadStops>,
    vehicles: Res<VehicleRegistry>,
) {
    for command in events.read() {
        match *command {
            RoadStopCommand::Build {
                tile,
                station,
                stop_type,
                layout,
            } => {
                if let Some(id) = stops.build_road_stop(&mut map, tile, station, stop_type, layout) {
                    debug!("RoadStops: built {:?} stop {:?} on {:?}", stop_type, id, tile);
                }
            }
            RoadStopCommand::Remove { tile, stop_type } => {
                if stops.remove_road_stop(&mut *map, &*vehicles, tile, stop_type) {
                    debug!("RoadStops: removed {:?} stop on {:?}", stop_type, tile);
                }
            }
        }
    }
}

/// System: every `INTEGRITY_CHECK_INTERVAL` ticks, verify every platform
/// against a full recount. Registered in debug builds only.
pub fn check_platform_integrity(
    mut timer: ResMut<PlatformIntegrityTimer>,
    map: Res<StationMap>,
    stops: Res<RoadStops>,
    vehicles: Res<VehicleRegistry>,
) {
    timer.tick();
    if !timer.should_run() {
        return;
    }
    let runs = stops.check_all_integrity(&*map, &*vehicles);
    info!("RoadStops: integrity sweep verified {} platforms", runs);
}
