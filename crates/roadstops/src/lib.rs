use bevy::prelude::*;

pub mod config;
pub mod platform;
pub mod road_stop;
pub mod station_map;
pub mod tile;
pub mod vehicles;

use road_stop::{
    apply_road_stop_commands, PlatformIntegrityTimer, RoadStopCommand, RoadStops,
};
use station_map::StationMap;
use vehicles::VehicleRegistry;

/// Registers the station map, vehicle registry and road-stop resources, the
/// `RoadStopCommand` event, and the systems that apply commands.
///
/// Debug builds additionally re-verify every platform against a full recount
/// every `config::INTEGRITY_CHECK_INTERVAL` fixed ticks.
pub struct RoadStopPlugin;

impl Plugin for RoadStopPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StationMap>()
            .init_resource::<VehicleRegistry>()
            .init_resource::<RoadStops>()
            .init_resource::<PlatformIntegrityTimer>()
            .add_event::<RoadStopCommand>()
            .add_systems(FixedUpdate, apply_road_stop_commands);

        #[cfg(debug_assertions)]
        app.add_systems(
            FixedUpdate,
            road_stop::check_platform_integrity.after(apply_road_stop_commands),
        );
    }
}
