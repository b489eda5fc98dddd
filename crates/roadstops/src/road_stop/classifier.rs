//! Run continuity: whether a neighbouring tile belongs to the same run.
//!
//! Always answered from live tile state. The clear path relies on this: it
//! asks about neighbours while the removed tile is still readable, then again
//! after it is gone.

use crate::station_map::StationTiles;
use crate::tile::{Axis, DiagDirection, TileIndex};

/// Whether `next` continues the drive-through run that `rs` belongs to: same
/// station, same stop type, drive-through, same axis.
pub fn is_drive_through_continuation<M: StationTiles + ?Sized>(
    map: &M,
    rs: TileIndex,
    next: TileIndex,
) -> bool {
    let (Some(reference), Some(candidate)) = (map.station_tile(rs), map.station_tile(next)) else {
        return false;
    };
    reference.layout.is_drive_through()
        && candidate.station == reference.station
        && candidate.stop_type == reference.stop_type
        && candidate.layout.is_drive_through()
        && candidate.layout.axis() == reference.layout.axis()
}

/// The tile one step from `from` in `dir`, if it continues the run of `rs`.
pub fn next_in_run<M: StationTiles + ?Sized>(
    map: &M,
    rs: TileIndex,
    from: TileIndex,
    dir: DiagDirection,
) -> Option<TileIndex> {
    map.map_size()
        .neighbour(from, dir)
        .filter(|&next| is_drive_through_continuation(map, rs, next))
}

/// Axis of a tile the caller knows to be a drive-through stop.
pub(crate) fn drive_through_axis<M: StationTiles + ?Sized>(map: &M, tile: TileIndex) -> Axis {
    match map.road_stop_axis(tile) {
        Some(axis) => axis,
        None => panic!("tile {:?} is not a drive-through road stop", tile),
    }
}
