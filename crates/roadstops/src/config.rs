/// Tiles are `TILE_SIZE` x `TILE_SIZE` length units; platform lengths and
/// vehicle lengths share this unit.
pub const TILE_SIZE: u32 = 16;
pub const DEFAULT_MAP_WIDTH: u32 = 256;
pub const DEFAULT_MAP_HEIGHT: u32 = 256;

/// Debug builds re-verify every platform against a full rebuild once per this
/// many fixed ticks.
pub const INTEGRITY_CHECK_INTERVAL: u32 = 100;
