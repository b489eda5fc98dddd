//! Drive-through road-stop platforms.
//!
//! Every road-stop tile is a pooled `RoadStop`. Neighbouring drive-through
//! tiles of the same station, stop type and axis form a run; a run shares one
//! `Platform` aggregate whose id every member holds. The northernmost member
//! carries the `BASE` flag.
//!
//! ## Data model
//! - `RoadStopPool`: stable-handle storage, per-tile lookup, per-station chains
//! - `RoadStops`: pool + `PlatformArena`, and the merge/split operations
//! - `RoadStopCommand`: build/remove requests fed through the ECS
//!
//! Building a tile costs O(1) unless it joins two runs; removing an interior
//! tile splits the run and recounts both halves from the vehicles on them.

pub mod classifier;
pub mod pool;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod types;

pub use pool::RoadStopPool;
pub use snapshot::PlatformSnapshot;
pub use state::RoadStops;
pub use systems::*;
pub use types::*;
