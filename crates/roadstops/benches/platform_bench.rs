//! Criterion benchmarks for platform merge/split.
//!
//! Benchmarks:
//!   - extending a run by one tile (O(1) build path)
//!   - joining two long runs through the gap tile (absorption walk)
//!   - removing the middle tile of a long run (split + two rebuilds)
//!   - full integrity sweep over a long, occupied run
//!
//! Run with: cargo bench -p roadstops --bench platform_bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use roadstops::road_stop::RoadStops;
use roadstops::station_map::{RoadStopType, StationId, StationMap, StopLayout};
use roadstops::tile::{Axis, Direction};
use roadstops::vehicles::{Vehicle, VehicleRegistry};

const RUN_LENGTH: u32 = 64;

/// A map with one Y-axis run on column 10 covering rows `rows`. Every tile
/// carries one queued vehicle except row `RUN_LENGTH / 2`, which the split
/// bench removes.
fn setup_run(rows: std::ops::Range<u32>) -> (StationMap, RoadStops, VehicleRegistry) {
    let mut map = StationMap::new(128, 128);
    let mut stops = RoadStops::default();
    let mut vehicles = VehicleRegistry::default();
    for y in rows {
        let tile = map.size.tile(10, y);
        if let Some(id) = stops.build_road_stop(
            &mut map,
            tile,
            StationId(1),
            RoadStopType::Bus,
            StopLayout::DriveThrough(Axis::Y),
        ) {
            if y == RUN_LENGTH / 2 {
                continue;
            }
            let v = vehicles.spawn(Vehicle::road_vehicle(Direction::SE, 8));
            vehicles.place(v, tile);
            stops.vehicle_entered(&map, id, Direction::SE, 8);
        }
    }
    (map, stops, vehicles)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("platform_build");

    group.bench_function("extend_run", |b| {
        b.iter_batched(
            || setup_run(0..RUN_LENGTH),
            |(mut map, mut stops, _vehicles)| {
                let tile = map.size.tile(10, RUN_LENGTH);
                black_box(stops.build_road_stop(
                    &mut map,
                    tile,
                    StationId(1),
                    RoadStopType::Bus,
                    StopLayout::DriveThrough(Axis::Y),
                ))
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("join_two_runs", |b| {
        b.iter_batched(
            || {
                let (mut map, mut stops, vehicles) = setup_run(0..RUN_LENGTH);
                for y in RUN_LENGTH + 1..2 * RUN_LENGTH {
                    let tile = map.size.tile(10, y);
                    stops.build_road_stop(
                        &mut map,
                        tile,
                        StationId(1),
                        RoadStopType::Bus,
                        StopLayout::DriveThrough(Axis::Y),
                    );
                }
                (map, stops, vehicles)
            },
            |(mut map, mut stops, _vehicles)| {
                let tile = map.size.tile(10, RUN_LENGTH);
                black_box(stops.build_road_stop(
                    &mut map,
                    tile,
                    StationId(1),
                    RoadStopType::Bus,
                    StopLayout::DriveThrough(Axis::Y),
                ))
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("platform_split");

    group.bench_function("remove_middle_tile", |b| {
        b.iter_batched(
            || setup_run(0..RUN_LENGTH),
            |(mut map, mut stops, vehicles)| {
                let tile = map.size.tile(10, RUN_LENGTH / 2);
                black_box(stops.remove_road_stop(&mut map, &vehicles, tile, RoadStopType::Bus))
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_integrity(c: &mut Criterion) {
    let mut group = c.benchmark_group("platform_integrity");
    let (map, stops, vehicles) = setup_run(0..RUN_LENGTH);

    group.bench_function("check_all_single_run", |b| {
        b.iter(|| black_box(stops.check_all_integrity(&map, &vehicles)));
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_split, bench_integrity);
criterion_main!(benches);
