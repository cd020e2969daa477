use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_core::BuildingKind;
use std::time::Duration;

fn built_up() -> sim_runtime::Simulation {
    let mut sim = sim_runtime::Simulation::canonical();
    for kind in [
        BuildingKind::Office,
        BuildingKind::ServerFarm,
        BuildingKind::ServerFarm,
        BuildingKind::SolarPanel,
        BuildingKind::CoolingSystem,
    ] {
        let _ = sim.purchase(kind);
    }
    sim
}

fn bench_ticks(c: &mut Criterion) {
    let mut sim = built_up();
    c.bench_function("sim_tick", |b| {
        b.iter(|| {
            let _ = black_box(sim.tick(Duration::from_millis(16)));
            sim.drain_events();
        })
    });
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("session 1h of 1s ticks", |b| {
        b.iter(|| {
            let mut sim = built_up();
            for i in 0..3600 {
                if i % 10 == 0 {
                    let _ = sim.start_training_run();
                }
                let _ = sim.tick(Duration::from_secs(1));
            }
            black_box(sim.snapshot())
        })
    });
}

criterion_group!(benches, bench_ticks, bench_session);
criterion_main!(benches);
