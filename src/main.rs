//! Orbital Defense - headless runner
//!
//! Drives the simulation from a synthetic 60 Hz host clock, orders a few
//! guns and a mine batch, and logs what happens. `RUST_LOG=debug` shows
//! every game event.

#[cfg(not(target_arch = "wasm32"))]
use orbital_defense::{
    CoreResult, Settings, Viewport,
    sim::{
        FrameClock, GameEvent, GamePhase, GameState, GunKind, OrbitId, TickInput,
        awaiting_satellites, tick,
    },
};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SETTINGS_PATH: &str = "orbital-defense.json";
#[cfg(not(target_arch = "wasm32"))]
const HOST_FRAME_MS: f64 = 1000.0 / 60.0;
#[cfg(not(target_arch = "wasm32"))]
const RUN_SECONDS: f64 = 60.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orbital Defense (headless) starting...");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load_or_default(&path);

    if let Err(e) = run(&settings) {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm
}

#[cfg(not(target_arch = "wasm32"))]
fn run(settings: &Settings) -> CoreResult<()> {
    let viewport = Viewport::from_size(1280.0, 720.0)?;
    let mut state = GameState::new(settings, viewport)?;
    let mut clock = FrameClock::new(settings.max_frame_delta_ms);

    // First satellite on each gun orbit gets a gun, plus one mine batch
    let mut first_input = TickInput {
        mine_orders: 1,
        ..TickInput::default()
    };
    for (orbit, kind) in [(OrbitId::Inner, GunKind::Tesla), (OrbitId::Outer, GunKind::Rocketer)] {
        if let Some(satellite) = state.satellites.iter().find(|s| s.orbit == orbit) {
            first_input.gun_orders.push((satellite.id, kind));
        }
    }

    let idle = TickInput::default();
    let frames = (RUN_SECONDS * 1000.0 / HOST_FRAME_MS) as u64;
    let mut host_ms = 0.0;
    let mut event_count = 0usize;

    for frame in 0..frames {
        host_ms += HOST_FRAME_MS;
        // Simulate the tab being hidden for two seconds
        if frame == 1800 {
            host_ms += 2000.0;
        }
        let delta_ms = clock.update(host_ms);

        // Keep the camera on the oldest vehicle in flight
        match state.vehicles.first() {
            Some(vehicle) => state.camera.follow(vehicle.position()),
            None => state.camera.clear_follow(),
        }

        let input = if frame == 0 { &first_input } else { &idle };
        tick(&mut state, input, delta_ms);

        for event in state.events.drain() {
            event_count += 1;
            match &event {
                GameEvent::GunInstalled { .. }
                | GameEvent::MinesDelivered { .. }
                | GameEvent::PlanetHit { .. } => log::info!("{:?}", event),
                _ => log::debug!("{:?}", event),
            }
        }

        if frame % 600 == 0 {
            log::info!(
                "t={:.1}s enemies={} debris={} mines={} vehicles={} awaiting={} integrity={:.0}",
                clock.elapsed_ms() / 1000.0,
                state.enemies.len(),
                state.debris.len(),
                state.mines.len(),
                state.vehicles.len(),
                awaiting_satellites(&state).count(),
                state.planet_integrity
            );
        }

        if state.phase == GamePhase::GameOver {
            log::info!("Game over at frame {}", frame);
            break;
        }
    }

    log::info!(
        "Finished: {} ticks, {:.1}s simulated, {} events, planet integrity {:.0}",
        state.time_ticks,
        state.time_ms / 1000.0,
        event_count,
        state.planet_integrity
    );
    Ok(())
}
