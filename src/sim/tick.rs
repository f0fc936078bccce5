//! Simulation tick
//!
//! One call advances the whole world by `delta_ms`. Systems run in a fixed
//! order: satellites, vehicles, mines, enemies, debris, view scale, camera.
//! Entities are never read by another system before their own update for
//! the frame has finished.

use super::enemy::{Debris, EnemyId, EnemyOutcome};
use super::events::GameEvent;
use super::satellite::{GunKind, Mount, SatelliteId};
use super::state::{GamePhase, GameState};
use super::vehicle::{FlightPhase, Payload, VehicleEvent};
use crate::camera::{MoveDirection, RotateDirection, ZoomDirection};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// New full screen size (width, height)
    pub resize: Option<(f32, f32)>,
    /// Window focus changed
    pub focus: Option<bool>,
    /// Guns to order for satellites
    pub gun_orders: Vec<(SatelliteId, GunKind)>,
    /// Mine batches to launch
    pub mine_orders: usize,
    pub range_upgrades: Vec<SatelliteId>,
    /// Damage dealt to enemies by guns this tick
    pub enemy_hits: Vec<(EnemyId, f32)>,
    pub camera_move: Option<MoveDirection>,
    pub camera_zoom: Option<ZoomDirection>,
    pub camera_rotate: Option<RotateDirection>,
    /// Two-level view scale toggle
    pub view_zoom_in: bool,
    pub view_zoom_out: bool,
}

/// Advance the world by `delta_ms`
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f32) {
    apply_screen_input(state, input);

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
    apply_orders(state, input);

    state.time_ms += delta_ms as f64;
    state.time_ticks += 1;

    for satellite in &mut state.satellites {
        satellite.tick(delta_ms);
    }
    tick_vehicles(state, delta_ms);
    for mine in state.mines.tick(delta_ms) {
        state.events.publish(GameEvent::MineArrived { mine });
    }
    tick_enemies(state, delta_ms);
    state.debris.retain_mut(|d| d.tick(delta_ms));
    state.view_scale.tick(delta_ms);
    state.camera.tick(delta_ms);
}

fn apply_screen_input(state: &mut GameState, input: &TickInput) {
    if let Some((width, height)) = input.resize {
        if state.camera.screen_resize(width * 0.5, height * 0.5) {
            state.view_scale.resize(width, height);
            state.events.publish(GameEvent::ScreenResized { width, height });
        }
    }
    if let Some(focused) = input.focus {
        state.events.publish(GameEvent::FocusChanged { focused });
    }
}

fn apply_orders(state: &mut GameState, input: &TickInput) {
    for &(satellite, kind) in &input.gun_orders {
        state.order_gun(satellite, kind);
    }
    for _ in 0..input.mine_orders {
        state.order_mines();
    }
    for &id in &input.range_upgrades {
        if let Some(satellite) = state.satellite_mut(id) {
            satellite.upgrade_range();
        }
    }
    for &(id, damage) in &input.enemy_hits {
        let destroyed = state.enemy_mut(id).is_some_and(|e| e.hit(damage));
        if destroyed {
            break_up_enemy(state, id);
        }
    }

    if let Some(direction) = input.camera_move {
        state.camera.set_move_direction(direction);
    }
    if let Some(direction) = input.camera_zoom {
        state.camera.set_zoom_direction(direction);
    }
    if let Some(direction) = input.camera_rotate {
        state.camera.set_rotate_direction(direction);
    }
    if input.view_zoom_in {
        state.view_scale.zoom_in();
    }
    if input.view_zoom_out {
        state.view_scale.zoom_out();
    }
}

fn tick_vehicles(state: &mut GameState, delta_ms: f32) {
    let mut delivered = Vec::new();

    for vehicle in &mut state.vehicles {
        let target_index = match vehicle.payload {
            Payload::Gun { satellite } => state
                .satellites
                .iter()
                .find(|s| s.id == satellite)
                .map(|s| s.index()),
            Payload::Mines { .. } => None,
        };

        for event in vehicle.tick(delta_ms, target_index) {
            match event {
                VehicleEvent::EngineSeparated {
                    position,
                    scale,
                    rotation,
                } => state.events.publish(GameEvent::EngineSeparated {
                    vehicle: vehicle.id,
                    position,
                    scale,
                    rotation,
                }),
                VehicleEvent::Inserted { orbit_index } => {
                    state.events.publish(GameEvent::VehicleInserted {
                        vehicle: vehicle.id,
                        orbit_index,
                    })
                }
                VehicleEvent::Delivered { orbit_index } => {
                    delivered.push((vehicle.payload, orbit_index))
                }
                VehicleEvent::Aborted => {
                    state.events.publish(GameEvent::DeliveryAborted { vehicle: vehicle.id })
                }
            }
        }
    }
    state.vehicles.retain(|v| v.phase() != FlightPhase::Done);

    for (payload, orbit_index) in delivered {
        match payload {
            Payload::Gun { satellite } => {
                let installed = state
                    .satellites
                    .iter_mut()
                    .find(|s| s.id == satellite)
                    .and_then(|s| s.install_gun(&mut state.gun_levels));
                if let Some(kind) = installed {
                    state.events.publish(GameEvent::GunInstalled { satellite, kind });
                }
            }
            Payload::Mines { count } => {
                let mines = state.mines.deliver(orbit_index, count, MINE_DELIVERY_SPACING);
                state.events.publish(GameEvent::MinesDelivered { mines, orbit_index });
            }
        }
    }
}

fn break_up_enemy(state: &mut GameState, id: EnemyId) {
    let Some(pos) = state.enemies.iter().position(|e| e.id == id) else {
        return;
    };
    let enemy = state.enemies.remove(pos);
    let outcome = enemy.break_up(&mut state.rng);
    resolve_outcome(state, id, outcome);
}

fn resolve_outcome(state: &mut GameState, id: EnemyId, outcome: EnemyOutcome) {
    match outcome {
        EnemyOutcome::Breakup {
            position,
            scale,
            directions,
        } => {
            for direction in directions {
                let debris = Debris::new(position, scale, direction, &mut state.rng);
                state.debris.push(debris);
            }
            state.events.publish(GameEvent::EnemyBrokeUp { enemy: id, position });
        }
        EnemyOutcome::Impact { damage, .. } => state.damage_planet(id, damage),
    }
}

fn tick_enemies(state: &mut GameState, delta_ms: f32) {
    if state.spawn_interval_ms > 0.0 {
        state.spawn_timer_ms += delta_ms;
        while state.spawn_timer_ms >= state.spawn_interval_ms {
            state.spawn_timer_ms -= state.spawn_interval_ms;
            state.spawn_enemy();
        }
    }

    let mut finished = Vec::new();
    let rng = &mut state.rng;
    state.enemies.retain_mut(|enemy| match enemy.tick(delta_ms, rng) {
        Some(outcome) => {
            finished.push((enemy.id, outcome));
            false
        }
        None => true,
    });

    for (id, outcome) in finished {
        resolve_outcome(state, id, outcome);
    }
}

/// Satellites still waiting for a gun that is in flight
pub fn awaiting_satellites(state: &GameState) -> impl Iterator<Item = SatelliteId> + '_ {
    state
        .satellites
        .iter()
        .filter(|s| matches!(s.mount, Mount::Awaiting(_)))
        .map(|s| s.id)
}
