//! Game events
//!
//! Systems push [`GameEvent`]s onto the bus during a tick. Subscribers
//! registered for the event's [`Topic`] are called synchronously and every
//! event is also queued until the host drains it.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;
use super::enemy_path::EnemyTier;
use super::mines::MineId;
use super::orbit::OrbitId;
use super::satellite::{GunKind, SatelliteId};
use super::vehicle::VehicleId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScreenResized { width: f32, height: f32 },
    FocusChanged { focused: bool },
    VehicleLaunched { vehicle: VehicleId, orbit: OrbitId },
    EngineSeparated { vehicle: VehicleId, position: Vec2, scale: f32, rotation: f32 },
    VehicleInserted { vehicle: VehicleId, orbit_index: usize },
    DeliveryAborted { vehicle: VehicleId },
    GunInstalled { satellite: SatelliteId, kind: GunKind },
    MinesDelivered { mines: Vec<MineId>, orbit_index: usize },
    MineArrived { mine: MineId },
    EnemySpawned { enemy: EnemyId, tier: EnemyTier },
    EnemyBrokeUp { enemy: EnemyId, position: Vec2 },
    PlanetHit { enemy: EnemyId, damage: f32, integrity: f32 },
}

/// Subscription key for a family of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Screen,
    Launch,
    Delivery,
    Mines,
    Enemies,
    Planet,
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::ScreenResized { .. } | GameEvent::FocusChanged { .. } => Topic::Screen,
            GameEvent::VehicleLaunched { .. }
            | GameEvent::EngineSeparated { .. }
            | GameEvent::VehicleInserted { .. } => Topic::Launch,
            GameEvent::DeliveryAborted { .. } | GameEvent::GunInstalled { .. } => Topic::Delivery,
            GameEvent::MinesDelivered { .. } | GameEvent::MineArrived { .. } => Topic::Mines,
            GameEvent::EnemySpawned { .. } | GameEvent::EnemyBrokeUp { .. } => Topic::Enemies,
            GameEvent::PlanetHit { .. } => Topic::Planet,
        }
    }
}

type Handler = Box<dyn FnMut(&GameEvent) + Send>;

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Topic, Vec<Handler>>,
    pending: Vec<GameEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.handlers.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.handlers.entry(topic).or_default().push(Box::new(handler));
    }

    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("event {:?}", event);
        if let Some(handlers) = self.handlers.get_mut(&event.topic()) {
            for handler in handlers.iter_mut() {
                handler(&event);
            }
        }
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Drain all queued events
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_subscribers_see_only_their_topic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = seen.clone();
        bus.subscribe(Topic::Planet, move |e| sink.lock().unwrap().push(e.clone()));

        bus.publish(GameEvent::MineArrived { mine: 1 });
        bus.publish(GameEvent::PlanetHit { enemy: 2, damage: 12.0, integrity: 88.0 });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].topic(), Topic::Planet);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::FocusChanged { focused: false });
        bus.publish(GameEvent::MineArrived { mine: 3 });
        assert_eq!(bus.pending().len(), 2);
        let events = bus.drain();
        assert_eq!(events[1], GameEvent::MineArrived { mine: 3 });
        assert!(bus.drain().is_empty());
    }
}
