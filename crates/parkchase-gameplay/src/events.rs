//! Event bus for gameplay notifications.
//!
//! The simulation publishes discrete happenings here; presentation layers
//! drain them once per frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use parkchase_common::EntityId;

use crate::adversary::AdversaryState;
use crate::game_state::SessionOutcome;

/// Events emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An adversary changed behavior state
    AdversaryStateChanged {
        /// Adversary entity
        adversary: EntityId,
        /// Previous state
        from: AdversaryState,
        /// New state
        to: AdversaryState,
    },
    /// A patrolling adversary was alerted by a peer
    PackAlerted {
        /// Adversary that raised the alarm
        source: EntityId,
        /// Adversary that received it
        recipient: EntityId,
        /// Target position passed along
        target_position: Vec3,
    },
    /// The player lost health to contact damage
    PlayerDamaged {
        /// Damage dealt this tick
        amount: f32,
        /// Health left afterwards
        health: f32,
    },
    /// An objective was picked up
    ObjectiveCollected {
        /// Objective index
        index: usize,
        /// Collected so far
        collected: usize,
        /// Total objectives in the session
        total: usize,
    },
    /// The "objective collected" notice should be hidden
    ObjectiveToastExpired {
        /// Objective index
        index: usize,
    },
    /// The session reached an outcome
    SessionEnded {
        /// Victory or defeat
        outcome: SessionOutcome,
    },
    /// The delayed outcome banner should be shown
    OutcomeBannerShown {
        /// Victory or defeat
        outcome: SessionOutcome,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    ///
    /// Never blocks. When the bus is full the event is dropped.
    pub fn publish(&self, event: GameEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            warn!(capacity = self.capacity, ?event, "event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
