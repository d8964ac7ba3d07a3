//! Session state: health, outcome and the HUD snapshot.

use serde::{Deserialize, Serialize};
use tracing::info;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Every objective collected
    Victory,
    /// Player health reached zero
    Defeat,
}

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Starting and maximum player health
    pub max_health: f32,
    /// Distance at which the player picks up an objective
    pub pickup_radius: f32,
    /// Radius for the HUD's nearby adversary count
    pub nearby_radius: f32,
    /// Largest `dt` a single tick will simulate
    pub max_tick_delta: f32,
    /// Seconds between the outcome and its banner
    pub outcome_banner_delay: f32,
    /// Seconds an "objective collected" notice stays up
    pub toast_duration: f32,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            pickup_radius: 1.5,
            nearby_radius: 20.0,
            max_tick_delta: 0.25,
            outcome_banner_delay: 1.0,
            toast_duration: 2.0,
            event_capacity: 1024,
        }
    }
}

impl SessionConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.max_health = self.max_health.max(1.0);
        self.pickup_radius = self.pickup_radius.max(0.0);
        self.nearby_radius = self.nearby_radius.max(0.0);
        self.max_tick_delta = self.max_tick_delta.clamp(0.001, 1.0);
        self.outcome_banner_delay = self.outcome_banner_delay.max(0.0);
        self.toast_duration = self.toast_duration.max(0.0);
        self.event_capacity = self.event_capacity.max(16);
    }
}

/// Player health and the session outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    health: f32,
    max_health: f32,
    outcome: Option<SessionOutcome>,
}

impl SessionState {
    /// Start a session at full health.
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            outcome: None,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Outcome, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Returns true once an outcome is set.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Subtract health, clamped at zero.
    ///
    /// Returns `Some(Defeat)` only on the tick health first reaches zero.
    pub fn apply_damage(&mut self, amount: f32) -> Option<SessionOutcome> {
        if amount <= 0.0 || self.outcome.is_some() {
            return None;
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            info!(max_health = self.max_health, "player defeated");
            self.outcome = Some(SessionOutcome::Defeat);
            return self.outcome;
        }
        None
    }

    /// Mark the session won. Returns false if an outcome was already set.
    pub fn declare_victory(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        info!(health = self.health, "all objectives collected");
        self.outcome = Some(SessionOutcome::Victory);
        true
    }

    /// Full health, no outcome.
    pub fn reset(&mut self) {
        self.health = self.max_health;
        self.outcome = None;
    }
}

/// Scalar state for HUD rendering and the outcome banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudState {
    /// Player health
    pub health: f32,
    /// Player maximum health
    pub max_health: f32,
    /// Objectives picked up
    pub objectives_collected: usize,
    /// Objectives placed
    pub objectives_total: usize,
    /// Adversaries within the nearby radius of the player
    pub nearby_adversary_count: usize,
    /// Session outcome, once decided
    pub outcome: Option<SessionOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut session = SessionState::new(100.0);
        assert_eq!(session.apply_damage(20.0), None);
        assert_eq!(session.health(), 80.0);

        assert_eq!(session.apply_damage(500.0), Some(SessionOutcome::Defeat));
        assert_eq!(session.health(), 0.0);
    }

    #[test]
    fn test_defeat_reported_once() {
        let mut session = SessionState::new(10.0);
        assert_eq!(session.apply_damage(10.0), Some(SessionOutcome::Defeat));
        for _ in 0..5 {
            assert_eq!(session.apply_damage(10.0), None);
        }
        assert_eq!(session.outcome(), Some(SessionOutcome::Defeat));
        assert_eq!(session.health(), 0.0);
    }

    #[test]
    fn test_victory_once() {
        let mut session = SessionState::new(100.0);
        assert!(session.declare_victory());
        assert!(!session.declare_victory());
        assert_eq!(session.apply_damage(200.0), None);
        assert_eq!(session.outcome(), Some(SessionOutcome::Victory));
    }

    #[test]
    fn test_reset() {
        let mut session = SessionState::new(50.0);
        session.apply_damage(50.0);
        session.reset();
        assert_eq!(session.health(), 50.0);
        assert!(!session.is_over());
    }

    #[test]
    fn test_config_validate() {
        let mut config = SessionConfig {
            max_health: -3.0,
            max_tick_delta: 10.0,
            ..SessionConfig::default()
        };
        config.validate();
        assert_eq!(config.max_health, 1.0);
        assert_eq!(config.max_tick_delta, 1.0);
    }
}
