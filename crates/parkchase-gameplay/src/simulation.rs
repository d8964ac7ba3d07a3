//! Per-frame simulation tick.
//!
//! [`Simulation`] owns the world and runs the fixed update order:
//!
//! 1. player movement
//! 2. companion follow
//! 3. each adversary, followed by its pack broadcast
//! 4. objective pickups, then contact damage
//! 5. timed events due at the new clock
//!
//! Later steps see the positions written by earlier steps in the same tick.

use glam::Vec3;
use parkchase_common::{EntityId, ObstacleId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adversary::{Adversary, AdversaryConfig, AdversaryState, Target};
use crate::agent::{Agent, AgentKind};
use crate::companion::{update_companion, CompanionConfig};
use crate::events::{EventBus, GameEvent};
use crate::game_state::{HudState, SessionConfig, SessionOutcome, SessionState};
use crate::input::MoveIntent;
use crate::movement::{update_player, PlayerConfig};
use crate::objective::ObjectiveSet;
use crate::obstacle::{Obstacle, ObstacleRegistry};
use crate::rig::{LimbPose, Rig};
use crate::schedule::TimedEventQueue;
use crate::sight::ConfiguredSight;

/// Tick-scoped state handed to every controller.
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext<'a> {
    /// Static collision geometry
    pub obstacles: &'a ObstacleRegistry,
    /// Clamped seconds simulated by this tick
    pub dt: f32,
    /// Simulation time after this tick's advance
    pub clock: f32,
}

/// All gameplay tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Player movement
    pub player: PlayerConfig,
    /// Companion follow bands
    pub companion: CompanionConfig,
    /// Adversary behavior
    pub adversary: AdversaryConfig,
    /// Health, pickups and timers
    pub session: SessionConfig,
}

impl SimulationConfig {
    /// Clamp every section to sensible ranges.
    pub fn validate(&mut self) {
        self.player.validate();
        self.companion.validate();
        self.adversary.validate();
        self.session.validate();
    }
}

/// Deferred work held in the timed event queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledEvent {
    /// Hide the pickup notice for an objective
    ToastExpired {
        /// Objective index
        index: usize,
    },
    /// Show the outcome banner
    OutcomeBanner {
        /// Victory or defeat
        outcome: SessionOutcome,
    },
}

impl From<ScheduledEvent> for GameEvent {
    fn from(event: ScheduledEvent) -> Self {
        match event {
            ScheduledEvent::ToastExpired { index } => Self::ObjectiveToastExpired { index },
            ScheduledEvent::OutcomeBanner { outcome } => Self::OutcomeBannerShown { outcome },
        }
    }
}

/// Render-facing snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    /// Entity ID
    pub id: EntityId,
    /// Player, companion or adversary
    pub kind: AgentKind,
    /// Collision position
    pub position: Vec3,
    /// Position with presentation offsets applied
    pub render_position: Vec3,
    /// Heading around +Y
    pub facing_yaw: f32,
    /// Behavior state, adversaries only
    pub adversary_state: Option<AdversaryState>,
    /// Limb swing for attached body parts
    pub limb_pose: Vec<LimbPose>,
}

impl AgentView {
    fn of(agent: &Agent, adversary_state: Option<AdversaryState>) -> Self {
        Self {
            id: agent.id(),
            kind: agent.kind(),
            position: agent.position(),
            render_position: agent.render_position(),
            facing_yaw: agent.facing_yaw(),
            adversary_state,
            limb_pose: agent.limb_pose(),
        }
    }
}

/// The world and its per-tick update.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    obstacles: ObstacleRegistry,
    player: Option<Agent>,
    player_spawn: Vec3,
    companion: Option<Agent>,
    companion_spawn: Vec3,
    adversaries: Vec<Adversary>,
    objectives: ObjectiveSet,
    session: SessionState,
    timers: TimedEventQueue<ScheduledEvent>,
    events: EventBus,
    clock: f32,
    ticks: u64,
    paused: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    /// Create an empty world.
    #[must_use]
    pub fn new(mut config: SimulationConfig) -> Self {
        config.validate();
        Self {
            obstacles: ObstacleRegistry::new(),
            player: None,
            player_spawn: Vec3::ZERO,
            companion: None,
            companion_spawn: Vec3::ZERO,
            adversaries: Vec::new(),
            objectives: ObjectiveSet::new(),
            session: SessionState::new(config.session.max_health),
            timers: TimedEventQueue::new(),
            events: EventBus::new(config.session.event_capacity),
            clock: 0.0,
            ticks: 0,
            paused: false,
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation time in seconds.
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Ticks run since creation or the last reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Add a collidable volume.
    pub fn register_obstacle(&mut self, obstacle: Obstacle) -> ObstacleId {
        self.obstacles.register(obstacle)
    }

    /// Get the obstacle registry.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    /// Edit obstacles between ticks.
    pub fn obstacles_mut(&mut self) -> &mut ObstacleRegistry {
        &mut self.obstacles
    }

    /// Create or replace the player.
    pub fn spawn_player(&mut self, position: Vec3) -> EntityId {
        let agent = Agent::new(AgentKind::Player, position);
        let id = agent.id();
        debug!(player = %id, ?position, "spawned player");
        self.player = Some(agent);
        self.player_spawn = position;
        id
    }

    /// Create or replace the companion.
    pub fn spawn_companion(&mut self, position: Vec3) -> EntityId {
        let agent = Agent::new(AgentKind::Companion, position);
        let id = agent.id();
        debug!(companion = %id, ?position, "spawned companion");
        self.companion = Some(agent);
        self.companion_spawn = position;
        id
    }

    /// Add a patrolling adversary with default tuning.
    pub fn spawn_adversary(&mut self, position: Vec3) -> EntityId {
        let adversary = Adversary::new(position, &self.config.adversary);
        self.add_adversary(adversary)
    }

    /// Add a prepared adversary.
    pub fn add_adversary(&mut self, adversary: Adversary) -> EntityId {
        let id = adversary.id();
        debug!(
            adversary = %id,
            spawn = ?adversary.spawn(),
            detection_radius = adversary.detection_radius(),
            "spawned adversary"
        );
        self.adversaries.push(adversary);
        id
    }

    /// Place an objective. Returns its index.
    pub fn place_objective(&mut self, position: Vec3) -> usize {
        self.objectives.place(position)
    }

    /// Attach body-part handles to an agent. Returns false if no agent has
    /// that ID.
    pub fn attach_rig(&mut self, entity: EntityId, rig: Rig) -> bool {
        match self.agent_mut(entity) {
            Some(agent) => {
                agent.set_rig(rig);
                true
            },
            None => false,
        }
    }

    /// Get the player.
    #[must_use]
    pub fn player(&self) -> Option<&Agent> {
        self.player.as_ref()
    }

    /// Get the companion.
    #[must_use]
    pub fn companion(&self) -> Option<&Agent> {
        self.companion.as_ref()
    }

    /// Get all adversaries in update order.
    #[must_use]
    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    /// Get the objectives.
    #[must_use]
    pub fn objectives(&self) -> &ObjectiveSet {
        &self.objectives
    }

    /// Get the session state.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns whether ticks are currently ignored.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the pause state directly.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Toggles the pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn agent_mut(&mut self, entity: EntityId) -> Option<&mut Agent> {
        self.player
            .iter_mut()
            .chain(self.companion.iter_mut())
            .chain(self.adversaries.iter_mut().map(Adversary::agent_mut))
            .find(|agent| agent.id() == entity)
    }

    /// Run one tick.
    ///
    /// `dt` is clamped to `0..=max_tick_delta`; NaN counts as zero.
    pub fn tick(&mut self, intent: &MoveIntent, dt: f32) {
        if self.paused {
            return;
        }

        let dt = clamp_delta(dt, self.config.session.max_tick_delta);
        self.clock += dt;
        self.ticks += 1;

        if !self.session.is_over() {
            let contact_damage = self.step_agents(intent, dt);
            self.collect_objectives();
            self.apply_hazards(contact_damage);
        }

        for scheduled in self.timers.drain_due(self.clock) {
            self.events.publish(scheduled.into());
        }
    }

    /// Move every agent. Returns contact damage dealt to the player.
    ///
    /// An adversary only damages the player while the player is its nearest
    /// target, so a closer companion shields the player from that adversary.
    /// Only engaged adversaries alert their peers.
    fn step_agents(&mut self, intent: &MoveIntent, dt: f32) -> f32 {
        let ctx = SimulationContext {
            obstacles: &self.obstacles,
            dt,
            clock: self.clock,
        };
        let config = &self.config;

        if let Some(player) = self.player.as_mut() {
            let previous = player.position();
            update_player(player, intent, &ctx, &config.player);
            player.record_velocity(previous, dt);
        }

        let player_position = self.player.as_ref().map(Agent::position);
        if let Some(companion) = self.companion.as_mut() {
            let previous = companion.position();
            update_companion(companion, player_position, &ctx, &config.companion);
            companion.record_velocity(previous, dt);
        }

        let targets: Vec<Target> = self
            .player
            .iter()
            .chain(self.companion.iter())
            .map(Target::from_agent)
            .collect();
        let player_id = self.player.as_ref().map(Agent::id);
        let sight = ConfiguredSight::new(
            config.adversary.sight_range,
            config.adversary.occlusion_sight,
            &self.obstacles,
        );

        let mut contact_damage = 0.0;
        for index in 0..self.adversaries.len() {
            let adversary = &mut self.adversaries[index];
            let previous = adversary.position();
            let tick = adversary.update(&targets, &ctx, &config.adversary, &sight);
            adversary.agent_mut().record_velocity(previous, dt);

            if tick.changed() {
                self.events.publish(GameEvent::AdversaryStateChanged {
                    adversary: adversary.id(),
                    from: tick.previous,
                    to: tick.state,
                });
            }

            let Some(target) = tick.target else {
                continue;
            };
            if Some(target.id) == player_id {
                contact_damage += tick.contact_damage;
            }
            if tick.engaged {
                broadcast_alert(
                    &mut self.adversaries,
                    index,
                    target.position,
                    &config.adversary,
                    &self.events,
                );
            }
        }

        contact_damage
    }

    fn collect_objectives(&mut self) {
        let Some(player) = self.player.as_ref() else {
            return;
        };

        let collected = self
            .objectives
            .collect_near(player.position(), self.config.session.pickup_radius);
        if collected.is_empty() {
            return;
        }

        let total = self.objectives.total();
        let already = self.objectives.collected_count() - collected.len();
        let toast_at = self.clock + self.config.session.toast_duration;
        for (offset, index) in collected.into_iter().enumerate() {
            debug!(index, "objective collected");
            self.events.publish(GameEvent::ObjectiveCollected {
                index,
                collected: already + offset + 1,
                total,
            });
            self.timers.schedule(toast_at, ScheduledEvent::ToastExpired { index });
        }

        if self.objectives.all_collected() && self.session.declare_victory() {
            self.end_session(SessionOutcome::Victory);
        }
    }

    fn apply_hazards(&mut self, contact_damage: f32) {
        if contact_damage <= 0.0 || self.session.is_over() {
            return;
        }

        let outcome = self.session.apply_damage(contact_damage);
        self.events.publish(GameEvent::PlayerDamaged {
            amount: contact_damage,
            health: self.session.health(),
        });
        if let Some(outcome) = outcome {
            self.end_session(outcome);
        }
    }

    fn end_session(&mut self, outcome: SessionOutcome) {
        info!(?outcome, clock = self.clock, "session ended");
        self.events.publish(GameEvent::SessionEnded { outcome });
        self.timers.schedule(
            self.clock + self.config.session.outcome_banner_delay,
            ScheduledEvent::OutcomeBanner { outcome },
        );
    }

    /// Snapshot every agent for rendering.
    #[must_use]
    pub fn agent_views(&self) -> Vec<AgentView> {
        let mut views: Vec<AgentView> = self
            .player
            .iter()
            .chain(self.companion.iter())
            .map(|agent| AgentView::of(agent, None))
            .collect();
        views.extend(
            self.adversaries
                .iter()
                .map(|adversary| AgentView::of(adversary.agent(), Some(adversary.state()))),
        );
        views
    }

    /// Scalar state for the HUD.
    #[must_use]
    pub fn hud(&self) -> HudState {
        let radius = self.config.session.nearby_radius;
        let nearby_adversary_count = self.player.as_ref().map_or(0, |player| {
            self.adversaries
                .iter()
                .filter(|adversary| adversary.position().distance(player.position()) <= radius)
                .count()
        });

        HudState {
            health: self.session.health(),
            max_health: self.session.max_health(),
            objectives_collected: self.objectives.collected_count(),
            objectives_total: self.objectives.total(),
            nearby_adversary_count,
            outcome: self.session.outcome(),
        }
    }

    /// Take every event published since the last drain.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Restart the session on the same world.
    ///
    /// Pending timers and undrained events are discarded.
    pub fn reset(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.respawn(self.player_spawn);
        }
        if let Some(companion) = self.companion.as_mut() {
            companion.respawn(self.companion_spawn);
        }
        for adversary in &mut self.adversaries {
            adversary.reset();
        }
        self.objectives.reset();
        self.session.reset();
        self.timers.clear();
        self.events.drain();
        self.clock = 0.0;
        self.ticks = 0;
        self.paused = false;
        info!("simulation reset");
    }
}

fn clamp_delta(dt: f32, max: f32) -> f32 {
    if dt.is_nan() {
        0.0
    } else {
        dt.clamp(0.0, max)
    }
}

/// Alert patrolling peers near `source` to a target position.
fn broadcast_alert(
    adversaries: &mut [Adversary],
    source: usize,
    target_position: Vec3,
    config: &AdversaryConfig,
    events: &EventBus,
) {
    let source_id = adversaries[source].id();
    let origin = adversaries[source].position();

    for (index, peer) in adversaries.iter_mut().enumerate() {
        if index == source
            || peer.state() != AdversaryState::Patrolling
            || peer.position().distance(origin) > config.broadcast_radius
        {
            continue;
        }
        if peer.receive_alert(target_position, config) {
            debug!(source = %source_id, recipient = %peer.id(), "pack alert");
            events.publish(GameEvent::PackAlerted {
                source: source_id,
                recipient: peer.id(),
                target_position,
            });
            events.publish(GameEvent::AdversaryStateChanged {
                adversary: peer.id(),
                from: AdversaryState::Patrolling,
                to: AdversaryState::Alerted,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{BodyPart, PartHandle};

    const DT: f32 = 0.1;

    fn count(events: &[GameEvent], matches: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|event| matches(event)).count()
    }

    #[test]
    fn test_pack_alert_scenario() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        // Only the last one is inside the detection radius.
        sim.spawn_adversary(Vec3::new(30.0, 0.0, 0.0));
        sim.spawn_adversary(Vec3::new(22.0, 0.0, 8.0));
        sim.spawn_adversary(Vec3::new(13.0, 0.0, 0.0));

        sim.tick(&MoveIntent::IDLE, DT);

        for adversary in sim.adversaries() {
            assert!(
                matches!(adversary.state(), AdversaryState::Alerted | AdversaryState::Chasing),
                "{:?} left {}",
                adversary.spawn(),
                adversary.state()
            );
        }
        assert!(sim.adversaries()[0].last_seen_target().is_some());
        assert!(sim.adversaries()[1].last_seen_target().is_some());

        let events = sim.drain_events();
        assert_eq!(count(&events, |e| matches!(e, GameEvent::PackAlerted { .. })), 2);
    }

    #[test]
    fn test_pack_alert_does_not_reach_distant_adversaries() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.spawn_adversary(Vec3::new(10.0, 0.0, 0.0));
        sim.spawn_adversary(Vec3::new(60.0, 0.0, 0.0));

        sim.tick(&MoveIntent::IDLE, DT);

        assert_eq!(sim.adversaries()[1].state(), AdversaryState::Patrolling);
    }

    #[test]
    fn test_pack_alert_relays_through_engaged_peer() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        let chaser = sim.spawn_adversary(Vec3::new(10.0, 0.0, 0.0));
        let relay = sim.spawn_adversary(Vec3::new(0.0, 0.0, 14.0));
        // Out of the chaser's broadcast radius, inside the relay's.
        let far = sim.spawn_adversary(Vec3::new(0.0, 0.0, 36.0));

        sim.tick(&MoveIntent::IDLE, DT);

        assert_eq!(sim.adversaries()[2].state(), AdversaryState::Alerted);
        let alerts: Vec<(EntityId, EntityId)> = sim
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::PackAlerted {
                    source, recipient, ..
                } => Some((source, recipient)),
                _ => None,
            })
            .collect();
        assert!(alerts.contains(&(chaser, relay)));
        assert!(alerts.contains(&(relay, far)));
        assert!(!alerts.contains(&(chaser, far)));
    }

    #[test]
    fn test_out_of_range_pack_settles_to_patrol() {
        let mut sim = Simulation::default();
        let target = Vec3::new(0.0, 0.0, 500.0);
        sim.spawn_player(target);

        let config = sim.config().adversary.clone();
        let mut steady = Adversary::new(Vec3::ZERO, &config).with_alert_level(2.0, &config);
        let mut nervous = Adversary::new(Vec3::new(10.0, 0.0, 0.0), &config);
        assert!(steady.receive_alert(target, &config));
        assert!(nervous.receive_alert(target, &config));
        sim.add_adversary(steady);
        sim.add_adversary(nervous);

        // The seeded peer decays first and must not be woken by the other.
        for _ in 0..70 {
            sim.tick(&MoveIntent::IDLE, DT);
        }
        assert_eq!(sim.adversaries()[0].state(), AdversaryState::Alerted);
        assert_eq!(sim.adversaries()[1].state(), AdversaryState::Patrolling);

        for _ in 0..230 {
            sim.tick(&MoveIntent::IDLE, DT);
        }
        assert!(sim
            .adversaries()
            .iter()
            .all(|a| a.state() == AdversaryState::Patrolling && a.alert_level() == 0.0));

        let events = sim.drain_events();
        assert_eq!(count(&events, |e| matches!(e, GameEvent::PackAlerted { .. })), 0);
    }

    #[test]
    fn test_contact_damage_scenario() {
        let mut config = SimulationConfig::default();
        config.session.max_tick_delta = 1.0;
        let mut sim = Simulation::new(config);
        sim.spawn_player(Vec3::ZERO);
        let adversary = Adversary::new(Vec3::new(1.0, 0.0, 0.0), &sim.config().adversary)
            .with_alert_level(2.0, &sim.config().adversary);
        sim.add_adversary(adversary);

        sim.tick(&MoveIntent::IDLE, 1.0);
        assert_eq!(sim.hud().health, 80.0);
        let events = sim.drain_events();
        assert!(events.contains(&GameEvent::PlayerDamaged {
            amount: 20.0,
            health: 80.0,
        }));
    }

    #[test]
    fn test_defeat_fires_once() {
        let mut config = SimulationConfig::default();
        config.session.max_tick_delta = 1.0;
        let mut sim = Simulation::new(config);
        sim.spawn_player(Vec3::ZERO);
        sim.spawn_adversary(Vec3::new(1.0, 0.0, 0.0));

        let mut events = Vec::new();
        for _ in 0..30 {
            sim.tick(&MoveIntent::IDLE, 1.0);
            events.extend(sim.drain_events());
        }

        assert_eq!(sim.hud().health, 0.0);
        assert_eq!(sim.hud().outcome, Some(SessionOutcome::Defeat));
        let ended = count(&events, |e| matches!(e, GameEvent::SessionEnded { .. }));
        let banners = count(&events, |e| matches!(e, GameEvent::OutcomeBannerShown { .. }));
        assert_eq!(ended, 1);
        assert_eq!(banners, 1);
    }

    #[test]
    fn test_companion_takes_no_contact_damage() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::new(0.0, 0.0, 100.0));
        sim.spawn_companion(Vec3::ZERO);
        sim.spawn_adversary(Vec3::new(1.0, 0.0, 0.0));

        for _ in 0..5 {
            sim.tick(&MoveIntent::IDLE, DT);
        }
        assert_eq!(sim.hud().health, 100.0);
        assert_eq!(sim.adversaries()[0].state(), AdversaryState::Chasing);
    }

    #[test]
    fn test_missing_agents_are_noop() {
        let mut sim = Simulation::default();
        sim.spawn_adversary(Vec3::new(5.0, 0.0, 5.0));
        sim.place_objective(Vec3::ZERO);

        for _ in 0..10 {
            sim.tick(&MoveIntent::forward(), DT);
        }

        assert_eq!(sim.adversaries()[0].position(), Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(sim.hud().nearby_adversary_count, 0);
        assert_eq!(sim.hud().objectives_collected, 0);
    }

    #[test]
    fn test_companion_without_player_stays_put() {
        let mut sim = Simulation::default();
        sim.spawn_companion(Vec3::new(2.0, 0.0, 2.0));
        sim.tick(&MoveIntent::IDLE, DT);
        assert_eq!(sim.companion().map(Agent::position), Some(Vec3::new(2.0, 0.0, 2.0)));
    }

    #[test]
    fn test_companion_follows_updated_player() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.spawn_companion(Vec3::new(0.0, 0.0, 10.0));

        sim.tick(&MoveIntent::IDLE, DT);
        let companion = sim.companion().map_or(Vec3::ZERO, Agent::position);
        assert!(companion.z < 10.0);
        assert!((10.0 - companion.z - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_negative_and_nan_dt() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);

        sim.tick(&MoveIntent::forward(), -1.0);
        sim.tick(&MoveIntent::forward(), f32::NAN);

        assert_eq!(sim.player().map(Agent::position), Some(Vec3::ZERO));
        assert_eq!(sim.clock(), 0.0);
    }

    #[test]
    fn test_large_dt_clamped() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.tick(&MoveIntent::forward(), 10.0);

        let max = sim.config().session.max_tick_delta;
        let expected = sim.config().player.base_speed * max;
        let moved = sim.player().map_or(0.0, |p| p.position().length());
        assert!((moved - expected).abs() < 1e-5);
        assert_eq!(sim.clock(), max);
    }

    #[test]
    fn test_objectives_and_victory() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.place_objective(Vec3::new(0.0, 0.0, -1.0));
        sim.place_objective(Vec3::new(0.0, 0.0, -3.0));

        let mut events = Vec::new();
        for _ in 0..6 {
            sim.tick(&MoveIntent::forward(), DT);
            events.extend(sim.drain_events());
        }

        let hud = sim.hud();
        assert_eq!(hud.objectives_collected, 2);
        assert_eq!(hud.objectives_total, 2);
        assert_eq!(hud.outcome, Some(SessionOutcome::Victory));
        assert_eq!(count(&events, |e| matches!(e, GameEvent::ObjectiveCollected { .. })), 2);
        assert!(events.contains(&GameEvent::SessionEnded {
            outcome: SessionOutcome::Victory,
        }));

        // Frozen after the outcome.
        let frozen = sim.player().map_or(Vec3::ZERO, Agent::position);
        sim.tick(&MoveIntent::forward(), DT);
        assert_eq!(sim.player().map(Agent::position), Some(frozen));

        // Timers keep firing.
        for _ in 0..25 {
            sim.tick(&MoveIntent::IDLE, DT);
            events.extend(sim.drain_events());
        }
        assert!(events.contains(&GameEvent::OutcomeBannerShown {
            outcome: SessionOutcome::Victory,
        }));
        assert_eq!(count(&events, |e| matches!(e, GameEvent::ObjectiveToastExpired { .. })), 2);
    }

    #[test]
    fn test_reset_cancels_timers() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.place_objective(Vec3::new(0.0, 0.0, -1.8));
        sim.place_objective(Vec3::new(50.0, 0.0, 50.0));

        sim.tick(&MoveIntent::forward(), DT);
        assert_eq!(sim.hud().objectives_collected, 1);

        sim.reset();
        assert!(sim.drain_events().is_empty());
        assert_eq!(sim.player().map(Agent::position), Some(Vec3::ZERO));
        assert_eq!(sim.hud().objectives_collected, 0);

        for _ in 0..30 {
            sim.tick(&MoveIntent::IDLE, DT);
        }
        let events = sim.drain_events();
        assert_eq!(count(&events, |e| matches!(e, GameEvent::ObjectiveToastExpired { .. })), 0);
    }

    #[test]
    fn test_pause() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.toggle_pause();
        sim.tick(&MoveIntent::forward(), DT);
        assert_eq!(sim.player().map(Agent::position), Some(Vec3::ZERO));
        assert_eq!(sim.ticks(), 0);

        sim.set_paused(false);
        sim.tick(&MoveIntent::forward(), DT);
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn test_hud_nearby_count() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        sim.spawn_adversary(Vec3::new(19.0, 0.0, 0.0));
        sim.spawn_adversary(Vec3::new(0.0, 0.0, 40.0));

        let hud = sim.hud();
        assert_eq!(hud.nearby_adversary_count, 1);
        assert_eq!(hud.health, 100.0);
        assert_eq!(hud.outcome, None);
    }

    #[test]
    fn test_agent_views() {
        let mut sim = Simulation::default();
        let player = sim.spawn_player(Vec3::ZERO);
        sim.spawn_companion(Vec3::new(2.0, 0.0, 0.0));
        sim.spawn_adversary(Vec3::new(80.0, 0.0, 0.0));

        let rig = Rig::new()
            .with_part(BodyPart::LeftLeg, PartHandle(1))
            .with_part(BodyPart::RightLeg, PartHandle(2));
        assert!(sim.attach_rig(player, rig));
        assert!(!sim.attach_rig(EntityId::NULL, Rig::new()));

        sim.tick(&MoveIntent::forward(), DT);
        let views = sim.agent_views();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].kind, AgentKind::Player);
        assert_eq!(views[0].limb_pose.len(), 2);
        assert_eq!(views[1].adversary_state, None);
        assert_eq!(views[2].adversary_state, Some(AdversaryState::Patrolling));
    }

    #[test]
    fn test_moved_obstacle_blocks_next_tick() {
        let mut sim = Simulation::default();
        sim.spawn_player(Vec3::ZERO);
        let wall = sim.register_obstacle(Obstacle::boxed(
            Vec3::new(0.0, 0.0, 50.0),
            Vec3::new(5.0, 5.0, 0.5),
        ));

        sim.tick(&MoveIntent::forward(), DT);
        let before = sim.player().map_or(Vec3::ZERO, Agent::position);
        assert!(before.z < 0.0);

        let moved = crate::obstacle::ObstacleTransform::at(before + Vec3::new(0.0, 0.0, -1.2));
        assert!(sim.obstacles_mut().set_transform(wall, moved));
        sim.tick(&MoveIntent::forward(), DT);
        assert_eq!(sim.player().map(Agent::position), Some(before));
    }
}
