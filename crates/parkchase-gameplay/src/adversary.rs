//! Adversary AI.
//!
//! Each adversary runs a four-state machine:
//!
//! ```text
//! Patrolling -> Alerted -> Chasing -> Searching -> Patrolling
//! ```
//!
//! Any state jumps straight to `Chasing` when the nearest target is close and
//! visible. State transitions are a pure function of the perception snapshot,
//! the previous state and the alert level (see [`next_state`]); the
//! [`Adversary`] wrapper applies entry effects, escalation and steering.

use std::f32::consts::TAU;

use glam::Vec3;
use parkchase_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::{Agent, AgentKind};
use crate::sight::LineOfSight;
use crate::simulation::SimulationContext;

/// Number of patrol waypoints generated around a spawn point.
pub const PATROL_WAYPOINTS: usize = 4;

/// Adversary tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdversaryConfig {
    /// Speed all state multipliers apply to
    pub base_speed: f32,
    /// Default perception radius for new adversaries
    pub detection_radius: f32,
    /// Fraction of the detection radius inside which a visible target is chased
    pub chase_fraction: f32,
    /// Maximum range of the distance-based line-of-sight test
    pub sight_range: f32,
    /// Whether obstacles also block line of sight
    pub occlusion_sight: bool,
    /// Whether adversary movement is resolved against obstacles
    pub blocked_by_obstacles: bool,
    /// Radius of the patrol waypoint ring around the spawn point
    pub patrol_radius: f32,
    /// Distance at which a waypoint counts as reached
    pub waypoint_arrival_radius: f32,
    /// Speed multiplier while patrolling
    pub patrol_speed_factor: f32,
    /// Speed multiplier while alerted
    pub alert_speed_factor: f32,
    /// Extra chase speed per alert level
    pub chase_speed_per_alert: f32,
    /// Seconds of target velocity to lead a chase by
    pub chase_prediction_time: f32,
    /// Speed multiplier while heading to the last seen position
    pub search_speed_factor: f32,
    /// Speed multiplier while circling the last seen position
    pub search_orbit_speed_factor: f32,
    /// Distance from the last seen position at which circling starts
    pub search_orbit_trigger: f32,
    /// Radius of the search circle
    pub search_orbit_radius: f32,
    /// Angular speed of the search circle in radians per second
    pub search_orbit_angular_speed: f32,
    /// How long a search lasts before giving up
    pub search_duration: f32,
    /// Alert level gained per engaged second
    pub alert_gain_rate: f32,
    /// Alert level lost per disengaged second
    pub alert_decay_rate: f32,
    /// Alert level an adversary is raised to when it becomes alerted
    pub alert_seed: f32,
    /// Upper clamp for the alert level
    pub max_alert_level: f32,
    /// Radius within which an engaged adversary alerts patrolling peers
    pub broadcast_radius: f32,
    /// Distance at which an adversary hurts its target
    pub contact_radius: f32,
    /// Damage per second at alert level 0
    pub contact_base_damage: f32,
    /// Additional damage per second per alert level
    pub contact_damage_per_alert: f32,
}

impl Default for AdversaryConfig {
    fn default() -> Self {
        Self {
            base_speed: 3.5,
            detection_radius: 15.0,
            chase_fraction: 0.8,
            sight_range: 20.0,
            occlusion_sight: false,
            blocked_by_obstacles: false,
            patrol_radius: 10.0,
            waypoint_arrival_radius: 1.0,
            patrol_speed_factor: 0.4,
            alert_speed_factor: 0.6,
            chase_speed_per_alert: 0.3,
            chase_prediction_time: 0.5,
            search_speed_factor: 0.6,
            search_orbit_speed_factor: 0.3,
            search_orbit_trigger: 2.0,
            search_orbit_radius: 3.0,
            search_orbit_angular_speed: 1.0,
            search_duration: 5.0,
            alert_gain_rate: 0.5,
            alert_decay_rate: 0.2,
            alert_seed: 1.0,
            max_alert_level: 3.0,
            broadcast_radius: 25.0,
            contact_radius: 2.0,
            contact_base_damage: 10.0,
            contact_damage_per_alert: 5.0,
        }
    }
}

impl AdversaryConfig {
    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.base_speed = self.base_speed.max(0.0);
        self.detection_radius = self.detection_radius.max(0.0);
        self.chase_fraction = self.chase_fraction.clamp(0.0, 1.0);
        self.max_alert_level = self.max_alert_level.max(0.0);
        self.alert_seed = self.alert_seed.clamp(0.0, self.max_alert_level);
        self.alert_gain_rate = self.alert_gain_rate.max(0.0);
        self.alert_decay_rate = self.alert_decay_rate.max(0.0);
        self.search_duration = self.search_duration.max(0.0);
        self.waypoint_arrival_radius = self.waypoint_arrival_radius.max(0.01);
    }

    /// Damage per second dealt on contact at an alert level.
    #[must_use]
    pub fn contact_damage_rate(&self, alert_level: f32) -> f32 {
        self.contact_base_damage + alert_level * self.contact_damage_per_alert
    }
}

/// Behavior state of an adversary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdversaryState {
    /// Walking the waypoint ring
    #[default]
    Patrolling,
    /// Aware of a target but not chasing it
    Alerted,
    /// Running down a visible target
    Chasing,
    /// Looking around where the target was last seen
    Searching,
}

impl AdversaryState {
    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Patrolling => "patrolling",
            Self::Alerted => "alerted",
            Self::Chasing => "chasing",
            Self::Searching => "searching",
        }
    }

    /// Whether an adversary in this state is engaged with a target at
    /// `distance`. Engaged adversaries build alert and alert their peers.
    #[must_use]
    pub fn engaged(self, distance: f32, detection_radius: f32) -> bool {
        match self {
            Self::Chasing => true,
            Self::Alerted => distance < detection_radius,
            Self::Patrolling | Self::Searching => false,
        }
    }

    /// Get all states.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Patrolling, Self::Alerted, Self::Chasing, Self::Searching]
    }
}

impl std::fmt::Display for AdversaryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A character adversaries can pursue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Entity being pursued
    pub id: EntityId,
    /// Position after this tick's earlier updates
    pub position: Vec3,
    /// Velocity measured over the last tick
    pub velocity: Vec3,
}

impl Target {
    /// Snapshot an agent as a target.
    #[must_use]
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            position: agent.position(),
            velocity: agent.velocity(),
        }
    }
}

/// What an adversary perceived about its nearest target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Distance to the nearest target
    pub distance: f32,
    /// Whether the line-of-sight test passed
    pub in_sight: bool,
}

/// Compute the next state.
///
/// `search_expired` is only consulted while searching.
#[must_use]
pub fn next_state(
    state: AdversaryState,
    perception: Perception,
    alert_level: f32,
    search_expired: bool,
    detection_radius: f32,
    config: &AdversaryConfig,
) -> AdversaryState {
    let in_range = perception.distance < detection_radius;
    if perception.in_sight && perception.distance < detection_radius * config.chase_fraction {
        return AdversaryState::Chasing;
    }

    match state {
        AdversaryState::Patrolling if in_range => AdversaryState::Alerted,
        AdversaryState::Patrolling => AdversaryState::Patrolling,
        AdversaryState::Alerted if !in_range && alert_level <= 0.0 => AdversaryState::Patrolling,
        AdversaryState::Alerted => AdversaryState::Alerted,
        AdversaryState::Chasing => AdversaryState::Searching,
        AdversaryState::Searching if search_expired => AdversaryState::Patrolling,
        AdversaryState::Searching => AdversaryState::Searching,
    }
}

/// Closest target to a point, with its distance.
#[must_use]
pub fn nearest_target(from: Vec3, targets: &[Target]) -> Option<(Target, f32)> {
    targets
        .iter()
        .map(|t| (*t, from.distance(t.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Waypoints evenly spaced on a ring around `spawn`.
#[must_use]
pub fn patrol_ring(spawn: Vec3, radius: f32) -> [Vec3; PATROL_WAYPOINTS] {
    std::array::from_fn(|i| {
        let angle = i as f32 * TAU / PATROL_WAYPOINTS as f32;
        spawn + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
    })
}

/// Outcome of one adversary update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdversaryTick {
    /// State before the update
    pub previous: AdversaryState,
    /// State after the update
    pub state: AdversaryState,
    /// Nearest target, if any target exists
    pub target: Option<Target>,
    /// Damage dealt to the target this tick
    pub contact_damage: f32,
    /// Engaged with the target after the update
    pub engaged: bool,
}

impl AdversaryTick {
    const fn idle(state: AdversaryState) -> Self {
        Self {
            previous: state,
            state,
            target: None,
            contact_damage: 0.0,
            engaged: false,
        }
    }

    /// Returns true if the state changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.state
    }
}

/// An adversary agent and its behavior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adversary {
    agent: Agent,
    spawn: Vec3,
    state: AdversaryState,
    detection_radius: f32,
    alert_level: f32,
    last_seen_target: Option<Vec3>,
    search_time_remaining: f32,
    /// Latched once the search reaches the last seen position
    search_orbiting: bool,
    waypoints: [Vec3; PATROL_WAYPOINTS],
    waypoint_index: usize,
}

impl Adversary {
    /// Create a patrolling adversary at its spawn point.
    #[must_use]
    pub fn new(spawn: Vec3, config: &AdversaryConfig) -> Self {
        Self {
            agent: Agent::new(AgentKind::Adversary, spawn),
            spawn,
            state: AdversaryState::Patrolling,
            detection_radius: config.detection_radius,
            alert_level: 0.0,
            last_seen_target: None,
            search_time_remaining: 0.0,
            search_orbiting: false,
            waypoints: patrol_ring(spawn, config.patrol_radius),
            waypoint_index: 0,
        }
    }

    /// Override the detection radius.
    #[must_use]
    pub fn with_detection_radius(mut self, radius: f32) -> Self {
        self.detection_radius = radius.max(0.0);
        self
    }

    /// Start at a given alert level.
    #[must_use]
    pub fn with_alert_level(mut self, level: f32, config: &AdversaryConfig) -> Self {
        self.alert_level = level.clamp(0.0, config.max_alert_level);
        self
    }

    /// Get the underlying agent.
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Get the underlying agent mutably.
    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    /// Get the entity ID.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.agent.id()
    }

    /// Get the current position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.agent.position()
    }

    /// Get the spawn point.
    #[must_use]
    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> AdversaryState {
        self.state
    }

    /// Get the detection radius.
    #[must_use]
    pub fn detection_radius(&self) -> f32 {
        self.detection_radius
    }

    /// Get the alert level.
    #[must_use]
    pub fn alert_level(&self) -> f32 {
        self.alert_level
    }

    /// Get the last position the target was seen at.
    #[must_use]
    pub fn last_seen_target(&self) -> Option<Vec3> {
        self.last_seen_target
    }

    /// Get the remaining search time.
    #[must_use]
    pub fn search_time_remaining(&self) -> f32 {
        self.search_time_remaining
    }

    /// Get the patrol waypoints.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec3; PATROL_WAYPOINTS] {
        &self.waypoints
    }

    /// Get the index of the waypoint being walked to.
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Put the adversary back at its spawn, patrolling and calm.
    pub fn reset(&mut self) {
        self.agent.respawn(self.spawn);
        self.state = AdversaryState::Patrolling;
        self.alert_level = 0.0;
        self.last_seen_target = None;
        self.search_time_remaining = 0.0;
        self.search_orbiting = false;
        self.waypoint_index = 0;
    }

    /// Alert a patrolling adversary to a target seen by a peer.
    ///
    /// Returns false if the adversary was not patrolling.
    pub fn receive_alert(&mut self, target_position: Vec3, config: &AdversaryConfig) -> bool {
        if self.state != AdversaryState::Patrolling {
            return false;
        }
        self.enter(AdversaryState::Alerted, config);
        self.last_seen_target = Some(target_position);
        true
    }

    /// Run perception, transition, escalation and steering for one tick.
    pub fn update<S: LineOfSight>(
        &mut self,
        targets: &[Target],
        ctx: &SimulationContext<'_>,
        config: &AdversaryConfig,
        sight: &S,
    ) -> AdversaryTick {
        let previous = self.state;
        let Some((target, distance)) = nearest_target(self.position(), targets) else {
            return AdversaryTick::idle(previous);
        };

        // Contact uses the alert level held at the start of the tick.
        let contact_damage = if distance < config.contact_radius {
            config.contact_damage_rate(self.alert_level) * ctx.dt
        } else {
            0.0
        };

        if self.state == AdversaryState::Searching {
            self.search_time_remaining -= ctx.dt;
        }

        let perception = Perception {
            distance,
            in_sight: sight.has_line_of_sight(self.position(), target.position),
        };
        let next = next_state(
            self.state,
            perception,
            self.alert_level,
            self.search_time_remaining <= 0.0,
            self.detection_radius,
            config,
        );
        self.enter(next, config);
        let engaged = self.state.engaged(distance, self.detection_radius);
        self.escalate(engaged, ctx.dt, config);
        self.steer(&target, ctx, config);

        AdversaryTick {
            previous,
            state: self.state,
            target: Some(target),
            contact_damage,
            engaged,
        }
    }

    /// Apply entry effects when the state changes.
    fn enter(&mut self, next: AdversaryState, config: &AdversaryConfig) {
        if next == self.state {
            return;
        }

        debug!(
            adversary = %self.id(),
            from = %self.state,
            to = %next,
            alert = self.alert_level,
            "adversary state change"
        );

        match next {
            AdversaryState::Alerted => {
                self.alert_level = self.alert_level.max(config.alert_seed);
            },
            AdversaryState::Searching => {
                self.search_time_remaining = config.search_duration;
                self.search_orbiting = false;
            },
            AdversaryState::Patrolling => {
                self.last_seen_target = None;
                self.search_time_remaining = 0.0;
                self.search_orbiting = false;
            },
            AdversaryState::Chasing => {},
        }
        self.state = next;
    }

    /// Raise the alert level while engaged, let it decay otherwise.
    fn escalate(&mut self, engaged: bool, dt: f32, config: &AdversaryConfig) {
        let delta = if engaged {
            config.alert_gain_rate * dt
        } else {
            -config.alert_decay_rate * dt
        };
        self.alert_level = (self.alert_level + delta).clamp(0.0, config.max_alert_level);
    }

    fn steer(&mut self, target: &Target, ctx: &SimulationContext<'_>, config: &AdversaryConfig) {
        let base = config.base_speed;
        let (goal, speed) = match self.state {
            AdversaryState::Patrolling => (
                self.waypoints[self.waypoint_index],
                base * config.patrol_speed_factor,
            ),
            AdversaryState::Alerted => (target.position, base * config.alert_speed_factor),
            AdversaryState::Chasing => {
                self.last_seen_target = Some(target.position);
                (
                    target.position + target.velocity * config.chase_prediction_time,
                    base * (1.0 + self.alert_level * config.chase_speed_per_alert),
                )
            },
            AdversaryState::Searching => match self.last_seen_target {
                Some(seen) => self.search_goal(seen, ctx.clock, config),
                None => (self.position(), 0.0),
            },
        };

        self.step_toward(goal, speed, ctx, config);

        if self.state == AdversaryState::Patrolling {
            let waypoint = self.waypoints[self.waypoint_index];
            if flat_distance(self.position(), waypoint) <= config.waypoint_arrival_radius {
                self.waypoint_index = (self.waypoint_index + 1) % PATROL_WAYPOINTS;
            }
        }
    }

    fn search_goal(&mut self, seen: Vec3, clock: f32, config: &AdversaryConfig) -> (Vec3, f32) {
        if !self.search_orbiting
            && flat_distance(self.position(), seen) < config.search_orbit_trigger
        {
            self.search_orbiting = true;
        }

        if self.search_orbiting {
            let angle = clock * config.search_orbit_angular_speed;
            let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * config.search_orbit_radius;
            (seen + offset, config.base_speed * config.search_orbit_speed_factor)
        } else {
            (seen, config.base_speed * config.search_speed_factor)
        }
    }

    /// Move toward `goal` in the ground plane without overshooting it.
    fn step_toward(
        &mut self,
        goal: Vec3,
        speed: f32,
        ctx: &SimulationContext<'_>,
        config: &AdversaryConfig,
    ) {
        let position = self.position();
        let offset = Vec3::new(goal.x - position.x, 0.0, goal.z - position.z);
        let distance = offset.length();
        if distance <= f32::EPSILON || speed <= 0.0 || ctx.dt <= 0.0 {
            return;
        }

        let displacement = offset / distance * (speed * ctx.dt).min(distance);
        if config.blocked_by_obstacles {
            self.agent.move_with_collision(displacement, ctx.obstacles);
        } else {
            self.agent.face_toward(position + displacement);
            self.agent.translate(displacement);
        }
    }
}

fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(a.x - b.x, 0.0, a.z - b.z).length()
}
