//! Headless run loop.
//!
//! Plays a scripted input sequence against a scene at a fixed timestep and
//! collects the final snapshot.

use parkchase_gameplay::{AgentView, GameEvent, HudState, MoveIntent, Simulation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{EngineConfig, ScriptSegment};
use crate::scene::SceneDescription;
use crate::timing::FixedStep;

/// Scripted intent lookup by simulation time.
#[derive(Debug, Clone)]
pub struct Script {
    /// (end time, intent) for each segment
    ends: Vec<(f32, MoveIntent)>,
}

impl Script {
    /// Lay the segments end to end from time zero.
    #[must_use]
    pub fn new(segments: &[ScriptSegment]) -> Self {
        let mut end = 0.0;
        let ends = segments
            .iter()
            .map(|segment| {
                end += segment.duration;
                (end, segment.intent)
            })
            .collect();
        Self { ends }
    }

    /// Intent held at time `t`. Idle once the script has run out.
    #[must_use]
    pub fn intent_at(&self, t: f32) -> MoveIntent {
        self.ends
            .iter()
            .find(|(end, _)| t < *end)
            .map_or(MoveIntent::IDLE, |(_, intent)| *intent)
    }
}

/// Final state of a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Ticks simulated
    pub ticks: u64,
    /// Simulation clock at the end
    pub clock: f32,
    /// Fraction of a tick left unsimulated after the last frame
    pub interpolation_alpha: f32,
    /// Final HUD state
    pub hud: HudState,
    /// Final agent snapshots
    pub agents: Vec<AgentView>,
    /// Every event published during the run
    pub events: Vec<GameEvent>,
}

/// Owns the simulation and its frame pacing.
#[derive(Debug)]
pub struct Driver {
    simulation: Simulation,
    step: FixedStep,
    script: Script,
    frame_delta: f32,
    frames: u64,
    events: Vec<GameEvent>,
}

impl Driver {
    /// Build the world and pacing from configuration.
    ///
    /// The configuration is clamped first, so hand-built configs get the same
    /// limits as loaded ones.
    #[must_use]
    pub fn new(config: &EngineConfig, scene: &SceneDescription) -> Self {
        let mut config = config.clone();
        config.validate();

        Self {
            simulation: scene.build(config.simulation.clone()),
            step: FixedStep::new(config.fixed_timestep),
            script: Script::new(&config.script),
            frame_delta: config.frame_delta,
            frames: (config.duration_seconds / config.frame_delta).ceil() as u64,
            events: Vec::new(),
        }
    }

    /// Frames needed to cover the configured duration.
    #[must_use]
    pub fn frame_budget(&self) -> u64 {
        self.frames
    }

    /// Advance one presentation frame. Returns the ticks run.
    pub fn frame(&mut self) -> u32 {
        let steps = self.step.accumulate(self.frame_delta);
        for _ in 0..steps {
            let intent = self.script.intent_at(self.simulation.clock());
            self.simulation.tick(&intent, self.step.fixed_dt());
            self.events.extend(self.simulation.drain_events());
        }
        steps
    }

    /// Whether the outcome banner has been shown.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, GameEvent::OutcomeBannerShown { .. }))
    }

    /// Consume the driver into its report.
    #[must_use]
    pub fn into_report(self) -> RunReport {
        RunReport {
            ticks: self.simulation.ticks(),
            clock: self.simulation.clock(),
            interpolation_alpha: self.step.alpha(),
            hud: self.simulation.hud(),
            agents: self.simulation.agent_views(),
            events: self.events,
        }
    }
}

/// Run the scripted session for the configured duration.
///
/// Stops early once an outcome banner has been shown.
#[must_use]
pub fn run(config: &EngineConfig, scene: &SceneDescription) -> RunReport {
    let mut driver = Driver::new(config, scene);
    let frames = driver.frame_budget();
    info!(frames, fixed_dt = driver.step.fixed_dt(), "Starting headless run");

    for frame in 0..frames {
        driver.frame();
        if driver.finished() {
            debug!(frame, "session finished");
            break;
        }
    }

    let report = driver.into_report();
    info!(
        ticks = report.ticks,
        health = report.hud.health,
        collected = report.hud.objectives_collected,
        outcome = ?report.hud.outcome,
        "Run complete"
    );
    report
}
