//! Scenario runner: wires the world stand-ins to the Overseer and steps both.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use lurk_events::{DutyPhase, PursuerState, StimulusEvent, ZoneId};
use overseer::{Overseer, OverseerConfig, TickOutput};

use crate::level::Level;
use crate::output::SnapshotWriter;
use crate::scenario::Scenario;
use crate::world::World;
use crate::SimError;

/// Timing of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub duration_secs: f32,
    pub dt: f32,
    pub snapshot_interval_secs: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: 120.0,
            dt: 0.1,
            snapshot_interval_secs: 1.0,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt > 0.0) {
            return Err(SimError::Run("dt must be positive".into()));
        }
        if self.duration_secs < 0.0 {
            return Err(SimError::Run("duration must not be negative".into()));
        }
        if !(self.snapshot_interval_secs > 0.0) {
            return Err(SimError::Run("snapshot interval must be positive".into()));
        }
        Ok(())
    }

    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs / self.dt).ceil() as u64
    }

    pub fn ticks_per_snapshot(&self) -> u64 {
        ((self.snapshot_interval_secs / self.dt).round() as u64).max(1)
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub simulated_secs: f32,
    pub snapshots_written: u64,
    pub jobs_issued: u32,
    pub chases: u32,
    pub searches_cleared: u32,
    pub rests: u32,
    pub sightings: u32,
    pub camera_detections: u32,
    pub lingered_reports: u32,
    /// Seconds spent in each pursuer state
    pub time_in_state: BTreeMap<String, f32>,
    pub final_tension: f32,
    pub hottest_zone: Option<ZoneId>,
}

impl RunSummary {
    fn record(&mut self, dt: f32, stimuli: &[StimulusEvent], output: &TickOutput, state: PursuerState) {
        self.ticks += 1;
        self.simulated_secs = output.time.seconds;
        for stimulus in stimuli {
            match stimulus {
                StimulusEvent::DirectSight { .. } => self.sightings += 1,
                StimulusEvent::CameraDetected { .. } => self.camera_detections += 1,
                _ => {}
            }
        }
        if output.job.is_some() {
            self.jobs_issued += 1;
        }
        self.chases += output
            .transitions
            .iter()
            .filter(|(_, to)| *to == PursuerState::Chase)
            .count() as u32;
        if output.cleared_zone.is_some() {
            self.searches_cleared += 1;
        }
        if output.phase_change == Some(DutyPhase::Dormant) {
            self.rests += 1;
        }
        if output.lingered.is_some() {
            self.lingered_reports += 1;
        }
        *self.time_in_state.entry(state.to_string()).or_insert(0.0) += dt;
    }
}

/// Result of a single runner step.
#[derive(Debug, Clone)]
pub struct Step {
    pub stimuli: Vec<StimulusEvent>,
    pub output: TickOutput,
}

pub struct Runner {
    overseer: Overseer,
    world: World,
    scenario: Scenario,
    next_noise: usize,
}

impl Runner {
    pub fn new(
        level: &Level,
        scenario: Scenario,
        config: OverseerConfig,
        seed: u64,
    ) -> Result<Self, SimError> {
        let graph = Arc::new(level.graph()?);
        scenario.validate(&graph)?;

        let spawn = level.spawn(&graph);
        let player_start = scenario
            .visits
            .first()
            .and_then(|v| graph.center(v.zone))
            .unwrap_or_default();
        let world = World::new(
            Arc::clone(&graph),
            spawn,
            player_start,
            scenario.pursuer_speed,
            scenario.player_speed,
            scenario.sight_range,
        );
        let overseer = Overseer::new(config, graph, seed)?;

        info!(level = %level.name, scenario = %scenario.name, seed, "runner ready");

        Ok(Self {
            overseer,
            world,
            scenario,
            next_noise: 0,
        })
    }

    /// Advances the world and the Overseer by one tick.
    pub fn step(&mut self, dt: f32) -> Step {
        let now = self.overseer.time().seconds;
        let mut stimuli = Vec::new();

        while let Some(noise) = self.scenario.noises.get(self.next_noise) {
            if noise.at > now {
                break;
            }
            stimuli.push(StimulusEvent::NoiseHeard {
                source: noise.source(self.world.player.position),
                strength: noise.strength,
            });
            self.next_noise += 1;
        }

        if let Some(visit) = self.scenario.visit_at(now).cloned() {
            self.world.steer_player(&visit);
        }
        stimuli.extend(self.world.perceive());

        for stimulus in &stimuli {
            self.overseer.handle_event(*stimulus);
        }

        let senses = self.world.senses();
        let output = self.overseer.tick(dt, &senses);
        for (from, to) in &output.transitions {
            debug!(time = output.time.seconds, %from, %to, "pursuer");
        }

        self.world.apply(&output.commands);
        self.world.step(dt);

        Step { stimuli, output }
    }

    /// Runs for the configured duration, writing a snapshot every interval.
    pub fn run(
        &mut self,
        run: &RunConfig,
        writer: &mut SnapshotWriter,
    ) -> Result<RunSummary, SimError> {
        run.validate()?;
        let total = run.total_ticks();
        let every = run.ticks_per_snapshot();
        let mut summary = RunSummary::default();

        info!(ticks = total, dt = run.dt, "run started");
        for tick in 1..=total {
            let step = self.step(run.dt);
            summary.record(run.dt, &step.stimuli, &step.output, self.overseer.pursuer_state());
            if tick % every == 0 {
                writer.write(&self.overseer.snapshot())?;
            }
        }
        writer.flush()?;

        summary.snapshots_written = writer.count();
        summary.final_tension = self.overseer.tension();
        summary.hottest_zone = Some(self.overseer.hottest_zone());
        info!(
            jobs = summary.jobs_issued,
            chases = summary.chases,
            rests = summary.rests,
            "run finished"
        );
        Ok(summary)
    }

    pub fn overseer(&self) -> &Overseer {
        &self.overseer
    }

    pub fn overseer_mut(&mut self) -> &mut Overseer {
        &mut self.overseer
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_ticks() {
        let run = RunConfig {
            duration_secs: 10.0,
            dt: 0.1,
            snapshot_interval_secs: 0.5,
        };
        assert_eq!(run.total_ticks(), 100);
        assert_eq!(run.ticks_per_snapshot(), 5);

        let tiny = RunConfig {
            snapshot_interval_secs: 0.01,
            ..run
        };
        assert_eq!(tiny.ticks_per_snapshot(), 1);
    }

    #[test]
    fn test_run_config_rejects_bad_timing() {
        let run = RunConfig {
            dt: 0.0,
            ..RunConfig::default()
        };
        assert!(matches!(run.validate(), Err(SimError::Run(_))));
    }

    #[test]
    fn test_demo_runner_steps() {
        let level = Level::demo().unwrap();
        let scenario = Scenario::demo().unwrap();
        let mut runner = Runner::new(&level, scenario, OverseerConfig::default(), 42).unwrap();

        let first = runner.step(0.1);
        assert!(first
            .stimuli
            .iter()
            .any(|s| matches!(s, StimulusEvent::PlayerZoneChanged { zone: Some(ZoneId(3)) })));
        assert_eq!(runner.overseer().player_zone(), Some(ZoneId(3)));
    }
}
