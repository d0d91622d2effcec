//! Run-phase state machine and the per-frame scenario contract

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// Where a run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// Not advancing; parameters may change freely
    #[default]
    Idle,
    /// Advancing every frame
    Running,
    /// Reached the end of the track or the ramp; frozen until reset
    Terminal,
}

/// Play/pause state plus the effective time scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playback {
    phase: RunPhase,
    base_scale: f64,
    slow_scale: f64,
    slow_motion: bool,
    scale: f64,
}

impl Playback {
    pub fn new(base_scale: f64, slow_scale: f64) -> Self {
        Self {
            phase: RunPhase::Idle,
            base_scale,
            slow_scale,
            slow_motion: false,
            scale: base_scale,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == RunPhase::Terminal
    }

    /// Start advancing. A terminal run stays frozen; returns whether it is now running.
    pub fn play(&mut self) -> bool {
        match self.phase {
            RunPhase::Idle => {
                self.phase = RunPhase::Running;
                log::debug!("Playback started");
                true
            }
            RunPhase::Running => true,
            RunPhase::Terminal => false,
        }
    }

    pub fn pause(&mut self) {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Idle;
            log::debug!("Playback paused");
        }
    }

    /// Latch the terminal state
    pub fn finish(&mut self) {
        self.phase = RunPhase::Terminal;
    }

    /// Back to idle, whatever the phase
    pub fn reset(&mut self) {
        self.phase = RunPhase::Idle;
    }

    pub fn slow_motion(&self) -> bool {
        self.slow_motion
    }

    pub fn set_slow_motion(&mut self, on: bool) {
        self.slow_motion = on;
        self.scale = if on { self.slow_scale } else { self.base_scale };
        log::info!("Slow motion {} (time scale {})", if on { "on" } else { "off" }, self.scale);
    }

    pub fn toggle_slow_motion(&mut self) {
        self.set_slow_motion(!self.slow_motion);
    }

    /// Use an arbitrary positive time scale
    pub fn set_time_scale(&mut self, scale: f64) -> Result<()> {
        self.scale = error::positive("time_scale", scale)?;
        self.slow_motion = scale == self.slow_scale;
        log::info!("Time scale set to {}", scale);
        Ok(())
    }

    pub fn time_scale(&self) -> f64 {
        self.scale
    }
}

/// A simulation driven one frame at a time
pub trait Scenario {
    fn playback(&self) -> &Playback;

    /// Advance the continuous state by `dt` simulated seconds
    fn step(&mut self, dt: f64);

    /// Re-derive readouts from current parameters without advancing time
    fn resync(&mut self);

    /// Advance when running, otherwise only re-derive readouts
    fn tick(&mut self, dt: f64) {
        if self.playback().is_running() {
            self.step(dt);
        } else {
            self.resync();
        }
    }
}
