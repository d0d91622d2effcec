//! Block sliding down an inclined plane
//!
//! Optional kinetic friction and an optional horizontal push that opposes
//! the slide. The block starts at rest at the top (`s = 0`) and the run ends
//! on reaching the bottom (`s = L`), where the impact time and speed are
//! latched. Acceleration is clamped at zero: the block never slides back up
//! and static friction is not modeled separately.

use serde::{Deserialize, Serialize};

use super::tick::{Playback, RunPhase, Scenario};
use crate::error::{self, Result, SimError};
use crate::settings::{ClockConfig, InclineConfig, Settings};

/// Net down-slope acceleration at or below this is treated as held by friction
pub const HOLD_EPSILON: f64 = 1e-9;

/// Slider and toggle values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclineParams {
    /// Incline angle in degrees, [0, 90)
    pub angle_deg: f64,
    /// Ramp length in meters
    pub length: f64,
    /// Block mass in kilograms
    pub mass: f64,
    /// Kinetic friction coefficient
    pub friction_coeff: f64,
    pub friction_on: bool,
    /// Horizontal push magnitude in newtons
    pub push_force: f64,
    pub push_on: bool,
    pub show_vectors: bool,
}

impl Default for InclineParams {
    fn default() -> Self {
        Self {
            angle_deg: 30.0,
            length: 5.0,
            mass: 2.0,
            friction_coeff: 0.2,
            friction_on: false,
            push_force: 10.0,
            push_on: false,
            show_vectors: true,
        }
    }
}

fn check_angle(deg: f64) -> Result<f64> {
    error::non_negative("angle_deg", deg)?;
    if deg < 90.0 {
        Ok(deg)
    } else {
        Err(SimError::InvalidParameter {
            name: "angle_deg",
            value: deg,
            reason: "must be below 90 degrees",
        })
    }
}

impl InclineParams {
    pub fn validate(&self) -> Result<()> {
        check_angle(self.angle_deg)?;
        error::positive("length", self.length)?;
        error::positive("mass", self.mass)?;
        error::non_negative("friction_coeff", self.friction_coeff)?;
        error::non_negative("push_force", self.push_force)?;
        Ok(())
    }

    pub fn theta(&self) -> f64 {
        self.angle_deg.to_radians()
    }

    /// Push force currently applied (zero when disabled)
    pub fn active_push(&self) -> f64 {
        if self.push_on { self.push_force } else { 0.0 }
    }

    /// Height of the top of the ramp
    pub fn ramp_height(&self) -> f64 {
        self.length * self.theta().sin()
    }
}

/// |N| = m·g·cosθ + F·sinθ
pub fn normal_force(params: &InclineParams, gravity: f64) -> f64 {
    let theta = params.theta();
    params.mass * gravity * theta.cos() + params.active_push() * theta.sin()
}

/// Acceleration along the ramp (down-slope positive, never negative)
pub fn acceleration(params: &InclineParams, gravity: f64) -> f64 {
    let theta = params.theta();
    let along = gravity * theta.sin() - (params.active_push() / params.mass) * theta.cos();

    if !params.friction_on {
        return along.max(0.0);
    }

    let friction = params.friction_coeff * normal_force(params, gravity) / params.mass;
    let net = along - friction;
    if net <= HOLD_EPSILON { 0.0 } else { net }
}

/// Force magnitudes for vector drawing (newtons)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceBreakdown {
    pub weight: f64,
    pub normal: f64,
    /// Zero when friction is off
    pub friction: f64,
    /// m·g·sinθ
    pub weight_along: f64,
    /// m·g·cosθ
    pub weight_across: f64,
    pub push: f64,
}

pub fn forces(params: &InclineParams, gravity: f64) -> ForceBreakdown {
    let theta = params.theta();
    let weight = params.mass * gravity;
    let normal = normal_force(params, gravity);
    ForceBreakdown {
        weight,
        normal,
        friction: if params.friction_on {
            params.friction_coeff * normal
        } else {
            0.0
        },
        weight_along: weight * theta.sin(),
        weight_across: weight * theta.cos(),
        push: params.active_push(),
    }
}

/// Latched when the block reaches the bottom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub time: f64,
    pub speed: f64,
}

/// Continuous state advanced by the integrator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InclineState {
    /// Elapsed simulated time (s)
    pub t: f64,
    /// Distance travelled down the ramp (m)
    pub s: f64,
    /// Speed along the ramp (m/s)
    pub v: f64,
    /// Acceleration from the latest evaluation (m/s²)
    pub a: f64,
    pub impact: Option<Impact>,
}

/// Inclined-plane scenario
#[derive(Debug, Clone)]
pub struct InclineSim {
    params: InclineParams,
    gravity: f64,
    state: InclineState,
    playback: Playback,
}

impl InclineSim {
    pub fn new(config: InclineConfig, clock: &ClockConfig) -> Self {
        let mut sim = Self {
            params: config.initial,
            gravity: config.gravity,
            state: InclineState::default(),
            playback: Playback::new(config.base_time_scale, clock.slow_motion_scale),
        };
        sim.reset();
        sim
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.incline.clone(), &settings.clock)
    }

    pub fn params(&self) -> &InclineParams {
        &self.params
    }

    pub fn state(&self) -> &InclineState {
        &self.state
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn phase(&self) -> RunPhase {
        self.playback.phase()
    }

    pub fn forces(&self) -> ForceBreakdown {
        forces(&self.params, self.gravity)
    }

    /// Height of the block above the bottom of the ramp
    pub fn current_height(&self) -> f64 {
        (self.params.length - self.state.s) * self.params.theta().sin()
    }

    // === Parameters ===

    pub fn set_angle(&mut self, deg: f64) -> Result<()> {
        self.params.angle_deg = check_angle(deg)?;
        self.params_changed();
        Ok(())
    }

    pub fn set_length(&mut self, length: f64) -> Result<()> {
        self.params.length = error::positive("length", length)?;
        self.params_changed();
        Ok(())
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        self.params.mass = error::positive("mass", mass)?;
        self.params_changed();
        Ok(())
    }

    pub fn set_friction_coeff(&mut self, mu: f64) -> Result<()> {
        self.params.friction_coeff = error::non_negative("friction_coeff", mu)?;
        self.params_changed();
        Ok(())
    }

    pub fn set_friction_on(&mut self, on: bool) {
        self.params.friction_on = on;
        self.params_changed();
    }

    pub fn set_push_force(&mut self, force: f64) -> Result<()> {
        self.params.push_force = error::non_negative("push_force", force)?;
        self.params_changed();
        Ok(())
    }

    pub fn set_push_on(&mut self, on: bool) {
        self.params.push_on = on;
        self.params_changed();
    }

    pub fn set_show_vectors(&mut self, on: bool) {
        self.params.show_vectors = on;
    }

    /// Keep the block on the ramp and the impact latch consistent with new parameters
    fn params_changed(&mut self) {
        self.state.s = self.state.s.min(self.params.length);
        if self.state.s >= self.params.length {
            self.playback.finish();
        } else {
            self.state.impact = None;
            if self.playback.is_terminal() {
                self.playback.reset();
            }
        }
        self.state.a = acceleration(&self.params, self.gravity);
    }

    // === Transport ===

    /// Start sliding; a finished run starts over from the top
    pub fn play(&mut self) {
        if self.playback.is_terminal() || self.state.s >= self.params.length {
            self.reset();
        }
        self.playback.play();
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn toggle_play(&mut self) {
        if self.playback.is_running() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_slow_motion(&mut self, on: bool) {
        self.playback.set_slow_motion(on);
    }

    pub fn toggle_slow_motion(&mut self) {
        self.playback.toggle_slow_motion();
    }

    pub fn set_time_scale(&mut self, scale: f64) -> Result<()> {
        self.playback.set_time_scale(scale)
    }

    /// Block back at the top, at rest
    pub fn reset(&mut self) {
        self.playback.reset();
        self.state = InclineState {
            a: acceleration(&self.params, self.gravity),
            ..Default::default()
        };
        log::info!("Incline reset (a = {:.2} m/s²)", self.state.a);
    }
}

impl Scenario for InclineSim {
    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn step(&mut self, dt: f64) {
        // Parameter edits take effect on the next step
        let a = acceleration(&self.params, self.gravity);
        let length = self.params.length;
        let state = &mut self.state;
        state.a = a;

        let next_s = state.s + state.v * dt + 0.5 * a * dt * dt;
        state.v += a * dt;
        state.t += dt;
        state.s = next_s.min(length);

        if state.s >= length {
            let impact = Impact {
                time: state.t,
                speed: state.v,
            };
            state.impact = Some(impact);
            state.s = length;
            state.v = 0.0;
            self.playback.finish();
            log::info!("Impact at t = {:.2} s, v = {:.2} m/s", impact.time, impact.speed);
        }
    }

    fn resync(&mut self) {
        self.state.a = acceleration(&self.params, self.gravity);
    }
}
