//! Rectangular conducting frame moving at constant speed through a magnetic field
//!
//! The frame (width `w`, height `h`) slides along a 1-D track. Its position
//! `x` is the left side of the frame; the field occupies
//! `[field.start, field.end]` on the same axis. Flux changes only while the
//! frame straddles a field edge, so EMF, current and the braking force exist
//! only in the entry and exit transitions.

use serde::{Deserialize, Serialize};

use super::history::{HistoryBuffer, HistoryEntry, PlotQuantity};
use super::tick::{Playback, RunPhase, Scenario};
use crate::error::{self, Result};
use crate::settings::{ClockConfig, InductionConfig, Settings};

/// Below this |dOverlap/dt| the frame is treated as not in a transition
pub const RATE_EPSILON: f64 = 1e-6;
/// Tolerance when comparing overlap against 0 and `w`
pub const OVERLAP_EPSILON: f64 = 1e-4;

/// Direction of the magnetic field relative to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// Drawn as crosses
    #[default]
    IntoPage,
    /// Drawn as dots
    OutOfPage,
}

impl Polarity {
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::IntoPage => 1.0,
            Polarity::OutOfPage => -1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Polarity::IntoPage => Polarity::OutOfPage,
            Polarity::OutOfPage => Polarity::IntoPage,
        }
    }
}

/// Sense of the induced current as seen on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurrentDirection {
    Clockwise,
    CounterClockwise,
    #[default]
    None,
}

impl CurrentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentDirection::Clockwise => "clockwise",
            CurrentDirection::CounterClockwise => "counter-clockwise",
            CurrentDirection::None => "-",
        }
    }

    /// Classify from the overlap rate and field polarity
    pub fn classify(overlap_rate: f64, polarity: Polarity) -> Self {
        let flux_growing = if overlap_rate > RATE_EPSILON {
            true
        } else if overlap_rate < -RATE_EPSILON {
            false
        } else {
            return CurrentDirection::None;
        };
        // Lenz: growing flux into the page drives a counter-clockwise current
        match (flux_growing, polarity) {
            (true, Polarity::IntoPage) | (false, Polarity::OutOfPage) => {
                CurrentDirection::CounterClockwise
            }
            (false, Polarity::IntoPage) | (true, Polarity::OutOfPage) => {
                CurrentDirection::Clockwise
            }
        }
    }
}

/// Where the frame is relative to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldStatus {
    #[default]
    BeforeEntry,
    Entering,
    Inside,
    Exiting,
    AfterExit,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::BeforeEntry => "outside the field (before entry)",
            FieldStatus::Entering => "entering the field",
            FieldStatus::Inside => "entirely inside the field",
            FieldStatus::Exiting => "leaving the field",
            FieldStatus::AfterExit => "outside the field (after exit)",
        }
    }

    /// Whether the flux is changing in this status
    pub fn in_transition(&self) -> bool {
        matches!(self, FieldStatus::Entering | FieldStatus::Exiting)
    }
}

/// Extent of the field along the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRegion {
    pub start: f64,
    pub end: f64,
}

impl FieldRegion {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Slider and toggle values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InductionParams {
    /// |B| in tesla
    pub field_strength: f64,
    pub polarity: Polarity,
    /// Frame height in meters
    pub height: f64,
    /// Frame width in meters
    pub width: f64,
    /// Circuit resistance in ohms
    pub resistance: f64,
    /// Commanded speed in m/s
    pub speed: f64,
    pub show_vectors: bool,
    pub show_current_vectors: bool,
}

impl Default for InductionParams {
    fn default() -> Self {
        Self {
            field_strength: 0.8,
            polarity: Polarity::IntoPage,
            height: 0.8,
            width: 1.0,
            resistance: 2.0,
            speed: 1.0,
            show_vectors: true,
            show_current_vectors: true,
        }
    }
}

impl InductionParams {
    pub fn validate(&self) -> Result<()> {
        error::non_negative("field_strength", self.field_strength)?;
        error::positive("height", self.height)?;
        error::positive("width", self.width)?;
        error::positive("resistance", self.resistance)?;
        error::non_negative("speed", self.speed)?;
        Ok(())
    }

    /// B with the polarity sign applied
    pub fn signed_field(&self) -> f64 {
        self.field_strength * self.polarity.sign()
    }
}

/// Horizontal overlap between the frame `[left, left + width]` and the field
pub fn overlap_width(left: f64, width: f64, field: FieldRegion) -> f64 {
    let right = left + width;
    (right.min(field.end) - left.max(field.start)).max(0.0)
}

/// dOverlap/dt while straddling a field edge; zero elsewhere or when not moving forward
pub fn overlap_rate(left: f64, speed: f64, width: f64, field: FieldRegion) -> f64 {
    if speed <= 0.0 {
        return 0.0;
    }
    if left >= field.start - width && left < field.start {
        speed
    } else if left > field.end - width && left <= field.end {
        -speed
    } else {
        0.0
    }
}

/// Derived quantities at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InductionReadout {
    pub overlap: f64,
    pub overlap_rate: f64,
    /// Φ in webers
    pub flux: f64,
    /// Induced EMF in volts
    pub emf: f64,
    /// Induced current in amperes
    pub current: f64,
    /// Magnitude of the magnetic braking force in newtons
    pub force: f64,
    /// Joule heating in watts
    pub power: f64,
    pub direction: CurrentDirection,
    pub status: FieldStatus,
}

/// Evaluate the model for a frame at `x`. Pure in its inputs.
pub fn measure(params: &InductionParams, field: FieldRegion, x: f64) -> InductionReadout {
    let w = params.width;
    let overlap = overlap_width(x, w, field);
    let overlap_rate = overlap_rate(x, params.speed, w, field);
    let b_signed = params.signed_field();

    let flux = b_signed * params.height * overlap;
    let emf = -b_signed * params.height * overlap_rate;
    let current = emf / params.resistance;

    let force = if overlap_rate.abs() > RATE_EPSILON {
        current.abs() * params.field_strength * params.height
    } else {
        0.0
    };

    let status = if overlap <= OVERLAP_EPSILON {
        if x < field.start {
            FieldStatus::BeforeEntry
        } else {
            FieldStatus::AfterExit
        }
    } else if overlap < w - OVERLAP_EPSILON {
        if x < field.start {
            FieldStatus::Entering
        } else {
            FieldStatus::Exiting
        }
    } else {
        FieldStatus::Inside
    };

    InductionReadout {
        overlap,
        overlap_rate,
        flux,
        emf,
        current,
        force,
        power: current * current * params.resistance,
        direction: CurrentDirection::classify(overlap_rate, params.polarity),
        status,
    }
}

/// Continuous state advanced by the integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InductionState {
    /// Elapsed simulated time (s)
    pub t: f64,
    /// Left side of the frame (m)
    pub x: f64,
    /// Current speed; mirrors the commanded speed
    pub u: f64,
}

/// Induction scenario: parameters, kinematics, readouts and plot history
#[derive(Debug, Clone)]
pub struct InductionSim {
    params: InductionParams,
    config: InductionConfig,
    state: InductionState,
    readout: InductionReadout,
    history: HistoryBuffer,
    playback: Playback,
}

impl InductionSim {
    pub fn new(config: InductionConfig, clock: &ClockConfig) -> Self {
        let params = config.initial.clone();
        let mut sim = Self {
            state: InductionState {
                t: 0.0,
                x: config.start_x,
                u: params.speed,
            },
            readout: InductionReadout::default(),
            history: HistoryBuffer::new(config.history_capacity),
            playback: Playback::new(config.base_time_scale, clock.slow_motion_scale),
            params,
            config,
        };
        sim.reset();
        sim
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.induction.clone(), &settings.clock)
    }

    pub fn params(&self) -> &InductionParams {
        &self.params
    }

    pub fn state(&self) -> &InductionState {
        &self.state
    }

    pub fn readout(&self) -> &InductionReadout {
        &self.readout
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn config(&self) -> &InductionConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.playback.phase()
    }

    pub fn field(&self) -> FieldRegion {
        FieldRegion {
            start: self.config.field_start,
            end: self.config.field_end,
        }
    }

    /// Upper end of the plot's time axis
    pub fn plot_time_max(&self) -> f64 {
        self.history.time_axis_max(self.config.min_plot_time)
    }

    // === Parameters ===

    pub fn set_field_strength(&mut self, b: f64) -> Result<()> {
        self.params.field_strength = error::non_negative("field_strength", b)?;
        Ok(())
    }

    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.params.polarity = polarity;
    }

    pub fn toggle_polarity(&mut self) {
        self.params.polarity = self.params.polarity.flipped();
        log::debug!("Field polarity now {:?}", self.params.polarity);
    }

    pub fn set_height(&mut self, h: f64) -> Result<()> {
        self.params.height = error::positive("height", h)?;
        Ok(())
    }

    pub fn set_width(&mut self, w: f64) -> Result<()> {
        self.params.width = error::positive("width", w)?;
        Ok(())
    }

    pub fn set_resistance(&mut self, r: f64) -> Result<()> {
        self.params.resistance = error::positive("resistance", r)?;
        Ok(())
    }

    pub fn set_speed(&mut self, u: f64) -> Result<()> {
        self.params.speed = error::non_negative("speed", u)?;
        self.state.u = self.params.speed;
        Ok(())
    }

    pub fn set_show_vectors(&mut self, on: bool) {
        self.params.show_vectors = on;
    }

    pub fn set_show_current_vectors(&mut self, on: bool) {
        self.params.show_current_vectors = on;
    }

    pub fn set_plot_quantity(&mut self, quantity: PlotQuantity) {
        self.history.set_quantity(quantity);
    }

    // === Transport ===

    /// Start moving; ignored once the frame has left the track
    pub fn play(&mut self) {
        if !self.playback.play() {
            log::debug!("Frame is off the track; reset to play again");
        }
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

    /// Back to the start position with a fresh one-sample history
    pub fn reset(&mut self) {
        self.playback.reset();
        self.state = InductionState {
            t: 0.0,
            x: self.config.start_x,
            u: self.params.speed,
        };
        self.resync();
        self.history.clear();
        self.history.push(self.history_entry());
        log::info!("Induction reset (x = {:.2} m)", self.state.x);
    }

    /// Current state as a plot sample
    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            t: self.state.t,
            current: self.readout.current,
            emf: self.readout.emf,
            flux: self.readout.flux,
            force: self.readout.force,
            x: self.state.x,
        }
    }
}

impl Scenario for InductionSim {
    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn step(&mut self, dt: f64) {
        self.state.x += self.params.speed * dt;
        self.state.t += dt;

        if self.state.x > self.config.exit_x() {
            self.playback.finish();
            log::info!(
                "Frame left the track at t = {:.2} s (x = {:.2} m)",
                self.state.t,
                self.state.x
            );
        }

        self.resync();
        self.history.push(self.history_entry());
    }

    fn resync(&mut self) {
        self.state.u = self.params.speed;
        self.readout = measure(&self.params, self.field(), self.state.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn textbook_params() -> InductionParams {
        InductionParams {
            field_strength: 0.8,
            polarity: Polarity::IntoPage,
            height: 0.3,
            width: 1.0,
            resistance: 2.0,
            speed: 1.0,
            show_vectors: true,
            show_current_vectors: true,
        }
    }

    fn sim_at(start_x: f64) -> InductionSim {
        let config = InductionConfig {
            start_x,
            initial: textbook_params(),
            ..Default::default()
        };
        InductionSim::new(config, &ClockConfig::default())
    }

    const FIELD: FieldRegion = FieldRegion {
        start: 3.2,
        end: 6.2,
    };

    #[test]
    fn test_overlap_width_cases() {
        assert_eq!(overlap_width(0.0, 1.0, FIELD), 0.0);
        assert!((overlap_width(2.7, 1.0, FIELD) - 0.5).abs() < EPS);
        assert!((overlap_width(4.0, 1.0, FIELD) - 1.0).abs() < EPS);
        assert!((overlap_width(5.7, 1.0, FIELD) - 0.5).abs() < EPS);
        assert_eq!(overlap_width(7.0, 1.0, FIELD), 0.0);
        // Frame wider than the field
        assert!((overlap_width(3.0, 5.0, FIELD) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_overlap_rate_bands() {
        assert_eq!(overlap_rate(2.5, 1.5, 1.0, FIELD), 1.5);
        assert_eq!(overlap_rate(4.0, 1.5, 1.0, FIELD), 0.0);
        assert_eq!(overlap_rate(5.5, 1.5, 1.0, FIELD), -1.5);
        assert_eq!(overlap_rate(6.2, 1.5, 1.0, FIELD), -1.5);
        assert_eq!(overlap_rate(6.3, 1.5, 1.0, FIELD), 0.0);
        assert_eq!(overlap_rate(2.5, 0.0, 1.0, FIELD), 0.0);
    }

    #[test]
    fn test_entering_frame_readouts() {
        // Frame edge about to enter the field
        let sim = sim_at(2.2);
        let r = sim.readout();
        assert_eq!(r.overlap_rate, 1.0);
        assert!((r.emf - (-0.24)).abs() < EPS);
        assert!((r.current - (-0.12)).abs() < EPS);
        assert!((r.force - 0.12 * 0.8 * 0.3).abs() < EPS);
        assert!((r.power - 0.12 * 0.12 * 2.0).abs() < EPS);
        assert_eq!(r.direction, CurrentDirection::CounterClockwise);
        assert_eq!(r.status, FieldStatus::BeforeEntry);
    }

    #[test]
    fn test_step_through_entry_transition() {
        let mut sim = sim_at(2.2);
        sim.play();
        sim.tick(0.5);
        let r = *sim.readout();
        assert!((sim.state().x - 2.7).abs() < EPS);
        assert!((r.overlap - 0.5).abs() < EPS);
        assert!((r.flux - 0.8 * 0.3 * 0.5).abs() < EPS);
        assert!((r.emf - (-0.24)).abs() < EPS);
        assert_eq!(r.status, FieldStatus::Entering);

        // Fully inside: flux constant, no EMF, no force
        sim.tick(0.5);
        let r = *sim.readout();
        assert!((sim.state().x - 3.2).abs() < EPS);
        assert_eq!(r.status, FieldStatus::Inside);
        assert_eq!(r.emf, 0.0);
        assert_eq!(r.force, 0.0);
        assert_eq!(r.direction, CurrentDirection::None);
        assert!((sim.state().t - 1.0).abs() < EPS);
    }

    #[test]
    fn test_exit_transition_reverses_current() {
        let sim = sim_at(5.7);
        let r = sim.readout();
        assert_eq!(r.status, FieldStatus::Exiting);
        assert!((r.emf - 0.24).abs() < EPS);
        assert_eq!(r.direction, CurrentDirection::Clockwise);

        let sim = sim_at(7.0);
        assert_eq!(sim.readout().status, FieldStatus::AfterExit);
    }

    #[test]
    fn test_polarity_flip_symmetry() {
        let params = textbook_params();
        let mut flipped = params.clone();
        flipped.polarity = params.polarity.flipped();

        let a = measure(&params, FIELD, 2.6);
        let b = measure(&flipped, FIELD, 2.6);
        assert_eq!(a.emf, -b.emf);
        assert_eq!(a.current, -b.current);
        assert_eq!(a.flux.abs(), b.flux.abs());
        assert_eq!(a.force, b.force);
        assert_eq!(a.direction, CurrentDirection::CounterClockwise);
        assert_eq!(b.direction, CurrentDirection::Clockwise);
    }

    #[test]
    fn test_measure_is_idempotent() {
        let params = textbook_params();
        assert_eq!(measure(&params, FIELD, 5.9), measure(&params, FIELD, 5.9));
    }

    #[test]
    fn test_leaving_track_is_terminal() {
        let mut sim = sim_at(8.5);
        sim.play();
        sim.tick(0.2);
        assert_eq!(sim.phase(), RunPhase::Terminal);
        let frozen = *sim.state();

        sim.play();
        sim.tick(0.2);
        sim.tick(0.2);
        assert_eq!(*sim.state(), frozen);
        assert_eq!(sim.phase(), RunPhase::Terminal);

        sim.reset();
        assert_eq!(sim.phase(), RunPhase::Idle);
        assert_eq!(sim.state().x, 8.5);
    }

    #[test]
    fn test_reset_reseeds_history() {
        let mut sim = sim_at(2.0);
        sim.play();
        for _ in 0..10 {
            sim.tick(0.05);
        }
        assert_eq!(sim.history().len(), 11);

        sim.reset();
        assert_eq!(sim.state().t, 0.0);
        assert_eq!(sim.state().x, 2.0);
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.history().latest(), Some(&sim.history_entry()));
    }

    #[test]
    fn test_paused_edits_show_up_without_advancing() {
        let mut sim = sim_at(2.5);
        let before = *sim.readout();
        sim.set_field_strength(1.6).unwrap();
        sim.tick(0.03);
        assert_eq!(sim.state().t, 0.0);
        assert_eq!(sim.history().len(), 1);
        assert!((sim.readout().emf - 2.0 * before.emf).abs() < EPS);
    }

    #[test]
    fn test_invalid_resistance_rejected() {
        let mut sim = sim_at(2.5);
        assert!(sim.set_resistance(0.0).is_err());
        assert!(sim.set_resistance(-3.0).is_err());
        assert_eq!(sim.params().resistance, 2.0);
        sim.tick(0.01);
        assert!(sim.readout().current.is_finite());
    }

    #[test]
    fn test_speed_is_mirrored() {
        let mut sim = sim_at(0.7);
        sim.set_speed(2.5).unwrap();
        assert_eq!(sim.state().u, 2.5);
        assert!(sim.set_speed(-1.0).is_err());
        assert_eq!(sim.state().u, 2.5);
    }
}
