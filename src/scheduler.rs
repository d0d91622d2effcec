//! Per-frame driver
//!
//! One `frame()` = read the clock → derive a clamped, scaled delta →
//! tick the scenario → present. In the browser the frame callback is
//! re-armed forever; headless runs and tests pump frames from a
//! `ManualClock` instead.

use crate::settings::ClockConfig;
use crate::sim::clock::{FrameClock, TimeSource};
use crate::sim::tick::Scenario;
use crate::view::Presenter;

pub struct Scheduler<S, T, P> {
    scenario: S,
    time: T,
    presenter: P,
    clock: FrameClock,
    frames: u64,
}

impl<S, T, P> Scheduler<S, T, P>
where
    S: Scenario,
    T: TimeSource,
    P: Presenter<S>,
{
    pub fn new(scenario: S, time: T, presenter: P, config: &ClockConfig) -> Self {
        Self {
            scenario,
            time,
            presenter,
            clock: FrameClock::new(config.max_frame_dt),
            frames: 0,
        }
    }

    /// Run one frame using the injected time source
    pub fn frame(&mut self) -> f64 {
        let now = self.time.now_ms();
        self.frame_at(now)
    }

    /// Run one frame for a timestamp supplied by the host (e.g. `requestAnimationFrame`).
    /// Returns the simulated delta that was applied.
    pub fn frame_at(&mut self, now_ms: f64) -> f64 {
        let dt = self
            .clock
            .delta(now_ms, self.scenario.playback().time_scale());
        self.scenario.tick(dt);
        self.presenter.present(&self.scenario);
        self.frames += 1;
        dt
    }

    /// Run `n` frames back to back
    pub fn run_frames(&mut self, n: u64) {
        for _ in 0..n {
            self.frame();
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    /// Mutable access for input handlers between frames
    pub fn scenario_mut(&mut self) -> &mut S {
        &mut self.scenario
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
