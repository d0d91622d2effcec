//! Input messages
//!
//! UI events become commands applied synchronously between frames, so the
//! simulation never depends on a particular widget toolkit. A rejected value
//! leaves the scenario untouched and is reported to the caller.

use serde::{Deserialize, Serialize};

use super::history::PlotQuantity;
use super::incline::InclineSim;
use super::induction::{InductionSim, Polarity};
use crate::error::Result;

/// Transport controls shared by both scenarios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transport {
    Play,
    Pause,
    TogglePlay,
    Reset,
    SetSlowMotion(bool),
    ToggleSlowMotion,
    SetTimeScale(f64),
}

/// Transport operations common to both scenarios
pub trait Controls {
    fn play(&mut self);
    fn pause(&mut self);
    fn toggle_play(&mut self);
    fn reset(&mut self);
    fn set_slow_motion(&mut self, on: bool);
    fn toggle_slow_motion(&mut self);
    fn set_time_scale(&mut self, scale: f64) -> Result<()>;
}

impl Transport {
    pub fn apply_to<C: Controls + ?Sized>(self, target: &mut C) -> Result<()> {
        match self {
            Transport::Play => target.play(),
            Transport::Pause => target.pause(),
            Transport::TogglePlay => target.toggle_play(),
            Transport::Reset => target.reset(),
            Transport::SetSlowMotion(on) => target.set_slow_motion(on),
            Transport::ToggleSlowMotion => target.toggle_slow_motion(),
            Transport::SetTimeScale(scale) => return target.set_time_scale(scale),
        }
        Ok(())
    }
}

macro_rules! impl_controls {
    ($sim:ty) => {
        impl Controls for $sim {
            fn play(&mut self) {
                <$sim>::play(self)
            }
            fn pause(&mut self) {
                <$sim>::pause(self)
            }
            fn toggle_play(&mut self) {
                <$sim>::toggle_play(self)
            }
            fn reset(&mut self) {
                <$sim>::reset(self)
            }
            fn set_slow_motion(&mut self, on: bool) {
                <$sim>::set_slow_motion(self, on)
            }
            fn toggle_slow_motion(&mut self) {
                <$sim>::toggle_slow_motion(self)
            }
            fn set_time_scale(&mut self, scale: f64) -> Result<()> {
                <$sim>::set_time_scale(self, scale)
            }
        }
    };
}

impl_controls!(InductionSim);
impl_controls!(InclineSim);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InductionCommand {
    SetFieldStrength(f64),
    SetPolarity(Polarity),
    TogglePolarity,
    SetHeight(f64),
    SetWidth(f64),
    SetResistance(f64),
    SetSpeed(f64),
    ShowVectors(bool),
    ShowCurrentVectors(bool),
    SetPlotQuantity(PlotQuantity),
    Transport(Transport),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InclineCommand {
    SetAngle(f64),
    SetLength(f64),
    SetMass(f64),
    SetFrictionCoeff(f64),
    FrictionOn(bool),
    SetPushForce(f64),
    PushOn(bool),
    ShowVectors(bool),
    Transport(Transport),
}

impl InductionSim {
    pub fn apply(&mut self, command: InductionCommand) -> Result<()> {
        let result = match command {
            InductionCommand::SetFieldStrength(b) => self.set_field_strength(b),
            InductionCommand::SetPolarity(p) => {
                self.set_polarity(p);
                Ok(())
            }
            InductionCommand::TogglePolarity => {
                self.toggle_polarity();
                Ok(())
            }
            InductionCommand::SetHeight(h) => self.set_height(h),
            InductionCommand::SetWidth(w) => self.set_width(w),
            InductionCommand::SetResistance(r) => self.set_resistance(r),
            InductionCommand::SetSpeed(u) => self.set_speed(u),
            InductionCommand::ShowVectors(on) => {
                self.set_show_vectors(on);
                Ok(())
            }
            InductionCommand::ShowCurrentVectors(on) => {
                self.set_show_current_vectors(on);
                Ok(())
            }
            InductionCommand::SetPlotQuantity(q) => {
                self.set_plot_quantity(q);
                Ok(())
            }
            InductionCommand::Transport(t) => t.apply_to(self),
        };
        if let Err(ref e) = result {
            log::warn!("Rejected {:?}: {}", command, e);
        }
        result
    }
}

impl InclineSim {
    pub fn apply(&mut self, command: InclineCommand) -> Result<()> {
        let result = match command {
            InclineCommand::SetAngle(deg) => self.set_angle(deg),
            InclineCommand::SetLength(l) => self.set_length(l),
            InclineCommand::SetMass(m) => self.set_mass(m),
            InclineCommand::SetFrictionCoeff(mu) => self.set_friction_coeff(mu),
            InclineCommand::FrictionOn(on) => {
                self.set_friction_on(on);
                Ok(())
            }
            InclineCommand::SetPushForce(f) => self.set_push_force(f),
            InclineCommand::PushOn(on) => {
                self.set_push_on(on);
                Ok(())
            }
            InclineCommand::ShowVectors(on) => {
                self.set_show_vectors(on);
                Ok(())
            }
            InclineCommand::Transport(t) => t.apply_to(self),
        };
        if let Err(ref e) = result {
            log::warn!("Rejected {:?}: {}", command, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::tick::{RunPhase, Scenario};

    #[test]
    fn test_induction_commands() {
        let settings = Settings::default();
        let mut sim = InductionSim::from_settings(&settings);

        sim.apply(InductionCommand::SetResistance(4.0)).unwrap();
        sim.apply(InductionCommand::TogglePolarity).unwrap();
        sim.apply(InductionCommand::SetPlotQuantity(PlotQuantity::Flux))
            .unwrap();
        assert_eq!(sim.params().resistance, 4.0);
        assert_eq!(sim.params().polarity, Polarity::OutOfPage);
        assert_eq!(sim.history().quantity(), PlotQuantity::Flux);

        assert!(sim.apply(InductionCommand::SetResistance(0.0)).is_err());
        assert_eq!(sim.params().resistance, 4.0);

        sim.apply(InductionCommand::Transport(Transport::TogglePlay))
            .unwrap();
        assert_eq!(sim.phase(), RunPhase::Running);
        sim.apply(InductionCommand::Transport(Transport::ToggleSlowMotion))
            .unwrap();
        assert_eq!(sim.playback().time_scale(), 0.25);
    }

    #[test]
    fn test_incline_commands() {
        let settings = Settings::default();
        let mut sim = InclineSim::from_settings(&settings);

        sim.apply(InclineCommand::SetAngle(45.0)).unwrap();
        sim.apply(InclineCommand::PushOn(true)).unwrap();
        assert_eq!(sim.params().angle_deg, 45.0);
        assert!(sim.params().push_on);

        assert!(sim.apply(InclineCommand::SetAngle(95.0)).is_err());
        assert!(
            sim.apply(InclineCommand::Transport(Transport::SetTimeScale(-1.0)))
                .is_err()
        );

        sim.apply(InclineCommand::Transport(Transport::Play)).unwrap();
        sim.tick(0.03);
        assert!(sim.state().s > 0.0 && sim.state().v > 0.0);
        sim.apply(InclineCommand::Transport(Transport::Reset)).unwrap();
        assert_eq!(sim.phase(), RunPhase::Idle);
        assert_eq!(sim.state().t, 0.0);
        assert_eq!(sim.state().s, 0.0);
        assert_eq!(sim.state().v, 0.0);
        assert_eq!(sim.state().impact, None);

        // Reset after the block has landed
        sim.apply(InclineCommand::Transport(Transport::Play)).unwrap();
        for _ in 0..200 {
            sim.tick(0.03);
        }
        assert_eq!(sim.phase(), RunPhase::Terminal);
        assert!(sim.state().impact.is_some());
        sim.apply(InclineCommand::Transport(Transport::Reset)).unwrap();
        assert_eq!(sim.phase(), RunPhase::Idle);
        assert_eq!((sim.state().t, sim.state().s, sim.state().v), (0.0, 0.0, 0.0));
        assert_eq!(sim.state().impact, None);
    }
}
