//! Deterministic simulation module
//!
//! Both scenarios live here. This module must stay pure:
//! - Time only advances through `Scenario::tick`
//! - Parameters only change through validated setters or commands
//! - No rendering or platform dependencies

pub mod clock;
pub mod command;
pub mod history;
pub mod incline;
pub mod induction;
pub mod tick;

#[cfg(test)]
mod proptests;

pub use clock::{FrameClock, ManualClock, TimeSource};
pub use command::{Controls, InclineCommand, InductionCommand, Transport};
pub use history::{HistoryBuffer, HistoryEntry, PlotBounds, PlotQuantity};
pub use incline::{ForceBreakdown, Impact, InclineParams, InclineSim, InclineState};
pub use induction::{
    CurrentDirection, FieldRegion, FieldStatus, InductionParams, InductionReadout, InductionSim,
    InductionState, Polarity,
};
pub use tick::{Playback, RunPhase, Scenario};
