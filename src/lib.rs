//! Phys Lab - interactive physics demonstrations
//!
//! Two scenarios share one frame-driven architecture:
//! - Induction: a conducting frame crossing a magnetic field at constant speed
//! - Incline: a block sliding down a ramp with optional friction and push
//!
//! Core modules:
//! - `sim`: Deterministic simulation (models, integrators, history, commands)
//! - `scheduler`: Per-frame driver with an injectable clock
//! - `view`: Presentation seam and canvas coordinate mapping
//! - `settings`: Scenario constants and initial parameters

pub mod error;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod view;

pub use error::{Result, SimError};
pub use scheduler::Scheduler;
pub use settings::Settings;
