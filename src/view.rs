//! Presentation seam
//!
//! The simulation exposes plain numbers; a presenter reads them after every
//! frame and draws. This module holds the presenter trait, a logging
//! presenter for headless runs, the world→canvas mappings used by the
//! browser canvas, and the vector arrows drawn on top of each scene.

use glam::Vec2;

use crate::sim::history::PlotBounds;
use crate::sim::incline::{InclineParams, InclineSim};
use crate::sim::induction::{CurrentDirection, InductionSim};
use crate::sim::tick::Scenario;

/// Consumes a scenario's public state once per frame
pub trait Presenter<S> {
    fn present(&mut self, scenario: &S);
}

/// Draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl<S> Presenter<S> for NullPresenter {
    fn present(&mut self, _scenario: &S) {}
}

/// Logs a readout line every `every` frames
#[derive(Debug, Clone)]
pub struct LogPresenter {
    every: u32,
    frames: u32,
}

impl LogPresenter {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    fn due(&mut self) -> bool {
        let due = self.frames % self.every == 0;
        self.frames = self.frames.wrapping_add(1);
        due
    }
}

impl Presenter<InductionSim> for LogPresenter {
    fn present(&mut self, sim: &InductionSim) {
        if !self.due() {
            return;
        }
        let s = sim.state();
        let r = sim.readout();
        log::info!(
            "t={:.2}s x={:.2}m Φ={:.3}Wb E={:.2}V I={:.2}A F={:.2}N [{}; current {}] {:?}",
            s.t,
            s.x,
            r.flux,
            r.emf,
            r.current,
            r.force,
            r.status.as_str(),
            r.direction.as_str(),
            sim.playback().phase(),
        );
    }
}

impl Presenter<InclineSim> for LogPresenter {
    fn present(&mut self, sim: &InclineSim) {
        if !self.due() {
            return;
        }
        let s = sim.state();
        let impact = s
            .impact
            .map_or_else(|| "-".to_string(), |i| format!("{:.2} m/s", i.speed));
        log::info!(
            "t={:.2}s s={:.2}m v={:.2}m/s a={:.2}m/s² h={:.2}m impact={} {:?}",
            s.t,
            s.s,
            s.v,
            s.a,
            sim.current_height(),
            impact,
            sim.playback().phase(),
        );
    }
}

/// Horizontal world→canvas mapping for the induction track
#[derive(Debug, Clone, Copy)]
pub struct TrackView {
    pub world_left: f64,
    pub world_right: f64,
    pub canvas_width: f64,
    /// Margin on both sides (px)
    pub pad: f64,
}

impl TrackView {
    pub fn new(world_left: f64, world_right: f64, canvas_width: f64) -> Self {
        Self {
            world_left,
            world_right,
            canvas_width,
            pad: 70.0,
        }
    }

    pub fn x_to_canvas(&self, x: f64) -> f64 {
        let usable = self.canvas_width - 2.0 * self.pad;
        self.pad + (x - self.world_left) / (self.world_right - self.world_left) * usable
    }

    /// Pixels per meter
    pub fn scale(&self) -> f64 {
        self.x_to_canvas(1.0) - self.x_to_canvas(0.0)
    }
}

/// Ramp drawn from its bottom corner up and to the left
#[derive(Debug, Clone, Copy)]
pub struct RampGeometry {
    pub theta: f32,
    /// Bottom corner
    pub start: Vec2,
    /// Top of the ramp
    pub end: Vec2,
    pub length_px: f32,
    /// Unit vector from top to bottom along the ramp
    pub tangent: Vec2,
    /// Outward unit normal of the ramp surface
    pub normal: Vec2,
}

impl RampGeometry {
    const BOTTOM: Vec2 = Vec2::new(800.0, 440.0);
    const BASE_PX: f32 = 280.0;
    const PX_PER_METER: f32 = 18.0;
    const END_PAD: f32 = 36.0;
    const LIFT: f32 = 18.0;

    pub fn new(params: &InclineParams) -> Self {
        let theta = params.theta() as f32;
        let length_px = Self::BASE_PX + params.length as f32 * Self::PX_PER_METER;
        let tangent = Vec2::new(theta.cos(), theta.sin());
        Self {
            theta,
            start: Self::BOTTOM,
            end: Self::BOTTOM - tangent * length_px,
            length_px,
            tangent,
            normal: Vec2::new(tangent.y, -tangent.x),
        }
    }

    /// Center of the block after sliding `s` of `length` meters
    pub fn block_center(&self, s: f64, length: f64) -> Vec2 {
        let usable = self.length_px - 2.0 * Self::END_PAD;
        let along = Self::END_PAD + (s / length) as f32 * usable;
        self.end + self.tangent * along + self.normal * Self::LIFT
    }
}

/// Maps (t, value) samples into a plot rectangle
#[derive(Debug, Clone, Copy)]
pub struct PlotView {
    pub origin: Vec2,
    pub size: Vec2,
}

impl PlotView {
    pub fn point(&self, t: f64, value: f64, t_max: f64, bounds: &PlotBounds) -> Vec2 {
        let fx = (t / t_max.max(f64::EPSILON)) as f32;
        let fy = bounds.normalize(value) as f32;
        Vec2::new(
            self.origin.x + fx * self.size.x,
            self.origin.y + (1.0 - fy) * self.size.y,
        )
    }
}

/// A labeled vector drawn from `origin` (canvas pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub origin: Vec2,
    pub vector: Vec2,
    pub color: &'static str,
    pub label: &'static str,
}

impl Arrow {
    const HEAD: f32 = 11.0;

    pub fn new(origin: Vec2, vector: Vec2, color: &'static str, label: &'static str) -> Self {
        Self {
            origin,
            vector,
            color,
            label,
        }
    }

    pub fn tip(&self) -> Vec2 {
        self.origin + self.vector
    }

    /// Sub-pixel arrows are skipped
    pub fn is_visible(&self) -> bool {
        self.vector.length() >= 1.0
    }

    /// The two back corners of the arrowhead, 30° either side of the shaft
    pub fn head(&self) -> [Vec2; 2] {
        let back = -self.vector.normalize_or_zero() * Self::HEAD;
        let (sin, cos) = std::f32::consts::FRAC_PI_6.sin_cos();
        let tip = self.tip();
        [
            tip + Vec2::new(back.x * cos - back.y * sin, back.x * sin + back.y * cos),
            tip + Vec2::new(back.x * cos + back.y * sin, -back.x * sin + back.y * cos),
        ]
    }
}

/// Frame outline in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl FrameRect {
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

const CURRENT_COLOR: &str = "#1d3557";
const CURRENT_LEN: f32 = 48.0;

/// Velocity, magnetic braking force and circulating current arrows,
/// each group gated by its display toggle
pub fn induction_arrows(sim: &InductionSim, frame: FrameRect) -> Vec<Arrow> {
    let params = sim.params();
    let readout = sim.readout();
    let FrameRect { min, max } = frame;
    let mut arrows = Vec::new();

    if params.show_current_vectors {
        let (top, bottom) = (min.y - 10.0, max.y + 10.0);
        let sides = match readout.direction {
            CurrentDirection::Clockwise => Some([
                (Vec2::new(min.x + 10.0, top), Vec2::X),
                (Vec2::new(max.x + 10.0, min.y + 10.0), Vec2::Y),
                (Vec2::new(max.x - 10.0, bottom), Vec2::NEG_X),
                (Vec2::new(min.x - 10.0, max.y - 10.0), Vec2::NEG_Y),
            ]),
            CurrentDirection::CounterClockwise => Some([
                (Vec2::new(max.x - 10.0, top), Vec2::NEG_X),
                (Vec2::new(min.x - 10.0, min.y + 10.0), Vec2::Y),
                (Vec2::new(min.x + 10.0, bottom), Vec2::X),
                (Vec2::new(max.x + 10.0, max.y - 10.0), Vec2::NEG_Y),
            ]),
            CurrentDirection::None => None,
        };
        arrows.extend(
            sides
                .into_iter()
                .flatten()
                .map(|(origin, dir)| Arrow::new(origin, dir * CURRENT_LEN, CURRENT_COLOR, "I")),
        );
    }

    if params.show_vectors {
        let center = frame.center();
        arrows.push(Arrow::new(
            Vec2::new(max.x + 20.0, center.y + 8.0),
            Vec2::new(72.0, 0.0),
            "#f77f00",
            "υ",
        ));
        // Braking force opposes the motion
        if readout.force > 1e-4 {
            arrows.push(Arrow::new(
                center + Vec2::new(0.0, 30.0),
                Vec2::new(-60.0, 0.0),
                "#457b9d",
                "F",
            ));
        }
    }
    arrows
}

/// Force vectors on the block, scaled by newtons and mass
pub fn incline_arrows(sim: &InclineSim, ramp: &RampGeometry) -> Vec<Arrow> {
    let params = sim.params();
    if !params.show_vectors {
        return Vec::new();
    }
    let f = sim.forces();
    let scale = 1.15 * params.mass as f32 / 2.0;
    let at = ramp.block_center(sim.state().s, params.length);
    let (t, n) = (ramp.tangent, ramp.normal);

    let mut arrows = vec![
        Arrow::new(at, Vec2::Y * f.weight as f32 * scale, "#d90429", "mg"),
        Arrow::new(at, n * f.normal as f32 * scale, "#1d3557", "N"),
        Arrow::new(at, t * f.weight_along as f32 * scale, "#2a9d8f", "mg sinθ"),
        Arrow::new(at, -n * f.weight_across as f32 * scale, "#6c757d", "mg cosθ"),
    ];
    if f.friction > 0.0 {
        arrows.push(Arrow::new(at, -t * f.friction as f32 * scale, "#f4a261", "T"));
    }
    if f.push > 0.0 {
        arrows.push(Arrow::new(at, Vec2::NEG_X * f.push as f32 * scale, "#7b2cbf", "F"));
    }
    arrows
}
