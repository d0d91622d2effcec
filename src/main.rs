//! Phys Lab entry point
//!
//! In the browser, binds the page's sliders and buttons to scenario commands
//! and drives the scenario from `requestAnimationFrame`. Natively, runs both
//! scenarios headless on a synthetic 60 Hz clock and logs the readouts.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_lab {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement,
        HtmlSelectElement,
    };

    use phys_lab::Scheduler;
    use phys_lab::settings::Settings;
    use phys_lab::sim::{
        InclineCommand, InclineSim, InductionCommand, InductionSim, PlotQuantity, Polarity,
        RunPhase, Scenario, TimeSource, Transport,
    };
    use phys_lab::view::{
        Arrow, FrameRect, PlotView, Presenter, RampGeometry, TrackView, incline_arrows,
        induction_arrows,
    };

    /// Wall clock; frames normally pass the rAF timestamp instead
    struct JsClock;

    impl TimeSource for JsClock {
        fn now_ms(&mut self) -> f64 {
            js_sys::Date::now()
        }
    }

    /// Writes readouts into the page and paints the canvas
    struct DomPresenter {
        document: Document,
        ctx: Option<CanvasRenderingContext2d>,
        width: f64,
        height: f64,
    }

    impl DomPresenter {
        fn new(document: Document) -> Self {
            let canvas = document
                .get_element_by_id("simCanvas")
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
            let (ctx, width, height) = match canvas {
                Some(canvas) => {
                    let ctx = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
                    (ctx, canvas.width() as f64, canvas.height() as f64)
                }
                None => {
                    log::warn!("No #simCanvas found, readouts only");
                    (None, 0.0, 0.0)
                }
            };
            Self {
                document,
                ctx,
                width,
                height,
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn sync_transport(&self, phase: RunPhase, slow_motion: bool) {
            let label = if phase == RunPhase::Running { "Pause" } else { "Play" };
            self.set_text("playPauseBtn", label);
            self.set_text("miniPlayBtn", if phase == RunPhase::Running { "Pause" } else { "Start" });
            let slow = format!("Slow motion: {}", if slow_motion { "On" } else { "Off" });
            self.set_text("slowBtn", &slow);
            for id in ["slowBtn", "miniSlowBtn"] {
                if let Some(el) = self.document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("slow-on", slow_motion);
                }
            }
        }
    }

    fn draw_arrows(ctx: &CanvasRenderingContext2d, arrows: &[Arrow]) {
        for arrow in arrows.iter().filter(|a| a.is_visible()) {
            let (from, tip) = (arrow.origin, arrow.tip());
            let [left, right] = arrow.head();
            ctx.set_stroke_style_str(arrow.color);
            ctx.set_fill_style_str(arrow.color);
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.move_to(from.x as f64, from.y as f64);
            ctx.line_to(tip.x as f64, tip.y as f64);
            ctx.stroke();
            ctx.begin_path();
            ctx.move_to(tip.x as f64, tip.y as f64);
            ctx.line_to(left.x as f64, left.y as f64);
            ctx.line_to(right.x as f64, right.y as f64);
            ctx.close_path();
            ctx.fill();
            if !arrow.label.is_empty() && arrow.label != "I" {
                let _ = ctx.fill_text(arrow.label, tip.x as f64 + 6.0, tip.y as f64 - 6.0);
            }
        }
    }

    impl Presenter<InductionSim> for DomPresenter {
        fn present(&mut self, sim: &InductionSim) {
            let p = sim.params();
            let s = sim.state();
            let r = sim.readout();

            self.set_text("bValue", &format!("{:.2}", p.field_strength));
            self.set_text("hValue", &format!("{:.2}", p.height));
            self.set_text("wValue", &format!("{:.2}", p.width));
            self.set_text("rValue", &format!("{:.2}", p.resistance));
            self.set_text("uSetValue", &format!("{:.2}", p.speed));
            self.set_text("tValue", &format!("{:.2}", s.t));
            self.set_text("xValue", &format!("{:.2}", s.x));
            self.set_text("uValue", &format!("{:.2}", s.u));
            self.set_text("phiValue", &format!("{:.3}", r.flux));
            self.set_text("eValue", &format!("{:.2}", r.emf));
            self.set_text("iValue", &format!("{:.2}", r.current));
            self.set_text("currentDirValue", r.direction.as_str());
            self.set_text("fmagValue", &format!("{:.2}", r.force));
            self.set_text("powerValue", &format!("{:.3}", r.power));
            self.set_text("inFieldValue", &format!("{:.2}", r.overlap));
            self.set_text("statusValue", r.status.as_str());
            self.sync_transport(sim.phase(), sim.playback().slow_motion());

            let Some(ctx) = &self.ctx else {
                return;
            };
            let config = sim.config();
            let track = TrackView::new(config.world_left, config.world_right, self.width);
            ctx.clear_rect(0.0, 0.0, self.width, self.height);

            // Field region
            let field = sim.field();
            let (f_left, f_right) = (track.x_to_canvas(field.start), track.x_to_canvas(field.end));
            let (f_top, f_bottom) = (110.0 + 0.2 * 360.0, 110.0 + 0.8 * 360.0);
            ctx.set_fill_style_str("rgba(137, 194, 37, 0.12)");
            ctx.fill_rect(f_left, f_top, f_right - f_left, f_bottom - f_top);

            // Frame
            let center_y = (f_top + f_bottom) / 2.0;
            let frame_h = p.height * track.scale();
            let frame_left = track.x_to_canvas(s.x);
            let frame_w = track.x_to_canvas(s.x + p.width) - frame_left;
            if r.overlap > 0.0 {
                let ox = track.x_to_canvas(s.x.max(field.start));
                ctx.set_fill_style_str("rgba(251, 133, 0, 0.14)");
                ctx.fill_rect(ox, center_y - frame_h / 2.0, track.scale() * r.overlap, frame_h);
            }
            ctx.set_stroke_style_str("#e76f51");
            ctx.set_line_width(6.0);
            ctx.stroke_rect(frame_left, center_y - frame_h / 2.0, frame_w, frame_h);
            let frame = FrameRect {
                min: glam::Vec2::new(frame_left as f32, (center_y - frame_h / 2.0) as f32),
                max: glam::Vec2::new(
                    (frame_left + frame_w) as f32,
                    (center_y + frame_h / 2.0) as f32,
                ),
            };
            draw_arrows(ctx, &induction_arrows(sim, frame));

            ctx.set_fill_style_str("#13233f");
            let label = match p.polarity {
                Polarity::IntoPage => "B into page (×)",
                Polarity::OutOfPage => "B out of page (•)",
            };
            let _ = ctx.fill_text(label, f_left + 8.0, f_top - 16.0);

            // History plot along the bottom
            let history = sim.history();
            if self.height > 560.0 && history.len() > 1 {
                let plot = PlotView {
                    origin: glam::Vec2::new(40.0, (self.height - 140.0) as f32),
                    size: glam::Vec2::new((self.width - 80.0) as f32, 110.0),
                };
                let bounds = history.bounds();
                let t_max = sim.plot_time_max();
                let quantity = history.quantity();
                ctx.set_stroke_style_str("#1d3557");
                ctx.set_line_width(2.0);
                ctx.begin_path();
                for (i, entry) in history.iter().enumerate() {
                    let pt = plot.point(entry.t, quantity.value(entry), t_max, &bounds);
                    if i == 0 {
                        ctx.move_to(pt.x as f64, pt.y as f64);
                    } else {
                        ctx.line_to(pt.x as f64, pt.y as f64);
                    }
                }
                ctx.stroke();
                let _ = ctx.fill_text(
                    &format!("{} ({})", quantity.key(), quantity.unit()),
                    44.0,
                    self.height - 146.0,
                );
            }
        }
    }

    impl Presenter<InclineSim> for DomPresenter {
        fn present(&mut self, sim: &InclineSim) {
            let p = sim.params();
            let s = sim.state();
            let impact = s
                .impact
                .map_or_else(|| "-".to_string(), |i| format!("{:.2} m/s", i.speed));

            self.set_text("angleValue", &format!("{:.0}", p.angle_deg));
            self.set_text("lengthValue", &format!("{:.1}", p.length));
            self.set_text("massValue", &format!("{:.1}", p.mass));
            self.set_text("muValue", &format!("{:.2}", p.friction_coeff));
            self.set_text("forceValue", &format!("{:.1}", p.active_push()));
            for prefix in ["", "ph"] {
                let id = |name: &str| {
                    if prefix.is_empty() {
                        name.to_string()
                    } else {
                        let mut chars = name.chars();
                        let first = chars.next().map(|c| c.to_ascii_uppercase());
                        format!("{}{}{}", prefix, first.unwrap_or_default(), chars.as_str())
                    }
                };
                self.set_text(&id("accelValue"), &format!("{:.2}", s.a));
                self.set_text(&id("velValue"), &format!("{:.2}", s.v));
                self.set_text(&id("dispValue"), &format!("{:.2}", s.s));
                self.set_text(&id("currentHeightValue"), &format!("{:.2}", sim.current_height()));
                self.set_text(&id("heightValue"), &format!("{:.2}", p.ramp_height()));
                self.set_text(&id("impactValue"), &impact);
            }
            self.sync_transport(sim.phase(), sim.playback().slow_motion());

            let Some(ctx) = &self.ctx else {
                return;
            };
            let ramp = RampGeometry::new(p);
            ctx.clear_rect(0.0, 0.0, self.width, self.height);

            ctx.set_stroke_style_str("#8da1ba");
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.move_to(60.0, ramp.start.y as f64);
            ctx.line_to(self.width - 60.0, ramp.start.y as f64);
            ctx.stroke();

            ctx.set_stroke_style_str("#7a8ca5");
            ctx.set_line_width(6.0);
            ctx.begin_path();
            ctx.move_to(ramp.start.x as f64, ramp.start.y as f64);
            ctx.line_to(ramp.end.x as f64, ramp.end.y as f64);
            ctx.stroke();

            let block = ramp.block_center(s.s, p.length);
            ctx.save();
            let _ = ctx.translate(block.x as f64, block.y as f64);
            let _ = ctx.rotate(ramp.tangent.y.atan2(ramp.tangent.x) as f64);
            ctx.set_fill_style_str("#264653");
            ctx.fill_rect(-22.0, -14.0, 44.0, 28.0);
            ctx.restore();
            draw_arrows(ctx, &incline_arrows(sim, &ramp));

            ctx.set_fill_style_str("#0b1d3a");
            let _ = ctx.fill_text(
                &format!("θ = {:.0}°", p.angle_deg),
                ramp.start.x as f64 + 10.0,
                ramp.start.y as f64 - 18.0,
            );
        }
    }

    type Lab<S> = Rc<RefCell<Scheduler<S, JsClock, DomPresenter>>>;

    fn input_value(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    /// Forward a slider's value on every `input` event (and once now)
    fn bind_slider<S>(
        document: &Document,
        id: &str,
        lab: &Lab<S>,
        apply: impl Fn(&mut S, f64) -> phys_lab::Result<()> + 'static,
    )
    where
        S: Scenario + 'static,
        DomPresenter: Presenter<S>,
    {
        let Some(input) = input_value(document, id) else {
            return;
        };
        if let Ok(v) = input.value().parse::<f64>() {
            let _ = apply(lab.borrow_mut().scenario_mut(), v);
        }
        let lab = lab.clone();
        let el = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Ok(v) = el.value().parse::<f64>() {
                let _ = apply(lab.borrow_mut().scenario_mut(), v);
            }
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Forward a checkbox's state on every `change` event (and once now)
    fn bind_toggle<S>(
        document: &Document,
        id: &str,
        lab: &Lab<S>,
        apply: impl Fn(&mut S, bool) -> phys_lab::Result<()> + 'static,
    )
    where
        S: Scenario + 'static,
        DomPresenter: Presenter<S>,
    {
        let Some(input) = input_value(document, id) else {
            return;
        };
        let _ = apply(lab.borrow_mut().scenario_mut(), input.checked());
        let lab = lab.clone();
        let el = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let _ = apply(lab.borrow_mut().scenario_mut(), el.checked());
        });
        let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn bind_button<S>(
        document: &Document,
        id: &str,
        lab: &Lab<S>,
        apply: impl Fn(&mut S) -> phys_lab::Result<()> + 'static,
    )
    where
        S: Scenario + 'static,
        DomPresenter: Presenter<S>,
    {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        let lab = lab.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let _ = apply(lab.borrow_mut().scenario_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn start_induction(document: &Document, settings: &Settings) {
        let sim = InductionSim::from_settings(settings);
        let presenter = DomPresenter::new(document.clone());
        let lab: Lab<InductionSim> =
            Rc::new(RefCell::new(Scheduler::new(sim, JsClock, presenter, &settings.clock)));

        use InductionCommand as C;
        bind_slider(document, "bSlider", &lab, |s, v| s.apply(C::SetFieldStrength(v)));
        bind_slider(document, "hSlider", &lab, |s, v| s.apply(C::SetHeight(v)));
        bind_slider(document, "wSlider", &lab, |s, v| s.apply(C::SetWidth(v)));
        bind_slider(document, "rSlider", &lab, |s, v| s.apply(C::SetResistance(v)));
        bind_slider(document, "uSlider", &lab, |s, v| s.apply(C::SetSpeed(v)));
        bind_toggle(document, "vectorsToggle", &lab, |s, on| s.apply(C::ShowVectors(on)));
        bind_toggle(document, "currentVectorsToggle", &lab, |s, on| {
            s.apply(C::ShowCurrentVectors(on))
        });
        bind_button(document, "bDirBtn", &lab, |s| s.apply(C::TogglePolarity));
        bind_button(document, "playPauseBtn", &lab, |s| {
            s.apply(C::Transport(Transport::TogglePlay))
        });
        bind_button(document, "playBtn", &lab, |s| s.apply(C::Transport(Transport::TogglePlay)));
        bind_button(document, "pauseBtn", &lab, |s| s.apply(C::Transport(Transport::Pause)));
        bind_button(document, "resetBtn", &lab, |s| s.apply(C::Transport(Transport::Reset)));
        bind_button(document, "slowBtn", &lab, |s| {
            s.apply(C::Transport(Transport::ToggleSlowMotion))
        });

        if let Some(select) = document
            .get_element_by_id("plotSelect")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            let lab = lab.clone();
            let el = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                match el.value().parse::<PlotQuantity>() {
                    Ok(q) => {
                        let _ = lab.borrow_mut().scenario_mut().apply(C::SetPlotQuantity(q));
                    }
                    Err(e) => log::warn!("{}", e),
                }
            });
            let _ =
                select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        lab.borrow_mut().scenario_mut().reset();
        log::info!("Induction lab running");
        request_animation_frame(lab);
    }

    fn start_incline(document: &Document, settings: &Settings) {
        let sim = InclineSim::from_settings(settings);
        let presenter = DomPresenter::new(document.clone());
        let lab: Lab<InclineSim> =
            Rc::new(RefCell::new(Scheduler::new(sim, JsClock, presenter, &settings.clock)));

        use InclineCommand as C;
        bind_slider(document, "angleSlider", &lab, |s, v| s.apply(C::SetAngle(v)));
        bind_slider(document, "lengthSlider", &lab, |s, v| s.apply(C::SetLength(v)));
        bind_slider(document, "massSlider", &lab, |s, v| s.apply(C::SetMass(v)));
        bind_slider(document, "muSlider", &lab, |s, v| s.apply(C::SetFrictionCoeff(v)));
        bind_slider(document, "forceSlider", &lab, |s, v| s.apply(C::SetPushForce(v)));
        bind_toggle(document, "frictionToggle", &lab, |s, on| s.apply(C::FrictionOn(on)));
        bind_toggle(document, "forceToggle", &lab, |s, on| s.apply(C::PushOn(on)));
        bind_toggle(document, "vectorsToggle", &lab, |s, on| s.apply(C::ShowVectors(on)));
        bind_button(document, "playBtn", &lab, |s| s.apply(C::Transport(Transport::Play)));
        bind_button(document, "pauseBtn", &lab, |s| s.apply(C::Transport(Transport::Pause)));
        bind_button(document, "resetBtn", &lab, |s| s.apply(C::Transport(Transport::Reset)));
        bind_button(document, "slowBtn", &lab, |s| {
            s.apply(C::Transport(Transport::ToggleSlowMotion))
        });
        bind_button(document, "miniPlayBtn", &lab, |s| {
            s.apply(C::Transport(Transport::TogglePlay))
        });
        bind_button(document, "miniResetBtn", &lab, |s| s.apply(C::Transport(Transport::Reset)));
        bind_button(document, "miniSlowBtn", &lab, |s| {
            s.apply(C::Transport(Transport::ToggleSlowMotion))
        });

        log::info!("Incline lab running");
        request_animation_frame(lab);
    }

    fn request_animation_frame<S>(lab: Lab<S>)
    where
        S: Scenario + 'static,
        DomPresenter: Presenter<S>,
    {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(lab, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop<S>(lab: Lab<S>, time: f64)
    where
        S: Scenario + 'static,
        DomPresenter: Presenter<S>,
    {
        lab.borrow_mut().frame_at(time);
        request_animation_frame(lab);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Phys Lab starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let settings = Settings::default();

        if document.get_element_by_id("bSlider").is_some() {
            start_induction(&document, &settings);
        } else if document.get_element_by_id("angleSlider").is_some() {
            start_incline(&document, &settings);
        } else {
            log::warn!("No scenario controls found on this page");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_lab::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> phys_lab::Result<()> {
    use phys_lab::Scheduler;
    use phys_lab::settings::Settings;
    use phys_lab::sim::{InclineSim, InductionSim, ManualClock, RunPhase};
    use phys_lab::view::LogPresenter;

    env_logger::init();
    log::info!("Phys Lab (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 for the interactive version");

    let settings = match std::env::var_os("PHYS_LAB_CONFIG") {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::default(),
    };
    const MAX_FRAMES: u64 = 60 * 60;

    let mut induction = Scheduler::new(
        InductionSim::from_settings(&settings),
        ManualClock::with_frame_rate(60.0),
        LogPresenter::new(30),
        &settings.clock,
    );
    induction.scenario_mut().play();
    while induction.scenario().phase() == RunPhase::Running && induction.frames() < MAX_FRAMES {
        induction.frame();
    }
    let history = induction.scenario().history();
    let bounds = history.bounds();
    log::info!(
        "Induction run: {} frames, {} samples, {} axis [{:.3}, {:.3}]",
        induction.frames(),
        history.len(),
        history.quantity().key(),
        bounds.min,
        bounds.max
    );

    let mut incline = Scheduler::new(
        InclineSim::from_settings(&settings),
        ManualClock::with_frame_rate(60.0),
        LogPresenter::new(15),
        &settings.clock,
    );
    incline.scenario_mut().play();
    while incline.scenario().phase() == RunPhase::Running && incline.frames() < MAX_FRAMES {
        incline.frame();
    }
    match incline.scenario().state().impact {
        Some(impact) => log::info!(
            "Incline run: impact after {:.2} s at {:.2} m/s",
            impact.time,
            impact.speed
        ),
        None => log::info!("Incline run: block did not reach the bottom"),
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
