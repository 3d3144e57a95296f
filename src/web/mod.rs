// web/ - Browser host: canvas surfaces, frame loop and timers
//
// Everything here is a thin shell over the Scheduler. The frame loop
// runs while at least one scene is active and stops itself otherwise.

mod canvas;
mod surface;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::config::{FileTreeConfig, GridConfig, NetworkConfig, PipelineConfig, SceneConfig, Status};
use crate::error::EngineError;
use crate::scheduler::{Activation, Scheduler};
use crate::sim::{PipelineScene, Rng, SceneKind, TICK_SECONDS, TimerId, TimerSpec};

use surface::CanvasSurface;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Repeating intervals owned by one scene; cleared on drop.
struct Intervals(Vec<(i32, Closure<dyn FnMut()>)>);

impl Intervals {
    fn start(rt: Weak<RefCell<Runtime>>, kind: SceneKind, specs: &[TimerSpec]) -> Result<Self, EngineError> {
        let window = window()?;
        let mut handles = Vec::with_capacity(specs.len());

        for spec in specs {
            let rt = rt.clone();
            let timer: TimerId = spec.id;
            let cb = Closure::<dyn FnMut()>::new(move || {
                let Some(rt) = rt.upgrade() else { return };
                let Ok(mut rt) = rt.try_borrow_mut() else { return };
                rt.scheduler.fire(kind, timer);
            });
            let handle = window
                .set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), spec.period_ms as i32)
                .map_err(js_err)?;
            debug!(scene = %kind, ?timer, period_ms = spec.period_ms, "interval started");
            handles.push((handle, cb));
        }
        Ok(Self(handles))
    }
}

impl Drop for Intervals {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            for (handle, _) in &self.0 {
                window.clear_interval_with_handle(*handle);
            }
        }
    }
}

struct Runtime {
    scheduler: Scheduler,
    surfaces: BTreeMap<SceneKind, CanvasSurface>,
    intervals: BTreeMap<SceneKind, Intervals>,
    last: Option<f64>,
}

impl Runtime {
    /// One animation frame at host timestamp `ts` (milliseconds).
    fn frame(&mut self, ts: f64) {
        let dt = match self.last {
            Some(last) => ((ts - last) / 1000.0) as f32,
            None => TICK_SECONDS,
        };
        self.last = Some(ts);

        let kinds: Vec<SceneKind> = self.scheduler.running().collect();
        for kind in kinds {
            let Some(surface) = self.surfaces.get(&kind) else { continue };
            let dims = surface.dims();
            let Some(frame) = self.scheduler.tick(kind, dt, &dims) else { continue };

            if let Err(e) = canvas::replay(surface.ctx(), frame) {
                warn!(scene = %kind, error = ?e, "draw failed");
                self.scheduler.suspend(kind);
            }
        }
    }

    /// Keep the surface and intervals of a freshly activated scene. If the
    /// intervals could not be started the activation is undone.
    fn commit(
        &mut self,
        kind: SceneKind,
        surface: CanvasSurface,
        intervals: Result<Intervals, EngineError>,
    ) -> Result<(), EngineError> {
        match intervals {
            Ok(intervals) => {
                self.surfaces.insert(kind, surface);
                self.intervals.insert(kind, intervals);
                Ok(())
            }
            Err(e) => {
                warn!(scene = %kind, error = %e, "activation rolled back");
                self.scheduler.remove(kind);
                Err(e)
            }
        }
    }

    fn release(&mut self, kind: SceneKind) {
        self.intervals.remove(&kind);
        self.surfaces.remove(&kind);
    }
}

/// The page-facing engine. One instance drives every scene on a page.
#[wasm_bindgen]
pub struct Engine {
    rt: Rc<RefCell<Runtime>>,
    frame_loop: Rc<RefCell<Option<FrameCallback>>>,
    pending: Rc<Cell<Option<i32>>>,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        let rt = Runtime {
            scheduler: Scheduler::new(Rng::from_host()),
            surfaces: BTreeMap::new(),
            intervals: BTreeMap::new(),
            last: None,
        };
        Engine {
            rt: Rc::new(RefCell::new(rt)),
            frame_loop: Rc::new(RefCell::new(None)),
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Start `scene` on `canvas` with its default configuration. A
    /// missing canvas is not an error; the scene simply does not run.
    pub fn activate(&mut self, scene: &str, canvas: Option<HtmlCanvasElement>) -> Result<(), JsError> {
        Ok(self.start(scene, canvas, JsValue::UNDEFINED)?)
    }

    /// Like `activate`, with a configuration object for that scene.
    #[wasm_bindgen(js_name = activateWith)]
    pub fn activate_with(&mut self, scene: &str, canvas: Option<HtmlCanvasElement>, config: JsValue) -> Result<(), JsError> {
        Ok(self.start(scene, canvas, config)?)
    }

    /// Step a pipeline stage to its next status and return the new status.
    #[wasm_bindgen(js_name = advanceStage)]
    pub fn advance_stage(&mut self, stage: &str) -> Option<String> {
        let mut rt = self.rt.borrow_mut();
        let scene = rt.scheduler.scene_mut::<PipelineScene>(SceneKind::Pipeline)?;
        let status = scene.advance_stage(stage)?;
        info!(stage, ?status, "stage advanced");
        Some(
            match status {
                Status::Waiting => "waiting",
                Status::Running => "running",
                Status::Done => "done",
            }
            .to_string(),
        )
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self, scene: &str) -> bool {
        scene.parse::<SceneKind>().is_ok_and(|kind| self.rt.borrow().scheduler.is_running(kind))
    }

    /// Stop one scene and release its canvas and timers.
    pub fn stop(&mut self, scene: &str) -> Result<bool, JsError> {
        let kind: SceneKind = scene.parse().map_err(EngineError::from)?;
        let mut rt = self.rt.borrow_mut();
        let stopped = rt.scheduler.stop(kind);
        rt.release(kind);
        Ok(stopped)
    }

    /// Stop everything and break the frame loop.
    pub fn dispose(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.frame_loop.borrow_mut().take();

        if let Ok(mut rt) = self.rt.try_borrow_mut() {
            rt.scheduler.stop_all();
            rt.intervals.clear();
            rt.surfaces.clear();
            rt.last = None;
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Engine {
    fn start(&mut self, scene: &str, canvas: Option<HtmlCanvasElement>, config: JsValue) -> Result<(), EngineError> {
        let kind: SceneKind = scene.parse()?;
        let Some(canvas) = canvas else {
            info!(scene = %kind, "no canvas, scene skipped");
            return Ok(());
        };

        {
            let mut rt = self.rt.borrow_mut();
            if rt.scheduler.state(kind).is_some() {
                debug!(scene = %kind, "already activated");
                return Ok(());
            }

            let config = parse_config(kind, config)?;
            let surface = CanvasSurface::attach(canvas, kind.sizing())?;

            if let Activation::Started(timers) = rt.scheduler.activate(config, &surface.dims())? {
                let intervals = Intervals::start(Rc::downgrade(&self.rt), kind, &timers);
                rt.commit(kind, surface, intervals)?;
            }
        }

        self.ensure_loop()
    }

    // Request the next frame unless one is already pending.
    fn ensure_loop(&mut self) -> Result<(), EngineError> {
        if self.pending.get().is_some() {
            return Ok(());
        }

        if self.frame_loop.borrow().is_none() {
            let rt = Rc::downgrade(&self.rt);
            let frame_loop = Rc::downgrade(&self.frame_loop);
            let pending = self.pending.clone();

            let cb = FrameCallback::new(move |ts: f64| {
                pending.set(None);
                let (Some(rt), Some(frame_loop)) = (rt.upgrade(), frame_loop.upgrade()) else { return };

                let more = match rt.try_borrow_mut() {
                    Ok(mut rt) => {
                        rt.frame(ts);
                        rt.scheduler.any_running()
                    }
                    Err(_) => true,
                };

                if more {
                    if let Some(cb) = frame_loop.borrow().as_ref() {
                        match request_frame(cb) {
                            Ok(id) => pending.set(Some(id)),
                            Err(e) => warn!(error = %e, "frame loop stopped"),
                        }
                    }
                } else {
                    debug!("frame loop idle");
                    if let Ok(mut rt) = rt.try_borrow_mut() {
                        rt.last = None;
                    }
                }
            });
            *self.frame_loop.borrow_mut() = Some(cb);
        }

        if let Some(cb) = self.frame_loop.borrow().as_ref() {
            self.pending.set(Some(request_frame(cb)?));
        }
        Ok(())
    }
}

fn parse_config(kind: SceneKind, value: JsValue) -> Result<SceneConfig, EngineError> {
    if value.is_undefined() || value.is_null() {
        return Ok(SceneConfig::default_for(kind));
    }

    let bad = |e: serde_wasm_bindgen::Error| EngineError::BadConfig { scene: kind.name(), reason: e.to_string() };
    Ok(match kind {
        SceneKind::Network => SceneConfig::Network(serde_wasm_bindgen::from_value::<NetworkConfig>(value).map_err(bad)?),
        SceneKind::FileTree => SceneConfig::FileTree(serde_wasm_bindgen::from_value::<FileTreeConfig>(value).map_err(bad)?),
        SceneKind::Pipeline => SceneConfig::Pipeline(serde_wasm_bindgen::from_value::<PipelineConfig>(value).map_err(bad)?),
        SceneKind::Grid => SceneConfig::Grid(serde_wasm_bindgen::from_value::<GridConfig>(value).map_err(bad)?),
    })
}

fn request_frame(cb: &FrameCallback) -> Result<i32, EngineError> {
    window()?.request_animation_frame(cb.as_ref().unchecked_ref()).map_err(js_err)
}

fn window() -> Result<web_sys::Window, EngineError> {
    web_sys::window().ok_or_else(|| EngineError::Surface("no window".into()))
}

fn js_err(e: JsValue) -> EngineError {
    EngineError::Surface(format!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document.create_element("canvas").unwrap().dyn_into::<HtmlCanvasElement>().unwrap();
        document.body().unwrap().append_child(&canvas).unwrap();
        canvas
    }

    // Resolves on the animation frame after every frame already requested.
    async fn next_frame() {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window().unwrap().request_animation_frame(&resolve).unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }

    #[wasm_bindgen_test]
    fn missing_canvas_is_skipped() {
        let mut engine = Engine::new();
        assert!(engine.activate("hero", None).is_ok());
        assert!(!engine.is_running("hero"));
        assert!(engine.pending.get().is_none());
        assert!(engine.rt.borrow().surfaces.is_empty());
    }

    #[wasm_bindgen_test]
    fn unknown_scene_is_rejected() {
        let mut engine = Engine::new();
        let err = engine.start("testViz", Some(canvas()), JsValue::UNDEFINED).unwrap_err();
        assert!(matches!(err, EngineError::UnknownScene(_)));
    }

    #[wasm_bindgen_test]
    fn surface_is_sized_on_attach() {
        let c = canvas();
        let surface = CanvasSurface::attach(c.clone(), SceneKind::Network.sizing()).unwrap();
        let d = surface.dims();
        assert!(d.width > 0.0);
        assert_eq!(c.width(), d.pixel_width);
        assert_eq!(c.height(), d.pixel_height);

        drop(surface);
        // The listener is gone, so a resize after drop must not reach it.
        let resize = web_sys::Event::new("resize").unwrap();
        assert!(web_sys::window().unwrap().dispatch_event(&resize).is_ok());
    }

    #[wasm_bindgen_test]
    fn second_activation_is_a_no_op() {
        let mut engine = Engine::new();
        engine.start("network", Some(canvas()), JsValue::UNDEFINED).unwrap();
        engine.start("heroCanvas", Some(canvas()), JsValue::UNDEFINED).unwrap();

        let rt = engine.rt.borrow();
        assert_eq!(rt.surfaces.len(), 1);
        assert_eq!(rt.intervals.get(&SceneKind::Network).map(|i| i.0.len()), Some(1));
    }

    #[wasm_bindgen_test]
    fn stop_releases_timers_and_surface() {
        let mut engine = Engine::new();
        engine.start("network", Some(canvas()), JsValue::UNDEFINED).unwrap();
        assert!(engine.is_running("network"));
        assert!(engine.pending.get().is_some());

        assert!(matches!(engine.stop("network"), Ok(true)));
        assert!(!engine.is_running("network"));
        let rt = engine.rt.borrow();
        assert!(rt.intervals.is_empty());
        assert!(rt.surfaces.is_empty());
    }

    #[wasm_bindgen_test]
    fn bad_config_object_is_rejected() {
        let mut engine = Engine::new();
        let config = JsValue::from_str("not an object");
        let err = engine.start("grid", Some(canvas()), config).unwrap_err();
        assert!(matches!(err, EngineError::BadConfig { scene: "grid", .. }));
        assert!(!engine.is_running("grid"));
    }

    #[wasm_bindgen_test]
    fn failed_timers_roll_back_activation() {
        let mut engine = Engine::new();
        {
            let mut rt = engine.rt.borrow_mut();
            let surface = CanvasSurface::attach(canvas(), SceneKind::Network.sizing()).unwrap();
            rt.scheduler.activate(SceneConfig::default_for(SceneKind::Network), &surface.dims()).unwrap();

            let refused = Err(EngineError::Surface("interval refused".into()));
            assert!(rt.commit(SceneKind::Network, surface, refused).is_err());
            assert_eq!(rt.scheduler.state(SceneKind::Network), None);
            assert!(!rt.scheduler.any_running());
            assert!(rt.surfaces.is_empty() && rt.intervals.is_empty());
        }

        engine.start("network", Some(canvas()), JsValue::UNDEFINED).unwrap();
        assert!(engine.is_running("network"));
    }

    #[wasm_bindgen_test]
    async fn frame_loop_idles_when_nothing_runs() {
        let mut engine = Engine::new();
        engine.start("scale", Some(canvas()), JsValue::UNDEFINED).unwrap();

        next_frame().await;
        assert!(engine.pending.get().is_some());

        engine.stop("scale").unwrap();
        next_frame().await;
        assert!(engine.pending.get().is_none());
    }

    #[wasm_bindgen_test]
    fn dispose_leaves_nothing_running() {
        let mut engine = Engine::new();
        engine.start("network", Some(canvas()), JsValue::UNDEFINED).unwrap();
        engine.start("pipeline", Some(canvas()), JsValue::UNDEFINED).unwrap();

        engine.dispose();
        assert!(!engine.is_running("network"));
        assert!(!engine.is_running("pipeline"));
        assert!(engine.pending.get().is_none());
        assert!(engine.frame_loop.borrow().is_none());
        let rt = engine.rt.borrow();
        assert!(rt.intervals.is_empty() && rt.surfaces.is_empty());
    }
}
