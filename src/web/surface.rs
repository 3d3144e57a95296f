// surface.rs - Canvas element binding
//
// Sizes the canvas backing store from its parent's layout box and the
// device pixel ratio, and keeps doing so on window resize until dropped.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::EngineError;
use crate::surface::{Sizing, SurfaceDims};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    dims: Rc<Cell<SurfaceDims>>,
    on_resize: Closure<dyn FnMut()>,
}

impl CanvasSurface {
    pub fn attach(canvas: HtmlCanvasElement, sizing: Sizing) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| EngineError::Surface(format!("{e:?}")))?
            .ok_or_else(|| EngineError::Surface("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::Surface("context is not 2d".into()))?;

        let dims = Rc::new(Cell::new(fit(&canvas, &ctx, sizing)));

        let on_resize = {
            let (ctx, dims) = (ctx.clone(), dims.clone());
            Closure::<dyn FnMut()>::new(move || dims.set(fit(&canvas, &ctx, sizing)))
        };

        let window = web_sys::window().ok_or_else(|| EngineError::Surface("no window".into()))?;
        window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|e| EngineError::Surface(format!("{e:?}")))?;

        Ok(Self { ctx, dims, on_resize })
    }

    pub fn dims(&self) -> SurfaceDims {
        self.dims.get()
    }

    pub fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
        }
    }
}

// Resolve and apply the surface size. Resetting the canvas width also
// resets its transform, so the density scale is reapplied every time.
fn fit(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, sizing: Sizing) -> SurfaceDims {
    let container = canvas
        .parent_element()
        .map(|p| p.get_bounding_client_rect().width())
        .unwrap_or_else(|| canvas.client_width() as f64);
    let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());

    let d = sizing.resolve(container as f32, dpr as f32);
    canvas.set_width(d.pixel_width);
    canvas.set_height(d.pixel_height);

    let style = canvas.style();
    let _ = style.set_property("width", &format!("{}px", d.width));
    let _ = style.set_property("height", &format!("{}px", d.height));

    let s = d.dpr as f64;
    let _ = ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0);

    debug!(width = d.width, height = d.height, dpr = d.dpr, "surface resized");
    d
}
