// lib.rs - Animated canvas scenes for a landing page
//
// The core (sim, scheduler, render) is host independent and produces a
// display list per frame. The web module binds it to canvas elements.

pub mod config;
pub mod error;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod sim;
pub mod surface;
pub mod world;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::SceneConfig;
pub use error::{ConfigError, EngineError, SceneError};
pub use render::Frame;
pub use scheduler::{Activation, Scheduler, SlotState};
pub use sim::{Scene, SceneKind};
pub use surface::{Sizing, SurfaceDims};

#[cfg(target_arch = "wasm32")]
pub use web::Engine;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}
