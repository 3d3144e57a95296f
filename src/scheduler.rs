// scheduler.rs - Render scheduler
//
// One slot per activated scene. Each host animation tick runs the scene's
// update then paint into the slot's frame. A scene that faults is suspended
// on the spot; the others keep running.
//
// Slot lifecycle:
//   (none) --activate--> Active --fault--> Suspended
//                        Active | Suspended --stop--> Stopped
// Activating a kind that already has a slot is a no-op.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, trace, warn};

use crate::config::SceneConfig;
use crate::error::{EngineError, SceneError};
use crate::render::Frame;
use crate::sim::{self, MAX_DT, Rng, Scene, SceneKind, TimerId, TimerSpec};
use crate::surface::SurfaceDims;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Active,
    Suspended,
    Stopped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The scene was built; the host should start these timers.
    Started(Vec<TimerSpec>),
    /// The scene was already activated; nothing changed.
    AlreadyActive,
}

struct Slot {
    scene: Box<dyn Scene>,
    state: SlotState,
    frame: Frame,
    ticks: u64,
}

pub struct Scheduler {
    slots: BTreeMap<SceneKind, Slot>,
    rng: Rng,
}

impl Scheduler {
    pub fn new(rng: Rng) -> Self {
        Self { slots: BTreeMap::new(), rng }
    }

    /// Build and start the scene described by `config`.
    pub fn activate(&mut self, config: SceneConfig, dims: &SurfaceDims) -> Result<Activation, EngineError> {
        let kind = config.kind();
        if self.slots.contains_key(&kind) {
            debug!(scene = %kind, "activation ignored, already activated");
            return Ok(Activation::AlreadyActive);
        }

        let scene = sim::build(config, dims, self.rng.fork())?;
        let timers = scene.timers();
        self.slots.insert(kind, Slot { scene, state: SlotState::Active, frame: Frame::new(), ticks: 0 });

        info!(scene = %kind, width = dims.width, height = dims.height, timers = timers.len(), "scene activated");
        Ok(Activation::Started(timers))
    }

    pub fn state(&self, kind: SceneKind) -> Option<SlotState> {
        self.slots.get(&kind).map(|s| s.state)
    }

    pub fn is_running(&self, kind: SceneKind) -> bool {
        self.state(kind) == Some(SlotState::Active)
    }

    /// Kinds that still want animation ticks.
    pub fn running(&self) -> impl Iterator<Item = SceneKind> + '_ {
        self.slots.iter().filter(|(_, s)| s.state == SlotState::Active).map(|(k, _)| *k)
    }

    pub fn any_running(&self) -> bool {
        self.running().next().is_some()
    }

    /// Run one update-then-paint cycle for `kind`. Returns the finished
    /// frame, or None when the scene is not running (or just faulted).
    pub fn tick(&mut self, kind: SceneKind, dt: f32, dims: &SurfaceDims) -> Option<&Frame> {
        let slot = self.slots.get_mut(&kind)?;
        if slot.state != SlotState::Active {
            return None;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        let (scene, frame) = (&mut slot.scene, &mut slot.frame);

        let result = guard(|| {
            scene.update(dt, dims)?;
            frame.clear(dims.width, dims.height);
            scene.paint(dims, frame);
            Ok(())
        });

        if let Err(e) = result {
            warn!(scene = %kind, error = %e, "scene suspended");
            slot.state = SlotState::Suspended;
            return None;
        }

        slot.frame.finish();
        slot.ticks += 1;
        trace!(scene = %kind, dt, cmds = slot.frame.len(), "tick");
        Some(&slot.frame)
    }

    /// Deliver a timer firing. Ignored unless the scene is running.
    pub fn fire(&mut self, kind: SceneKind, timer: TimerId) {
        let Some(slot) = self.slots.get_mut(&kind) else { return };
        if slot.state != SlotState::Active {
            return;
        }

        let scene = &mut slot.scene;
        if let Err(e) = guard(|| {
            scene.on_timer(timer);
            Ok(())
        }) {
            warn!(scene = %kind, ?timer, error = %e, "scene suspended");
            slot.state = SlotState::Suspended;
        }
    }

    /// Suspend a running scene after a fault outside its own tick, such
    /// as the host failing to draw its frame.
    pub fn suspend(&mut self, kind: SceneKind) -> bool {
        match self.slots.get_mut(&kind) {
            Some(slot) if slot.state == SlotState::Active => {
                slot.state = SlotState::Suspended;
                warn!(scene = %kind, "scene suspended by host");
                true
            }
            _ => false,
        }
    }

    /// Stop a scene for good. Returns false if it was never activated or
    /// is already stopped.
    pub fn stop(&mut self, kind: SceneKind) -> bool {
        match self.slots.get_mut(&kind) {
            Some(slot) if slot.state != SlotState::Stopped => {
                slot.state = SlotState::Stopped;
                slot.frame.clear(0.0, 0.0);
                info!(scene = %kind, ticks = slot.ticks, "scene stopped");
                true
            }
            _ => false,
        }
    }

    /// Forget a scene entirely, so it can be activated again. Used to back
    /// out an activation the host could not finish wiring up.
    pub fn remove(&mut self, kind: SceneKind) -> bool {
        let removed = self.slots.remove(&kind).is_some();
        if removed {
            debug!(scene = %kind, "scene removed");
        }
        removed
    }

    pub fn stop_all(&mut self) {
        let kinds: Vec<SceneKind> = self.slots.keys().copied().collect();
        for kind in kinds {
            self.stop(kind);
        }
    }

    /// Typed access to a scene, for scripted changes from the host.
    pub fn scene_mut<T: Scene + 'static>(&mut self, kind: SceneKind) -> Option<&mut T> {
        let slot = self.slots.get_mut(&kind)?;
        if slot.state == SlotState::Stopped {
            return None;
        }
        slot.scene.as_any_mut().downcast_mut::<T>()
    }
}

// Run one step of a scene, turning a panic into a SceneError.
fn guard(f: impl FnOnce() -> Result<(), SceneError>) -> Result<(), SceneError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(r) => r,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic".into());
            Err(SceneError::Panicked(msg))
        }
    }
}
