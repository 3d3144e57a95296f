// sim/ - Scene simulations
//
// Each scene owns its entities, its random stream and its tokens; nothing
// is shared between scenes. One tick is update (move entities, advance and
// retire tokens) followed by paint (resolve links, then draw).

mod flow;
mod grid;
mod links;
mod network;
mod pipeline;
mod reveal;
mod rng;

pub use flow::{Flow, Path};
pub use grid::{Cell, Cells, GridScene};
pub use links::{Link, edge_links, grid_links, proximity_links};
pub use network::{Agents, NetworkScene};
pub use pipeline::{PipelineScene, Stage};
pub use reveal::{RevealScene, Row};
pub use rng::Rng;

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use crate::config::SceneConfig;
use crate::error::{ConfigError, EngineError, SceneError};
use crate::render::Frame;
use crate::surface::{Sizing, SurfaceDims};

// Capacity limits
pub const MAX_AGENTS: usize = 64;
pub const MAX_TOKENS: usize = 32;

/// Nominal tick length. Per-tick speeds are expressed against it.
pub const TICK_SECONDS: f32 = 0.016;
/// Longest step a single tick may take; a throttled host slows the
/// animation down rather than making it jump.
pub const MAX_DT: f32 = 0.1;

/// How many nominal ticks `dt` seconds are worth.
#[inline]
pub fn steps(dt: f32) -> f32 {
    dt / TICK_SECONDS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SceneKind {
    Network,
    FileTree,
    Pipeline,
    Grid,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [SceneKind::Network, SceneKind::FileTree, SceneKind::Pipeline, SceneKind::Grid];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Network => "network",
            SceneKind::FileTree => "file-tree",
            SceneKind::Pipeline => "pipeline",
            SceneKind::Grid => "grid",
        }
    }

    /// How the scene's surface is sized from its container.
    pub fn sizing(self) -> Sizing {
        match self {
            SceneKind::Network => Sizing::Aspect { width: 700.0, height: 500.0 },
            SceneKind::FileTree => Sizing::FixedHeight(280.0),
            SceneKind::Pipeline => Sizing::Aspect { width: 840.0, height: 320.0 },
            SceneKind::Grid => Sizing::Aspect { width: 480.0, height: 380.0 },
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = EngineError;

    /// Accepts the scene names and the page's element ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" | "hero" | "heroCanvas" => Ok(SceneKind::Network),
            "file-tree" | "fileTreeCanvas" => Ok(SceneKind::FileTree),
            "pipeline" | "orchestration" | "orchestrationCanvas" => Ok(SceneKind::Pipeline),
            "grid" | "scale" | "scaleCanvas" => Ok(SceneKind::Grid),
            _ => Err(EngineError::UnknownScene(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Try to launch a token.
    Spawn,
    /// Reveal the next row.
    Reveal,
}

/// A fixed-period timer a scene wants, independent of the render tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSpec {
    pub id: TimerId,
    pub period_ms: u32,
}

pub trait Scene {
    fn kind(&self) -> SceneKind;

    /// Advance the simulation by `dt` seconds.
    fn update(&mut self, dt: f32, dims: &SurfaceDims) -> Result<(), SceneError>;

    /// Resolve links and append this tick's drawing to `frame`.
    fn paint(&mut self, dims: &SurfaceDims, frame: &mut Frame);

    fn timers(&self) -> Vec<TimerSpec> {
        Vec::new()
    }

    fn on_timer(&mut self, _timer: TimerId) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Validate `config` and build its scene.
pub fn build(config: SceneConfig, dims: &SurfaceDims, rng: Rng) -> Result<Box<dyn Scene>, ConfigError> {
    config.validate()?;
    Ok(match config {
        SceneConfig::Network(c) => Box::new(NetworkScene::new(c, dims, rng)?),
        SceneConfig::FileTree(c) => Box::new(RevealScene::new(c)),
        SceneConfig::Pipeline(c) => Box::new(PipelineScene::new(c, rng)?),
        SceneConfig::Grid(c) => Box::new(GridScene::new(c, rng)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_ids() {
        assert_eq!("heroCanvas".parse::<SceneKind>().unwrap(), SceneKind::Network);
        assert_eq!("fileTreeCanvas".parse::<SceneKind>().unwrap(), SceneKind::FileTree);
        assert_eq!("orchestration".parse::<SceneKind>().unwrap(), SceneKind::Pipeline);
        assert_eq!("scale".parse::<SceneKind>().unwrap(), SceneKind::Grid);
        assert!(matches!("testViz".parse::<SceneKind>(), Err(EngineError::UnknownScene(_))));
        for k in SceneKind::ALL {
            assert_eq!(k.name().parse::<SceneKind>().unwrap(), k);
        }
    }

    #[test]
    fn builds_every_kind() {
        let dims = SurfaceDims::logical(600.0, 300.0);
        let mut rng = Rng::new(1);
        for kind in SceneKind::ALL {
            let scene = build(SceneConfig::default_for(kind), &dims, rng.fork()).unwrap();
            assert_eq!(scene.kind(), kind);
        }
    }

    #[test]
    fn timers_per_scene() {
        let dims = SurfaceDims::logical(600.0, 300.0);
        let timers = |k| build(SceneConfig::default_for(k), &dims, Rng::new(1)).unwrap().timers();
        assert_eq!(timers(SceneKind::Network), [TimerSpec { id: TimerId::Spawn, period_ms: 400 }]);
        assert_eq!(timers(SceneKind::Pipeline), [TimerSpec { id: TimerId::Spawn, period_ms: 500 }]);
        assert_eq!(timers(SceneKind::FileTree), [TimerSpec { id: TimerId::Reveal, period_ms: 600 }]);
        assert!(timers(SceneKind::Grid).is_empty());
    }
}
