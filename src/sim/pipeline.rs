// pipeline.rs - Orchestration pipeline scene
//
// Fixed stages laid out in normalised coordinates, joined by declared
// directed edges drawn as S-curves. Tokens ride the same curves. Stage
// status is scripted; only the running stages' sweep ring moves on its own.

use std::any::Any;
use std::collections::HashMap;
use std::f32::consts::PI;

use super::flow::{Flow, Path};
use super::links::{Link, edge_links};
use super::{Rng, Scene, SceneKind, TimerId, TimerSpec, steps};
use crate::config::{PipelineConfig, Status};
use crate::error::{ConfigError, SceneError};
use crate::render::{Align, Baseline, Family, Font, Frame, Layer, Shape, Stroke, Weight};
use crate::scene::{BORDER, NODE_FILL, TEXT_MUTED, TEXT_SECONDARY};
use crate::surface::SurfaceDims;
use crate::world::{Rgb, Vec2, s_curve};

const EDGE_ALPHA: f32 = 0.8;
const RING_GAP: f32 = 5.0;
const RING_SWEEP: f32 = PI * 1.2;
const LABEL_GAP: f32 = 8.0;

const DONE: Font = Font::new(14.0, Weight::Bold, Family::Sans);
const RUNNING: Font = Font::new(10.0, Weight::Bold, Family::Sans);
const WAITING: Font = Font::new(10.0, Weight::Regular, Family::Sans);
const LABEL: Font = Font::new(10.0, Weight::Medium, Family::Sans);

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub id: String,
    pub label: String,
    /// Normalised [0, 1] layout position.
    pub at: Vec2,
    pub color: Rgb,
    pub status: Status,
}

pub struct PipelineScene {
    stages: Vec<Stage>,
    edges: Vec<(usize, usize)>,
    flow: Flow,
    links: Vec<Link>,
    speed: (f32, f32),
    spawn_ms: u32,
    radius: f32,
    rng: Rng,
    time: f32,
}

impl PipelineScene {
    pub fn new(cfg: PipelineConfig, rng: Rng) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let index: HashMap<&str, usize> =
            cfg.stages.iter().enumerate().map(|(i, s)| (s.id.as_str(), i)).collect();
        let lookup = |edge: usize, id: &str| {
            index.get(id).copied().ok_or_else(|| ConfigError::UnknownNode { edge, id: id.to_string() })
        };
        let edges = cfg
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| -> Result<(usize, usize), ConfigError> { Ok((lookup(i, &e.from)?, lookup(i, &e.to)?)) })
            .collect::<Result<Vec<_>, _>>()?;

        let stages = cfg
            .stages
            .iter()
            .map(|s| Stage {
                id: s.id.clone(),
                label: s.label.clone(),
                at: Vec2::new(s.x, s.y),
                color: s.color,
                status: s.status,
            })
            .collect();

        Ok(Self {
            stages,
            links: Vec::with_capacity(edges.len()),
            edges,
            flow: Flow::new(cfg.token_cap, Path::Curve),
            speed: cfg.token_speed,
            spawn_ms: cfg.spawn_ms,
            radius: cfg.node_radius,
            rng,
            time: 0.0,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Current angle of the running-stage sweep ring.
    pub fn sweep_angle(&self) -> f32 {
        self.time * 2.0
    }

    /// Script a stage's status. A finished stage stays finished; returns
    /// false when the id is unknown or the change would regress from Done.
    pub fn set_status(&mut self, id: &str, status: Status) -> bool {
        match self.stages.iter_mut().find(|s| s.id == id) {
            Some(s) if s.status != Status::Done || status == Status::Done => {
                s.status = status;
                true
            }
            _ => false,
        }
    }

    /// Move a stage one step along its script.
    pub fn advance_stage(&mut self, id: &str) -> Option<Status> {
        let s = self.stages.iter_mut().find(|s| s.id == id)?;
        s.status = s.status.advance();
        Some(s.status)
    }

    #[inline]
    fn place(&self, i: usize, dims: &SurfaceDims) -> Vec2 {
        let at = self.stages[i].at;
        Vec2::new(at.x * dims.width, at.y * dims.height)
    }

    // A random declared edge.
    fn spawn_token(&mut self) {
        if self.edges.is_empty() || !self.flow.has_room() {
            return;
        }
        let (from, to) = self.edges[self.rng.index(self.edges.len())];
        let speed = self.rng.between(self.speed);
        self.flow.try_spawn(from, to, speed, self.stages[from].color);
    }
}

impl Scene for PipelineScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Pipeline
    }

    fn update(&mut self, dt: f32, _dims: &SurfaceDims) -> Result<(), SceneError> {
        self.time += dt;
        self.flow.advance(steps(dt));
        Ok(())
    }

    fn paint(&mut self, dims: &SurfaceDims, frame: &mut Frame) {
        edge_links(&self.edges, EDGE_ALPHA, &mut self.links);
        for l in &self.links {
            let (from, to) = (self.place(l.a, dims), self.place(l.b, dims));
            let (c1, c2) = s_curve(from, to);
            frame.push(Layer::Connections, BORDER.with_alpha(l.alpha), Shape::Curve { from, c1, c2, to, width: 2.0 });
        }

        let f = &self.flow;
        for i in 0..f.n {
            let p = f.position(i, self.place(f.from[i], dims), self.place(f.to[i], dims));
            frame.disc(Layer::Tokens, f.color[i], p, 3.0);
            frame.disc(Layer::Tokens, f.color[i].with_alpha(0.15), p, 8.0);
        }

        let r = self.radius;
        for (i, s) in self.stages.iter().enumerate() {
            let p = self.place(i, dims);

            let node = Shape::Disc { center: p, radius: r, stroke: Some(Stroke { paint: s.color.into(), width: 2.0 }) };
            frame.push(Layer::Entities, NODE_FILL, node);

            if s.status == Status::Running {
                let ring = Shape::Arc {
                    center: p,
                    radius: r + RING_GAP,
                    start: self.sweep_angle(),
                    sweep: RING_SWEEP,
                    width: 2.0,
                    round: false,
                };
                frame.push(Layer::Entities, s.color, ring);
            }

            let (glyph, font, color) = match s.status {
                Status::Done => ("✓", DONE, s.color),
                Status::Running => ("⟳", RUNNING, s.color),
                Status::Waiting => ("○", WAITING, TEXT_MUTED),
            };
            frame.text(color, p, glyph, font, Align::Center, Baseline::Middle);
            frame.text(TEXT_SECONDARY, Vec2::new(p.x, p.y + r + LABEL_GAP), s.label.as_str(), LABEL, Align::Center, Baseline::Top);
        }
    }

    fn timers(&self) -> Vec<TimerSpec> {
        vec![TimerSpec { id: TimerId::Spawn, period_ms: self.spawn_ms }]
    }

    fn on_timer(&mut self, timer: TimerId) {
        if timer == TimerId::Spawn {
            self.spawn_token();
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
