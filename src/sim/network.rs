// network.rs - Particle network scene
//
// Agents drift with a little random jitter and bounce off a margin inset.
// Nearby agents are linked; tokens hop between random pairs in straight lines.

use std::any::Any;
use std::f32::consts::TAU;

use super::flow::{Flow, Path};
use super::links::{Link, proximity_links};
use super::{MAX_AGENTS, Rng, Scene, SceneKind, TimerId, TimerSpec, steps};
use crate::config::NetworkConfig;
use crate::error::{ConfigError, SceneError};
use crate::render::{Frame, Layer, Shape};
use crate::scene::{BORDER, PRIMARY};
use crate::surface::SurfaceDims;
use crate::world::{Rgb, Vec2};

// Layout used when the surface has not been laid out yet.
const DESIGN_W: f32 = 700.0;
const DESIGN_H: f32 = 500.0;

pub struct Agents {
    // Position
    pub x: [f32; MAX_AGENTS],
    pub y: [f32; MAX_AGENTS],

    // Velocity, logical units per tick
    pub vx: [f32; MAX_AGENTS],
    pub vy: [f32; MAX_AGENTS],

    // Look
    pub radius: [f32; MAX_AGENTS],
    pub color: [Rgb; MAX_AGENTS],
    pub active: [bool; MAX_AGENTS],
    pub phase: [f32; MAX_AGENTS],

    // Count
    pub n: usize,
}

impl Agents {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_AGENTS],
            y: [0.0; MAX_AGENTS],
            vx: [0.0; MAX_AGENTS],
            vy: [0.0; MAX_AGENTS],
            radius: [0.0; MAX_AGENTS],
            color: [Rgb::default(); MAX_AGENTS],
            active: [false; MAX_AGENTS],
            phase: [0.0; MAX_AGENTS],
            n: 0,
        }
    }

    /// Add one agent. Returns false when full.
    pub fn push(&mut self, pos: Vec2, vel: Vec2, radius: f32, color: Rgb, active: bool, phase: f32) -> bool {
        if self.n >= MAX_AGENTS {
            return false;
        }

        let i = self.n;
        self.x[i] = pos.x;
        self.y[i] = pos.y;
        self.vx[i] = vel.x;
        self.vy[i] = vel.y;
        self.radius[i] = radius;
        self.color[i] = color;
        self.active[i] = active;
        self.phase[i] = phase;
        self.n += 1;
        true
    }

    /// Scatter `cfg.agents` agents inside the margin-inset area.
    pub fn spawn(&mut self, cfg: &NetworkConfig, w: f32, h: f32, rng: &mut Rng) {
        let (x0, x1) = bounds(cfg.margin, w);
        let (y0, y1) = bounds(cfg.margin, h);

        for i in 0..cfg.agents {
            let pos = Vec2::new(rng.range(x0, x1), rng.range(y0, y1));
            let vel = Vec2::new(
                rng.range(-cfg.max_speed, cfg.max_speed),
                rng.range(-cfg.max_speed, cfg.max_speed),
            );
            let radius = rng.between(cfg.radius);
            let color = cfg.palette[i % cfg.palette.len()];
            let active = rng.chance(cfg.active_ratio);
            let phase = rng.range(0.0, TAU);
            if !self.push(pos, vel, radius, color, active, phase) {
                return;
            }
        }
    }

    #[inline]
    pub fn pos(&self, i: usize) -> Vec2 {
        Vec2::new(self.x[i], self.y[i])
    }

    /// Indices of agents other than `i` within `radius` of it.
    pub fn neighbors(&self, i: usize, radius: f32) -> impl Iterator<Item = usize> + '_ {
        let p = self.pos(i);
        (0..self.n).filter(move |&j| j != i && self.pos(j).distance(p) < radius)
    }

    /// Move, jitter and bounce every agent. Positions end inside
    /// `[margin, dim - margin]` on both axes, whatever the velocity.
    pub fn update(
        &mut self,
        cfg: &NetworkConfig,
        steps: f32,
        w: f32,
        h: f32,
        rng: &mut Rng,
    ) -> Result<(), SceneError> {
        let (x0, x1) = bounds(cfg.margin, w);
        let (y0, y1) = bounds(cfg.margin, h);
        let (j, s) = (cfg.jitter, cfg.max_speed);

        for i in 0..self.n {
            let mut vx = (self.vx[i] + rng.range(-j, j)).clamp(-s, s);
            let mut vy = (self.vy[i] + rng.range(-j, j)).clamp(-s, s);
            let x = self.x[i] + vx * steps;
            let y = self.y[i] + vy * steps;

            if x < x0 { vx = vx.abs(); }
            if x > x1 { vx = -vx.abs(); }
            if y < y0 { vy = vy.abs(); }
            if y > y1 { vy = -vy.abs(); }

            let (x, y) = (x.clamp(x0, x1), y.clamp(y0, y1));
            if !(x.is_finite() && y.is_finite()) {
                return Err(SceneError::NonFinite { what: "agent", index: i });
            }

            self.x[i] = x;
            self.y[i] = y;
            self.vx[i] = vx;
            self.vy[i] = vy;
        }
        Ok(())
    }
}

// Inset bounds along one axis; collapses onto the lower edge when the
// surface is narrower than two margins.
#[inline]
fn bounds(margin: f32, dim: f32) -> (f32, f32) {
    (margin, (dim - margin).max(margin))
}

pub struct NetworkScene {
    cfg: NetworkConfig,
    agents: Agents,
    flow: Flow,
    links: Vec<Link>,
    rng: Rng,
    time: f32,
}

impl NetworkScene {
    pub fn new(cfg: NetworkConfig, dims: &SurfaceDims, mut rng: Rng) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let (w, h) = if dims.width > 0.0 && dims.height > 0.0 {
            (dims.width, dims.height)
        } else {
            (DESIGN_W, DESIGN_H)
        };

        let mut agents = Agents::new();
        agents.spawn(&cfg, w, h, &mut rng);
        Ok(Self {
            flow: Flow::new(cfg.token_cap, Path::Linear),
            links: Vec::with_capacity(agents.n * 2),
            cfg,
            agents,
            rng,
            time: 0.0,
        })
    }

    pub fn agents(&self) -> &Agents {
        &self.agents
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Links as of the last paint.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    // Any two distinct agents.
    fn spawn_token(&mut self) {
        let n = self.agents.n;
        if n < 2 || !self.flow.has_room() {
            return;
        }
        let from = self.rng.index(n);
        let mut to = self.rng.index(n - 1);
        if to >= from {
            to += 1;
        }
        let speed = self.rng.between(self.cfg.token_speed);
        self.flow.try_spawn(from, to, speed, self.agents.color[from]);
    }
}

impl Scene for NetworkScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Network
    }

    fn update(&mut self, dt: f32, dims: &SurfaceDims) -> Result<(), SceneError> {
        let steps = steps(dt);
        self.time += dt;
        self.agents.update(&self.cfg, steps, dims.width, dims.height, &mut self.rng)?;
        self.flow.advance(steps);
        Ok(())
    }

    fn paint(&mut self, _dims: &SurfaceDims, frame: &mut Frame) {
        let a = &self.agents;

        proximity_links(a, self.cfg.link_distance, self.cfg.link_alpha, &mut self.links);
        for l in &self.links {
            frame.line(Layer::Connections, PRIMARY.with_alpha(l.alpha), a.pos(l.a), a.pos(l.b), 1.0);
        }

        for i in 0..a.n {
            let p = a.pos(i);
            let r = a.radius[i];
            let color = a.color[i];
            let pulse = (self.time * 2.0 + a.phase[i]).sin() * 0.3 + 0.7;

            if a.active[i] {
                frame.push(Layer::Entities, color.with_alpha(0.15 * pulse), Shape::Glow { center: p, radius: r * 3.0 });
            }

            frame.disc(Layer::Entities, if a.active[i] { color } else { BORDER }, p, r);

            if a.active[i] {
                let ring = Shape::Arc { center: p, radius: r + 3.0, start: 0.0, sweep: TAU * pulse, width: 1.0, round: false };
                frame.push(Layer::Entities, color.with_alpha(0.4), ring);
            }
        }

        let f = &self.flow;
        for i in 0..f.n {
            let p = f.position(i, a.pos(f.from[i]), a.pos(f.to[i]));
            frame.disc(Layer::Tokens, f.color[i], p, 2.5);
            frame.disc(Layer::Tokens, f.color[i].with_alpha(0.2), p, 6.0);
        }
    }

    fn timers(&self) -> Vec<TimerSpec> {
        vec![TimerSpec { id: TimerId::Spawn, period_ms: self.cfg.spawn_ms }]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TICK_SECONDS;

    fn dims(w: f32, h: f32) -> SurfaceDims {
        SurfaceDims::logical(w, h)
    }

    #[test]
    fn agents_stay_inside_margin() {
        for seed in 1..20u32 {
            for speed in [0.3, 5.0, 80.0, 1000.0] {
                let cfg = NetworkConfig { max_speed: speed, jitter: speed * 0.1, ..Default::default() };
                let mut rng = Rng::new(seed);
                let mut agents = Agents::new();
                agents.spawn(&cfg, 700.0, 500.0, &mut rng);

                for tick in 0..300 {
                    // Shrink the surface halfway through, as a resize would.
                    let (w, h) = if tick < 150 { (700.0, 500.0) } else { (300.0, 200.0) };
                    agents.update(&cfg, 1.0 + (tick % 7) as f32, w, h, &mut rng).unwrap();
                    for i in 0..agents.n {
                        assert!(agents.x[i] >= 20.0 && agents.x[i] <= w - 20.0, "x={}", agents.x[i]);
                        assert!(agents.y[i] >= 20.0 && agents.y[i] <= h - 20.0, "y={}", agents.y[i]);
                    }
                }
            }
        }
    }

    #[test]
    fn velocity_reflects_at_the_wall() {
        let cfg = NetworkConfig { jitter: 0.0, ..Default::default() };
        let mut agents = Agents::new();
        agents.push(Vec2::new(679.9, 250.0), Vec2::new(0.3, 0.0), 4.0, PRIMARY, true, 0.0);
        let mut rng = Rng::new(1);

        agents.update(&cfg, 1.0, 700.0, 500.0, &mut rng).unwrap();
        assert_eq!(agents.x[0], 680.0);
        assert!(agents.vx[0] < 0.0);

        agents.update(&cfg, 1.0, 700.0, 500.0, &mut rng).unwrap();
        assert!(agents.x[0] < 680.0);
    }

    #[test]
    fn tiny_surface_pins_agents() {
        let cfg = NetworkConfig::default();
        let mut rng = Rng::new(3);
        let mut agents = Agents::new();
        agents.spawn(&cfg, 700.0, 500.0, &mut rng);
        agents.update(&cfg, 1.0, 10.0, 10.0, &mut rng).unwrap();
        for i in 0..agents.n {
            assert_eq!(agents.pos(i), Vec2::new(20.0, 20.0));
        }
    }

    #[test]
    fn non_finite_state_is_reported() {
        let cfg = NetworkConfig::default();
        let mut agents = Agents::new();
        agents.push(Vec2::new(f32::NAN, 100.0), Vec2::default(), 4.0, PRIMARY, true, 0.0);
        let err = agents.update(&cfg, 1.0, 700.0, 500.0, &mut Rng::new(1)).unwrap_err();
        assert_eq!(err, SceneError::NonFinite { what: "agent", index: 0 });
    }

    #[test]
    fn spawn_respects_config() {
        let cfg = NetworkConfig::default();
        let mut scene = NetworkScene::new(cfg.clone(), &dims(700.0, 500.0), Rng::new(11)).unwrap();
        assert_eq!(scene.agents().n, 30);
        for i in 0..scene.agents().n {
            let r = scene.agents().radius[i];
            assert!((3.0..7.0).contains(&r));
        }

        for _ in 0..100 {
            scene.on_timer(TimerId::Spawn);
            assert!(scene.flow().len() <= cfg.token_cap);
        }
        assert_eq!(scene.flow().len(), cfg.token_cap);
        let f = scene.flow();
        for i in 0..f.n {
            assert_ne!(f.from[i], f.to[i]);
            assert_eq!(f.color[i], scene.agents().color[f.from[i]]);
        }
    }

    #[test]
    fn rejects_empty_palette() {
        let cfg = NetworkConfig { palette: Vec::new(), ..Default::default() };
        let err = NetworkScene::new(cfg, &dims(700.0, 500.0), Rng::new(1)).err();
        assert_eq!(err, Some(ConfigError::Empty("palette")));
    }

    #[test]
    fn unlaid_surface_uses_design_size() {
        let scene = NetworkScene::new(NetworkConfig::default(), &dims(0.0, 0.0), Rng::new(5)).unwrap();
        let a = scene.agents();
        assert!((0..a.n).any(|i| a.x[i] > 100.0));
    }

    #[test]
    fn paints_in_layers() {
        let mut scene = NetworkScene::new(NetworkConfig::default(), &dims(700.0, 500.0), Rng::new(2)).unwrap();
        scene.on_timer(TimerId::Spawn);
        let d = dims(700.0, 500.0);
        scene.update(TICK_SECONDS, &d).unwrap();

        let mut frame = Frame::new();
        frame.clear(d.width, d.height);
        scene.paint(&d, &mut frame);

        let links = frame.count(Layer::Connections, |s| matches!(s, Shape::Line { .. }));
        assert_eq!(links, scene.links().len());
        assert_eq!(frame.count(Layer::Entities, |s| matches!(s, Shape::Disc { .. })), 30);
        assert_eq!(frame.count(Layer::Tokens, |_| true), scene.flow().len() * 2);

        let active = (0..30).filter(|&i| scene.agents().active[i]).count();
        assert_eq!(frame.count(Layer::Entities, |s| matches!(s, Shape::Glow { .. })), active);
    }

    #[test]
    fn neighbor_query() {
        let mut agents = Agents::new();
        agents.push(Vec2::new(0.0, 0.0), Vec2::default(), 3.0, PRIMARY, true, 0.0);
        agents.push(Vec2::new(10.0, 0.0), Vec2::default(), 3.0, PRIMARY, true, 0.0);
        agents.push(Vec2::new(500.0, 0.0), Vec2::default(), 3.0, PRIMARY, true, 0.0);
        let near: Vec<usize> = agents.neighbors(0, 120.0).collect();
        assert_eq!(near, vec![1]);
    }
}
