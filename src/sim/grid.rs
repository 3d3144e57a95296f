// grid.rs - Activity grid scene
//
// A fixed grid of cells. Active cells fill a progress arc and restart it
// at a random point when it completes, so the grid never pulses in sync.

use std::any::Any;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::{Deref, DerefMut};

use super::links::{Link, grid_links};
use super::{Rng, Scene, SceneKind, steps};
use crate::config::GridConfig;
use crate::error::{ConfigError, SceneError};
use crate::render::{Frame, Layer, Shape, Stroke};
use crate::scene::{BORDER, PRIMARY};
use crate::surface::SurfaceDims;
use crate::world::{Rgb, Vec2};

const CORNER: f32 = 6.0;
const DOT: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
    pub active: bool,
    pub color: Rgb,
    pub phase: f32,
    pub progress: f32,
}

/// Row-major cell store.
pub struct Cells {
    cells: Vec<Cell>,
    cols: usize,
    rows: usize,
}

impl Cells {
    /// Lay out a fresh grid. `cfg` must already be validated.
    pub(crate) fn new(cfg: &GridConfig, rng: &mut Rng) -> Self {
        let mut cells = Vec::with_capacity(cfg.cols * cfg.rows);
        for row in 0..cfg.rows {
            for col in 0..cfg.cols {
                cells.push(Cell {
                    col,
                    row,
                    active: rng.chance(cfg.active_ratio),
                    color: cfg.palette[rng.index(cfg.palette.len())],
                    phase: rng.range(0.0, TAU),
                    progress: rng.between(cfg.initial_progress),
                });
            }
        }
        Self { cells, cols: cfg.cols, rows: cfg.rows }
    }

    pub fn right_of(&self, i: usize) -> Option<usize> {
        (i % self.cols + 1 < self.cols).then_some(i + 1)
    }

    pub fn below(&self, i: usize) -> Option<usize> {
        (i / self.cols + 1 < self.rows).then_some(i + self.cols)
    }

    /// Advance every active cell's progress, restarting finished ones.
    pub fn update(&mut self, cfg: &GridConfig, steps: f32, rng: &mut Rng) -> Result<(), SceneError> {
        for (i, c) in self.cells.iter_mut().enumerate() {
            if !c.active {
                continue;
            }
            c.progress += cfg.progress_step * steps;
            if c.progress > 1.0 {
                c.progress = rng.between(cfg.restart);
            }
            if !c.progress.is_finite() {
                return Err(SceneError::NonFinite { what: "cell", index: i });
            }
        }
        Ok(())
    }
}

impl Deref for Cells {
    type Target = [Cell];
    fn deref(&self) -> &[Cell] {
        &self.cells
    }
}

impl DerefMut for Cells {
    fn deref_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

/// Cell geometry for one surface size.
#[derive(Clone, Copy, Debug)]
struct Layout {
    origin: Vec2,
    cell_w: f32,
    cell_h: f32,
    radius: f32,
}

impl Layout {
    fn new(cfg: &GridConfig, w: f32, h: f32) -> Self {
        let cell_w = ((w - cfg.padding * 2.0) / cfg.cols as f32).max(0.0);
        let cell_h = ((h - cfg.padding * 2.0) / cfg.rows as f32).max(0.0);
        Self {
            origin: Vec2::new(cfg.padding, cfg.padding),
            cell_w,
            cell_h,
            radius: cell_w.min(cell_h) * 0.35,
        }
    }

    fn center(&self, c: &Cell) -> Vec2 {
        Vec2::new(
            self.origin.x + c.col as f32 * self.cell_w + self.cell_w / 2.0,
            self.origin.y + c.row as f32 * self.cell_h + self.cell_h / 2.0,
        )
    }

    /// Half-size of the rounded tile around each cell.
    fn tile(&self) -> f32 {
        self.radius * 1.6
    }
}

pub struct GridScene {
    cfg: GridConfig,
    cells: Cells,
    links: Vec<Link>,
    rng: Rng,
    time: f32,
}

impl GridScene {
    pub fn new(cfg: GridConfig, mut rng: Rng) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let cells = Cells::new(&cfg, &mut rng);
        Ok(Self { links: Vec::with_capacity(cells.len() * 2), cfg, cells, rng, time: 0.0 })
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut Cells {
        &mut self.cells
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl Scene for GridScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Grid
    }

    fn update(&mut self, dt: f32, _dims: &SurfaceDims) -> Result<(), SceneError> {
        self.time += dt;
        self.cells.update(&self.cfg, steps(dt), &mut self.rng)
    }

    fn paint(&mut self, dims: &SurfaceDims, frame: &mut Frame) {
        let lay = Layout::new(&self.cfg, dims.width, dims.height);
        let rr = lay.tile();

        grid_links(&self.cells, self.cfg.link_alpha, &mut self.links);
        for l in &self.links {
            let (a, b) = (lay.center(&self.cells[l.a]), lay.center(&self.cells[l.b]));
            // Run between tile edges, not centres.
            let (from, to) = if self.cells.right_of(l.a) == Some(l.b) {
                (Vec2::new(a.x + rr, a.y), Vec2::new(b.x - rr, b.y))
            } else {
                (Vec2::new(a.x, a.y + rr), Vec2::new(b.x, b.y - rr))
            };
            frame.line(Layer::Connections, PRIMARY.with_alpha(l.alpha), from, to, 1.0);
        }

        for c in self.cells.iter() {
            let p = lay.center(c);
            let (fill, edge) = if c.active {
                (PRIMARY.with_alpha(0.04), PRIMARY.with_alpha(0.15))
            } else {
                (BORDER.with_alpha(0.3), BORDER.with_alpha(0.5))
            };
            let tile = Shape::RoundRect {
                origin: Vec2::new(p.x - rr, p.y - rr),
                size: Vec2::new(rr * 2.0, rr * 2.0),
                radius: CORNER,
                stroke: Some(Stroke { paint: edge, width: 1.0 }),
            };
            frame.push(Layer::Entities, fill, tile);

            if c.active {
                let arc = Shape::Arc {
                    center: p,
                    radius: lay.radius * 0.7,
                    start: -FRAC_PI_2,
                    sweep: TAU * c.progress,
                    width: 2.5,
                    round: true,
                };
                frame.push(Layer::Entities, c.color, arc);

                let pulse = (self.time * 1.5 + c.phase).sin() * 0.15 + 0.85;
                frame.disc(Layer::Entities, c.color.with_alpha(pulse), p, DOT);
            } else {
                frame.disc(Layer::Entities, BORDER, p, DOT);
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_stop_at_edges() {
        let cfg = GridConfig { cols: 4, rows: 3, ..Default::default() };
        let cells = Cells::new(&cfg, &mut Rng::new(1));
        assert_eq!(cells.len(), 12);
        assert_eq!(cells.right_of(0), Some(1));
        assert_eq!(cells.right_of(3), None);
        assert_eq!(cells.below(4), Some(8));
        assert_eq!(cells.below(8), None);
        assert_eq!((cells[6].col, cells[6].row), (2, 1));
    }

    #[test]
    fn restart_lands_in_range() {
        let cfg = GridConfig { progress_step: 0.05, ..Default::default() };
        for seed in 1..30 {
            let mut rng = Rng::new(seed);
            let mut cells = Cells::new(&cfg, &mut rng);
            for _ in 0..500 {
                let before: Vec<f32> = cells.iter().map(|c| c.progress).collect();
                cells.update(&cfg, 1.0, &mut rng).unwrap();
                for (c, prev) in cells.iter().zip(before) {
                    assert!((0.0..=1.0).contains(&c.progress));
                    if c.active && prev + 0.05 > 1.0 {
                        assert!(c.progress >= 0.1 && c.progress < 0.3, "{}", c.progress);
                    }
                }
            }
        }
    }

    #[test]
    fn inactive_cells_hold_still() {
        let cfg = GridConfig::default();
        let mut rng = Rng::new(4);
        let mut cells = Cells::new(&cfg, &mut rng);
        cells[0].active = false;
        let p = cells[0].progress;
        for _ in 0..100 {
            cells.update(&cfg, 1.0, &mut rng).unwrap();
        }
        assert_eq!(cells[0].progress, p);
    }

    #[test]
    fn rejects_empty_palette() {
        let cfg = GridConfig { palette: Vec::new(), ..Default::default() };
        assert_eq!(GridScene::new(cfg, Rng::new(1)).err(), Some(ConfigError::Empty("palette")));
    }

    #[test]
    fn paint_draws_every_tile_and_live_links() {
        let mut scene = GridScene::new(GridConfig::default(), Rng::new(8)).unwrap();
        let dims = SurfaceDims::logical(480.0, 380.0);
        scene.update(0.016, &dims).unwrap();

        let mut frame = Frame::new();
        frame.clear(dims.width, dims.height);
        scene.paint(&dims, &mut frame);

        assert_eq!(frame.count(Layer::Entities, |s| matches!(s, Shape::RoundRect { .. })), 50);
        assert_eq!(frame.count(Layer::Entities, |s| matches!(s, Shape::Disc { .. })), 50);
        let active = scene.cells().iter().filter(|c| c.active).count();
        assert_eq!(frame.count(Layer::Entities, |s| matches!(s, Shape::Arc { .. })), active);
        assert_eq!(frame.count(Layer::Connections, |_| true), scene.links().len());
    }

    #[test]
    fn link_segments_run_between_tile_edges() {
        let cfg = GridConfig { cols: 2, rows: 1, padding: 0.0, ..Default::default() };
        let mut scene = GridScene::new(cfg, Rng::new(1)).unwrap();
        for c in scene.cells_mut().iter_mut() {
            c.active = true;
        }
        let dims = SurfaceDims::logical(200.0, 100.0);
        let mut frame = Frame::new();
        frame.clear(200.0, 100.0);
        scene.paint(&dims, &mut frame);

        // cell 100x100, radius 35, tile half-size 56
        let line = frame.commands().iter().find_map(|c| match c.shape {
            Shape::Line { from, to, .. } => Some((from, to)),
            _ => None,
        });
        let (from, to) = line.unwrap();
        assert!((from.x - 106.0).abs() < 1e-3);
        assert!((to.x - 94.0).abs() < 1e-3);
    }
}
