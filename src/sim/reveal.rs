// reveal.rs - File list scene
//
// Rows appear one at a time on the reveal timer; each revealed row then
// fades in on its own, independent of the reveal cadence.

use std::any::Any;

use super::{Scene, SceneKind, TimerId, TimerSpec, steps};
use crate::config::{FileTreeConfig, RowKind, RowSpec};
use crate::error::SceneError;
use crate::render::{Align, Baseline, Family, Font, Frame, Layer, Shape, Weight};
use crate::scene::{GREEN, ORANGE, PRIMARY, TEXT, TEXT_SECONDARY};
use crate::surface::SurfaceDims;
use crate::world::Vec2;

const LEFT: f32 = 16.0;
const TEXT_GAP: f32 = 14.0;
const BASELINE: f32 = 12.0;
const BADGE_INSET: f32 = 30.0;
const RIGHT_PAD: f32 = 16.0;
/// Rows fresher than this still carry their highlight band.
const FRESH: f32 = 0.8;

const GLYPH: Font = Font::new(11.0, Weight::Regular, Family::Mono);
const DIR: Font = Font::new(11.0, Weight::Bold, Family::Mono);
const NAME: Font = Font::new(11.0, Weight::Regular, Family::Mono);
const BADGE: Font = Font::new(9.0, Weight::Bold, Family::Mono);

pub struct Row {
    pub spec: RowSpec,
    pub progress: f32,
}

pub struct RevealScene {
    cfg: FileTreeConfig,
    rows: Vec<Row>,
    revealed: usize,
}

impl RevealScene {
    pub fn new(cfg: FileTreeConfig) -> Self {
        let rows = cfg.rows.iter().cloned().map(|spec| Row { spec, progress: 0.0 }).collect();
        Self { cfg, rows, revealed: 0 }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Reveal the next row, if any are left.
    pub fn reveal_next(&mut self) -> bool {
        if self.revealed < self.rows.len() {
            self.revealed += 1;
            true
        } else {
            false
        }
    }
}

impl Scene for RevealScene {
    fn kind(&self) -> SceneKind {
        SceneKind::FileTree
    }

    fn update(&mut self, dt: f32, _dims: &SurfaceDims) -> Result<(), SceneError> {
        let step = self.cfg.ease_step * steps(dt);
        for (i, row) in self.rows[..self.revealed].iter_mut().enumerate() {
            row.progress = (row.progress + step).min(1.0);
            if !row.progress.is_finite() {
                return Err(SceneError::NonFinite { what: "row", index: i });
            }
        }
        Ok(())
    }

    fn paint(&mut self, dims: &SurfaceDims, frame: &mut Frame) {
        let w = dims.width;
        let h = self.cfg.row_height;

        for (i, row) in self.rows[..self.revealed].iter().enumerate() {
            let a = row.progress;
            let x = LEFT + row.spec.depth as f32 * self.cfg.indent;
            let y = self.cfg.top + i as f32 * h;
            let text_at = Vec2::new(x + TEXT_GAP, y + BASELINE);

            let badge = match row.spec.kind {
                RowKind::Dir => {
                    frame.text(PRIMARY.with_alpha(a), Vec2::new(x, y + BASELINE), "▸", GLYPH, Align::Left, Baseline::Alphabetic);
                    frame.text(TEXT.with_alpha(a), text_at, row.spec.name.as_str(), DIR, Align::Left, Baseline::Alphabetic);
                    continue;
                }
                RowKind::Modified => Some(("M", ORANGE)),
                RowKind::Added => Some(("A", GREEN)),
                RowKind::File => None,
            };

            frame.text(TEXT_SECONDARY.with_alpha(a), text_at, row.spec.name.as_str(), NAME, Align::Left, Baseline::Alphabetic);

            if let Some((mark, color)) = badge {
                frame.text(color.with_alpha(a), Vec2::new(w - BADGE_INSET, y + BASELINE), mark, BADGE, Align::Left, Baseline::Alphabetic);
                if a < FRESH {
                    let band = Shape::Rect {
                        origin: Vec2::new(x, y),
                        size: Vec2::new((w - x - RIGHT_PAD).max(0.0), h),
                    };
                    frame.push(Layer::Entities, color.with_alpha(0.1 * a), band);
                }
            }
        }
    }

    fn timers(&self) -> Vec<TimerSpec> {
        vec![TimerSpec { id: TimerId::Reveal, period_ms: self.cfg.reveal_ms }]
    }

    fn on_timer(&mut self, timer: TimerId) {
        if timer == TimerId::Reveal {
            self.reveal_next();
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
