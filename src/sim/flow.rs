// flow.rs - Transient tokens travelling between anchors
//
// Structure-of-Arrays with a fixed capacity. A token is born at t = 0,
// advances by its speed every tick and is retired on the first tick it
// reaches t >= 1. Spawns beyond the scene's cap are dropped on the floor.

use super::MAX_TOKENS;
use crate::world::{Rgb, Vec2, cubic_bezier, s_curve};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Path {
    /// Straight line between the anchors.
    Linear,
    /// Horizontal S-curve (see `world::s_curve`).
    Curve,
}

pub struct Flow {
    // Endpoints (entity indices owned by the scene)
    pub from: [usize; MAX_TOKENS],
    pub to: [usize; MAX_TOKENS],

    // Progress
    pub t: [f32; MAX_TOKENS],
    pub speed: [f32; MAX_TOKENS],

    pub color: [Rgb; MAX_TOKENS],
    pub id: [u32; MAX_TOKENS],

    // Count
    pub n: usize,

    cap: usize,
    path: Path,
    next_id: u32,
}

impl Flow {
    pub fn new(cap: usize, path: Path) -> Self {
        Self {
            from: [0; MAX_TOKENS],
            to: [0; MAX_TOKENS],
            t: [0.0; MAX_TOKENS],
            speed: [0.0; MAX_TOKENS],
            color: [Rgb::default(); MAX_TOKENS],
            id: [0; MAX_TOKENS],
            n: 0,
            cap: cap.min(MAX_TOKENS),
            path,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn has_room(&self) -> bool {
        self.n < self.cap
    }

    /// Start a token at t = 0. Returns false (and does nothing) when full.
    pub fn try_spawn(&mut self, from: usize, to: usize, speed: f32, color: Rgb) -> bool {
        if !self.has_room() {
            return false;
        }

        let i = self.n;
        self.from[i] = from;
        self.to[i] = to;
        self.t[i] = 0.0;
        self.speed[i] = speed;
        self.color[i] = color;
        self.id[i] = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.n += 1;
        true
    }

    /// Advance every token by `steps` ticks and retire finished ones.
    /// Returns how many were retired.
    pub fn advance(&mut self, steps: f32) -> usize {
        let mut write = 0;

        for read in 0..self.n {
            let t = self.t[read] + self.speed[read] * steps;
            if t >= 1.0 {
                continue;
            }

            self.from[write] = self.from[read];
            self.to[write] = self.to[read];
            self.t[write] = t;
            self.speed[write] = self.speed[read];
            self.color[write] = self.color[read];
            self.id[write] = self.id[read];
            write += 1;
        }

        let retired = self.n - write;
        self.n = write;
        retired
    }

    /// Where token `i` is, given the current positions of its anchors.
    #[inline]
    pub fn position(&self, i: usize, from: Vec2, to: Vec2) -> Vec2 {
        let t = self.t[i];
        match self.path {
            Path::Linear => from.lerp(to, t),
            Path::Curve => {
                let (c1, c2) = s_curve(from, to);
                cubic_bezier(from, c1, c2, to, t)
            }
        }
    }
}
