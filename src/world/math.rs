// math.rs - Points, interpolation, curves
//
// All coordinates are logical surface units (CSS pixels), never device pixels.

use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, o: Vec2) -> f32 {
        let (dx, dy) = (self.x - o.x, self.y - o.y);
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn lerp(self, o: Vec2, t: f32) -> Vec2 {
        Vec2::new(lerp(self.x, o.x, t), lerp(self.y, o.y, t))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self { x: self.x + o.x, y: self.y + o.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self { x: self.x - o.x, y: self.y - o.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self { x: self.x * s, y: self.y * s }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Control points of the S-curve joining two anchors: both sit on the
/// horizontal midpoint, the first level with `from`, the second with `to`.
#[inline]
pub fn s_curve(from: Vec2, to: Vec2) -> (Vec2, Vec2) {
    let mx = from.x + (to.x - from.x) * 0.5;
    (Vec2::new(mx, from.y), Vec2::new(mx, to.y))
}

/// Standard cubic Bezier at parameter `t`.
#[inline]
pub fn cubic_bezier(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Vec2::new(
        a * p0.x + b * c1.x + c * c2.x + d * p3.x,
        a * p0.y + b * c1.y + c * c2.y + d * p3.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn bezier_hits_both_anchors() {
        let anchors = [
            (Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0)),
            (Vec2::new(640.0, 12.5), Vec2::new(-30.0, 300.0)),
            (Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)),
        ];
        for (from, to) in anchors {
            let (c1, c2) = s_curve(from, to);
            assert!(close(cubic_bezier(from, c1, c2, to, 0.0), from));
            assert!(close(cubic_bezier(from, c1, c2, to, 1.0), to));
        }
    }

    #[test]
    fn s_curve_midpoint_is_centred() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(200.0, 100.0);
        let (c1, c2) = s_curve(from, to);
        assert_eq!(c1, Vec2::new(100.0, 0.0));
        assert_eq!(c2, Vec2::new(100.0, 100.0));
        assert!(close(cubic_bezier(from, c1, c2, to, 0.5), Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 6.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(2.0, 4.0));
        assert_eq!(a.distance(b), 20.0f32.sqrt());
    }
}
