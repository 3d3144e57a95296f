// surface.rs - Resolution-independent surface sizing
//
// The container's layout width decides the logical width; height comes from
// an aspect ratio or a fixed constant. The backing store is scaled by the
// device pixel ratio so strokes stay crisp, while scenes only ever see
// logical units.

/// How a surface derives its height from the container width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
    /// Height = width * height / width of the design size.
    Aspect { width: f32, height: f32 },
    /// Height is a constant number of logical units.
    FixedHeight(f32),
}

/// Resolved surface size, in both logical and device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceDims {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl SurfaceDims {
    /// Logical-only dims at a density of 1.
    pub fn logical(width: f32, height: f32) -> Self {
        Sizing::FixedHeight(height).resolve(width, 1.0)
    }
}

impl Sizing {
    pub fn resolve(self, container_width: f32, device_pixel_ratio: f32) -> SurfaceDims {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let width = if container_width.is_finite() { container_width.max(0.0) } else { 0.0 };

        let height = match self {
            Sizing::Aspect { width: dw, height: dh } if dw > 0.0 => width * dh / dw,
            Sizing::Aspect { .. } => 0.0,
            Sizing::FixedHeight(h) => h.max(0.0),
        };

        SurfaceDims {
            pixel_width: (width * dpr) as u32,
            pixel_height: (height * dpr) as u32,
            width,
            height,
            dpr,
        }
    }
}
