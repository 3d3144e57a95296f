// world/ - Geometry and colour
//
// Pure functions and small value types shared by every scene.
// No state, no allocation - just math.

mod color;
mod math;

pub use color::*;
pub use math::*;
