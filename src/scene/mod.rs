// scene/ - Declarative scene data
//
// Palette and the scripted content the scenes animate:
// - Palette (brand colours shared by every scene)
// - Pipeline topology (stages + directed edges)
// - File tree rows revealed by the file list scene

mod data;
mod palette;

pub use data::*;
pub use palette::*;
