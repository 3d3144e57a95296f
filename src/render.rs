// render.rs - Per-frame display list
//
// Scenes never talk to the canvas. They append draw commands to a Frame,
// which the host backend replays after sorting into the fixed z-order:
//   connections < entities < tokens < labels
// Within a layer, commands keep the order they were pushed in.

use crate::world::{Paint, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Connections,
    Entities,
    Tokens,
    Labels,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Medium,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Mono,
    Sans,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f32,
    pub weight: Weight,
    pub family: Family,
}

impl Font {
    pub const fn new(size: f32, weight: Weight, family: Family) -> Self {
        Self { size, weight, family }
    }

    pub fn css(&self) -> String {
        let weight = match self.weight {
            Weight::Regular => "",
            Weight::Medium => "500 ",
            Weight::Bold => "bold ",
        };
        let family = match self.family {
            Family::Mono => "SF Mono, monospace",
            Family::Sans => "Inter, sans-serif",
        };
        format!("{weight}{}px {family}", self.size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Baseline {
    Alphabetic,
    Middle,
    Top,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line { from: Vec2, to: Vec2, width: f32 },
    Curve { from: Vec2, c1: Vec2, c2: Vec2, to: Vec2, width: f32 },
    /// Filled circle, optionally outlined.
    Disc { center: Vec2, radius: f32, stroke: Option<Stroke> },
    /// Radial gradient from the paint at the centre to transparent at `radius`.
    Glow { center: Vec2, radius: f32 },
    /// Stroked arc; angles in radians, clockwise from +x.
    Arc { center: Vec2, radius: f32, start: f32, sweep: f32, width: f32, round: bool },
    Rect { origin: Vec2, size: Vec2 },
    RoundRect { origin: Vec2, size: Vec2, radius: f32, stroke: Option<Stroke> },
    Text { at: Vec2, text: String, font: Font, align: Align, baseline: Baseline },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCmd {
    pub layer: Layer,
    pub paint: Paint,
    pub shape: Shape,
}

#[derive(Default)]
pub struct Frame {
    cmds: Vec<DrawCmd>,
    width: f32,
    height: f32,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame over a `width` x `height` logical surface.
    pub fn clear(&mut self, width: f32, height: f32) {
        self.cmds.clear();
        self.width = width;
        self.height = height;
    }

    /// Put commands into paint order.
    pub fn finish(&mut self) {
        self.cmds.sort_by_key(|c| c.layer);
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Number of commands in `layer` whose shape matches `pred`.
    pub fn count(&self, layer: Layer, pred: impl Fn(&Shape) -> bool) -> usize {
        self.cmds.iter().filter(|c| c.layer == layer && pred(&c.shape)).count()
    }

    #[inline]
    pub fn push(&mut self, layer: Layer, paint: impl Into<Paint>, shape: Shape) {
        let paint = paint.into();
        // invisible
        if paint.alpha <= 0.0 {
            return;
        }
        self.cmds.push(DrawCmd { layer, paint, shape });
    }

    pub fn line(&mut self, layer: Layer, paint: impl Into<Paint>, from: Vec2, to: Vec2, width: f32) {
        self.push(layer, paint, Shape::Line { from, to, width });
    }

    pub fn disc(&mut self, layer: Layer, paint: impl Into<Paint>, center: Vec2, radius: f32) {
        self.push(layer, paint, Shape::Disc { center, radius, stroke: None });
    }

    pub fn text(
        &mut self,
        paint: impl Into<Paint>,
        at: Vec2,
        text: impl Into<String>,
        font: Font,
        align: Align,
        baseline: Baseline,
    ) {
        let text = text.into();
        self.push(Layer::Labels, paint, Shape::Text { at, text, font, align, baseline });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Rgb;

    const C: Rgb = Rgb::new(10, 20, 30);

    #[test]
    fn finish_orders_layers_stably() {
        let mut f = Frame::new();
        f.clear(100.0, 100.0);
        f.disc(Layer::Tokens, C, Vec2::new(1.0, 0.0), 1.0);
        f.text(C, Vec2::default(), "a", Font::new(10.0, Weight::Regular, Family::Sans), Align::Left, Baseline::Top);
        f.disc(Layer::Entities, C, Vec2::new(2.0, 0.0), 1.0);
        f.line(Layer::Connections, C, Vec2::default(), Vec2::new(1.0, 1.0), 1.0);
        f.disc(Layer::Entities, C, Vec2::new(3.0, 0.0), 1.0);
        f.finish();

        let layers: Vec<Layer> = f.commands().iter().map(|c| c.layer).collect();
        assert_eq!(
            layers,
            [Layer::Connections, Layer::Entities, Layer::Entities, Layer::Tokens, Layer::Labels]
        );
        let xs: Vec<f32> = f
            .commands()
            .iter()
            .filter_map(|c| match c.shape {
                Shape::Disc { center, .. } if c.layer == Layer::Entities => Some(center.x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, [2.0, 3.0]);
    }

    #[test]
    fn transparent_commands_are_dropped() {
        let mut f = Frame::new();
        f.clear(10.0, 10.0);
        f.disc(Layer::Entities, C.with_alpha(0.0), Vec2::default(), 3.0);
        assert!(f.is_empty());
        f.clear(10.0, 10.0);
        assert_eq!(f.size(), (10.0, 10.0));
    }

    #[test]
    fn font_css() {
        assert_eq!(Font::new(11.0, Weight::Bold, Family::Mono).css(), "bold 11px SF Mono, monospace");
        assert_eq!(Font::new(10.0, Weight::Medium, Family::Sans).css(), "500 10px Inter, sans-serif");
        assert_eq!(Font::new(9.5, Weight::Regular, Family::Sans).css(), "9.5px Inter, sans-serif");
    }
}
