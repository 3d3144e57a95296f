use crate::world::Rgb;

pub const PRIMARY: Rgb = Rgb::new(0x7c, 0x5c, 0xfc);
pub const GREEN: Rgb = Rgb::new(0x22, 0xc5, 0x5e);
pub const ORANGE: Rgb = Rgb::new(0xf9, 0x73, 0x16);
pub const BLUE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
pub const CYAN: Rgb = Rgb::new(0x06, 0xb6, 0xd4);

pub const BORDER: Rgb = Rgb::new(0x25, 0x25, 0x2d);
pub const NODE_FILL: Rgb = Rgb::new(0x12, 0x12, 0x1a);
pub const TEXT: Rgb = Rgb::new(0xf0, 0xf0, 0xf5);
pub const TEXT_MUTED: Rgb = Rgb::new(0x60, 0x60, 0x70);
pub const TEXT_SECONDARY: Rgb = Rgb::new(0x98, 0x98, 0xa8);

/// Entity colours, cycled or drawn at random by the scenes.
pub const PALETTE: [Rgb; 5] = [PRIMARY, GREEN, BLUE, CYAN, ORANGE];
