//! Draw-list primitives

use glam::Vec2;

use crate::sim::Color;

/// Drop shadow applied to a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset: Vec2,
}

/// Outline of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// One drawing operation, in painter's order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Vertical gradient covering the whole field
    Gradient { top: Color, bottom: Color },
    RoundRect {
        pos: Vec2,
        size: Vec2,
        radius: f32,
        fill: Color,
        stroke: Option<Stroke>,
        shadow: Option<Shadow>,
    },
    /// Text centred on `center`
    Glyph {
        text: &'static str,
        center: Vec2,
        font_px: f32,
    },
    Circle { center: Vec2, radius: f32, fill: Color },
}

pub const SKY_TOP: Color = Color::rgb(0x87, 0xCE, 0xEB);
pub const SKY_BOTTOM: Color = Color::rgb(0xE0, 0xF7, 0xFA);

pub const PLAYER_STROKE: Stroke = Stroke {
    color: Color::rgba(0, 0, 0, 0.7),
    width: 3.0,
};
pub const PLAYER_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.5),
    blur: 10.0,
    offset: Vec2::new(0.0, 3.0),
};
pub const ENTITY_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.3),
    blur: 5.0,
    offset: Vec2::new(0.0, 2.0),
};

pub const BENEFICIAL_FILL: Color = Color::rgba(173, 216, 230, 0.9);
pub const BENEFICIAL_STROKE: Color = Color::rgb(0, 0, 139);
pub const HARMFUL_FILL: Color = Color::rgba(255, 99, 71, 0.9);
pub const HARMFUL_STROKE: Color = Color::rgb(139, 0, 0);

pub const PLAYER_RADIUS: f32 = 10.0;
pub const ENTITY_RADIUS: f32 = 8.0;
pub const PLAYER_FONT_PX: f32 = 36.0;
pub const ENTITY_FONT_PX: f32 = 24.0;

/// Same colour with its alpha scaled by `alpha`
pub fn faded(color: Color, alpha: f32) -> Color {
    Color {
        a: color.a * alpha.clamp(0.0, 1.0),
        ..color
    }
}
