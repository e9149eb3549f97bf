//! Rendering
//!
//! The scene is first turned into a backend-independent [`Frame`] (a list of
//! draw commands); a backend then executes it. The browser backend draws on a
//! Canvas 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::{EntityKind, GameState};
pub use shapes::{DrawCmd, Shadow, Stroke};
use shapes::*;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

/// One rendered frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    /// Whole-canvas translation (shake)
    pub offset: Vec2,
    pub commands: Vec<DrawCmd>,
}

impl Frame {
    pub fn circles(&self) -> impl Iterator<Item = &DrawCmd> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Circle { .. }))
    }
}

/// Build the draw list for the current state: background, player,
/// particles, falling entities.
pub fn build_frame(state: &GameState, settings: &Settings) -> Frame {
    let shadows = settings.quality.shadows_enabled();
    let mut commands =
        Vec::with_capacity(3 + state.particles.len() + state.entities.len() * 2);

    commands.push(DrawCmd::Gradient {
        top: SKY_TOP,
        bottom: SKY_BOTTOM,
    });

    let player = &state.player;
    commands.push(DrawCmd::RoundRect {
        pos: player.pos,
        size: Vec2::splat(player.size),
        radius: PLAYER_RADIUS,
        fill: player.mode.fill(),
        stroke: Some(PLAYER_STROKE),
        shadow: shadows.then_some(PLAYER_SHADOW),
    });
    commands.push(DrawCmd::Glyph {
        text: player.mode.glyph(),
        center: player.center(),
        font_px: PLAYER_FONT_PX,
    });

    for particle in &state.particles {
        commands.push(DrawCmd::Circle {
            center: particle.pos,
            radius: particle.size,
            fill: faded(particle.color, particle.alpha()),
        });
    }

    for entity in &state.entities {
        let (fill, stroke) = match entity.kind {
            EntityKind::Beneficial => (BENEFICIAL_FILL, BENEFICIAL_STROKE),
            EntityKind::Harmful => (HARMFUL_FILL, HARMFUL_STROKE),
        };
        commands.push(DrawCmd::RoundRect {
            pos: entity.pos,
            size: Vec2::splat(entity.size),
            radius: ENTITY_RADIUS,
            fill,
            stroke: Some(Stroke {
                color: stroke,
                width: 2.0,
            }),
            shadow: shadows.then_some(ENTITY_SHADOW),
        });
        commands.push(DrawCmd::Glyph {
            text: entity.glyph(),
            center: entity.pos + Vec2::splat(entity.size / 2.0),
            font_px: ENTITY_FONT_PX,
        });
    }

    let offset = if state.shake_ms > 0.0 && settings.effective_screen_shake() {
        Vec2::splat(state.tuning.shake_offset)
    } else {
        Vec2::ZERO
    };

    Frame {
        width: state.tuning.field_width,
        height: state.tuning.field_height,
        offset,
        commands,
    }
}
