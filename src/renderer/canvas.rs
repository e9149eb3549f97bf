//! Canvas 2D backend (WASM only)

use std::cell::Cell;

use anyhow::{Result, anyhow};
use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCmd, Frame, Shadow};

fn js(err: JsValue) -> anyhow::Error {
    anyhow!("canvas call failed: {:?}", err)
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    /// Shake offset currently applied as a CSS transform
    applied_offset: Cell<Vec2>,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|js_value| anyhow!("Error getting context : {:?}", js_value))?
            .ok_or_else(|| anyhow!("No 2d context found"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|element| {
                anyhow!("Error converting {:?} to CanvasRenderingContext2d", element)
            })?;
        Ok(Self {
            canvas,
            context,
            applied_offset: Cell::new(Vec2::ZERO),
        })
    }

    /// Execute a frame. An error leaves the canvas partially drawn; the next
    /// frame clears it.
    pub fn draw(&self, frame: &Frame) -> Result<()> {
        self.apply_offset(frame.offset)?;

        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, frame.width as f64, frame.height as f64);

        for command in &frame.commands {
            match command {
                DrawCmd::Gradient { top, bottom } => {
                    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, frame.height as f64);
                    gradient.add_color_stop(0.0, &top.css()).map_err(js)?;
                    gradient.add_color_stop(1.0, &bottom.css()).map_err(js)?;
                    ctx.set_fill_style_canvas_gradient(&gradient);
                    ctx.fill_rect(0.0, 0.0, frame.width as f64, frame.height as f64);
                }
                DrawCmd::RoundRect {
                    pos,
                    size,
                    radius,
                    fill,
                    stroke,
                    shadow,
                } => {
                    self.set_shadow(shadow.as_ref());
                    ctx.set_fill_style_str(&fill.css());
                    ctx.begin_path();
                    ctx.round_rect_with_f64(
                        pos.x as f64,
                        pos.y as f64,
                        size.x as f64,
                        size.y as f64,
                        *radius as f64,
                    )
                    .map_err(js)?;
                    ctx.fill();
                    if let Some(stroke) = stroke {
                        ctx.set_stroke_style_str(&stroke.color.css());
                        ctx.set_line_width(stroke.width as f64);
                        ctx.stroke();
                    }
                    self.set_shadow(None);
                }
                DrawCmd::Glyph {
                    text,
                    center,
                    font_px,
                } => {
                    ctx.set_font(&format!("{}px Arial", font_px));
                    ctx.set_fill_style_str("black");
                    ctx.set_text_align("center");
                    ctx.set_text_baseline("middle");
                    ctx.fill_text(text, center.x as f64, center.y as f64)
                        .map_err(js)?;
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    fill,
                } => {
                    ctx.set_fill_style_str(&fill.css());
                    ctx.begin_path();
                    ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    )
                    .map_err(js)?;
                    ctx.fill();
                }
            }
        }
        Ok(())
    }

    fn set_shadow(&self, shadow: Option<&Shadow>) {
        let ctx = &self.context;
        match shadow {
            Some(shadow) => {
                ctx.set_shadow_color(&shadow.color.css());
                ctx.set_shadow_blur(shadow.blur as f64);
                ctx.set_shadow_offset_x(shadow.offset.x as f64);
                ctx.set_shadow_offset_y(shadow.offset.y as f64);
            }
            None => {
                ctx.set_shadow_color("transparent");
                ctx.set_shadow_blur(0.0);
                ctx.set_shadow_offset_x(0.0);
                ctx.set_shadow_offset_y(0.0);
            }
        }
    }

    /// Shake moves the canvas element itself
    fn apply_offset(&self, offset: Vec2) -> Result<()> {
        if self.applied_offset.get() == offset {
            return Ok(());
        }
        self.canvas
            .style()
            .set_property(
                "transform",
                &format!("translate({}px, {}px)", offset.x, offset.y),
            )
            .map_err(js)?;
        self.applied_offset.set(offset);
        Ok(())
    }
}
