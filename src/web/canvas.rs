// canvas.rs - Replay a Frame onto a 2D canvas context
//
// Coordinates are logical; the context transform already carries the
// device pixel ratio.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::render::{Align, Baseline, DrawCmd, Frame, Shape, Stroke};
use crate::world::Vec2;

pub fn replay(ctx: &CanvasRenderingContext2d, frame: &Frame) -> Result<(), JsValue> {
    let (w, h) = frame.size();
    ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    for cmd in frame.commands() {
        draw(ctx, cmd)?;
    }
    Ok(())
}

fn draw(ctx: &CanvasRenderingContext2d, cmd: &DrawCmd) -> Result<(), JsValue> {
    let css = cmd.paint.css();

    match &cmd.shape {
        Shape::Line { from, to, width } => {
            ctx.begin_path();
            move_to(ctx, *from);
            ctx.line_to(from_f(to.x), from_f(to.y));
            stroke(ctx, &css, *width);
        }

        Shape::Curve { from, c1, c2, to, width } => {
            ctx.begin_path();
            move_to(ctx, *from);
            ctx.bezier_curve_to(
                from_f(c1.x), from_f(c1.y),
                from_f(c2.x), from_f(c2.y),
                from_f(to.x), from_f(to.y),
            );
            stroke(ctx, &css, *width);
        }

        Shape::Disc { center, radius, stroke: outline } => {
            ctx.begin_path();
            circle(ctx, *center, *radius)?;
            ctx.set_fill_style_str(&css);
            ctx.fill();
            if let Some(s) = outline {
                stroke_with(ctx, s);
            }
        }

        Shape::Glow { center, radius } => {
            let (x, y, r) = (from_f(center.x), from_f(center.y), from_f(*radius));
            let g = ctx.create_radial_gradient(x, y, 0.0, x, y, r)?;
            g.add_color_stop(0.0, &css)?;
            g.add_color_stop(1.0, "transparent")?;
            ctx.begin_path();
            circle(ctx, *center, *radius)?;
            ctx.set_fill_style_canvas_gradient(&g);
            ctx.fill();
        }

        Shape::Arc { center, radius, start, sweep, width, round } => {
            ctx.begin_path();
            let start = from_f(*start);
            ctx.arc(from_f(center.x), from_f(center.y), from_f(radius.max(0.0)), start, start + from_f(*sweep))?;
            ctx.set_line_cap(if *round { "round" } else { "butt" });
            stroke(ctx, &css, *width);
            ctx.set_line_cap("butt");
        }

        Shape::Rect { origin, size } => {
            ctx.set_fill_style_str(&css);
            ctx.fill_rect(from_f(origin.x), from_f(origin.y), from_f(size.x), from_f(size.y));
        }

        Shape::RoundRect { origin, size, radius, stroke: outline } => {
            round_rect(ctx, *origin, *size, *radius)?;
            ctx.set_fill_style_str(&css);
            ctx.fill();
            if let Some(s) = outline {
                stroke_with(ctx, s);
            }
        }

        Shape::Text { at, text, font, align, baseline } => {
            ctx.set_font(&font.css());
            ctx.set_text_align(match align {
                Align::Left => "left",
                Align::Center => "center",
            });
            ctx.set_text_baseline(match baseline {
                Baseline::Alphabetic => "alphabetic",
                Baseline::Middle => "middle",
                Baseline::Top => "top",
            });
            ctx.set_fill_style_str(&css);
            ctx.fill_text(text, from_f(at.x), from_f(at.y))?;
        }
    }
    Ok(())
}

#[inline]
fn from_f(v: f32) -> f64 {
    v as f64
}

fn move_to(ctx: &CanvasRenderingContext2d, p: Vec2) {
    ctx.move_to(from_f(p.x), from_f(p.y));
}

fn circle(ctx: &CanvasRenderingContext2d, c: Vec2, r: f32) -> Result<(), JsValue> {
    ctx.arc(from_f(c.x), from_f(c.y), from_f(r.max(0.0)), 0.0, TAU)
}

fn stroke(ctx: &CanvasRenderingContext2d, css: &str, width: f32) {
    ctx.set_stroke_style_str(css);
    ctx.set_line_width(from_f(width));
    ctx.stroke();
}

fn stroke_with(ctx: &CanvasRenderingContext2d, s: &Stroke) {
    stroke(ctx, &s.paint.css(), s.width);
}

fn round_rect(ctx: &CanvasRenderingContext2d, o: Vec2, size: Vec2, r: f32) -> Result<(), JsValue> {
    let (x, y) = (from_f(o.x), from_f(o.y));
    let (w, h) = (from_f(size.x.max(0.0)), from_f(size.y.max(0.0)));
    let r = from_f(r).min(w / 2.0).min(h / 2.0).max(0.0);

    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r)?;
    ctx.arc_to(x + w, y + h, x, y + h, r)?;
    ctx.arc_to(x, y + h, x, y, r)?;
    ctx.arc_to(x, y, x + w, y, r)?;
    ctx.close_path();
    Ok(())
}
