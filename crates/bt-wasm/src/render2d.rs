//! Canvas2D overlay painter.
//!
//! Paints an [`OverlayFrame`] onto a transparent `<canvas>` stacked over
//! the `<img>`. The frame is already laid out in container pixels, so this
//! is drawing only.

use bt_render::kurbo::Rect;
use bt_render::overlay::{
    Affordance, AffordanceButton, OverlayBox, OverlayFrame, OverlayGhost, OverlayTheme,
};
use web_sys::CanvasRenderingContext2d;

const LABEL_FONT: &str = "600 12px Inter, sans-serif";
const LABEL_HEIGHT: f64 = 18.0;
const LABEL_PAD_X: f64 = 6.0;
const BUTTON_RADIUS: f64 = 4.0;

/// Clear the canvas and paint one overlay frame.
pub fn render_overlay(
    ctx: &CanvasRenderingContext2d,
    frame: &OverlayFrame,
    theme: &OverlayTheme,
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.clear_rect(0.0, 0.0, canvas_width, canvas_height);

    for b in &frame.boxes {
        draw_box(ctx, b, theme);
    }

    // Buttons of the hovered box sit on top of every other box.
    if let Some(hovered) = frame.hovered() {
        for button in &hovered.affordances {
            draw_affordance(ctx, button, theme);
        }
    }

    if let Some(ghost) = &frame.ghost {
        draw_ghost(ctx, ghost, theme);
    }
}

fn draw_box(ctx: &CanvasRenderingContext2d, b: &OverlayBox, theme: &OverlayTheme) {
    let (x, y, w, h) = xywh(b.rect);

    ctx.save();
    if let Some(fill) = b.fill {
        ctx.set_fill_style_str(fill);
        ctx.fill_rect(x, y, w, h);
    }
    ctx.set_stroke_style_str(b.stroke);
    ctx.set_line_width(theme.stroke_width);
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();

    if !b.label.is_empty() {
        draw_label(ctx, x, y, &b.label, theme);
    }
}

/// Tag chip at the top-left corner, inside the box so it never leaves the
/// image.
fn draw_label(ctx: &CanvasRenderingContext2d, x: f64, y: f64, label: &str, theme: &OverlayTheme) {
    ctx.save();
    ctx.set_font(LABEL_FONT);
    let text_w = ctx
        .measure_text(label)
        .map(|m| m.width())
        .unwrap_or(label.chars().count() as f64 * 7.0);

    ctx.set_fill_style_str(theme.label_bg);
    ctx.fill_rect(x, y, text_w + LABEL_PAD_X * 2.0, LABEL_HEIGHT);

    ctx.set_fill_style_str(theme.label_text);
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(label, x + LABEL_PAD_X, y + LABEL_HEIGHT / 2.0);
    ctx.restore();
}

fn draw_affordance(ctx: &CanvasRenderingContext2d, button: &AffordanceButton, theme: &OverlayTheme) {
    let (x, y, w, h) = xywh(button.rect);

    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, BUTTON_RADIUS);
    ctx.set_fill_style_str(theme.affordance_bg);
    ctx.fill();

    let (glyph, color) = match button.kind {
        Affordance::Edit => ("✎", theme.edit_icon),
        Affordance::Delete => ("✕", theme.delete_icon),
    };
    ctx.set_font("14px sans-serif");
    ctx.set_fill_style_str(color);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(glyph, x + w / 2.0, y + h / 2.0);
    ctx.restore();
}

fn draw_ghost(ctx: &CanvasRenderingContext2d, ghost: &OverlayGhost, theme: &OverlayTheme) {
    let (x, y, w, h) = xywh(ghost.rect);
    if w < 1.0 && h < 1.0 {
        return;
    }

    ctx.save();
    ctx.set_stroke_style_str(ghost.stroke);
    ctx.set_line_width(theme.stroke_width);
    if ghost.dashed {
        let _ = ctx.set_line_dash(&js_sys::Array::of2(
            &wasm_bindgen::JsValue::from_f64(6.0),
            &wasm_bindgen::JsValue::from_f64(4.0),
        ));
    }
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn xywh(r: Rect) -> (f64, f64, f64, f64) {
    (r.x0, r.y0, r.width(), r.height())
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
