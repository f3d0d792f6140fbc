//! Canvas2D drawing surface

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, Surface, TextAlign};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    /// Device pixels per logical pixel
    scale: f64,
}

impl CanvasSurface {
    /// Take the 2D context of `canvas`, sized to the logical canvas at `dpr`
    pub fn new(canvas: &HtmlCanvasElement, dpr: f64) -> Result<Self, String> {
        use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

        canvas.set_width((CANVAS_WIDTH as f64 * dpr) as u32);
        canvas.set_height((CANVAS_HEIGHT as f64 * dpr) as u32);

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("get_context failed: {e:?}"))?
            .ok_or("canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "2d context has unexpected type".to_string())?;
        Ok(Self { ctx, scale: dpr })
    }

    fn px(&self, v: f32) -> f64 {
        v as f64 * self.scale
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, color: Color) {
        let canvas_w = self.px(crate::consts::CANVAS_WIDTH);
        let canvas_h = self.px(crate::consts::CANVAS_HEIGHT);
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(self.px(x), self.px(y), self.px(w), self.px(h));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color) {
        self.ctx.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx
            .set_font(&format!("bold {}px sans-serif", self.px(size).round()));
        self.ctx.set_fill_style_str(&color.to_css());
        if let Err(e) = self.ctx.fill_text(text, self.px(x), self.px(y)) {
            log::warn!("fill_text failed: {:?}", e);
        }
    }
}
