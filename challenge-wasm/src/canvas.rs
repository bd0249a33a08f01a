use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

/// Drawing helpers in widget-space coordinates. The context transform is
/// set up by the caller so one unit maps to `Layout::scale` pixels.
pub struct Pen<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Pen<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Pen { ctx }
    }

    pub fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        set_fill_style(self.ctx, color);
        self.ctx.fill_rect(x, y, w, h);
    }

    pub fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64, color: &str, width: f64) {
        set_stroke_style(self.ctx, color);
        self.ctx.set_line_width(width);
        self.ctx.stroke_rect(x, y, w, h);
    }

    pub fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, r, 0.0, std::f64::consts::TAU);
        set_fill_style(self.ctx, color);
        self.ctx.fill();
    }

    pub fn ring(&self, x: f64, y: f64, r: f64, color: &str, width: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, r, 0.0, std::f64::consts::TAU);
        set_stroke_style(self.ctx, color);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    pub fn polyline(&self, pts: &[(f64, f64)], color: &str, width: f64) {
        let Some(&(x0, y0)) = pts.first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(x0, y0);
        for &(x, y) in &pts[1..] {
            self.ctx.line_to(x, y);
        }
        set_stroke_style(self.ctx, color);
        self.ctx.set_line_width(width);
        self.ctx.set_line_join("round");
        self.ctx.set_line_cap("round");
        self.ctx.stroke();
    }

    pub fn text(&self, x: f64, y: f64, s: &str, size: f64, color: &str) {
        self.ctx.set_font(&format!("{size}px sans-serif"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        set_fill_style(self.ctx, color);
        let _ = self.ctx.fill_text(s, x, y);
    }

    pub fn bold_text(&self, x: f64, y: f64, s: &str, size: f64, color: &str) {
        self.ctx.set_font(&format!("bold {size}px sans-serif"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        // Outline for contrast
        self.ctx.set_line_width((size / 5.0).clamp(2.0, 5.0));
        set_stroke_style(self.ctx, "#fff");
        let _ = self.ctx.stroke_text(s, x, y);
        set_fill_style(self.ctx, color);
        let _ = self.ctx.fill_text(s, x, y);
    }

    /// Labelled button; `fill` is the face color.
    pub fn button(&self, r: Rect, label: &str, fill: &str) {
        self.fill_rect(r.x, r.y, r.w, r.h, fill);
        self.stroke_rect(r.x, r.y, r.w, r.h, "#333", 1.6);
        self.text(r.x + r.w / 2.0, r.y + r.h / 2.0, label, (r.h * 0.45).min(22.0), "#111");
    }
}

/// Axis-aligned rectangle in widget space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Row-major `rows x cols` cell grid starting at `origin`.
#[derive(Clone, Copy, Debug)]
pub struct CellGrid {
    pub origin: (f64, f64),
    pub cell: f64,
    pub gap: f64,
    pub rows: usize,
    pub cols: usize,
}

impl CellGrid {
    pub fn rect(&self, row: usize, col: usize) -> Rect {
        let step = self.cell + self.gap;
        Rect::new(
            self.origin.0 + col as f64 * step,
            self.origin.1 + row as f64 * step,
            self.cell,
            self.cell,
        )
    }

    pub fn hit(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .find(|&(r, c)| self.rect(r, c).contains(x, y))
    }
}
