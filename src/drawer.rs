//! Copy and scale, expressed in terms of a [`Drawer`]'s `draw`

use crate::error::Result;
use crate::geom::{Aff3, DrawOp, DrawOptions, Point, Rect};
use crate::surface::{Drawer, Texture};

/// Draw `sr` of `src` unscaled so that `sr.min` lands on `dp`
pub fn copy<D: Drawer + ?Sized>(
    dst: &D,
    dp: Point,
    src: &dyn Texture,
    sr: Rect,
    op: DrawOp,
    opts: Option<&DrawOptions>,
) -> Result<()> {
    let t = Aff3::translation(
        dp.x as f64 - sr.min.x as f64,
        dp.y as f64 - sr.min.y as f64,
    );
    dst.draw(t, src, sr, op, opts)
}

/// Draw `sr` of `src` stretched to cover `dr`
pub fn scale<D: Drawer + ?Sized>(
    dst: &D,
    dr: Rect,
    src: &dyn Texture,
    sr: Rect,
    op: DrawOp,
    opts: Option<&DrawOptions>,
) -> Result<()> {
    if sr.is_empty() || dr.is_empty() {
        return Ok(());
    }
    let rx = dr.width() as f64 / sr.width() as f64;
    let ry = dr.height() as f64 / sr.height() as f64;
    let t = Aff3([
        rx,
        0.0,
        dr.min.x as f64 - rx * sr.min.x as f64,
        0.0,
        ry,
        dr.min.y as f64 - ry * sr.min.y as f64,
    ]);
    dst.draw(t, src, sr, op, opts)
}
