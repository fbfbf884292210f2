//! Geometry and paint primitives shared by the drawing contract

use x11rb::protocol::render::{self, PictOp};
use x11rb::protocol::xproto::Rectangle;

/// Integer point in window-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open pixel rectangle `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.min.x.saturating_add(dx),
            self.min.y.saturating_add(dy),
            self.max.x.saturating_add(dx),
            self.max.y.saturating_add(dy),
        )
    }

    /// Convert to the wire rectangle, clamping to the 16-bit protocol range
    pub fn to_x11(&self) -> Rectangle {
        Rectangle {
            x: clamp_i16(self.min.x),
            y: clamp_i16(self.min.y),
            width: self.width().clamp(0, u16::MAX as i32) as u16,
            height: self.height().clamp(0, u16::MAX as i32) as u16,
        }
    }
}

pub(crate) fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Affine transform `[a, b, c, d, e, f]` mapping `(x, y)` to
/// `(a*x + b*y + c, d*x + e*y + f)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aff3(pub [f64; 6]);

impl Aff3 {
    pub const IDENTITY: Aff3 = Aff3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

    pub fn translation(dx: f64, dy: f64) -> Self {
        Aff3([1.0, 0.0, dx, 0.0, 1.0, dy])
    }

    /// Returns the offset when the transform is a pure integer translation
    /// that fits in `i32`
    pub fn as_integer_translation(&self) -> Option<(i32, i32)> {
        let [a, b, c, d, e, f] = self.0;
        if a != 1.0 || b != 0.0 || d != 0.0 || e != 1.0 {
            return None;
        }
        if c.fract() != 0.0 || f.fract() != 0.0 {
            return None;
        }
        let range = i32::MIN as f64..=i32::MAX as f64;
        if !range.contains(&c) || !range.contains(&f) {
            return None;
        }
        Some((c as i32, f as i32))
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + b * y + c, d * x + e * y + f)
    }
}

/// Premultiplied 16-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

impl Color {
    pub const BLACK: Color = Color { red: 0, green: 0, blue: 0, alpha: 0xffff };
    pub const TRANSPARENT: Color = Color { red: 0, green: 0, blue: 0, alpha: 0 };

    /// Build from non-premultiplied 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let premul = |c: u8| -> u16 { ((c as u32 * 0x101 * a as u32) / 0xff) as u16 };
        Self {
            red: premul(r),
            green: premul(g),
            blue: premul(b),
            alpha: a as u16 * 0x101,
        }
    }

    /// Opaque color from a `0xRRGGBB` value
    pub fn from_hex(rgb: u32) -> Self {
        Self::from_rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xff)
    }

    pub(crate) fn to_render(self) -> render::Color {
        render::Color {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha: self.alpha,
        }
    }
}

/// Compositing operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawOp {
    /// Source over destination
    #[default]
    Over,
    /// Source replaces destination
    Src,
}

impl DrawOp {
    pub(crate) fn to_render(self) -> PictOp {
        match self {
            DrawOp::Over => PictOp::OVER,
            DrawOp::Src => PictOp::SRC,
        }
    }
}

/// Extra parameters for `draw`, `copy`, `scale` and `draw_uniform`.
///
/// Currently carries no fields; the type exists so that callers pass
/// `Some(&opts)` or `None` the same way once fields are added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct DrawOptions {}
