//! Drawing Surface
//!
//! Immediate-mode drawing against the window's live picture. There is no
//! back buffer: `publish` is a round trip that keeps the client from queueing
//! more server-side work than the server can execute.

use tracing::trace;
use x11rb::protocol::render::{Fixed, Picture, Pointfix};
use x11rb::protocol::xproto::{Drawable, Gcontext};

use crate::conn::XConnection;
use crate::drawer;
use crate::error::Result;
use crate::geom::{Aff3, Color, DrawOp, DrawOptions, Point, Rect};
use crate::window::Window;

/// Destination capability handed to buffers and textures so they can draw
/// into a window without holding a reference to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTarget {
    pub drawable: Drawable,
    pub gc: Gcontext,
    pub picture: Picture,
    pub depth: u8,
}

/// Client-side pixel buffer that can upload itself to a drawable
pub trait Buffer {
    fn upload(&self, dst: &DrawTarget, dp: Point, sr: Rect) -> Result<()>;
}

/// Server-side texture that can composite itself onto a picture
pub trait Texture {
    fn draw(
        &self,
        dst: &DrawTarget,
        src2dst: &Aff3,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()>;
}

/// Anything textures can be drawn onto; `drawer::copy` and `drawer::scale`
/// are written against this
pub trait Drawer {
    fn draw(
        &self,
        src2dst: Aff3,
        src: &dyn Texture,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()>;
}

/// Outcome of [`Window::publish`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct PublishResult {}

fn to_fixed(v: f64) -> Fixed {
    (v * 65536.0).round() as Fixed
}

impl<C: XConnection> Window<C> {
    /// Destination capability for this window
    pub fn draw_target(&self) -> Result<DrawTarget> {
        let h = self.live_handles()?;
        Ok(DrawTarget {
            drawable: h.window,
            gc: h.gc,
            picture: h.picture,
            depth: self.session.screen.root_depth,
        })
    }

    /// Copy `sr` of `src` to `dp` in the window
    pub fn upload(&self, dp: Point, src: &dyn Buffer, sr: Rect) -> Result<()> {
        let target = self.draw_target()?;
        src.upload(&target, dp, sr)
    }

    /// Fill `dr` with a solid color
    pub fn fill(&self, dr: Rect, color: Color, op: DrawOp) -> Result<()> {
        let h = self.live_handles()?;
        if dr.is_empty() {
            return Ok(());
        }
        self.conn()
            .fill_rectangles(op.to_render(), h.picture, color.to_render(), &[dr.to_x11()])?;
        Ok(())
    }

    /// Paint `sr`, mapped through `src2dst`, with a solid color
    pub fn draw_uniform(
        &self,
        src2dst: Aff3,
        color: Color,
        sr: Rect,
        op: DrawOp,
        _opts: Option<&DrawOptions>,
    ) -> Result<()> {
        let h = self.live_handles()?;
        if sr.is_empty() {
            return Ok(());
        }
        if let Some((dx, dy)) = src2dst.as_integer_translation() {
            return self.fill(sr.translate(dx, dy), color, op);
        }

        let corners = [
            (sr.min.x, sr.min.y),
            (sr.max.x, sr.min.y),
            (sr.max.x, sr.max.y),
            (sr.min.x, sr.max.y),
        ];
        let points: Vec<Pointfix> = corners
            .iter()
            .map(|&(x, y)| {
                let (x, y) = src2dst.apply(x as f64, y as f64);
                Pointfix {
                    x: to_fixed(x),
                    y: to_fixed(y),
                }
            })
            .collect();
        trace!("draw_uniform trifan {:?}", points);

        let conn = self.conn();
        let solid = conn.generate_id()?;
        conn.create_solid_fill(solid, color.to_render())?;
        conn.tri_fan(op.to_render(), solid, h.picture, &points)?;
        conn.free_picture(solid)?;
        Ok(())
    }

    /// Draw `sr` of `src`, mapped through `src2dst`
    pub fn draw(
        &self,
        src2dst: Aff3,
        src: &dyn Texture,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()> {
        let target = self.draw_target()?;
        src.draw(&target, &src2dst, sr, op, opts)
    }

    /// Draw `sr` of `src` unscaled with its top-left at `dp`
    pub fn copy(
        &self,
        dp: Point,
        src: &dyn Texture,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()> {
        drawer::copy(self, dp, src, sr, op, opts)
    }

    /// Draw `sr` of `src` stretched to fill `dr`
    pub fn scale(
        &self,
        dr: Rect,
        src: &dyn Texture,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()> {
        drawer::scale(self, dr, src, sr, op, opts)
    }

    /// Block until the server has processed every request sent so far.
    ///
    /// Draw requests are small on the wire but can be expensive to execute
    /// (blending a full screen of pixels); this round trip is the only
    /// backpressure keeping a fast producer from running ahead of the
    /// server. It does not swap buffers.
    pub fn publish(&self) -> Result<PublishResult> {
        self.live_handles()?;
        self.conn().sync()?;
        Ok(PublishResult::default())
    }
}

impl<C: XConnection> Drawer for Window<C> {
    fn draw(
        &self,
        src2dst: Aff3,
        src: &dyn Texture,
        sr: Rect,
        op: DrawOp,
        opts: Option<&DrawOptions>,
    ) -> Result<()> {
        Window::draw(self, src2dst, src, sr, op, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WindowError;
    use crate::testing::{self, FakeServer, Request, GC, PICTURE, WINDOW};
    use std::sync::{Arc, Mutex};
    use x11rb::protocol::render::PictOp;
    use x11rb::protocol::xproto::Rectangle;

    #[derive(Default)]
    struct RecordingTexture {
        draws: Mutex<Vec<(DrawTarget, Aff3, Rect, DrawOp)>>,
    }

    impl Texture for RecordingTexture {
        fn draw(
            &self,
            dst: &DrawTarget,
            src2dst: &Aff3,
            sr: Rect,
            op: DrawOp,
            _opts: Option<&DrawOptions>,
        ) -> Result<()> {
            self.draws.lock().unwrap().push((*dst, *src2dst, sr, op));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingBuffer {
        uploads: Mutex<Vec<(DrawTarget, Point, Rect)>>,
    }

    impl Buffer for RecordingBuffer {
        fn upload(&self, dst: &DrawTarget, dp: Point, sr: Rect) -> Result<()> {
            self.uploads.lock().unwrap().push((*dst, dp, sr));
            Ok(())
        }
    }

    fn target() -> DrawTarget {
        DrawTarget {
            drawable: WINDOW,
            gc: GC,
            picture: PICTURE,
            depth: 24,
        }
    }

    #[test]
    fn test_fill_uses_window_picture() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        w.fill(Rect::new(0, 0, 10, 20), Color::BLACK, DrawOp::Src).unwrap();
        assert_eq!(
            server.requests(),
            vec![Request::FillRectangles {
                op: PictOp::SRC,
                dst: PICTURE,
                color: Color::BLACK.to_render(),
                rects: vec![Rectangle { x: 0, y: 0, width: 10, height: 20 }],
            }]
        );
    }

    #[test]
    fn test_draw_uniform_translation_becomes_fill() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        w.draw_uniform(Aff3::translation(5.0, 7.0), Color::BLACK, Rect::new(0, 0, 2, 3), DrawOp::Over, None)
            .unwrap();
        assert!(matches!(
            &server.requests()[..],
            [Request::FillRectangles { rects, .. }] if rects == &vec![Rectangle { x: 5, y: 7, width: 2, height: 3 }]
        ));
    }

    #[test]
    fn test_draw_uniform_scaled_uses_trifan() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        let t = Aff3([2.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
        w.draw_uniform(t, Color::BLACK, Rect::new(0, 0, 1, 1), DrawOp::Over, None).unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        let Request::CreateSolidFill(solid) = requests[0] else {
            panic!("expected solid fill, got {:?}", requests[0]);
        };
        match &requests[1] {
            Request::TriFan { src, dst, points, .. } => {
                assert_eq!(*src, solid);
                assert_eq!(*dst, PICTURE);
                let xy: Vec<(i32, i32)> = points.iter().map(|p| (p.x >> 16, p.y >> 16)).collect();
                assert_eq!(xy, vec![(0, 0), (2, 0), (2, 2), (0, 2)]);
            }
            other => panic!("expected trifan, got {:?}", other),
        }
        assert_eq!(requests[2], Request::FreePicture(solid));
    }

    #[test]
    fn test_draw_uniform_huge_translation_does_not_overflow() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        w.draw_uniform(Aff3::translation(3.0e9, 0.0), Color::BLACK, Rect::new(1, 0, 2, 1), DrawOp::Over, None)
            .unwrap();
        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert!(matches!(requests[1], Request::TriFan { .. }));
    }

    #[test]
    fn test_empty_source_draws_nothing() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        w.draw_uniform(Aff3::IDENTITY, Color::BLACK, Rect::new(3, 3, 3, 9), DrawOp::Over, None)
            .unwrap();
        w.fill(Rect::new(0, 0, 0, 0), Color::BLACK, DrawOp::Over).unwrap();
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_draw_and_upload_delegate_with_target() {
        let w = testing::window(Arc::new(FakeServer::new()));
        let tex = RecordingTexture::default();
        let buf = RecordingBuffer::default();
        let sr = Rect::new(0, 0, 4, 4);

        w.draw(Aff3::IDENTITY, &tex, sr, DrawOp::Over, None).unwrap();
        w.upload(Point::new(1, 2), &buf, sr).unwrap();

        assert_eq!(tex.draws.lock().unwrap()[0], (target(), Aff3::IDENTITY, sr, DrawOp::Over));
        assert_eq!(buf.uploads.lock().unwrap()[0], (target(), Point::new(1, 2), sr));
    }

    #[test]
    fn test_copy_and_scale_go_through_draw() {
        let w = testing::window(Arc::new(FakeServer::new()));
        let tex = RecordingTexture::default();
        w.copy(Point::new(10, 10), &tex, Rect::new(2, 3, 6, 7), DrawOp::Src, None).unwrap();
        w.scale(Rect::new(0, 0, 8, 8), &tex, Rect::new(0, 0, 4, 4), DrawOp::Over, None).unwrap();

        let draws = tex.draws.lock().unwrap();
        assert_eq!(draws[0].1, Aff3::translation(8.0, 7.0));
        assert_eq!(draws[1].1, Aff3([2.0, 0.0, 0.0, 0.0, 2.0, 0.0]));
    }

    #[test]
    fn test_publish_syncs() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        assert_eq!(w.publish().unwrap(), PublishResult::default());
        assert_eq!(server.requests(), vec![Request::Sync]);
    }

    #[test]
    fn test_drawing_after_release_is_rejected() {
        let server = Arc::new(FakeServer::new());
        let w = testing::window(server.clone());
        w.release();
        server.clear();

        let tex = RecordingTexture::default();
        assert!(matches!(w.fill(Rect::new(0, 0, 1, 1), Color::BLACK, DrawOp::Over), Err(WindowError::Closed(WINDOW))));
        assert!(matches!(w.draw(Aff3::IDENTITY, &tex, Rect::new(0, 0, 1, 1), DrawOp::Over, None), Err(WindowError::Closed(_))));
        assert!(matches!(w.publish(), Err(WindowError::Closed(_))));
        assert!(server.requests().is_empty());
        assert!(tex.draws.lock().unwrap().is_empty());
    }
}
