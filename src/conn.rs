//! X11 protocol seam
//!
//! Every request a window issues goes through [`XConnection`]. Requests that
//! return `ConnectionError` are fire-and-forget: the server reports failures
//! asynchronously as error events. Requests that return `ReplyError` wait for
//! the server's reply or acknowledgement.

use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::render::{self, CreatePictureAux, PictOp, Picture, Pictformat, Pointfix};
use x11rb::protocol::xproto::{
    self, Atom, ChangeWindowAttributesAux, ClientMessageEvent, CreateGCAux, CreateWindowAux,
    Cursor, Drawable, EventMask, Gcontext, PropMode, Rectangle, Visualid, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;

/// Geometry and visual of a new top-level window
#[derive(Debug, Clone, Copy)]
pub struct WindowParams {
    pub parent: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub visual: Visualid,
}

pub trait XConnection: Send + Sync {
    fn generate_id(&self) -> Result<u32, ReplyOrIdError>;

    // Resource creation and teardown (unchecked)
    fn create_window(
        &self,
        wid: Window,
        params: &WindowParams,
        aux: &CreateWindowAux,
    ) -> Result<(), ConnectionError>;
    fn create_gc(&self, gc: Gcontext, drawable: Drawable, aux: &CreateGCAux) -> Result<(), ConnectionError>;
    fn create_picture(
        &self,
        picture: Picture,
        drawable: Drawable,
        format: Pictformat,
        aux: &CreatePictureAux,
    ) -> Result<(), ConnectionError>;
    fn free_picture(&self, picture: Picture) -> Result<(), ConnectionError>;
    fn free_gc(&self, gc: Gcontext) -> Result<(), ConnectionError>;
    fn destroy_window(&self, window: Window) -> Result<(), ConnectionError>;

    // Drawing (unchecked)
    fn fill_rectangles(
        &self,
        op: PictOp,
        dst: Picture,
        color: render::Color,
        rects: &[Rectangle],
    ) -> Result<(), ConnectionError>;
    fn create_solid_fill(&self, picture: Picture, color: render::Color) -> Result<(), ConnectionError>;
    fn tri_fan(
        &self,
        op: PictOp,
        src: Picture,
        dst: Picture,
        points: &[Pointfix],
    ) -> Result<(), ConnectionError>;

    // Window attributes
    fn change_cursor(&self, window: Window, cursor: Cursor) -> Result<(), ConnectionError>;
    fn change_property8(&self, window: Window, property: Atom, type_: Atom, data: &[u8]) -> Result<(), ReplyError>;
    fn change_property32(&self, window: Window, property: Atom, type_: Atom, data: &[u32]) -> Result<(), ReplyError>;
    fn get_property(&self, window: Window, property: Atom, type_: Atom) -> Result<Vec<u8>, ReplyError>;
    fn map_window(&self, window: Window) -> Result<(), ReplyError>;

    // Pointer and focus
    fn get_input_focus(&self) -> Result<Window, ReplyError>;
    fn translate_coordinates(&self, src: Window, dst: Window, x: i16, y: i16) -> Result<(i16, i16), ReplyError>;
    fn warp_pointer(&self, dst: Window, x: i16, y: i16) -> Result<(), ReplyError>;

    fn send_event(&self, destination: Window, mask: EventMask, event: ClientMessageEvent) -> Result<(), ReplyError>;

    fn flush(&self) -> Result<(), ConnectionError>;
    /// Round trip: returns once the server has processed every earlier request
    fn sync(&self) -> Result<(), ReplyError>;
}

impl XConnection for RustConnection {
    fn generate_id(&self) -> Result<u32, ReplyOrIdError> {
        Connection::generate_id(self)
    }

    fn create_window(
        &self,
        wid: Window,
        params: &WindowParams,
        aux: &CreateWindowAux,
    ) -> Result<(), ConnectionError> {
        xproto::create_window(
            self,
            params.depth,
            wid,
            params.parent,
            params.x,
            params.y,
            params.width,
            params.height,
            0,
            WindowClass::INPUT_OUTPUT,
            params.visual,
            aux,
        )?;
        Ok(())
    }

    fn create_gc(&self, gc: Gcontext, drawable: Drawable, aux: &CreateGCAux) -> Result<(), ConnectionError> {
        xproto::create_gc(self, gc, drawable, aux)?;
        Ok(())
    }

    fn create_picture(
        &self,
        picture: Picture,
        drawable: Drawable,
        format: Pictformat,
        aux: &CreatePictureAux,
    ) -> Result<(), ConnectionError> {
        render::create_picture(self, picture, drawable, format, aux)?;
        Ok(())
    }

    fn free_picture(&self, picture: Picture) -> Result<(), ConnectionError> {
        render::free_picture(self, picture)?;
        Ok(())
    }

    fn free_gc(&self, gc: Gcontext) -> Result<(), ConnectionError> {
        xproto::free_gc(self, gc)?;
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<(), ConnectionError> {
        xproto::destroy_window(self, window)?;
        Ok(())
    }

    fn fill_rectangles(
        &self,
        op: PictOp,
        dst: Picture,
        color: render::Color,
        rects: &[Rectangle],
    ) -> Result<(), ConnectionError> {
        render::fill_rectangles(self, op, dst, color, rects)?;
        Ok(())
    }

    fn create_solid_fill(&self, picture: Picture, color: render::Color) -> Result<(), ConnectionError> {
        render::create_solid_fill(self, picture, color)?;
        Ok(())
    }

    fn tri_fan(
        &self,
        op: PictOp,
        src: Picture,
        dst: Picture,
        points: &[Pointfix],
    ) -> Result<(), ConnectionError> {
        render::tri_fan(self, op, src, dst, x11rb::NONE, 0, 0, points)?;
        Ok(())
    }

    fn change_cursor(&self, window: Window, cursor: Cursor) -> Result<(), ConnectionError> {
        xproto::change_window_attributes(self, window, &ChangeWindowAttributesAux::new().cursor(cursor))?;
        Ok(())
    }

    fn change_property8(&self, window: Window, property: Atom, type_: Atom, data: &[u8]) -> Result<(), ReplyError> {
        xproto::change_property(
            self,
            PropMode::REPLACE,
            window,
            property,
            type_,
            8,
            data.len() as u32,
            data,
        )?
        .check()
    }

    fn change_property32(&self, window: Window, property: Atom, type_: Atom, data: &[u32]) -> Result<(), ReplyError> {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        xproto::change_property(
            self,
            PropMode::REPLACE,
            window,
            property,
            type_,
            32,
            data.len() as u32,
            &bytes,
        )?
        .check()
    }

    fn get_property(&self, window: Window, property: Atom, type_: Atom) -> Result<Vec<u8>, ReplyError> {
        let reply = xproto::get_property(self, false, window, property, type_, 0, u32::MAX / 4)?.reply()?;
        Ok(reply.value)
    }

    fn map_window(&self, window: Window) -> Result<(), ReplyError> {
        xproto::map_window(self, window)?.check()
    }

    fn get_input_focus(&self) -> Result<Window, ReplyError> {
        Ok(xproto::get_input_focus(self)?.reply()?.focus)
    }

    fn translate_coordinates(&self, src: Window, dst: Window, x: i16, y: i16) -> Result<(i16, i16), ReplyError> {
        let reply = xproto::translate_coordinates(self, src, dst, x, y)?.reply()?;
        Ok((reply.dst_x, reply.dst_y))
    }

    fn warp_pointer(&self, dst: Window, x: i16, y: i16) -> Result<(), ReplyError> {
        xproto::warp_pointer(self, x11rb::NONE, dst, 0, 0, 0, 0, x, y)?.check()
    }

    fn send_event(&self, destination: Window, mask: EventMask, event: ClientMessageEvent) -> Result<(), ReplyError> {
        xproto::send_event(self, false, destination, mask, event)?.check()
    }

    fn flush(&self) -> Result<(), ConnectionError> {
        Connection::flush(self)
    }

    fn sync(&self) -> Result<(), ReplyError> {
        xproto::get_input_focus(self)?.reply()?;
        Ok(())
    }
}
