//! In-memory X server used by unit tests
//!
//! Records every request in order and answers the few replies windows need.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::render::{self, CreatePictureAux, PictOp, Picture, Pictformat, Pointfix};
use x11rb::protocol::xproto::{
    Atom, ClientMessageEvent, CreateGCAux, CreateWindowAux, Cursor, Drawable, EventMask, Gcontext,
    Rectangle, Window,
};

use crate::conn::{WindowParams, XConnection};
use crate::cursor::CursorCache;
use crate::keys::KeysymTable;
use crate::session::{Atoms, ScreenInfo, Session};
use crate::resource::NativeHandles;
use crate::window::Window as AppWindow;

pub const ROOT: Window = 0x100;
pub const WINDOW: Window = 0x20_0001;
pub const GC: Gcontext = 0x20_0002;
pub const PICTURE: Picture = 0x20_0003;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateWindow(Window),
    CreateGc(Gcontext),
    CreatePicture(Picture),
    FreePicture(Picture),
    FreeGc(Gcontext),
    DestroyWindow(Window),
    FillRectangles { op: PictOp, dst: Picture, color: render::Color, rects: Vec<Rectangle> },
    CreateSolidFill(Picture),
    TriFan { op: PictOp, src: Picture, dst: Picture, points: Vec<Pointfix> },
    ChangeCursor { window: Window, cursor: Cursor },
    ChangeProperty { window: Window, property: Atom, type_: Atom, format: u8, data: Vec<u8> },
    MapWindow(Window),
    GetInputFocus,
    TranslateCoordinates { src: Window, dst: Window, x: i16, y: i16 },
    WarpPointer { dst: Window, x: i16, y: i16 },
    SendEvent { destination: Window, mask: EventMask, event: [u8; 32] },
    Sync,
}

pub fn reply_error() -> ReplyError {
    ReplyError::ConnectionError(ConnectionError::UnknownError)
}

#[derive(Debug, Default)]
pub struct FakeServer {
    requests: Mutex<Vec<Request>>,
    properties: Mutex<HashMap<(Window, Atom), Vec<u8>>>,
    next_id: AtomicU32,
    pub focus: Mutex<Window>,
    /// Offset of the window origin in root coordinates
    pub origin: Mutex<(i16, i16)>,
    pub fail_translate: Mutex<bool>,
    pub fail_focus: Mutex<bool>,
    pub fail_property: Mutex<bool>,
    pub fail_send: Mutex<bool>,
    pub fail_map: Mutex<bool>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(0x20_0001),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }
}

impl XConnection for FakeServer {
    fn generate_id(&self) -> Result<u32, ReplyOrIdError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn create_window(&self, wid: Window, _params: &WindowParams, _aux: &CreateWindowAux) -> Result<(), ConnectionError> {
        self.record(Request::CreateWindow(wid));
        Ok(())
    }

    fn create_gc(&self, gc: Gcontext, _drawable: Drawable, _aux: &CreateGCAux) -> Result<(), ConnectionError> {
        self.record(Request::CreateGc(gc));
        Ok(())
    }

    fn create_picture(
        &self,
        picture: Picture,
        _drawable: Drawable,
        _format: Pictformat,
        _aux: &CreatePictureAux,
    ) -> Result<(), ConnectionError> {
        self.record(Request::CreatePicture(picture));
        Ok(())
    }

    fn free_picture(&self, picture: Picture) -> Result<(), ConnectionError> {
        self.record(Request::FreePicture(picture));
        Ok(())
    }

    fn free_gc(&self, gc: Gcontext) -> Result<(), ConnectionError> {
        self.record(Request::FreeGc(gc));
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<(), ConnectionError> {
        self.record(Request::DestroyWindow(window));
        Ok(())
    }

    fn fill_rectangles(
        &self,
        op: PictOp,
        dst: Picture,
        color: render::Color,
        rects: &[Rectangle],
    ) -> Result<(), ConnectionError> {
        self.record(Request::FillRectangles { op, dst, color, rects: rects.to_vec() });
        Ok(())
    }

    fn create_solid_fill(&self, picture: Picture, _color: render::Color) -> Result<(), ConnectionError> {
        self.record(Request::CreateSolidFill(picture));
        Ok(())
    }

    fn tri_fan(&self, op: PictOp, src: Picture, dst: Picture, points: &[Pointfix]) -> Result<(), ConnectionError> {
        self.record(Request::TriFan { op, src, dst, points: points.to_vec() });
        Ok(())
    }

    fn change_cursor(&self, window: Window, cursor: Cursor) -> Result<(), ConnectionError> {
        self.record(Request::ChangeCursor { window, cursor });
        Ok(())
    }

    fn change_property8(&self, window: Window, property: Atom, type_: Atom, data: &[u8]) -> Result<(), ReplyError> {
        self.record(Request::ChangeProperty { window, property, type_, format: 8, data: data.to_vec() });
        if *self.fail_property.lock().unwrap() {
            return Err(reply_error());
        }
        self.properties.lock().unwrap().insert((window, property), data.to_vec());
        Ok(())
    }

    fn change_property32(&self, window: Window, property: Atom, type_: Atom, data: &[u32]) -> Result<(), ReplyError> {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
        self.record(Request::ChangeProperty { window, property, type_, format: 32, data: bytes.clone() });
        self.properties.lock().unwrap().insert((window, property), bytes);
        Ok(())
    }

    fn get_property(&self, window: Window, property: Atom, _type_: Atom) -> Result<Vec<u8>, ReplyError> {
        Ok(self.properties.lock().unwrap().get(&(window, property)).cloned().unwrap_or_default())
    }

    fn map_window(&self, window: Window) -> Result<(), ReplyError> {
        self.record(Request::MapWindow(window));
        if *self.fail_map.lock().unwrap() {
            return Err(reply_error());
        }
        Ok(())
    }

    fn get_input_focus(&self) -> Result<Window, ReplyError> {
        self.record(Request::GetInputFocus);
        if *self.fail_focus.lock().unwrap() {
            return Err(reply_error());
        }
        Ok(*self.focus.lock().unwrap())
    }

    fn translate_coordinates(&self, src: Window, dst: Window, x: i16, y: i16) -> Result<(i16, i16), ReplyError> {
        self.record(Request::TranslateCoordinates { src, dst, x, y });
        if *self.fail_translate.lock().unwrap() {
            return Err(reply_error());
        }
        let (ox, oy) = *self.origin.lock().unwrap();
        Ok((x + ox, y + oy))
    }

    fn warp_pointer(&self, dst: Window, x: i16, y: i16) -> Result<(), ReplyError> {
        self.record(Request::WarpPointer { dst, x, y });
        Ok(())
    }

    fn send_event(&self, destination: Window, mask: EventMask, event: ClientMessageEvent) -> Result<(), ReplyError> {
        self.record(Request::SendEvent { destination, mask, event: event.into() });
        if *self.fail_send.lock().unwrap() {
            return Err(reply_error());
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn sync(&self) -> Result<(), ReplyError> {
        self.record(Request::Sync);
        Ok(())
    }
}

pub fn atoms() -> Atoms {
    Atoms {
        net_wm_name: 301,
        utf8_string: 302,
        net_active_window: 303,
        wm_protocols: 304,
        wm_delete_window: 305,
    }
}

pub fn screen_info() -> ScreenInfo {
    ScreenInfo {
        root: ROOT,
        root_depth: 24,
        root_visual: 0x21,
        pictformat: 0x25,
        width_px: 1920,
        height_px: 1080,
        pixels_per_pt: 1.5,
    }
}

pub fn session(server: Arc<FakeServer>) -> Arc<Session<FakeServer>> {
    session_with_cursors(server, CursorCache::new())
}

pub fn session_with_cursors(server: Arc<FakeServer>, cursors: CursorCache) -> Arc<Session<FakeServer>> {
    Arc::new(Session::new(
        server,
        screen_info(),
        atoms(),
        KeysymTable::new(10, 2, vec![0x61, 0x41, 0xff1b, 0]),
        cursors,
    ))
}

fn handles() -> NativeHandles {
    NativeHandles {
        window: WINDOW,
        gc: GC,
        picture: PICTURE,
    }
}

/// A window over fresh fake handles, as the window factory would build it
pub fn window(server: Arc<FakeServer>) -> Arc<AppWindow<FakeServer>> {
    Arc::new(AppWindow::new(session(server), handles()))
}

pub fn window_with_cursors(server: Arc<FakeServer>, cursors: CursorCache) -> Arc<AppWindow<FakeServer>> {
    Arc::new(AppWindow::new(session_with_cursors(server, cursors), handles()))
}
