//! Fixed-layout parameter blocks, one per callback
//!
//! These mirror the C structs the engine-side shim fills in before invoking
//! the host callback. Input fields are read; output fields are written back
//! in place before the callback returns.

use std::borrow::Cow;
use std::ffi::{c_char, c_int, c_uint, CStr};

use log::warn;

use super::Callback;
use crate::rendering::paint::{PaintOp, Reply};

#[repr(C)]
#[derive(Debug)]
pub struct CreateFontBlock {
    pub face: *const c_char,
    pub size: c_int,
    pub weight: c_int,
    pub italic: c_int,
    pub decoration: c_uint,
    // out
    pub ascent: c_int,
    pub descent: c_int,
    pub height: c_int,
    pub x_height: c_int,
    pub font: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct TextWidthBlock {
    pub text: *const c_char,
    pub font: c_int,
    // out
    pub width: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct DrawTextBlock {
    pub dc: c_int,
    pub text: *const c_char,
    pub font: c_int,
    pub color: c_uint,
    pub x: c_int,
    pub y: c_int,
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct DrawBackgroundBlock {
    pub dc: c_int,
    pub x: c_int,
    pub y: c_int,
    pub w: c_int,
    pub h: c_int,
    pub color: c_uint,
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct DrawBordersBlock {
    pub dc: c_int,
    pub left: c_int,
    pub right: c_int,
    pub top: c_int,
    pub bottom: c_int,
    pub color_left: c_uint,
    pub color_right: c_uint,
    pub color_top: c_uint,
    pub color_bottom: c_uint,
    pub width_left: c_int,
    pub width_right: c_int,
    pub width_top: c_int,
    pub width_bottom: c_int,
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct DrawMarkerBlock {
    pub dc: c_int,
    pub x: c_int,
    pub y: c_int,
    pub w: c_int,
    pub h: c_int,
    pub mt: c_int,
    pub color: c_uint,
}

/// `pt` is overwritten with the pixel value.
#[repr(C)]
#[derive(Debug, Default)]
pub struct Pt2PxBlock {
    pub pt: c_int,
}

/// A C parameter block the dispatcher knows how to decode and answer.
pub trait ParamBlock {
    const CALLBACK: Callback;

    /// Read the input fields.
    ///
    /// # Safety
    /// String pointers in the block must be null or point to NUL-terminated
    /// memory that stays valid for the duration of the call.
    unsafe fn decode(&self) -> PaintOp;

    /// Write the output fields, if the block has any.
    fn store(&mut self, _reply: &Reply) {}
}

/// Copy a C string out of a block. Null reads as `None`; invalid UTF-8 is
/// replaced rather than rejected.
unsafe fn read_str(ptr: *const c_char, callback: Callback) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    match raw.to_string_lossy() {
        Cow::Borrowed(s) => Some(s.to_string()),
        Cow::Owned(s) => {
            warn!("{}: text is not valid UTF-8, replacing invalid bytes", callback.name());
            Some(s)
        }
    }
}

impl ParamBlock for CreateFontBlock {
    const CALLBACK: Callback = Callback::CreateFont;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::CreateFont {
            face: unsafe { read_str(self.face, Self::CALLBACK) },
            size: self.size,
            weight: self.weight,
            italic: self.italic != 0,
            decoration: self.decoration,
        }
    }

    fn store(&mut self, reply: &Reply) {
        if let Reply::Font { handle, metrics } = reply {
            self.ascent = metrics.ascent;
            self.descent = metrics.descent;
            self.height = metrics.height;
            self.x_height = metrics.x_height;
            self.font = handle.0;
        }
    }
}

impl ParamBlock for TextWidthBlock {
    const CALLBACK: Callback = Callback::TextWidth;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::TextWidth {
            text: unsafe { read_str(self.text, Self::CALLBACK) }.unwrap_or_default(),
            font: self.font,
        }
    }

    fn store(&mut self, reply: &Reply) {
        if let Reply::Width(width) = reply {
            self.width = *width;
        }
    }
}

impl ParamBlock for DrawTextBlock {
    const CALLBACK: Callback = Callback::DrawText;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::DrawText {
            text: unsafe { read_str(self.text, Self::CALLBACK) }.unwrap_or_default(),
            font: self.font,
            color: self.color,
            x: self.x,
            y: self.y,
        }
    }
}

impl ParamBlock for DrawBackgroundBlock {
    const CALLBACK: Callback = Callback::DrawBackground;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::DrawBackground {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            color: self.color,
        }
    }
}

impl ParamBlock for DrawBordersBlock {
    const CALLBACK: Callback = Callback::DrawBorders;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::DrawBorders {
            left: self.left,
            right: self.right,
            top: self.top,
            bottom: self.bottom,
            color_left: self.color_left,
            color_right: self.color_right,
            color_top: self.color_top,
            color_bottom: self.color_bottom,
            width_left: self.width_left,
            width_right: self.width_right,
            width_top: self.width_top,
            width_bottom: self.width_bottom,
        }
    }
}

impl ParamBlock for DrawMarkerBlock {
    const CALLBACK: Callback = Callback::DrawMarker;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::DrawMarker {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            mt: self.mt,
            color: self.color,
        }
    }
}

impl ParamBlock for Pt2PxBlock {
    const CALLBACK: Callback = Callback::Pt2Px;

    unsafe fn decode(&self) -> PaintOp {
        PaintOp::Pt2px { pt: self.pt }
    }

    fn store(&mut self, reply: &Reply) {
        if let Reply::Pixels(px) = reply {
            self.pt = *px;
        }
    }
}
