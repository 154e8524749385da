//! Trace engine: replays a recorded paint trace through the C callback
//!
//! The document handed to [`TraceEngine::render`] is a JSON array of
//! [`PaintOp`]s rather than HTML. Each op is packed into the same
//! `#[repr(C)]` parameter block the native engine would build and sent
//! through the host callback pointer, so the whole bridge runs without
//! the native library.

use std::ffi::{c_void, CString};

use log::{info, trace};

use crate::bridge::blocks::{
    CreateFontBlock, DrawBackgroundBlock, DrawBordersBlock, DrawMarkerBlock, DrawTextBlock, Pt2PxBlock,
    TextWidthBlock,
};
use crate::bridge::{Callback, HostCallback};
use crate::error::{Error, Result};
use crate::rendering::paint::{parse_trace, PaintOp};
use crate::LayoutEngine;

pub struct TraceEngine {
    callback: HostCallback,
    /// Handles returned for each `createFont` of the current trace, in order.
    fonts: Vec<i32>,
    /// Outputs of measurement ops from the last render.
    measured: Vec<i32>,
}

impl TraceEngine {
    pub fn new(callback: HostCallback) -> Self {
        Self {
            callback,
            fonts: Vec::new(),
            measured: Vec::new(),
        }
    }

    /// Values the host wrote back for `textWidth` and `pt2px` during the last render.
    pub fn measured(&self) -> &[i32] {
        &self.measured
    }

    fn font(&self, index: i32) -> Result<i32> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.fonts.get(i).copied())
            .ok_or_else(|| Error::TraceError(format!("font {} used before it was created", index)))
    }

    fn send<B>(&self, callback: Callback, block: &mut B) {
        let block = (block as *mut B).cast::<c_void>();
        // SAFETY: `block` is the parameter block for `callback` and outlives the call.
        unsafe { (self.callback)(callback.c_name().as_ptr(), block) }
    }

    fn replay(&mut self, op: &PaintOp) -> Result<()> {
        trace!("replay {:?}", op);
        match op {
            PaintOp::CreateFont { face, size, weight, italic, decoration } => {
                let face = face.as_deref().map(c_string).transpose()?;
                let mut block = CreateFontBlock {
                    face: face.as_ref().map_or(std::ptr::null(), |f| f.as_ptr()),
                    size: *size,
                    weight: *weight,
                    italic: i32::from(*italic),
                    decoration: *decoration,
                    ascent: 0,
                    descent: 0,
                    height: 0,
                    x_height: 0,
                    font: -1,
                };
                self.send(Callback::CreateFont, &mut block);
                self.fonts.push(block.font);
            }
            PaintOp::TextWidth { text, font } => {
                let text = c_string(text)?;
                let mut block = TextWidthBlock {
                    text: text.as_ptr(),
                    font: self.font(*font)?,
                    width: 0,
                };
                self.send(Callback::TextWidth, &mut block);
                self.measured.push(block.width);
            }
            PaintOp::DrawText { text, font, color, x, y } => {
                let text = c_string(text)?;
                let mut block = DrawTextBlock {
                    dc: 0,
                    text: text.as_ptr(),
                    font: self.font(*font)?,
                    color: *color,
                    x: *x,
                    y: *y,
                };
                self.send(Callback::DrawText, &mut block);
            }
            PaintOp::DrawBackground { x, y, w, h, color } => {
                let mut block = DrawBackgroundBlock { dc: 0, x: *x, y: *y, w: *w, h: *h, color: *color };
                self.send(Callback::DrawBackground, &mut block);
            }
            PaintOp::DrawBorders {
                left,
                right,
                top,
                bottom,
                color_left,
                color_right,
                color_top,
                color_bottom,
                width_left,
                width_right,
                width_top,
                width_bottom,
            } => {
                let mut block = DrawBordersBlock {
                    dc: 0,
                    left: *left,
                    right: *right,
                    top: *top,
                    bottom: *bottom,
                    color_left: *color_left,
                    color_right: *color_right,
                    color_top: *color_top,
                    color_bottom: *color_bottom,
                    width_left: *width_left,
                    width_right: *width_right,
                    width_top: *width_top,
                    width_bottom: *width_bottom,
                };
                self.send(Callback::DrawBorders, &mut block);
            }
            PaintOp::DrawMarker { x, y, w, h, mt, color } => {
                let mut block = DrawMarkerBlock { dc: 0, x: *x, y: *y, w: *w, h: *h, mt: *mt, color: *color };
                self.send(Callback::DrawMarker, &mut block);
            }
            PaintOp::Pt2px { pt } => {
                let mut block = Pt2PxBlock { pt: *pt };
                self.send(Callback::Pt2Px, &mut block);
                self.measured.push(block.pt);
            }
        }
        Ok(())
    }
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|e| Error::TraceError(format!("string contains a NUL byte: {}", e)))
}

impl LayoutEngine for TraceEngine {
    fn render(&mut self, document: &[u8]) -> Result<()> {
        let ops = parse_trace(document)?;
        info!("replaying {} paint ops", ops.len());
        self.fonts.clear();
        self.measured.clear();
        for op in &ops {
            self.replay(op)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{host_callback, with_container};
    use crate::testing::FixedPitch;

    #[test]
    fn replays_through_the_host_callback() {
        let mut container = FixedPitch::default();
        let mut engine = TraceEngine::new(host_callback);
        let trace = br#"[
            {"op": "createFont", "size": 10},
            {"op": "createFont", "face": "Mono", "size": 20},
            {"op": "textWidth", "text": "abc", "font": 1},
            {"op": "drawText", "text": "abc", "font": 0, "color": 255, "x": 0, "y": 0},
            {"op": "pt2px", "pt": 72}
        ]"#;

        with_container(&mut container, || engine.render(trace)).unwrap().unwrap();

        assert_eq!(engine.measured(), &[30, 96]);
        assert_eq!(container.painted, 1);
    }

    #[test]
    fn font_used_before_creation_is_rejected() {
        let mut container = FixedPitch::default();
        let mut engine = TraceEngine::new(host_callback);
        let trace = br#"[{"op": "drawText", "text": "x", "font": 0, "color": 255, "x": 0, "y": 0}]"#;
        let result = with_container(&mut container, || engine.render(trace)).unwrap();
        assert!(matches!(result, Err(Error::TraceError(_))));
    }

    #[test]
    fn malformed_trace_is_rejected() {
        let mut engine = TraceEngine::new(host_callback);
        assert!(matches!(engine.render(b"<html></html>"), Err(Error::TraceError(_))));
    }
}
