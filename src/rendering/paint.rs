/// Paint operations: the tagged-variant form of one engine callback.
///
/// Every parameter block the engine sends decodes into a [`PaintOp`]; the
/// same enum is the on-disk paint trace format (JSON, tagged by `"op"`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bridge::Callback;
use crate::error::Result;
use crate::rendering::fonts::{Decoration, FontHandle, FontMetrics, FontRequest, FontWeight};
use crate::rendering::geometry::{BorderSide, Borders, ListMarker, MarkerKind, Rect, Rgba};
use crate::DocumentContainer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PaintOp {
    CreateFont {
        #[serde(default)]
        face: Option<String>,
        size: i32,
        #[serde(default = "default_weight")]
        weight: i32,
        #[serde(default)]
        italic: bool,
        #[serde(default)]
        decoration: u32,
    },
    TextWidth {
        text: String,
        font: i32,
    },
    DrawText {
        text: String,
        font: i32,
        color: u32,
        x: i32,
        y: i32,
    },
    DrawBackground {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: u32,
    },
    DrawBorders {
        left: i32,
        right: i32,
        top: i32,
        bottom: i32,
        color_left: u32,
        color_right: u32,
        color_top: u32,
        color_bottom: u32,
        width_left: i32,
        width_right: i32,
        width_top: i32,
        width_bottom: i32,
    },
    DrawMarker {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        mt: i32,
        color: u32,
    },
    #[serde(rename = "pt2px")]
    Pt2px {
        pt: i32,
    },
}

fn default_weight() -> i32 {
    400
}

/// What a handled op hands back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Font { handle: FontHandle, metrics: FontMetrics },
    Width(i32),
    Pixels(i32),
    Painted,
}

impl PaintOp {
    pub fn callback(&self) -> Callback {
        match self {
            PaintOp::CreateFont { .. } => Callback::CreateFont,
            PaintOp::TextWidth { .. } => Callback::TextWidth,
            PaintOp::DrawText { .. } => Callback::DrawText,
            PaintOp::DrawBackground { .. } => Callback::DrawBackground,
            PaintOp::DrawBorders { .. } => Callback::DrawBorders,
            PaintOp::DrawMarker { .. } => Callback::DrawMarker,
            PaintOp::Pt2px { .. } => Callback::Pt2Px,
        }
    }

    /// Run this op against a container.
    pub fn apply<C: DocumentContainer + ?Sized>(&self, container: &mut C) -> Result<Reply> {
        match self {
            PaintOp::CreateFont { face, size, weight, italic, decoration } => {
                let request = FontRequest {
                    face: face.clone(),
                    size: *size,
                    weight: FontWeight::from_css(*weight),
                    italic: *italic,
                    decoration: Decoration(*decoration),
                };
                let (handle, metrics) = container.create_font(&request)?;
                Ok(Reply::Font { handle, metrics })
            }
            PaintOp::TextWidth { text, font } => {
                Ok(Reply::Width(container.text_width(text, FontHandle(*font))?))
            }
            PaintOp::DrawText { text, font, color, x, y } => {
                container.draw_text(text, FontHandle(*font), Rgba::from_packed(*color), *x, *y)?;
                Ok(Reply::Painted)
            }
            PaintOp::DrawBackground { x, y, w, h, color } => {
                container.draw_background(Rect::new(*x, *y, *w, *h), Rgba::from_packed(*color))?;
                Ok(Reply::Painted)
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
                let borders = Borders {
                    left: BorderSide { width: *width_left, color: Rgba::from_packed(*color_left) },
                    right: BorderSide { width: *width_right, color: Rgba::from_packed(*color_right) },
                    top: BorderSide { width: *width_top, color: Rgba::from_packed(*color_top) },
                    bottom: BorderSide { width: *width_bottom, color: Rgba::from_packed(*color_bottom) },
                };
                container.draw_borders(Rect::from_edges(*left, *top, *right, *bottom), &borders)?;
                Ok(Reply::Painted)
            }
            PaintOp::DrawMarker { x, y, w, h, mt, color } => {
                let marker = ListMarker {
                    area: Rect::new(*x, *y, *w, *h),
                    kind: MarkerKind::from_raw(*mt),
                    color: Rgba::from_packed(*color),
                };
                container.draw_list_marker(&marker)?;
                Ok(Reply::Painted)
            }
            PaintOp::Pt2px { pt } => Ok(Reply::Pixels(container.pt_to_px(*pt))),
        }
    }
}

/// Parse a JSON paint trace.
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<PaintOp>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write ops as a pretty-printed JSON paint trace.
pub fn save_trace(ops: &[PaintOp], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(ops)?;
    fs::write(path, json)?;
    Ok(())
}

/// Wraps a container and keeps every request it forwards.
///
/// The kept ops can be saved with [`save_trace`] and replayed later by the
/// trace engine without the native library.
pub struct RecordingContainer<C> {
    inner: C,
    ops: Vec<PaintOp>,
}

impl<C> RecordingContainer<C> {
    pub fn new(inner: C) -> Self {
        Self { inner, ops: Vec::new() }
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_ops(self) -> Vec<PaintOp> {
        self.ops
    }
}

impl<C: DocumentContainer> DocumentContainer for RecordingContainer<C> {
    fn create_font(&mut self, request: &FontRequest) -> Result<(FontHandle, FontMetrics)> {
        self.ops.push(PaintOp::CreateFont {
            face: request.face.clone(),
            size: request.size,
            weight: i32::from(request.weight.numeric()),
            italic: request.italic,
            decoration: request.decoration.0,
        });
        self.inner.create_font(request)
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> Result<i32> {
        self.ops.push(PaintOp::TextWidth { text: text.to_string(), font: font.0 });
        self.inner.text_width(text, font)
    }

    fn draw_text(&mut self, text: &str, font: FontHandle, color: Rgba, x: i32, y: i32) -> Result<()> {
        self.ops.push(PaintOp::DrawText {
            text: text.to_string(),
            font: font.0,
            color: color.packed(),
            x,
            y,
        });
        self.inner.draw_text(text, font, color, x, y)
    }

    fn draw_background(&mut self, area: Rect, color: Rgba) -> Result<()> {
        self.ops.push(PaintOp::DrawBackground {
            x: area.x,
            y: area.y,
            w: area.width,
            h: area.height,
            color: color.packed(),
        });
        self.inner.draw_background(area, color)
    }

    fn draw_borders(&mut self, area: Rect, borders: &Borders) -> Result<()> {
        self.ops.push(PaintOp::DrawBorders {
            left: area.x,
            right: area.right(),
            top: area.y,
            bottom: area.bottom(),
            color_left: borders.left.color.packed(),
            color_right: borders.right.color.packed(),
            color_top: borders.top.color.packed(),
            color_bottom: borders.bottom.color.packed(),
            width_left: borders.left.width,
            width_right: borders.right.width,
            width_top: borders.top.width,
            width_bottom: borders.bottom.width,
        });
        self.inner.draw_borders(area, borders)
    }

    fn draw_list_marker(&mut self, marker: &ListMarker) -> Result<()> {
        let mt = match marker.kind {
            MarkerKind::None => 0,
            MarkerKind::Circle => 1,
            MarkerKind::Disc => 2,
            MarkerKind::Square => 3,
            MarkerKind::Other(raw) => raw,
        };
        self.ops.push(PaintOp::DrawMarker {
            x: marker.area.x,
            y: marker.area.y,
            w: marker.area.width,
            h: marker.area.height,
            mt,
            color: marker.color.packed(),
        });
        self.inner.draw_list_marker(marker)
    }

    fn pt_to_px(&mut self, pt: i32) -> i32 {
        self.ops.push(PaintOp::Pt2px { pt });
        self.inner.pt_to_px(pt)
    }
}
