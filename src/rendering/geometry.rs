/// Plain geometry and colour types shared by the bridge and the surface.
///
/// The engine speaks in integer device pixels and packed `0xRRGGBBAA`
/// colours; these types keep that representation but give it names.

/// An RGBA colour with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a colour sent by the engine: red in the top byte, alpha in the low byte.
    pub const fn from_packed(rgba: u32) -> Self {
        Self {
            r: (rgba >> 24) as u8,
            g: (rgba >> 16) as u8,
            b: (rgba >> 8) as u8,
            a: rgba as u8,
        }
    }

    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rect from the edge coordinates the border callback uses.
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// One side of a border box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSide {
    pub width: i32,
    pub color: Rgba,
}

impl BorderSide {
    pub const fn is_visible(&self) -> bool {
        self.width > 0 && !self.color.is_transparent()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    pub left: BorderSide,
    pub right: BorderSide,
    pub top: BorderSide,
    pub bottom: BorderSide,
}

impl Borders {
    /// The strips each visible side covers inside `area`, in paint order
    /// (left, right, top, bottom).
    pub fn strips(&self, area: Rect) -> Vec<(Rect, Rgba)> {
        let mut out = Vec::with_capacity(4);
        if self.left.is_visible() {
            out.push((Rect::new(area.x, area.y, self.left.width, area.height), self.left.color));
        }
        if self.right.is_visible() {
            out.push((
                Rect::new(area.right().saturating_sub(self.right.width), area.y, self.right.width, area.height),
                self.right.color,
            ));
        }
        if self.top.is_visible() {
            out.push((Rect::new(area.x, area.y, area.width, self.top.width), self.top.color));
        }
        if self.bottom.is_visible() {
            out.push((
                Rect::new(area.x, area.bottom().saturating_sub(self.bottom.width), area.width, self.bottom.width),
                self.bottom.color,
            ));
        }
        out
    }
}

/// List bullet shapes, numbered as the engine's `list_style_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    None,
    Circle,
    Disc,
    Square,
    Other(i32),
}

impl MarkerKind {
    pub const fn from_raw(mt: i32) -> Self {
        match mt {
            0 => MarkerKind::None,
            1 => MarkerKind::Circle,
            2 => MarkerKind::Disc,
            3 => MarkerKind::Square,
            other => MarkerKind::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub area: Rect,
    pub kind: MarkerKind,
    pub color: Rgba,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_colour_is_rgba_big_end_first() {
        let c = Rgba::from_packed(0x1122_3344);
        assert_eq!(c, Rgba::new(0x11, 0x22, 0x33, 0x44));
        assert_eq!(c.packed(), 0x1122_3344);
        assert!(Rgba::from_packed(0xffff_ff00).is_transparent());
    }

    #[test]
    fn rect_from_edges() {
        let r = Rect::from_edges(10, 20, 110, 70);
        assert_eq!(r, Rect::new(10, 20, 100, 50));
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert!(Rect::from_edges(5, 5, 5, 9).is_empty());
    }

    #[test]
    fn extreme_edges_saturate() {
        let r = Rect::from_edges(i32::MIN, -10, i32::MAX, i32::MAX);
        assert_eq!(r.width, i32::MAX);
        assert_eq!(r.right(), -1);
        assert_eq!(Rect::new(i32::MAX - 1, 0, 10, 10).right(), i32::MAX);

        let side = BorderSide { width: 4, color: Rgba::BLACK };
        let borders = Borders { left: side, right: side, top: side, bottom: side };
        let strips = borders.strips(Rect::new(i32::MIN, i32::MIN, 2, 2));
        assert_eq!(strips.len(), 4);
        assert_eq!(strips[1].0.x, i32::MIN);
        assert_eq!(strips[3].0.y, i32::MIN);
    }

    #[test]
    fn border_strips_skip_invisible_sides() {
        let red = Rgba::new(255, 0, 0, 255);
        let borders = Borders {
            left: BorderSide { width: 2, color: red },
            right: BorderSide { width: 3, color: red },
            top: BorderSide { width: 0, color: red },
            bottom: BorderSide { width: 4, color: Rgba::new(0, 0, 0, 0) },
        };
        let strips = borders.strips(Rect::new(0, 0, 50, 20));
        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].0, Rect::new(0, 0, 2, 20));
        assert_eq!(strips[1].0, Rect::new(47, 0, 3, 20));
    }

    #[test]
    fn marker_kinds_follow_list_style_numbering() {
        assert_eq!(MarkerKind::from_raw(0), MarkerKind::None);
        assert_eq!(MarkerKind::from_raw(2), MarkerKind::Disc);
        assert_eq!(MarkerKind::from_raw(3), MarkerKind::Square);
        assert_eq!(MarkerKind::from_raw(9), MarkerKind::Other(9));
    }
}
