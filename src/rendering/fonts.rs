//! Font requests, weights and the per-render font table
//!
//! The engine identifies fonts by small integer handles that the host hands
//! out from `createFont`. Handles are indices into a [`FontTable`] and are
//! only meaningful until the table is cleared at the start of the next render.

use crate::error::{Error, Result};

/// Face used when the engine sends no family at all.
pub const DEFAULT_FACE: &str = "Times New Roman";

/// Integer handle the engine passes back on every draw/measure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub i32);

/// CSS font weights the host distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Heavy,
    ExtraHeavy,
}

impl FontWeight {
    /// Map a numeric CSS weight. Values off the hundred grid fall back to `Normal`.
    pub fn from_css(weight: i32) -> Self {
        match weight {
            100 => FontWeight::Thin,
            200 => FontWeight::ExtraLight,
            300 => FontWeight::Light,
            400 => FontWeight::Normal,
            500 => FontWeight::Medium,
            600 => FontWeight::SemiBold,
            700 => FontWeight::Bold,
            800 => FontWeight::ExtraBold,
            900 => FontWeight::Heavy,
            1000 => FontWeight::ExtraHeavy,
            _ => FontWeight::Normal,
        }
    }

    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::ExtraLight => 200,
            FontWeight::Light => 300,
            FontWeight::Normal => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
            FontWeight::Heavy => 900,
            FontWeight::ExtraHeavy => 1000,
        }
    }
}

/// `text-decoration` bits as the engine packs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration(pub u32);

impl Decoration {
    pub const NONE: Decoration = Decoration(0x00);
    pub const UNDERLINE: Decoration = Decoration(0x01);
    pub const LINE_THROUGH: Decoration = Decoration(0x02);
    pub const OVERLINE: Decoration = Decoration(0x04);

    pub fn contains(self, other: Decoration) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Decoded `createFont` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    /// Raw CSS family list as sent by the engine (`None` when null).
    pub face: Option<String>,
    pub size: i32,
    pub weight: FontWeight,
    pub italic: bool,
    pub decoration: Decoration,
}

impl FontRequest {
    /// The single family the host will ask the font system for.
    pub fn family(&self, fallback: &str) -> String {
        resolve_face(self.face.as_deref(), fallback)
    }
}

/// Metrics reported back to the engine, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub height: i32,
    pub x_height: i32,
}

impl FontMetrics {
    /// Metrics derived from the size alone, for when no face resolves.
    pub fn estimated(size: i32) -> Self {
        let size = size.max(1) as f32;
        let ascent = (size * 0.8).round() as i32;
        let descent = (size * 0.2).round() as i32;
        Self {
            ascent,
            descent,
            height: ascent + descent,
            x_height: (size * 0.5).round() as i32,
        }
    }
}

/// Pick the first family out of a CSS family list.
///
/// Quoted names are unquoted; a missing or empty list yields `fallback`.
pub fn resolve_face(raw: Option<&str>, fallback: &str) -> String {
    let first = raw
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .unwrap_or_default();

    let name = match first.chars().next() {
        Some(q @ ('"' | '\'')) => first[1..].split(q).next().unwrap_or_default(),
        _ => first,
    };

    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name.trim().to_string()
    }
}

/// Fonts created during one render, addressed by [`FontHandle`].
#[derive(Debug)]
pub struct FontTable<T> {
    fonts: Vec<T>,
}

impl<T> Default for FontTable<T> {
    fn default() -> Self {
        Self { fonts: Vec::new() }
    }
}

impl<T> FontTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a font; its handle is the table length before insertion.
    pub fn insert(&mut self, font: T) -> FontHandle {
        let handle = FontHandle(self.fonts.len() as i32);
        self.fonts.push(font);
        handle
    }

    pub fn get(&self, handle: FontHandle) -> Result<&T> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|idx| self.fonts.get(idx))
            .ok_or(Error::UnknownFont(handle.0))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn clear(&mut self) {
        self.fonts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_face_takes_first_family() {
        assert_eq!(resolve_face(Some("Arial, Helvetica, sans-serif"), DEFAULT_FACE), "Arial");
        assert_eq!(resolve_face(Some("  Georgia  "), DEFAULT_FACE), "Georgia");
    }

    #[test]
    fn resolve_face_strips_quotes() {
        assert_eq!(resolve_face(Some("\"Times New Roman\", serif"), "x"), "Times New Roman");
        assert_eq!(resolve_face(Some("'DejaVu Sans Mono',monospace"), "x"), "DejaVu Sans Mono");
    }

    #[test]
    fn resolve_face_falls_back_when_missing() {
        assert_eq!(resolve_face(None, DEFAULT_FACE), DEFAULT_FACE);
        assert_eq!(resolve_face(Some(""), DEFAULT_FACE), DEFAULT_FACE);
        assert_eq!(resolve_face(Some("\"\""), "Serif"), "Serif");
    }

    #[test]
    fn weights_snap_to_named_values() {
        assert_eq!(FontWeight::from_css(700), FontWeight::Bold);
        assert_eq!(FontWeight::from_css(1000), FontWeight::ExtraHeavy);
        assert_eq!(FontWeight::from_css(450), FontWeight::Normal);
        assert_eq!(FontWeight::from_css(-1), FontWeight::Normal);
        assert_eq!(FontWeight::SemiBold.numeric(), 600);
    }

    #[test]
    fn decoration_bits() {
        let d = Decoration(0x05);
        assert!(d.contains(Decoration::UNDERLINE));
        assert!(d.contains(Decoration::OVERLINE));
        assert!(!d.contains(Decoration::LINE_THROUGH));
        assert!(!d.contains(Decoration::NONE));
        assert!(Decoration::NONE.is_empty());
    }

    #[test]
    fn font_table_hands_out_sequential_handles() {
        let mut table = FontTable::new();
        assert_eq!(table.insert("a"), FontHandle(0));
        assert_eq!(table.insert("b"), FontHandle(1));
        assert_eq!(*table.get(FontHandle(1)).unwrap(), "b");
        assert!(matches!(table.get(FontHandle(2)), Err(Error::UnknownFont(2))));
        assert!(matches!(table.get(FontHandle(-1)), Err(Error::UnknownFont(-1))));

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.insert("c"), FontHandle(0));
    }

    #[test]
    fn estimated_metrics_scale_with_size() {
        let m = FontMetrics::estimated(20);
        assert_eq!(m.ascent, 16);
        assert_eq!(m.descent, 4);
        assert_eq!(m.height, 20);
        assert_eq!(m.x_height, 10);
    }
}
