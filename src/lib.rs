//! litepaint
//!
//! Host side of a paint bridge for the litehtml layout engine. The engine
//! owns HTML parsing, the CSS cascade and layout; whenever it needs a font,
//! a text measurement or a drawing primitive it calls back into the host
//! through a single C function pointer with a request name and a
//! fixed-layout parameter block. This crate decodes those blocks, routes
//! them to a [`DocumentContainer`] and rasterizes the result to PNG.
//!
//! # Features
//!
//! - **Raster surface**: `tiny-skia` drawing with `cosmic-text` shaping
//! - **Trace engine** (always available): replays a recorded JSON paint trace
//!   through the same C parameter blocks the native engine uses
//! - **Native engine** (`native` feature): links the litehtml container shim
//!
//! # Example
//!
//! ```no_run
//! use litepaint::{EngineKind, RenderConfig, RenderSession, Viewport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig {
//!     viewport: Viewport { width: 800, height: 600 },
//!     ..Default::default()
//! };
//!
//! let mut session = RenderSession::open(EngineKind::Trace, config)?;
//! let (png_path, _) = session.render_file("page.trace.json")?;
//! println!("wrote {}", png_path.display());
//! session.close()?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod bridge;
pub mod error;
pub mod rendering;
pub mod session;
pub mod trace;

#[cfg(feature = "native")]
pub mod native;

pub use error::{Error, Result};
pub use rendering::fonts::{FontHandle, FontMetrics, FontRequest};
pub use rendering::geometry::{Borders, ListMarker, Rect, Rgba};
pub use rendering::Screenshot;
pub use session::RenderSession;

/// Configuration for a rendering session
///
/// The defaults reproduce the reference setup: an A4 page scaled by
/// `3.96 * 96 / 72`, 96 ppi for point conversion, white paper, and
/// "Times New Roman" when a document names no font family.
///
/// # Examples
///
/// ```
/// let cfg = litepaint::RenderConfig::default();
/// assert_eq!(cfg.viewport.width, 1108);
/// assert_eq!(cfg.ppi, 96);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Surface (and layout) dimensions in pixels
    pub viewport: Viewport,
    /// Pixels per inch used by `pt2px`
    pub ppi: u32,
    /// Family used when the engine sends an empty face list
    pub default_face: String,
    /// Paper colour as packed `0xRRGGBBAA`
    pub background: u32,
    /// Crop the written image to the inked area plus a small margin
    pub crop: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            ppi: 96,
            default_face: rendering::fonts::DEFAULT_FACE.to_string(),
            background: Rgba::WHITE.packed(),
            crop: false,
        }
    }
}

impl RenderConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let config: RenderConfig = serde_json::from_slice(&bytes)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.ppi == 0 {
            return Err(Error::ConfigError("ppi must be positive".into()));
        }
        Ok(())
    }

    pub fn background(&self) -> Rgba {
        Rgba::from_packed(self.background)
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// A4 (210 x 297 mm) at the reference scale of `3.96 * 96 / 72` px per mm.
    pub fn a4() -> Self {
        let scale = 3.96 * 96.0 / 72.0;
        Self {
            width: (210.0 * scale) as u32,
            height: (297.0 * scale) as u32,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::a4()
    }
}

/// The host side of the engine's callback interface
///
/// One method per request the engine can issue. Implementations receive
/// already-decoded values; the C parameter blocks never leak past
/// [`bridge`].
pub trait DocumentContainer {
    /// Create a font and report its metrics; the handle identifies it in later calls.
    fn create_font(&mut self, request: &FontRequest) -> Result<(FontHandle, FontMetrics)>;

    /// Width in pixels of `text` set in `font`.
    fn text_width(&mut self, text: &str, font: FontHandle) -> Result<i32>;

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, text: &str, font: FontHandle, color: Rgba, x: i32, y: i32) -> Result<()>;

    fn draw_background(&mut self, area: Rect, color: Rgba) -> Result<()>;

    /// Paint the four border strips inside `area`.
    fn draw_borders(&mut self, area: Rect, borders: &Borders) -> Result<()>;

    fn draw_list_marker(&mut self, marker: &ListMarker) -> Result<()>;

    /// Convert typographic points to device pixels.
    fn pt_to_px(&mut self, pt: i32) -> i32;
}

impl<T: DocumentContainer + ?Sized> DocumentContainer for &mut T {
    fn create_font(&mut self, request: &FontRequest) -> Result<(FontHandle, FontMetrics)> {
        (**self).create_font(request)
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> Result<i32> {
        (**self).text_width(text, font)
    }

    fn draw_text(&mut self, text: &str, font: FontHandle, color: Rgba, x: i32, y: i32) -> Result<()> {
        (**self).draw_text(text, font, color, x, y)
    }

    fn draw_background(&mut self, area: Rect, color: Rgba) -> Result<()> {
        (**self).draw_background(area, color)
    }

    fn draw_borders(&mut self, area: Rect, borders: &Borders) -> Result<()> {
        (**self).draw_borders(area, borders)
    }

    fn draw_list_marker(&mut self, marker: &ListMarker) -> Result<()> {
        (**self).draw_list_marker(marker)
    }

    fn pt_to_px(&mut self, pt: i32) -> i32 {
        (**self).pt_to_px(pt)
    }
}

/// The external layout engine, seen from the host
///
/// An engine owns one native rendering session. `render` lays out and
/// paints a document synchronously; every paint request arrives through
/// [`bridge::host_callback`] on the calling thread before `render` returns.
pub trait LayoutEngine {
    /// Lay out and paint one document.
    fn render(&mut self, document: &[u8]) -> Result<()>;

    /// Release the native session. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Which engine backend a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// The linked litehtml container shim (requires the `native` feature)
    Native,
    /// Replay of a JSON paint trace
    Trace,
}

/// Create an engine of the requested kind wired to [`bridge::host_callback`].
pub fn new_engine(kind: EngineKind, config: &RenderConfig) -> Result<Box<dyn LayoutEngine>> {
    match kind {
        EngineKind::Trace => Ok(Box::new(trace::TraceEngine::new(bridge::host_callback))),
        #[cfg(feature = "native")]
        EngineKind::Native => Ok(Box::new(native::NativeEngine::new(config.viewport, bridge::host_callback)?)),
        #[cfg(not(feature = "native"))]
        EngineKind::Native => {
            let _ = config;
            Err(Error::InitializationError(
                "litepaint was built without the `native` feature".into(),
            ))
        }
    }
}

/// Deterministic fixed-pitch container used by unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::rendering::fonts::FontTable;

    /// Every glyph is half the font size wide; nothing is drawn, only counted.
    #[derive(Default)]
    pub struct FixedPitch {
        fonts: FontTable<i32>,
        pub painted: usize,
    }

    impl DocumentContainer for FixedPitch {
        fn create_font(&mut self, request: &FontRequest) -> Result<(FontHandle, FontMetrics)> {
            let handle = self.fonts.insert(request.size);
            Ok((handle, FontMetrics::estimated(request.size)))
        }

        fn text_width(&mut self, text: &str, font: FontHandle) -> Result<i32> {
            let size = *self.fonts.get(font)?;
            Ok(text.chars().count() as i32 * size / 2)
        }

        fn draw_text(&mut self, _text: &str, font: FontHandle, _color: Rgba, _x: i32, _y: i32) -> Result<()> {
            self.fonts.get(font)?;
            self.painted += 1;
            Ok(())
        }

        fn draw_background(&mut self, _area: Rect, _color: Rgba) -> Result<()> {
            self.painted += 1;
            Ok(())
        }

        fn draw_borders(&mut self, _area: Rect, _borders: &Borders) -> Result<()> {
            self.painted += 1;
            Ok(())
        }

        fn draw_list_marker(&mut self, _marker: &ListMarker) -> Result<()> {
            self.painted += 1;
            Ok(())
        }

        fn pt_to_px(&mut self, pt: i32) -> i32 {
            pt * 96 / 72
        }
    }
}
