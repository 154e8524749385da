//! Rendering sessions: one engine handle plus the surface it paints on

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::bridge::with_container;
use crate::error::Result;
use crate::rendering::paint::{PaintOp, RecordingContainer};
use crate::rendering::raster::RasterSurface;
use crate::rendering::Screenshot;
use crate::{new_engine, EngineKind, LayoutEngine, RenderConfig};

/// Owns an engine and a raster surface for any number of renders.
///
/// Each render starts from blank paper and an empty font table. The engine
/// handle is released by [`RenderSession::close`] or when the session drops.
pub struct RenderSession {
    engine: Box<dyn LayoutEngine>,
    surface: RasterSurface,
    config: RenderConfig,
    recording: bool,
    trace: Vec<PaintOp>,
}

impl RenderSession {
    /// Open a session on a fresh engine of the given kind.
    pub fn open(kind: EngineKind, config: RenderConfig) -> Result<Self> {
        let engine = new_engine(kind, &config)?;
        Self::with_engine(engine, config)
    }

    /// Open a session around an existing engine.
    pub fn with_engine(engine: Box<dyn LayoutEngine>, config: RenderConfig) -> Result<Self> {
        let surface = RasterSurface::new(&config)?;
        Ok(Self {
            engine,
            surface,
            config,
            recording: false,
            trace: Vec::new(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Keep every callback of subsequent renders as a paint trace.
    pub fn set_recording(&mut self, on: bool) {
        self.recording = on;
    }

    /// The ops recorded during the last render, if recording was on.
    pub fn trace(&self) -> &[PaintOp] {
        &self.trace
    }

    /// Render one document and encode the surface.
    pub fn render(&mut self, document: &[u8]) -> Result<Screenshot> {
        self.surface.reset();
        self.trace.clear();

        let engine = &mut self.engine;
        if self.recording {
            let mut recorder = RecordingContainer::new(&mut self.surface);
            with_container(&mut recorder, || engine.render(document))??;
            self.trace = recorder.into_ops();
        } else {
            with_container(&mut self.surface, || engine.render(document))??;
        }

        self.surface.snapshot(self.config.crop)
    }

    /// Render a file and write the image next to it as `<path>.png`.
    ///
    /// Returns the written path together with the encoded image.
    pub fn render_file(&mut self, path: impl AsRef<Path>) -> Result<(PathBuf, Screenshot)> {
        let path = path.as_ref();
        let document = fs::read(path)?;
        let shot = self.render(&document)?;

        let mut out = path.as_os_str().to_owned();
        out.push(".png");
        let out = PathBuf::from(out);
        fs::write(&out, &shot.png_data)?;
        info!("{} -> {} ({}x{})", path.display(), out.display(), shot.width, shot.height);
        Ok((out, shot))
    }

    /// Release the engine handle.
    pub fn close(mut self) -> Result<()> {
        self.engine.close()
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Err(e) = self.engine.close() {
            log::warn!("closing engine failed: {}", e);
        }
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("config", &self.config)
            .field("recording", &self.recording)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::geometry::Rgba;
    use crate::{Error, Viewport};

    fn config(width: u32, height: u32) -> RenderConfig {
        RenderConfig {
            viewport: Viewport { width, height },
            ..Default::default()
        }
    }

    const BOX: &[u8] = br#"[{"op": "drawBackground", "x": 2, "y": 2, "w": 4, "h": 4, "color": 4278190335}]"#;

    #[test]
    fn each_render_starts_from_blank_paper() {
        let mut session = RenderSession::open(EngineKind::Trace, config(16, 16)).unwrap();
        session.render(BOX).unwrap();
        assert_eq!(session.surface().pixel(3, 3), Some(Rgba::new(255, 0, 0, 255)));

        session.render(b"[]").unwrap();
        assert_eq!(session.surface().pixel(3, 3), Some(Rgba::WHITE));
    }

    #[test]
    fn recording_captures_the_replayed_ops() {
        let mut session = RenderSession::open(EngineKind::Trace, config(16, 16)).unwrap();
        session.set_recording(true);
        session.render(BOX).unwrap();
        assert_eq!(
            session.trace(),
            &[PaintOp::DrawBackground { x: 2, y: 2, w: 4, h: 4, color: 0xff00_00ff }]
        );

        session.set_recording(false);
        session.render(BOX).unwrap();
        assert!(session.trace().is_empty());
    }

    #[test]
    fn trace_errors_fail_the_render() {
        let mut session = RenderSession::open(EngineKind::Trace, config(8, 8)).unwrap();
        let err = session.render(br#"[{"op": "textWidth", "text": "a", "font": 3}]"#).unwrap_err();
        assert!(matches!(err, Error::TraceError(_)));

        // the session stays usable
        session.render(br#"[{"op": "createFont", "size": 8}]"#).unwrap();
        assert_eq!(session.surface().font_count(), 1);
    }
}
