/// Raster surface: the container that actually draws
///
/// Shapes with `cosmic-text` and paints into a `tiny-skia` pixmap. All
/// coordinates arrive as integer device pixels from the engine.

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, SwashContent, Weight};
use log::debug;
use tiny_skia::{FillRule, IntRect, Paint, PathBuilder, Pixmap, Shader, Stroke, Transform};

use crate::error::{Error, Result};
use crate::rendering::fonts::{Decoration, FontHandle, FontMetrics, FontRequest, FontTable, FontWeight};
use crate::rendering::geometry::{Borders, ListMarker, MarkerKind, Rect, Rgba};
use crate::rendering::Screenshot;
use crate::{DocumentContainer, RenderConfig};

/// Margin kept around the inked area when cropping.
const CROP_MARGIN: u32 = 8;

/// A font created for the engine during the current render.
#[derive(Debug, Clone)]
struct LoadedFont {
    family: String,
    size: f32,
    weight: FontWeight,
    italic: bool,
    decoration: Decoration,
    metrics: FontMetrics,
}

impl LoadedFont {
    fn attrs(&self) -> Attrs<'_> {
        Attrs::new()
            .family(family(&self.family))
            .weight(Weight(self.weight.numeric()))
            .style(if self.italic { Style::Italic } else { Style::Normal })
    }

    fn cosmic_metrics(&self) -> Metrics {
        Metrics::new(self.size, self.metrics.height.max(1) as f32)
    }
}

/// Map a family name onto cosmic-text's generic families where one exists.
fn family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "sans serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

fn solid(color: Rgba) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)),
        anti_alias: true,
        ..Paint::default()
    }
}

/// Blend one straight-alpha source pixel over a premultiplied RGBA destination.
fn blend_pixel(data: &mut [u8], idx: usize, color: Rgba, coverage: u8) {
    let sa = u32::from(coverage) * u32::from(color.a) / 255;
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    let src = [color.r, color.g, color.b];
    for (c, s) in src.iter().enumerate() {
        let premul = u32::from(*s) * sa / 255;
        data[idx + c] = (premul + u32::from(data[idx + c]) * inv / 255) as u8;
    }
    data[idx + 3] = (sa + u32::from(data[idx + 3]) * inv / 255) as u8;
}

pub struct RasterSurface {
    pixmap: Pixmap,
    font_system: FontSystem,
    swash_cache: SwashCache,
    fonts: FontTable<LoadedFont>,
    background: Rgba,
    default_face: String,
    ppi: u32,
}

impl RasterSurface {
    /// Create a surface sized to the configured viewport and load system fonts.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let Some(pixmap) = Pixmap::new(config.viewport.width, config.viewport.height) else {
            return Err(Error::InitializationError(format!(
                "cannot allocate a {}x{} surface",
                config.viewport.width, config.viewport.height
            )));
        };
        let mut surface = Self {
            pixmap,
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            fonts: FontTable::new(),
            background: config.background(),
            default_face: config.default_face.clone(),
            ppi: config.ppi,
        };
        surface.reset();
        Ok(surface)
    }

    /// Paint the background over everything and forget all fonts.
    pub fn reset(&mut self) {
        let bg = self.background;
        self.pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        self.fonts.clear();
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Straight-alpha colour of one pixel, for inspection.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(px.red(), px.green(), px.blue(), px.alpha()))
    }

    /// Bounding box of every pixel that differs from the background.
    pub fn inked_bounds(&self) -> Option<IntRect> {
        let bg = tiny_skia::Color::from_rgba8(self.background.r, self.background.g, self.background.b, self.background.a)
            .premultiply()
            .to_color_u8();
        let width = self.pixmap.width() as usize;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0usize, 0usize);
        for (i, px) in self.pixmap.pixels().iter().enumerate() {
            if *px == bg {
                continue;
            }
            let (x, y) = (i % width, i / width);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if min_x == usize::MAX {
            return None;
        }
        IntRect::from_ltrb(min_x as i32, min_y as i32, max_x as i32 + 1, max_y as i32 + 1)
    }

    /// Encode the surface as PNG, optionally cropped to the inked area.
    ///
    /// The crop keeps the top-left origin and extends the inked area by a small
    /// margin to the right and bottom, clamped to the surface.
    pub fn snapshot(&self, crop: bool) -> Result<Screenshot> {
        let cropped = if crop { self.cropped() } else { None };
        let pixmap = cropped.as_ref().unwrap_or(&self.pixmap);
        let png_data = pixmap.encode_png().map_err(|e| Error::Encode(e.to_string()))?;
        Ok(Screenshot {
            width: pixmap.width(),
            height: pixmap.height(),
            png_data,
        })
    }

    fn cropped(&self) -> Option<Pixmap> {
        // a blank page shrinks to the bare margin
        let (right, bottom) = self
            .inked_bounds()
            .map_or((0, 0), |inked| (inked.right() as u32, inked.bottom() as u32));
        let width = (right + CROP_MARGIN).min(self.pixmap.width());
        let height = (bottom + CROP_MARGIN).min(self.pixmap.height());
        self.pixmap.clone_rect(IntRect::from_xywh(0, 0, width, height)?)
    }

    fn fill_rect(&mut self, area: Rect, color: Rgba) {
        if area.is_empty() || color.is_transparent() {
            return;
        }
        // clip to the surface in i64 so extreme coordinates stay exact
        let left = i64::from(area.x).max(0);
        let top = i64::from(area.y).max(0);
        let right = (i64::from(area.x) + i64::from(area.width)).min(i64::from(self.pixmap.width()));
        let bottom = (i64::from(area.y) + i64::from(area.height)).min(i64::from(self.pixmap.height()));
        let Some(rect) = tiny_skia::Rect::from_ltrb(left as f32, top as f32, right as f32, bottom as f32) else {
            return;
        };
        self.pixmap.fill_rect(rect, &solid(color), Transform::identity(), None);
    }

    /// Load a font's face and read real metrics; `None` when nothing resolves.
    fn face_metrics(&mut self, font: &LoadedFont) -> Option<FontMetrics> {
        let mut buffer = Buffer::new(&mut self.font_system, font.cosmic_metrics());
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, "x", font.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let font_id = buffer.layout_runs().flat_map(|run| run.glyphs.iter()).map(|g| g.font_id).next()?;
        let loaded = self.font_system.get_font(font_id)?;
        let face = loaded.rustybuzz();

        let scale = font.size / face.units_per_em().max(1) as f32;
        let ascent = (f32::from(face.ascender()) * scale).round() as i32;
        let descent = (-f32::from(face.descender()) * scale).round() as i32;
        let line_gap = (f32::from(face.line_gap()) * scale).round() as i32;
        let x_height = face
            .x_height()
            .map(|h| (f32::from(h) * scale).round() as i32)
            .unwrap_or((font.size * 0.5).round() as i32);

        Some(FontMetrics {
            ascent,
            descent,
            height: ascent + descent + line_gap.max(0),
            x_height,
        })
    }

    fn shape<'b>(&mut self, buffer: &'b mut Buffer, font: &LoadedFont, text: &str) -> &'b Buffer {
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, font.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn draw_decorations(&mut self, font: &LoadedFont, width: i32, color: Rgba, x: i32, y: i32) {
        if font.decoration.is_empty() || width <= 0 {
            return;
        }
        let m = font.metrics;
        let thickness = ((font.size / 14.0).round() as i32).max(1);
        if font.decoration.contains(Decoration::UNDERLINE) {
            self.fill_rect(Rect::new(x, y + m.ascent + 1, width, thickness), color);
        }
        if font.decoration.contains(Decoration::LINE_THROUGH) {
            self.fill_rect(Rect::new(x, y + m.ascent - m.x_height / 2, width, thickness), color);
        }
        if font.decoration.contains(Decoration::OVERLINE) {
            self.fill_rect(Rect::new(x, y, width, thickness), color);
        }
    }
}

impl DocumentContainer for RasterSurface {
    fn create_font(&mut self, request: &FontRequest) -> Result<(FontHandle, FontMetrics)> {
        let mut font = LoadedFont {
            family: request.family(&self.default_face),
            size: request.size.max(1) as f32,
            weight: request.weight,
            italic: request.italic,
            decoration: request.decoration,
            metrics: FontMetrics::estimated(request.size),
        };
        match self.face_metrics(&font) {
            Some(metrics) => font.metrics = metrics,
            None => debug!("no face resolved for {:?}, using estimated metrics", font.family),
        }
        let metrics = font.metrics;
        debug!("createFont {:?} {}px -> {:?}", font.family, font.size, metrics);
        Ok((self.fonts.insert(font), metrics))
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> Result<i32> {
        let font = self.fonts.get(font)?.clone();
        if text.is_empty() {
            return Ok(0);
        }
        let mut buffer = Buffer::new(&mut self.font_system, font.cosmic_metrics());
        let buffer = self.shape(&mut buffer, &font, text);
        let width = buffer.layout_runs().map(|run| run.line_w).fold(0.0f32, f32::max);
        Ok(width.ceil() as i32)
    }

    fn draw_text(&mut self, text: &str, font: FontHandle, color: Rgba, x: i32, y: i32) -> Result<()> {
        let font = self.fonts.get(font)?.clone();
        if text.is_empty() || color.is_transparent() {
            return Ok(());
        }

        let mut buffer = Buffer::new(&mut self.font_system, font.cosmic_metrics());
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, font.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let pix_w = self.pixmap.width() as i32;
        let pix_h = self.pixmap.height() as i32;
        let mut advance = 0.0f32;

        for run in buffer.layout_runs() {
            advance = advance.max(run.line_w);
            let baseline = run.line_y as i32;
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((x as f32, y as f32), 1.0);
                let Some(image) = self.swash_cache.get_image(&mut self.font_system, physical.cache_key) else {
                    continue;
                };
                let gx = physical.x + image.placement.left;
                let gy = physical.y + baseline - image.placement.top;
                let (gw, gh) = (image.placement.width as i32, image.placement.height as i32);
                let data = self.pixmap.data_mut();

                match image.content {
                    SwashContent::Mask => {
                        for row in 0..gh {
                            for col in 0..gw {
                                let (px, py) = (gx + col, gy + row);
                                if px < 0 || py < 0 || px >= pix_w || py >= pix_h {
                                    continue;
                                }
                                let coverage = image.data[(row * gw + col) as usize];
                                blend_pixel(data, ((py * pix_w + px) * 4) as usize, color, coverage);
                            }
                        }
                    }
                    SwashContent::Color => {
                        for row in 0..gh {
                            for col in 0..gw {
                                let (px, py) = (gx + col, gy + row);
                                if px < 0 || py < 0 || px >= pix_w || py >= pix_h {
                                    continue;
                                }
                                let s = ((row * gw + col) * 4) as usize;
                                let src = Rgba::new(image.data[s], image.data[s + 1], image.data[s + 2], 255);
                                blend_pixel(data, ((py * pix_w + px) * 4) as usize, src, image.data[s + 3]);
                            }
                        }
                    }
                    // The default cache format never produces subpixel masks.
                    SwashContent::SubpixelMask => {}
                }
            }
        }

        self.draw_decorations(&font, advance.ceil() as i32, color, x, y);
        Ok(())
    }

    fn draw_background(&mut self, area: Rect, color: Rgba) -> Result<()> {
        self.fill_rect(area, color);
        Ok(())
    }

    fn draw_borders(&mut self, area: Rect, borders: &Borders) -> Result<()> {
        for (strip, color) in borders.strips(area) {
            self.fill_rect(strip, color);
        }
        Ok(())
    }

    fn draw_list_marker(&mut self, marker: &ListMarker) -> Result<()> {
        let area = marker.area;
        if area.is_empty() || marker.color.is_transparent() {
            return Ok(());
        }
        let cx = area.x as f32 + area.width as f32 / 2.0;
        let cy = area.y as f32 + area.height as f32 / 2.0;
        let radius = area.width.min(area.height) as f32 / 2.0;
        let paint = solid(marker.color);

        match marker.kind {
            MarkerKind::Disc => {
                if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
                    self.pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            MarkerKind::Circle => {
                if let Some(path) = PathBuilder::from_circle(cx, cy, (radius - 0.5).max(0.5)) {
                    let stroke = Stroke { width: 1.0, ..Stroke::default() };
                    self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
            MarkerKind::Square => self.fill_rect(area, marker.color),
            MarkerKind::None => {}
            MarkerKind::Other(mt) => debug!("drawMarker: no shape for list style {}", mt),
        }
        Ok(())
    }

    fn pt_to_px(&mut self, pt: i32) -> i32 {
        let px = i64::from(pt) * i64::from(self.ppi) / 72;
        i32::try_from(px).unwrap_or(if px < 0 { i32::MIN } else { i32::MAX })
    }
}
