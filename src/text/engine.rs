use std::borrow::Cow;
use std::path::PathBuf;

use crate::foundation::color::Rgba8;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::layer::Layer;
use crate::text::font::{FontBytes, FontSource, read_candidate, system_sans_serif};
use crate::text::layout::{BlockMetrics, Placement, PositionedLine, position_lines, wrap};

/// Brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Style of one text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockStyle {
    /// Size, spacing and margin.
    pub metrics: BlockMetrics,
    /// Fill color.
    pub color: Rgba8,
    /// Wrap width in pixels.
    pub max_width: f32,
    /// Vertical anchoring.
    pub placement: Placement,
}

/// Shapes, measures and rasterizes text with one resolved font.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
    source: FontSource,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("family", &self.family)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl TextEngine {
    /// Resolve the first loadable candidate, falling back to the system sans-serif face.
    ///
    /// The fallback is logged as a degraded-quality warning. Only a missing system face fails.
    pub fn new(candidates: &[PathBuf]) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();

        for path in candidates {
            let bytes = match read_candidate(path) {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "font candidate unavailable");
                    continue;
                }
            };
            match register(&mut font_ctx, &bytes) {
                Ok(family) => {
                    tracing::info!(path = %path.display(), family = %family, "using font");
                    return Ok(Self::with_font(font_ctx, family, bytes));
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "font candidate rejected");
                }
            }
        }

        tracing::warn!(
            candidates = candidates.len(),
            "no font candidate loaded; falling back to the system sans-serif face (degraded quality)"
        );
        let bytes = system_sans_serif()?;
        let family = register(&mut font_ctx, &bytes)?;
        Ok(Self::with_font(font_ctx, family, bytes))
    }

    fn with_font(font_ctx: parley::FontContext, family: String, bytes: FontBytes) -> Self {
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.data),
            bytes.index,
        );
        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
            source: bytes.source,
        }
    }

    /// Where the active font came from.
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    fn layout(&mut self, text: &str, size_px: f32, brush: TextBrush) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Advance width of `text` on a single line.
    pub fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        self.layout(text, size_px, TextBrush::default()).width()
    }

    /// Wrap and place `text` on the canvas.
    pub fn arrange(&mut self, text: &str, style: &BlockStyle, canvas: Canvas) -> Vec<PositionedLine> {
        let size = style.metrics.font_size;
        let lines = wrap(text, |s| self.measure(s, size), style.max_width);
        position_lines(
            &lines,
            |s| self.measure(s, size),
            canvas,
            style.metrics,
            style.placement,
        )
    }

    /// Rasterize already placed lines into a transparent canvas-sized layer.
    pub fn rasterize(
        &mut self,
        lines: &[PositionedLine],
        size_px: f32,
        color: Rgba8,
        canvas: Canvas,
    ) -> ReelResult<Layer> {
        let (w, h) = canvas_u16(canvas)?;
        let brush = TextBrush::from(color);
        let mut ctx = vello_cpu::RenderContext::new(w, h);

        for line in lines {
            let layout = self.layout(&line.text, size_px, brush);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                line.x as f64,
                line.y as f64,
            )));
            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let b = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                    // Positioned glyphs carry the run offset and baseline, so `line.y` is the top edge.
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Layer::from_premul(canvas, pixmap.data_as_u8_slice().to_vec())
    }

    /// Wrap, place and rasterize `text` in one step.
    pub fn render_block(&mut self, text: &str, style: &BlockStyle, canvas: Canvas) -> ReelResult<Layer> {
        let lines = self.arrange(text, style, canvas);
        tracing::debug!(lines = lines.len(), size = style.metrics.font_size, "laid out text block");
        self.rasterize(&lines, style.metrics.font_size, style.color, canvas)
    }
}

fn register(font_ctx: &mut parley::FontContext, bytes: &FontBytes) -> ReelResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.data.clone()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ReelError::render("no font families registered from font bytes"))?;
    Ok(font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ReelError::render("registered font family has no name"))?
        .to_owned())
}

fn canvas_u16(canvas: Canvas) -> ReelResult<(u16, u16)> {
    let w = u16::try_from(canvas.width)
        .map_err(|_| ReelError::validation(format!("canvas width {} exceeds u16", canvas.width)))?;
    let h = u16::try_from(canvas.height)
        .map_err(|_| ReelError::validation(format!("canvas height {} exceeds u16", canvas.height)))?;
    Ok((w, h))
}
