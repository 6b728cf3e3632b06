use cairo::{Context, Format, ImageSurface};
use indexmap::IndexMap;
use pango::FontDescription;
use std::f64::consts::TAU;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CanvasLayerKind, Color, DrawingSurface, Primitive, PrimitiveId, TextHAlign, TextPrimitive,
    ViewTransform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub primitives_drawn: usize,
    pub texts_drawn: usize,
}

/// Cairo + Pango drawing surface.
///
/// Primitives are retained and replayed in layer order by [`CairoSurface::paint`],
/// either onto the internal image surface or onto an external context (for
/// example a toolkit draw callback).
#[derive(Debug)]
pub struct CairoSurface {
    image: ImageSurface,
    size: Viewport,
    background: Color,
    transform: ViewTransform,
    primitives: IndexMap<PrimitiveId, (CanvasLayerKind, Primitive)>,
    next_id: u64,
    last_stats: CairoRenderStats,
}

impl CairoSurface {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let image = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            image,
            size: Viewport::new(f64::from(width), f64::from(height)),
            background: Color::rgb(1.0, 1.0, 1.0),
            transform: ViewTransform::identity(),
            primitives: IndexMap::new(),
            next_id: 0,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn image(&self) -> &ImageSurface {
        &self.image
    }

    pub fn set_background(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.background = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Resizes the backing image; retained primitives are kept.
    pub fn resize(&mut self, width: i32, height: i32) -> ChartResult<()> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }
        self.image = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to resize cairo surface", err))?;
        self.size = Viewport::new(f64::from(width), f64::from(height));
        Ok(())
    }

    /// Replays retained content onto the internal image surface.
    pub fn paint_offscreen(&mut self) -> ChartResult<CairoRenderStats> {
        let context = Context::new(&self.image)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.paint(&context)
    }

    pub fn paint(&mut self, context: &Context) -> ChartResult<CairoRenderStats> {
        apply_color(context, self.background);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for layer in CanvasLayerKind::PAINT_ORDER {
            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            if layer.is_transformed() {
                context.scale(self.transform.scale_x, 1.0);
                context.translate(self.transform.translate_x, 0.0);
            }
            for (_, primitive) in self.primitives.values().filter(|(kind, _)| *kind == layer) {
                draw_primitive(context, primitive)?;
                stats.primitives_drawn += 1;
                if matches!(primitive, Primitive::Text(_)) {
                    stats.texts_drawn += 1;
                }
            }
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
        }

        self.last_stats = stats;
        Ok(stats)
    }
}

impl DrawingSurface for CairoSurface {
    fn size(&self) -> Viewport {
        self.size
    }

    fn clear(&mut self) {
        self.primitives.clear();
        self.transform = ViewTransform::identity();
    }

    fn add(&mut self, layer: CanvasLayerKind, primitive: Primitive) -> ChartResult<PrimitiveId> {
        primitive.validate()?;
        let id = PrimitiveId::new(self.next_id);
        self.next_id += 1;
        self.primitives.insert(id, (layer, primitive));
        Ok(id)
    }

    fn remove(&mut self, id: PrimitiveId) -> bool {
        self.primitives.shift_remove(&id).is_some()
    }

    fn measure_text(&self, text: &str, font_size_px: f64) -> f64 {
        match Context::new(&self.image) {
            Ok(context) => {
                let layout = text_layout(&context, text, font_size_px);
                f64::from(layout.pixel_size().0)
            }
            Err(_) => text.chars().count() as f64 * font_size_px * 0.6,
        }
    }

    fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }
}

fn draw_primitive(context: &Context, primitive: &Primitive) -> ChartResult<()> {
    match primitive {
        Primitive::Line(line) => {
            apply_color(context, line.color);
            context.set_line_width(line.stroke_width);
            context.move_to(line.x1, line.y1);
            context.line_to(line.x2, line.y2);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke line", err))
        }
        Primitive::Points(points) => {
            apply_color(context, points.fill);
            for (x, y) in &points.centers {
                context.new_sub_path();
                context.arc(*x, *y, points.radius, 0.0, TAU);
            }
            context
                .fill()
                .map_err(|err| map_backend_error("failed to fill points", err))
        }
        Primitive::Path(path) => {
            apply_color(context, path.color);
            context.set_line_width(path.stroke_width);
            for [start, end] in &path.segments {
                context.move_to(start.0, start.1);
                context.line_to(end.0, end.1);
            }
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke path", err))
        }
        Primitive::Polygon(polygon) => {
            let mut vertices = polygon.vertices.iter();
            if let Some((x, y)) = vertices.next() {
                context.move_to(*x, *y);
            }
            for (x, y) in vertices {
                context.line_to(*x, *y);
            }
            context.close_path();
            apply_color(context, polygon.fill);
            match polygon.stroke {
                Some(stroke) => {
                    context
                        .fill_preserve()
                        .map_err(|err| map_backend_error("failed to fill polygon", err))?;
                    apply_color(context, stroke);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke polygon", err))
                }
                None => context
                    .fill()
                    .map_err(|err| map_backend_error("failed to fill polygon", err)),
            }
        }
        Primitive::Rect(rect) => {
            context.rectangle(rect.x, rect.y, rect.width, rect.height);
            apply_color(context, rect.fill);
            match rect.border {
                Some(border) => {
                    context
                        .fill_preserve()
                        .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
                    apply_color(context, border);
                    context.set_line_width(1.0);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke rectangle", err))
                }
                None => context
                    .fill()
                    .map_err(|err| map_backend_error("failed to fill rectangle", err)),
            }
        }
        Primitive::Text(text) => draw_text(context, text),
    }
}

fn draw_text(context: &Context, text: &TextPrimitive) -> ChartResult<()> {
    let layout = text_layout(context, &text.text, text.font_size_px);
    let (text_width, _text_height) = layout.pixel_size();
    let offset = match text.h_align {
        TextHAlign::Left => 0.0,
        TextHAlign::Center => -f64::from(text_width) / 2.0,
        TextHAlign::Right => -f64::from(text_width),
    };

    context
        .save()
        .map_err(|err| map_backend_error("failed to save context", err))?;
    context.translate(text.x, text.y);
    context.scale(text.scale_x, 1.0);
    apply_color(context, text.color);
    context.move_to(offset, 0.0);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

fn text_layout(context: &Context, text: &str, font_size_px: f64) -> pango::Layout {
    let layout = pangocairo::functions::create_layout(context);
    let font_description = FontDescription::from_string(&format!("Sans {font_size_px}"));
    layout.set_font_description(Some(&font_description));
    layout.set_text(text);
    layout
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
