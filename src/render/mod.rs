mod frame;
mod layer_stack;
mod primitives;
mod recording_surface;
mod style;

pub use frame::RenderFrame;
pub use layer_stack::CanvasLayerKind;
pub use primitives::{
    Color, LinePrimitive, PathPrimitive, PointsPrimitive, PolygonPrimitive, Primitive, PrimitiveId,
    RectPrimitive, TextHAlign, TextPrimitive, ViewTransform,
};
pub use recording_surface::RecordingSurface;
pub use style::{ChartStyle, CrosshairStyle, GridStyle, SeriesStyle, TooltipStyle};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Capability set the engine needs from a platform drawing surface.
///
/// Implementations retain added primitives until they are removed or the
/// surface is cleared, so overlays can be replaced without a full redraw.
pub trait DrawingSurface {
    /// Current size in device-independent pixels.
    fn size(&self) -> Viewport;

    /// Removes every primitive and resets the transform.
    fn clear(&mut self);

    fn add(&mut self, layer: CanvasLayerKind, primitive: Primitive) -> ChartResult<PrimitiveId>;

    /// Returns `false` when `id` is unknown (for example after a clear).
    fn remove(&mut self, id: PrimitiveId) -> bool;

    /// Rendered width of `text` in pixels.
    fn measure_text(&self, text: &str, font_size_px: f64) -> f64;

    /// Sets the transform applied to [`CanvasLayerKind::is_transformed`] layers.
    fn set_transform(&mut self, transform: ViewTransform);
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoSurface};
