use indexmap::IndexMap;

use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{
    CanvasLayerKind, DrawingSurface, Primitive, PrimitiveId, TextPrimitive, ViewTransform,
};

/// Average glyph advance relative to the font size used for text metrics.
const GLYPH_ADVANCE_RATIO: f64 = 0.6;

/// Headless surface that retains primitives in memory.
///
/// Used by tests and by hosts that rasterize the retained content themselves.
/// Primitives are still validated on insertion so invalid geometry is caught
/// before a real backend sees it.
#[derive(Debug)]
pub struct RecordingSurface {
    size: Viewport,
    transform: ViewTransform,
    primitives: IndexMap<PrimitiveId, (CanvasLayerKind, Primitive)>,
    next_id: u64,
    clear_count: usize,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Viewport::new(width, height),
            transform: ViewTransform::identity(),
            primitives: IndexMap::new(),
            next_id: 0,
            clear_count: 0,
        }
    }

    /// Host-side resize; the engine picks it up on its next pass.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Viewport::new(width, height);
    }

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// How many times the surface was wiped.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    #[must_use]
    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id).map(|(_, primitive)| primitive)
    }

    /// Primitives of one layer in insertion order.
    pub fn primitives_in(&self, layer: CanvasLayerKind) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .values()
            .filter(move |(kind, _)| *kind == layer)
            .map(|(_, primitive)| primitive)
    }

    pub fn texts_in(&self, layer: CanvasLayerKind) -> impl Iterator<Item = &TextPrimitive> {
        self.primitives_in(layer).filter_map(|primitive| match primitive {
            Primitive::Text(text) => Some(text),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> Viewport {
        self.size
    }

    fn clear(&mut self) {
        self.primitives.clear();
        self.transform = ViewTransform::identity();
        self.clear_count += 1;
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
        text.chars().count() as f64 * font_size_px * GLYPH_ADVANCE_RATIO
    }

    fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }
}
