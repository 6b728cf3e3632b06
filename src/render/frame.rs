use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{CanvasLayerKind, Primitive, TextPrimitive, ViewTransform};

/// Backend-agnostic content staged by one draw pass.
///
/// Nothing reaches the surface until the frame is committed, so a failed pass
/// leaves the previous frame visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub transform: ViewTransform,
    pub primitives: Vec<(CanvasLayerKind, Primitive)>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            transform: ViewTransform::identity(),
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: CanvasLayerKind, primitive: Primitive) {
        self.primitives.push((layer, primitive));
    }

    pub fn extend(&mut self, layer: CanvasLayerKind, primitives: impl IntoIterator<Item = Primitive>) {
        self.primitives
            .extend(primitives.into_iter().map(|primitive| (layer, primitive)));
    }

    pub fn clear(&mut self) {
        self.transform = ViewTransform::identity();
        self.primitives.clear();
    }

    /// Labels whose glyphs must be counter-scaled by the transform.
    pub fn labels_mut(&mut self) -> impl Iterator<Item = &mut TextPrimitive> {
        self.primitives
            .iter_mut()
            .filter(|(layer, _)| layer.is_transformed())
            .filter_map(|(_, primitive)| match primitive {
                Primitive::Text(text) => Some(text),
                _ => None,
            })
    }

    #[must_use]
    pub fn count_in(&self, layer: CanvasLayerKind) -> usize {
        self.primitives
            .iter()
            .filter(|(kind, _)| *kind == layer)
            .count()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.transform.translate_x.is_finite()
            || !self.transform.scale_x.is_finite()
            || self.transform.scale_x <= 0.0
        {
            return Err(ChartError::InvalidData(
                "view transform must be finite with scale > 0".to_owned(),
            ));
        }
        for (_, primitive) in &self.primitives {
            primitive.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
