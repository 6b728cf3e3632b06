use serde::{Deserialize, Serialize};

/// Paint-ordered layers of one chart surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    Grid,
    Series,
    /// Time labels; follow the view transform with counter-scaled glyphs.
    Axis,
    /// Value labels pinned to the left screen edge.
    ValueAxis,
    Crosshair,
    Tooltip,
}

impl CanvasLayerKind {
    /// Canonical back-to-front order.
    pub const PAINT_ORDER: [Self; 6] = [
        Self::Grid,
        Self::Series,
        Self::Axis,
        Self::ValueAxis,
        Self::Crosshair,
        Self::Tooltip,
    ];

    /// Layers drawn in plot space and moved by the view transform.
    ///
    /// Value labels and overlays are positioned in screen space.
    #[must_use]
    pub const fn is_transformed(self) -> bool {
        matches!(self, Self::Grid | Self::Series | Self::Axis)
    }
}
