use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Visual style of one series, shared by its point, line and polygon roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub point_radius: f64,
    pub point_color: Color,
    pub line_width: f64,
    pub line_color: Color,
    pub fill_color: Color,
    pub fill_outline: Option<Color>,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            point_radius: 2.5,
            point_color: Color::rgb(0.12, 0.47, 0.71),
            line_width: 1.5,
            line_color: Color::rgb(0.12, 0.47, 0.71),
            fill_color: Color::rgba(0.12, 0.47, 0.71, 0.25),
            fill_outline: None,
        }
    }
}

impl SeriesStyle {
    pub fn validate(self) -> ChartResult<()> {
        for (name, value) in [
            ("point radius", self.point_radius),
            ("line width", self.line_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        self.point_color.validate()?;
        self.line_color.validate()?;
        self.fill_color.validate()?;
        if let Some(outline) = self.fill_outline {
            outline.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStyle {
    pub line_color: Color,
    pub line_width: f64,
    pub label_color: Color,
    pub label_font_size_px: f64,
    /// Minimum gap between two neighbouring labels on one axis.
    pub label_min_spacing_px: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            line_color: Color::rgba(0.5, 0.5, 0.5, 0.35),
            line_width: 1.0,
            label_color: Color::rgb(0.25, 0.25, 0.25),
            label_font_size_px: 11.0,
            label_min_spacing_px: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairStyle {
    pub color: Color,
    pub width: f64,
}

impl Default for CrosshairStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.85, 0.2, 0.2),
            width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipStyle {
    pub background: Color,
    pub border: Color,
    pub text_color: Color,
    pub font_size_px: f64,
    pub padding_px: f64,
    /// Offset of the box from the pointer.
    pub offset_px: f64,
}

impl Default for TooltipStyle {
    fn default() -> Self {
        Self {
            background: Color::rgba(1.0, 1.0, 0.9, 0.95),
            border: Color::rgb(0.3, 0.3, 0.3),
            text_color: Color::rgb(0.1, 0.1, 0.1),
            font_size_px: 12.0,
            padding_px: 4.0,
            offset_px: 12.0,
        }
    }
}

/// Complete visual configuration of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartStyle {
    pub series: SeriesStyle,
    pub grid: GridStyle,
    pub crosshair: CrosshairStyle,
    pub tooltip: TooltipStyle,
}

impl ChartStyle {
    pub fn validate(self) -> ChartResult<()> {
        self.series.validate()?;
        self.grid.line_color.validate()?;
        self.grid.label_color.validate()?;
        self.crosshair.color.validate()?;
        self.tooltip.background.validate()?;
        self.tooltip.border.validate()?;
        self.tooltip.text_color.validate()?;
        for (name, value) in [
            ("grid line width", self.grid.line_width),
            ("grid label font size", self.grid.label_font_size_px),
            ("crosshair width", self.crosshair.width),
            ("tooltip font size", self.tooltip.font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartStyle, SeriesStyle};
    use crate::render::Color;

    #[test]
    fn default_style_is_valid() {
        assert!(ChartStyle::default().validate().is_ok());
    }

    #[test]
    fn invalid_series_style_is_rejected() {
        let style = SeriesStyle {
            line_width: 0.0,
            ..SeriesStyle::default()
        };
        assert!(style.validate().is_err());

        let style = SeriesStyle {
            fill_color: Color::rgba(0.0, 0.0, 2.0, 1.0),
            ..SeriesStyle::default()
        };
        assert!(style.validate().is_err());
    }
}
