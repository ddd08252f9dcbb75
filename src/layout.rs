//! Model-space to surface-space mapping for beam diagrams.
//!
//! The layout stage owns all geometry; `render` only serialises what is
//! computed here. Everything is a pure function of the description, theme
//! and [`LayoutConfig`].

use crate::config::LayoutConfig;
use crate::ir::{BarKind, DiagramDescription};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: String,
    pub anchor: TextAnchor,
    /// Rotation in degrees about `(x, y)`.
    pub rotation: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub id: Option<String>,
    pub kind: BarKind,
    pub points: Vec<(f32, f32)>,
    pub color: String,
    pub label: Option<TextLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamLayout {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub outline: RectLayout,
    pub bars: Vec<BarLayout>,
    pub length_dimension: TextLayout,
    pub height_dimension: TextLayout,
}

impl BeamLayout {
    pub fn dimensions(&self) -> [&TextLayout; 2] {
        [&self.length_dimension, &self.height_dimension]
    }
}

/// Uniform model-to-surface scale.
///
/// The height is weighted by `height_exaggeration` so a slender beam's
/// length does not dominate the scale outright.
pub fn compute_scale(description: &DiagramDescription, config: &LayoutConfig) -> f32 {
    let dominant = description
        .length
        .max(description.height * config.height_exaggeration);
    config.target_size / dominant
}

pub fn compute_layout(description: &DiagramDescription, theme: &Theme, config: &LayoutConfig) -> BeamLayout {
    let scale = compute_scale(description, config);
    let padding = config.padding;
    let beam_w = description.length * scale;
    let beam_h = description.height * config.display_height_factor * scale;

    let outline = RectLayout {
        x: padding,
        y: padding,
        width: beam_w,
        height: beam_h,
    };

    let bars = description
        .bars
        .iter()
        .map(|bar| {
            let color = non_blank(bar.color.as_deref())
                .unwrap_or(theme.bar_color.as_str())
                .to_string();
            let points: Vec<(f32, f32)> = bar
                .points
                .iter()
                .map(|p| (padding + p.x * scale, padding + p.y * scale))
                .collect();
            let label = match (non_blank(bar.label.as_deref()), points.first()) {
                (Some(text), Some(&(x, y))) => Some(TextLayout {
                    x,
                    y: y - config.label_offset,
                    text: text.to_string(),
                    color: color.clone(),
                    anchor: TextAnchor::Start,
                    rotation: None,
                }),
                _ => None,
            };
            BarLayout {
                id: bar.id.clone(),
                kind: bar.kind,
                points,
                color,
                label,
            }
        })
        .collect();

    let length_dimension = TextLayout {
        x: padding + beam_w / 2.0,
        y: padding + beam_h + config.dimension_offset,
        text: format!("L = {} cm", description.length),
        color: theme.dimension_color.clone(),
        anchor: TextAnchor::Middle,
        rotation: None,
    };
    let height_dimension = TextLayout {
        x: padding - config.dimension_side_offset,
        y: padding + beam_h / 2.0,
        text: format!("H = {} cm", description.height),
        color: theme.dimension_color.clone(),
        anchor: TextAnchor::Middle,
        rotation: Some(-90.0),
    };

    BeamLayout {
        width: beam_w + padding * 2.0,
        height: beam_h + padding * 2.0,
        scale,
        outline,
        bars,
        length_dimension,
        height_dimension,
    }
}

// Models often send `""` for colour and label instead of leaving them out.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
