use serde::{Deserialize, Serialize};

/// Beam geometry and reinforcement as described by the model, in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDescription {
    pub length: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default)]
    pub bars: Vec<BarSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: BarKind,
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarKind {
    #[default]
    Longitudinal,
    Stirrup,
}

impl BarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Longitudinal => "longitudinal",
            Self::Stirrup => "stirrup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl DiagramDescription {
    pub fn new(length: f32, height: f32) -> Self {
        Self {
            length,
            height,
            width: None,
            bars: Vec::new(),
        }
    }

    /// Both envelope dimensions are positive and finite.
    pub fn has_valid_envelope(&self) -> bool {
        self.length.is_finite() && self.length > 0.0 && self.height.is_finite() && self.height > 0.0
    }
}

impl BarSpec {
    pub fn new(kind: BarKind, points: Vec<Point>) -> Self {
        Self {
            id: None,
            kind,
            points,
            label: None,
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
