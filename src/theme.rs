use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub label_font_family: String,
    pub font_size: f32,
    pub background: String,
    pub beam_fill: String,
    pub beam_stroke: String,
    pub bar_color: String,
    pub dimension_color: String,
}

impl Theme {
    /// Dark drafting board, amber bars.
    pub fn slate() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            label_font_family: "ui-monospace, SFMono-Regular, Menlo, monospace".to_string(),
            font_size: 10.0,
            background: "#0F172A".to_string(),
            beam_fill: "rgba(100, 116, 139, 0.1)".to_string(),
            beam_stroke: "#475569".to_string(),
            bar_color: "#fbbf24".to_string(),
            dimension_color: "#64748b".to_string(),
        }
    }

    /// Light variant for printing; bars keep the same amber default.
    pub fn paper() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            label_font_family: "ui-monospace, SFMono-Regular, Menlo, monospace".to_string(),
            font_size: 10.0,
            background: "#FFFFFF".to_string(),
            beam_fill: "#F1F5F9".to_string(),
            beam_stroke: "#334155".to_string(),
            bar_color: "#fbbf24".to_string(),
            dimension_color: "#475569".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "slate" | "dark" | "default" => Some(Self::slate()),
            "paper" | "light" => Some(Self::paper()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::slate()
    }
}
