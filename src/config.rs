use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry policy for mapping model space (cm) onto the drawing surface.
///
/// `height_exaggeration` and `display_height_factor` are rendering policy
/// only. A beam is typically ten or more times longer than it is tall, so the
/// true cross-section height would render as a sliver. Neither factor is a
/// structural scale, and dimensions read off the drawing are not to scale
/// vertically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Blank margin around the beam outline, in surface units.
    pub padding: f32,
    /// Surface size the dominant beam dimension is scaled to.
    pub target_size: f32,
    /// Weight of the height when choosing the scale denominator.
    pub height_exaggeration: f32,
    /// Extra vertical stretch applied to the outline height.
    pub display_height_factor: f32,
    /// Distance a bar label sits above the bar's first point.
    pub label_offset: f32,
    /// Distance of the length annotation below the outline.
    pub dimension_offset: f32,
    /// Distance of the height annotation left of the outline.
    pub dimension_side_offset: f32,
    pub bar_stroke_width: f32,
    pub outline_stroke_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            target_size: 600.0,
            height_exaggeration: 10.0,
            display_height_factor: 4.0,
            label_offset: 10.0,
            dimension_offset: 25.0,
            dimension_side_offset: 10.0,
            bar_stroke_width: 3.0,
            outline_stroke_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Rasterisation scale for PNG output.
    pub png_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            png_scale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout; `None` waits for the service indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.1,
            api_key_env: "API_KEY".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    label_font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    beam_fill: Option<String>,
    beam_stroke: Option<String>,
    bar_color: Option<String>,
    dimension_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    padding: Option<f32>,
    target_size: Option<f32>,
    height_exaggeration: Option<f32>,
    display_height_factor: Option<f32>,
    label_offset: Option<f32>,
    dimension_offset: Option<f32>,
    dimension_side_offset: Option<f32>,
    bar_stroke_width: Option<f32>,
    outline_stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    png_scale: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigFile {
    endpoint: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    generation: Option<GenerationConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}' (expected slate or paper)"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.label_font_family {
            config.theme.label_font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.beam_fill {
            config.theme.beam_fill = v;
        }
        if let Some(v) = vars.beam_stroke {
            config.theme.beam_stroke = v;
        }
        if let Some(v) = vars.bar_color {
            config.theme.bar_color = v;
        }
        if let Some(v) = vars.dimension_color {
            config.theme.dimension_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.padding {
            target.padding = v;
        }
        if let Some(v) = layout.target_size {
            target.target_size = v;
        }
        if let Some(v) = layout.height_exaggeration {
            target.height_exaggeration = v;
        }
        if let Some(v) = layout.display_height_factor {
            target.display_height_factor = v;
        }
        if let Some(v) = layout.label_offset {
            target.label_offset = v;
        }
        if let Some(v) = layout.dimension_offset {
            target.dimension_offset = v;
        }
        if let Some(v) = layout.dimension_side_offset {
            target.dimension_side_offset = v;
        }
        if let Some(v) = layout.bar_stroke_width {
            target.bar_stroke_width = v;
        }
        if let Some(v) = layout.outline_stroke_width {
            target.outline_stroke_width = v;
        }
        if !(target.target_size.is_finite() && target.target_size > 0.0) {
            anyhow::bail!("layout.targetSize must be a positive number");
        }
        if !(target.height_exaggeration.is_finite() && target.height_exaggeration > 0.0) {
            anyhow::bail!("layout.heightExaggeration must be a positive number");
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.png_scale {
            config.render.png_scale = v;
        }
    }

    if let Some(generation) = parsed.generation {
        let target = &mut config.generation;
        if let Some(v) = generation.endpoint {
            target.endpoint = v;
        }
        if let Some(v) = generation.model {
            target.model = v;
        }
        if let Some(v) = generation.temperature {
            target.temperature = v;
        }
        if let Some(v) = generation.api_key_env {
            target.api_key_env = v;
        }
        if generation.timeout_secs.is_some() {
            target.timeout_secs = generation.timeout_secs;
        }
    }

    Ok(config)
}
