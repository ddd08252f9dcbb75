use serde::Deserialize;
use structural_draw::{
    Config, Theme, extract_drawing, render_response, split_segments, strip_drawing_data,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeamRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    bar_color: Option<String>,
    padding: Option<f32>,
    target_size: Option<f32>,
}

fn build_config(options: BeamRenderOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(bar_color) = options.bar_color {
        config.theme.bar_color = bar_color;
    }
    if let Some(padding) = options.padding {
        config.layout.padding = padding;
    }
    if let Some(target_size) = options.target_size.filter(|size| *size > 0.0) {
        config.layout.target_size = target_size;
    }
    config
}

fn parse_options(options_json: Option<String>) -> Result<BeamRenderOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(BeamRenderOptions::default()),
    }
}

/// Render the drawing embedded in an engine response; `undefined` when there is none.
#[wasm_bindgen]
pub fn render_beam_svg(response: &str, options_json: Option<String>) -> Result<Option<String>, JsValue> {
    let config = build_config(parse_options(options_json)?);
    Ok(render_response(response, &config))
}

/// The embedded drawing description as normalised JSON.
#[wasm_bindgen]
pub fn extract_drawing_json(response: &str) -> Option<String> {
    extract_drawing(response).and_then(|description| serde_json::to_string(&description).ok())
}

/// The response text with the drawing block removed, for display.
#[wasm_bindgen]
pub fn response_display_text(response: &str) -> String {
    strip_drawing_data(response).to_string()
}

/// Prose and code pieces of the displayed response as a JSON array.
#[wasm_bindgen]
pub fn response_segments_json(response: &str) -> Result<String, JsValue> {
    serde_json::to_string(&split_segments(strip_drawing_data(response)))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
