#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod extract;
#[cfg(feature = "generate")]
pub mod gemini;
pub mod generate;
pub mod ir;
pub mod layout;
pub mod prompt;
pub mod render;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use extract::{
    DRAWING_MARKER, Segment, extract_code_block, extract_drawing, split_segments, strip_drawing_data,
};
pub use ir::{BarKind, BarSpec, DiagramDescription, Point};
pub use layout::{BeamLayout, compute_layout};
pub use render::render_svg;
pub use theme::Theme;

/// Lay out and serialise a description with the given configuration.
pub fn render_description(description: &DiagramDescription, config: &Config) -> String {
    let layout = compute_layout(description, &config.theme, &config.layout);
    render_svg(&layout, &config.theme, &config.layout)
}

/// Extract the drawing payload from a model response and render it.
///
/// `None` when the response carries no usable drawing.
pub fn render_response(raw: &str, config: &Config) -> Option<String> {
    extract_drawing(raw).map(|description| render_description(&description, config))
}
