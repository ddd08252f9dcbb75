use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{BarLayout, BeamLayout, TextLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &BeamLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));

    if !theme.background.is_empty() && theme.background != "none" {
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&theme.background)
        ));
    }

    let outline = &layout.outline;
    svg.push_str(&format!(
        "<rect class=\"beam\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        outline.x,
        outline.y,
        outline.width,
        outline.height,
        escape_xml(&theme.beam_fill),
        escape_xml(&theme.beam_stroke),
        config.outline_stroke_width
    ));

    for bar in &layout.bars {
        svg.push_str(&bar_svg(bar, theme, config));
    }

    for dimension in layout.dimensions() {
        svg.push_str(&text_svg(dimension, &theme.font_family, theme.font_size, false));
    }

    svg.push_str("</svg>");
    svg
}

fn bar_svg(bar: &BarLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut group = String::new();
    match &bar.id {
        Some(id) => group.push_str(&format!(
            "<g class=\"bar {}\" data-id=\"{}\">",
            bar.kind.as_str(),
            escape_xml(id)
        )),
        None => group.push_str(&format!("<g class=\"bar {}\">", bar.kind.as_str())),
    }
    group.push_str(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
        points_attr(&bar.points),
        escape_xml(&bar.color),
        config.bar_stroke_width
    ));
    if let Some(label) = &bar.label {
        group.push_str(&text_svg(label, &theme.label_font_family, theme.font_size, true));
    }
    group.push_str("</g>");
    group
}

/// A single point is repeated so the polyline stays a valid zero-length stroke.
fn points_attr(points: &[(f32, f32)]) -> String {
    let mut attr = points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    if let [(x, y)] = points {
        attr.push_str(&format!(" {x:.2},{y:.2}"));
    }
    attr
}

fn text_svg(text: &TextLayout, font_family: &str, font_size: f32, bold: bool) -> String {
    let x = text.x;
    let y = text.y;
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    let transform = match text.rotation {
        Some(angle) => format!(" transform=\"rotate({angle}, {x:.2}, {y:.2})\""),
        None => String::new(),
    };
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\"{weight} fill=\"{}\"{transform}>{}</text>",
        text.anchor.as_str(),
        escape_xml(font_family),
        font_size,
        escape_xml(&text.color),
        escape_xml(&text.text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.png_scale > 0.0 {
        render_cfg.png_scale
    } else {
        1.0
    };
    let size = tree.size().to_int_size().scale_by(scale).ok_or_else(|| {
        anyhow::anyhow!("Invalid PNG scale {}", render_cfg.png_scale)
    })?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BarKind, BarSpec, DiagramDescription, Point};
    use crate::layout::compute_layout;

    fn render(description: &DiagramDescription) -> String {
        let theme = Theme::slate();
        let config = LayoutConfig::default();
        render_svg(&compute_layout(description, &theme, &config), &theme, &config)
    }

    #[test]
    fn outline_only_drawing() {
        let svg = render(&DiagramDescription::new(500.0, 40.0));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"680.00\""));
        assert!(svg.contains("height=\"272.00\""));
        assert!(svg.contains("class=\"beam\""));
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains("L = 500 cm"));
        assert!(svg.contains("H = 40 cm"));
        assert!(svg.contains("rotate(-90, 30.00, 136.00)"));
    }

    #[test]
    fn labelled_bar_uses_default_amber() {
        let mut description = DiagramDescription::new(500.0, 40.0);
        description.bars.push(
            BarSpec::new(BarKind::Longitudinal, vec![Point::new(0.0, 5.0), Point::new(500.0, 5.0)])
                .with_label("3ø16"),
        );
        let svg = render(&description);
        assert!(svg.contains("<polyline points=\"40.00,46.00 640.00,46.00\""));
        assert!(svg.contains("stroke=\"#fbbf24\""));
        assert!(svg.contains("<text x=\"40.00\" y=\"36.00\""));
        assert!(svg.contains(">3ø16</text>"));
    }

    #[test]
    fn single_point_bar_is_degenerate_polyline() {
        let mut description = DiagramDescription::new(100.0, 20.0);
        description
            .bars
            .push(BarSpec::new(BarKind::Stirrup, vec![Point::new(10.0, 10.0)]));
        let svg = render(&description);
        assert!(svg.contains("class=\"bar stirrup\""));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("points=\"70.00,70.00 70.00,70.00\""));
    }

    #[test]
    fn escapes_label_text() {
        let mut description = DiagramDescription::new(100.0, 20.0);
        description.bars.push(
            BarSpec::new(BarKind::Longitudinal, vec![Point::new(0.0, 0.0)]).with_label("<2ø12 & hook>"),
        );
        let svg = render(&description);
        assert!(svg.contains("&lt;2ø12 &amp; hook&gt;"));
    }
}
