//! Pulls structured pieces out of free-form model responses.
//!
//! Two independent extractions live here: the `[DRAWING_DATA]` beam payload
//! consumed by the layout stage, and fenced code blocks used for script
//! export and display. Neither ever fails loudly; a response with nothing to
//! extract is a normal response.

use crate::ir::DiagramDescription;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const DRAWING_MARKER: &str = "[DRAWING_DATA]";

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```([A-Za-z0-9_+.#-]*)[ \t]*\r?\n?(.*?)```").unwrap());

/// A display piece of a response: running prose or a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Prose { text: String },
    Code {
        language: Option<String>,
        body: String,
    },
}

/// Locate the first drawing marker and parse the JSON object after it.
///
/// Returns `None` when the marker is missing, the object is unbalanced or
/// unparseable, or the envelope dimensions are not positive finite numbers.
pub fn extract_drawing(raw: &str) -> Option<DiagramDescription> {
    let Some(marker_at) = raw.find(DRAWING_MARKER) else {
        tracing::debug!("response carries no drawing marker");
        return None;
    };
    let after = raw[marker_at + DRAWING_MARKER.len()..].trim_start();
    if !after.starts_with('{') {
        tracing::warn!("drawing marker is not followed by a JSON object");
        return None;
    }
    let Some(candidate) = find_json_object(after) else {
        tracing::warn!("drawing payload has unbalanced braces");
        return None;
    };
    let parsed = match parse_description(candidate) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "drawing payload is not a valid beam description");
            return None;
        }
    };
    validate(parsed)
}

fn parse_description(json_str: &str) -> anyhow::Result<DiagramDescription> {
    match serde_json::from_str::<DiagramDescription>(json_str) {
        Ok(parsed) => Ok(parsed),
        Err(strict_err) => json5::from_str::<DiagramDescription>(json_str).map_err(|_| strict_err.into()),
    }
}

fn validate(mut description: DiagramDescription) -> Option<DiagramDescription> {
    if !description.has_valid_envelope() {
        tracing::warn!(
            length = description.length,
            height = description.height,
            "drawing payload has a non-positive envelope"
        );
        return None;
    }
    if description
        .bars
        .iter()
        .any(|bar| bar.points.iter().any(|p| !p.is_finite()))
    {
        tracing::warn!("drawing payload has non-finite bar coordinates");
        return None;
    }
    let before = description.bars.len();
    description.bars.retain(|bar| !bar.points.is_empty());
    if description.bars.len() != before {
        tracing::warn!(dropped = before - description.bars.len(), "dropped bars without points");
    }
    Some(description)
}

/// Slice the balanced JSON object that starts at the first `{` in `text`.
///
/// Braces inside string literals (including escaped quotes) are ignored.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The response with the drawing marker and everything after it removed.
pub fn strip_drawing_data(raw: &str) -> &str {
    match raw.find(DRAWING_MARKER) {
        Some(idx) => raw[..idx].trim_end(),
        None => raw,
    }
}

/// Contents of the first fenced code block, or the whole text when none exists.
///
/// With `language` set, only a block tagged with that language (case-insensitive)
/// counts.
pub fn extract_code_block(raw: &str, language: Option<&str>) -> String {
    let found = FENCE_RE.captures_iter(raw).find(|caps| match language {
        Some(lang) => caps
            .get(1)
            .is_some_and(|tag| tag.as_str().eq_ignore_ascii_case(lang)),
        None => true,
    });
    match found.and_then(|caps| caps.get(2)) {
        Some(body) => body.as_str().trim().to_string(),
        None => raw.to_string(),
    }
}

/// Split a response into prose and fenced code pieces, in order.
///
/// A fence left open runs to the end of the text.
pub fn split_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (idx, part) in text.split("```").enumerate() {
        if idx % 2 == 0 {
            if !part.trim().is_empty() {
                segments.push(Segment::Prose {
                    text: part.to_string(),
                });
            }
            continue;
        }
        let (first_line, rest) = part.split_once('\n').unwrap_or((part, ""));
        let tag = first_line.trim();
        let (language, body) = if !tag.is_empty() && !tag.contains(char::is_whitespace) && !rest.is_empty()
        {
            (Some(tag.to_string()), rest)
        } else {
            (None, part)
        };
        segments.push(Segment::Code {
            language,
            body: body.trim().to_string(),
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BarKind, Point};

    #[test]
    fn missing_marker_is_absent() {
        assert_eq!(extract_drawing("no markers here"), None);
        assert_eq!(extract_drawing(""), None);
    }

    #[test]
    fn extracts_outline_only_payload() {
        let raw = "Design notes...\n[DRAWING_DATA] {\"length\":500,\"height\":40,\"bars\":[]}";
        let drawing = extract_drawing(raw).unwrap();
        assert_eq!(drawing.length, 500.0);
        assert_eq!(drawing.height, 40.0);
        assert!(drawing.bars.is_empty());
    }

    #[test]
    fn nested_objects_and_string_braces_stay_in_span() {
        let raw = r#"[DRAWING_DATA]
{"length": 300, "height": 30, "meta": {"note": "use } carefully \" {"},
 "bars": [{"type": "stirrup", "points": [{"x": 10, "y": 2}, {"x": 10, "y": 28}], "label": "ø8 c/15"}]}
trailing prose with a } brace"#;
        let drawing = extract_drawing(raw).unwrap();
        assert_eq!(drawing.bars.len(), 1);
        assert_eq!(drawing.bars[0].kind, BarKind::Stirrup);
        assert_eq!(drawing.bars[0].points[1], Point::new(10.0, 28.0));
        assert_eq!(drawing.bars[0].label.as_deref(), Some("ø8 c/15"));
    }

    #[test]
    fn only_first_marker_counts() {
        let raw = "[DRAWING_DATA] {\"length\": 100, \"height\": 20}\n[DRAWING_DATA] {\"length\": 900, \"height\": 90}";
        assert_eq!(extract_drawing(raw).unwrap().length, 100.0);
    }

    #[test]
    fn malformed_payloads_are_absent() {
        assert_eq!(extract_drawing("[DRAWING_DATA] {\"length\": 500, "), None);
        assert_eq!(extract_drawing("[DRAWING_DATA] {\"length\": oops}"), None);
        assert_eq!(extract_drawing("[DRAWING_DATA] not json"), None);
        assert_eq!(extract_drawing("[DRAWING_DATA] {\"height\": 40}"), None);
        assert_eq!(extract_drawing("[DRAWING_DATA] {\"length\": 0, \"height\": 40}"), None);
        assert_eq!(extract_drawing("[DRAWING_DATA] {\"length\": 500, \"height\": -4}"), None);
    }

    #[test]
    fn lenient_json_is_accepted() {
        let raw = "[DRAWING_DATA] {length: 250, height: 25, bars: [{\"type\": 'longitudinal', points: [{x: 0, y: 3},],},],}";
        let drawing = extract_drawing(raw).unwrap();
        assert_eq!(drawing.length, 250.0);
        assert_eq!(drawing.bars.len(), 1);
    }

    #[test]
    fn bars_without_points_are_dropped() {
        let raw = r#"[DRAWING_DATA] {"length": 100, "height": 20, "bars": [{"points": []}, {"points": [{"x": 1, "y": 1}]}]}"#;
        let drawing = extract_drawing(raw).unwrap();
        assert_eq!(drawing.bars.len(), 1);
        assert_eq!(drawing.bars[0].points.len(), 1);
    }

    #[test]
    fn json_object_scanner() {
        assert_eq!(find_json_object("x {\"a\": {\"b\": 1}} y"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(find_json_object("{\"a\": \"}\"}"), Some("{\"a\": \"}\"}"));
        assert_eq!(find_json_object("{\"a\": 1"), None);
        assert_eq!(find_json_object("no object"), None);
    }

    #[test]
    fn strips_drawing_tail() {
        assert_eq!(strip_drawing_data("report\n\n[DRAWING_DATA] {}"), "report");
        assert_eq!(strip_drawing_data("report"), "report");
    }

    #[test]
    fn code_block_extraction() {
        let raw = "Intro\n```python\nimport math\nprint(math.pi)\n```\nOutro";
        assert_eq!(extract_code_block(raw, Some("python")), "import math\nprint(math.pi)");
        assert_eq!(extract_code_block(raw, None), "import math\nprint(math.pi)");
        assert_eq!(extract_code_block(raw, Some("rust")), raw);
        assert_eq!(extract_code_block("plain text", None), "plain text");
    }

    #[test]
    fn tagged_block_is_preferred_over_earlier_untagged() {
        let raw = "```\nraw data\n```\n```Python\nx = 1\n```";
        assert_eq!(extract_code_block(raw, Some("python")), "x = 1");
        assert_eq!(extract_code_block(raw, None), "raw data");
    }

    #[test]
    fn splits_prose_and_code() {
        let segments = split_segments("Check:\n```python\nx = 1\n```\nDone.");
        assert_eq!(
            segments,
            vec![
                Segment::Prose {
                    text: "Check:\n".to_string(),
                },
                Segment::Code {
                    language: Some("python".to_string()),
                    body: "x = 1".to_string(),
                },
                Segment::Prose {
                    text: "\nDone.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let segments = split_segments("A\n```\nopen block");
        assert_eq!(
            segments[1],
            Segment::Code {
                language: None,
                body: "open block".to_string(),
            }
        );
    }
}
