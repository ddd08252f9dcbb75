use crate::extract::DRAWING_MARKER;
use serde::{Deserialize, Serialize};

/// What the user asks the design engine to do with their beam data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReaderAction {
    GeneratePython,
    DetailedReinforcement,
    #[default]
    DrawReinforcement,
    TorsionCheck,
    BarSchedule,
    Custom,
}

impl ReaderAction {
    pub const ALL: [ReaderAction; 6] = [
        Self::GeneratePython,
        Self::DetailedReinforcement,
        Self::DrawReinforcement,
        Self::TorsionCheck,
        Self::BarSchedule,
        Self::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GeneratePython => "Generate calculation script",
            Self::DetailedReinforcement => "Design reinforcement and stirrups",
            Self::DrawReinforcement => "Visualize bar layout (drawing)",
            Self::TorsionCheck => "Torsion check",
            Self::BarSchedule => "Generate bar schedule",
            Self::Custom => "Custom query",
        }
    }

    /// Whether the prompt for this action asks for a drawing payload.
    pub fn requests_drawing(self) -> bool {
        matches!(self, Self::DrawReinforcement | Self::DetailedReinforcement)
    }
}

impl std::fmt::Display for ReaderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn system_instruction() -> String {
    format!(
        r##"You are a structural design engineer and full-stack developer.
Your goal is to write Python scripts and graphical representations for the design of reinforced concrete beams.

DRAWING RULES:
1. When the user asks to visualize or draw, you MUST append a JSON block to the end of your answer introduced by the tag {marker}.
2. That JSON defines one beam and its bars: {{ "length": L, "height": H, "bars": [ {{ "type": "longitudinal", "points": [{{"x": 0, "y": 5}}, ...], "label": "3ø16", "color": "#fbbf24" }} ] }}.
3. All coordinates are centimeters, x along the beam, y downward from the top face.
4. Longitudinal bars must end in hooks (short 90 or 135 degree returns).
5. Stirrups are closed rectangles repeated along the beam, with "type": "stirrup".

PYTHON SCRIPT RULES:
1. ADAPTATION: read the keys of the user's JSON (load_user_data).
2. VISUALIZATION: where possible include a function that uses matplotlib to draw the bar layout.
3. CALCULATION: bending, shear and combined torsion.
4. DETAILING: choose commercial diameters (6, 8, 10, 12, 16, 20, 25 mm)."##,
        marker = DRAWING_MARKER
    )
}

pub fn build_prompt(content: &str, action: ReaderAction, custom_prompt: Option<&str>) -> String {
    let custom = custom_prompt.map(str::trim).filter(|p| !p.is_empty());
    match action {
        ReaderAction::DrawReinforcement => format!(
            "Based on this data: {content}\n\
             1. Write the Python script that computes the reinforcement.\n\
             2. Produce a line drawing of the beam.\n\
             3. Include the {DRAWING_MARKER} block with the JSON to render the beam and its bars (lines with hooks).\n\
             Additional instruction: {}",
            custom.unwrap_or("Draw the longitudinal and cross sections.")
        ),
        ReaderAction::DetailedReinforcement => format!(
            "SOURCE DATA: {content}\n\
             1. Write a parser for this data.\n\
             2. Size As at the supports and at midspan.\n\
             3. Write the code that picks commercial bars and a bending schedule.\n\
             4. Include {DRAWING_MARKER} to preview the reinforcement."
        ),
        ReaderAction::GeneratePython => format!(
            "Write a complete engineering script for: \"{content}\"\n\
             It must map the user's data, compute bending/torsion and print a schedule.\n\
             Add a 'plot_reinforcement()' function using matplotlib to show the bars.\n\
             Extra: {}",
            custom.unwrap_or("none")
        ),
        ReaderAction::TorsionCheck | ReaderAction::BarSchedule | ReaderAction::Custom => format!(
            "{}\n\nData:\n{content}",
            custom.unwrap_or("Process the structural data")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_distinct_actions() {
        let labels: std::collections::HashSet<_> = ReaderAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(ReaderAction::default(), ReaderAction::DrawReinforcement);
    }

    #[test]
    fn drawing_prompts_request_the_marker() {
        for action in ReaderAction::ALL {
            let prompt = build_prompt("{\"L\": 500}", action, None);
            assert!(prompt.contains("{\"L\": 500}"), "{action:?} dropped the content");
            assert_eq!(prompt.contains(DRAWING_MARKER), action.requests_drawing(), "{action:?}");
        }
        assert!(system_instruction().contains(DRAWING_MARKER));
    }

    #[test]
    fn custom_prompt_replaces_default_instruction() {
        let prompt = build_prompt("data", ReaderAction::Custom, Some("Check deflection"));
        assert!(prompt.starts_with("Check deflection"));
        let prompt = build_prompt("data", ReaderAction::Custom, Some("   "));
        assert!(prompt.starts_with("Process the structural data"));
        let prompt = build_prompt("data", ReaderAction::DrawReinforcement, None);
        assert!(prompt.contains("Draw the longitudinal and cross sections."));
    }
}
