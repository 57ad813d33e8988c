use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub text_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub background: String,
}

impl Theme {
    /// White shapes outlined in black on dark links, monospace labels.
    pub fn classic() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 14.0,
            node_fill: "white".to_string(),
            node_stroke: "black".to_string(),
            node_stroke_width: 2.0,
            text_color: "black".to_string(),
            line_color: "#444".to_string(),
            line_width: 2.0,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.4,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.4,
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
