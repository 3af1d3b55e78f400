use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub title_color: String,
    pub subtitle_color: String,
    pub label_color: String,
    pub background: String,
    pub grid_color: String,
    pub month_label_color: String,
    pub handle_fill: String,
    pub handle_stroke: String,
    pub today_color: String,
    pub today_stroke: String,
    pub tooltip_fill: String,
    pub tooltip_stroke: String,
    pub tooltip_text_color: String,
    pub legend_fill: String,
    pub legend_stroke: String,
}

impl Theme {
    /// London-underground styling: white canvas, bold black handles, red today flag.
    pub fn tube() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            title_color: "#222".to_string(),
            subtitle_color: "#666".to_string(),
            label_color: "#222".to_string(),
            background: "#FFFFFF".to_string(),
            grid_color: "#ddd".to_string(),
            month_label_color: "#bbb".to_string(),
            handle_fill: "#fff".to_string(),
            handle_stroke: "#000".to_string(),
            today_color: "#e74c3c".to_string(),
            today_stroke: "#b03a2e".to_string(),
            tooltip_fill: "#333".to_string(),
            tooltip_stroke: "#222".to_string(),
            tooltip_text_color: "#fff".to_string(),
            legend_fill: "#fff".to_string(),
            legend_stroke: "#000".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            title_color: "#1C2430".to_string(),
            subtitle_color: "#5B6B84".to_string(),
            label_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            grid_color: "#E3E8F0".to_string(),
            month_label_color: "#7A8AA6".to_string(),
            handle_fill: "#FFFFFF".to_string(),
            handle_stroke: "#1C2430".to_string(),
            today_color: "#F97316".to_string(),
            today_stroke: "#C2410C".to_string(),
            tooltip_fill: "#1C2430".to_string(),
            tooltip_stroke: "#0F172A".to_string(),
            tooltip_text_color: "#FFFFFF".to_string(),
            legend_fill: "#FFFFFF".to_string(),
            legend_stroke: "#C7D2E5".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "tube" | "default" => Some(Self::tube()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::tube()
    }
}
