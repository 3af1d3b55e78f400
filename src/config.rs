use crate::error::ConfigError;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationSetting {
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

impl FromStr for OrientationSetting {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(ConfigError::UnknownOrientation(other.to_string())),
        }
    }
}

impl fmt::Display for OrientationSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderOptions {
    pub title: String,
    pub subtitle: String,
    pub logo_href: Option<String>,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            title: "Timeline".to_string(),
            subtitle: String::new(),
            logo_href: None,
        }
    }
}

/// Every recognised timeline option. Callbacks live on the timeline builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineOptions {
    pub header: HeaderOptions,
    pub show_today: bool,
    pub orientation: OrientationSetting,
    /// Sort tracks by start date; `false` keeps the caller's order.
    pub sort_tracks: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            header: HeaderOptions::default(),
            show_today: true,
            orientation: OrientationSetting::Auto,
            sort_tracks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub lane_thickness: f32,
    pub label_font_size: f32,
    pub compact_label_font_size: f32,
    pub label_line_spacing: f32,
    pub compact_label_line_spacing: f32,
    pub min_label_font_size: f32,
    pub char_width_ratio: f32,
    pub line_height_ratio: f32,
    pub label_rotation_deg: f32,
    pub safety_padding: f32,
    pub base_margin_left: f32,
    pub base_margin_right: f32,
    pub base_margin_top: f32,
    pub base_margin_bottom: f32,
    pub top_margin_ratio: f32,
    pub bottom_margin_ratio: f32,
    pub header_height_horizontal: f32,
    pub header_height_vertical: f32,
    pub header_height_ratio: f32,
    pub constrained_height: f32,
    pub min_scale: f32,
    pub axis_band: f32,
    pub month_font_size: f32,
    pub handle_stroke_width: f32,
    pub dimmed_opacity: f32,
    pub legend_dimmed_opacity: f32,
    pub today_flag_min_width: f32,
    pub today_flag_max_width: f32,
    pub today_flag_width_ratio: f32,
    pub today_flag_min_height: f32,
    pub today_flag_max_height: f32,
    pub today_flag_height_ratio: f32,
    pub tooltip_font_size: f32,
    pub tooltip_line_height: f32,
    pub tooltip_padding: f32,
    pub fit_passes: usize,
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lane_thickness: 15.0,
            label_font_size: 15.0,
            compact_label_font_size: 11.0,
            label_line_spacing: 16.0,
            compact_label_line_spacing: 12.0,
            min_label_font_size: 3.0,
            char_width_ratio: 0.65,
            line_height_ratio: 1.2,
            label_rotation_deg: 30.0,
            safety_padding: 20.0,
            base_margin_left: 35.0,
            base_margin_right: 60.0,
            base_margin_top: 16.0,
            base_margin_bottom: 30.0,
            top_margin_ratio: 0.03,
            bottom_margin_ratio: 0.06,
            header_height_horizontal: 50.0,
            header_height_vertical: 40.0,
            header_height_ratio: 0.12,
            constrained_height: 500.0,
            min_scale: 0.6,
            axis_band: 45.0,
            month_font_size: 11.0,
            handle_stroke_width: 5.0,
            dimmed_opacity: 0.2,
            legend_dimmed_opacity: 0.4,
            today_flag_min_width: 48.0,
            today_flag_max_width: 80.0,
            today_flag_width_ratio: 0.045,
            today_flag_min_height: 20.0,
            today_flag_max_height: 32.0,
            today_flag_height_ratio: 0.025,
            tooltip_font_size: 13.0,
            tooltip_line_height: 18.0,
            tooltip_padding: 10.0,
            fit_passes: 8,
            fast_text_metrics: false,
        }
    }
}

impl LayoutConfig {
    /// Rejects settings that would make every layout degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("lane_thickness", self.lane_thickness),
            ("label_font_size", self.label_font_size),
            ("compact_label_font_size", self.compact_label_font_size),
            ("min_label_font_size", self.min_label_font_size),
            ("char_width_ratio", self.char_width_ratio),
            ("line_height_ratio", self.line_height_ratio),
            ("constrained_height", self.constrained_height),
            ("min_scale", self.min_scale),
            ("tooltip_font_size", self.tooltip_font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        let non_negative = [
            ("safety_padding", self.safety_padding),
            ("base_margin_left", self.base_margin_left),
            ("base_margin_right", self.base_margin_right),
            ("base_margin_top", self.base_margin_top),
            ("base_margin_bottom", self.base_margin_bottom),
            ("axis_band", self.axis_band),
            ("handle_stroke_width", self.handle_stroke_width),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        for (name, value) in [
            ("dimmed_opacity", self.dimmed_opacity),
            ("legend_dimmed_opacity", self.legend_dimmed_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidSetting { name, value });
            }
        }
        if !self.label_rotation_deg.is_finite() || self.label_rotation_deg.abs() >= 90.0 {
            return Err(ConfigError::InvalidSetting {
                name: "label_rotation_deg",
                value: self.label_rotation_deg,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub timeline: TimelineOptions,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    label_color: Option<String>,
    background: Option<String>,
    grid_color: Option<String>,
    today_color: Option<String>,
    handle_stroke: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HeaderFile {
    title: Option<String>,
    subtitle: Option<String>,
    logo_href: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    lane_thickness: Option<f32>,
    label_font_size: Option<f32>,
    compact_label_font_size: Option<f32>,
    label_rotation_deg: Option<f32>,
    safety_padding: Option<f32>,
    dimmed_opacity: Option<f32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    header: Option<HeaderFile>,
    show_today: Option<bool>,
    orientation: Option<String>,
    sort_tracks: Option<bool>,
    layout: Option<LayoutConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

/// Loads a JSON (or JSON5) config file and overlays it onto the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(name) = parsed.theme.as_deref() {
        match Theme::by_name(name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme `{name}`, keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = vars.today_color {
            config.theme.today_color = v;
        }
        if let Some(v) = vars.handle_stroke {
            config.theme.handle_stroke = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(header) = parsed.header {
        if let Some(v) = header.title {
            config.timeline.header.title = v;
        }
        if let Some(v) = header.subtitle {
            config.timeline.header.subtitle = v;
        }
        if let Some(v) = header.logo_href {
            config.timeline.header.logo_href = (!v.trim().is_empty()).then_some(v);
        }
    }
    if let Some(v) = parsed.show_today {
        config.timeline.show_today = v;
    }
    if let Some(v) = parsed.orientation.as_deref() {
        config.timeline.orientation = v.parse()?;
    }
    if let Some(v) = parsed.sort_tracks {
        config.timeline.sort_tracks = v;
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.lane_thickness {
            config.layout.lane_thickness = v;
        }
        if let Some(v) = layout.label_font_size {
            config.layout.label_font_size = v;
        }
        if let Some(v) = layout.compact_label_font_size {
            config.layout.compact_label_font_size = v;
        }
        if let Some(v) = layout.label_rotation_deg {
            config.layout.label_rotation_deg = v;
        }
        if let Some(v) = layout.safety_padding {
            config.layout.safety_padding = v;
        }
        if let Some(v) = layout.dimmed_opacity {
            config.layout.dimmed_opacity = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }
    config.layout.validate()?;

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    Ok(config)
}
