use serde::Deserialize;
use tube_timeline::config::{Config, OrientationSetting};
use tube_timeline::date::parse_date;
use tube_timeline::interchange::import_tracks;
use tube_timeline::render_tracks_svg;
use tube_timeline::theme::Theme;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineRenderOptions {
    theme: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    orientation: Option<OrientationSetting>,
    title: Option<String>,
    subtitle: Option<String>,
    show_today: Option<bool>,
    /// `DD/MM/YYYY`; the host clock is not reachable from here.
    today: Option<String>,
    focus: Option<String>,
    fast_text: Option<bool>,
}

fn build_config(options: &TimelineRenderOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        config.render.background = theme.background.clone();
        config.theme = theme;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(orientation) = options.orientation {
        config.timeline.orientation = orientation;
    }
    if let Some(title) = &options.title {
        config.timeline.header.title = title.clone();
    }
    if let Some(subtitle) = &options.subtitle {
        config.timeline.header.subtitle = subtitle.clone();
    }
    if let Some(show_today) = options.show_today {
        config.timeline.show_today = show_today;
    }
    // Font files are not reachable from wasm, so heuristic metrics are the default.
    config.layout.fast_text_metrics = options.fast_text.unwrap_or(true);
    config
}

#[wasm_bindgen]
pub fn render_timeline_svg(tracks_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<TimelineRenderOptions>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string()))?,
        None => TimelineRenderOptions::default(),
    };
    render(tracks_json, &options).map_err(|error| JsValue::from_str(&error))
}

fn render(tracks_json: &str, options: &TimelineRenderOptions) -> Result<String, String> {
    let tracks = import_tracks(tracks_json).map_err(|error| error.to_string())?;
    let config = build_config(options);
    config.layout.validate().map_err(|error| error.to_string())?;
    let today = match options.today.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| format!("invalid today date `{raw}`"))?,
        // Without a date the marker stays hidden rather than guessing.
        None => chrono::NaiveDate::MIN,
    };
    Ok(render_tracks_svg(&tracks, &config, options.focus.as_deref(), today))
}
