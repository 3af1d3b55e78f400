//! Tube-map style timelines: tracks of dated milestones laid out on a shared
//! time axis, with orientation-aware margins that keep every rotated label on
//! the canvas.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod drag;
pub mod error;
pub mod interchange;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod scene;
pub mod text_metrics;
pub mod theme;
pub mod timeline;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, OrientationSetting, TimelineOptions};
pub use drag::{DragCommit, DragController};
pub use error::{ConfigError, ImportError, RenderError};
pub use layout::{LayoutResult, Orientation, compute_layout};
pub use model::{Milestone, MilestoneKind, TimelineModel, Track};
pub use render::{Surface, SvgSurface, render_svg};
pub use scene::{Scene, build_scene};
pub use theme::Theme;
pub use timeline::{Clock, FixedClock, FixedViewport, SystemClock, TubeTimeline, ViewportHost};

/// Model, layout and scene for one non-interactive render.
pub fn render_tracks(
    tracks: &[Track],
    config: &Config,
    focus: Option<&str>,
    today: chrono::NaiveDate,
) -> (TimelineModel, LayoutResult, Scene) {
    let model = TimelineModel::build(tracks, config.timeline.sort_tracks);
    let viewport = layout::Size::new(config.render.width, config.render.height);
    let layout = compute_layout(&model, &config.timeline, viewport, &config.theme, &config.layout);
    let scene = build_scene(&scene::SceneContext {
        model: &model,
        layout: &layout,
        options: &config.timeline,
        theme: &config.theme,
        config: &config.layout,
        focus,
        today,
        drag_enabled: false,
    });
    (model, layout, scene)
}

/// One-shot pipeline from tracks to an SVG document.
pub fn render_tracks_svg(
    tracks: &[Track],
    config: &Config,
    focus: Option<&str>,
    today: chrono::NaiveDate,
) -> String {
    let (_, _, scene) = render_tracks(tracks, config, focus, today);
    render_svg(&scene)
}
