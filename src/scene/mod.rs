pub mod primitives;
mod tooltip;

pub use primitives::*;
pub use tooltip::tooltip_for;

use crate::config::{LayoutConfig, TimelineOptions};
use crate::date::month_starts;
use crate::error::RenderError;
use crate::layout::text::{fallback_text_width, label_lines, label_unit_width, month_label_width};
use crate::layout::{
    HeaderLayout, LayoutResult, MONTH_LABEL_GAP, Orientation, Point, Rect, Size, TODAY_FLAG_GAP,
    glyph_half_size,
};
use crate::model::{Milestone, TimelineModel, TrackEntry};
use crate::theme::Theme;
use chrono::NaiveDate;
use serde::Serialize;

const HIT_SLOP: f32 = 2.0;
const TODAY_LABEL: &str = "Today";

/// Z-order of the scene, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerKind {
    Background,
    Header,
    MonthGrid,
    TrackLines,
    Milestones,
    Today,
    Tooltip,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Background,
        LayerKind::Header,
        LayerKind::MonthGrid,
        LayerKind::TrackLines,
        LayerKind::Milestones,
        LayerKind::Today,
        LayerKind::Tooltip,
    ];

    pub fn class(self) -> &'static str {
        match self {
            LayerKind::Background => "background",
            LayerKind::Header => "header",
            LayerKind::MonthGrid => "month-grid",
            LayerKind::TrackLines => "track-lines",
            LayerKind::Milestones => "milestones",
            LayerKind::Today => "today",
            LayerKind::Tooltip => "tooltip-layer",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneHit {
    pub group_id: String,
    pub track: String,
    pub milestone: Milestone,
    pub date: NaiveDate,
    /// Canvas position of the glyph centre.
    pub anchor: Point,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HitTarget {
    Milestone(MilestoneHit),
    Legend { track: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRegion {
    pub rect: Rect,
    pub target: HitTarget,
}

/// Declarative drawing of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub size: Size,
    /// One group per [`LayerKind`], in z-order.
    pub layers: Vec<Group>,
    pub hit_regions: Vec<HitRegion>,
    pub month_ticks: Vec<NaiveDate>,
    pub today: Option<NaiveDate>,
}

impl Scene {
    pub fn layer(&self, kind: LayerKind) -> &Group {
        &self.layers[kind.index()]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Group {
        &mut self.layers[kind.index()]
    }

    pub fn find_group(&self, id: &str) -> Option<&Group> {
        self.layers.iter().find_map(|layer| layer.find(id))
    }

    pub fn find_group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.layers.iter_mut().find_map(|layer| layer.find_mut(id))
    }

    /// Topmost hit region under `point`.
    pub fn hit_test(&self, point: Point) -> Option<&HitRegion> {
        self.hit_regions.iter().rev().find(|region| region.rect.contains(point))
    }

    pub fn milestone_hit(&self, group_id: &str) -> Option<&MilestoneHit> {
        self.hit_regions.iter().find_map(|region| match &region.target {
            HitTarget::Milestone(hit) if hit.group_id == group_id => Some(hit),
            _ => None,
        })
    }

    pub fn set_tooltip(&mut self, tooltip: Option<Group>) {
        let layer = self.layer_mut(LayerKind::Tooltip);
        layer.children.clear();
        if let Some(group) = tooltip {
            layer.push(group);
        }
    }

    pub fn tooltip(&self) -> Option<&Group> {
        self.layer(LayerKind::Tooltip)
            .children
            .iter()
            .find_map(|child| match child {
                Primitive::Group(group) => Some(group),
                _ => None,
            })
    }

    pub fn primitive_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.children)
            .map(Primitive::leaf_count)
            .sum()
    }

    /// Canvas bounds of every leaf primitive, tagged with its layer.
    pub fn leaf_bounds(&self) -> Vec<(LayerKind, Rect)> {
        fn walk(
            primitive: &Primitive,
            offset: Point,
            kind: LayerKind,
            out: &mut Vec<(LayerKind, Rect)>,
        ) {
            match primitive {
                Primitive::Group(group) => {
                    let offset =
                        Point::new(offset.x + group.translate.x, offset.y + group.translate.y);
                    for child in &group.children {
                        walk(child, offset, kind, out);
                    }
                }
                leaf => {
                    if let Some(rect) = leaf.bounds() {
                        out.push((kind, rect.translate(offset.x, offset.y)));
                    }
                }
            }
        }
        let mut out = Vec::new();
        for (kind, layer) in LayerKind::ALL.iter().zip(&self.layers) {
            for child in &layer.children {
                walk(child, layer.translate, *kind, &mut out);
            }
        }
        out
    }

    pub fn check_finite(&self) -> Result<(), RenderError> {
        for (kind, layer) in LayerKind::ALL.iter().zip(&self.layers) {
            if !layer.children.iter().all(Primitive::is_finite) {
                return Err(RenderError::NonFinite(kind.class().to_string()));
            }
        }
        Ok(())
    }
}

/// Everything one scene pass reads.
pub struct SceneContext<'a> {
    pub model: &'a TimelineModel,
    pub layout: &'a LayoutResult,
    pub options: &'a TimelineOptions,
    pub theme: &'a Theme,
    pub config: &'a LayoutConfig,
    /// Track isolated from the legend, if any.
    pub focus: Option<&'a str>,
    pub today: NaiveDate,
    /// Start/end handles are draggable only when someone listens for drags.
    pub drag_enabled: bool,
}

impl SceneContext<'_> {
    fn track_opacity(&self, track: &str) -> f32 {
        match self.focus {
            Some(focus) if focus != track => self.config.dimmed_opacity,
            _ => 1.0,
        }
    }

    fn text(&self, text: impl Into<String>, position: Point, font_size: f32, color: &str) -> Text {
        let mut text = Text::new(text, position, font_size);
        text.font_family = self.theme.font_family.clone();
        text.color = color.to_string();
        text
    }
}

pub fn build_scene(ctx: &SceneContext<'_>) -> Scene {
    let size = ctx.layout.viewport;
    let mut layers: Vec<Group> = LayerKind::ALL
        .iter()
        .map(|kind| Group::new(kind.class()).with_id(format!("layer-{}", kind.class())))
        .collect();
    let mut hit_regions = Vec::new();

    layers[LayerKind::Background.index()].push(RectShape {
        rect: Rect::new(0.0, 0.0, size.width, size.height),
        fill: ctx.theme.background.clone(),
        stroke: None,
        corner_radius: 0.0,
    });

    build_header(ctx, &ctx.layout.header, &mut layers[LayerKind::Header.index()], &mut hit_regions);
    let month_ticks = build_month_grid(ctx, &mut layers[LayerKind::MonthGrid.index()]);

    for (track_idx, entry) in ctx.model.tracks.iter().enumerate() {
        if let Some(group) = build_track_line(ctx, track_idx, entry) {
            layers[LayerKind::TrackLines.index()].push(group);
        }
        build_milestones(
            ctx,
            track_idx,
            entry,
            &mut layers[LayerKind::Milestones.index()],
            &mut hit_regions,
        );
    }

    let today = (ctx.options.show_today && ctx.layout.time_scale.contains(ctx.today))
        .then_some(ctx.today);
    if let Some(today) = today {
        layers[LayerKind::Today.index()].push(build_today_marker(ctx, today));
    }

    Scene {
        size,
        layers,
        hit_regions,
        month_ticks,
        today,
    }
}

fn build_header(
    ctx: &SceneContext<'_>,
    header: &HeaderLayout,
    layer: &mut Group,
    hit_regions: &mut Vec<HitRegion>,
) {
    if let Some((href, rect)) = &header.logo {
        layer.push(Image {
            href: href.clone(),
            rect: *rect,
        });
    }
    for (layout, color, bold) in [
        (&header.title, &ctx.theme.title_color, true),
        (&header.subtitle, &ctx.theme.subtitle_color, false),
    ] {
        if let Some(layout) = layout {
            let mut text = ctx.text(layout.text.clone(), layout.position, layout.font_size, color);
            text.bold = bold;
            text.width = layout.width;
            layer.push(text);
        }
    }

    let Some(legend) = &header.legend else {
        return;
    };
    layer.push(RectShape {
        rect: legend.rect,
        fill: ctx.theme.legend_fill.clone(),
        stroke: Some(Stroke::solid(ctx.theme.legend_stroke.clone(), 1.0)),
        corner_radius: 4.0,
    });
    for (idx, entry) in legend.entries.iter().enumerate() {
        let focused = ctx.focus == Some(entry.track.as_str());
        let opacity = match ctx.focus {
            Some(_) if !focused => ctx.config.legend_dimmed_opacity,
            _ => 1.0,
        };
        let mut group = Group::new("legend-item")
            .with_id(format!("legend-{idx}"))
            .with_opacity(opacity);
        group.push(Line {
            from: entry.swatch_from,
            to: entry.swatch_to,
            stroke: Stroke::solid(entry.color.clone(), entry.swatch_width),
            round_cap: false,
        });
        let mut text = ctx.text(
            entry.text.text.clone(),
            entry.text.position,
            entry.text.font_size,
            &ctx.theme.label_color,
        );
        text.bold = focused;
        text.width = entry.text.width;
        group.push(text);
        layer.push(group);
        hit_regions.push(HitRegion {
            rect: entry.hit,
            target: HitTarget::Legend {
                track: entry.track.clone(),
            },
        });
    }
}

/// One gridline per month; labels thinned to every k-th month when crowded.
fn build_month_grid(ctx: &SceneContext<'_>, layer: &mut Group) -> Vec<NaiveDate> {
    let layout = ctx.layout;
    let Some((min, max)) = layout.time_scale.domain() else {
        return Vec::new();
    };
    let ticks = month_starts(min, max);
    let positions: Vec<f32> = ticks.iter().map(|date| layout.time_position(*date)).collect();
    let font_size = layout.month_font_size;
    let min_gap = match layout.orientation {
        Orientation::Horizontal => month_label_width(font_size) + 6.0,
        Orientation::Vertical => font_size * 1.6,
    };
    let spacing = positions
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .fold(f32::INFINITY, f32::min);
    let every = if spacing.is_finite() && spacing > 0.0 {
        ((min_gap / spacing).ceil() as usize).max(1)
    } else {
        1
    };

    let plot = layout.plot;
    let stroke = Stroke::solid(ctx.theme.grid_color.clone(), 1.0);
    for (idx, (date, pos)) in ticks.iter().zip(&positions).enumerate() {
        let (from, to, label_at, anchor) = match layout.orientation {
            Orientation::Horizontal => (
                Point::new(*pos, plot.y + font_size + 4.0),
                Point::new(*pos, plot.bottom()),
                Point::new(*pos, plot.y + font_size),
                TextAnchor::Middle,
            ),
            Orientation::Vertical => (
                Point::new(plot.x, *pos),
                Point::new(plot.right(), *pos),
                Point::new(plot.x - MONTH_LABEL_GAP, *pos + font_size * 0.35),
                TextAnchor::End,
            ),
        };
        layer.push(Line {
            from,
            to,
            stroke: stroke.clone(),
            round_cap: false,
        });
        if idx % every == 0 {
            let mut text = ctx.text(
                date.format("%b").to_string(),
                label_at,
                font_size,
                &ctx.theme.month_label_color,
            );
            text.anchor = anchor;
            text.width = month_label_width(font_size);
            layer.push(text);
        }
    }
    ticks
}

fn build_track_line(ctx: &SceneContext<'_>, track_idx: usize, entry: &TrackEntry) -> Option<Group> {
    let layout = ctx.layout;
    let lane = layout.lane_position(entry.name())?;
    let range_start = layout.time_scale.range().0;
    let start = entry.start.map_or(range_start, |date| layout.time_position(date));
    let end = entry.end.map_or(start, |date| layout.time_position(date));

    let mut group = Group::new("track")
        .with_id(format!("track-{track_idx}"))
        .with_opacity(ctx.track_opacity(entry.name()));
    group.push(Line {
        from: layout.point_at(lane, start),
        to: layout.point_at(lane, end),
        stroke: Stroke::solid(entry.track.color.clone(), layout.lane_thickness),
        round_cap: true,
    });
    Some(group)
}

fn build_milestones(
    ctx: &SceneContext<'_>,
    track_idx: usize,
    entry: &TrackEntry,
    layer: &mut Group,
    hit_regions: &mut Vec<HitRegion>,
) {
    let layout = ctx.layout;
    let Some(lane_pos) = layout.lane_position(entry.name()) else {
        return;
    };
    let lane = layout.lane_thickness;
    let label = &layout.label;
    let opacity = ctx.track_opacity(entry.name());

    for (milestone_idx, milestone, date) in entry.dated_milestones() {
        let anchor = layout.point_at(lane_pos, layout.time_position(date));
        let group_id = format!("milestone-{track_idx}-{milestone_idx}");
        let mut group = Group::new(format!("milestone {}", milestone.kind.as_str()))
            .with_id(group_id.clone())
            .at(anchor)
            .with_opacity(opacity);

        let (hw, hh) = glyph_half_size(milestone.kind, layout.orientation, lane);
        let glyph = Rect::new(-hw, -hh, 2.0 * hw, 2.0 * hh);
        let endpoint = milestone.kind.is_endpoint();
        let (shape, stroke_width) = if endpoint {
            let stroke = layout.handle_stroke_width;
            let shape = RectShape {
                rect: glyph,
                fill: ctx.theme.handle_fill.clone(),
                stroke: Some(Stroke::solid(ctx.theme.handle_stroke.clone(), stroke)),
                corner_radius: lane * 8.0 / 15.0,
            };
            (shape, stroke)
        } else {
            let shape = RectShape {
                rect: glyph,
                fill: entry.track.color.clone(),
                stroke: None,
                corner_radius: lane * 4.0 / 15.0,
            };
            (shape, 0.0)
        };
        group.push(shape);

        let lines = label_lines(milestone.display_label());
        for (idx, line) in lines.iter().enumerate() {
            let unit = label_unit_width(
                line,
                ctx.config.char_width_ratio,
                &ctx.theme.font_family,
                ctx.config.fast_text_metrics,
            );
            let mut text = ctx.text(
                line.clone(),
                label.line_anchor(idx, lines.len()),
                label.font_size,
                &ctx.theme.label_color,
            );
            text.rotation_deg = -label.rotation_deg;
            text.width = unit * label.font_size;
            text.ascent = label.ascent;
            text.descent = label.descent;
            group.push(text);
        }
        layer.push(group);

        let slop = stroke_width / 2.0 + HIT_SLOP;
        hit_regions.push(HitRegion {
            rect: Rect::new(
                anchor.x - hw - slop,
                anchor.y - hh - slop,
                2.0 * (hw + slop),
                2.0 * (hh + slop),
            ),
            target: HitTarget::Milestone(MilestoneHit {
                group_id,
                track: entry.name().to_string(),
                milestone: milestone.clone(),
                date,
                anchor,
                draggable: ctx.drag_enabled && endpoint,
            }),
        });
    }
}

fn build_today_marker(ctx: &SceneContext<'_>, today: NaiveDate) -> Group {
    let layout = ctx.layout;
    let plot = layout.plot;
    let flag = layout.today_flag;
    let notch = flag.height * 0.3;
    let pos = layout.time_position(today);
    let line_stroke = Stroke::dashed(ctx.theme.today_color.clone(), 2.0, "4 2");

    let (line, points, text_center) = match layout.orientation {
        Orientation::Horizontal => {
            let top = plot.y + layout.month_font_size + TODAY_FLAG_GAP;
            let line = Line {
                from: Point::new(pos, top),
                to: Point::new(pos, plot.bottom()),
                stroke: line_stroke,
                round_cap: false,
            };
            let points = vec![
                Point::new(pos, top),
                Point::new(pos + flag.width, top),
                Point::new(pos + flag.width - notch, top + flag.height / 2.0),
                Point::new(pos + flag.width, top + flag.height),
                Point::new(pos, top + flag.height),
            ];
            let center = Point::new(pos + (flag.width - notch) / 2.0, top + flag.height / 2.0);
            (line, points, center)
        }
        Orientation::Vertical => {
            let right = plot.x - TODAY_FLAG_GAP;
            let left = right - flag.width;
            let line = Line {
                from: Point::new(plot.x, pos),
                to: Point::new(plot.right(), pos),
                stroke: line_stroke,
                round_cap: false,
            };
            let points = vec![
                Point::new(left, pos - flag.height / 2.0),
                Point::new(right, pos - flag.height / 2.0),
                Point::new(right, pos + flag.height / 2.0),
                Point::new(left, pos + flag.height / 2.0),
                Point::new(left + notch, pos),
            ];
            let center = Point::new((left + notch + right) / 2.0, pos);
            (line, points, center)
        }
    };

    let mut group = Group::new("today-marker").with_id("today-marker");
    group.push(line);
    group.push(Polygon {
        points,
        fill: ctx.theme.today_color.clone(),
        stroke: Some(Stroke::solid(ctx.theme.today_stroke.clone(), 1.0)),
    });
    let font_size = (flag.height * 0.55).min((flag.width - notch) / 3.2);
    let mut text = ctx.text(
        TODAY_LABEL,
        Point::new(text_center.x, text_center.y + font_size * 0.35),
        font_size,
        "#fff",
    );
    text.anchor = TextAnchor::Middle;
    text.bold = true;
    text.width = fallback_text_width(TODAY_LABEL, font_size);
    group.push(text);
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrientationSetting;
    use crate::layout::compute_layout;
    use crate::model::{MilestoneKind, Track};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    fn tracks() -> Vec<Track> {
        vec![
            Track::new("Victoria", "#0098D4")
                .with_milestone(Milestone::new("01/01/2024", "Kickoff", MilestoneKind::Start))
                .with_milestone(Milestone::new("15/03/2024", "Design review", MilestoneKind::default()))
                .with_milestone(Milestone::new("01/06/2024", "Launch", MilestoneKind::End)),
            Track::new("Central", "#E32017")
                .with_milestone(Milestone::new("01/02/2024", "Start", MilestoneKind::Start))
                .with_milestone(Milestone::new("01/05/2024", "Done", MilestoneKind::End)),
            Track::new("Someday", "#B36305")
                .with_milestone(Milestone::new("tbd", "Maybe", MilestoneKind::Start)),
        ]
    }

    struct Fixture {
        model: TimelineModel,
        layout: LayoutResult,
        options: TimelineOptions,
        config: LayoutConfig,
        theme: Theme,
    }

    impl Fixture {
        fn new(width: f32, height: f32, orientation: OrientationSetting) -> Self {
            let model = TimelineModel::build(&tracks(), true);
            let options = TimelineOptions {
                orientation,
                ..TimelineOptions::default()
            };
            let config = config();
            let theme = Theme::default();
            let layout = compute_layout(&model, &options, Size::new(width, height), &theme, &config);
            Self {
                model,
                layout,
                options,
                config,
                theme,
            }
        }

        fn scene(&self, focus: Option<&str>, today: NaiveDate) -> Scene {
            build_scene(&SceneContext {
                model: &self.model,
                layout: &self.layout,
                options: &self.options,
                theme: &self.theme,
                config: &self.config,
                focus,
                today,
                drag_enabled: true,
            })
        }
    }

    #[test]
    fn layers_follow_z_order() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let scene = fixture.scene(None, ymd(2024, 3, 1));
        let classes: Vec<&str> = scene
            .layers
            .iter()
            .map(|layer| layer.class.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(
            classes,
            vec!["background", "header", "month-grid", "track-lines", "milestones", "today", "tooltip-layer"]
        );
        assert_eq!(scene.layer(LayerKind::TrackLines).children.len(), 3);
        assert_eq!(scene.layer(LayerKind::Milestones).children.len(), 5);
    }

    #[test]
    fn today_marker_is_inclusive_of_both_ends() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        for (today, expected) in [
            (ymd(2024, 1, 1), true),
            (ymd(2024, 6, 1), true),
            (ymd(2023, 12, 31), false),
            (ymd(2024, 6, 2), false),
        ] {
            let scene = fixture.scene(None, today);
            assert_eq!(scene.today.is_some(), expected, "{today}");
            assert_eq!(scene.find_group("today-marker").is_some(), expected);
        }
    }

    #[test]
    fn show_today_off_hides_marker() {
        let mut fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        fixture.options.show_today = false;
        assert!(fixture.scene(None, ymd(2024, 3, 1)).today.is_none());
    }

    #[test]
    fn month_ticks_cover_every_month_boundary() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let scene = fixture.scene(None, ymd(2024, 3, 1));
        assert_eq!(scene.month_ticks.len(), 6);
        assert_eq!(scene.month_ticks[0], ymd(2024, 1, 1));
    }

    #[test]
    fn crowded_month_labels_are_thinned() {
        let tracks = vec![
            Track::new("Long", "#000")
                .with_milestone(Milestone::new("01/01/2010", "a", MilestoneKind::Start))
                .with_milestone(Milestone::new("01/01/2024", "b", MilestoneKind::End)),
        ];
        let model = TimelineModel::build(&tracks, true);
        let options = TimelineOptions::default();
        let config = config();
        let theme = Theme::default();
        let layout = compute_layout(&model, &options, Size::new(800.0, 600.0), &theme, &config);
        let scene = build_scene(&SceneContext {
            model: &model,
            layout: &layout,
            options: &options,
            theme: &theme,
            config: &config,
            focus: None,
            today: ymd(2000, 1, 1),
            drag_enabled: false,
        });
        let grid = scene.layer(LayerKind::MonthGrid);
        let lines = grid.children.iter().filter(|c| matches!(c, Primitive::Line(_))).count();
        let labels = grid.children.iter().filter(|c| matches!(c, Primitive::Text(_))).count();
        assert_eq!(lines, 169);
        assert!(labels < lines / 2, "{labels} labels for {lines} ticks");
    }

    #[test]
    fn undated_track_draws_zero_length_line_at_range_start() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let scene = fixture.scene(None, ymd(2024, 3, 1));
        let idx = fixture.model.track_names.iter().position(|n| n == "Someday").unwrap();
        let group = scene.find_group(&format!("track-{idx}")).unwrap();
        let Primitive::Line(line) = &group.children[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.from, line.to);
        assert_eq!(line.from.x, fixture.layout.time_scale.range().0);
    }

    #[test]
    fn focus_dims_other_tracks() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let scene = fixture.scene(Some("Central"), ymd(2024, 3, 1));
        for (idx, name) in fixture.model.track_names.iter().enumerate() {
            let expected = if name == "Central" { 1.0 } else { 0.2 };
            assert_eq!(scene.find_group(&format!("track-{idx}")).unwrap().opacity, expected);
        }
        for child in &scene.layer(LayerKind::Milestones).children {
            let Primitive::Group(group) = child else { continue };
            let hit = scene.milestone_hit(group.id.as_deref().unwrap()).unwrap();
            let expected = if hit.track == "Central" { 1.0 } else { 0.2 };
            assert_eq!(group.opacity, expected);
        }
    }

    #[test]
    fn only_endpoints_are_draggable() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let scene = fixture.scene(None, ymd(2024, 3, 1));
        for region in &scene.hit_regions {
            if let HitTarget::Milestone(hit) = &region.target {
                assert_eq!(hit.draggable, hit.milestone.kind.is_endpoint());
                assert_eq!(
                    scene.hit_test(hit.anchor).map(|r| &r.target),
                    Some(&region.target)
                );
            }
        }
    }

    #[test]
    fn everything_stays_on_canvas() {
        for (w, h) in [(1200.0, 800.0), (800.0, 1200.0), (480.0, 320.0), (320.0, 480.0)] {
            let fixture = Fixture::new(w, h, OrientationSetting::Auto);
            let scene = fixture.scene(None, ymd(2024, 3, 1));
            let canvas = Rect::new(0.0, 0.0, w, h);
            for (kind, rect) in scene.leaf_bounds() {
                assert!(canvas.contains_rect(&rect, 0.5), "{kind:?} {rect:?} escapes {w}x{h}");
            }
        }
    }

    #[test]
    fn tooltip_flips_below_near_the_top() {
        let fixture = Fixture::new(1200.0, 800.0, OrientationSetting::Auto);
        let milestone = Milestone::new("01/01/2024", "Kickoff", MilestoneKind::Start);
        let near_top = Rect::new(600.0, 10.0, 20.0, 20.0);
        let card = tooltip_for(&milestone, near_top, &fixture.layout, &fixture.theme, &fixture.config);
        assert!(card.translate.y > near_top.bottom());
        let low = Rect::new(600.0, 500.0, 20.0, 20.0);
        let card = tooltip_for(&milestone, low, &fixture.layout, &fixture.theme, &fixture.config);
        assert!(card.translate.y < low.y);
    }

    #[test]
    fn tooltip_flips_left_near_the_right_edge() {
        let fixture = Fixture::new(600.0, 1000.0, OrientationSetting::Auto);
        let milestone = Milestone::new("01/01/2024", "Kickoff", MilestoneKind::Start);
        let glyph = Rect::new(560.0, 400.0, 20.0, 20.0);
        let card = tooltip_for(&milestone, glyph, &fixture.layout, &fixture.theme, &fixture.config);
        let bounds = Primitive::Group(card).bounds().unwrap();
        assert!(bounds.right() <= glyph.x);
        assert!(bounds.x >= 0.0);
    }
}
