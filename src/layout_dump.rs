use crate::date::format_date;
use crate::layout::{LayoutResult, Margins, Rect};
use crate::model::TimelineModel;
use crate::scene::{HitTarget, Scene};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, diff-friendly snapshot of one render's geometry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub orientation: String,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub margins: Margins,
    pub plot: Rect,
    pub header_height: f32,
    pub label_font_size: f32,
    pub fit_passes: usize,
    pub domain: Option<[String; 2]>,
    pub time_range: [f32; 2],
    pub tracks: Vec<TrackDump>,
    pub milestones: Vec<MilestoneDump>,
    pub month_ticks: Vec<String>,
    pub today: Option<String>,
    pub primitives: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDump {
    pub name: String,
    pub lane: Option<f32>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub undated: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDump {
    pub id: String,
    pub track: String,
    pub name: String,
    pub kind: String,
    pub date: String,
    pub x: f32,
    pub y: f32,
    pub draggable: bool,
}

impl LayoutDump {
    pub fn from_render(model: &TimelineModel, layout: &LayoutResult, scene: &Scene) -> Self {
        let tracks = model
            .tracks
            .iter()
            .map(|entry| TrackDump {
                name: entry.name().to_string(),
                lane: layout.lane_position(entry.name()),
                start: entry.start.map(format_date),
                end: entry.end.map(format_date),
                undated: entry.parsed.iter().filter(|date| date.is_none()).count(),
            })
            .collect();

        let milestones = scene
            .hit_regions
            .iter()
            .filter_map(|region| match &region.target {
                HitTarget::Milestone(hit) => Some(MilestoneDump {
                    id: hit.group_id.clone(),
                    track: hit.track.clone(),
                    name: hit.milestone.name.clone(),
                    kind: hit.milestone.kind.as_str().to_string(),
                    date: format_date(hit.date),
                    x: hit.anchor.x,
                    y: hit.anchor.y,
                    draggable: hit.draggable,
                }),
                HitTarget::Legend { .. } => None,
            })
            .collect();

        let (r0, r1) = layout.time_scale.range();
        LayoutDump {
            orientation: format!("{:?}", layout.orientation),
            width: layout.viewport.width,
            height: layout.viewport.height,
            scale: layout.scale,
            margins: layout.margins,
            plot: layout.plot,
            header_height: layout.header.height,
            label_font_size: layout.label.font_size,
            fit_passes: layout.fit_passes,
            domain: layout
                .time_scale
                .domain()
                .map(|(min, max)| [format_date(min), format_date(max)]),
            time_range: [r0, r1],
            tracks,
            milestones,
            month_ticks: scene.month_ticks.iter().map(|d| format_date(*d)).collect(),
            today: scene.today.map(format_date),
            primitives: scene.primitive_count(),
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    model: &TimelineModel,
    layout: &LayoutResult,
    scene: &Scene,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_render(model, layout, scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, TimelineOptions};
    use crate::layout::{Size, compute_layout};
    use crate::model::{Milestone, MilestoneKind, Track};
    use crate::scene::{SceneContext, build_scene};
    use crate::theme::Theme;
    use chrono::NaiveDate;

    #[test]
    fn dump_lists_tracks_and_milestones() {
        let tracks = vec![
            Track::new("Hammersmith", "#F3A9BB")
                .with_milestone(Milestone::new("01/01/2024", "Start", MilestoneKind::Start))
                .with_milestone(Milestone::new("soon", "Later", MilestoneKind::default()))
                .with_milestone(Milestone::new("01/02/2024", "End", MilestoneKind::End)),
        ];
        let model = TimelineModel::build(&tracks, true);
        let options = TimelineOptions::default();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let theme = Theme::default();
        let layout = compute_layout(&model, &options, Size::new(800.0, 500.0), &theme, &config);
        let scene = build_scene(&SceneContext {
            model: &model,
            layout: &layout,
            options: &options,
            theme: &theme,
            config: &config,
            focus: None,
            today: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            drag_enabled: true,
        });
        let dump = LayoutDump::from_render(&model, &layout, &scene);
        assert_eq!(dump.orientation, "Horizontal");
        assert_eq!(dump.tracks[0].undated, 1);
        assert_eq!(dump.milestones.len(), 2);
        assert!(dump.milestones.iter().all(|m| m.draggable));
        assert_eq!(dump.month_ticks, vec!["01/01/2024", "01/02/2024"]);
        assert_eq!(dump.today, None);
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["domain"][0], "01/01/2024");
        assert!(json.get("fitPasses").is_some());
    }
}
