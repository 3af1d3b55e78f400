use std::path::Path;

use chrono::NaiveDate;
use tube_timeline::date::{format_date, parse_date};
use tube_timeline::interchange::import_tracks;
use tube_timeline::layout::{Rect, Size};
use tube_timeline::scene::{HitTarget, LayerKind, Primitive, SceneContext};
use tube_timeline::timeline::PointerOutcome;
use tube_timeline::{
    FixedClock, FixedViewport, ImportError, LayoutConfig, Milestone, MilestoneKind, Orientation,
    OrientationSetting, SvgSurface, Theme, TimelineModel, TimelineOptions, Track, TubeTimeline,
    build_scene, compute_layout, render_svg,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture(name: &str) -> Vec<Track> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    import_tracks(&input).expect("fixture import failed")
}

fn fast() -> LayoutConfig {
    LayoutConfig {
        fast_text_metrics: true,
        ..LayoutConfig::default()
    }
}

fn timeline(
    tracks: &[Track],
    width: f32,
    height: f32,
    today: NaiveDate,
) -> TubeTimeline<SvgSurface, FixedViewport> {
    TubeTimeline::builder()
        .target(SvgSurface::new())
        .host(FixedViewport::new(width, height))
        .data(tracks)
        .layout_config(fast())
        .clock(FixedClock(today))
        .build()
        .expect("timeline should build")
}

fn assert_on_canvas(tracks: &[Track], width: f32, height: f32, layers: &[LayerKind]) {
    let mut timeline = timeline(tracks, width, height, ymd(2024, 3, 15));
    timeline.render().unwrap();
    let scene = timeline.scene().unwrap();
    let canvas = Rect::new(0.0, 0.0, width, height);
    for (kind, rect) in scene.leaf_bounds() {
        if layers.contains(&kind) {
            assert!(
                canvas.contains_rect(&rect, 0.5),
                "{kind:?} primitive {rect:?} escapes {width}x{height}"
            );
        }
    }
}

#[test]
fn render_all_fixtures() {
    for name in ["roadmap.json", "conference.json", "long_labels.json"] {
        let tracks = fixture(name);
        for (width, height) in [(1200.0, 800.0), (800.0, 1200.0)] {
            let mut timeline = timeline(&tracks, width, height, ymd(2024, 3, 15));
            timeline.render().unwrap();
            let svg = timeline.surface().svg().unwrap();
            assert!(svg.starts_with("<svg"), "{name}: missing <svg tag");
            assert!(svg.ends_with("</svg>"), "{name}: missing </svg tag");
        }
    }
}

#[test]
fn non_array_import_is_rejected() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/not_array.json");
    let input = std::fs::read_to_string(path).unwrap();
    assert!(matches!(import_tracks(&input), Err(ImportError::NotAnArray)));
}

#[test]
fn date_round_trip_and_invalid_days() {
    for raw in ["01/01/2024", "29/02/2024", "31/12/1999", "15/07/2031"] {
        assert_eq!(format_date(parse_date(raw).unwrap()), raw);
    }
    assert_eq!(parse_date("29/02/2024"), Some(ymd(2024, 2, 29)));
    assert_eq!(parse_date("31/02/2024"), None);
    assert_eq!(parse_date("29/02/2023"), None);
}

#[test]
fn orientation_is_deterministic() {
    let model = TimelineModel::build(&fixture("roadmap.json"), true);
    let theme = Theme::default();
    let config = fast();
    let resolve = |width: f32, height: f32, orientation: OrientationSetting| {
        let options = TimelineOptions {
            orientation,
            ..TimelineOptions::default()
        };
        compute_layout(&model, &options, Size::new(width, height), &theme, &config).orientation
    };
    assert_eq!(resolve(800.0, 400.0, OrientationSetting::Auto), Orientation::Horizontal);
    assert_eq!(resolve(400.0, 800.0, OrientationSetting::Auto), Orientation::Vertical);
    assert_eq!(resolve(800.0, 400.0, OrientationSetting::Vertical), Orientation::Vertical);
    assert_eq!(resolve(400.0, 800.0, OrientationSetting::Horizontal), Orientation::Horizontal);
}

#[test]
fn long_words_stay_on_a_small_canvas() {
    let tracks = vec![
        Track::new("Tiny", "#0019A8")
            .with_milestone(Milestone::new(
                "01/01/2024",
                "A".repeat(40),
                MilestoneKind::Start,
            ))
            .with_milestone(Milestone::new("01/06/2024", "End", MilestoneKind::End)),
    ];
    let model = TimelineModel::build(&tracks, true);
    let theme = Theme::default();
    let config = fast();
    let canvas = Rect::new(0.0, 0.0, 300.0, 300.0);
    for setting in [OrientationSetting::Horizontal, OrientationSetting::Vertical] {
        let options = TimelineOptions {
            orientation: setting,
            ..TimelineOptions::default()
        };
        let layout = compute_layout(&model, &options, Size::new(300.0, 300.0), &theme, &config);
        // Today on either domain edge puts the flag at its furthest reach.
        for today in [ymd(2024, 1, 1), ymd(2024, 6, 1)] {
            let scene = build_scene(&SceneContext {
                model: &model,
                layout: &layout,
                options: &options,
                theme: &theme,
                config: &config,
                focus: None,
                today,
                drag_enabled: false,
            });
            assert!(scene.today.is_some());
            for (kind, rect) in scene.leaf_bounds() {
                assert!(
                    canvas.contains_rect(&rect, 0.5),
                    "{setting:?} today {today}: {kind:?} {rect:?} escapes the canvas"
                );
            }
        }
    }
}

#[test]
fn fixtures_stay_on_canvas() {
    let layers = [
        LayerKind::MonthGrid,
        LayerKind::TrackLines,
        LayerKind::Milestones,
        LayerKind::Today,
    ];
    for name in ["roadmap.json", "conference.json", "long_labels.json"] {
        let tracks = fixture(name);
        for (width, height) in [(1200.0, 800.0), (800.0, 1200.0), (640.0, 360.0)] {
            assert_on_canvas(&tracks, width, height, &layers);
        }
    }
}

#[test]
fn today_marker_respects_the_domain() {
    let tracks = vec![
        Track::new("Range", "#84B817")
            .with_milestone(Milestone::new("01/01/2024", "From", MilestoneKind::Start))
            .with_milestone(Milestone::new("01/06/2024", "To", MilestoneKind::End)),
    ];
    let mut inside = timeline(&tracks, 1000.0, 600.0, ymd(2024, 3, 15));
    inside.render().unwrap();
    assert!(inside.scene().unwrap().find_group("today-marker").is_some());

    let mut outside = timeline(&tracks, 1000.0, 600.0, ymd(2025, 1, 1));
    outside.render().unwrap();
    let scene = outside.scene().unwrap();
    assert!(scene.find_group("today-marker").is_none());
    assert!(scene.layer(LayerKind::Today).children.is_empty());
}

#[test]
fn drag_before_the_domain_clamps_to_its_start() {
    let tracks = vec![
        Track::new("Year", "#EE7C0E")
            .with_milestone(Milestone::new("01/01/2024", "Begin", MilestoneKind::Start))
            .with_milestone(Milestone::new("31/12/2024", "Finish", MilestoneKind::End)),
    ];
    for (width, height) in [(1200.0, 600.0), (600.0, 1200.0)] {
        let mut timeline = TubeTimeline::builder()
            .target(SvgSurface::new())
            .host(FixedViewport::new(width, height))
            .data(&tracks)
            .layout_config(fast())
            .on_milestone_drag(|_: &Milestone, _: &str, _: &str| {})
            .build()
            .unwrap();
        timeline.render().unwrap();
        let begin = timeline
            .scene()
            .unwrap()
            .hit_regions
            .iter()
            .find_map(|region| match &region.target {
                HitTarget::Milestone(hit) if hit.milestone.name == "Begin" => Some(hit.clone()),
                _ => None,
            })
            .unwrap();
        timeline.pointer_down(begin.anchor);
        let far_before = if width > height {
            tube_timeline::layout::Point::new(-5000.0, begin.anchor.y)
        } else {
            tube_timeline::layout::Point::new(begin.anchor.x, -5000.0)
        };
        timeline.pointer_move(far_before);
        match timeline.pointer_up(far_before) {
            PointerOutcome::Committed(commit) => assert_eq!(commit.date, "01/01/2024"),
            other => panic!("expected a commit, got {other:?}"),
        }
    }
}

#[test]
fn repeated_renders_are_identical() {
    let mut timeline = timeline(&fixture("conference.json"), 1100.0, 700.0, ymd(2024, 6, 1));
    timeline.render().unwrap();
    let layout = timeline.layout().cloned().unwrap();
    let count = timeline.scene().unwrap().primitive_count();
    timeline.render().unwrap();
    let again = timeline.layout().unwrap();
    assert_eq!(again.margins, layout.margins);
    assert_eq!(again.time_scale, layout.time_scale);
    assert_eq!(again.track_scale, layout.track_scale);
    assert_eq!(timeline.scene().unwrap().primitive_count(), count);
}

#[test]
fn legend_isolation_toggles() {
    let tracks = fixture("roadmap.json");
    let mut timeline = timeline(&tracks, 1200.0, 800.0, ymd(2024, 3, 15));
    timeline.render().unwrap();

    timeline.toggle_focus("Mobile").unwrap();
    let scene = timeline.scene().unwrap();
    let mut seen = 0;
    for region in &scene.hit_regions {
        if let HitTarget::Milestone(hit) = &region.target {
            let group = scene.find_group(&hit.group_id).unwrap();
            let expected = if hit.track == "Mobile" { 1.0 } else { 0.2 };
            assert_eq!(group.opacity, expected, "{}", hit.group_id);
            seen += 1;
        }
    }
    assert!(seen > 0);

    timeline.toggle_focus("Mobile").unwrap();
    let scene = timeline.scene().unwrap();
    for layer in [LayerKind::TrackLines, LayerKind::Milestones] {
        for child in &scene.layer(layer).children {
            if let Primitive::Group(group) = child {
                assert_eq!(group.opacity, 1.0);
            }
        }
    }
}

#[test]
fn svg_output_matches_scene() {
    let tracks = fixture("conference.json");
    let mut timeline = timeline(&tracks, 1200.0, 800.0, ymd(2024, 6, 1));
    timeline.render().unwrap();
    let svg = render_svg(timeline.scene().unwrap());
    assert_eq!(timeline.surface().svg(), Some(svg.as_str()));
    assert!(svg.contains(">Conference</text>"));
}
