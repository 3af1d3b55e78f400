mod header;
pub mod scale;
pub mod text;
pub mod types;

pub use scale::{PointScale, TimeScale};
pub use types::*;

use crate::config::{LayoutConfig, TimelineOptions};
use crate::model::{MilestoneKind, TimelineModel};
use crate::theme::Theme;
use header::{HeaderInput, layout_header};
use text::{label_extent, label_lines, label_unit_width};

const HORIZONTAL_LANE_PADDING: f32 = 0.1;
const VERTICAL_LANE_INSET: f32 = 16.0;
pub(crate) const MONTH_LABEL_GAP: f32 = 8.0;
pub(crate) const TODAY_FLAG_GAP: f32 = 6.0;
// Fit-loop shrink bounds per pass.
const MIN_SHRINK: f32 = 0.5;
const MAX_SHRINK: f32 = 0.9;

/// Half width and half height of a milestone glyph, stroke excluded.
pub fn glyph_half_size(kind: MilestoneKind, orientation: Orientation, lane: f32) -> (f32, f32) {
    match (kind.is_endpoint(), orientation) {
        (true, Orientation::Horizontal) => (lane * 0.75, lane * 1.5),
        (true, Orientation::Vertical) => (lane, lane * 0.625),
        (false, Orientation::Horizontal) => (lane * 0.5, lane),
        (false, Orientation::Vertical) => (lane * 0.75, lane * 0.5),
    }
}

/// Stacked label line widths per font pixel, one entry per dated milestone.
struct LabelMetrics {
    units: Vec<Vec<f32>>,
    has_endpoints: bool,
    has_intermediates: bool,
}

impl LabelMetrics {
    fn measure(model: &TimelineModel, theme: &Theme, config: &LayoutConfig) -> Self {
        let mut metrics = Self {
            units: Vec::new(),
            has_endpoints: false,
            has_intermediates: false,
        };
        for entry in &model.tracks {
            for (_, milestone, _) in entry.dated_milestones() {
                if milestone.kind.is_endpoint() {
                    metrics.has_endpoints = true;
                } else {
                    metrics.has_intermediates = true;
                }
                let units = label_lines(milestone.display_label())
                    .iter()
                    .map(|line| {
                        label_unit_width(
                            line,
                            config.char_width_ratio,
                            &theme.font_family,
                            config.fast_text_metrics,
                        )
                    })
                    .collect();
                metrics.units.push(units);
            }
        }
        metrics
    }

    fn reach(&self, style: &LabelStyle) -> Extent {
        let mut widths = Vec::new();
        self.units
            .iter()
            .map(|units| {
                widths.clear();
                widths.extend(units.iter().map(|unit| unit * style.font_size));
                label_extent(&widths, style)
            })
            .fold(Extent::default(), |acc, next| acc.union(&next))
    }
}

/// Margins, plot and scale ranges for one candidate label size.
struct Frame {
    margins: Margins,
    plot: Rect,
    time_range: (f32, f32),
    lane_range: (f32, f32),
    /// Available over needed size; below 1.0 the frame does not fit.
    fit_ratio: f32,
}

impl Frame {
    fn fits(&self) -> bool {
        self.fit_ratio >= 1.0
    }
}

struct FrameInput {
    width: f32,
    height: f32,
    content_top: f32,
    top_gap: f32,
    bottom_gap: f32,
    margin_left: f32,
    margin_right: f32,
    padding: f32,
    axis_band: f32,
    month_font: f32,
    today_flag: Size,
    scale: f32,
}

fn horizontal_frame(input: &FrameInput, reach: &Extent) -> Frame {
    let left = input.margin_left.max(reach.left + input.padding);
    let right = input
        .margin_right
        .max(left / 2.0 + reach.right + input.padding)
        .max(input.today_flag.width + input.padding);
    let bottom = input.bottom_gap.max(reach.down + input.padding);
    let lane_top = input.content_top + input.axis_band.max(reach.up);
    let lane_bottom = input.height - bottom;

    let needed_width = left + right;
    let needed_height = lane_top + bottom;
    Frame {
        margins: Margins {
            top: input.top_gap,
            right,
            bottom,
            left,
        },
        plot: Rect::from_edges(left, input.content_top, input.width - right, lane_bottom),
        time_range: (left, input.width - right),
        lane_range: (lane_top, lane_bottom),
        fit_ratio: (input.width / needed_width).min(input.height / needed_height),
    }
}

fn vertical_frame(input: &FrameInput, reach: &Extent) -> Frame {
    let month_label_width = text::month_label_width(input.month_font);
    let left = input
        .margin_left
        .max(input.today_flag.width + TODAY_FLAG_GAP + input.padding / 2.0)
        .max(month_label_width + MONTH_LABEL_GAP + input.padding / 2.0);
    let right = input.margin_right.max(reach.right + input.padding);
    let bottom = input
        .bottom_gap
        .max(reach.down + input.padding)
        .max(input.today_flag.height / 2.0 + input.padding / 2.0);
    let lane_inset = (VERTICAL_LANE_INSET * input.scale).max(reach.left);
    let time_inset = reach
        .up
        .max(input.today_flag.height / 2.0)
        .max(input.month_font);
    let time_top = input.content_top + time_inset;
    let time_bottom = input.height - bottom;

    let needed_width = left + lane_inset + right;
    let needed_height = time_top + bottom;
    Frame {
        margins: Margins {
            top: input.top_gap,
            right,
            bottom,
            left,
        },
        plot: Rect::from_edges(left, input.content_top, input.width - right, time_bottom),
        time_range: (time_top, time_bottom),
        lane_range: (left + lane_inset, input.width - right),
        fit_ratio: (input.width / needed_width).min(input.height / needed_height),
    }
}

fn label_style(
    font_size: f32,
    line_spacing: f32,
    orientation: Orientation,
    lane: f32,
    config: &LayoutConfig,
) -> LabelStyle {
    let text_height = font_size * config.line_height_ratio;
    let (offset, stack_upward) = match orientation {
        Orientation::Horizontal => (Point::new(0.0, -lane * 2.75), true),
        Orientation::Vertical => (Point::new(lane * 2.2, 5.0), false),
    };
    LabelStyle {
        font_size,
        line_spacing,
        char_width: font_size * config.char_width_ratio,
        ascent: text_height * 0.75,
        descent: text_height * 0.25,
        rotation_deg: config.label_rotation_deg,
        offset,
        stack_upward,
    }
}

/// Resolves orientation, margins and both scales for one viewport.
///
/// The label font starts at the configured size and shrinks over at most
/// `fit_passes` passes until every rotated label fits inside the canvas.
pub fn compute_layout(
    model: &TimelineModel,
    options: &TimelineOptions,
    viewport: Size,
    theme: &Theme,
    config: &LayoutConfig,
) -> LayoutResult {
    let width = viewport.width.max(1.0);
    let height = viewport.height.max(1.0);
    let viewport = Size::new(width, height);
    let orientation = Orientation::resolve(options.orientation, viewport);
    let constrained = height < config.constrained_height;
    let scale = if constrained {
        (height / config.constrained_height).max(config.min_scale)
    } else {
        1.0
    };

    let lane = config.lane_thickness * scale;
    let stroke = config.handle_stroke_width * scale;
    let today_flag = Size::new(
        (width * config.today_flag_width_ratio)
            .clamp(config.today_flag_min_width, config.today_flag_max_width),
        (height * config.today_flag_height_ratio)
            .clamp(config.today_flag_min_height, config.today_flag_max_height),
    );
    let month_font_size = config.month_font_size * scale;

    let header = layout_header(
        &HeaderInput {
            options: &options.header,
            model,
            viewport,
            orientation,
            scale,
            constrained,
        },
        theme,
        config,
    );

    let top_gap = (config.base_margin_top * scale).min(height * config.top_margin_ratio);
    let bottom_gap = (config.base_margin_bottom * scale).min(height * config.bottom_margin_ratio);
    let axis_band = match orientation {
        // Month labels sit above the today flag, and both above the lanes.
        Orientation::Horizontal => (config.axis_band * scale)
            .max(month_font_size + 2.0 * TODAY_FLAG_GAP + today_flag.height),
        Orientation::Vertical => 0.0,
    };
    let frame_input = FrameInput {
        width,
        height,
        content_top: header.height + top_gap,
        top_gap,
        bottom_gap,
        margin_left: config.base_margin_left * scale,
        margin_right: config.base_margin_right * scale,
        padding: config.safety_padding * scale,
        axis_band,
        month_font: month_font_size,
        today_flag,
        scale,
    };

    let metrics = LabelMetrics::measure(model, theme, config);
    let mut glyph_reach = Extent::centered(lane / 2.0, lane / 2.0);
    if metrics.has_endpoints {
        let (hw, hh) = glyph_half_size(MilestoneKind::Start, orientation, lane);
        glyph_reach = glyph_reach.union(&Extent::centered(hw + stroke / 2.0, hh + stroke / 2.0));
    }
    if metrics.has_intermediates {
        let (hw, hh) = glyph_half_size(MilestoneKind::default(), orientation, lane);
        glyph_reach = glyph_reach.union(&Extent::centered(hw, hh));
    }

    let (mut font_size, mut line_spacing) = if constrained {
        (config.compact_label_font_size, config.compact_label_line_spacing)
    } else {
        (config.label_font_size, config.label_line_spacing)
    };
    let max_passes = config.fit_passes.max(1);
    let mut passes = 0;
    let (label, reach, frame) = loop {
        passes += 1;
        let label = label_style(font_size, line_spacing, orientation, lane, config);
        let reach = glyph_reach.union(&metrics.reach(&label));
        let frame = match orientation {
            Orientation::Horizontal => horizontal_frame(&frame_input, &reach),
            Orientation::Vertical => vertical_frame(&frame_input, &reach),
        };
        if frame.fits() || passes >= max_passes || font_size <= config.min_label_font_size {
            if !frame.fits() {
                log::warn!(
                    "labels do not fit a {width}x{height} viewport after {passes} passes \
                     (font {font_size:.1}px)"
                );
            }
            break (label, reach, frame);
        }
        let shrink = frame.fit_ratio.clamp(MIN_SHRINK, MAX_SHRINK);
        font_size = (font_size * shrink).max(config.min_label_font_size);
        line_spacing *= shrink;
        log::debug!("label fit pass {passes}: shrinking label font to {font_size:.1}px");
    };

    // Never hand out inverted ranges, even when nothing fits.
    let time_range = (frame.time_range.0, frame.time_range.1.max(frame.time_range.0));
    let lane_range = (frame.lane_range.0, frame.lane_range.1.max(frame.lane_range.0));
    let lane_padding = match orientation {
        Orientation::Horizontal => HORIZONTAL_LANE_PADDING,
        Orientation::Vertical => 0.0,
    };
    let plot = Rect::new(
        frame.plot.x,
        frame.plot.y,
        frame.plot.width.max(0.0),
        frame.plot.height.max(0.0),
    );

    log::debug!(
        "layout {orientation:?} {width}x{height}: scale {scale:.2}, margins {:?}, label font {:.1}px",
        frame.margins,
        label.font_size
    );

    LayoutResult {
        orientation,
        viewport,
        scale,
        margins: frame.margins,
        header,
        plot,
        plot_width: plot.width,
        plot_height: plot.height,
        time_scale: TimeScale::new(model.domain(), time_range),
        track_scale: PointScale::new(model.track_names.clone(), lane_range, lane_padding),
        lane_thickness: lane,
        handle_stroke_width: stroke,
        label,
        reach,
        axis_band,
        month_font_size,
        today_flag,
        fit_passes: passes,
    }
}
