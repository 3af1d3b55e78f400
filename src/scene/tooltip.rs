use super::primitives::{Group, Primitive, RectShape, Stroke, Text, TextAnchor};
use crate::config::LayoutConfig;
use crate::layout::{LayoutResult, Point, Rect};
use crate::model::Milestone;
use crate::theme::Theme;

const MIN_WIDTH: f32 = 80.0;
const GAP: f32 = 18.0;
const SIDE_OFFSET: f32 = 24.0;

/// Hover card for a milestone whose glyph occupies `glyph` on the canvas.
///
/// Horizontal timelines put it above the glyph (below when that clips),
/// vertical ones to the right (left when that clips). The result is always
/// clamped inside the canvas.
pub fn tooltip_for(
    milestone: &Milestone,
    glyph: Rect,
    layout: &LayoutResult,
    theme: &Theme,
    config: &LayoutConfig,
) -> Group {
    let name = if milestone.name.trim().is_empty() {
        milestone.display_label()
    } else {
        milestone.name.as_str()
    };
    let lines = [name.to_string(), milestone.date.clone()];

    let font_size = config.tooltip_font_size;
    let padding = config.tooltip_padding;
    let line_height = config.tooltip_line_height;
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = MIN_WIDTH.max(longest as f32 * font_size * 0.55 + 2.0 * padding);
    let height = lines.len() as f32 * line_height + padding;

    let canvas = layout.viewport;
    let center_x = glyph.x + glyph.width / 2.0;
    let center_y = glyph.y + glyph.height / 2.0;
    let (x, y) = if layout.is_horizontal() {
        let above = glyph.y - height - GAP;
        let y = if above >= 0.0 { above } else { glyph.bottom() + GAP };
        (center_x - width / 2.0, y)
    } else {
        let right = glyph.right() + SIDE_OFFSET;
        let x = if right + width <= canvas.width {
            right
        } else {
            glyph.x - SIDE_OFFSET - width
        };
        (x, center_y - height / 2.0)
    };
    let x = x.clamp(0.0, (canvas.width - width).max(0.0));
    let y = y.clamp(0.0, (canvas.height - height).max(0.0));

    let mut group = Group::new("tooltip").with_id("tooltip").at(Point::new(x, y));
    group.push(RectShape {
        rect: Rect::new(0.0, 0.0, width, height),
        fill: theme.tooltip_fill.clone(),
        stroke: Some(Stroke::solid(theme.tooltip_stroke.clone(), 1.0)),
        corner_radius: 6.0,
    });
    for (idx, line) in lines.iter().enumerate() {
        let mut text = Text::new(
            line.clone(),
            Point::new(padding, padding / 2.0 + font_size + idx as f32 * line_height),
            font_size,
        );
        text.anchor = TextAnchor::Start;
        text.font_family = theme.font_family.clone();
        text.color = theme.tooltip_text_color.clone();
        text.bold = idx == 0;
        text.width = line.chars().count() as f32 * font_size * 0.55;
        group.push(Primitive::Text(text));
    }
    group
}
