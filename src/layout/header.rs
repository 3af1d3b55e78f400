use super::text::{text_width, truncate_to_width};
use super::types::{
    HeaderLayout, LegendEntryLayout, LegendLayout, Orientation, Point, Rect, Size, TextLayout,
};
use crate::config::{HeaderOptions, LayoutConfig};
use crate::model::TimelineModel;
use crate::theme::Theme;

const LEGEND_COLUMNS: usize = 2;
const LEGEND_INSET: f32 = 5.0;
const LEGEND_PADDING: f32 = 6.0;
const TITLE_GAP: f32 = 8.0;

pub(super) struct HeaderInput<'a> {
    pub options: &'a HeaderOptions,
    pub model: &'a TimelineModel,
    pub viewport: Size,
    pub orientation: Orientation,
    pub scale: f32,
    pub constrained: bool,
}

pub(super) fn layout_header(
    input: &HeaderInput<'_>,
    theme: &Theme,
    config: &LayoutConfig,
) -> HeaderLayout {
    let Size { width, height } = input.viewport;
    let family = theme.font_family.as_str();
    let fast = config.fast_text_metrics;

    let logo_size = (height * 0.08).clamp(24.0, 40.0);
    let logo = input
        .options
        .logo_href
        .as_ref()
        .map(|href| (href.clone(), Rect::new(6.0, 4.0, logo_size, logo_size)));
    let text_x = if logo.is_some() { logo_size + 12.0 } else { 12.0 };

    let legend = layout_legend(input, theme, config);
    let text_limit = legend.as_ref().map_or(width, |legend| legend.rect.x) - TITLE_GAP - text_x;

    let title_font = (height * 0.035).clamp(14.0, 20.0);
    let subtitle_font = (height * 0.022).clamp(10.0, 13.0);
    let place = |text: &str, font_size: f32, baseline: f32, bold: bool| {
        if text.trim().is_empty() {
            return None;
        }
        let text = truncate_to_width(text.trim(), text_limit, font_size, family, fast, bold);
        if text.is_empty() {
            return None;
        }
        let width = text_width(&text, font_size, family, fast, bold);
        Some(TextLayout {
            text,
            position: Point::new(text_x, baseline),
            font_size,
            width,
        })
    };
    let title_baseline = (logo_size * 0.6).max(title_font);
    let title = place(&input.options.title, title_font, title_baseline, true);
    let subtitle_baseline = title_baseline + subtitle_font * 1.3;
    let subtitle = place(&input.options.subtitle, subtitle_font, subtitle_baseline, false);

    let base = match input.orientation {
        Orientation::Horizontal => config.header_height_horizontal,
        Orientation::Vertical => config.header_height_vertical,
    };
    let mut header_height = (base * input.scale).min(height * config.header_height_ratio);
    for text in [&title, &subtitle].into_iter().flatten() {
        header_height = header_height.max(text.position.y + text.font_size * 0.3 + 4.0);
    }
    if let Some((_, rect)) = &logo {
        header_height = header_height.max(rect.bottom() + 4.0);
    }
    if let Some(legend) = &legend {
        header_height = header_height.max(legend.rect.bottom() + 4.0);
    }

    HeaderLayout {
        height: header_height,
        title,
        subtitle,
        logo,
        legend,
    }
}

fn layout_legend(
    input: &HeaderInput<'_>,
    theme: &Theme,
    config: &LayoutConfig,
) -> Option<LegendLayout> {
    let tracks = input.model.tracks_in_source_order();
    if tracks.is_empty() {
        return None;
    }
    let family = theme.font_family.as_str();
    let fast = config.fast_text_metrics;
    let compact = input.orientation == Orientation::Vertical;

    let mut font_size: f32 = if input.constrained { 9.0 } else { 11.0 };
    let mut swatch_len: f32 = if input.constrained { 8.0 } else { 12.0 };
    let mut swatch_width: f32 = if input.constrained { 4.0 } else { 6.0 };
    let mut row_spacing: f32 = match (compact, input.constrained) {
        (true, _) => 12.0,
        (false, true) => 14.0,
        (false, false) => 18.0,
    };
    let column_gap: f32 = if compact { 4.0 } else { 8.0 };

    // Measured in bold so the focused entry still fits its column.
    let widest = |font_size: f32| {
        tracks
            .iter()
            .map(|entry| text_width(entry.name(), font_size, family, fast, true))
            .fold(0.0f32, f32::max)
    };
    let mut text_offset = swatch_len + 5.0;
    let mut column_width = text_offset + widest(font_size) + column_gap;
    let available = (input.viewport.width - 2.0 * LEGEND_INSET).max(1.0);
    let needed = LEGEND_COLUMNS as f32 * column_width + 2.0 * LEGEND_PADDING;
    if needed > available {
        let factor = (available / needed).max(0.5);
        font_size *= factor;
        swatch_len *= factor;
        swatch_width *= factor;
        row_spacing *= factor;
        text_offset = swatch_len + 5.0 * factor;
        column_width = text_offset + widest(font_size) + column_gap * factor;
    }

    let columns = LEGEND_COLUMNS.min(tracks.len());
    let rows = tracks.len().div_ceil(LEGEND_COLUMNS);
    let rect_width = columns as f32 * column_width + 2.0 * LEGEND_PADDING;
    let rect_height = rows as f32 * row_spacing + 2.0 * LEGEND_PADDING;
    let rect = Rect::new(
        (input.viewport.width - rect_width - LEGEND_INSET).max(0.0),
        LEGEND_INSET,
        rect_width,
        rect_height,
    );

    let entries = tracks
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let column = idx % LEGEND_COLUMNS;
            let row = idx / LEGEND_COLUMNS;
            let x = rect.x + LEGEND_PADDING + column as f32 * column_width;
            let center_y = rect.y + LEGEND_PADDING + (row as f32 + 0.5) * row_spacing;
            let label_width = text_width(entry.name(), font_size, family, fast, false);
            LegendEntryLayout {
                track: entry.name().to_string(),
                color: entry.track.color.clone(),
                swatch_from: Point::new(x, center_y),
                swatch_to: Point::new(x + swatch_len, center_y),
                swatch_width,
                text: TextLayout {
                    text: entry.name().to_string(),
                    position: Point::new(x + text_offset, center_y + font_size * 0.35),
                    font_size,
                    width: label_width,
                },
                hit: Rect::new(x, center_y - row_spacing / 2.0, column_width, row_spacing),
            }
        })
        .collect();

    Some(LegendLayout { rect, entries })
}
