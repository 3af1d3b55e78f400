use super::types::{Extent, LabelStyle};
use crate::text_metrics;

const ELLIPSIS: char = '\u{2026}';

/// Approximate advance of `ch` as a fraction of the font size.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' | '\'' | '.' | ',' | ':' | ';' | '|' | '!' => 0.3,
        'i' | 'j' | 'l' | 'I' | '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\' => 0.3,
        'f' | 'r' | 't' | '1' | '-' => 0.38,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '#' | '%' | '&' => 0.94,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.6,
        'a'..='z' => 0.56,
        _ => 0.6,
    }
}

pub fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f32>()
        * font_size
}

pub(super) fn text_width(
    text: &str,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
    bold: bool,
) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family, bold)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

/// Budget for a three-letter month abbreviation.
pub fn month_label_width(font_size: f32) -> f32 {
    3.0 * 0.7 * font_size
}

/// Milestone labels stack one word per line.
pub fn label_lines(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Width of one label line per pixel of font size; never below the fixed
/// per-character estimate, so scaling by the font size gives the line width.
pub fn label_unit_width(
    line: &str,
    char_width_ratio: f32,
    font_family: &str,
    fast_metrics: bool,
) -> f32 {
    let estimate = line.chars().count() as f32 * char_width_ratio;
    estimate.max(text_width(line, 1.0, font_family, fast_metrics, false))
}

/// Reach of a stacked, rotated label around its milestone point.
///
/// Each line rotates about its own baseline anchor, so the extent is the
/// union of every rotated line box.
pub(super) fn label_extent(widths: &[f32], style: &LabelStyle) -> Extent {
    widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let anchor = style.line_anchor(idx, widths.len());
            Extent::rotated_text(*width, style.ascent, style.descent, -style.rotation_deg)
                .offset(anchor.x, anchor.y)
        })
        .reduce(|acc, next| acc.union(&next))
        .unwrap_or_default()
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
pub(super) fn truncate_to_width(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
    bold: bool,
) -> String {
    let measure =
        |candidate: &str| text_width(candidate, font_size, font_family, fast_metrics, bold);
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let mut candidate: String = chars.iter().collect::<String>().trim_end().to_string();
        candidate.push(ELLIPSIS);
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::Point;

    fn style(rotation_deg: f32) -> LabelStyle {
        LabelStyle {
            font_size: 10.0,
            line_spacing: 12.0,
            char_width: 6.5,
            ascent: 9.0,
            descent: 3.0,
            rotation_deg,
            offset: Point::new(0.0, 0.0),
            stack_upward: false,
        }
    }

    #[test]
    fn labels_split_on_whitespace() {
        assert_eq!(label_lines("Camera  ready\tdue"), vec!["Camera", "ready", "due"]);
        assert!(label_lines("   ").is_empty());
    }

    #[test]
    fn unrotated_extent_is_the_stacked_box() {
        let extent = label_extent(&[60.0, 30.0], &style(0.0));
        assert!((extent.left - 0.0).abs() < 1e-4);
        assert!((extent.right - 60.0).abs() < 1e-4);
        assert!((extent.up - 9.0).abs() < 1e-4);
        assert!((extent.down - 15.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_lifts_the_far_end() {
        let flat = label_extent(&[100.0], &style(0.0));
        let rotated = label_extent(&[100.0], &style(30.0));
        // The far end of a 100px line climbs by 100 * sin(30deg).
        assert!(rotated.up > flat.up + 45.0);
        assert!(rotated.right < flat.right);
    }

    #[test]
    fn upward_stacks_end_at_the_offset() {
        let style = LabelStyle {
            stack_upward: true,
            ..style(0.0)
        };
        assert_eq!(style.line_anchor(2, 3), Point::new(0.0, 0.0));
        assert_eq!(style.line_anchor(0, 3), Point::new(0.0, -24.0));
        let extent = label_extent(&[10.0, 10.0, 10.0], &style);
        assert!((extent.up - 33.0).abs() < 1e-4);
        assert!((extent.down - 3.0).abs() < 1e-4);
    }

    #[test]
    fn unit_widths_scale_linearly() {
        let unit = label_unit_width("Review", 0.65, "sans-serif", true);
        assert!((unit - 6.0 * 0.65).abs() < 1e-5);
    }

    #[test]
    fn fast_metrics_are_deterministic() {
        let a = text_width("Kickoff", 12.0, "sans-serif", true, false);
        let b = fallback_text_width("Kickoff", 12.0);
        assert_eq!(a, b);
        assert!(fallback_text_width("WWW", 10.0) > fallback_text_width("iii", 10.0));
    }

    #[test]
    fn truncation_adds_ellipsis() {
        let text = "A rather long roadmap title";
        let full = fallback_text_width(text, 16.0);
        let cut = truncate_to_width(text, full / 2.0, 16.0, "sans-serif", true, true);
        assert!(cut.ends_with(ELLIPSIS));
        assert!(fallback_text_width(&cut, 16.0) <= full / 2.0);
        assert_eq!(truncate_to_width(text, full, 16.0, "sans-serif", true, false), text);
        assert_eq!(truncate_to_width(text, 1.0, 16.0, "sans-serif", true, false), "");
    }
}
