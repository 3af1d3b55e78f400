#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::scene::{Group, Primitive, Scene, Stroke, Text};
#[cfg(feature = "png")]
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Something a [`Scene`] can be drawn onto.
pub trait Surface {
    /// Whether the surface can currently accept drawing.
    fn is_usable(&self) -> bool {
        true
    }

    /// Replaces whatever is on the surface with `scene`. On error the
    /// previous drawing must stay visible.
    fn draw(&mut self, scene: &Scene) -> Result<(), RenderError>;

    /// Removes everything drawn so far.
    fn clear(&mut self);
}

/// Keeps the latest scene as an SVG document.
#[derive(Debug, Default, Clone)]
pub struct SvgSurface {
    svg: Option<String>,
    draws: usize,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn draw_count(&self) -> usize {
        self.draws
    }
}

impl Surface for SvgSurface {
    fn draw(&mut self, scene: &Scene) -> Result<(), RenderError> {
        scene.check_finite()?;
        // Serialise fully before swapping so a failure never shows half a scene.
        let svg = render_svg(scene);
        self.svg = Some(svg);
        self.draws += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.svg = None;
    }
}

pub fn render_svg(scene: &Scene) -> String {
    let width = scene.size.width;
    let height = scene.size.height;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    for layer in &scene.layers {
        write_group(&mut svg, layer);
    }
    svg.push_str("</svg>");
    svg
}

fn write_group(svg: &mut String, group: &Group) {
    svg.push_str("<g");
    if let Some(id) = &group.id {
        svg.push_str(&format!(" id=\"{}\"", escape_xml(id)));
    }
    if let Some(class) = &group.class {
        svg.push_str(&format!(" class=\"{}\"", escape_xml(class)));
    }
    if group.translate.x != 0.0 || group.translate.y != 0.0 {
        svg.push_str(&format!(
            " transform=\"translate({:.2} {:.2})\"",
            group.translate.x, group.translate.y
        ));
    }
    if group.opacity < 1.0 {
        svg.push_str(&format!(" opacity=\"{}\"", group.opacity));
    }
    svg.push('>');
    for child in &group.children {
        write_primitive(svg, child);
    }
    svg.push_str("</g>");
}

fn stroke_attrs(stroke: &Stroke) -> String {
    format!(
        " stroke=\"{}\" stroke-width=\"{:.2}\"",
        stroke.color, stroke.width
    )
}

fn write_primitive(svg: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Line(line) => {
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"",
                line.from.x, line.from.y, line.to.x, line.to.y
            ));
            svg.push_str(&stroke_attrs(&line.stroke));
            if let Some(dash) = &line.stroke.dash {
                svg.push_str(&format!(" stroke-dasharray=\"{dash}\""));
            }
            if line.round_cap {
                svg.push_str(" stroke-linecap=\"round\"");
            }
            svg.push_str("/>");
        }
        Primitive::Rect(shape) => {
            let r = shape.rect;
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"",
                r.x, r.y, r.width, r.height, shape.fill
            ));
            if shape.corner_radius > 0.0 {
                svg.push_str(&format!(
                    " rx=\"{0:.2}\" ry=\"{0:.2}\"",
                    shape.corner_radius
                ));
            }
            if let Some(stroke) = &shape.stroke {
                svg.push_str(&stroke_attrs(stroke));
            }
            svg.push_str("/>");
        }
        Primitive::Polygon(polygon) => {
            let points: Vec<String> = polygon
                .points
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect();
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\"",
                points.join(" "),
                polygon.fill
            ));
            if let Some(stroke) = &polygon.stroke {
                svg.push_str(&stroke_attrs(stroke));
            }
            svg.push_str("/>");
        }
        Primitive::Text(text) => write_text(svg, text),
        Primitive::Image(image) => {
            let r = image.rect;
            svg.push_str(&format!(
                "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/>",
                escape_xml(&image.href),
                r.x,
                r.y,
                r.width,
                r.height
            ));
        }
        Primitive::Group(group) => write_group(svg, group),
    }
}

fn write_text(svg: &mut String, text: &Text) {
    let (x, y) = (text.position.x, text.position.y);
    svg.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\"",
        text.anchor.as_str(),
        escape_xml(&text.font_family),
        text.font_size,
        text.color
    ));
    if text.bold {
        svg.push_str(" font-weight=\"bold\"");
    }
    if text.rotation_deg != 0.0 {
        svg.push_str(&format!(
            " transform=\"rotate({:.2} {x:.2} {y:.2})\"",
            text.rotation_deg
        ));
    }
    svg.push_str(&format!(">{}</text>", escape_xml(&text.text)));
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height).ok_or_else(|| {
        anyhow::anyhow!("invalid render size {}x{}", render_cfg.width, render_cfg.height)
    })?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, TimelineOptions};
    use crate::layout::{Point, Size, compute_layout};
    use crate::model::{Milestone, MilestoneKind, TimelineModel, Track};
    use crate::scene::{LayerKind, Line, SceneContext, Stroke, build_scene};
    use chrono::NaiveDate;

    fn scene() -> Scene {
        let tracks = vec![
            Track::new("R&D", "#9B0056")
                .with_milestone(Milestone::new("01/01/2024", "Start <alpha>", MilestoneKind::Start))
                .with_milestone(Milestone::new("01/04/2024", "Done", MilestoneKind::End)),
        ];
        let model = TimelineModel::build(&tracks, true);
        let options = TimelineOptions::default();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let theme = crate::theme::Theme::default();
        let layout = compute_layout(&model, &options, Size::new(900.0, 500.0), &theme, &config);
        build_scene(&SceneContext {
            model: &model,
            layout: &layout,
            options: &options,
            theme: &theme,
            config: &config,
            focus: None,
            today: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            drag_enabled: false,
        })
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(&scene());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("class=\"track-lines\""));
        assert!(svg.contains("Start"));
        assert!(svg.contains("&lt;alpha&gt;"));
        assert!(svg.contains("rotate(-30.00"));
        assert!(svg.contains("stroke-dasharray=\"4 2\""));
        assert!(svg.contains(">Today</text>"));
    }

    #[test]
    fn layers_are_written_in_z_order() {
        let svg = render_svg(&scene());
        let positions: Vec<usize> = LayerKind::ALL
            .iter()
            .map(|kind| svg.find(&format!("class=\"{}\"", kind.class())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn failed_draw_keeps_previous_svg() {
        let mut surface = SvgSurface::new();
        let good = scene();
        surface.draw(&good).unwrap();
        let before = surface.svg().unwrap().to_string();

        let mut bad = good.clone();
        bad.layer_mut(LayerKind::TrackLines).push(Line {
            from: Point::new(f32::NAN, 0.0),
            to: Point::new(1.0, 1.0),
            stroke: Stroke::solid("#000", 1.0),
            round_cap: false,
        });
        assert!(matches!(surface.draw(&bad), Err(RenderError::NonFinite(_))));
        assert_eq!(surface.svg(), Some(before.as_str()));
        assert_eq!(surface.draw_count(), 1);

        surface.clear();
        assert!(surface.svg().is_none());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }
}
