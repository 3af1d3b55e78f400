use crate::layout::{Extent, Point, Rect};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f32,
    pub dash: Option<String>,
}

impl Stroke {
    pub fn solid(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f32, dash: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Some(dash.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub stroke: Stroke,
    pub round_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectShape {
    pub rect: Rect,
    pub fill: String,
    pub stroke: Option<Stroke>,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub fill: String,
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub font_family: String,
    pub font_size: f32,
    pub color: String,
    pub bold: bool,
    /// Rotation about `position`, SVG sense (negative tilts upward).
    pub rotation_deg: f32,
    /// Estimated advance width.
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Text {
    pub fn new(text: impl Into<String>, position: Point, font_size: f32) -> Self {
        Self {
            text: text.into(),
            position,
            anchor: TextAnchor::Start,
            font_family: "sans-serif".to_string(),
            font_size,
            color: "#000".to_string(),
            bold: false,
            rotation_deg: 0.0,
            width: 0.0,
            ascent: font_size * 0.9,
            descent: font_size * 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub href: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: Option<String>,
    pub class: Option<String>,
    pub translate: Point,
    pub opacity: f32,
    pub children: Vec<Primitive>,
}

impl Group {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            id: None,
            class: Some(class.into()),
            translate: Point::default(),
            opacity: 1.0,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, translate: Point) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) {
        self.children.push(primitive.into());
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Group> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| match child {
            Primitive::Group(group) => group.find_mut(id),
            _ => None,
        })
    }

    pub fn find(&self, id: &str) -> Option<&Group> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Primitive::Group(group) => group.find(id),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Line(Line),
    Rect(RectShape),
    Polygon(Polygon),
    Text(Text),
    Image(Image),
    Group(Group),
}

macro_rules! impl_into_primitive {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Primitive {
            fn from(value: $ty) -> Self {
                Primitive::$variant(value)
            }
        })*
    };
}

impl_into_primitive!(
    Line => Line,
    RectShape => Rect,
    Polygon => Polygon,
    Text => Text,
    Image => Image,
    Group => Group,
);

fn inflate(rect: Rect, by: f32) -> Rect {
    Rect::new(rect.x - by, rect.y - by, rect.width + 2.0 * by, rect.height + 2.0 * by)
}

impl Primitive {
    /// Axis-aligned bounds in the parent's coordinates, strokes included.
    /// Empty groups and empty text have no bounds.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Primitive::Line(line) => {
                let rect = Rect::from_edges(
                    line.from.x.min(line.to.x),
                    line.from.y.min(line.to.y),
                    line.from.x.max(line.to.x),
                    line.from.y.max(line.to.y),
                );
                Some(inflate(rect, line.stroke.width / 2.0))
            }
            Primitive::Rect(shape) => {
                let stroke = shape.stroke.as_ref().map_or(0.0, |s| s.width / 2.0);
                Some(inflate(shape.rect, stroke))
            }
            Primitive::Polygon(polygon) => {
                let first = polygon.points.first()?;
                let rect = polygon.points.iter().fold(
                    Rect::new(first.x, first.y, 0.0, 0.0),
                    |acc, p| acc.union(&Rect::new(p.x, p.y, 0.0, 0.0)),
                );
                let stroke = polygon.stroke.as_ref().map_or(0.0, |s| s.width / 2.0);
                Some(inflate(rect, stroke))
            }
            Primitive::Text(text) => {
                if text.text.is_empty() {
                    return None;
                }
                let (x0, x1) = match text.anchor {
                    TextAnchor::Start => (0.0, text.width),
                    TextAnchor::Middle => (-text.width / 2.0, text.width / 2.0),
                    TextAnchor::End => (-text.width, 0.0),
                };
                let extent =
                    Extent::rotated_box(x0, x1, text.ascent, text.descent, text.rotation_deg);
                Some(extent.around(text.position))
            }
            Primitive::Image(image) => Some(image.rect),
            Primitive::Group(group) => group
                .children
                .iter()
                .filter_map(Primitive::bounds)
                .reduce(|acc, next| acc.union(&next))
                .map(|rect| rect.translate(group.translate.x, group.translate.y)),
        }
    }

    /// Number of drawable leaves below (and including) this primitive.
    pub fn leaf_count(&self) -> usize {
        match self {
            Primitive::Group(group) => group.children.iter().map(Primitive::leaf_count).sum(),
            _ => 1,
        }
    }

    /// Every coordinate is finite, recursively.
    pub fn is_finite(&self) -> bool {
        let point = |p: &Point| p.x.is_finite() && p.y.is_finite();
        let rect = |r: &Rect| {
            r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite()
        };
        match self {
            Primitive::Line(line) => {
                point(&line.from) && point(&line.to) && line.stroke.width.is_finite()
            }
            Primitive::Rect(shape) => rect(&shape.rect),
            Primitive::Polygon(polygon) => polygon.points.iter().all(point),
            Primitive::Text(text) => {
                point(&text.position) && text.font_size.is_finite() && text.rotation_deg.is_finite()
            }
            Primitive::Image(image) => rect(&image.rect),
            Primitive::Group(group) => {
                point(&group.translate)
                    && group.opacity.is_finite()
                    && group.children.iter().all(Primitive::is_finite)
            }
        }
    }
}
