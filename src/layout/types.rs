use super::scale::{PointScale, TimeScale};
use crate::config::OrientationSetting;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Containment with a small tolerance for float rounding.
    pub fn contains_rect(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// How far something reaches from an anchor point in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Extent {
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
}

impl Extent {
    /// Symmetric reach of a box centred on the anchor.
    pub fn centered(half_width: f32, half_height: f32) -> Self {
        Self {
            left: half_width,
            right: half_width,
            up: half_height,
            down: half_height,
        }
    }

    /// Reach of a text run whose baseline starts at the anchor, rotated by
    /// `angle_deg` (SVG convention, positive is clockwise on screen).
    pub fn rotated_text(width: f32, ascent: f32, descent: f32, angle_deg: f32) -> Self {
        Self::rotated_box(0.0, width, ascent, descent, angle_deg)
    }

    /// Reach of the box `[x0, x1] x [-ascent, descent]` rotated about the anchor.
    pub fn rotated_box(x0: f32, x1: f32, ascent: f32, descent: f32, angle_deg: f32) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let corners = [(x0, -ascent), (x1, -ascent), (x1, descent), (x0, descent)];
        let mut extent = Extent {
            left: f32::MIN,
            right: f32::MIN,
            up: f32::MIN,
            down: f32::MIN,
        };
        for (x, y) in corners {
            let rx = x * cos - y * sin;
            let ry = x * sin + y * cos;
            extent.left = extent.left.max(-rx);
            extent.right = extent.right.max(rx);
            extent.up = extent.up.max(-ry);
            extent.down = extent.down.max(ry);
        }
        extent
    }

    /// Moves the reached area by `(dx, dy)` relative to the anchor.
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left - dx,
            right: self.right + dx,
            up: self.up - dy,
            down: self.down + dy,
        }
    }

    pub fn union(&self, other: &Extent) -> Self {
        Self {
            left: self.left.max(other.left),
            right: self.right.max(other.right),
            up: self.up.max(other.up),
            down: self.down.max(other.down),
        }
    }

    pub fn around(&self, anchor: Point) -> Rect {
        Rect::from_edges(
            anchor.x - self.left,
            anchor.y - self.up,
            anchor.x + self.right,
            anchor.y + self.down,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Explicit settings win; `auto` is horizontal iff `width >= height`.
    pub fn resolve(setting: OrientationSetting, viewport: Size) -> Self {
        match setting {
            OrientationSetting::Horizontal => Self::Horizontal,
            OrientationSetting::Vertical => Self::Vertical,
            OrientationSetting::Auto => {
                if viewport.width >= viewport.height {
                    Self::Horizontal
                } else {
                    Self::Vertical
                }
            }
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::Horizontal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLayout {
    pub text: String,
    pub position: Point,
    pub font_size: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntryLayout {
    pub track: String,
    pub color: String,
    pub swatch_from: Point,
    pub swatch_to: Point,
    pub swatch_width: f32,
    pub text: TextLayout,
    pub hit: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLayout {
    pub rect: Rect,
    pub entries: Vec<LegendEntryLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderLayout {
    pub height: f32,
    pub title: Option<TextLayout>,
    pub subtitle: Option<TextLayout>,
    pub logo: Option<(String, Rect)>,
    pub legend: Option<LegendLayout>,
}

/// Font and placement of the rotated milestone labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelStyle {
    pub font_size: f32,
    pub line_spacing: f32,
    pub char_width: f32,
    pub ascent: f32,
    pub descent: f32,
    pub rotation_deg: f32,
    /// Baseline anchor of the line nearest the glyph, relative to the milestone.
    pub offset: Point,
    /// Horizontal labels grow upward, away from the lane; vertical ones grow down.
    pub stack_upward: bool,
}

impl LabelStyle {
    /// Baseline anchor of line `idx` out of `count`, relative to the milestone.
    pub fn line_anchor(&self, idx: usize, count: usize) -> Point {
        let step = if self.stack_upward {
            -(count.saturating_sub(1 + idx) as f32)
        } else {
            idx as f32
        };
        Point::new(self.offset.x, self.offset.y + step * self.line_spacing)
    }
}

/// Geometry every scene element hangs off, computed once per render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub orientation: Orientation,
    pub viewport: Size,
    pub scale: f32,
    pub margins: Margins,
    pub header: HeaderLayout,
    /// Gridline area; the time range and lanes sit inside it.
    pub plot: Rect,
    pub plot_width: f32,
    pub plot_height: f32,
    pub time_scale: TimeScale,
    pub track_scale: PointScale,
    pub lane_thickness: f32,
    pub handle_stroke_width: f32,
    pub label: LabelStyle,
    /// Worst-case reach of any milestone glyph plus its label.
    pub reach: Extent,
    pub axis_band: f32,
    pub month_font_size: f32,
    pub today_flag: Size,
    pub fit_passes: usize,
}

impl LayoutResult {
    pub fn is_horizontal(&self) -> bool {
        self.orientation.is_horizontal()
    }

    pub fn time_position(&self, date: NaiveDate) -> f32 {
        self.time_scale.map(date)
    }

    pub fn lane_position(&self, track: &str) -> Option<f32> {
        self.track_scale.map(track)
    }

    /// Canvas point of `date` on `track`'s lane.
    pub fn position(&self, track: &str, date: NaiveDate) -> Option<Point> {
        let lane = self.lane_position(track)?;
        Some(self.point_at(lane, self.time_position(date)))
    }

    /// Combines a lane offset and a time offset into a canvas point.
    pub fn point_at(&self, lane: f32, time: f32) -> Point {
        if self.is_horizontal() {
            Point::new(time, lane)
        } else {
            Point::new(lane, time)
        }
    }

    /// Component of `point` along the time axis.
    pub fn time_component(&self, point: Point) -> f32 {
        if self.is_horizontal() { point.x } else { point.y }
    }
}
