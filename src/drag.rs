//! Drag sessions for start/end milestone handles.
//!
//! A session moves one milestone group in the cached scene and never touches
//! the model. Committing hands the clamped day back to the caller, who writes
//! it into the data and renders again.

use crate::date::format_date;
use crate::layout::{LayoutResult, Orientation, Point, TimeScale};
use crate::model::{Milestone, MilestoneKind, Track, apply_milestone_date};
use crate::scene::{MilestoneHit, Scene};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub group_id: String,
    pub track: String,
    pub milestone: Milestone,
    time_scale: TimeScale,
    orientation: Orientation,
    /// Group translation when the drag began.
    origin: Point,
    /// Latest clamped day under the pointer.
    pub current: NaiveDate,
    pub moved: bool,
}

impl DragSession {
    fn translate_for(&self, date: NaiveDate) -> Point {
        let pos = self.time_scale.map(date);
        match self.orientation {
            Orientation::Horizontal => Point::new(pos, self.origin.y),
            Orientation::Vertical => Point::new(self.origin.x, pos),
        }
    }

    fn time_component(&self, pointer: Point) -> f32 {
        match self.orientation {
            Orientation::Horizontal => pointer.x,
            Orientation::Vertical => pointer.y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// A finished drag: `milestone` on `track` moved to `date` (`DD/MM/YYYY`).
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub track: String,
    pub milestone: Milestone,
    pub date: String,
}

impl DragCommit {
    pub fn kind(&self) -> MilestoneKind {
        self.milestone.kind
    }

    /// Writes the new date into `tracks`; `false` if nothing matched.
    pub fn apply(&self, tracks: &mut [Track]) -> bool {
        apply_milestone_date(
            tracks,
            &self.track,
            self.milestone.kind,
            &self.milestone.name,
            &self.date,
        )
    }
}

pub fn apply_drag_commit(tracks: &mut [Track], commit: &DragCommit) -> bool {
    commit.apply(tracks)
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Starts a session on `hit`. Returns `false` while another drag is in
    /// flight or when the milestone is not a draggable handle.
    pub fn begin(&mut self, hit: &MilestoneHit, layout: &LayoutResult) -> bool {
        if self.is_dragging() || !hit.draggable || layout.time_scale.domain().is_none() {
            return false;
        }
        log::debug!("drag start on {} ({})", hit.group_id, hit.track);
        self.state = DragState::Dragging(DragSession {
            group_id: hit.group_id.clone(),
            track: hit.track.clone(),
            milestone: hit.milestone.clone(),
            time_scale: layout.time_scale.clone(),
            orientation: layout.orientation,
            origin: hit.anchor,
            current: hit.date,
            moved: false,
        });
        true
    }

    /// Moves the dragged glyph to the day under `pointer`, clamped to the
    /// time domain. Only that group's translation changes.
    pub fn update(&mut self, pointer: Point, scene: &mut Scene) -> Option<NaiveDate> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        let date = session
            .time_scale
            .invert_clamped(session.time_component(pointer))?;
        session.current = date;
        session.moved = true;
        let translate = session.translate_for(date);
        if let Some(group) = scene.find_group_mut(&session.group_id) {
            group.translate = translate;
        }
        Some(date)
    }

    /// Ends the session. A drag that never moved commits nothing.
    pub fn end(&mut self) -> Option<DragCommit> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        if !session.moved {
            log::debug!("drag on {} released without moving", session.group_id);
            return None;
        }
        let date = format_date(session.current);
        log::debug!("drag commit {} -> {date}", session.group_id);
        Some(DragCommit {
            track: session.track,
            milestone: session.milestone,
            date,
        })
    }

    /// Drops the session without committing and puts the glyph back.
    pub fn cancel(&mut self, scene: Option<&mut Scene>) {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return;
        };
        log::debug!("drag on {} cancelled", session.group_id);
        if let Some(group) = scene.and_then(|scene| scene.find_group_mut(&session.group_id)) {
            group.translate = session.origin;
        }
    }
}
