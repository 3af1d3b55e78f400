//! The embeddable timeline: owns a drawing surface, a viewport host and a
//! private copy of the track data, and routes pointer input.

use crate::config::{LayoutConfig, TimelineOptions};
use crate::drag::{DragCommit, DragController};
use crate::error::{ConfigError, RenderError};
use crate::layout::{LayoutResult, Point, Size, compute_layout};
use crate::model::{Milestone, TimelineModel, Track};
use crate::render::Surface;
use crate::scene::{HitTarget, MilestoneHit, Scene, SceneContext, build_scene, tooltip_for};
use crate::theme::Theme;
use chrono::NaiveDate;
use std::cell::Cell;
use std::rc::Rc;

/// Handle returned by [`ViewportHost::subscribe_resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Flag a host raises when the viewport changes size.
#[derive(Debug, Clone, Default)]
pub struct ResizeSignal(Rc<Cell<bool>>);

impl ResizeSignal {
    pub fn notify(&self) {
        self.0.set(true);
    }

    /// Reads and clears the flag.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Whatever hosts the drawing surface and knows its size.
pub trait ViewportHost {
    fn size(&self) -> Size;
    fn subscribe_resize(&mut self, signal: ResizeSignal) -> SubscriptionId;
    fn unsubscribe_resize(&mut self, id: SubscriptionId);
}

/// A viewport whose size only changes when told to.
#[derive(Debug, Default)]
pub struct FixedViewport {
    size: Size,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, ResizeSignal)>,
}

impl FixedViewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
        for (_, signal) in &self.subscribers {
            signal.notify();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl ViewportHost for FixedViewport {
    fn size(&self) -> Size {
        self.size
    }

    fn subscribe_resize(&mut self, signal: ResizeSignal) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, signal));
        id
    }

    fn unsubscribe_resize(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(existing, _)| *existing != id);
    }
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `(milestone, track)`
pub type ClickCallback = Box<dyn FnMut(&Milestone, &str)>;
/// `(milestone, track, "DD/MM/YYYY")`
pub type DragCallback = Box<dyn FnMut(&Milestone, &str, &str)>;

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Ignored,
    DragStarted { group_id: String },
    DragMoved { date: NaiveDate },
    Committed(DragCommit),
    Clicked { track: String, milestone: String },
    /// A milestone with a link was clicked and no click callback is installed.
    OpenUrl(String),
    FocusChanged(Option<String>),
    TooltipShown { group_id: String },
    TooltipHidden,
    Cancelled,
}

#[derive(Debug, Clone)]
enum Pressed {
    Milestone(MilestoneHit),
    Legend(String),
}

pub struct TubeTimelineBuilder<S, H> {
    target: Option<S>,
    host: Option<H>,
    data: Option<Vec<Track>>,
    options: TimelineOptions,
    theme: Theme,
    layout_config: LayoutConfig,
    clock: Box<dyn Clock>,
    on_click: Option<ClickCallback>,
    on_drag: Option<DragCallback>,
}

impl<S: Surface, H: ViewportHost> TubeTimelineBuilder<S, H> {
    pub fn target(mut self, surface: S) -> Self {
        self.target = Some(surface);
        self
    }

    pub fn host(mut self, host: H) -> Self {
        self.host = Some(host);
        self
    }

    pub fn data(mut self, tracks: &[Track]) -> Self {
        self.data = Some(tracks.to_vec());
        self
    }

    pub fn options(mut self, options: TimelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn layout_config(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn on_milestone_click(mut self, callback: impl FnMut(&Milestone, &str) + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    pub fn on_milestone_drag(
        mut self,
        callback: impl FnMut(&Milestone, &str, &str) + 'static,
    ) -> Self {
        self.on_drag = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<TubeTimeline<S, H>, ConfigError> {
        let surface = self.target.ok_or(ConfigError::MissingTarget)?;
        let host = self.host.ok_or(ConfigError::MissingHost)?;
        let data = self.data.ok_or(ConfigError::MissingData)?;
        self.layout_config.validate()?;

        let size = host.size();
        if !size.is_drawable() {
            return Err(ConfigError::InvalidSurface(format!(
                "viewport reports {}x{}",
                size.width, size.height
            )));
        }
        if !surface.is_usable() {
            return Err(ConfigError::InvalidSurface(
                "surface cannot be drawn on".to_string(),
            ));
        }

        Ok(TubeTimeline {
            surface,
            host,
            data,
            options: self.options,
            theme: self.theme,
            layout_config: self.layout_config,
            clock: self.clock,
            on_click: self.on_click,
            on_drag: self.on_drag,
            focus: None,
            subscription: None,
            resize: ResizeSignal::default(),
            layout: None,
            scene: None,
            drag: DragController::new(),
            pressed: None,
            hovered: None,
            torn_down: false,
        })
    }
}

pub struct TubeTimeline<S, H> {
    surface: S,
    host: H,
    data: Vec<Track>,
    options: TimelineOptions,
    theme: Theme,
    layout_config: LayoutConfig,
    clock: Box<dyn Clock>,
    on_click: Option<ClickCallback>,
    on_drag: Option<DragCallback>,
    focus: Option<String>,
    subscription: Option<SubscriptionId>,
    resize: ResizeSignal,
    layout: Option<LayoutResult>,
    scene: Option<Scene>,
    drag: DragController,
    pressed: Option<Pressed>,
    hovered: Option<String>,
    torn_down: bool,
}

impl<S: Surface, H: ViewportHost> TubeTimeline<S, H> {
    pub fn builder() -> TubeTimelineBuilder<S, H> {
        TubeTimelineBuilder {
            target: None,
            host: None,
            data: None,
            options: TimelineOptions::default(),
            theme: Theme::default(),
            layout_config: LayoutConfig::default(),
            clock: Box::new(SystemClock),
            on_click: None,
            on_drag: None,
        }
    }

    /// Full parse, layout, scene and draw pass against the current viewport.
    ///
    /// On failure the error is logged and returned and the previous drawing
    /// stays current.
    pub fn render(&mut self) -> Result<(), RenderError> {
        if self.torn_down {
            return Err(RenderError::TornDown);
        }
        self.resubscribe();
        self.try_render().inspect_err(|err| {
            log::error!("timeline render failed: {err}");
        })
    }

    fn resubscribe(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.host.unsubscribe_resize(id);
        }
        self.subscription = Some(self.host.subscribe_resize(self.resize.clone()));
    }

    fn try_render(&mut self) -> Result<(), RenderError> {
        let size = self.host.size();
        if !size.is_drawable() {
            return Err(RenderError::Viewport {
                width: size.width,
                height: size.height,
            });
        }
        if !self.surface.is_usable() {
            return Err(RenderError::Surface("surface cannot be drawn on".to_string()));
        }

        let data = self.data.clone();
        let model = TimelineModel::build(&data, self.options.sort_tracks);
        let mut focus = self.focus.clone();
        if let Some(name) = &focus
            && model.track(name).is_none()
        {
            log::debug!("focused track `{name}` is gone, clearing focus");
            focus = None;
        }
        let layout = compute_layout(&model, &self.options, size, &self.theme, &self.layout_config);
        let scene = build_scene(&SceneContext {
            model: &model,
            layout: &layout,
            options: &self.options,
            theme: &self.theme,
            config: &self.layout_config,
            focus: focus.as_deref(),
            today: self.clock.today(),
            drag_enabled: self.on_drag.is_some(),
        });
        scene.check_finite()?;
        self.surface.draw(&scene)?;

        log::debug!(
            "rendered {} tracks, {} primitives",
            model.tracks.len(),
            scene.primitive_count()
        );
        self.drag.cancel(None);
        self.pressed = None;
        self.hovered = None;
        self.focus = focus;
        self.layout = Some(layout);
        self.scene = Some(scene);
        Ok(())
    }

    /// Renders again if the host reported a resize since the last check.
    pub fn refresh_if_resized(&mut self) -> Result<bool, RenderError> {
        if self.torn_down || !self.resize.take() {
            return Ok(false);
        }
        self.render().map(|()| true)
    }

    /// Detaches from the host and clears the surface. Safe to call twice.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(id) = self.subscription.take() {
            self.host.unsubscribe_resize(id);
        }
        self.drag.cancel(None);
        self.surface.clear();
        self.scene = None;
        self.layout = None;
        self.pressed = None;
        self.hovered = None;
        self.torn_down = true;
    }

    /// Isolates `track`, or restores every track if it is already isolated.
    ///
    /// The focus only changes once the new scene is drawn.
    pub fn toggle_focus(&mut self, track: &str) -> Result<Option<&str>, RenderError> {
        let next = match self.focus.as_deref() {
            Some(current) if current == track => None,
            _ => Some(track.to_string()),
        };
        let previous = std::mem::replace(&mut self.focus, next);
        if let Err(err) = self.render() {
            self.focus = previous;
            return Err(err);
        }
        Ok(self.focus.as_deref())
    }

    pub fn pointer_down(&mut self, point: Point) -> PointerOutcome {
        if self.drag.is_dragging() {
            return PointerOutcome::Ignored;
        }
        let (Some(scene), Some(layout)) = (&self.scene, &self.layout) else {
            return PointerOutcome::Ignored;
        };
        match scene.hit_test(point).map(|region| &region.target) {
            Some(HitTarget::Milestone(hit)) => {
                self.pressed = Some(Pressed::Milestone(hit.clone()));
                if self.drag.begin(hit, layout) {
                    return PointerOutcome::DragStarted {
                        group_id: hit.group_id.clone(),
                    };
                }
            }
            Some(HitTarget::Legend { track }) => {
                self.pressed = Some(Pressed::Legend(track.clone()));
            }
            None => self.pressed = None,
        }
        PointerOutcome::Ignored
    }

    pub fn pointer_move(&mut self, point: Point) -> PointerOutcome {
        let Some(scene) = self.scene.as_mut() else {
            return PointerOutcome::Ignored;
        };
        if self.drag.is_dragging() {
            scene.set_tooltip(None);
            self.hovered = None;
            let Some(date) = self.drag.update(point, scene) else {
                return PointerOutcome::Ignored;
            };
            Self::redraw(&mut self.surface, scene);
            return PointerOutcome::DragMoved { date };
        }

        let hovered = scene.hit_test(point).and_then(|region| match &region.target {
            HitTarget::Milestone(hit) => Some((region.rect, hit.clone())),
            HitTarget::Legend { .. } => None,
        });
        let current = self.hovered.clone();
        match (hovered, current.as_deref()) {
            (Some((_, hit)), Some(current)) if hit.group_id == current => PointerOutcome::Ignored,
            (Some((rect, hit)), _) => {
                let Some(layout) = &self.layout else {
                    return PointerOutcome::Ignored;
                };
                let card =
                    tooltip_for(&hit.milestone, rect, layout, &self.theme, &self.layout_config);
                scene.set_tooltip(Some(card));
                Self::redraw(&mut self.surface, scene);
                self.hovered = Some(hit.group_id.clone());
                PointerOutcome::TooltipShown {
                    group_id: hit.group_id,
                }
            }
            (None, Some(_)) => {
                scene.set_tooltip(None);
                Self::redraw(&mut self.surface, scene);
                self.hovered = None;
                PointerOutcome::TooltipHidden
            }
            (None, None) => PointerOutcome::Ignored,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> PointerOutcome {
        let pressed = self.pressed.take();
        if self.drag.is_dragging() {
            if let Some(commit) = self.drag.end() {
                if let Some(callback) = self.on_drag.as_mut() {
                    callback(&commit.milestone, &commit.track, &commit.date);
                }
                return PointerOutcome::Committed(commit);
            }
            // Released in place: treat it as a click on the handle.
            return match pressed {
                Some(Pressed::Milestone(hit)) => self.click(&hit),
                _ => PointerOutcome::Ignored,
            };
        }

        let target = self
            .scene
            .as_ref()
            .and_then(|scene| scene.hit_test(point))
            .map(|region| region.target.clone());
        match (pressed, target) {
            (Some(Pressed::Milestone(hit)), Some(HitTarget::Milestone(under)))
                if hit.group_id == under.group_id =>
            {
                self.click(&hit)
            }
            (Some(Pressed::Legend(track)), Some(HitTarget::Legend { track: under }))
                if track == under =>
            {
                match self.toggle_focus(&track) {
                    Ok(focus) => PointerOutcome::FocusChanged(focus.map(str::to_string)),
                    Err(_) => PointerOutcome::Ignored,
                }
            }
            _ => PointerOutcome::Ignored,
        }
    }

    /// Pointer left the surface or capture was lost.
    pub fn pointer_leave(&mut self) -> PointerOutcome {
        self.pressed = None;
        let Some(scene) = self.scene.as_mut() else {
            return PointerOutcome::Ignored;
        };
        if self.drag.is_dragging() {
            self.drag.cancel(Some(&mut *scene));
            Self::redraw(&mut self.surface, scene);
            return PointerOutcome::Cancelled;
        }
        if self.hovered.take().is_some() {
            scene.set_tooltip(None);
            Self::redraw(&mut self.surface, scene);
            return PointerOutcome::TooltipHidden;
        }
        PointerOutcome::Ignored
    }

    fn click(&mut self, hit: &MilestoneHit) -> PointerOutcome {
        if let Some(callback) = self.on_click.as_mut() {
            callback(&hit.milestone, &hit.track);
            return PointerOutcome::Clicked {
                track: hit.track.clone(),
                milestone: hit.milestone.name.clone(),
            };
        }
        match &hit.milestone.url {
            Some(url) if !url.trim().is_empty() => PointerOutcome::OpenUrl(url.clone()),
            _ => PointerOutcome::Ignored,
        }
    }

    fn redraw(surface: &mut S, scene: &Scene) {
        if let Err(err) = surface.draw(scene) {
            log::error!("timeline redraw failed: {err}");
        }
    }

    /// Replaces the track data. Takes effect on the next render.
    pub fn set_tracks(&mut self, tracks: &[Track]) {
        self.data = tracks.to_vec();
    }

    /// Writes a committed drag into the owned data. Takes effect on the next render.
    pub fn apply_commit(&mut self, commit: &DragCommit) -> bool {
        commit.apply(&mut self.data)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.data
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TimelineOptions) {
        self.options = options;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn layout(&self) -> Option<&LayoutResult> {
        self.layout.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
