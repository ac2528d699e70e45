// plugin.rs — host-facing player shell
//
// Glues the controller, gesture interpreter and render loop to a host media
// player. The host is reached only through `PlayerHost`; everything the shell
// subscribes to is detached again on `dispose`.

use crate::controller::{OrientationController, PanoEvent, ViewState};
use crate::error::Result;
use crate::gesture::GestureInterpreter;
use crate::i18n;
use crate::options::{PanoConfig, PanoOptions, Platform};
use crate::panorama::{Axis, Orientation, PartialOrientation};
use crate::render_loop::{FrameHandle, FrameScheduler, RenderLoop};
use crate::return_button::ReturnButton;
use crate::util::{self, Point, WheelEvent};
use log::{debug, info};

/// Player events the shell can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    MouseEnter,
    MouseLeave,
    FullscreenChange,
    Resize,
    Ended,
    Play,
    /// Tap on the fullscreen toggle, only taken over on iOS.
    FullscreenTap,
}

/// What the shell needs from the host player.
pub trait PlayerHost: FrameScheduler {
    fn on(&mut self, event: HostEvent);
    fn off(&mut self, event: HostEvent);
    fn ended(&self) -> bool;
    fn set_has_started(&mut self, started: bool);
    fn is_fullscreen(&self) -> bool;
    fn set_full_window(&mut self, on: bool);
    fn viewport_size(&self) -> (u32, u32);
    fn pause_and_rewind(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeBehavior {
    /// Hidden until the first play, then shown and faded out by the host.
    AutoFadeOut,
    HideOnPlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub behavior: NoticeBehavior,
    pub visible: bool,
    /// Set once the host should run its fade-out timers.
    pub fading: bool,
}

impl Notice {
    fn new(message: String, behavior: NoticeBehavior) -> Self {
        let visible = behavior == NoticeBehavior::HideOnPlay;
        Self { message, behavior, visible, fading: false }
    }

    fn on_play(&mut self) {
        match self.behavior {
            NoticeBehavior::AutoFadeOut if !self.fading => {
                self.visible = true;
                self.fading = true;
            }
            NoticeBehavior::AutoFadeOut => {}
            NoticeBehavior::HideOnPlay => self.visible = false,
        }
    }
}

/// The drawing surface the panorama is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub visible: bool,
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

pub struct PanoPlayer {
    config: PanoConfig,
    platform: Platform,
    controller: OrientationController,
    gestures: GestureInterpreter,
    render_loop: RenderLoop,
    return_button: Option<ReturnButton>,
    notice: Option<Notice>,
    canvas: Option<Canvas>,
    subscriptions: Vec<HostEvent>,
    callback: Option<Box<dyn FnOnce()>>,
    ready_queue: Vec<Box<dyn FnOnce()>>,
    events: Vec<PanoEvent>,
    is_ready: bool,
    started: bool,
    disposed: bool,
}

impl PanoPlayer {
    pub fn new(options: &PanoOptions, platform: Platform) -> Result<Self> {
        let config = options.normalize(&platform)?;
        let controller = OrientationController::new(
            config.init,
            config.bounds,
            config.return_step,
            config.auto_back_to_default,
        )?;
        Ok(Self {
            config,
            platform,
            controller,
            gestures: GestureInterpreter::new(),
            render_loop: RenderLoop::new(),
            return_button: None,
            notice: None,
            canvas: None,
            subscriptions: Vec::new(),
            callback: None,
            ready_queue: Vec::new(),
            events: Vec::new(),
            is_ready: false,
            started: false,
            disposed: false,
        })
    }

    /// Invoked once when initialization completes.
    pub fn with_callback(mut self, f: impl FnOnce() + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }

    // ---- lifecycle -------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Runs `f` now if initialization is done, otherwise once it is.
    pub fn ready(&mut self, f: impl FnOnce() + 'static) -> &mut Self {
        if self.is_ready {
            f();
        } else {
            self.ready_queue.push(Box::new(f));
        }
        self
    }

    fn subscribe(&mut self, host: &mut impl PlayerHost, event: HostEvent) {
        if !self.subscriptions.contains(&event) {
            host.on(event);
            self.subscriptions.push(event);
        }
    }

    /// One-time setup once the host player is ready.
    pub fn on_player_ready(&mut self, host: &mut impl PlayerHost) {
        if self.is_ready || self.disposed {
            return;
        }

        self.subscribe(host, HostEvent::Play);
        if self.platform.accelerated_3d {
            self.return_button = Some(ReturnButton::new(self.controller.auto_return()));
            self.notice = Some(Notice::new(
                i18n::tr("notice.drag_and_drop"),
                NoticeBehavior::AutoFadeOut,
            ));
            let (width, height) = host.viewport_size();
            self.canvas = Some(Canvas { visible: false, width, height });

            for event in [
                HostEvent::MouseEnter,
                HostEvent::MouseLeave,
                HostEvent::FullscreenChange,
                HostEvent::Resize,
                HostEvent::Ended,
            ] {
                self.subscribe(host, event);
            }
            if self.config.is_ios {
                self.subscribe(host, HostEvent::FullscreenTap);
            }
        } else {
            info!("accelerated 3D unavailable, playing flat");
            self.notice = Some(Notice::new(
                format!("{}\n{}", i18n::tr("notice.webgl_error"), i18n::tr("notice.played_flat")),
                NoticeBehavior::HideOnPlay,
            ));
        }

        if let Some(callback) = self.callback.take() {
            callback();
        }
        self.is_ready = true;
        self.events.push(PanoEvent::Ready);
        info!("pano player ready");
        for f in std::mem::take(&mut self.ready_queue) {
            f();
        }
    }

    pub fn is_subscribed(&self, event: HostEvent) -> bool {
        !self.disposed && self.subscriptions.contains(&event)
    }

    /// Dispatches a player event. Events the shell is not subscribed to, and
    /// anything after disposal, are dropped.
    pub fn handle(&mut self, host: &mut impl PlayerHost, event: HostEvent) {
        if !self.is_subscribed(event) {
            return;
        }
        match event {
            HostEvent::MouseEnter => self.gestures.on_pointer_enter(),
            HostEvent::MouseLeave => self.gestures.on_pointer_leave(),
            HostEvent::FullscreenChange | HostEvent::Resize => self.resize(host),
            HostEvent::Ended => self.on_ended(host),
            HostEvent::Play => self.on_play(host),
            HostEvent::FullscreenTap => {
                let enter = !host.is_fullscreen();
                host.set_full_window(enter);
                self.resize(host);
            }
        }
        self.sync_events();
    }

    fn on_play(&mut self, host: &mut impl PlayerHost) {
        if let Some(notice) = self.notice.as_mut() {
            notice.on_play();
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        canvas.visible = true;
        if !self.started {
            self.started = true;
            if let Err(e) = self.controller.reset_to(self.config.init) {
                debug!("init orientation not applied: {}", e);
            }
        }
        self.render_loop.start(host);
    }

    fn on_ended(&mut self, host: &mut impl PlayerHost) {
        self.render_loop.stop(host);
        self.gestures.reset();
        self.started = false;
        host.set_has_started(false);
    }

    fn resize(&mut self, host: &mut impl PlayerHost) {
        let (width, height) = host.viewport_size();
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.width = width;
            canvas.height = height;
            self.events.push(PanoEvent::CameraPositionChange);
        }
    }

    /// Tears down everything the shell registered on the host.
    pub fn dispose(&mut self, host: &mut impl PlayerHost) {
        if self.disposed {
            return;
        }
        self.render_loop.stop(host);
        for event in std::mem::take(&mut self.subscriptions) {
            host.off(event);
        }
        if self.config.is_ios && self.canvas.is_some() {
            // hand the fullscreen toggle back to the player
            host.set_full_window(false);
        }
        self.canvas = None;
        self.notice = None;
        self.return_button = None;
        self.gestures.reset();
        self.ready_queue.clear();
        host.pause_and_rewind();
        self.disposed = true;
        info!("pano player disposed");
    }

    // ---- per frame -------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn on_frame(
        &mut self,
        host: &mut impl PlayerHost,
        handle: FrameHandle,
        render: impl FnOnce(ViewState),
    ) -> bool {
        let interacting = self.gestures.is_interacting();
        let rendered =
            self.render_loop
                .on_frame(handle, host, &mut self.controller, interacting, render);
        self.sync_events();
        rendered
    }

    pub fn view(&self) -> ViewState {
        self.controller.view()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn return_button(&self) -> Option<&ReturnButton> {
        self.return_button.as_ref()
    }

    pub fn gestures(&self) -> &GestureInterpreter {
        &self.gestures
    }

    fn sync_events(&mut self) {
        self.events.extend(self.controller.drain_events());
    }

    pub fn take_events(&mut self) -> Vec<PanoEvent> {
        self.sync_events();
        std::mem::take(&mut self.events)
    }

    // ---- canvas input ----------------------------------------------------

    fn accepts_input(&self) -> bool {
        !self.disposed && self.canvas.is_some()
    }

    pub fn pointer_down(&mut self, host: &impl PlayerHost, pos: Option<Point>) {
        if self.accepts_input() {
            self.gestures.on_pointer_down(pos, &self.controller, host.ended());
            self.grab_started();
        }
    }

    /// A drag or pinch that begins cancels a pending `back_to_default`.
    fn grab_started(&mut self) {
        if self.gestures.is_dragging() {
            self.controller.cancel_return();
        }
    }

    pub fn pointer_move(&mut self, pos: Option<Point>) {
        if self.accepts_input() {
            self.gestures.on_pointer_move(pos, &mut self.controller);
            self.sync_events();
        }
    }

    pub fn pointer_up(&mut self) {
        self.gestures.on_pointer_up();
    }

    pub fn wheel(&mut self, event: &WheelEvent) {
        if self.accepts_input() {
            self.gestures.on_wheel(event, &mut self.controller);
            self.sync_events();
        }
    }

    pub fn touch_start(&mut self, host: &impl PlayerHost, touches: &[Point]) {
        if self.accepts_input() {
            self.gestures.on_touch_start(touches, &self.controller, host.ended());
            self.grab_started();
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        if self.accepts_input() {
            self.gestures.on_touch_move(touches, &mut self.controller);
            self.sync_events();
        }
    }

    pub fn touch_end(&mut self, remaining: &[Point]) {
        self.gestures.on_touch_end(remaining, &self.controller);
    }

    /// Viewer clicked the return button.
    pub fn click_return_button(&mut self) {
        if let Some(button) = self.return_button.as_ref() {
            let on = button.toggled();
            self.set_auto_back_to_default(on);
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn init(&self) -> Orientation {
        self.config.init
    }

    /// Orientation applied on the next play start.
    pub fn set_init(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        pos.validate()?;
        let bounds = self.controller.bounds();
        let mut init = self.config.init;
        for (axis, value) in pos.fields() {
            let (min, max) = bounds.range(axis);
            init.set(axis, util::clamp(value, min, max)?);
        }
        self.config.init = init;
        Ok(self)
    }

    pub fn default_orientation(&self) -> Orientation {
        self.controller.default_orientation()
    }

    pub fn set_default_orientation(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        self.controller.set_default(pos)?;
        Ok(self)
    }

    pub fn current(&self) -> Orientation {
        self.controller.current()
    }

    pub fn set_current(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        self.controller.set_current(pos)?;
        self.sync_events();
        Ok(self)
    }

    pub fn max(&self) -> Orientation {
        self.controller.bounds().max
    }

    pub fn set_max(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        self.update_bounds(pos, |axis, v| (axis, None, Some(v)))
    }

    pub fn min(&self) -> Orientation {
        self.controller.bounds().min
    }

    pub fn set_min(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        self.update_bounds(pos, |axis, v| (axis, Some(v), None))
    }

    /// Every axis is validated before any is applied, so a rejected update
    /// leaves all bounds untouched.
    fn update_bounds(
        &mut self,
        pos: PartialOrientation,
        side: impl Fn(Axis, f32) -> (Axis, Option<f32>, Option<f32>),
    ) -> Result<&mut Self> {
        let bounds = self.controller.bounds();
        let updates: Vec<_> = pos.fields().map(|(axis, v)| side(axis, v)).collect();
        for &(axis, min, max) in &updates {
            bounds.check(axis, min, max)?;
        }
        for (axis, min, max) in updates {
            self.controller.set_bounds(axis, min, max)?;
            let (lo, hi) = self.controller.bounds().range(axis);
            self.config.init.set(axis, self.config.init.get(axis).clamp(lo, hi));
        }
        self.config.bounds = self.controller.bounds();
        self.sync_events();
        Ok(self)
    }

    pub fn return_step(&self) -> Orientation {
        self.controller.return_step().as_orientation()
    }

    pub fn set_return_step(&mut self, pos: PartialOrientation) -> Result<&mut Self> {
        self.controller.set_return_step(pos)?;
        self.config.return_step = self.controller.return_step();
        Ok(self)
    }

    pub fn auto_back_to_default(&self) -> bool {
        self.controller.auto_return()
    }

    pub fn set_auto_back_to_default(&mut self, on: bool) -> &mut Self {
        self.controller.set_auto_return(on);
        self.config.auto_back_to_default = on;
        if let Some(button) = self.return_button.as_mut() {
            button.update(on);
        }
        self.events.push(PanoEvent::AutoReturnChanged(on));
        self
    }

    /// Relax to the default orientation starting with the next frame.
    pub fn back_to_default(&mut self) -> &mut Self {
        self.controller.arm_return();
        self
    }

    pub fn is_default_position(&self) -> bool {
        self.controller.is_default_position()
    }
}
