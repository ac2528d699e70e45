// host.rs — 桌面宿主：模拟播放器 (playback clock, subscriptions, frame requests)
//
// Stands in for the media player the panorama shell is embedded in. There is
// no decoder: a still equirectangular frame plays for a fixed duration.

use pano_player::{FrameHandle, FrameScheduler, HostEvent, PlayerHost};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use winit::window::{Fullscreen, Window};

pub struct Playback {
    pub playing: bool,
    pub ended: bool,
    pub has_started: bool,
    pub position: f32,
    pub duration: f32,
    last: Instant,
}

impl Playback {
    fn new(duration: f32) -> Self {
        Self {
            playing: false,
            ended: false,
            has_started: false,
            position: 0.0,
            duration,
            last: Instant::now(),
        }
    }
}

pub struct DesktopHost {
    window: Arc<Window>,
    subscriptions: HashSet<HostEvent>,
    next_frame: u64,
    armed: Option<FrameHandle>,
    full_window: bool,
    pub playback: Playback,
}

impl DesktopHost {
    pub fn new(window: Arc<Window>, duration: f32) -> Self {
        Self {
            window,
            subscriptions: HashSet::new(),
            next_frame: 0,
            armed: None,
            full_window: false,
            playback: Playback::new(duration),
        }
    }

    pub fn wants(&self, event: HostEvent) -> bool {
        self.subscriptions.contains(&event)
    }

    /// The outstanding frame request, if it has not been cancelled.
    pub fn take_due_frame(&mut self) -> Option<FrameHandle> {
        self.armed.take()
    }

    /// Starts or resumes playback; replays from the start after it ended.
    pub fn play(&mut self) -> HostEvent {
        if self.playback.ended {
            self.playback.ended = false;
            self.playback.position = 0.0;
        }
        self.playback.playing = true;
        self.playback.has_started = true;
        self.playback.last = Instant::now();
        HostEvent::Play
    }

    pub fn pause(&mut self) {
        self.playback.playing = false;
    }

    /// Advances the clock; yields `Ended` once the clip runs out.
    pub fn advance(&mut self) -> Option<HostEvent> {
        let now = Instant::now();
        let dt = now.duration_since(self.playback.last).as_secs_f32();
        self.playback.last = now;
        if !self.playback.playing {
            return None;
        }
        self.playback.position += dt;
        if self.playback.position >= self.playback.duration {
            self.playback.position = self.playback.duration;
            self.playback.playing = false;
            self.playback.ended = true;
            return Some(HostEvent::Ended);
        }
        None
    }

    pub fn toggle_fullscreen(&mut self) -> HostEvent {
        let on = !self.full_window;
        self.set_full_window(on);
        HostEvent::FullscreenChange
    }
}

impl FrameScheduler for DesktopHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.armed = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.armed == Some(handle) {
            self.armed = None;
        }
    }
}

impl PlayerHost for DesktopHost {
    fn on(&mut self, event: HostEvent) {
        self.subscriptions.insert(event);
    }

    fn off(&mut self, event: HostEvent) {
        self.subscriptions.remove(&event);
    }

    fn ended(&self) -> bool {
        self.playback.ended
    }

    fn set_has_started(&mut self, started: bool) {
        self.playback.has_started = started;
    }

    fn is_fullscreen(&self) -> bool {
        self.full_window
    }

    fn set_full_window(&mut self, on: bool) {
        self.full_window = on;
        if on {
            self.window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            self.window.set_fullscreen(None);
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn pause_and_rewind(&mut self) {
        self.playback.playing = false;
        self.playback.position = 0.0;
    }
}
