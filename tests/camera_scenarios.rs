//! End-to-end camera behaviour: gestures, wheel zoom, auto-return and bound
//! changes driven through the public API.

use pano_player::{
    Axis, Bounds, FrameHandle, FrameScheduler, GestureInterpreter, HostEvent, Orientation,
    OrientationController, PanoEvent, PanoOptions, PanoPlayer, PartialOrientation, Platform,
    PlayerHost, Point, ReturnStep, WheelEvent,
};

fn controller(auto_return: bool) -> OrientationController {
    OrientationController::new(
        Orientation::new(0.0, 0.0, 75.0),
        Bounds::default(),
        ReturnStep::default(),
        auto_return,
    )
    .unwrap()
}

#[test]
fn large_drag_clamps_latitude() {
    let mut ctrl = controller(false);
    let mut gestures = GestureInterpreter::new();

    gestures.on_pointer_down(Some(Point::new(400.0, 300.0)), &ctrl, false);
    // 2000px * 0.15 = 300° requested
    gestures.on_pointer_move(Some(Point::new(400.0, 2300.0)), &mut ctrl);
    assert_eq!(ctrl.current().lat, 85.0);

    gestures.on_pointer_move(Some(Point::new(400.0, -2000.0)), &mut ctrl);
    assert_eq!(ctrl.current().lat, -85.0);
    gestures.on_pointer_up();
    assert!(!gestures.is_dragging());
}

#[test]
fn wheel_zoom_stops_at_min_fov() {
    let mut ctrl = controller(false);
    let mut gestures = GestureInterpreter::new();

    let mut seen = Vec::new();
    for _ in 0..10 {
        gestures.on_wheel(&WheelEvent::from_delta_y(500.0), &mut ctrl);
        seen.push(ctrl.current().fov);
    }
    assert_eq!(seen[..5], [70.0, 65.0, 60.0, 55.0, 50.0]);
    assert!(seen.iter().all(|&fov| fov >= 50.0));
    assert_eq!(ctrl.current().fov, 50.0);
}

#[test]
fn auto_return_snaps_on_last_tick() {
    let mut ctrl = controller(true);
    ctrl.set_current(PartialOrientation::lat(10.0)).unwrap();
    assert_eq!(ctrl.default_orientation().lat, 0.0);

    for _ in 0..9 {
        assert!(ctrl.tick(false));
    }
    assert_eq!(ctrl.current().lat, 1.0);
    assert!(ctrl.tick(false));
    assert_eq!(ctrl.current().lat, 0.0);
    assert!(!ctrl.tick(false));
    assert!(ctrl.is_default_position());
}

#[test]
fn narrowing_bounds_reclamps_current() {
    let mut ctrl = controller(false);
    ctrl.set_current(PartialOrientation::lat(10.0)).unwrap();
    ctrl.drain_events();

    ctrl.set_bounds(Axis::Lat, None, Some(5.0)).unwrap();
    assert_eq!(ctrl.current().lat, 5.0);
    assert_eq!(ctrl.drain_events(), vec![PanoEvent::CameraPositionChange]);
}

#[test]
fn pinch_then_lift_one_finger_keeps_dragging() {
    let mut ctrl = controller(false);
    let mut gestures = GestureInterpreter::new();

    let a = Point::new(100.0, 100.0);
    gestures.on_touch_start(&[a], &ctrl, false);
    gestures.on_touch_start(&[a, Point::new(200.0, 100.0)], &ctrl, false);
    assert!(gestures.is_pinching());

    // fingers spread by 50px => fov -5
    gestures.on_touch_move(&[a, Point::new(250.0, 100.0)], &mut ctrl);
    assert_eq!(ctrl.current().fov, 70.0);

    gestures.on_touch_end(&[a], &ctrl);
    assert!(gestures.is_dragging());
    gestures.on_touch_move(&[Point::new(100.0, 200.0)], &mut ctrl);
    assert_eq!(ctrl.current().lat, 15.0);

    gestures.on_touch_end(&[], &ctrl);
    assert!(!gestures.is_interacting());
}

#[derive(Default)]
struct RecordingHost {
    subscribed: Vec<HostEvent>,
    next: u64,
    requested: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    has_started: bool,
}

impl FrameScheduler for RecordingHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested.push(FrameHandle(self.next));
        FrameHandle(self.next)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled.push(handle);
    }
}

impl PlayerHost for RecordingHost {
    fn on(&mut self, event: HostEvent) {
        self.subscribed.push(event);
    }

    fn off(&mut self, event: HostEvent) {
        self.subscribed.retain(|e| *e != event);
    }

    fn ended(&self) -> bool {
        false
    }

    fn set_has_started(&mut self, started: bool) {
        self.has_started = started;
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn set_full_window(&mut self, _on: bool) {}

    fn viewport_size(&self) -> (u32, u32) {
        (1920, 960)
    }

    fn pause_and_rewind(&mut self) {}
}

#[test]
fn player_drives_frames_until_ended() {
    let options = PanoOptions::from_json(r#"{ "initLat": 30, "returnStepLat": 10 }"#).unwrap();
    let mut host = RecordingHost::default();
    let mut player = PanoPlayer::new(&options, Platform::default()).unwrap();
    player.on_player_ready(&mut host);
    assert_eq!(player.canvas().unwrap().aspect(), 2.0);

    player.handle(&mut host, HostEvent::Play);
    assert_eq!(player.current().lat, 30.0);

    player.set_default_orientation(PartialOrientation::lat(0.0)).unwrap();
    let mut fovs = Vec::new();
    for _ in 0..3 {
        let handle = *host.requested.last().unwrap();
        assert!(player.on_frame(&mut host, handle, |view| fovs.push(view.fov)));
    }
    assert_eq!(fovs, vec![75.0; 3]);
    assert_eq!(player.current().lat, 0.0);
    assert!(player.take_events().contains(&PanoEvent::Returning));

    player.handle(&mut host, HostEvent::Ended);
    assert!(!player.is_running());
    assert!(!host.has_started);
    assert_eq!(host.cancelled, vec![*host.requested.last().unwrap()]);

    player.dispose(&mut host);
    assert!(host.subscribed.is_empty());
}
