// render_loop.rs — 逐帧驱动
//
// Keeps one outstanding frame request at a time. Each serviced frame ticks the
// controller (auto-return) and then renders unconditionally, since the video
// texture changes every frame anyway.

use crate::controller::{OrientationController, ViewState};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side frame scheduling (e.g. a redraw request on a window).
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    pending: Option<FrameHandle>,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.pending.is_none() {
            debug!("render loop started");
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Cancels the outstanding request. Safe to call any number of times.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            debug!("render loop stopped after {} frames", self.frames);
            scheduler.cancel_frame(handle);
        }
    }

    /// Services a frame callback. Callbacks for anything but the outstanding
    /// request are stale and do nothing. Returns whether a frame was rendered.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        scheduler: &mut impl FrameScheduler,
        controller: &mut OrientationController,
        interacting: bool,
        render: impl FnOnce(ViewState),
    ) -> bool {
        if self.pending != Some(handle) {
            return false;
        }
        self.pending = Some(scheduler.request_frame());
        controller.tick(interacting);
        render(controller.view());
        self.frames += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panorama::{Bounds, Orientation, PartialOrientation, ReturnStep};

    #[derive(Default)]
    struct TestScheduler {
        next: u64,
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for TestScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let h = FrameHandle(self.next);
            self.requested.push(h);
            h
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    fn controller() -> OrientationController {
        OrientationController::new(
            Orientation::new(0.0, 0.0, 75.0),
            Bounds::default(),
            ReturnStep::default(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_frames_chain_and_render_every_time() {
        let mut sched = TestScheduler::default();
        let mut c = controller();
        let mut rl = RenderLoop::new();
        rl.start(&mut sched);
        rl.start(&mut sched);
        assert_eq!(sched.requested.len(), 1);

        let mut rendered = 0;
        for _ in 0..3 {
            let h = *sched.requested.last().unwrap();
            assert!(rl.on_frame(h, &mut sched, &mut c, false, |_| rendered += 1));
        }
        // nothing to return to, still rendered
        assert_eq!(rendered, 3);
        assert_eq!(rl.frames_rendered(), 3);
    }

    #[test]
    fn test_stop_is_idempotent_and_drops_stale_frames() {
        let mut sched = TestScheduler::default();
        let mut c = controller();
        c.set_current(PartialOrientation::lat(10.0)).unwrap();
        let mut rl = RenderLoop::new();
        rl.start(&mut sched);
        let h = sched.requested[0];

        rl.stop(&mut sched);
        rl.stop(&mut sched);
        assert_eq!(sched.cancelled, vec![h]);
        assert!(!rl.is_running());

        assert!(!rl.on_frame(h, &mut sched, &mut c, false, |_| panic!("stale frame rendered")));
        assert_eq!(c.current().lat, 10.0);
    }

    #[test]
    fn test_frame_ticks_before_render() {
        let mut sched = TestScheduler::default();
        let mut c = controller();
        c.set_current(PartialOrientation::lat(10.0)).unwrap();
        let mut rl = RenderLoop::new();
        rl.start(&mut sched);
        let h = sched.requested[0];
        let mut seen = None;
        rl.on_frame(h, &mut sched, &mut c, false, |view| seen = Some(view));
        assert_eq!(c.current().lat, 9.0);
        assert_eq!(seen, Some(c.view()));
    }

    #[test]
    fn test_restart_after_stop() {
        let mut sched = TestScheduler::default();
        let mut rl = RenderLoop::new();
        rl.start(&mut sched);
        rl.stop(&mut sched);
        rl.start(&mut sched);
        assert!(rl.is_running());
        assert_eq!(sched.requested.len(), 2);
    }
}
