// gesture.rs — 鼠标/触摸手势解析
//
// Turns raw pointer, touch and wheel input into controller calls. The
// interpreter never writes orientation itself.

use crate::controller::OrientationController;
use crate::util::{self, Point, WheelEvent};
use log::debug;

/// Degrees of rotation per pixel dragged.
pub const DRAG_SPEED: f32 = 0.15;

/// Pinch distance change (px) is scaled by this before being fed in as a
/// `wheel_delta_y`.
pub const PINCH_WHEEL_SCALE: f32 = 10.0;

/// Where a drag started: the pointer position and the view at that moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub pointer: Point,
    pub lat: f32,
    pub lon: f32,
}

impl DragOrigin {
    fn capture(pointer: Point, controller: &OrientationController) -> Self {
        let current = controller.current();
        Self { pointer, lat: current.lat, lon: current.lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragOrigin),
    Pinching { origin: DragOrigin, baseline: f32 },
}

#[derive(Debug, Default)]
pub struct GestureInterpreter {
    state: InteractionState,
    hovering: bool,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.state, InteractionState::Pinching { .. })
    }

    /// Gates auto-return: a drag/pinch session or a hovering pointer.
    pub fn is_interacting(&self) -> bool {
        self.hovering || self.is_dragging()
    }

    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.hovering = false;
    }

    pub fn on_pointer_down(
        &mut self,
        pos: Option<Point>,
        controller: &OrientationController,
        playback_ended: bool,
    ) {
        if playback_ended {
            return;
        }
        let Some(pos) = pos else {
            return;
        };
        self.state = InteractionState::Dragging(DragOrigin::capture(pos, controller));
    }

    pub fn on_pointer_move(&mut self, pos: Option<Point>, controller: &mut OrientationController) {
        let InteractionState::Dragging(origin) = self.state else {
            return;
        };
        let Some(pos) = pos else {
            return;
        };
        let (dx, dy) = util::pointer_delta(origin.pointer, pos);
        let d_lat = dy * DRAG_SPEED;
        let d_lon = -dx * DRAG_SPEED;
        if let Err(e) = controller.drag_from((origin.lat, origin.lon), d_lat, d_lon) {
            debug!("ignoring drag: {}", e);
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.state = InteractionState::Idle;
    }

    pub fn on_pointer_enter(&mut self) {
        self.hovering = true;
    }

    pub fn on_pointer_leave(&mut self) {
        self.hovering = false;
        self.state = InteractionState::Idle;
    }

    pub fn on_wheel(&mut self, event: &WheelEvent, controller: &mut OrientationController) {
        let delta = util::normalize_wheel(event);
        if let Err(e) = controller.apply_fov_delta(delta) {
            debug!("ignoring wheel: {}", e);
        }
    }

    pub fn on_touch_start(
        &mut self,
        touches: &[Point],
        controller: &OrientationController,
        playback_ended: bool,
    ) {
        let Some(&first) = touches.first() else {
            return;
        };
        if playback_ended {
            return;
        }
        match (self.state, util::pinch_distance(touches)) {
            (InteractionState::Dragging(origin), Some(baseline))
            | (InteractionState::Pinching { origin, .. }, Some(baseline)) => {
                self.state = InteractionState::Pinching { origin, baseline };
            }
            (_, Some(baseline)) => {
                let origin = DragOrigin::capture(first, controller);
                self.state = InteractionState::Pinching { origin, baseline };
            }
            (_, None) => {
                self.state = InteractionState::Dragging(DragOrigin::capture(first, controller));
            }
        }
    }

    pub fn on_touch_move(&mut self, touches: &[Point], controller: &mut OrientationController) {
        let Some(&first) = touches.first() else {
            return;
        };
        match self.state {
            InteractionState::Idle => {}
            InteractionState::Dragging(_) => self.on_pointer_move(Some(first), controller),
            InteractionState::Pinching { origin, baseline } => match util::pinch_distance(touches) {
                Some(distance) => {
                    let wheel = WheelEvent::from_delta_y((distance - baseline) * PINCH_WHEEL_SCALE);
                    self.on_wheel(&wheel, controller);
                    self.state = InteractionState::Pinching { origin, baseline: distance };
                }
                None => {
                    self.state =
                        InteractionState::Dragging(DragOrigin::capture(first, controller));
                }
            },
        }
    }

    /// `remaining` are the touches still on the surface.
    pub fn on_touch_end(&mut self, remaining: &[Point], controller: &OrientationController) {
        match (self.state, remaining) {
            (_, []) => self.state = InteractionState::Idle,
            (InteractionState::Idle, _) => {}
            (InteractionState::Pinching { .. }, [only]) => {
                self.state = InteractionState::Dragging(DragOrigin::capture(*only, controller));
            }
            (InteractionState::Pinching { origin, .. }, _) => {
                if let Some(baseline) = util::pinch_distance(remaining) {
                    self.state = InteractionState::Pinching { origin, baseline };
                }
            }
            (InteractionState::Dragging(_), _) => {}
        }
    }
}
