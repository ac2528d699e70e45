// controller.rs — 视角控制器
//
// Owns current/default orientation, bounds, return steps and the auto-return
// flag. Every mutation goes through here so the bounds invariant holds after
// each public call.

use crate::error::{PanoError, Result};
use crate::panorama::{Axis, Bounds, Orientation, PartialOrientation, ReturnStep};
use crate::util;
use glam::Vec3;
use log::{debug, trace, warn};

/// Radius of the sphere the video is projected onto.
pub const SPHERE_RADIUS: f32 = 500.0;

/// Notifications toward the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanoEvent {
    Ready,
    /// View direction or fov changed.
    CameraPositionChange,
    /// Auto-return moved the view this frame.
    Returning,
    AutoReturnChanged(bool),
}

/// What the renderer needs to place its camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub target: Vec3,
    pub fov: f32,
}

#[derive(Debug, Clone)]
pub struct OrientationController {
    current: Orientation,
    default: Orientation,
    bounds: Bounds,
    step: ReturnStep,
    auto_return: bool,
    return_once: bool,
    target: Vec3,
    events: Vec<PanoEvent>,
}

impl OrientationController {
    pub fn new(
        initial: Orientation,
        bounds: Bounds,
        step: ReturnStep,
        auto_return: bool,
    ) -> Result<Self> {
        for axis in Axis::ALL {
            bounds.check(axis, None, None)?;
        }
        let mut initial_clamped = initial;
        for axis in Axis::ALL {
            let (min, max) = bounds.range(axis);
            initial_clamped.set(axis, util::clamp(initial.get(axis), min, max)?);
        }
        Ok(Self {
            current: initial_clamped,
            default: initial_clamped,
            bounds,
            step,
            auto_return,
            return_once: false,
            target: util::to_direction(initial_clamped.lat, initial_clamped.lon, SPHERE_RADIUS),
            events: Vec::new(),
        })
    }

    pub fn current(&self) -> Orientation {
        self.current
    }

    pub fn default_orientation(&self) -> Orientation {
        self.default
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn return_step(&self) -> ReturnStep {
        self.step
    }

    pub fn auto_return(&self) -> bool {
        self.auto_return
    }

    pub fn view_direction(&self) -> Vec3 {
        self.target
    }

    pub fn view(&self) -> ViewState {
        ViewState { target: self.target, fov: self.current.fov }
    }

    pub fn is_default_position(&self) -> bool {
        self.current == self.default
    }

    pub fn drain_events(&mut self) -> Vec<PanoEvent> {
        std::mem::take(&mut self.events)
    }

    fn clamp_axis(&self, axis: Axis, value: f32) -> Result<f32> {
        let (min, max) = self.bounds.range(axis);
        util::clamp(value, min, max)
    }

    fn clamp_partial(&self, p: &PartialOrientation, onto: Orientation) -> Result<Orientation> {
        p.validate()?;
        let mut out = onto;
        for (axis, value) in p.fields() {
            out.set(axis, self.clamp_axis(axis, value)?);
        }
        Ok(out)
    }

    fn position_changed(&mut self) {
        self.target = util::to_direction(self.current.lat, self.current.lon, SPHERE_RADIUS);
        self.events.push(PanoEvent::CameraPositionChange);
    }

    pub fn set_current(&mut self, p: PartialOrientation) -> Result<()> {
        let next = self.clamp_partial(&p, self.current)?;
        if p.is_empty() {
            return Ok(());
        }
        self.current = next;
        self.position_changed();
        Ok(())
    }

    pub fn set_default(&mut self, p: PartialOrientation) -> Result<()> {
        self.default = self.clamp_partial(&p, self.default)?;
        Ok(())
    }

    /// Sets both current and default, as on the first play.
    pub fn reset_to(&mut self, o: Orientation) -> Result<()> {
        let next = self.clamp_partial(&o.into(), self.current)?;
        self.current = next;
        self.default = next;
        self.position_changed();
        Ok(())
    }

    pub fn set_bounds(&mut self, axis: Axis, min: Option<f32>, max: Option<f32>) -> Result<()> {
        let (new_min, new_max) = match self.bounds.check(axis, min, max) {
            Ok(range) => range,
            Err(e) => {
                warn!("rejected {} bounds update: {}", axis, e);
                return Err(e);
            }
        };
        self.bounds.min.set(axis, new_min);
        self.bounds.max.set(axis, new_max);
        debug!("{} bounds now [{}, {}]", axis, new_min, new_max);

        let value = self.current.get(axis);
        let clamped = value.clamp(new_min, new_max);
        self.default.set(axis, self.default.get(axis).clamp(new_min, new_max));
        if clamped != value {
            self.current.set(axis, clamped);
            self.position_changed();
        }
        Ok(())
    }

    pub fn set_return_step(&mut self, p: PartialOrientation) -> Result<()> {
        p.validate()?;
        if let Some(lat) = p.lat {
            self.step.lat = lat;
        }
        if let Some(lon) = p.lon {
            self.step.lon = lon;
        }
        if let Some(fov) = p.fov {
            self.step.fov = fov;
        }
        Ok(())
    }

    pub fn set_auto_return(&mut self, on: bool) {
        self.auto_return = on;
    }

    /// Relax toward default on the next ticks even with auto-return off.
    pub fn arm_return(&mut self) {
        self.return_once = !self.settled();
    }

    /// Drops a pending one-shot return, e.g. when the viewer grabs the view.
    pub fn cancel_return(&mut self) {
        self.return_once = false;
    }

    /// No axis that can still move differs from default.
    fn settled(&self) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            self.step.get(axis) == 0.0 || self.current.get(axis) == self.default.get(axis)
        })
    }

    pub fn is_returning(&self) -> bool {
        self.auto_return || self.return_once
    }

    /// Per-frame auto-return. Returns whether the view moved.
    pub fn tick(&mut self, interacting: bool) -> bool {
        if !self.is_returning() || interacting {
            return false;
        }

        let mut moved = false;
        for axis in Axis::ALL {
            let step = self.step.get(axis);
            let current = self.current.get(axis);
            let target = self.default.get(axis);
            if step == 0.0 || current == target {
                continue;
            }
            self.current.set(axis, util::step_toward(current, target, step));
            moved = true;
        }

        if self.return_once && self.settled() {
            self.return_once = false;
        }

        if moved {
            trace!("returning to default: {:?}", self.current);
            self.position_changed();
            self.events.push(PanoEvent::Returning);
        }
        moved
    }

    pub fn apply_gesture_delta(&mut self, d_lat: f32, d_lon: f32) -> Result<()> {
        let origin = (self.current.lat, self.current.lon);
        self.drag_from(origin, d_lat, d_lon)
    }

    /// Absolute drag: lat/lon become `origin + delta`, clamped.
    pub fn drag_from(&mut self, origin: (f32, f32), d_lat: f32, d_lon: f32) -> Result<()> {
        let lat = self.clamp_axis(Axis::Lat, origin.0 + d_lat)?;
        let lon = self.clamp_axis(Axis::Lon, origin.1 + d_lon)?;
        self.current.lat = lat;
        self.current.lon = lon;
        self.position_changed();
        Ok(())
    }

    pub fn apply_fov_delta(&mut self, d_fov: f32) -> Result<()> {
        if d_fov.is_nan() {
            return Err(PanoError::InvalidInput { field: "fov" });
        }
        self.current.fov = self.clamp_axis(Axis::Fov, self.current.fov + d_fov)?;
        self.events.push(PanoEvent::CameraPositionChange);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_new_clamps_initial() {
        let c = OrientationController::new(
            Orientation::new(120.0, 0.0, 10.0),
            Bounds::default(),
            ReturnStep::default(),
            false,
        )
        .unwrap();
        assert_eq!(c.current(), Orientation::new(85.0, 0.0, 50.0));
        assert_eq!(c.default_orientation(), c.current());
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let mut bounds = Bounds::default();
        bounds.min.fov = 120.0;
        let err = OrientationController::new(
            Orientation::new(0.0, 0.0, 75.0),
            bounds,
            ReturnStep::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PanoError::BoundsViolation { axis: Axis::Fov, .. }));
    }

    #[test]
    fn test_set_current_clamps_and_notifies() {
        let mut c = controller();
        c.set_current(PartialOrientation { lat: Some(-200.0), lon: None, fov: Some(10.0) })
            .unwrap();
        assert_eq!(c.current(), Orientation::new(-85.0, 0.0, 50.0));
        assert_eq!(c.drain_events(), vec![PanoEvent::CameraPositionChange]);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_set_current_nan_leaves_state() {
        let mut c = controller();
        let err = c
            .set_current(PartialOrientation { lat: Some(10.0), lon: Some(f32::NAN), fov: None })
            .unwrap_err();
        assert!(matches!(err, PanoError::InvalidInput { .. }));
        assert_eq!(c.current(), Orientation::new(0.0, 0.0, 75.0));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_set_default_does_not_touch_current() {
        let mut c = controller();
        c.set_default(PartialOrientation::lat(30.0)).unwrap();
        assert_eq!(c.default_orientation().lat, 30.0);
        assert_eq!(c.current().lat, 0.0);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_set_bounds_reclamps_current_and_default() {
        let mut c = controller();
        c.set_current(PartialOrientation::lat(10.0)).unwrap();
        c.set_default(PartialOrientation::lat(20.0)).unwrap();
        c.drain_events();

        c.set_bounds(Axis::Lat, None, Some(5.0)).unwrap();
        assert_eq!(c.current().lat, 5.0);
        assert_eq!(c.default_orientation().lat, 5.0);
        assert_eq!(c.drain_events(), vec![PanoEvent::CameraPositionChange]);
    }

    #[test]
    fn test_set_bounds_rejects_inversion() {
        let mut c = controller();
        let before = c.bounds();
        let err = c.set_bounds(Axis::Fov, Some(120.0), None).unwrap_err();
        assert!(matches!(err, PanoError::BoundsViolation { axis: Axis::Fov, .. }));
        assert_eq!(c.bounds(), before);
        let err = c.set_bounds(Axis::Lat, Some(10.0), Some(5.0)).unwrap_err();
        assert!(matches!(err, PanoError::BoundsViolation { .. }));
        assert_eq!(c.bounds(), before);
    }

    #[test]
    fn test_tick_returns_by_step_and_snaps() {
        let mut c = controller();
        c.set_current(PartialOrientation::lat(2.5)).unwrap();
        c.drain_events();

        assert!(c.tick(false));
        assert_eq!(c.current().lat, 1.5);
        assert_eq!(
            c.drain_events(),
            vec![PanoEvent::CameraPositionChange, PanoEvent::Returning]
        );
        assert!(c.tick(false));
        assert!(c.tick(false));
        assert_eq!(c.current().lat, 0.0);
        assert!(!c.tick(false));
        c.drain_events();
        assert!(!c.tick(false));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_tick_skips_zero_step_axis() {
        let mut c = controller();
        c.set_return_step(PartialOrientation { lat: Some(0.0), lon: None, fov: Some(0.0) })
            .unwrap();
        c.set_current(PartialOrientation { lat: Some(10.0), lon: Some(3.0), fov: Some(90.0) })
            .unwrap();
        for _ in 0..100 {
            c.tick(false);
        }
        assert_eq!(c.current(), Orientation::new(10.0, 0.0, 90.0));
    }

    #[test]
    fn test_tick_frozen_while_interacting_or_disabled() {
        let mut c = controller();
        c.set_current(PartialOrientation::lat(10.0)).unwrap();
        assert!(!c.tick(true));
        assert_eq!(c.current().lat, 10.0);

        c.set_auto_return(false);
        assert!(!c.tick(false));
        assert_eq!(c.current().lat, 10.0);
    }

    #[test]
    fn test_arm_return_is_one_shot() {
        let mut c = controller();
        c.set_auto_return(false);
        c.set_current(PartialOrientation::lat(2.0)).unwrap();
        c.arm_return();
        assert!(c.tick(false));
        assert!(c.tick(false));
        assert!(c.is_default_position());
        assert!(!c.is_returning());

        c.set_current(PartialOrientation::lat(2.0)).unwrap();
        assert!(!c.tick(false));
    }

    #[test]
    fn test_drag_from_is_absolute() {
        let mut c = controller();
        c.drag_from((0.0, 0.0), 5.0, 10.0).unwrap();
        c.drag_from((0.0, 0.0), 6.0, 12.0).unwrap();
        assert_eq!(c.current().lat, 6.0);
        assert_eq!(c.current().lon, 12.0);

        c.apply_gesture_delta(1.0, 1.0).unwrap();
        assert_eq!(c.current().lat, 7.0);
        assert_eq!(c.current().lon, 13.0);
    }

    #[test]
    fn test_direction_follows_current() {
        let mut c = controller();
        c.set_current(PartialOrientation::lon(90.0)).unwrap();
        let d = c.view_direction();
        assert!(d.x.abs() < 1e-2);
        assert!((d.z - SPHERE_RADIUS).abs() < 1e-2);
    }

    #[test]
    fn test_one_shot_disarms_when_only_frozen_axes_differ() {
        let mut c = controller();
        c.set_auto_return(false);
        c.set_return_step(PartialOrientation::lon(0.0)).unwrap();
        c.set_current(PartialOrientation { lat: Some(3.0), lon: Some(30.0), fov: None })
            .unwrap();
        c.arm_return();
        for _ in 0..10 {
            c.tick(false);
        }
        assert_eq!(c.current(), Orientation::new(0.0, 30.0, 75.0));
        assert!(!c.is_returning());

        c.set_current(PartialOrientation::lat(20.0)).unwrap();
        for _ in 0..5 {
            assert!(!c.tick(false));
        }
        assert_eq!(c.current().lat, 20.0);
    }

    #[test]
    fn test_arm_return_with_only_frozen_axes_is_noop() {
        let mut c = controller();
        c.set_auto_return(false);
        c.set_return_step(PartialOrientation::lon(0.0)).unwrap();
        c.set_current(PartialOrientation::lon(30.0)).unwrap();
        c.arm_return();
        assert!(!c.is_returning());
    }

    #[test]
    fn test_cancel_return_stops_one_shot() {
        let mut c = controller();
        c.set_auto_return(false);
        c.set_current(PartialOrientation::lat(5.0)).unwrap();
        c.arm_return();
        assert!(c.tick(false));
        c.cancel_return();
        assert!(!c.tick(false));
        assert_eq!(c.current().lat, 4.0);
    }
}
