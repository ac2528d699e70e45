// util.rs — 几何/数学工具 (pure helpers shared by controller and gestures)

use crate::error::{PanoError, Result};
use glam::Vec3;

/// A pointer or touch position in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Missing or non-finite coordinates make the event unusable.
    pub fn from_coords(x: Option<f32>, y: Option<f32>) -> Option<Self> {
        match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Self { x, y }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAxis {
    Horizontal,
    Vertical,
}

/// Raw scroll event. Hosts fill whichever legacy fields their platform
/// reports; `normalize_wheel` folds them into one value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    /// Line count, positive when scrolling down.
    pub detail: Option<f32>,
    /// 120 per notch, positive when scrolling up.
    pub wheel_delta: Option<f32>,
    pub wheel_delta_y: Option<f32>,
    pub axis: Option<WheelAxis>,
}

impl WheelEvent {
    pub fn from_delta_y(wheel_delta_y: f32) -> Self {
        Self { wheel_delta_y: Some(wheel_delta_y), ..Default::default() }
    }
}

/// Look-at target on a sphere of `radius` for the given view angles.
pub fn to_direction(lat: f32, lon: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = lon.to_radians();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of `to_direction`, returns `(lat, lon)` in degrees.
pub fn from_direction(dir: Vec3) -> (f32, f32) {
    let r = dir.length();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let phi = (dir.y / r).clamp(-1.0, 1.0).acos();
    let theta = dir.z.atan2(dir.x);
    (90.0 - phi.to_degrees(), theta.to_degrees())
}

pub fn clamp(value: f32, min: f32, max: f32) -> Result<f32> {
    if value.is_nan() {
        return Err(PanoError::InvalidInput { field: "camera position" });
    }
    Ok(min.max(max.min(value)))
}

/// Moves `current` by `|step|` toward `target`, snapping when closer than a
/// step. Callers skip the axis when `step == 0`.
pub fn step_toward(current: f32, target: f32, step: f32) -> f32 {
    let step = step.abs();
    if (current - target).abs() < step {
        target
    } else if current < target {
        current + step
    } else {
        current - step
    }
}

pub fn pointer_delta(a: Point, b: Point) -> (f32, f32) {
    (b.x - a.x, b.y - a.y)
}

/// Distance between the first two touches, `None` with fewer than two.
pub fn pinch_distance(touches: &[Point]) -> Option<f32> {
    match touches {
        [a, b, ..] => Some(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()),
        _ => None,
    }
}

/// Later legacy fields win: `detail`, then `wheel_delta`, then
/// `wheel_delta_y`. Horizontal scrolling is 0.
pub fn normalize_wheel(event: &WheelEvent) -> f32 {
    if event.axis == Some(WheelAxis::Horizontal) {
        return 0.0;
    }
    let mut sy = 0.0;
    if let Some(detail) = event.detail {
        sy = detail;
    }
    if let Some(delta) = event.wheel_delta {
        sy = -delta / 100.0;
    }
    if let Some(delta_y) = event.wheel_delta_y {
        sy = -delta_y / 100.0;
    }
    if sy.is_finite() {
        sy
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_at_horizon() {
        let d = to_direction(0.0, 0.0, 500.0);
        assert!((d.x - 500.0).abs() < 1e-3);
        assert!(d.y.abs() < 1e-3);
        assert!(d.z.abs() < 1e-3);

        let d = to_direction(0.0, 90.0, 1.0);
        assert!(d.x.abs() < 1e-5);
        assert!((d.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_direction_straight_up() {
        let d = to_direction(90.0, 30.0, 2.0);
        assert!((d.y - 2.0).abs() < 1e-5);
        assert!(d.x.abs() < 1e-5 && d.z.abs() < 1e-5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(120.0, 50.0, 100.0), Ok(100.0));
        assert_eq!(clamp(10.0, 50.0, 100.0), Ok(50.0));
        assert_eq!(clamp(1e9, f32::NEG_INFINITY, f32::INFINITY), Ok(1e9));
        assert!(matches!(clamp(f32::NAN, 0.0, 1.0), Err(PanoError::InvalidInput { .. })));
    }

    #[test]
    fn test_step_toward_snaps_and_moves() {
        assert_eq!(step_toward(10.0, 0.0, 1.0), 9.0);
        assert_eq!(step_toward(-10.0, 0.0, 1.0), -9.0);
        assert_eq!(step_toward(0.5, 0.0, 1.0), 0.0);
        // negative steps move by magnitude
        assert_eq!(step_toward(10.0, 0.0, -2.0), 8.0);
        assert_eq!(step_toward(3.0, 3.0, 1.0), 3.0);
    }

    #[test]
    fn test_pinch_distance() {
        let touches = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        assert_eq!(pinch_distance(&touches), Some(5.0));
        assert_eq!(pinch_distance(&touches[..1]), None);
        assert_eq!(pointer_delta(touches[0], touches[1]), (3.0, 4.0));
    }

    #[test]
    fn test_normalize_wheel_precedence() {
        let ev = WheelEvent { detail: Some(3.0), ..Default::default() };
        assert_eq!(normalize_wheel(&ev), 3.0);

        let ev = WheelEvent { detail: Some(3.0), wheel_delta: Some(120.0), ..Default::default() };
        assert_eq!(normalize_wheel(&ev), -1.2);

        let ev = WheelEvent {
            wheel_delta: Some(120.0),
            wheel_delta_y: Some(-240.0),
            ..Default::default()
        };
        assert_eq!(normalize_wheel(&ev), 2.4);
    }

    #[test]
    fn test_normalize_wheel_horizontal_is_zero() {
        let ev = WheelEvent {
            detail: Some(3.0),
            axis: Some(WheelAxis::Horizontal),
            ..Default::default()
        };
        assert_eq!(normalize_wheel(&ev), 0.0);
        assert_eq!(normalize_wheel(&WheelEvent::default()), 0.0);
    }

    #[test]
    fn test_point_from_missing_coords() {
        assert_eq!(Point::from_coords(Some(1.0), None), None);
        assert_eq!(Point::from_coords(Some(f32::NAN), Some(1.0)), None);
        assert_eq!(Point::from_coords(Some(1.0), Some(2.0)), Some(Point::new(1.0, 2.0)));
    }
}
