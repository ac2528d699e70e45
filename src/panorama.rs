// panorama.rs — 视角参数 (orientation, bounds, return steps)
//
// All angles here are degrees. Radians only appear in util::to_direction and
// in the renderer's GPU uniform.

use crate::error::{PanoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Lat,
    Lon,
    Fov,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Lat, Axis::Lon, Axis::Fov];

    pub fn name(self) -> &'static str {
        match self {
            Axis::Lat => "latitude",
            Axis::Lon => "longitude",
            Axis::Fov => "fov",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// View direction and zoom: `lat` is pitch above the horizon, `lon` is yaw,
/// `fov` the vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub lat: f32,
    pub lon: f32,
    pub fov: f32,
}

impl Orientation {
    pub fn new(lat: f32, lon: f32, fov: f32) -> Self {
        Self { lat, lon, fov }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Lat => self.lat,
            Axis::Lon => self.lon,
            Axis::Fov => self.fov,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Lat => self.lat = value,
            Axis::Lon => self.lon = value,
            Axis::Fov => self.fov = value,
        }
    }
}

/// Setter argument of every accessor. `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialOrientation {
    pub lat: Option<f32>,
    pub lon: Option<f32>,
    pub fov: Option<f32>,
}

impl PartialOrientation {
    pub fn lat(lat: f32) -> Self {
        Self { lat: Some(lat), ..Default::default() }
    }

    pub fn lon(lon: f32) -> Self {
        Self { lon: Some(lon), ..Default::default() }
    }

    pub fn fov(fov: f32) -> Self {
        Self { fov: Some(fov), ..Default::default() }
    }

    pub fn get(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Lat => self.lat,
            Axis::Lon => self.lon,
            Axis::Fov => self.fov,
        }
    }

    /// Provided fields in axis order.
    pub fn fields(&self) -> impl Iterator<Item = (Axis, f32)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|v| (axis, v)))
    }

    /// Rejects NaN in any provided field before anything is applied.
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in self.fields() {
            if value.is_nan() {
                return Err(PanoError::InvalidInput { field: axis.name() });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_none() && self.lon.is_none() && self.fov.is_none()
    }
}

impl From<Orientation> for PartialOrientation {
    fn from(o: Orientation) -> Self {
        Self { lat: Some(o.lat), lon: Some(o.lon), fov: Some(o.fov) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Orientation,
    pub max: Orientation,
}

impl Bounds {
    pub fn range(&self, axis: Axis) -> (f32, f32) {
        (self.min.get(axis), self.max.get(axis))
    }

    pub fn contains(&self, o: &Orientation) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            let (min, max) = self.range(axis);
            let v = o.get(axis);
            min <= v && v <= max
        })
    }

    /// Checks that applying `min`/`max` to `axis` keeps `min <= max`; an
    /// absent side is checked against the existing one.
    pub fn check(&self, axis: Axis, min: Option<f32>, max: Option<f32>) -> Result<(f32, f32)> {
        for value in [min, max].into_iter().flatten() {
            if value.is_nan() {
                return Err(PanoError::InvalidInput { field: axis.name() });
            }
        }
        let (cur_min, cur_max) = self.range(axis);
        let new_min = min.unwrap_or(cur_min);
        let new_max = max.unwrap_or(cur_max);
        if new_min > new_max {
            return Err(PanoError::BoundsViolation { axis, min: new_min, max: new_max });
        }
        Ok((new_min, new_max))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Orientation::new(-85.0, f32::NEG_INFINITY, 50.0),
            max: Orientation::new(85.0, f32::INFINITY, 100.0),
        }
    }
}

/// Per-frame auto-return speed in degrees. Zero freezes that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStep {
    pub lat: f32,
    pub lon: f32,
    pub fov: f32,
}

impl ReturnStep {
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Lat => self.lat,
            Axis::Lon => self.lon,
            Axis::Fov => self.fov,
        }
    }

    pub fn as_orientation(&self) -> Orientation {
        Orientation::new(self.lat, self.lon, self.fov)
    }
}

impl Default for ReturnStep {
    fn default() -> Self {
        Self { lat: 1.0, lon: 1.0, fov: 1.0 }
    }
}
