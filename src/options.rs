// options.rs — plugin configuration
//
// `PanoOptions` is the loose bag a host hands over (JSON keys in camelCase);
// `normalize` turns it into an owned, validated `PanoConfig`.

use crate::error::{PanoError, Result};
use crate::panorama::{Axis, Bounds, Orientation, ReturnStep};
use crate::util;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Facts about the device the host has detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub is_mobile: bool,
    pub is_ios: bool,
    /// Whether the renderer can do accelerated 3D; without it the video is
    /// played flat.
    pub accelerated_3d: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self { is_mobile: false, is_ios: false, accelerated_3d: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanoOptions {
    pub init_fov: f32,
    pub init_lon: f32,
    pub init_lat: f32,

    pub max_fov: f32,
    pub min_fov: f32,
    pub min_lat: f32,
    pub max_lat: f32,
    /// `None` is unbounded.
    pub min_lon: Option<f32>,
    pub max_lon: Option<f32>,

    pub return_step_lat: f32,
    pub return_step_lon: f32,
    pub return_step_fov: f32,

    /// Defaults to enabled unless the platform is mobile.
    pub auto_back_to_default: Option<bool>,
    #[serde(rename = "isIOS")]
    pub is_ios: Option<bool>,
}

impl Default for PanoOptions {
    fn default() -> Self {
        Self {
            init_fov: 75.0,
            init_lon: 0.0,
            init_lat: 0.0,
            max_fov: 100.0,
            min_fov: 50.0,
            min_lat: -85.0,
            max_lat: 85.0,
            min_lon: None,
            max_lon: None,
            return_step_lat: 1.0,
            return_step_lon: 1.0,
            return_step_fov: 1.0,
            auto_back_to_default: None,
            is_ios: None,
        }
    }
}

/// Validated configuration owned by the player shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanoConfig {
    pub init: Orientation,
    pub bounds: Bounds,
    pub return_step: ReturnStep,
    pub auto_back_to_default: bool,
    pub is_ios: bool,
}

impl PanoOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PanoError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    fn numbers(&self) -> [(&'static str, f32); 12] {
        [
            ("initFov", self.init_fov),
            ("initLon", self.init_lon),
            ("initLat", self.init_lat),
            ("maxFov", self.max_fov),
            ("minFov", self.min_fov),
            ("minLat", self.min_lat),
            ("maxLat", self.max_lat),
            ("minLon", self.min_lon.unwrap_or(f32::NEG_INFINITY)),
            ("maxLon", self.max_lon.unwrap_or(f32::INFINITY)),
            ("returnStepLat", self.return_step_lat),
            ("returnStepLon", self.return_step_lon),
            ("returnStepFov", self.return_step_fov),
        ]
    }

    pub fn normalize(&self, platform: &Platform) -> Result<PanoConfig> {
        for (field, value) in self.numbers() {
            if value.is_nan() {
                return Err(PanoError::InvalidInput { field });
            }
        }

        let bounds = Bounds {
            min: Orientation::new(
                self.min_lat,
                self.min_lon.unwrap_or(f32::NEG_INFINITY),
                self.min_fov,
            ),
            max: Orientation::new(
                self.max_lat,
                self.max_lon.unwrap_or(f32::INFINITY),
                self.max_fov,
            ),
        };
        for axis in Axis::ALL {
            bounds.check(axis, None, None)?;
        }

        let raw = Orientation::new(self.init_lat, self.init_lon, self.init_fov);
        let mut init = raw;
        for axis in Axis::ALL {
            let (min, max) = bounds.range(axis);
            init.set(axis, util::clamp(raw.get(axis), min, max)?);
        }

        Ok(PanoConfig {
            init,
            bounds,
            return_step: ReturnStep {
                lat: self.return_step_lat,
                lon: self.return_step_lon,
                fov: self.return_step_fov,
            },
            auto_back_to_default: self.auto_back_to_default.unwrap_or(!platform.is_mobile),
            is_ios: self.is_ios.unwrap_or(platform.is_ios),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PanoOptions::default().normalize(&Platform::default()).unwrap();
        assert_eq!(cfg.init, Orientation::new(0.0, 0.0, 75.0));
        assert_eq!(cfg.bounds, Bounds::default());
        assert_eq!(cfg.return_step, ReturnStep::default());
        assert!(cfg.auto_back_to_default);
        assert!(!cfg.is_ios);
    }

    #[test]
    fn test_mobile_disables_auto_return_by_default() {
        let mobile = Platform { is_mobile: true, is_ios: true, accelerated_3d: true };
        let cfg = PanoOptions::default().normalize(&mobile).unwrap();
        assert!(!cfg.auto_back_to_default);
        assert!(cfg.is_ios);

        let opts = PanoOptions { auto_back_to_default: Some(true), ..Default::default() };
        assert!(opts.normalize(&mobile).unwrap().auto_back_to_default);
    }

    #[test]
    fn test_json_bag_is_camel_case_and_partial() {
        let opts = PanoOptions::from_json(
            r#"{ "initFov": 200, "minLon": -90, "maxLon": null, "isIOS": true, "returnStepLon": 0 }"#,
        )
        .unwrap();
        assert_eq!(opts.min_lon, Some(-90.0));
        assert_eq!(opts.max_lon, None);
        assert_eq!(opts.is_ios, Some(true));

        let cfg = opts.normalize(&Platform::default()).unwrap();
        // init clamped to bounds at load
        assert_eq!(cfg.init.fov, 100.0);
        assert_eq!(cfg.bounds.max.lon, f32::INFINITY);
        assert_eq!(cfg.return_step.lon, 0.0);
        assert!(cfg.is_ios);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let opts = PanoOptions { min_lat: 10.0, max_lat: -10.0, ..Default::default() };
        assert!(matches!(
            opts.normalize(&Platform::default()),
            Err(PanoError::BoundsViolation { axis: Axis::Lat, .. })
        ));
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(PanoOptions::from_json("{ initFov: }"), Err(PanoError::Config(_))));
    }
}
