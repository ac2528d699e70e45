// lib.rs — 360° video viewer core
//
// Framework-agnostic pieces of the panorama player: orientation state and its
// bounds, gesture handling, the per-frame driver and the host-facing shell.
// Rendering and the host player live behind `PlayerHost` / `FrameScheduler`.

pub mod controller;
pub mod error;
pub mod gesture;
pub mod i18n;
pub mod options;
pub mod panorama;
pub mod plugin;
pub mod render_loop;
pub mod return_button;
pub mod util;

pub use controller::{OrientationController, PanoEvent, ViewState, SPHERE_RADIUS};
pub use error::{PanoError, Result};
pub use gesture::{GestureInterpreter, InteractionState, DRAG_SPEED};
pub use options::{PanoConfig, PanoOptions, Platform};
pub use panorama::{Axis, Bounds, Orientation, PartialOrientation, ReturnStep};
pub use plugin::{Canvas, HostEvent, Notice, NoticeBehavior, PanoPlayer, PlayerHost};
pub use render_loop::{FrameHandle, FrameScheduler, RenderLoop};
pub use return_button::{ReturnButton, ReturnButtonStyle};
pub use util::{Point, WheelAxis, WheelEvent};
