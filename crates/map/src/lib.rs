//! Live station map: owns one map surface and keeps its tile layer, heat
//! layer, station markers and zone overlays in step with the latest
//! station list and selection.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod recording;
pub mod registry;
pub mod surface;

pub use config::*;
pub use error::*;
pub use lifecycle::*;
pub use surface::*;
