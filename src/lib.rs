//! chart-scene: settings-driven reactive scene graph for interactive charts.
//!
//! Every visual property is a setting in a per-entity store with dirty
//! tracking; a frame-driven scheduler settles changes through a fixed
//! entity lifecycle, and axes map a clamped zoom window onto pooled,
//! virtualized scene elements.

pub mod axis;
pub mod component;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod snapshot;
pub mod telemetry;
pub mod theme;

pub use error::{SceneError, SceneResult};
pub use scene::{NodeId, Root};
