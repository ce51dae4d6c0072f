pub mod axis;
pub mod interval;
pub mod renderer;

pub use axis::{Axis, AxisKind, ThumbDrag, ZoomConstraints};
pub use interval::{choose_grid_interval, BaseInterval, TimeUnit};
pub use renderer::{AxisOrientation, AxisRenderer, AxisView};
