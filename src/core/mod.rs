pub mod disposer;
pub mod list;
pub mod settings;
pub mod types;
pub mod value;

pub use disposer::{Dispose, Disposer, DisposerBin, MultiDisposer};
pub use list::{List, ListAutoDispose, ListEvent, ListEventKind, ListTemplate};
pub use settings::{SettingChange, SettingKey, SettingsStore, Template};
pub use types::{Bounds, Point, Viewport};
pub use value::{percent, Color, Percent, PositionMode, SettingValue, Size, P0, P100, P50};
