pub mod animation;
pub mod layout;
pub mod node;
pub mod root;

pub use animation::{Animation, Easing};
pub use layout::{Layout, LayoutChild, LayoutPlacement};
pub use node::{Node, NodeId, NodeKind};
pub use root::{Root, SchedulerPhase};
