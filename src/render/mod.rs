mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

pub use crate::core::value::Color;

use crate::error::SceneResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from scene and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> SceneResult<()>;
}
