use serde::{Deserialize, Serialize};

use crate::core::value::Color;
use crate::error::{SceneError, SceneResult};

fn ensure_finite(name: &str, value: f64) -> SceneResult<()> {
    if !value.is_finite() {
        return Err(SceneError::InvalidData(format!(
            "`{name}` must be finite, got {value}"
        )));
    }
    Ok(())
}

/// Draw command for one line segment in device space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Color,
    pub stroke_width: f64,
}

impl LinePrimitive {
    pub fn validate(&self) -> SceneResult<()> {
        for (name, value) in [
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
        ] {
            ensure_finite(name, value)?;
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(SceneError::InvalidData(
                "line stroke width must be finite and >= 0".to_owned(),
            ));
        }
        self.stroke.validate()
    }
}

/// Draw command for an axis-aligned filled/stroked rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl RectPrimitive {
    pub fn validate(&self) -> SceneResult<()> {
        for (name, value) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            ensure_finite(name, value)?;
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(SceneError::InvalidData(
                "rect size must be >= 0".to_owned(),
            ));
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one laid-out text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    pub fn validate(&self) -> SceneResult<()> {
        ensure_finite("x", self.x)?;
        ensure_finite("y", self.y)?;
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(SceneError::InvalidData(
                "text font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}
