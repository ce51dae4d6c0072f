use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Relative size expressed on a 0..=100 scale, like CSS percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percent(pub f64);

#[must_use]
pub const fn percent(value: f64) -> Percent {
    Percent(value)
}

pub const P0: Percent = Percent(0.0);
pub const P50: Percent = Percent(50.0);
pub const P100: Percent = Percent(100.0);

impl Percent {
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> SceneResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SceneError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Length that is either absolute (device units) or a percent of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Size {
    Absolute(f64),
    Relative(Percent),
}

impl Size {
    #[must_use]
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Size::Absolute(value) => value,
            Size::Relative(percent) => reference * percent.fraction(),
        }
    }
}

impl From<f64> for Size {
    fn from(value: f64) -> Self {
        Size::Absolute(value)
    }
}

impl From<Percent> for Size {
    fn from(value: Percent) -> Self {
        Size::Relative(value)
    }
}

/// Whether a sprite participates in its container's flow layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionMode {
    Relative,
    Absolute,
}

/// Closed set of value shapes a setting can hold.
///
/// The `Json` variant exists for the serialization boundary only; internal
/// code paths use the typed variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Float(f64),
    Bool(bool),
    Text(String),
    Color(Color),
    Percent(Percent),
    Size(Size),
    Position(PositionMode),
    Json(serde_json::Value),
}

impl SettingValue {
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            SettingValue::Color(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_percent(&self) -> Option<Percent> {
        match self {
            SettingValue::Percent(value) => Some(*value),
            _ => None,
        }
    }

    /// Size view of the value. Bare floats read as absolute sizes and bare
    /// percents as relative sizes, so `set(Height, 30.0)` and
    /// `set(Height, percent(50))` both work.
    #[must_use]
    pub fn as_size(&self) -> Option<Size> {
        match self {
            SettingValue::Size(value) => Some(*value),
            SettingValue::Float(value) => Some(Size::Absolute(*value)),
            SettingValue::Percent(value) => Some(Size::Relative(*value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_position(&self) -> Option<PositionMode> {
        match self {
            SettingValue::Position(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Color> for SettingValue {
    fn from(value: Color) -> Self {
        SettingValue::Color(value)
    }
}

impl From<Percent> for SettingValue {
    fn from(value: Percent) -> Self {
        SettingValue::Percent(value)
    }
}

impl From<Size> for SettingValue {
    fn from(value: Size) -> Self {
        SettingValue::Size(value)
    }
}

impl From<PositionMode> for SettingValue {
    fn from(value: PositionMode) -> Self {
        SettingValue::Position(value)
    }
}
