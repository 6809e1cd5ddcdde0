use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MorphError;

/// World-space point reported by the pointer ray-caster.
pub type WorldPoint = Vec3;

/// Linear RGB color in [0, 1], written in config as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [f32; 3]);

impl Color {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::from(self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, MorphError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MorphError::InvalidConfig(format!("bad color `{}`", hex)));
        }
        let mut rgb = [0.0; 3];
        for (c, out) in rgb.iter_mut().enumerate() {
            let byte = u8::from_str_radix(&digits[c * 2..c * 2 + 2], 16)
                .map_err(|_| MorphError::InvalidConfig(format!("bad color `{}`", hex)))?;
            *out = byte as f32 / 255.0;
        }
        Ok(Self(rgb))
    }
}

impl TryFrom<String> for Color {
    type Error = MorphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        let [r, g, b] = c.0.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}
