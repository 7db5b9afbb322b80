use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Rgb;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionCategory {
    Positive,
    Negative,
    Neutral,
}

impl EmotionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Positive => "Positive",
            EmotionCategory::Negative => "Negative",
            EmotionCategory::Neutral => "Neutral",
        }
    }
}

impl FromStr for EmotionCategory {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Positive" => Ok(EmotionCategory::Positive),
            "Negative" => Ok(EmotionCategory::Negative),
            "Neutral" => Ok(EmotionCategory::Neutral),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotion {
    /// Overall mood of the speaker
    pub main: EmotionCategory,
    /// Up to three finer grained emotions, strongest first
    pub subcategories: Vec<String>,
}

/// Firmware level animations understood by the IR controlled light.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DynamicEffect {
    Auto,
    Slow,
    Quick,
    Flash,
    Jump3,
    Jump7,
    Fade3,
    Fade7,
    Music1,
    Music2,
    Music3,
    Music4,
}

impl DynamicEffect {
    pub const ALL: [DynamicEffect; 12] = [
        DynamicEffect::Auto,
        DynamicEffect::Slow,
        DynamicEffect::Quick,
        DynamicEffect::Flash,
        DynamicEffect::Jump3,
        DynamicEffect::Jump7,
        DynamicEffect::Fade3,
        DynamicEffect::Fade7,
        DynamicEffect::Music1,
        DynamicEffect::Music2,
        DynamicEffect::Music3,
        DynamicEffect::Music4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DynamicEffect::Auto => "AUTO",
            DynamicEffect::Slow => "SLOW",
            DynamicEffect::Quick => "QUICK",
            DynamicEffect::Flash => "FLASH",
            DynamicEffect::Jump3 => "JUMP3",
            DynamicEffect::Jump7 => "JUMP7",
            DynamicEffect::Fade3 => "FADE3",
            DynamicEffect::Fade7 => "FADE7",
            DynamicEffect::Music1 => "MUSIC1",
            DynamicEffect::Music2 => "MUSIC2",
            DynamicEffect::Music3 => "MUSIC3",
            DynamicEffect::Music4 => "MUSIC4",
        }
    }

    /// Row of the IR code table holding this effect's code.
    pub fn row_id(&self) -> i32 {
        match self {
            DynamicEffect::Auto => 0,
            DynamicEffect::Slow => 1,
            DynamicEffect::Quick => 2,
            DynamicEffect::Flash => 3,
            DynamicEffect::Jump3 => 4,
            DynamicEffect::Jump7 => 5,
            DynamicEffect::Fade3 => 6,
            DynamicEffect::Fade7 => 7,
            DynamicEffect::Music1 => 8,
            DynamicEffect::Music2 => 9,
            DynamicEffect::Music3 => 10,
            DynamicEffect::Music4 => 11,
        }
    }
}

impl FromStr for DynamicEffect {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DynamicEffect::ALL
            .into_iter()
            .find(|effect| effect.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for DynamicEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSetting {
    /// Whether the light should be on
    pub power: bool,
    /// Static color, mutually exclusive with `dynamic` while powered
    #[cfg_attr(feature = "docs", schema(value_type = Option<Vec<u8>>))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    /// Named firmware animation
    #[serde(default, rename = "dynamic", skip_serializing_if = "Option::is_none")]
    pub dynamic_effect: Option<DynamicEffect>,
}

/// Structured lighting recommendation produced by the generation step.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingDescriptor {
    /// Short description of the situation the light is set for
    pub context: String,
    pub emotion: Emotion,
    pub light_setting: LightSetting,
    /// Text shown back to the user
    pub recommendation: String,
}
