use serde::{Deserialize, Serialize};

use super::Rgb;

/// Semantic slot of an IR code inside a [`DeviceCommandSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKey {
    DynamicIr,
    EnterDiy,
    Power,
    RedUp,
    RedDown,
    GreenUp,
    GreenDown,
    BlueUp,
    BlueDown,
}

/// Codes a light controller needs to realize one descriptor.
///
/// Every slot is always present; a code that could not be looked up is an
/// empty string so the device firmware can rely on a fixed shape.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommandSet {
    #[cfg_attr(feature = "docs", schema(value_type = Vec<u8>))]
    #[serde(rename = "rgbCode")]
    pub rgb_code: Rgb,
    #[serde(rename = "dynamicIr")]
    pub dynamic_ir: String,
    #[serde(rename = "enterDiy")]
    pub enter_diy: String,
    pub power: String,
    #[serde(rename = "rup")]
    pub r_up: String,
    #[serde(rename = "rdown")]
    pub r_down: String,
    #[serde(rename = "gup")]
    pub g_up: String,
    #[serde(rename = "gdown")]
    pub g_down: String,
    #[serde(rename = "bup")]
    pub b_up: String,
    #[serde(rename = "bdown")]
    pub b_down: String,
}

impl DeviceCommandSet {
    /// A command set targeting `rgb_code` with every code slot empty.
    pub fn empty(rgb_code: Rgb) -> Self {
        Self {
            rgb_code,
            ..Default::default()
        }
    }

    pub fn set_code(&mut self, key: CommandKey, code: String) {
        let slot = match key {
            CommandKey::DynamicIr => &mut self.dynamic_ir,
            CommandKey::EnterDiy => &mut self.enter_diy,
            CommandKey::Power => &mut self.power,
            CommandKey::RedUp => &mut self.r_up,
            CommandKey::RedDown => &mut self.r_down,
            CommandKey::GreenUp => &mut self.g_up,
            CommandKey::GreenDown => &mut self.g_down,
            CommandKey::BlueUp => &mut self.b_up,
            CommandKey::BlueDown => &mut self.b_down,
        };
        *slot = code;
    }
}
