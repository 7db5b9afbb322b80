use std::sync::Arc;

use futures::future::join_all;
use lumiglow_api::models::{CommandKey, DeviceCommandSet, LightingDescriptor, Rgb};

use crate::services::IrCodeLookup;

const POWER_ROW: i32 = 18;
const ENTER_DIY_ROW: i32 = 19;

/// Rows used to steer a static color: channel nudges, power and DIY mode.
const STATIC_CONTROL_ROWS: [(CommandKey, i32); 8] = [
    (CommandKey::RedUp, 12),
    (CommandKey::RedDown, 13),
    (CommandKey::GreenUp, 14),
    (CommandKey::GreenDown, 15),
    (CommandKey::BlueUp, 16),
    (CommandKey::BlueDown, 17),
    (CommandKey::Power, POWER_ROW),
    (CommandKey::EnterDiy, ENTER_DIY_ROW),
];

const BLACK: Rgb = [0, 0, 0];

/// Turns a validated descriptor into the IR codes for one device type.
#[derive(Clone)]
pub struct CommandResolver {
    lookup: Arc<dyn IrCodeLookup>,
}

impl CommandResolver {
    pub fn new(lookup: Arc<dyn IrCodeLookup>) -> Self {
        Self { lookup }
    }

    /// Never fails: a code that cannot be fetched is left empty so a
    /// missing IR row can't block delivery or persistence.
    pub async fn resolve(
        &self,
        descriptor: &LightingDescriptor,
        device_type: &str,
    ) -> DeviceCommandSet {
        let setting = &descriptor.light_setting;

        let (rgb_code, rows) = if !setting.power {
            (BLACK, STATIC_CONTROL_ROWS.to_vec())
        } else if let Some(color) = setting.color {
            (color, STATIC_CONTROL_ROWS.to_vec())
        } else if let Some(effect) = setting.dynamic_effect {
            (
                BLACK,
                vec![
                    (CommandKey::DynamicIr, effect.row_id()),
                    (CommandKey::Power, POWER_ROW),
                    (CommandKey::EnterDiy, ENTER_DIY_ROW),
                ],
            )
        } else {
            tracing::error!("descriptor is powered on without a color or effect");
            return DeviceCommandSet::empty(BLACK);
        };

        let lookups = rows.into_iter().map(|(key, row_id)| async move {
            (key, self.fetch(device_type, row_id).await)
        });

        let mut commands = DeviceCommandSet::empty(rgb_code);
        for (key, code) in join_all(lookups).await {
            commands.set_code(key, code);
        }

        commands
    }

    async fn fetch(&self, device_type: &str, row_id: i32) -> String {
        match self.lookup.get_code(device_type, row_id).await {
            Ok(Some(code)) => code,
            Ok(None) => {
                tracing::warn!(device_type, row_id, "IR code not found");
                String::new()
            }
            Err(e) => {
                tracing::error!(device_type, row_id, "failed to fetch IR code: {}", e);
                String::new()
            }
        }
    }
}
