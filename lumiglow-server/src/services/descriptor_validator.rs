//! Parsing and cross-field validation of generated lighting descriptors.

use lumiglow_api::models::{
    DynamicEffect, Emotion, EmotionCategory, LightSetting, LightingDescriptor, Rgb,
};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

const REQUIRED_FIELDS: [&str; 4] = ["context", "emotion", "lightSetting", "recommendation"];

/// Key the effect is stored under after normalization.
const EFFECT_KEY: &str = "dynamic";

/// Older generations used these names for the effect field.
const LEGACY_EFFECT_KEYS: [&str; 2] = ["dynamicMode", "dynamicEffect"];

const MAX_SUBCATEGORIES: usize = 3;

/// Parses model output into a descriptor.
///
/// Color channels given as strings are coerced to integers and a legacy
/// effect key is renamed before the typed descriptor is built. Pure: no I/O.
pub fn validate(raw: &str) -> Result<LightingDescriptor, ValidationError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|_| ValidationError::MalformedJson)?;

    validate_value(value)
}

/// Same as [`validate`] for a descriptor that already arrived as JSON.
pub fn validate_value(mut value: Value) -> Result<LightingDescriptor, ValidationError> {
    let root = value.as_object_mut().ok_or(ValidationError::MalformedJson)?;

    for field in REQUIRED_FIELDS {
        if root.get(field).is_none_or(Value::is_null) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let light_setting = root
        .get_mut("lightSetting")
        .and_then(Value::as_object_mut)
        .ok_or(ValidationError::InvalidField("lightSetting"))?;
    normalize_effect_key(light_setting);
    let light_setting = validate_light_setting(light_setting)?;

    let emotion = validate_emotion(&root["emotion"])?;

    let context = root["context"]
        .as_str()
        .ok_or(ValidationError::InvalidField("context"))?
        .to_string();
    let recommendation = root["recommendation"]
        .as_str()
        .ok_or(ValidationError::InvalidField("recommendation"))?
        .to_string();

    Ok(LightingDescriptor {
        context,
        emotion,
        light_setting,
        recommendation,
    })
}

fn normalize_effect_key(setting: &mut Map<String, Value>) {
    for legacy in LEGACY_EFFECT_KEYS {
        if let Some(effect) = setting.remove(legacy) {
            if setting.get(EFFECT_KEY).is_none_or(Value::is_null) {
                setting.insert(EFFECT_KEY.to_string(), effect);
            }
        }
    }
}

fn validate_light_setting(setting: &mut Map<String, Value>) -> Result<LightSetting, ValidationError> {
    // The resolver treats a missing power flag as "on", so validation does too.
    let power = match setting.get("power") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(power)) => *power,
        Some(_) => return Err(ValidationError::InvalidField("lightSetting.power")),
    };

    let color = setting.get("color").filter(|v| !v.is_null());
    let effect = setting.get(EFFECT_KEY).filter(|v| !v.is_null());

    let (color, dynamic_effect) = if power {
        match (color, effect) {
            (Some(color), None) => (Some(parse_color(color)?), None),
            (None, Some(effect)) => (None, Some(parse_effect(effect)?)),
            _ => return Err(ValidationError::AmbiguousLightMode),
        }
    } else {
        // A powered-off light ignores both fields; keep whatever is usable.
        let color = color.and_then(|color| match parse_color(color) {
            Ok(rgb) => Some(rgb),
            Err(e) => {
                tracing::warn!("dropping color of powered off descriptor: {}", e);
                None
            }
        });
        let dynamic_effect = effect.and_then(|effect| match parse_effect(effect) {
            Ok(effect) => Some(effect),
            Err(e) => {
                tracing::warn!("dropping effect of powered off descriptor: {}", e);
                None
            }
        });
        (color, dynamic_effect)
    };

    match color {
        Some(rgb) => {
            setting.insert("color".to_string(), Value::from(rgb.to_vec()));
        }
        None => {
            setting.remove("color");
        }
    }

    Ok(LightSetting {
        power,
        color,
        dynamic_effect,
    })
}

fn parse_color(value: &Value) -> Result<Rgb, ValidationError> {
    let channels = value.as_array().ok_or(ValidationError::InvalidColor)?;
    if channels.len() != 3 {
        return Err(ValidationError::InvalidColor);
    }

    let mut rgb = [0u8; 3];
    for (slot, channel) in rgb.iter_mut().zip(channels) {
        let number = match channel {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };

        *slot = number
            .and_then(|n| u8::try_from(n).ok())
            .ok_or(ValidationError::InvalidColor)?;
    }

    Ok(rgb)
}

fn parse_effect(value: &Value) -> Result<DynamicEffect, ValidationError> {
    match value {
        Value::String(name) => name
            .parse()
            .map_err(|_| ValidationError::UnknownEffect(name.clone())),
        other => Err(ValidationError::UnknownEffect(other.to_string())),
    }
}

fn validate_emotion(value: &Value) -> Result<Emotion, ValidationError> {
    let main = value
        .get("main")
        .and_then(Value::as_str)
        .and_then(|main| main.parse::<EmotionCategory>().ok())
        .ok_or(ValidationError::InvalidField("emotion.main"))?;

    let subcategories = value
        .get("subcategories")
        .and_then(Value::as_array)
        .filter(|items| items.len() <= MAX_SUBCATEGORIES)
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or(ValidationError::InvalidField("emotion.subcategories"))?;

    Ok(Emotion {
        main,
        subcategories,
    })
}
