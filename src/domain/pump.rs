// Pump domain model
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    On,
    Off,
}

impl PumpState {
    /// Value written to the ThingSpeak pump field.
    pub fn field_value(self) -> u8 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Interprets a stored pump field; only the literal `1` means on.
    pub fn from_field(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("1") => Self::On,
            _ => Self::Off,
        }
    }
}

/// Reads the requested pump state from a request body.
///
/// The first non-empty of `action`, `state` and `value` is used. Accepted
/// spellings are `ON`/`OFF` in any case and `1`/`0` as string or number;
/// anything else is rejected.
pub fn parse_pump_command(body: &Value) -> Option<PumpState> {
    let raw = ["action", "state", "value"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|value| is_truthy(value))
        .or_else(|| body.get("value"))?;

    match raw {
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "ON" | "1" => Some(PumpState::On),
            "OFF" | "0" => Some(PumpState::Off),
            _ => None,
        },
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(PumpState::On),
            Some(v) if v == 0.0 => Some(PumpState::Off),
            _ => None,
        },
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

pub const AUTO_ON_MOISTURE: f64 = 10.0;
pub const AUTO_OFF_MOISTURE: f64 = 80.0;

/// Automatic irrigation rule: switch on when the soil is at or below 10%
/// moisture, off at or above 80%. Returns the state to write, if any.
pub fn auto_pump_decision(soil_moisture: f64, current: PumpState) -> Option<PumpState> {
    if soil_moisture <= AUTO_ON_MOISTURE && current != PumpState::On {
        Some(PumpState::On)
    } else if soil_moisture >= AUTO_OFF_MOISTURE && current != PumpState::Off {
        Some(PumpState::Off)
    } else {
        None
    }
}
