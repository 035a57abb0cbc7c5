// Threshold alerts for field sensors
use serde::Deserialize;

pub const MOISTURE_HIGH: &str =
    "CRITICAL: Soil moisture is too high (>80%). Risk of root rot. Stop watering immediately.";
pub const MOISTURE_LOW: &str = "ALERT: Soil moisture is low (<20%). Crops need water immediately.";
pub const TEMPERATURE_HIGH: &str =
    "WARNING: High temperature detected (>35°C). Ensure adequate irrigation.";
pub const TEMPERATURE_LOW: &str =
    "WARNING: Low temperature detected (<10°C). Protect crops from frost.";
pub const HUMIDITY_LOW: &str = "WARNING: Low humidity (<30%). Risk of dehydration.";
pub const HUMIDITY_HIGH: &str = "WARNING: High humidity (>90%). Risk of fungal diseases.";
pub const NITROGEN_LOW: &str = "ALERT: Nitrogen levels are critically low. Consider fertilization.";
pub const PHOSPHORUS_LOW: &str = "ALERT: Phosphorus levels are critically low.";
pub const POTASSIUM_LOW: &str = "ALERT: Potassium levels are critically low.";

const SMS_PREFIX: &str = "Bhoomi Dut Alert:";

/// Latest readings submitted for an alert check. Every field is optional;
/// absent readings are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCheck {
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
}

impl AlertCheck {
    /// Messages for every crossed threshold, in a fixed order.
    pub fn evaluate(&self) -> Vec<&'static str> {
        let mut alerts = Vec::new();

        if let Some(moisture) = self.soil_moisture {
            if moisture > 80.0 {
                alerts.push(MOISTURE_HIGH);
            } else if moisture < 20.0 {
                alerts.push(MOISTURE_LOW);
            }
        }

        if let Some(temperature) = self.temperature {
            if temperature > 35.0 {
                alerts.push(TEMPERATURE_HIGH);
            } else if temperature < 10.0 {
                alerts.push(TEMPERATURE_LOW);
            }
        }

        if let Some(humidity) = self.humidity {
            if humidity < 30.0 {
                alerts.push(HUMIDITY_LOW);
            } else if humidity > 90.0 {
                alerts.push(HUMIDITY_HIGH);
            }
        }

        if self.nitrogen.is_some_and(|n| n < 20.0) {
            alerts.push(NITROGEN_LOW);
        }
        if self.phosphorus.is_some_and(|p| p < 20.0) {
            alerts.push(PHOSPHORUS_LOW);
        }
        if self.potassium.is_some_and(|k| k < 20.0) {
            alerts.push(POTASSIUM_LOW);
        }

        alerts
    }
}

/// Joins alerts into the single SMS body sent to the farmer.
pub fn compose_sms(alerts: &[&str]) -> String {
    format!("{}\n{}", SMS_PREFIX, alerts.join("\n"))
}
