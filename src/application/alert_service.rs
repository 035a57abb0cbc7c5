// Alert service - Threshold checks dispatched as one SMS
use crate::application::error::GatewayError;
use crate::application::gateways::SmsSender;
use crate::domain::alert::{AlertCheck, compose_sms};
use std::sync::Arc;

#[derive(Clone)]
pub struct AlertService {
    sms: Arc<dyn SmsSender>,
}

impl AlertService {
    pub fn new(sms: Arc<dyn SmsSender>) -> Self {
        Self { sms }
    }

    /// Evaluates the readings and texts the farmer when anything fired.
    /// Returns the number of alerts sent.
    pub async fn dispatch(&self, check: &AlertCheck) -> Result<usize, GatewayError> {
        let alerts = check.evaluate();
        if alerts.is_empty() {
            return Ok(0);
        }
        self.sms.send(&compose_sms(&alerts)).await?;
        tracing::info!(count = alerts.len(), "Alert SMS sent");
        Ok(alerts.len())
    }
}
