// Call service - Outbound voice-agent calls through Omnidim
use crate::application::error::GatewayError;
use crate::application::gateways::CallDispatcher;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CallService {
    dispatcher: Arc<dyn CallDispatcher>,
}

impl CallService {
    pub fn new(dispatcher: Arc<dyn CallDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Starts a call to `to`. Configuration is checked before the number.
    pub async fn call(&self, to: Option<&str>, call_context: Option<Value>) -> Result<Value, GatewayError> {
        if !self.dispatcher.is_configured() {
            return Err(GatewayError::Config("Missing Omnidim API configuration".to_string()));
        }
        let to = to
            .filter(|number| !number.trim().is_empty())
            .ok_or_else(|| GatewayError::BadRequest("Missing destination phone number".to_string()))?;
        self.dispatcher.dispatch(to, call_context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct StubDispatcher {
        configured: bool,
    }

    #[async_trait]
    impl CallDispatcher for StubDispatcher {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn dispatch(&self, to: &str, _call_context: Option<Value>) -> Result<Value, GatewayError> {
            Ok(json!({"to": to}))
        }
    }

    #[tokio::test]
    async fn test_missing_config_wins_over_missing_number() {
        let service = CallService::new(Arc::new(StubDispatcher { configured: false }));
        let result = service.call(None, None).await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_number() {
        let service = CallService::new(Arc::new(StubDispatcher { configured: true }));
        assert!(matches!(service.call(Some(" "), None).await, Err(GatewayError::BadRequest(_))));
        assert_eq!(service.call(Some("+911234"), None).await.unwrap(), json!({"to": "+911234"}));
    }
}
