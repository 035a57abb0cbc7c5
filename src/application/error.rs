// Error type shared by services and outbound adapters
const MAX_ERROR_BODY: usize = 500;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),
    /// Upstream answered with a failure status; rendered as 502.
    #[error("{service} error {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },
    /// Upstream failure whose status is handed back to the caller unchanged.
    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },
    #[error("Rate limited by {service}")]
    RateLimited { service: &'static str },
    #[error("{0}")]
    NoData(String),
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn upstream(service: &'static str, status: u16, body: &str) -> Self {
        Self::Upstream {
            service,
            status,
            body: truncate(body),
        }
    }

    pub fn passthrough(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            message: truncate(&message.into()),
        }
    }
}

/// Caps an upstream body at 500 characters before it reaches a client.
pub fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_body_is_truncated() {
        let body = "x".repeat(800);
        let err = GatewayError::upstream("Omnidim", 503, &body);
        let GatewayError::Upstream { body, .. } = &err else {
            panic!("expected upstream error");
        };
        assert_eq!(body.len(), 500);
        assert!(err.to_string().starts_with("Omnidim error 503: xxx"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "ক".repeat(600);
        assert_eq!(truncate(&body).chars().count(), 500);
    }
}
