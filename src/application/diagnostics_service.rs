// Diagnostics service - Gemini key and model health checks
use crate::application::gateways::{ModelDiagnostics, ProbeOutcome};
use crate::application::error::truncate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const NETWORK_HINT: &str = "Network error. Check firewall/VPN/corporate proxy.";
const MAX_LISTED_MODELS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiagnosticsReport {
    #[serde(rename_all = "camelCase")]
    MissingKey {
        ok: bool,
        message: &'static str,
        looked_for: [&'static str; 2],
    },
    #[serde(rename_all = "camelCase")]
    Checked {
        ok: bool,
        diagnosis: &'static str,
        api_key_redacted: String,
        project_id: Option<String>,
        checks: Vec<CheckResult>,
    },
}

#[derive(Clone)]
pub struct DiagnosticsService {
    diagnostics: Arc<dyn ModelDiagnostics>,
}

impl DiagnosticsService {
    pub fn new(diagnostics: Arc<dyn ModelDiagnostics>) -> Self {
        Self { diagnostics }
    }

    pub async fn run(&self) -> DiagnosticsReport {
        let Some(api_key) = self.diagnostics.api_key().filter(|k| !k.is_empty()) else {
            return DiagnosticsReport::MissingKey {
                ok: false,
                message: "Missing API key for Balaram AI (Gemini).",
                looked_for: ["gemini.api_key", "FARM__GEMINI__API_KEY"],
            };
        };

        let listing = self.diagnostics.list_models().await;
        let ping = self.diagnostics.ping(self.diagnostics.target_model()).await;
        let checks = vec![
            check("List Models", listing, list_hint, true),
            check("Generate Content (text)", ping, generate_hint, false),
        ];

        DiagnosticsReport::Checked {
            ok: checks.iter().all(|c| c.ok),
            diagnosis: diagnose(&checks),
            api_key_redacted: redact(api_key),
            project_id: self.diagnostics.project_id().map(str::to_string),
            checks,
        }
    }
}

fn check(
    name: &'static str,
    outcome: ProbeOutcome,
    hint: fn(u16) -> Option<&'static str>,
    with_models: bool,
) -> CheckResult {
    let ok = outcome.ok();
    let Some(status) = outcome.status else {
        return CheckResult {
            name,
            ok: false,
            status: None,
            error: outcome.transport_error,
            hint: Some(NETWORK_HINT),
            headers: BTreeMap::new(),
            models: None,
        };
    };

    CheckResult {
        name,
        ok,
        status: Some(status),
        error: (!ok).then(|| truncate(&outcome.body)),
        hint: if ok { None } else { hint(status) },
        models: if with_models { model_names(&outcome.body) } else { None },
        headers: outcome.rate_limit,
    }
}

fn list_hint(status: u16) -> Option<&'static str> {
    match status {
        403 => Some("API not enabled or billing/project permissions issue."),
        401 => Some("Invalid API key."),
        429 => Some("Rate limit or quota exceeded."),
        _ => None,
    }
}

fn generate_hint(status: u16) -> Option<&'static str> {
    match status {
        404 => Some(
            "Model not found or not supported for generateContent in this region/project. Experimental realtime models need the v1alpha WebSocket API.",
        ),
        403 => Some("Permission/billing issue or policy block."),
        429 => Some("Rate limit or quota exceeded."),
        _ => None,
    }
}

fn model_names(body: &str) -> Option<Vec<String>> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let models = parsed.get("models")?.as_array()?;
    Some(
        models
            .iter()
            .filter_map(|m| m.get("name").and_then(Value::as_str))
            .take(MAX_LISTED_MODELS)
            .map(str::to_string)
            .collect(),
    )
}

/// Overall verdict; quota problems outrank auth problems, which outrank
/// missing models.
pub fn diagnose(checks: &[CheckResult]) -> &'static str {
    let any = |status: u16| checks.iter().any(|c| c.status == Some(status));
    if any(429) {
        "Rate limit or quota exceeded."
    } else if any(401) {
        "Invalid API key."
    } else if any(403) {
        "API not enabled, billing/project permission issue, or safety policy block."
    } else if any(404) {
        "Model or endpoint not available for this project/region."
    } else {
        "Unknown"
    }
}

/// `abcd***wxyz`; keys of eight characters or fewer are fully hidden.
pub fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubDiagnostics {
        key: Option<String>,
        listing: ProbeOutcome,
        ping: ProbeOutcome,
    }

    #[async_trait]
    impl ModelDiagnostics for StubDiagnostics {
        fn api_key(&self) -> Option<&str> {
            self.key.as_deref()
        }

        fn project_id(&self) -> Option<&str> {
            None
        }

        fn target_model(&self) -> &str {
            "models/gemini-2.0-flash"
        }

        async fn list_models(&self) -> ProbeOutcome {
            self.listing.clone()
        }

        async fn ping(&self, _model: &str) -> ProbeOutcome {
            self.ping.clone()
        }
    }

    fn outcome(status: u16, body: &str) -> ProbeOutcome {
        ProbeOutcome {
            status: Some(status),
            body: body.to_string(),
            ..ProbeOutcome::default()
        }
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("AIzaSyD-1234567890"), "AIza***7890");
        assert_eq!(redact("12345678"), "***");
    }

    #[test]
    fn test_diagnosis_precedence() {
        let make = |status| check("x", outcome(status, ""), list_hint, false);
        assert_eq!(diagnose(&[make(404), make(429)]), "Rate limit or quota exceeded.");
        assert_eq!(diagnose(&[make(403), make(401)]), "Invalid API key.");
        assert!(diagnose(&[make(404), make(403)]).starts_with("API not enabled"));
        assert_eq!(diagnose(&[make(200), make(404)]), "Model or endpoint not available for this project/region.");
        assert_eq!(diagnose(&[make(200), make(200)]), "Unknown");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let service = DiagnosticsService::new(Arc::new(StubDiagnostics {
            key: None,
            listing: ProbeOutcome::default(),
            ping: ProbeOutcome::default(),
        }));
        let report = serde_json::to_value(service.run().await).unwrap();
        assert_eq!(report["ok"], false);
        assert_eq!(report["lookedFor"][1], "FARM__GEMINI__API_KEY");
    }

    #[tokio::test]
    async fn test_checks_report_models_and_failures() {
        let service = DiagnosticsService::new(Arc::new(StubDiagnostics {
            key: Some("AIzaSyD-1234567890".into()),
            listing: outcome(200, r#"{"models":[{"name":"models/a"},{"name":"models/b"}]}"#),
            ping: ProbeOutcome {
                status: None,
                transport_error: Some("connection refused".into()),
                ..ProbeOutcome::default()
            },
        }));
        let report = serde_json::to_value(service.run().await).unwrap();
        assert_eq!(report["ok"], false);
        assert_eq!(report["apiKeyRedacted"], "AIza***7890");
        assert_eq!(report["checks"][0]["models"][1], "models/b");
        assert_eq!(report["checks"][1]["hint"], NETWORK_HINT);
        assert_eq!(report["diagnosis"], "Unknown");
    }
}
