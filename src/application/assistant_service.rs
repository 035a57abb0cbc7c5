// Assistant service - Chat, transcription and chart analysis on Gemini
use crate::application::error::GatewayError;
use crate::application::gateways::{ContentPart, GenerationConfig, GenerationRequest, GenerativeModel};
use crate::domain::chart::{
    AnalysisResult, ModelChart, Topic, fallback_chart, parse_model_chart, search_context,
    should_generate_visual,
};
use crate::domain::knowledge::{knowledge_context, sensor_context};
use crate::domain::sensor_context::SensorContext;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_SYSTEM_PROMPT: &str = "Speak with a helpful, funny and wise tone, that is very sportive, optimistic and can say no to the user if required. \
You will always be confident in what you say. Ask the user for their query. Sound natural in the language you are speaking, \
do not repeat questions or keep using the user's name, and avoid generic answers: go in depth, bit by bit. \
Do not speak more than 40 words at a time. You are an agriculture expert in India solving farmers' problems. \
Always converse in the language the user is writing in, or asks for. You have access to real-time sensor data: \
location, humidity, soil moisture, nitrogen, phosphorus, potassium and average NPK. Based on these values, the location \
and the crop the user asks about, give personalized agricultural suggestions and recommendations. \
Say sensor values in words, not digits.";

const TRANSCRIPTION_PROMPT: &str = "Please transcribe the spoken language in this audio accurately. Ignore any background noise or non-speech sounds.";

const KNOWLEDGE_RESULTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone)]
pub struct ModelNames {
    pub chat: String,
    pub analysis: String,
    pub transcription: String,
}

#[derive(Clone)]
pub struct AssistantService {
    model: Arc<dyn GenerativeModel>,
    names: ModelNames,
}

impl AssistantService {
    pub fn new(model: Arc<dyn GenerativeModel>, names: ModelNames) -> Self {
        Self { model, names }
    }

    pub async fn chat(&self, request: &ChatRequest, context: &SensorContext) -> Result<String, GatewayError> {
        if request.message.trim().is_empty() && request.attachment.is_none() {
            return Err(GatewayError::BadRequest("message is required".to_string()));
        }

        let mut parts = vec![ContentPart::Text(chat_prompt(request, context))];
        if let Some(attachment) = &request.attachment {
            parts.push(ContentPart::InlineData {
                mime_type: attachment.mime_type.clone(),
                data: attachment.data.clone(),
            });
        }

        self.model
            .generate(GenerationRequest {
                model: self.names.chat.clone(),
                parts,
                config: Some(GenerationConfig {
                    temperature: Some(1.0),
                    top_p: Some(0.95),
                    top_k: Some(40),
                    max_output_tokens: 8192,
                }),
            })
            .await
    }

    /// Text of the speech in a base64 WAV recording.
    pub async fn transcribe(&self, wav_base64: String) -> Result<String, GatewayError> {
        let text = self
            .model
            .generate(GenerationRequest {
                model: self.names.transcription.clone(),
                parts: vec![
                    ContentPart::InlineData {
                        mime_type: "audio/wav".to_string(),
                        data: wav_base64,
                    },
                    ContentPart::Text(TRANSCRIPTION_PROMPT.to_string()),
                ],
                config: None,
            })
            .await?;
        Ok(text.trim().to_string())
    }

    /// Decides whether a finished exchange gets a chart and produces it.
    /// Model failures skip the chart; unparsable answers fall back to a
    /// chart derived from the sensor context.
    pub async fn analyze(
        &self,
        query: &str,
        response: &str,
        search_results: Option<&Value>,
        context: &SensorContext,
        today: NaiveDate,
    ) -> AnalysisResult {
        if !should_generate_visual(query, response, search_results) {
            return AnalysisResult::skipped();
        }

        let prompt = analysis_prompt(query, response, search_results, context);
        let answer = self
            .model
            .generate(GenerationRequest {
                model: self.names.analysis.clone(),
                parts: vec![ContentPart::Text(prompt)],
                config: None,
            })
            .await;

        match answer {
            Ok(text) => match parse_model_chart(&text) {
                ModelChart::Chart(chart) => AnalysisResult::visual(chart, Topic::extract(query)),
                ModelChart::Skip => AnalysisResult::skipped(),
                ModelChart::Unparsable => {
                    tracing::warn!("Chart answer was not valid chart JSON, using fallback chart");
                    fallback_chart(query, context, today)
                }
            },
            Err(e) => {
                tracing::warn!("Chart analysis failed: {}", e);
                AnalysisResult::skipped()
            }
        }
    }
}

fn chat_prompt(request: &ChatRequest, context: &SensorContext) -> String {
    let system = request
        .system_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let vars = context.variables();
    format!(
        "{}\nSENSOR_CONTEXT_JSON: {}\n\n{}\n\n{}\n{}",
        system,
        vars.to_json(),
        knowledge_context(&request.message, KNOWLEDGE_RESULTS),
        sensor_context(&vars),
        request.message
    )
}

fn analysis_prompt(
    query: &str,
    response: &str,
    search_results: Option<&Value>,
    context: &SensorContext,
) -> String {
    let vars = context.variables();
    format!(
        r#"You are a trend analysis assistant for agricultural data. Analyze this conversation and generate chart data if appropriate.

CONVERSATION:
User asked: "{query}"
Agent responded: "{response}"

CURRENT SENSOR DATA:
- Location: {location}
- Soil Moisture: {moisture}%
- Temperature: {temperature}°C
- Humidity: {humidity}%
- NPK Levels: N={n}ppm, P={p}ppm, K={k}ppm{search}

TASK: Generate a visual chart for this conversation. If there are any numbers, measurements or data mentioned, create a chart.
Only skip, by answering {{"skip": true}}, when the conversation is purely casual (like "hello", "how are you", "goodbye").

Rules:
- If Google Search results are provided, extract real numbers, dates and trends from them
- Otherwise create realistic agricultural data related to the discussion
- Keep the data relevant to Indian agriculture and the current sensor readings

OUTPUT FORMAT (pure JSON, no markdown):
{{
  "title": "Chart title",
  "summary": "Brief 1-sentence summary",
  "labels": ["Day1", "Day2", "Day3", "Day4", "Day5"],
  "values": [value1, value2, value3, value4, value5],
  "data_label": "Data type (e.g., Temperature, Moisture)",
  "y_label": "Unit (e.g., °C, %, ppm)",
  "chart_title": "Full descriptive title",
  "insights": ["Key insight 1", "Key insight 2"],
  "chart_type": "line"
}}

Output ONLY raw JSON. No markdown, no backticks, no explanations."#,
        query = query,
        response = response,
        location = vars.location_name,
        moisture = vars.soil_moisture,
        temperature = vars.temperature,
        humidity = vars.humidity,
        n = vars.npk_nitrogen,
        p = vars.npk_phosphorus,
        k = vars.npk_potassium,
        search = search_context(search_results),
    )
}
