// Chart models and the visual-generation heuristics
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sensor_context::SensorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChartData {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(default)]
    pub data_label: String,
    #[serde(default)]
    pub y_label: String,
    #[serde(default)]
    pub chart_title: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub chart_type: ChartType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub skip: bool,
    pub needs_visual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
}

impl AnalysisResult {
    pub fn skipped() -> Self {
        Self {
            skip: true,
            needs_visual: false,
            chart_data: None,
            topic: None,
        }
    }

    pub fn visual(chart: ChartData, topic: Topic) -> Self {
        Self {
            skip: false,
            needs_visual: true,
            chart_data: Some(chart),
            topic: Some(topic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    SoilMoisture,
    Temperature,
    Humidity,
    Npk,
    Weather,
    CropGrowth,
    General,
}

impl Topic {
    /// Main topic of a user query, first match wins.
    pub fn extract(query: &str) -> Self {
        let query = query.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| query.contains(w));

        if has(&["moisture", "water"]) {
            Self::SoilMoisture
        } else if has(&["temperature", "temp"]) {
            Self::Temperature
        } else if has(&["humidity"]) {
            Self::Humidity
        } else if has(&["npk", "nitrogen", "phosphorus", "potassium"]) {
            Self::Npk
        } else if has(&["weather"]) {
            Self::Weather
        } else if has(&["crop", "plant"]) {
            Self::CropGrowth
        } else {
            Self::General
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SoilMoisture => "soil moisture",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Npk => "npk",
            Self::Weather => "weather",
            Self::CropGrowth => "crop growth",
            Self::General => "general",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::SoilMoisture | Self::Humidity => "%",
            Self::Temperature => "°C",
            Self::Npk => "ppm",
            _ => "units",
        }
    }

    /// Baseline, spread and clamp range for synthetic series.
    fn profile(self, context: &SensorContext) -> (f64, f64, f64, f64) {
        let or = |value: f64, default: f64| if value > 0.0 { value } else { default };
        match self {
            Self::SoilMoisture => (or(context.soil_moisture, 50.0), 10.0, 10.0, 90.0),
            Self::Temperature | Self::Weather => (or(context.temperature, 25.0), 5.0, 15.0, 40.0),
            Self::Humidity => (or(context.humidity, 60.0), 7.5, 30.0, 90.0),
            Self::Npk => (or(context.npk.average(), 50.0), 15.0, 20.0, 100.0),
            Self::CropGrowth | Self::General => (50.0, 15.0, 0.0, 100.0),
        }
    }
}

const FALLBACK_DAYS: i64 = 7;
const FALLBACK_PATTERN: [f64; 7] = [-1.0, -0.5, 0.2, -0.3, 0.5, 0.0, 0.7];

/// Seven daily points ending at `today`, shaped by a fixed pattern around the
/// topic's baseline.
pub fn sample_series(topic: Topic, context: &SensorContext, today: NaiveDate) -> (Vec<String>, Vec<f64>) {
    let (base, spread, min, max) = topic.profile(context);
    let labels = (0..FALLBACK_DAYS)
        .rev()
        .map(|back| (today - Duration::days(back)).format("%b %-d").to_string())
        .collect();
    let values = FALLBACK_PATTERN
        .iter()
        .map(|offset| ((base + offset * spread).clamp(min, max) * 10.0).round() / 10.0)
        .collect();
    (labels, values)
}

/// Chart used when the model's answer cannot be parsed.
pub fn fallback_chart(query: &str, context: &SensorContext, today: NaiveDate) -> AnalysisResult {
    let topic = Topic::extract(query);
    let (labels, values) = sample_series(topic, context, today);
    let label = topic.label();
    let upper = label.to_uppercase();

    let average = values.iter().sum::<f64>() / values.len() as f64;
    let direction = match (values.first(), values.last()) {
        (Some(first), Some(last)) if last > first => "increasing",
        _ => "decreasing",
    };

    let chart = ChartData {
        title: format!("{} Trend", upper),
        summary: format!("Recent {} data based on your query", label),
        labels,
        values,
        data_label: label.to_string(),
        y_label: topic.unit().to_string(),
        chart_title: format!("7-Day {} Analysis", upper),
        insights: vec![
            format!("Average {}: {}", label, average.round()),
            format!("Trend appears {}", direction),
        ],
        chart_type: ChartType::Line,
    };
    AnalysisResult::visual(chart, topic)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelChart {
    Skip,
    Chart(ChartData),
    Unparsable,
}

/// Reads the analysis model's answer. Markdown code fences are tolerated.
pub fn parse_model_chart(raw: &str) -> ModelChart {
    let text = strip_code_fence(raw.trim());
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return ModelChart::Unparsable;
    };
    if value.get("skip").and_then(Value::as_bool) == Some(true) {
        return ModelChart::Skip;
    }
    match serde_json::from_value::<ChartData>(value) {
        Ok(chart) => ModelChart::Chart(chart),
        Err(_) => ModelChart::Unparsable,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

const UNIT_MARKERS: [&str; 18] = [
    "%", "ppm", "°c", "°f", "kg", "ton", "liter", "ml", "cm", "mm", "inch", "feet", "meter", "₹",
    "rs", "rupee", "dollar", "$",
];

const VISUAL_TRIGGERS: [&str; 63] = [
    "trend", "history", "historical", "past", "week", "month", "year", "over time", "change",
    "forecast", "prediction", "chart", "graph", "pattern", "comparison", "compare", "evolution",
    "development", "moisture", "temperature", "humidity", "npk", "nitrogen", "phosphorus",
    "potassium", "levels", "readings", "data", "measurements", "values", "sensor", "increase",
    "decrease", "rising", "falling", "stable", "fluctuating", "high", "low", "average", "maximum",
    "minimum", "price", "cost", "rate", "market", "sell", "buy", "profit", "loss", "search",
    "find", "lookup", "current", "latest", "recent", "yield", "harvest", "crop", "soil", "farm",
    "field", "plant",
];

const STRONG_TRIGGERS: [&str; 4] = ["trend", "chart", "data", "search"];

/// Whether a finished conversation turn deserves a chart.
///
/// True when the response carries numbers together with units or data
/// keywords, when data keywords appear alongside an explicit trend, chart,
/// data or search request, or when search grounding produced supporting
/// segments.
pub fn should_generate_visual(query: &str, response: &str, search_results: Option<&Value>) -> bool {
    let combined = format!("{} {}", query, response).to_lowercase();

    let has_numbers = response.chars().any(|c| c.is_ascii_digit());
    let has_units = UNIT_MARKERS.iter().any(|u| combined.contains(u));
    let has_keywords = VISUAL_TRIGGERS.iter().any(|t| combined.contains(t));
    let has_strong = STRONG_TRIGGERS.iter().any(|t| combined.contains(t));
    let has_grounding = search_results
        .and_then(|s| s.get("groundingSupports"))
        .and_then(Value::as_array)
        .is_some_and(|supports| !supports.is_empty());

    (has_numbers && has_units) || (has_numbers && has_keywords) || (has_keywords && has_strong) || has_grounding
}

/// Numbered search snippets from grounding metadata, for the analysis prompt.
pub fn search_context(search_results: Option<&Value>) -> String {
    let Some(supports) = search_results
        .and_then(|s| s.get("groundingSupports"))
        .and_then(Value::as_array)
    else {
        return String::new();
    };

    let lines: Vec<String> = supports
        .iter()
        .enumerate()
        .map(|(i, support)| {
            let text = support
                .pointer("/segment/text")
                .or_else(|| support.get("title"))
                .and_then(Value::as_str)
                .unwrap_or("Search result");
            format!("{}. {}", i + 1, text)
        })
        .collect();
    format!("\nGOOGLE SEARCH RESULTS:\n{}", lines.join("\n"))
}
