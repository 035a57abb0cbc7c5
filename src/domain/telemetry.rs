// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a ThingSpeak channel. Field values arrive as strings and may be
/// missing, null or blank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Feed {
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entry_id: Option<u64>,
    #[serde(default)]
    pub field1: Option<String>,
    #[serde(default)]
    pub field2: Option<String>,
    #[serde(default)]
    pub field3: Option<String>,
    #[serde(default)]
    pub field4: Option<String>,
    #[serde(default)]
    pub field5: Option<String>,
    #[serde(default)]
    pub field6: Option<String>,
    #[serde(default)]
    pub field7: Option<String>,
    #[serde(default)]
    pub field8: Option<String>,
}

impl Feed {
    /// Raw value of `fieldN`, `None` outside 1..=8.
    pub fn field(&self, index: u8) -> Option<&str> {
        let value = match index {
            1 => &self.field1,
            2 => &self.field2,
            3 => &self.field3,
            4 => &self.field4,
            5 => &self.field5,
            6 => &self.field6,
            7 => &self.field7,
            8 => &self.field8,
            _ => return None,
        };
        value.as_deref()
    }

    pub fn numeric(&self, index: u8) -> f64 {
        parse_numeric_value(self.field(index))
    }
}

/// Lenient float parsing used for every feed field: blank, missing or
/// unparsable values read as `0.0`.
pub fn parse_numeric_value(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "1y")]
    Year,
}

impl TimeRange {
    /// Unknown ranges fall back to the 24h window.
    pub fn parse(range: &str) -> Self {
        match range {
            "1h" => Self::Hour,
            "7d" => Self::Week,
            "30d" => Self::Month,
            "1y" => Self::Year,
            _ => Self::Day,
        }
    }

    /// Number of feed rows requested for this window.
    pub fn result_count(self) -> u32 {
        match self {
            Self::Hour => 60,
            Self::Day => 144,
            Self::Week => 168,
            Self::Month => 720,
            Self::Year => 8760,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub change: f64,
    pub increasing: bool,
}

/// Percentage change between two readings, rounded to one decimal.
pub fn calculate_trend(current: f64, previous: f64) -> Trend {
    if previous == 0.0 {
        return Trend {
            change: 0.0,
            increasing: false,
        };
    }
    let change = (current - previous) / previous.abs() * 100.0;
    Trend {
        change: ((change * 10.0).round() / 10.0).abs(),
        increasing: change > 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub time: Option<DateTime<Utc>>,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl SensorReading {
    pub fn from_feed(feed: &Feed) -> Self {
        Self {
            time: feed.created_at,
            soil_moisture: feed.numeric(1),
            temperature: feed.numeric(2),
            humidity: feed.numeric(3),
            nitrogen: feed.numeric(5),
            phosphorus: feed.numeric(6),
            potassium: feed.numeric(7),
        }
    }

    pub fn npk(&self) -> NpkReading {
        NpkReading {
            time: self.time,
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilMoisture {
    pub time: Option<DateTime<Utc>>,
    pub soil_moisture: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NpkReading {
    pub time: Option<DateTime<Utc>>,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl NpkReading {
    pub fn average(&self) -> f64 {
        (self.nitrogen + self.phosphorus + self.potassium) / 3.0
    }
}

/// Readings from the spectral (vital stats) channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalStats {
    pub time: Option<DateTime<Utc>>,
    pub red: f64,
    pub nir: f64,
    pub ndvi: f64,
    pub ratio: f64,
    pub chlorophyll: f64,
    pub nitrogen: f64,
}

impl VitalStats {
    pub fn from_feed(feed: &Feed) -> Self {
        Self {
            time: feed.created_at,
            red: feed.numeric(1),
            nir: feed.numeric(2),
            ndvi: feed.numeric(3),
            ratio: feed.numeric(4),
            chlorophyll: feed.numeric(5),
            nitrogen: feed.numeric(6),
        }
    }
}

/// The last two entries of a feed list, oldest first. A single entry is its
/// own predecessor.
pub fn latest_pair<T>(items: &[T]) -> Option<(&T, &T)> {
    let latest = items.last()?;
    let previous = items.len().checked_sub(2).map_or(latest, |i| &items[i]);
    Some((latest, previous))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_value() {
        assert_eq!(parse_numeric_value(Some(" 42.5 ")), 42.5);
        assert_eq!(parse_numeric_value(Some("")), 0.0);
        assert_eq!(parse_numeric_value(Some("abc")), 0.0);
        assert_eq!(parse_numeric_value(None), 0.0);
    }

    #[test]
    fn test_result_counts() {
        assert_eq!(TimeRange::parse("1h").result_count(), 60);
        assert_eq!(TimeRange::parse("30d").result_count(), 720);
        assert_eq!(TimeRange::parse("bogus").result_count(), 144);
    }

    #[test]
    fn test_calculate_trend() {
        let trend = calculate_trend(55.0, 50.0);
        assert_eq!(trend.change, 10.0);
        assert!(trend.increasing);

        let trend = calculate_trend(40.0, 50.0);
        assert_eq!(trend.change, 20.0);
        assert!(!trend.increasing);

        let trend = calculate_trend(40.0, 0.0);
        assert_eq!(trend, Trend { change: 0.0, increasing: false });
    }

    #[test]
    fn test_reading_from_feed() {
        let feed: Feed = serde_json::from_str(
            r#"{"created_at":"2025-01-01T10:00:00Z","entry_id":7,"field1":"35","field2":"28.5","field3":null,"field5":"40","field6":" ","field7":"12"}"#,
        )
        .unwrap();
        let reading = SensorReading::from_feed(&feed);
        assert_eq!(reading.soil_moisture, 35.0);
        assert_eq!(reading.temperature, 28.5);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.phosphorus, 0.0);
        assert_eq!(reading.npk().average(), (40.0 + 12.0) / 3.0);
    }

    #[test]
    fn test_latest_pair() {
        assert_eq!(latest_pair(&[1, 2, 3]), Some((&3, &2)));
        assert_eq!(latest_pair(&[9]), Some((&9, &9)));
        assert_eq!(latest_pair::<i32>(&[]), None);
    }
}
