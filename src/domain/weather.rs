// Weather and evapotranspiration domain models
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: i64,
    pub condition: &'static str,
    pub humidity: i64,
    pub wind_speed: i64,
    pub pressure: i64,
    pub visibility: i64,
    pub uv_index: i64,
    pub feels_like: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub day: String,
    pub high: i64,
    pub low: i64,
    pub condition: &'static str,
    pub icon: WeatherIcon,
    pub precipitation: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherIcon {
    Sun,
    Cloud,
    CloudRain,
}

impl WeatherIcon {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Sun,
            c if c < 3 => Self::Cloud,
            _ => Self::CloudRain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvapotranspirationDay {
    pub date: NaiveDate,
    pub pet: f64,
    pub aet: f64,
    pub evaporation: f64,
    pub soil_moisture: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvapotranspirationCurrent {
    pub pet: f64,
    pub aet: f64,
    pub evaporation: f64,
    pub soil_moisture: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvapotranspirationReport {
    pub current: EvapotranspirationCurrent,
    pub forecast: Vec<EvapotranspirationDay>,
    pub historical: Vec<EvapotranspirationDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedWeather {
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evapotranspiration: Option<EvapotranspirationReport>,
}

/// Inputs for one evapotranspiration estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtInputs {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
}

/// WMO weather interpretation codes as used by Open-Meteo.
pub fn weather_condition(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

pub fn feels_like(temperature: f64, humidity: f64, wind_speed: f64) -> f64 {
    temperature + (humidity / 100.0) * 2.0 - wind_speed / 10.0
}

fn saturation_vapor_pressure(temperature: f64) -> f64 {
    0.611 * ((17.27 * temperature) / (temperature + 237.3)).exp()
}

/// Potential evapotranspiration in mm/day, simplified Penman-Monteith with
/// no radiation term.
pub fn potential_et(temperature: f64, humidity: f64, wind_speed: f64) -> f64 {
    let delta = 0.409 * (-0.0005 * temperature).exp();
    let gamma = 0.066;
    let net_radiation = 0.0;

    let es = saturation_vapor_pressure(temperature);
    let ea = es * (humidity / 100.0);
    let vpd = es - ea;

    let pet = (0.408 * delta * net_radiation
        + gamma * (900.0 / (temperature + 273.0)) * wind_speed * vpd)
        / (delta + gamma * (1.0 + 0.34 * wind_speed));
    pet.max(0.0)
}

/// Actual evapotranspiration limited by soil moisture (50% is treated as
/// fully available) and lifted by up to 20% with rainfall.
pub fn actual_et(pet: f64, soil_moisture: f64, precipitation: f64) -> f64 {
    let moisture_factor = (soil_moisture / 50.0).min(1.0);
    let precipitation_factor = (precipitation / 10.0).min(1.0);
    pet * moisture_factor * (1.0 + precipitation_factor * 0.2)
}

pub fn evaporation(temperature: f64, humidity: f64, wind_speed: f64) -> f64 {
    let saturation = saturation_vapor_pressure(temperature);
    let vapor = saturation * (humidity / 100.0);
    ((saturation - vapor) * wind_speed * 0.1).max(0.0)
}

/// Soil moisture estimate (%) from rain and heat, for locations without a
/// probe.
pub fn estimated_soil_moisture(base: f64, temperature: f64, precipitation: f64) -> f64 {
    (base + precipitation * 2.0 - (temperature - 25.0) * 0.5).clamp(10.0, 90.0)
}

pub const BASE_SOIL_MOISTURE: f64 = 60.0;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl EtInputs {
    /// Full estimate for one day, given the reference soil moisture.
    pub fn day(&self, date: NaiveDate, base_moisture: f64) -> EvapotranspirationDay {
        let soil_moisture =
            estimated_soil_moisture(base_moisture, self.temperature, self.precipitation);
        let pet = potential_et(self.temperature, self.humidity, self.wind_speed);
        let aet = actual_et(pet, soil_moisture, self.precipitation);
        EvapotranspirationDay {
            date,
            pet: round2(pet),
            aet: round2(aet),
            evaporation: round2(evaporation(self.temperature, self.humidity, self.wind_speed)),
            soil_moisture: soil_moisture.round(),
        }
    }
}

/// Forecast reduced to the series the dashboard reads. Hourly vectors are
/// index-aligned with `hourly_time`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub current: CurrentWeather,
    pub hourly_time: Vec<String>,
    pub hourly_temperature: Vec<f64>,
    pub hourly_humidity: Vec<f64>,
    pub hourly_wind_speed: Vec<f64>,
    pub hourly_precipitation: Vec<f64>,
    pub hourly_pressure: Vec<f64>,
    pub hourly_visibility: Vec<f64>,
    pub daily: Vec<DailyWeather>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentWeather {
    /// Local ISO time such as `2025-03-10T14:15`.
    pub time: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_code: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub temperature_mean: Option<f64>,
    pub humidity_mean: Option<f64>,
    pub wind_speed_max: f64,
    pub precipitation_sum: f64,
    pub precipitation_probability_max: f64,
    pub uv_index_max: f64,
    pub weather_code: i64,
}

impl DailyWeather {
    fn mean_temperature(&self) -> f64 {
        self.temperature_mean
            .unwrap_or((self.temperature_max + self.temperature_min) / 2.0)
    }
}

fn value_at(series: &[f64], index: usize) -> f64 {
    series.get(index).copied().unwrap_or(0.0)
}

impl Forecast {
    /// Index of the hourly slot containing `current.time`. Falls back to the
    /// hour of day when the hourly series does not contain that slot.
    pub fn current_hour_index(&self) -> usize {
        let slot = self
            .current
            .time
            .get(..13)
            .map(|hour| format!("{}:00", hour));
        if let Some(index) = slot.and_then(|slot| self.hourly_time.iter().position(|t| *t == slot)) {
            return index;
        }
        self.current
            .time
            .get(11..13)
            .and_then(|hour| hour.parse().ok())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        let index = self.current_hour_index();
        WeatherSnapshot {
            temperature: self.current.temperature,
            humidity: value_at(&self.hourly_humidity, index),
            time: self.current.time.clone(),
        }
    }

    fn today(&self) -> Option<NaiveDate> {
        self.current
            .time
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    }

    fn days_from(&self, today: NaiveDate) -> impl Iterator<Item = &DailyWeather> {
        self.daily.iter().filter(move |day| day.date >= today)
    }

    pub fn current_conditions(&self) -> CurrentConditions {
        let index = self.current_hour_index();
        let humidity = value_at(&self.hourly_humidity, index);
        let wind_speed = value_at(&self.hourly_wind_speed, index);
        let uv_index = self
            .today()
            .and_then(|today| self.days_from(today).next())
            .map_or(0.0, |day| day.uv_index_max);

        CurrentConditions {
            temperature: self.current.temperature.round() as i64,
            condition: weather_condition(self.current.weather_code),
            humidity: humidity.round() as i64,
            wind_speed: wind_speed.round() as i64,
            pressure: value_at(&self.hourly_pressure, index).round() as i64,
            visibility: (value_at(&self.hourly_visibility, index) / 1000.0).round() as i64,
            uv_index: uv_index.round() as i64,
            feels_like: feels_like(self.current.temperature, humidity, wind_speed).round() as i64,
        }
    }

    /// Five days starting today.
    pub fn daily_forecasts(&self) -> Vec<DailyForecast> {
        let Some(today) = self.today() else {
            return Vec::new();
        };
        self.days_from(today)
            .take(5)
            .map(|day| DailyForecast {
                day: match (day.date - today).num_days() {
                    0 => "Today".to_string(),
                    1 => "Tomorrow".to_string(),
                    _ => day.date.format("%A").to_string(),
                },
                high: day.temperature_max.round() as i64,
                low: day.temperature_min.round() as i64,
                condition: weather_condition(day.weather_code),
                icon: WeatherIcon::from_code(day.weather_code),
                precipitation: day.precipitation_probability_max.round() as i64,
            })
            .collect()
    }

    /// Evapotranspiration for now, the next five days and the past seven.
    /// `None` without daily data.
    pub fn evapotranspiration(&self) -> Option<EvapotranspirationReport> {
        let today = self.today()?;
        if self.daily.is_empty() {
            return None;
        }

        let index = self.current_hour_index();
        let now = EtInputs {
            temperature: self.current.temperature,
            humidity: value_at(&self.hourly_humidity, index),
            wind_speed: value_at(&self.hourly_wind_speed, index),
            precipitation: value_at(&self.hourly_precipitation, index),
        };
        let current = now.day(today, BASE_SOIL_MOISTURE);
        let base = estimated_soil_moisture(BASE_SOIL_MOISTURE, now.temperature, now.precipitation);

        let inputs = |day: &DailyWeather| EtInputs {
            temperature: day.mean_temperature(),
            humidity: day.humidity_mean.unwrap_or(now.humidity),
            wind_speed: day.wind_speed_max,
            precipitation: day.precipitation_sum,
        };

        let forecast = self
            .days_from(today)
            .take(5)
            .map(|day| inputs(day).day(day.date, base))
            .collect();
        let past: Vec<&DailyWeather> = self.daily.iter().filter(|day| day.date < today).collect();
        let historical = past
            .iter()
            .skip(past.len().saturating_sub(7))
            .map(|day| inputs(*day).day(day.date, base))
            .collect();

        Some(EvapotranspirationReport {
            current: EvapotranspirationCurrent {
                pet: current.pet,
                aet: current.aet,
                evaporation: current.evaporation,
                soil_moisture: current.soil_moisture,
            },
            forecast,
            historical,
        })
    }
}
