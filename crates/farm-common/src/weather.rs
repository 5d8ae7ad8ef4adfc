/// Weather lookups for Nigerian states via OpenWeatherMap.
///
/// Locations are resolved through a static coordinate table. Forecasts arrive in
/// three-hour steps and are reduced to one entry per calendar day.
use std::time::Duration;

use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::openai::read_limited_text;

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECONDS_PER_DAY: i64 = 86_400;

pub const DEFAULT_FORECAST_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

const LOCATIONS: &[(&str, Coordinates)] = &[
    ("abia", Coordinates { lat: 5.5320, lon: 7.4860 }),
    ("adamawa", Coordinates { lat: 9.3265, lon: 12.3984 }),
    ("akwa_ibom", Coordinates { lat: 5.0280, lon: 7.9270 }),
    ("anambra", Coordinates { lat: 6.2209, lon: 7.0670 }),
    ("bauchi", Coordinates { lat: 10.3142, lon: 9.8463 }),
    ("bayelsa", Coordinates { lat: 4.7719, lon: 6.0699 }),
    ("benue", Coordinates { lat: 7.7278, lon: 8.5391 }),
    ("borno", Coordinates { lat: 11.8333, lon: 13.1500 }),
    ("cross_river", Coordinates { lat: 5.9631, lon: 8.3340 }),
    ("delta", Coordinates { lat: 5.8904, lon: 5.6800 }),
    ("ebonyi", Coordinates { lat: 6.2649, lon: 8.0130 }),
    ("edo", Coordinates { lat: 6.5244, lon: 5.8987 }),
    ("ekiti", Coordinates { lat: 7.6210, lon: 5.2210 }),
    ("enugu", Coordinates { lat: 6.5244, lon: 7.5170 }),
    ("gombe", Coordinates { lat: 10.2897, lon: 11.1710 }),
    ("imo", Coordinates { lat: 5.5720, lon: 7.0580 }),
    ("jigawa", Coordinates { lat: 12.2280, lon: 9.5610 }),
    ("kaduna", Coordinates { lat: 10.5267, lon: 7.4406 }),
    ("kano", Coordinates { lat: 12.0022, lon: 8.5920 }),
    ("katsina", Coordinates { lat: 12.9908, lon: 7.6000 }),
    ("kebbi", Coordinates { lat: 12.4539, lon: 4.1970 }),
    ("kogi", Coordinates { lat: 7.7337, lon: 6.6906 }),
    ("kwara", Coordinates { lat: 8.4799, lon: 4.5418 }),
    ("lagos", Coordinates { lat: 6.5244, lon: 3.3792 }),
    ("nasarawa", Coordinates { lat: 8.5380, lon: 8.5460 }),
    ("niger", Coordinates { lat: 9.9300, lon: 5.5983 }),
    ("ogun", Coordinates { lat: 7.1600, lon: 3.3500 }),
    ("ondo", Coordinates { lat: 7.2500, lon: 5.2000 }),
    ("osun", Coordinates { lat: 7.5620, lon: 4.5620 }),
    ("oyo", Coordinates { lat: 7.3775, lon: 3.9470 }),
    ("plateau", Coordinates { lat: 9.0238, lon: 8.8923 }),
    ("rivers", Coordinates { lat: 4.8156, lon: 7.0498 }),
    ("sokoto", Coordinates { lat: 13.0059, lon: 5.2476 }),
    ("taraba", Coordinates { lat: 8.8937, lon: 11.3600 }),
    ("yobe", Coordinates { lat: 12.0000, lon: 11.5000 }),
    ("zamfara", Coordinates { lat: 12.1667, lon: 6.2500 }),
    ("abuja", Coordinates { lat: 9.0765, lon: 7.3986 }),
];

/// Look up a state by key. Case-insensitive; spaces and hyphens match underscores,
/// so "Akwa Ibom", "akwa-ibom" and "akwa_ibom" are the same location.
pub fn coordinates(location: &str) -> Option<Coordinates> {
    let key = normalize_location(location);
    LOCATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, coords)| *coords)
}

/// All known location keys, in table order.
pub fn location_keys() -> impl Iterator<Item = &'static str> {
    LOCATIONS.iter().map(|(name, _)| *name)
}

fn normalize_location(location: &str) -> String {
    location
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// 16-point compass direction for a bearing in degrees. Any finite value is accepted;
/// negative and >360 bearings wrap around.
pub fn wind_direction(degrees: f64) -> &'static str {
    let sector = (degrees / 22.5).round() as i64;
    COMPASS[sector.rem_euclid(16) as usize]
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CurrentWeather {
    pub main: MainReadings,
    pub wind: Wind,
    #[serde(default)]
    pub rain: Option<Precipitation>,
    pub clouds: Clouds,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Precipitation {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clouds {
    pub all: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForecastItem {
    /// Unix timestamp (seconds, UTC)
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub rain: Option<Precipitation>,
    pub clouds: Clouds,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastItem>,
}

/// Keep the first forecast entry of each UTC calendar day, at most `max_days` entries.
///
/// Each item is compared with the item immediately before it, so input is expected in
/// time order as the API returns it.
pub fn daily_forecast(items: &[ForecastItem], max_days: usize) -> Vec<ForecastItem> {
    items
        .iter()
        .enumerate()
        .filter(|(i, item)| {
            *i == 0 || day_index(items[i - 1].dt) != day_index(item.dt)
        })
        .map(|(_, item)| item.clone())
        .take(max_days)
        .collect()
}

fn day_index(dt: i64) -> i64 {
    dt.div_euclid(SECONDS_PER_DAY)
}

#[derive(Clone, Debug)]
pub struct WeatherClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl WeatherClientConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("OPENWEATHER_BASE_URL")
            .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5".to_string());

        let api_key = std::env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let timeout = std::env::var("OPENWEATHER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(15));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            max_error_body_bytes: 4 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("OpenWeatherMap API key is not configured (set OPENWEATHER_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather service returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct WeatherClient {
    config: WeatherClientConfig,
    http: reqwest::Client,
}

impl WeatherClient {
    pub fn new(config: WeatherClientConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .user_agent("farm-advisor")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn current(&self, coords: Coordinates) -> Result<CurrentWeather, WeatherError> {
        self.get_json("weather", coords).await
    }

    /// Raw three-hourly forecast entries.
    pub async fn forecast(&self, coords: Coordinates) -> Result<Vec<ForecastItem>, WeatherError> {
        let response: ForecastResponse = self.get_json("forecast", coords).await?;
        Ok(response.list)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        coords: Coordinates,
    ) -> Result<T, WeatherError> {
        let api_key = self.config.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/{endpoint}", self.config.base_url);
        debug!(endpoint, lat = coords.lat, lon = coords.lon, "fetching weather");

        let resp = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
            return Err(WeatherError::Upstream { status, body });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(dt: i64, temp: f64) -> ForecastItem {
        ForecastItem {
            dt,
            main: MainReadings {
                temp,
                feels_like: None,
                humidity: None,
                temp_min: Some(temp - 2.0),
                temp_max: Some(temp + 2.0),
            },
            rain: None,
            clouds: Clouds { all: 40.0 },
        }
    }

    #[test]
    fn wind_direction_compass_points() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(22.5), "NNE");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(225.0), "SW");
        assert_eq!(wind_direction(348.0), "NNW");
        assert_eq!(wind_direction(355.0), "N");
        assert_eq!(wind_direction(360.0), "N");
        assert_eq!(wind_direction(-90.0), "W");
    }

    #[test]
    fn coordinates_normalize_keys() {
        let lagos = coordinates("Lagos").unwrap();
        assert_eq!(lagos.lat, 6.5244);
        assert_eq!(coordinates("akwa-ibom"), coordinates("akwa_ibom"));
        assert_eq!(coordinates("Cross River"), coordinates("cross_river"));
        assert!(coordinates("atlantis").is_none());
        assert_eq!(location_keys().count(), 37);
    }

    #[test]
    fn daily_forecast_keeps_first_entry_per_day() {
        let day = SECONDS_PER_DAY;
        let items = vec![
            item(0, 25.0),
            item(3 * 3600, 26.0),
            item(day, 27.0),
            item(day + 3 * 3600, 28.0),
            item(2 * day + 6 * 3600, 29.0),
        ];
        let daily = daily_forecast(&items, DEFAULT_FORECAST_DAYS);
        let temps: Vec<f64> = daily.iter().map(|i| i.main.temp).collect();
        assert_eq!(temps, vec![25.0, 27.0, 29.0]);
    }

    #[test]
    fn daily_forecast_caps_days() {
        let items: Vec<ForecastItem> = (0..10)
            .map(|d| item(d * SECONDS_PER_DAY, 20.0 + d as f64))
            .collect();
        assert_eq!(daily_forecast(&items, 7).len(), 7);
        assert!(daily_forecast(&[], 7).is_empty());
    }

    #[test]
    fn current_weather_parses_api_shape() {
        let raw = r#"{
            "main": {"temp": 29.4, "feels_like": 33.1, "humidity": 78},
            "wind": {"speed": 3.6, "deg": 230},
            "rain": {"1h": 0.4},
            "clouds": {"all": 75},
            "name": "Lagos"
        }"#;
        let current: CurrentWeather = serde_json::from_str(raw).unwrap();
        assert_eq!(wind_direction(current.wind.deg), "SW");
        assert_eq!(current.rain.unwrap().one_hour, Some(0.4));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_request() {
        let client = WeatherClient::new(WeatherClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout: Duration::from_secs(1),
            max_error_body_bytes: 1024,
        })
        .unwrap();
        assert!(!client.is_configured());
        let err = client
            .current(Coordinates { lat: 0.0, lon: 0.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }
}
