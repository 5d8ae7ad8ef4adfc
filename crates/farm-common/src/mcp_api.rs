use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::guide::{GuideDocument, StyledLine};
use crate::language::Language;
use crate::model::{CropRecommendation, CropRequest, PestGuide};
use crate::openai::Message;
use crate::weather::{Coordinates, CurrentWeather, ForecastItem};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendCropsParams {
    #[serde(flatten)]
    pub request: CropRequest,
    /// Reply language (default: server setting).
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PestGuideParams {
    /// Pest name such as "fall-armyworm" or "aphids".
    pub pest: String,
    /// Affected crop such as "maize" or "cassava".
    pub crop: String,
    /// Reply language (default: server setting).
    pub language: Option<Language>,
    /// Maximum characters per guide line (default: server setting).
    pub line_width: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractJsonParams {
    /// Raw model output to search for a JSON object.
    pub text: String,
    /// Optional top-level key to unwrap, e.g. "recommendations".
    pub envelope_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatGuideParams {
    /// Pest guide record: name, scientificName, affectedCrop, severity, description,
    /// strategies.{organic,chemical,prevention}.
    pub record: Value,
    /// Maximum characters per line (default: server setting).
    pub line_width: Option<u32>,
    /// Lines per page (default: 40).
    pub lines_per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StartChatParams {
    /// Chat language (default: server setting).
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SendChatParams {
    /// Session ID returned by start_chat.
    pub session_id: String,
    /// The farmer's question.
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EndChatParams {
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherParams {
    /// Nigerian state, e.g. "lagos", "akwa-ibom", "abuja".
    pub location: String,
    /// Number of forecast days (default: 7, max: 7).
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WindDirectionParams {
    /// Wind bearing in degrees.
    pub degrees: f64,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RecommendCropsResponse {
    pub recommendations: Vec<CropRecommendation>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PestGuideResponse {
    pub guide: PestGuide,
    pub document: GuideDocument,
    /// Plain-text rendering of `document`.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExtractJsonResponse {
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormatGuideResponse {
    pub pages: Vec<Vec<StyledLine>>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StartChatResponse {
    pub session_id: String,
    pub greeting: String,
    pub input_placeholder: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChatReplyResponse {
    pub reply: String,
    /// Full ordered log of the session, greeting first.
    pub history: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WeatherResponse {
    pub location: String,
    pub coordinates: Coordinates,
    pub current: CurrentWeather,
    pub wind_direction: String,
    pub forecast: Vec<ForecastItem>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WindDirectionResponse {
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OkResponse {
    pub ok: bool,
}
