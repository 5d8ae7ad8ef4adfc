/// Advisory flows: build a prompt, call the model once, extract the structured answer.
///
/// Each flow is a single request/response cycle. Extraction and formatting failures
/// are returned to the caller; nothing is retried.
use std::sync::Arc;

use tracing::{info, warn};

use farm_common::extract::{extract, extract_as};
use farm_common::guide::{self, GuideDocument};
use farm_common::language::Language;
use farm_common::mcp_api::WeatherResponse;
use farm_common::model::{CropRecommendation, CropRequest, PestGuide};
use farm_common::openai::{Message, OpenAiClient};
use farm_common::weather::{self, WeatherClient, DEFAULT_FORECAST_DAYS};

use crate::chat::ChatStore;
use crate::error::AppError;

const RECOMMENDATIONS_KEY: &str = "recommendations";
const PEST_GUIDE_KEY: &str = "pestGuide";

#[derive(Clone)]
pub struct Advisor {
    openai: Arc<OpenAiClient>,
    weather: Arc<WeatherClient>,
    model: String,
}

impl Advisor {
    pub fn new(openai: Arc<OpenAiClient>, weather: Arc<WeatherClient>, model: String) -> Self {
        Self {
            openai,
            weather,
            model,
        }
    }

    pub async fn recommend_crops(
        &self,
        request: &CropRequest,
        language: Language,
    ) -> Result<Vec<CropRecommendation>, AppError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::MissingFields(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }

        let prompt = crop_prompt(request, language);
        let text = self
            .openai
            .complete(&self.model, vec![Message::user(prompt)])
            .await?;

        let recommendations = parse_recommendations(&text).inspect_err(|e| {
            warn!(error = %e, "could not extract crop recommendations from model output");
        })?;
        info!(
            location = %request.location,
            count = recommendations.len(),
            "crop recommendations ready"
        );
        Ok(recommendations)
    }

    pub async fn pest_guide(
        &self,
        pest: &str,
        crop: &str,
        language: Language,
        line_width: usize,
    ) -> Result<(PestGuide, GuideDocument), AppError> {
        let pest = pest.trim();
        if pest.is_empty() {
            return Err(AppError::EmptyInput("pest"));
        }
        let crop = crop.trim();
        if crop.is_empty() {
            return Err(AppError::EmptyInput("crop"));
        }

        let prompt = pest_prompt(pest, crop, language);
        let text = self
            .openai
            .complete(&self.model, vec![Message::user(prompt)])
            .await?;

        let (guide, document) = parse_pest_guide(&text, line_width).inspect_err(|e| {
            warn!(error = %e, pest, crop, "could not build pest guide from model output");
        })?;
        info!(pest, crop, lines = document.len(), "pest guide ready");
        Ok((guide, document))
    }

    /// Run one chat turn. The session log only grows once the model has replied.
    pub async fn chat(
        &self,
        store: &ChatStore,
        session_id: &str,
        question: &str,
    ) -> Result<(String, Vec<Message>), AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::EmptyInput("message"));
        }

        let session = store
            .get(session_id)
            .await
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))?;

        let mut messages = Vec::with_capacity(session.messages().len() + 2);
        messages.push(Message::system(chat_system_prompt(session.language())));
        messages.extend(session.messages().iter().cloned());
        messages.push(Message::user(question));

        let reply = self.openai.complete(&self.model, messages).await?;
        let history = store.record_turn(session_id, question, &reply).await?;
        Ok((reply, history))
    }

    pub async fn weather(&self, location: &str, days: usize) -> Result<WeatherResponse, AppError> {
        let coordinates = weather::coordinates(location)
            .ok_or_else(|| AppError::UnknownLocation(location.to_string()))?;

        let current = self.weather.current(coordinates).await?;
        let forecast = self.weather.forecast(coordinates).await?;
        let days = days.clamp(1, DEFAULT_FORECAST_DAYS);

        Ok(WeatherResponse {
            location: location.trim().to_lowercase(),
            coordinates,
            wind_direction: weather::wind_direction(current.wind.deg).to_string(),
            current,
            forecast: weather::daily_forecast(&forecast, days),
        })
    }
}

pub fn parse_recommendations(text: &str) -> Result<Vec<CropRecommendation>, AppError> {
    Ok(extract_as::<Vec<CropRecommendation>>(text, Some(RECOMMENDATIONS_KEY))?)
}

/// Extract a pest guide and lay it out. Field presence is checked by the formatter
/// first so a missing field is reported by name.
pub fn parse_pest_guide(
    text: &str,
    line_width: usize,
) -> Result<(PestGuide, GuideDocument), AppError> {
    let record = extract(text, Some(PEST_GUIDE_KEY))?;
    let document = guide::format(&record, line_width)?;
    let guide: PestGuide = serde_json::from_value(record)
        .map_err(|e| farm_common::error::ExtractionError::InvalidJson(e.to_string()))?;
    Ok((guide, document))
}

fn with_language(mut prompt: String, language: Language) -> String {
    if let Some(instruction) = language.reply_instruction() {
        prompt.push_str("\n\n");
        prompt.push_str(&instruction);
    }
    prompt
}

pub fn crop_prompt(request: &CropRequest, language: Language) -> String {
    let mut details = format!(
        "Location: {}\nSoil type: {}\nTemperature: {}\nRainfall: {}\nFarming goal: {}",
        request.location.trim(),
        request.soil_type.trim(),
        request.temperature.trim(),
        request.rainfall.trim(),
        request.farming_goal.trim(),
    );
    if let Some(ph) = request.soil_ph {
        details.push_str(&format!("\nSoil pH: {ph:.1}"));
    }
    if let Some(size) = request.farm_size_hectares {
        details.push_str(&format!("\nFarm size: {size} hectares"));
    }

    let prompt = format!(
        "You are an agronomist advising smallholder farmers in Nigeria. Recommend the three \
most suitable crops for this farm.\n\n{details}\n\n\
Respond with JSON only, in a ```json code block, shaped as:\n\
{{\"recommendations\": [{{\"name\": string, \"suitability\": number 0-100, \
\"plantingTime\": string, \"harvestTime\": string, \"waterNeeds\": \"Low\"|\"Medium\"|\"High\", \
\"tempRange\": string, \"soilType\": string, \"pHRange\": string, \"growthDuration\": days, \
\"profitabilityIndex\": number 0-5, \"additionalTips\": string}}]}}"
    );
    with_language(prompt, language)
}

pub fn pest_prompt(pest: &str, crop: &str, language: Language) -> String {
    let prompt = format!(
        "You are a crop protection specialist. Give management guidance for the pest \
\"{pest}\" affecting {crop}.\n\n\
Respond with JSON only, in a ```json code block, shaped as:\n\
{{\"name\": string, \"scientificName\": string, \"affectedCrop\": string, \
\"severity\": expected yield loss percentage as a number, \"description\": how to identify the \
pest and its damage, \"strategies\": {{\"organic\": [string], \"chemical\": [string with dosage], \
\"prevention\": [string]}}}}"
    );
    with_language(prompt, language)
}

pub fn chat_system_prompt(language: Language) -> String {
    with_language(
        "You are a friendly farming assistant for smallholder farmers in Nigeria. Give \
practical advice on crops, pests, fertilizer, soil and weather. Keep answers short and ask for \
the crop or location when you need it."
            .to_string(),
        language,
    )
}
