use farm_common::error::{ExtractionError, GuideError};
use farm_common::openai::OpenAiClientError;
use farm_common::weather::WeatherError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Guide(#[from] GuideError),

    #[error("model call failed: {0}")]
    Model(#[from] OpenAiClientError),

    #[error("weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown chat session: {0}")]
    UnknownSession(String),
}
