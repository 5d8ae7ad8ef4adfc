/// MCP server for farm advisory tools.
///
/// Model-backed tools (`recommend_crops`, `pest_guide`, `send_chat`) make one model
/// call per invocation. `extract_json`, `format_guide` and `wind_direction` are pure
/// and work without any upstream service.
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use farm_common::extract::extract;
use farm_common::guide;
use farm_common::language::Language;
use farm_common::mcp_api::{
    ChatReplyResponse, EndChatParams, ExtractJsonParams, ExtractJsonResponse, FormatGuideParams,
    FormatGuideResponse, OkResponse, PestGuideParams, PestGuideResponse, RecommendCropsParams,
    RecommendCropsResponse, SendChatParams, StartChatParams, StartChatResponse, WeatherParams,
    WeatherResponse, WindDirectionParams, WindDirectionResponse,
};
use farm_common::weather::{self, DEFAULT_FORECAST_DAYS};

use crate::advisor::Advisor;
use crate::chat::ChatStore;
use crate::config::Config;

const DEFAULT_LINES_PER_PAGE: usize = 40;

#[derive(Clone)]
pub struct FarmAdvisorServer {
    advisor: Advisor,
    chats: ChatStore,
    config: Config,
    tool_router: ToolRouter<FarmAdvisorServer>,
}

impl FarmAdvisorServer {
    pub fn new(advisor: Advisor, chats: ChatStore, config: Config) -> Self {
        Self {
            advisor,
            chats,
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn language(&self, requested: Option<Language>) -> Language {
        requested.unwrap_or(self.config.default_language)
    }

    fn line_width(&self, requested: Option<u32>) -> usize {
        requested
            .filter(|&w| w > 0)
            .map(|w| w as usize)
            .unwrap_or(self.config.guide_line_width)
    }
}

#[tool_router]
impl FarmAdvisorServer {
    #[tool(description = "Recommend crops for a farm from its location, soil type, temperature, rainfall and farming goal. Returns suitability-ranked crop records.")]
    async fn recommend_crops(
        &self,
        Parameters(params): Parameters<RecommendCropsParams>,
    ) -> Result<Json<RecommendCropsResponse>, String> {
        let language = self.language(params.language);
        let recommendations = self
            .advisor
            .recommend_crops(&params.request, language)
            .await
            .map_err(|e| format!("recommend_crops failed: {e}"))?;
        Ok(Json(RecommendCropsResponse { recommendations }))
    }

    #[tool(description = "Get a pest management guide (identification, organic, chemical and prevention strategies) for a pest on a crop. Returns the record and a printable line layout.")]
    async fn pest_guide(
        &self,
        Parameters(params): Parameters<PestGuideParams>,
    ) -> Result<Json<PestGuideResponse>, String> {
        let language = self.language(params.language);
        let width = self.line_width(params.line_width);
        let (guide, document) = self
            .advisor
            .pest_guide(&params.pest, &params.crop, language, width)
            .await
            .map_err(|e| format!("pest_guide failed: {e}"))?;
        let text = document.to_plain_text();
        Ok(Json(PestGuideResponse {
            guide,
            document,
            text,
        }))
    }

    #[tool(description = "Extract the JSON object embedded in raw model output (fenced ```json block or bare braces), optionally unwrapping a top-level envelope key.")]
    async fn extract_json(
        &self,
        Parameters(params): Parameters<ExtractJsonParams>,
    ) -> Result<Json<ExtractJsonResponse>, String> {
        let envelope_key = params
            .envelope_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        let payload = extract(&params.text, envelope_key).map_err(|e| e.to_string())?;
        Ok(Json(ExtractJsonResponse { payload }))
    }

    #[tool(description = "Lay out a pest guide record as word-wrapped, style-tagged lines split into pages for document rendering.")]
    async fn format_guide(
        &self,
        Parameters(params): Parameters<FormatGuideParams>,
    ) -> Result<Json<FormatGuideResponse>, String> {
        let width = self.line_width(params.line_width);
        let per_page = params
            .lines_per_page
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_LINES_PER_PAGE);

        let document = guide::format(&params.record, width).map_err(|e| e.to_string())?;
        let pages = document
            .paginate(per_page)
            .into_iter()
            .map(<[_]>::to_vec)
            .collect();
        Ok(Json(FormatGuideResponse {
            pages,
            text: document.to_plain_text(),
        }))
    }

    #[tool(description = "Start a farming assistant chat session in the given language and return its session_id and greeting.")]
    async fn start_chat(
        &self,
        Parameters(params): Parameters<StartChatParams>,
    ) -> Result<Json<StartChatResponse>, String> {
        let language = self.language(params.language);
        let session = self.chats.start(language).await;
        info!(session_id = session.id(), %language, "chat session started");
        Ok(Json(StartChatResponse {
            session_id: session.id().to_string(),
            greeting: language.greeting().to_string(),
            input_placeholder: language.input_placeholder().to_string(),
        }))
    }

    #[tool(description = "Send a farmer's question to a chat session. Returns the assistant reply and the full ordered session history.")]
    async fn send_chat(
        &self,
        Parameters(params): Parameters<SendChatParams>,
    ) -> Result<Json<ChatReplyResponse>, String> {
        let (reply, history) = self
            .advisor
            .chat(&self.chats, &params.session_id, &params.message)
            .await
            .map_err(|e| format!("send_chat failed: {e}"))?;
        Ok(Json(ChatReplyResponse { reply, history }))
    }

    #[tool(description = "End a chat session and discard its history.")]
    async fn end_chat(
        &self,
        Parameters(params): Parameters<EndChatParams>,
    ) -> Result<Json<OkResponse>, String> {
        let ok = self.chats.end(&params.session_id).await;
        Ok(Json(OkResponse { ok }))
    }

    #[tool(description = "Current weather and a daily forecast (up to 7 days) for a Nigerian state, with wind direction as a compass point.")]
    async fn get_weather(
        &self,
        Parameters(params): Parameters<WeatherParams>,
    ) -> Result<Json<WeatherResponse>, String> {
        let days = params
            .days
            .map(|d| d as usize)
            .unwrap_or(DEFAULT_FORECAST_DAYS);
        let report = self
            .advisor
            .weather(&params.location, days)
            .await
            .map_err(|e| format!("get_weather failed: {e}"))?;
        Ok(Json(report))
    }

    #[tool(description = "Convert a wind bearing in degrees to a 16-point compass direction (N, NNE, ... NNW).")]
    async fn wind_direction(
        &self,
        Parameters(params): Parameters<WindDirectionParams>,
    ) -> Result<Json<WindDirectionResponse>, String> {
        if !params.degrees.is_finite() {
            return Err("degrees must be a finite number".to_string());
        }
        Ok(Json(WindDirectionResponse {
            direction: weather::wind_direction(params.degrees).to_string(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for FarmAdvisorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "farm-advisor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Farm advisory MCP server for Nigerian smallholder farmers. Use recommend_crops \
for crop suggestions, pest_guide for pest management, get_weather for forecasts, and \
start_chat/send_chat/end_chat for free-form questions. extract_json and format_guide expose the \
response parsing and guide layout used by the other tools."
                    .to_string(),
            ),
        }
    }
}
