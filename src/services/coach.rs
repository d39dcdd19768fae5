use crate::domain::fallback::generate_fallback;
use crate::domain::habits::HabitList;
use crate::domain::plan::{Plan, PlanShapeError};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequestArgs, Role,
};
use async_openai::{config::OpenAIConfig, Client};
use tokio::time::{timeout, Duration};

const MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str =
    "You are a helpful habit-building coach. Always respond with valid JSON.";

/// Why a remote plan attempt produced nothing usable. Every variant is
/// absorbed by [`CoachService::generate_plan`]; none reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("assistant is not configured")]
    Disabled,
    #[error("request timed out")]
    Timeout,
    #[error("openai request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("response contained no message content")]
    EmptyResponse,
    #[error("response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response JSON did not match the plan shape: {0}")]
    Shape(#[from] PlanShapeError),
}

pub struct CoachService {
    client: Option<Client<OpenAIConfig>>,
}

impl CoachService {
    /// Without an API key the service runs disabled and every plan comes
    /// from the deterministic fallback.
    pub fn new(api_key: Option<String>) -> Self {
        let client = api_key.map(|key| {
            let config = OpenAIConfig::new().with_api_key(key);
            Client::with_config(config)
        });
        Self { client }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Always returns a valid plan: the remote attempt on success, the
    /// fallback otherwise. A single attempt, no retries.
    pub async fn generate_plan(&self, habits: &HabitList) -> Plan {
        match self.request_plan(habits).await {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!("Plan generation failed ({err}), using fallback plan");
                generate_fallback(habits)
            }
        }
    }

    async fn request_plan(&self, habits: &HabitList) -> Result<Plan, GenerationError> {
        let client = self.client.as_ref().ok_or(GenerationError::Disabled)?;

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: SYSTEM_PROMPT.to_string(),
                role: Role::System,
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(build_prompt(habits)),
                role: Role::User,
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(MODEL)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(2000u16)
            .build()?;

        let response = timeout(REQUEST_TIMEOUT, client.chat().create(request))
            .await
            .map_err(|_| GenerationError::Timeout)??;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(GenerationError::EmptyResponse)?;

        parse_plan(&content, habits.len())
    }
}

pub fn build_prompt(habits: &HabitList) -> String {
    format!(
        "Create a detailed 7-day habit-building plan for these habits: {}\n\
         \n\
         For each day (Day 1 through Day 7), provide:\n\
         1. Specific, actionable tasks for each habit\n\
         2. A motivational message or tip\n\
         3. Realistic goals that build progressively\n\
         \n\
         Format the response as JSON with this structure:\n\
         {{\n\
             \"overview\": \"Brief overview of the plan\",\n\
             \"days\": [\n\
                 {{\n\
                     \"day\": 1,\n\
                     \"date_label\": \"Day 1\",\n\
                     \"habits\": [\n\
                         {{\n\
                             \"habit\": \"habit name\",\n\
                             \"task\": \"specific task for today\",\n\
                             \"motivation\": \"motivational message\"\n\
                         }}\n\
                     ],\n\
                     \"daily_tip\": \"General tip for the day\"\n\
                 }}\n\
             ]\n\
         }}\n\
         \n\
         Make it encouraging, realistic, and progressively challenging.",
        habits.joined()
    )
}

/// Parses model output into a validated plan, tolerating a surrounding
/// markdown code fence.
pub fn parse_plan(raw: &str, habit_count: usize) -> Result<Plan, GenerationError> {
    let cleaned = strip_code_fence(raw.trim());
    let plan: Plan = serde_json::from_str(cleaned)?;
    plan.validate(habit_count)?;
    Ok(plan)
}

fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
