use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AiConfig;

/// Keys a generated plan must carry to be accepted
pub const REQUIRED_SECTIONS: [&str; 4] = ["push_day", "pull_day", "legs_day", "diet_plan"];

const PARSE_FAILURE_NOTE: &str = "AI response could not be parsed. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("AI service is not configured")]
    NotConfigured,

    #[error("AI service returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("No content generated from AI")]
    EmptyCompletion,

    #[error("Invalid AI endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// A chat-completion backend that turns a prompt into text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, PlanError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client pointed at Groq by default
pub struct GroqClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GroqClient {
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self, PlanError> {
        let endpoint = Url::parse(&config.base_url)?.join("chat/completions")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, PlanError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        info!(model = %self.model, "sending plan request to AI service");
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default().chars().take(800).collect();
            return Err(PlanError::Upstream { status, body });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(PlanError::EmptyCompletion)
    }
}

/// Profile submitted by the AI planner form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessForm {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub height: Option<Value>,
    pub weight: Option<Value>,
    pub fitness_goal: Option<String>,
    pub lifestyle: Option<String>,
    pub medical_conditions: Option<String>,
    pub diet_preference: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn display_value(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

impl WellnessForm {
    pub fn validate(&self) -> Result<(), String> {
        let age = self.age.filter(|age| *age != 0);
        if present(&self.name).is_none() || age.is_none() || present(&self.fitness_goal).is_none() {
            return Err("Missing required fields: name, age, and fitnessGoal are required".to_string());
        }
        if !matches!(age, Some(1..=120)) {
            return Err("Age must be between 1 and 120".to_string());
        }
        Ok(())
    }

    /// Build the coaching prompt; assumes `validate` passed
    pub fn prompt(&self) -> String {
        let name = present(&self.name).unwrap_or_default();
        let goal = present(&self.fitness_goal).unwrap_or_default();
        let diet = present(&self.diet_preference).unwrap_or("flexible");
        let height = display_value(&self.height).unwrap_or_else(|| "not specified".into());
        let weight = display_value(&self.weight).unwrap_or_else(|| "not specified".into());

        format!(
            "You are a professional fitness and nutrition coach. Based on the user's profile, generate a full \
**Indian gym-based workout and diet plan**, personalized to the given details.

User details:
- Name: {name}
- Age: {age}
- Gender: {gender}
- Height: {height} cm
- Weight: {weight} kg
- Fitness Goal: {goal}
- Lifestyle: {lifestyle}
- Medical Conditions: {medical}
- Diet Preference: {diet}

Your response should be **structured in this exact JSON format**:

{template}

Guidelines for Indian fitness context:
- Include popular Indian gym exercises and equipment commonly available
- Consider Indian dietary preferences and food availability
- Include traditional Indian foods like dal, roti, paneer, curd, etc.
- Adjust protein sources based on diet preference (veg/non-veg)
- Consider Indian lifestyle factors and workout timing
- Include cost-effective supplement recommendations
- Provide realistic rest periods and progression plans
- Consider Indian weather conditions for cardio recommendations
- Include Indian fitness culture elements like morning walks, yoga integration

Please respond with only the JSON structure, no additional text.",
            age = self.age.unwrap_or_default(),
            gender = present(&self.gender).unwrap_or("not specified"),
            lifestyle = present(&self.lifestyle).unwrap_or("not specified"),
            medical = present(&self.medical_conditions).unwrap_or("none"),
            template = plan_template(diet),
        )
    }
}

fn plan_template(diet: &str) -> String {
    let template = json!({
        "push_day": {
            "exercises": [
                { "name": "Barbell Bench Press", "sets": "4x8-10", "rest": "2-3 min" },
                { "name": "Incline Dumbbell Press", "sets": "4x10-12", "rest": "90 sec" },
                { "name": "Overhead Press", "sets": "4x8", "rest": "2 min" },
                { "name": "Triceps Pushdown", "sets": "3x12", "rest": "60 sec" }
            ]
        },
        "pull_day": {
            "exercises": [
                { "name": "Deadlift", "sets": "4x5", "rest": "3-4 min" },
                { "name": "Lat Pulldown", "sets": "4x10", "rest": "90 sec" },
                { "name": "Barbell Row", "sets": "4x8", "rest": "2 min" },
                { "name": "Bicep Curls", "sets": "3x12", "rest": "60 sec" }
            ]
        },
        "legs_day": {
            "exercises": [
                { "name": "Back Squat", "sets": "4x8", "rest": "3 min" },
                { "name": "Leg Press", "sets": "4x12", "rest": "2 min" },
                { "name": "Romanian Deadlift", "sets": "3x10", "rest": "2 min" },
                { "name": "Calf Raises", "sets": "3x20", "rest": "45 sec" }
            ]
        },
        "cardio_HIIT": {
            "routine": [
                "HIIT treadmill run - 20 mins (1 min sprint + 1 min walk)",
                "Jump rope - 5 rounds of 1 minute",
                "Burpees - 3 sets of 15"
            ],
            "weekly_frequency": "3x/week post workout"
        },
        "fst7_day": {
            "target_muscle": "Chest or Biceps (depending on goal)",
            "routine": ["Cable Fly (FST7) - 7 sets x 12 reps, 30 sec rest"]
        },
        "diet_plan": {
            "type": format!("Indian {}", diet),
            "breakfast": [
                "Oats with almond milk, banana, and chia seeds",
                "Tofu or Paneer bhurji (Veg) / 3 boiled eggs + toast (Non-Veg)"
            ],
            "lunch": ["Brown rice, dal, sabzi, cucumber salad", "Grilled paneer or chicken breast"],
            "snacks": ["Peanuts or sprouts chaat", "Black coffee or green tea"],
            "dinner": ["Roti + sabzi + dal + salad", "Optional: Quinoa or daliya + curd"]
        },
        "supplements": [
            "Creatine Monohydrate (5g post workout)",
            "Plant-based protein or Whey (depending on preference)"
        ],
        "additional_recommendations": [
            "Hydration: At least 3L of water daily",
            "Sleep: 7-8 hours minimum",
            "Track progress weekly"
        ]
    });
    serde_json::to_string_pretty(&template).unwrap_or_default()
}

/// Plan returned to the client. `raw_content` and `parse_error` are only set when
/// the completion could not be parsed and `plan` holds the placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub plan: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl PlanOutcome {
    pub fn is_fallback(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// Remove a leading ```json or ``` fence and a trailing ``` fence
pub fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    let body = body.trim_start();
    body.trim_end().strip_suffix("```").unwrap_or(body).trim_end()
}

fn parse_complete(text: &str) -> Result<Value, String> {
    let plan: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let complete = REQUIRED_SECTIONS
        .iter()
        .all(|key| plan.get(key).is_some_and(|section| !section.is_null()));
    if complete {
        Ok(plan)
    } else {
        Err("Invalid plan structure".to_string())
    }
}

/// Outermost `{ ... }` span of free text
fn outer_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Interpret a completion as a plan, degrading to a placeholder rather than failing
pub fn parse_plan(content: &str) -> PlanOutcome {
    let error = match parse_complete(strip_fences(content)) {
        Ok(plan) => {
            return PlanOutcome {
                plan,
                raw_content: None,
                parse_error: None,
            }
        }
        Err(error) => error,
    };
    warn!(error = %error, "failed to parse AI response as a plan");

    if let Some(plan) = outer_object(content).and_then(|span| parse_complete(span).ok()) {
        debug!("extracted plan object from surrounding text");
        return PlanOutcome {
            plan,
            raw_content: None,
            parse_error: None,
        };
    }

    PlanOutcome {
        plan: fallback_plan(),
        raw_content: Some(content.to_string()),
        parse_error: Some(error),
    }
}

fn fallback_plan() -> Value {
    let exercises = json!({
        "exercises": [{ "name": PARSE_FAILURE_NOTE, "sets": "N/A", "rest": "N/A" }]
    });
    json!({
        "push_day": exercises.clone(),
        "pull_day": exercises.clone(),
        "legs_day": exercises,
        "cardio_HIIT": { "routine": [PARSE_FAILURE_NOTE], "weekly_frequency": "N/A" },
        "fst7_day": { "target_muscle": "N/A", "routine": [PARSE_FAILURE_NOTE] },
        "diet_plan": {
            "type": "N/A",
            "breakfast": [PARSE_FAILURE_NOTE],
            "lunch": [PARSE_FAILURE_NOTE],
            "snacks": [PARSE_FAILURE_NOTE],
            "dinner": [PARSE_FAILURE_NOTE]
        },
        "supplements": [PARSE_FAILURE_NOTE],
        "additional_recommendations": [PARSE_FAILURE_NOTE]
    })
}

/// Generates workout and diet plans through an optional completion backend
#[derive(Clone, Default)]
pub struct PlanService {
    client: Option<Arc<dyn CompletionClient>>,
}

impl PlanService {
    /// Groq-backed service, or a disabled one when no API key is configured
    pub fn from_config(config: &AiConfig) -> Result<Self, PlanError> {
        match config.api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => Ok(Self::with_client(Arc::new(GroqClient::new(config, key)?))),
            None => {
                warn!("GROQ_API_KEY is not set; plan generation is disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self { client: Some(client) }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn generate(&self, form: &WellnessForm) -> Result<PlanOutcome, PlanError> {
        let client = self.client.as_ref().ok_or(PlanError::NotConfigured)?;
        let content = client.complete(&form.prompt()).await?;
        debug!(chars = content.len(), "AI response received");
        Ok(parse_plan(&content))
    }
}
