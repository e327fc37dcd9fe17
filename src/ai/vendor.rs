//! Request/response shapes for the supported text-generation vendors.
//!
//! The vendor is chosen by configuration, never guessed from the key or URL.
//! Each adapter turns a prompt into a [`VendorRequest`] and pulls the reply
//! text back out of the vendor's JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::ai::client::VendorError;
use crate::config::GenAiConfig;

pub const SYSTEM_PROMPT: &str = "You are a helpful task management assistant. Generate task suggestions in JSON format.";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 1000;

pub const CHAT_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const CHAT_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const PARTS_DEFAULT_MODEL: &str = "gemini-pro";
pub const GENERIC_DEFAULT_MODEL: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorKind {
    /// `messages: [system, user]` in, `choices[0].message.content` out.
    #[serde(rename = "chat", alias = "openai")]
    ChatCompletion,
    /// `contents[0].parts[0].text` in, `candidates[0].content.parts[0].text` out.
    #[serde(rename = "parts", alias = "gemini")]
    PromptParts,
    /// `{prompt}` in, `text | content | response` out.
    #[serde(rename = "generic")]
    Generic,
}

impl VendorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::ChatCompletion => "chat",
            VendorKind::PromptParts => "parts",
            VendorKind::Generic => "generic",
        }
    }
}

impl FromStr for VendorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" | "openai" | "chat_completion" => Ok(VendorKind::ChatCompletion),
            "parts" | "gemini" | "prompt_parts" => Ok(VendorKind::PromptParts),
            "generic" => Ok(VendorKind::Generic),
            other => Err(format!("unknown vendor '{}', expected chat, parts or generic", other)),
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved outbound call.
#[derive(Debug, Clone)]
pub struct VendorRequest {
    pub url: Url,
    pub bearer: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

pub trait VendorAdapter: Send + Sync {
    fn kind(&self) -> VendorKind;

    fn build_request(&self, prompt: &str) -> Result<VendorRequest, VendorError>;

    /// Reply text, or an empty string when the document has none.
    fn parse_response(&self, body: &Value) -> String;
}

/// Pick the adapter named by `config.provider`.
pub fn adapter_for(config: &GenAiConfig) -> Result<Box<dyn VendorAdapter>, VendorError> {
    let api_key = config.api_key.clone().ok_or(VendorError::MissingApiKey)?;
    let settings = AdapterSettings {
        api_key,
        api_url: config.api_url.clone(),
        model: config.model.clone(),
        extra_headers: config.extra_headers.clone(),
    };
    Ok(match config.provider {
        VendorKind::ChatCompletion => Box::new(ChatCompletionAdapter(settings)),
        VendorKind::PromptParts => Box::new(PromptPartsAdapter(settings)),
        VendorKind::Generic => Box::new(GenericAdapter(settings)),
    })
}

#[derive(Debug, Clone)]
struct AdapterSettings {
    api_key: String,
    api_url: Option<String>,
    model: Option<String>,
    extra_headers: BTreeMap<String, String>,
}

impl AdapterSettings {
    fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }
}

fn parse_url(raw: &str) -> Result<Url, VendorError> {
    Url::parse(raw).map_err(|e| VendorError::InvalidUrl(format!("{}: {}", raw, e)))
}

/// First non-empty string among `pointers`.
fn first_text(body: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| body.pointer(p).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

pub struct ChatCompletionAdapter(AdapterSettings);

impl VendorAdapter for ChatCompletionAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::ChatCompletion
    }

    fn build_request(&self, prompt: &str) -> Result<VendorRequest, VendorError> {
        let request = ChatRequest {
            model: self.0.model_or(CHAT_DEFAULT_MODEL),
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: prompt.to_string() },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        Ok(VendorRequest {
            url: parse_url(self.0.api_url.as_deref().unwrap_or(CHAT_DEFAULT_URL))?,
            bearer: Some(self.0.api_key.clone()),
            headers: self.0.extra_headers.clone(),
            body: serde_json::to_value(request)?,
        })
    }

    fn parse_response(&self, body: &Value) -> String {
        first_text(body, &["/choices/0/message/content", "/choices/0/text"]).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartsRequest {
    contents: Vec<PartsContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct PartsContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

pub struct PromptPartsAdapter(AdapterSettings);

impl VendorAdapter for PromptPartsAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::PromptParts
    }

    fn build_request(&self, prompt: &str) -> Result<VendorRequest, VendorError> {
        let base = match &self.0.api_url {
            Some(url) => url.clone(),
            None => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.0.model_or(PARTS_DEFAULT_MODEL)
            ),
        };
        let mut url = parse_url(&base)?;
        url.query_pairs_mut().append_pair("key", &self.0.api_key);

        let request = PartsRequest {
            contents: vec![PartsContent {
                parts: vec![Part { text: format!("{}\n\n{}", SYSTEM_PROMPT, prompt) }],
            }],
            generation_config: GenerationConfig { temperature: TEMPERATURE, max_output_tokens: MAX_TOKENS },
        };
        Ok(VendorRequest {
            url,
            bearer: None,
            headers: self.0.extra_headers.clone(),
            body: serde_json::to_value(request)?,
        })
    }

    fn parse_response(&self, body: &Value) -> String {
        first_text(body, &["/candidates/0/content/parts/0/text", "/candidates/0/content/text", "/text"]).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct GenericRequest {
    prompt: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

pub struct GenericAdapter(AdapterSettings);

impl VendorAdapter for GenericAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::Generic
    }

    fn build_request(&self, prompt: &str) -> Result<VendorRequest, VendorError> {
        let raw_url = self.0.api_url.as_deref().ok_or(VendorError::MissingUrl(VendorKind::Generic))?;
        let request = GenericRequest {
            prompt: prompt.to_string(),
            model: self.0.model_or(GENERIC_DEFAULT_MODEL),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        Ok(VendorRequest {
            url: parse_url(raw_url)?,
            bearer: Some(self.0.api_key.clone()),
            headers: self.0.extra_headers.clone(),
            body: serde_json::to_value(request)?,
        })
    }

    /// Falls back to the whole document so a plain-JSON reply can still be parsed.
    fn parse_response(&self, body: &Value) -> String {
        first_text(body, &["/text", "/content", "/response"]).unwrap_or_else(|| body.to_string())
    }
}
