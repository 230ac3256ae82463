//! Network provider for GitHub Models / Azure AI Inference.
//!
//! Speaks the OpenAI-compatible chat-completions protocol over blocking HTTP.
//! Construction only stores configuration; the first request is the first
//! network I/O.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{Provider, ProviderError};
use crate::io::settings::{ConnectionSettings, ENV_GITHUB_TOKEN};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const GENERATE_SYSTEM_PROMPT: &str = "You are a senior developer. Generate production-ready code that follows \
TDD, OWASP security best practices, and Atomic Design principles. \
Return only code, no explanations.";

const AUDIT_SYSTEM_PROMPT: &str = "You are a security auditor. Analyze the following code for OWASP Top-10 \
vulnerabilities. Return a numbered list of findings, one per line.";

/// A reply wrapped entirely in one Markdown code fence.
static FENCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A\s*```[^\n]*\n(.*?)\n?```\s*\z").unwrap());

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct CopilotProvider {
    token: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for CopilotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopilotProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CopilotProvider {
    pub const KEY: &'static str = "copilot";

    pub fn new(
        token: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            token: token.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self, ProviderError> {
        let token = settings
            .github_token
            .as_deref()
            .ok_or(ProviderError::MissingCredential(ENV_GITHUB_TOKEN))?;
        Self::new(token, &settings.ai_endpoint, &settings.ai_model)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    #[instrument(skip_all, fields(model = %self.model))]
    fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        debug!(url = %self.completions_url(), "sending chat completion");
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.token)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "chat completion failed");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_reply(&body)
    }
}

impl Provider for CopilotProvider {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn generate_code(&self, prompt: &str, context: &str) -> Result<String, ProviderError> {
        let user = format!("Context:\n{context}\n\nRequest:\n{prompt}");
        let reply = self.chat(GENERATE_SYSTEM_PROMPT, &user)?;
        Ok(strip_code_fence(&reply))
    }

    fn audit_security(&self, code: &str) -> Result<Vec<String>, ProviderError> {
        let reply = self.chat(AUDIT_SYSTEM_PROMPT, code)?;
        Ok(split_findings(&reply))
    }
}

fn parse_reply(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::MalformedResponse(format!("invalid JSON: {err}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}

fn strip_code_fence(reply: &str) -> String {
    let inner = FENCED_RE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        // More than one block means the reply is not wrapped in a single fence.
        .filter(|body| !body.lines().any(|line| line.trim_start().starts_with("```")));
    match inner {
        Some(body) => format!("{}\n", body.trim_end()),
        None => reply.to_string(),
    }
}

fn split_findings(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
