use crate::usage::UsageTracker;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use vigia_core::narrative::{AssessmentFacts, NarrativeProvider, ResearchFindings};
use vigia_core::{EngineError, EngineResult};
use vigia_shared::EntityType;

/// Narrative collaborator backed by an OpenAI-compatible chat-completions
/// endpoint. Failures surface as `CollaboratorUnavailable`; callers are
/// expected to degrade to local signals.
pub struct OpenAiNarrativeProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    tracker: Option<Arc<UsageTracker>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TokenUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAiNarrativeProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        tracker: Option<Arc<UsageTracker>>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            tracker,
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        temperature: f32,
        operation: &str,
    ) -> EngineResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::CollaboratorUnavailable(format!("narrative: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, operation, "narrative provider returned error status");
            return Err(EngineError::CollaboratorUnavailable(format!(
                "narrative: HTTP {status}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::CollaboratorUnavailable(format!("narrative: {e}")))?;

        if let (Some(tracker), Some(usage)) = (self.tracker.as_ref(), body.usage.as_ref()) {
            tracker.record_request(
                &self.model,
                operation,
                usage.prompt_tokens,
                usage.completion_tokens,
            );
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(operation, chars = content.len(), "narrative provider responded");
        Ok(content)
    }
}

#[async_trait]
impl NarrativeProvider for OpenAiNarrativeProvider {
    async fn research_news(
        &self,
        name: &str,
        entity_type: EntityType,
        country: Option<&str>,
    ) -> EngineResult<ResearchFindings> {
        let country_context = country
            .map(|c| format!(" based in {c}"))
            .unwrap_or_default();
        let prompt = format!(
            "You are a compliance research assistant for customs brokers. Research the entity \
             \"{name}\" ({entity_type}{country_context}) and identify potential risk indicators: \
             negative news, compliance violations, regulatory investigations, suspicious business \
             practices. Only report information you actually find; if nothing is found, return an \
             empty newsItems array.\n\n\
             Return a JSON object: {{\"newsItems\": [{{\"headline\": \"...\", \"source\": \"...\", \
             \"date\": \"YYYY-MM-DD\", \"sentiment\": \"negative|neutral|positive\", \
             \"excerpt\": \"...\"}}], \"tradingPatterns\": [], \"riskFlags\": [\"...\"], \
             \"summary\": \"...\"}}"
        );

        let content = self
            .complete(
                "You are a compliance research assistant. Always return valid JSON.",
                prompt,
                0.7,
                "research_news",
            )
            .await?;

        let json = extract_json(&content);
        serde_json::from_str(json).map_err(|e| {
            EngineError::CollaboratorUnavailable(format!("narrative: unparseable response: {e}"))
        })
    }

    async fn summarize_assessment(&self, facts: &AssessmentFacts) -> EngineResult<String> {
        let checks = facts
            .entity_checks
            .iter()
            .map(|(role, status)| format!("- {role}: {status}"))
            .collect::<Vec<_>>()
            .join("\n");
        let flags = if facts.flags.is_empty() {
            "None".to_string()
        } else {
            facts
                .flags
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = format!(
            "As a customs compliance assistant, synthesize this risk assessment into a 2-3 \
             sentence summary that explains the overall risk level and the most concerning \
             aspects.\n\nEntity verification:\n{checks}\n\nBlacklist status:\n- 60B list: {}\n\
             - Approved manufacturer: {}\n\nPattern analysis:\n{}\n\nRisk flags:\n{flags}\n\n\
             Return only the summary text, no JSON.",
            facts.on_tax_list, facts.approved_manufacturer, facts.pattern_analysis
        );

        let text = self
            .complete(
                "You are a customs compliance expert. Provide clear, concise risk assessments.",
                prompt,
                0.6,
                "summarize_assessment",
            )
            .await?;
        Ok(text.trim().to_string())
    }
}

/// Pull a JSON object out of a response that may wrap it in markdown
/// fences or surrounding prose. Returns the original text when no
/// balanced object is found.
pub fn extract_json(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return text;
    };
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[start..start + offset + ch.len_utf8()];
                }
            }
            _ => {}
        }
    }
    text
}
