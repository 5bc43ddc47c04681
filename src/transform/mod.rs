// src/transform/mod.rs
//! Turns a raw candidate item into a polished article draft.
//!
//! Generative mode issues one chat-completions call and parses the reply
//! (strict JSON, then salvage). Degraded local mode is deterministic and
//! never touches the network, so the pipeline stays fully exercisable with
//! no credentials configured. In both modes `category` and the source
//! provenance are copied verbatim from the input, never taken from
//! generated text.

pub mod parse;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::collect::types::CandidateItem;
use crate::config::GeneratorConfig;
use crate::error::PipelineError;

const SYSTEM_PROMPT: &str =
    "You are a professional AI technology analyst. Always respond with valid JSON.";

const DEGRADED_SUMMARY_CAP: usize = 200;
const DEGRADED_CONTENT_CAP: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransformedArticle {
    pub original_title: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub category: String,
    pub source_url: String,
    pub source_name: String,
}

/// Generative-text backend: one synchronous request/response, no streaming.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// OpenAI-compatible chat-completions client. Covers openai/glm/deepseek,
/// which all speak the same wire format.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn new(cfg: &GeneratorConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-blog-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: cfg.resolved_base_url(),
            api_key,
            model: cfg.resolved_model(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system_prompt,
                },
                Msg {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("completion request returned {status}");
        }
        let body: Resp = resp.json().await.context("decoding completion body")?;
        match body.choices.into_iter().next() {
            Some(c) => Ok(c.message.content),
            None => bail!("completion response had no choices"),
        }
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

pub struct Transformer {
    backend: Option<Arc<dyn TextGenerator>>,
    max_input_chars: usize,
}

impl Transformer {
    pub fn new(backend: Option<Arc<dyn TextGenerator>>, max_input_chars: usize) -> Self {
        Self {
            backend,
            max_input_chars,
        }
    }

    /// Build from config: credentials present → generative mode, otherwise
    /// degraded local mode.
    pub fn from_config(cfg: &GeneratorConfig, max_input_chars: usize) -> Self {
        match cfg.resolved_api_key() {
            Some(key) => {
                info!(provider = %cfg.provider, model = %cfg.resolved_model(), "generator ready");
                Self::new(
                    Some(Arc::new(ChatCompletionsClient::new(cfg, key))),
                    max_input_chars,
                )
            }
            None => {
                warn!("no generator credentials; running in degraded local mode");
                Self::new(None, max_input_chars)
            }
        }
    }

    pub async fn process(&self, item: &CandidateItem) -> Result<TransformedArticle, PipelineError> {
        let Some(backend) = &self.backend else {
            return Ok(self.degraded(item));
        };

        let user_prompt = build_prompt(item, self.max_input_chars);
        let raw = backend
            .complete(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|e| PipelineError::TransformFailure {
                title: item.title.clone(),
                reason: format!("{e:#}"),
            })?;

        let parsed = parse::parse_response(&raw, &item.title);
        if !parsed.origins.is_strict() {
            warn!(title = %item.title, "strict parse failed; salvaged fields");
        }

        Ok(TransformedArticle {
            original_title: item.title.clone(),
            title: parsed.draft.title,
            summary: parsed.draft.summary,
            content: parsed.draft.content,
            keywords: parsed.draft.keywords,
            category: item.category.clone(),
            source_url: item.url.clone(),
            source_name: item.source.clone(),
        })
    }

    /// Deterministic local transformation: no network, total.
    pub fn degraded(&self, item: &CandidateItem) -> TransformedArticle {
        TransformedArticle {
            original_title: item.title.clone(),
            title: format!("[Analysis] {}", item.title),
            summary: truncate_chars(&item.summary, DEGRADED_SUMMARY_CAP),
            content: truncate_chars(&item.content, DEGRADED_CONTENT_CAP),
            keywords: vec!["AI".to_string(), "Technology".to_string()],
            category: item.category.clone(),
            source_url: item.url.clone(),
            source_name: item.source.clone(),
        }
    }

    /// Transform a batch; failed items are logged and dropped.
    pub async fn process_batch(&self, items: &[CandidateItem]) -> Vec<TransformedArticle> {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            info!(n = i + 1, total = items.len(), title = %item.title, "transforming");
            match self.process(item).await {
                Ok(article) => out.push(article),
                Err(e) => warn!(error = %e, "item skipped"),
            }
        }
        out
    }
}

fn build_prompt(item: &CandidateItem, max_input_chars: usize) -> String {
    let body = truncate_chars(&item.content, max_input_chars);
    format!(
        r#"Transform the following raw article content into a professional, in-depth analysis article.

## Requirements:
1. **Title**: Create a compelling, professional title (not clickbait)
2. **Summary**: Write a concise 2-3 sentence summary highlighting the key insights
3. **Content**: Rewrite as a professional analysis article with a clear introduction,
   detailed analysis, industry implications, and well-structured paragraphs.
   Target length: 1000-2000 words, markdown format.
4. **Keywords**: Extract 3-5 relevant keywords/tags

## Raw Article:
Title: {title}
Source: {source}
Content:
{body}

## Output Format (JSON):
{{
    "title": "...",
    "summary": "...",
    "content": "...",
    "keywords": ["keyword1", "keyword2", "keyword3"]
}}"#,
        title = item.title,
        source = item.source,
        body = body,
    )
}

fn truncate_chars(s: &str, cap: usize) -> String {
    if s.chars().count() <= cap {
        s.to_string()
    } else {
        s.chars().take(cap).collect()
    }
}
