// src/config.rs
//! Pipeline configuration: one explicit value built at process start and
//! passed by reference into each component constructor. Loads from a TOML
//! file (env-overridable path) and falls back to built-in seeds; API keys
//! resolve through environment variables so the file never carries secrets.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::scoring::ScoringConfig;

pub const ENV_CONFIG_PATH: &str = "CURATOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/curator.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sources: SourcesConfig,
    pub content: ContentConfig,
    pub scoring: ScoringConfig,
    pub generator: GeneratorConfig,
    pub translation: TranslationConfig,
    pub speech: SpeechConfig,
    pub paths: PathsConfig,
}

impl PipelineConfig {
    /// Resolve the config path (explicit arg → $CURATOR_CONFIG_PATH →
    /// `config/curator.toml`) and load it. A missing file is not an error:
    /// the built-in seed configuration is returned instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading pipeline config at {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;
        Ok(cfg)
    }
}

/* ----------------------------
Feed sources
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub feeds: Vec<FeedSourceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            feeds: default_feed_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Lower value = fetched and ranked earlier in priority ordering.
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Editorial trust tier, 1–10. Feeds into the quality base score.
    #[serde(default = "default_quality_tier")]
    pub quality_tier: u8,
}

fn default_category() -> String {
    "AI".to_string()
}
fn default_priority() -> i32 {
    1
}
fn default_quality_tier() -> u8 {
    5
}

/// Built-in feed catalog used when no config file provides one.
fn default_feed_seed() -> Vec<FeedSourceConfig> {
    let seed: [(&str, &str, i32, u8); 8] = [
        ("OpenAI Blog", "https://openai.com/blog/rss.xml", 1, 10),
        ("Anthropic Blog", "https://www.anthropic.com/news/rss.xml", 1, 9),
        ("Google AI Blog", "https://blog.google/technology/ai/rss/", 1, 9),
        ("DeepMind Blog", "https://deepmind.com/blog/rss.xml", 1, 9),
        (
            "MIT Technology Review AI",
            "https://www.technologyreview.com/feed/",
            2,
            8,
        ),
        (
            "VentureBeat AI",
            "https://venturebeat.com/category/artificial-intelligence/feed/",
            2,
            7,
        ),
        ("The Gradient", "https://thegradient.pub/rss/", 2, 7),
        ("Synced AI", "https://syncedreview.com/feed/", 2, 7),
    ];
    seed.into_iter()
        .map(|(name, url, priority, quality_tier)| FeedSourceConfig {
            name: name.to_string(),
            url: url.to_string(),
            category: default_category(),
            priority,
            quality_tier,
        })
        .collect()
}

/* ----------------------------
Content limits & batch shape
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOrder {
    /// Composite score descending (ties keep input order).
    Composite,
    /// (priority, published time) ascending.
    Priority,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Entries whose body text is shorter than this are dropped.
    pub min_content_chars: usize,
    /// Stored summary cap.
    pub summary_cap: usize,
    /// Stored body cap.
    pub content_cap: usize,
    /// Body budget handed to the generative backend per request.
    pub max_input_chars: usize,
    /// Entries taken per feed per run.
    pub per_source_cap: usize,
    /// Default item cap for a full pipeline run.
    pub posts_per_run: usize,
    pub order: BatchOrder,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 200,
            summary_cap: 500,
            content_cap: 10_000,
            max_input_chars: 6_000,
            per_source_cap: 10,
            posts_per_run: 3,
            order: BatchOrder::Composite,
        }
    }
}

/* ----------------------------
Generative backend
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// "openai" | "glm" | "deepseek" — all speak the chat-completions format.
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// "ENV" means: resolve through LLM_API_KEY and per-provider fallbacks.
    pub api_key: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 2000,
            api_key: "ENV".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn resolved_model(&self) -> String {
        if let Some(m) = &self.model {
            return m.clone();
        }
        match self.provider.to_ascii_lowercase().as_str() {
            "openai" => "gpt-4o-mini",
            "glm" => "glm-4-flash",
            _ => "deepseek-chat",
        }
        .to_string()
    }

    pub fn resolved_base_url(&self) -> String {
        if let Some(b) = &self.base_url {
            return b.trim_end_matches('/').to_string();
        }
        match self.provider.to_ascii_lowercase().as_str() {
            "openai" => "https://api.openai.com/v1",
            "glm" => "https://open.bigmodel.cn/api/paas/v4",
            _ => "https://api.deepseek.com",
        }
        .to_string()
    }

    /// None means: run in degraded local mode, no network call.
    pub fn resolved_api_key(&self) -> Option<String> {
        let k = self.api_key.trim();
        if !k.is_empty() && !k.eq_ignore_ascii_case("env") {
            return Some(k.to_string());
        }
        for var in ["LLM_API_KEY", "DEEPSEEK_API_KEY", "GLM_API_KEY", "OPENAI_API_KEY"] {
            if let Ok(v) = env::var(var) {
                if !v.trim().is_empty() {
                    return Some(v.trim().to_string());
                }
            }
        }
        None
    }
}

/* ----------------------------
Translation & speech
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Lowercase locale of the articles as written, e.g. "en".
    pub source_lang: String,
    /// Lowercase target locales, e.g. ["zh", "ja"].
    pub target_langs: Vec<String>,
    /// "ENV" means: resolve through DEEPL_API_KEY.
    pub api_key: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_langs: vec!["zh".to_string(), "ja".to_string()],
            api_key: "ENV".to_string(),
        }
    }
}

impl TranslationConfig {
    /// None means: placeholder translations, no network call.
    pub fn resolved_api_key(&self) -> Option<String> {
        let k = self.api_key.trim();
        if !k.is_empty() && !k.eq_ignore_ascii_case("env") {
            return Some(k.to_string());
        }
        env::var("DEEPL_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// HTTP synthesis endpoint returning audio bytes. None disables speech.
    pub endpoint: Option<String>,
    /// Locale → voice id.
    pub voices: HashMap<String, String>,
    /// Wall-clock budget for all synthesis tasks of one article.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let mut voices = HashMap::new();
        for (lang, voice) in [
            ("en", "en-US-AriaNeural"),
            ("zh", "zh-CN-XiaoxiaoNeural"),
            ("ja", "ja-JP-NanamiNeural"),
        ] {
            voices.insert(lang.to_string(), voice.to_string());
        }
        Self {
            enabled: true,
            endpoint: None,
            voices,
            timeout_secs: 120,
        }
    }
}

/* ----------------------------
Content tree & state paths
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source-language article tree.
    pub blog_dir: PathBuf,
    /// Per-locale article trees live under `<i18n_dir>/<locale>/`.
    pub i18n_dir: PathBuf,
    /// Synthesized audio tracks live under `<audio_dir>/<slug>/`.
    pub audio_dir: PathBuf,
    /// Deduplication ledger file.
    pub ledger_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blog_dir: PathBuf::from("blog"),
            i18n_dir: PathBuf::from("i18n"),
            audio_dir: PathBuf::from("static/audio"),
            ledger_path: PathBuf::from("data/seen_ids.txt"),
        }
    }
}
