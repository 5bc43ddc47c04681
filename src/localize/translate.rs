// src/localize/translate.rs
//! Text translation backends.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Language codes are lowercase locales ("en", "zh", "ja").
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// DeepL v2 client. Free-tier keys (suffix ":fx") route to the free host.
pub struct DeepLClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DeepLClient {
    pub fn new(api_key: String) -> Self {
        let base_url = if api_key.ends_with(":fx") {
            "https://api-free.deepl.com"
        } else {
            "https://api.deepl.com"
        }
        .to_string();
        let http = reqwest::Client::builder()
            .user_agent("ai-blog-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl TranslationBackend for DeepLClient {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Resp {
            translations: Vec<Translation>,
        }
        #[derive(Deserialize)]
        struct Translation {
            text: String,
        }

        let url = format!("{}/v2/translate", self.base_url);
        let params = [
            ("auth_key", self.api_key.as_str()),
            ("text", text),
            ("source_lang", &source_lang.to_ascii_uppercase()),
            ("target_lang", &target_lang.to_ascii_uppercase()),
        ];
        let resp = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("translate request returned {status}");
        }
        let body: Resp = resp.json().await.context("decoding translate body")?;
        match body.translations.into_iter().next() {
            Some(t) => Ok(t.text),
            None => bail!("translate response was empty"),
        }
    }

    fn name(&self) -> &'static str {
        "deepl"
    }
}

/// Used when no translation credentials are configured: keeps downstream
/// shapes valid by emitting a tagged excerpt of the source text.
pub struct PlaceholderTranslator;

const EXCERPT_CHARS: usize = 100;

#[async_trait]
impl TranslationBackend for PlaceholderTranslator {
    async fn translate(&self, text: &str, _source_lang: &str, target_lang: &str) -> Result<String> {
        let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
        Ok(format!("[{} translation] {}...", target_lang, excerpt))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_tags_language_and_truncates() {
        let long = "word ".repeat(100);
        let out = PlaceholderTranslator
            .translate(&long, "en", "zh")
            .await
            .unwrap();
        assert!(out.starts_with("[zh translation] "));
        assert!(out.chars().count() < 130);
    }

    #[test]
    fn free_tier_keys_use_the_free_host() {
        let free = DeepLClient::new("abc:fx".to_string());
        assert_eq!(free.base_url, "https://api-free.deepl.com");
        let paid = DeepLClient::new("abc".to_string());
        assert_eq!(paid.base_url, "https://api.deepl.com");
    }
}
