// src/localize/speech.rs
//! Speech synthesis backends. Synthesis is best-effort: a failure yields
//! "no audio" for that language and nothing else.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize `text` with `voice` and write the audio bytes to `dest`.
    async fn synthesize(&self, text: &str, voice: &str, dest: &Path) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Generic HTTP synthesis client: POSTs `{text, voice}` and expects audio
/// bytes back. Works against any self-hosted TTS bridge.
pub struct HttpTtsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTtsClient {
    pub fn new(endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-blog-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client");
        Self { http, endpoint }
    }
}

#[async_trait]
impl SpeechBackend for HttpTtsClient {
    async fn synthesize(&self, text: &str, voice: &str, dest: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
            voice: &'a str,
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&Req { text, voice })
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("synthesis request returned {status}");
        }
        let bytes = resp.bytes().await.context("reading audio bytes")?;
        if bytes.is_empty() {
            bail!("synthesis returned no audio");
        }
        write_audio(dest, &bytes).await
    }

    fn name(&self) -> &'static str {
        "http-tts"
    }
}

/// Write audio to a temp file and rename, so the destination is either
/// complete or absent.
pub async fn write_audio(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating audio dir {}", parent.display()))?;
    }
    let tmp = dest.with_extension("mp3.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, dest)
        .await
        .with_context(|| format!("renaming into {}", dest.display()))?;
    Ok(())
}
