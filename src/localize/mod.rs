// src/localize/mod.rs
//! Fans a transformed article out into the target languages, with optional
//! speech synthesis per language. The contract is best-effort per language:
//! a failed translation degrades that field to the source text, a failed or
//! timed-out synthesis yields no audio for that language, and neither ever
//! aborts the bundle.

pub mod speech;
pub mod translate;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::{PathsConfig, SpeechConfig, TranslationConfig};
use crate::error::PipelineError;
use crate::transform::TransformedArticle;
use speech::{HttpTtsClient, SpeechBackend};
use translate::{DeepLClient, PlaceholderTranslator, TranslationBackend};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedText {
    pub title: String,
    pub summary: String,
    pub content: String,
}

/// One article's fan-out. A language entry never implies an audio entry:
/// translation and synthesis fail independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedBundle {
    pub translations: BTreeMap<String, LocalizedText>,
    pub audio_paths: BTreeMap<String, PathBuf>,
}

pub struct Localizer {
    translator: Arc<dyn TranslationBackend>,
    speech: Option<Arc<dyn SpeechBackend>>,
    source_lang: String,
    target_langs: Vec<String>,
    voices: HashMap<String, String>,
    audio_dir: PathBuf,
    audio_timeout: Duration,
}

impl Localizer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        translator: Arc<dyn TranslationBackend>,
        speech: Option<Arc<dyn SpeechBackend>>,
        source_lang: String,
        target_langs: Vec<String>,
        voices: HashMap<String, String>,
        audio_dir: PathBuf,
        audio_timeout: Duration,
    ) -> Self {
        Self {
            translator,
            speech,
            source_lang,
            target_langs,
            voices,
            audio_dir,
            audio_timeout,
        }
    }

    /// Build from config: a resolved DeepL key selects the real client,
    /// otherwise placeholder translations keep the pipeline exercisable.
    pub fn from_config(
        translation: &TranslationConfig,
        speech_cfg: &SpeechConfig,
        paths: &PathsConfig,
    ) -> Self {
        let translator: Arc<dyn TranslationBackend> = match translation.resolved_api_key() {
            Some(key) => Arc::new(DeepLClient::new(key)),
            None => {
                warn!("no translation credentials; using placeholder translations");
                Arc::new(PlaceholderTranslator)
            }
        };
        let speech: Option<Arc<dyn SpeechBackend>> = match (&speech_cfg.endpoint, speech_cfg.enabled)
        {
            (Some(endpoint), true) => Some(Arc::new(HttpTtsClient::new(endpoint.clone()))),
            _ => None,
        };
        Self::new(
            translator,
            speech,
            translation.source_lang.clone(),
            translation.target_langs.clone(),
            speech_cfg.voices.clone(),
            paths.audio_dir.clone(),
            Duration::from_secs(speech_cfg.timeout_secs),
        )
    }

    pub fn target_langs(&self) -> &[String] {
        &self.target_langs
    }

    /// Produce one bundle covering all configured target languages.
    pub async fn localize(
        &self,
        article: &TransformedArticle,
        slug: &str,
        generate_audio: bool,
    ) -> LocalizedBundle {
        let mut bundle = LocalizedBundle::default();

        for lang in &self.target_langs {
            let text = LocalizedText {
                title: self.translate_field(&article.title, lang).await,
                summary: self.translate_field(&article.summary, lang).await,
                content: self.translate_field(&article.content, lang).await,
            };
            bundle.translations.insert(lang.clone(), text);
        }

        if generate_audio {
            if let Some(speech) = &self.speech {
                self.synthesize_all(speech, article, &mut bundle, slug).await;
            }
        }

        bundle
    }

    /// A failed call degrades to the source text for that field only.
    async fn translate_field(&self, text: &str, target_lang: &str) -> String {
        match self
            .translator
            .translate(text, &self.source_lang, target_lang)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                let err = PipelineError::LocalizationFailure {
                    lang: target_lang.to_string(),
                    reason: format!("{e:#}"),
                };
                warn!(error = %err, backend = self.translator.name(), "keeping source text");
                text.to_string()
            }
        }
    }

    /// One task per language, joined before the bundle is complete. The
    /// timeout aborts outstanding tasks rather than blocking the run.
    async fn synthesize_all(
        &self,
        speech: &Arc<dyn SpeechBackend>,
        article: &TransformedArticle,
        bundle: &mut LocalizedBundle,
        slug: &str,
    ) {
        let mut jobs: Vec<(String, String)> =
            vec![(self.source_lang.clone(), article.content.clone())];
        for (lang, text) in &bundle.translations {
            jobs.push((lang.clone(), text.content.clone()));
        }

        let mut handles = Vec::new();
        for (lang, text) in jobs {
            let Some(voice) = self.voices.get(&lang).cloned() else {
                warn!(lang = %lang, "no voice configured; skipping synthesis");
                continue;
            };
            let dest = self.audio_dir.join(slug).join(format!("{lang}.mp3"));
            let backend = Arc::clone(speech);
            let task_dest = dest.clone();
            let handle =
                tokio::spawn(async move { backend.synthesize(&text, &voice, &task_dest).await });
            handles.push((lang, dest, handle));
        }

        let deadline = tokio::time::Instant::now() + self.audio_timeout;
        for (lang, dest, mut handle) in handles {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(()))) => {
                    bundle.audio_paths.insert(lang, dest);
                }
                Ok(Ok(Err(e))) => {
                    warn!(error = ?e, lang = %lang, "speech synthesis failed");
                }
                Ok(Err(e)) => {
                    warn!(error = ?e, lang = %lang, "speech task did not finish");
                }
                Err(_) => {
                    handle.abort();
                    warn!(lang = %lang, "speech synthesis timed out");
                }
            }
        }
    }
}
