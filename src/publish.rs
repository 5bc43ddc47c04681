// src/publish.rs
//! Deterministic artifact placement: (date, slug) addresses an article's
//! directory in each locale tree; republishing the same pair overwrites in
//! place. Each file is written to a temp path and renamed so a partial
//! write never leaves a torn page behind.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{PathsConfig, TranslationConfig};
use crate::error::PipelineError;
use crate::localize::LocalizedBundle;
use crate::transform::TransformedArticle;

pub const SLUG_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 160;

/// Lowercase, keep `[a-z0-9 -]`, whitespace runs → single hyphen, trim
/// hyphens, cap the length.
pub fn slugify(title: &str) -> String {
    static RE_STRIP: OnceCell<Regex> = OnceCell::new();
    let re_strip = RE_STRIP.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let lower = title.to_lowercase();
    let stripped = re_strip.replace_all(&lower, "");
    let hyphenated = re_ws.replace_all(stripped.trim(), "-");
    let capped: String = hyphenated.chars().take(SLUG_MAX_CHARS).collect();
    capped.trim_matches('-').to_string()
}

/// Terminal, persisted record of one published article.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedArtifact {
    pub slug: String,
    pub date: String,
    /// Locale → written file, source language included.
    pub files: BTreeMap<String, PathBuf>,
    pub audio_paths: BTreeMap<String, PathBuf>,
}

pub struct Publisher {
    blog_dir: PathBuf,
    i18n_dir: PathBuf,
    source_lang: String,
}

impl Publisher {
    pub fn new(blog_dir: PathBuf, i18n_dir: PathBuf, source_lang: String) -> Self {
        Self {
            blog_dir,
            i18n_dir,
            source_lang,
        }
    }

    pub fn from_config(paths: &PathsConfig, translation: &TranslationConfig) -> Self {
        Self::new(
            paths.blog_dir.clone(),
            paths.i18n_dir.clone(),
            translation.source_lang.clone(),
        )
    }

    /// Publish under today's date.
    pub fn publish(
        &self,
        article: &TransformedArticle,
        bundle: Option<&LocalizedBundle>,
    ) -> Result<PublishedArtifact, PipelineError> {
        self.publish_on(article, bundle, Local::now().date_naive())
    }

    /// Publish under an explicit date. Locale writes are independent: one
    /// failure does not stop the others, but any failure is surfaced as a
    /// `PublishFailure` for the item.
    pub fn publish_on(
        &self,
        article: &TransformedArticle,
        bundle: Option<&LocalizedBundle>,
        date: NaiveDate,
    ) -> Result<PublishedArtifact, PipelineError> {
        let slug = slugify(&article.title);
        let date_str = date.format("%Y-%m-%d").to_string();
        let dir_name = format!("{date_str}-{slug}");

        let audio_paths = bundle
            .map(|b| b.audio_paths.clone())
            .unwrap_or_default();

        let mut files = BTreeMap::new();
        let mut failures = Vec::new();

        // Source-language page under the primary tree.
        let source_file = self.blog_dir.join(&dir_name).join("index.md");
        let page = render_page(
            &slug,
            &article.title,
            &article.summary,
            &article.keywords,
            &article.source_url,
            &article.source_name,
            &article.content,
            audio_paths
                .contains_key(&self.source_lang)
                .then(|| audio_ref(&slug, &self.source_lang)),
        );
        match write_page(&source_file, &page) {
            Ok(()) => {
                info!(path = %source_file.display(), "published source page");
                files.insert(self.source_lang.clone(), source_file);
            }
            Err(e) => failures.push(format!("{}: {e:#}", self.source_lang)),
        }

        // One page per translated locale.
        if let Some(bundle) = bundle {
            for (lang, text) in &bundle.translations {
                let file = self.i18n_dir.join(lang).join(&dir_name).join("index.md");
                let page = render_page(
                    &slug,
                    &text.title,
                    &text.summary,
                    &article.keywords,
                    &article.source_url,
                    &article.source_name,
                    &text.content,
                    audio_paths
                        .contains_key(lang)
                        .then(|| audio_ref(&slug, lang)),
                );
                match write_page(&file, &page) {
                    Ok(()) => {
                        info!(path = %file.display(), lang = %lang, "published locale page");
                        files.insert(lang.clone(), file);
                    }
                    Err(e) => {
                        warn!(error = ?e, lang = %lang, "locale write failed");
                        failures.push(format!("{lang}: {e:#}"));
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(PublishedArtifact {
                slug,
                date: date_str,
                files,
                audio_paths,
            })
        } else {
            Err(PipelineError::PublishFailure {
                slug,
                reason: failures.join("; "),
            })
        }
    }
}

fn audio_ref(slug: &str, lang: &str) -> String {
    format!("\n<audio controls src=\"/audio/{slug}/{lang}.mp3\"></audio>\n")
}

#[allow(clippy::too_many_arguments)]
fn render_page(
    slug: &str,
    title: &str,
    summary: &str,
    keywords: &[String],
    source_url: &str,
    source_name: &str,
    body: &str,
    audio: Option<String>,
) -> String {
    let frontmatter = render_frontmatter(slug, title, summary, keywords, source_url, source_name);
    let audio_section = audio.unwrap_or_default();
    format!("{frontmatter}# {title}\n\n{audio_section}\n{body}\n\n<!-- truncate -->\n")
}

fn render_frontmatter(
    slug: &str,
    title: &str,
    summary: &str,
    keywords: &[String],
    source_url: &str,
    source_name: &str,
) -> String {
    let tags = keywords
        .iter()
        .map(|k| format!("\"{}\"", k.replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(", ");
    let description: String = summary.chars().take(DESCRIPTION_MAX_CHARS).collect();
    format!(
        "---\nslug: {slug}\ntitle: \"{title}\"\nauthors: [ai-editor]\ntags: [{tags}]\ndescription: \"{description}\"\nsource_url: {source_url}\nsource_name: {source_name}\n---\n\n",
        title = title.replace('"', "\\\""),
        description = description.replace('"', "\\\""),
    )
}

/// Create-or-overwrite with write-then-rename so each file is all-or-nothing.
fn write_page(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .context("page path has no parent directory")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    let tmp = path.with_extension("md.tmp");
    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(contents.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
    }
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
