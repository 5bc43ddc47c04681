// tests/publish_artifacts.rs
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use ai_blog_curator::localize::{LocalizedBundle, LocalizedText};
use ai_blog_curator::{slugify, Publisher, TransformedArticle};

fn article() -> TransformedArticle {
    TransformedArticle {
        original_title: "Raw Title".to_string(),
        title: "Claude 3.5: A New Era!".to_string(),
        summary: "A short summary of the piece.".to_string(),
        content: "The full body of the article.".to_string(),
        keywords: vec!["AI".to_string(), "Assistants".to_string()],
        category: "AI".to_string(),
        source_url: "https://example.test/raw".to_string(),
        source_name: "Example Feed".to_string(),
    }
}

fn bundle() -> LocalizedBundle {
    let mut translations = BTreeMap::new();
    for lang in ["zh", "ja"] {
        translations.insert(
            lang.to_string(),
            LocalizedText {
                title: format!("[{lang}] title"),
                summary: format!("[{lang}] summary"),
                content: format!("[{lang}] content"),
            },
        );
    }
    LocalizedBundle {
        translations,
        audio_paths: BTreeMap::new(),
    }
}

fn publisher(root: &std::path::Path) -> Publisher {
    Publisher::new(root.join("blog"), root.join("i18n"), "en".to_string())
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()
}

#[test]
fn slug_has_the_safe_charset_and_length() {
    let slug = slugify("Claude 3.5: A New Era!");
    assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    assert!(!slug.starts_with('-'));
    assert!(!slug.ends_with('-'));
    assert!(slug.chars().count() <= 50);
}

#[test]
fn publish_writes_one_file_per_locale() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = publisher(tmp.path());

    let artifact = publisher
        .publish_on(&article(), Some(&bundle()), date())
        .unwrap();

    assert_eq!(artifact.slug, "claude-35-a-new-era");
    assert_eq!(artifact.date, "2026-01-06");
    assert_eq!(artifact.files.len(), 3);

    let en = tmp
        .path()
        .join("blog/2026-01-06-claude-35-a-new-era/index.md");
    let zh: PathBuf = tmp
        .path()
        .join("i18n/zh/2026-01-06-claude-35-a-new-era/index.md");
    assert!(en.exists());
    assert!(zh.exists());

    let en_page = fs::read_to_string(&en).unwrap();
    assert!(en_page.starts_with("---\nslug: claude-35-a-new-era\n"));
    assert!(en_page.contains("source_name: Example Feed"));
    assert!(en_page.contains("The full body of the article."));
    // No audio reference without an audio track.
    assert!(!en_page.contains("<audio"));

    let zh_page = fs::read_to_string(&zh).unwrap();
    assert!(zh_page.contains("[zh] content"));
}

#[test]
fn republishing_the_same_day_overwrites_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = publisher(tmp.path());

    let first = publisher
        .publish_on(&article(), Some(&bundle()), date())
        .unwrap();

    let mut updated = article();
    updated.content = "Revised body.".to_string();
    let second = publisher
        .publish_on(&updated, Some(&bundle()), date())
        .unwrap();

    assert_eq!(first.files["en"], second.files["en"]);
    let page = fs::read_to_string(&second.files["en"]).unwrap();
    assert!(page.contains("Revised body."));
    assert!(!page.contains("The full body of the article."));

    // Still exactly one source-language page for this slug+date.
    let dir = tmp.path().join("blog");
    let entries: Vec<_> = fs::read_dir(&dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn audio_tracks_are_referenced_in_the_page() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = publisher(tmp.path());

    let mut b = bundle();
    b.audio_paths
        .insert("en".to_string(), PathBuf::from("static/audio/slug/en.mp3"));
    b.audio_paths
        .insert("zh".to_string(), PathBuf::from("static/audio/slug/zh.mp3"));

    let artifact = publisher.publish_on(&article(), Some(&b), date()).unwrap();
    let en_page = fs::read_to_string(&artifact.files["en"]).unwrap();
    assert!(en_page.contains("<audio controls src=\"/audio/claude-35-a-new-era/en.mp3\">"));

    let zh_page = fs::read_to_string(&artifact.files["zh"]).unwrap();
    assert!(zh_page.contains("/audio/claude-35-a-new-era/zh.mp3"));

    // "ja" has a translation but no audio: page exists, no audio element.
    let ja_page = fs::read_to_string(&artifact.files["ja"]).unwrap();
    assert!(!ja_page.contains("<audio"));
    assert_eq!(artifact.audio_paths.len(), 2);
}

#[test]
fn publish_without_bundle_writes_only_the_source_page() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = publisher(tmp.path());

    let artifact = publisher.publish_on(&article(), None, date()).unwrap();
    assert_eq!(artifact.files.len(), 1);
    assert!(artifact.files.contains_key("en"));
    assert!(artifact.audio_paths.is_empty());
}
