// tests/collector_pipeline.rs
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use ai_blog_curator::config::{ContentConfig, FeedSourceConfig};
use ai_blog_curator::scoring::ScoringConfig;
use ai_blog_curator::{identity, Collector, FeedFetcher, RawEntry, Scorer, SeenLedger};

/// Feed fixture keyed by url; urls not present simulate an outage.
struct MapFetcher {
    feeds: HashMap<String, Vec<RawEntry>>,
    page_text: String,
}

#[async_trait]
impl FeedFetcher for MapFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<RawEntry>> {
        match self.feeds.get(url) {
            Some(entries) => Ok(entries.clone()),
            None => bail!("connection refused"),
        }
    }
    async fn fetch_page_text(&self, _url: &str) -> Result<String> {
        Ok(self.page_text.clone())
    }
}

fn source(name: &str, url: &str) -> FeedSourceConfig {
    FeedSourceConfig {
        name: name.to_string(),
        url: url.to_string(),
        category: "AI".to_string(),
        priority: 1,
        quality_tier: 8,
    }
}

fn relevant_entry(title: &str, link: &str) -> RawEntry {
    RawEntry {
        title: title.to_string(),
        link: link.to_string(),
        summary: "ChatGPT workflow automation tutorial for productivity".to_string(),
        content: Some("ChatGPT saves time in daily workflows. ".repeat(10)),
        published: Some("Tue, 06 Jan 2026 10:00:00 GMT".to_string()),
    }
}

fn open_ledger(dir: &tempfile::TempDir) -> SeenLedger {
    SeenLedger::open(dir.path().join("seen.txt")).unwrap()
}

#[tokio::test]
async fn one_failing_source_does_not_abort_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let mut feeds = HashMap::new();
    feeds.insert(
        "https://good.test/feed".to_string(),
        vec![relevant_entry("Fresh ChatGPT guide for teams", "https://good.test/a")],
    );
    // "https://down.test/feed" is absent → fetch error.

    let mut collector = Collector::new(
        MapFetcher {
            feeds,
            page_text: String::new(),
        },
        open_ledger(&tmp),
        Scorer::new(&ScoringConfig::default()),
        vec![
            source("Down", "https://down.test/feed"),
            source("Good", "https://good.test/feed"),
        ],
        ContentConfig::default(),
    );

    let batch = collector.collect_all().await;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].item.source, "Good");
}

#[tokio::test]
async fn empty_content_falls_back_to_fetched_page_text() {
    let tmp = tempfile::tempdir().unwrap();
    let mut entry = relevant_entry(
        "ChatGPT workflow automation guide without body",
        "https://good.test/b",
    );
    entry.content = None;
    entry.summary = String::new();

    let mut feeds = HashMap::new();
    feeds.insert("https://good.test/feed".to_string(), vec![entry]);

    let mut collector = Collector::new(
        MapFetcher {
            feeds,
            page_text: "Recovered page body about ChatGPT workflows. ".repeat(10),
        },
        open_ledger(&tmp),
        Scorer::new(&ScoringConfig::default()),
        vec![source("Good", "https://good.test/feed")],
        ContentConfig::default(),
    );

    let batch = collector.collect_all().await;
    assert_eq!(batch.len(), 1);
    assert!(batch[0].item.content.contains("Recovered page body"));
}

#[tokio::test]
async fn preseeded_identity_yields_zero_new_items() {
    let tmp = tempfile::tempdir().unwrap();
    let entry = relevant_entry("Known ChatGPT story from before", "https://good.test/c");

    let mut ledger = open_ledger(&tmp);
    ledger
        .mark_seen(&identity(&entry.link, &entry.title))
        .unwrap();

    let mut feeds = HashMap::new();
    feeds.insert("https://good.test/feed".to_string(), vec![entry]);

    let mut collector = Collector::new(
        MapFetcher {
            feeds,
            page_text: String::new(),
        },
        ledger,
        Scorer::new(&ScoringConfig::default()),
        vec![source("Good", "https://good.test/feed")],
        ContentConfig::default(),
    );

    let batch = collector.collect_all().await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn per_source_cap_limits_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let entries: Vec<RawEntry> = (0..30)
        .map(|i| {
            relevant_entry(
                &format!("ChatGPT productivity update number {i}"),
                &format!("https://good.test/item/{i}"),
            )
        })
        .collect();

    let mut feeds = HashMap::new();
    feeds.insert("https://good.test/feed".to_string(), entries);

    let limits = ContentConfig {
        per_source_cap: 5,
        ..Default::default()
    };
    let mut collector = Collector::new(
        MapFetcher {
            feeds,
            page_text: String::new(),
        },
        open_ledger(&tmp),
        Scorer::new(&ScoringConfig::default()),
        vec![source("Good", "https://good.test/feed")],
        limits,
    );

    let batch = collector.collect_all().await;
    assert_eq!(batch.len(), 5);
}
