// src/collect/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One raw feed entry as retrieved, before identity/scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

/// A candidate accepted into the batch. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub published: Option<String>,
    /// Unix seconds parsed from `published` where the format allowed it.
    pub published_unix: Option<i64>,
    pub summary: String,
    pub content: String,
    /// RFC 3339 collection timestamp.
    pub collected_at: String,
    pub priority: i32,
}

/// A candidate plus its ranking signals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredItem {
    pub item: CandidateItem,
    pub relevance: f32,
    pub quality: f32,
    pub composite: f32,
}

/// Stable identity: a pure function of (url, title), so the same logical
/// item always re-hashes to the same id regardless of when it is fetched.
pub fn identity(url: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b":");
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Feed and page retrieval. Failures surface as errors here and are
/// contained by the collector; they never abort the batch.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<RawEntry>>;
    async fn fetch_page_text(&self, url: &str) -> Result<String>;
}
