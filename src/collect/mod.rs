// src/collect/mod.rs
pub mod rss;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::{BatchOrder, ContentConfig, FeedSourceConfig};
use crate::error::PipelineError;
use crate::ledger::SeenLedger;
use crate::scoring::Scorer;
use types::{identity, CandidateItem, FeedFetcher, ScoredItem};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collect_entries_total", "Entries retrieved from feeds.");
        describe_counter!("collect_kept_total", "Entries kept after dedup + scoring.");
        describe_counter!("collect_seen_total", "Entries skipped by the ledger.");
        describe_counter!("collect_short_total", "Entries below the content minimum.");
        describe_counter!(
            "collect_irrelevant_total",
            "Entries below the relevance cutoff."
        );
        describe_counter!("collect_source_errors_total", "Feed fetch/parse errors.");
        describe_gauge!("collect_last_run_ts", "Unix ts when collection last ran.");
    });
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

fn truncate_chars(s: &str, cap: usize) -> String {
    if s.chars().count() <= cap {
        s.to_string()
    } else {
        s.chars().take(cap).collect()
    }
}

/// Combines the ledger, the scorer, and the feed catalog into one ranked
/// batch of new candidate items. Collection is at-most-once: a kept entry is
/// recorded in the ledger before the batch is handed downstream.
pub struct Collector<F: FeedFetcher> {
    fetcher: F,
    ledger: SeenLedger,
    scorer: Scorer,
    sources: Vec<FeedSourceConfig>,
    limits: ContentConfig,
}

impl<F: FeedFetcher> Collector<F> {
    pub fn new(
        fetcher: F,
        ledger: SeenLedger,
        scorer: Scorer,
        sources: Vec<FeedSourceConfig>,
        limits: ContentConfig,
    ) -> Self {
        Self {
            fetcher,
            ledger,
            scorer,
            sources,
            limits,
        }
    }

    /// Collect from all configured sources. A single source failure is
    /// logged and contributes zero items; the batch continues.
    pub async fn collect_all(&mut self) -> Vec<ScoredItem> {
        ensure_metrics_described();

        let sources = self.sources.clone();
        let mut all = Vec::new();
        for src in &sources {
            match self.collect_from_source(src).await {
                Ok(mut items) => {
                    info!(source = %src.name, kept = items.len(), "source collected");
                    all.append(&mut items);
                }
                Err(e) => {
                    let err = PipelineError::SourceFailure {
                        source_name: src.name.clone(),
                        reason: format!("{e:#}"),
                    };
                    warn!(error = %err, "source skipped");
                    counter!("collect_source_errors_total").increment(1);
                }
            }
        }

        match self.limits.order {
            BatchOrder::Composite => {
                // Stable sort: ties keep input order.
                all.sort_by(|a, b| {
                    b.composite
                        .partial_cmp(&a.composite)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            BatchOrder::Priority => {
                all.sort_by_key(|s| (s.item.priority, s.item.published_unix.unwrap_or(i64::MAX)));
            }
        }

        counter!("collect_kept_total").increment(all.len() as u64);
        gauge!("collect_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        all
    }

    async fn collect_from_source(&mut self, src: &FeedSourceConfig) -> anyhow::Result<Vec<ScoredItem>> {
        let entries = self.fetcher.fetch_feed(&src.url).await?;
        counter!("collect_entries_total").increment(entries.len() as u64);

        let mut kept = Vec::new();
        for entry in entries.into_iter().take(self.limits.per_source_cap) {
            let id = identity(&entry.link, &entry.title);
            if self.ledger.has_seen(&id) {
                counter!("collect_seen_total").increment(1);
                continue;
            }

            let title = normalize_text(&entry.title);
            let summary = truncate_chars(&normalize_text(&entry.summary), self.limits.summary_cap);

            // Body fallback order: embedded content → summary → fetched page.
            let mut content = entry
                .content
                .as_deref()
                .map(normalize_text)
                .unwrap_or_default();
            if content.is_empty() {
                content = normalize_text(&entry.summary);
            }
            if content.is_empty() && !entry.link.is_empty() {
                content = match self.fetcher.fetch_page_text(&entry.link).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = ?e, url = %entry.link, "page fetch failed");
                        String::new()
                    }
                };
            }
            if content.chars().count() < self.limits.min_content_chars {
                counter!("collect_short_total").increment(1);
                continue;
            }
            let content = truncate_chars(&content, self.limits.content_cap);

            let relevance = self.scorer.relevance(&title, &summary);
            if relevance < self.scorer.relevance_cutoff() {
                counter!("collect_irrelevant_total").increment(1);
                continue;
            }
            let quality = self
                .scorer
                .quality(&title, &summary, entry.published.as_deref(), src.quality_tier);
            let composite = Scorer::composite(relevance, quality);

            let item = CandidateItem {
                id: id.clone(),
                title,
                url: entry.link.clone(),
                source: src.name.clone(),
                category: src.category.clone(),
                published_unix: entry
                    .published
                    .as_deref()
                    .and_then(rss::parse_rfc2822_to_unix),
                published: entry.published,
                summary,
                content,
                collected_at: chrono::Utc::now().to_rfc3339(),
                priority: src.priority,
            };

            // Mark before the item leaves the collector, so a downstream
            // crash cannot re-emit it on the next run.
            self.ledger.mark_seen(&id)?;
            kept.push(ScoredItem {
                item,
                relevance,
                quality,
                composite,
            });
        }
        Ok(kept)
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }
}
