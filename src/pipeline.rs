// src/pipeline.rs
//! Orchestrates one batch run: collect → transform → localize → publish.
//! Items flow strictly left to right; a failed item is counted and skipped,
//! never retried. An empty collection stops the run early.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::collect::types::{CandidateItem, FeedFetcher, ScoredItem};
use crate::collect::Collector;
use crate::localize::Localizer;
use crate::publish::{slugify, PublishedArtifact, Publisher};
use crate::transform::{TransformedArticle, Transformer};

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub collected: usize,
    pub transformed: usize,
    pub localized: usize,
    pub published: usize,
    pub failed: usize,
    pub articles: Vec<PublishedArtifact>,
    pub errors: Vec<String>,
}

pub struct Pipeline<F: FeedFetcher> {
    collector: Collector<F>,
    transformer: Transformer,
    localizer: Localizer,
    publisher: Publisher,
}

impl<F: FeedFetcher> Pipeline<F> {
    pub fn new(
        collector: Collector<F>,
        transformer: Transformer,
        localizer: Localizer,
        publisher: Publisher,
    ) -> Self {
        Self {
            collector,
            transformer,
            localizer,
            publisher,
        }
    }

    /// Run the full pipeline over one batch.
    pub async fn run(&mut self, max_items: Option<usize>, generate_audio: bool) -> RunSummary {
        let mut summary = RunSummary::default();

        info!("step 1: collecting candidate items");
        let mut batch = self.collector.collect_all().await;
        if batch.is_empty() {
            info!("no new items to process");
            return summary;
        }
        summary.collected = batch.len();
        if let Some(cap) = max_items {
            batch.truncate(cap);
        }

        info!(items = batch.len(), "step 2: transform, localize, publish");
        for scored in &batch {
            let item = &scored.item;
            let article = match self.transformer.process(item).await {
                Ok(a) => a,
                Err(e) => {
                    warn!(error = %e, title = %item.title, "item skipped");
                    summary.errors.push(e.to_string());
                    summary.failed += 1;
                    continue;
                }
            };
            summary.transformed += 1;

            let slug = slugify(&article.title);
            let bundle = self.localizer.localize(&article, &slug, generate_audio).await;
            summary.localized += 1;

            match self.publisher.publish(&article, Some(&bundle)) {
                Ok(artifact) => {
                    info!(slug = %artifact.slug, locales = artifact.files.len(), "published");
                    summary.articles.push(artifact);
                    summary.published += 1;
                }
                Err(e) => {
                    // Data loss for work already paid for: the one hard error.
                    error!(error = %e, "publish failed");
                    summary.errors.push(e.to_string());
                    summary.failed += 1;
                }
            }
        }

        info!(
            collected = summary.collected,
            transformed = summary.transformed,
            localized = summary.localized,
            published = summary.published,
            failed = summary.failed,
            "pipeline finished"
        );
        summary
    }

    /// Collect without transforming or publishing.
    pub async fn collect_only(&mut self) -> Vec<ScoredItem> {
        self.collector.collect_all().await
    }

    /// Transform a previously collected batch.
    pub async fn process_batch(&self, items: &[CandidateItem]) -> Vec<TransformedArticle> {
        self.transformer.process_batch(items).await
    }
}
