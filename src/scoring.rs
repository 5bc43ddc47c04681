// src/scoring.rs
//! Pure relevance/quality scoring. No I/O, suitable for unit tests and
//! offline tuning.
//!
//! Policy:
//! - Any exclusion-term match forces relevance to 0; the item is dropped
//!   regardless of other signals.
//! - Keyword tiers add +15 / +8 / +3 per occurrence, case-insensitively,
//!   over `title + " " + summary`.
//! - Quality = source tier base + structural bonuses (title length, summary
//!   length, recency token).
//! - Composite = 0.6 × relevance + 0.4 × quality; ranking only.

use chrono::{Datelike, Utc};
use serde::Deserialize;

pub const HIGH_WEIGHT: f32 = 15.0;
pub const MEDIUM_WEIGHT: f32 = 8.0;
pub const LOW_WEIGHT: f32 = 3.0;

pub const RELEVANCE_WEIGHT: f32 = 0.6;
pub const QUALITY_WEIGHT: f32 = 0.4;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Items scoring below this never enter the batch.
    pub relevance_cutoff: f32,
    pub high_keywords: Vec<String>,
    pub medium_keywords: Vec<String>,
    pub low_keywords: Vec<String>,
    pub exclude_terms: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            relevance_cutoff: 10.0,
            high_keywords: to_vec(&[
                // tools and products
                "ChatGPT",
                "Claude",
                "Gemini",
                "Midjourney",
                "Notion AI",
                // productivity scenarios
                "automation",
                "workflow",
                "productivity",
                "efficiency",
                "save time",
                "template",
                "tutorial",
                "how to",
                "guide",
                // feature news
                "feature",
                "update",
                "new release",
                "integration",
                "API",
            ]),
            medium_keywords: to_vec(&[
                "content creation",
                "writing",
                "marketing",
                "design",
                "customer service",
                "data analysis",
                "coding",
                "SEO",
                "AI tool",
                "AI assistant",
                "chatbot",
                "generator",
            ]),
            low_keywords: to_vec(&["AI", "ML", "automation", "tool", "tips"]),
            exclude_terms: to_vec(&[
                // academic research
                "arXiv",
                "paper",
                "research",
                "algorithm",
                "model architecture",
                "neural network",
                "training",
                "benchmark",
                "dataset",
                // off-topic science domains
                "quantum",
                "protein",
                "molecular",
                "physics",
                "biology",
            ]),
        }
    }
}

fn to_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compiled scorer: vocabularies lowercased once at construction.
#[derive(Debug, Clone)]
pub struct Scorer {
    relevance_cutoff: f32,
    high: Vec<String>,
    medium: Vec<String>,
    low: Vec<String>,
    exclude: Vec<String>,
}

impl Scorer {
    pub fn new(cfg: &ScoringConfig) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        Self {
            relevance_cutoff: cfg.relevance_cutoff,
            high: lower(&cfg.high_keywords),
            medium: lower(&cfg.medium_keywords),
            low: lower(&cfg.low_keywords),
            exclude: lower(&cfg.exclude_terms),
        }
    }

    pub fn relevance_cutoff(&self) -> f32 {
        self.relevance_cutoff
    }

    /// Relevance in [0, 100]. Exclusion terms dominate everything else.
    pub fn relevance(&self, title: &str, summary: &str) -> f32 {
        let text = format!("{} {}", title, summary).to_lowercase();

        if self.exclude.iter().any(|term| text.contains(term.as_str())) {
            return 0.0;
        }

        let mut score = 0.0;
        for kw in &self.high {
            score += HIGH_WEIGHT * occurrences(&text, kw) as f32;
        }
        for kw in &self.medium {
            score += MEDIUM_WEIGHT * occurrences(&text, kw) as f32;
        }
        for kw in &self.low {
            score += LOW_WEIGHT * occurrences(&text, kw) as f32;
        }
        score.min(100.0)
    }

    /// Quality in [0, 100], using the current calendar year for the recency
    /// bonus.
    pub fn quality(
        &self,
        title: &str,
        summary: &str,
        published: Option<&str>,
        quality_tier: u8,
    ) -> f32 {
        self.quality_at(title, summary, published, quality_tier, Utc::now().year())
    }

    /// Same policy with an injectable "current year" for deterministic tests.
    pub fn quality_at(
        &self,
        title: &str,
        summary: &str,
        published: Option<&str>,
        quality_tier: u8,
        now_year: i32,
    ) -> f32 {
        let mut score = f32::from(quality_tier) * 5.0;

        let title_len = title.chars().count();
        if (30..=100).contains(&title_len) {
            score += 10.0;
        } else if title_len < 20 {
            score -= 5.0;
        }

        if summary.chars().count() >= 200 {
            score += 10.0;
        }

        // Recency: the published string is free-form across feeds, so a
        // year-token check is the reliable common denominator.
        if let Some(p) = published {
            if p.contains(&now_year.to_string()) || p.contains(&(now_year - 1).to_string()) {
                score += 15.0;
            }
        }

        score.clamp(0.0, 100.0)
    }

    pub fn composite(relevance: f32, quality: f32) -> f32 {
        RELEVANCE_WEIGHT * relevance + QUALITY_WEIGHT * quality
    }
}

/// Non-overlapping substring occurrences. Empty needles never match.
fn occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        0
    } else {
        haystack.matches(needle).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> Scorer {
        Scorer::new(&ScoringConfig::default())
    }

    #[test]
    fn exclusion_beats_any_number_of_keywords() {
        let s = scorer();
        let title = "ChatGPT workflow automation guide with new quantum feature";
        assert_eq!(s.relevance(title, "productivity tutorial update"), 0.0);
    }

    #[test]
    fn each_occurrence_adds_weight() {
        let s = scorer();
        let one = s.relevance("ChatGPT", "");
        let two = s.relevance("ChatGPT ChatGPT", "");
        assert!(two > one);
    }

    #[test]
    fn relevance_clamps_on_pathological_input() {
        let s = scorer();
        let spam = "ChatGPT workflow ".repeat(500);
        let score = s.relevance(&spam, &spam);
        assert!(score <= 100.0);
        assert!(score >= 0.0);
    }

    #[test]
    fn quality_bonuses_and_penalties() {
        let s = scorer();
        // 31 chars → +10 on top of tier base.
        let good_title = "A mid-length headline for tests";
        assert_eq!(s.quality_at(good_title, "", None, 5, 2026), 35.0);
        // short title → −5
        assert_eq!(s.quality_at("Tiny title", "", None, 5, 2026), 20.0);
        // long summary → +10
        let long_summary = "x".repeat(200);
        assert_eq!(s.quality_at("Tiny title", &long_summary, None, 5, 2026), 30.0);
        // recency token → +15
        assert_eq!(
            s.quality_at("Tiny title", "", Some("Tue, 06 Jan 2026 10:00:00 GMT"), 5, 2026),
            35.0
        );
    }

    #[test]
    fn quality_clamps_to_bounds() {
        let s = scorer();
        let long_summary = "x".repeat(300);
        let good_title = "A headline that is comfortably inside the happy band";
        assert_eq!(
            s.quality_at(good_title, &long_summary, Some("2026"), 10, 2026),
            85.0
        );
        assert_eq!(s.quality_at("Tiny", "", None, 0, 2026), 0.0);
    }

    #[test]
    fn composite_is_a_weighted_blend() {
        assert!((Scorer::composite(50.0, 50.0) - 50.0).abs() < 1e-6);
        assert!((Scorer::composite(100.0, 0.0) - 60.0).abs() < 1e-6);
        assert!((Scorer::composite(0.0, 100.0) - 40.0).abs() < 1e-6);
    }
}
