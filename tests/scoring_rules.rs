// tests/scoring_rules.rs
use ai_blog_curator::scoring::{Scorer, ScoringConfig};

fn scorer() -> Scorer {
    Scorer::new(&ScoringConfig::default())
}

#[test]
fn exclusion_term_zeroes_relevance_despite_high_keywords() {
    let s = scorer();
    // Several high-weight keywords, one exclusion term.
    let title = "ChatGPT workflow automation tutorial";
    let summary = "A guide to productivity, templates, and the new benchmark suite";
    assert_eq!(s.relevance(title, summary), 0.0);
}

#[test]
fn exclusion_is_case_insensitive() {
    let s = scorer();
    assert_eq!(s.relevance("ARXIV roundup", "quantum news"), 0.0);
    assert_eq!(s.relevance("ArXiv roundup", ""), 0.0);
}

#[test]
fn scores_stay_in_bounds_on_pathological_input() {
    let s = scorer();
    let repetitive = "ChatGPT automation workflow tutorial guide ".repeat(1_000);
    let rel = s.relevance(&repetitive, &repetitive);
    assert!((0.0..=100.0).contains(&rel));

    let qual = s.quality_at(&repetitive, &repetitive, Some("2026"), 10, 2026);
    assert!((0.0..=100.0).contains(&qual));
}

#[test]
fn keyword_tiers_are_weighted() {
    let s = scorer();
    // "tutorial" is high (+15), "chatbot" is medium (+8), "tips" is low (+3).
    assert_eq!(s.relevance("tutorial", ""), 15.0);
    assert_eq!(s.relevance("chatbot", ""), 8.0);
    assert_eq!(s.relevance("tips", ""), 3.0);
}

#[test]
fn custom_vocabulary_is_honored() {
    let cfg = ScoringConfig {
        relevance_cutoff: 1.0,
        high_keywords: vec!["rustacean".to_string()],
        medium_keywords: vec![],
        low_keywords: vec![],
        exclude_terms: vec!["crypto".to_string()],
    };
    let s = Scorer::new(&cfg);
    assert_eq!(s.relevance("A rustacean rustacean story", ""), 30.0);
    assert_eq!(s.relevance("A rustacean crypto story", ""), 0.0);
    assert_eq!(s.relevance_cutoff(), 1.0);
}

#[test]
fn composite_ranks_relevance_over_quality() {
    // Same blend weights as the batch ordering.
    let high_rel = Scorer::composite(90.0, 10.0);
    let high_qual = Scorer::composite(10.0, 90.0);
    assert!(high_rel > high_qual);
}
