// src/transform/parse.rs
//! Two-stage parsing of generative responses.
//!
//! Stage 1 strips an optional fenced code block and attempts strict JSON.
//! Stage 2 salvages individual fields with scoped patterns. Every field
//! carries an origin so callers can tell degraded output from full success.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// Taken from a strict JSON parse.
    Parsed,
    /// Extracted by a field-scoped pattern after strict parsing failed.
    Recovered,
    /// The field could not be recovered; a fallback value was substituted.
    Defaulted,
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DraftOrigins {
    pub title: FieldOrigin,
    pub summary: FieldOrigin,
    pub content: FieldOrigin,
    pub keywords: FieldOrigin,
}

impl DraftOrigins {
    /// True when every field came from the strict parse.
    pub fn is_strict(&self) -> bool {
        [self.title, self.summary, self.content, self.keywords]
            .iter()
            .all(|o| *o == FieldOrigin::Parsed)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub draft: Draft,
    pub origins: DraftOrigins,
}

/// Remove a wrapping fenced code block, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    if let Some(i) = raw.find("```json") {
        let rest = &raw[i + 7..];
        return match rest.find("```") {
            Some(j) => rest[..j].trim(),
            None => rest.trim(),
        };
    }
    if let Some(i) = raw.find("```") {
        let rest = &raw[i + 3..];
        return match rest.find("```") {
            Some(j) => rest[..j].trim(),
            None => rest.trim(),
        };
    }
    raw.trim()
}

/// Parse a generative response into a draft. Never fails: unrecoverable
/// fields default to `fallback_title` / empty strings / a single tag.
pub fn parse_response(raw: &str, fallback_title: &str) -> ParsedResponse {
    let text = strip_code_fence(raw);

    #[derive(Deserialize)]
    struct Strict {
        title: Option<String>,
        summary: Option<String>,
        content: Option<String>,
        keywords: Option<Vec<String>>,
    }

    if let Ok(strict) = serde_json::from_str::<Strict>(text) {
        let pick = |v: Option<String>, fallback: &str| match v {
            Some(s) if !s.trim().is_empty() => (s, FieldOrigin::Parsed),
            _ => (fallback.to_string(), FieldOrigin::Defaulted),
        };
        let (title, title_origin) = pick(strict.title, fallback_title);
        let (summary, summary_origin) = pick(strict.summary, "");
        let (content, content_origin) = pick(strict.content, "");
        let (keywords, keywords_origin) = match strict.keywords {
            Some(k) if !k.is_empty() => (k, FieldOrigin::Parsed),
            _ => (vec!["AI".to_string()], FieldOrigin::Defaulted),
        };
        return ParsedResponse {
            draft: Draft {
                title,
                summary,
                content,
                keywords,
            },
            origins: DraftOrigins {
                title: title_origin,
                summary: summary_origin,
                content: content_origin,
                keywords: keywords_origin,
            },
        };
    }

    salvage(text, fallback_title)
}

fn salvage(text: &str, fallback_title: &str) -> ParsedResponse {
    static RE_TITLE: OnceCell<Regex> = OnceCell::new();
    static RE_SUMMARY: OnceCell<Regex> = OnceCell::new();
    static RE_CONTENT: OnceCell<Regex> = OnceCell::new();
    static RE_KEYWORDS: OnceCell<Regex> = OnceCell::new();

    let re_title = RE_TITLE.get_or_init(|| Regex::new(r#""title"\s*:\s*"([^"]*)""#).unwrap());
    let re_summary =
        RE_SUMMARY.get_or_init(|| Regex::new(r#""summary"\s*:\s*"([^"]*)""#).unwrap());
    let re_content = RE_CONTENT
        .get_or_init(|| Regex::new(r#"(?s)"content"\s*:\s*"(.+?)"\s*,\s*"keywords""#).unwrap());
    let re_keywords =
        RE_KEYWORDS.get_or_init(|| Regex::new(r#"(?s)"keywords"\s*:\s*\[(.*?)\]"#).unwrap());

    let grab = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let (title, title_origin) = match grab(re_title) {
        Some(t) if !t.trim().is_empty() => (t, FieldOrigin::Recovered),
        _ => (fallback_title.to_string(), FieldOrigin::Defaulted),
    };
    let (summary, summary_origin) = match grab(re_summary) {
        Some(s) => (s, FieldOrigin::Recovered),
        None => (String::new(), FieldOrigin::Defaulted),
    };
    // Last resort for the body: keep the whole response rather than lose it.
    let (content, content_origin) = match grab(re_content) {
        Some(c) => (c, FieldOrigin::Recovered),
        None => (text.to_string(), FieldOrigin::Defaulted),
    };
    let (keywords, keywords_origin) = match grab(re_keywords) {
        Some(list) => {
            let parsed: Vec<String> = list
                .split(',')
                .map(|k| k.trim().trim_matches('"').trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if parsed.is_empty() {
                (vec!["AI".to_string()], FieldOrigin::Defaulted)
            } else {
                (parsed, FieldOrigin::Recovered)
            }
        }
        None => (vec!["AI".to_string()], FieldOrigin::Defaulted),
    };

    ParsedResponse {
        draft: Draft {
            title,
            summary,
            content,
            keywords,
        },
        origins: DraftOrigins {
            title: title_origin,
            summary: summary_origin,
            content: content_origin,
            keywords: keywords_origin,
        },
    }
}
