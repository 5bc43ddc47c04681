// src/collect/rss.rs
//! HTTP feed fetcher: RSS via quick-xml, article pages via a tag-stripping
//! text extraction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::collect::types::{FeedFetcher, RawEntry};

const USER_AGENT: &str = "ai-blog-curator/0.1 (+feed curation pipeline)";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
}

/// RFC 2822 `pubDate` → unix seconds. Unparseable dates yield None.
pub fn parse_rfc2822_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
}

/// Parse an RSS document into raw entries. Entries without a title and link
/// are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let title = it.title.unwrap_or_default().trim().to_string();
        let link = it.link.unwrap_or_default().trim().to_string();
        if title.is_empty() && link.is_empty() {
            continue;
        }
        out.push(RawEntry {
            title,
            link,
            summary: it.description.unwrap_or_default(),
            content: it.content_encoded.filter(|c| !c.trim().is_empty()),
            published: it.pub_date,
        });
    }
    Ok(out)
}

pub struct HttpFeedFetcher {
    http: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<RawEntry>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let body = resp
            .error_for_status()
            .with_context(|| format!("feed status for {url}"))?
            .text()
            .await
            .context("reading feed body")?;
        parse_feed(&body)
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let html = resp
            .error_for_status()
            .with_context(|| format!("page status for {url}"))?
            .text()
            .await
            .context("reading page body")?;
        Ok(extract_page_text(&html))
    }
}

/// Strip boilerplate blocks and tags, decode entities, collapse whitespace.
pub fn extract_page_text(html: &str) -> String {
    static RE_BLOCKS: OnceCell<Regex> = OnceCell::new();
    let re_blocks = RE_BLOCKS.get_or_init(|| {
        Regex::new(
            r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<nav[^>]*>.*?</nav>|<footer[^>]*>.*?</footer>|<header[^>]*>.*?</header>|<aside[^>]*>.*?</aside>",
        )
        .unwrap()
    });
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let mut out = re_blocks.replace_all(html, " ").to_string();
    out = re_tags.replace_all(&out, " ").to_string();
    out = html_escape::decode_html_entities(&out).to_string();
    out = re_ws.replace_all(&out, " ").trim().to_string();
    out
}

/// RSS feeds in the wild mix HTML entities into XML; the XML parser only
/// knows the five predefined ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Example Feed</title>
    <item>
      <title>First Post</title>
      <link>https://example.test/first</link>
      <pubDate>Tue, 06 Jan 2026 10:00:00 GMT</pubDate>
      <description>A short description.</description>
    </item>
    <item>
      <title>Second&nbsp;Post</title>
      <link>https://example.test/second</link>
      <description>Another one.</description>
      <content:encoded>Full body text here.</content:encoded>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_optional_fields() {
        let entries = parse_feed(FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First Post");
        assert_eq!(entries[0].published.as_deref(), Some("Tue, 06 Jan 2026 10:00:00 GMT"));
        assert!(entries[0].content.is_none());
        assert_eq!(entries[1].content.as_deref(), Some("Full body text here."));
    }

    #[test]
    fn pub_date_parses_to_unix() {
        let ts = parse_rfc2822_to_unix("Tue, 06 Jan 2026 10:00:00 GMT").unwrap();
        assert!(ts > 1_700_000_000);
        assert!(parse_rfc2822_to_unix("not a date").is_none());
    }

    #[test]
    fn page_text_drops_scripts_and_tags() {
        let html = r#"<html><head><style>.x{}</style><script>var a=1;</script></head>
            <body><nav>menu</nav><article><h1>Title</h1><p>Body &amp; more.</p></article>
            <footer>foot</footer></body></html>"#;
        let text = extract_page_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Body & more."));
        assert!(!text.contains("var a"));
        assert!(!text.contains("menu"));
        assert!(!text.contains("foot"));
    }
}
