//! General web-search adapter
//!
//! The broadest net: a footprint query for portfolios, resumes, and
//! personal sites. Results score low on their own; their value is giving
//! the cross-validator URLs that other sources' profiles may point at.

use crate::scrape::{extract_links, extract_meta_content, extract_title, looks_like_captcha};
use crate::{check_deadline, BoxFuture, HitSender, SourceAdapter, SourceError};
use dossier_domain::hit::fields;
use dossier_domain::{RawHit, SourceId, TargetQuery};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Default search endpoint
pub const DEFAULT_SEARCH_BASE: &str = "https://html.duckduckgo.com/html";

/// Default per-request timeout (seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Confidence for generic web results
const RESULT_CONFIDENCE: f64 = 0.4;

/// Engine/domains never worth emitting as hits
const EXCLUDED_DOMAINS: [&str; 3] = ["duckduckgo.com", "bing.com", "google.com"];

/// General web-search adapter
pub struct WebSearchAdapter {
    client: reqwest::Client,
    search_base: String,
    max_results: usize,
}

impl WebSearchAdapter {
    /// Create an adapter against the given search endpoint.
    pub fn new(search_base: impl Into<String>, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) ",
                "Chrome/120.0.0.0 Safari/537.36"
            ))
            .build()
            .unwrap();

        Self {
            client,
            search_base: search_base.into(),
            max_results,
        }
    }

    /// Create an adapter with the default public endpoint.
    pub fn public_endpoint() -> Self {
        Self::new(DEFAULT_SEARCH_BASE, 5)
    }

    fn footprint_query(query: &TargetQuery) -> String {
        format!("\"{}\" (portfolio OR resume OR CV)", query.name)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// External result links: absolute, engine domains filtered, deduplicated.
fn result_links(html: &str, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for link in extract_links(html) {
        if !link.starts_with("http") {
            continue;
        }
        if EXCLUDED_DOMAINS.iter().any(|d| link.contains(d)) {
            continue;
        }
        if !out.contains(&link) {
            out.push(link);
        }
        if out.len() >= max {
            break;
        }
    }

    out
}

impl SourceAdapter for WebSearchAdapter {
    fn source(&self) -> SourceId {
        SourceId::WebSearch
    }

    fn search<'a>(
        &'a self,
        query: &'a TargetQuery,
        deadline: Instant,
        out: HitSender,
    ) -> BoxFuture<'a, Result<usize, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "web search")?;

            let footprint = Self::footprint_query(query);
            tracing::debug!(%footprint, "running general web search");

            let response = self
                .client
                .get(&self.search_base)
                .query(&[("q", footprint.as_str())])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::from_status(status.as_u16(), &self.search_base));
            }

            let body = response.text().await?;
            if looks_like_captcha(&body) {
                return Err(SourceError::Blocked(format!(
                    "captcha page from {}",
                    self.search_base
                )));
            }

            let links = result_links(&body, self.max_results);
            if links.is_empty() {
                return Err(SourceError::NotFound(format!(
                    "no public pages for '{}'",
                    query.name
                )));
            }

            let mut emitted = 0;
            for url in links {
                check_deadline(deadline, "hit emission")?;
                let hit = RawHit::new(
                    SourceId::WebSearch,
                    url.clone(),
                    query.name.clone(),
                    now_ms(),
                    RESULT_CONFIDENCE,
                )
                .with_field(fields::WEBSITE, url);

                if out.send(hit).await.is_err() {
                    break;
                }
                emitted += 1;
            }

            tracing::info!(emitted, "web search complete");
            Ok(emitted)
        })
    }

    fn fetch_detail<'a>(
        &'a self,
        hit: &'a RawHit,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<RawHit, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "page fetch")?;

            let response = self.client.get(&hit.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::from_status(status.as_u16(), &hit.url));
            }

            let body = response.text().await?;
            if looks_like_captcha(&body) {
                return Err(SourceError::Blocked(format!("captcha page at {}", hit.url)));
            }

            let mut enriched = hit.clone();
            if let Some(title) = extract_title(&body) {
                enriched.display_name = title;
            }
            if let Some(description) = extract_meta_content(&body, "og:description") {
                enriched.fields.insert(fields::HEADLINE.to_string(), description);
            }
            Ok(enriched)
        })
    }
}
