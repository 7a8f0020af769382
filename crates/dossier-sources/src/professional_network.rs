//! Professional-network adapter
//!
//! Logged-out professional-network profiles cannot be listed directly, so
//! discovery goes through search-engine footprint queries
//! (`site:<profile domain> "<name>"`) with a fallback engine, and a
//! last-resort direct slug guess derived from the target's aliases. Both
//! engines and the profile pages themselves may answer with an anti-bot
//! interstitial, which classifies as `Blocked`.

use crate::scrape::{extract_meta_content, extract_profile_links, looks_like_captcha};
use crate::{check_deadline, BoxFuture, HitSender, SourceAdapter, SourceError};
use dossier_domain::hit::fields;
use dossier_domain::{RawHit, SourceId, TargetQuery};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Default primary search endpoint
pub const DEFAULT_SEARCH_BASE: &str = "https://html.duckduckgo.com/html";

/// Default fallback search endpoint
pub const DEFAULT_FALLBACK_BASE: &str = "https://www.bing.com/search";

/// Default profile URL marker
pub const DEFAULT_PROFILE_MARKER: &str = "linkedin.com/in/";

/// Default per-request timeout (seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Confidence for footprint-search results
const SEARCH_RESULT_CONFIDENCE: f64 = 0.7;

/// Confidence for direct slug guesses
const SLUG_GUESS_CONFIDENCE: f64 = 0.3;

/// Professional-network profile discovery adapter
pub struct ProfessionalNetworkAdapter {
    client: reqwest::Client,
    search_base: String,
    fallback_base: String,
    profile_marker: String,
    max_results: usize,
}

impl ProfessionalNetworkAdapter {
    /// Create an adapter with explicit endpoints (tests point these at
    /// fixtures; production uses the defaults).
    pub fn new(
        search_base: impl Into<String>,
        fallback_base: impl Into<String>,
        profile_marker: impl Into<String>,
        max_results: usize,
    ) -> Self {
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
            fallback_base: fallback_base.into(),
            profile_marker: profile_marker.into(),
            max_results,
        }
    }

    /// Create an adapter with the default public endpoints.
    pub fn public_endpoints() -> Self {
        Self::new(
            DEFAULT_SEARCH_BASE,
            DEFAULT_FALLBACK_BASE,
            DEFAULT_PROFILE_MARKER,
            3,
        )
    }

    fn footprint_query(&self, query: &TargetQuery) -> String {
        let domain = self.profile_marker.trim_end_matches('/');
        format!("site:{} \"{}\"", domain, query.name)
    }

    /// Run the footprint query against one engine, returning cleaned
    /// profile links. A CAPTCHA body classifies as `Blocked`.
    async fn engine_search(&self, base: &str, footprint: &str) -> Result<Vec<String>, SourceError> {
        let response = self
            .client
            .get(base)
            .query(&[("q", footprint)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status.as_u16(), base));
        }

        let body = response.text().await?;
        if looks_like_captcha(&body) {
            return Err(SourceError::Blocked(format!("captcha page from {}", base)));
        }

        Ok(extract_profile_links(&body, &self.profile_marker, self.max_results))
    }

    /// Direct profile URL guesses from the target's aliases; the original
    /// last resort when both engines come up empty.
    fn slug_guesses(&self, query: &TargetQuery) -> Vec<String> {
        let domain = self.profile_marker.trim_end_matches('/');
        query
            .aliases
            .iter()
            .filter(|alias| alias.contains('-') || !alias.contains(' '))
            .take(2)
            .map(|alias| format!("https://www.{}/{}/", domain, alias.replace(' ', "")))
            .collect()
    }

    fn hit_for(&self, url: String, query: &TargetQuery, confidence: f64, fetched_at: u64) -> RawHit {
        let slug = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
            .to_string();

        let mut hit = RawHit::new(
            SourceId::ProfessionalNetwork,
            url,
            query.name.clone(),
            fetched_at,
            confidence,
        );
        if !slug.is_empty() {
            hit = hit.with_field(fields::HANDLE, slug);
        }
        hit
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Split an og:title of the shape "Name - Headline | Site" into its parts.
fn split_profile_title(title: &str) -> (Option<String>, Option<String>) {
    let title = title.split('|').next().unwrap_or(title);
    match title.split_once(" - ") {
        Some((name, headline)) => (
            Some(name.trim().to_string()),
            Some(headline.trim().to_string()),
        ),
        None => {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                (None, None)
            } else {
                (Some(trimmed.to_string()), None)
            }
        }
    }
}

/// Organization stated in a headline like "Staff Engineer at Acme".
fn organization_from_headline(headline: &str) -> Option<String> {
    let (_, org) = headline.split_once(" at ")?;
    let org = org.trim();
    if org.is_empty() {
        None
    } else {
        Some(org.to_string())
    }
}

impl SourceAdapter for ProfessionalNetworkAdapter {
    fn source(&self) -> SourceId {
        SourceId::ProfessionalNetwork
    }

    fn search<'a>(
        &'a self,
        query: &'a TargetQuery,
        deadline: Instant,
        out: HitSender,
    ) -> BoxFuture<'a, Result<usize, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "footprint search")?;
            let footprint = self.footprint_query(query);
            tracing::debug!(%footprint, "searching professional-network footprints");

            let links = match self.engine_search(&self.search_base, &footprint).await {
                Ok(links) if !links.is_empty() => links,
                Ok(_) | Err(SourceError::Transient(_)) => {
                    // empty or unreachable primary: try the fallback engine
                    check_deadline(deadline, "fallback search")?;
                    tracing::debug!("primary engine empty, trying fallback");
                    self.engine_search(&self.fallback_base, &footprint)
                        .await
                        .unwrap_or_default()
                }
                Err(SourceError::Blocked(reason)) => {
                    // primary presented a CAPTCHA; the fallback may not have
                    check_deadline(deadline, "fallback search")?;
                    tracing::warn!(%reason, "primary engine blocked, trying fallback");
                    match self.engine_search(&self.fallback_base, &footprint).await {
                        Ok(links) => links,
                        Err(_) => return Err(SourceError::Blocked(reason)),
                    }
                }
                Err(e) => return Err(e),
            };

            let (links, confidence) = if links.is_empty() {
                (self.slug_guesses(query), SLUG_GUESS_CONFIDENCE)
            } else {
                (links, SEARCH_RESULT_CONFIDENCE)
            };

            if links.is_empty() {
                return Err(SourceError::NotFound(format!(
                    "no public profiles for '{}'",
                    query.name
                )));
            }

            let mut emitted = 0;
            for url in links {
                check_deadline(deadline, "hit emission")?;
                let hit = self.hit_for(url, query, confidence, now_ms());
                if out.send(hit).await.is_err() {
                    break;
                }
                emitted += 1;
            }

            tracing::info!(emitted, "professional-network search complete");
            Ok(emitted)
        })
    }

    fn fetch_detail<'a>(
        &'a self,
        hit: &'a RawHit,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<RawHit, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "profile fetch")?;

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
            if let Some(title) = extract_meta_content(&body, "og:title") {
                let (name, headline) = split_profile_title(&title);
                if let Some(name) = name {
                    enriched.display_name = name;
                }
                if let Some(headline) = headline {
                    if let Some(org) = organization_from_headline(&headline) {
                        enriched.fields.insert(fields::ORGANIZATION.to_string(), org);
                    }
                    enriched.fields.insert(fields::HEADLINE.to_string(), headline);
                }
            }
            if let Some(about) = extract_meta_content(&body, "og:description") {
                if let Some(url) = crate::scrape::find_url_in_text(&about) {
                    enriched.fields.insert(fields::REFERENCE.to_string(), url);
                }
                enriched.fields.entry(fields::HEADLINE.to_string()).or_insert(about);
            }

            Ok(enriched)
        })
    }
}
