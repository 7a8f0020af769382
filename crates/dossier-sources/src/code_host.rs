//! Code-hosting platform adapter
//!
//! Talks to a GitHub-compatible JSON API: user search, profile fetch, and
//! repository listing for detail enrichment. An optional bearer token
//! raises the platform-side rate ceiling; without one the public quota
//! applies.

use crate::{check_deadline, BoxFuture, HitSender, SourceAdapter, SourceError};
use dossier_domain::hit::fields;
use dossier_domain::similarity::name_similarity;
use dossier_domain::{RawHit, SourceId, TargetQuery};
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Default API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How many user-search results to expand into hits
pub const MAX_SEARCH_RESULTS: usize = 3;

/// How many repositories to fold into the detail field
const MAX_DETAIL_REPOS: usize = 5;

/// Code-hosting platform adapter
pub struct CodeHostAdapter {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UserSearchResponse {
    items: Vec<UserSearchItem>,
}

#[derive(Deserialize)]
struct UserSearchItem {
    login: String,
}

#[derive(Deserialize)]
struct UserProfile {
    login: String,
    html_url: String,
    name: Option<String>,
    bio: Option<String>,
    blog: Option<String>,
    company: Option<String>,
    location: Option<String>,
    public_repos: Option<u32>,
    followers: Option<u32>,
}

#[derive(Deserialize)]
struct Repository {
    name: String,
    language: Option<String>,
    stargazers_count: Option<u32>,
}

impl CodeHostAdapter {
    /// Create an adapter against the given API base.
    ///
    /// # Parameters
    ///
    /// - `api_base`: API root (e.g. "https://api.github.com")
    /// - `token`: optional bearer token from the credential provider
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent("dossier-investigator")
            .build()
            .unwrap();

        Self {
            client,
            api_base: api_base.into(),
            token,
        }
    }

    /// Create an adapter against the public API.
    pub fn public_api(token: Option<String>) -> Self {
        Self::new(DEFAULT_API_BASE, token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status.as_u16(), url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Fatal(format!("unparseable response from {}: {}", url, e)))
    }

    /// Build a hit from a fetched profile. Confidence blends fuzzy name
    /// agreement with an alias match on the account handle.
    fn hit_from_profile(&self, profile: &UserProfile, query: &TargetQuery, fetched_at: u64) -> RawHit {
        let display_name = profile
            .name
            .clone()
            .unwrap_or_else(|| profile.login.clone());

        let name_agreement = name_similarity(&display_name, &query.name);
        let mut confidence = 0.4 + 0.4 * name_agreement;
        if query.matches_alias(&profile.login) {
            confidence += 0.2;
        }
        let confidence = confidence.min(0.95);

        let mut hit = RawHit::new(
            SourceId::CodeHost,
            profile.html_url.clone(),
            display_name,
            fetched_at,
            confidence,
        )
        .with_field(fields::HANDLE, profile.login.clone());

        if let Some(bio) = &profile.bio {
            hit = hit.with_field(fields::HEADLINE, bio.clone());
            // a profile URL embedded in the bio is a cross-reference for
            // the validator, not a claimed personal site
            if let Some(url) = crate::scrape::find_url_in_text(bio) {
                hit = hit.with_field(fields::REFERENCE, url);
            }
        }
        if let Some(company) = &profile.company {
            hit = hit.with_field(fields::ORGANIZATION, company.trim_start_matches('@').to_string());
        }
        if let Some(location) = &profile.location {
            hit = hit.with_field(fields::LOCATION, location.clone());
        }
        if let Some(blog) = &profile.blog {
            if blog.starts_with("http") {
                hit = hit.with_field(fields::WEBSITE, blog.clone());
            }
        }
        if let Some(repos) = profile.public_repos {
            hit = hit.with_field("public_repos", repos.to_string());
        }
        if let Some(followers) = profile.followers {
            hit = hit.with_field("followers", followers.to_string());
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

/// Spaces become '+' - names are the only thing we put in query strings.
fn encode_query(name: &str) -> String {
    name.replace(' ', "+")
}

impl SourceAdapter for CodeHostAdapter {
    fn source(&self) -> SourceId {
        SourceId::CodeHost
    }

    fn search<'a>(
        &'a self,
        query: &'a TargetQuery,
        deadline: Instant,
        out: HitSender,
    ) -> BoxFuture<'a, Result<usize, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "user search")?;

            let url = format!(
                "{}/search/users?q={}",
                self.api_base,
                encode_query(&query.name)
            );
            tracing::debug!(%url, "searching code host users");

            let search: UserSearchResponse = self.get_json(&url).await?;
            if search.items.is_empty() {
                return Err(SourceError::NotFound(format!(
                    "no users matching '{}'",
                    query.name
                )));
            }

            let mut emitted = 0;
            for item in search.items.iter().take(MAX_SEARCH_RESULTS) {
                // stop mid-sequence on deadline; hits already sent stand
                check_deadline(deadline, "profile fetch")?;

                let profile_url = format!("{}/users/{}", self.api_base, item.login);
                let profile: UserProfile = self.get_json(&profile_url).await?;
                let hit = self.hit_from_profile(&profile, query, now_ms());

                if out.send(hit).await.is_err() {
                    break;
                }
                emitted += 1;
            }

            tracing::info!(emitted, "code host search complete");
            Ok(emitted)
        })
    }

    fn fetch_detail<'a>(
        &'a self,
        hit: &'a RawHit,
        deadline: Instant,
    ) -> BoxFuture<'a, Result<RawHit, SourceError>> {
        Box::pin(async move {
            check_deadline(deadline, "repository listing")?;

            let login = hit.fields.get(fields::HANDLE).ok_or_else(|| {
                SourceError::Fatal("hit carries no account handle".to_string())
            })?;

            let url = format!(
                "{}/users/{}/repos?per_page=100&type=owner&sort=updated",
                self.api_base, login
            );
            let mut repos: Vec<Repository> = self.get_json(&url).await?;
            repos.sort_by_key(|r| std::cmp::Reverse(r.stargazers_count.unwrap_or(0)));

            let summary = repos
                .iter()
                .take(MAX_DETAIL_REPOS)
                .map(|r| {
                    format!(
                        "{} ({}, {} stars)",
                        r.name,
                        r.language.as_deref().unwrap_or("unknown"),
                        r.stargazers_count.unwrap_or(0)
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");

            let mut enriched = hit.clone();
            if !summary.is_empty() {
                enriched.fields.insert("top_repositories".to_string(), summary);
            }
            Ok(enriched)
        })
    }
}
