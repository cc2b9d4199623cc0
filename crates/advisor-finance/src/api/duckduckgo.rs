//! DuckDuckGo Instant Answer client

use super::{SearchResult, WebSearch};
use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

static RESULT_ANCHOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<a [^>]*>([^<]+)</a>").ok());

/// Instant Answer response, reduced to the fields we read
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    abstract_source: String,
    results: Vec<Topic>,
    related_topics: Vec<Topic>,
}

/// A related topic is either a single link or a named group of links
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Topic {
    // Listed first: `Link` has no required fields and would match groups too
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<Topic>,
    },
    Link {
        #[serde(rename = "FirstURL", default)]
        first_url: String,
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "Result", default)]
        result: String,
    },
}

impl Topic {
    fn flatten_into<'a>(&'a self, out: &mut Vec<(&'a str, &'a str, &'a str)>) {
        match self {
            Topic::Link {
                first_url,
                text,
                result,
            } => out.push((first_url, text, result)),
            Topic::Group { topics, .. } => {
                for topic in topics {
                    topic.flatten_into(out);
                }
            }
        }
    }
}

/// Title from the result's anchor text, falling back to the lead of the text
fn topic_title(text: &str, result_html: &str) -> String {
    let anchored = RESULT_ANCHOR
        .as_ref()
        .and_then(|re| re.captures(result_html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    anchored.unwrap_or_else(|| {
        text.split(" - ")
            .next()
            .unwrap_or(text)
            .trim()
            .to_string()
    })
}

/// Map an Instant Answer into at most `max_results` hits
fn collect_results(answer: &InstantAnswer, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.trim().is_empty() {
        let title = if answer.heading.is_empty() {
            answer.abstract_source.clone()
        } else {
            answer.heading.clone()
        };
        results.push(SearchResult {
            title,
            url: answer.abstract_url.clone(),
            snippet: answer.abstract_text.trim().to_string(),
        });
    }

    let mut links = Vec::new();
    for topic in answer.results.iter().chain(&answer.related_topics) {
        topic.flatten_into(&mut links);
    }

    for (url, text, result_html) in links {
        if url.is_empty() || text.trim().is_empty() {
            continue;
        }
        if results.iter().any(|r| r.url == url) {
            continue;
        }
        results.push(SearchResult {
            title: topic_title(text, result_html),
            url: url.to_string(),
            snippet: text.trim().to_string(),
        });
    }

    results.truncate(max_results);
    results
}

/// DuckDuckGo Instant Answer API client with rate limiting
pub struct DuckDuckGoClient {
    client: Client,
    api_base: String,
    rate_limiter: SharedRateLimiter,
}

impl DuckDuckGoClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `api_base` - Instant Answer endpoint, e.g. `https://api.duckduckgo.com`
    /// * `requests_per_minute` - Outbound rate limit
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_base: impl Into<String>,
        requests_per_minute: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("finance-advisor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    async fn instant_answer(&self, query: &str) -> Result<InstantAnswer> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}/", self.api_base))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "0"),
                ("no_redirect", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::SearchError(format!(
                "DuckDuckGo API error {status}: {body}"
            )));
        }

        // Served as application/x-javascript, so decode the body ourselves
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let answer = self.instant_answer(query).await?;
        let results = collect_results(&answer, max_results);
        debug!(results = results.len(), "DuckDuckGo search finished");
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let answer = self.instant_answer(&format!("{query} news")).await?;
        let results = collect_results(&answer, max_results);
        debug!(results = results.len(), "DuckDuckGo news search finished");
        Ok(results)
    }
}
