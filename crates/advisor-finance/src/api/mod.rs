//! Upstream data sources behind the advisor's tools
//!
//! Tools talk to the [`WebSearch`] and [`MarketData`] traits rather than to
//! the HTTP clients, so they can be exercised without network access.

pub mod duckduckgo;
pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use duckduckgo::DuckDuckGoClient;
pub use yahoo::YahooFinanceClient;

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title
    pub title: String,
    /// Link to the source
    pub url: String,
    /// Short excerpt
    pub snippet: String,
}

/// Latest price for a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Ticker symbol, upper-cased
    pub symbol: String,
    /// Last close
    pub price: f64,
    /// Time of the quote
    pub as_of: DateTime<Utc>,
}

/// Company overview assembled from ticker search and one year of quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol, upper-cased
    pub symbol: String,
    /// Display name
    pub name: Option<String>,
    /// Listing exchange
    pub exchange: Option<String>,
    /// Instrument type (EQUITY, ETF, ...)
    pub quote_type: Option<String>,
    /// Most recent close
    pub last_close: Option<f64>,
    /// Highest high over the past year
    pub fifty_two_week_high: Option<f64>,
    /// Lowest low over the past year
    pub fifty_two_week_low: Option<f64>,
    /// Mean daily volume over the past year
    pub average_volume: Option<u64>,
}

/// Web search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// General web search
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;

    /// News-oriented search
    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Market data provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Latest price for `symbol`
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote>;

    /// Company overview for `symbol`
    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile>;
}
