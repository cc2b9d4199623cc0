//! Yahoo Finance API client

use super::{CompanyProfile, MarketData, PriceQuote};
use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// One trading day, as far as the company summary cares
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyBar {
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<&yahoo::Quote> for DailyBar {
    fn from(q: &yahoo::Quote) -> Self {
        Self {
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
        }
    }
}

/// 52-week figures derived from daily bars
#[derive(Debug, Default, PartialEq)]
struct YearSummary {
    high: Option<f64>,
    low: Option<f64>,
    last_close: Option<f64>,
    average_volume: Option<u64>,
}

fn summarize_year(bars: &[DailyBar]) -> YearSummary {
    // Yahoo pads missing days with zeroes
    let valid: Vec<&DailyBar> = bars.iter().filter(|b| b.close > 0.0).collect();
    if valid.is_empty() {
        return YearSummary::default();
    }

    let high = valid.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = valid.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let total_volume: u64 = valid.iter().map(|b| b.volume).sum();

    YearSummary {
        high: Some(high),
        low: Some(low),
        last_close: valid.last().map(|b| b.close),
        average_volume: Some(total_volume / valid.len() as u64),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn yahoo_error(err: impl std::fmt::Display) -> AdvisorError {
    AdvisorError::YahooFinanceError(err.to_string())
}

/// Yahoo Finance client with rate limiting
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a client allowing `requests_per_minute` upstream calls
    pub fn new(requests_per_minute: u32) -> Result<Self> {
        let connector = yahoo::YahooConnector::new().map_err(yahoo_error)?;
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            connector,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    async fn year_of_bars(&self, symbol: &str) -> Result<Vec<DailyBar>> {
        self.rate_limiter.until_ready().await;
        let response = self
            .connector
            .get_quote_range(symbol, "1d", "1y")
            .await
            .map_err(yahoo_error)?;
        let quotes = response.quotes().map_err(yahoo_error)?;
        Ok(quotes.iter().map(DailyBar::from).collect())
    }
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote> {
        let symbol = symbol.trim().to_uppercase();
        self.rate_limiter.until_ready().await;

        let response = self
            .connector
            .get_latest_quotes(&symbol, "1d")
            .await
            .map_err(yahoo_error)?;
        let quote = response.last_quote().map_err(|e| AdvisorError::DataUnavailable {
            symbol: symbol.clone(),
            reason: e.to_string(),
        })?;

        debug!(close = quote.close, "Latest quote received");
        Ok(PriceQuote {
            as_of: DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
            price: quote.close,
            symbol,
        })
    }

    #[instrument(skip(self))]
    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let symbol = symbol.trim().to_uppercase();

        self.rate_limiter.until_ready().await;
        let search = self
            .connector
            .search_ticker(&symbol)
            .await
            .map_err(yahoo_error)?;
        let item = search
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(&symbol))
            .or_else(|| search.quotes.first())
            .ok_or_else(|| AdvisorError::DataUnavailable {
                symbol: symbol.clone(),
                reason: "No matching ticker".to_string(),
            })?;

        let name = non_empty(&item.long_name).or_else(|| non_empty(&item.short_name));
        let exchange = non_empty(&item.exchange);
        let quote_type = non_empty(&item.quote_type);

        let summary = summarize_year(&self.year_of_bars(&symbol).await?);
        debug!(name = name.as_deref().unwrap_or_default(), "Company profile assembled");

        Ok(CompanyProfile {
            symbol,
            name,
            exchange,
            quote_type,
            last_close: summary.last_close,
            fifty_two_week_high: summary.high,
            fifty_two_week_low: summary.low,
            average_volume: summary.average_volume,
        })
    }
}
