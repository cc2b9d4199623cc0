//! Financial data tools backed by Yahoo Finance

use crate::api::MarketData;
use crate::cache::{CacheKey, ToolCache};
use crate::error::AdvisorError;
use advisor_core::Result as AgentResult;
use advisor_llm::tools::schema;
use advisor_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

/// Parse and normalize the `symbol` argument
fn symbol_param(tool: &str, params: Value) -> AgentResult<String> {
    let params: SymbolParams = parse_params(tool, params)?;
    let symbol = params.symbol.trim().to_uppercase();
    if symbol.is_empty() || symbol.contains(char::is_whitespace) {
        return Err(advisor_core::Error::invalid_input(
            tool,
            format!("'{}' is not a ticker symbol", params.symbol),
        ));
    }
    Ok(symbol)
}

fn symbol_schema() -> Value {
    schema::object(
        json!({
            "symbol": schema::string("The stock symbol, e.g. 'AAPL' or 'NVDA'"),
        }),
        vec!["symbol"],
    )
}

/// `get_current_stock_price`: latest close for a ticker
pub struct StockPriceTool {
    market: Arc<dyn MarketData>,
    cache: ToolCache,
}

impl StockPriceTool {
    /// Create the tool over a market data provider and its quote cache
    pub fn new(market: Arc<dyn MarketData>, cache: ToolCache) -> Self {
        Self { market, cache }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let symbol = symbol_param(self.name(), params)?;
        let key = CacheKey::new(&symbol, "price", json!({}));

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let quote = self.market.latest_price(&symbol).await?;
                Ok::<_, AdvisorError>(json!({
                    "symbol": quote.symbol,
                    "price": (quote.price * 10_000.0).round() / 10_000.0,
                    "as_of": quote.as_of.to_rfc3339(),
                }))
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_current_stock_price"
    }

    fn description(&self) -> &str {
        "Use this function to get the current stock price for a given symbol."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// `get_company_info`: company overview and 52-week figures
pub struct CompanyInfoTool {
    market: Arc<dyn MarketData>,
    cache: ToolCache,
}

impl CompanyInfoTool {
    /// Create the tool over a market data provider and its company cache
    pub fn new(market: Arc<dyn MarketData>, cache: ToolCache) -> Self {
        Self { market, cache }
    }
}

#[async_trait]
impl Tool for CompanyInfoTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let symbol = symbol_param(self.name(), params)?;
        let key = CacheKey::new(&symbol, "company", json!({}));

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let profile = self.market.company_profile(&symbol).await?;
                Ok::<_, AdvisorError>(serde_json::to_value(profile)?)
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Use this function to get company information and an overview of a stock: \
         name, exchange, instrument type, last close, 52-week high and low, and average volume."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CompanyProfile, MockMarketData, PriceQuote};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn cache() -> ToolCache {
        ToolCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_tool_metadata() {
        let market: Arc<dyn MarketData> = Arc::new(MockMarketData::new());
        let price = StockPriceTool::new(market.clone(), cache());
        let info = CompanyInfoTool::new(market, cache());

        assert_eq!(price.name(), "get_current_stock_price");
        assert_eq!(info.name(), "get_company_info");
        assert_eq!(price.input_schema()["required"], json!(["symbol"]));
    }

    #[tokio::test]
    async fn test_price_normalizes_symbol_and_caches() {
        let mut mock = MockMarketData::new();
        mock.expect_latest_price()
            .withf(|symbol: &str| symbol == "NVDA")
            .times(1)
            .returning(|symbol| {
                Ok(PriceQuote {
                    symbol: symbol.to_string(),
                    price: 131.256_789,
                    as_of: Utc.with_ymd_and_hms(2025, 1, 31, 21, 0, 0).unwrap(),
                })
            });
        let tool = StockPriceTool::new(Arc::new(mock), cache());

        let out = tool.execute(json!({"symbol": " nvda "})).await.unwrap();
        assert_eq!(out["symbol"], "NVDA");
        assert_eq!(out["price"], 131.2568);
        assert_eq!(out["as_of"], "2025-01-31T21:00:00+00:00");

        let again = tool.execute(json!({"symbol": "NVDA"})).await.unwrap();
        assert_eq!(out, again);
    }

    #[tokio::test]
    async fn test_company_info() {
        let mut mock = MockMarketData::new();
        mock.expect_company_profile().times(1).returning(|symbol| {
            Ok(CompanyProfile {
                symbol: symbol.to_string(),
                name: Some("Microsoft Corporation".to_string()),
                exchange: Some("NMS".to_string()),
                quote_type: Some("EQUITY".to_string()),
                last_close: Some(415.5),
                fifty_two_week_high: Some(468.35),
                fifty_two_week_low: Some(385.58),
                average_volume: Some(20_000_000),
            })
        });
        let tool = CompanyInfoTool::new(Arc::new(mock), cache());

        let out = tool.execute(json!({"symbol": "msft"})).await.unwrap();
        assert_eq!(out["name"], "Microsoft Corporation");
        assert_eq!(out["fifty_two_week_low"], 385.58);
    }

    #[tokio::test]
    async fn test_rejects_bad_symbols() {
        let tool = StockPriceTool::new(Arc::new(MockMarketData::new()), cache());

        for params in [json!({}), json!({"symbol": ""}), json!({"symbol": "BRK B"})] {
            let err = tool.execute(params).await.unwrap_err();
            assert!(matches!(err, advisor_core::Error::InvalidToolInput { .. }));
        }
    }

    #[tokio::test]
    async fn test_missing_data_reaches_model_as_error() {
        let mut mock = MockMarketData::new();
        mock.expect_company_profile().returning(|symbol| {
            Err(AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No matching ticker".to_string(),
            })
        });
        let tool = CompanyInfoTool::new(Arc::new(mock), cache());

        let err = tool.execute(json!({"symbol": "ZZZZ"})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Agent processing failed: Data not available for ZZZZ: No matching ticker"
        );
    }
}
