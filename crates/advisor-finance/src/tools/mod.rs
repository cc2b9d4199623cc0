//! Tools the advisor's agents call

pub mod web_search;
pub mod yfinance;

pub use web_search::{DuckDuckGoNewsTool, DuckDuckGoSearchTool};
pub use yfinance::{CompanyInfoTool, StockPriceTool};
