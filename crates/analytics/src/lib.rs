//! # Stockgraph Analytics Engine
//!
//! This crate turns a price history into the ranking and correlation artifacts the
//! rest of the system consumes.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   databases or charts. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every engine borrows immutable inputs and returns new
//!   values. Calls never share mutable state, so callers may run them in parallel.
//! - **Explicit Gaps:** A missing price or return stays missing. Nothing is ever
//!   filled with zero.
//!
//! ## Public API
//!
//! - `ReturnsEngine`: price table to return table.
//! - `RollingCorrelationEngine` / `CorrelationMatrix`: pairwise-complete correlations
//!   over a trailing window, plus similarity lookups.
//! - `RankingEngine`: top-k / bottom-k by cumulative return and multi-period summaries.
//! - `RiskAdjustedRanker` / `SharpeConvention`: Sharpe-ratio scoring and ranking.
//! - `BoundedSelection`: the `O(n log k)` selection used by all rankings.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod correlation;
pub mod error;
pub mod ranking;
pub mod returns;
pub mod selection;
pub mod sharpe;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::{CorrelationMatrix, RollingCorrelationEngine};
pub use error::AnalyticsError;
pub use ranking::{PeriodReturns, RankingEngine};
pub use returns::ReturnsEngine;
pub use selection::BoundedSelection;
pub use sharpe::{RiskAdjustedRanker, SharpeConvention};
