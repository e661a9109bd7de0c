//! # Arbitrage Module
//!
//! Cycle arbitrage detection over a snapshot of exchange-rate quotes. Feed
//! records are validated into quotes, quotes become a directed graph of
//! currencies, and every simple cycle of that graph is enumerated and scored.
//! The best cycle above the profit threshold is reported as an opportunity.

/// Currency symbols and pairs
pub mod currency;
/// Simple cycles in canonical rotation
pub mod cycle;
/// Cycle enumeration (Johnson's algorithm and bounded search)
pub mod cycle_finder;
/// Yield of a cycle and the best-cycle tracker
pub mod cycle_quote;
/// The detection pipeline
pub mod detector;
/// Raw feed records and their validation
pub mod feed;
/// Directed exchange graph
pub mod graph;
/// Reportable opportunities
pub mod opportunity;
/// Validated quotes
pub mod quote;
/// Strongly connected components
pub mod scc;
/// Two-venue spreads on a single market
pub mod spread;
/// Test helpers and utilities
#[cfg(test)]
mod test_helpers;
