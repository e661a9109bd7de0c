/*!
 * # Orbit - Currency Cycle Arbitrage Detection
 *
 * Orbit looks for sequences of currency exchanges that start and end in the
 * same currency and return more than they started with, given a snapshot of
 * quotes from one or more venues.
 *
 * ## Core Features
 *
 * - **Exhaustive Search**: Every simple cycle is found, using Johnson's algorithm
 *   over strongly connected components
 * - **Bidirectional Quotes**: Each observed quote can also be traded backwards at
 *   the reciprocal rate
 * - **Data Quality Reporting**: Malformed feed records are skipped and reported
 * - **Search Budgets**: Time and cycle-count limits with best-effort results
 *
 * ## Module Structure
 *
 * - `arb`: Quote validation, graph construction, cycle search and scoring
 * - `config`: Configuration management for the detector
 * - `utils`: Utility functions and helpers
 */

/// Arbitrage detection logic
pub mod arb;
/// Configuration management for the detector
pub mod config;
/// Utility functions and helpers
pub mod utils;
