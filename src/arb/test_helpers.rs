#![allow(clippy::unwrap_used)]

use super::currency::{Currency, CurrencyPair};
use super::cycle::Cycle;
use super::feed::QuoteRecord;
use super::graph::ExchangeGraph;
use super::quote::Quote;

#[allow(dead_code)]
pub fn currency(symbol: &str) -> Currency {
    Currency::from(symbol)
}

#[allow(dead_code)]
pub fn pair(base: &str, quote: &str) -> CurrencyPair {
    CurrencyPair::new(currency(base), currency(quote))
}

#[allow(dead_code)]
pub fn quote(base: &str, quote: &str, rate: f64) -> Quote {
    Quote::new(pair(base, quote), rate).unwrap()
}

#[allow(dead_code)]
pub fn venue_quote(venue: &str, base: &str, quote_symbol: &str, rate: f64) -> Quote {
    quote(base, quote_symbol, rate).with_venue(venue)
}

#[allow(dead_code)]
pub fn records(args: &[(&str, &str, f64)]) -> Vec<QuoteRecord> {
    args.iter()
        .map(|(base, quote, rate)| QuoteRecord::new(base, quote, *rate))
        .collect()
}

#[allow(dead_code)]
pub fn graph(args: &[(&str, &str, f64)]) -> ExchangeGraph {
    ExchangeGraph::build(&records(args))
}

/// Cycle from currency symbols, via the graph's node ids
#[allow(dead_code)]
pub fn cycle(graph: &ExchangeGraph, symbols: &[&str]) -> Cycle {
    let nodes = symbols
        .iter()
        .map(|symbol| graph.node(&currency(symbol)).unwrap())
        .collect();
    Cycle::new(nodes).unwrap()
}

/// Renders a cycle as `A>B>C` for compact assertions
#[allow(dead_code)]
pub fn symbols(graph: &ExchangeGraph, cycle: &Cycle) -> String {
    cycle
        .nodes()
        .iter()
        .map(|node| graph.currency(*node).to_string())
        .collect::<Vec<_>>()
        .join(">")
}

/// The three-currency fixtures used throughout the tests
#[allow(dead_code)]
pub const LOSING_TRIANGLE: [(&str, &str, f64); 3] =
    [("USD", "EUR", 0.85), ("EUR", "GBP", 0.9), ("GBP", "USD", 1.30)];

#[allow(dead_code)]
pub const WINNING_TRIANGLE: [(&str, &str, f64); 3] =
    [("USD", "EUR", 0.90), ("EUR", "GBP", 0.90), ("GBP", "USD", 1.30)];
