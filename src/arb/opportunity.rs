//! # Opportunities
//!
//! The reportable form of a winning cycle. Internally a cycle may run over
//! synthesized inverse edges; here every hop is mapped back to the observed
//! quote it came from, together with the direction it was traded in and the
//! rate actually used.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::currency::{Currency, CurrencyPair};
use super::cycle_quote::CycleQuote;
use super::graph::ExchangeGraph;
use super::quote::Direction;

/// One hop of an opportunity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    /// Currency given up
    pub from: Currency,
    /// Currency received
    pub to: Currency,
    /// Units of `to` received per unit of `from`
    pub rate: f64,
    /// `Forward` when trading the market as quoted, `Inverse` when selling its quote currency
    pub direction: Direction,
    /// The market as the venue quotes it
    pub market: CurrencyPair,
    /// The venue's published rate for `market`
    pub quoted_rate: f64,
    /// The venue that published the quote
    pub venue: Option<String>,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Forward => write!(f, "buy {} with {}", self.to, self.from)?,
            Direction::Inverse => write!(f, "sell {} for {}", self.from, self.to)?,
        }
        write!(f, " on {} @ {}", self.market, self.quoted_rate)?;
        if let Some(venue) = &self.venue {
            write!(f, " ({venue})")?;
        }
        Ok(())
    }
}

/// A profitable cycle of trades
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    /// The trades, in order; the last one returns to the first leg's `from`
    legs: Vec<Leg>,
    /// Product of the leg rates
    #[serde(rename = "yield")]
    rate: f64,
}

impl Opportunity {
    /// The trades in order
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The cycle's yield. Above 1.0 means profit.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Fractional profit of one round trip, e.g. 0.053 for 5.3%
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.rate - 1.0
    }

    /// Currencies visited, starting and ending at the same one
    #[must_use]
    pub fn path(&self) -> Vec<&Currency> {
        self.legs
            .iter()
            .map(|leg| &leg.from)
            .chain(self.legs.first().map(|leg| &leg.from))
            .collect()
    }
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} yield {:.6}", self.path().iter().join(" -> "), self.rate)
    }
}

/// Maps a scored cycle back to observed quotes.
///
/// Each synthesized hop is reported as the observed market it inverts, with
/// `Direction::Inverse` and the reciprocal rate that was used. The yield is
/// carried over unchanged.
#[must_use]
pub fn assemble(graph: &ExchangeGraph, quote: &CycleQuote) -> Opportunity {
    let legs = quote
        .edges()
        .iter()
        .map(|&id| {
            let edge = graph.edge(id);
            let observed = graph.observed(id);
            Leg {
                from: edge.quote.base().clone(),
                to: edge.quote.quote().clone(),
                rate: edge.quote.rate(),
                direction: edge.quote.direction(),
                market: observed.pair().clone(),
                quoted_rate: observed.rate(),
                venue: observed.venue().map(str::to_string),
            }
        })
        .collect();

    Opportunity {
        legs,
        rate: quote.rate(),
    }
}
