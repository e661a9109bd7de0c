//! # Spread
//!
//! The simplest arbitrage there is: the same market quoted at different
//! prices by two venues. Buy where it is cheapest, sell where it is dearest.
//! Works on validated quotes and is independent of the cycle search.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::currency::CurrencyPair;
use super::quote::Quote;

/// One side of a spread
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadSide {
    /// Venue that published the price
    pub venue: Option<String>,
    /// Units of quote currency per unit of base
    pub rate: f64,
}

impl From<&Quote> for SpreadSide {
    fn from(quote: &Quote) -> Self {
        Self {
            venue: quote.venue().map(str::to_string),
            rate: quote.rate(),
        }
    }
}

/// A price difference for one market across venues
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spread {
    /// The market
    pub pair: CurrencyPair,
    /// Lowest quote
    pub buy: SpreadSide,
    /// Highest quote
    pub sell: SpreadSide,
    /// `sell.rate - buy.rate`, in quote currency per unit of base
    pub margin: f64,
}

impl Spread {
    /// Finds the widest spread for `pair` among `quotes`.
    ///
    /// Quotes for other markets are ignored, including the reversed pair. Ties
    /// go to the first quote seen. Returns `None` unless the highest rate is
    /// strictly above the lowest.
    #[must_use]
    pub fn find<'a>(pair: &CurrencyPair, quotes: impl IntoIterator<Item = &'a Quote>) -> Option<Self> {
        let mut lowest: Option<&Quote> = None;
        let mut highest: Option<&Quote> = None;
        for quote in quotes.into_iter().filter(|quote| quote.pair() == pair) {
            if lowest.map_or(true, |low| quote.rate() < low.rate()) {
                lowest = Some(quote);
            }
            if highest.map_or(true, |high| quote.rate() > high.rate()) {
                highest = Some(quote);
            }
        }

        let (buy, sell) = (lowest?, highest?);
        if sell.rate() <= buy.rate() {
            debug!("spread: No spread on {pair}");
            return None;
        }
        let spread = Self {
            pair: pair.clone(),
            buy: buy.into(),
            sell: sell.into(),
            margin: sell.rate() - buy.rate(),
        };
        debug!("spread: {spread}");
        Some(spread)
    }
}

impl fmt::Display for Spread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let venue = |side: &SpreadSide| side.venue.clone().unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "{}: buy on {} @ {}, sell on {} @ {}, margin {}",
            self.pair,
            venue(&self.buy),
            self.buy.rate,
            venue(&self.sell),
            self.sell.rate,
            self.margin
        )
    }
}
