/// A quote is one directional exchange rate between two currencies, optionally tagged with the
/// venue that published it. Every observed quote gets a synthesized inverse so cycles can be
/// traversed in both directions.
use std::fmt::{self, Debug, Display};

use eyre::{bail, Result};
use serde::Serialize;

use super::currency::{Currency, CurrencyPair};

/// How a quote is traversed inside a cycle.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub enum Direction {
    /// Traversed as observed: base -> quote at the quoted rate
    Forward,
    /// Traversed through the synthesized inverse: quote -> base at the reciprocal rate
    Inverse,
}

impl Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "fwd"),
            Self::Inverse => write!(f, "inv"),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An immutable exchange rate: 1 `pair.base` buys `rate` units of `pair.quote`.
///
/// Quotes are validated on construction so nothing deeper in the pipeline has to
/// worry about zero, negative or non-finite rates.
#[derive(Clone, PartialEq)]
pub struct Quote {
    /// The currencies involved, in the direction the rate applies to
    pair: CurrencyPair,
    /// Units of quote currency per unit of base currency
    rate: f64,
    /// Whether this quote is the computed inverse of an observed one
    synthesized: bool,
    /// The venue that published the observed quote
    venue: Option<String>,
}

impl Debug for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Quote(USD/EUR @ 0.9 kraken)
        write!(f, "Quote({:?} @ {}", self.pair, self.rate)?;
        if let Some(venue) = &self.venue {
            write!(f, " {venue}")?;
        }
        if self.synthesized {
            write!(f, " synthesized")?;
        }
        write!(f, ")")
    }
}

impl Quote {
    /// Creates a new observed quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not a finite positive number, if its
    /// reciprocal is not finite (so the quote cannot be traded backwards), or if
    /// the pair's base and quote are the same currency
    pub fn new(pair: CurrencyPair, rate: f64) -> Result<Self> {
        if pair.base == pair.quote {
            bail!("Quote base and quote currencies must be different");
        }
        if !rate.is_finite() || rate <= 0.0 {
            bail!("Quote rate must be a positive number, got {rate}");
        }
        if !(1.0 / rate).is_finite() {
            bail!("Quote rate {rate} has no finite inverse");
        }
        Ok(Self {
            pair,
            rate,
            synthesized: false,
            venue: None,
        })
    }

    /// Tags the quote with the venue that published it
    #[must_use]
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Builds the inverse of an observed quote: pair reversed, reciprocal rate.
    ///
    /// # Panics
    ///
    /// Panics if called on a quote that is itself synthesized. Inverses are
    /// only ever derived from observed data.
    #[must_use]
    pub fn synthesize(&self) -> Self {
        assert!(
            !self.synthesized,
            "Cannot synthesize the inverse of synthesized quote {self:?}"
        );
        Self {
            pair: self.pair.reversed(),
            rate: 1.0 / self.rate,
            synthesized: true,
            venue: self.venue.clone(),
        }
    }

    /// The pair this rate applies to
    #[must_use]
    pub const fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// The currency given up when this quote is traversed
    #[must_use]
    pub const fn base(&self) -> &Currency {
        &self.pair.base
    }

    /// The currency received when this quote is traversed
    #[must_use]
    pub const fn quote(&self) -> &Currency {
        &self.pair.quote
    }

    /// Units of quote currency per unit of base currency
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether this is a computed inverse rather than observed data
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// The publishing venue, if known
    #[must_use]
    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref()
    }

    /// How this quote is traversed relative to its observed orientation
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.synthesized {
            Direction::Inverse
        } else {
            Direction::Forward
        }
    }
}
