//! # Feed records
//!
//! Raw quote records as they arrive from a market-data feed, and their
//! conversion into validated [`Quote`]s. Bad records are never fatal: each
//! one becomes a [`Rejection`] that the detector reports back as a
//! data-quality diagnostic.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::currency::{Currency, CurrencyPair};
use super::quote::Quote;

/// A price as published by a feed. Pool feeds tend to publish decimal strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawRate {
    /// A JSON number
    Number(f64),
    /// A decimal string such as `"1.8"`
    Text(String),
}

impl From<f64> for RawRate {
    fn from(rate: f64) -> Self {
        Self::Number(rate)
    }
}

/// One quote as delivered by the market-data collaborator
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoteRecord {
    /// Venue or RPC endpoint that published the price
    #[serde(default)]
    pub venue: Option<String>,
    /// Base currency symbol
    #[serde(default)]
    pub base: Option<String>,
    /// Quote currency symbol
    #[serde(default)]
    pub quote: Option<String>,
    /// Units of quote per unit of base
    #[serde(default)]
    pub rate: Option<RawRate>,
    /// Whether the feed considers this price tradable
    #[serde(default = "default_is_valid")]
    pub is_valid: bool,
    /// Unix timestamp (seconds) of the last update
    #[serde(default)]
    pub last_updated: Option<i64>,
}

/// Records without an explicit flag are assumed tradable
const fn default_is_valid() -> bool {
    true
}

impl QuoteRecord {
    /// A tradable record with a numeric rate and no venue
    #[must_use]
    pub fn new(base: &str, quote: &str, rate: f64) -> Self {
        Self {
            venue: None,
            base: Some(base.to_string()),
            quote: Some(quote.to_string()),
            rate: Some(RawRate::Number(rate)),
            is_valid: true,
            last_updated: None,
        }
    }

    /// Tags the record with a venue
    #[must_use]
    pub fn with_venue(mut self, venue: &str) -> Self {
        self.venue = Some(venue.to_string());
        self
    }
}

/// Why a record could not become a quote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RejectReason {
    /// Base or quote currency is absent or blank
    MissingCurrency,
    /// Base and quote are the same currency
    SameCurrency,
    /// No rate at all
    MissingRate,
    /// The rate text is not a number
    UnparsableRate(String),
    /// Zero, negative, NaN or infinite
    NonPositiveRate(f64),
    /// Positive, but so small that its reciprocal overflows
    UninvertibleRate(f64),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCurrency => write!(f, "missing currency"),
            Self::SameCurrency => write!(f, "base and quote are the same currency"),
            Self::MissingRate => write!(f, "missing rate"),
            Self::UnparsableRate(text) => write!(f, "unparsable rate {text:?}"),
            Self::NonPositiveRate(rate) => write!(f, "non-positive rate {rate}"),
            Self::UninvertibleRate(rate) => write!(f, "rate {rate} has no finite inverse"),
        }
    }
}

/// A record excluded from graph construction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Position of the record in the input batch
    pub index: usize,
    /// Venue of the record, if it had one
    pub venue: Option<String>,
    /// What was wrong with it
    pub reason: RejectReason,
}

impl TryFrom<&QuoteRecord> for Quote {
    type Error = RejectReason;

    fn try_from(record: &QuoteRecord) -> Result<Self, Self::Error> {
        let base = currency(record.base.as_deref())?;
        let quote = currency(record.quote.as_deref())?;
        if base == quote {
            return Err(RejectReason::SameCurrency);
        }

        let rate = match &record.rate {
            None => return Err(RejectReason::MissingRate),
            Some(RawRate::Number(rate)) => *rate,
            Some(RawRate::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| RejectReason::UnparsableRate(text.clone()))?,
        };

        if !rate.is_finite() || rate <= 0.0 {
            return Err(RejectReason::NonPositiveRate(rate));
        }
        if !(1.0 / rate).is_finite() {
            return Err(RejectReason::UninvertibleRate(rate));
        }
        let quote = Self::new(CurrencyPair::new(base, quote), rate)
            .map_err(|_| RejectReason::NonPositiveRate(rate))?;
        Ok(match &record.venue {
            Some(venue) => quote.with_venue(venue.as_str()),
            None => quote,
        })
    }
}

/// Parses an optional currency symbol
fn currency(symbol: Option<&str>) -> Result<Currency, RejectReason> {
    symbol
        .and_then(|symbol| Currency::new(symbol.trim()).ok())
        .ok_or(RejectReason::MissingCurrency)
}

/// Drops records the feed flagged as not tradable.
///
/// This is caller-side pre-filtering: such records are not malformed and are
/// not reported as rejections.
pub fn tradable(records: impl IntoIterator<Item = QuoteRecord>) -> Vec<QuoteRecord> {
    let records: Vec<QuoteRecord> = records.into_iter().collect();
    let total = records.len();
    let tradable: Vec<QuoteRecord> = records.into_iter().filter(|r| r.is_valid).collect();
    log::debug!(
        "feed::tradable: {} of {} records are tradable",
        tradable.len(),
        total
    );
    tradable
}
