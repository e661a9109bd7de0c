use std::fmt::{self, Debug};
use std::sync::Arc;

use derive_more::Display;
use eyre::{bail, Result};
use serde::{Serialize, Serializer};

/// An opaque currency identifier, usually a ticker symbol such as `USD` or `ETH`.
///
/// Equality and ordering are exact, byte-wise string comparisons. No case
/// normalization is applied; callers that want `eth == ETH` must normalize first.
/// Cloning is cheap since the symbol is reference counted.
#[derive(Clone, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{_0}")]
pub struct Currency(Arc<str>);

impl Currency {
    /// Creates a new currency from its symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty or only whitespace
    pub fn new(symbol: &str) -> Result<Self> {
        if symbol.trim().is_empty() {
            bail!("Currency symbol must not be empty");
        }
        Ok(Self(Arc::from(symbol)))
    }

    /// The symbol as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Convenience for symbols known to be valid, such as literals and generated
/// fixtures. Use [`Currency::new`] for untrusted input.
impl From<&str> for Currency {
    /// # Panics
    ///
    /// Panics if the symbol is empty or only whitespace
    fn from(symbol: &str) -> Self {
        assert!(!symbol.trim().is_empty(), "Currency symbol must not be empty");
        Self(Arc::from(symbol))
    }
}

/// An ordered pair of currencies: 1 `base` buys `rate` units of `quote`.
///
/// `(A, B)` and `(B, A)` are different pairs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CurrencyPair {
    /// The currency being priced
    pub base: Currency,
    /// The currency the price is expressed in
    pub quote: Currency,
}

impl CurrencyPair {
    /// Creates a new pair
    #[must_use]
    pub const fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// The same pair seen from the other side: `quote/base`
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }

    /// Parses a `BASE/QUOTE` symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no `/` separator or either side is empty
    pub fn parse(symbol: &str) -> Result<Self> {
        let Some((base, quote)) = symbol.split_once('/') else {
            bail!("Pair {symbol} must look like BASE/QUOTE");
        };
        Ok(Self::new(
            Currency::new(base.trim())?,
            Currency::new(quote.trim())?,
        ))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl Debug for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
