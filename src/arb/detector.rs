//! # Detector
//!
//! The full pipeline for one snapshot of quotes:
//!
//! 1. build the exchange graph (bad records become rejections),
//! 2. split it into strongly connected components,
//! 3. enumerate and score the cycles of each component, keeping the best,
//! 4. report the winner if it clears the profit threshold.
//!
//! Nothing is kept between calls. Components can be searched on the rayon
//! thread pool; the result is the same as the sequential search because the
//! per-component winners are reduced in component order.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use eyre::Result;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use super::cycle::MIN_CYCLE_LENGTH;
use super::cycle_finder::for_each_cycle_in;
use super::cycle_quote::{BestCycle, CycleQuote};
use super::feed::{QuoteRecord, Rejection};
use super::graph::{ExchangeGraph, NodeId};
use super::opportunity::{assemble, Opportunity};
use super::quote::Quote;
use super::scc::cyclic_components;
use crate::config::Config;

/// Why no opportunity was reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Miss {
    /// Nothing survived validation, or there was no input
    NoValidQuotes,
    /// The graph has no cycle of three or more currencies
    NoCycles,
    /// Cycles exist but the best one does not clear the threshold
    NotProfitable {
        /// Yield of the best cycle found
        best_yield: f64,
    },
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValidQuotes => write!(f, "no valid quotes"),
            Self::NoCycles => write!(f, "no cycles"),
            Self::NotProfitable { best_yield } => {
                write!(f, "no profitable cycle (best yield {best_yield:.6})")
            }
        }
    }
}

/// Result of one detection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// A cycle above the threshold
    Found(Opportunity),
    /// Nothing to report, and why
    NotFound(Miss),
}

/// How the search went
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStats {
    /// Strongly connected components with at least two currencies
    pub components: usize,
    /// Cycles enumerated and scored
    pub cycles_scored: u64,
    /// False when a budget cut the search short; the outcome is then best-effort
    pub exhaustive: bool,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

/// Everything a detection run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// The opportunity, or why there is none
    pub outcome: Outcome,
    /// Input records that were skipped as malformed
    pub rejected: Vec<Rejection>,
    /// Search diagnostics
    pub stats: SearchStats,
}

impl Detection {
    /// The reported opportunity, if any
    #[must_use]
    pub const fn opportunity(&self) -> Option<&Opportunity> {
        match &self.outcome {
            Outcome::Found(opportunity) => Some(opportunity),
            Outcome::NotFound(_) => None,
        }
    }

    /// Whether a budget stopped the search before every cycle was seen
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        !self.stats.exhaustive
    }
}

/// Shared search limits. Safe to consult from several rayon workers at once.
struct Budget {
    /// Stop once this instant has passed
    deadline: Option<Instant>,
    /// Stop once this many cycles have been admitted
    max_cycles: Option<u64>,
    /// Cycles admitted so far
    admitted: AtomicU64,
    /// Set when either limit was hit
    exhausted: AtomicBool,
}

impl Budget {
    /// Limits taken from `config`, with the deadline counted from `started`
    fn new(config: &Config, started: Instant) -> Self {
        Self {
            deadline: config.search_budget.map(|budget| started + budget),
            max_cycles: config.max_cycles,
            admitted: AtomicU64::new(0),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Whether the search must stop now. Marks the budget exhausted once the
    /// deadline has passed, whether or not any cycle was admitted.
    fn is_over(&self) -> bool {
        if self.exhausted.load(Ordering::Relaxed) {
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.exhausted.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Whether one more cycle may be scored
    fn admit(&self) -> bool {
        if self.is_over() {
            return false;
        }
        let admitted = self.admitted.fetch_add(1, Ordering::Relaxed);
        if self.max_cycles.is_some_and(|max| admitted >= max) {
            self.exhausted.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Whether either limit was hit at some point
    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Relaxed)
    }
}

/// Finds the most profitable cycle in a snapshot of quotes
#[derive(Debug, Clone)]
pub struct Detector {
    /// Validated configuration
    config: Config,
}

impl Detector {
    /// Creates a detector.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        if let Some(max) = config.max_cycle_length.filter(|max| *max < MIN_CYCLE_LENGTH) {
            warn!(
                "detector: Maximum cycle length {} is below {}; no cycle will ever be found",
                max, MIN_CYCLE_LENGTH
            );
        }
        Ok(Self { config })
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the pipeline over raw feed records
    #[must_use]
    pub fn detect(&self, records: &[QuoteRecord]) -> Detection {
        self.detect_graph(&ExchangeGraph::build(records))
    }

    /// Runs the pipeline over already validated quotes
    #[must_use]
    pub fn detect_quotes(&self, quotes: impl IntoIterator<Item = Quote>) -> Detection {
        self.detect_graph(&ExchangeGraph::from_quotes(quotes))
    }

    /// Runs the pipeline over a built graph
    #[must_use]
    pub fn detect_graph(&self, graph: &ExchangeGraph) -> Detection {
        let started = Instant::now();
        let rejected = graph.rejected().to_vec();

        if graph.edge_count() == 0 {
            debug!(
                "detector: No valid quotes ({} rejected)",
                rejected.len()
            );
            return Detection {
                outcome: Outcome::NotFound(Miss::NoValidQuotes),
                rejected,
                stats: SearchStats {
                    components: 0,
                    cycles_scored: 0,
                    exhaustive: true,
                    elapsed: started.elapsed(),
                },
            };
        }

        let components = cyclic_components(graph, &vec![true; graph.node_count()]);
        let budget = Budget::new(&self.config, started);
        debug!(
            "detector: Searching {} components over {} currencies",
            components.len(),
            graph.node_count()
        );

        let searches: Vec<BestCycle> = if self.config.parallel {
            components
                .par_iter()
                .map(|component| self.search(graph, component, &budget))
                .collect()
        } else {
            components
                .iter()
                .map(|component| self.search(graph, component, &budget))
                .collect()
        };
        // Ties go to the lowest component
        let best = searches
            .into_iter()
            .fold(BestCycle::default(), BestCycle::merge);

        let stats = SearchStats {
            components: components.len(),
            cycles_scored: best.examined(),
            exhaustive: !budget.is_exhausted(),
            elapsed: started.elapsed(),
        };
        if !stats.exhaustive {
            warn!(
                "detector: Search budget exhausted after {} cycles; result is best-effort",
                stats.cycles_scored
            );
        }

        let outcome = match best.into_best() {
            None => Outcome::NotFound(Miss::NoCycles),
            Some(quote) if quote.rate() > self.config.min_profit_threshold => {
                let opportunity = assemble(graph, &quote);
                info!("detector: Found {opportunity}");
                Outcome::Found(opportunity)
            }
            Some(quote) => Outcome::NotFound(Miss::NotProfitable {
                best_yield: quote.rate(),
            }),
        };
        if let Outcome::NotFound(miss) = &outcome {
            debug!("detector: Nothing to report: {miss}");
        }

        Detection {
            outcome,
            rejected,
            stats,
        }
    }

    /// Best cycle of one component
    fn search(&self, graph: &ExchangeGraph, component: &[NodeId], budget: &Budget) -> BestCycle {
        let mut best = BestCycle::default();
        if budget.is_over() {
            return best;
        }
        let _ = for_each_cycle_in(
            graph,
            component,
            self.config.max_cycle_length,
            &|| budget.is_over(),
            &mut |cycle| {
                if !budget.admit() {
                    return ControlFlow::Break(());
                }
                if self.config.inverse_only_cycles {
                    best.offer(CycleQuote::score(graph, &cycle));
                } else if let Some(quote) = CycleQuote::score_observed(graph, &cycle) {
                    best.offer(quote);
                } else {
                    best.pass();
                }
                ControlFlow::Continue(())
            },
        );
        best
    }
}
